/*!
    command/response driver for SRS RGA 100 residual gas analyzers
    
    - [command] encodes the ASCII commands sent on the link
    - [status] decodes the fault flags echoed by setting commands
    - [stream] reads replies, either waiting a bounded time for fixed length replies or polling for lines
    - [scan] reassembles binary mass scan currents across polls
    - [driver] composes them into instrument operations
*/

mod utils;

pub mod command;
pub mod status;
pub mod stream;
pub mod scan;
pub mod driver;
#[cfg(feature = "serial")]
pub mod serial;

pub use driver::{Rga, Config, Error};
