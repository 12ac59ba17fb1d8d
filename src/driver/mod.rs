/*!
    driver for the SRS RGA 100, over any [Transport]
    
    The central resource is the [Rga] struct, owning the link to the instrument and the scan packet in flight. It must have a single owner: every exchange assumes it is the only one outstanding on the link.
    
    exchanges styles
    
    - setting commands, queries and instrument operations are `async` methods, they may suspend the caller for a bounded time while waiting for a status byte or a value line
    - mass scans are started by [Rga::scan_mass] and then received by calling the non-blocking [Rga::read_mass] (or [Rga::poll_scan] and [Rga::take_reading]) from the caller's loop
*/

/// command sending and status checking, this is the tricky part of the code
mod dispatching;
/// instrument operations built on dispatching
mod operating;


use std::time::Duration;
use log::*;
use thiserror::Error;

use crate::{
    command::{Mnemonic, STATUS_COMMANDS},
    scan::Scan,
    status::Faults,
    stream::{Stream, Transport},
    };


/// error regarding the instrument communication
#[derive(Error, Debug)]
pub enum Error {
    #[error("problem with serial link")]
    Bus(#[from] std::io::Error),
    #[error("no data arrived in expected time")]
    Timeout,
    #[error("instrument reported faults: {0}")]
    Instrument(Faults),
    #[error("readback {readback} is out of tolerance for commanded {commanded}")]
    Verification {commanded: f32, readback: f32},
    #[error("a scan is already in flight")]
    InvalidState,
    #[error("problem detected on driver side: {0}")]
    Driver(&'static str),
}


/// deployment settings of the driver
#[derive(Clone, Debug)]
pub struct Config {
    /// commands echoing a status byte when not queried
    pub status_commands: heapless::Vec<Mnemonic, 8>,
    /// whether the optional electron multiplier is installed
    pub cdem_present: bool,
    /** 
        polls of the link before a status reply is considered lost
        
        the instrument only echoes the status of `CA` and `FL` once calibration or filament start-up is over, which takes several seconds. The default allows 20s with the default backoff.
    */
    pub read_attempts: u32,
    /// pause between polls of the link
    pub backoff: Duration,
    /// polls of the link before a value line is considered lost
    pub reply_attempts: u32,
    /// accepted difference between commanded and read back filament current, in mA
    pub filament_tolerance: f32,
    /// pause before discarding the leftovers of a setting command
    pub settle: Duration,
}
impl Default for Config {
    fn default() -> Self {
        let config = Self {
            status_commands: heapless::Vec::new(),
            cdem_present: false,
            read_attempts: 400,
            backoff: Duration::from_millis(50),
            reply_attempts: 40,
            filament_tolerance: 0.1,
            settle: Duration::ZERO,
        };
        config.with_status_commands(STATUS_COMMANDS)
    }
}
impl Config {
    pub fn with_status_commands(mut self, commands: impl IntoIterator<Item=Mnemonic>) -> Self {
        self.status_commands.clear();
        for command in commands {
            if self.status_commands.push(command).is_err() {
                warn!("ignoring status commands beyond the first {}", self.status_commands.len());
                break
            }
        }
        self
    }
    pub fn with_cdem(mut self, present: bool) -> Self {
        self.cdem_present = present;
        self
    }
    pub fn with_read_attempts(mut self, attempts: u32) -> Self {
        self.read_attempts = attempts;
        self
    }
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }
    pub fn with_reply_attempts(mut self, attempts: u32) -> Self {
        self.reply_attempts = attempts;
        self
    }
    pub fn with_filament_tolerance(mut self, tolerance: f32) -> Self {
        self.filament_tolerance = tolerance;
        self
    }
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }
}


/// SRS RGA 100 driver
pub struct Rga<T> {
    stream: Stream<T>,
    config: Config,
    scan: Scan,
}

impl<T: Transport> Rga<T> {
    pub fn new(transport: T, config: Config) -> Self {
        Self {
            stream: Stream::new(transport),
            config,
            scan: Scan::new(),
        }
    }
    pub fn config(&self) -> &Config  {&self.config}
    pub fn transport(&self) -> &T  {self.stream.transport()}
    pub fn transport_mut(&mut self) -> &mut T  {self.stream.transport_mut()}
    pub fn into_inner(self) -> T  {self.stream.into_inner()}
}
