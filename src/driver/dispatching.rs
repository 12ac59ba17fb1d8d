use log::*;

use crate::{
    command::{Command, Mnemonic, Parameter},
    status,
    stream::Transport,
    };
use super::{Error, Rga};


/// status byte followed by the instrument's two bytes line ending
const STATUS_REPLY: usize = 3;


impl<T: Transport> Rga<T> {
    /**
        send a command, and check the status byte it echoes if it is a status reporting command
        
        queries (`?` parameter) are answered by a value line which is left to the caller. Input left over from previous exchanges is discarded before sending any command expecting a reply.
    */
    pub async fn dispatch(&mut self, mnemonic: Mnemonic, parameter: Parameter) -> Result<(), Error> {
        let command = Command::new(mnemonic, parameter);
        let frame = command.frame()
            .map_err(|_| Error::Driver("command does not fit in a frame"))?;
        let reports_status = command.reports_status(&self.config.status_commands);
        if reports_status || command.is_query() {
            self.stream.flush()?;
        }
        self.stream.write(&frame).await?;
        if reports_status {
            self.check_status(mnemonic).await?;
        }
        Ok(())
    }
    
    /// receive and decode the status byte following a setting command
    async fn check_status(&mut self, mnemonic: Mnemonic) -> Result<(), Error> {
        let reply = self.stream.read_exact::<STATUS_REPLY>(
            self.config.read_attempts, 
            self.config.backoff,
            ).await;
        let [byte, ..] = match reply {
            Ok(reply) => reply,
            Err(error) => {
                // part of the reply may have arrived, it must not be taken for the next one
                self.stream.flush()?;
                return Err(error);
            },
        };
        debug!("{} status byte {:#010b}", mnemonic, byte);
        let faults = status::decode(byte, self.config.cdem_present);
        if ! faults.is_empty() {
            warn!("{} reported faults: {}", mnemonic, faults);
            return Err(Error::Instrument(faults));
        }
        Ok(())
    }
    
    /**
        wait for the value line answering a query
        
        the line reader never waits, so it is polled at most `reply_attempts` times with the configured backoff. Empty lines are skipped. On timeout, whatever part of the line was received is dropped.
    */
    pub(super) async fn receive_line(&mut self) -> Result<String, Error> {
        for attempt in 0 .. self.config.reply_attempts {
            if let Some(line) = self.stream.read_line() {
                if ! line.is_empty() 
                    {return Ok(line)}
                continue
            }
            if attempt + 1 < self.config.reply_attempts {
                tokio::time::sleep(self.config.backoff).await;
            }
        }
        debug!("no value line after {} attempts", self.config.reply_attempts);
        self.stream.flush()?;
        Err(Error::Timeout)
    }
}
