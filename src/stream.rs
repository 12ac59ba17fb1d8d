/*!
    byte stream shared by all exchanges with the instrument
    
    There is one read cursor on the link, consumed in two different ways:
    
    - [Stream::read_exact] waits, with a bounded number of attempts, for a fixed length reply. It is the only reader allowed to suspend its caller, and is meant for short status exchanges.
    - [Stream::read_line] and [Stream::next_byte] only consume what is already buffered and return immediately, they are meant to be called repeatedly by a polling loop.
*/

use std::{
    io,
    time::Duration,
    };
use log::*;

use crate::{
    driver::Error,
    utils::is_terminator,
    };


/// longest line kept while waiting for its terminator
pub const MAX_LINE: usize = 64;


/**
    byte link to the instrument
    
    implementations must never wait in [Self::available], [Self::read_byte] or [Self::flush], they only report and consume bytes already received.
*/
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// send all the given bytes
    async fn write(&mut self, data: &[u8]) -> io::Result<()>;
    /// number of received bytes not yet read
    fn available(&mut self) -> usize;
    /// next received byte, if any
    fn read_byte(&mut self) -> Option<u8>;
    /// discard all received bytes not yet read
    fn flush(&mut self) -> io::Result<()>;
}


/// read modes over a [Transport]
pub struct Stream<T> {
    transport: T,
    /// line received so far, waiting for its terminator
    line: heapless::Vec<u8, MAX_LINE>,
    /// a line just ended, its second terminator byte may still come
    drain: bool,
}

impl<T: Transport> Stream<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            line: heapless::Vec::new(),
            drain: false,
        }
    }
    pub fn transport(&self) -> &T  {&self.transport}
    pub fn transport_mut(&mut self) -> &mut T  {&mut self.transport}
    pub fn into_inner(self) -> T  {self.transport}
    
    pub async fn write(&mut self, data: &[u8]) -> Result<(), Error> {
        trace!("send \"{}\"", data.escape_ascii());
        self.transport.write(data).await?;
        Ok(())
    }
    /// number of bytes waiting to be read
    pub fn available(&mut self) -> usize {
        self.transport.available()
    }
    /// drop everything received so far, including a partially received line
    pub fn flush(&mut self) -> Result<(), Error> {
        self.line.clear();
        self.drain = false;
        self.transport.flush()?;
        Ok(())
    }
    
    /// next received byte, skipping the second terminator of a line that just ended
    pub fn next_byte(&mut self) -> Option<u8> {
        let byte = self.transport.read_byte()?;
        if core::mem::take(&mut self.drain) && is_terminator(byte) {
            return self.transport.read_byte();
        }
        Some(byte)
    }
    
    /**
        wait for exactly `N` bytes
        
        the transport is polled at most `attempts` times, sleeping `backoff` between polls. Bytes are only consumed once enough of them are available. On timeout, bytes possibly left in the transport are undefined and should be flushed by the caller.
    */
    pub async fn read_exact<const N: usize>(&mut self, attempts: u32, backoff: Duration) -> Result<[u8; N], Error> {
        let mut received = [0; N];
        let mut filled = 0;
        for attempt in 0 .. attempts {
            if self.transport.available() >= N - filled {
                while filled < N {
                    let Some(byte) = self.next_byte() 
                        else {break};
                    received[filled] = byte;
                    filled += 1;
                }
                if filled == N {
                    return Ok(received)
                }
            }
            if attempt + 1 < attempts {
                tokio::time::sleep(backoff).await;
            }
        }
        debug!("received {} of {} expected bytes after {} attempts", filled, N, attempts);
        Err(Error::Timeout)
    }
    
    /**
        next complete line, trimmed, or `None` if no complete line was received yet
        
        A partially received line is kept until its terminator arrives. The instrument ends lines with two bytes, the second one is dropped whenever it comes.
    */
    pub fn read_line(&mut self) -> Option<String> {
        while let Some(byte) = self.next_byte() {
            if is_terminator(byte) {
                self.drain = true;
                let line = String::from_utf8_lossy(&self.line).trim().to_owned();
                self.line.clear();
                trace!("received line {:?}", line);
                return Some(line);
            }
            if self.line.push(byte).is_err() {
                warn!("dropping line longer than {} bytes", MAX_LINE);
                self.line.clear();
            }
        }
        None
    }
}
