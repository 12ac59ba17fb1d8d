/*!
    incremental reception of mass scan packets
    
    a scan answer is a 4 bytes little endian current. It is reassembled across repeated non-blocking polls so the caller's loop never waits for it.
*/

use log::*;
use crate::stream::{Stream, Transport};


/// size of a scan packet
pub const PACKET: usize = 4;

/// reception progress of the scan packet in flight
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum ScanState {
    /// no scan in flight
    #[default]
    Idle,
    /// scan requested, no byte received yet
    Armed {expected: usize},
    /// `cursor` bytes received
    Filling {cursor: usize},
    /// complete current, not yet taken
    Ready(u32),
}

/// owner of the single scan packet that may be in flight
#[derive(Clone, Debug, Default)]
pub struct Scan {
    state: ScanState,
    packet: [u8; PACKET],
}

impl Scan {
    pub fn new() -> Self {Self::default()}
    pub fn state(&self) -> ScanState {self.state}
    pub fn is_idle(&self) -> bool {self.state == ScanState::Idle}
    
    /// expect a new packet, only possible when the previous one was taken
    pub fn arm(&mut self) -> bool {
        if ! self.is_idle() 
            {return false}
        self.packet = [0; PACKET];
        self.state = ScanState::Armed {expected: PACKET};
        debug!("scan armed");
        true
    }
    
    /// consume the bytes already received, up to the end of the packet
    pub fn poll<T: Transport>(&mut self, stream: &mut Stream<T>) -> ScanState {
        let mut cursor = match self.state {
            ScanState::Armed {..} => 0,
            ScanState::Filling {cursor} => cursor,
            ScanState::Idle | ScanState::Ready(_) => return self.state,
        };
        while cursor < PACKET {
            let Some(byte) = stream.next_byte() 
                else {break};
            self.packet[cursor] = byte;
            cursor += 1;
        }
        self.state = if cursor == PACKET {
            let current = u32::from_le_bytes(self.packet);
            debug!("scan packet complete: {}", current);
            ScanState::Ready(current)
        }
        else if cursor > 0 {
            ScanState::Filling {cursor}
        }
        else {
            self.state
        };
        self.state
    }
    
    /// take the received current, or `None` if it is not complete yet
    pub fn take(&mut self) -> Option<u32> {
        match self.state {
            ScanState::Ready(current) => {
                self.state = ScanState::Idle;
                Some(current)
            },
            _ => None,
        }
    }
    
    /// forget the packet in flight
    pub fn reset(&mut self) {
        if ! self.is_idle() {
            debug!("scan abandoned in state {:?}", self.state);
        }
        self.state = ScanState::Idle;
    }
}
