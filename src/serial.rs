/*!
    [Transport] over a serial port, using `serial2-tokio`
    
    the instrument expects 28800 bauds, 8 data bits, no parity, 1 stop bit and RTS/CTS hardware flow control.
*/

use std::{
    collections::VecDeque,
    io,
    path::Path,
    pin::Pin,
    task::{Context, Poll, Waker},
    };
use log::*;
use serial2_tokio::{SerialPort, CharSize, StopBits, Parity, FlowControl};
use tokio::io::{AsyncRead, ReadBuf};

use crate::stream::Transport;


/// baud rate of the instrument's RS232 port
pub const BAUD_RATE: u32 = 28_800;

/// serial port link to the instrument
pub struct SerialTransport {
    port: SerialPort,
    /// bytes received from the port and not yet read
    received: VecDeque<u8>,
}

impl SerialTransport {
    /// open the port with the instrument's link settings
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        Self::open_with_rate(path, BAUD_RATE)
    }
    pub fn open_with_rate(path: impl AsRef<Path>, rate: u32) -> io::Result<Self> {
        let port = SerialPort::open(path, |mut settings: serial2_tokio::Settings| {
                settings.set_raw();
                settings.set_baud_rate(rate)?;
                settings.set_char_size(CharSize::Bits8);
                settings.set_stop_bits(StopBits::One);
                settings.set_parity(Parity::None);
                settings.set_flow_control(FlowControl::RtsCts);
                Ok(settings)
                })?;
        Ok(Self {
            port,
            received: VecDeque::new(),
        })
    }
    
    /// move whatever the port already holds to the receive queue, without waiting
    fn receive(&mut self) {
        let mut context = Context::from_waker(Waker::noop());
        let mut chunk = [0; 64];
        loop {
            let mut buffer = ReadBuf::new(&mut chunk);
            match Pin::new(&mut self.port).poll_read(&mut context, &mut buffer) {
                Poll::Ready(Ok(())) if ! buffer.filled().is_empty() => {
                    self.received.extend(buffer.filled());
                },
                Poll::Ready(Ok(())) | Poll::Pending => break,
                Poll::Ready(Err(error)) => {
                    warn!("serial receive failed: {}", error);
                    break
                },
            }
        }
    }
}

impl Transport for SerialTransport {
    async fn write(&mut self, data: &[u8]) -> io::Result<()> {
        self.port.write_all(data).await
    }
    fn available(&mut self) -> usize {
        self.receive();
        self.received.len()
    }
    fn read_byte(&mut self) -> Option<u8> {
        if self.received.is_empty() {
            self.receive();
        }
        self.received.pop_front()
    }
    fn flush(&mut self) -> io::Result<()> {
        self.received.clear();
        self.port.discard_input_buffer()
    }
}
