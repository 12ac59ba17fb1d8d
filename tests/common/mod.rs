#![allow(dead_code)]

use std::{
    collections::VecDeque,
    future::Future,
    io,
    };
use rga100::stream::Transport;


/// in-memory instrument link, answering each written frame with the next scripted reply
#[derive(Default)]
pub struct MockTransport {
    /// bytes received and not yet read
    pub incoming: VecDeque<u8>,
    /// bytes arriving late: one per call to `available`, or after a read found nothing
    pub trickle: VecDeque<u8>,
    /// replies pushed to `incoming`, one per write
    pub replies: VecDeque<Vec<u8>>,
    /// everything written so far
    pub written: Vec<u8>,
    /// number of calls to `available`
    pub polls: usize,
    /// number of calls to `flush`
    pub flushes: usize,
}
impl MockTransport {
    pub fn new() -> Self {Self::default()}
    /// script the reply to the next unanswered write
    pub fn reply(mut self, reply: &[u8]) -> Self {
        self.replies.push_back(reply.to_vec());
        self
    }
    /// make bytes available immediately
    pub fn receive(&mut self, data: &[u8]) {
        self.incoming.extend(data);
    }
    /// written frames, without their terminator
    pub fn frames(&self) -> Vec<String> {
        self.written
            .split(|&byte| byte == b'\r')
            .filter(|frame| ! frame.is_empty())
            .map(|frame| String::from_utf8_lossy(frame).into_owned())
            .collect()
    }
}
impl Transport for MockTransport {
    async fn write(&mut self, data: &[u8]) -> io::Result<()> {
        self.written.extend_from_slice(data);
        if let Some(reply) = self.replies.pop_front() {
            self.incoming.extend(reply);
        }
        Ok(())
    }
    fn available(&mut self) -> usize {
        self.polls += 1;
        if let Some(byte) = self.trickle.pop_front() {
            self.incoming.push_back(byte);
        }
        self.incoming.len()
    }
    fn read_byte(&mut self) -> Option<u8> {
        let byte = self.incoming.pop_front();
        if byte.is_none() {
            if let Some(late) = self.trickle.pop_front() {
                self.incoming.push_back(late);
            }
        }
        byte
    }
    fn flush(&mut self) -> io::Result<()> {
        self.flushes += 1;
        self.incoming.clear();
        Ok(())
    }
}

/// status reply without any fault
pub const CLEAN: &[u8] = b"\x00\r\n";

/// run a test on a paused clock, so backoffs elapse instantly
pub fn run<F: Future>(test: F) -> F::Output {
    let _ = env_logger::builder().is_test(true).try_init();
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .expect("failed to create runtime")
        .block_on(test)
}
