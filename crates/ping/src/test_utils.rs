//! Test utilities for usb-ping
//!
//! Provides a scripted [`EchoTransport`] so the tester can be exercised
//! without hardware.
//!
//! # Example
//!
//! ```
//! use ping::test_utils::{Exchange, MockTransport};
//! use ping::{EchoTester, TestVector};
//! use std::num::NonZeroUsize;
//!
//! let mut transport = MockTransport::with_script(vec![Exchange::Echo, Exchange::Reply(b"no".to_vec())]);
//! let mut tester = EchoTester::new(&mut transport, NonZeroUsize::new(64).unwrap());
//! let results = tester
//!     .run_all(&[TestVector::new("a", b"yes".to_vec()), TestVector::new("b", b"yes".to_vec())])
//!     .unwrap();
//! assert!(results[0].matched());
//! assert!(!results[1].matched());
//! ```

use crate::tester::EchoTransport;
use common::{Error, Result};
use std::collections::VecDeque;

/// How the mock peer behaves for one write/read exchange
#[derive(Debug, Clone)]
pub enum Exchange {
    /// Return the written bytes, truncated to the read size like a real packet
    Echo,
    /// Accept the write, then return these bytes verbatim
    Reply(Vec<u8>),
    /// Report this many bytes written
    ShortWrite(usize),
    /// Fail the write
    WriteFault(rusb::Error),
    /// Accept the write, then fail the read
    ReadFault(rusb::Error),
}

/// Scripted echo peer
///
/// Each write consumes the next [`Exchange`] from the script. Once the
/// script is exhausted the peer echoes faithfully.
#[derive(Debug, Default)]
pub struct MockTransport {
    script: VecDeque<Exchange>,
    current: Option<Exchange>,
    last_written: Vec<u8>,
    written: Vec<Vec<u8>>,
    read_sizes: Vec<usize>,
}

impl MockTransport {
    /// A lossless echo peer
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(script: Vec<Exchange>) -> Self {
        Self {
            script: script.into(),
            ..Self::default()
        }
    }

    /// Number of write calls seen
    pub fn writes(&self) -> usize {
        self.written.len()
    }

    /// Number of read calls seen
    pub fn reads(&self) -> usize {
        self.read_sizes.len()
    }

    /// Payloads passed to write, in order
    pub fn written(&self) -> &[Vec<u8>] {
        &self.written
    }

    /// `max_len` of every read call, in order
    pub fn read_sizes(&self) -> &[usize] {
        &self.read_sizes
    }
}

impl EchoTransport for MockTransport {
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        let step = self.script.pop_front().unwrap_or(Exchange::Echo);
        self.written.push(data.to_vec());
        self.last_written = data.to_vec();

        let count = match &step {
            Exchange::ShortWrite(n) => *n,
            Exchange::WriteFault(e) => return Err(Error::Transport(*e)),
            _ => data.len(),
        };
        self.current = Some(step);
        Ok(count)
    }

    fn read(&mut self, max_len: usize) -> Result<Vec<u8>> {
        self.read_sizes.push(max_len);
        match self.current.take() {
            Some(Exchange::Reply(bytes)) => Ok(bytes),
            Some(Exchange::ReadFault(e)) => Err(Error::Transport(e)),
            Some(Exchange::Echo) | None => {
                let mut reply = std::mem::take(&mut self.last_written);
                reply.truncate(max_len);
                Ok(reply)
            }
            Some(Exchange::ShortWrite(_)) | Some(Exchange::WriteFault(_)) => {
                Err(Error::Transport(rusb::Error::Timeout))
            }
        }
    }
}
