//! Echo round-trip tester
//!
//! Sends each test vector over an [`EchoTransport`], reads back one reply of
//! at most the transfer unit, and records whether the reply matches.
//!
//! Exchanges are strictly sequential: a vector's write and read both complete
//! before the next vector is sent. A mismatching reply is a reported result,
//! not an error. Only transport faults and short writes abort the run.

use common::{Error, Result};
use std::num::NonZeroUsize;
use tracing::debug;

use crate::report::format_bytes;

/// A bidirectional byte channel to an echo peer
///
/// Implementations own the outbound and inbound sides of the link. The
/// tester borrows the transport for the duration of a run and never closes
/// it.
pub trait EchoTransport {
    /// Send `data` on the outbound side, returning the number of bytes accepted
    fn write(&mut self, data: &[u8]) -> Result<usize>;

    /// Read a single reply of at most `max_len` bytes from the inbound side
    fn read(&mut self, max_len: usize) -> Result<Vec<u8>>;
}

impl<T: EchoTransport + ?Sized> EchoTransport for &mut T {
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        (**self).write(data)
    }

    fn read(&mut self, max_len: usize) -> Result<Vec<u8>> {
        (**self).read(max_len)
    }
}

/// A named payload to bounce off the echo peer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestVector {
    name: String,
    payload: Vec<u8>,
}

impl TestVector {
    pub fn new(name: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            payload: payload.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

/// Outcome of a single exchange
///
/// `matched` is computed at construction and the fields are read-only, so
/// `matched() == (expected() == actual())` always holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestResult {
    name: String,
    expected: Vec<u8>,
    actual: Vec<u8>,
    matched: bool,
}

impl TestResult {
    pub fn new(name: impl Into<String>, expected: Vec<u8>, actual: Vec<u8>) -> Self {
        let matched = expected == actual;
        Self {
            name: name.into(),
            expected,
            actual,
            matched,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The payload that was sent
    pub fn expected(&self) -> &[u8] {
        &self.expected
    }

    /// The bytes the peer returned, untouched
    pub fn actual(&self) -> &[u8] {
        &self.actual
    }

    pub fn matched(&self) -> bool {
        self.matched
    }
}

/// Runs test vectors against an echo peer
pub struct EchoTester<T> {
    transport: T,
    max_transfer_unit: NonZeroUsize,
}

impl<T: EchoTransport> EchoTester<T> {
    /// Create a tester reading replies of at most `max_transfer_unit` bytes
    pub fn new(transport: T, max_transfer_unit: NonZeroUsize) -> Self {
        Self {
            transport,
            max_transfer_unit,
        }
    }

    pub fn max_transfer_unit(&self) -> NonZeroUsize {
        self.max_transfer_unit
    }

    /// Run every vector in order and collect the results
    pub fn run_all(&mut self, vectors: &[TestVector]) -> Result<Vec<TestResult>> {
        self.run_all_with(vectors, |_| {})
    }

    /// Run every vector in order, handing each result to `on_result` as soon
    /// as it is known
    ///
    /// On a transport fault the run stops immediately. Results already passed
    /// to `on_result` stay reported; the faulting vector and everything after
    /// it produce nothing.
    pub fn run_all_with<F>(
        &mut self,
        vectors: &[TestVector],
        mut on_result: F,
    ) -> Result<Vec<TestResult>>
    where
        F: FnMut(&TestResult),
    {
        let mut results = Vec::with_capacity(vectors.len());
        for vector in vectors {
            let result = self.exchange(vector)?;
            on_result(&result);
            results.push(result);
        }
        Ok(results)
    }

    /// Write one payload and read back one reply
    fn exchange(&mut self, vector: &TestVector) -> Result<TestResult> {
        let payload = vector.payload();
        debug!("PING [{}] -> {}", vector.name(), format_bytes(payload));

        let written = self.transport.write(payload)?;
        if written != payload.len() {
            return Err(Error::ShortWrite {
                written,
                expected: payload.len(),
            });
        }

        let reply = self.transport.read(self.max_transfer_unit.get())?;
        debug!("PONG [{}] <- {}", vector.name(), format_bytes(&reply));

        Ok(TestResult::new(vector.name(), payload.to_vec(), reply))
    }
}
