//! usb-ping
//!
//! Verifies round-trip byte integrity against echo ("pong") firmware: every
//! test vector is written to an OUT endpoint and must come back unchanged on
//! the IN endpoint.
//!
//! The exchange loop in [`tester`] only depends on the [`EchoTransport`]
//! trait. The [`usb`] module supplies the rusb-backed implementation along
//! with device lookup and interface ownership, and [`session`] ties the two
//! together.

pub mod config;
pub mod report;
pub mod session;
pub mod test_utils;
pub mod tester;
pub mod usb;
pub mod vectors;

pub use config::PingConfig;
pub use session::PingSession;
pub use tester::{EchoTester, EchoTransport, TestResult, TestVector};
pub use vectors::default_vectors;
