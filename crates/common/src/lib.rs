//! Common utilities for usb-ping
//!
//! This crate provides the error type shared by the ping library and binary,
//! and the tracing subscriber setup.

pub mod error;
pub mod logging;

pub use error::{Error, Result};
pub use logging::setup_logging;
