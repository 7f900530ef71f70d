//! USB subsystem
//!
//! Everything the echo tester needs from the host USB stack:
//! - Device lookup by VID:PID
//! - Kernel driver detach and scoped interface claim
//! - Endpoint descriptor enumeration
//! - A bulk/interrupt transport implementing [`crate::EchoTransport`]

pub mod device;
pub mod endpoints;
pub mod transport;

pub use device::{ClaimedInterface, InterfaceControl, open_device};
pub use endpoints::{EndpointInfo, find_endpoint, interface_endpoints, max_packet_size};
pub use transport::{TRANSFER_TIMEOUT, UsbTransport};
