//! Default test vectors
//!
//! The pong firmware does not terminate a transfer with a zero-length packet,
//! so a reply that exactly fills a multiple of the packet size cannot be
//! told apart from a longer one still in flight. None of the default payload
//! lengths land on a multiple of a standard packet size, and the boundary
//! vector stops one byte short of the transfer unit.

use crate::tester::TestVector;
use std::num::NonZeroUsize;

/// Packet sizes used by full-, high- and super-speed bulk/interrupt endpoints
pub const STANDARD_PACKET_SIZES: [usize; 6] = [8, 16, 32, 64, 512, 1024];

/// The default vector set for a peer with the given transfer unit
pub fn default_vectors(max_transfer_unit: NonZeroUsize) -> Vec<TestVector> {
    vec![
        TestVector::new("Text", b"Hello USB!".to_vec()),
        TestVector::new("Digits", b"1234567890".to_vec()),
        TestVector::new("Binary", b"\x00\x01\x02\x03\x04".to_vec()),
        TestVector::new("String with NULL", b"ABC\x00DEF".to_vec()),
        // ZLP not handled by the pong device
        TestVector::new(
            "pkt_size-1 bytes",
            vec![b'A'; max_transfer_unit.get() - 1],
        ),
    ]
}

/// True when a payload of `len` bytes would need a zero-length packet to
/// mark its end on an endpoint with this transfer unit
pub fn needs_zero_length_packet(len: usize, max_transfer_unit: NonZeroUsize) -> bool {
    len > 0 && len % max_transfer_unit.get() == 0
}
