//! Integration tests for the echo tester
//!
//! Drives `EchoTester` with the scripted mock transport:
//! - Lossless echo of the default vector set
//! - Replies that are longer, shorter or different
//! - Short writes and transport faults aborting the run
//!
//! Run with: `cargo test -p ping --test echo_tests`

use common::Error;
use ping::report::aborted_line;
use ping::test_utils::{Exchange, MockTransport};
use ping::{EchoTester, TestVector, default_vectors};
use std::num::NonZeroUsize;

const PACKET_SIZE: usize = 64;

fn mtu() -> NonZeroUsize {
    NonZeroUsize::new(PACKET_SIZE).unwrap()
}

fn vector(name: &str, payload: &[u8]) -> TestVector {
    TestVector::new(name, payload.to_vec())
}

mod lossless_echo {
    use super::*;

    #[test]
    fn test_hello_usb_matches() {
        let mut transport = MockTransport::new();
        let mut tester = EchoTester::new(&mut transport, mtu());

        let results = tester.run_all(&[vector("Text", b"Hello USB!")]).unwrap();

        assert_eq!(results.len(), 1);
        assert!(results[0].matched());
        assert_eq!(results[0].actual(), b"Hello USB!");
    }

    #[test]
    fn test_embedded_zero_bytes_not_truncated() {
        let mut transport = MockTransport::new();
        let mut tester = EchoTester::new(&mut transport, mtu());

        let results = tester
            .run_all(&[vector("Binary", b"\x00\x01\x02\x03\x04")])
            .unwrap();

        assert!(results[0].matched());
        assert_eq!(results[0].actual().len(), 5);
        assert_eq!(transport.written()[0], b"\x00\x01\x02\x03\x04");
    }

    #[test]
    fn test_boundary_payload_one_short_of_transfer_unit() {
        let payload = vec![b'A'; PACKET_SIZE - 1];
        let mut transport = MockTransport::new();
        let mut tester = EchoTester::new(&mut transport, mtu());

        let results = tester.run_all(&[vector("pkt_size-1 bytes", &payload)]).unwrap();

        assert!(results[0].matched());
        assert_eq!(results[0].actual(), payload.as_slice());
    }

    #[test]
    fn test_default_vectors_all_match_in_order() {
        let vectors = default_vectors(mtu());
        let mut transport = MockTransport::new();
        let mut tester = EchoTester::new(&mut transport, mtu());

        let results = tester.run_all(&vectors).unwrap();

        assert_eq!(results.len(), vectors.len());
        for (result, vector) in results.iter().zip(&vectors) {
            assert_eq!(result.name(), vector.name());
            assert_eq!(result.expected(), vector.payload());
            assert!(result.matched(), "{} did not match", vector.name());
        }
        assert_eq!(transport.writes(), vectors.len());
        assert_eq!(transport.reads(), vectors.len());
        assert!(transport.read_sizes().iter().all(|n| *n == PACKET_SIZE));
    }
}

mod discrepancies {
    use super::*;

    #[test]
    fn test_longer_reply_reported() {
        let mut transport =
            MockTransport::with_script(vec![Exchange::Reply(b"Hello USB!!".to_vec())]);
        let mut tester = EchoTester::new(&mut transport, mtu());

        let results = tester.run_all(&[vector("Text", b"Hello USB!")]).unwrap();

        assert!(!results[0].matched());
        assert_eq!(results[0].expected(), b"Hello USB!");
        assert_eq!(results[0].actual(), b"Hello USB!!");
    }

    #[test]
    fn test_shorter_reply_reported() {
        let mut transport = MockTransport::with_script(vec![Exchange::Reply(b"ABC".to_vec())]);
        let mut tester = EchoTester::new(&mut transport, mtu());

        let results = tester
            .run_all(&[vector("String with NULL", b"ABC\x00DEF")])
            .unwrap();

        assert!(!results[0].matched());
        assert_eq!(results[0].actual(), b"ABC");
    }

    #[test]
    fn test_corrupted_reply_reported() {
        let mut transport =
            MockTransport::with_script(vec![Exchange::Reply(b"1234567891".to_vec())]);
        let mut tester = EchoTester::new(&mut transport, mtu());

        let results = tester.run_all(&[vector("Digits", b"1234567890")]).unwrap();

        assert!(!results[0].matched());
        assert_eq!(results[0].actual(), b"1234567891");
    }

    #[test]
    fn test_mismatch_does_not_stop_run() {
        let mut transport = MockTransport::with_script(vec![
            Exchange::Echo,
            Exchange::Reply(Vec::new()),
            Exchange::Echo,
        ]);
        let mut tester = EchoTester::new(&mut transport, mtu());

        let results = tester
            .run_all(&[vector("a", b"one"), vector("b", b"two"), vector("c", b"three")])
            .unwrap();

        let matched: Vec<bool> = results.iter().map(|r| r.matched()).collect();
        assert_eq!(matched, vec![true, false, true]);
    }

    #[test]
    fn test_reply_truncated_by_transfer_unit() {
        // A peer that only returns one packet for an oversized payload
        let payload = vec![b'B'; PACKET_SIZE + 8];
        let mut transport = MockTransport::new();
        let mut tester = EchoTester::new(&mut transport, mtu());

        let results = tester.run_all(&[vector("oversized", &payload)]).unwrap();

        assert!(!results[0].matched());
        assert_eq!(results[0].expected().len(), PACKET_SIZE + 8);
        assert_eq!(results[0].actual().len(), PACKET_SIZE);
    }
}

mod faults {
    use super::*;

    #[test]
    fn test_short_write_fails_without_read() {
        let mut transport = MockTransport::with_script(vec![Exchange::Echo, Exchange::ShortWrite(4)]);
        let mut tester = EchoTester::new(&mut transport, mtu());

        let err = tester
            .run_all(&[vector("a", b"first"), vector("b", b"1234567890")])
            .unwrap_err();

        assert!(matches!(
            err,
            Error::ShortWrite {
                written: 4,
                expected: 10
            }
        ));
        assert_eq!(transport.writes(), 2);
        assert_eq!(transport.reads(), 1);
    }

    #[test]
    fn test_stall_on_third_of_five_aborts() {
        let vectors = [
            vector("1", b"one"),
            vector("2", b"two"),
            vector("3", b"three"),
            vector("4", b"four"),
            vector("5", b"five"),
        ];
        let mut transport = MockTransport::with_script(vec![
            Exchange::Echo,
            Exchange::Echo,
            Exchange::ReadFault(rusb::Error::Pipe),
        ]);
        let mut tester = EchoTester::new(&mut transport, mtu());

        let mut reported = Vec::new();
        let err = tester
            .run_all_with(&vectors, |r| reported.push(r.name().to_string()))
            .unwrap_err();

        assert!(matches!(err, Error::Transport(rusb::Error::Pipe)));
        assert_eq!(reported, vec!["1", "2"]);
        assert_eq!(transport.writes(), 3);
        assert_eq!(transport.reads(), 3);
    }

    #[test]
    fn test_fault_report_names_vector() {
        let vectors = default_vectors(mtu());
        let mut transport = MockTransport::with_script(vec![
            Exchange::Echo,
            Exchange::Echo,
            Exchange::ReadFault(rusb::Error::Pipe),
        ]);
        let mut tester = EchoTester::new(&mut transport, mtu());

        let mut completed = 0;
        let result = tester.run_all_with(&vectors, |_| completed += 1);

        assert!(result.is_err());
        assert_eq!(
            aborted_line(&vectors, completed),
            "Vector 'Binary' aborted the run: PING -> b\"\\x00\\x01\\x02\\x03\\x04\""
        );
    }

    #[test]
    fn test_timeout_is_not_retried() {
        let mut transport =
            MockTransport::with_script(vec![Exchange::ReadFault(rusb::Error::Timeout)]);
        let mut tester = EchoTester::new(&mut transport, mtu());

        let err = tester.run_all(&[vector("a", b"x")]).unwrap_err();

        assert!(matches!(err, Error::Transport(rusb::Error::Timeout)));
        assert_eq!(transport.writes(), 1);
        assert_eq!(transport.reads(), 1);
    }

    #[test]
    fn test_fault_exit_codes() {
        let stall = Error::Transport(rusb::Error::Pipe);
        let short = Error::ShortWrite {
            written: 0,
            expected: 1,
        };
        let missing = Error::DeviceNotFound {
            vendor_id: 0x1d6b,
            product_id: 0x0104,
        };
        assert_eq!(missing.exit_code(), 1);
        assert_eq!(stall.exit_code(), 2);
        assert_eq!(short.exit_code(), 2);
    }
}
