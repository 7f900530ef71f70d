//! Operator-facing report lines

use crate::tester::{TestResult, TestVector};

/// Render bytes as an escaped byte-string literal, e.g. `b"ABC\x00DEF"`
pub fn format_bytes(bytes: &[u8]) -> String {
    format!("b\"{}\"", bytes.escape_ascii())
}

/// `PING -> <sent> -> PONG <received>`
pub fn exchange_line(result: &TestResult) -> String {
    format!(
        "PING -> {} -> PONG {}",
        format_bytes(result.expected()),
        format_bytes(result.actual())
    )
}

/// Diagnostic line for a reply that did not match, `None` on a match
pub fn mismatch_line(result: &TestResult) -> Option<String> {
    (!result.matched()).then(|| format!("ERROR: Mismatch in {} test.", result.name()))
}

/// Names the vector whose exchange faulted, given how many completed first
pub fn aborted_line(vectors: &[TestVector], completed: usize) -> String {
    match vectors.get(completed) {
        Some(vector) => format!(
            "Vector '{}' aborted the run: PING -> {}",
            vector.name(),
            format_bytes(vector.payload())
        ),
        None => format!("Run aborted after {} vectors", completed),
    }
}

pub fn summary_line(results: &[TestResult]) -> String {
    let matched = results.iter().filter(|r| r.matched()).count();
    format!("{}/{} vectors echoed intact", matched, results.len())
}
