//! Constant-time digest comparison.

use subtle::ConstantTimeEq;

/// Compare two digests in time proportional to their length only.
///
/// Length is not secret, so a length mismatch returns `false` immediately.
/// Otherwise every byte pair is XOR-compared and folded into a `subtle::Choice`
/// without early exit, so the position of the first differing byte does not
/// affect running time.
pub fn secure_compare(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    bool::from(a.ct_eq(b))
}
