//! Token verification and random name material
//!
//! - Constant-time comparison for the shared upload token
//! - OS-backed random hex strings for stored file names

use rand::{rngs::OsRng, RngCore};

/// Number of random bytes behind each generated file name (16 hex chars).
pub const NAME_BYTES: usize = 8;

/// Check a caller-supplied token against the configured secret.
///
/// An empty token never verifies, even against an empty secret.
pub fn verify_token(expected: &str, provided: &str) -> bool {
    if provided.is_empty() {
        return false;
    }
    constant_time_compare(expected.as_bytes(), provided.as_bytes())
}

/// Constant-time byte comparison
///
/// Returns `false` if lengths differ, but still walks `max(len1, len2)` bytes.
pub fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    let max_len = std::cmp::max(a.len(), b.len());
    let mut diff = (a.len() != b.len()) as u8;
    for i in 0..max_len {
        let byte_a = a.get(i).copied().unwrap_or(0);
        let byte_b = b.get(i).copied().unwrap_or(0);
        diff |= byte_a ^ byte_b;
    }
    diff == 0
}

/// Lowercase hex encoding of [`NAME_BYTES`] bytes from the OS random source.
pub fn random_hex_name() -> String {
    let mut bytes = [0u8; NAME_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare(b"hello", b"hello"));
        assert!(!constant_time_compare(b"hello", b"world"));
        assert!(!constant_time_compare(b"hello", b"hello!"));
        assert!(!constant_time_compare(b"", b"a"));
        assert!(constant_time_compare(b"", b""));
    }

    #[test]
    fn test_prefix_does_not_verify() {
        // trailing NUL padding must not make a shorter token match
        assert!(!constant_time_compare(b"secret\0", b"secret"));
    }

    #[test]
    fn test_verify_token() {
        assert!(verify_token("changeme", "changeme"));
        assert!(!verify_token("changeme", "changeMe"));
        assert!(!verify_token("changeme", ""));
        assert!(!verify_token("", ""));
    }

    #[test]
    fn test_random_hex_name() {
        let name = random_hex_name();
        assert_eq!(name.len(), 16);
        assert!(name.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(name, random_hex_name());
    }
}
