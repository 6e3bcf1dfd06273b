//! Common utilities

use xxhash_rust::xxh3::xxh3_64;

/// Stable content fingerprint (xxh3, 16 hex digits)
pub fn fingerprint(data: &[u8]) -> String {
    format!("{:016x}", xxh3_64(data))
}

/// Decode file bytes as UTF-8, replacing invalid sequences
///
/// Returns the text and whether any replacement happened.
pub fn decode_lossy(bytes: Vec<u8>) -> (String, bool) {
    match String::from_utf8(bytes) {
        Ok(text) => (text, false),
        Err(err) => (String::from_utf8_lossy(err.as_bytes()).into_owned(), true),
    }
}
