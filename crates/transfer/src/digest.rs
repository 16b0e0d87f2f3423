use sha2::{Digest, Sha256};

/// Length of a digest string: SHA-256 rendered as lowercase hex.
pub const DIGEST_HEX_LEN: usize = 64;

/// Computes SHA-256 of `content` and returns the hex-encoded digest.
pub fn digest(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}

/// Returns true if `s` has the shape of a digest produced by this crate.
pub fn is_digest(s: &str) -> bool {
    s.len() == DIGEST_HEX_LEN && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
