//! Content digests and upload path validation.
//!
//! The digest is the identity the remote store uses to decide which files it
//! already holds, so it must stay stable across runs and platforms.

mod digest;
mod validation;

pub use digest::{DIGEST_HEX_LEN, digest, is_digest};
pub use validation::validate_upload_path;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("invalid path: {0}")]
    InvalidPath(String),
}
