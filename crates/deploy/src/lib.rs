//! Site deploy pipeline: walk, digest, negotiate, upload, finalize.
//!
//! This crate implements the **business logic** for pushing a directory
//! tree to a content-addressable site store. It has no UI or transport
//! dependencies; the hosting app provides `SiteStore` and `Authenticator`
//! implementations that bridge to its HTTP client.
//!
//! # Pipeline
//!
//! 1. **Walk** — enumerate visible files below the deploy folder
//! 2. **Manifest** — digest every file, keyed by path
//! 3. **Create** — send the manifest, learn which digests are missing
//! 4. **Upload** — push the missing content concurrently, wait for all
//! 5. **Finalize** — fetch the public URL of the site

pub mod auth;
pub mod barrier;
pub mod config;
pub mod deploy;
pub mod error;
pub mod manifest;
pub mod negotiator;
pub mod store;
pub mod tree;
pub mod types;
pub mod walker;

#[cfg(test)]
mod mock;

// Re-export primary types for convenience.
pub use auth::{Authenticator, CredentialSession};
pub use barrier::UploadBarrier;
pub use config::DeployConfig;
pub use deploy::{Collaborators, DeployOrchestrator, DeployTarget, failure_line};
pub use error::DeployError;
pub use manifest::{ContentStore, Manifest, build as build_manifest};
pub use negotiator::{DeployNegotiator, DeploySession};
pub use store::{BoxFuture, SiteStore};
pub use tree::{Node, resolve_deploy_path};
pub use types::{DeployEvent, DeployOutcome};
pub use walker::{FileEntry, Walker, walk};
