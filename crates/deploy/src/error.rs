//! Deploy error types.

/// Errors produced during a site deploy.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("duplicate path in manifest: {0}")]
    DuplicatePath(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("precondition failed: {0}")]
    Precondition(String),

    #[error("cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("transfer error: {0}")]
    Transfer(#[from] sitedrop_transfer::TransferError),
}
