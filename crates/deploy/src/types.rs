//! Data types for the deploy flow.

use std::fmt;

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::warn;

/// Event published to the presentation sink during a deploy.
///
/// `Display` renders every event as a single plain status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployEvent {
    /// Phase change or informational line.
    Status { line: String },
    /// One upload finished.
    Progress {
        uploaded: usize,
        total: usize,
        path: String,
    },
    /// The deploy finished and the site is live.
    Completed { url: String },
    /// The deploy failed; `error` explains why.
    Failed { error: String },
}

impl DeployEvent {
    pub fn status(line: impl Into<String>) -> Self {
        DeployEvent::Status { line: line.into() }
    }
}

impl fmt::Display for DeployEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeployEvent::Status { line } => f.write_str(line),
            DeployEvent::Progress {
                uploaded,
                total,
                path,
            } => write!(f, "Uploaded {path} ({uploaded}/{total})"),
            DeployEvent::Completed { url } => write!(f, "Your site has been deployed to: {url}"),
            DeployEvent::Failed { error } => f.write_str(error),
        }
    }
}

/// Hands an event to the presentation sink without waiting.
///
/// A full channel drops the event with a warning, a closed one drops it
/// silently. Deploys never block on the sink.
pub(crate) fn publish(events_tx: &mpsc::Sender<DeployEvent>, event: DeployEvent) {
    match events_tx.try_send(event) {
        Ok(()) | Err(TrySendError::Closed(_)) => {}
        Err(TrySendError::Full(event)) => {
            warn!(event = %event, "event sink full, dropping event");
        }
    }
}

/// Result of a successful deploy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOutcome {
    pub deploy_id: String,
    pub subdomain: String,
    /// Public URL reported by the store after the uploads finished.
    pub url: String,
    /// Number of files in the manifest.
    pub files: usize,
    /// Paths that were uploaded, in path order.
    pub uploaded: Vec<String>,
}
