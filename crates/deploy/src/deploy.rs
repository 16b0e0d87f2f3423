//! Deploy orchestrator.
//!
//! Drives one folder through walk, manifest, authentication and
//! negotiation, and publishes status lines for the presentation sink.

use sitedrop_protocol::Credentials;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::auth::{Authenticator, CredentialSession};
use crate::config::DeployConfig;
use crate::error::DeployError;
use crate::manifest::build;
use crate::negotiator::DeployNegotiator;
use crate::store::SiteStore;
use crate::tree::{Node, resolve_deploy_path};
use crate::types::{DeployEvent, DeployOutcome, publish};
use crate::walker::walk;

/// What to deploy: a folder of a directory tree, relative to `cwd`.
#[derive(Debug, Clone, Copy)]
pub struct DeployTarget<'a> {
    pub tree: &'a Node,
    pub cwd: &'a str,
    pub folder: Option<&'a str>,
}

/// External collaborators used by a deploy.
pub struct Collaborators<'a> {
    pub session: &'a CredentialSession,
    pub auth: &'a dyn Authenticator,
    pub store: &'a dyn SiteStore,
}

/// Orchestrates site deploys and publishes their events.
pub struct DeployOrchestrator {
    config: DeployConfig,
    events_tx: mpsc::Sender<DeployEvent>,
    events_rx: Option<mpsc::Receiver<DeployEvent>>,
    cancel: CancellationToken,
}

impl Default for DeployOrchestrator {
    fn default() -> Self {
        Self::new(DeployConfig::default())
    }
}

impl DeployOrchestrator {
    /// Creates a new orchestrator.
    pub fn new(config: DeployConfig) -> Self {
        let (events_tx, events_rx) = mpsc::channel(config.event_buffer.max(1));
        Self {
            config,
            events_tx,
            events_rx: Some(events_rx),
            cancel: CancellationToken::new(),
        }
    }

    /// Takes the event receiver. Can only be called once.
    ///
    /// Events are published without waiting; once the channel is full,
    /// further events are dropped until the receiver catches up.
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<DeployEvent>> {
        self.events_rx.take()
    }

    /// Returns a cancellation token for deploys run by this orchestrator.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Deploys `target` and returns where the site ended up.
    ///
    /// Every failure is published as exactly one [`DeployEvent::Failed`]
    /// before being returned. An auth failure, whether from the handshake
    /// or from the store rejecting the token, clears the cached
    /// credentials.
    pub async fn deploy(
        &self,
        target: DeployTarget<'_>,
        collaborators: Collaborators<'_>,
    ) -> Result<DeployOutcome, DeployError> {
        let shown = match target.folder {
            Some(f) if !f.trim().is_empty() => f,
            _ => target.cwd,
        };
        self.emit(DeployEvent::status(format!("Deploying folder {shown}")));

        match self.run(target, &collaborators).await {
            Ok(outcome) => {
                info!(
                    deploy_id = %outcome.deploy_id,
                    url = %outcome.url,
                    uploaded = outcome.uploaded.len(),
                    "deploy completed"
                );
                self.emit(DeployEvent::Completed {
                    url: outcome.url.clone(),
                });
                Ok(outcome)
            }
            Err(e) => {
                if matches!(e, DeployError::Auth(_)) {
                    collaborators.session.invalidate().await;
                }
                error!(error = %e, "deploy failed");
                self.emit(DeployEvent::Failed {
                    error: failure_line(&e),
                });
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        target: DeployTarget<'_>,
        collaborators: &Collaborators<'_>,
    ) -> Result<DeployOutcome, DeployError> {
        let path = resolve_deploy_path(target.cwd, target.folder);
        let (manifest, contents) = build(walk(target.tree, &path)?)?;

        let credentials: Credentials = collaborators
            .session
            .credentials(collaborators.auth, &self.config.auth)
            .await?;

        DeployNegotiator::new(collaborators.store, self.cancel.clone())
            .negotiate(&manifest, &contents, &credentials, &self.events_tx)
            .await
    }

    fn emit(&self, event: DeployEvent) {
        publish(&self.events_tx, event);
    }
}

/// Renders an error as the single status line shown to the user.
pub fn failure_line(err: &DeployError) -> String {
    match err {
        DeployError::Auth(msg) => format!("Authentication failed: {msg}"),
        DeployError::NotFound(msg) => format!("Nothing to deploy: {msg}"),
        other => format!("Deploy failed: {other}"),
    }
}
