//! Credential acquisition and reuse.
//!
//! A [`CredentialSession`] owns the cached credentials for as long as the
//! caller keeps it alive. The first deploy authenticates through the
//! [`Authenticator`]; later deploys reuse the cached token until the
//! session is invalidated.

use sitedrop_protocol::{AuthOptions, Credentials};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::DeployError;
use crate::store::BoxFuture;

/// Auth collaborator: one round trip producing a reusable access token.
pub trait Authenticator: Send + Sync {
    fn authenticate<'a>(&'a self, options: &'a AuthOptions) -> BoxFuture<'a, Credentials>;
}

/// Authenticate-once credential cache.
///
/// Handshakes are serialized: if two deploys race before the first
/// success, the second waits and then reuses the result.
#[derive(Default)]
pub struct CredentialSession {
    cached: Mutex<Option<Credentials>>,
}

impl CredentialSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session that already holds credentials.
    pub fn with_credentials(credentials: Credentials) -> Self {
        Self {
            cached: Mutex::new(Some(credentials)),
        }
    }

    /// Returns cached credentials, authenticating first if there are none.
    ///
    /// Any failure from the authenticator is reported as
    /// [`DeployError::Auth`] and leaves the session empty.
    pub async fn credentials(
        &self,
        auth: &dyn Authenticator,
        options: &AuthOptions,
    ) -> Result<Credentials, DeployError> {
        let mut cached = self.cached.lock().await;
        if let Some(creds) = cached.as_ref() {
            debug!(user = %creds.user.id, "reusing cached credentials");
            return Ok(creds.clone());
        }

        match auth.authenticate(options).await {
            Ok(creds) => {
                info!(user = %creds.user.id, provider = %options.provider, "authenticated");
                *cached = Some(creds.clone());
                Ok(creds)
            }
            Err(e) => {
                warn!(error = %e, "authentication failed");
                *cached = None;
                Err(match e {
                    DeployError::Auth(_) => e,
                    other => DeployError::Auth(other.to_string()),
                })
            }
        }
    }

    /// Drops cached credentials so the next deploy authenticates again.
    pub async fn invalidate(&self) {
        if self.cached.lock().await.take().is_some() {
            debug!("credentials invalidated");
        }
    }

    pub async fn is_authenticated(&self) -> bool {
        self.cached.lock().await.is_some()
    }
}
