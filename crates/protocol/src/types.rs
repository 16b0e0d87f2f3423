use serde::{Deserialize, Serialize};

/// Options passed to the auth collaborator for a login handshake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthOptions {
    /// Site the access token is requested for.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub site_id: String,
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_scope")]
    pub scope: String,
    #[serde(default = "default_login")]
    pub login: bool,
}

fn default_provider() -> String {
    "github".into()
}

fn default_scope() -> String {
    "user".into()
}

fn default_login() -> bool {
    true
}

impl Default for AuthOptions {
    fn default() -> Self {
        Self {
            site_id: String::new(),
            provider: default_provider(),
            scope: default_scope(),
            login: default_login(),
        }
    }
}

/// The user an access token belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,
}

/// Reusable credentials produced by a successful handshake.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub access_token: String,
    pub user: UserIdentity,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}

/// Public descriptor of a deployed site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteInfo {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub url: String,
}
