use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

/// Creates a site from a manifest of `path -> digest`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSiteRequest {
    pub files: BTreeMap<String, String>,
}

/// Uploads the content of one file into a deploy.
///
/// The `content` field is base64-encoded in JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadFileRequest {
    pub deploy_id: String,
    pub path: String,
    #[serde(with = "base64_bytes")]
    pub content: Vec<u8>,
}

impl UploadFileRequest {
    /// Builds a request for a manifest-relative path.
    ///
    /// The remote addresses files from the site root, so the path is
    /// rendered with a single leading `/`.
    pub fn new(deploy_id: impl Into<String>, path: &str, content: &[u8]) -> Self {
        Self {
            deploy_id: deploy_id.into(),
            path: format!("/{}", path.trim_start_matches('/')),
            content: content.to_vec(),
        }
    }
}

// ---------------------------------------------------------------------------
// Response payloads
// ---------------------------------------------------------------------------

/// Response to [`CreateSiteRequest`].
///
/// `required` lists the digests the remote does not hold yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSiteResponse {
    pub deploy_id: String,
    pub subdomain: String,
    #[serde(default)]
    pub required: Vec<String>,
}

mod base64_bytes {
    use base64::{Engine, engine::general_purpose::STANDARD};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        STANDARD.encode(data).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}
