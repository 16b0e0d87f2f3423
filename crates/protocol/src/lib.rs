pub mod messages;
pub mod types;

// Re-export primary types for convenience.
pub use messages::{CreateSiteRequest, CreateSiteResponse, UploadFileRequest};
pub use types::{AuthOptions, Credentials, SiteInfo, UserIdentity};
