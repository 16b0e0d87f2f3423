//! Remote store collaborator.
//!
//! `SiteStore` is implemented by the hosting application on top of its
//! HTTP client. Keeping it a trait leaves the deploy logic decoupled from
//! transport and testable with mocks.

use std::future::Future;
use std::pin::Pin;

use sitedrop_protocol::{CreateSiteRequest, CreateSiteResponse, Credentials, SiteInfo, UploadFileRequest};

use crate::error::DeployError;

/// Boxed future returned by collaborator calls.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, DeployError>> + Send + 'a>>;

/// Abstract content-addressable site store.
///
/// Implementations report network and HTTP failures as
/// [`DeployError::Transport`] and rejected credentials as
/// [`DeployError::Auth`]. Retries, if any, happen inside the implementation.
pub trait SiteStore: Send + Sync {
    /// Registers a new deploy for the given manifest.
    ///
    /// The response lists the digests the store does not hold yet.
    fn create_site<'a>(
        &'a self,
        credentials: &'a Credentials,
        request: &'a CreateSiteRequest,
    ) -> BoxFuture<'a, CreateSiteResponse>;

    /// Uploads the content of one file into a deploy.
    fn upload_file<'a>(
        &'a self,
        credentials: &'a Credentials,
        request: UploadFileRequest,
    ) -> BoxFuture<'a, ()>;

    /// Fetches the public descriptor of a site.
    fn get_site<'a>(
        &'a self,
        credentials: &'a Credentials,
        subdomain: &'a str,
    ) -> BoxFuture<'a, SiteInfo>;
}
