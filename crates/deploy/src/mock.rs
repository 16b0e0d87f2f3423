//! Mock collaborators shared by the unit tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use sitedrop_protocol::{
    AuthOptions, CreateSiteRequest, CreateSiteResponse, Credentials, SiteInfo, UploadFileRequest,
    UserIdentity,
};

use crate::auth::Authenticator;
use crate::error::DeployError;
use crate::store::{BoxFuture, SiteStore};

/// Authenticator that hands out a fixed token or a fixed failure.
pub(crate) struct MockAuth {
    token: Option<String>,
    failure: String,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockAuth {
    pub(crate) fn ok(token: &str) -> Self {
        Self {
            token: Some(token.into()),
            failure: String::new(),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn failing(message: &str) -> Self {
        Self {
            token: None,
            failure: message.into(),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn credentials(token: &str) -> Credentials {
        Credentials {
            access_token: token.into(),
            user: UserIdentity {
                id: "user-1".into(),
                email: "dev@example.com".into(),
            },
        }
    }
}

impl Authenticator for MockAuth {
    fn authenticate<'a>(&'a self, _options: &'a AuthOptions) -> BoxFuture<'a, Credentials> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match &self.token {
                Some(token) => Ok(MockAuth::credentials(token)),
                None => Err(DeployError::Transport(self.failure.clone())),
            }
        })
    }
}

/// Site store that records every call.
pub(crate) struct MockStore {
    required: Vec<String>,
    url: String,
    create_error: Mutex<Option<DeployError>>,
    failing_upload: Option<String>,
    pub(crate) creates: Mutex<Vec<CreateSiteRequest>>,
    pub(crate) uploads: Mutex<Vec<UploadFileRequest>>,
    pub(crate) lookups: Mutex<Vec<String>>,
}

impl MockStore {
    pub(crate) fn new(required: Vec<String>) -> Self {
        Self {
            required,
            url: "https://brave-fox.example.com".into(),
            create_error: Mutex::new(None),
            failing_upload: None,
            creates: Mutex::new(Vec::new()),
            uploads: Mutex::new(Vec::new()),
            lookups: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn fail_create(self, err: DeployError) -> Self {
        *self.create_error.lock().unwrap() = Some(err);
        self
    }

    /// Fails the upload whose wire path equals `path`.
    pub(crate) fn fail_upload(mut self, path: &str) -> Self {
        self.failing_upload = Some(path.into());
        self
    }

    pub(crate) fn upload_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .uploads
            .lock()
            .unwrap()
            .iter()
            .map(|u| u.path.clone())
            .collect();
        paths.sort();
        paths
    }

    pub(crate) fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    pub(crate) fn lookup_count(&self) -> usize {
        self.lookups.lock().unwrap().len()
    }
}

impl SiteStore for MockStore {
    fn create_site<'a>(
        &'a self,
        _credentials: &'a Credentials,
        request: &'a CreateSiteRequest,
    ) -> BoxFuture<'a, CreateSiteResponse> {
        Box::pin(async move {
            if let Some(err) = self.create_error.lock().unwrap().take() {
                return Err(err);
            }
            self.creates.lock().unwrap().push(request.clone());
            Ok(CreateSiteResponse {
                deploy_id: "deploy-1".into(),
                subdomain: "brave-fox".into(),
                required: self.required.clone(),
            })
        })
    }

    fn upload_file<'a>(
        &'a self,
        _credentials: &'a Credentials,
        request: UploadFileRequest,
    ) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            tokio::task::yield_now().await;
            if self.failing_upload.as_deref() == Some(request.path.as_str()) {
                return Err(DeployError::Transport(format!(
                    "upload of {} rejected",
                    request.path
                )));
            }
            self.uploads.lock().unwrap().push(request);
            Ok(())
        })
    }

    fn get_site<'a>(
        &'a self,
        _credentials: &'a Credentials,
        subdomain: &'a str,
    ) -> BoxFuture<'a, SiteInfo> {
        Box::pin(async move {
            self.lookups.lock().unwrap().push(subdomain.to_string());
            Ok(SiteInfo {
                id: subdomain.to_string(),
                url: self.url.clone(),
            })
        })
    }
}
