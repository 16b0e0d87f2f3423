//! Deploy negotiation: create, upload the missing content, finalize.
//!
//! The store decides which digests it is missing. The negotiator resolves
//! those digests back to paths, uploads every matching path concurrently
//! behind an [`UploadBarrier`], and only then asks for the site URL.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use sitedrop_protocol::{CreateSiteResponse, Credentials, UploadFileRequest};
use sitedrop_transfer::is_digest;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::barrier::UploadBarrier;
use crate::error::DeployError;
use crate::manifest::{ContentStore, Manifest};
use crate::store::SiteStore;
use crate::types::{DeployEvent, DeployOutcome, publish};

/// State of one deploy between Create and Finalize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploySession {
    pub deploy_id: String,
    pub subdomain: String,
    pub required: BTreeSet<String>,
}

impl From<CreateSiteResponse> for DeploySession {
    fn from(resp: CreateSiteResponse) -> Self {
        Self {
            deploy_id: resp.deploy_id,
            subdomain: resp.subdomain,
            required: resp.required.into_iter().collect(),
        }
    }
}

impl DeploySession {
    /// Resolves every required digest to the paths that carry it.
    ///
    /// Paths sharing a digest are all returned. A required digest with no
    /// matching path or content fails with [`DeployError::Precondition`].
    pub fn plan_uploads<'m>(
        &self,
        manifest: &'m Manifest,
        contents: &'m ContentStore,
    ) -> Result<Vec<(&'m str, &'m [u8])>, DeployError> {
        let mut plan = Vec::new();

        for digest in &self.required {
            if !is_digest(digest) {
                warn!(deploy_id = %self.deploy_id, digest = %digest, "malformed digest in required set");
            }

            let mut matched = false;
            for path in manifest.paths_for_digest(digest) {
                let content = contents.get(path).ok_or_else(|| {
                    DeployError::Precondition(format!("no content recorded for {path}"))
                })?;
                plan.push((path, content));
                matched = true;
            }

            if !matched {
                return Err(DeployError::Precondition(format!(
                    "remote requested digest {digest} which no file declares"
                )));
            }
        }

        plan.sort_by(|a, b| a.0.cmp(b.0));
        Ok(plan)
    }
}

/// Runs the create/upload/finalize sequence against a [`SiteStore`].
pub struct DeployNegotiator<'a> {
    store: &'a dyn SiteStore,
    cancel: CancellationToken,
}

impl<'a> DeployNegotiator<'a> {
    pub fn new(store: &'a dyn SiteStore, cancel: CancellationToken) -> Self {
        Self { store, cancel }
    }

    /// Negotiates a deploy for `manifest`.
    ///
    /// 1. Create: send the manifest, receive the required digests.
    /// 2. Upload: one upload per path whose digest is required, all at once.
    /// 3. Finalize: after every upload succeeded, fetch the site URL.
    ///
    /// Any failure aborts the deploy; nothing is retried here.
    pub async fn negotiate(
        &self,
        manifest: &Manifest,
        contents: &ContentStore,
        credentials: &Credentials,
        events_tx: &mpsc::Sender<DeployEvent>,
    ) -> Result<DeployOutcome, DeployError> {
        // 1. Create
        self.check_cancelled()?;
        publish(events_tx, DeployEvent::status("Creating new site"));

        let request = manifest.to_request();
        let response = self.store.create_site(credentials, &request).await?;
        let session = DeploySession::from(response);

        info!(
            deploy_id = %session.deploy_id,
            subdomain = %session.subdomain,
            files = manifest.len(),
            required = session.required.len(),
            "site created"
        );

        let plan = session.plan_uploads(manifest, contents)?;

        // 2. Upload
        publish(events_tx, DeployEvent::status("Uploading files"));

        let total = plan.len();
        let completed = AtomicUsize::new(0);
        let mut barrier = UploadBarrier::new();
        for &(path, content) in &plan {
            barrier.push(Box::pin(self.upload_one(
                credentials,
                &session.deploy_id,
                path,
                content,
                total,
                &completed,
                events_tx,
            )));
        }
        barrier.wait().await?;

        debug!(deploy_id = %session.deploy_id, uploaded = total, "all uploads finished");

        // 3. Finalize
        let site = self.store.get_site(credentials, &session.subdomain).await?;

        Ok(DeployOutcome {
            deploy_id: session.deploy_id,
            subdomain: session.subdomain,
            url: site.url,
            files: manifest.len(),
            uploaded: plan.iter().map(|(path, _)| path.to_string()).collect(),
        })
    }

    #[allow(clippy::too_many_arguments)]
    async fn upload_one(
        &self,
        credentials: &Credentials,
        deploy_id: &str,
        path: &str,
        content: &[u8],
        total: usize,
        completed: &AtomicUsize,
        events_tx: &mpsc::Sender<DeployEvent>,
    ) -> Result<(), DeployError> {
        self.check_cancelled()?;

        let request = UploadFileRequest::new(deploy_id, path, content);
        self.store.upload_file(credentials, request).await?;

        let uploaded = completed.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(deploy_id = %deploy_id, path = %path, bytes = content.len(), "uploaded");

        publish(
            events_tx,
            DeployEvent::Progress {
                uploaded,
                total,
                path: path.to_string(),
            },
        );
        Ok(())
    }

    fn check_cancelled(&self) -> Result<(), DeployError> {
        if self.cancel.is_cancelled() {
            Err(DeployError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::build;
    use crate::mock::{MockAuth, MockStore};
    use crate::tree::Node;
    use crate::walker::walk;
    use sitedrop_transfer::digest;

    fn sample() -> (Manifest, ContentStore) {
        let tree = Node::dir([
            ("a.txt", Node::file("hi")),
            ("sub", Node::dir([("b.txt", Node::file("yo"))])),
            (".hidden", Node::file("x")),
        ]);
        build(walk(&tree, "").unwrap()).unwrap()
    }

    async fn run(
        store: &MockStore,
        manifest: &Manifest,
        contents: &ContentStore,
    ) -> (Result<DeployOutcome, DeployError>, Vec<DeployEvent>) {
        let (tx, mut rx) = mpsc::channel(64);
        let creds = MockAuth::credentials("tok");
        let negotiator = DeployNegotiator::new(store, CancellationToken::new());
        let result = negotiator.negotiate(manifest, contents, &creds, &tx).await;
        drop(tx);
        let mut events = Vec::new();
        while let Some(e) = rx.recv().await {
            events.push(e);
        }
        (result, events)
    }

    #[tokio::test]
    async fn uploads_only_required_paths() {
        let (manifest, contents) = sample();
        let store = MockStore::new(vec![digest(b"yo")]);

        let (result, _) = run(&store, &manifest, &contents).await;
        let outcome = result.unwrap();

        let uploads = store.uploads.lock().unwrap();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].path, "/sub/b.txt");
        assert_eq!(uploads[0].content, b"yo");
        assert_eq!(uploads[0].deploy_id, "deploy-1");
        assert_eq!(outcome.uploaded, vec!["sub/b.txt".to_string()]);
        assert_eq!(outcome.files, 2);
    }

    #[tokio::test]
    async fn create_receives_full_manifest() {
        let (manifest, contents) = sample();
        let store = MockStore::new(Vec::new());

        run(&store, &manifest, &contents).await.0.unwrap();

        let creates = store.creates.lock().unwrap();
        assert_eq!(creates.len(), 1);
        assert_eq!(creates[0].files.len(), 2);
        assert_eq!(creates[0].files.get("a.txt"), Some(&digest(b"hi")));
        assert_eq!(creates[0].files.get("sub/b.txt"), Some(&digest(b"yo")));
    }

    #[tokio::test]
    async fn empty_required_still_finalizes() {
        let (manifest, contents) = sample();
        let store = MockStore::new(Vec::new());

        let (result, events) = run(&store, &manifest, &contents).await;
        let outcome = result.unwrap();

        assert_eq!(store.upload_count(), 0);
        assert_eq!(store.lookup_count(), 1);
        assert_eq!(outcome.url, "https://brave-fox.example.com");
        assert!(outcome.uploaded.is_empty());
        assert!(!events.iter().any(|e| matches!(e, DeployEvent::Progress { .. })));
    }

    #[tokio::test]
    async fn unknown_required_digest_fails_before_uploading() {
        let (manifest, contents) = sample();
        let store = MockStore::new(vec![digest(b"yo"), digest(b"never declared")]);

        let (result, events) = run(&store, &manifest, &contents).await;

        assert!(matches!(result, Err(DeployError::Precondition(_))));
        assert_eq!(store.upload_count(), 0);
        assert_eq!(store.lookup_count(), 0);
        assert!(!events.contains(&DeployEvent::status("Uploading files")));
    }

    #[tokio::test]
    async fn create_failure_skips_uploads() {
        let (manifest, contents) = sample();
        let store = MockStore::new(vec![digest(b"hi")])
            .fail_create(DeployError::Transport("connection refused".into()));

        let (result, _) = run(&store, &manifest, &contents).await;

        assert!(matches!(result, Err(DeployError::Transport(_))));
        assert_eq!(store.upload_count(), 0);
        assert_eq!(store.lookup_count(), 0);
    }

    #[tokio::test]
    async fn one_failed_upload_fails_the_deploy() {
        let tree = Node::dir([
            ("one.txt", Node::file("1")),
            ("two.txt", Node::file("2")),
            ("three.txt", Node::file("3")),
        ]);
        let (manifest, contents) = build(walk(&tree, "").unwrap()).unwrap();
        let store = MockStore::new(vec![digest(b"1"), digest(b"2"), digest(b"3")])
            .fail_upload("/two.txt");

        let (result, _) = run(&store, &manifest, &contents).await;

        assert!(matches!(result, Err(DeployError::Transport(ref m)) if m.contains("/two.txt")));
        assert_eq!(store.lookup_count(), 0, "finalize must not run after a failed upload");
    }

    #[tokio::test]
    async fn duplicate_content_uploads_every_path() {
        let tree = Node::dir([
            ("a.txt", Node::file("same")),
            ("copy", Node::dir([("a.txt", Node::file("same"))])),
            ("other.txt", Node::file("different")),
        ]);
        let (manifest, contents) = build(walk(&tree, "").unwrap()).unwrap();
        let store = MockStore::new(vec![digest(b"same")]);

        let outcome = run(&store, &manifest, &contents).await.0.unwrap();

        assert_eq!(store.upload_paths(), vec!["/a.txt", "/copy/a.txt"]);
        assert_eq!(outcome.uploaded, vec!["a.txt", "copy/a.txt"]);
    }

    #[tokio::test]
    async fn repeated_required_digest_uploads_once_per_path() {
        let (manifest, contents) = sample();
        let store = MockStore::new(vec![digest(b"hi"), digest(b"hi")]);

        run(&store, &manifest, &contents).await.0.unwrap();
        assert_eq!(store.upload_paths(), vec!["/a.txt"]);
    }

    #[tokio::test]
    async fn progress_reports_every_upload() {
        let (manifest, contents) = sample();
        let store = MockStore::new(vec![digest(b"hi"), digest(b"yo")]);

        let (result, events) = run(&store, &manifest, &contents).await;
        result.unwrap();

        let mut progress: Vec<usize> = events
            .iter()
            .filter_map(|e| match e {
                DeployEvent::Progress { uploaded, total, .. } => {
                    assert_eq!(*total, 2);
                    Some(*uploaded)
                }
                _ => None,
            })
            .collect();
        progress.sort();
        assert_eq!(progress, vec![1, 2]);
        assert_eq!(events[0], DeployEvent::status("Creating new site"));
        assert_eq!(events[1], DeployEvent::status("Uploading files"));
    }

    #[tokio::test]
    async fn cancelled_before_create() {
        let (manifest, contents) = sample();
        let store = MockStore::new(Vec::new());
        let (tx, _rx) = mpsc::channel(8);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let negotiator = DeployNegotiator::new(&store, cancel);
        let result = negotiator
            .negotiate(&manifest, &contents, &MockAuth::credentials("tok"), &tx)
            .await;

        assert!(matches!(result, Err(DeployError::Cancelled)));
        assert!(store.creates.lock().unwrap().is_empty());
    }

    #[test]
    fn plan_sorts_by_path() {
        let (manifest, contents) = sample();
        let session = DeploySession {
            deploy_id: "d".into(),
            subdomain: "s".into(),
            required: [digest(b"yo"), digest(b"hi")].into_iter().collect(),
        };
        let plan = session.plan_uploads(&manifest, &contents).unwrap();
        let paths: Vec<&str> = plan.iter().map(|(p, _)| *p).collect();
        assert_eq!(paths, vec!["a.txt", "sub/b.txt"]);
    }
}
