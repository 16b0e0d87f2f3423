//! Join barrier for the uploads of one deploy.

use futures_util::future::try_join_all;

use crate::error::DeployError;
use crate::store::BoxFuture;

/// Collects pending uploads and waits for all of them.
///
/// The barrier resolves once every upload has completed. The first failure
/// resolves it immediately with that error and drops the uploads still in
/// flight.
#[derive(Default)]
pub struct UploadBarrier<'a> {
    pending: Vec<BoxFuture<'a, ()>>,
}

impl<'a> UploadBarrier<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an upload. Nothing is polled until [`wait`](Self::wait).
    pub fn push(&mut self, upload: BoxFuture<'a, ()>) {
        self.pending.push(upload);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drives all uploads concurrently on the current task.
    ///
    /// Returns the number of completed uploads. An empty barrier resolves
    /// immediately.
    pub async fn wait(self) -> Result<usize, DeployError> {
        if self.pending.is_empty() {
            return Ok(0);
        }
        let done = try_join_all(self.pending).await?;
        Ok(done.len())
    }
}
