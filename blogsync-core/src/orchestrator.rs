use tracing::{info, warn};

use crate::error::SyncError;
use crate::syncer::{BlogSyncer, SyncOutcome};

/// A blog whose sync failed during [`SyncOrchestrator::sync_all`].
#[derive(Debug)]
pub struct SyncFailure {
    pub feed_url: String,
    pub error: SyncError,
}

#[derive(Debug, Default)]
pub struct SyncSummary {
    /// Blogs whose feed was fetched, parsed and stored.
    pub synced: usize,
    /// Blogs skipped because their feed was unreachable or unparseable.
    pub skipped: usize,
    pub failures: Vec<SyncFailure>,
}

impl SyncSummary {
    pub fn total(&self) -> usize {
        self.synced + self.skipped + self.failures.len()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Syncs every stored blog concurrently, one task per blog.
///
/// A failing blog never cancels its siblings: each task's error is captured
/// in the [`SyncSummary`] once every task has finished.
#[derive(Clone)]
pub struct SyncOrchestrator {
    syncer: BlogSyncer,
}

impl SyncOrchestrator {
    pub fn new(syncer: BlogSyncer) -> Self {
        Self { syncer }
    }

    /// Returns an error only when the blog list itself cannot be read, in
    /// which case no sync was started.
    pub async fn sync_all(&self) -> Result<SyncSummary, SyncError> {
        let blogs = self.syncer.blogs().list().await?;
        info!(blogs = blogs.len(), "syncing blogs");

        let feed_urls = blogs.into_iter().map(|blog| blog.feed_url);
        let summary = sync_feeds(&self.syncer, feed_urls).await;

        info!(
            synced = summary.synced,
            skipped = summary.skipped,
            failed = summary.failures.len(),
            "finished syncing blogs"
        );
        Ok(summary)
    }

    /// Syncs the given feed urls concurrently, adding blogs that are not
    /// stored yet.
    pub async fn sync_feeds(&self, feed_urls: impl IntoIterator<Item = String>) -> SyncSummary {
        sync_feeds(&self.syncer, feed_urls).await
    }
}

async fn sync_feeds(
    syncer: &BlogSyncer,
    feed_urls: impl IntoIterator<Item = String>,
) -> SyncSummary {
    let handles: Vec<_> = feed_urls
        .into_iter()
        .map(|feed_url| {
            let syncer = syncer.clone();
            let task_url = feed_url.clone();
            let handle = tokio::spawn(async move { syncer.sync(&task_url).await });
            (feed_url, handle)
        })
        .collect();

    let mut summary = SyncSummary::default();
    for (feed_url, handle) in handles {
        let result = match handle.await {
            Ok(result) => result,
            Err(join_err) => Err(SyncError::from(join_err)),
        };

        match result {
            Ok(SyncOutcome::Synced { .. }) => summary.synced += 1,
            Ok(SyncOutcome::Unreachable | SyncOutcome::Unparseable) => summary.skipped += 1,
            Err(error) => {
                warn!(feed_url = %feed_url, error = %error, "failed to sync blog");
                summary.failures.push(SyncFailure { feed_url, error });
            }
        }
    }

    summary
}
