use async_trait::async_trait;

use crate::models::FeedBlog;

/// Retrieves the raw body of a feed.
///
/// `None` means "nothing usable right now" (unreachable host, error status,
/// empty body). Ordinary network failures are never reported as errors.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch_feed(&self, feed_url: &str) -> Option<String>;
}

/// Turns a raw feed body into the canonical [`FeedBlog`], or `None` when the
/// body is not a supported feed.
#[async_trait]
pub trait FeedParser: Send + Sync {
    async fn parse_feed(&self, feed_url: &str, raw: &str) -> Option<FeedBlog>;
}
