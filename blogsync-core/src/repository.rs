use async_trait::async_trait;

use crate::error::StorageError;
use crate::models::{Blog, Post};

/// Blog storage consumed by the sync engine.
///
/// `create_or_update` is an upsert keyed by [`Blog::id`]. Implementations
/// must be safe to share between concurrently running syncs.
#[async_trait]
pub trait BlogRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Blog>, StorageError>;
    async fn read_by_feed_url(&self, feed_url: &str) -> Result<Option<Blog>, StorageError>;
    async fn create_or_update(&self, blog: &Blog) -> Result<(), StorageError>;
}

/// Post storage consumed by the sync engine. Upserts are keyed by [`Post::id`].
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn list_by_blog_id(&self, blog_id: &str) -> Result<Vec<Post>, StorageError>;
    async fn create_or_update(&self, post: &Post) -> Result<(), StorageError>;
}
