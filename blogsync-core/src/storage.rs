use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::StorageError;
use crate::models::{Blog, Post};
use crate::repository::{BlogRepository, PostRepository};

#[derive(Debug, Clone, Default)]
pub(crate) struct Collections {
    pub(crate) blogs: Vec<Blog>,
    pub(crate) posts: Vec<Post>,
}

impl Collections {
    pub(crate) fn upsert_blog(&mut self, blog: &Blog) {
        upsert(&mut self.blogs, blog.clone(), |existing| existing.id == blog.id);
    }

    pub(crate) fn upsert_post(&mut self, post: &Post) -> Result<(), StorageError> {
        self.ensure_blog_exists(&post.blog_id)?;
        upsert(&mut self.posts, post.clone(), |existing| existing.id == post.id);
        Ok(())
    }

    /// Posts may only be stored for a blog that exists.
    pub(crate) fn ensure_blog_exists(&self, blog_id: &str) -> Result<(), StorageError> {
        if self.blogs.iter().any(|blog| blog.id == blog_id) {
            Ok(())
        } else {
            Err(StorageError::NotFound {
                entity: "blog",
                id: blog_id.to_owned(),
            })
        }
    }

    pub(crate) fn blog_by_feed_url(&self, feed_url: &str) -> Option<Blog> {
        self.blogs
            .iter()
            .find(|blog| blog.feed_url == feed_url)
            .cloned()
    }

    pub(crate) fn posts_by_blog_id(&self, blog_id: &str) -> Vec<Post> {
        self.posts
            .iter()
            .filter(|post| post.blog_id == blog_id)
            .cloned()
            .collect()
    }
}

// Replaces the matching item in place, or appends.
pub(crate) fn upsert<T>(items: &mut Vec<T>, item: T, matches: impl Fn(&T) -> bool) {
    match items.iter_mut().find(|existing| matches(existing)) {
        Some(slot) => *slot = item,
        None => items.push(item),
    }
}

/// Process-local blog and post storage. Clones share the same collections.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Collections>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn blog_count(&self) -> usize {
        self.inner.read().await.blogs.len()
    }

    pub async fn post_count(&self) -> usize {
        self.inner.read().await.posts.len()
    }
}

#[async_trait]
impl BlogRepository for MemoryStore {
    async fn list(&self) -> Result<Vec<Blog>, StorageError> {
        Ok(self.inner.read().await.blogs.clone())
    }

    async fn read_by_feed_url(&self, feed_url: &str) -> Result<Option<Blog>, StorageError> {
        Ok(self.inner.read().await.blog_by_feed_url(feed_url))
    }

    async fn create_or_update(&self, blog: &Blog) -> Result<(), StorageError> {
        debug!(blog_id = %blog.id, feed_url = %blog.feed_url, "upserting blog");
        self.inner.write().await.upsert_blog(blog);
        Ok(())
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn list_by_blog_id(&self, blog_id: &str) -> Result<Vec<Post>, StorageError> {
        Ok(self.inner.read().await.posts_by_blog_id(blog_id))
    }

    async fn create_or_update(&self, post: &Post) -> Result<(), StorageError> {
        self.inner.write().await.upsert_post(post)
    }
}
