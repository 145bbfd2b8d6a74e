use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::StorageError;
use crate::models::{Blog, Post};
use crate::repository::{BlogRepository, PostRepository};
use crate::storage::{upsert, Collections};

/// Blog and post storage persisted as `blogs.json` and `posts.json` in a
/// directory.
///
/// Every write goes to a `*.json.tmp` sibling first and is then renamed over
/// the real file, so a crash mid-write leaves the previous snapshot readable.
///
/// Each upsert rewrites the whole collection file under a store-wide lock, so
/// a sync costs I/O proportional to the stored posts for every post written,
/// and concurrent blog syncs queue on that lock. Suited to personal-scale
/// catalogs; larger deployments want a database-backed repository.
#[derive(Debug, Clone)]
pub struct JsonStore {
    inner: Arc<RwLock<Collections>>,
    blogs_path: PathBuf,
    posts_path: PathBuf,
}

impl JsonStore {
    /// Opens the store in `dir`, creating the directory if needed.
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref();
        tokio::fs::create_dir_all(dir).await?;

        let blogs_path = dir.join("blogs.json");
        let posts_path = dir.join("posts.json");

        let collections = Collections {
            blogs: read_json_with_tmp_fallback(&blogs_path).await,
            posts: read_json_with_tmp_fallback(&posts_path).await,
        };
        debug!(
            dir = %dir.display(),
            blogs = collections.blogs.len(),
            posts = collections.posts.len(),
            "opened json store"
        );

        Ok(Self {
            inner: Arc::new(RwLock::new(collections)),
            blogs_path,
            posts_path,
        })
    }
}

/// Reads `path`, then its tmp sibling, keeping the first that decodes.
/// Missing or unreadable files decode to `T::default()`.
async fn read_json_with_tmp_fallback<T: DeserializeOwned + Default>(path: &Path) -> T {
    for candidate in [path.to_path_buf(), tmp_path(path)] {
        let Ok(bytes) = tokio::fs::read(&candidate).await else {
            continue;
        };
        match serde_json::from_slice(&bytes) {
            Ok(value) => return value,
            Err(err) => warn!(error = %err, path = %candidate.display(), "ignoring unreadable json"),
        }
    }
    T::default()
}

async fn write_json_atomically<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let bytes = serde_json::to_vec_pretty(value)?;
    let tmp = tmp_path(path);
    tokio::fs::write(&tmp, &bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    path.with_extension("json.tmp")
}

#[async_trait]
impl BlogRepository for JsonStore {
    async fn list(&self) -> Result<Vec<Blog>, StorageError> {
        Ok(self.inner.read().await.blogs.clone())
    }

    async fn read_by_feed_url(&self, feed_url: &str) -> Result<Option<Blog>, StorageError> {
        Ok(self.inner.read().await.blog_by_feed_url(feed_url))
    }

    async fn create_or_update(&self, blog: &Blog) -> Result<(), StorageError> {
        // The write lock is held across the file write so snapshots hit the
        // disk in the same order as the updates.
        let mut inner = self.inner.write().await;
        let mut blogs = inner.blogs.clone();
        upsert(&mut blogs, blog.clone(), |existing| existing.id == blog.id);
        write_json_atomically(&self.blogs_path, &blogs).await?;
        inner.blogs = blogs;
        Ok(())
    }
}

#[async_trait]
impl PostRepository for JsonStore {
    async fn list_by_blog_id(&self, blog_id: &str) -> Result<Vec<Post>, StorageError> {
        Ok(self.inner.read().await.posts_by_blog_id(blog_id))
    }

    async fn create_or_update(&self, post: &Post) -> Result<(), StorageError> {
        let mut inner = self.inner.write().await;
        inner.ensure_blog_exists(&post.blog_id)?;
        let mut posts = inner.posts.clone();
        upsert(&mut posts, post.clone(), |existing| existing.id == post.id);
        write_json_atomically(&self.posts_path, &posts).await?;
        inner.posts = posts;
        Ok(())
    }
}
