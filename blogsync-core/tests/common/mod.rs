#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use blogsync_core::{
    Blog, BlogRepository, BlogSyncer, FeedFetcher, IdGenerator, MemoryStore, Post,
    PostRepository, StorageError, SyndicationParser,
};

/// Serves canned feed bodies keyed by url. Unknown urls are unreachable.
#[derive(Default)]
pub struct StubFetcher {
    feeds: Mutex<HashMap<String, String>>,
}

impl StubFetcher {
    pub fn set(&self, url: &str, body: impl Into<String>) {
        self.feeds.lock().unwrap().insert(url.to_owned(), body.into());
    }

    pub fn remove(&self, url: &str) {
        self.feeds.lock().unwrap().remove(url);
    }
}

#[async_trait]
impl FeedFetcher for StubFetcher {
    async fn fetch_feed(&self, feed_url: &str) -> Option<String> {
        self.feeds.lock().unwrap().get(feed_url).cloned()
    }
}

/// Wraps a [`MemoryStore`], counting writes and optionally failing post
/// writes whose url contains a marker.
#[derive(Clone, Default)]
pub struct RecordingStore {
    pub inner: MemoryStore,
    blog_writes: Arc<AtomicUsize>,
    post_writes: Arc<AtomicUsize>,
    fail_posts_matching: Option<String>,
}

impl RecordingStore {
    pub fn failing_posts_matching(marker: &str) -> Self {
        Self {
            fail_posts_matching: Some(marker.to_owned()),
            ..Self::default()
        }
    }

    pub fn blog_writes(&self) -> usize {
        self.blog_writes.load(Ordering::SeqCst)
    }

    pub fn post_writes(&self) -> usize {
        self.post_writes.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.blog_writes() + self.post_writes()
    }
}

#[async_trait]
impl BlogRepository for RecordingStore {
    async fn list(&self) -> Result<Vec<Blog>, StorageError> {
        self.inner.list().await
    }

    async fn read_by_feed_url(&self, feed_url: &str) -> Result<Option<Blog>, StorageError> {
        self.inner.read_by_feed_url(feed_url).await
    }

    async fn create_or_update(&self, blog: &Blog) -> Result<(), StorageError> {
        self.blog_writes.fetch_add(1, Ordering::SeqCst);
        BlogRepository::create_or_update(&self.inner, blog).await
    }
}

#[async_trait]
impl PostRepository for RecordingStore {
    async fn list_by_blog_id(&self, blog_id: &str) -> Result<Vec<Post>, StorageError> {
        self.inner.list_by_blog_id(blog_id).await
    }

    async fn create_or_update(&self, post: &Post) -> Result<(), StorageError> {
        if let Some(marker) = &self.fail_posts_matching {
            if post.url.contains(marker.as_str()) {
                return Err(StorageError::Unavailable("disk on fire".into()));
            }
        }
        self.post_writes.fetch_add(1, Ordering::SeqCst);
        PostRepository::create_or_update(&self.inner, post).await
    }
}

/// Blog repository whose listing always fails.
pub struct BrokenBlogList;

#[async_trait]
impl BlogRepository for BrokenBlogList {
    async fn list(&self) -> Result<Vec<Blog>, StorageError> {
        Err(StorageError::Unavailable("connection refused".into()))
    }

    async fn read_by_feed_url(&self, _feed_url: &str) -> Result<Option<Blog>, StorageError> {
        Err(StorageError::Unavailable("connection refused".into()))
    }

    async fn create_or_update(&self, _blog: &Blog) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("connection refused".into()))
    }
}

pub fn sequential_ids() -> Arc<dyn IdGenerator> {
    let next = AtomicUsize::new(1);
    Arc::new(move || format!("id-{}", next.fetch_add(1, Ordering::SeqCst)))
}

pub fn syncer(store: &RecordingStore, fetcher: &Arc<StubFetcher>) -> BlogSyncer {
    BlogSyncer::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        fetcher.clone(),
        Arc::new(SyndicationParser),
    )
    .with_id_generator(sequential_ids())
}

pub struct Item<'a> {
    pub url: &'a str,
    pub title: &'a str,
    pub content: Option<&'a str>,
}

pub fn item<'a>(url: &'a str, title: &'a str) -> Item<'a> {
    Item {
        url,
        title,
        content: None,
    }
}

/// Renders a minimal RSS 2.0 document.
pub fn rss_feed(title: &str, site_url: &str, items: &[Item<'_>]) -> String {
    let items: String = items
        .iter()
        .map(|item| {
            let description = item
                .content
                .map(|content| format!("<description>{content}</description>"))
                .unwrap_or_default();
            format!(
                "<item><title>{}</title><link>{}</link>\
                 <pubDate>Mon, 21 Oct 2024 07:28:00 GMT</pubDate>{description}</item>",
                item.title, item.url
            )
        })
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel><title>{title}</title><link>{site_url}</link><description>test</description>{items}</channel></rss>"#
    )
}
