use std::sync::Arc;

use tracing::{debug, info};

use crate::error::SyncError;
use crate::feed::{FeedFetcher, FeedParser};
use crate::id::{IdGenerator, UuidGenerator};
use crate::models::{Blog, BlogId, FeedBlog};
use crate::reconcile::compare_posts;
use crate::repository::{BlogRepository, PostRepository};

/// What a single blog sync ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The feed could not be fetched this time. Nothing was written.
    Unreachable,
    /// The feed body was not a supported feed. Nothing was written.
    Unparseable,
    Synced {
        blog_id: BlogId,
        created: usize,
        updated: usize,
    },
}

/// Synchronizes one feed url into blog and post storage.
///
/// Acquisition problems are absorbed and reported through [`SyncOutcome`];
/// repository failures are returned as [`SyncError::Storage`]. Cloning is
/// cheap, every collaborator is shared.
#[derive(Clone)]
pub struct BlogSyncer {
    blogs: Arc<dyn BlogRepository>,
    posts: Arc<dyn PostRepository>,
    fetcher: Arc<dyn FeedFetcher>,
    parser: Arc<dyn FeedParser>,
    ids: Arc<dyn IdGenerator>,
}

impl BlogSyncer {
    pub fn new(
        blogs: Arc<dyn BlogRepository>,
        posts: Arc<dyn PostRepository>,
        fetcher: Arc<dyn FeedFetcher>,
        parser: Arc<dyn FeedParser>,
    ) -> Self {
        Self {
            blogs,
            posts,
            fetcher,
            parser,
            ids: Arc::new(UuidGenerator),
        }
    }

    /// Replaces the default UUID generator.
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn blogs(&self) -> &Arc<dyn BlogRepository> {
        &self.blogs
    }

    pub async fn sync(&self, feed_url: &str) -> Result<SyncOutcome, SyncError> {
        let Some(raw) = self.fetcher.fetch_feed(feed_url).await else {
            debug!(feed_url, "no feed content, skipping");
            return Ok(SyncOutcome::Unreachable);
        };

        let Some(feed_blog) = self.parser.parse_feed(feed_url, &raw).await else {
            debug!(feed_url, "feed could not be parsed, skipping");
            return Ok(SyncOutcome::Unparseable);
        };

        let blog = self.resolve_blog(feed_url, &feed_blog).await?;
        let known_posts = self.posts.list_by_blog_id(&blog.id).await?;
        let result = compare_posts(&blog, &known_posts, &feed_blog.posts, self.ids.as_ref());

        for post in &result.posts_to_create {
            debug!(blog_id = %blog.id, url = %post.url, "creating post");
            self.posts.create_or_update(post).await?;
        }
        for post in &result.posts_to_update {
            self.posts.create_or_update(post).await?;
        }

        let created = result.posts_to_create.len();
        let updated = result.posts_to_update.len();
        info!(feed_url, blog_id = %blog.id, created, updated, "synced blog");

        Ok(SyncOutcome::Synced {
            blog_id: blog.id,
            created,
            updated,
        })
    }

    // An existing blog is reused as stored, its title and site url are not
    // refreshed from the feed.
    async fn resolve_blog(&self, feed_url: &str, feed_blog: &FeedBlog) -> Result<Blog, SyncError> {
        if let Some(blog) = self.blogs.read_by_feed_url(feed_url).await? {
            return Ok(blog);
        }

        let blog = Blog {
            id: self.ids.generate(),
            title: feed_blog.title.clone(),
            feed_url: feed_url.to_owned(),
            site_url: feed_blog.site_url.clone(),
        };
        self.blogs.create_or_update(&blog).await?;
        info!(feed_url, blog_id = %blog.id, title = %blog.title, "created blog");

        Ok(blog)
    }
}
