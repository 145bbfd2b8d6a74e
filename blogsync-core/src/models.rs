use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type BlogId = String;
pub type PostId = String;

/// A followed source. `feed_url` is the natural key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Blog {
    pub id: BlogId,
    pub title: String,
    pub feed_url: String,
    pub site_url: String,
}

/// One article owned by a [`Blog`]. `url` is unique within the owning blog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Post {
    pub id: PostId,
    pub blog_id: BlogId,
    pub url: String,
    pub title: String,
    pub content: String,
    pub published_at: DateTime<Utc>,
}

/// Parsed snapshot of a single feed fetch. Never stored as-is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedBlog {
    pub feed_url: String,
    pub site_url: String,
    pub title: String,
    pub posts: Vec<FeedPost>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedPost {
    pub url: String,
    pub title: String,
    pub content: Option<String>,
    pub published_at: DateTime<Utc>,
}
