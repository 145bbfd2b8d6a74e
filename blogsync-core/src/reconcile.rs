use std::collections::{HashMap, HashSet};

use crate::id::IdGenerator;
use crate::models::{Blog, FeedPost, Post};

/// Outcome of comparing a feed against the posts already stored for a blog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComparePostsResult {
    pub posts_to_create: Vec<Post>,
    pub posts_to_update: Vec<Post>,
}

/// Partitions `feed_posts` into new posts and already known posts, matching
/// on url.
///
/// New posts get a fresh id from `ids` and belong to `blog`. Known posts are
/// returned as stored: there is no change detection, every known post seen in
/// the feed is scheduled for a re-upsert. Both lists follow feed order. A new
/// url repeated within the feed is created once, at its first occurrence.
pub fn compare_posts(
    blog: &Blog,
    known_posts: &[Post],
    feed_posts: &[FeedPost],
    ids: &dyn IdGenerator,
) -> ComparePostsResult {
    let known_by_url: HashMap<&str, &Post> = known_posts
        .iter()
        .map(|post| (post.url.as_str(), post))
        .collect();

    let mut result = ComparePostsResult::default();
    let mut created: HashSet<&str> = HashSet::new();

    for feed_post in feed_posts {
        match known_by_url.get(feed_post.url.as_str()) {
            Some(known) => result.posts_to_update.push((*known).clone()),
            None if !created.insert(feed_post.url.as_str()) => {}
            None => result.posts_to_create.push(Post {
                id: ids.generate(),
                blog_id: blog.id.clone(),
                url: feed_post.url.clone(),
                title: feed_post.title.clone(),
                content: feed_post.content.clone().unwrap_or_default(),
                published_at: feed_post.published_at,
            }),
        }
    }

    result
}
