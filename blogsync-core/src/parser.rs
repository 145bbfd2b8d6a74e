use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::ParseError;
use crate::feed::FeedParser;
use crate::models::{FeedBlog, FeedPost};

/// [`FeedParser`] for RSS 2.0 and Atom documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyndicationParser;

impl SyndicationParser {
    pub fn parse(&self, feed_url: &str, raw: &str) -> Result<FeedBlog, ParseError> {
        self.parse_at(feed_url, raw, Utc::now())
    }

    /// Parses `raw`, using `now` for items that carry no usable date.
    pub fn parse_at(
        &self,
        feed_url: &str,
        raw: &str,
        now: DateTime<Utc>,
    ) -> Result<FeedBlog, ParseError> {
        match raw.parse::<rss::Channel>() {
            Ok(channel) => Ok(from_rss_channel(feed_url, &channel, now)),
            // Not an <rss> document at all, so give Atom a go.
            Err(rss::Error::InvalidStartTag) => {
                let feed = raw.parse::<atom_syndication::Feed>()?;
                Ok(from_atom_feed(feed_url, &feed))
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl FeedParser for SyndicationParser {
    async fn parse_feed(&self, feed_url: &str, raw: &str) -> Option<FeedBlog> {
        match self.parse(feed_url, raw) {
            Ok(feed_blog) => Some(feed_blog),
            Err(err) => {
                debug!(feed_url, error = %err, "unsupported or malformed feed");
                None
            }
        }
    }
}

fn from_rss_channel(feed_url: &str, channel: &rss::Channel, now: DateTime<Utc>) -> FeedBlog {
    let site_url = channel.link().to_owned();
    let feed_date = channel
        .last_build_date()
        .or_else(|| channel.pub_date())
        .and_then(parse_rss_date);

    let items = channel.items().iter().filter_map(|item| {
        let link = item.link().filter(|link| !link.trim().is_empty())?;
        let title = item.title().filter(|title| !title.trim().is_empty())?;
        let published_at = item
            .pub_date()
            .and_then(parse_rss_date)
            .or(feed_date)
            .unwrap_or(now);

        Some(FeedPost {
            url: normalize_post_url(&site_url, link),
            title: title.to_owned(),
            content: item
                .content()
                .or_else(|| item.description())
                .map(ToOwned::to_owned),
            published_at,
        })
    });

    FeedBlog {
        feed_url: feed_url.to_owned(),
        title: channel.title().to_owned(),
        posts: dedupe_by_url(items),
        site_url,
    }
}

fn from_atom_feed(feed_url: &str, feed: &atom_syndication::Feed) -> FeedBlog {
    let site_url = alternate_link(feed.links()).unwrap_or_default();

    let items = feed.entries().iter().filter_map(|entry| {
        let link = alternate_link(entry.links())?;
        let title = entry.title().value.trim();
        if title.is_empty() {
            return None;
        }
        let published_at = entry
            .published()
            .map(|date| date.with_timezone(&Utc))
            .unwrap_or_else(|| entry.updated().with_timezone(&Utc));
        let content = entry
            .content()
            .and_then(|content| content.value())
            .map(ToOwned::to_owned)
            .or_else(|| entry.summary().map(|summary| summary.value.clone()));

        Some(FeedPost {
            url: normalize_post_url(&site_url, &link),
            title: title.to_owned(),
            content,
            published_at,
        })
    });

    FeedBlog {
        feed_url: feed_url.to_owned(),
        title: feed.title().value.clone(),
        posts: dedupe_by_url(items),
        site_url,
    }
}

fn alternate_link(links: &[atom_syndication::Link]) -> Option<String> {
    links
        .iter()
        .find(|link| link.rel() == "alternate")
        .or_else(|| links.first())
        .map(|link| link.href().to_owned())
        .filter(|href| !href.trim().is_empty())
}

fn parse_rss_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value.trim())
        .or_else(|_| DateTime::parse_from_rfc3339(value.trim()))
        .ok()
        .map(|date| date.with_timezone(&Utc))
}

// First occurrence of a url wins.
fn dedupe_by_url(items: impl Iterator<Item = FeedPost>) -> Vec<FeedPost> {
    let mut seen = HashSet::new();
    items.filter(|post| seen.insert(post.url.clone())).collect()
}

/// Makes a feed item link absolute: root-relative links are appended to the
/// site url, path included, and scheme-less links are assumed to be https.
pub fn normalize_post_url(site_url: &str, post_url: &str) -> String {
    let post_url = post_url.trim();
    let url = match post_url.strip_prefix('/') {
        Some(path) => format!("{}/{path}", site_url.trim().trim_end_matches('/')),
        None => post_url.to_owned(),
    };

    if has_http_scheme(&url) {
        url
    } else {
        format!("https://{url}")
    }
}

fn has_http_scheme(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
