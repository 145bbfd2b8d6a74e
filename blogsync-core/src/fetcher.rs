use async_trait::async_trait;
use reqwest::{redirect, Client, ClientBuilder};
use tracing::{debug, warn};
use url::Url;

use crate::config::FetchConfig;
use crate::error::FetchError;
use crate::feed::FeedFetcher;

/// [`FeedFetcher`] backed by `reqwest`, with per-request timeouts and
/// linear-backoff retries for network errors and 5xx responses.
#[derive(Debug, Clone)]
pub struct HttpFeedFetcher {
    client: Client,
    config: FetchConfig,
}

impl HttpFeedFetcher {
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let client = ClientBuilder::new()
            .redirect(redirect::Policy::limited(config.max_redirects))
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self { client, config })
    }

    pub fn with_client(client: Client, config: FetchConfig) -> Self {
        Self { client, config }
    }

    async fn fetch_with_retries(&self, feed_url: &str) -> Result<String, FetchError> {
        let url = Url::parse(feed_url).map_err(|source| FetchError::InvalidUrl {
            url: feed_url.to_owned(),
            source,
        })?;

        let mut attempt: u8 = 0;
        loop {
            match self.fetch_once(url.clone()).await {
                Ok(body) => return Ok(body),
                Err(err) if attempt < self.config.retry_attempts && is_retryable(&err) => {
                    attempt += 1;
                    debug!(feed_url, attempt, error = %err, "retrying feed fetch");
                    tokio::time::sleep(self.config.backoff(attempt)).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn fetch_once(&self, url: Url) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }
}

fn is_retryable(err: &FetchError) -> bool {
    match err {
        FetchError::Network(_) => true,
        FetchError::Status(code) => *code >= 500,
        FetchError::InvalidUrl { .. } => false,
    }
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch_feed(&self, feed_url: &str) -> Option<String> {
        match self.fetch_with_retries(feed_url).await {
            Ok(body) if body.trim().is_empty() => {
                debug!(feed_url, "feed returned an empty body");
                None
            }
            Ok(body) => Some(body),
            Err(err) => {
                warn!(feed_url, error = %err, "failed to fetch feed");
                None
            }
        }
    }
}
