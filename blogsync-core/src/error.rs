use thiserror::Error;

/// Failure reported by a repository implementation.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Failure that escapes a blog sync. Acquisition problems never end up here.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("persistence failed: {0}")]
    Storage(#[from] StorageError),
    #[error("sync task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid feed url {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("unexpected status code {0}")]
    Status(u16),
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("rss parsing error: {0}")]
    Rss(#[from] rss::Error),
    #[error("atom parsing error: {0}")]
    Atom(#[from] atom_syndication::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("no configuration directory available on this platform")]
    NoConfigDir,
}
