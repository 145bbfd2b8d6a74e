pub mod config;
pub mod data;
pub mod error;
pub mod feed;
pub mod fetcher;
pub mod id;
pub mod models;
pub mod orchestrator;
pub mod parser;
pub mod reconcile;
pub mod repository;
pub mod storage;
pub mod syncer;

pub use config::{FetchConfig, StorageConfig, SyncConfig};
pub use data::JsonStore;
pub use error::{ConfigError, FetchError, ParseError, StorageError, SyncError};
pub use feed::{FeedFetcher, FeedParser};
pub use fetcher::HttpFeedFetcher;
pub use id::{IdGenerator, UuidGenerator};
pub use models::{Blog, BlogId, FeedBlog, FeedPost, Post, PostId};
pub use orchestrator::{SyncFailure, SyncOrchestrator, SyncSummary};
pub use parser::SyndicationParser;
pub use reconcile::{compare_posts, ComparePostsResult};
pub use repository::{BlogRepository, PostRepository};
pub use storage::MemoryStore;
pub use syncer::{BlogSyncer, SyncOutcome};
