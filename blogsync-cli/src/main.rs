use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use blogsync_core::{
    BlogRepository, BlogSyncer, HttpFeedFetcher, JsonStore, PostRepository, SyncConfig,
    SyncOrchestrator, SyncOutcome, SyncSummary, SyndicationParser,
};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "blogsync")]
#[command(about = "Sync blogs from their RSS/Atom feeds into local storage")]
struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the stored blogs and posts
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add or sync the given feeds
    Sync {
        /// Feed URLs to sync
        #[arg(required = true)]
        feed_urls: Vec<String>,
    },
    /// Sync every stored blog once
    SyncAll,
    /// List stored blogs
    List,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn Error>> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => SyncConfig::load_from(path)?,
        None => SyncConfig::load(),
    };
    if let Some(dir) = cli.data_dir {
        config.storage.data_dir = Some(dir);
    }

    let data_dir = config.storage.resolve_data_dir();
    info!(data_dir = %data_dir.display(), "opening store");
    let store = JsonStore::open(&data_dir).await?;

    match cli.command {
        Commands::Sync { feed_urls } => {
            let syncer = build_syncer(&store, &config)?;
            for feed_url in &feed_urls {
                let outcome = syncer.sync(feed_url).await?;
                println!("{feed_url}: {}", describe(&outcome));
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::SyncAll => {
            let orchestrator = SyncOrchestrator::new(build_syncer(&store, &config)?);
            let summary = orchestrator.sync_all().await?;
            print_summary(&summary);
            Ok(if summary.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Commands::List => {
            for blog in store.list().await? {
                let posts = store.list_by_blog_id(&blog.id).await?;
                println!("{}\t{}\t{} posts\t{}", blog.id, blog.title, posts.len(), blog.feed_url);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn build_syncer(store: &JsonStore, config: &SyncConfig) -> Result<BlogSyncer, Box<dyn Error>> {
    let fetcher = HttpFeedFetcher::new(config.fetch.clone())?;
    Ok(BlogSyncer::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(fetcher),
        Arc::new(SyndicationParser),
    ))
}

fn describe(outcome: &SyncOutcome) -> String {
    match outcome {
        SyncOutcome::Unreachable => "unreachable, skipped".to_owned(),
        SyncOutcome::Unparseable => "not a supported feed, skipped".to_owned(),
        SyncOutcome::Synced {
            blog_id,
            created,
            updated,
        } => format!("blog {blog_id}: {created} new, {updated} refreshed"),
    }
}

fn print_summary(summary: &SyncSummary) {
    println!(
        "{} blogs: {} synced, {} skipped, {} failed",
        summary.total(),
        summary.synced,
        summary.skipped,
        summary.failures.len()
    );
    for failure in &summary.failures {
        println!("  {}: {}", failure.feed_url, failure.error);
    }
}
