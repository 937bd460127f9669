//! Gemcrawl main entry point
//!
//! Command-line interface for the Gemini crawler.

use clap::Parser;
use gemcrawl::config::{load_policy_with_hash, validate_options, CrawlerOptions};
use gemcrawl::crawler::crawl;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Gemcrawl: a polite, resumable crawler for Geminispace
///
/// Reads a queue file of URLs, fetches each page at most once per recrawl
/// window, stores content and metadata under the database root, and appends
/// newly discovered links back to the queue so an interrupted run can
/// resume where it left off.
#[derive(Parser, Debug)]
#[command(name = "gemcrawl")]
#[command(version)]
#[command(about = "A polite, resumable Gemini crawler", long_about = None)]
struct Cli {
    /// Path to queue file (one URL per line)
    #[arg(long, value_name = "PATH", default_value = "queue.txt")]
    queue: PathBuf,

    /// Database root directory
    #[arg(long, value_name = "DIR", default_value = "data")]
    db: PathBuf,

    /// Path to error log file
    #[arg(long = "error-log", value_name = "PATH", default_value = "error_queue.log")]
    error_log: PathBuf,

    /// Per-host minimum interval between requests in milliseconds
    #[arg(long = "throttle-ms", value_name = "MS", default_value_t = 1500)]
    throttle_ms: u64,

    /// Do not recrawl a page within this many hours
    #[arg(long = "recrawl-hours", value_name = "HOURS", default_value_t = 768)]
    recrawl_hours: u64,

    /// Maximum response size to save in KB (non-textual paths)
    #[arg(long = "max-kb", value_name = "KB", default_value_t = 500)]
    max_kb: usize,

    /// Number of concurrent workers
    #[arg(long, value_name = "N", default_value_t = 4)]
    workers: usize,

    /// Optional TOML file with operator deny rules
    #[arg(long, value_name = "PATH")]
    policy: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut options = CrawlerOptions {
        queue_path: cli.queue,
        db_dir: cli.db,
        error_log_path: cli.error_log,
        throttle: Duration::from_millis(cli.throttle_ms),
        recrawl_window: Duration::from_secs(cli.recrawl_hours * 3600),
        max_response_kb: cli.max_kb,
        workers: cli.workers,
        ..CrawlerOptions::default()
    };

    if let Some(path) = &cli.policy {
        let (policy, hash) = match load_policy_with_hash(path) {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::error!("failed to load policy {}: {}", path.display(), e);
                return Err(e.into());
            }
        };
        tracing::info!(
            "loaded policy from {} ({} patterns, {} hosts, hash {})",
            path.display(),
            policy.patterns.len(),
            policy.hosts.len(),
            hash
        );
        options.policy = policy;
    }

    if let Err(e) = validate_options(&options) {
        tracing::error!("invalid options: {}", e);
        return Err(e.into());
    }

    match crawl(options).await {
        Ok(summary) => {
            println!(
                "done: {} seeded, {} fetched, {} stored, {} skipped, {} errors, {} discovered in {:.1}s",
                summary.seeded,
                summary.fetched,
                summary.stored,
                summary.skipped,
                summary.errors,
                summary.discovered,
                summary.duration.as_secs_f64()
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("crawl failed: {}", e);
            Err(e.into())
        }
    }
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("gemcrawl=info,warn"),
            1 => EnvFilter::new("gemcrawl=debug,info"),
            2 => EnvFilter::new("gemcrawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
