//! Crawl orchestration
//!
//! Wires the channels and tasks for one run:
//!
//! 1. Fatal startup checks: the DB root must be creatable and the queue
//!    file readable; nothing after startup kills the process
//! 2. Spawn W workers, the intake router, and the stats reporter
//! 3. Drain the queue file into the intake channel
//! 4. Wait for completion: an atomic counter tracks candidates outstanding
//!    anywhere in the pipeline; the run is over when the seed drain has
//!    finished and the counter reads zero
//! 5. Cancel the run-scoped token, join every task, return the summary
//!
//! Ctrl-C cancels the root token: the router and stats task exit, workers
//! finish their current job, and queued jobs are dropped. Persisted state
//! stays consistent because every write is tmp-then-rename.

use crate::config::CrawlerOptions;
use crate::crawler::scheduler::{Router, INTAKE_CAPACITY, WORKER_QUEUE_CAPACITY};
use crate::crawler::worker::Worker;
use crate::gemini::{Fetcher, GeminiClient};
use crate::output::{format_report, CrawlStats};
use crate::state::{HostThrottle, SeenSet};
use crate::storage::queue::drain_seed_file;
use crate::storage::{ErrorLog, PageStore, QueueWriter};
use crate::{CrawlError, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const STATS_INTERVAL: Duration = Duration::from_secs(5);
const COMPLETION_POLL: Duration = Duration::from_millis(50);

/// Final accounting for a finished run
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    /// Candidates read from the queue file
    pub seeded: usize,
    /// Requests handed to the protocol client
    pub fetched: u64,
    /// Pages stored with content and metadata
    pub stored: u64,
    /// Jobs dropped by the seen set or recrawl policy
    pub skipped: u64,
    /// Jobs that ended in an error record
    pub errors: u64,
    /// Links discovered and re-enqueued
    pub discovered: u64,
    /// Wall-clock duration of the run
    pub duration: Duration,
}

/// Runs a crawl with the real Gemini client
pub async fn crawl(options: CrawlerOptions) -> Result<CrawlSummary> {
    let client = GeminiClient::new()?;
    crawl_with_fetcher(options, Arc::new(client)).await
}

/// Runs a crawl with a caller-supplied fetcher
///
/// The seam exists for the network layer only; everything else (queue,
/// storage, scheduling) is the production path.
pub async fn crawl_with_fetcher(
    options: CrawlerOptions,
    fetcher: Arc<dyn Fetcher>,
) -> Result<CrawlSummary> {
    let start = Instant::now();

    std::fs::create_dir_all(&options.db_dir).map_err(|e| CrawlError::DbUncreatable {
        path: options.db_dir.display().to_string(),
        source: e,
    })?;

    let queue_file = tokio::fs::File::open(&options.queue_path)
        .await
        .map_err(|e| CrawlError::QueueUnreadable {
            path: options.queue_path.display().to_string(),
            source: e,
        })?;

    let store = Arc::new(PageStore::new(&options.db_dir));
    let queue = Arc::new(QueueWriter::new(&options.queue_path));
    let errors = Arc::new(ErrorLog::new(&options.error_log_path));
    let seen = Arc::new(SeenSet::new());
    let throttle = Arc::new(HostThrottle::new(options.throttle));
    let stats = Arc::new(CrawlStats::new());
    let pending = Arc::new(AtomicUsize::new(0));
    let options = Arc::new(options);

    // Root token fires on Ctrl-C; the child scopes this run's tasks so the
    // coordinator can also end the run organically
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupt received, shutting down");
                cancel.cancel();
            }
        });
    }
    let shutdown = cancel.child_token();

    let (intake_tx, intake_rx) = mpsc::channel::<String>(INTAKE_CAPACITY);

    let mut worker_senders = Vec::with_capacity(options.workers);
    let mut worker_handles = Vec::with_capacity(options.workers);
    for index in 0..options.workers {
        let (jobs_tx, jobs_rx) = mpsc::channel(WORKER_QUEUE_CAPACITY);
        worker_senders.push(jobs_tx);

        let worker = Worker {
            index,
            jobs: jobs_rx,
            intake: intake_tx.clone(),
            fetcher: Arc::clone(&fetcher),
            store: Arc::clone(&store),
            queue: Arc::clone(&queue),
            errors: Arc::clone(&errors),
            seen: Arc::clone(&seen),
            throttle: Arc::clone(&throttle),
            stats: Arc::clone(&stats),
            pending: Arc::clone(&pending),
            shutdown: shutdown.clone(),
            options: Arc::clone(&options),
        };
        worker_handles.push(tokio::spawn(worker.run()));
    }

    let router = Router::new(
        intake_rx,
        worker_senders.clone(),
        options.policy.clone(),
        Arc::clone(&stats),
        Arc::clone(&pending),
        shutdown.clone(),
    );
    let router_handle = tokio::spawn(router.run());

    let stats_handle = spawn_stats_reporter(
        Arc::clone(&stats),
        worker_senders,
        shutdown.clone(),
    );

    tracing::info!(
        "crawl started: {} workers, throttle {:?}, recrawl window {:?}",
        options.workers,
        options.throttle,
        options.recrawl_window
    );

    let seed_result = drain_seed_file(queue_file, intake_tx.clone(), Arc::clone(&pending)).await;
    drop(intake_tx);

    let seeded = match seed_result {
        Ok(seeded) => {
            tracing::info!("seeded {} candidates from the queue file", seeded);
            seeded
        }
        Err(e) => {
            shutdown.cancel();
            join_all(router_handle, worker_handles, stats_handle).await;
            return Err(CrawlError::QueueUnreadable {
                path: options.queue_path.display().to_string(),
                source: e,
            });
        }
    };

    // The counter is bumped before every intake send, so zero here means
    // zero work anywhere in the pipeline
    loop {
        if cancel.is_cancelled() {
            break;
        }
        if pending.load(Ordering::SeqCst) == 0 {
            break;
        }
        tokio::time::sleep(COMPLETION_POLL).await;
    }

    shutdown.cancel();
    join_all(router_handle, worker_handles, stats_handle).await;

    let snapshot = stats.snapshot();
    let summary = CrawlSummary {
        seeded,
        fetched: snapshot.fetched,
        stored: snapshot.stored,
        skipped: snapshot.skipped,
        errors: snapshot.errors,
        discovered: snapshot.discovered,
        duration: start.elapsed(),
    };

    tracing::info!(
        "crawl finished in {:?}: {} stored, {} errors, {} skipped",
        summary.duration,
        summary.stored,
        summary.errors,
        summary.skipped
    );

    Ok(summary)
}

async fn join_all(
    router: tokio::task::JoinHandle<()>,
    workers: Vec<tokio::task::JoinHandle<()>>,
    stats: tokio::task::JoinHandle<()>,
) {
    if let Err(e) = router.await {
        tracing::warn!("router task failed: {}", e);
    }
    for handle in workers {
        if let Err(e) = handle.await {
            tracing::warn!("worker task failed: {}", e);
        }
    }
    if let Err(e) = stats.await {
        tracing::warn!("stats task failed: {}", e);
    }
}

/// Prints scheduler statistics to stdout every five seconds
fn spawn_stats_reporter(
    stats: Arc<CrawlStats>,
    senders: Vec<mpsc::Sender<crate::crawler::Job>>,
    shutdown: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(STATS_INTERVAL);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The first tick completes immediately; skip it
        interval.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = interval.tick() => {
                    let depths: Vec<usize> = senders
                        .iter()
                        .map(|s| s.max_capacity() - s.capacity())
                        .collect();
                    println!("{}", format_report(&stats.snapshot(), &depths));
                }
            }
        }
    })
}
