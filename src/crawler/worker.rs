//! Worker loop
//!
//! Each worker serially drains its own bounded job channel: recrawl check,
//! per-host throttle, fetch through the `Fetcher` seam, store, and link
//! extraction. Every per-URL failure is local: it is logged, recorded as an
//! error metadata record, and the worker moves on. Discovered links flow
//! back into the intake channel and onto the file queue; blocking on a full
//! intake channel is the intended backpressure.

use crate::config::CrawlerOptions;
use crate::crawler::parser::extract_links;
use crate::crawler::policy::should_fetch;
use crate::crawler::Job;
use crate::gemini::{full_gemini_link, Fetcher, GEMINI_MEDIA_TYPE, STATUS_SUCCESS};
use crate::output::CrawlStats;
use crate::state::{HostThrottle, SeenSet};
use crate::storage::{ErrorLog, PageStore, QueueWriter};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub(crate) struct Worker {
    pub index: usize,
    pub jobs: mpsc::Receiver<Job>,
    pub intake: mpsc::Sender<String>,
    pub fetcher: Arc<dyn Fetcher>,
    pub store: Arc<PageStore>,
    pub queue: Arc<QueueWriter>,
    pub errors: Arc<ErrorLog>,
    pub seen: Arc<SeenSet>,
    pub throttle: Arc<HostThrottle>,
    pub stats: Arc<CrawlStats>,
    pub pending: Arc<AtomicUsize>,
    pub shutdown: CancellationToken,
    pub options: Arc<CrawlerOptions>,
}

impl Worker {
    pub(crate) async fn run(mut self) {
        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                job = self.jobs.recv() => match job {
                    Some(job) => {
                        self.process(job).await;
                        self.pending.fetch_sub(1, Ordering::SeqCst);
                    }
                    None => break,
                },
            }
        }
        tracing::debug!("worker {} exiting", self.index);
    }

    async fn process(&self, job: Job) {
        match should_fetch(&self.seen, &self.store, &job, self.options.recrawl_window) {
            Ok(true) => {}
            Ok(false) => {
                self.stats.skipped.fetch_add(1, Ordering::Relaxed);
                return;
            }
            Err(e) => {
                // Meta unreadable for reasons other than absence; leave the
                // record alone and move on
                self.errors.record(&job.canonical, &e.to_string());
                self.stats.errors.fetch_add(1, Ordering::Relaxed);
                return;
            }
        }

        self.throttle.wait(&job.host).await;

        println!("fetching: {}", job.canonical);

        let request_url = match full_gemini_link(&job.canonical) {
            Ok(url) => url,
            Err(e) => {
                self.fail(&job, "canon-error", 0, &e.to_string());
                return;
            }
        };

        self.stats.fetched.fetch_add(1, Ordering::Relaxed);
        let response = match self.fetcher.fetch(&request_url).await {
            Ok(response) => response,
            Err(e) => {
                self.fail(&job, "request-error", 0, &e.to_string());
                return;
            }
        };

        if response.status != STATUS_SUCCESS {
            let tag = format!("status-{}", response.status);
            let message = format!("status {}: {}", response.status, response.meta);
            self.fail(&job, &tag, response.body.len() as u64, &message);
            return;
        }

        let mime = response.meta;
        let body = response.body;

        // The size cap only guards non-textual paths; gemtext and plain
        // text are cheap and are where the links live
        let textual = job.canonical.contains(".gmi") || job.canonical.contains(".txt");
        if !textual && body.len() > self.options.max_response_kb * 1024 {
            let message = format!("response too large: {} bytes", body.len());
            self.fail(&job, "too-large", body.len() as u64, &message);
            return;
        }

        if let Err(e) = self
            .store
            .save(&job.host, &job.id, &job.canonical, &mime, &body)
        {
            self.fail(&job, "save-error", body.len() as u64, &e.to_string());
            return;
        }
        self.stats.stored.fetch_add(1, Ordering::Relaxed);

        if mime.to_ascii_lowercase().starts_with(GEMINI_MEDIA_TYPE) {
            self.enqueue_discovered(&job, &body).await;
        }
    }

    /// Extracts links, drops ones already seen this run, appends survivors
    /// to the file queue, and feeds them back into the intake channel
    async fn enqueue_discovered(&self, job: &Job, body: &[u8]) {
        let links = extract_links(&job.url, body);
        let fresh: Vec<String> = links
            .into_iter()
            .filter(|link| !self.seen.contains(link))
            .collect();

        if fresh.is_empty() {
            return;
        }

        println!("discovered {} links", fresh.len());
        self.stats
            .discovered
            .fetch_add(fresh.len() as u64, Ordering::Relaxed);

        self.queue.append(&fresh);

        for link in fresh {
            self.pending.fetch_add(1, Ordering::SeqCst);
            if self.intake.send(link).await.is_err() {
                // Intake closed: the run is shutting down
                self.pending.fetch_sub(1, Ordering::SeqCst);
                break;
            }
        }
    }

    fn fail(&self, job: &Job, status: &str, size_bytes: u64, message: &str) {
        tracing::debug!("{}: {}", job.canonical, message);
        self.errors.record(&job.canonical, message);
        if let Err(e) = self
            .store
            .save_error(&job.host, &job.id, &job.canonical, status, size_bytes)
        {
            tracing::warn!("error meta write failed for {}: {}", job.canonical, e);
        }
        self.stats.errors.fetch_add(1, Ordering::Relaxed);
    }
}
