//! Intake routing and host affinity
//!
//! A single router task drains the intake channel. Being the only writer of
//! the affinity sets, it can read them without synchronization: a host is
//! assigned to exactly one worker, the first time it is seen, and every
//! later job for that host follows it. Combined with the per-host throttle
//! this serializes all requests to a host through one worker, which yields
//! strict per-host pacing without any global lock.

use crate::config::DenyPolicy;
use crate::crawler::Job;
use crate::output::CrawlStats;
use crate::url::normalize;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Capacity of the intake channel
pub(crate) const INTAKE_CAPACITY: usize = 1024;

/// Capacity of each worker's job channel
pub(crate) const WORKER_QUEUE_CAPACITY: usize = 64;

/// Candidates this short cannot be a plausible gemini URL
const MIN_CANDIDATE_LEN: usize = 10;

/// Reserved sentinel prefix; never crawled
const SENTINEL_PREFIX: &str = "gemini://!";

/// Suffixes rejected outright by substring match. Blunt on purpose; the
/// size cap catches what slips through.
const BINARY_SUFFIXES: &[&str] = &[".pdf", ".zip", ".jpg", ".png", ".bin"];

struct WorkerSlot {
    jobs: mpsc::Sender<Job>,
    hosts: HashSet<String>,
}

/// The single serial consumer of the intake channel
pub(crate) struct Router {
    intake: mpsc::Receiver<String>,
    workers: Vec<WorkerSlot>,
    policy: DenyPolicy,
    stats: Arc<CrawlStats>,
    pending: Arc<AtomicUsize>,
    shutdown: CancellationToken,
}

impl Router {
    pub(crate) fn new(
        intake: mpsc::Receiver<String>,
        senders: Vec<mpsc::Sender<Job>>,
        policy: DenyPolicy,
        stats: Arc<CrawlStats>,
        pending: Arc<AtomicUsize>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            intake,
            workers: senders
                .into_iter()
                .map(|jobs| WorkerSlot {
                    jobs,
                    hosts: HashSet::new(),
                })
                .collect(),
            policy,
            stats,
            pending,
            shutdown,
        }
    }

    pub(crate) async fn run(mut self) {
        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                candidate = self.intake.recv() => match candidate {
                    Some(candidate) => self.handle_candidate(candidate).await,
                    None => break,
                },
            }
        }
        tracing::debug!("intake router exiting");
        // Dropping self drops the worker senders; workers drain and exit
    }

    async fn handle_candidate(&mut self, candidate: String) {
        match self.admit(&candidate) {
            Some(job) => {
                let index = self.pick_worker(&job.host);
                self.workers[index].hosts.insert(job.host.clone());
                self.stats.routed.fetch_add(1, Ordering::Relaxed);
                tracing::trace!("routing {} to worker {}", job.canonical, index);

                if self.workers[index].jobs.send(job).await.is_err() {
                    // Worker gone (shutdown); the candidate is abandoned
                    self.pending.fetch_sub(1, Ordering::SeqCst);
                }
            }
            None => {
                self.stats.rejected.fetch_add(1, Ordering::Relaxed);
                self.pending.fetch_sub(1, Ordering::SeqCst);
            }
        }
    }

    /// Runs the candidate filter and canonicalization; None means rejected
    fn admit(&self, candidate: &str) -> Option<Job> {
        let candidate = candidate.trim();

        if candidate.len() <= MIN_CANDIDATE_LEN {
            return None;
        }
        if candidate.starts_with(SENTINEL_PREFIX) {
            return None;
        }
        if BINARY_SUFFIXES.iter().any(|s| candidate.contains(s)) {
            return None;
        }
        if self.policy.is_denied_url(candidate) {
            return None;
        }

        let (url, canonical) = normalize(candidate).ok()?;

        if let Some(host) = url.host_str() {
            if self.policy.is_denied_host(&host.to_lowercase()) {
                return None;
            }
        }

        Some(Job::from_url(url, canonical))
    }

    /// Applies the host-affinity rule
    ///
    /// An owner, once assigned, always wins. Otherwise the worker with the
    /// fewest pending jobs takes the host, ties broken by smallest index.
    /// Queue lengths are sampled without synchronization; temporary
    /// imbalance is acceptable.
    fn pick_worker(&self, host: &str) -> usize {
        if let Some(index) = self.workers.iter().position(|w| w.hosts.contains(host)) {
            return index;
        }

        let mut best = 0;
        let mut best_pending = usize::MAX;
        for (index, worker) in self.workers.iter().enumerate() {
            let pending = worker.jobs.max_capacity() - worker.jobs.capacity();
            if pending < best_pending {
                best = index;
                best_pending = pending;
            }
        }
        best
    }
}
