use std::sync::atomic::{AtomicU64, Ordering};

/// Shared crawl counters, updated lock-free from every task
///
/// Counts are approximate while the run is in flight (readers sample without
/// synchronization); they are exact once all tasks have joined.
#[derive(Debug, Default)]
pub struct CrawlStats {
    /// Candidates accepted by the intake filter and routed to a worker
    pub routed: AtomicU64,

    /// Candidates rejected by the intake filter
    pub rejected: AtomicU64,

    /// Requests handed to the protocol client
    pub fetched: AtomicU64,

    /// Pages saved with content and success metadata
    pub stored: AtomicU64,

    /// Jobs dropped by the recrawl policy or the seen set
    pub skipped: AtomicU64,

    /// Jobs that ended in an error record
    pub errors: AtomicU64,

    /// Links discovered in gemtext and re-enqueued
    pub discovered: AtomicU64,
}

impl CrawlStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            routed: self.routed.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            fetched: self.fetched.load(Ordering::Relaxed),
            stored: self.stored.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            discovered: self.discovered.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub routed: u64,
    pub rejected: u64,
    pub fetched: u64,
    pub stored: u64,
    pub skipped: u64,
    pub errors: u64,
    pub discovered: u64,
}

/// Formats the periodic scheduler report printed to stdout
pub fn format_report(snapshot: &StatsSnapshot, queue_depths: &[usize]) -> String {
    let depths = queue_depths
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(" ");

    format!(
        "stats: routed={} rejected={} fetched={} stored={} skipped={} errors={} discovered={} queues=[{}]",
        snapshot.routed,
        snapshot.rejected,
        snapshot.fetched,
        snapshot.stored,
        snapshot.skipped,
        snapshot.errors,
        snapshot.discovered,
        depths
    )
}
