//! File-queue I/O
//!
//! The queue file is the restart anchor: one URL per line, `#` and blank
//! lines are comments. It is read exactly once at startup to seed the intake
//! channel and appended to whenever workers discover links, so re-reading it
//! after a crash replays all unexplored work. Duplicate lines are harmless;
//! the seen set and the recrawl policy filter them downstream.

use crate::url::normalize;
use parking_lot::Mutex;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// Serialized appender for the queue file
///
/// All appends go through one mutex so concurrent workers never interleave
/// partial lines.
pub struct QueueWriter {
    path: PathBuf,
    lock: Mutex<()>,
}

impl QueueWriter {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Appends URLs to the queue file, one canonical form per line
    ///
    /// Each URL is canonicalized again before writing (defense in depth:
    /// everything in the queue file must be canonical) and silently dropped
    /// if canonicalization fails. Write failures are logged and swallowed;
    /// the queue file is a best-effort restart aid, not a transaction log.
    pub fn append(&self, urls: &[String]) {
        let _guard = self.lock.lock();

        let mut file = match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
        {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!("cannot open queue file for append: {}", e);
                return;
            }
        };

        for url in urls {
            let canonical = match normalize(url) {
                Ok((_, canonical)) => canonical,
                Err(_) => continue,
            };
            if let Err(e) = writeln!(file, "{}", canonical) {
                tracing::warn!("queue file append failed: {}", e);
                return;
            }
        }
    }
}

/// Streams the startup queue file into the intake channel
///
/// Skips blank and `#`-prefixed lines, trims the rest, and hands each
/// candidate over in file order. Lines of several megabytes are fine; the
/// reader allocates per line. The outstanding-candidate counter is bumped
/// before every send so the coordinator's completion check can never observe
/// a false zero.
///
/// Returns the number of candidates handed to the intake channel.
pub async fn drain_seed_file(
    file: tokio::fs::File,
    intake: mpsc::Sender<String>,
    pending: Arc<AtomicUsize>,
) -> std::io::Result<usize> {
    let mut lines = BufReader::new(file).lines();
    let mut handed = 0usize;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        pending.fetch_add(1, Ordering::SeqCst);
        if intake.send(line.to_string()).await.is_err() {
            // Intake closed mid-drain (shutdown); the candidate never made it
            pending.fetch_sub(1, Ordering::SeqCst);
            break;
        }
        handed += 1;
    }

    Ok(handed)
}
