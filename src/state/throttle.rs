use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Enforces a minimum interval between requests to the same host
///
/// Distinct hosts are fully independent; there is no global rate limit. The
/// last-request map is never held across the sleep: the remaining wait is
/// computed under the lock, the lock is released for the sleep, and the
/// timestamp is stamped on return.
pub struct HostThrottle {
    interval: Duration,
    last_request: Mutex<HashMap<String, Instant>>,
}

impl HostThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_request: Mutex::new(HashMap::new()),
        }
    }

    /// Waits until the host's minimum interval has elapsed, then records now
    /// as the host's most recent request instant
    ///
    /// Successive completions for one host are at least `interval` apart.
    pub async fn wait(&self, host: &str) {
        let remaining = {
            let last = self.last_request.lock();
            last.get(host).and_then(|t| {
                let elapsed = t.elapsed();
                if elapsed < self.interval {
                    Some(self.interval - elapsed)
                } else {
                    None
                }
            })
        };

        if let Some(wait) = remaining {
            tokio::time::sleep(wait).await;
        }

        self.last_request
            .lock()
            .insert(host.to_string(), Instant::now());
    }
}
