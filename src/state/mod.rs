//! Per-run crawl state
//!
//! Both structures live for exactly one run and are discarded at shutdown;
//! cross-restart memory is the file queue plus the on-disk metadata records.
//! Each guards its own mutex so unrelated state never contends on a shared
//! lock.

mod seen;
mod throttle;

pub use seen::SeenSet;
pub use throttle::HostThrottle;
