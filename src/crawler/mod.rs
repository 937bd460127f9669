//! Crawler core
//!
//! The moving parts of a run:
//! - `coordinator` wires up channels and tasks, drains the startup queue,
//!   and detects completion
//! - `scheduler` is the single intake drainer: it filters raw candidates and
//!   routes jobs to workers under the host-affinity rule
//! - `worker` fetches, stores, and feeds discovered links back into intake
//! - `parser` extracts gemtext links
//! - `policy` decides whether a canonical URL should be fetched now

mod coordinator;
pub mod parser;
mod policy;
mod scheduler;
mod worker;

pub use coordinator::{crawl, crawl_with_fetcher, CrawlSummary};
pub use parser::extract_links;
pub use policy::should_fetch;

use url::Url;

/// A fully-formed unit of work bound for one worker
///
/// Carries everything derived during intake so workers never re-parse:
/// the normalized URL, its canonical string, and the on-disk page address.
#[derive(Debug, Clone)]
pub struct Job {
    /// Normalized parsed URL (base for link resolution)
    pub url: Url,

    /// Canonical string form
    pub canonical: String,

    /// Canonical host, without the default port
    pub host: String,

    /// On-disk page identifier
    pub id: String,
}

impl Job {
    /// Builds a job from a normalized URL
    pub fn from_url(url: Url, canonical: String) -> Self {
        let (host, id) = crate::url::page_id(&url);
        Self {
            url,
            canonical,
            host,
            id,
        }
    }
}
