//! Recrawl policy
//!
//! Decides whether a routed job should actually hit the network. The intake
//! channel can deliver the same link many times within a run; the seen set
//! absorbs those. Across runs the on-disk metadata record carries the
//! decision: gemtext pages refresh after the recrawl window, everything else
//! stays pinned (images and archives are heavy and rarely change, so
//! refetching them amplifies bandwidth for no gain).

use crate::crawler::Job;
use crate::state::SeenSet;
use crate::storage::{PageStore, StorageResult};
use chrono::Utc;
use std::time::Duration;

/// Whether `job` should be fetched now
///
/// 1. Already seen this run → false (and the URL is marked seen otherwise)
/// 2. No metadata on disk → true
/// 3. Corrupt metadata → true (refetching repairs the record)
/// 4. Stored media type is not gemtext → false
/// 5. Younger than the recrawl window → false, else true
///
/// An I/O failure reading the record is reported so the caller can log it
/// and move on.
pub fn should_fetch(
    seen: &SeenSet,
    store: &PageStore,
    job: &Job,
    recrawl_window: Duration,
) -> StorageResult<bool> {
    if !seen.insert(&job.canonical) {
        return Ok(false);
    }

    let meta = match store.load_meta(&job.host, &job.id)? {
        Some(meta) => meta,
        None => return Ok(true),
    };

    if !meta.is_gemtext() {
        return Ok(false);
    }

    let age = Utc::now().signed_duration_since(meta.last_crawled);
    match age.to_std() {
        Ok(age) => Ok(age >= recrawl_window),
        // last_crawled in the future (clock skew): treat as fresh
        Err(_) => Ok(false),
    }
}
