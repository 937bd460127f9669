//! End-to-end crawl scenarios
//!
//! These tests run the full pipeline (queue drain, intake routing, workers,
//! storage, link discovery) against a scripted fetcher, so everything except
//! the network is the production path.

use async_trait::async_trait;
use gemcrawl::config::{CrawlerOptions, DenyPolicy};
use gemcrawl::crawler::crawl_with_fetcher;
use gemcrawl::gemini::{Fetcher, GeminiError, Response, STATUS_PERMANENT_FAILURE, STATUS_SUCCESS};
use gemcrawl::storage::PageMeta;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use url::Url;

/// Fetcher returning canned responses, recording every request
struct ScriptedFetcher {
    responses: HashMap<String, Response>,
    hits: Mutex<Vec<(String, Instant)>>,
}

impl ScriptedFetcher {
    fn new() -> Self {
        Self {
            responses: HashMap::new(),
            hits: Mutex::new(Vec::new()),
        }
    }

    fn respond(mut self, url: &str, status: i32, meta: &str, body: &[u8]) -> Self {
        self.responses
            .insert(url.to_string(), Response::new(status, meta.to_string(), body.to_vec()));
        self
    }

    fn hit_count(&self, url: &str) -> usize {
        self.hits.lock().iter().filter(|(u, _)| u == url).count()
    }

    fn hit_times(&self) -> Vec<(String, Instant)> {
        self.hits.lock().clone()
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, url: &Url) -> Result<Response, GeminiError> {
        self.hits.lock().push((url.to_string(), Instant::now()));
        match self.responses.get(url.as_str()) {
            Some(response) => Ok(response.clone()),
            None => Ok(Response::new(
                STATUS_PERMANENT_FAILURE,
                "not found".to_string(),
                Vec::new(),
            )),
        }
    }
}

fn options_for(dir: &Path, queue_lines: &[&str]) -> CrawlerOptions {
    let queue_path = dir.join("queue.txt");
    std::fs::write(&queue_path, format!("{}\n", queue_lines.join("\n"))).unwrap();

    CrawlerOptions {
        queue_path,
        db_dir: dir.join("db"),
        error_log_path: dir.join("error.log"),
        throttle: Duration::from_millis(10),
        recrawl_window: Duration::from_secs(72 * 3600),
        max_response_kb: 500,
        workers: 2,
        policy: DenyPolicy::default(),
    }
}

fn load_meta(db: &Path, host: &str, id: &str) -> PageMeta {
    let path = db.join(host).join("pages").join("meta").join(format!("{}.meta.json", id));
    let bytes = std::fs::read(&path).unwrap_or_else(|e| panic!("meta missing at {:?}: {}", path, e));
    serde_json::from_slice(&bytes).unwrap()
}

fn id_for(canonical: &str, slug: &str) -> String {
    format!("{}__{}", slug, hex::encode(Sha256::digest(canonical.as_bytes())))
}

#[tokio::test]
async fn test_fetch_stores_content_and_appends_discovered_links() {
    let dir = TempDir::new().unwrap();
    let fetcher = Arc::new(
        ScriptedFetcher::new()
            .respond("gemini://example.org:1965/Foo", STATUS_SUCCESS, "text/gemini", b"=> /bar\n")
            .respond("gemini://example.org:1965/bar", STATUS_SUCCESS, "text/gemini", b"# bar\n"),
    );
    let options = options_for(dir.path(), &["gemini://Example.org:1965/Foo#frag"]);
    let db = options.db_dir.clone();
    let queue_path = options.queue_path.clone();

    let summary = crawl_with_fetcher(options, fetcher.clone()).await.unwrap();

    // Content lands under the canonical host with the slug__sha id
    let id = id_for("gemini://example.org/Foo", "Foo");
    let content_path = db.join("example.org").join("pages").join(format!("{}.gmi", id));
    assert_eq!(std::fs::read(&content_path).unwrap(), b"=> /bar\n");

    let meta = load_meta(&db, "example.org", &id);
    assert_eq!(meta.url, "gemini://example.org/Foo");
    assert_eq!(meta.status, "success");
    assert_eq!(meta.mime, "text/gemini");
    assert_eq!(meta.size_bytes, 8);
    assert_eq!(meta.version, 1);

    // The discovered link was appended to the queue file in canonical form
    let queue = std::fs::read_to_string(&queue_path).unwrap();
    assert!(
        queue.lines().any(|l| l == "gemini://example.org/bar"),
        "queue file missing appended link:\n{}",
        queue
    );

    // ... and was crawled in the same run
    assert_eq!(fetcher.hit_count("gemini://example.org:1965/bar"), 1);
    assert_eq!(summary.stored, 2);
    assert_eq!(summary.errors, 0);
}

#[tokio::test]
async fn test_equivalent_urls_fetched_exactly_once() {
    let dir = TempDir::new().unwrap();
    let fetcher = Arc::new(ScriptedFetcher::new().respond(
        "gemini://example.org:1965/a",
        STATUS_SUCCESS,
        "text/gemini",
        b"# a\n",
    ));
    let options = options_for(
        dir.path(),
        &["gemini://example.org/a", "gemini://example.org:1965/a"],
    );

    let summary = crawl_with_fetcher(options, fetcher.clone()).await.unwrap();

    assert_eq!(fetcher.hit_count("gemini://example.org:1965/a"), 1);
    assert_eq!(summary.stored, 1);
    assert_eq!(summary.skipped, 1);
}

#[tokio::test]
async fn test_permanent_failure_writes_error_meta_and_log() {
    let dir = TempDir::new().unwrap();
    let fetcher = Arc::new(ScriptedFetcher::new().respond(
        "gemini://example.org:1965/gone",
        STATUS_PERMANENT_FAILURE,
        "gone",
        b"",
    ));
    let options = options_for(dir.path(), &["gemini://example.org/gone"]);
    let db = options.db_dir.clone();
    let error_log = options.error_log_path.clone();

    let summary = crawl_with_fetcher(options, fetcher).await.unwrap();

    let id = id_for("gemini://example.org/gone", "gone");
    let meta = load_meta(&db, "example.org", &id);
    assert_eq!(meta.status, "status-5");
    assert_eq!(meta.mime, "");
    assert_eq!(meta.size_bytes, 0);

    // No content file, just the meta record
    let pages = db.join("example.org").join("pages");
    let files: Vec<_> = std::fs::read_dir(&pages)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .collect();
    assert!(files.is_empty(), "unexpected content files: {:?}", files);

    let log = std::fs::read_to_string(&error_log).unwrap();
    assert_eq!(log.lines().count(), 1);
    let line = log.lines().next().unwrap();
    assert_eq!(line.matches('\t').count(), 2);
    assert!(line.starts_with("gemini://example.org/gone\t"));

    assert_eq!(summary.errors, 1);
    assert_eq!(summary.stored, 0);
}

#[tokio::test]
async fn test_oversized_non_textual_body_is_rejected() {
    let dir = TempDir::new().unwrap();
    let big = vec![b'x'; 600 * 1024];
    let fetcher = Arc::new(ScriptedFetcher::new().respond(
        "gemini://example.org:1965/archive.tar",
        STATUS_SUCCESS,
        "application/x-tar",
        &big,
    ));
    let options = options_for(dir.path(), &["gemini://example.org/archive.tar"]);
    let db = options.db_dir.clone();

    crawl_with_fetcher(options, fetcher).await.unwrap();

    let id = id_for("gemini://example.org/archive.tar", "archive.tar");
    let meta = load_meta(&db, "example.org", &id);
    assert_eq!(meta.status, "too-large");
    assert_eq!(meta.size_bytes, 614_400);

    let pages = db.join("example.org").join("pages");
    let files: Vec<_> = std::fs::read_dir(&pages)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .collect();
    assert!(files.is_empty(), "oversized body must not be saved");
}

#[tokio::test]
async fn test_body_at_exact_cap_is_saved() {
    let dir = TempDir::new().unwrap();
    let exact = vec![b'x'; 500 * 1024];
    let fetcher = Arc::new(ScriptedFetcher::new().respond(
        "gemini://example.org:1965/archive.tar",
        STATUS_SUCCESS,
        "application/x-tar",
        &exact,
    ));
    let options = options_for(dir.path(), &["gemini://example.org/archive.tar"]);
    let db = options.db_dir.clone();

    let summary = crawl_with_fetcher(options, fetcher).await.unwrap();

    assert_eq!(summary.stored, 1);
    let id = id_for("gemini://example.org/archive.tar", "archive.tar");
    let meta = load_meta(&db, "example.org", &id);
    assert_eq!(meta.status, "success");
    assert_eq!(meta.size_bytes, 512_000);
}

#[tokio::test]
async fn test_same_host_requests_are_paced() {
    let dir = TempDir::new().unwrap();
    let fetcher = Arc::new(
        ScriptedFetcher::new()
            .respond("gemini://example.org:1965/first", STATUS_SUCCESS, "text/gemini", b"# 1\n")
            .respond("gemini://example.org:1965/second", STATUS_SUCCESS, "text/gemini", b"# 2\n"),
    );
    let mut options = options_for(
        dir.path(),
        &["gemini://example.org/first", "gemini://example.org/second"],
    );
    options.throttle = Duration::from_millis(150);

    crawl_with_fetcher(options, fetcher.clone()).await.unwrap();

    let hits = fetcher.hit_times();
    assert_eq!(hits.len(), 2);
    let gap = hits[1].1.duration_since(hits[0].1);
    // Allow scheduler slack below the nominal 150ms
    assert!(gap >= Duration::from_millis(140), "gap was {:?}", gap);
}

#[tokio::test]
async fn test_deny_pattern_excludes_candidates() {
    let dir = TempDir::new().unwrap();
    let fetcher = Arc::new(ScriptedFetcher::new().respond(
        "gemini://example.org:1965/keep",
        STATUS_SUCCESS,
        "text/gemini",
        b"# keep\n",
    ));
    let mut options = options_for(
        dir.path(),
        &["gemini://example.org/keep", "gemini://example.org/mirror/skip"],
    );
    options.policy = DenyPolicy {
        patterns: vec!["/mirror/".to_string()],
        hosts: vec![],
    };

    let summary = crawl_with_fetcher(options, fetcher.clone()).await.unwrap();

    assert_eq!(fetcher.hit_count("gemini://example.org:1965/keep"), 1);
    assert_eq!(fetcher.hit_count("gemini://example.org:1965/mirror/skip"), 0);
    assert_eq!(summary.stored, 1);
}

#[tokio::test]
async fn test_missing_queue_file_is_fatal() {
    let dir = TempDir::new().unwrap();
    let options = CrawlerOptions {
        queue_path: dir.path().join("does-not-exist.txt"),
        db_dir: dir.path().join("db"),
        error_log_path: dir.path().join("error.log"),
        ..CrawlerOptions::default()
    };

    let result = crawl_with_fetcher(options, Arc::new(ScriptedFetcher::new())).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_recent_page_not_refetched_on_second_run() {
    let dir = TempDir::new().unwrap();
    let fetcher = Arc::new(ScriptedFetcher::new().respond(
        "gemini://example.org:1965/page",
        STATUS_SUCCESS,
        "text/gemini",
        b"# page\n",
    ));

    let options = options_for(dir.path(), &["gemini://example.org/page"]);
    crawl_with_fetcher(options.clone(), fetcher.clone()).await.unwrap();
    assert_eq!(fetcher.hit_count("gemini://example.org:1965/page"), 1);

    // Second run with a fresh seen set: the on-disk record keeps it pinned
    crawl_with_fetcher(options, fetcher.clone()).await.unwrap();
    assert_eq!(fetcher.hit_count("gemini://example.org:1965/page"), 1);
}
