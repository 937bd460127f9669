use crate::url::matches_wildcard;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Everything the crawler needs for one run
#[derive(Debug, Clone)]
pub struct CrawlerOptions {
    /// Path to the queue file (one URL per line)
    pub queue_path: PathBuf,

    /// Database root directory
    pub db_dir: PathBuf,

    /// Path to the error log file
    pub error_log_path: PathBuf,

    /// Minimum interval between requests to the same host
    pub throttle: Duration,

    /// Do not refetch a gemtext page younger than this
    pub recrawl_window: Duration,

    /// Maximum response size to save for non-textual paths, in KB
    pub max_response_kb: usize,

    /// Number of concurrent workers
    pub workers: usize,

    /// Operator deny rules
    pub policy: DenyPolicy,
}

impl Default for CrawlerOptions {
    fn default() -> Self {
        Self {
            queue_path: PathBuf::from("queue.txt"),
            db_dir: PathBuf::from("data"),
            error_log_path: PathBuf::from("error_queue.log"),
            throttle: Duration::from_millis(1500),
            recrawl_window: Duration::from_secs(768 * 3600),
            max_response_kb: 500,
            workers: 4,
            policy: DenyPolicy::default(),
        }
    }
}

/// Operator-supplied site exclusions
///
/// Patterns are substring matches against the raw candidate; hosts are
/// wildcard matches against the canonical host. These are operator policy,
/// not crawler invariants.
#[derive(Debug, Clone, Default)]
pub struct DenyPolicy {
    pub patterns: Vec<String>,
    pub hosts: Vec<String>,
}

impl DenyPolicy {
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty() && self.hosts.is_empty()
    }

    /// Whether a raw candidate matches any deny pattern
    pub fn is_denied_url(&self, candidate: &str) -> bool {
        self.patterns.iter().any(|p| candidate.contains(p.as_str()))
    }

    /// Whether a canonical host matches any deny-host rule
    pub fn is_denied_host(&self, host: &str) -> bool {
        self.hosts.iter().any(|p| matches_wildcard(p, host))
    }
}

/// On-disk shape of the policy file
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyFile {
    #[serde(default)]
    pub deny: Vec<DenyPatternEntry>,

    #[serde(default, rename = "deny-host")]
    pub deny_host: Vec<DenyHostEntry>,
}

/// A substring pattern matched against raw candidates
#[derive(Debug, Clone, Deserialize)]
pub struct DenyPatternEntry {
    pub pattern: String,
}

/// A wildcard host rule (e.g. "*.flood.example")
#[derive(Debug, Clone, Deserialize)]
pub struct DenyHostEntry {
    pub host: String,
}

impl From<PolicyFile> for DenyPolicy {
    fn from(file: PolicyFile) -> Self {
        Self {
            patterns: file.deny.into_iter().map(|e| e.pattern).collect(),
            hosts: file
                .deny_host
                .into_iter()
                .map(|e| e.host.to_lowercase())
                .collect(),
        }
    }
}
