use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current schema version of the metadata record
pub const META_VERSION: u32 = 1;

/// Status tag recorded after a successful fetch and save
pub const STATUS_SUCCESS: &str = "success";

/// Per-page metadata record, stored as pretty-printed JSON beside the
/// content file
///
/// On errors only the metadata record is written: `status` carries a short
/// tag (`status-<N>`, `too-large`, `save-error`, `request-error`,
/// `canon-error`), `mime` is empty, and `size_bytes` reflects whatever body
/// was received before the failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageMeta {
    /// Canonical URL of the page
    pub url: String,

    /// When the page was last crawled (UTC)
    pub last_crawled: DateTime<Utc>,

    /// Outcome of the last crawl
    pub status: String,

    /// Server-declared media type (empty on error)
    pub mime: String,

    /// Size of the stored body in bytes (0 on pre-fetch errors)
    pub size_bytes: u64,

    /// Schema version
    pub version: u32,
}

impl PageMeta {
    /// Builds a fresh success record stamped with the current time
    pub fn success(url: &str, mime: &str, size_bytes: u64) -> Self {
        Self {
            url: url.to_string(),
            last_crawled: Utc::now(),
            status: STATUS_SUCCESS.to_string(),
            mime: mime.to_string(),
            size_bytes,
            version: META_VERSION,
        }
    }

    /// Builds a fresh error record with the given status tag
    pub fn error(url: &str, status: &str, size_bytes: u64) -> Self {
        Self {
            url: url.to_string(),
            last_crawled: Utc::now(),
            status: status.to_string(),
            mime: String::new(),
            size_bytes,
            version: META_VERSION,
        }
    }

    /// Whether the stored media type is gemtext
    pub fn is_gemtext(&self) -> bool {
        self.mime
            .to_ascii_lowercase()
            .starts_with(crate::gemini::GEMINI_MEDIA_TYPE)
    }
}
