//! On-disk storage for crawled pages
//!
//! Pages live under the database root in a layout that companion readers
//! consume directly, with no API in between:
//!
//! ```text
//! <db>/<host>/pages/<id>.<ext>
//! <db>/<host>/pages/meta/<id>.meta.json
//! ```
//!
//! Every write goes through a tmp-then-rename on the same filesystem, so a
//! reader never observes a half-written content or metadata file.

pub mod error_log;
mod meta;
mod page_store;
pub mod queue;

pub use error_log::ErrorLog;
pub use meta::{PageMeta, META_VERSION, STATUS_SUCCESS};
pub use page_store::PageStore;
pub use queue::QueueWriter;

use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Maps a server-declared media type to a content-file extension
///
/// The variant set is closed on purpose; anything unrecognized lands on
/// `.bin`.
pub fn extension_for_media_type(mime: &str) -> &'static str {
    let lower = mime.to_ascii_lowercase();
    if lower.starts_with("text/gemini") {
        ".gmi"
    } else if lower.starts_with("text/") {
        ".txt"
    } else if lower.starts_with("image/jpeg") {
        ".jpg"
    } else if lower.starts_with("image/png") {
        ".png"
    } else {
        ".bin"
    }
}
