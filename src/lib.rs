//! Gemcrawl: a polite, resumable crawler for Geminispace
//!
//! This crate implements a crawler for the Gemini protocol that discovers
//! documents by following gemtext links, fetches each page at most once per
//! refresh window, and stores content plus metadata in a stable on-disk
//! layout that companion readers consume directly.

pub mod config;
pub mod crawler;
pub mod gemini;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for gemcrawl operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Gemini protocol error: {0}")]
    Gemini(#[from] gemini::GeminiError),

    #[error("Queue file unreadable at {path}: {source}")]
    QueueUnreadable {
        path: String,
        source: std::io::Error,
    },

    #[error("Cannot create database root at {path}: {source}")]
    DbUncreatable {
        path: String,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read policy file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Missing host in URL")]
    MissingHost,

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Result type alias for gemcrawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{CrawlerOptions, DenyPolicy};
pub use crawler::{crawl, crawl_with_fetcher, CrawlSummary, Job};
pub use gemini::{Fetcher, GeminiClient, Response};
pub use storage::{PageMeta, PageStore};
pub use self::url::{normalize, page_id};
