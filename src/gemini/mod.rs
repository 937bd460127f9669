//! Gemini protocol support
//!
//! Types and constants for the Gemini wire protocol, the `Fetcher` seam the
//! crawler core consumes, and a TLS client implementation. The crawler never
//! touches sockets directly; workers call through `Fetcher` so the network
//! layer can be swapped out (the integration tests script it).

mod client;

pub use client::GeminiClient;

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

/// Media type of gemtext documents
pub const GEMINI_MEDIA_TYPE: &str = "text/gemini";

/// Maximum number of transparent redirects followed per request
pub const MAX_REDIRECTS: u32 = 4;

/// Status classes, the first digit of the two-digit wire status
pub const STATUS_INCORRECT: i32 = -1;
pub const STATUS_INPUT: i32 = 1;
pub const STATUS_SUCCESS: i32 = 2;
pub const STATUS_REDIRECT: i32 = 3;
pub const STATUS_TEMPORARY_FAILURE: i32 = 4;
pub const STATUS_PERMANENT_FAILURE: i32 = 5;
pub const STATUS_CLIENT_CERT_REQUIRED: i32 = 6;

/// A Gemini response: status class, header meta, and body
///
/// The body is only populated for success responses; for redirects the
/// client follows `meta` internally, so a redirect status never surfaces
/// here.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: i32,
    pub meta: String,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: i32, meta: String, body: Vec<u8>) -> Self {
        Self { status, meta, body }
    }

    pub fn empty() -> Self {
        Self::new(STATUS_INCORRECT, String::new(), Vec::new())
    }
}

/// Errors raised by the protocol client
#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("http(s) links aren't supported")]
    HttpLink,

    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Connection to {host} failed: {message}")]
    Connect { host: String, message: String },

    #[error("TLS handshake with {host} failed: {message}")]
    Tls { host: String, message: String },

    #[error("Request timed out for {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed response header: {0:?}")]
    MalformedHeader(String),

    #[error("Unknown response status: {0:?}")]
    UnknownStatus(String),

    #[error("Too many redirects, last url: {0}")]
    TooManyRedirects(String),
}

/// The single operation the crawler core consumes
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Performs a Gemini request with transparent redirect handling
    async fn fetch(&self, url: &Url) -> Result<Response, GeminiError>;
}

/// Fully qualifies a raw link for a request: gemini scheme, explicit port
///
/// Rejects http(s) links outright; prepends `gemini://` when the scheme is
/// missing; fills in the default port when none is present.
pub fn full_gemini_link(raw: &str) -> Result<Url, GeminiError> {
    if raw.starts_with("http") {
        return Err(GeminiError::HttpLink);
    }

    let qualified = if raw.starts_with("gemini://") {
        raw.to_string()
    } else {
        format!("gemini://{}", raw)
    };

    let mut url = Url::parse(&qualified).map_err(|e| GeminiError::Parse(e.to_string()))?;

    if url.port().is_none() {
        url.set_port(Some(crate::url::DEFAULT_PORT))
            .map_err(|_| GeminiError::Parse(format!("cannot set port on {}", qualified)))?;
    }

    Ok(url)
}
