use crate::url::{canonical_string, DEFAULT_PORT};
use sha2::{Digest, Sha256};
use url::Url;

/// Maximum length of the human-readable slug prefix
const SLUG_MAX_LEN: usize = 80;

/// Derives the stable on-disk identifier for a normalized URL
///
/// Returns `(host, id)` where `host` is the lowercased host without the
/// default port (non-default ports are kept, `host:port`) and
/// `id = slug(path) + "__" + hex(sha256(canonical))`.
///
/// The id is deterministic over the canonical form: host case, default-port
/// presence, and fragments never change it. The sha256 suffix makes it
/// collision-resistant while the slug prefix keeps the page directory
/// human-inspectable.
pub fn page_id(url: &Url) -> (String, String) {
    let mut host = url.host_str().unwrap_or_default().to_lowercase();
    if let Some(port) = url.port() {
        if port != DEFAULT_PORT {
            host = format!("{}:{}", host, port);
        }
    }

    let canonical = canonical_string(url);
    let digest = hex::encode(Sha256::digest(canonical.as_bytes()));
    let id = format!("{}__{}", slug_from_path(url.path()), digest);

    (host, id)
}

/// Builds a filesystem-safe slug from the last non-empty path segment
///
/// Runs of characters outside `[A-Za-z0-9._-]` collapse to a single `-`,
/// the result is truncated to 80 characters, and degenerate results map to
/// "page". The root path maps to "root".
fn slug_from_path(path: &str) -> String {
    if path.is_empty() || path == "/" {
        return "root".to_string();
    }

    let last = path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();

    let mut slug = String::with_capacity(last.len());
    let mut in_run = false;
    for c in last.chars() {
        if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
            slug.push(c);
            in_run = false;
        } else if !in_run {
            slug.push('-');
            in_run = true;
        }
    }

    // Slug is pure ASCII at this point, so byte truncation is safe
    slug.truncate(SLUG_MAX_LEN);

    if slug.is_empty() || slug == "-" {
        return "page".to_string();
    }
    slug
}
