//! Gemtext link extractor
//!
//! A link directive is a line of the form `=> <reference> [label]`. The
//! extractor resolves every reference against the page's own URL and emits
//! canonical strings. Preformatted fences are deliberately not honored:
//! link directives inside ``` blocks are still followed, matching server
//! link semantics (interactive readers hide them when rendering, the
//! crawler does not).

use crate::url::normalize;
use url::Url;

/// Extracts canonical link targets from a gemtext body
///
/// Non-gemini references (http, mailto, ...) and unparseable references are
/// discarded silently.
pub fn extract_links(base: &Url, body: &[u8]) -> Vec<String> {
    let text = String::from_utf8_lossy(body);
    let mut links = Vec::new();

    for line in text.split('\n') {
        let line = line.trim();

        let rest = match line.strip_prefix("=>") {
            Some(rest) => rest,
            None => continue,
        };

        // First whitespace-delimited token is the reference; the remainder
        // is the human label
        let reference = match rest.split_whitespace().next() {
            Some(reference) => reference,
            None => continue,
        };

        let resolved = match base.join(reference) {
            Ok(resolved) => resolved,
            Err(_) => continue,
        };

        match normalize(resolved.as_str()) {
            Ok((_, canonical)) => links.push(canonical),
            Err(_) => continue,
        }
    }

    links
}
