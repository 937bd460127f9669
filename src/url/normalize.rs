use crate::url::{DEFAULT_PORT, GEMINI_SCHEME};
use crate::{UrlError, UrlResult};
use url::Url;

/// Normalizes a raw URL into its parsed and canonical forms
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace
/// 2. Parse the URL; if the scheme is missing, assume `gemini://`
/// 3. Reject any scheme other than `gemini`
/// 4. Clear the fragment
/// 5. Lowercase the host
/// 6. Force the path to "/" when empty
/// 7. Build the canonical string without the default port, preserving the
///    raw query verbatim
///
/// Two inputs that differ only in host case, default-port presence, or
/// fragment normalize to the same canonical string.
///
/// # Arguments
///
/// * `raw` - The URL string to normalize
///
/// # Returns
///
/// * `Ok((Url, String))` - The normalized URL and its canonical form
/// * `Err(UrlError)` - The input cannot be parsed or uses another scheme
pub fn normalize(raw: &str) -> UrlResult<(Url, String)> {
    let trimmed = raw.trim();

    let mut url = match Url::parse(trimmed) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            // No scheme present; retry as a gemini URL
            Url::parse(&format!("{}://{}", GEMINI_SCHEME, trimmed))
                .map_err(|e| UrlError::Parse(e.to_string()))?
        }
        Err(e) => return Err(UrlError::Parse(e.to_string())),
    };

    if url.scheme() != GEMINI_SCHEME {
        return Err(UrlError::UnsupportedScheme(url.scheme().to_string()));
    }

    url.set_fragment(None);

    let host = url
        .host_str()
        .ok_or(UrlError::MissingHost)?
        .to_lowercase();
    url.set_host(Some(&host))
        .map_err(|e| UrlError::Malformed(e.to_string()))?;

    if url.path().is_empty() {
        url.set_path("/");
    }

    let canonical = canonical_string(&url);
    Ok((url, canonical))
}

/// Builds the canonical string form of a normalized URL
///
/// The canonical form is `gemini://<host><path>[?query]` with the default
/// port stripped and the fragment absent. The query is carried verbatim
/// because Gemini servers differentiate responses by query.
pub fn canonical_string(url: &Url) -> String {
    let mut out = String::from("gemini://");

    if let Some(host) = url.host_str() {
        out.push_str(&host.to_lowercase());
    }

    match url.port() {
        Some(port) if port != DEFAULT_PORT => {
            out.push(':');
            out.push_str(&port.to_string());
        }
        _ => {}
    }

    let path = url.path();
    if path.is_empty() {
        out.push('/');
    } else {
        out.push_str(path);
    }

    if let Some(query) = url.query() {
        out.push('?');
        out.push_str(query);
    }

    out
}
