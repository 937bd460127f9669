/// Checks if a host matches a wildcard deny pattern
///
/// Two pattern forms are supported:
/// 1. Exact match: "example.org" matches only "example.org"
/// 2. Wildcard match: "*.example.org" matches "example.org" itself and any
///    subdomain, however deeply nested
///
/// # Arguments
///
/// * `pattern` - The host pattern, optionally starting with "*."
/// * `candidate` - The lowercased host to check
pub fn matches_wildcard(pattern: &str, candidate: &str) -> bool {
    if let Some(base) = pattern.strip_prefix("*.") {
        candidate == base || candidate.ends_with(&format!(".{}", base))
    } else {
        candidate == pattern
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert!(matches_wildcard("example.org", "example.org"));
        assert!(!matches_wildcard("example.org", "other.org"));
        assert!(!matches_wildcard("example.org", "sub.example.org"));
    }

    #[test]
    fn test_wildcard_matches_bare_host() {
        assert!(matches_wildcard("*.example.org", "example.org"));
    }

    #[test]
    fn test_wildcard_matches_subdomains() {
        assert!(matches_wildcard("*.example.org", "gem.example.org"));
        assert!(matches_wildcard("*.example.org", "a.b.example.org"));
    }

    #[test]
    fn test_wildcard_rejects_suffix_lookalike() {
        assert!(!matches_wildcard("*.example.org", "badexample.org"));
        assert!(!matches_wildcard("*.example.org", "example.org.evil"));
    }
}
