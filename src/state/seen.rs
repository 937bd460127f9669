use parking_lot::Mutex;
use std::collections::HashSet;

/// Set of canonical URLs already handled this run
///
/// Suppresses both re-enqueueing of discovered links and repeat fetch
/// attempts when the intake channel delivers the same link several times
/// within a run.
pub struct SeenSet {
    inner: Mutex<HashSet<String>>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HashSet::new()),
        }
    }

    /// Marks a canonical URL as seen
    ///
    /// Returns `true` if the URL was not in the set before.
    pub fn insert(&self, canonical: &str) -> bool {
        self.inner.lock().insert(canonical.to_string())
    }

    /// Checks membership without mutating the set
    pub fn contains(&self, canonical: &str) -> bool {
        self.inner.lock().contains(canonical)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

impl Default for SeenSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_insert_is_new() {
        let seen = SeenSet::new();
        assert!(seen.insert("gemini://example.org/"));
        assert!(!seen.insert("gemini://example.org/"));
    }

    #[test]
    fn test_contains_does_not_mutate() {
        let seen = SeenSet::new();
        assert!(!seen.contains("gemini://example.org/a"));
        assert!(seen.insert("gemini://example.org/a"));
        assert!(seen.contains("gemini://example.org/a"));
        assert_eq!(seen.len(), 1);
    }
}
