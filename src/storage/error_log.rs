//! Append-only fetch-failure log
//!
//! One tab-separated record per failure: canonical URL, UTC timestamp
//! (RFC 3339), single-line message. The log is informational and replayable
//! by operators; write failures are swallowed so logging can never take a
//! worker down.

use chrono::{SecondsFormat, Utc};
use parking_lot::Mutex;
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct ErrorLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl ErrorLog {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Appends one failure record
    ///
    /// Newlines, carriage returns, and tabs in the message are flattened to
    /// spaces so every record stays a single line with exactly two tab
    /// separators.
    pub fn record(&self, canonical: &str, message: &str) {
        let _guard = self.lock.lock();

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                let _ = std::fs::create_dir_all(parent);
            }
        }

        let mut file = match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
        {
            Ok(file) => file,
            Err(_) => return,
        };

        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let message = sanitize(message);
        let _ = writeln!(file, "{}\t{}\t{}", canonical, timestamp, message);
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn sanitize(message: &str) -> String {
    message.replace(['\n', '\r', '\t'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_record_format() {
        let dir = TempDir::new().unwrap();
        let log = ErrorLog::new(dir.path().join("error.log"));

        log.record("gemini://example.org/", "some\nmultiline\terror");

        let content = std::fs::read_to_string(log.path()).unwrap();
        let line = content.trim_end();
        let fields: Vec<&str> = line.split('\t').collect();
        assert_eq!(fields.len(), 3, "expected 3 fields in {:?}", line);
        assert_eq!(fields[0], "gemini://example.org/");
        assert!(fields[1].ends_with('Z'), "timestamp not UTC: {}", fields[1]);
        assert!(!fields[2].contains('\n'));
    }

    #[test]
    fn test_records_append() {
        let dir = TempDir::new().unwrap();
        let log = ErrorLog::new(dir.path().join("error.log"));

        log.record("gemini://example.org/a", "first");
        log.record("gemini://example.org/b", "second");

        let content = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn test_creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let log = ErrorLog::new(dir.path().join("logs").join("error.log"));

        log.record("gemini://example.org/", "boom");

        assert!(log.path().exists());
    }
}
