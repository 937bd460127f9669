use crate::config::types::{CrawlerOptions, PolicyFile};
use crate::ConfigError;
use std::time::Duration;

/// Validates runtime options before the crawler starts
pub fn validate_options(options: &CrawlerOptions) -> Result<(), ConfigError> {
    if options.workers < 1 || options.workers > 64 {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and 64, got {}",
            options.workers
        )));
    }

    if options.max_response_kb < 1 {
        return Err(ConfigError::Validation(
            "max-kb must be at least 1".to_string(),
        ));
    }

    if options.throttle > Duration::from_secs(600) {
        return Err(ConfigError::Validation(format!(
            "throttle-ms must be at most 600000, got {}",
            options.throttle.as_millis()
        )));
    }

    if options.queue_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "queue path cannot be empty".to_string(),
        ));
    }

    if options.db_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "db directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates a parsed policy file
pub fn validate_policy(policy: &PolicyFile) -> Result<(), ConfigError> {
    for entry in &policy.deny {
        if entry.pattern.is_empty() {
            return Err(ConfigError::Validation(
                "deny pattern cannot be empty".to_string(),
            ));
        }
    }

    for entry in &policy.deny_host {
        let host = entry.host.strip_prefix("*.").unwrap_or(&entry.host);
        if host.is_empty() || host.contains('*') {
            return Err(ConfigError::Validation(format!(
                "invalid deny-host pattern: '{}'",
                entry.host
            )));
        }
    }

    Ok(())
}
