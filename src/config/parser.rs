use crate::config::types::{DenyPolicy, PolicyFile};
use crate::config::validation::validate_policy;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses an operator policy file
///
/// # Arguments
///
/// * `path` - Path to the TOML policy file
///
/// # Returns
///
/// * `Ok(DenyPolicy)` - Successfully loaded and validated policy
/// * `Err(ConfigError)` - Failed to read, parse, or validate the file
pub fn load_policy(path: &Path) -> Result<DenyPolicy, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let file: PolicyFile = toml::from_str(&content)?;
    validate_policy(&file)?;
    Ok(file.into())
}

/// Computes a SHA-256 hash of the policy file content
///
/// Logged at startup so operators can tell which exclusion set a run used.
pub fn compute_policy_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a policy and returns both the policy and its content hash
pub fn load_policy_with_hash(path: &Path) -> Result<(DenyPolicy, String), ConfigError> {
    let policy = load_policy(path)?;
    let hash = compute_policy_hash(path)?;
    Ok((policy, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_policy(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_policy() {
        let file = create_temp_policy(
            r#"
[[deny]]
pattern = "/cgi-bin/"

[[deny]]
pattern = "mirror"

[[deny-host]]
host = "*.flood.example"
"#,
        );

        let policy = load_policy(file.path()).unwrap();
        assert_eq!(policy.patterns.len(), 2);
        assert_eq!(policy.hosts, vec!["*.flood.example".to_string()]);
    }

    #[test]
    fn test_empty_policy_is_valid() {
        let file = create_temp_policy("");
        let policy = load_policy(file.path()).unwrap();
        assert!(policy.is_empty());
    }

    #[test]
    fn test_load_policy_with_invalid_path() {
        assert!(load_policy(Path::new("/nonexistent/policy.toml")).is_err());
    }

    #[test]
    fn test_load_policy_with_invalid_toml() {
        let file = create_temp_policy("not toml {{{");
        assert!(load_policy(file.path()).is_err());
    }

    #[test]
    fn test_load_policy_with_empty_pattern_fails_validation() {
        let file = create_temp_policy(
            r#"
[[deny]]
pattern = ""
"#,
        );
        let result = load_policy(file.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_policy_hash_is_stable() {
        let file = create_temp_policy("[[deny]]\npattern = \"x\"\n");
        let hash1 = compute_policy_hash(file.path()).unwrap();
        let hash2 = compute_policy_hash(file.path()).unwrap();
        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_deny_hosts_lowercased() {
        let file = create_temp_policy("[[deny-host]]\nhost = \"*.Flood.Example\"\n");
        let policy = load_policy(file.path()).unwrap();
        assert_eq!(policy.hosts, vec!["*.flood.example".to_string()]);
    }
}
