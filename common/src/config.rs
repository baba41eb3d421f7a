//! Environment variable parsing helpers
//!
//! Provides ergonomic helpers for reading configuration from environment variables.

use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::str::FromStr;

/// Suffix of the companion variable that points at a file holding the value.
pub const FILE_SUFFIX: &str = "_FILE";

/// Extension trait for parsing environment variables.
///
/// Provides convenient methods for reading env vars with defaults, secrets,
/// and type parsing.
pub trait ConfigExt {
    /// Get an environment variable with a default value.
    ///
    /// # Example
    /// ```ignore
    /// let host = String::env_or("MONGO_HOST", "127.0.0.1");
    /// ```
    fn env_or(name: &str, default: &str) -> String {
        env::var(name).unwrap_or_else(|_| default.to_string())
    }

    /// Get an environment variable parsed as a specific type.
    ///
    /// Returns `default` if the variable is not set or fails to parse.
    ///
    /// # Example
    /// ```ignore
    /// let port: u16 = u16::env_parse("MONGO_PORT", 27017);
    /// ```
    fn env_parse<T: FromStr>(name: &str, default: T) -> T {
        env::var(name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Get an environment variable, treating an empty value as unset.
    fn env_nonempty(name: &str) -> Option<String> {
        env::var(name).ok().filter(|v| !v.is_empty())
    }

    /// Get a secret from `NAME` or, failing that, from the file named by `NAME_FILE`.
    ///
    /// The direct variable wins when both are set. File content is trimmed.
    /// Returns `Ok(None)` when neither yields a non-empty value, and an error
    /// only when `NAME_FILE` is set but the file cannot be read.
    ///
    /// # Example
    /// ```ignore
    /// let pass = String::env_secret("MONGODB_SMARTER_PASS")?;
    /// ```
    fn env_secret(name: &str) -> Result<Option<String>> {
        if let Some(value) = Self::env_nonempty(name) {
            return Ok(Some(value));
        }

        let file_var = format!("{}{}", name, FILE_SUFFIX);
        let Some(path) = Self::env_nonempty(&file_var) else {
            return Ok(None);
        };

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {} from {}", name, path))?;
        let value = content.trim().to_string();

        Ok(if value.is_empty() { None } else { Some(value) })
    }
}

// Blanket implementation for all types
impl<T> ConfigExt for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn clear(names: &[&str]) {
        for name in names {
            env::remove_var(name);
        }
    }

    #[test]
    #[serial]
    fn test_env_or_falls_back_to_default() {
        clear(&["COMMON_TEST_HOST"]);
        assert_eq!(String::env_or("COMMON_TEST_HOST", "127.0.0.1"), "127.0.0.1");

        env::set_var("COMMON_TEST_HOST", "mongo");
        assert_eq!(String::env_or("COMMON_TEST_HOST", "127.0.0.1"), "mongo");
        clear(&["COMMON_TEST_HOST"]);
    }

    #[test]
    #[serial]
    fn test_env_parse_ignores_garbage() {
        env::set_var("COMMON_TEST_PORT", "not-a-port");
        assert_eq!(u16::env_parse("COMMON_TEST_PORT", 27017), 27017);

        env::set_var("COMMON_TEST_PORT", "27018");
        assert_eq!(u16::env_parse("COMMON_TEST_PORT", 27017), 27018);
        clear(&["COMMON_TEST_PORT"]);
    }

    #[test]
    #[serial]
    fn test_env_nonempty_treats_empty_as_unset() {
        env::set_var("COMMON_TEST_EMPTY", "");
        assert_eq!(String::env_nonempty("COMMON_TEST_EMPTY"), None);
        clear(&["COMMON_TEST_EMPTY"]);
    }

    #[test]
    #[serial]
    fn test_env_secret_reads_file() {
        clear(&["COMMON_TEST_SECRET", "COMMON_TEST_SECRET_FILE"]);

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "s3cr3t").unwrap();
        env::set_var("COMMON_TEST_SECRET_FILE", file.path());

        assert_eq!(
            String::env_secret("COMMON_TEST_SECRET").unwrap(),
            Some("s3cr3t".to_string())
        );

        env::set_var("COMMON_TEST_SECRET", "direct");
        assert_eq!(
            String::env_secret("COMMON_TEST_SECRET").unwrap(),
            Some("direct".to_string())
        );

        clear(&["COMMON_TEST_SECRET", "COMMON_TEST_SECRET_FILE"]);
    }

    #[test]
    #[serial]
    fn test_env_secret_missing_file_is_error() {
        clear(&["COMMON_TEST_SECRET2"]);
        env::set_var("COMMON_TEST_SECRET2_FILE", "/nonexistent/secret");

        assert!(String::env_secret("COMMON_TEST_SECRET2").is_err());

        clear(&["COMMON_TEST_SECRET2_FILE"]);
        assert_eq!(String::env_secret("COMMON_TEST_SECRET2").unwrap(), None);
    }
}
