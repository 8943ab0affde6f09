//! Configuration module for hrm-marketplace.
//!
//! Handles loading and parsing the .hrmrc configuration file.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::logging::LogConfig;
use crate::marketplace::DEFAULT_TIMEOUT_SECS;

/// Upper bound for the request timeout setting.
const MAX_TIMEOUT_SECS: u64 = 600;

/// Default .hrmrc file content with all settings documented.
const DEFAULT_HRMRC: &str = r#"# HRM Marketplace Configuration File
# ==================================
# This file is read on startup.
# Lines starting with '#' are comments. A '#' preceded by whitespace
# starts an inline comment; a '#' inside a value is kept.
#
# Marketplace
# -----------
# marketplace_base_url = https://marketplace.orangehrm.com
#
# Client credentials are written here automatically after the first
# successful handshake. Remove both lines to register again.
# marketplace_client_id = ...
# marketplace_client_secret = ...

# Instance Identity
# -----------------
# Identifier and checksum of this deployment, sent during the handshake
# and with purchase requests.
# instance_identifier = ...
# instance_identifier_checksum = ...

# Network
# -------
# request_timeout = 30     # Seconds before an outward call is abandoned

# Logging Configuration
# ---------------------
# Logs are stored in ~/.hrm-marketplace/logs/ with automatic cleanup.
#
# log_enabled = true       # Enable/disable file logging (true/false)
# log_level = info         # Log level: trace, debug, info, warn, error, off
# log_retention = 24       # Hours to keep log files (default: 24)
# log_directory = /var/log/hrm-marketplace
"#;

/// Application configuration.
///
/// Marketplace keys (base URL, instance identity, client credentials) are
/// owned by [`crate::marketplace::SettingsFile`] and skipped here.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to config file.
    pub config_path: PathBuf,
    /// Per-call timeout for marketplace requests.
    pub request_timeout: Duration,
    /// Logging configuration.
    pub log_config: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: Self::default_config_path(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            log_config: LogConfig::default(),
        }
    }
}

impl Config {
    /// Returns the default config file path (~/.hrmrc).
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".hrmrc")
    }

    /// Loads configuration from the default path, creating it if it doesn't exist.
    ///
    /// # Errors
    /// Returns error if config cannot be read.
    pub fn load() -> io::Result<Self> {
        let path = Self::default_config_path();
        Self::load_from(&path)
    }

    /// Loads configuration from a specific path.
    ///
    /// # Errors
    /// Returns error if config cannot be read or the default cannot be created.
    pub fn load_from(path: &Path) -> io::Result<Self> {
        if !path.exists() {
            Self::create_default_config(path)?;
        }

        let content = fs::read_to_string(path)?;
        let mut config = Self {
            config_path: path.to_path_buf(),
            ..Self::default()
        };
        config.parse(&content);

        Ok(config)
    }

    /// Creates the default config file.
    fn create_default_config(path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut file = fs::File::create(path)?;
        file.write_all(DEFAULT_HRMRC.as_bytes())?;
        Ok(())
    }

    /// Parses the config file content.
    fn parse(&mut self, content: &str) {
        for (key, value) in content.lines().filter_map(parse_line) {
            self.apply_setting(key, value);
        }
    }

    /// Applies a single setting.
    fn apply_setting(&mut self, key: &str, value: &str) {
        match key {
            "request_timeout" => {
                if let Ok(secs) = value.parse::<u64>() {
                    if secs > 0 {
                        self.request_timeout = Duration::from_secs(secs.min(MAX_TIMEOUT_SECS));
                    }
                }
            }
            "log_level" => {
                self.log_config.level = LogConfig::parse_level(value);
            }
            "log_retention" | "log_retention_hours" => {
                self.log_config.retention_hours = LogConfig::parse_retention(value);
            }
            "log_directory" => {
                self.log_config.directory = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
            "log_enabled" | "logging" => {
                self.log_config.enabled =
                    matches!(value.to_lowercase().as_str(), "true" | "yes" | "1" | "on");
            }
            _ => {}
        }
    }
}

/// Splits a `key = value` line into trimmed key and value.
///
/// Returns `None` for blank lines, comment lines and lines without `=`.
/// An inline comment starts at a `#` preceded by whitespace, so values such
/// as secrets or URL fragments may contain `#`.
#[must_use]
pub fn parse_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let (key, value) = line.split_once('=')?;
    Some((key.trim(), strip_inline_comment(value.trim())))
}

fn strip_inline_comment(value: &str) -> &str {
    if value.starts_with('#') {
        return "";
    }
    let end = value
        .char_indices()
        .zip(value.chars().skip(1))
        .find(|((_, c), next)| c.is_whitespace() && *next == '#')
        .map_or(value.len(), |((i, _), _)| i);
    value[..end].trim_end()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::DEFAULT_LOG_RETENTION_HOURS;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.request_timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert!(config.log_config.enabled);
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(".hrmrc");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.config_path, path);
        assert_eq!(config.log_config.retention_hours, DEFAULT_LOG_RETENTION_HOURS);

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("marketplace_base_url"));
    }

    #[test]
    fn test_parse_settings() {
        let mut config = Config::default();
        config.parse(
            "marketplace_base_url = https://mp.test # staging\n\
             request_timeout = 5 # seconds\n\
             log_level = DEBUG\n\
             log_enabled = off\n\
             log_directory = /var/log/hrm\n\
             unknown_key = ignored\n",
        );

        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.log_config.level, "debug");
        assert!(!config.log_config.enabled);
        assert_eq!(config.log_config.directory, Some(PathBuf::from("/var/log/hrm")));
    }

    #[test]
    fn test_invalid_timeout_ignored() {
        let mut config = Config::default();
        config.parse("request_timeout = soon\n");
        assert_eq!(config.request_timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        config.parse("request_timeout = 0\n");
        assert_eq!(config.request_timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        config.parse("request_timeout = 99999\n");
        assert_eq!(config.request_timeout, Duration::from_secs(MAX_TIMEOUT_SECS));
    }

    #[test]
    fn test_parse_line_keeps_hash_inside_value() {
        assert_eq!(parse_line("secret = abc#def"), Some(("secret", "abc#def")));
        assert_eq!(
            parse_line("url = https://mp.test/#frag # comment"),
            Some(("url", "https://mp.test/#frag"))
        );
        assert_eq!(parse_line("key = value\t# tab comment"), Some(("key", "value")));
        assert_eq!(parse_line("key = # only a comment"), Some(("key", "")));
        assert_eq!(parse_line("key=v"), Some(("key", "v")));
    }

    #[test]
    fn test_parse_line_skips_non_settings() {
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("   "), None);
        assert_eq!(parse_line("# key = value"), None);
        assert_eq!(parse_line("no equals sign"), None);
    }
}
