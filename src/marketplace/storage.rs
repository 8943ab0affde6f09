//! File-backed marketplace settings.
//!
//! Reads and writes marketplace keys in the `key = value` configuration file
//! shared with [`crate::config::Config`]. Writes touch only the affected line.

use std::collections::HashMap;
use std::fs;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::parse_line;

use super::collaborators::{InstanceConfig, MarketplaceSettings};
use super::error::MarketplaceError;

/// Default marketplace base URL.
pub const DEFAULT_BASE_URL: &str = "https://marketplace.orangehrm.com";

/// Key holding the marketplace base URL.
pub const KEY_BASE_URL: &str = "marketplace_base_url";
/// Key holding the issued OAuth2 client id.
pub const KEY_CLIENT_ID: &str = "marketplace_client_id";
/// Key holding the issued OAuth2 client secret.
pub const KEY_CLIENT_SECRET: &str = "marketplace_client_secret";
/// Key holding the instance identifier.
pub const KEY_INSTANCE_IDENTIFIER: &str = "instance_identifier";
/// Key holding the instance identifier checksum.
pub const KEY_INSTANCE_CHECKSUM: &str = "instance_identifier_checksum";

/// Maximum number of lines read from the settings file.
const MAX_LINES: usize = 1000;

/// Marketplace settings persisted in the configuration file.
#[derive(Debug, Clone)]
pub struct SettingsFile {
    /// Path to the configuration file.
    path: PathBuf,
    /// Marketplace-related values read from the file.
    values: HashMap<String, String>,
}

impl SettingsFile {
    /// Loads settings from `path`. A missing file yields empty settings.
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let mut values = HashMap::new();

        let file = match fs::File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(Self { path, values });
            }
            Err(e) => return Err(e),
        };

        for line in BufReader::new(file).lines().take(MAX_LINES) {
            let line = line?;
            if let Some((key, value)) = parse_line(&line) {
                if is_marketplace_key(key) && !value.is_empty() {
                    values.insert(key.to_string(), value.to_string());
                }
            }
        }

        debug!(
            "[MARKETPLACE] Loaded {} settings from {}",
            values.len(),
            path.display()
        );
        Ok(Self { path, values })
    }

    /// Returns the settings file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns a stored value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Stores a value in memory and in the file.
    ///
    /// Values that would not read back unchanged (line breaks, surrounding
    /// whitespace, a `#` after whitespace) are rejected with `InvalidInput`.
    pub fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        if key.trim().is_empty() || key.contains(['=', '\n', '\r']) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid settings key '{}'", key.escape_debug()),
            ));
        }
        let line = format!("{} = {}", key, value);
        if value.contains(['\n', '\r']) || parse_line(&line) != Some((key, value)) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("value for '{}' cannot be stored verbatim", key),
            ));
        }

        update_setting(&self.path, key, value)?;
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    /// Removes stored client credentials, forcing a new handshake.
    pub fn clear_credentials(&mut self) -> io::Result<()> {
        remove_setting(&self.path, KEY_CLIENT_ID)?;
        remove_setting(&self.path, KEY_CLIENT_SECRET)?;
        self.values.remove(KEY_CLIENT_ID);
        self.values.remove(KEY_CLIENT_SECRET);
        Ok(())
    }

    fn required(&self, key: &str) -> Result<String, MarketplaceError> {
        self.get(key)
            .map(String::from)
            .ok_or_else(|| MarketplaceError::Settings(format!("'{}' is not configured", key)))
    }
}

impl InstanceConfig for SettingsFile {
    fn instance_identifier(&self) -> Result<String, MarketplaceError> {
        self.required(KEY_INSTANCE_IDENTIFIER)
    }

    fn instance_identifier_checksum(&self) -> Result<String, MarketplaceError> {
        self.required(KEY_INSTANCE_CHECKSUM)
    }
}

impl MarketplaceSettings for SettingsFile {
    fn base_url(&self) -> Result<String, MarketplaceError> {
        Ok(self.get(KEY_BASE_URL).unwrap_or(DEFAULT_BASE_URL).to_string())
    }

    fn set_base_url(&mut self, base_url: &str) -> Result<(), MarketplaceError> {
        Ok(self.set(KEY_BASE_URL, base_url)?)
    }

    fn client_id(&self) -> Option<String> {
        self.get(KEY_CLIENT_ID).map(String::from)
    }

    fn set_client_id(&mut self, client_id: &str) -> Result<(), MarketplaceError> {
        Ok(self.set(KEY_CLIENT_ID, client_id)?)
    }

    fn client_secret(&self) -> Option<String> {
        self.get(KEY_CLIENT_SECRET).map(String::from)
    }

    fn set_client_secret(&mut self, client_secret: &str) -> Result<(), MarketplaceError> {
        Ok(self.set(KEY_CLIENT_SECRET, client_secret)?)
    }
}

fn is_marketplace_key(key: &str) -> bool {
    matches!(
        key,
        KEY_BASE_URL
            | KEY_CLIENT_ID
            | KEY_CLIENT_SECRET
            | KEY_INSTANCE_IDENTIFIER
            | KEY_INSTANCE_CHECKSUM
    )
}

/// Updates a single setting in the file, appending it if absent.
fn update_setting(path: &Path, key: &str, value: &str) -> io::Result<()> {
    let content = fs::read_to_string(path).unwrap_or_default();
    let mut lines: Vec<String> = content.lines().map(String::from).collect();

    let mut found = false;
    for line in lines.iter_mut().take(MAX_LINES) {
        if line_has_key(line, key) {
            *line = format!("{} = {}", key, value);
            found = true;
            break;
        }
    }

    if !found {
        lines.push(format!("{} = {}", key, value));
    }

    write_lines(path, &lines)
}

/// Removes a setting from the file.
fn remove_setting(path: &Path, key: &str) -> io::Result<()> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };

    let lines: Vec<&str> = content
        .lines()
        .filter(|line| !line_has_key(line, key))
        .collect();

    write_lines(path, &lines)
}

fn line_has_key(line: &str, key: &str) -> bool {
    line.trim()
        .split_once('=')
        .is_some_and(|(k, _)| k.trim() == key)
}

fn write_lines<L: AsRef<str>>(path: &Path, lines: &[L]) -> io::Result<()> {
    let mut file = fs::File::create(path)?;
    for line in lines {
        writeln!(file, "{}", line.as_ref())?;
    }
    Ok(())
}
