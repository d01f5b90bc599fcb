// src/config/env_file.rs

//! Plain `KEY=value` env file holding API keys

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// An env file loaded into memory
///
/// Comments and blank lines are not preserved on save; keys are written
/// in sorted order.
#[derive(Debug, Clone, Default)]
pub struct EnvFile {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl EnvFile {
    /// Load `path`; a missing file yields an empty set of entries
    pub fn load(path: &Path) -> Result<Self> {
        let entries = match fs::read_to_string(path) {
            Ok(content) => parse_env(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(Error::IoError(format!(
                    "Failed to read {}: {e}",
                    path.display()
                )));
            }
        };

        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Write all entries back to the file
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::IoError(format!("Failed to create directory {}: {e}", parent.display()))
            })?;
        }

        let mut content = String::new();
        for (key, value) in &self.entries {
            content.push_str(key);
            content.push('=');
            content.push_str(&quote_if_needed(value));
            content.push('\n');
        }

        fs::write(&self.path, content).map_err(|e| {
            Error::IoError(format!("Failed to write {}: {e}", self.path.display()))
        })?;
        debug!("Saved {} key(s) to {}", self.entries.len(), self.path.display());
        Ok(())
    }
}

/// Parse env file content into key/value pairs
fn parse_env(content: &str) -> BTreeMap<String, String> {
    let mut entries = BTreeMap::new();

    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);

        let Some((key, value)) = line.split_once('=') else {
            debug!("Skipping env line {} without '='", index + 1);
            continue;
        };

        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        entries.insert(key.to_string(), unquote(value.trim()).to_string());
    }

    entries
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

fn quote_if_needed(value: &str) -> String {
    if value.contains(char::is_whitespace) || value.contains('#') {
        format!("\"{value}\"")
    } else {
        value.to_string()
    }
}
