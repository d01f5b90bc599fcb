// src/config/mod.rs

//! Persistent configuration
//!
//! Two files live in the config directory:
//!
//! - `ai_config.json` - provider selection, model settings, feature flags
//! - `.env` - API keys as plain `KEY=value` lines
//!
//! # Example ai_config.json
//!
//! ```json
//! {
//!   "provider": "gemini",
//!   "features": { "auto_fix": true, "max_fix_iterations": 3 },
//!   "rate_limit": { "requests_per_minute": 20 }
//! }
//! ```
//!
//! Every field has a default, so partial files are fine. A config file that
//! fails to parse is never fatal: the documented defaults are used instead.

mod env_file;

pub use env_file::EnvFile;

use crate::error::{Error, Result};
use crate::provider::ProviderKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Config file name inside the config directory
pub const CONFIG_FILE_NAME: &str = "ai_config.json";

/// Env file name inside the config directory
pub const ENV_FILE_NAME: &str = ".env";

/// Directory name under the platform config dir
const APP_DIR_NAME: &str = "next2expo";

/// Resolve the config directory (`~/.config/next2expo` on Linux)
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

/// Top-level AI configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiConfig {
    /// Selected provider
    #[serde(default)]
    pub provider: ProviderKind,

    /// Per-provider model settings, keyed by provider name
    #[serde(default = "default_providers")]
    pub providers: BTreeMap<String, ProviderSettings>,

    /// Conversion feature flags
    #[serde(default)]
    pub features: FeatureFlags,

    /// Request pacing and retry settings
    #[serde(default)]
    pub rate_limit: RateLimitSettings,

    /// Fixed timeout for one HTTP request
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Project analysis settings
    #[serde(default)]
    pub analysis: AnalysisSettings,
}

/// Model settings for one provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSettings {
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Override for the completion endpoint (proxies, tests)
    #[serde(default)]
    pub endpoint: Option<String>,
}

/// Feature flags controlling the conversion pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureFlags {
    /// Ask the provider for a conversion plan before converting files
    #[serde(default = "default_true")]
    pub ai_planning: bool,
    /// Run the regex fixer over generated files
    #[serde(default = "default_true")]
    pub auto_fix: bool,
    /// Send issues the regex fixer could not resolve back to the provider once
    #[serde(default)]
    pub ai_fix: bool,
    #[serde(default = "default_fix_iterations")]
    pub max_fix_iterations: u32,
    /// Generate the navigator from the planned screens
    #[serde(default = "default_true")]
    pub generate_navigation: bool,
}

/// Rate limiting and retry configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLimitSettings {
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_base_delay_secs")]
    pub base_delay_secs: u64,
    #[serde(default = "default_max_delay_secs")]
    pub max_delay_secs: u64,
}

/// Analysis configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSettings {
    /// Glob patterns (relative, `/`-separated) excluded from scanning
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_temperature() -> f32 {
    0.1
}

fn default_max_tokens() -> u32 {
    8000
}

fn default_fix_iterations() -> u32 {
    3
}

fn default_requests_per_minute() -> u32 {
    20
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_delay_secs() -> u64 {
    2
}

fn default_max_delay_secs() -> u64 {
    30
}

fn default_providers() -> BTreeMap<String, ProviderSettings> {
    let mut providers = BTreeMap::new();
    providers.insert(
        ProviderKind::Mistral.to_string(),
        ProviderSettings {
            model: "mistral-large-latest".to_string(),
            temperature: default_temperature(),
            max_tokens: 8000,
            endpoint: None,
        },
    );
    providers.insert(
        ProviderKind::Gemini.to_string(),
        ProviderSettings {
            model: "gemini-1.5-flash".to_string(),
            temperature: default_temperature(),
            max_tokens: 8192,
            endpoint: None,
        },
    );
    providers
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            ai_planning: true,
            auto_fix: true,
            ai_fix: false,
            max_fix_iterations: default_fix_iterations(),
            generate_navigation: true,
        }
    }
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            requests_per_minute: default_requests_per_minute(),
            max_retries: default_max_retries(),
            base_delay_secs: default_base_delay_secs(),
            max_delay_secs: default_max_delay_secs(),
        }
    }
}

impl RateLimitSettings {
    /// Minimum spacing between two requests
    pub fn min_interval(&self) -> Duration {
        if self.requests_per_minute == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs(60) / self.requests_per_minute
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            providers: default_providers(),
            features: FeatureFlags::default(),
            rate_limit: RateLimitSettings::default(),
            request_timeout_secs: default_timeout_secs(),
            analysis: AnalysisSettings::default(),
        }
    }
}

impl AiConfig {
    /// Load the config from `path`, falling back to defaults
    ///
    /// A missing file or malformed JSON both yield `AiConfig::default()`.
    pub fn load(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", path.display());
                return Self::default();
            }
            Err(e) => {
                warn!("Failed to read {}: {}; using defaults", path.display(), e);
                return Self::default();
            }
        };

        match serde_json::from_str::<AiConfig>(&content) {
            Ok(mut config) => {
                // Fill in settings for providers the file does not mention
                for (kind, settings) in default_providers() {
                    config.providers.entry(kind).or_insert(settings);
                }
                config
            }
            Err(e) => {
                warn!(
                    "Malformed config {}: {}; using defaults",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Write the config as pretty JSON, creating the parent directory
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::IoError(format!("Failed to create directory {}: {e}", parent.display()))
            })?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json + "\n").map_err(|e| {
            Error::IoError(format!("Failed to write {}: {e}", path.display()))
        })?;
        debug!("Saved config to {}", path.display());
        Ok(())
    }

    /// Settings for `kind`, or the built-in defaults
    pub fn settings_for(&self, kind: ProviderKind) -> ProviderSettings {
        let key = kind.to_string();
        self.providers
            .get(&key)
            .cloned()
            .or_else(|| default_providers().remove(&key))
            .unwrap_or(ProviderSettings {
                model: String::new(),
                temperature: default_temperature(),
                max_tokens: default_max_tokens(),
                endpoint: None,
            })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = AiConfig::load(&temp.path().join(CONFIG_FILE_NAME));
        assert_eq!(config, AiConfig::default());
    }

    #[test]
    fn test_request_timeout_from_config() {
        assert_eq!(AiConfig::default().request_timeout(), Duration::from_secs(120));

        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, r#"{ "request_timeout_secs": 30 }"#).unwrap();
        assert_eq!(AiConfig::load(&path).request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_malformed_json_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "{ \"provider\": \"gemini\", ").unwrap();

        let config = AiConfig::load(&path);
        assert_eq!(config, AiConfig::default());
        assert_eq!(config.provider, ProviderKind::Mistral);
    }

    #[test]
    fn test_unknown_provider_value_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, r#"{ "provider": "openai" }"#).unwrap();

        assert_eq!(AiConfig::load(&path), AiConfig::default());
    }

    #[test]
    fn test_partial_file_is_completed_with_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(
            &path,
            r#"{ "provider": "gemini", "features": { "auto_fix": false } }"#,
        )
        .unwrap();

        let config = AiConfig::load(&path);
        assert_eq!(config.provider, ProviderKind::Gemini);
        assert!(!config.features.auto_fix);
        assert!(config.features.ai_planning);
        assert_eq!(config.features.max_fix_iterations, 3);
        assert_eq!(config.rate_limit.max_retries, 3);
        assert_eq!(config.providers.len(), 2);
    }

    #[test]
    fn test_provider_selection_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join(CONFIG_FILE_NAME);

        let config = AiConfig {
            provider: ProviderKind::Gemini,
            ..Default::default()
        };
        config.save(&path).unwrap();

        let loaded = AiConfig::load(&path);
        assert_eq!(loaded.provider, ProviderKind::Gemini);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_min_interval() {
        let mut limits = RateLimitSettings::default();
        limits.requests_per_minute = 60;
        assert_eq!(limits.min_interval(), Duration::from_secs(1));

        limits.requests_per_minute = 0;
        assert_eq!(limits.min_interval(), Duration::ZERO);
    }
}
