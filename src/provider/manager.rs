// src/provider/manager.rs

//! Provider selection and API key management
//!
//! Owns the config directory: the selected provider is persisted to
//! `ai_config.json` as soon as it changes, API keys to `.env`.

use super::client::AiClient;
use super::gemini::GeminiProvider;
use super::http::HttpTransport;
use super::mistral::MistralProvider;
use super::{AiProvider, ProviderKind};
use crate::config::{AiConfig, CONFIG_FILE_NAME, ENV_FILE_NAME, EnvFile};
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use strum::IntoEnumIterator;
use tracing::info;

/// Loads, selects and persists provider configuration
pub struct ProviderManager {
    config_dir: PathBuf,
    config: AiConfig,
    env: EnvFile,
    use_process_env: bool,
}

impl ProviderManager {
    /// Load config and keys from `config_dir`
    pub fn load(config_dir: &Path) -> Result<Self> {
        let config = AiConfig::load(&config_dir.join(CONFIG_FILE_NAME));
        let env = EnvFile::load(&config_dir.join(ENV_FILE_NAME))?;
        Ok(Self {
            config_dir: config_dir.to_path_buf(),
            config,
            env,
            use_process_env: true,
        })
    }

    /// Ignore process environment variables when resolving keys
    pub fn without_process_env(mut self) -> Self {
        self.use_process_env = false;
        self
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut AiConfig {
        &mut self.config
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }

    pub fn selected(&self) -> ProviderKind {
        self.config.provider
    }

    /// Select a provider and persist the choice
    pub fn select(&mut self, kind: ProviderKind) -> Result<()> {
        self.config.provider = kind;
        self.save_config()?;
        info!("Selected provider: {}", kind);
        Ok(())
    }

    /// Persist the current config
    pub fn save_config(&self) -> Result<()> {
        self.config.save(&self.config_path())
    }

    /// API key for `kind`: process environment first, then the env file
    pub fn api_key(&self, kind: ProviderKind) -> Option<String> {
        if self.use_process_env {
            if let Ok(value) = std::env::var(kind.env_key()) {
                if !value.trim().is_empty() {
                    return Some(value.trim().to_string());
                }
            }
        }
        self.env
            .get(kind.env_key())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// Store an API key in the env file
    pub fn set_api_key(&mut self, kind: ProviderKind, key: &str) -> Result<()> {
        let key = key.trim();
        if key.is_empty() {
            return Err(Error::Config(format!("empty API key for {kind}")));
        }
        self.env.set(kind.env_key(), key);
        self.env.save()?;
        info!("Stored {} in {}", kind.env_key(), self.env.path().display());
        Ok(())
    }

    /// Providers that have a usable key
    pub fn configured_providers(&self) -> Vec<ProviderKind> {
        ProviderKind::iter()
            .filter(|kind| self.api_key(*kind).is_some())
            .collect()
    }

    /// Instantiate the selected provider
    pub fn build_provider(&self) -> Result<Box<dyn AiProvider>> {
        let kind = self.selected();
        let api_key = self
            .api_key(kind)
            .ok_or_else(|| Error::MissingApiKey(kind.to_string()))?;
        let settings = self.config.settings_for(kind);
        let transport = HttpTransport::new(self.config.request_timeout())?;

        let provider: Box<dyn AiProvider> = match kind {
            ProviderKind::Mistral => Box::new(MistralProvider::new(transport, api_key, &settings)),
            ProviderKind::Gemini => Box::new(GeminiProvider::new(transport, api_key, &settings)),
        };
        Ok(provider)
    }

    /// Instantiate the selected provider wrapped with pacing and retry
    pub fn build_client(&self) -> Result<AiClient<'static>> {
        let provider = self.build_provider()?;
        Ok(AiClient::from_config(provider, &self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn manager(dir: &Path) -> ProviderManager {
        ProviderManager::load(dir).unwrap().without_process_env()
    }

    #[test]
    fn test_select_persists() {
        let temp = TempDir::new().unwrap();
        let mut mgr = manager(temp.path());
        assert_eq!(mgr.selected(), ProviderKind::Mistral);

        mgr.select(ProviderKind::Gemini).unwrap();

        let reloaded = manager(temp.path());
        assert_eq!(reloaded.selected(), ProviderKind::Gemini);
    }

    #[test]
    fn test_keys_from_env_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(ENV_FILE_NAME), "GEMINI_API_KEY=g-123\n").unwrap();

        let mgr = manager(temp.path());
        assert_eq!(mgr.api_key(ProviderKind::Gemini).as_deref(), Some("g-123"));
        assert_eq!(mgr.api_key(ProviderKind::Mistral), None);
        assert_eq!(mgr.configured_providers(), vec![ProviderKind::Gemini]);
    }

    #[test]
    fn test_set_api_key_persists() {
        let temp = TempDir::new().unwrap();
        let mut mgr = manager(temp.path());
        mgr.set_api_key(ProviderKind::Mistral, "  m-key \n").unwrap();

        let reloaded = manager(temp.path());
        assert_eq!(reloaded.api_key(ProviderKind::Mistral).as_deref(), Some("m-key"));
        assert!(mgr.set_api_key(ProviderKind::Mistral, "   ").is_err());
    }

    #[test]
    fn test_missing_key_is_reported() {
        let temp = TempDir::new().unwrap();
        let mgr = manager(temp.path());
        assert!(matches!(mgr.build_provider(), Err(Error::MissingApiKey(_))));
    }

    #[test]
    fn test_build_provider_for_selection() {
        let temp = TempDir::new().unwrap();
        let mut mgr = manager(temp.path());
        mgr.set_api_key(ProviderKind::Gemini, "g").unwrap();
        mgr.select(ProviderKind::Gemini).unwrap();

        let provider = mgr.build_provider().unwrap();
        assert_eq!(provider.kind(), ProviderKind::Gemini);
    }

    #[test]
    fn test_malformed_config_falls_back() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILE_NAME), "not json").unwrap();

        let mgr = manager(temp.path());
        assert_eq!(mgr.config(), &AiConfig::default());
    }
}
