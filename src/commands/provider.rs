// src/commands/provider.rs
//! Provider management commands

use anyhow::{Context, Result, bail};
use next2expo::ProviderKind;
use next2expo::prompt::UserPrompt;
use next2expo::provider::ProviderManager;
use std::path::Path;
use strum::IntoEnumIterator;

fn load(config_dir: &Path) -> Result<ProviderManager> {
    ProviderManager::load(config_dir)
        .with_context(|| format!("Failed to load configuration from {}", config_dir.display()))
}

/// Show the selected provider and key status
pub fn cmd_provider_show(config_dir: &Path) -> Result<()> {
    let manager = load(config_dir)?;
    let config = manager.config();
    let selected = manager.selected();

    println!("Config: {}", manager.config_path().display());
    println!();
    for kind in ProviderKind::iter() {
        let settings = config.settings_for(kind);
        let marker = if kind == selected { "*" } else { " " };
        let key = if manager.api_key(kind).is_some() { "key set" } else { "no key" };
        println!("{} {:<8} {:<28} {}", marker, kind.to_string(), settings.model, key);
    }

    let features = &config.features;
    println!();
    println!("Features:");
    println!("  ai_planning: {}", features.ai_planning);
    println!("  auto_fix: {} (max {} passes)", features.auto_fix, features.max_fix_iterations);
    println!("  ai_fix: {}", features.ai_fix);
    println!("  generate_navigation: {}", features.generate_navigation);
    println!(
        "Rate limit: {} requests/min, {} retries",
        config.rate_limit.requests_per_minute, config.rate_limit.max_retries
    );
    Ok(())
}

/// Persist the provider selection
pub fn cmd_provider_select(name: &str, config_dir: &Path) -> Result<()> {
    let mut manager = load(config_dir)?;
    let kind = ProviderKind::parse(name)?;
    manager.select(kind)?;
    println!("Selected provider: {}", kind.display_name());
    if manager.api_key(kind).is_none() {
        println!("No API key yet; run `next2expo provider set-key {}`", kind);
    }
    Ok(())
}

/// Store an API key, prompting when none is given
pub fn cmd_provider_set_key(name: &str, key: Option<&str>, config_dir: &Path) -> Result<()> {
    let mut manager = load(config_dir)?;
    let kind = ProviderKind::parse(name)?;
    let key = match key {
        Some(key) => key.to_string(),
        None => match UserPrompt::detect().api_key(kind)? {
            Some(key) => key,
            None => bail!("No key given and no terminal to prompt on"),
        },
    };
    manager.set_api_key(kind, &key)?;
    println!("Stored {} key", kind.display_name());
    Ok(())
}

/// Interactive provider setup
pub fn cmd_provider_setup(config_dir: &Path) -> Result<()> {
    let mut manager = load(config_dir)?;
    let prompt = UserPrompt::detect();

    let configured = manager.configured_providers();
    let Some(kind) = prompt.choose_provider(manager.selected(), &configured)? else {
        bail!("Setup needs an interactive terminal; use `provider select` and `provider set-key`");
    };
    manager.select(kind)?;

    let replace = manager.api_key(kind).is_none()
        || prompt.confirm(&format!("Replace the existing {} key?", kind.display_name()), false)?;
    if replace {
        if let Some(key) = prompt.api_key(kind)? {
            manager.set_api_key(kind, &key)?;
        }
    }

    println!("{} is ready.", kind.display_name());
    Ok(())
}
