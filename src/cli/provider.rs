// src/cli/provider.rs
//! Provider management commands

use clap::Subcommand;

#[derive(Subcommand)]
pub enum ProviderCommands {
    /// Show the selected provider and which keys are configured
    Show,

    /// Select the provider used for conversions
    Select {
        /// Provider name (mistral, gemini)
        name: String,
    },

    /// Store an API key in the config directory's .env file
    SetKey {
        /// Provider name (mistral, gemini)
        name: String,

        /// API key (prompted for when omitted)
        key: Option<String>,
    },

    /// Interactively choose a provider and enter its key
    Setup,
}
