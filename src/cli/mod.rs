// src/cli/mod.rs
//! CLI definitions for next2expo
//!
//! This module contains all command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.
//!
//! - `analyze` - Inspect a Next.js project
//! - `convert` - Convert a Next.js project into an Expo project
//! - `fix` - Run the regex fixer over a generated tree
//! - `provider` - Provider selection and API keys

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

mod provider;

pub use provider::ProviderCommands;

#[derive(Parser)]
#[command(name = "next2expo")]
#[command(author = "next2expo Contributors")]
#[command(version)]
#[command(about = "Convert Next.js projects to React Native/Expo with an LLM provider", long_about = None)]
pub struct Cli {
    /// Directory holding ai_config.json and .env
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for `analyze`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a Next.js project and print a summary
    Analyze {
        /// Next.js project directory
        source: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Write the JSON analysis to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert a Next.js project into an Expo project
    Convert {
        /// Next.js project directory
        source: PathBuf,

        /// Destination directory for the Expo project
        dest: PathBuf,

        /// Provider to use for this run (mistral, gemini)
        #[arg(long)]
        provider: Option<String>,

        /// Skip the AI planning call and use the default plan
        #[arg(long)]
        no_ai_plan: bool,

        /// Show the plan without writing anything
        #[arg(long)]
        dry_run: bool,

        /// Write into a non-empty destination
        #[arg(long)]
        force: bool,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,

        /// Convert without a provider, applying only the regex fixer
        #[arg(long)]
        offline: bool,
    },

    /// Fix web-only constructs in a generated Expo tree
    Fix {
        /// Directory to fix
        dir: PathBuf,

        /// Only report issues, do not modify files
        #[arg(long)]
        check: bool,

        /// Maximum fix passes per file (default from config)
        #[arg(long)]
        max_iterations: Option<u32>,
    },

    /// Provider selection and API keys
    #[command(subcommand)]
    Provider(ProviderCommands),
}
