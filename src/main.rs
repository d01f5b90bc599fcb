// src/main.rs

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands, ProviderCommands};
use next2expo::config::default_config_dir;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_dir = cli.config_dir.unwrap_or_else(default_config_dir);

    match cli.command {
        Commands::Analyze {
            source,
            format,
            output,
        } => commands::cmd_analyze(&source, format, output.as_deref(), &config_dir),

        Commands::Convert {
            source,
            dest,
            provider,
            no_ai_plan,
            dry_run,
            force,
            yes,
            offline,
        } => commands::cmd_convert(
            commands::ConvertArgs {
                source: &source,
                dest: &dest,
                provider: provider.as_deref(),
                no_ai_plan,
                dry_run,
                force,
                yes,
                offline,
            },
            &config_dir,
        ),

        Commands::Fix {
            dir,
            check,
            max_iterations,
        } => commands::cmd_fix(&dir, check, max_iterations, &config_dir),

        Commands::Provider(command) => match command {
            ProviderCommands::Show => commands::cmd_provider_show(&config_dir),
            ProviderCommands::Select { name } => commands::cmd_provider_select(&name, &config_dir),
            ProviderCommands::SetKey { name, key } => {
                commands::cmd_provider_set_key(&name, key.as_deref(), &config_dir)
            }
            ProviderCommands::Setup => commands::cmd_provider_setup(&config_dir),
        },
    }
}
