// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: provider name
fn provider_name_arg() -> Arg {
    Arg::new("name")
        .required(true)
        .value_name("PROVIDER")
        .help("Provider name (mistral, gemini)")
}

fn flag(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).action(ArgAction::SetTrue).help(help)
}

fn build_cli() -> Command {
    Command::new("next2expo")
        .version(env!("CARGO_PKG_VERSION"))
        .author("next2expo Contributors")
        .about("Convert Next.js projects to React Native/Expo with an LLM provider")
        .subcommand_required(true)
        .arg(
            Arg::new("config_dir")
                .long("config-dir")
                .value_name("DIR")
                .global(true)
                .help("Directory holding ai_config.json and .env"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Verbose output (debug logging)"),
        )
        .subcommand(
            Command::new("analyze")
                .about("Analyze a Next.js project and print a summary")
                .arg(Arg::new("source").required(true).help("Next.js project directory"))
                .arg(
                    Arg::new("format")
                        .long("format")
                        .value_parser(["text", "json"])
                        .default_value("text")
                        .help("Output format"),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("FILE")
                        .help("Write the JSON analysis to this file"),
                ),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert a Next.js project into an Expo project")
                .arg(Arg::new("source").required(true).help("Next.js project directory"))
                .arg(Arg::new("dest").required(true).help("Destination directory for the Expo project"))
                .arg(
                    Arg::new("provider")
                        .long("provider")
                        .value_name("PROVIDER")
                        .help("Provider to use for this run (mistral, gemini)"),
                )
                .arg(flag("no-ai-plan", "Skip the AI planning call and use the default plan"))
                .arg(flag("dry-run", "Show the plan without writing anything"))
                .arg(flag("force", "Write into a non-empty destination"))
                .arg(
                    Arg::new("yes")
                        .short('y')
                        .long("yes")
                        .action(ArgAction::SetTrue)
                        .help("Do not ask for confirmation"),
                )
                .arg(flag("offline", "Convert without a provider, applying only the regex fixer")),
        )
        .subcommand(
            Command::new("fix")
                .about("Fix web-only constructs in a generated Expo tree")
                .arg(Arg::new("dir").required(true).help("Directory to fix"))
                .arg(flag("check", "Only report issues, do not modify files"))
                .arg(
                    Arg::new("max_iterations")
                        .long("max-iterations")
                        .value_name("N")
                        .help("Maximum fix passes per file (default from config)"),
                ),
        )
        .subcommand(
            Command::new("provider")
                .about("Provider selection and API keys")
                .subcommand_required(true)
                .subcommand(Command::new("show").about("Show the selected provider and which keys are configured"))
                .subcommand(
                    Command::new("select")
                        .about("Select the provider used for conversions")
                        .arg(provider_name_arg()),
                )
                .subcommand(
                    Command::new("set-key")
                        .about("Store an API key in the config directory's .env file")
                        .arg(provider_name_arg())
                        .arg(Arg::new("key").help("API key (prompted for when omitted)")),
                )
                .subcommand(Command::new("setup").about("Interactively choose a provider and enter its key")),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("next2expo.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
