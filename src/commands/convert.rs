// src/commands/convert.rs
//! Conversion command

use super::analyze::print_summary;
use super::progress::CliProgress;
use anyhow::{Context, Result, bail};
use next2expo::{LogProgress, ProgressTracker, ProviderKind};
use next2expo::analyzer::ProjectAnalyzer;
use next2expo::convert::{
    ConversionPlan, ConversionReport, ConvertOptions, FileStatus, ProjectConverter, REPORT_FILE_NAME,
    check_destination,
};
use next2expo::prompt::UserPrompt;
use next2expo::provider::ProviderManager;
use std::io::IsTerminal;
use std::path::Path;
use tracing::info;

/// Arguments of `next2expo convert`
pub struct ConvertArgs<'a> {
    pub source: &'a Path,
    pub dest: &'a Path,
    pub provider: Option<&'a str>,
    pub no_ai_plan: bool,
    pub dry_run: bool,
    pub force: bool,
    pub yes: bool,
    pub offline: bool,
}

/// Convert a Next.js project into an Expo project
pub fn cmd_convert(args: ConvertArgs<'_>, config_dir: &Path) -> Result<()> {
    let mut manager = ProviderManager::load(config_dir)
        .with_context(|| format!("Failed to load configuration from {}", config_dir.display()))?;
    let prompt = UserPrompt::detect();

    if let Some(name) = args.provider {
        // Applies to this run only
        manager.config_mut().provider = ProviderKind::parse(name)?;
    }

    if !args.offline && !args.dry_run {
        ensure_api_key(&mut manager, &prompt)?;
    }

    if !args.dry_run {
        check_destination(args.dest, args.force)?;
    }

    let analysis = ProjectAnalyzer::new(&manager.config().analysis)
        .analyze(args.source)
        .with_context(|| format!("Failed to analyze {}", args.source.display()))?;
    print_summary(&analysis);
    println!();

    let client = if args.offline || (args.dry_run && manager.api_key(manager.selected()).is_none()) {
        None
    } else {
        Some(manager.build_client()?)
    };
    match &client {
        Some(client) => info!("Using provider {}", client.kind()),
        None => info!("No provider; files pass through the regex fixer only"),
    }

    let options = ConvertOptions {
        dry_run: args.dry_run,
        force: args.force,
        ai_planning: if args.no_ai_plan { Some(false) } else { None },
    };
    let progress = progress_tracker();
    let mut converter = ProjectConverter::new(client, manager.config().features.clone(), progress.as_ref())
        .with_options(options);

    let plan = converter.plan(&analysis);
    print_plan(&plan);

    if args.dry_run {
        println!();
        println!("Dry run: nothing written.");
        return Ok(());
    }

    if !args.yes {
        let question = format!("Convert {} files into {}?", plan.file_count(), args.dest.display());
        if !prompt.confirm(&question, true)? {
            println!("Conversion cancelled.");
            return Ok(());
        }
    }

    let report = converter
        .execute(&analysis, &plan, args.dest)
        .with_context(|| format!("Conversion into {} failed", args.dest.display()))?;
    print_report(&report);
    Ok(())
}

/// Progress bar on a terminal, log lines when stderr is redirected
fn progress_tracker() -> Box<dyn ProgressTracker> {
    if std::io::stderr().is_terminal() {
        Box::new(CliProgress::new("Converting"))
    } else {
        Box::new(LogProgress::new("Converting", 0))
    }
}

/// Make sure the selected provider has a key, asking for one if possible
fn ensure_api_key(manager: &mut ProviderManager, prompt: &UserPrompt) -> Result<()> {
    let kind = manager.selected();
    if manager.api_key(kind).is_some() {
        return Ok(());
    }

    if manager.configured_providers().is_empty() {
        if let Some(choice) = prompt.choose_provider(kind, &[])? {
            if choice != kind {
                manager.select(choice)?;
            }
        }
    }

    let kind = manager.selected();
    if manager.api_key(kind).is_some() {
        return Ok(());
    }
    match prompt.api_key(kind)? {
        Some(key) => {
            manager.set_api_key(kind, &key)?;
            Ok(())
        }
        None => bail!(
            "No API key for {}. Set {} or run `next2expo provider set-key {}`",
            kind.display_name(),
            kind.env_key(),
            kind
        ),
    }
}

fn print_plan(plan: &ConversionPlan) {
    println!("Conversion plan ({}):", plan.origin);
    println!(
        "  Navigation: {} starting at {}",
        plan.navigation.kind,
        if plan.navigation.initial_route.is_empty() {
            "-"
        } else {
            plan.navigation.initial_route.as_str()
        }
    );
    for file in plan.files() {
        match &file.screen_name {
            Some(name) => println!("  {} -> {} [{}: {}]", file.source, file.target, file.kind, name),
            None => println!("  {} -> {} [{}]", file.source, file.target, file.kind),
        }
    }
    if !plan.skipped.is_empty() {
        println!("  Skipped:");
        for skipped in &plan.skipped {
            println!("    {} ({})", skipped.source, skipped.reason);
        }
    }
    if !plan.dependencies.is_empty() {
        println!("  Added packages: {}", plan.dependencies.join(", "));
    }
}

fn print_report(report: &ConversionReport) {
    println!();
    println!(
        "Converted {} file(s), skipped {}, failed {}",
        report.count(FileStatus::Converted),
        report.count(FileStatus::Skipped),
        report.count(FileStatus::Failed)
    );
    if report.assets_copied > 0 {
        println!("Copied {} asset(s) to assets/", report.assets_copied);
    }

    for record in report.files.iter().filter(|f| f.status == FileStatus::Failed) {
        println!("  FAILED {}: {}", record.source, record.reason.as_deref().unwrap_or(""));
    }
    for record in report.files.iter().filter(|f| !f.remaining_issues.is_empty()) {
        println!(
            "  {} has {} unresolved issue(s):",
            record.target.as_deref().unwrap_or(&record.source),
            record.remaining_issues.len()
        );
        for issue in &record.remaining_issues {
            println!("    {}", issue);
        }
    }
    for warning in &report.warnings {
        println!("  Warning: {}", warning);
    }

    println!();
    println!("Report: {}", report.destination.join(REPORT_FILE_NAME).display());
    println!("Next steps:");
    println!("  cd {}", report.destination.display());
    println!("  npm install");
    println!("  npx expo start");
}
