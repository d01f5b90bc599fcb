// src/commands/analyze.rs
//! Project analysis command

use crate::cli::OutputFormat;
use anyhow::{Context, Result};
use next2expo::analyzer::{FileCategory, Migration, ProjectAnalysis, ProjectAnalyzer};
use next2expo::config::{AiConfig, CONFIG_FILE_NAME};
use std::fs;
use std::path::Path;
use strum::IntoEnumIterator;
use tracing::info;

/// Analyze a Next.js project
pub fn cmd_analyze(source: &Path, format: OutputFormat, output: Option<&Path>, config_dir: &Path) -> Result<()> {
    let config = AiConfig::load(&config_dir.join(CONFIG_FILE_NAME));
    let analysis = ProjectAnalyzer::new(&config.analysis)
        .analyze(source)
        .with_context(|| format!("Failed to analyze {}", source.display()))?;

    if let Some(path) = output {
        fs::write(path, analysis.to_json()?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Analysis written to {}", path.display());
    }

    match format {
        OutputFormat::Json => println!("{}", analysis.to_json()?),
        OutputFormat::Text => print_summary(&analysis),
    }
    Ok(())
}

pub(crate) fn print_summary(analysis: &ProjectAnalysis) {
    println!("Project: {}", analysis.project_name);
    println!("  Router: {}", analysis.router);
    println!("  TypeScript: {}", if analysis.typescript { "yes" } else { "no" });
    if let Some(version) = &analysis.dependencies.next_version {
        println!("  Next.js: {}", version);
    }
    println!(
        "  Files: {} ({} source, {} KB)",
        analysis.structure.total_files,
        analysis.structure.source_files,
        analysis.structure.total_bytes / 1024
    );

    println!();
    println!("Files by category:");
    for category in FileCategory::iter() {
        let count = analysis.structure.count(category);
        if count > 0 {
            println!("  {:<10} {}", category.to_string(), count);
        }
    }

    let features = &analysis.features;
    println!();
    println!("Features:");
    if !features.styling.is_empty() {
        let styling: Vec<String> = features.styling.iter().map(|s| s.to_string()).collect();
        println!("  Styling: {}", styling.join(", "));
    }
    let next_apis: Vec<&str> = [
        ("next/image", features.next_image),
        ("next/link", features.next_link),
        ("next/router", features.next_router),
        ("next/navigation", features.next_navigation),
        ("next/head", features.next_head),
    ]
    .into_iter()
    .filter(|(_, used)| *used)
    .map(|(name, _)| name)
    .collect();
    if !next_apis.is_empty() {
        println!("  Next.js APIs: {}", next_apis.join(", "));
    }
    if !features.state_management.is_empty() {
        println!("  State: {}", features.state_management.join(", "));
    }
    for (function, files) in &features.data_fetching {
        println!("  {}: {} file(s)", function, files.len());
    }
    if features.client_components > 0 {
        println!("  'use client' files: {}", features.client_components);
    }
    for route in &features.api_routes {
        let methods = if route.methods.is_empty() {
            "?".to_string()
        } else {
            route.methods.join(", ")
        };
        println!("  API {} [{}]", route.route, methods);
    }

    let verdicts = &analysis.dependencies.verdicts;
    if !verdicts.is_empty() {
        println!();
        println!("Dependencies:");
        for verdict in verdicts {
            let note = match &verdict.migration {
                Migration::Compatible => continue,
                Migration::Replace { with } => format!("replace with {}", with),
                Migration::Drop { reason } => format!("drop ({})", reason),
                Migration::Incompatible { reason } => format!("INCOMPATIBLE ({})", reason),
            };
            println!("  {:<30} {}", verdict.name, note);
        }
    }
    if let Some(warning) = &analysis.dependencies.warning {
        println!("  Warning: {}", warning);
    }

    let composition = &analysis.composition;
    println!();
    println!(
        "Imports: {} edges between {} files, {} unresolved",
        composition.edges, composition.files, composition.unresolved
    );

    if !analysis.unreadable.is_empty() {
        println!();
        println!("Unreadable files (will be skipped):");
        for file in &analysis.unreadable {
            println!("  {}: {}", file.path, file.reason);
        }
    }
}
