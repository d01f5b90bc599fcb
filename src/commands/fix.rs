// src/commands/fix.rs
//! Fixer command

use anyhow::{Context, Result, bail};
use next2expo::config::{AiConfig, CONFIG_FILE_NAME};
use next2expo::fixer::{RuntimeErrorFixer, TreeReport};
use std::path::Path;
use tracing::info;

/// Fix (or with `check`, only validate) every source file under `dir`
pub fn cmd_fix(dir: &Path, check: bool, max_iterations: Option<u32>, config_dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        bail!("{} is not a directory", dir.display());
    }
    let config = AiConfig::load(&config_dir.join(CONFIG_FILE_NAME));
    let max_iterations = max_iterations.unwrap_or(config.features.max_fix_iterations);

    // NativeWind projects style through className
    let nativewind = ["tailwind.config.js", "tailwind.config.ts"]
        .iter()
        .any(|name| dir.join(name).exists());
    let fixer = RuntimeErrorFixer::new().with_nativewind(nativewind);

    let report = if check {
        fixer
            .check_tree(dir)
            .with_context(|| format!("Failed to check {}", dir.display()))?
    } else {
        info!("Fixing {} (up to {} passes per file)", dir.display(), max_iterations);
        fixer
            .fix_tree(dir, max_iterations)
            .with_context(|| format!("Failed to fix {}", dir.display()))?
    };

    print_tree_report(&report, check);

    if check && !report.is_clean() {
        bail!("{} issue(s) found", report.total_remaining());
    }
    Ok(())
}

fn print_tree_report(report: &TreeReport, check: bool) {
    for file in &report.files {
        if file.modified {
            println!("Fixed {}", file.path);
            for applied in &file.applied {
                println!("  + {}", applied);
            }
        }
        for issue in &file.remaining {
            println!("{}:{}: {}", file.path, issue.line, issue.message);
        }
    }

    println!();
    if check {
        println!(
            "Checked {} file(s): {} issue(s)",
            report.files_checked(),
            report.total_remaining()
        );
    } else {
        println!(
            "Checked {} file(s), modified {}, {} issue(s) remain",
            report.files_checked(),
            report.files_modified(),
            report.total_remaining()
        );
    }
}
