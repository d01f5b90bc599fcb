// src/convert/mod.rs

//! Next.js to Expo conversion pipeline
//!
//! analysis → plan (provider, falling back to the default plan) → scaffold
//! → per-file conversion in dependency order → regex fix loop → report.
//!
//! Failures on individual files never stop the run: a provider error after
//! retries marks the file skipped, a filesystem error marks it failed, and
//! whatever was written stays on disk.
//!
//! Without a provider client every planned file is passed through the
//! regex fixer only.

pub mod plan;
pub mod prompts;
pub mod report;
pub mod scaffold;

pub use plan::{ConversionPlan, NavigationKind, PlanOrigin, PlannedFile, TargetKind, default_plan};
pub use report::{ConversionReport, FileRecord, FileStatus, REPORT_FILE_NAME};

use crate::analyzer::composition::resolve_import;
use crate::analyzer::{FileCategory, ProjectAnalysis, StylingSystem, alias_root};
use crate::config::FeatureFlags;
use crate::error::{Error, Result};
use crate::fixer::{Issue, RuntimeErrorFixer};
use crate::progress::ProgressTracker;
use crate::provider::AiClient;
use prompts::{FilePromptContext, SYSTEM_PROMPT};
use regex::Regex;
use scaffold::ScaffoldOptions;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

static LOCAL_SPECIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(['"])((?:\.{1,2}/|@/|~/)[^'"\n]*)(['"])"#).unwrap()
});

static STYLE_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*import\s+(?:[\w$]+\s+from\s+)?['"][^'"\n]+\.(?:css|scss|sass|less)['"][ \t]*;?[ \t]*\r?\n?"#)
        .unwrap()
});

/// Per-run options
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertOptions {
    /// Plan only; write nothing
    pub dry_run: bool,
    /// Allow a non-empty destination
    pub force: bool,
    /// Override the `ai_planning` feature flag
    pub ai_planning: Option<bool>,
}

/// Drives a whole conversion
pub struct ProjectConverter<'a> {
    client: Option<AiClient<'a>>,
    features: FeatureFlags,
    options: ConvertOptions,
    progress: &'a dyn ProgressTracker,
    warnings: Vec<String>,
}

impl<'a> ProjectConverter<'a> {
    pub fn new(client: Option<AiClient<'a>>, features: FeatureFlags, progress: &'a dyn ProgressTracker) -> Self {
        Self {
            client,
            features,
            options: ConvertOptions::default(),
            progress,
            warnings: Vec::new(),
        }
    }

    pub fn with_options(mut self, options: ConvertOptions) -> Self {
        self.options = options;
        self
    }

    fn ai_planning(&self) -> bool {
        self.options.ai_planning.unwrap_or(self.features.ai_planning)
    }

    /// Produce the conversion plan
    ///
    /// Asks the provider when planning is enabled and a client is present;
    /// any failure falls back to [`default_plan`].
    pub fn plan(&mut self, analysis: &ProjectAnalysis) -> ConversionPlan {
        if !self.ai_planning() {
            debug!("AI planning disabled, using default plan");
            return default_plan(analysis);
        }
        let Some(client) = self.client.as_mut() else {
            return default_plan(analysis);
        };

        self.progress.set_message("Planning conversion");
        let request = client.request(SYSTEM_PROMPT, prompts::planning_prompt(analysis));
        let result = client
            .generate(&request)
            .and_then(|reply| plan::parse_plan(&reply, analysis));
        match result {
            Ok(plan) => {
                info!(
                    "Provider plan: {} screens, {} other files, {} skipped",
                    plan.screens.len(),
                    plan.file_count() - plan.screens.len(),
                    plan.skipped.len()
                );
                plan
            }
            Err(e) => {
                let message = format!("AI planning failed ({e}), using default plan");
                warn!("{}", message);
                self.warnings.push(message);
                default_plan(analysis)
            }
        }
    }

    /// Plan and convert `analysis` into `dest`
    pub fn convert(&mut self, analysis: &ProjectAnalysis, dest: &Path) -> Result<ConversionReport> {
        check_destination(dest, self.options.force || self.options.dry_run)?;
        let plan = self.plan(analysis);
        self.execute(analysis, &plan, dest)
    }

    /// Convert with an already computed plan
    pub fn execute(
        &mut self,
        analysis: &ProjectAnalysis,
        plan: &ConversionPlan,
        dest: &Path,
    ) -> Result<ConversionReport> {
        let mut report = ConversionReport::new(&analysis.root, dest, plan);
        report.provider = self.client.as_ref().map(|c| c.kind().to_string());
        report.warnings.append(&mut self.warnings);
        report.files.extend(
            plan.skipped
                .iter()
                .map(|s| FileRecord::skipped(&s.source, s.reason.as_str())),
        );

        if self.options.dry_run {
            info!("Dry run: {} files planned, nothing written", plan.file_count());
            report.dry_run = true;
            report.finish();
            return Ok(report);
        }

        check_destination(dest, self.options.force)?;
        fs::create_dir_all(dest)?;

        let nativewind = analysis.features.styling.contains(&StylingSystem::Tailwind);
        let fixer = RuntimeErrorFixer::new().with_nativewind(nativewind);
        let options = ScaffoldOptions::for_analysis(analysis, self.features.generate_navigation);
        report.scaffold = scaffold::write_scaffold(dest, analysis, plan, options)?;
        info!("Scaffold written: {} files", report.scaffold.len());

        report.assets_copied = copy_assets(analysis, dest, &mut report.warnings);

        let order = ordered_files(analysis, plan);
        self.progress.set_length(order.len() as u64);
        for planned in order {
            self.progress.set_message(&planned.source);
            let record = self.convert_file(analysis, plan, planned, dest, &fixer);
            match record.status {
                FileStatus::Converted => debug!("Converted {} → {}", planned.source, planned.target),
                FileStatus::Skipped | FileStatus::Failed => warn!(
                    "{} {}: {}",
                    record.status,
                    planned.source,
                    record.reason.as_deref().unwrap_or("")
                ),
            }
            report.files.push(record);
            self.progress.increment(1);
        }

        report.provider_requests = self.client.as_ref().map(|c| c.requests_sent()).unwrap_or(0);
        report.finish();

        let summary = format!(
            "{} converted, {} skipped, {} failed",
            report.count(FileStatus::Converted),
            report.count(FileStatus::Skipped),
            report.count(FileStatus::Failed)
        );
        match report.save(dest) {
            Ok(path) => debug!("Report written to {}", path.display()),
            Err(e) => warn!("Could not write {}: {}", REPORT_FILE_NAME, e),
        }
        if report.count(FileStatus::Failed) > 0 {
            self.progress.finish_with_error(&summary);
        } else {
            self.progress.finish_with_message(&summary);
        }
        info!("Conversion finished: {}", summary);
        Ok(report)
    }

    fn convert_file(
        &mut self,
        analysis: &ProjectAnalysis,
        plan: &ConversionPlan,
        planned: &PlannedFile,
        dest: &Path,
        fixer: &RuntimeErrorFixer,
    ) -> FileRecord {
        let source = match fs::read_to_string(analysis.root.join(&planned.source)) {
            Ok(source) => source,
            Err(e) => {
                return FileRecord::failed(&planned.source, &planned.target, format!("read failed: {e}"));
            }
        };

        let import_map = import_map(analysis, plan, planned);
        let generated = match self.client.as_mut() {
            Some(client) => {
                let ctx = FilePromptContext {
                    planned,
                    source: &source,
                    import_map: &import_map,
                    plan,
                    analysis,
                };
                let request = client.request(SYSTEM_PROMPT, prompts::file_prompt(&ctx));
                match client.generate(&request) {
                    Ok(reply) => prompts::extract_code(&reply),
                    Err(e) => {
                        let mut record = FileRecord::skipped(&planned.source, format!("provider error: {e}"));
                        record.target = Some(planned.target.clone());
                        return record;
                    }
                }
            }
            None => source,
        };

        let code = rewrite_imports(&generated, &import_map);
        let (mut code, mut applied, mut remaining) = self.run_fixer(fixer, &code);

        let mut ai_fix = false;
        if self.features.ai_fix && !remaining.is_empty() {
            if let Some(client) = self.client.as_mut() {
                ai_fix = true;
                let request = client.request(
                    SYSTEM_PROMPT,
                    prompts::fix_prompt(&planned.target, &code, &remaining),
                );
                match client.generate(&request) {
                    Ok(reply) => {
                        let candidate = rewrite_imports(&prompts::extract_code(&reply), &import_map);
                        let (fixed, more, left) = self.run_fixer(fixer, &candidate);
                        if left.len() <= remaining.len() {
                            code = fixed;
                            for description in more {
                                if !applied.contains(&description) {
                                    applied.push(description);
                                }
                            }
                            remaining = left;
                        } else {
                            debug!("AI fix for {} made things worse, keeping previous code", planned.target);
                        }
                    }
                    Err(e) => warn!("AI fix for {} failed: {}", planned.target, e),
                }
            }
        }

        let path = dest.join(&planned.target);
        let written = path
            .parent()
            .map_or(Ok(()), fs::create_dir_all)
            .and_then(|_| fs::write(&path, &code));
        if let Err(e) = written {
            return FileRecord::failed(&planned.source, &planned.target, format!("write failed: {e}"));
        }

        FileRecord {
            source: planned.source.clone(),
            target: Some(planned.target.clone()),
            status: FileStatus::Converted,
            reason: None,
            fixes_applied: applied,
            remaining_issues: remaining,
            ai_fix,
        }
    }

    fn run_fixer(&self, fixer: &RuntimeErrorFixer, code: &str) -> (String, Vec<String>, Vec<Issue>) {
        if self.features.auto_fix {
            let report = fixer.fix_until_clean(code, self.features.max_fix_iterations);
            (report.code, report.applied, report.remaining)
        } else {
            (code.to_string(), Vec::new(), fixer.validate(code))
        }
    }
}

/// Fail with `DestinationNotEmpty` unless `dest` is missing, empty, or `force`
pub fn check_destination(dest: &Path, force: bool) -> Result<()> {
    if force || !dest.exists() {
        return Ok(());
    }
    if !dest.is_dir() {
        return Err(Error::DestinationNotEmpty(dest.display().to_string()));
    }
    let mut entries = fs::read_dir(dest)?;
    if entries.next().is_some() {
        return Err(Error::DestinationNotEmpty(dest.display().to_string()));
    }
    Ok(())
}

/// Planned files in dependency-first order
fn ordered_files<'p>(analysis: &ProjectAnalysis, plan: &'p ConversionPlan) -> Vec<&'p PlannedFile> {
    let mut ordered: Vec<&PlannedFile> = analysis
        .conversion_order()
        .iter()
        .filter_map(|source| plan.planned_for(source))
        .collect();
    for file in plan.files() {
        if !ordered.iter().any(|f| f.source == file.source) {
            ordered.push(file);
        }
    }
    ordered
}

/// Local import specifiers of `planned` mapped to their Expo-tree form
fn import_map(analysis: &ProjectAnalysis, plan: &ConversionPlan, planned: &PlannedFile) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    let Some(parsed) = analysis.sources.get(&planned.source) else {
        return map;
    };
    let alias = alias_root(&analysis.config);
    let known = |path: &str| analysis.sources.contains_key(path);

    for import in parsed.imports.iter().filter(|i| i.is_local()) {
        let Some(resolved) = resolve_import(&planned.source, &import.source, alias.as_deref(), &known) else {
            continue;
        };
        if let Some(target) = plan.planned_for(&resolved) {
            let specifier = plan::relative_import(&planned.target, &target.target);
            if specifier != import.source {
                map.insert(import.source.clone(), specifier);
            }
        }
    }
    map
}

/// Point local imports at their converted paths and drop stylesheet imports
pub fn rewrite_imports(code: &str, map: &BTreeMap<String, String>) -> String {
    let without_styles = STYLE_IMPORT.replace_all(code, "");
    if map.is_empty() {
        return without_styles.into_owned();
    }
    LOCAL_SPECIFIER
        .replace_all(&without_styles, |caps: &regex::Captures| match map.get(&caps[2]) {
            Some(to) if caps[1] == caps[3] => format!("{}{}{}", &caps[1], to, &caps[3]),
            _ => caps[0].to_string(),
        })
        .into_owned()
}

/// Copy `public/` assets to `assets/`, returning how many were copied
fn copy_assets(analysis: &ProjectAnalysis, dest: &Path, warnings: &mut Vec<String>) -> usize {
    let mut copied = 0;
    for file in analysis.structure.files_in(FileCategory::Asset) {
        let relative = file.path.strip_prefix("src/").unwrap_or(&file.path);
        let relative = relative.strip_prefix("public/").unwrap_or(relative);
        let target = dest.join("assets").join(relative);
        let result = target
            .parent()
            .map_or(Ok(()), fs::create_dir_all)
            .and_then(|_| fs::copy(analysis.root.join(&file.path), &target));
        match result {
            Ok(_) => copied += 1,
            Err(e) => {
                let message = format!("could not copy asset {}: {}", file.path, e);
                warn!("{}", message);
                warnings.push(message);
            }
        }
    }
    copied
}
