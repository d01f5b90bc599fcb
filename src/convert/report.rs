// src/convert/report.rs

//! Conversion report written next to the generated project

use super::plan::{ConversionPlan, NavigationPlan, PlanOrigin, plan_summary};
use crate::error::Result;
use crate::fixer::Issue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use strum_macros::Display;

/// Report file name inside the destination
pub const REPORT_FILE_NAME: &str = "conversion-report.json";

/// Outcome for one source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FileStatus {
    Converted,
    Skipped,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fixes_applied: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remaining_issues: Vec<Issue>,
    #[serde(default)]
    pub ai_fix: bool,
}

impl FileRecord {
    pub fn skipped(source: &str, reason: impl Into<String>) -> Self {
        Self {
            source: source.to_string(),
            target: None,
            status: FileStatus::Skipped,
            reason: Some(reason.into()),
            fixes_applied: Vec::new(),
            remaining_issues: Vec::new(),
            ai_fix: false,
        }
    }

    pub fn failed(source: &str, target: &str, reason: impl Into<String>) -> Self {
        Self {
            target: Some(target.to_string()),
            status: FileStatus::Failed,
            ..Self::skipped(source, reason)
        }
    }
}

/// Full report of one conversion run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionReport {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    pub dry_run: bool,
    pub plan_origin: PlanOrigin,
    pub plan_summary: BTreeMap<String, usize>,
    pub navigation: NavigationPlan,
    pub dependencies: Vec<String>,
    pub scaffold: Vec<String>,
    pub assets_copied: usize,
    pub files: Vec<FileRecord>,
    pub provider_requests: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ConversionReport {
    pub fn new(source: &Path, destination: &Path, plan: &ConversionPlan) -> Self {
        Self {
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
            started_at: Utc::now(),
            finished_at: None,
            provider: None,
            dry_run: false,
            plan_origin: plan.origin,
            plan_summary: plan_summary(plan),
            navigation: plan.navigation.clone(),
            dependencies: plan.dependencies.clone(),
            scaffold: Vec::new(),
            assets_copied: 0,
            files: Vec::new(),
            provider_requests: 0,
            warnings: Vec::new(),
        }
    }

    pub fn count(&self, status: FileStatus) -> usize {
        self.files.iter().filter(|f| f.status == status).count()
    }

    pub fn record(&self, source: &str) -> Option<&FileRecord> {
        self.files.iter().find(|f| f.source == source)
    }

    /// Issues left in converted files
    pub fn residual_issues(&self) -> usize {
        self.files.iter().map(|f| f.remaining_issues.len()).sum()
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn duration_secs(&self) -> Option<i64> {
        self.finished_at.map(|end| (end - self.started_at).num_seconds())
    }

    /// Write the report into `dir`
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(REPORT_FILE_NAME);
        fs::create_dir_all(dir)?;
        fs::write(&path, serde_json::to_string_pretty(self)? + "\n")?;
        Ok(path)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_counts_and_save() {
        let temp = TempDir::new().unwrap();
        let mut report = ConversionReport::new(Path::new("web"), temp.path(), &ConversionPlan::default());
        report.files.push(FileRecord::skipped("pages/api/a.ts", "server only"));
        report.files.push(FileRecord::failed("pages/b.tsx", "src/screens/BScreen.tsx", "disk full"));
        report.files.push(FileRecord {
            source: "pages/index.tsx".to_string(),
            target: Some("src/screens/HomeScreen.tsx".to_string()),
            status: FileStatus::Converted,
            reason: None,
            fixes_applied: vec!["onClick to onPress".to_string()],
            remaining_issues: Vec::new(),
            ai_fix: false,
        });
        report.finish();

        assert_eq!(report.count(FileStatus::Skipped), 1);
        assert_eq!(report.count(FileStatus::Failed), 1);
        assert_eq!(report.count(FileStatus::Converted), 1);
        assert!(report.duration_secs().is_some());

        let path = report.save(temp.path()).unwrap();
        assert!(path.ends_with(REPORT_FILE_NAME));
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"status\": \"failed\""));

        let loaded = ConversionReport::load(&path).unwrap();
        assert_eq!(loaded.files, report.files);
    }
}
