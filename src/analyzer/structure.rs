// src/analyzer/structure.rs

//! Project tree scan

use super::classify::{FileCategory, classify, is_source_file};
use crate::error::{Error, Result};
use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use strum_macros::{Display, EnumString};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Directories never descended into
pub const SKIPPED_DIRS: &[&str] = &[
    "node_modules",
    ".next",
    ".git",
    "out",
    "build",
    "dist",
    "coverage",
    ".vercel",
    ".turbo",
    ".expo",
];

/// Which Next.js router the project uses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RouterKind {
    Pages,
    App,
    /// Both `pages/` and `app/` routes
    Hybrid,
    #[default]
    Unknown,
}

/// One scanned file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFile {
    /// Path relative to the project root, `/`-separated
    pub path: String,
    pub category: FileCategory,
    pub size: u64,
    pub is_source: bool,
}

/// Result of walking the project tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureScan {
    /// Files sorted by path
    pub files: Vec<ProjectFile>,
    pub counts: BTreeMap<FileCategory, usize>,
    pub total_files: usize,
    pub source_files: usize,
    pub total_bytes: u64,
    pub router: RouterKind,
    pub typescript: bool,
}

impl StructureScan {
    /// Number of files in `category`
    pub fn count(&self, category: FileCategory) -> usize {
        self.counts.get(&category).copied().unwrap_or(0)
    }

    pub fn files_in(&self, category: FileCategory) -> impl Iterator<Item = &ProjectFile> {
        self.files.iter().filter(move |f| f.category == category)
    }

    pub fn source(&self) -> impl Iterator<Item = &ProjectFile> {
        self.files.iter().filter(|f| f.is_source)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files
            .binary_search_by(|f| f.path.as_str().cmp(path))
            .is_ok()
    }
}

/// Walks a project, classifying every file
pub struct StructureScanner {
    ignore: Vec<Pattern>,
}

impl StructureScanner {
    /// Create a scanner; invalid glob patterns are logged and ignored
    pub fn new(ignore_patterns: &[String]) -> Self {
        let ignore = ignore_patterns
            .iter()
            .filter_map(|p| match Pattern::new(p) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    warn!("Ignoring invalid pattern '{}': {}", p, e);
                    None
                }
            })
            .collect();
        Self { ignore }
    }

    fn is_ignored(&self, relative: &str) -> bool {
        self.ignore.iter().any(|p| p.matches(relative))
    }

    /// Scan `root`
    pub fn scan(&self, root: &Path) -> Result<StructureScan> {
        if !root.is_dir() {
            return Err(Error::InvalidProject(format!(
                "{} is not a directory",
                root.display()
            )));
        }

        let mut scan = StructureScan::default();
        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_skipped_dir(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = relative_path(root, entry.path());
            if self.is_ignored(&relative) {
                debug!("Ignored by pattern: {}", relative);
                continue;
            }

            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            let category = classify(&relative);
            let is_source = is_source_file(&relative);

            *scan.counts.entry(category).or_insert(0) += 1;
            scan.total_files += 1;
            scan.total_bytes += size;
            if is_source {
                scan.source_files += 1;
                if relative.ends_with(".ts") || relative.ends_with(".tsx") {
                    scan.typescript = true;
                }
            }
            scan.files.push(ProjectFile {
                path: relative,
                category,
                size,
                is_source,
            });
        }

        scan.files.sort_by(|a, b| a.path.cmp(&b.path));
        if root.join("tsconfig.json").is_file() {
            scan.typescript = true;
        }
        scan.router = detect_router(&scan);

        debug!(
            "Scanned {} files ({} source) in {}",
            scan.total_files,
            scan.source_files,
            root.display()
        );
        Ok(scan)
    }
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| SKIPPED_DIRS.contains(&name))
}

/// `/`-separated path of `path` under `root`
pub(crate) fn relative_path(root: &Path, path: &Path) -> String {
    let relative: PathBuf = path.strip_prefix(root).unwrap_or(path).to_path_buf();
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn detect_router(scan: &StructureScan) -> RouterKind {
    let route_root = |prefix: &str| {
        scan.source().any(|f| {
            let path = f.path.strip_prefix("src/").unwrap_or(&f.path);
            path.starts_with(prefix)
        })
    };
    match (route_root("pages/"), route_root("app/")) {
        (true, true) => RouterKind::Hybrid,
        (true, false) => RouterKind::Pages,
        (false, true) => RouterKind::App,
        (false, false) => RouterKind::Unknown,
    }
}
