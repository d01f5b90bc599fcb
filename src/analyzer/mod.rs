// src/analyzer/mod.rs

//! Next.js project analysis
//!
//! Walks the project, classifies every file, parses sources, reads
//! `package.json` and configuration files, and builds the import graph.
//! The resulting [`ProjectAnalysis`] drives planning and conversion and can
//! be printed as JSON.
//!
//! # Example
//!
//! ```no_run
//! use next2expo::analyzer::ProjectAnalyzer;
//! use next2expo::config::AnalysisSettings;
//! use std::path::Path;
//!
//! let analysis = ProjectAnalyzer::new(&AnalysisSettings::default())
//!     .analyze(Path::new("./my-next-app"))?;
//! println!("{} source files", analysis.structure.source_files);
//! # Ok::<(), next2expo::Error>(())
//! ```

pub mod classify;
pub mod composition;
pub mod config_files;
pub mod dependencies;
pub mod parser;
pub mod structure;

pub use classify::{FileCategory, classify, is_source_file};
pub use composition::{CompositionMap, CompositionStats, FileNode};
pub use config_files::{ConfigSummary, EnvVariable, NextConfigSummary};
pub use dependencies::{DependencyReport, Migration, PackageVerdict};
pub use parser::{CodeParser, Directive, ImportDecl, ParsedSource};
pub use structure::{ProjectFile, RouterKind, StructureScan, StructureScanner};

use crate::config::AnalysisSettings;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use strum_macros::{Display, EnumString};
use tracing::{info, warn};

/// How the project is styled
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum StylingSystem {
    Tailwind,
    CssModules,
    StyledComponents,
    Emotion,
    Sass,
    GlobalCss,
}

/// An API route and the HTTP methods it appears to handle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiRoute {
    pub file: String,
    /// URL path, e.g. `/api/users/[id]`
    pub route: String,
    pub methods: Vec<String>,
}

/// Next.js features in use
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSummary {
    pub styling: Vec<StylingSystem>,
    pub next_image: bool,
    pub next_link: bool,
    /// `next/router` (pages router hooks)
    pub next_router: bool,
    /// `next/navigation` (app router hooks)
    pub next_navigation: bool,
    pub next_head: bool,
    pub state_management: Vec<String>,
    /// Data-fetching function to the files exporting it
    pub data_fetching: BTreeMap<String, Vec<String>>,
    pub api_routes: Vec<ApiRoute>,
    pub client_components: usize,
}

/// A source file that failed the readability check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreadableFile {
    pub path: String,
    pub reason: String,
}

/// Full project analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectAnalysis {
    pub project_name: String,
    pub root: PathBuf,
    pub router: RouterKind,
    pub typescript: bool,
    pub structure: StructureScan,
    pub dependencies: DependencyReport,
    pub config: ConfigSummary,
    pub composition: CompositionStats,
    pub features: FeatureSummary,
    pub unreadable: Vec<UnreadableFile>,

    /// Parsed source files by relative path
    #[serde(skip)]
    pub sources: BTreeMap<String, ParsedSource>,

    #[serde(skip)]
    pub graph: CompositionMap,
}

impl ProjectAnalysis {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn is_readable(&self, path: &str) -> bool {
        self.sources.get(path).is_some_and(|p| p.readable)
    }

    /// Source files in dependency-first order
    pub fn conversion_order(&self) -> Vec<String> {
        self.graph.conversion_order()
    }

    pub fn category_of(&self, path: &str) -> Option<FileCategory> {
        self.structure
            .files
            .iter()
            .find(|f| f.path == path)
            .map(|f| f.category)
    }
}

/// Analyzes Next.js projects
pub struct ProjectAnalyzer {
    scanner: StructureScanner,
}

impl ProjectAnalyzer {
    pub fn new(settings: &AnalysisSettings) -> Self {
        Self {
            scanner: StructureScanner::new(&settings.ignore_patterns),
        }
    }

    /// Analyze the project rooted at `root`
    pub fn analyze(&self, root: &Path) -> Result<ProjectAnalysis> {
        info!("Analyzing {}", root.display());

        let structure = self.scanner.scan(root)?;
        let dependencies = dependencies::analyze_dependencies(root)?;
        let config = config_files::analyze_config(root)?;

        let mut sources = BTreeMap::new();
        let mut unreadable = Vec::new();
        for file in structure.source() {
            match CodeParser::parse_file(&root.join(&file.path)) {
                Ok(parsed) => {
                    if !parsed.readable {
                        let reason = parsed
                            .problem
                            .clone()
                            .unwrap_or_else(|| "unreadable".to_string());
                        warn!("{} is not readable: {}", file.path, reason);
                        unreadable.push(UnreadableFile {
                            path: file.path.clone(),
                            reason,
                        });
                    }
                    sources.insert(file.path.clone(), parsed);
                }
                Err(e) => {
                    warn!("Failed to read {}: {}", file.path, e);
                    unreadable.push(UnreadableFile {
                        path: file.path.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let alias = alias_root(&config);
        let graph = CompositionMap::build(&sources, alias.as_deref());
        let features = detect_features(&structure, &dependencies, &config, &sources);

        let project_name = dependencies
            .name
            .clone()
            .or_else(|| {
                root.canonicalize()
                    .ok()
                    .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            })
            .unwrap_or_else(|| "app".to_string());

        info!(
            "{}: {} files, {} source, router {}",
            project_name, structure.total_files, structure.source_files, structure.router
        );

        Ok(ProjectAnalysis {
            project_name,
            root: root.to_path_buf(),
            router: structure.router,
            typescript: structure.typescript,
            composition: graph.stats(),
            structure,
            dependencies,
            config,
            features,
            unreadable,
            sources,
            graph,
        })
    }
}

/// Directory the `@/` alias resolves to, combining `baseUrl` and `paths`
pub(crate) fn alias_root(config: &ConfigSummary) -> Option<String> {
    let target = config.at_alias_target()?;
    let target = target.trim_start_matches("./");
    match config.base_url.as_deref().map(|b| b.trim_start_matches("./").trim_end_matches('/')) {
        Some(base) if !base.is_empty() && base != "." => {
            if target.is_empty() || target == "." {
                Some(base.to_string())
            } else {
                Some(format!("{base}/{target}"))
            }
        }
        _ => Some(target.trim_end_matches('.').to_string()),
    }
}

const STATE_LIBRARIES: &[&str] = &[
    "redux",
    "@reduxjs/toolkit",
    "react-redux",
    "zustand",
    "jotai",
    "recoil",
    "mobx",
    "valtio",
    "@tanstack/react-query",
    "react-query",
    "swr",
];

fn detect_features(
    structure: &StructureScan,
    deps: &DependencyReport,
    config: &ConfigSummary,
    sources: &BTreeMap<String, ParsedSource>,
) -> FeatureSummary {
    let mut features = FeatureSummary::default();

    let any_import = |module: &str| sources.values().any(|p| p.imports_from(module));
    features.next_image = any_import("next/image") || any_import("next/legacy/image");
    features.next_link = any_import("next/link");
    features.next_router = any_import("next/router");
    features.next_navigation = any_import("next/navigation");
    features.next_head = any_import("next/head");

    if config.tailwind || deps.has("tailwindcss") {
        features.styling.push(StylingSystem::Tailwind);
    }
    let style_files: Vec<&str> = structure
        .files_in(FileCategory::Style)
        .map(|f| f.path.as_str())
        .collect();
    if style_files.iter().any(|p| p.contains(".module.")) {
        features.styling.push(StylingSystem::CssModules);
    }
    if deps.has("styled-components") {
        features.styling.push(StylingSystem::StyledComponents);
    }
    if deps.has("@emotion/react") || deps.has("@emotion/styled") {
        features.styling.push(StylingSystem::Emotion);
    }
    if deps.has("sass") || style_files.iter().any(|p| p.ends_with(".scss") || p.ends_with(".sass")) {
        features.styling.push(StylingSystem::Sass);
    }
    if style_files
        .iter()
        .any(|p| p.ends_with(".css") && !p.contains(".module."))
    {
        features.styling.push(StylingSystem::GlobalCss);
    }

    features.state_management = STATE_LIBRARIES
        .iter()
        .filter(|lib| deps.has(lib))
        .map(|lib| lib.to_string())
        .collect();
    if structure.count(FileCategory::Context) > 0
        || sources.values().any(|p| p.hooks.contains("useContext"))
    {
        features.state_management.push("react-context".to_string());
    }

    for (path, parsed) in sources {
        for function in &parsed.data_fetching {
            features
                .data_fetching
                .entry(function.clone())
                .or_default()
                .push(path.clone());
        }
        if parsed.directive == Some(Directive::UseClient) {
            features.client_components += 1;
        }
    }

    for file in structure.files_in(FileCategory::Api) {
        let methods = sources
            .get(&file.path)
            .map(|p| p.http_methods.iter().cloned().collect())
            .unwrap_or_default();
        features.api_routes.push(ApiRoute {
            file: file.path.clone(),
            route: api_route_path(&file.path),
            methods,
        });
    }

    features
}

/// URL path served by an API route file
pub fn api_route_path(path: &str) -> String {
    let path = path.strip_prefix("src/").unwrap_or(path);
    let without_ext = path.rsplit_once('.').map(|(p, _)| p).unwrap_or(path);

    let route = if let Some(rest) = without_ext.strip_prefix("app/") {
        let dir = rest.rsplit_once('/').map(|(d, _)| d).unwrap_or("");
        dir.split('/')
            .filter(|s| !s.is_empty() && !(s.starts_with('(') && s.ends_with(')')))
            .collect::<Vec<_>>()
            .join("/")
    } else {
        let rest = without_ext.strip_prefix("pages/").unwrap_or(without_ext);
        rest.strip_suffix("/index")
            .unwrap_or(if rest == "index" { "" } else { rest })
            .to_string()
    };
    format!("/{route}")
}
