// src/analyzer/classify.rs

//! Path-based file classification for Next.js projects
//!
//! Each project file lands in exactly one [`FileCategory`]. Rules are
//! checked most-specific first; `other` is the fallback.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Role of a file inside a Next.js project
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FileCategory {
    /// Pages router route (`pages/**`)
    Page,
    /// App router special file (`app/**/page.tsx`, `layout.tsx`, ...)
    App,
    /// API route handler, server-only
    Api,
    /// Reusable UI component
    Component,
    /// Custom React hook
    Hook,
    /// Context providers and stores
    Context,
    /// Utilities, services, API clients
    Lib,
    /// Stylesheets
    Style,
    /// Type declarations
    Type,
    /// Build and tooling configuration
    Config,
    /// Static assets under `public/`
    Asset,
    /// Test files
    Test,
    /// Anything else
    Other,
}

impl FileCategory {
    /// Whether files of this category become route screens
    pub fn is_route(&self) -> bool {
        matches!(self, Self::Page | Self::App)
    }
}

/// Source extensions handled by the converter
pub const SOURCE_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx"];

const STYLE_EXTENSIONS: &[&str] = &["css", "scss", "sass", "less"];

const APP_SPECIAL_FILES: &[&str] = &["page", "layout", "loading", "error", "not-found", "template"];

const ROOT_CONFIG_PREFIXES: &[&str] = &[
    "next.config.",
    "tailwind.config.",
    "postcss.config.",
    "babel.config.",
    "jest.config.",
    ".eslintrc",
    ".prettierrc",
];

const ROOT_CONFIG_FILES: &[&str] = &[
    "package.json",
    "tsconfig.json",
    "jsconfig.json",
    "next-env.d.ts",
    ".babelrc",
];

/// Whether `path` has a JavaScript/TypeScript source extension
pub fn is_source_file(path: &str) -> bool {
    extension(path)
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            SOURCE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

fn extension(path: &str) -> Option<&str> {
    let name = file_name(path);
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }
    Some(ext)
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// File name without its final extension
fn file_stem(path: &str) -> &str {
    let name = file_name(path);
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    }
}

/// Classify a `/`-separated path relative to the project root
pub fn classify(relative_path: &str) -> FileCategory {
    let path = relative_path.trim_start_matches("./");
    // Next.js allows pages/, app/ etc. under src/
    let path = path.strip_prefix("src/").unwrap_or(path);
    let name = file_name(path);
    let stem = file_stem(path);
    let lower_ext = extension(path).map(|e| e.to_ascii_lowercase());
    let ext = lower_ext.as_deref();
    let is_source = is_source_file(path);
    let in_dir = |dir: &str| path.starts_with(&format!("{dir}/")) || path.contains(&format!("/{dir}/"));

    // 1. Tests
    if name.contains(".test.") || name.contains(".spec.") || in_dir("__tests__") {
        return FileCategory::Test;
    }

    // 2. Root-level config (only at the top of the project, not under src/)
    let at_root = !relative_path.trim_start_matches("./").contains('/');
    if at_root
        && (ROOT_CONFIG_FILES.contains(&name)
            || ROOT_CONFIG_PREFIXES.iter().any(|p| name.starts_with(p)))
    {
        return FileCategory::Config;
    }

    // 3. API routes
    if path.starts_with("pages/api/") || (path.starts_with("app/") && stem == "route") {
        return FileCategory::Api;
    }

    // 4. Styles
    if ext.is_some_and(|e| STYLE_EXTENSIONS.contains(&e)) {
        return FileCategory::Style;
    }

    // 5. Type declarations
    if name.ends_with(".d.ts") || (in_dir("types") && is_source) {
        return FileCategory::Type;
    }

    // 6. Routes
    if path.starts_with("pages/") && is_source {
        return FileCategory::Page;
    }
    if path.starts_with("app/") && is_source {
        if APP_SPECIAL_FILES.contains(&stem) {
            return FileCategory::App;
        }
        return FileCategory::Component;
    }

    // 7. Static assets
    if path.starts_with("public/") {
        return FileCategory::Asset;
    }

    if !is_source {
        if in_dir("styles") {
            return FileCategory::Style;
        }
        return FileCategory::Other;
    }

    // 8. Source buckets by directory
    if in_dir("components") || in_dir("ui") {
        return FileCategory::Component;
    }
    if in_dir("hooks") || is_hook_name(stem) {
        return FileCategory::Hook;
    }
    if in_dir("context") || in_dir("contexts") || in_dir("providers") || in_dir("store") {
        return FileCategory::Context;
    }
    if in_dir("lib") || in_dir("utils") || in_dir("services") || in_dir("helpers") || in_dir("api")
    {
        return FileCategory::Lib;
    }
    if in_dir("styles") {
        return FileCategory::Style;
    }

    FileCategory::Other
}

/// `useSomething` naming convention
fn is_hook_name(stem: &str) -> bool {
    stem.strip_prefix("use")
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_ascii_uppercase())
}
