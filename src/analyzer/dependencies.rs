// src/analyzer/dependencies.rs

//! package.json analysis and per-package migration verdicts

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::warn;

/// What happens to a package when moving to Expo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Migration {
    /// Works unchanged in React Native
    Compatible,
    /// Swap for a React Native counterpart
    Replace { with: String },
    /// Not needed in an Expo project
    Drop { reason: String },
    /// DOM-only, needs manual rework
    Incompatible { reason: String },
}

/// One dependency with its verdict
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageVerdict {
    pub name: String,
    pub version: String,
    pub dev: bool,
    #[serde(flatten)]
    pub migration: Migration,
}

/// Summary of `package.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyReport {
    pub name: Option<String>,
    pub next_version: Option<String>,
    pub react_version: Option<String>,
    pub dependencies: BTreeMap<String, String>,
    pub dev_dependencies: BTreeMap<String, String>,
    pub scripts: BTreeMap<String, String>,
    pub verdicts: Vec<PackageVerdict>,
    /// Why the report is empty, when it is
    pub warning: Option<String>,
}

impl DependencyReport {
    pub fn has(&self, package: &str) -> bool {
        self.dependencies.contains_key(package) || self.dev_dependencies.contains_key(package)
    }

    /// Replacement packages for the Expo project, deduplicated and sorted
    ///
    /// Dev dependencies count too: `tailwindcss` is usually one, while
    /// `nativewind` is needed at runtime.
    pub fn replacements(&self) -> Vec<String> {
        let mut out: Vec<String> = self
            .verdicts
            .iter()
            .filter_map(|v| match &v.migration {
                Migration::Replace { with } => Some(with.clone()),
                _ => None,
            })
            .collect();
        out.sort();
        out.dedup();
        out
    }

    /// Runtime packages carried over unchanged
    pub fn compatible(&self) -> Vec<(&str, &str)> {
        self.verdicts
            .iter()
            .filter(|v| !v.dev && v.migration == Migration::Compatible)
            .map(|v| (v.name.as_str(), v.version.as_str()))
            .collect()
    }

    pub fn incompatible(&self) -> impl Iterator<Item = &PackageVerdict> {
        self.verdicts
            .iter()
            .filter(|v| matches!(v.migration, Migration::Incompatible { .. }))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageJson {
    name: Option<String>,
    #[serde(default)]
    dependencies: BTreeMap<String, String>,
    #[serde(default)]
    dev_dependencies: BTreeMap<String, String>,
    #[serde(default)]
    scripts: BTreeMap<String, String>,
}

/// Known React Native counterparts
const REPLACEMENTS: &[(&str, &str)] = &[
    ("next/image", "expo-image"),
    ("next/font", "expo-font"),
    ("tailwindcss", "nativewind"),
    ("react-icons", "@expo/vector-icons"),
    ("lucide-react", "lucide-react-native"),
    ("@heroicons/react", "@expo/vector-icons"),
    ("framer-motion", "react-native-reanimated"),
    ("react-spring", "react-native-reanimated"),
    ("next-auth", "expo-auth-session"),
    ("js-cookie", "@react-native-async-storage/async-storage"),
    ("react-hot-toast", "react-native-toast-message"),
    ("react-toastify", "react-native-toast-message"),
    ("swiper", "react-native-pager-view"),
    ("recharts", "victory-native"),
    ("chart.js", "victory-native"),
    ("react-chartjs-2", "victory-native"),
    ("react-markdown", "react-native-markdown-display"),
    ("@vercel/analytics", "expo-insights"),
];

/// Packages with no place in an Expo app
const DROPPED: &[(&str, &str)] = &[
    ("next", "replaced by Expo and React Navigation"),
    ("react-dom", "no DOM in React Native"),
    ("eslint-config-next", "Next.js lint preset"),
    ("@next/font", "use expo-font"),
    ("@next/bundle-analyzer", "web build tooling"),
    ("postcss", "web build tooling"),
    ("autoprefixer", "web build tooling"),
    ("sass", "web stylesheets are not used"),
    ("next-sitemap", "web-only"),
    ("next-seo", "web-only"),
    ("sharp", "server-side image processing"),
    ("@types/react-dom", "no DOM in React Native"),
];

/// DOM-bound UI kits without a drop-in replacement
const INCOMPATIBLE: &[(&str, &str)] = &[
    ("@mui/material", "renders DOM elements"),
    ("@material-ui/core", "renders DOM elements"),
    ("@chakra-ui/react", "renders DOM elements"),
    ("antd", "renders DOM elements"),
    ("react-bootstrap", "renders DOM elements"),
    ("@headlessui/react", "renders DOM elements"),
    ("react-select", "renders DOM elements"),
    ("react-modal", "uses DOM portals"),
    ("react-helmet", "manipulates document head"),
    ("@radix-ui", "renders DOM elements"),
];

/// Verdict for one package name
pub fn migration_for(name: &str) -> Migration {
    if let Some((_, with)) = REPLACEMENTS.iter().find(|(n, _)| *n == name) {
        return Migration::Replace {
            with: (*with).to_string(),
        };
    }
    if let Some((_, reason)) = DROPPED.iter().find(|(n, _)| *n == name) {
        return Migration::Drop {
            reason: (*reason).to_string(),
        };
    }
    if let Some((_, reason)) = INCOMPATIBLE
        .iter()
        .find(|(n, _)| *n == name || name.starts_with(&format!("{n}/")))
    {
        return Migration::Incompatible {
            reason: (*reason).to_string(),
        };
    }
    if name.starts_with("@next/") || name.starts_with("next-") {
        return Migration::Drop {
            reason: "Next.js plugin".to_string(),
        };
    }
    Migration::Compatible
}

/// Read `package.json` under `root`
///
/// A missing or malformed file yields an empty report with a warning.
pub fn analyze_dependencies(root: &Path) -> Result<DependencyReport> {
    let path = root.join("package.json");
    if !path.is_file() {
        warn!("No package.json in {}", root.display());
        return Ok(DependencyReport {
            warning: Some("package.json not found".to_string()),
            ..Default::default()
        });
    }

    let content = fs::read_to_string(&path)?;
    let package: PackageJson = match serde_json::from_str(&content) {
        Ok(package) => package,
        Err(e) => {
            warn!("Malformed package.json: {}", e);
            return Ok(DependencyReport {
                warning: Some(format!("malformed package.json: {e}")),
                ..Default::default()
            });
        }
    };

    Ok(build_report(package))
}

fn build_report(package: PackageJson) -> DependencyReport {
    let mut verdicts = Vec::new();
    for (dev, deps) in [(false, &package.dependencies), (true, &package.dev_dependencies)] {
        for (name, version) in deps {
            verdicts.push(PackageVerdict {
                name: name.clone(),
                version: version.clone(),
                dev,
                migration: migration_for(name),
            });
        }
    }

    let version_of = |name: &str| {
        package
            .dependencies
            .get(name)
            .or_else(|| package.dev_dependencies.get(name))
            .cloned()
    };

    DependencyReport {
        name: package.name.clone(),
        next_version: version_of("next"),
        react_version: version_of("react"),
        verdicts,
        dependencies: package.dependencies,
        dev_dependencies: package.dev_dependencies,
        scripts: package.scripts,
        warning: None,
    }
}
