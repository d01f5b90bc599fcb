// src/analyzer/config_files.rs

//! Next.js configuration files: next.config, tsconfig, tailwind, .env

use crate::error::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, warn};

const NEXT_CONFIG_NAMES: &[&str] = &["next.config.js", "next.config.mjs", "next.config.ts"];
const TAILWIND_CONFIG_NAMES: &[&str] = &[
    "tailwind.config.js",
    "tailwind.config.cjs",
    "tailwind.config.mjs",
    "tailwind.config.ts",
];

/// Flags found in `next.config.*`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextConfigSummary {
    /// File the flags were read from
    pub file: Option<String>,
    pub images: bool,
    pub i18n: bool,
    pub redirects: bool,
    pub rewrites: bool,
    pub env: bool,
    /// `output: 'export' | 'standalone'`
    pub output: Option<String>,
    pub base_path: Option<String>,
}

/// One environment variable name and its Expo counterpart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVariable {
    pub name: String,
    /// File the variable was declared in
    pub file: String,
    /// `EXPO_PUBLIC_*` rename for `NEXT_PUBLIC_*` variables
    pub expo_name: Option<String>,
}

/// Configuration summary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSummary {
    pub next_config: NextConfigSummary,
    /// tsconfig `compilerOptions.paths`, alias to first target
    pub path_aliases: BTreeMap<String, String>,
    pub base_url: Option<String>,
    pub tailwind: bool,
    pub env_variables: Vec<EnvVariable>,
}

impl ConfigSummary {
    /// Target directory for the `@/` alias, if any
    pub fn at_alias_target(&self) -> Option<&str> {
        self.path_aliases.get("@/*").map(|t| t.trim_end_matches('*').trim_end_matches('/'))
    }
}

struct Patterns {
    images: Regex,
    i18n: Regex,
    redirects: Regex,
    rewrites: Regex,
    env: Regex,
    output: Regex,
    base_path: Regex,
    alias: Regex,
    base_url: Regex,
    env_line: Regex,
}

static PATTERNS: LazyLock<Patterns> = LazyLock::new(|| Patterns {
    images: Regex::new(r"\bimages\s*:").unwrap(),
    i18n: Regex::new(r"\bi18n\s*:").unwrap(),
    redirects: Regex::new(r"\bredirects\s*(?::|\()").unwrap(),
    rewrites: Regex::new(r"\brewrites\s*(?::|\()").unwrap(),
    env: Regex::new(r"\benv\s*:").unwrap(),
    output: Regex::new(r#"\boutput\s*:\s*['"]([\w-]+)['"]"#).unwrap(),
    base_path: Regex::new(r#"\bbasePath\s*:\s*['"]([^'"]*)['"]"#).unwrap(),
    alias: Regex::new(r#""([^"]+)"\s*:\s*\[\s*"([^"]+)""#).unwrap(),
    base_url: Regex::new(r#""baseUrl"\s*:\s*"([^"]*)""#).unwrap(),
    env_line: Regex::new(r"(?m)^\s*(?:export\s+)?([A-Za-z_][A-Za-z0-9_]*)\s*=").unwrap(),
});

/// Analyze configuration files under `root`
pub fn analyze_config(root: &Path) -> Result<ConfigSummary> {
    let mut summary = ConfigSummary::default();

    if let Some(name) = NEXT_CONFIG_NAMES.iter().find(|n| root.join(n).is_file()) {
        let content = fs::read_to_string(root.join(name))?;
        summary.next_config = scan_next_config(&content);
        summary.next_config.file = Some((*name).to_string());
    }

    let tsconfig = ["tsconfig.json", "jsconfig.json"]
        .iter()
        .map(|n| root.join(n))
        .find(|p| p.is_file());
    if let Some(path) = tsconfig {
        let content = fs::read_to_string(&path)?;
        let (aliases, base_url) = scan_tsconfig(&content);
        summary.path_aliases = aliases;
        summary.base_url = base_url;
    }

    summary.tailwind = TAILWIND_CONFIG_NAMES.iter().any(|n| root.join(n).is_file());

    summary.env_variables = scan_env_files(root)?;
    Ok(summary)
}

fn scan_next_config(content: &str) -> NextConfigSummary {
    let p = &*PATTERNS;
    NextConfigSummary {
        file: None,
        images: p.images.is_match(content),
        i18n: p.i18n.is_match(content),
        redirects: p.redirects.is_match(content),
        rewrites: p.rewrites.is_match(content),
        env: p.env.is_match(content),
        output: p.output.captures(content).map(|c| c[1].to_string()),
        base_path: p.base_path.captures(content).map(|c| c[1].to_string()),
    }
}

/// Path aliases and baseUrl; JSON first, regex when the file is not strict JSON
fn scan_tsconfig(content: &str) -> (BTreeMap<String, String>, Option<String>) {
    let stripped = super::parser::strip_comments(content);
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(&stripped) {
        let options = &json["compilerOptions"];
        let mut aliases = BTreeMap::new();
        if let Some(paths) = options["paths"].as_object() {
            for (alias, targets) in paths {
                if let Some(first) = targets.as_array().and_then(|t| t.first()).and_then(|t| t.as_str()) {
                    aliases.insert(alias.clone(), first.to_string());
                }
            }
        }
        let base_url = options["baseUrl"].as_str().map(str::to_string);
        return (aliases, base_url);
    }

    debug!("tsconfig is not strict JSON, falling back to pattern scan");
    let aliases = PATTERNS
        .alias
        .captures_iter(&stripped)
        .map(|c| (c[1].to_string(), c[2].to_string()))
        .collect();
    let base_url = PATTERNS.base_url.captures(&stripped).map(|c| c[1].to_string());
    (aliases, base_url)
}

/// Variable names from `.env*` files at the root; values are never read out
fn scan_env_files(root: &Path) -> Result<Vec<EnvVariable>> {
    let mut files: Vec<String> = match fs::read_dir(root) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|e| e.file_name().to_str().map(str::to_string))
            .filter(|name| name == ".env" || name.starts_with(".env."))
            .collect(),
        Err(e) => {
            warn!("Cannot list {}: {}", root.display(), e);
            return Ok(Vec::new());
        }
    };
    files.sort();

    let mut vars = Vec::new();
    for file in files {
        let content = fs::read_to_string(root.join(&file))?;
        for cap in PATTERNS.env_line.captures_iter(&content) {
            let name = cap[1].to_string();
            if vars.iter().any(|v: &EnvVariable| v.name == name) {
                continue;
            }
            vars.push(EnvVariable {
                expo_name: expo_env_name(&name),
                name,
                file: file.clone(),
            });
        }
    }
    Ok(vars)
}

/// `NEXT_PUBLIC_X` becomes `EXPO_PUBLIC_X`
pub fn expo_env_name(name: &str) -> Option<String> {
    name.strip_prefix("NEXT_PUBLIC_")
        .map(|rest| format!("EXPO_PUBLIC_{rest}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_next_config_flags() {
        let config = r#"
            /** @type {import('next').NextConfig} */
            module.exports = {
              output: 'export',
              basePath: '/docs',
              images: { domains: ['cdn.example.com'] },
              async redirects() { return []; },
            };
        "#;
        let summary = scan_next_config(config);
        assert!(summary.images);
        assert!(summary.redirects);
        assert!(!summary.rewrites);
        assert!(!summary.i18n);
        assert_eq!(summary.output.as_deref(), Some("export"));
        assert_eq!(summary.base_path.as_deref(), Some("/docs"));
    }

    #[test]
    fn test_tsconfig_with_comments() {
        let tsconfig = r#"{
            // editor settings
            "compilerOptions": {
                "baseUrl": ".",
                "paths": { "@/*": ["./src/*"], "@ui/*": ["components/ui/*"] }
            }
        }"#;
        let (aliases, base_url) = scan_tsconfig(tsconfig);
        assert_eq!(aliases.get("@/*").map(String::as_str), Some("./src/*"));
        assert_eq!(aliases.len(), 2);
        assert_eq!(base_url.as_deref(), Some("."));
    }

    #[test]
    fn test_tsconfig_trailing_comma_falls_back() {
        let tsconfig = r#"{ "compilerOptions": { "paths": { "@/*": ["./*"], }, } }"#;
        let (aliases, _) = scan_tsconfig(tsconfig);
        assert_eq!(aliases.get("@/*").map(String::as_str), Some("./*"));
    }

    #[test]
    fn test_env_names() {
        assert_eq!(expo_env_name("NEXT_PUBLIC_API_URL").as_deref(), Some("EXPO_PUBLIC_API_URL"));
        assert_eq!(expo_env_name("DATABASE_URL"), None);
    }

    #[test]
    fn test_analyze_config_dir() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::write(root.join("next.config.mjs"), "export default { images: {} };").unwrap();
        fs::write(root.join("tailwind.config.ts"), "export default {};").unwrap();
        fs::write(root.join(".env.local"), "NEXT_PUBLIC_API=x\nSECRET=y\n# NOTE=z\n").unwrap();
        fs::write(root.join(".env"), "SECRET=dup\n").unwrap();

        let summary = analyze_config(root).unwrap();
        assert_eq!(summary.next_config.file.as_deref(), Some("next.config.mjs"));
        assert!(summary.next_config.images);
        assert!(summary.tailwind);

        let names: Vec<_> = summary.env_variables.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["SECRET", "NEXT_PUBLIC_API"]);
        assert_eq!(
            summary.env_variables[1].expo_name.as_deref(),
            Some("EXPO_PUBLIC_API")
        );
    }
}
