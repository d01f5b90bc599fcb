// src/analyzer/composition.rs

//! Import graph between project source files

use super::classify::{SOURCE_EXTENSIONS, is_source_file};
use super::parser::ParsedSource;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One source file in the import graph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileNode {
    pub path: String,
    /// Project files this file imports
    pub imports: BTreeSet<String>,
    /// Project files importing this file
    pub imported_by: BTreeSet<String>,
    /// Third-party modules imported
    pub packages: BTreeSet<String>,
    /// Lowercase JSX tags rendered
    pub html_tags: BTreeSet<String>,
    /// `next/*` modules imported
    pub next_apis: BTreeSet<String>,
}

/// Aggregate numbers for reports
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositionStats {
    pub files: usize,
    pub edges: usize,
    /// Local imports that did not resolve to a project file
    pub unresolved: usize,
    pub html_tag_usage: BTreeMap<String, usize>,
    pub next_api_usage: BTreeMap<String, usize>,
    /// Up to five most imported files, most imported first
    pub most_imported: Vec<(String, usize)>,
}

/// Import graph keyed by project-relative path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositionMap {
    pub nodes: BTreeMap<String, FileNode>,
    /// (importing file, specifier) pairs that did not resolve
    pub unresolved: Vec<(String, String)>,
}

impl CompositionMap {
    /// Build the graph from parsed sources
    ///
    /// `alias_root` is the directory `@/` points at (`None` tries `src/`
    /// then the project root).
    pub fn build(sources: &BTreeMap<String, ParsedSource>, alias_root: Option<&str>) -> Self {
        let mut map = Self::default();
        let known = |path: &str| sources.contains_key(path);

        for (path, parsed) in sources {
            let mut node = FileNode {
                path: path.clone(),
                html_tags: parsed.html_tags.clone(),
                next_apis: parsed.next_imports().into_iter().map(str::to_string).collect(),
                ..Default::default()
            };

            for import in &parsed.imports {
                if !import.is_local() {
                    node.packages.insert(package_name(&import.source));
                    continue;
                }
                match resolve_import(path, &import.source, alias_root, &known) {
                    Some(target) if target != *path => {
                        node.imports.insert(target);
                    }
                    Some(_) => {}
                    None => {
                        if has_resolvable_extension(&import.source) {
                            map.unresolved.push((path.clone(), import.source.clone()));
                        }
                    }
                }
            }
            map.nodes.insert(path.clone(), node);
        }

        let edges: Vec<(String, String)> = map
            .nodes
            .values()
            .flat_map(|n| n.imports.iter().map(move |t| (n.path.clone(), t.clone())))
            .collect();
        for (from, to) in edges {
            if let Some(target) = map.nodes.get_mut(&to) {
                target.imported_by.insert(from);
            }
        }

        map
    }

    pub fn get(&self, path: &str) -> Option<&FileNode> {
        self.nodes.get(path)
    }

    /// Files ordered so that imports come before their importers
    ///
    /// Kahn's algorithm with ties broken by path; files caught in import
    /// cycles are appended in path order.
    pub fn conversion_order(&self) -> Vec<String> {
        let mut pending: BTreeMap<&str, usize> = self
            .nodes
            .values()
            .map(|n| (n.path.as_str(), n.imports.len()))
            .collect();
        let mut ready: BTreeSet<&str> = pending
            .iter()
            .filter(|(_, deps)| **deps == 0)
            .map(|(path, _)| *path)
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());

        while let Some(path) = ready.pop_first() {
            pending.remove(path);
            order.push(path.to_string());
            for dependent in &self.nodes[path].imported_by {
                if let Some(deps) = pending.get_mut(dependent.as_str()) {
                    *deps -= 1;
                    if *deps == 0 {
                        ready.insert(dependent.as_str());
                    }
                }
            }
        }

        // Cycles
        order.extend(pending.keys().map(|p| p.to_string()));
        order
    }

    pub fn stats(&self) -> CompositionStats {
        let mut stats = CompositionStats {
            files: self.nodes.len(),
            unresolved: self.unresolved.len(),
            ..Default::default()
        };
        for node in self.nodes.values() {
            stats.edges += node.imports.len();
            for tag in &node.html_tags {
                *stats.html_tag_usage.entry(tag.clone()).or_insert(0) += 1;
            }
            for api in &node.next_apis {
                *stats.next_api_usage.entry(api.clone()).or_insert(0) += 1;
            }
        }

        let mut popular: Vec<(String, usize)> = self
            .nodes
            .values()
            .filter(|n| !n.imported_by.is_empty())
            .map(|n| (n.path.clone(), n.imported_by.len()))
            .collect();
        popular.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        popular.truncate(5);
        stats.most_imported = popular;
        stats
    }
}

/// `@scope/pkg/sub` → `@scope/pkg`, `pkg/sub` → `pkg`
fn package_name(source: &str) -> String {
    let mut parts = source.split('/');
    match (parts.next(), parts.next()) {
        (Some(scope), Some(name)) if scope.starts_with('@') => format!("{scope}/{name}"),
        (Some(name), _) => name.to_string(),
        _ => source.to_string(),
    }
}

/// Extension-less or source-extension specifiers are expected to resolve
fn has_resolvable_extension(source: &str) -> bool {
    let last = source.rsplit('/').next().unwrap_or(source);
    !last.contains('.') || is_source_file(last)
}

/// Resolve a local specifier imported from `from` to a known project path
pub fn resolve_import(
    from: &str,
    source: &str,
    alias_root: Option<&str>,
    known: &dyn Fn(&str) -> bool,
) -> Option<String> {
    let bases: Vec<String> = if source.starts_with('.') {
        let dir = from.rsplit_once('/').map(|(d, _)| d).unwrap_or("");
        vec![join(dir, source)]
    } else if let Some(rest) = source.strip_prefix("@/").or_else(|| source.strip_prefix("~/")) {
        match alias_root {
            Some(root) => vec![join(root.trim_start_matches("./"), rest)],
            None => vec![join("src", rest), normalize(rest)],
        }
    } else {
        return None;
    };

    for base in bases {
        if known(&base) {
            return Some(base);
        }
        for ext in SOURCE_EXTENSIONS {
            let candidate = format!("{base}.{ext}");
            if known(&candidate) {
                return Some(candidate);
            }
        }
        for ext in SOURCE_EXTENSIONS {
            let candidate = if base.is_empty() {
                format!("index.{ext}")
            } else {
                format!("{base}/index.{ext}")
            };
            if known(&candidate) {
                return Some(candidate);
            }
        }
    }
    None
}

fn join(dir: &str, relative: &str) -> String {
    if dir.is_empty() || dir == "." {
        normalize(relative)
    } else {
        normalize(&format!("{dir}/{relative}"))
    }
}

/// Collapse `.` and `..` segments
fn normalize(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            s => parts.push(s),
        }
    }
    parts.join("/")
}
