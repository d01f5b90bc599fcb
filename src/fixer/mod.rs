// src/fixer/mod.rs

//! Regex-based validation and repair of generated React Native code
//!
//! The provider's output routinely keeps web-only constructs: HTML tags,
//! `className`, `onClick`, Next.js imports, browser globals. [`validate`]
//! reports them with line numbers, [`fix`] rewrites what it can, and
//! [`fix_until_clean`] alternates the two until nothing is left or nothing
//! changes.
//!
//! A clean result means only that none of the known web-only patterns
//! remain; the code is never type-checked or executed.
//!
//! [`validate`]: RuntimeErrorFixer::validate
//! [`fix`]: RuntimeErrorFixer::fix
//! [`fix_until_clean`]: RuntimeErrorFixer::fix_until_clean

pub mod imports;
pub mod rules;

use crate::analyzer::classify::is_source_file;
use crate::analyzer::parser::strip_comments;
use crate::analyzer::structure::{SKIPPED_DIRS, relative_path};
use crate::error::Result;
use rules::PATTERNS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use strum_macros::{Display, EnumString};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Kind of web-only construct found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum IssueKind {
    HtmlTag,
    ClassName,
    OnClick,
    NextImport,
    BrowserGlobal,
    Directive,
    MissingImport,
    UndeclaredNavigation,
}

/// One problem in generated code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// 1-based line
    pub line: usize,
    pub kind: IssueKind,
    pub message: String,
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// Result of one fix pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixOutcome {
    pub code: String,
    /// Descriptions of the rules that changed the code
    pub applied: Vec<String>,
}

/// Result of fixing until clean
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixReport {
    #[serde(skip)]
    pub code: String,
    pub applied: Vec<String>,
    pub iterations: u32,
    pub remaining: Vec<Issue>,
}

impl FixReport {
    pub fn is_clean(&self) -> bool {
        self.remaining.is_empty()
    }
}

/// Per-file result of a tree operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFixResult {
    pub path: String,
    pub applied: Vec<String>,
    pub remaining: Vec<Issue>,
    pub modified: bool,
}

/// Result of [`RuntimeErrorFixer::fix_tree`] or [`RuntimeErrorFixer::check_tree`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeReport {
    pub files: Vec<FileFixResult>,
}

impl TreeReport {
    pub fn files_checked(&self) -> usize {
        self.files.len()
    }

    pub fn files_modified(&self) -> usize {
        self.files.iter().filter(|f| f.modified).count()
    }

    pub fn total_remaining(&self) -> usize {
        self.files.iter().map(|f| f.remaining.len()).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.total_remaining() == 0
    }
}

/// Validates and repairs generated React Native code
#[derive(Debug, Clone, Default)]
pub struct RuntimeErrorFixer {
    keep_class_names: bool,
}

fn line_of(code: &str, offset: usize) -> usize {
    code[..offset].matches('\n').count() + 1
}

impl RuntimeErrorFixer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep `className` (NativeWind projects style through it)
    pub fn with_nativewind(mut self, enabled: bool) -> Self {
        self.keep_class_names = enabled;
        self
    }

    /// Find web-only constructs in `code`
    pub fn validate(&self, code: &str) -> Vec<Issue> {
        let p = &*PATTERNS;
        let code = strip_comments(code);
        let mut issues = Vec::new();
        let mut push = |offset: usize, kind: IssueKind, message: String| {
            issues.push(Issue {
                line: line_of(&code, offset),
                kind,
                message,
            });
        };

        for m in p.directive.find_iter(&code) {
            push(m.start(), IssueKind::Directive, format!("'{}' directive", m.as_str().trim().trim_end_matches(';').trim_matches(|c| c == '\'' || c == '"')));
        }
        for caps in p.next_import.captures_iter(&code) {
            let start = caps.get(0).map(|m| m.start()).unwrap_or(0);
            push(start, IssueKind::NextImport, format!("Next.js import '{}'", &caps[1]));
        }
        for caps in p.html_open.captures_iter(&code) {
            let start = caps.get(0).map(|m| m.start()).unwrap_or(0);
            if !rules::opens_jsx(code[..start].chars().next_back()) {
                continue;
            }
            push(start, IssueKind::HtmlTag, format!("HTML tag <{}>", &caps[1]));
        }
        for m in p.line_break.find_iter(&code).chain(p.rule.find_iter(&code)) {
            push(m.start(), IssueKind::HtmlTag, format!("HTML tag {}", m.as_str()));
        }
        if !self.keep_class_names {
            for m in p.class_name.find_iter(&code) {
                push(m.start(), IssueKind::ClassName, "className attribute".to_string());
            }
        }
        for m in p.on_click.find_iter(&code) {
            push(m.start(), IssueKind::OnClick, "onClick handler".to_string());
        }
        for caps in p.browser_global.captures_iter(&code) {
            let start = caps.get(0).map(|m| m.start()).unwrap_or(0);
            let name = caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str()).unwrap_or("window");
            push(start, IssueKind::BrowserGlobal, format!("browser global '{name}'"));
        }
        if p.navigation_used.is_match(&code) && !p.navigation_declared.is_match(&code) {
            let start = p.navigation_used.find(&code).map(|m| m.start()).unwrap_or(0);
            push(start, IssueKind::UndeclaredNavigation, "navigation used but never declared".to_string());
        }
        for name in rules::missing_rn_imports(&code) {
            let needle_tag = format!("<{name}");
            let needle_api = format!("{name}.");
            let start = code.find(&needle_tag).or_else(|| code.find(&needle_api)).unwrap_or(0);
            push(start, IssueKind::MissingImport, format!("{name} used without import from 'react-native'"));
        }

        issues.sort_by_key(|i| i.line);
        issues
    }

    /// One pass of every rewrite rule
    pub fn fix(&self, code: &str) -> FixOutcome {
        let mut current = code.to_string();
        let mut applied = Vec::new();
        for rule in rules::rules(self.keep_class_names) {
            if let Some(next) = rules::apply(&rule, &current) {
                debug!("Fix applied: {}", rule.description);
                applied.push(rule.description.to_string());
                current = next;
            }
        }
        FixOutcome {
            code: current,
            applied,
        }
    }

    /// Alternate validate and fix until clean, unchanged, or out of iterations
    pub fn fix_until_clean(&self, code: &str, max_iterations: u32) -> FixReport {
        let mut current = code.to_string();
        let mut applied: Vec<String> = Vec::new();
        let mut iterations = 0;

        while iterations < max_iterations {
            if self.validate(&current).is_empty() {
                break;
            }
            iterations += 1;
            let outcome = self.fix(&current);
            if outcome.code == current {
                break;
            }
            for description in outcome.applied {
                if !applied.contains(&description) {
                    applied.push(description);
                }
            }
            current = outcome.code;
        }

        let remaining = self.validate(&current);
        FixReport {
            code: current,
            applied,
            iterations,
            remaining,
        }
    }

    /// Fix every source file under `dir` in place
    pub fn fix_tree(&self, dir: &Path, max_iterations: u32) -> Result<TreeReport> {
        self.walk_tree(dir, |path, code| {
            let report = self.fix_until_clean(code, max_iterations);
            let modified = report.code != code;
            if modified {
                fs::write(path, &report.code)?;
            }
            Ok((report.applied, report.remaining, modified))
        })
    }

    /// Validate every source file under `dir` without writing
    pub fn check_tree(&self, dir: &Path) -> Result<TreeReport> {
        self.walk_tree(dir, |_, code| Ok((Vec::new(), self.validate(code), false)))
    }

    fn walk_tree<F>(&self, dir: &Path, mut visit: F) -> Result<TreeReport>
    where
        F: FnMut(&Path, &str) -> Result<(Vec<String>, Vec<Issue>, bool)>,
    {
        let mut report = TreeReport::default();
        let walker = WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0
                    || !e.file_type().is_dir()
                    || e.file_name().to_str().is_none_or(|n| !SKIPPED_DIRS.contains(&n))
            });

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
            let relative = relative_path(dir, entry.path());
            if !is_source_file(&relative) || relative.ends_with(".config.js") {
                continue;
            }

            let code = match fs::read_to_string(entry.path()) {
                Ok(code) => code,
                Err(e) => {
                    warn!("Cannot read {}: {}", relative, e);
                    continue;
                }
            };
            let (applied, remaining, modified) = visit(entry.path(), &code)?;
            if modified {
                info!("Fixed {} ({} rules)", relative, applied.len());
            }
            report.files.push(FileFixResult {
                path: relative,
                applied,
                remaining,
                modified,
            });
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const WEB_COMPONENT: &str = r#"'use client';
import Link from 'next/link';
import { useState } from 'react';

export default function Counter() {
  const [count, setCount] = useState(0);
  return (
    <div className="card">
      <h2>Count: {count}</h2>
      <button onClick={() => setCount(count + 1)}>Add</button>
      <Link href="/settings">Settings</Link>
    </div>
  );
}
"#;

    #[test]
    fn test_validate_reports_lines() {
        let issues = RuntimeErrorFixer::new().validate(WEB_COMPONENT);
        let find = |kind: IssueKind| issues.iter().find(|i| i.kind == kind).map(|i| i.line);

        assert_eq!(find(IssueKind::Directive), Some(1));
        assert_eq!(find(IssueKind::NextImport), Some(2));
        assert_eq!(find(IssueKind::HtmlTag), Some(8));
        assert_eq!(find(IssueKind::ClassName), Some(8));
        assert_eq!(find(IssueKind::OnClick), Some(10));
    }

    #[test]
    fn test_comments_are_not_issues() {
        let code = "// <div onClick> window.location\nexport const a = 1;\n";
        assert!(RuntimeErrorFixer::new().validate(code).is_empty());
    }

    #[test]
    fn test_fix_until_clean() {
        let fixer = RuntimeErrorFixer::new();
        let report = fixer.fix_until_clean(WEB_COMPONENT, 3);

        assert!(report.is_clean(), "remaining: {:?}\n{}", report.remaining, report.code);
        assert!(report.code.contains("<View>"));
        assert!(report.code.contains("<Text>Count: {count}</Text>"));
        assert!(report.code.contains("<TouchableOpacity onPress={() => setCount(count + 1)}><Text>Add</Text></TouchableOpacity>"));
        assert!(report.code.contains("navigation.navigate('Settings')"));
        assert!(report.code.contains("const navigation = useNavigation();"));
        assert!(report.code.contains("from 'react-native';"));
        assert!(!report.code.contains("use client"));
        assert!(!report.applied.is_empty());
    }

    #[test]
    fn test_ref_type_argument_survives_fix() {
        let code = "import { useRef } from 'react';\nimport { View, Text } from 'react-native';\n\nexport default function Panel() {\n  const ref = useRef<View>(null);\n  return (\n    <View ref={ref} className=\"p-4\">\n      <Text>Hi</Text>\n    </View>\n  );\n}\n";
        let report = RuntimeErrorFixer::new().fix_until_clean(code, 3);

        assert!(report.is_clean(), "remaining: {:?}", report.remaining);
        assert!(report.code.contains("  const ref = useRef<View>(null);\n  return (\n"));
        assert!(report.code.contains("<View ref={ref}>"));
        assert!(!report.code.contains("<Text>(null)"));
    }

    #[test]
    fn test_clean_code_untouched() {
        let code = "import { View } from 'react-native';\nexport default () => <View />;\n";
        let report = RuntimeErrorFixer::new().fix_until_clean(code, 3);
        assert_eq!(report.code, code);
        assert_eq!(report.iterations, 0);
        assert!(report.applied.is_empty());
    }

    #[test]
    fn test_unfixable_is_reported() {
        let code = "import { View } from 'react-native';\nconst w = window.innerWidth;\nexport default () => <View />;\n";
        let report = RuntimeErrorFixer::new().fix_until_clean(code, 3);
        assert_eq!(report.remaining.len(), 1);
        assert_eq!(report.remaining[0].kind, IssueKind::BrowserGlobal);
        assert_eq!(report.remaining[0].line, 2);
    }

    #[test]
    fn test_nativewind_keeps_class_names() {
        let code = "import { View } from 'react-native';\nexport default () => <View className=\"p-4\" />;\n";
        let fixer = RuntimeErrorFixer::new().with_nativewind(true);
        assert!(fixer.validate(code).is_empty());
        assert_eq!(fixer.fix(code).code, code);
    }

    #[test]
    fn test_fix_and_check_tree() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("src/screens")).unwrap();
        fs::create_dir_all(root.join("node_modules/x")).unwrap();
        fs::write(root.join("src/screens/A.tsx"), "export default () => <div>a</div>;\n").unwrap();
        fs::write(root.join("node_modules/x/index.js"), "<div/>").unwrap();
        fs::write(root.join("README.md"), "<div>").unwrap();

        let fixer = RuntimeErrorFixer::new();
        let check = fixer.check_tree(root).unwrap();
        assert_eq!(check.files_checked(), 1);
        assert!(!check.is_clean());

        let fixed = fixer.fix_tree(root, 3).unwrap();
        assert_eq!(fixed.files_modified(), 1);
        assert!(fixed.is_clean());

        let content = fs::read_to_string(root.join("src/screens/A.tsx")).unwrap();
        assert!(content.contains("<View><Text>a</Text></View>"));
        assert!(fixer.check_tree(root).unwrap().is_clean());
    }
}
