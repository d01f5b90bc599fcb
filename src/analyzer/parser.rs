// src/analyzer/parser.rs

//! Lightweight JavaScript/TypeScript source scanner
//!
//! Not a semantic parser: imports, exports and JSX usage are pulled out with
//! regexes, and "readable" only means the file is UTF-8 and its brackets
//! balance once strings, template literals and comments are skipped. That is
//! enough to decide whether a file is worth sending to the provider.

use crate::error::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

/// One `import` (or `require`) of a module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportDecl {
    /// Module specifier as written
    pub source: String,
    pub default: Option<String>,
    pub namespace: Option<String>,
    pub named: Vec<String>,
    /// `import type { ... }`
    pub type_only: bool,
}

impl ImportDecl {
    fn bare(source: &str) -> Self {
        Self {
            source: source.to_string(),
            default: None,
            namespace: None,
            named: Vec::new(),
            type_only: false,
        }
    }

    /// Relative or `@/` alias import
    pub fn is_local(&self) -> bool {
        self.source.starts_with('.') || self.source.starts_with("@/") || self.source.starts_with("~/")
    }
}

/// Module-level directive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Directive {
    UseClient,
    UseServer,
}

/// Facts extracted from one source file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedSource {
    pub imports: Vec<ImportDecl>,
    /// Named exports
    pub exports: Vec<String>,
    pub has_default_export: bool,
    pub has_jsx: bool,
    pub directive: Option<Directive>,
    /// Next.js data-fetching exports (`getServerSideProps`, ...)
    pub data_fetching: Vec<String>,
    /// HTTP methods handled, for API route files
    pub http_methods: BTreeSet<String>,
    /// React hooks called
    pub hooks: BTreeSet<String>,
    /// Lowercase (intrinsic/HTML) JSX tags
    pub html_tags: BTreeSet<String>,
    /// Capitalized JSX components
    pub components: BTreeSet<String>,
    pub line_count: usize,
    pub readable: bool,
    /// Why the file is not readable
    pub problem: Option<String>,
}

impl ParsedSource {
    /// Module specifiers imported from `next/*`
    pub fn next_imports(&self) -> Vec<&str> {
        self.imports
            .iter()
            .map(|i| i.source.as_str())
            .filter(|s| *s == "next" || s.starts_with("next/"))
            .collect()
    }

    pub fn imports_from(&self, module: &str) -> bool {
        self.imports.iter().any(|i| i.source == module)
    }
}

/// Scanner for JS/TS sources
///
/// Zero-sized; patterns are compiled once in a static.
pub struct CodeParser;

struct Patterns {
    import_from: Regex,
    import_bare: Regex,
    require: Regex,
    export_decl: Regex,
    export_list: Regex,
    export_default: Regex,
    jsx_open: Regex,
    hook_call: Regex,
    data_fetching: Regex,
    method_export: Regex,
    method_compare: Regex,
}

static PATTERNS: LazyLock<Patterns> = LazyLock::new(|| Patterns {
    import_from: Regex::new(
        r#"(?m)^\s*import\s+(type\s+)?(?:([\w$]+)\s*,?\s*)?(?:\*\s*as\s+([\w$]+)\s*)?(?:\{([^}]*)\}\s*)?from\s*['"]([^'"]+)['"]"#,
    )
    .unwrap(),
    import_bare: Regex::new(r#"(?m)^\s*import\s*['"]([^'"]+)['"]"#).unwrap(),
    require: Regex::new(r#"\brequire\(\s*['"]([^'"]+)['"]\s*\)"#).unwrap(),
    export_decl: Regex::new(
        r"(?m)^\s*export\s+(?:declare\s+)?(?:async\s+)?(?:const|let|var|function\*?|class|interface|type|enum)\s+([\w$]+)",
    )
    .unwrap(),
    export_list: Regex::new(r"(?m)^\s*export\s*(?:type\s*)?\{([^}]*)\}").unwrap(),
    export_default: Regex::new(r"(?m)^\s*export\s+default\b").unwrap(),
    jsx_open: Regex::new(r"(?:^|[^\w$.\])])<([A-Za-z][\w.]*)(?:\s|>|/>)").unwrap(),
    hook_call: Regex::new(r"\b(use[A-Z][\w]*)\s*(?:<[^>()]*>)?\s*\(").unwrap(),
    data_fetching: Regex::new(
        r"export\s+(?:async\s+)?(?:function|const)\s+(getServerSideProps|getStaticProps|getStaticPaths|getInitialProps|generateStaticParams|generateMetadata)\b",
    )
    .unwrap(),
    method_export: Regex::new(
        r"export\s+(?:async\s+)?(?:function|const)\s+(GET|POST|PUT|PATCH|DELETE|HEAD|OPTIONS)\b",
    )
    .unwrap(),
    method_compare: Regex::new(
        r#"(?:method\s*[!=]==?\s*|case\s+)['"](GET|POST|PUT|PATCH|DELETE|HEAD|OPTIONS)['"]"#,
    )
    .unwrap(),
});

impl CodeParser {
    /// Read and scan a file
    ///
    /// Non-UTF-8 content yields an unreadable result rather than an error;
    /// only I/O failures are errors.
    pub fn parse_file(path: &Path) -> Result<ParsedSource> {
        let bytes = fs::read(path)?;
        match String::from_utf8(bytes) {
            Ok(text) => Ok(Self::parse(&text)),
            Err(_) => Ok(ParsedSource {
                readable: false,
                problem: Some("file is not valid UTF-8".to_string()),
                ..Default::default()
            }),
        }
    }

    /// Scan source text
    pub fn parse(source: &str) -> ParsedSource {
        let mut parsed = ParsedSource {
            line_count: source.lines().count(),
            ..Default::default()
        };

        match check_balance(source) {
            Ok(()) => parsed.readable = true,
            Err(problem) => parsed.problem = Some(problem),
        }

        let code = strip_comments(source);
        parsed.directive = detect_directive(source);

        for cap in PATTERNS.import_from.captures_iter(&code) {
            let mut decl = ImportDecl::bare(&cap[5]);
            decl.type_only = cap.get(1).is_some();
            decl.default = cap.get(2).map(|m| m.as_str().to_string());
            decl.namespace = cap.get(3).map(|m| m.as_str().to_string());
            if let Some(list) = cap.get(4) {
                decl.named = split_specifiers(list.as_str());
            }
            parsed.imports.push(decl);
        }
        for cap in PATTERNS.import_bare.captures_iter(&code) {
            parsed.imports.push(ImportDecl::bare(&cap[1]));
        }
        for cap in PATTERNS.require.captures_iter(&code) {
            parsed.imports.push(ImportDecl::bare(&cap[1]));
        }

        for cap in PATTERNS.export_decl.captures_iter(&code) {
            push_unique(&mut parsed.exports, &cap[1]);
        }
        for cap in PATTERNS.export_list.captures_iter(&code) {
            for name in split_specifiers(&cap[1]) {
                if name == "default" {
                    parsed.has_default_export = true;
                } else {
                    push_unique(&mut parsed.exports, &name);
                }
            }
        }
        if PATTERNS.export_default.is_match(&code) {
            parsed.has_default_export = true;
        }

        for cap in PATTERNS.jsx_open.captures_iter(&code) {
            let tag = &cap[1];
            if tag.starts_with(|c: char| c.is_ascii_lowercase()) {
                parsed.html_tags.insert(tag.to_string());
            } else {
                parsed.components.insert(tag.to_string());
            }
        }
        parsed.has_jsx = (!parsed.html_tags.is_empty() || !parsed.components.is_empty())
            && (code.contains("</") || code.contains("/>"));
        if !parsed.has_jsx {
            parsed.html_tags.clear();
            parsed.components.clear();
        }

        for cap in PATTERNS.hook_call.captures_iter(&code) {
            parsed.hooks.insert(cap[1].to_string());
        }
        for cap in PATTERNS.data_fetching.captures_iter(&code) {
            push_unique(&mut parsed.data_fetching, &cap[1]);
        }
        for cap in PATTERNS.method_export.captures_iter(&code) {
            parsed.http_methods.insert(cap[1].to_string());
        }
        for cap in PATTERNS.method_compare.captures_iter(&code) {
            parsed.http_methods.insert(cap[1].to_string());
        }

        parsed
    }
}

fn push_unique(list: &mut Vec<String>, name: &str) {
    if !list.iter().any(|n| n == name) {
        list.push(name.to_string());
    }
}

/// Split `{ a, b as c, type D }` contents into local names
fn split_specifiers(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|spec| {
            let spec = spec.strip_prefix("type ").unwrap_or(spec).trim();
            match spec.split_once(" as ") {
                Some((_, alias)) => alias.trim().to_string(),
                None => spec.to_string(),
            }
        })
        .collect()
}

/// `'use client'` / `'use server'` as the first statement
fn detect_directive(source: &str) -> Option<Directive> {
    let mut in_block = false;
    for line in source.lines() {
        let line = line.trim();
        if in_block {
            if line.contains("*/") {
                in_block = false;
            }
            continue;
        }
        if line.is_empty() || line.starts_with("//") {
            continue;
        }
        if line.starts_with("/*") {
            in_block = !line.contains("*/");
            continue;
        }
        let statement = line.trim_end_matches(';').trim();
        return match statement {
            "'use client'" | "\"use client\"" => Some(Directive::UseClient),
            "'use server'" | "\"use server\"" => Some(Directive::UseServer),
            _ => None,
        };
    }
    None
}

/// Replace comments with spaces, keeping strings and line structure intact
pub(crate) fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            out.push(c);
            if c == '\\' {
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            } else if c == q || (c == '\n' && q != '`') {
                quote = None;
            }
            continue;
        }

        match c {
            '\'' | '"' | '`' => {
                quote = Some(c);
                out.push(c);
            }
            '/' if chars.peek() == Some(&'/') => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                    }
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }

    out
}

/// Check that brackets balance outside strings and comments
///
/// Single- and double-quoted strings end at a newline even when
/// unterminated, so apostrophes in JSX text only affect their own line.
fn check_balance(source: &str) -> std::result::Result<(), String> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mode {
        Code,
        LineComment,
        BlockComment,
        Quoted(char),
        Template,
    }

    // '$' marks a `${` template expression
    let mut stack: Vec<(char, usize)> = Vec::new();
    let mut mode = Mode::Code;
    let mut line = 1usize;
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\n' {
            line += 1;
        }
        match mode {
            Mode::LineComment => {
                if c == '\n' {
                    mode = Mode::Code;
                }
            }
            Mode::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    mode = Mode::Code;
                }
            }
            Mode::Quoted(q) => {
                if c == '\\' {
                    chars.next();
                } else if c == q || c == '\n' {
                    mode = Mode::Code;
                }
            }
            Mode::Template => {
                if c == '\\' {
                    chars.next();
                } else if c == '`' {
                    mode = Mode::Code;
                } else if c == '$' && chars.peek() == Some(&'{') {
                    chars.next();
                    stack.push(('$', line));
                    mode = Mode::Code;
                }
            }
            Mode::Code => match c {
                '/' if chars.peek() == Some(&'/') => mode = Mode::LineComment,
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    mode = Mode::BlockComment;
                }
                '\'' | '"' => mode = Mode::Quoted(c),
                '`' => mode = Mode::Template,
                '(' | '[' | '{' => stack.push((c, line)),
                ')' | ']' | '}' => {
                    let expected = match c {
                        ')' => '(',
                        ']' => '[',
                        _ => '{',
                    };
                    match stack.pop() {
                        Some((open, _)) if open == expected => {}
                        Some(('$', _)) if c == '}' => mode = Mode::Template,
                        Some((open, open_line)) => {
                            return Err(format!(
                                "line {line}: '{c}' does not match '{open}' opened on line {open_line}"
                            ));
                        }
                        None => return Err(format!("line {line}: unexpected '{c}'")),
                    }
                }
                _ => {}
            },
        }
    }

    match mode {
        Mode::BlockComment => return Err("unterminated block comment".to_string()),
        Mode::Template => return Err("unterminated template literal".to_string()),
        _ => {}
    }
    if let Some((open, open_line)) = stack.pop() {
        let open = if open == '$' { '{' } else { open };
        return Err(format!("'{open}' opened on line {open_line} is never closed"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"'use client';
// Home page
import React, { useState, useEffect as useEff } from 'react';
import Link from 'next/link';
import * as api from '../lib/api';
import type { User } from '@/types';
import '../styles/home.css';
const fs = require('fs');

export default function Home({ initial }: { initial: User[] }) {
  const [items, setItems] = useState<User[]>(initial);
  useEffect(() => { api.load().then(setItems); }, []);
  return (
    <div className="grid">
      <p>Don't panic</p>
      {items.map((u) => <Card key={u.id} user={u} />)}
      <Link href={`/users/${items.length}`}>More</Link>
    </div>
  );
}

export async function getServerSideProps() {
  return { props: { initial: [] } };
}
"#;

    #[test]
    fn test_imports() {
        let parsed = CodeParser::parse(PAGE);
        let sources: Vec<_> = parsed.imports.iter().map(|i| i.source.as_str()).collect();
        assert_eq!(
            sources,
            vec!["react", "next/link", "../lib/api", "@/types", "../styles/home.css", "fs"]
        );

        let react = &parsed.imports[0];
        assert_eq!(react.default.as_deref(), Some("React"));
        assert_eq!(react.named, vec!["useState", "useEff"]);

        assert_eq!(parsed.imports[2].namespace.as_deref(), Some("api"));
        assert!(parsed.imports[3].type_only);
        assert!(parsed.imports[2].is_local());
        assert!(parsed.imports[3].is_local());
        assert!(!parsed.imports[1].is_local());
        assert_eq!(parsed.next_imports(), vec!["next/link"]);
    }

    #[test]
    fn test_exports_and_directive() {
        let parsed = CodeParser::parse(PAGE);
        assert!(parsed.has_default_export);
        assert_eq!(parsed.exports, vec!["getServerSideProps"]);
        assert_eq!(parsed.data_fetching, vec!["getServerSideProps"]);
        assert_eq!(parsed.directive, Some(Directive::UseClient));
    }

    #[test]
    fn test_jsx_and_hooks() {
        let parsed = CodeParser::parse(PAGE);
        assert!(parsed.has_jsx);
        assert!(parsed.html_tags.contains("div"));
        assert!(parsed.html_tags.contains("p"));
        assert!(parsed.components.contains("Card"));
        assert!(parsed.components.contains("Link"));
        // Generic type arguments are not JSX
        assert!(!parsed.components.contains("User"));
        assert!(parsed.hooks.contains("useState"));
        assert!(parsed.hooks.contains("useEffect"));
    }

    #[test]
    fn test_readable() {
        let parsed = CodeParser::parse(PAGE);
        assert!(parsed.readable, "{:?}", parsed.problem);
    }

    #[test]
    fn test_unbalanced() {
        let parsed = CodeParser::parse("export function f() {\n  if (x) {\n    return 1;\n}\n");
        assert!(!parsed.readable);
        assert!(parsed.problem.unwrap().contains("never closed"));

        let parsed = CodeParser::parse("const a = [1, 2);\n");
        assert!(!parsed.readable);
    }

    #[test]
    fn test_brackets_in_strings_and_comments_ignored() {
        let source = "const s = '(';\nconst t = \"}\";\n// {\n/* [ */\nconst u = `a ${b({})} (`;\n";
        assert!(CodeParser::parse(source).readable);
    }

    #[test]
    fn test_api_route_methods() {
        let app_route = "export async function GET(req) { return Response.json([]); }\nexport const POST = async () => {};\n";
        let parsed = CodeParser::parse(app_route);
        assert_eq!(
            parsed.http_methods.iter().cloned().collect::<Vec<_>>(),
            vec!["GET", "POST"]
        );

        let pages_api = "export default function handler(req, res) {\n  if (req.method === 'DELETE') {}\n  switch (req.method) { case 'PUT': break; }\n}\n";
        let parsed = CodeParser::parse(pages_api);
        assert!(parsed.http_methods.contains("DELETE"));
        assert!(parsed.http_methods.contains("PUT"));
    }

    #[test]
    fn test_plain_module_has_no_jsx() {
        let parsed = CodeParser::parse("export const add = (a: number, b: number) => a < b ? a : b;\n");
        assert!(!parsed.has_jsx);
        assert_eq!(parsed.exports, vec!["add"]);
    }

    #[test]
    fn test_strip_comments_keeps_strings() {
        let stripped = strip_comments("const url = 'http://x'; // comment\n/* block */ call();\n");
        assert!(stripped.contains("'http://x'"));
        assert!(!stripped.contains("comment"));
        assert!(!stripped.contains("block"));
        assert!(stripped.contains("call();"));
    }

    #[test]
    fn test_non_utf8_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("bad.js");
        fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();
        let parsed = CodeParser::parse_file(&path).unwrap();
        assert!(!parsed.readable);
    }
}
