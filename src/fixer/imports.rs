// src/fixer/imports.rs

//! Import statement editing

use regex::Regex;
use std::sync::LazyLock;

static IMPORT_STATEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*import\b[\s\S]*?['"][^'"\n]+['"][ \t]*;?[ \t]*$"#).unwrap()
});

/// Compile a pattern built around an escaped module name
fn module_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| unreachable!("invalid import pattern {pattern}: {e}"))
}

/// Local names bound by any import statement
pub fn imported_names(code: &str) -> Vec<String> {
    let parsed = crate::analyzer::CodeParser::parse(code);
    parsed
        .imports
        .into_iter()
        .flat_map(|i| i.default.into_iter().chain(i.namespace).chain(i.named))
        .collect()
}

/// Whether anything is imported from `module`
pub fn imports_module(code: &str, module: &str) -> bool {
    module_import(module).is_match(code)
}

fn module_import(module: &str) -> Regex {
    module_regex(&format!(
        r#"(?m)^[ \t]*import\b[^;]*?from\s*['"]{}['"]"#,
        regex::escape(module)
    ))
}

/// Insert `statement` after the last import, or at the top
pub fn insert_import(code: &str, statement: &str) -> String {
    match IMPORT_STATEMENT.find_iter(code).last() {
        Some(last) => {
            let (head, tail) = code.split_at(last.end());
            format!("{head}\n{statement}{tail}")
        }
        None => {
            // Keep a leading directive first
            let first = code.lines().next().unwrap_or("").trim();
            if first.starts_with("'use ") || first.starts_with("\"use ") {
                let split = code.find('\n').map(|i| i + 1).unwrap_or(code.len());
                let (head, tail) = code.split_at(split);
                format!("{head}{statement}\n{tail}")
            } else {
                format!("{statement}\n{code}")
            }
        }
    }
}

/// Add named imports from `module`, merging into an existing import
pub fn add_named_imports(code: &str, module: &str, names: &[&str]) -> String {
    if names.is_empty() {
        return code.to_string();
    }

    let braced = module_regex(&format!(
        r#"(?m)^([ \t]*import\s+(?:[\w$]+\s*,\s*)?)\{{([^}}]*)\}}(\s*from\s*['"]{}['"])"#,
        regex::escape(module)
    ));

    if let Some(caps) = braced.captures(code) {
        let mut existing: Vec<String> = caps[2]
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        for name in names {
            if !existing.iter().any(|e| e == name || e.ends_with(&format!(" as {name}"))) {
                existing.push((*name).to_string());
            }
        }
        let replacement = format!("{}{{ {} }}{}", &caps[1], existing.join(", "), &caps[3]);
        let range = caps.get(0).map(|m| m.range()).unwrap_or(0..0);
        let mut out = String::with_capacity(code.len() + 32);
        out.push_str(&code[..range.start]);
        out.push_str(&replacement);
        out.push_str(&code[range.end..]);
        return out;
    }

    let default_only = module_regex(&format!(
        r#"(?m)^([ \t]*import\s+[\w$]+)(\s+from\s*['"]{}['"])"#,
        regex::escape(module)
    ));

    let list = names.join(", ");
    if default_only.is_match(code) {
        return default_only
            .replacen(code, 1, format!("${{1}}, {{ {list} }}${{2}}"))
            .into_owned();
    }

    insert_import(code, &format!("import {{ {list} }} from '{module}';"))
}

/// Add `import name from 'module'` unless `name` is already bound
pub fn add_default_import(code: &str, name: &str, module: &str) -> String {
    if imported_names(code).iter().any(|n| n == name) {
        return code.to_string();
    }
    insert_import(code, &format!("import {name} from '{module}';"))
}

/// Remove whole import statements from `module`, returning the bound names
pub fn remove_module_imports(code: &str, module: &str) -> (String, Vec<String>) {
    let statement = module_regex(&format!(
        r#"(?m)^[ \t]*import\b[^;'"]*?from\s*['"]{}['"][ \t]*;?[ \t]*\r?\n?"#,
        regex::escape(module)
    ));

    let mut names = Vec::new();
    for m in statement.find_iter(code) {
        names.extend(imported_names(m.as_str()));
    }
    (statement.replace_all(code, "").into_owned(), names)
}
