// src/convert/prompts.rs

//! Prompt construction and reply parsing for the conversion calls

use super::plan::{ConversionPlan, PlannedFile, TargetKind, route_for_file, route_params};
use crate::analyzer::ProjectAnalysis;
use crate::fixer::Issue;
use std::collections::BTreeMap;
use std::fmt::Write;

/// System message for every conversion call
pub const SYSTEM_PROMPT: &str = "You convert Next.js code into React Native code for an Expo app \
that uses React Navigation. Output only code or JSON as requested, never explanations. \
Use components from 'react-native' (View, Text, Image, TouchableOpacity, TextInput, ScrollView, FlatList) \
instead of HTML elements. Style with StyleSheet.create, not className or CSS files. \
Navigate with useNavigation() from '@react-navigation/native' and read params with useRoute(). \
Replace localStorage with AsyncStorage from '@react-native-async-storage/async-storage'. \
Never import from 'next/*' and never use window or document.";

/// Prompt asking the provider for a conversion plan
pub fn planning_prompt(analysis: &ProjectAnalysis) -> String {
    let mut prompt = String::new();
    let _ = writeln!(
        prompt,
        "Plan the conversion of the Next.js project '{}' ({} router, {}) to Expo.",
        analysis.project_name,
        analysis.router,
        if analysis.typescript { "TypeScript" } else { "JavaScript" }
    );

    prompt.push_str("\nSource files (path: category):\n");
    for file in analysis.structure.source() {
        if !analysis.is_readable(&file.path) {
            continue;
        }
        let _ = writeln!(prompt, "- {}: {}", file.path, file.category);
    }

    let replacements = analysis.dependencies.replacements();
    if !replacements.is_empty() {
        let _ = writeln!(prompt, "\nReplacement packages already chosen: {}", replacements.join(", "));
    }
    if !analysis.features.styling.is_empty() {
        let styling: Vec<String> = analysis.features.styling.iter().map(|s| s.to_string()).collect();
        let _ = writeln!(prompt, "Styling: {}", styling.join(", "));
    }
    if !analysis.features.state_management.is_empty() {
        let _ = writeln!(prompt, "State management: {}", analysis.features.state_management.join(", "));
    }

    let entry_points: Vec<&str> = analysis
        .structure
        .files
        .iter()
        .filter(|f| f.category.is_route())
        .map(|f| f.path.as_str())
        .collect();
    if !entry_points.is_empty() {
        prompt.push_str("\nRoute file excerpts:\n");
        for path in entry_points.iter().take(5) {
            if let Some(parsed) = analysis.sources.get(*path) {
                let _ = writeln!(
                    prompt,
                    "- {} exports [{}], hooks [{}]",
                    path,
                    parsed.exports.join(", "),
                    parsed.hooks.iter().cloned().collect::<Vec<_>>().join(", ")
                );
            }
        }
    }

    prompt.push_str(
        "\nReply with one JSON object and nothing else:\n\
{\n  \"screens\": [{\"source\": \"pages/index.tsx\", \"target\": \"src/screens/HomeScreen.tsx\", \"kind\": \"screen\", \"screen_name\": \"Home\"}],\n  \
\"components\": [{\"source\": \"...\", \"target\": \"src/components/...\", \"kind\": \"component\"}],\n  \
\"hooks\": [{\"source\": \"...\", \"target\": \"src/hooks/...\", \"kind\": \"hook\"}],\n  \
\"services\": [{\"source\": \"...\", \"target\": \"src/services/...\", \"kind\": \"service\", \"notes\": \"...\"}],\n  \
\"skipped\": [{\"source\": \"pages/api/x.ts\", \"reason\": \"...\"}],\n  \
\"navigation\": {\"type\": \"stack\", \"initial_route\": \"Home\"},\n  \
\"dependencies\": [\"package-name\"]\n}\n\
Kinds: screen, component, hook, context, service, util, type. Navigation type: stack or tabs.\n",
    );
    prompt
}

/// Everything the per-file prompt needs about one file
#[derive(Debug, Clone)]
pub struct FilePromptContext<'a> {
    pub planned: &'a PlannedFile,
    pub source: &'a str,
    /// Local import specifier in the source → specifier in the Expo tree
    pub import_map: &'a BTreeMap<String, String>,
    pub plan: &'a ConversionPlan,
    pub analysis: &'a ProjectAnalysis,
}

/// Compact project context shared by all file prompts
pub fn project_context(analysis: &ProjectAnalysis, plan: &ConversionPlan) -> String {
    let mut context = String::new();
    let _ = writeln!(
        context,
        "Project: {} ({}), navigation: {} with initial route {}",
        analysis.project_name,
        if analysis.typescript { "TypeScript" } else { "JavaScript" },
        plan.navigation.kind,
        plan.navigation.initial_route
    );
    let screens = plan.screen_names();
    if !screens.is_empty() {
        let _ = writeln!(context, "Screens: {}", screens.join(", "));
    }
    if !plan.dependencies.is_empty() {
        let _ = writeln!(context, "Available packages: {}", plan.dependencies.join(", "));
    }
    let expo_env: Vec<String> = analysis
        .config
        .env_variables
        .iter()
        .filter_map(|v| v.expo_name.as_ref().map(|e| format!("{} → {}", v.name, e)))
        .collect();
    if !expo_env.is_empty() {
        let _ = writeln!(context, "Environment renames: {}", expo_env.join(", "));
    }
    context
}

fn kind_instructions(planned: &PlannedFile) -> String {
    match planned.kind {
        TargetKind::Screen => {
            let name = planned.screen_name.as_deref().unwrap_or("Screen");
            let params = route_params(&route_for_file(&planned.source));
            let mut text = format!(
                "This file becomes the screen '{name}'. Export the screen component as default. \
Replace getServerSideProps/getStaticProps with data loading inside useEffect. \
Wrap content in a ScrollView or SafeAreaView."
            );
            if !params.is_empty() {
                let _ = write!(
                    text,
                    " Read the route params {} from useRoute().params instead of the router query.",
                    params.join(", ")
                );
            }
            text
        }
        TargetKind::Component => {
            "This file is a reusable component. Keep its exports and props unchanged.".to_string()
        }
        TargetKind::Hook => {
            "This file is a custom hook. Keep its name and return shape; drop browser APIs.".to_string()
        }
        TargetKind::Context => {
            "This file holds React context or state. Keep the provider and hook exports.".to_string()
        }
        TargetKind::Service => {
            "This file is a service module. Keep function signatures; use fetch with absolute URLs."
                .to_string()
        }
        TargetKind::Util | TargetKind::Type => {
            "Keep exports unchanged; remove anything that depends on the DOM or Next.js.".to_string()
        }
    }
}

/// Prompt converting one source file
pub fn file_prompt(ctx: &FilePromptContext<'_>) -> String {
    let mut prompt = String::new();
    let _ = writeln!(
        prompt,
        "Convert the Next.js file {} into the React Native file {}.",
        ctx.planned.source, ctx.planned.target
    );
    prompt.push_str(&kind_instructions(ctx.planned));
    prompt.push('\n');
    if let Some(notes) = &ctx.planned.notes {
        let _ = writeln!(prompt, "Notes: {notes}");
    }

    prompt.push('\n');
    prompt.push_str(&project_context(ctx.analysis, ctx.plan));

    if !ctx.import_map.is_empty() {
        prompt.push_str("\nRewrite these local imports:\n");
        for (from, to) in ctx.import_map {
            let _ = writeln!(prompt, "- '{from}' → '{to}'");
        }
    }

    let lang = match ctx.planned.target.rsplit_once('.').map(|(_, e)| e) {
        Some("ts") | Some("tsx") => "tsx",
        _ => "jsx",
    };
    let _ = write!(
        prompt,
        "\nSource:\n```{lang}\n{}\n```\n\nReply with the complete converted file in one ```{lang} block.\n",
        ctx.source.trim_end()
    );
    prompt
}

/// Prompt asking the provider to resolve issues the regex fixer left behind
pub fn fix_prompt(target: &str, code: &str, issues: &[Issue]) -> String {
    let mut prompt = format!(
        "The React Native file {target} still contains web-only code. Fix these problems \
and reply with the complete corrected file in one code block:\n"
    );
    for issue in issues {
        let _ = writeln!(prompt, "- {issue}");
    }
    let _ = write!(prompt, "\n```tsx\n{}\n```\n", code.trim_end());
    prompt
}

const CODE_LANGS: &[&str] = &[
    "", "js", "jsx", "ts", "tsx", "javascript", "typescript", "typescriptreact", "javascriptreact",
];

/// Code from a provider reply
///
/// Takes the longest fenced block tagged with a JS/TS language (or
/// untagged); a reply without fences is used as-is.
pub fn extract_code(reply: &str) -> String {
    let mut best: Option<&str> = None;
    let mut rest = reply;
    while let Some(open) = rest.find("```") {
        let after = &rest[open + 3..];
        let Some(newline) = after.find('\n') else {
            break;
        };
        let lang = after[..newline].trim().to_ascii_lowercase();
        let body = &after[newline + 1..];
        let Some(close) = body.find("```") else {
            // Unterminated fence, usually a truncated reply
            if CODE_LANGS.contains(&lang.as_str()) && best.is_none_or(|b| body.len() > b.len()) {
                best = Some(body);
            }
            break;
        };
        let block = &body[..close];
        if CODE_LANGS.contains(&lang.as_str()) && best.is_none_or(|b| block.len() > b.len()) {
            best = Some(block);
        }
        rest = &body[close + 3..];
    }

    let code = best.unwrap_or(reply).trim();
    format!("{code}\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_code_prefers_longest_code_block() {
        let reply = "Here you go:\n```json\n{\"a\": 1, \"bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb\": 2}\n```\n```tsx\nexport default function A() {}\n```\n```\nx\n```";
        assert_eq!(extract_code(reply), "export default function A() {}\n");
    }

    #[test]
    fn test_extract_code_without_fences() {
        assert_eq!(extract_code("  const a = 1;\n\n"), "const a = 1;\n");
    }

    #[test]
    fn test_extract_code_truncated_fence() {
        assert_eq!(extract_code("```jsx\nconst a = 1;\nconst b"), "const a = 1;\nconst b\n");
    }

    #[test]
    fn test_fix_prompt_lists_issues() {
        let issues = vec![Issue {
            line: 3,
            kind: crate::fixer::IssueKind::HtmlTag,
            message: "HTML tag <div>".to_string(),
        }];
        let prompt = fix_prompt("src/screens/HomeScreen.tsx", "<div />", &issues);
        assert!(prompt.contains("- line 3: HTML tag <div>"));
        assert!(prompt.contains("<div />"));
    }
}
