// src/convert/plan.rs

//! Conversion plan: which source file becomes which Expo file
//!
//! A plan comes either from the provider (JSON in the planning reply) or from
//! [`default_plan`]. Provider plans are always passed through
//! [`reconcile`] so every readable source file ends up planned or skipped
//! exactly once.

use crate::analyzer::{FileCategory, ProjectAnalysis, ProjectFile};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use strum_macros::{Display, EnumString};
use tracing::{debug, warn};

/// What a planned file becomes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TargetKind {
    Screen,
    Component,
    Hook,
    Context,
    Service,
    Util,
    Type,
}

/// Navigator shape
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NavigationKind {
    #[default]
    Stack,
    Tabs,
}

/// Where the plan came from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PlanOrigin {
    #[default]
    Default,
    Ai,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedFile {
    /// Source path relative to the Next.js root
    pub source: String,
    /// Target path relative to the Expo root
    pub target: String,
    pub kind: TargetKind,
    /// Navigator route name (screens only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFile {
    pub source: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationPlan {
    #[serde(default, rename = "type", alias = "kind")]
    pub kind: NavigationKind,
    #[serde(default)]
    pub initial_route: String,
}

/// Full conversion plan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionPlan {
    #[serde(default)]
    pub screens: Vec<PlannedFile>,
    #[serde(default)]
    pub components: Vec<PlannedFile>,
    #[serde(default)]
    pub hooks: Vec<PlannedFile>,
    /// Context providers, services, utilities and types
    #[serde(default)]
    pub services: Vec<PlannedFile>,
    #[serde(default)]
    pub skipped: Vec<SkippedFile>,
    #[serde(default)]
    pub navigation: NavigationPlan,
    /// Extra npm packages for the Expo project
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub origin: PlanOrigin,
}

impl ConversionPlan {
    /// All planned files, screens first
    pub fn files(&self) -> impl Iterator<Item = &PlannedFile> {
        self.screens
            .iter()
            .chain(&self.components)
            .chain(&self.hooks)
            .chain(&self.services)
    }

    pub fn planned_for(&self, source: &str) -> Option<&PlannedFile> {
        self.files().find(|f| f.source == source)
    }

    pub fn is_skipped(&self, source: &str) -> bool {
        self.skipped.iter().any(|s| s.source == source)
    }

    pub fn screen_names(&self) -> Vec<&str> {
        self.screens
            .iter()
            .filter_map(|s| s.screen_name.as_deref())
            .collect()
    }

    pub fn file_count(&self) -> usize {
        self.files().count()
    }

    fn push(&mut self, file: PlannedFile) {
        match file.kind {
            TargetKind::Screen => self.screens.push(file),
            TargetKind::Component => self.components.push(file),
            TargetKind::Hook => self.hooks.push(file),
            TargetKind::Context | TargetKind::Service | TargetKind::Util | TargetKind::Type => {
                self.services.push(file)
            }
        }
    }

    fn skip(&mut self, source: &str, reason: &str) {
        self.skipped.push(SkippedFile {
            source: source.to_string(),
            reason: reason.to_string(),
        });
    }
}

/// URL route served by a page or app-router file
pub fn route_for_file(path: &str) -> String {
    let path = path.strip_prefix("src/").unwrap_or(path);
    let without_ext = path.rsplit_once('.').map(|(p, _)| p).unwrap_or(path);

    let segments: Vec<&str> = if let Some(rest) = without_ext.strip_prefix("app/") {
        let mut parts: Vec<&str> = rest.split('/').collect();
        parts.pop();
        parts
    } else {
        let rest = without_ext.strip_prefix("pages/").unwrap_or(without_ext);
        let mut parts: Vec<&str> = rest.split('/').collect();
        if parts.last() == Some(&"index") {
            parts.pop();
        }
        parts
    };

    let route: Vec<&str> = segments
        .into_iter()
        .filter(|s| !s.is_empty() && !is_route_group(s))
        .collect();
    format!("/{}", route.join("/"))
}

fn is_route_group(segment: &str) -> bool {
    segment.starts_with('(') && segment.ends_with(')')
}

/// Navigator route name for a URL route
///
/// `/` is `Home`, `[id]` is `Id`, `[...slug]` is `Slug`, route groups are
/// dropped, and `/404` is `NotFound`.
pub fn screen_name_for_route(route: &str) -> String {
    let route = route.split(['?', '#']).next().unwrap_or(route);
    let mut name = String::new();
    for segment in route.split('/') {
        if segment.is_empty() || is_route_group(segment) {
            continue;
        }
        let segment = segment
            .trim_start_matches('[')
            .trim_start_matches("...")
            .trim_end_matches(']');
        let segment = match segment {
            "404" | "not-found" => "not-found",
            "500" => "server-error",
            other => other,
        };
        name.push_str(&pascal_case(segment));
    }
    if name.is_empty() {
        return "Home".to_string();
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert_str(0, "Page");
    }
    name
}

/// Navigator route name for a page or app-router file
pub fn screen_name_for_file(path: &str) -> String {
    match file_stem(path) {
        "not-found" | "404" => "NotFound".to_string(),
        _ => screen_name_for_route(&route_for_file(path)),
    }
}

/// `user-profile_page` → `UserProfilePage`
pub fn pascal_case(text: &str) -> String {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// Dynamic segment names of a route, e.g. `/blog/[slug]` → `["slug"]`
pub fn route_params(route: &str) -> Vec<String> {
    route
        .split('/')
        .filter(|s| s.starts_with('['))
        .map(|s| {
            s.trim_start_matches('[')
                .trim_start_matches("...")
                .trim_end_matches(']')
                .to_string()
        })
        .collect()
}

fn extension(path: &str) -> &str {
    path.rsplit_once('.').map(|(_, e)| e).unwrap_or("js")
}

/// Target extension for a file that contains JSX
fn jsx_extension(source: &str) -> &'static str {
    match extension(source) {
        "ts" | "tsx" => "tsx",
        _ => "js",
    }
}

/// Target extension for a plain module
fn module_extension(source: &str) -> &'static str {
    match extension(source) {
        "tsx" => "tsx",
        "ts" => "ts",
        _ => "js",
    }
}

/// Path below the first `dir/` component, or the file name
fn below_dir<'p>(path: &'p str, dirs: &[&str]) -> &'p str {
    let path = path.strip_prefix("src/").unwrap_or(path);
    for dir in dirs {
        let prefix = format!("{dir}/");
        if let Some(rest) = path.strip_prefix(&prefix) {
            return rest;
        }
        let infix = format!("/{dir}/");
        if let Some(pos) = path.find(&infix) {
            return &path[pos + infix.len()..];
        }
    }
    path.rsplit('/').next().unwrap_or(path)
}

fn replace_extension(path: &str, ext: &str) -> String {
    let stem = path.rsplit_once('.').map(|(s, _)| s).unwrap_or(path);
    format!("{stem}.{ext}")
}

fn file_stem(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    name.rsplit_once('.').map(|(s, _)| s).unwrap_or(name)
}

const SERVICE_HINTS: &[&str] = &["api", "client", "service", "fetch", "http", "firebase", "supabase"];

enum Decision {
    Plan(PlannedFile),
    Skip(&'static str),
    Ignore,
}

fn decide(file: &ProjectFile) -> Decision {
    let path = file.path.as_str();
    let stem = file_stem(path);
    let planned = |target: String, kind: TargetKind| {
        Decision::Plan(PlannedFile {
            source: path.to_string(),
            target,
            kind,
            screen_name: None,
            notes: None,
        })
    };

    match file.category {
        FileCategory::Api => Decision::Skip("API routes run on a server; call them over HTTP instead"),
        FileCategory::Style => Decision::Skip("web stylesheets are replaced by StyleSheet objects"),
        FileCategory::Test => Decision::Skip("web tests are not carried over"),
        FileCategory::Config => Decision::Skip("Next.js configuration has no Expo equivalent"),
        FileCategory::Asset => Decision::Skip("static asset, copied to assets/"),
        FileCategory::Page => match stem {
            "_app" => Decision::Skip("_app is replaced by App and the navigator"),
            "_document" => Decision::Skip("_document has no counterpart without a DOM"),
            "_error" => Decision::Skip("_error pages are not used by React Navigation"),
            "_middleware" => Decision::Skip("middleware has no mobile equivalent"),
            _ => planned(String::new(), TargetKind::Screen),
        },
        FileCategory::App => match stem {
            "page" | "not-found" => planned(String::new(), TargetKind::Screen),
            _ => {
                let rest = path.strip_prefix("src/").unwrap_or(path);
                let rest = rest.strip_prefix("app/").unwrap_or(rest);
                let dir = rest.rsplit_once('/').map(|(d, _)| d).unwrap_or("");
                let name = pascal_case(stem);
                let target = if dir.is_empty() {
                    format!("src/components/app/{name}.{}", jsx_extension(path))
                } else {
                    format!("src/components/app/{dir}/{name}.{}", jsx_extension(path))
                };
                planned(target, TargetKind::Component)
            }
        },
        FileCategory::Component => {
            let rest = path.strip_prefix("src/").unwrap_or(path);
            let target = match rest.strip_prefix("app/") {
                Some(colocated) => format!("src/components/app/{colocated}"),
                None => format!("src/components/{}", below_dir(path, &["components", "ui"])),
            };
            planned(replace_extension(&target, jsx_extension(path)), TargetKind::Component)
        }
        FileCategory::Hook => {
            let target = format!("src/hooks/{}", below_dir(path, &["hooks"]));
            planned(replace_extension(&target, module_extension(path)), TargetKind::Hook)
        }
        FileCategory::Context => {
            let target = format!(
                "src/context/{}",
                below_dir(path, &["context", "contexts", "providers", "store"])
            );
            planned(replace_extension(&target, module_extension(path)), TargetKind::Context)
        }
        FileCategory::Lib => {
            let rest = below_dir(path, &["lib", "utils", "services", "helpers", "api"]);
            let lower = path.to_ascii_lowercase();
            let is_service = lower.contains("services/")
                || lower.contains("api/")
                || SERVICE_HINTS.iter().any(|h| stem.to_ascii_lowercase().contains(h));
            let (dir, kind) = if is_service {
                ("services", TargetKind::Service)
            } else {
                ("utils", TargetKind::Util)
            };
            let target = format!("src/{dir}/{rest}");
            planned(replace_extension(&target, module_extension(path)), kind)
        }
        FileCategory::Type => {
            let target = format!("src/types/{}", below_dir(path, &["types"]));
            Decision::Plan(PlannedFile {
                source: path.to_string(),
                target,
                kind: TargetKind::Type,
                screen_name: None,
                notes: None,
            })
        }
        FileCategory::Other if file.is_source => {
            if stem == "middleware" {
                Decision::Skip("middleware has no mobile equivalent")
            } else {
                let target = format!("src/utils/{}", path.strip_prefix("src/").unwrap_or(path));
                planned(replace_extension(&target, module_extension(path)), TargetKind::Util)
            }
        }
        FileCategory::Other => Decision::Ignore,
    }
}

/// Assign screen names and targets, suffixing collisions
///
/// Targets already in `taken` are never handed out again; every screen
/// target ends up in `taken`.
fn name_screens(plan: &mut ConversionPlan, taken: &mut BTreeSet<String>) {
    let mut used: BTreeSet<String> = BTreeSet::new();
    for screen in &mut plan.screens {
        let base = screen
            .screen_name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| screen_name_for_file(&screen.source));
        let keep_target = screen.target.starts_with("src/screens/");
        let ext = jsx_extension(&screen.source);
        let target_for = |name: &str| format!("src/screens/{name}Screen.{ext}");

        let mut name = base.clone();
        let mut n = 2;
        while used.contains(&name) || (!keep_target && taken.contains(&target_for(&name))) {
            name = format!("{base}{n}");
            n += 1;
        }
        used.insert(name.clone());
        if !keep_target {
            screen.target = target_for(&name);
        }
        taken.insert(screen.target.clone());
        screen.screen_name = Some(name);
    }
}

/// Give every non-screen file a target no earlier file holds
fn claim_targets(plan: &mut ConversionPlan, taken: &mut BTreeSet<String>) {
    let files = plan
        .components
        .iter_mut()
        .chain(plan.hooks.iter_mut())
        .chain(plan.services.iter_mut());
    for file in files {
        if !taken.insert(file.target.clone()) {
            let target = dedupe_target(&file.target, taken);
            debug!("{} collides on {}, using {}", file.source, file.target, target);
            file.target = target;
            taken.insert(file.target.clone());
        }
    }
}

fn finish_navigation(plan: &mut ConversionPlan) {
    let names = plan.screen_names();
    let initial_ok = names.contains(&plan.navigation.initial_route.as_str());
    if !initial_ok {
        plan.navigation.initial_route = if names.contains(&"Home") {
            "Home".to_string()
        } else {
            names.first().map(|s| s.to_string()).unwrap_or_default()
        };
    }
}

/// Deterministic plan derived from the analysis alone
pub fn default_plan(analysis: &ProjectAnalysis) -> ConversionPlan {
    let mut plan = ConversionPlan::default();

    for file in &analysis.structure.files {
        if file.is_source && !analysis.is_readable(&file.path) {
            plan.skip(&file.path, "source is unreadable");
            continue;
        }
        match decide(file) {
            Decision::Plan(planned) => plan.push(planned),
            Decision::Skip(reason) => plan.skip(&file.path, reason),
            Decision::Ignore => {}
        }
    }

    let mut taken = BTreeSet::new();
    claim_targets(&mut plan, &mut taken);
    name_screens(&mut plan, &mut taken);
    finish_navigation(&mut plan);
    plan.dependencies = analysis.dependencies.replacements();
    plan
}

/// Pull the JSON object out of a provider reply
///
/// Prefers a fenced block; otherwise the outermost `{...}`.
pub fn extract_json(text: &str) -> Option<&str> {
    if let Some(start) = text.find("```") {
        let after = &text[start + 3..];
        let body_start = after.find('\n').map(|i| i + 1).unwrap_or(0);
        let body = &after[body_start..];
        if let Some(end) = body.find("```") {
            let candidate = body[..end].trim();
            if candidate.starts_with('{') {
                return Some(candidate);
            }
        }
    }
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Parse a provider planning reply and reconcile it with the analysis
pub fn parse_plan(text: &str, analysis: &ProjectAnalysis) -> Result<ConversionPlan> {
    let json = extract_json(text).ok_or_else(|| Error::Plan("no JSON object in reply".to_string()))?;
    let mut plan: ConversionPlan =
        serde_json::from_str(json).map_err(|e| Error::Plan(format!("invalid plan JSON: {e}")))?;
    plan.origin = PlanOrigin::Ai;
    Ok(reconcile(plan, analysis))
}

/// Normalize an AI target path; `None` when it escapes the project
fn clean_target(target: &str) -> Option<String> {
    let target = target.trim().trim_start_matches("./").trim_start_matches('/');
    if target.is_empty() || target.split('/').any(|s| s == "..") {
        return None;
    }
    Some(target.to_string())
}

/// Make a provider plan consistent with the project
///
/// Drops entries for unknown or duplicated sources and unsafe targets, and
/// adds default entries for source files the provider left out.
pub fn reconcile(plan: ConversionPlan, analysis: &ProjectAnalysis) -> ConversionPlan {
    let defaults = default_plan(analysis);
    let mut out = ConversionPlan {
        navigation: plan.navigation.clone(),
        origin: plan.origin,
        ..Default::default()
    };
    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut targets: BTreeSet<String> = BTreeSet::new();

    for skipped in &plan.skipped {
        if analysis.structure.contains(&skipped.source) && seen.insert(skipped.source.clone()) {
            out.skipped.push(skipped.clone());
        }
    }

    // Unreadable files are never sent to the provider
    for skipped in defaults.skipped.iter().filter(|s| s.reason == "source is unreadable") {
        if seen.insert(skipped.source.clone()) {
            out.skipped.push(skipped.clone());
        }
    }

    let proposed: Vec<PlannedFile> = plan.files().cloned().collect();
    for mut file in proposed {
        if !analysis.structure.contains(&file.source) {
            debug!("Plan references unknown file {}, dropping", file.source);
            continue;
        }
        if seen.contains(&file.source) {
            continue;
        }
        let Some(target) = clean_target(&file.target) else {
            warn!("Unsafe target '{}' for {}, using default", file.target, file.source);
            continue;
        };
        if !targets.insert(target.clone()) {
            warn!("Duplicate target {}, using default for {}", target, file.source);
            continue;
        }
        seen.insert(file.source.clone());
        file.target = target;
        if file.kind != TargetKind::Screen {
            file.screen_name = None;
        }
        out.push(file);
    }

    for file in defaults.files() {
        if seen.insert(file.source.clone()) {
            let mut file = file.clone();
            if file.kind == TargetKind::Screen {
                file.screen_name = None;
                file.target = String::new();
            } else if !targets.insert(file.target.clone()) {
                file.target = dedupe_target(&file.target, &targets);
                targets.insert(file.target.clone());
            }
            out.push(file);
        }
    }
    for skipped in &defaults.skipped {
        if seen.insert(skipped.source.clone()) {
            out.skipped.push(skipped.clone());
        }
    }

    name_screens(&mut out, &mut targets);
    finish_navigation(&mut out);

    let mut deps: BTreeSet<String> = plan.dependencies.into_iter().collect();
    deps.extend(defaults.dependencies);
    out.dependencies = deps.into_iter().collect();
    out
}

fn dedupe_target(target: &str, taken: &BTreeSet<String>) -> String {
    let (stem, ext) = target.rsplit_once('.').unwrap_or((target, ""));
    (2..)
        .map(|n| {
            if ext.is_empty() {
                format!("{stem}{n}")
            } else {
                format!("{stem}{n}.{ext}")
            }
        })
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| target.to_string())
}

/// Import specifier from one target file to another, e.g. `../components/Card`
pub fn relative_import(from_target: &str, to_target: &str) -> String {
    let from_dir: Vec<&str> = match from_target.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    let to_without_ext = to_target.rsplit_once('.').map(|(s, _)| s).unwrap_or(to_target);
    let to: Vec<&str> = to_without_ext.split('/').collect();

    let common = from_dir
        .iter()
        .zip(&to)
        .take_while(|(a, b)| a == b)
        .count();
    let ups = from_dir.len() - common;

    let mut parts: Vec<String> = Vec::new();
    if ups == 0 {
        parts.push(".".to_string());
    } else {
        parts.extend(std::iter::repeat_n("..".to_string(), ups));
    }
    parts.extend(to[common..].iter().map(|s| s.to_string()));
    parts.join("/")
}

/// Summary counts for reports
pub fn plan_summary(plan: &ConversionPlan) -> BTreeMap<String, usize> {
    BTreeMap::from([
        ("screens".to_string(), plan.screens.len()),
        ("components".to_string(), plan.components.len()),
        ("hooks".to_string(), plan.hooks.len()),
        ("services".to_string(), plan.services.len()),
        ("skipped".to_string(), plan.skipped.len()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::ProjectAnalyzer;
    use crate::config::AnalysisSettings;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn fixture() -> (TempDir, ProjectAnalysis) {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "package.json", r#"{"name":"demo","dependencies":{"next":"14.0.0","react-icons":"5.0.0"}}"#);
        write(root, "pages/index.tsx", "export default function Home() { return <div />; }\n");
        write(root, "pages/blog/[slug].tsx", "export default function Post() { return <div />; }\n");
        write(root, "pages/_app.tsx", "export default function App({ Component }) { return <Component />; }\n");
        write(root, "pages/api/hello.ts", "export default function handler(req, res) {}\n");
        write(root, "components/Header.tsx", "export default function Header() { return <header />; }\n");
        write(root, "hooks/useAuth.ts", "export function useAuth() {}\n");
        write(root, "lib/api.ts", "export const get = () => fetch('/x');\n");
        write(root, "lib/format.js", "export const fmt = (x) => x;\n");
        write(root, "styles/globals.css", "body {}\n");
        let analysis = ProjectAnalyzer::new(&AnalysisSettings::default())
            .analyze(root)
            .unwrap();
        (temp, analysis)
    }

    #[test]
    fn test_route_and_screen_names() {
        assert_eq!(route_for_file("pages/index.tsx"), "/");
        assert_eq!(route_for_file("pages/blog/[slug].tsx"), "/blog/[slug]");
        assert_eq!(route_for_file("src/pages/about/index.js"), "/about");
        assert_eq!(route_for_file("app/page.tsx"), "/");
        assert_eq!(route_for_file("app/(shop)/cart/page.tsx"), "/cart");

        assert_eq!(screen_name_for_route("/"), "Home");
        assert_eq!(screen_name_for_route("/about"), "About");
        assert_eq!(screen_name_for_route("/blog/[slug]"), "BlogSlug");
        assert_eq!(screen_name_for_route("/docs/[...path]"), "DocsPath");
        assert_eq!(screen_name_for_route("/user-profile?tab=1"), "UserProfile");
        assert_eq!(screen_name_for_route("/404"), "NotFound");
        assert_eq!(screen_name_for_file("app/not-found.tsx"), "NotFound");
        assert_eq!(route_params("/blog/[slug]/[...rest]"), vec!["slug", "rest"]);
    }

    #[test]
    fn test_default_plan() {
        let (_temp, analysis) = fixture();
        let plan = default_plan(&analysis);

        let home = plan.planned_for("pages/index.tsx").unwrap();
        assert_eq!(home.target, "src/screens/HomeScreen.tsx");
        assert_eq!(home.screen_name.as_deref(), Some("Home"));
        assert_eq!(
            plan.planned_for("pages/blog/[slug].tsx").unwrap().target,
            "src/screens/BlogSlugScreen.tsx"
        );
        assert_eq!(
            plan.planned_for("components/Header.tsx").unwrap().target,
            "src/components/Header.tsx"
        );
        assert_eq!(plan.planned_for("hooks/useAuth.ts").unwrap().target, "src/hooks/useAuth.ts");
        assert_eq!(plan.planned_for("lib/api.ts").unwrap().kind, TargetKind::Service);
        assert_eq!(plan.planned_for("lib/format.js").unwrap().target, "src/utils/format.js");

        assert!(plan.is_skipped("pages/_app.tsx"));
        assert!(plan.is_skipped("pages/api/hello.ts"));
        assert!(plan.is_skipped("styles/globals.css"));
        assert!(plan.is_skipped("package.json"));

        assert_eq!(plan.navigation.initial_route, "Home");
        assert_eq!(plan.dependencies, vec!["@expo/vector-icons"]);
        assert_eq!(plan.origin, PlanOrigin::Default);
    }

    #[test]
    fn test_screen_collisions() {
        let mut plan = ConversionPlan::default();
        for source in ["app/page.tsx", "pages/index.tsx"] {
            plan.push(PlannedFile {
                source: source.to_string(),
                target: String::new(),
                kind: TargetKind::Screen,
                screen_name: None,
                notes: None,
            });
        }
        name_screens(&mut plan, &mut BTreeSet::new());
        assert_eq!(plan.screen_names(), vec!["Home", "Home2"]);
        assert_eq!(plan.screens[1].target, "src/screens/Home2Screen.tsx");
    }

    #[test]
    fn test_extract_json() {
        assert_eq!(extract_json("Here:\n```json\n{\"a\": 1}\n```\nDone"), Some("{\"a\": 1}"));
        assert_eq!(extract_json("prefix {\"a\": {\"b\": 2}} suffix"), Some("{\"a\": {\"b\": 2}}"));
        assert_eq!(extract_json("no json here"), None);
    }

    #[test]
    fn test_parse_plan_reconciles() {
        let (_temp, analysis) = fixture();
        let reply = r#"```json
{
  "screens": [
    {"source": "pages/index.tsx", "target": "src/screens/LandingScreen.tsx", "kind": "screen", "screen_name": "Landing"},
    {"source": "pages/ghost.tsx", "target": "src/screens/GhostScreen.tsx", "kind": "screen"}
  ],
  "components": [
    {"source": "components/Header.tsx", "target": "../outside.tsx", "kind": "component"}
  ],
  "navigation": {"type": "tabs", "initial_route": "Nowhere"},
  "dependencies": ["react-native-svg"]
}
```"#;
        let plan = parse_plan(reply, &analysis).unwrap();

        assert_eq!(plan.origin, PlanOrigin::Ai);
        assert_eq!(plan.navigation.kind, NavigationKind::Tabs);
        assert_eq!(plan.navigation.initial_route, "Landing");
        assert!(plan.planned_for("pages/ghost.tsx").is_none());
        // Unsafe target replaced by the default entry
        assert_eq!(
            plan.planned_for("components/Header.tsx").unwrap().target,
            "src/components/Header.tsx"
        );
        // Unplanned files filled in
        assert!(plan.planned_for("hooks/useAuth.ts").is_some());
        assert_eq!(
            plan.planned_for("pages/blog/[slug].tsx").unwrap().screen_name.as_deref(),
            Some("BlogSlug")
        );
        assert!(plan.is_skipped("pages/api/hello.ts"));
        assert!(plan.dependencies.contains(&"react-native-svg".to_string()));
        assert!(plan.dependencies.contains(&"@expo/vector-icons".to_string()));
    }

    #[test]
    fn test_parse_plan_keeps_screen_targets_unique() {
        let (_temp, analysis) = fixture();
        let reply = r#"{"screens":[{"source":"pages/blog/[slug].tsx","target":"src/screens/HomeScreen.tsx","kind":"screen","screen_name":"Post"}]}"#;
        let plan = parse_plan(reply, &analysis).unwrap();

        let post = plan.planned_for("pages/blog/[slug].tsx").unwrap();
        assert_eq!(post.target, "src/screens/HomeScreen.tsx");
        let home = plan.planned_for("pages/index.tsx").unwrap();
        assert_eq!(home.target, "src/screens/Home2Screen.tsx");
        assert_eq!(home.screen_name.as_deref(), Some("Home2"));

        let targets: BTreeSet<&str> = plan.files().map(|f| f.target.as_str()).collect();
        assert_eq!(targets.len(), plan.file_count());
    }

    #[test]
    fn test_default_plan_dedupes_targets() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "pages/index.js", "export default function Home() { return <div />; }\n");
        write(root, "lib/format.js", "export const a = 1;\n");
        write(root, "utils/format.js", "export const b = 2;\n");
        write(root, "lib/api.ts", "export const get = 1;\n");
        write(root, "services/api.ts", "export const post = 2;\n");
        let analysis = ProjectAnalyzer::new(&AnalysisSettings::default())
            .analyze(root)
            .unwrap();
        let plan = default_plan(&analysis);

        assert_eq!(plan.file_count(), 5);
        let targets: BTreeSet<&str> = plan.files().map(|f| f.target.as_str()).collect();
        assert_eq!(targets.len(), 5);
        assert_eq!(plan.planned_for("lib/format.js").unwrap().target, "src/utils/format.js");
        assert_eq!(plan.planned_for("utils/format.js").unwrap().target, "src/utils/format2.js");
        assert_eq!(plan.planned_for("lib/api.ts").unwrap().target, "src/services/api.ts");
        assert_eq!(plan.planned_for("services/api.ts").unwrap().target, "src/services/api2.ts");
    }

    #[test]
    fn test_parse_plan_rejects_garbage() {
        let (_temp, analysis) = fixture();
        assert!(matches!(parse_plan("sorry, I can't", &analysis), Err(Error::Plan(_))));
        assert!(matches!(parse_plan("{ not json }", &analysis), Err(Error::Plan(_))));
    }

    #[test]
    fn test_relative_import() {
        assert_eq!(
            relative_import("src/screens/HomeScreen.tsx", "src/components/Header.tsx"),
            "../components/Header"
        );
        assert_eq!(
            relative_import("src/components/ui/Card.tsx", "src/components/Header.tsx"),
            "../Header"
        );
        assert_eq!(relative_import("src/hooks/useA.ts", "src/hooks/useB.ts"), "./useB");
        assert_eq!(relative_import("App.tsx", "src/navigation/AppNavigator.tsx"), "./src/navigation/AppNavigator");
    }
}
