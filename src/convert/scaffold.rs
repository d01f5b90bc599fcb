// src/convert/scaffold.rs

//! Expo project skeleton
//!
//! Generates the files every converted project needs: `package.json`,
//! `app.json`, Babel and TypeScript config, the `App` entry point and the
//! navigator built from the plan's screens.

use super::plan::{ConversionPlan, NavigationKind, relative_import, route_for_file, route_params};
use crate::analyzer::{ProjectAnalysis, StylingSystem};
use crate::error::Result;
use serde_json::{Map, Value, json};
use std::collections::BTreeSet;
use std::fmt::Write;
use std::fs;
use std::path::Path;
use tracing::debug;

const EXPO_VERSION: &str = "~51.0.0";
const REACT_VERSION: &str = "18.2.0";
const REACT_NATIVE_VERSION: &str = "0.74.5";

/// Base runtime dependencies of every generated app
const BASE_DEPENDENCIES: &[(&str, &str)] = &[
    ("expo", EXPO_VERSION),
    ("expo-status-bar", "~1.12.1"),
    ("react", REACT_VERSION),
    ("react-native", REACT_NATIVE_VERSION),
    ("@react-navigation/native", "^6.1.17"),
    ("react-native-screens", "3.31.1"),
    ("react-native-safe-area-context", "4.10.5"),
    ("@react-native-async-storage/async-storage", "1.23.1"),
];

/// Pinned versions for replacement packages the mapper knows about
const KNOWN_VERSIONS: &[(&str, &str)] = &[
    ("expo-image", "~1.12.15"),
    ("expo-font", "~12.0.10"),
    ("nativewind", "^2.0.11"),
    ("@expo/vector-icons", "^14.0.2"),
    ("react-native-reanimated", "~3.10.1"),
    ("expo-auth-session", "~5.5.2"),
    ("react-native-svg", "15.2.0"),
];

/// Generated navigator, without extension
const NAVIGATOR_PATH: &str = "src/navigation/AppNavigator";

/// A generated file, relative to the destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaffoldFile {
    pub path: String,
    pub content: String,
}

impl ScaffoldFile {
    fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Options that shape the skeleton
#[derive(Debug, Clone, Copy)]
pub struct ScaffoldOptions {
    pub typescript: bool,
    pub nativewind: bool,
    pub generate_navigation: bool,
}

impl ScaffoldOptions {
    pub fn for_analysis(analysis: &ProjectAnalysis, generate_navigation: bool) -> Self {
        Self {
            typescript: analysis.typescript,
            nativewind: analysis.features.styling.contains(&StylingSystem::Tailwind),
            generate_navigation,
        }
    }

    fn ext(&self) -> &'static str {
        if self.typescript { "tsx" } else { "js" }
    }
}

/// npm package name derived from the project name
pub fn slug(name: &str) -> String {
    let mut slug = String::new();
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-').to_string();
    if slug.is_empty() { "app".to_string() } else { slug }
}

fn version_for(package: &str) -> &'static str {
    KNOWN_VERSIONS
        .iter()
        .find(|(name, _)| *name == package)
        .map(|(_, v)| *v)
        .unwrap_or("latest")
}

fn package_json(analysis: &ProjectAnalysis, plan: &ConversionPlan, options: ScaffoldOptions) -> Value {
    let mut deps = Map::new();
    for (name, version) in BASE_DEPENDENCIES {
        deps.insert(name.to_string(), json!(version));
    }
    let navigator = match plan.navigation.kind {
        NavigationKind::Stack => ("@react-navigation/native-stack", "^6.9.26"),
        NavigationKind::Tabs => ("@react-navigation/bottom-tabs", "^6.5.20"),
    };
    deps.insert(navigator.0.to_string(), json!(navigator.1));

    // Compatible packages carry over with their original range
    for (name, version) in analysis.dependencies.compatible() {
        deps.entry(name.to_string()).or_insert_with(|| json!(version));
    }
    for name in &plan.dependencies {
        deps.entry(name.clone()).or_insert_with(|| json!(version_for(name)));
    }

    let mut dev = Map::new();
    dev.insert("@babel/core".to_string(), json!("^7.24.0"));
    if options.typescript {
        dev.insert("typescript".to_string(), json!("~5.3.3"));
        dev.insert("@types/react".to_string(), json!("~18.2.79"));
    }
    if options.nativewind {
        dev.insert("tailwindcss".to_string(), json!("3.3.2"));
    }

    json!({
        "name": slug(&analysis.project_name),
        "version": "1.0.0",
        "main": "node_modules/expo/AppEntry.js",
        "private": true,
        "scripts": {
            "start": "expo start",
            "android": "expo start --android",
            "ios": "expo start --ios",
            "web": "expo start --web"
        },
        "dependencies": deps,
        "devDependencies": dev
    })
}

fn app_json(analysis: &ProjectAnalysis) -> Value {
    let slug = slug(&analysis.project_name);
    json!({
        "expo": {
            "name": analysis.project_name,
            "slug": slug,
            "version": "1.0.0",
            "orientation": "portrait",
            "userInterfaceStyle": "automatic",
            "assetBundlePatterns": ["**/*"],
            "ios": { "supportsTablet": true },
            "android": { "package": format!("com.{}", slug.replace('-', "")) }
        }
    })
}

fn tsconfig_json() -> Value {
    json!({
        "extends": "expo/tsconfig.base",
        "compilerOptions": { "strict": true }
    })
}

fn babel_config(plan: &ConversionPlan, options: ScaffoldOptions) -> String {
    let mut plugins: Vec<&str> = Vec::new();
    if options.nativewind {
        plugins.push("'nativewind/babel'");
    }
    // Reanimated's plugin has to be listed last
    if plan.dependencies.iter().any(|d| d == "react-native-reanimated") {
        plugins.push("'react-native-reanimated/plugin'");
    }
    let plugins = if plugins.is_empty() {
        String::new()
    } else {
        format!("\n    plugins: [{}],", plugins.join(", "))
    };
    format!(
        "module.exports = function (api) {{\n  api.cache(true);\n  return {{\n    presets: ['babel-preset-expo'],{plugins}\n  }};\n}};\n"
    )
}

fn tailwind_config() -> &'static str {
    "/** @type {import('tailwindcss').Config} */\nmodule.exports = {\n  content: ['./App.{js,jsx,ts,tsx}', './src/**/*.{js,jsx,ts,tsx}'],\n  theme: {\n    extend: {},\n  },\n  plugins: [],\n};\n"
}

fn gitignore() -> &'static str {
    "node_modules/\n.expo/\ndist/\nweb-build/\n*.jks\n*.p8\n*.p12\n*.key\n*.mobileprovision\n.env\n.env.local\n"
}

fn app_entry(options: ScaffoldOptions) -> String {
    format!(
        "import React from 'react';\nimport {{ StatusBar }} from 'expo-status-bar';\nimport {{ NavigationContainer }} from '@react-navigation/native';\nimport AppNavigator from './{NAVIGATOR_PATH}';\n\nexport default function App(){} {{\n  return (\n    <NavigationContainer>\n      <AppNavigator />\n      <StatusBar style=\"auto\" />\n    </NavigationContainer>\n  );\n}}\n",
        if options.typescript { ": React.JSX.Element" } else { "" }
    )
}

/// Navigator component registering every planned screen
pub fn navigator(plan: &ConversionPlan, options: ScaffoldOptions) -> String {
    let from = format!("{NAVIGATOR_PATH}.{}", options.ext());
    let (module, factory, list_type) = match plan.navigation.kind {
        NavigationKind::Stack => (
            "@react-navigation/native-stack",
            "createNativeStackNavigator",
            "RootStackParamList",
        ),
        NavigationKind::Tabs => (
            "@react-navigation/bottom-tabs",
            "createBottomTabNavigator",
            "RootTabParamList",
        ),
    };

    let mut out = String::new();
    let _ = writeln!(out, "import React from 'react';");
    let _ = writeln!(out, "import {{ {factory} }} from '{module}';");
    for screen in &plan.screens {
        let Some(name) = &screen.screen_name else {
            continue;
        };
        let _ = writeln!(
            out,
            "import {name}Screen from '{}';",
            relative_import(&from, &screen.target)
        );
    }
    out.push('\n');

    let generic = if options.typescript {
        let _ = writeln!(out, "export type {list_type} = {{");
        for screen in &plan.screens {
            let Some(name) = &screen.screen_name else {
                continue;
            };
            let params = route_params(&route_for_file(&screen.source));
            if params.is_empty() {
                let _ = writeln!(out, "  {name}: undefined;");
            } else {
                let fields: Vec<String> = params.iter().map(|p| format!("{p}: string")).collect();
                let _ = writeln!(out, "  {name}: {{ {} }};", fields.join("; "));
            }
        }
        let _ = writeln!(out, "}};\n");
        format!("<{list_type}>")
    } else {
        String::new()
    };

    let _ = writeln!(out, "const Navigator = {factory}{generic}();\n");
    let _ = writeln!(out, "export default function AppNavigator() {{");
    let _ = writeln!(out, "  return (");
    if plan.navigation.initial_route.is_empty() {
        let _ = writeln!(out, "    <Navigator.Navigator>");
    } else {
        let _ = writeln!(
            out,
            "    <Navigator.Navigator initialRouteName=\"{}\">",
            plan.navigation.initial_route
        );
    }
    for screen in &plan.screens {
        let Some(name) = &screen.screen_name else {
            continue;
        };
        let _ = writeln!(
            out,
            "      <Navigator.Screen name=\"{name}\" component={{{name}Screen}} />"
        );
    }
    let _ = writeln!(out, "    </Navigator.Navigator>");
    let _ = writeln!(out, "  );");
    let _ = writeln!(out, "}}");
    out
}

fn env_example(analysis: &ProjectAnalysis) -> Option<String> {
    let names: BTreeSet<String> = analysis
        .config
        .env_variables
        .iter()
        .map(|v| v.expo_name.clone().unwrap_or_else(|| v.name.clone()))
        .collect();
    if names.is_empty() {
        return None;
    }
    let mut out = String::from("# Variables read by the app must start with EXPO_PUBLIC_\n");
    for name in names {
        let _ = writeln!(out, "{name}=");
    }
    Some(out)
}

fn pretty(value: &Value) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)? + "\n")
}

/// Every skeleton file for the plan
pub fn scaffold_files(
    analysis: &ProjectAnalysis,
    plan: &ConversionPlan,
    options: ScaffoldOptions,
) -> Result<Vec<ScaffoldFile>> {
    let mut files = vec![
        ScaffoldFile::new("package.json", pretty(&package_json(analysis, plan, options))?),
        ScaffoldFile::new("app.json", pretty(&app_json(analysis))?),
        ScaffoldFile::new("babel.config.js", babel_config(plan, options)),
        ScaffoldFile::new(".gitignore", gitignore()),
    ];
    if options.typescript {
        files.push(ScaffoldFile::new("tsconfig.json", pretty(&tsconfig_json())?));
    }
    if options.nativewind {
        files.push(ScaffoldFile::new("tailwind.config.js", tailwind_config()));
    }
    if options.generate_navigation {
        files.push(ScaffoldFile::new(format!("App.{}", options.ext()), app_entry(options)));
        files.push(ScaffoldFile::new(
            format!("{NAVIGATOR_PATH}.{}", options.ext()),
            navigator(plan, options),
        ));
    }
    if let Some(env) = env_example(analysis) {
        files.push(ScaffoldFile::new(".env.example", env));
    }
    Ok(files)
}

/// Write the skeleton under `dest`, returning the written paths
pub fn write_scaffold(
    dest: &Path,
    analysis: &ProjectAnalysis,
    plan: &ConversionPlan,
    options: ScaffoldOptions,
) -> Result<Vec<String>> {
    let files = scaffold_files(analysis, plan, options)?;
    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let path = dest.join(&file.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, &file.content)?;
        debug!("Wrote {}", file.path);
        written.push(file.path);
    }
    Ok(written)
}
