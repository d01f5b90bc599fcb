// tests/conversion.rs

//! Integration tests for the conversion pipeline, driven by a scripted provider.

mod common;

use common::{analyze, create_pages_project, write_file};
use next2expo::convert::{
    ConversionReport, ConvertOptions, FileStatus, NavigationKind, PlanOrigin, ProjectConverter,
    REPORT_FILE_NAME, TargetKind,
};
use next2expo::provider::mock::MockProvider;
use next2expo::{AiClient, Error, FeatureFlags, LogProgress, ProgressTracker, SilentProgress};
use std::fs;

const CONVERTED: &str = "```tsx
import React from 'react';
import { View, Text } from 'react-native';

export default function Converted() {
  return (
    <View>
      <Text>Converted</Text>
    </View>
  );
}
```";

fn no_ai_plan() -> ConvertOptions {
    ConvertOptions {
        ai_planning: Some(false),
        ..Default::default()
    }
}

#[test]
fn test_offline_conversion_writes_project() {
    let project = create_pages_project();
    let dest = tempfile::tempdir().unwrap();
    let analysis = analyze(project.path());

    let progress = SilentProgress::new();
    let mut converter = ProjectConverter::new(None, FeatureFlags::default(), &progress);
    let report = converter.convert(&analysis, dest.path()).unwrap();

    for path in [
        "package.json",
        "app.json",
        "babel.config.js",
        "tsconfig.json",
        "App.tsx",
        "src/navigation/AppNavigator.tsx",
        "src/screens/HomeScreen.tsx",
        "src/screens/AboutScreen.tsx",
        "src/components/Header.tsx",
        "src/hooks/useCart.ts",
        "assets/logo.svg",
        REPORT_FILE_NAME,
    ] {
        assert!(dest.path().join(path).is_file(), "{path} should exist");
    }

    assert_eq!(report.count(FileStatus::Converted), 4);
    assert_eq!(report.assets_copied, 1);
    assert_eq!(report.provider, None);
    assert_eq!(report.provider_requests, 0);

    let home = fs::read_to_string(dest.path().join("src/screens/HomeScreen.tsx")).unwrap();
    assert!(!home.contains("Home.module.css"));
    assert!(home.contains("'../components/Header'"));
    assert!(home.contains("'../hooks/useCart'"));

    let navigator = fs::read_to_string(dest.path().join("src/navigation/AppNavigator.tsx")).unwrap();
    assert!(navigator.contains("HomeScreen"));
    assert!(navigator.contains("AboutScreen"));

    let package: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dest.path().join("package.json")).unwrap()).unwrap();
    assert!(package["dependencies"]["expo"].is_string());
    assert!(package["dependencies"]["axios"].is_string());
    assert!(package["dependencies"]["@expo/vector-icons"].is_string());
    assert!(package["dependencies"].get("next").is_none());
}

#[test]
fn test_log_progress_follows_conversion() {
    let project = create_pages_project();
    let dest = tempfile::tempdir().unwrap();
    let analysis = analyze(project.path());

    let progress = LogProgress::new("Converting", 0);
    let mut converter = ProjectConverter::new(None, FeatureFlags::default(), &progress);
    converter.convert(&analysis, dest.path()).unwrap();

    assert_eq!(progress.length(), 4);
    assert_eq!(progress.position(), 4);
    assert!(progress.is_finished());
}

#[test]
fn test_skipped_files_recorded() {
    let project = create_pages_project();
    let dest = tempfile::tempdir().unwrap();
    let analysis = analyze(project.path());

    let progress = SilentProgress::new();
    let mut converter = ProjectConverter::new(None, FeatureFlags::default(), &progress);
    let report = converter.convert(&analysis, dest.path()).unwrap();

    for source in ["pages/_app.tsx", "pages/api/hello.ts", "styles/globals.css", "next.config.js"] {
        let record = report.record(source).unwrap();
        assert_eq!(record.status, FileStatus::Skipped, "{source}");
        assert!(record.reason.is_some());
    }
    assert!(!dest.path().join("src/screens/AppScreen.tsx").exists());
}

#[test]
fn test_provider_output_written() {
    let project = create_pages_project();
    let dest = tempfile::tempdir().unwrap();
    let analysis = analyze(project.path());

    let client = AiClient::unthrottled(Box::new(MockProvider::fixed(CONVERTED)));
    let progress = SilentProgress::new();
    let mut converter =
        ProjectConverter::new(Some(client), FeatureFlags::default(), &progress).with_options(no_ai_plan());
    let report = converter.convert(&analysis, dest.path()).unwrap();

    assert_eq!(report.count(FileStatus::Converted), 4);
    assert_eq!(report.provider.as_deref(), Some("mistral"));
    assert_eq!(report.provider_requests, 4);

    let screen = fs::read_to_string(dest.path().join("src/screens/AboutScreen.tsx")).unwrap();
    assert!(screen.starts_with("import React from 'react';"));
    assert!(screen.contains("from 'react-native'"));
    assert!(!screen.contains("```"));
}

#[test]
fn test_ai_plan_used_when_valid() {
    let project = create_pages_project();
    let analysis = analyze(project.path());

    let reply = r#"Here is the plan:
```json
{
  "screens": [
    { "source": "pages/index.tsx", "target": "src/screens/StorefrontScreen.tsx", "kind": "screen", "screen_name": "Storefront" }
  ],
  "navigation": { "type": "tabs", "initial_route": "Storefront" },
  "dependencies": ["react-native-svg"]
}
```"#;
    let client = AiClient::unthrottled(Box::new(MockProvider::fixed(reply)));
    let progress = SilentProgress::new();
    let mut converter = ProjectConverter::new(Some(client), FeatureFlags::default(), &progress);
    let plan = converter.plan(&analysis);

    assert_eq!(plan.origin, PlanOrigin::Ai);
    assert_eq!(plan.navigation.kind, NavigationKind::Tabs);
    assert_eq!(plan.navigation.initial_route, "Storefront");

    let home = plan.planned_for("pages/index.tsx").unwrap();
    assert_eq!(home.target, "src/screens/StorefrontScreen.tsx");

    // Files the reply left out come from the default plan
    let about = plan.planned_for("pages/about.tsx").unwrap();
    assert_eq!(about.kind, TargetKind::Screen);
    assert_eq!(about.target, "src/screens/AboutScreen.tsx");
    assert!(plan.planned_for("components/Header.tsx").is_some());
    assert!(plan.is_skipped("pages/api/hello.ts"));

    assert!(plan.dependencies.contains(&"react-native-svg".to_string()));
    assert!(plan.dependencies.contains(&"@expo/vector-icons".to_string()));
}

#[test]
fn test_plan_falls_back_on_bad_reply() {
    let project = create_pages_project();
    let dest = tempfile::tempdir().unwrap();
    let analysis = analyze(project.path());

    let provider = MockProvider::new(|_, index| {
        if index == 0 {
            Ok("I cannot produce a plan for this project.".to_string())
        } else {
            Ok(CONVERTED.to_string())
        }
    });
    let client = AiClient::unthrottled(Box::new(provider));
    let progress = SilentProgress::new();
    let mut converter = ProjectConverter::new(Some(client), FeatureFlags::default(), &progress);

    let plan = converter.plan(&analysis);
    assert_eq!(plan.origin, PlanOrigin::Default);
    assert_eq!(plan.screen_names(), vec!["About", "Home"]);

    let report = converter.execute(&analysis, &plan, dest.path()).unwrap();
    assert_eq!(report.plan_origin, PlanOrigin::Default);
    assert!(report.warnings.iter().any(|w| w.contains("AI planning failed")));
    assert_eq!(report.count(FileStatus::Converted), 4);
}

#[test]
fn test_provider_errors_skip_files() {
    let project = create_pages_project();
    let dest = tempfile::tempdir().unwrap();
    let analysis = analyze(project.path());

    let provider = MockProvider::new(|_, _| {
        Err(Error::Http {
            provider: "mistral".to_string(),
            message: "connection reset".to_string(),
        })
    });
    let client = AiClient::unthrottled(Box::new(provider));
    let progress = SilentProgress::new();
    let mut converter =
        ProjectConverter::new(Some(client), FeatureFlags::default(), &progress).with_options(no_ai_plan());
    let report = converter.convert(&analysis, dest.path()).unwrap();

    assert_eq!(report.count(FileStatus::Converted), 0);
    assert_eq!(report.count(FileStatus::Failed), 0);

    let record = report.record("pages/index.tsx").unwrap();
    assert_eq!(record.status, FileStatus::Skipped);
    assert_eq!(record.target.as_deref(), Some("src/screens/HomeScreen.tsx"));
    assert!(record.reason.as_deref().unwrap().contains("connection reset"));

    // Four planned files, each tried once and retried three times
    assert_eq!(report.provider_requests, 16);

    // The scaffold is still written
    assert!(dest.path().join("package.json").is_file());
    assert!(!dest.path().join("src/screens/HomeScreen.tsx").exists());
}

#[test]
fn test_destination_must_be_empty() {
    let project = create_pages_project();
    let dest = tempfile::tempdir().unwrap();
    write_file(dest.path(), "README.md", "existing\n");
    let analysis = analyze(project.path());

    let progress = SilentProgress::new();
    let mut converter = ProjectConverter::new(None, FeatureFlags::default(), &progress);
    let result = converter.convert(&analysis, dest.path());
    assert!(matches!(result, Err(Error::DestinationNotEmpty(_))));
    assert!(!dest.path().join("package.json").exists());

    let mut converter = ProjectConverter::new(None, FeatureFlags::default(), &progress).with_options(
        ConvertOptions {
            force: true,
            ..Default::default()
        },
    );
    converter.convert(&analysis, dest.path()).unwrap();
    assert!(dest.path().join("package.json").is_file());
    assert!(dest.path().join("README.md").is_file());
}

#[test]
fn test_dry_run_writes_nothing() {
    let project = create_pages_project();
    let dest = tempfile::tempdir().unwrap();
    let target = dest.path().join("app");
    let analysis = analyze(project.path());

    let progress = SilentProgress::new();
    let mut converter = ProjectConverter::new(None, FeatureFlags::default(), &progress).with_options(
        ConvertOptions {
            dry_run: true,
            ..Default::default()
        },
    );
    let report = converter.convert(&analysis, &target).unwrap();

    assert!(report.dry_run);
    assert!(!target.exists());
    assert_eq!(report.count(FileStatus::Converted), 0);
}

#[test]
fn test_navigation_disabled() {
    let project = create_pages_project();
    let dest = tempfile::tempdir().unwrap();
    let analysis = analyze(project.path());

    let features = FeatureFlags {
        generate_navigation: false,
        ..Default::default()
    };
    let progress = SilentProgress::new();
    let mut converter = ProjectConverter::new(None, features, &progress);
    converter.convert(&analysis, dest.path()).unwrap();

    assert!(!dest.path().join("App.tsx").exists());
    assert!(!dest.path().join("src/navigation/AppNavigator.tsx").exists());
    assert!(dest.path().join("src/screens/HomeScreen.tsx").is_file());
}

#[test]
fn test_report_round_trips_from_disk() {
    let project = create_pages_project();
    let dest = tempfile::tempdir().unwrap();
    let analysis = analyze(project.path());

    let progress = SilentProgress::new();
    let mut converter = ProjectConverter::new(None, FeatureFlags::default(), &progress);
    let report = converter.convert(&analysis, dest.path()).unwrap();

    let loaded = ConversionReport::load(&dest.path().join(REPORT_FILE_NAME)).unwrap();
    assert_eq!(loaded.files.len(), report.files.len());
    assert_eq!(loaded.count(FileStatus::Converted), 4);
    assert!(loaded.finished_at.is_some());
}
