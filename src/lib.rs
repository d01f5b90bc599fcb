// src/lib.rs

//! next2expo
//!
//! Converts Next.js projects into React Native/Expo projects with the help
//! of an LLM completion provider.
//!
//! # Architecture
//!
//! - Analysis: directory walk, path classification, regex parsing of
//!   sources, `package.json` and config inspection, import graph
//! - Providers: Mistral and Gemini behind one trait, paced by a rate
//!   limiter and retried with bounded exponential backoff
//! - Conversion: plan, scaffold, per-file rewrite in dependency order
//! - Fixing: regex rules that replace web-only constructs left in the output

pub mod analyzer;
pub mod config;
pub mod convert;
mod error;
pub mod fixer;
pub mod progress;
pub mod prompt;
pub mod provider;

pub use analyzer::{FileCategory, ProjectAnalysis, ProjectAnalyzer, is_source_file};
pub use config::{AiConfig, FeatureFlags};
pub use convert::{ConversionPlan, ConversionReport, ConvertOptions, ProjectConverter};
pub use error::{Error, Result};
pub use fixer::{Issue, IssueKind, RuntimeErrorFixer};
pub use progress::{LogProgress, ProgressTracker, SilentProgress};
pub use provider::{AiClient, AiProvider, ProviderKind, ProviderManager};
