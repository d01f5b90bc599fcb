// src/provider/mod.rs

//! LLM provider integrations
//!
//! Two HTTP completion APIs are supported, Mistral and Gemini. Both sit
//! behind the [`AiProvider`] trait so the converter never sees vendor
//! request shapes. [`AiClient`] adds request pacing and retry on top of a
//! provider; [`ProviderManager`] owns the persisted selection and keys.

mod client;
mod gemini;
mod http;
pub mod manager;
mod mistral;
pub mod mock;
mod rate_limit;

pub use client::AiClient;
pub use gemini::GeminiProvider;
pub use http::HttpTransport;
pub use manager::ProviderManager;
pub use mistral::MistralProvider;
pub use rate_limit::{RateLimiter, RetryPolicy};

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum_macros::{Display, EnumIter, EnumString};

/// Supported completion providers
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ProviderKind {
    #[default]
    Mistral,
    Gemini,
}

impl ProviderKind {
    /// Parse a provider name, case-insensitively
    pub fn parse(name: &str) -> Result<Self> {
        Self::from_str(name.trim()).map_err(|_| Error::UnknownProvider(name.to_string()))
    }

    /// Env variable holding this provider's API key
    pub fn env_key(&self) -> &'static str {
        match self {
            Self::Mistral => "MISTRAL_API_KEY",
            Self::Gemini => "GEMINI_API_KEY",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Mistral => "Mistral AI",
            Self::Gemini => "Google Gemini",
        }
    }
}

/// One completion request, vendor-neutral
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// System instruction, if any
    pub system: Option<String>,
    /// User prompt
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
            temperature: 0.1,
            max_tokens: 8000,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_limits(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }
}

/// A text-completion backend
pub trait AiProvider {
    /// Which provider this is
    fn kind(&self) -> ProviderKind;

    /// Send one request and return the completion text
    ///
    /// Implementations make exactly one attempt; pacing and retry belong
    /// to [`AiClient`].
    fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

impl<P: AiProvider + ?Sized> AiProvider for &P {
    fn kind(&self) -> ProviderKind {
        (**self).kind()
    }

    fn complete(&self, request: &CompletionRequest) -> Result<String> {
        (**self).complete(request)
    }
}

/// Truncate a response body for inclusion in error messages
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 500;
    if body.chars().count() <= MAX {
        body.to_string()
    } else {
        let head: String = body.chars().take(MAX).collect();
        format!("{head}...")
    }
}
