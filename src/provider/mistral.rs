// src/provider/mistral.rs

//! Mistral chat completions API

use super::http::HttpTransport;
use super::{AiProvider, CompletionRequest, ProviderKind};
use crate::config::ProviderSettings;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default chat completions endpoint
pub const MISTRAL_API_URL: &str = "https://api.mistral.ai/v1/chat/completions";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Mistral provider
pub struct MistralProvider {
    transport: HttpTransport,
    api_key: String,
    model: String,
    endpoint: String,
}

impl MistralProvider {
    pub fn new(transport: HttpTransport, api_key: String, settings: &ProviderSettings) -> Self {
        Self {
            transport,
            api_key,
            model: settings.model.clone(),
            endpoint: settings
                .endpoint
                .clone()
                .unwrap_or_else(|| MISTRAL_API_URL.to_string()),
        }
    }
}

fn build_request<'a>(model: &'a str, request: &'a CompletionRequest) -> ChatRequest<'a> {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = &request.system {
        messages.push(ChatMessage {
            role: "system",
            content: system,
        });
    }
    messages.push(ChatMessage {
        role: "user",
        content: &request.prompt,
    });

    ChatRequest {
        model,
        messages,
        temperature: request.temperature,
        max_tokens: request.max_tokens,
    }
}

fn extract_text(response: ChatResponse) -> Result<String> {
    let text = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(Error::EmptyResponse(ProviderKind::Mistral.to_string()));
    }
    Ok(text)
}

impl AiProvider for MistralProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Mistral
    }

    fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = build_request(&self.model, request);
        let auth = format!("Bearer {}", self.api_key);
        let response: ChatResponse = self.transport.post_json(
            "mistral",
            &self.endpoint,
            &[("Authorization", auth.as_str())],
            &body,
        )?;
        extract_text(response)
    }
}
