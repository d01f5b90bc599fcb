// src/provider/gemini.rs

//! Google Gemini generateContent API

use super::http::HttpTransport;
use super::{AiProvider, CompletionRequest, ProviderKind};
use crate::config::ProviderSettings;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Base URL; the model and method are appended
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

/// Gemini provider
pub struct GeminiProvider {
    transport: HttpTransport,
    api_key: String,
    endpoint: String,
}

impl GeminiProvider {
    pub fn new(transport: HttpTransport, api_key: String, settings: &ProviderSettings) -> Self {
        let endpoint = settings.endpoint.clone().unwrap_or_else(|| {
            format!("{}/{}:generateContent", GEMINI_API_BASE, settings.model)
        });
        Self {
            transport,
            api_key,
            endpoint,
        }
    }
}

fn build_request(request: &CompletionRequest) -> GenerateRequest<'_> {
    GenerateRequest {
        system_instruction: request.system.as_deref().map(|text| Content {
            role: None,
            parts: vec![Part { text }],
        }),
        contents: vec![Content {
            role: Some("user"),
            parts: vec![Part {
                text: &request.prompt,
            }],
        }],
        generation_config: GenerationConfig {
            temperature: request.temperature,
            max_output_tokens: request.max_tokens,
        },
    }
}

fn extract_text(response: GenerateResponse) -> Result<String> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(Error::EmptyResponse(ProviderKind::Gemini.to_string()));
    }
    Ok(text)
}

impl AiProvider for GeminiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = build_request(request);
        let response: GenerateResponse = self.transport.post_json(
            "gemini",
            &self.endpoint,
            &[("x-goog-api-key", self.api_key.as_str())],
            &body,
        )?;
        extract_text(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_shape() {
        let request = CompletionRequest::new("convert this")
            .with_system("be brief")
            .with_limits(0.3, 2048);
        let body = serde_json::to_value(build_request(&request)).unwrap();

        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "be brief");
        assert!(body["systemInstruction"].get("role").is_none());
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "convert this");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 2048);
    }

    #[test]
    fn test_request_without_system() {
        let body = serde_json::to_value(build_request(&CompletionRequest::new("x"))).unwrap();
        assert!(body.get("systemInstruction").is_none());
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let response: GenerateResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "part one " }, { "text": "part two" }] },
                "finishReason": "STOP"
            }]
        }))
        .unwrap();
        assert_eq!(extract_text(response).unwrap(), "part one part two");
    }

    #[test]
    fn test_extract_text_blocked_candidate() {
        let response: GenerateResponse =
            serde_json::from_value(json!({ "candidates": [{ "finishReason": "SAFETY" }] })).unwrap();
        assert!(matches!(extract_text(response), Err(Error::EmptyResponse(_))));
    }

    #[test]
    fn test_default_endpoint_uses_model() {
        let settings = ProviderSettings {
            model: "gemini-1.5-pro".to_string(),
            temperature: 0.1,
            max_tokens: 100,
            endpoint: None,
        };
        let transport = HttpTransport::new(std::time::Duration::from_secs(1)).unwrap();
        let provider = GeminiProvider::new(transport, "k".to_string(), &settings);
        assert!(provider.endpoint.ends_with("/gemini-1.5-pro:generateContent"));
    }
}
