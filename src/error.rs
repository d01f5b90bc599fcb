// src/error.rs

//! Error types for next2expo

use std::time::Duration;
use thiserror::Error;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while analyzing, converting or fixing a project
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O error with the path or operation that caused it
    #[error("{0}")]
    IoError(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport-level HTTP failure (connect, timeout, body read)
    #[error("HTTP request to {provider} failed: {message}")]
    Http { provider: String, message: String },

    /// Provider throttled the request (HTTP 429)
    #[error("{provider} rate limit exceeded (HTTP 429)")]
    RateLimited {
        provider: String,
        retry_after: Option<Duration>,
    },

    /// Provider rejected the API key
    #[error("{provider} rejected the API key (HTTP {status})")]
    Auth { provider: String, status: u16 },

    /// Any other non-success response
    #[error("{provider} returned HTTP {status}: {body}")]
    Api {
        provider: String,
        status: u16,
        body: String,
    },

    /// Provider answered but produced no text
    #[error("{0} returned an empty completion")]
    EmptyResponse(String),

    /// No API key configured for the provider
    #[error("no API key configured for {0}; run `next2expo provider set-key {0}`")]
    MissingApiKey(String),

    /// Provider name not recognized
    #[error("unknown provider: {0} (expected 'mistral' or 'gemini')")]
    UnknownProvider(String),

    /// Source path is not a usable Next.js project
    #[error("invalid project: {0}")]
    InvalidProject(String),

    /// Destination already has content and overwriting was not allowed
    #[error("destination {0} is not empty (use --force to write into it)")]
    DestinationNotEmpty(String),

    /// Conversion plan could not be produced or parsed
    #[error("conversion plan error: {0}")]
    Plan(String),

    /// Configuration problem
    #[error("configuration error: {0}")]
    Config(String),

    /// Interactive prompt failed or was aborted
    #[error("prompt error: {0}")]
    Prompt(String),
}

impl Error {
    /// Whether this error indicates provider throttling
    ///
    /// Besides the typed variant, any error whose message mentions `429`
    /// or `rate limit` counts, matching how providers surface throttling
    /// inside error bodies.
    pub fn is_rate_limit(&self) -> bool {
        if matches!(self, Self::RateLimited { .. }) {
            return true;
        }
        let message = self.to_string().to_lowercase();
        message.contains("429") || message.contains("rate limit")
    }

    /// Whether a retry may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http { .. } | Self::RateLimited { .. } => true,
            Self::Api { status, .. } => *status >= 500 || self.is_rate_limit(),
            _ => false,
        }
    }

    /// Server-provided `Retry-After` hint, if any
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_detection() {
        let typed = Error::RateLimited {
            provider: "mistral".to_string(),
            retry_after: None,
        };
        assert!(typed.is_rate_limit());
        assert!(typed.is_retryable());

        let in_body = Error::Api {
            provider: "gemini".to_string(),
            status: 400,
            body: "Rate limit reached for requests".to_string(),
        };
        assert!(in_body.is_rate_limit());
        assert!(in_body.is_retryable());

        let auth = Error::Auth {
            provider: "mistral".to_string(),
            status: 401,
        };
        assert!(!auth.is_rate_limit());
        assert!(!auth.is_retryable());
    }

    #[test]
    fn test_server_errors_are_retryable() {
        let err = Error::Api {
            provider: "mistral".to_string(),
            status: 503,
            body: "overloaded".to_string(),
        };
        assert!(err.is_retryable());

        let err = Error::Api {
            provider: "mistral".to_string(),
            status: 400,
            body: "bad request".to_string(),
        };
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_retry_after_hint() {
        let err = Error::RateLimited {
            provider: "gemini".to_string(),
            retry_after: Some(Duration::from_secs(7)),
        };
        assert_eq!(err.retry_after(), Some(Duration::from_secs(7)));
        assert_eq!(Error::EmptyResponse("x".into()).retry_after(), None);
    }
}
