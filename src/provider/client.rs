// src/provider/client.rs

//! Paced, retrying completion client
//!
//! Wraps one [`AiProvider`] with a [`RateLimiter`] (applied before every
//! attempt) and a [`RetryPolicy`] (applied after retryable failures,
//! including HTTP 429).

use super::rate_limit::{RateLimiter, RetryPolicy};
use super::{AiProvider, CompletionRequest, ProviderKind};
use crate::config::AiConfig;
use crate::error::Result;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Completion client with rate limiting and retry
pub struct AiClient<'a> {
    provider: Box<dyn AiProvider + 'a>,
    limiter: RateLimiter,
    policy: RetryPolicy,
    temperature: f32,
    max_tokens: u32,
    requests_sent: u64,
}

impl<'a> AiClient<'a> {
    pub fn new(provider: Box<dyn AiProvider + 'a>, limiter: RateLimiter, policy: RetryPolicy) -> Self {
        Self {
            provider,
            limiter,
            policy,
            temperature: 0.1,
            max_tokens: 8000,
            requests_sent: 0,
        }
    }

    /// Build a client using the pacing, retry and model limits from `config`
    pub fn from_config(provider: Box<dyn AiProvider + 'a>, config: &AiConfig) -> Self {
        let settings = config.settings_for(provider.kind());
        let mut client = Self::new(
            provider,
            RateLimiter::per_minute(config.rate_limit.requests_per_minute),
            RetryPolicy::from_settings(&config.rate_limit),
        );
        client.temperature = settings.temperature;
        client.max_tokens = settings.max_tokens;
        client
    }

    /// Client that never sleeps (tests, offline runs)
    pub fn unthrottled(provider: Box<dyn AiProvider + 'a>) -> Self {
        Self::new(provider, RateLimiter::new(Duration::ZERO), RetryPolicy::immediate(3))
    }

    pub fn kind(&self) -> ProviderKind {
        self.provider.kind()
    }

    /// Total HTTP attempts made, retries included
    pub fn requests_sent(&self) -> u64 {
        self.requests_sent
    }

    /// Build a request carrying the configured model limits
    pub fn request(&self, system: &str, prompt: impl Into<String>) -> CompletionRequest {
        CompletionRequest::new(prompt)
            .with_system(system)
            .with_limits(self.temperature, self.max_tokens)
    }

    /// Send a request, pacing and retrying as configured
    pub fn generate(&mut self, request: &CompletionRequest) -> Result<String> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            self.limiter.acquire();
            self.requests_sent += 1;

            match self.provider.complete(request) {
                Ok(text) => {
                    debug!(
                        "{} answered on attempt {} ({} chars)",
                        self.provider.kind(),
                        attempt,
                        text.len()
                    );
                    return Ok(text);
                }
                Err(e) => {
                    let retry = attempt - 1;
                    if !e.is_retryable() || retry >= self.policy.max_retries {
                        if e.is_retryable() {
                            warn!(
                                "{} request failed after {} attempts: {}",
                                self.provider.kind(),
                                attempt,
                                e
                            );
                        }
                        return Err(e);
                    }

                    let delay = self.policy.delay_with_hint(attempt, e.retry_after());
                    if e.is_rate_limit() {
                        info!(
                            "{} rate limited, waiting {:?} before retry {}/{}",
                            self.provider.kind(),
                            delay,
                            attempt,
                            self.policy.max_retries
                        );
                    } else {
                        warn!(
                            "{} attempt {} failed: {}, retrying in {:?}",
                            self.provider.kind(),
                            attempt,
                            e,
                            delay
                        );
                    }
                    if !delay.is_zero() {
                        std::thread::sleep(delay);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::provider::mock::MockProvider;
    use std::time::Instant;

    fn rate_limited() -> Error {
        Error::RateLimited {
            provider: "mock".to_string(),
            retry_after: None,
        }
    }

    #[test]
    fn test_retries_rate_limit_then_succeeds() {
        let provider = MockProvider::new(|_, index| {
            if index < 2 {
                Err(rate_limited())
            } else {
                Ok("done".to_string())
            }
        });
        let mut client = AiClient::unthrottled(Box::new(&provider));

        let text = client.generate(&CompletionRequest::new("x")).unwrap();
        assert_eq!(text, "done");
        assert_eq!(provider.calls(), 3);
        assert_eq!(client.requests_sent(), 3);
    }

    #[test]
    fn test_gives_up_after_max_retries() {
        let provider = MockProvider::new(|_, _| Err(rate_limited()));
        let mut client = AiClient::unthrottled(Box::new(&provider));

        let err = client.generate(&CompletionRequest::new("x")).unwrap_err();
        assert!(err.is_rate_limit());
        // One attempt plus three retries
        assert_eq!(provider.calls(), 4);
    }

    #[test]
    fn test_non_retryable_fails_fast() {
        let provider = MockProvider::new(|_, _| {
            Err(Error::Auth {
                provider: "mock".to_string(),
                status: 401,
            })
        });
        let mut client = AiClient::unthrottled(Box::new(&provider));

        assert!(client.generate(&CompletionRequest::new("x")).is_err());
        assert_eq!(provider.calls(), 1);
    }

    #[test]
    fn test_limiter_spaces_consecutive_requests() {
        let provider = MockProvider::fixed("ok");
        let interval = Duration::from_millis(50);
        let mut client = AiClient::new(
            Box::new(&provider),
            RateLimiter::new(interval),
            RetryPolicy::immediate(0),
        );

        let start = Instant::now();
        client.generate(&CompletionRequest::new("a")).unwrap();
        client.generate(&CompletionRequest::new("b")).unwrap();
        assert!(start.elapsed() >= interval);
    }

    #[test]
    fn test_request_carries_config_limits() {
        let provider = MockProvider::fixed("ok");
        let mut config = AiConfig::default();
        config.providers.get_mut("mistral").unwrap().max_tokens = 1234;
        let client = AiClient::from_config(Box::new(&provider), &config);

        let request = client.request("sys", "prompt");
        assert_eq!(request.max_tokens, 1234);
        assert_eq!(request.system.as_deref(), Some("sys"));
    }
}
