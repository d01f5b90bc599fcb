// src/provider/http.rs

//! Shared blocking HTTP transport for provider APIs
//!
//! Makes exactly one attempt per call and maps HTTP status codes onto the
//! typed errors the retry loop in [`super::AiClient`] understands.

use super::truncate_body;
use crate::error::{Error, Result};
use reqwest::blocking::Client;
use reqwest::header::RETRY_AFTER;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Blocking HTTP client wrapper
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport with a fixed request timeout
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("next2expo/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// POST a JSON body and decode a JSON response
    pub fn post_json<B, R>(
        &self,
        provider: &str,
        url: &str,
        headers: &[(&str, &str)],
        body: &B,
    ) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        debug!("POST {} ({})", url, provider);

        let mut request = self.client.post(url).json(body);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().map_err(|e| Error::Http {
            provider: provider.to_string(),
            message: e.to_string(),
        })?;

        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_retry_after);

        let text = response.text().map_err(|e| Error::Http {
            provider: provider.to_string(),
            message: format!("Failed to read response: {e}"),
        })?;

        check_status(provider, status, retry_after, &text)?;

        serde_json::from_str(&text).map_err(|e| Error::Api {
            provider: provider.to_string(),
            status,
            body: format!("unexpected response shape: {e}: {}", truncate_body(&text)),
        })
    }
}

/// Map a status code to an error, or `Ok` for 2xx
pub(crate) fn check_status(
    provider: &str,
    status: u16,
    retry_after: Option<Duration>,
    body: &str,
) -> Result<()> {
    match status {
        200..=299 => Ok(()),
        429 => Err(Error::RateLimited {
            provider: provider.to_string(),
            retry_after,
        }),
        401 | 403 => Err(Error::Auth {
            provider: provider.to_string(),
            status,
        }),
        _ => Err(Error::Api {
            provider: provider.to_string(),
            status,
            body: truncate_body(body),
        }),
    }
}

/// `Retry-After` in delta-seconds form; HTTP-date values are ignored
fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}
