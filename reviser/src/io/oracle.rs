//! Oracle abstraction for code revision.
//!
//! The [`Oracle`] trait decouples file processing from the actual model
//! backend (currently an OpenAI-compatible HTTP endpoint). Tests use
//! scripted oracles that return predetermined responses without touching
//! the network. The client is constructed once in `main` and passed down by
//! reference; there is no process-wide model handle.

use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::io::config::OracleConfig;

/// Failure at the oracle boundary.
///
/// The File Task Processor treats both variants identically (copy-through
/// fallback); they are distinguished for logging and retry policy.
#[derive(Debug, Error)]
pub enum OracleFailure {
    /// The endpoint could not be reached at all (connect error, timeout).
    #[error("oracle unavailable: {0}")]
    Unavailable(String),
    /// The oracle answered but failed internally (HTTP error status,
    /// unparseable body, empty completion).
    #[error("oracle error: {0}")]
    Backend(String),
}

/// Parameters for one revision call.
#[derive(Debug, Clone)]
pub struct OracleRequest {
    /// Fully rendered instruction + code prompt.
    pub prompt: String,
    /// Sampling temperature for this call (may vary per round).
    pub temperature: f64,
}

/// Abstraction over code-revision backends.
pub trait Oracle {
    /// Submit a prompt and return the raw free-text response.
    fn revise(&self, request: &OracleRequest) -> Result<String, OracleFailure>;
}

/// Oracle talking to an OpenAI-compatible chat-completions endpoint.
pub struct HttpOracle {
    cfg: OracleConfig,
    api_key: Option<String>,
    client: reqwest::blocking::Client,
}

impl HttpOracle {
    pub fn new(cfg: &OracleConfig) -> Result<Self> {
        let api_key = match &cfg.api_key_env {
            Some(var) => Some(
                std::env::var(var).with_context(|| format!("read api key from ${var}"))?,
            ),
            None => None,
        };
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .context("build http client")?;
        Ok(Self {
            cfg: cfg.clone(),
            api_key,
            client,
        })
    }
}

impl Oracle for HttpOracle {
    #[instrument(skip_all, fields(model = %self.cfg.model, temperature = request.temperature))]
    fn revise(&self, request: &OracleRequest) -> Result<String, OracleFailure> {
        let body = json!({
            "model": self.cfg.model,
            "messages": [{ "role": "user", "content": request.prompt }],
            "temperature": request.temperature,
            "max_tokens": self.cfg.max_tokens,
        });

        let mut call = self.client.post(&self.cfg.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            call = call.bearer_auth(key);
        }

        let response = call.send().map_err(|err| {
            if err.is_connect() || err.is_timeout() {
                OracleFailure::Unavailable(err.to_string())
            } else {
                OracleFailure::Backend(err.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            warn!(%status, "oracle returned error status");
            return Err(OracleFailure::Backend(format!(
                "status {status}: {body}"
            )));
        }

        let parsed: Value = response
            .json()
            .map_err(|err| OracleFailure::Backend(format!("unparseable body: {err}")))?;
        let content = parsed["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| OracleFailure::Backend("no completion in response".to_string()))?;

        debug!(bytes = content.len(), "oracle responded");
        Ok(content.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_variants_render_distinct_messages() {
        let unavailable = OracleFailure::Unavailable("connection refused".to_string());
        let backend = OracleFailure::Backend("status 500".to_string());
        assert!(unavailable.to_string().contains("unavailable"));
        assert!(backend.to_string().contains("oracle error"));
    }

    #[test]
    fn new_fails_when_api_key_env_is_missing() {
        let cfg = OracleConfig {
            api_key_env: Some("REVISER_TEST_KEY_THAT_DOES_NOT_EXIST".to_string()),
            ..OracleConfig::default()
        };
        assert!(HttpOracle::new(&cfg).is_err());
    }
}
