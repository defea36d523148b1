//! Pipeline configuration, optionally loaded from `reviser.toml`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::lang::extension_of;

/// Pipeline configuration (TOML).
///
/// This file is intended to be edited by humans and must remain stable and
/// automatable. Missing fields default to sensible values; a missing file is
/// the full default configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReviserConfig {
    /// Extension allow-list (lowercase, no dot). Files with any other
    /// extension ride along in snapshots but are never sent to the oracle.
    pub extensions: Vec<String>,

    /// Upper bound on bytes submitted to the oracle in one call.
    ///
    /// A file is split when it exceeds half of this (byte count, one
    /// explicit rule; token estimation is deliberately not attempted).
    pub max_context_bytes: usize,

    /// How oversized files are handled.
    pub split_mode: SplitMode,

    pub oracle: OracleConfig,
}

/// Strategy for a file above the split threshold.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SplitMode {
    /// Partition locally into chunks, revise each chunk independently,
    /// recombine into one file.
    Chunk,
    /// Ask the oracle to split the file itself; its multi-block response
    /// fans out into several output files.
    FanOut,
}

/// Connection and sampling parameters for the oracle. Opaque to the core:
/// the pipeline threads these through without interpreting them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OracleConfig {
    /// OpenAI-compatible chat-completions endpoint.
    pub endpoint: String,
    pub model: String,
    /// Environment variable holding the API key, if the endpoint needs one.
    pub api_key_env: Option<String>,
    pub timeout_secs: u64,
    pub max_tokens: u32,
    pub temperature: f64,
    /// Optional per-round temperatures. Round k uses entry k-1; rounds past
    /// the end of the schedule use the last entry.
    pub temperature_schedule: Vec<f64>,
}

impl Default for ReviserConfig {
    fn default() -> Self {
        Self {
            extensions: ["py", "java", "cpp", "cs", "cshtml", "js", "html"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            max_context_bytes: 32_768,
            split_mode: SplitMode::Chunk,
            oracle: OracleConfig::default(),
        }
    }
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080/v1/chat/completions".to_string(),
            model: "mistral-7b-instruct".to_string(),
            api_key_env: None,
            timeout_secs: 120,
            max_tokens: 32_768,
            temperature: 1.0,
            temperature_schedule: Vec::new(),
        }
    }
}

impl ReviserConfig {
    pub fn validate(&self) -> Result<()> {
        if self.extensions.is_empty() {
            return Err(anyhow!("extensions must not be empty"));
        }
        if self
            .extensions
            .iter()
            .any(|ext| ext.is_empty() || ext.starts_with('.'))
        {
            return Err(anyhow!("extensions must be bare suffixes without a dot"));
        }
        if self.max_context_bytes == 0 {
            return Err(anyhow!("max_context_bytes must be > 0"));
        }
        if self.oracle.endpoint.trim().is_empty() {
            return Err(anyhow!("oracle.endpoint must not be empty"));
        }
        if self.oracle.timeout_secs == 0 {
            return Err(anyhow!("oracle.timeout_secs must be > 0"));
        }
        for temp in std::iter::once(self.oracle.temperature).chain(
            self.oracle.temperature_schedule.iter().copied(),
        ) {
            if !(0.0..=2.0).contains(&temp) {
                return Err(anyhow!("temperature {temp} outside 0.0..=2.0"));
            }
        }
        Ok(())
    }

    /// Files above this many bytes are split before submission.
    pub fn split_threshold(&self) -> usize {
        self.max_context_bytes / 2
    }

    /// Whether `path` is eligible for revision (extension in the allow-list,
    /// case-insensitive).
    pub fn is_eligible(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        match extension_of(name) {
            Some(ext) => self.extensions.iter().any(|allowed| *allowed == ext),
            None => false,
        }
    }

    /// Sampling temperature for a 1-based round number.
    pub fn temperature_for_round(&self, round: u32) -> f64 {
        if self.oracle.temperature_schedule.is_empty() {
            return self.oracle.temperature;
        }
        let idx = (round.saturating_sub(1) as usize)
            .min(self.oracle.temperature_schedule.len() - 1);
        self.oracle.temperature_schedule[idx]
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `ReviserConfig::default()`.
pub fn load_config(path: &Path) -> Result<ReviserConfig> {
    if !path.exists() {
        let cfg = ReviserConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: ReviserConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}
