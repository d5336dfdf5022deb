//! Configuration types for the redaction pipeline

use std::fs;
use std::path::Path;
use std::result::Result as StdResult;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result, VerifierError};

/// Settings for the external verification call
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// Model identifier sent with the chat completion request
    pub model: String,
    /// API base URL; overridable for proxies and tests
    pub base_url: String,
    /// Bearer token; resolved from the environment, never from files
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
        }
    }
}

impl VerifierConfig {
    /// Reads the API key from `OPENAI_API_KEY`
    pub fn from_env() -> StdResult<Self, VerifierError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| VerifierError::Config("OPENAI_API_KEY not set".into()))?;
        Ok(Self {
            api_key: Some(api_key),
            ..Self::default()
        })
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }
}

/// Global redaction run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedactionConfig {
    /// RGB fill for overwritten regions, each component in [0, 1]
    pub fill_color: [f32; 3],
    pub verifier: VerifierConfig,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            fill_color: [0.0, 0.0, 0.0],
            verifier: VerifierConfig::default(),
        }
    }
}

impl RedactionConfig {
    /// Loads configuration from a JSON or YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Input(format!("failed to read config file: {}", e)))?;

        serde_json::from_str(&content)
            .or_else(|_| serde_yaml::from_str(&content))
            .map_err(|e: serde_yaml::Error| Error::Input(format!("config parsing error: {}", e)))
    }
}
