//! Backend selection from configuration

use crate::{GeminiClient, LlmError, LlmResult, OllamaClient, OllamaConfig, TextGenerator};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Ollama,
    Gemini,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Ollama => "ollama",
            BackendKind::Gemini => "gemini",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(BackendKind::Ollama),
            "gemini" => Ok(BackendKind::Gemini),
            other => Err(LlmError::Config(format!("Unknown backend: {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub kind: BackendKind,
    /// Ollama server URL; ignored by Gemini
    pub server_url: String,
    /// Model name; each backend has its own default
    pub model: Option<String>,
    /// Environment variable holding the Gemini API key
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::Ollama,
            server_url: OllamaConfig::default().server_url,
            model: None,
            api_key_env: "GEMINI_API_KEY".to_string(),
            timeout_secs: 120,
        }
    }
}

/// Construct the configured backend
pub fn build_generator(config: &BackendConfig) -> LlmResult<Arc<dyn TextGenerator>> {
    let timeout = Duration::from_secs(config.timeout_secs);
    info!("Using {} text-generation backend", config.kind);

    match config.kind {
        BackendKind::Ollama => {
            let defaults = OllamaConfig::default();
            let client = OllamaClient::new(OllamaConfig {
                server_url: config.server_url.clone(),
                model: config.model.clone().unwrap_or(defaults.model),
                timeout,
            })?;
            Ok(Arc::new(client))
        }
        BackendKind::Gemini => {
            let api_key = std::env::var(&config.api_key_env).map_err(|_| {
                LlmError::Config(format!(
                    "{} must be set to use the Gemini backend",
                    config.api_key_env
                ))
            })?;
            let client = GeminiClient::new(api_key, config.model.clone(), timeout)?;
            Ok(Arc::new(client))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_kind_parsing() {
        assert_eq!("Ollama".parse::<BackendKind>().unwrap(), BackendKind::Ollama);
        assert_eq!("gemini".parse::<BackendKind>().unwrap(), BackendKind::Gemini);
        assert!("gpt".parse::<BackendKind>().is_err());
    }

    #[test]
    fn test_build_ollama_generator() {
        let generator = build_generator(&BackendConfig::default()).unwrap();
        assert_eq!(generator.backend_name(), "ollama");
    }

    #[test]
    fn test_gemini_requires_api_key() {
        let config = BackendConfig {
            kind: BackendKind::Gemini,
            api_key_env: "CODESHIFT_TEST_UNSET_GEMINI_KEY".to_string(),
            ..BackendConfig::default()
        };
        assert!(matches!(build_generator(&config), Err(LlmError::Config(_))));
    }
}
