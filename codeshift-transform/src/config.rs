//! Top-level configuration
//!
//! Every section has defaults, so a file only needs the keys it changes.
//!
//! ```toml
//! [analyzer]
//! type_check = false
//!
//! [backend]
//! kind = "gemini"
//!
//! [confidence]
//! success_threshold = 0.8
//! ```

use crate::agent::AgentConfig;
use crate::confidence::ConfidenceModel;
use crate::reasoner::TransformationReasoner;
use crate::{Result, TransformError};
use codeshift_core::{AnalyzerConfig, StructuralAnalyzer};
use codeshift_llm::{build_generator, BackendConfig, GenerationOptions};
use codeshift_utils::{load_config, LoggerConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeshiftConfig {
    pub analyzer: AnalyzerConfig,
    pub generation: GenerationOptions,
    pub backend: BackendConfig,
    pub confidence: ConfidenceModel,
    pub agent: AgentConfig,
    pub logging: LoggerConfig,
}

impl CodeshiftConfig {
    /// Load from a `.toml`, `.json` or `.yaml` file
    pub fn load(path: &Path) -> Result<Self> {
        let config: Self = load_config(path)?;
        config
            .generation
            .validate()
            .map_err(|e| TransformError::Config(e.to_string()))?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Reasoner wired to the configured backend and analyzer
    pub fn build_reasoner(&self) -> Result<TransformationReasoner> {
        let generator = build_generator(&self.backend)?;
        Ok(
            TransformationReasoner::new(generator, StructuralAnalyzer::new(self.analyzer.clone()))
                .with_confidence_model(self.confidence.clone())
                .with_generation_options(self.generation.clone()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeshift_llm::BackendKind;
    use std::io::Write;

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_partial_toml() {
        let file = write_temp(
            ".toml",
            "[analyzer]\ntype_check = false\n\n[backend]\nkind = \"gemini\"\n\n[confidence]\nsuccess_threshold = 0.8\n",
        );
        let config = CodeshiftConfig::load(file.path()).unwrap();
        assert!(!config.analyzer.type_check);
        assert_eq!(config.analyzer.long_function_lines, 50);
        assert_eq!(config.backend.kind, BackendKind::Gemini);
        assert_eq!(config.confidence.success_threshold, 0.8);
        assert_eq!(config.confidence.max_issue_penalty, 0.3);
        assert_eq!(config.agent.workers, AgentConfig::default().workers);
    }

    #[test]
    fn test_yaml_and_invalid_generation_options() {
        let file = write_temp(".yaml", "generation:\n  temperature: 0.2\n");
        let config = CodeshiftConfig::load(file.path()).unwrap();
        assert!((config.generation.temperature - 0.2).abs() < 1e-6);

        let bad = write_temp(".json", r#"{"generation": {"top_k": 0}}"#);
        assert!(matches!(
            CodeshiftConfig::load(bad.path()),
            Err(TransformError::Config(_))
        ));
    }

    #[test]
    fn test_build_reasoner_uses_configured_backend() {
        let config = CodeshiftConfig::default();
        let reasoner = config.build_reasoner().unwrap();
        assert_eq!(reasoner.backend_name(), "ollama");
    }
}
