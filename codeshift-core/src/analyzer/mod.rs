//! Structural Analyzer
//!
//! Turns one Python source unit into an [`AnalysisRecord`]. Every call
//! builds its record from scratch, so an analyzer can be shared freely
//! between concurrent callers.

mod quality;
mod walker;

use crate::constants::AnalysisThresholds;
use crate::external_tools::{mypy::MypyChecker, type_check_issues, TypeChecker};
use crate::models::{AnalysisRecord, SyntaxErrorInfo};
use crate::parser::{first_syntax_error, parse_python};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use walker::PythonAstWalker;

/// Analyzer settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Functions spanning more lines than this get a maintainability warning
    pub long_function_lines: usize,
    /// Run the external type checker after the structural pass
    pub type_check: bool,
    pub type_check_timeout_secs: u64,
    /// Program invoked for type checking
    pub type_checker: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            long_function_lines: AnalysisThresholds::LONG_FUNCTION_LINES,
            type_check: true,
            type_check_timeout_secs: AnalysisThresholds::TYPE_CHECK_TIMEOUT_SECS,
            type_checker: "mypy".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct StructuralAnalyzer {
    config: AnalyzerConfig,
    type_checker: Option<Arc<dyn TypeChecker>>,
}

impl std::fmt::Debug for StructuralAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StructuralAnalyzer")
            .field("config", &self.config)
            .field(
                "type_checker",
                &self.type_checker.as_ref().map(|c| c.tool_name().to_string()),
            )
            .finish()
    }
}

impl Default for StructuralAnalyzer {
    fn default() -> Self {
        Self::new(AnalyzerConfig::default())
    }
}

impl StructuralAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        let type_checker: Option<Arc<dyn TypeChecker>> = if config.type_check {
            Some(Arc::new(MypyChecker::new(config.type_checker.clone())))
        } else {
            None
        };
        Self {
            config,
            type_checker,
        }
    }

    /// Replace the type checker, or disable it with `None`
    pub fn with_type_checker(mut self, checker: Option<Arc<dyn TypeChecker>>) -> Self {
        self.type_checker = checker;
        self
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Structural pass only: entities, imports, annotations, quality issues
    /// and metrics. Never runs an external process.
    ///
    /// Unparseable source is an `Ok` failure record; `Err` means the parser
    /// itself could not be set up.
    pub fn analyze_structure(&self, source: &str, name: &str) -> Result<AnalysisRecord> {
        let tree = parse_python(source)?;

        if let Some(error) = first_syntax_error(&tree, source.as_bytes()) {
            debug!("Syntax error in {}: {}", name, error);
            return Ok(AnalysisRecord::failure(
                name,
                SyntaxErrorInfo {
                    message: format!("{}: {}", name, error.message),
                    ..error
                },
            ));
        }

        let mut walker = PythonAstWalker::new(source.as_bytes());
        walker.visit_node(tree.root_node());

        let issues = quality::check_quality(&walker.entities, self.config.long_function_lines);
        let record = AnalysisRecord::from_parts(
            name,
            walker.entities,
            issues,
            walker.imports,
            walker.types,
        );

        info!(
            "Analyzed {}: {} entities, {} issues, complexity {}",
            name,
            record.metrics.total_entities,
            record.metrics.issues_count,
            record.complexity
        );
        Ok(record)
    }

    /// Full analysis: the structural pass plus best-effort type checking
    pub async fn analyze(&self, source: &str, name: &str) -> Result<AnalysisRecord> {
        let mut record = self.analyze_structure(source, name)?;
        if !record.success {
            return Ok(record);
        }

        if let Some(checker) = &self.type_checker {
            let timeout = Duration::from_secs(self.config.type_check_timeout_secs);
            let extra = type_check_issues(checker.as_ref(), source, name, timeout).await;
            if !extra.is_empty() {
                debug!("{} reported {} issues for {}", checker.tool_name(), extra.len(), name);
                record.extend_issues(extra);
            }
        }

        Ok(record)
    }

    /// Plain-language refactoring suggestions derived from a fresh analysis
    pub async fn suggest_refactoring(&self, source: &str) -> Result<Vec<String>> {
        let record = self.analyze(source, "<suggest>").await?;
        Ok(refactoring_suggestions(&record))
    }
}

/// Complexity first, then issue suggestions in issue order, then size and
/// crowding. Repeated texts are kept once.
pub fn refactoring_suggestions(record: &AnalysisRecord) -> Vec<String> {
    let mut suggestions: Vec<String> = Vec::new();
    let mut push = |text: &str| {
        if !suggestions.iter().any(|s| s == text) {
            suggestions.push(text.to_string());
        }
    };

    if record.complexity > AnalysisThresholds::HIGH_COMPLEXITY {
        push("Consider reducing complexity by breaking into smaller functions");
    }
    for suggestion in record.issues.iter().filter_map(|i| i.suggestion.as_deref()) {
        push(suggestion);
    }
    if record.metrics.total_lines > AnalysisThresholds::LARGE_FILE_LINES {
        push("File is large. Consider splitting into modules");
    }
    if record.metrics.functions > AnalysisThresholds::CROWDED_MODULE_FUNCTIONS {
        push("Too many functions in one module. Consider better organization");
    }

    suggestions
}
