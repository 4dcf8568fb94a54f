//! codeshift core - Structural Analyzer
//!
//! Parses a Python source unit with tree-sitter and produces an
//! [`AnalysisRecord`]: entities (functions, classes, variables) with
//! cyclomatic complexity, imports, parameter annotations, quality issues and
//! aggregated metrics. An external type checker (mypy) can contribute extra
//! issues on a best-effort basis.
//!
//! The analyzer keeps no state between calls; every `analyze` builds a fresh
//! record, so one [`StructuralAnalyzer`] can be shared across tasks.

#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions, // Often necessary for clarity
    clippy::missing_errors_doc,
)]

pub mod analyzer;
pub mod constants;
pub mod external_tools;
pub mod models;
pub mod parser;

pub use analyzer::{AnalyzerConfig, StructuralAnalyzer};
pub use constants::AnalysisThresholds;
pub use external_tools::{mypy::MypyChecker, TypeChecker, TypeDiagnostic};
pub use models::{
    AnalysisRecord, Entity, EntityGroups, EntityKind, Import, ImportKind, Issue, IssueCategory,
    Metrics, Severity, SeverityCounts, SyntaxErrorInfo, TypeInfo,
};

/// Result type used throughout codeshift core
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for codeshift core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The parser itself could not be set up. Syntax errors in the analysed
    /// source are not reported through this variant.
    #[error("Parse error: {0}")]
    Parse(String),

    /// External tool error
    #[error("External tool error: {tool}: {message}")]
    ExternalTool { tool: String, message: String },
}
