//! codeshift Transform - Transformation Reasoner
//!
//! Drives one natural-language transformation through a fixed sequence of
//! phases:
//!
//! 1. analyze the source with the structural analyzer
//! 2. understand the intent (model call)
//! 3. plan numbered reasoning steps (model call)
//! 4. generate the transformed source (model call)
//! 5. validate the result
//! 6. score confidence
//! 7. explain the change (model call)
//!
//! Free-text model replies are read by the tolerant parsers in [`parsing`],
//! which fall back to fixed values instead of failing. The [`agent`] module
//! wraps the reasoner in a task table and a worker pool.

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

pub mod agent;
pub mod config;
pub mod confidence;
pub mod parsing;
pub mod prompts;
pub mod reasoner;
pub mod types;
pub mod validation;

pub use agent::{Agent, AgentConfig, AgentStatus, Task, TaskPriority, TaskStatus};
pub use config::CodeshiftConfig;
pub use confidence::ConfidenceModel;
pub use reasoner::TransformationReasoner;
pub use types::{IntentUnderstanding, ReasoningStep, TransformationKind, TransformationResult};

/// Result type for transformation operations
pub type Result<T> = std::result::Result<T, TransformError>;

/// Error types for transformation operations
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// The text-generation backend failed during a model phase
    #[error("Generation failed: {0}")]
    Generation(#[from] codeshift_llm::LlmError),

    /// The analyzer could not run at all
    #[error("Analysis error: {0}")]
    Analysis(#[from] codeshift_core::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Utility error
    #[error("Utility error: {0}")]
    Util(#[from] codeshift_utils::UtilError),

    /// Unknown transformation kind
    #[error("Unknown transformation kind: {0}")]
    UnknownKind(String),

    /// No task with this id
    #[error("Task not found: {0}")]
    TaskNotFound(uuid::Uuid),

    /// The agent is not accepting work
    #[error("Agent error: {0}")]
    Agent(String),
}
