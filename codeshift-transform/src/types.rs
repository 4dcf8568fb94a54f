//! Transformation kinds and the records the reasoner produces

use crate::TransformError;
use codeshift_core::Issue;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What kind of change the caller asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum TransformationKind {
    Refactor,
    Generate,
    Optimize,
    FixBug,
    AddFeature,
    Document,
    Test,
    Migrate,
}

impl TransformationKind {
    pub fn all() -> [TransformationKind; 8] {
        [
            TransformationKind::Refactor,
            TransformationKind::Generate,
            TransformationKind::Optimize,
            TransformationKind::FixBug,
            TransformationKind::AddFeature,
            TransformationKind::Document,
            TransformationKind::Test,
            TransformationKind::Migrate,
        ]
    }

    /// Tag used in prompts and serialized output
    pub fn as_str(&self) -> &'static str {
        match self {
            TransformationKind::Refactor => "refactor",
            TransformationKind::Generate => "generate",
            TransformationKind::Optimize => "optimize",
            TransformationKind::FixBug => "fix_bug",
            TransformationKind::AddFeature => "add_feature",
            TransformationKind::Document => "document",
            TransformationKind::Test => "test",
            TransformationKind::Migrate => "migrate",
        }
    }

    /// Get display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            TransformationKind::Refactor => "Refactoring",
            TransformationKind::Generate => "Code Generation",
            TransformationKind::Optimize => "Optimization",
            TransformationKind::FixBug => "Bug Fix",
            TransformationKind::AddFeature => "Feature Addition",
            TransformationKind::Document => "Documentation",
            TransformationKind::Test => "Test Generation",
            TransformationKind::Migrate => "Migration",
        }
    }
}

impl fmt::Display for TransformationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransformationKind {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        TransformationKind::all()
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| TransformError::UnknownKind(s.to_string()))
    }
}

/// One stage of a model-produced plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningStep {
    pub step_num: u32,
    /// What is being decided
    pub thought: String,
    /// What will be done; empty when the reply gave no `Action:` line
    pub action: String,
    pub code_snippet: Option<String>,
    /// Weight in [0, 1]
    pub confidence: f64,
    pub rationale: Option<String>,
}

impl ReasoningStep {
    pub fn new(step_num: u32, thought: impl Into<String>) -> Self {
        Self {
            step_num,
            thought: thought.into(),
            action: String::new(),
            code_snippet: None,
            confidence: 1.0,
            rationale: None,
        }
    }
}

/// Structured reading of the intent-understanding reply.
/// Fields the reply did not cover hold [`IntentUnderstanding::NOT_FOUND`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentUnderstanding {
    pub raw: String,
    pub primary_goal: String,
    pub constraints: String,
    pub patterns: String,
    pub risks: String,
    pub dependencies: String,
}

impl IntentUnderstanding {
    pub const NOT_FOUND: &'static str = "Not found";
}

/// Everything one `transform` call produced.
///
/// A failed transformation still carries its reasoning steps and candidate
/// code; only `success` and `validation_errors` say whether to trust it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformationResult {
    pub success: bool,
    pub original_code: String,
    pub transformed_code: Option<String>,
    pub kind: TransformationKind,
    pub understanding: IntentUnderstanding,
    pub reasoning_steps: Vec<ReasoningStep>,
    /// Issues found in the source before transformation
    pub issues: Vec<Issue>,
    pub validation_errors: Vec<String>,
    pub confidence: f64,
    pub explanation: String,
}

impl TransformationResult {
    /// True when the generated code differs from the input
    pub fn changed(&self) -> bool {
        self.transformed_code
            .as_deref()
            .map_or(false, |code| code.trim() != self.original_code.trim())
    }
}
