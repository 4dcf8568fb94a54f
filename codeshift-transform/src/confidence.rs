//! Confidence scoring
//!
//! The coefficients are heuristics. They are kept as plain fields so a
//! configuration file can override them.

use crate::types::ReasoningStep;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceModel {
    /// A transformation succeeds only with confidence strictly above this
    pub success_threshold: f64,
    pub validation_penalty_per_error: f64,
    pub max_validation_penalty: f64,
    pub issue_penalty_per_issue: f64,
    pub max_issue_penalty: f64,
    /// Base score when the plan has no steps
    pub default_base: f64,
}

impl Default for ConfidenceModel {
    fn default() -> Self {
        Self {
            success_threshold: 0.7,
            validation_penalty_per_error: 0.2,
            max_validation_penalty: 0.5,
            issue_penalty_per_issue: 0.1,
            max_issue_penalty: 0.3,
            default_base: 0.5,
        }
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[allow(clippy::cast_precision_loss)]
fn penalty(per_item: f64, cap: f64, count: usize) -> f64 {
    (per_item * count as f64).min(cap).max(0.0)
}

impl ConfidenceModel {
    /// Mean step confidence, each weight clamped to [0, 1]
    #[allow(clippy::cast_precision_loss)]
    pub fn base_confidence(&self, steps: &[ReasoningStep]) -> f64 {
        if steps.is_empty() {
            return clamp_unit(self.default_base);
        }
        let total: f64 = steps.iter().map(|step| clamp_unit(step.confidence)).sum();
        total / steps.len() as f64
    }

    /// Base confidence minus the validation and pre-existing issue
    /// penalties, clamped to [0, 1]
    pub fn score(
        &self,
        steps: &[ReasoningStep],
        validation_errors: usize,
        existing_issues: usize,
    ) -> f64 {
        let base = self.base_confidence(steps);
        let validation_penalty = penalty(
            self.validation_penalty_per_error,
            self.max_validation_penalty,
            validation_errors,
        );
        let issue_penalty = penalty(
            self.issue_penalty_per_issue,
            self.max_issue_penalty,
            existing_issues,
        );
        clamp_unit(base - validation_penalty - issue_penalty)
    }

    pub fn is_success(&self, validation_errors: usize, confidence: f64) -> bool {
        validation_errors == 0 && confidence > self.success_threshold
    }
}
