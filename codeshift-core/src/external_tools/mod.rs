//! External type-checker integration
//!
//! A type checker contributes extra `Issue`s to an analysis on a best-effort
//! basis: a missing tool, a crash or a timeout all degrade to "no additional
//! issues" and are only logged.

use crate::models::{Issue, IssueCategory, Severity};
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub mod mypy;

/// One diagnostic line reported by a type checker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDiagnostic {
    pub line: usize,
    pub column: Option<usize>,
    /// `error`, `warning` or `note`
    pub severity: String,
    pub message: String,
    pub code: Option<String>,
}

impl TypeDiagnostic {
    /// Errors become type issues; notes and warnings are dropped
    pub fn into_issue(self) -> Option<Issue> {
        if self.severity != "error" {
            return None;
        }
        let message = match &self.code {
            Some(code) => format!("{} [{}]", self.message, code),
            None => self.message,
        };
        Some(Issue::new(Severity::Error, IssueCategory::Type, message, self.line))
    }
}

/// Static type checker run as an external process
#[async_trait]
pub trait TypeChecker: Send + Sync {
    /// Name of the tool, used in log lines
    fn tool_name(&self) -> &str;

    /// Whether the tool can be found on this machine
    fn is_available(&self) -> bool;

    /// Check one source unit. `name` only labels diagnostics.
    async fn check_source(&self, source: &str, name: &str) -> Result<Vec<TypeDiagnostic>>;
}

/// Run `checker` with a hard timeout and turn its errors into issues.
/// Every failure mode yields an empty list.
pub async fn type_check_issues(
    checker: &dyn TypeChecker,
    source: &str,
    name: &str,
    timeout: Duration,
) -> Vec<Issue> {
    if !checker.is_available() {
        debug!("{} not available, skipping type check", checker.tool_name());
        return Vec::new();
    }

    match tokio::time::timeout(timeout, checker.check_source(source, name)).await {
        Ok(Ok(diagnostics)) => diagnostics
            .into_iter()
            .filter_map(TypeDiagnostic::into_issue)
            .collect(),
        Ok(Err(e)) => {
            debug!("{} failed on {}: {}", checker.tool_name(), name, e);
            Vec::new()
        }
        Err(_) => {
            debug!(
                "{} timed out after {:?} on {}",
                checker.tool_name(),
                timeout,
                name
            );
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    struct FixedChecker {
        available: bool,
        outcome: std::result::Result<Vec<TypeDiagnostic>, String>,
        delay: Duration,
    }

    #[async_trait]
    impl TypeChecker for FixedChecker {
        fn tool_name(&self) -> &str {
            "fixed"
        }

        fn is_available(&self) -> bool {
            self.available
        }

        async fn check_source(&self, _source: &str, _name: &str) -> Result<Vec<TypeDiagnostic>> {
            tokio::time::sleep(self.delay).await;
            self.outcome.clone().map_err(|message| Error::ExternalTool {
                tool: "fixed".to_string(),
                message,
            })
        }
    }

    fn diagnostic(severity: &str) -> TypeDiagnostic {
        TypeDiagnostic {
            line: 3,
            column: Some(5),
            severity: severity.to_string(),
            message: "Incompatible types".to_string(),
            code: Some("assignment".to_string()),
        }
    }

    #[tokio::test]
    async fn test_errors_become_type_issues() {
        let checker = FixedChecker {
            available: true,
            outcome: Ok(vec![diagnostic("error"), diagnostic("note")]),
            delay: Duration::ZERO,
        };
        let issues = type_check_issues(&checker, "x = 1", "t.py", Duration::from_secs(1)).await;
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Error);
        assert_eq!(issues[0].category, IssueCategory::Type);
        assert_eq!(issues[0].line, 3);
        assert_eq!(issues[0].message, "Incompatible types [assignment]");
    }

    #[tokio::test]
    async fn test_failures_degrade_to_no_issues() {
        let missing = FixedChecker {
            available: false,
            outcome: Ok(vec![diagnostic("error")]),
            delay: Duration::ZERO,
        };
        let broken = FixedChecker {
            available: true,
            outcome: Err("boom".to_string()),
            delay: Duration::ZERO,
        };
        let slow = FixedChecker {
            available: true,
            outcome: Ok(vec![diagnostic("error")]),
            delay: Duration::from_secs(5),
        };

        let timeout = Duration::from_millis(50);
        assert!(type_check_issues(&missing, "", "t.py", timeout).await.is_empty());
        assert!(type_check_issues(&broken, "", "t.py", timeout).await.is_empty());
        assert!(type_check_issues(&slow, "", "t.py", timeout).await.is_empty());
    }
}
