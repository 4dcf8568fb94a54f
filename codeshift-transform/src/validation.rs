//! Post-generation checks on transformed code

use codeshift_core::parser::check_syntax;
use codeshift_core::{Severity, StructuralAnalyzer};
use tracing::{debug, warn};

/// Validation errors for `code`; empty means it passed.
///
/// A syntax error short-circuits: the message names the line and nothing
/// else is checked. Otherwise the code is analyzed again (including the
/// type checker when the analyzer has one) and every error-severity issue
/// message is reported.
pub async fn validate_code(analyzer: &StructuralAnalyzer, code: &str) -> Vec<String> {
    match check_syntax(code) {
        Ok(Some(error)) => {
            debug!("Transformed code has a syntax error: {}", error);
            return vec![format!("Syntax error at line {}: {}", error.line, error.message)];
        }
        Ok(None) => {}
        Err(e) => {
            warn!("Could not parse transformed code: {}", e);
            return vec![format!("Could not parse transformed code: {e}")];
        }
    }

    match analyzer.analyze(code, "<transformed>").await {
        Ok(record) => record
            .issues_with_severity(Severity::Error)
            .map(|issue| issue.message.clone())
            .collect(),
        Err(e) => {
            debug!("Re-analysis of transformed code failed: {}", e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeshift_core::{AnalyzerConfig, TypeChecker, TypeDiagnostic};
    use std::sync::Arc;

    fn analyzer() -> StructuralAnalyzer {
        StructuralAnalyzer::new(AnalyzerConfig {
            type_check: false,
            ..AnalyzerConfig::default()
        })
    }

    struct AlwaysComplains;

    #[async_trait::async_trait]
    impl TypeChecker for AlwaysComplains {
        fn tool_name(&self) -> &str {
            "complainer"
        }

        fn is_available(&self) -> bool {
            true
        }

        async fn check_source(
            &self,
            _source: &str,
            _name: &str,
        ) -> codeshift_core::Result<Vec<TypeDiagnostic>> {
            Ok(vec![TypeDiagnostic {
                line: 1,
                column: None,
                severity: "error".to_string(),
                message: "Missing return statement".to_string(),
                code: Some("return".to_string()),
            }])
        }
    }

    #[tokio::test]
    async fn test_clean_code_has_no_errors() {
        let errors = validate_code(&analyzer(), "def f(x):\n    return x + 1\n").await;
        assert!(errors.is_empty());
    }

    #[tokio::test]
    async fn test_syntax_error_is_reported_with_line() {
        let errors = validate_code(&analyzer(), "def f(x):\n    return x +\n").await;
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Syntax error at line "));
    }

    #[tokio::test]
    async fn test_type_errors_are_included() {
        let analyzer = analyzer().with_type_checker(Some(Arc::new(AlwaysComplains)));
        let errors = validate_code(&analyzer, "def f() -> int:\n    pass\n").await;
        assert_eq!(errors, vec!["Missing return statement [return]".to_string()]);
    }
}
