//! Deterministic quality checks over extracted entities

use crate::models::{Entity, EntityGroups, Issue, IssueCategory, Severity};

/// Long functions first, then missing docstrings in line order
pub(crate) fn check_quality(entities: &EntityGroups, long_function_lines: usize) -> Vec<Issue> {
    let mut issues: Vec<Issue> = entities
        .functions
        .iter()
        .filter(|function| function.line_span() > long_function_lines)
        .map(|function| {
            Issue::new(
                Severity::Warning,
                IssueCategory::Maintainability,
                format!(
                    "Function '{}' is {} lines long",
                    function.name,
                    function.line_span()
                ),
                function.line_start,
            )
            .with_suggestion("Consider breaking into smaller functions")
        })
        .collect();

    let mut undocumented: Vec<&Entity> = entities
        .functions
        .iter()
        .chain(entities.classes.iter())
        .filter(|entity| entity.is_public && !entity.has_docstring())
        .collect();
    undocumented.sort_by_key(|entity| entity.line_start);

    issues.extend(undocumented.into_iter().map(|entity| {
        Issue::new(
            Severity::Info,
            IssueCategory::Maintainability,
            format!("Missing docstring for {} '{}'", entity.kind, entity.name),
            entity.line_start,
        )
        .with_suggestion("Add docstring documentation")
    }));

    issues
}
