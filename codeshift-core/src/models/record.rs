//! The aggregate output of one analyzer run

use super::{Entity, EntityGroups, Issue, Severity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a module was imported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportKind {
    /// `import a.b`
    Direct,
    /// `from a import b`
    From,
}

/// One imported name, normalised to its fully qualified form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Import {
    pub kind: ImportKind,
    pub name: String,
}

/// Annotation attached to a parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeInfo {
    pub name: String,
    pub type_hint: String,
    pub inferred_type: Option<String>,
    pub is_optional: bool,
    pub confidence: f64,
}

impl TypeInfo {
    pub fn from_annotation(name: impl Into<String>, type_hint: impl Into<String>) -> Self {
        let type_hint = type_hint.into();
        let compact: String = type_hint.chars().filter(|c| !c.is_whitespace()).collect();
        let is_optional = compact.starts_with("Optional[")
            || compact.starts_with("typing.Optional[")
            || compact.split('|').any(|part| part == "None")
            || union_members(&compact).iter().any(|member| *member == "None");
        Self {
            name: name.into(),
            type_hint,
            inferred_type: None,
            is_optional,
            confidence: 1.0,
        }
    }
}

/// Top-level arguments of a whitespace-free `Union[...]` hint
fn union_members(compact: &str) -> Vec<&str> {
    let inner = compact
        .strip_prefix("typing.Union[")
        .or_else(|| compact.strip_prefix("Union["))
        .and_then(|rest| rest.strip_suffix(']'));
    let inner = match inner {
        Some(inner) => inner,
        None => return Vec::new(),
    };

    let mut members = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (index, c) in inner.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                members.push(&inner[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    members.push(&inner[start..]);
    members
}

/// Location and message of the first syntax error in a source unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxErrorInfo {
    pub message: String,
    /// 1-based line
    pub line: usize,
    /// 1-based column
    pub column: usize,
}

impl std::fmt::Display for SyntaxErrorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (line {}, column {})", self.message, self.line, self.column)
    }
}

/// Issue counts per severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub error: usize,
    pub warning: usize,
    pub info: usize,
}

impl SeverityCounts {
    pub fn get(&self, severity: Severity) -> usize {
        match severity {
            Severity::Error => self.error,
            Severity::Warning => self.warning,
            Severity::Info => self.info,
        }
    }
}

/// Derived metrics over one analysis
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    pub total_entities: usize,
    pub functions: usize,
    pub classes: usize,
    pub variables: usize,
    pub imports: usize,
    /// Sum of `line_end - line_start` over every entity
    pub total_lines: usize,
    pub issues_count: usize,
    pub issues_by_severity: SeverityCounts,
}

/// Result of analysing one source unit
///
/// `success` is false exactly when the source failed to parse; in that case
/// `syntax_error` is set and every collection is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// Identifying name the caller passed in (file name or `<stdin>`)
    pub name: String,
    pub success: bool,
    pub syntax_error: Option<SyntaxErrorInfo>,
    pub entities: EntityGroups,
    pub issues: Vec<Issue>,
    pub imports: Vec<Import>,
    pub types: BTreeMap<String, TypeInfo>,
    pub metrics: Metrics,
    /// Floor of the mean function complexity, 1 when there are no functions
    pub complexity: usize,
}

impl AnalysisRecord {
    pub fn failure(name: impl Into<String>, error: SyntaxErrorInfo) -> Self {
        Self {
            name: name.into(),
            success: false,
            syntax_error: Some(error),
            entities: EntityGroups::default(),
            issues: Vec::new(),
            imports: Vec::new(),
            types: BTreeMap::new(),
            metrics: Metrics::default(),
            complexity: 1,
        }
    }

    /// Build a successful record, deriving metrics and overall complexity
    pub fn from_parts(
        name: impl Into<String>,
        entities: EntityGroups,
        issues: Vec<Issue>,
        imports: Vec<Import>,
        types: BTreeMap<String, TypeInfo>,
    ) -> Self {
        let mut record = Self {
            name: name.into(),
            success: true,
            syntax_error: None,
            entities,
            issues,
            imports,
            types,
            metrics: Metrics::default(),
            complexity: 1,
        };
        record.refresh_metrics();
        record
    }

    /// Append issues found after construction (external type checker) and
    /// bring the metrics back in line.
    pub fn extend_issues(&mut self, issues: impl IntoIterator<Item = Issue>) {
        self.issues.extend(issues);
        self.refresh_metrics();
    }

    fn refresh_metrics(&mut self) {
        let mut by_severity = SeverityCounts::default();
        for issue in &self.issues {
            match issue.severity {
                Severity::Error => by_severity.error += 1,
                Severity::Warning => by_severity.warning += 1,
                Severity::Info => by_severity.info += 1,
            }
        }

        self.metrics = Metrics {
            total_entities: self.entities.len(),
            functions: self.entities.functions.len(),
            classes: self.entities.classes.len(),
            variables: self.entities.variables.len(),
            imports: self.imports.len(),
            total_lines: self.entities.iter().map(Entity::line_span).sum(),
            issues_count: self.issues.len(),
            issues_by_severity: by_severity,
        };
        self.complexity = overall_complexity(&self.entities.functions);
    }

    pub fn functions(&self) -> &[Entity] {
        &self.entities.functions
    }

    /// Line of the syntax error for failed records
    pub fn error_line(&self) -> Option<usize> {
        self.syntax_error.as_ref().map(|e| e.line)
    }

    pub fn issues_with_severity(&self, severity: Severity) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(move |issue| issue.severity == severity)
    }
}

fn overall_complexity(functions: &[Entity]) -> usize {
    if functions.is_empty() {
        return 1;
    }
    let total: usize = functions.iter().map(|f| f.complexity).sum();
    (total / functions.len()).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntityKind, IssueCategory};

    fn function(name: &str, start: usize, end: usize, complexity: usize) -> Entity {
        let mut entity = Entity::new(name, EntityKind::Function, start, end);
        entity.complexity = complexity;
        entity
    }

    #[test]
    fn test_complexity_is_floored_mean() {
        let mut entities = EntityGroups::default();
        entities.push(function("a", 1, 2, 2));
        entities.push(function("b", 4, 5, 3));
        let record = AnalysisRecord::from_parts("m.py", entities, vec![], vec![], BTreeMap::new());
        assert_eq!(record.complexity, 2);
    }

    #[test]
    fn test_metrics_aggregate() {
        let mut entities = EntityGroups::default();
        entities.push(function("a", 1, 11, 1));
        entities.push(Entity::new("C", EntityKind::Class, 13, 20));
        entities.push(Entity::new("X", EntityKind::Variable, 22, 22));
        let issues = vec![
            Issue::new(Severity::Info, IssueCategory::Maintainability, "doc", 1),
            Issue::new(Severity::Warning, IssueCategory::Maintainability, "long", 1),
        ];
        let imports = vec![Import { kind: ImportKind::Direct, name: "os".to_string() }];

        let record = AnalysisRecord::from_parts("m.py", entities, issues, imports, BTreeMap::new());
        assert_eq!(record.metrics.total_entities, 3);
        assert_eq!(record.metrics.total_lines, 10 + 7);
        assert_eq!(record.metrics.imports, 1);
        assert_eq!(record.metrics.issues_by_severity.info, 1);
        assert_eq!(record.metrics.issues_by_severity.warning, 1);
        assert_eq!(record.metrics.issues_by_severity.error, 0);
    }

    #[test]
    fn test_extend_issues_refreshes_counts() {
        let mut record =
            AnalysisRecord::from_parts("m.py", EntityGroups::default(), vec![], vec![], BTreeMap::new());
        record.extend_issues(vec![Issue::new(Severity::Error, IssueCategory::Type, "bad", 2)]);
        assert_eq!(record.metrics.issues_count, 1);
        assert_eq!(record.metrics.issues_by_severity.get(Severity::Error), 1);
    }

    #[test]
    fn test_optional_detection() {
        assert!(TypeInfo::from_annotation("a", "Optional[int]").is_optional);
        assert!(TypeInfo::from_annotation("a", "int | None").is_optional);
        assert!(!TypeInfo::from_annotation("a", "List[int]").is_optional);
        assert!(TypeInfo::from_annotation("a", "Union[int, None]").is_optional);
        assert!(TypeInfo::from_annotation("a", "typing.Union[Dict[str, int], None]").is_optional);
        assert!(!TypeInfo::from_annotation("a", "Union[int, str]").is_optional);
        assert!(!TypeInfo::from_annotation("a", "Union[Dict[None, int], str]").is_optional);
    }

    #[test]
    fn test_record_serializes_to_flat_mapping() {
        let record = AnalysisRecord::failure(
            "bad.py",
            SyntaxErrorInfo { message: "invalid syntax".to_string(), line: 2, column: 5 },
        );
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["syntax_error"]["line"], 2);
        assert!(value["entities"]["function"].as_array().unwrap().is_empty());
    }
}
