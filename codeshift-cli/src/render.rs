//! Text, markdown and JSON rendering of analysis records and
//! transformation results

use clap::ValueEnum;
use codeshift_core::analyzer::refactoring_suggestions;
use codeshift_core::{AnalysisRecord, AnalysisThresholds, Entity, EntityKind, Severity};
use codeshift_transform::TransformationResult;
use codeshift_utils::truncate_chars;

const DOCSTRING_PREVIEW_CHARS: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Markdown,
    Json,
}

pub fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn analysis(record: &AnalysisRecord, format: OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Text => analysis_text(record),
        OutputFormat::Markdown => documentation_markdown(
            record,
            &format!("Code Analysis: {}", record.name),
            &timestamp(),
        ),
        OutputFormat::Json => serde_json::to_string_pretty(record)?,
    })
}

pub fn transformation(result: &TransformationResult, format: OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Text => transformation_text(result),
        OutputFormat::Markdown => transformation_markdown(result, &timestamp()),
        OutputFormat::Json => serde_json::to_string_pretty(result)?,
    })
}

fn first_line(text: &str) -> &str {
    text.lines().find(|line| !line.trim().is_empty()).unwrap_or("").trim()
}

fn complexity_line(complexity: usize) -> String {
    format!(
        "Complexity: {}/10 ({})",
        complexity,
        AnalysisThresholds::complexity_status(complexity)
    )
}

fn plural_heading(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Function => "Functions",
        EntityKind::Class => "Classes",
        EntityKind::Variable => "Variables",
    }
}

fn entity_kinds() -> [EntityKind; 3] {
    [EntityKind::Function, EntityKind::Class, EntityKind::Variable]
}

pub fn analysis_text(record: &AnalysisRecord) -> String {
    if let Some(error) = &record.syntax_error {
        return format!("❌ Analysis failed: {}: {}", record.name, error);
    }

    let metrics = &record.metrics;
    let mut lines = vec![
        format!("📊 Analysis of {}", record.name),
        format!(
            "Functions: {}  Classes: {}  Variables: {}  Imports: {}",
            metrics.functions, metrics.classes, metrics.variables, metrics.imports
        ),
        complexity_line(record.complexity),
    ];

    for kind in [EntityKind::Function, EntityKind::Class] {
        let entities = record.entities.of_kind(kind);
        if entities.is_empty() {
            continue;
        }
        lines.push(String::new());
        lines.push(format!("{}:", plural_heading(kind)));
        for entity in entities {
            lines.push(entity_text(entity));
        }
    }

    lines.push(String::new());
    if record.issues.is_empty() {
        lines.push("✅ No issues found".to_string());
    } else {
        lines.push(format!("Issues ({}):", record.issues.len()));
        for issue in &record.issues {
            lines.push(format!(
                "  [{}] line {}: {}",
                issue.severity, issue.line, issue.message
            ));
        }
    }

    lines.join("\n")
}

fn entity_text(entity: &Entity) -> String {
    let mut line = format!("  {} (lines {}-{}", entity.name, entity.line_start, entity.line_end);
    if entity.kind == EntityKind::Function {
        line.push_str(&format!(", complexity {}", entity.complexity));
    }
    line.push(')');
    if let Some(doc) = entity.docstring.as_deref() {
        line.push_str(" - ");
        line.push_str(&truncate_chars(first_line(doc), DOCSTRING_PREVIEW_CHARS));
    }
    line
}

/// Per-entity documentation page
pub fn documentation_markdown(record: &AnalysisRecord, title: &str, timestamp: &str) -> String {
    let mut lines = vec![
        format!("# {title}"),
        String::new(),
        "## Overview".to_string(),
        format!("Generated on {timestamp}"),
        String::new(),
        "## Entities".to_string(),
    ];

    for kind in entity_kinds() {
        let entities = record.entities.of_kind(kind);
        if entities.is_empty() {
            continue;
        }
        lines.push(String::new());
        lines.push(format!("### {}", plural_heading(kind)));
        for entity in entities {
            lines.push(format!(
                "- **{}** (line {}-{})",
                entity.name, entity.line_start, entity.line_end
            ));
            if let Some(doc) = entity.docstring.as_deref().filter(|d| !d.trim().is_empty()) {
                lines.push(format!("  > {}", first_line(doc)));
            }
            if !entity.parameters.is_empty() {
                lines.push(format!("  - Parameters: {}", entity.parameters.join(", ")));
            }
            if let Some(return_type) = &entity.return_type {
                lines.push(format!("  - Returns: {return_type}"));
            }
            if entity.complexity > 1 {
                lines.push(format!("  - Complexity: {}", entity.complexity));
            }
        }
    }

    let metrics = &record.metrics;
    lines.extend([
        String::new(),
        "## Metrics".to_string(),
        format!("- Total Entities: {}", metrics.total_entities),
        format!("- Functions: {}", metrics.functions),
        format!("- Classes: {}", metrics.classes),
        format!("- Imports: {}", metrics.imports),
        format!("- Overall Complexity: {}/10", record.complexity),
        String::new(),
        "## Code Quality".to_string(),
    ]);

    if record.issues.is_empty() {
        lines.push("✓ No major issues found".to_string());
    } else {
        lines.push(format!("Found {} issue(s):", record.issues.len()));
        for issue in &record.issues {
            lines.push(format!(
                "- **{}** ({}): {} (line {})",
                issue.severity.as_str().to_uppercase(),
                issue.category,
                issue.message,
                issue.line
            ));
            if let Some(suggestion) = &issue.suggestion {
                lines.push(format!("  → {suggestion}"));
            }
        }
    }

    lines.push(String::new());
    lines.join("\n")
}

/// Issue and metric report with recommendations
pub fn report_markdown(record: &AnalysisRecord, timestamp: &str) -> String {
    let metrics = &record.metrics;
    let mut lines = vec![
        "# Code Analysis Report".to_string(),
        String::new(),
        format!("Generated: {timestamp}"),
        String::new(),
        "## Summary".to_string(),
        format!("- **Source**: {}", record.name),
        format!("- **Total Issues**: {}", record.issues.len()),
        format!("- **Complexity**: {}", record.complexity),
        String::new(),
        "## Issues".to_string(),
    ];

    for (severity, heading) in [(Severity::Error, "Critical Issues"), (Severity::Warning, "Warnings")] {
        let issues: Vec<_> = record.issues_with_severity(severity).collect();
        if issues.is_empty() {
            continue;
        }
        lines.push(format!("### {heading} ({})", issues.len()));
        for issue in issues {
            lines.push(format!("- [{}] {}", issue.line, issue.message));
        }
    }
    let info = metrics.issues_by_severity.info;
    if info > 0 {
        lines.push(format!("{info} informational issue(s) not listed"));
    }

    lines.extend([
        String::new(),
        "## Metrics".to_string(),
        format!("- **total_entities**: {}", metrics.total_entities),
        format!("- **functions**: {}", metrics.functions),
        format!("- **classes**: {}", metrics.classes),
        format!("- **variables**: {}", metrics.variables),
        format!("- **imports**: {}", metrics.imports),
        format!("- **total_lines**: {}", metrics.total_lines),
        format!("- **issues_count**: {}", metrics.issues_count),
        String::new(),
        "## Recommendations".to_string(),
    ]);

    let suggestions = refactoring_suggestions(record);
    if suggestions.is_empty() {
        lines.push("No structural changes recommended.".to_string());
    } else {
        lines.push("Based on the analysis, consider:".to_string());
        for (i, suggestion) in suggestions.iter().enumerate() {
            lines.push(format!("{}. {}", i + 1, suggestion));
        }
    }

    lines.push(String::new());
    lines.join("\n")
}

pub fn report_summary(record: &AnalysisRecord) -> String {
    [
        "## Summary:".to_string(),
        format!("  Functions: {}", record.metrics.functions),
        format!("  Classes: {}", record.metrics.classes),
        format!("  {}", complexity_line(record.complexity)),
        format!("  Issues: {}", record.issues.len()),
    ]
    .join("\n")
}

pub fn transformation_text(result: &TransformationResult) -> String {
    let mut lines = vec![format!(
        "✓ Transformation confidence: {:.0}%",
        result.confidence * 100.0
    )];
    if result.success {
        lines.push("✓ Transformation successful".to_string());
    } else {
        lines.push("❌ Transformation failed".to_string());
    }

    lines.push(String::new());
    lines.push("## Reasoning:".to_string());
    for step in &result.reasoning_steps {
        lines.push(format!("  Step {}: {}", step.step_num, step.thought));
    }

    if let Some(code) = &result.transformed_code {
        lines.extend([
            String::new(),
            "## Transformed Code:".to_string(),
            "```python".to_string(),
            code.clone(),
            "```".to_string(),
        ]);
    }

    if !result.validation_errors.is_empty() {
        lines.push(String::new());
        lines.push("⚠️ Validation warnings:".to_string());
        for error in &result.validation_errors {
            lines.push(format!("  - {error}"));
        }
    }

    if !result.explanation.trim().is_empty() {
        lines.push(String::new());
        lines.push("## Explanation:".to_string());
        lines.push(result.explanation.trim().to_string());
    }

    lines.join("\n")
}

pub fn transformation_markdown(result: &TransformationResult, timestamp: &str) -> String {
    let status = if result.success { "✓ Success" } else { "✗ Failed" };
    let mut lines = vec![
        "# Code Transformation Report".to_string(),
        String::new(),
        format!("Generated: {timestamp}"),
        format!("Type: {}", result.kind.display_name()),
        format!("Status: {status}"),
        format!("Confidence: {:.0}%", result.confidence * 100.0),
        String::new(),
        "## Transformation Process".to_string(),
    ];

    for step in &result.reasoning_steps {
        lines.push(String::new());
        lines.push(format!("### Step {}: {}", step.step_num, step.thought));
        lines.push(format!("**Action**: {}", step.action));
        if let Some(snippet) = &step.code_snippet {
            lines.extend(["```python".to_string(), snippet.clone(), "```".to_string()]);
        }
    }

    lines.extend([String::new(), "## Result".to_string(), result.explanation.trim().to_string()]);

    lines.push(String::new());
    if result.validation_errors.is_empty() {
        lines.push("## Validation".to_string());
        lines.push("✓ Code passed all validation checks".to_string());
    } else {
        lines.push("## Validation Issues".to_string());
        for error in &result.validation_errors {
            lines.push(format!("- ⚠️ {error}"));
        }
    }

    lines.push(String::new());
    lines.join("\n")
}
