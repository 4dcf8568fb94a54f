//! Prompt builders for the four model phases

use crate::types::{IntentUnderstanding, ReasoningStep, TransformationKind};
use codeshift_core::AnalysisRecord;
use std::fmt::Write;

/// Steps quoted in the explanation prompt
pub const EXPLANATION_STEP_LIMIT: usize = 3;

fn python_block(source: &str) -> String {
    format!("```python\n{}\n```", source.trim_end())
}

pub fn intent_prompt(intent: &str, source: &str, context: Option<&str>) -> String {
    let context = context
        .filter(|c| !c.trim().is_empty())
        .map(|c| format!("\nContext: {c}\n"))
        .unwrap_or_default();

    format!(
        "Analyze the intent behind this code transformation request.\n\
         \n\
         Intent: \"{intent}\"\n\
         \n\
         Code to transform:\n\
         {code}\n\
         {context}\n\
         Identify:\n\
         1. PRIMARY goal: what the change is mainly for (refactor, optimize, fix, feature, ...)\n\
         2. CONSTRAINTS: what must be preserved (API compatibility, performance, ...)\n\
         3. PATTERNS: design patterns or idioms involved\n\
         4. RISKS: breaking changes, performance or security concerns\n\
         5. DEPENDENCIES: relevant external libraries or internal modules\n\
         \n\
         Answer each point with '-' bullet lines under its label.\n",
        code = python_block(source),
    )
}

/// Complexity, function count and issue count of an analysis
pub fn analysis_digest(record: Option<&AnalysisRecord>) -> String {
    match record {
        Some(record) if record.success => format!(
            "- Complexity: {}\n- Functions: {}\n- Issues: {}",
            record.complexity,
            record.metrics.functions,
            record.issues.len()
        ),
        Some(record) => format!(
            "- Source does not parse: {}",
            record
                .syntax_error
                .as_ref()
                .map_or_else(|| "unknown error".to_string(), ToString::to_string)
        ),
        None => "- Analysis unavailable".to_string(),
    }
}

pub fn reasoning_prompt(
    intent: &str,
    kind: TransformationKind,
    analysis: Option<&AnalysisRecord>,
    understanding: &IntentUnderstanding,
    source: &str,
) -> String {
    format!(
        "You are planning a code transformation. Think step by step.\n\
         \n\
         INTENT: {intent}\n\
         TRANSFORMATION TYPE: {kind}\n\
         \n\
         CURRENT CODE ANALYSIS:\n\
         {digest}\n\
         \n\
         UNDERSTANDING:\n\
         - Goal: {goal}\n\
         - Constraints: {constraints}\n\
         - Risks: {risks}\n\
         \n\
         CODE:\n\
         {code}\n\
         \n\
         Write a numbered plan, one step per line (\"1. ...\"). Cover what\n\
         specifically has to change, the order of the changes, edge cases and\n\
         risks, and how the constraints stay satisfied. After each step add a\n\
         line \"Action: <what to do>\".\n",
        kind = kind.as_str(),
        digest = analysis_digest(analysis),
        goal = understanding.primary_goal,
        constraints = understanding.constraints,
        risks = understanding.risks,
        code = python_block(source),
    )
}

pub fn generation_prompt(steps: &[ReasoningStep], source: &str) -> String {
    let mut plan = String::new();
    for step in steps {
        let _ = writeln!(plan, "Step {}: {}\nAction: {}", step.step_num, step.thought, step.action);
    }

    format!(
        "Apply this plan to the code below.\n\
         \n\
         {plan}\n\
         ORIGINAL CODE:\n\
         {code}\n\
         \n\
         Produce the COMPLETE transformed code. It must be valid Python,\n\
         implement every step and keep existing interfaces unless the plan\n\
         changes them on purpose. Return only the code inside a single\n\
         ```python block.\n",
        code = python_block(source),
    )
}

pub fn explanation_prompt(steps: &[ReasoningStep], kind: TransformationKind) -> String {
    let reasoning: String = steps
        .iter()
        .take(EXPLANATION_STEP_LIMIT)
        .map(|step| format!("- {}\n", step.thought))
        .collect();

    format!(
        "Summarize this code transformation in 2-3 sentences.\n\
         \n\
         Transformation Type: {kind}\n\
         \n\
         Reasoning:\n\
         {reasoning}\n\
         Be clear and concise.\n",
        kind = kind.as_str(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_prompt_contents() {
        let prompt = intent_prompt("add a docstring", "def f(x):\n return x+1", Some("pure"));
        assert!(prompt.contains("Intent: \"add a docstring\""));
        assert!(prompt.contains("```python\ndef f(x):\n return x+1\n```"));
        assert!(prompt.contains("Context: pure"));
        for label in crate::parsing::UNDERSTANDING_LABELS {
            assert!(prompt.contains(label), "missing {label}");
        }
        assert!(!intent_prompt("x", "y", None).contains("Context:"));
    }

    #[test]
    fn test_generation_prompt_lists_steps() {
        let mut step = ReasoningStep::new(1, "Add docs");
        step.action = "insert docstring".to_string();
        let prompt = generation_prompt(&[step], "def f(): pass");
        assert!(prompt.contains("Step 1: Add docs\nAction: insert docstring"));
    }

    #[test]
    fn test_explanation_prompt_quotes_first_three_thoughts() {
        let steps: Vec<ReasoningStep> = (1..=5)
            .map(|i| ReasoningStep::new(i, format!("thought {i}")))
            .collect();
        let prompt = explanation_prompt(&steps, TransformationKind::Document);
        assert!(prompt.contains("- thought 3"));
        assert!(!prompt.contains("- thought 4"));
        assert!(prompt.contains("Transformation Type: document"));
    }

    #[test]
    fn test_digest_without_analysis() {
        assert_eq!(analysis_digest(None), "- Analysis unavailable");
    }
}
