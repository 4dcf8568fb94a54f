use codeshift_core::{AnalyzerConfig, Severity, StructuralAnalyzer};
use codeshift_llm::{LlmError, ScriptedGenerator};
use codeshift_transform::{TransformError, TransformationKind, TransformationReasoner};
use std::sync::Arc;

const SOURCE: &str = "def f(x):\n return x+1";

const UNDERSTANDING: &str = "1. PRIMARY goal: document f\n2. CONSTRAINTS:\n- keep behaviour\n";
const PLAN: &str = "1. Add a docstring to f\nAction: insert docstring\n2. Keep the body unchanged\nAction: none\n";
const DOCUMENTED: &str = "Here you go:\n```python\ndef f(x):\n    \"\"\"Return x plus one.\"\"\"\n    return x + 1\n```\n";
const EXPLANATION: &str = "Added a docstring to f.";

fn analyzer() -> StructuralAnalyzer {
    StructuralAnalyzer::new(AnalyzerConfig {
        type_check: false,
        ..AnalyzerConfig::default()
    })
}

fn reasoner_with(generator: Arc<ScriptedGenerator>) -> TransformationReasoner {
    TransformationReasoner::new(generator, analyzer())
}

#[tokio::test]
async fn test_document_transformation_end_to_end() {
    let generator = Arc::new(ScriptedGenerator::new([
        UNDERSTANDING,
        PLAN,
        DOCUMENTED,
        EXPLANATION,
    ]));
    let reasoner = reasoner_with(Arc::clone(&generator));

    let result = reasoner
        .transform(SOURCE, "add a docstring", TransformationKind::Document, None)
        .await
        .unwrap();

    // Pre-transformation analysis: one undocumented function
    assert_eq!(result.issues.len(), 1);
    assert_eq!(result.issues[0].severity, Severity::Info);

    assert_eq!(result.understanding.primary_goal, "document f");
    assert_eq!(result.understanding.constraints, "- keep behaviour");
    assert_eq!(result.understanding.risks, "Not found");

    assert_eq!(result.reasoning_steps.len(), 2);
    assert_eq!(result.reasoning_steps[0].action, "insert docstring");

    let transformed = result.transformed_code.as_deref().unwrap();
    assert!(transformed.contains("\"\"\"Return x plus one.\"\"\""));
    assert!(result.changed());
    assert!(result.validation_errors.is_empty());

    assert!((0.0..=1.0).contains(&result.confidence));
    assert!((result.confidence - 0.9).abs() < 1e-9);
    assert!(result.success);
    assert_eq!(result.explanation, EXPLANATION);

    let prompts = generator.prompts();
    assert_eq!(prompts.len(), 4);
    assert!(prompts[0].contains("add a docstring"));
    assert!(prompts[1].contains("TRANSFORMATION TYPE: document"));
    assert!(prompts[1].contains("- Functions: 1"));
    assert!(prompts[2].contains("Step 1: Add a docstring to f\nAction: insert docstring"));
    assert!(prompts[3].contains("- Add a docstring to f"));
}

#[tokio::test]
async fn test_syntax_error_in_generated_code_forces_failure() {
    let broken = "```python\ndef f(x)\n    return x\n```";
    let generator = Arc::new(ScriptedGenerator::new([UNDERSTANDING, PLAN, broken, EXPLANATION]));
    let result = reasoner_with(generator)
        .transform(SOURCE, "add a docstring", TransformationKind::Document, None)
        .await
        .unwrap();

    assert!(!result.validation_errors.is_empty());
    assert!(result.validation_errors[0].starts_with("Syntax error at line"));
    assert!(!result.success);
    // Partial progress is kept
    assert_eq!(result.reasoning_steps.len(), 2);
    assert_eq!(result.transformed_code.as_deref(), Some("def f(x)\n    return x"));
    assert!((result.confidence - 0.7).abs() < 1e-9);
}

#[tokio::test]
async fn test_python2_output_fails_validation() {
    let legacy = "```python\ndef f(x):\n    print \"x\"\n    return x + 1\n```";
    let generator = Arc::new(ScriptedGenerator::new([UNDERSTANDING, PLAN, legacy, EXPLANATION]));
    let result = reasoner_with(generator)
        .transform(SOURCE, "add a docstring", TransformationKind::Document, None)
        .await
        .unwrap();

    assert_eq!(result.validation_errors.len(), 1);
    assert!(result.validation_errors[0].starts_with("Syntax error at line 2:"));
    assert!(!result.success);
}

#[tokio::test]
async fn test_missing_code_block_falls_back_to_original() {
    let generator = Arc::new(ScriptedGenerator::new([
        UNDERSTANDING,
        PLAN,
        "I would add a docstring.",
        EXPLANATION,
    ]));
    let result = reasoner_with(generator)
        .transform(SOURCE, "add a docstring", TransformationKind::Document, None)
        .await
        .unwrap();

    assert_eq!(result.transformed_code.as_deref(), Some(SOURCE));
    assert!(!result.changed());
    assert!(result.validation_errors.is_empty());
}

#[tokio::test]
async fn test_unstructured_plan_lowers_confidence() {
    let generator = Arc::new(ScriptedGenerator::new([
        UNDERSTANDING,
        "Just add a docstring.",
        DOCUMENTED,
        EXPLANATION,
    ]));
    let result = reasoner_with(generator)
        .transform(SOURCE, "add a docstring", TransformationKind::Document, None)
        .await
        .unwrap();

    assert_eq!(result.reasoning_steps.len(), 1);
    assert!(result.validation_errors.is_empty());
    assert!((result.confidence - 0.4).abs() < 1e-9);
    assert!(!result.success);
}

#[tokio::test]
async fn test_generation_fault_propagates() {
    let generator = Arc::new(ScriptedGenerator::new([UNDERSTANDING]));
    generator.push_error(LlmError::Unavailable("connection refused".to_string()));

    let error = reasoner_with(generator)
        .transform(SOURCE, "add a docstring", TransformationKind::Document, None)
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        TransformError::Generation(LlmError::Unavailable(_))
    ));
}

#[tokio::test]
async fn test_unparseable_input_still_runs_pipeline() {
    let generator = Arc::new(ScriptedGenerator::new([UNDERSTANDING, PLAN, DOCUMENTED, EXPLANATION]));
    let result = reasoner_with(generator)
        .transform("def f(x:\n", "fix it", TransformationKind::FixBug, None)
        .await
        .unwrap();
    assert!(result.issues.is_empty());
    assert!(result.validation_errors.is_empty());
    assert!(result.success);
}

#[tokio::test]
async fn test_batch_isolates_faults() {
    let generator = Arc::new(
        ScriptedGenerator::new([UNDERSTANDING, PLAN, DOCUMENTED, EXPLANATION])
            .with_fallback(PLAN),
    );
    generator.push_error(LlmError::Inference("overloaded".to_string()));

    let sources = vec![SOURCE.to_string(), SOURCE.to_string(), SOURCE.to_string()];
    let results = reasoner_with(generator)
        .transform_batch(&sources, "add a docstring", TransformationKind::Document)
        .await;

    assert_eq!(results.len(), 3);
    assert!(results[0].as_ref().unwrap().success);
    assert!(results[1].is_err());
    assert!(results[2].is_ok());
}

#[test]
fn test_result_serializes_to_flat_mapping() {
    let result = codeshift_transform::TransformationResult {
        success: false,
        original_code: "x = 1".to_string(),
        transformed_code: None,
        kind: TransformationKind::FixBug,
        understanding: codeshift_transform::parsing::parse_understanding(""),
        reasoning_steps: Vec::new(),
        issues: Vec::new(),
        validation_errors: vec!["Syntax error at line 1: invalid syntax".to_string()],
        confidence: 0.3,
        explanation: String::new(),
    };
    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["kind"], "fix_bug");
    assert!(value["transformed_code"].is_null());
    assert_eq!(value["validation_errors"][0], "Syntax error at line 1: invalid syntax");
}
