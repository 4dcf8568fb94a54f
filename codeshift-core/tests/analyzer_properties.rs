use codeshift_core::{AnalysisThresholds, AnalyzerConfig, EntityKind, Severity, StructuralAnalyzer};
use proptest::prelude::*;

fn analyzer() -> StructuralAnalyzer {
    StructuralAnalyzer::new(AnalyzerConfig {
        type_check: false,
        ..AnalyzerConfig::default()
    })
}

fn function_complexity(source: &str) -> usize {
    let record = analyzer().analyze_structure(source, "test.py").unwrap();
    record.functions()[0].complexity
}

#[test]
fn test_complexity_increments() {
    let plain = "def f(a, b, c):\n    return a\n";
    let one_if = "def f(a, b, c):\n    if a:\n        return b\n    return a\n";
    let three_operands = "def f(a, b, c):\n    return a or b or c\n";

    assert_eq!(function_complexity(plain), 1);
    assert_eq!(function_complexity(one_if), function_complexity(plain) + 1);
    assert_eq!(function_complexity(three_operands), function_complexity(plain) + 2);
}

#[test]
fn test_module_without_functions_has_complexity_one() {
    let record = analyzer()
        .analyze_structure("X = 1\nclass A:\n    pass\n", "m.py")
        .unwrap();
    assert!(record.success);
    assert!(record.functions().is_empty());
    assert_eq!(record.complexity, 1);
}

#[test]
fn test_end_to_end_single_function() {
    let record = analyzer()
        .analyze_structure("def f(x):\n return x+1", "f.py")
        .unwrap();
    assert!(record.success);
    assert_eq!(record.entities.of_kind(EntityKind::Function).len(), 1);
    assert_eq!(record.functions()[0].complexity, 1);
    assert_eq!(record.functions()[0].parameters, vec!["x"]);

    let infos: Vec<_> = record.issues_with_severity(Severity::Info).collect();
    assert_eq!(infos.len(), 1);
    assert!(infos[0].message.contains("Missing docstring"));
}

#[tokio::test]
async fn test_large_complex_file_gets_size_and_complexity_suggestions() {
    let mut source = String::from("def process(v):\n");
    for i in 0..7 {
        source.push_str(&format!("    if v == {i}:\n        v += 1\n"));
    }
    while source.lines().count() < 599 {
        source.push_str("    v = v * 2\n");
    }
    source.push_str("    return v\n");
    assert_eq!(source.lines().count(), 600);

    let analyzer = analyzer();
    let record = analyzer.analyze(&source, "big.py").await.unwrap();
    assert_eq!(record.functions().len(), 1);
    assert_eq!(record.complexity, 8);
    assert!(record.metrics.total_lines > AnalysisThresholds::LARGE_FILE_LINES);

    let suggestions = analyzer.suggest_refactoring(&source).await.unwrap();
    assert!(suggestions
        .iter()
        .any(|s| s == "Consider reducing complexity by breaking into smaller functions"));
    assert!(suggestions
        .iter()
        .any(|s| s == "File is large. Consider splitting into modules"));
}

#[tokio::test]
async fn test_crowded_module_suggestion() {
    let source: String = (0..31)
        .map(|i| format!("def f{i}():\n    \"\"\"Doc.\"\"\"\n    return {i}\n\n"))
        .collect();
    let suggestions = analyzer().suggest_refactoring(&source).await.unwrap();
    assert_eq!(
        suggestions,
        vec!["Too many functions in one module. Consider better organization".to_string()]
    );
}

#[test]
fn test_docstring_indented_with_non_ascii_space() {
    let source = "def f():\n    \"\"\"Title\n    \u{a0}x\n     y\n    \"\"\"\n    return 1\n";
    let record = analyzer().analyze_structure(source, "nbsp.py").unwrap();
    assert!(record.success);
    assert_eq!(
        record.functions()[0].docstring.as_deref(),
        Some("Title\n\u{a0}x\n y")
    );
}

#[tokio::test]
async fn test_python2_print_fails_analysis() {
    let record = analyzer().analyze("x = 1\nprint \"hello\"\n", "py2.py").await.unwrap();
    assert!(!record.success);
    assert_eq!(record.error_line(), Some(2));
}

proptest! {
    #[test]
    fn prop_analysis_never_panics(source in "\\PC{0,120}") {
        let record = analyzer().analyze_structure(&source, "any.py").unwrap();
        prop_assert_eq!(record.success, record.syntax_error.is_none());
    }

    #[test]
    fn prop_docstring_indentation_never_panics(
        indent in prop::collection::vec(prop::sample::select(vec![" ", "\t", "\u{a0}", "\u{3000}", "\u{2003}"]), 0..6),
        body in "[a-z ]{0,10}",
    ) {
        let pad: String = indent.concat();
        let source = format!(
            "def f():\n    \"\"\"Title\n{pad}{body}\n    {pad}tail\n    \"\"\"\n    return 1\n"
        );
        let _ = analyzer().analyze_structure(&source, "doc.py").unwrap();
    }

    #[test]
    fn prop_invalid_source_yields_failure_record(
        name in "[a-z][a-z0-9_]{0,8}",
        prefix_lines in 0usize..5,
    ) {
        let mut source: String = (0..prefix_lines).map(|i| format!("v{i} = {i}\n")).collect();
        source.push_str(&format!("def {name}(:\n    return (\n"));

        let record = analyzer().analyze_structure(&source, "bad.py").unwrap();
        prop_assert!(!record.success);
        prop_assert!(record.error_line().is_some());
        prop_assert!(record.entities.is_empty());
        prop_assert!(record.issues.is_empty());
        prop_assert!(record.imports.is_empty());
    }
}
