//! The transformation pipeline
//!
//! `transform` runs the phases strictly in order. Model phases propagate
//! backend failures as [`crate::TransformError::Generation`]; analysis and
//! validation never fail the call.

use crate::confidence::ConfidenceModel;
use crate::parsing::{extract_code_block, parse_reasoning_steps, parse_understanding};
use crate::prompts;
use crate::types::{IntentUnderstanding, ReasoningStep, TransformationKind, TransformationResult};
use crate::validation::validate_code;
use crate::Result;
use codeshift_core::{AnalysisRecord, StructuralAnalyzer};
use codeshift_llm::{GenerationOptions, TextGenerator};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Holds no per-call state, so one reasoner can serve many concurrent
/// `transform` calls.
#[derive(Clone)]
pub struct TransformationReasoner {
    generator: Arc<dyn TextGenerator>,
    analyzer: StructuralAnalyzer,
    confidence: ConfidenceModel,
    options: GenerationOptions,
}

impl TransformationReasoner {
    pub fn new(generator: Arc<dyn TextGenerator>, analyzer: StructuralAnalyzer) -> Self {
        Self {
            generator,
            analyzer,
            confidence: ConfidenceModel::default(),
            options: GenerationOptions::default(),
        }
    }

    pub fn with_confidence_model(mut self, confidence: ConfidenceModel) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_generation_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn analyzer(&self) -> &StructuralAnalyzer {
        &self.analyzer
    }

    pub fn confidence_model(&self) -> &ConfidenceModel {
        &self.confidence
    }

    pub fn backend_name(&self) -> &str {
        self.generator.backend_name()
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        Ok(self.generator.generate(prompt, &self.options).await?)
    }

    /// Transform `source` according to `intent`
    pub async fn transform(
        &self,
        source: &str,
        intent: &str,
        kind: TransformationKind,
        context: Option<&str>,
    ) -> Result<TransformationResult> {
        info!("Step 1: Analyzing code structure...");
        let analysis = self.analyze_source(source).await;
        let issues = analysis
            .as_ref()
            .map(|record| record.issues.clone())
            .unwrap_or_default();

        info!("Step 2: Understanding intent...");
        let understanding = self.understand_intent(intent, source, context).await?;

        info!("Step 3: Reasoning about transformation...");
        let steps = self
            .reason(intent, kind, analysis.as_ref(), &understanding, source)
            .await?;

        info!("Step 4: Generating transformed code...");
        let transformed = self.generate_code(&steps, source).await?;

        info!("Step 5: Validating generated code...");
        let validation_errors = validate_code(&self.analyzer, &transformed).await;

        info!("Step 6: Calculating confidence score...");
        let confidence = self
            .confidence
            .score(&steps, validation_errors.len(), issues.len());

        info!("Step 7: Generating explanation...");
        let explanation = self.explain(&steps, kind).await?;

        let success = self.confidence.is_success(validation_errors.len(), confidence);
        info!(
            "Transformation finished: success={}, confidence={:.2}, {} validation errors",
            success,
            confidence,
            validation_errors.len()
        );

        Ok(TransformationResult {
            success,
            original_code: source.to_string(),
            transformed_code: Some(transformed),
            kind,
            understanding,
            reasoning_steps: steps,
            issues,
            validation_errors,
            confidence,
            explanation,
        })
    }

    /// Independent `transform` calls, one result per source in input order
    pub async fn transform_batch(
        &self,
        sources: &[String],
        intent: &str,
        kind: TransformationKind,
    ) -> Vec<Result<TransformationResult>> {
        let mut results = Vec::with_capacity(sources.len());
        for (i, source) in sources.iter().enumerate() {
            let result = self.transform(source, intent, kind, None).await;
            if let Err(e) = &result {
                warn!("Batch item {} failed: {}", i + 1, e);
            }
            results.push(result);
        }
        results
    }

    /// Phase 1. Unparseable source still yields a record; only a parser
    /// set-up failure yields `None`.
    async fn analyze_source(&self, source: &str) -> Option<AnalysisRecord> {
        match self.analyzer.analyze(source, "<input>").await {
            Ok(record) => {
                if !record.success {
                    debug!("Input does not parse, continuing without issues");
                }
                Some(record)
            }
            Err(e) => {
                warn!("Analysis unavailable: {}", e);
                None
            }
        }
    }

    pub async fn understand_intent(
        &self,
        intent: &str,
        source: &str,
        context: Option<&str>,
    ) -> Result<IntentUnderstanding> {
        let reply = self
            .complete(&prompts::intent_prompt(intent, source, context))
            .await?;
        Ok(parse_understanding(&reply))
    }

    pub async fn reason(
        &self,
        intent: &str,
        kind: TransformationKind,
        analysis: Option<&AnalysisRecord>,
        understanding: &IntentUnderstanding,
        source: &str,
    ) -> Result<Vec<ReasoningStep>> {
        let prompt = prompts::reasoning_prompt(intent, kind, analysis, understanding, source);
        let reply = self.complete(&prompt).await?;
        let steps = parse_reasoning_steps(&reply);
        debug!("Parsed {} reasoning steps", steps.len());
        Ok(steps)
    }

    /// Code from the first fenced block of the reply, or `source` unchanged
    /// when the reply has none
    pub async fn generate_code(&self, steps: &[ReasoningStep], source: &str) -> Result<String> {
        let reply = self
            .complete(&prompts::generation_prompt(steps, source))
            .await?;
        Ok(extract_code_block(&reply).unwrap_or_else(|| {
            debug!("No code block in generation reply, keeping original source");
            source.to_string()
        }))
    }

    pub async fn explain(&self, steps: &[ReasoningStep], kind: TransformationKind) -> Result<String> {
        self.complete(&prompts::explanation_prompt(steps, kind)).await
    }
}
