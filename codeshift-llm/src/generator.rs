//! The text-generation seam

use crate::{GenerationOptions, LlmResult};
use async_trait::async_trait;
use std::pin::Pin;
use tokio_stream::Stream;
use tracing::debug;

/// Incremental text chunks; the stream ends when generation is done
pub type TextStream = Pin<Box<dyn Stream<Item = LlmResult<String>> + Send>>;

/// Anything that turns a prompt into text
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Complete reply for `prompt`
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> LlmResult<String>;

    /// Reply delivered in chunks. Backends without native streaming yield
    /// the whole reply as a single chunk.
    async fn generate_stream(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> LlmResult<TextStream> {
        let reply = self.generate(prompt, options).await;
        Ok(Box::pin(tokio_stream::iter(vec![reply])))
    }

    /// One independent request per prompt; a failure only affects its own slot
    async fn batch_generate(
        &self,
        prompts: &[String],
        options: &GenerationOptions,
    ) -> Vec<LlmResult<String>> {
        let mut results = Vec::with_capacity(prompts.len());
        for (i, prompt) in prompts.iter().enumerate() {
            let result = self.generate(prompt, options).await;
            debug!("Batch generation {}/{} complete", i + 1, prompts.len());
            results.push(result);
        }
        results
    }

    /// Short backend label for logs and reports
    fn backend_name(&self) -> &str;
}
