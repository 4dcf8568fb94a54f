//! Ollama HTTP backend
//!
//! Talks to `POST /api/generate`. Blocking requests send `stream: false`
//! and read one JSON object; streaming requests read newline-delimited JSON
//! objects, each carrying a `response` fragment, until `done` is true.

use crate::{GenerationOptions, LlmError, LlmResult, TextGenerator, TextStream};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};

/// Ollama connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Ollama server URL
    pub server_url: String,
    /// Model tag, e.g. `mistral`
    pub model: String,
    pub timeout: Duration,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:11434".to_string(),
            model: "mistral".to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

/// Sampling options in Ollama's vocabulary
#[derive(Debug, Serialize)]
struct OllamaOptions {
    num_predict: usize,
    temperature: f32,
    top_p: f32,
    top_k: u32,
    repeat_penalty: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop: Vec<String>,
}

impl From<&GenerationOptions> for OllamaOptions {
    fn from(options: &GenerationOptions) -> Self {
        Self {
            num_predict: options.max_length,
            temperature: options.temperature,
            top_p: options.top_p,
            top_k: options.top_k,
            repeat_penalty: options.repetition_penalty,
            seed: options.seed,
            stop: options.stop.clone(),
        }
    }
}

/// Ollama API request structure
#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    options: OllamaOptions,
    stream: bool,
}

/// One response object (the whole reply, or one streamed fragment)
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    #[serde(default)]
    response: String,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

pub struct OllamaClient {
    config: OllamaConfig,
    client: Client,
}

impl OllamaClient {
    pub fn new(config: OllamaConfig) -> LlmResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.server_url.trim_end_matches('/'), path)
    }

    /// Check if Ollama is available and running
    pub async fn is_available(&self) -> bool {
        match self.client.get(self.endpoint("/api/tags")).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    async fn send(
        &self,
        prompt: &str,
        options: &GenerationOptions,
        stream: bool,
    ) -> LlmResult<reqwest::Response> {
        options.validate()?;
        let request = OllamaRequest {
            model: &self.config.model,
            prompt,
            options: options.into(),
            stream,
        };

        let response = self
            .client
            .post(self.endpoint("/api/generate"))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                LlmError::Unavailable(format!(
                    "Ollama request to {} failed: {}",
                    self.config.server_url, e
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::Inference(format!(
                "Ollama API error ({status}): {error_text}"
            )));
        }
        Ok(response)
    }
}

/// Decode one NDJSON line into its text fragment and done flag
fn decode_line(line: &[u8]) -> LlmResult<Option<(String, bool)>> {
    let trimmed = String::from_utf8_lossy(line);
    let trimmed = trimmed.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let chunk: OllamaResponse = serde_json::from_str(trimmed)?;
    if let Some(error) = chunk.error {
        return Err(LlmError::Inference(error));
    }
    Ok(Some((chunk.response, chunk.done)))
}

#[async_trait]
impl TextGenerator for OllamaClient {
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> LlmResult<String> {
        debug!("Ollama generate with {} ({} prompt chars)", self.config.model, prompt.len());
        let response = self.send(prompt, options, false).await?;
        let body: OllamaResponse = response.json().await?;
        if let Some(error) = body.error {
            return Err(LlmError::Inference(error));
        }
        info!("Ollama returned {} chars", body.response.len());
        Ok(body.response)
    }

    async fn generate_stream(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> LlmResult<TextStream> {
        let mut response = self.send(prompt, options, true).await?;
        let (tx, rx) = mpsc::channel::<LlmResult<String>>(32);

        tokio::spawn(async move {
            let mut buffer: Vec<u8> = Vec::new();
            loop {
                let bytes = match response.chunk().await {
                    Ok(Some(bytes)) => bytes,
                    Ok(None) => break,
                    Err(e) => {
                        let _ = tx.send(Err(LlmError::Http(e))).await;
                        return;
                    }
                };
                buffer.extend_from_slice(&bytes);

                while let Some(newline) = buffer.iter().position(|b| *b == b'\n') {
                    let line: Vec<u8> = buffer.drain(..=newline).collect();
                    match decode_line(&line) {
                        Ok(Some((text, done))) => {
                            if !text.is_empty() && tx.send(Ok(text)).await.is_err() {
                                return;
                            }
                            if done {
                                return;
                            }
                        }
                        Ok(None) => {}
                        Err(e) => {
                            let _ = tx.send(Err(e)).await;
                            return;
                        }
                    }
                }
            }

            // Trailing object without a final newline
            match decode_line(&buffer) {
                Ok(Some((text, _))) if !text.is_empty() => {
                    let _ = tx.send(Ok(text)).await;
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("Discarding malformed trailing Ollama chunk: {}", e);
                }
            }
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }

    fn backend_name(&self) -> &str {
        "ollama"
    }
}
