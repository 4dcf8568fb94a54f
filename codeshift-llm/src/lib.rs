//! codeshift LLM - Text-Generation Service boundary
//!
//! The transformation pipeline only needs "prompt in, text out". This crate
//! provides that seam as the [`TextGenerator`] trait plus three
//! implementations:
//! - [`OllamaClient`] for a local Ollama server (blocking and NDJSON streaming)
//! - [`GeminiClient`] for Google AI Studio
//! - [`ScriptedGenerator`] which replays canned replies, for tests and demos

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod gemini;
pub mod generator;
pub mod ollama;
pub mod options;
pub mod scripted;

pub use backend::{build_generator, BackendConfig, BackendKind};
pub use gemini::GeminiClient;
pub use generator::{TextGenerator, TextStream};
pub use ollama::{OllamaClient, OllamaConfig};
pub use options::GenerationOptions;
pub use scripted::ScriptedGenerator;

/// Result type for LLM operations
pub type LlmResult<T> = std::result::Result<T, LlmError>;

/// Error types for LLM operations
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generation options out of range
    #[error("Invalid generation options: {0}")]
    InvalidOptions(String),

    /// Backend reported a failure or returned nothing usable
    #[error("Model inference error: {0}")]
    Inference(String),

    /// Backend could not be reached
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}
