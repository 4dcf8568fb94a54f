//! Sampling parameters passed with every generation request

use crate::{LlmError, LlmResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationOptions {
    /// Upper bound on generated tokens
    pub max_length: usize,
    pub min_length: usize,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub repetition_penalty: f32,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
    /// Stop sequences
    pub stop: Vec<String>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_length: 512,
            min_length: 1,
            temperature: 0.7,
            top_p: 0.9,
            top_k: 50,
            repetition_penalty: 1.0,
            seed: None,
            stop: Vec::new(),
        }
    }
}

impl GenerationOptions {
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Check every parameter against its allowed range
    pub fn validate(&self) -> LlmResult<()> {
        let checks = [
            (
                self.temperature > 0.0 && self.temperature <= 2.0,
                "temperature must be in (0, 2]",
            ),
            (
                (0.0..=1.0).contains(&self.top_p),
                "top_p must be in [0, 1]",
            ),
            (
                self.top_k > 0 && self.top_k <= 100,
                "top_k must be in (0, 100]",
            ),
            (
                self.repetition_penalty > 0.0 && self.repetition_penalty <= 2.0,
                "repetition_penalty must be in (0, 2]",
            ),
            (
                self.max_length > self.min_length,
                "max_length must be greater than min_length",
            ),
        ];

        match checks.iter().find(|(ok, _)| !ok) {
            Some((_, message)) => Err(LlmError::InvalidOptions((*message).to_string())),
            None => Ok(()),
        }
    }
}
