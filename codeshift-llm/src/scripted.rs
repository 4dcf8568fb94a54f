//! A generator that replays canned replies in order
//!
//! Used to drive the transformation pipeline deterministically in tests and
//! offline demos. Every prompt it receives is recorded.

use crate::{GenerationOptions, LlmError, LlmResult, TextGenerator};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<LlmResult<String>>>,
    prompts: Mutex<Vec<String>>,
    fallback: Option<String>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ScriptedGenerator {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| Ok(r.into())).collect()),
            ..Self::default()
        }
    }

    /// Reply used once the queue is exhausted
    pub fn with_fallback(mut self, reply: impl Into<String>) -> Self {
        self.fallback = Some(reply.into());
        self
    }

    pub fn push_reply(&self, reply: impl Into<String>) {
        lock(&self.replies).push_back(Ok(reply.into()));
    }

    /// Queue a failure; the next call returns it
    pub fn push_error(&self, error: LlmError) {
        lock(&self.replies).push_back(Err(error));
    }

    /// Prompts received so far, oldest first
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }

    pub fn remaining(&self) -> usize {
        lock(&self.replies).len()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str, _options: &GenerationOptions) -> LlmResult<String> {
        lock(&self.prompts).push(prompt.to_string());
        match lock(&self.replies).pop_front() {
            Some(reply) => reply,
            None => self.fallback.clone().ok_or_else(|| {
                LlmError::Inference("Scripted generator has no replies left".to_string())
            }),
        }
    }

    fn backend_name(&self) -> &str {
        "scripted"
    }
}
