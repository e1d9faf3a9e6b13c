//! Text-generation fakes.

use async_trait::async_trait;
use engram_rs_llm::{LlmError, TextGenerator};
use parking_lot::Mutex;
use std::sync::Arc;

/// Generator returning a fixed reply.
#[derive(Debug, Clone)]
pub struct FixedGenerator {
    response: String,
}

impl FixedGenerator {
    /// Create a fake that always replies with `response`.
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}

#[async_trait]
impl TextGenerator for FixedGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
        Ok(self.response.clone())
    }
}

/// Generator that records every prompt it sees.
#[derive(Debug, Clone)]
pub struct RecordingGenerator {
    response: String,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl RecordingGenerator {
    /// Create the fake plus a handle to the prompts it receives.
    pub fn new(response: impl Into<String>) -> (Self, Arc<Mutex<Vec<String>>>) {
        let prompts = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                response: response.into(),
                prompts: prompts.clone(),
            },
            prompts,
        )
    }
}

#[async_trait]
impl TextGenerator for RecordingGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts.lock().push(prompt.to_string());
        Ok(self.response.clone())
    }
}

/// Generator that fails every call.
#[derive(Debug, Clone, Default)]
pub struct FailingGenerator;

#[async_trait]
impl TextGenerator for FailingGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
        Err(LlmError::Api {
            status: 500,
            message: "generation backend offline".to_string(),
        })
    }
}
