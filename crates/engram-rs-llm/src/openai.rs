//! OpenAI-compatible chat-completions client.

use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::LlmError;
use crate::TextGenerator;

/// Default API base for OpenAI-compatible services.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Non-streaming chat client for OpenAI-compatible HTTP APIs.
///
/// A `base_url` override points the client at local OpenAI-compatible
/// servers (for example an Ollama endpoint).
#[derive(Debug, Clone)]
pub struct OpenAiGenerator {
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Pull the trimmed reply text out of a decoded response.
fn extract_reply(response: ChatResponse) -> Result<String, LlmError> {
    let reply = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .unwrap_or_default();
    if reply.is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    Ok(reply)
}

impl OpenAiGenerator {
    /// Create a client against the default OpenAI endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 150,
            client: reqwest::Client::new(),
        }
    }

    /// Point the client at an OpenAI-compatible server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Select the chat model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Cap the reply length in tokens.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };
        debug!(
            "generation request (model={}, prompt_len={})",
            self.model,
            prompt.len()
        );
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|err| err.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let response: ChatResponse = response.json().await?;
        extract_reply(response)
    }
}

#[cfg(test)]
mod tests {
    use super::{ChatResponse, OpenAiGenerator, extract_reply};
    use crate::LlmError;
    use pretty_assertions::assert_eq;

    #[test]
    fn extract_reply_trims_the_first_choice() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"role": "assistant", "content": "  a reply \n"}}]}"#,
        )
        .expect("decode");
        assert_eq!(extract_reply(response).expect("reply"), "a reply");
    }

    #[test]
    fn extract_reply_rejects_empty_content() {
        let response: ChatResponse =
            serde_json::from_str(r#"{"choices": [{"message": {"content": "   "}}]}"#)
                .expect("decode");
        assert!(matches!(
            extract_reply(response),
            Err(LlmError::EmptyResponse)
        ));

        let response: ChatResponse =
            serde_json::from_str(r#"{"choices": []}"#).expect("decode");
        assert!(matches!(
            extract_reply(response),
            Err(LlmError::EmptyResponse)
        ));
    }

    #[test]
    fn builder_overrides_sampling_settings() {
        let generator = OpenAiGenerator::new("key")
            .with_base_url("http://localhost:11434/v1/")
            .with_model("llama2")
            .with_temperature(0.2)
            .with_max_tokens(1500);
        assert_eq!(generator.base_url, "http://localhost:11434/v1");
        assert_eq!(generator.model, "llama2");
        assert_eq!(generator.temperature, 0.2);
        assert_eq!(generator.max_tokens, 1500);
    }
}
