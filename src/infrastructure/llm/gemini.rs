//! Gemini chat provider
//!
//! Gemini has no system role in its generateContent payload, so system
//! messages are carried in `system_instruction` and the rest of the
//! conversation maps to `contents` with the assistant role renamed to
//! `model`.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::domain::llm::{ChatProvider, Message, MessageRole};
use crate::domain::DomainError;
use crate::infrastructure::http::HttpClientTrait;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

#[derive(Debug)]
pub struct GeminiChatProvider<C: HttpClientTrait> {
    http: C,
    base_url: String,
    model: String,
    api_key: String,
}

impl<C: HttpClientTrait> GeminiChatProvider<C> {
    pub fn new(http: C, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn build_body(messages: &[Message]) -> Value {
        let system_text: Vec<&str> = messages
            .iter()
            .filter(|m| m.role == MessageRole::System)
            .map(|m| m.content.as_str())
            .collect();

        let contents: Vec<Value> = messages
            .iter()
            .filter(|m| m.role != MessageRole::System)
            .map(|m| {
                let role = match m.role {
                    MessageRole::Assistant => "model",
                    _ => "user",
                };
                json!({"role": role, "parts": [{"text": m.content}]})
            })
            .collect();

        let mut body = json!({"contents": contents});
        if !system_text.is_empty() {
            body["system_instruction"] = json!({"parts": [{"text": system_text.join("\n\n")}]});
        }
        body
    }

    fn extract_text(response: &Value) -> Option<String> {
        response
            .get("candidates")?
            .get(0)?
            .get("content")?
            .get("parts")?
            .get(0)?
            .get("text")?
            .as_str()
            .map(str::to_string)
    }
}

#[async_trait]
impl<C: HttpClientTrait> ChatProvider for GeminiChatProvider<C> {
    async fn complete(&self, messages: Vec<Message>) -> Result<String, DomainError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = Self::build_body(&messages);

        debug!(model = %self.model, messages = messages.len(), "Requesting Gemini completion");

        let response = self
            .http
            .post_json(&url, vec![("x-goog-api-key", self.api_key.as_str())], &body)
            .await?;

        Self::extract_text(&response).ok_or_else(|| {
            DomainError::provider("gemini", "Response contained no candidate text")
        })
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }
}
