//! Ollama chat provider

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::domain::llm::{ChatProvider, Message};
use crate::domain::DomainError;
use crate::infrastructure::http::HttpClientTrait;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:11434";
pub const DEFAULT_MODEL: &str = "llama3.1";

/// Chat completion over the local Ollama HTTP API.
#[derive(Debug)]
pub struct OllamaChatProvider<C: HttpClientTrait> {
    http: C,
    base_url: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: OllamaChatMessage,
}

#[derive(Debug, Deserialize)]
struct OllamaChatMessage {
    content: String,
}

impl<C: HttpClientTrait> OllamaChatProvider<C> {
    pub fn new(http: C) -> Self {
        Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
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
}

#[async_trait]
impl<C: HttpClientTrait> ChatProvider for OllamaChatProvider<C> {
    async fn complete(&self, messages: Vec<Message>) -> Result<String, DomainError> {
        let url = format!("{}/api/chat", self.base_url);
        debug!(model = %self.model, messages = messages.len(), "Requesting Ollama chat completion");

        let body = json!({
            "model": self.model,
            "messages": messages,
            "stream": false,
        });

        let response = self.http.post_json(&url, Vec::new(), &body).await?;
        let parsed: OllamaChatResponse = serde_json::from_value(response).map_err(|e| {
            DomainError::provider("ollama", format!("Unexpected chat response shape: {}", e))
        })?;

        Ok(parsed.message.content)
    }

    fn provider_name(&self) -> &'static str {
        "ollama"
    }
}
