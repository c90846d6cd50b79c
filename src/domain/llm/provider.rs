use async_trait::async_trait;
use std::fmt::Debug;

use super::Message;
use crate::domain::DomainError;

/// Trait for chat completion providers (Ollama, Gemini, etc.)
///
/// The pipeline depends on nothing beyond plain chat completion: a message
/// list in, raw text out. Anything structured is parsed defensively on the
/// caller's side of this boundary.
#[async_trait]
pub trait ChatProvider: Send + Sync + Debug {
    /// Send a chat completion request and return the raw response text.
    async fn complete(&self, messages: Vec<Message>) -> Result<String, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    /// Mock chat provider returning canned responses in order
    #[derive(Debug)]
    pub struct MockChatProvider {
        name: &'static str,
        responses: Mutex<Vec<String>>,
        error: Option<String>,
    }

    impl MockChatProvider {
        pub fn new(name: &'static str) -> Self {
            Self {
                name,
                responses: Mutex::new(Vec::new()),
                error: None,
            }
        }

        /// Queue a response. Responses are returned in the order queued; the
        /// last one repeats once the queue drains.
        pub fn with_response(self, response: impl Into<String>) -> Self {
            self.responses.lock().unwrap().push(response.into());
            self
        }

        pub fn with_error(mut self, error: impl Into<String>) -> Self {
            self.error = Some(error.into());
            self
        }
    }

    #[async_trait]
    impl ChatProvider for MockChatProvider {
        async fn complete(&self, _messages: Vec<Message>) -> Result<String, DomainError> {
            if let Some(ref error) = self.error {
                return Err(DomainError::provider(self.name, error));
            }

            let mut responses = self.responses.lock().unwrap();
            if responses.len() > 1 {
                Ok(responses.remove(0))
            } else {
                responses
                    .first()
                    .cloned()
                    .ok_or_else(|| DomainError::provider(self.name, "No mock response configured"))
            }
        }

        fn provider_name(&self) -> &'static str {
            self.name
        }
    }
}
