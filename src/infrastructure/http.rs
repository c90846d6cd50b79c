//! HTTP client boundary shared by every oracle and the vector store.
//!
//! Transport failures and 5xx responses are retried with a bounded backoff;
//! 4xx responses fail fast. The surrounding pipeline contracts stay
//! retry-free: a call that exhausts its retries fails that single item.

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::DomainError;

/// Bounded retry-with-backoff policy
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the initial attempt
    pub max_retries: u32,
    /// Delay before the first retry; doubles per attempt
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    /// No retries; failures surface immediately.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::ZERO,
        }
    }

    fn backoff_for(&self, attempt: u32) -> Duration {
        self.initial_backoff * 2u32.saturating_pow(attempt)
    }
}

/// Trait for HTTP operations (for mocking)
#[async_trait]
pub trait HttpClientTrait: Send + Sync + std::fmt::Debug {
    async fn get_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
    ) -> Result<serde_json::Value, DomainError>;

    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, DomainError>;

    async fn put_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, DomainError>;
}

/// Real HTTP client using reqwest
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl HttpClient {
    pub fn new() -> Self {
        Self::with_retry(RetryPolicy::default())
    }

    pub fn with_retry(retry: RetryPolicy) -> Self {
        Self {
            client: reqwest::Client::new(),
            retry,
        }
    }

    pub fn with_timeout(timeout: Duration, retry: RetryPolicy) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, retry })
    }

    async fn execute(
        &self,
        build: impl Fn() -> reqwest::RequestBuilder,
    ) -> Result<serde_json::Value, DomainError> {
        let mut attempt = 0;

        loop {
            match Self::send_once(build()).await {
                Ok(value) => return Ok(value),
                Err(Attempt::Fatal(err)) => return Err(err),
                Err(Attempt::Retryable(err)) => {
                    if attempt >= self.retry.max_retries {
                        return Err(err);
                    }
                    let backoff = self.retry.backoff_for(attempt);
                    tracing::debug!(attempt, backoff_ms = backoff.as_millis() as u64, error = %err, "retrying request");
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
            }
        }
    }

    async fn send_once(request: reqwest::RequestBuilder) -> Result<serde_json::Value, Attempt> {
        let response = request.send().await.map_err(|e| {
            Attempt::Retryable(DomainError::provider("http", format!("Request failed: {}", e)))
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            let err = DomainError::provider("http", format!("HTTP {}: {}", status, error_body));
            return Err(if status.is_server_error() {
                Attempt::Retryable(err)
            } else {
                Attempt::Fatal(err)
            });
        }

        response.json().await.map_err(|e| {
            Attempt::Fatal(DomainError::provider(
                "http",
                format!("Failed to parse response: {}", e),
            ))
        })
    }
}

enum Attempt {
    Retryable(DomainError),
    Fatal(DomainError),
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClientTrait for HttpClient {
    async fn get_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
    ) -> Result<serde_json::Value, DomainError> {
        let headers: Vec<(String, String)> = headers
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        self.execute(|| {
            let mut request = self.client.get(url);
            for (key, value) in &headers {
                request = request.header(key, value);
            }
            request
        })
        .await
    }

    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, DomainError> {
        let headers: Vec<(String, String)> = headers
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        self.execute(|| {
            let mut request = self.client.post(url);
            for (key, value) in &headers {
                request = request.header(key, value);
            }
            request.json(body)
        })
        .await
    }

    async fn put_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, DomainError> {
        let headers: Vec<(String, String)> = headers
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        self.execute(|| {
            let mut request = self.client.put(url);
            for (key, value) in &headers {
                request = request.header(key, value);
            }
            request.json(body)
        })
        .await
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy {
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
        };

        assert_eq!(policy.backoff_for(0), Duration::from_millis(100));
        assert_eq!(policy.backoff_for(1), Duration::from_millis(200));
        assert_eq!(policy.backoff_for(2), Duration::from_millis(400));
    }

    #[test]
    fn test_no_retry_policy() {
        let policy = RetryPolicy::none();
        assert_eq!(policy.max_retries, 0);
    }
}
