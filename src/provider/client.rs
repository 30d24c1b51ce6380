//! Gemini API client with retry logic.
//!
//! This module provides:
//! - HTTP client for the generate-content endpoints
//! - Retry logic with exponential backoff (non-streaming path)
//! - Request validation
//! - Streaming chunk delivery over a channel

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::uninlined_format_args)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use tokio::sync::mpsc;

use super::config::ClientConfig;
use super::streaming::parse_sse_line;
use super::types::{GenerateRequest, GenerateResponse, StreamEvent};
use super::Provider;
use crate::error::ProviderError;

/// Maximum number of turns per request.
pub const MAX_TURNS: usize = 200;
/// Maximum text length per turn (50KB).
pub const MAX_CONTENT_LENGTH: usize = 50_000;

/// Gemini API client.
#[derive(Debug)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    config: ClientConfig,
}

impl GeminiClient {
    /// Create a new Gemini client.
    pub fn new(api_key: impl Into<String>, config: ClientConfig) -> Result<Self, ProviderError> {
        let timeout = Duration::from_millis(config.timeout_ms);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Network {
                message: format!("Failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            config,
        })
    }

    /// Create a client with default configuration.
    pub fn with_api_key(api_key: impl Into<String>) -> Result<Self, ProviderError> {
        Self::new(api_key, ClientConfig::default())
    }

    /// Get the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Get the client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send a non-streaming generation request with retry logic.
    pub async fn generate(
        &self,
        request: GenerateRequest,
    ) -> Result<GenerateResponse, ProviderError> {
        Self::validate_request(&request)?;
        self.execute_with_retry(request).await
    }

    /// Send a streaming generation request.
    ///
    /// Returns a channel receiver that yields [`StreamEvent`]s as they
    /// arrive. The caller should consume events until the channel closes or
    /// an error is received; chunks must be applied in arrival order.
    pub async fn stream_generate(
        &self,
        request: GenerateRequest,
    ) -> Result<mpsc::Receiver<Result<StreamEvent, ProviderError>>, ProviderError> {
        Self::validate_request(&request)?;

        let (tx, rx) = mpsc::channel(32);
        let url = format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.config.base_url, request.model
        );

        tracing::debug!(
            url = %url,
            model = %request.model,
            turns = request.contents.len(),
            "Starting streaming Gemini API request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout {
                        timeout_ms: self.config.timeout_ms,
                    }
                } else {
                    ProviderError::Network {
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if let Err(e) = Self::check_status(status, &response, &request.model) {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::enrich_status_error(e, status.as_u16(), &body));
        }

        // Spawn task to parse the SSE stream and forward events
        let byte_stream = response.bytes_stream();
        tokio::spawn(async move {
            let mut stream = byte_stream;
            let mut buffer = String::new();

            while let Some(chunk_result) = stream.next().await {
                match chunk_result {
                    Ok(bytes) => {
                        let text = match String::from_utf8(bytes.to_vec()) {
                            Ok(t) => t,
                            Err(e) => {
                                let _ = tx
                                    .send(Err(ProviderError::UnexpectedResponse {
                                        message: format!("Invalid UTF-8 in stream: {e}"),
                                    }))
                                    .await;
                                return;
                            }
                        };

                        buffer.push_str(&text);

                        // Process complete lines
                        while let Some(newline_pos) = buffer.find('\n') {
                            let line = buffer[..newline_pos].to_string();
                            buffer = buffer[newline_pos + 1..].to_string();

                            if let Some(event_result) = parse_sse_line(&line) {
                                match event_result {
                                    Ok(event) => {
                                        if tx.send(Ok(event)).await.is_err() {
                                            // Receiver dropped, stop processing
                                            return;
                                        }
                                    }
                                    Err(e) => {
                                        let _ = tx.send(Err(e)).await;
                                        return;
                                    }
                                }
                            }
                        }
                    }
                    Err(e) => {
                        let _ = tx
                            .send(Err(ProviderError::Network {
                                message: e.to_string(),
                            }))
                            .await;
                        return;
                    }
                }
            }
        });

        Ok(rx)
    }

    /// Validate request size limits.
    fn validate_request(request: &GenerateRequest) -> Result<(), ProviderError> {
        if request.contents.is_empty() {
            return Err(ProviderError::InvalidRequest {
                message: "Request has no content turns".to_string(),
            });
        }

        if request.contents.len() > MAX_TURNS {
            return Err(ProviderError::InvalidRequest {
                message: format!("Too many turns: {} > {}", request.contents.len(), MAX_TURNS),
            });
        }

        for content in &request.contents {
            let content_len = content.len();
            if content_len > MAX_CONTENT_LENGTH {
                return Err(ProviderError::InvalidRequest {
                    message: format!("Turn too large: {} > {}", content_len, MAX_CONTENT_LENGTH),
                });
            }
        }

        Ok(())
    }

    /// Execute request with retry logic.
    async fn execute_with_retry(
        &self,
        request: GenerateRequest,
    ) -> Result<GenerateResponse, ProviderError> {
        let mut last_error = None;
        let mut delay = self.config.retry_delay_ms;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                tracing::warn!(attempt, delay_ms = delay, "Retrying Gemini request");
                tokio::time::sleep(Duration::from_millis(delay)).await;
                delay *= 2; // Exponential backoff
            }

            match self.execute_once(&request).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    if !e.is_retryable() {
                        return Err(e);
                    }
                    tracing::warn!(error = %e, attempt, "Retryable error occurred");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| ProviderError::Network {
            message: "Unknown error after retries".to_string(),
        }))
    }

    /// Execute a single request attempt.
    async fn execute_once(
        &self,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse, ProviderError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url, request.model
        );
        let start = std::time::Instant::now();

        tracing::debug!(
            url = %url,
            model = %request.model,
            turns = request.contents.len(),
            timeout_ms = self.config.timeout_ms,
            "Starting Gemini API request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                let elapsed_ms = start.elapsed().as_millis() as u64;
                if e.is_timeout() {
                    tracing::error!(
                        url = %url,
                        elapsed_ms = elapsed_ms,
                        timeout_ms = self.config.timeout_ms,
                        "Gemini API request timed out"
                    );
                    ProviderError::Timeout {
                        timeout_ms: self.config.timeout_ms,
                    }
                } else {
                    tracing::error!(
                        url = %url,
                        elapsed_ms = elapsed_ms,
                        error = %e,
                        "Gemini API request failed"
                    );
                    ProviderError::Network {
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        tracing::debug!(
            url = %url,
            status = %status,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Gemini API response received"
        );

        if let Err(e) = Self::check_status(status, &response, &request.model) {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::enrich_status_error(e, status.as_u16(), &body));
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::UnexpectedResponse {
                message: format!("Failed to parse response: {e}"),
            })
    }

    /// Map an error status code to a [`ProviderError`].
    ///
    /// Returns `Ok(())` for success statuses.
    fn check_status(
        status: reqwest::StatusCode,
        response: &reqwest::Response,
        model: &str,
    ) -> Result<(), ProviderError> {
        match status.as_u16() {
            200..=299 => Ok(()),
            401 | 403 => Err(ProviderError::AuthenticationFailed),
            429 => {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(60);
                Err(ProviderError::RateLimited {
                    retry_after_seconds: retry_after,
                })
            }
            503 => Err(ProviderError::ModelOverloaded {
                model: model.to_string(),
            }),
            _ => Err(ProviderError::UnexpectedResponse {
                message: String::new(),
            }),
        }
    }

    /// Attach the response body to an otherwise bare status error.
    fn enrich_status_error(error: ProviderError, status: u16, body: &str) -> ProviderError {
        match error {
            ProviderError::UnexpectedResponse { .. } => ProviderError::UnexpectedResponse {
                message: format!("Status {}: {}", status, body),
            },
            other => other,
        }
    }
}

/// Call the underlying client through the [`Provider`] abstraction.
#[async_trait]
impl Provider for GeminiClient {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, ProviderError> {
        Self::generate(self, request).await
    }

    async fn stream_generate(
        &self,
        request: GenerateRequest,
    ) -> Result<mpsc::Receiver<Result<StreamEvent, ProviderError>>, ProviderError> {
        Self::stream_generate(self, request).await
    }
}

/// Blanket implementation for `Arc<GeminiClient>` so the insight and chat
/// services can share one client.
#[async_trait]
impl Provider for Arc<GeminiClient> {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, ProviderError> {
        GeminiClient::generate(self.as_ref(), request).await
    }

    async fn stream_generate(
        &self,
        request: GenerateRequest,
    ) -> Result<mpsc::Receiver<Result<StreamEvent, ProviderError>>, ProviderError> {
        GeminiClient::stream_generate(self.as_ref(), request).await
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::unreadable_literal
)]
mod tests {
    use super::*;
    use crate::provider::types::Content;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MODEL: &str = "gemini-3-flash-preview";

    // Helper to create a mock client pointing to the mock server
    async fn create_mock_client(server: &MockServer) -> GeminiClient {
        let config = ClientConfig::default()
            .with_base_url(server.uri())
            .with_max_retries(0)
            .with_timeout_ms(5_000);
        GeminiClient::new("test-api-key", config).unwrap()
    }

    // Helper to create a valid API response body
    fn success_response_body(text: &str) -> serde_json::Value {
        json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": text}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 20}
        })
    }

    fn user_request(text: &str) -> GenerateRequest {
        GenerateRequest::new(MODEL, vec![Content::user(text)])
    }

    // GeminiClient creation tests
    #[test]
    fn test_client_new() {
        let client = GeminiClient::with_api_key("test-key").unwrap();
        assert_eq!(
            client.base_url(),
            "https://generativelanguage.googleapis.com/v1beta"
        );
    }

    #[test]
    fn test_client_with_config() {
        let config = ClientConfig::default()
            .with_base_url("http://localhost:8080")
            .with_timeout_ms(10_000);
        let client = GeminiClient::new("test-key", config).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
        assert_eq!(client.config().timeout_ms, 10_000);
    }

    // Request validation tests
    #[tokio::test]
    async fn test_validate_request_empty_contents() {
        let server = MockServer::start().await;
        let client = create_mock_client(&server).await;

        let request = GenerateRequest::new(MODEL, vec![]);
        let result = client.generate(request).await;

        let err = result.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidRequest { .. }));
        assert!(err.to_string().contains("no content turns"));
    }

    #[tokio::test]
    async fn test_validate_request_too_many_turns() {
        let server = MockServer::start().await;
        let client = create_mock_client(&server).await;

        let contents: Vec<Content> = (0..=MAX_TURNS).map(|i| Content::user(format!("Turn {i}"))).collect();
        let request = GenerateRequest::new(MODEL, contents);
        let result = client.generate(request).await;

        let err = result.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidRequest { .. }));
        assert!(err.to_string().contains("Too many turns"));
    }

    #[tokio::test]
    async fn test_validate_request_turn_too_large() {
        let server = MockServer::start().await;
        let client = create_mock_client(&server).await;

        let request = user_request(&"x".repeat(MAX_CONTENT_LENGTH + 1));
        let result = client.generate(request).await;

        let err = result.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidRequest { .. }));
        assert!(err.to_string().contains("Turn too large"));
    }

    // Successful request tests
    #[tokio::test]
    async fn test_generate_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!("/models/{MODEL}:generateContent")))
            .and(header("x-goog-api-key", "test-api-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_response_body("Hello!")))
            .mount(&server)
            .await;

        let client = create_mock_client(&server).await;
        let response = client.generate(user_request("Hi")).await.unwrap();

        assert_eq!(response.text(), "Hello!");
        assert_eq!(response.usage.unwrap().prompt_token_count, 10);
    }

    #[tokio::test]
    async fn test_generate_empty_candidates_is_ok_with_empty_text() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!("/models/{MODEL}:generateContent")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
            .mount(&server)
            .await;

        let client = create_mock_client(&server).await;
        let response = client.generate(user_request("Hi")).await.unwrap();
        assert_eq!(response.text(), "");
    }

    // Error handling tests
    #[tokio::test]
    async fn test_generate_auth_failure_403() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!("/models/{MODEL}:generateContent")))
            .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
            .mount(&server)
            .await;

        let client = create_mock_client(&server).await;
        let result = client.generate(user_request("Hi")).await;
        assert!(matches!(
            result.unwrap_err(),
            ProviderError::AuthenticationFailed
        ));
    }

    #[tokio::test]
    async fn test_generate_rate_limited() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!("/models/{MODEL}:generateContent")))
            .respond_with(
                ResponseTemplate::new(429)
                    .append_header("retry-after", "30")
                    .set_body_string("Rate limited"),
            )
            .mount(&server)
            .await;

        let client = create_mock_client(&server).await;
        let result = client.generate(user_request("Hi")).await;

        match result.unwrap_err() {
            ProviderError::RateLimited {
                retry_after_seconds,
            } => assert_eq!(retry_after_seconds, 30),
            e => panic!("Wrong error type: {e:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_model_overloaded() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!("/models/{MODEL}:generateContent")))
            .respond_with(ResponseTemplate::new(503).set_body_string("Overloaded"))
            .mount(&server)
            .await;

        let client = create_mock_client(&server).await;
        let result = client.generate(user_request("Hi")).await;

        match result.unwrap_err() {
            ProviderError::ModelOverloaded { model } => assert_eq!(model, MODEL),
            e => panic!("Wrong error type: {e:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_unexpected_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!("/models/{MODEL}:generateContent")))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&server)
            .await;

        let client = create_mock_client(&server).await;
        let result = client.generate(user_request("Hi")).await;

        let err = result.unwrap_err();
        assert!(matches!(err, ProviderError::UnexpectedResponse { .. }));
        assert!(err.to_string().contains("Status 500"));
    }

    // Retry logic tests
    #[tokio::test]
    async fn test_retry_on_overload() {
        use std::sync::atomic::{AtomicU32, Ordering};
        use std::sync::Arc;

        let server = MockServer::start().await;
        let call_count = Arc::new(AtomicU32::new(0));
        let call_count_clone = Arc::clone(&call_count);

        // 503 on first call, 200 on second
        Mock::given(method("POST"))
            .and(path(format!("/models/{MODEL}:generateContent")))
            .respond_with(move |_req: &wiremock::Request| {
                let count = call_count_clone.fetch_add(1, Ordering::SeqCst);
                if count == 0 {
                    ResponseTemplate::new(503)
                } else {
                    ResponseTemplate::new(200).set_body_json(success_response_body("Recovered!"))
                }
            })
            .mount(&server)
            .await;

        let config = ClientConfig::default()
            .with_base_url(server.uri())
            .with_max_retries(1)
            .with_retry_delay_ms(10); // Fast retry for tests

        let client = GeminiClient::new("test-key", config).unwrap();
        let response = client.generate(user_request("Hi")).await.unwrap();

        assert_eq!(response.text(), "Recovered!");
        assert_eq!(call_count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_max_retries_exceeded() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!("/models/{MODEL}:generateContent")))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let config = ClientConfig::default()
            .with_base_url(server.uri())
            .with_max_retries(2)
            .with_retry_delay_ms(10);

        let client = GeminiClient::new("test-key", config).unwrap();
        let result = client.generate(user_request("Hi")).await;

        assert!(matches!(
            result.unwrap_err(),
            ProviderError::ModelOverloaded { .. }
        ));
    }

    #[tokio::test]
    async fn test_no_retry_on_auth_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!("/models/{MODEL}:generateContent")))
            .respond_with(ResponseTemplate::new(401))
            .expect(1) // Only called once
            .mount(&server)
            .await;

        let config = ClientConfig::default()
            .with_base_url(server.uri())
            .with_max_retries(3)
            .with_retry_delay_ms(10);

        let client = GeminiClient::new("test-key", config).unwrap();
        let result = client.generate(user_request("Hi")).await;

        assert!(matches!(
            result.unwrap_err(),
            ProviderError::AuthenticationFailed
        ));
    }

    // Streaming tests
    #[tokio::test]
    async fn test_stream_generate_yields_chunks_in_order() {
        let server = MockServer::start().await;

        let body = concat!(
            "data: {\"candidates\": [{\"content\": {\"role\": \"model\", \"parts\": [{\"text\": \"Hi\"}]}}]}\n\n",
            "data: {\"candidates\": [{\"content\": {\"role\": \"model\", \"parts\": [{\"text\": \" there\"}]}}]}\n\n",
            "data: {\"candidates\": [{\"content\": {\"role\": \"model\", \"parts\": [{\"text\": \"!\"}]}}]}\n\n",
            "data: {\"candidates\": [{\"finishReason\": \"STOP\"}]}\n\n",
        );

        Mock::given(method("POST"))
            .and(path(format!("/models/{MODEL}:streamGenerateContent")))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&server)
            .await;

        let client = create_mock_client(&server).await;
        let mut rx = client.stream_generate(user_request("Hi")).await.unwrap();

        let mut text = String::new();
        while let Some(event) = rx.recv().await {
            if let StreamEvent::TextChunk { text: chunk } = event.unwrap() {
                text.push_str(&chunk);
            }
        }
        assert_eq!(text, "Hi there!");
    }

    #[tokio::test]
    async fn test_stream_generate_auth_failure_before_stream() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!("/models/{MODEL}:streamGenerateContent")))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let client = create_mock_client(&server).await;
        let result = client.stream_generate(user_request("Hi")).await;

        assert!(matches!(
            result.unwrap_err(),
            ProviderError::AuthenticationFailed
        ));
    }

    #[tokio::test]
    async fn test_stream_generate_mid_stream_error_payload() {
        let server = MockServer::start().await;

        let body = concat!(
            "data: {\"candidates\": [{\"content\": {\"role\": \"model\", \"parts\": [{\"text\": \"Hi\"}]}}]}\n\n",
            "data: {\"error\": {\"message\": \"stream broke\"}}\n\n",
        );

        Mock::given(method("POST"))
            .and(path(format!("/models/{MODEL}:streamGenerateContent")))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&server)
            .await;

        let client = create_mock_client(&server).await;
        let mut rx = client.stream_generate(user_request("Hi")).await.unwrap();

        let first = rx.recv().await.unwrap().unwrap();
        assert_eq!(
            first,
            StreamEvent::TextChunk {
                text: "Hi".to_string()
            }
        );

        let second = rx.recv().await.unwrap();
        assert!(second.is_err());

        // Channel closes after the error
        assert!(rx.recv().await.is_none());
    }

    // Client debug test
    #[test]
    fn test_client_debug() {
        let client = GeminiClient::with_api_key("test-key").unwrap();
        let debug = format!("{:?}", client);
        assert!(debug.contains("GeminiClient"));
    }
}
