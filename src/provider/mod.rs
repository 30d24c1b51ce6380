//! Gemini API client.
//!
//! This module provides:
//! - Direct Gemini generate-content integration
//! - Retry logic with exponential backoff
//! - Server-Sent Events streaming
//! - The [`Provider`] trait that the insight and chat services depend on,
//!   mockable in tests via `mockall`
//!
//! The client uses `reqwest` for HTTP; streaming chunks are delivered over a
//! `tokio` mpsc channel in arrival order.

mod client;
mod config;
mod streaming;
mod types;

pub use client::{GeminiClient, MAX_CONTENT_LENGTH, MAX_TURNS};
pub use config::{
    ClientConfig, DEFAULT_BASE_URL, DEFAULT_MAX_RETRIES, DEFAULT_MODEL, DEFAULT_RETRY_DELAY_MS,
    DEFAULT_TIMEOUT_MS,
};
pub use streaming::parse_sse_line;
pub use types::{
    Candidate, Content, GenerateRequest, GenerateResponse, GenerationConfig, Part, StreamEvent,
    SystemInstruction, UsageMetadata,
};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::ProviderError;

/// LLM provider abstraction.
///
/// The two call shapes the journal needs: a single-shot generation (insight)
/// and a streaming generation whose chunks arrive over a channel (chat).
/// Annotated for automatic mock generation in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Provider: Send + Sync {
    /// Send a non-streaming generation request.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if the request is invalid or the call fails.
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, ProviderError>;

    /// Send a streaming generation request.
    ///
    /// Yields chunks over the returned channel until the stream completes or
    /// fails; chunks must be applied in arrival order.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if the request is invalid or the connection
    /// cannot be established. Mid-stream failures arrive on the channel.
    async fn stream_generate(
        &self,
        request: GenerateRequest,
    ) -> Result<mpsc::Receiver<Result<StreamEvent, ProviderError>>, ProviderError>;
}
