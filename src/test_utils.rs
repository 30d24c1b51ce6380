//! Test utilities and mock factories.
//!
//! This module provides shared testing infrastructure:
//! - Mood entry fixtures
//! - Mock provider factories for the insight and chat services
//!
//! Only compiled for tests (`#[cfg(test)]`).

#![allow(clippy::unwrap_used, clippy::expect_used)]
#![allow(dead_code)]

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use crate::error::ProviderError;
use crate::journal::{MoodEntry, MoodScore};
use crate::provider::{GenerateResponse, MockProvider, StreamEvent};

/// Create a mood entry fixture with the given score, note and timestamp.
#[must_use]
pub fn entry_at(score: u8, note: &str, millis: i64) -> MoodEntry {
    MoodEntry::new(
        MoodScore::try_from(score).unwrap(),
        note,
        DateTime::from_timestamp_millis(millis).unwrap(),
    )
}

/// Build a generate response carrying one model turn of text.
#[must_use]
pub fn generate_response(text: &str) -> GenerateResponse {
    serde_json::from_value(serde_json::json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    }))
    .unwrap()
}

/// Create a mock provider whose `generate` returns fixed text.
#[must_use]
pub fn mock_generate_success(text: impl Into<String>) -> MockProvider {
    let text = text.into();
    let mut mock = MockProvider::new();
    mock.expect_generate()
        .returning(move |_| Ok(generate_response(&text)));
    mock
}

/// Create a mock provider whose `generate` returns an error.
#[must_use]
pub fn mock_generate_error(error: ProviderError) -> MockProvider {
    let mut mock = MockProvider::new();
    mock.expect_generate()
        .returning(move |_| Err(error.clone()));
    mock
}

/// Create a mock provider that streams the given chunks then closes.
#[must_use]
pub fn mock_stream_success(chunks: Vec<String>) -> MockProvider {
    let mut mock = MockProvider::new();
    mock.expect_stream_generate().returning(move |_| {
        let (tx, rx) = mpsc::channel(32);
        for chunk in &chunks {
            tx.try_send(Ok(StreamEvent::TextChunk {
                text: chunk.clone(),
            }))
            .unwrap();
        }
        Ok(rx)
    });
    mock
}

/// Create a mock provider whose stream fails before any chunk.
#[must_use]
pub fn mock_stream_error(error: ProviderError) -> MockProvider {
    let mut mock = MockProvider::new();
    mock.expect_stream_generate()
        .returning(move |_| Err(error.clone()));
    mock
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_at_builds_valid_entry() {
        let entry = entry_at(3, "note", 1_000);
        assert_eq!(entry.score, MoodScore::Okay);
        assert_eq!(entry.timestamp.timestamp_millis(), 1_000);
    }

    #[test]
    fn test_generate_response_text() {
        assert_eq!(generate_response("hi").text(), "hi");
    }

    #[tokio::test]
    async fn test_mock_stream_success_yields_chunks() {
        use crate::provider::{Content, GenerateRequest, Provider};

        let mock = mock_stream_success(vec!["a".to_string(), "b".to_string()]);
        let request = GenerateRequest::new("m", vec![Content::user("x")]);
        let mut rx = mock.stream_generate(request).await.unwrap();

        let mut text = String::new();
        while let Some(event) = rx.recv().await {
            if let StreamEvent::TextChunk { text: chunk } = event.unwrap() {
                text.push_str(&chunk);
            }
        }
        assert_eq!(text, "ab");
    }
}
