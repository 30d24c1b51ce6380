//! Streaming support for the Gemini API.
//!
//! `streamGenerateContent?alt=sse` produces Server-Sent Events whose `data:`
//! payloads are ordinary generate-content responses carrying one text
//! fragment each. This module parses SSE lines into [`StreamEvent`]s;
//! consumers concatenate fragments in arrival order.

use serde::Deserialize;

use super::types::{Candidate, StreamEvent};
use crate::error::ProviderError;

/// Parse a Server-Sent Event line into a [`StreamEvent`].
///
/// Returns `None` for lines that carry no event: blanks, comments,
/// non-`data:` fields and end-of-stream markers.
#[must_use]
pub fn parse_sse_line(line: &str) -> Option<Result<StreamEvent, ProviderError>> {
    // Skip empty lines and comments
    let line = line.trim();
    if line.is_empty() || line.starts_with(':') {
        return None;
    }

    // Extract data from "data: {...}" format
    if let Some(data) = line.strip_prefix("data: ") {
        if data == "[DONE]" {
            return None;
        }
        return Some(parse_chunk_data(data));
    }

    None
}

/// Parse the JSON payload of one SSE data line.
fn parse_chunk_data(data: &str) -> Result<StreamEvent, ProviderError> {
    let chunk: RawStreamChunk =
        serde_json::from_str(data).map_err(|e| ProviderError::UnexpectedResponse {
            message: format!("Failed to parse stream chunk: {e}"),
        })?;

    if let Some(error) = chunk.error {
        return Err(ProviderError::UnexpectedResponse {
            message: error.message,
        });
    }

    let text: String = chunk
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .map(super::types::Content::text)
        .unwrap_or_default();

    if text.is_empty() {
        // Metadata-only chunks (finish reason, usage) carry no text.
        Ok(StreamEvent::Ignored)
    } else {
        Ok(StreamEvent::TextChunk { text })
    }
}

/// Raw stream chunk from the API.
#[derive(Debug, Deserialize)]
struct RawStreamChunk {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    error: Option<RawError>,
}

#[derive(Debug, Deserialize)]
struct RawError {
    message: String,
}
