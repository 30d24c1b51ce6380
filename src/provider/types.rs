//! Gemini API request and response types.
//!
//! This module provides:
//! - Request types for `generateContent` / `streamGenerateContent`
//! - Response types including candidates and usage metadata
//! - Sampling configuration
//! - Streaming event types
//!
//! Field names follow the wire format (camelCase) via serde renames.

#![allow(clippy::missing_const_for_fn)]

use serde::{Deserialize, Serialize};

/// Request to the Gemini generate-content endpoints.
///
/// The model is part of the request URL, not the body, so it is skipped
/// during serialization.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GenerateRequest {
    /// Model identifier (e.g., "gemini-3-flash-preview").
    #[serde(skip_serializing)]
    pub model: String,
    /// Conversation turns, oldest first.
    pub contents: Vec<Content>,
    /// System instruction, sent as its own field rather than a turn.
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<SystemInstruction>,
    /// Sampling configuration.
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateRequest {
    /// Create a new request with required fields.
    #[must_use]
    pub fn new(model: impl Into<String>, contents: Vec<Content>) -> Self {
        Self {
            model: model.into(),
            contents,
            system_instruction: None,
            generation_config: None,
        }
    }

    /// Set the system instruction.
    #[must_use]
    pub fn with_system_instruction(mut self, instruction: SystemInstruction) -> Self {
        self.system_instruction = Some(instruction);
        self
    }

    /// Set the sampling configuration.
    #[must_use]
    pub fn with_generation_config(mut self, config: GenerationConfig) -> Self {
        self.generation_config = Some(config);
        self
    }
}

/// One conversation turn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Content {
    /// Role: "user" or "model".
    pub role: String,
    /// Content parts; text only in this client.
    pub parts: Vec<Part>,
}

impl Content {
    /// Create a user turn with text content.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            parts: vec![Part::text(text)],
        }
    }

    /// Create a model turn with text content.
    #[must_use]
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: "model".to_string(),
            parts: vec![Part::text(text)],
        }
    }

    /// Concatenated text of all parts.
    #[must_use]
    pub fn text(&self) -> String {
        self.parts.iter().map(|p| p.text.as_str()).collect()
    }

    /// Total text length in characters, for size validation.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.iter().map(|p| p.text.len()).sum()
    }

    /// Check if the turn carries no text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One text fragment inside a turn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Part {
    /// The text content.
    pub text: String,
}

impl Part {
    /// Create a text part.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// System instruction container; the wire format omits the role.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SystemInstruction {
    /// Instruction text parts.
    pub parts: Vec<Part>,
}

impl SystemInstruction {
    /// Create a system instruction from text.
    #[must_use]
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![Part::text(text)],
        }
    }
}

/// Sampling configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationConfig {
    /// Temperature for sampling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Top-k sampling cutoff.
    #[serde(rename = "topK", skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    /// Nucleus sampling cutoff.
    #[serde(rename = "topP", skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// Maximum tokens to generate.
    #[serde(rename = "maxOutputTokens", skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

impl GenerationConfig {
    /// Create an empty configuration; the provider applies its own defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            temperature: None,
            top_k: None,
            top_p: None,
            max_output_tokens: None,
        }
    }

    /// The fixed moderate-creativity profile used for all journal features:
    /// temperature 0.7, top-k 40, top-p 0.95.
    #[must_use]
    pub fn moderate() -> Self {
        Self::new()
            .with_temperature(0.7)
            .with_top_k(40)
            .with_top_p(0.95)
    }

    /// Set temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set top-k.
    #[must_use]
    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = Some(top_k);
        self
    }

    /// Set top-p.
    #[must_use]
    pub fn with_top_p(mut self, top_p: f64) -> Self {
        self.top_p = Some(top_p);
        self
    }

    /// Set max output tokens.
    #[must_use]
    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = Some(max_output_tokens);
        self
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Response from the generate-content endpoints.
///
/// Streaming responses use the same shape per chunk.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GenerateResponse {
    /// Generated candidates; the first one carries the reply.
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    /// Token accounting, when present.
    #[serde(rename = "usageMetadata", default)]
    pub usage: Option<UsageMetadata>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate, empty when absent.
    #[must_use]
    pub fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(Content::text)
            .unwrap_or_default()
    }
}

/// One generated candidate.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Candidate {
    /// The generated turn, absent for safety-blocked candidates.
    #[serde(default)]
    pub content: Option<Content>,
    /// Why generation stopped.
    #[serde(rename = "finishReason", default)]
    pub finish_reason: Option<String>,
}

/// Token accounting reported by the API.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
pub struct UsageMetadata {
    /// Tokens in the prompt.
    #[serde(rename = "promptTokenCount", default)]
    pub prompt_token_count: u32,
    /// Tokens across the generated candidates.
    #[serde(rename = "candidatesTokenCount", default)]
    pub candidates_token_count: u32,
}

/// Events produced while consuming a streaming response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// One incremental text fragment, to be appended in arrival order.
    TextChunk {
        /// The fragment text.
        text: String,
    },
    /// A chunk carrying no text (metadata-only); safe to skip.
    Ignored,
}
