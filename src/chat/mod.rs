//! The supportive chat session.
//!
//! This module provides:
//! - [`ChatMessage`] / [`Role`]: one transcript turn
//! - [`TurnState`]: the explicit idle/streaming re-entrancy guard
//! - [`ChatSession`]: the streaming conversation state machine
//!
//! The transcript is strict append-order and is never reordered or
//! deduplicated. Assistant messages grow in place while their stream is
//! live, then become immutable. The session and its transcript live for the
//! process lifetime only; history resets on restart.

use crate::provider::{
    Content, GenerateRequest, GenerationConfig, Provider, StreamEvent, SystemInstruction,
};

pub use crate::prompts::{CHAT_FALLBACK_MESSAGE, CHAT_SYSTEM_INSTRUCTION};

/// Who authored a transcript turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// The journaling user.
    User,
    /// The Luminar assistant.
    Assistant,
}

/// One turn in the conversation transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Message author.
    pub role: Role,
    /// Message text. Assistant text grows monotonically while its stream is
    /// live, then becomes immutable.
    pub text: String,
}

impl ChatMessage {
    fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    fn assistant_placeholder() -> Self {
        Self {
            role: Role::Assistant,
            text: String::new(),
        }
    }
}

/// Whether an assistant turn is currently in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    /// Ready to accept a send.
    Idle,
    /// An assistant reply is streaming; sends are rejected.
    Streaming,
}

/// How a [`ChatSession::send`] call concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The assistant reply streamed in (possibly truncated by a mid-stream
    /// error after some text had arrived).
    Replied,
    /// The turn failed before any text arrived; the fixed fallback message
    /// was shown instead.
    FellBack,
    /// Empty or whitespace-only input; nothing happened.
    IgnoredEmpty,
    /// A previous send was still streaming; nothing happened.
    RejectedBusy,
}

/// A stateful conversation with the Luminar assistant.
///
/// The provider-side conversation is created lazily on the first send and
/// reused for the process lifetime. The fixed system instruction is attached
/// to every request as the system role and can never be replaced by
/// conversation content.
#[derive(Debug)]
pub struct ChatSession<P> {
    provider: P,
    model: String,
    transcript: Vec<ChatMessage>,
    state: TurnState,
    /// Provider-side conversational memory; `None` until the first send.
    history: Option<Vec<Content>>,
}

impl<P: Provider> ChatSession<P> {
    /// Create an uninitialized session over the given provider and model.
    ///
    /// No provider conversation exists until the first successful guard pass
    /// in [`send`](Self::send).
    pub fn new(provider: P, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            transcript: Vec::new(),
            state: TurnState::Idle,
            history: None,
        }
    }

    /// The full transcript in strict append order.
    #[must_use]
    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// Current turn state.
    #[must_use]
    pub const fn state(&self) -> TurnState {
        self.state
    }

    /// True while an assistant reply is in flight.
    #[must_use]
    pub fn is_streaming(&self) -> bool {
        self.state == TurnState::Streaming
    }

    /// Send a user message and stream the assistant reply into the
    /// transcript.
    ///
    /// Guards first: whitespace-only input and re-entrant sends are no-ops
    /// that leave the transcript untouched. Otherwise the user turn is
    /// appended, an empty assistant turn follows immediately, and each
    /// incoming chunk is appended to that last message in arrival order.
    /// A turn that fails before any text arrives replaces the empty
    /// assistant message with [`CHAT_FALLBACK_MESSAGE`]; this method itself
    /// never fails.
    pub async fn send(&mut self, text: &str) -> SendOutcome {
        if text.trim().is_empty() {
            tracing::debug!("ignoring empty chat send");
            return SendOutcome::IgnoredEmpty;
        }
        if self.state == TurnState::Streaming {
            tracing::debug!("rejecting chat send while a turn is streaming");
            return SendOutcome::RejectedBusy;
        }

        self.state = TurnState::Streaming;
        self.transcript.push(ChatMessage::user(text));

        // Lazy session init: the provider conversation is created once and
        // reused for the process lifetime.
        let history = self.history.get_or_insert_with(Vec::new);
        history.push(Content::user(text));

        let request = GenerateRequest::new(&self.model, history.clone())
            .with_system_instruction(SystemInstruction::from_text(CHAT_SYSTEM_INSTRUCTION))
            .with_generation_config(GenerationConfig::moderate());

        self.transcript.push(ChatMessage::assistant_placeholder());

        let mut received_any = false;
        match self.provider.stream_generate(request).await {
            Ok(mut rx) => {
                while let Some(event) = rx.recv().await {
                    match event {
                        Ok(StreamEvent::TextChunk { text }) => {
                            received_any = true;
                            self.append_to_last(&text);
                        }
                        Ok(StreamEvent::Ignored) => {}
                        Err(e) => {
                            tracing::warn!(error = %e, "chat stream failed mid-turn");
                            break;
                        }
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "chat stream could not be started");
            }
        }

        let outcome = if received_any {
            // Commit the assistant turn to provider memory, partial or not.
            let reply = self
                .transcript
                .last()
                .map(|m| m.text.clone())
                .unwrap_or_default();
            if let Some(history) = self.history.as_mut() {
                history.push(Content::model(reply));
            }
            SendOutcome::Replied
        } else {
            // Nothing arrived: show the fixed fallback instead of an empty
            // bubble, and rewind the provider turn so the conversation stays
            // alternating on the next send.
            self.replace_last(CHAT_FALLBACK_MESSAGE);
            if let Some(history) = self.history.as_mut() {
                history.pop();
            }
            SendOutcome::FellBack
        };

        self.state = TurnState::Idle;
        outcome
    }

    /// Append a chunk to the last transcript message.
    fn append_to_last(&mut self, chunk: &str) {
        if let Some(last) = self.transcript.last_mut() {
            last.text.push_str(chunk);
        }
    }

    /// Replace the text of the last transcript message.
    fn replace_last(&mut self, text: &str) {
        if let Some(last) = self.transcript.last_mut() {
            last.text = text.to_string();
        }
    }

    #[cfg(test)]
    fn force_state(&mut self, state: TurnState) {
        self.state = state;
    }
}

impl SendOutcome {
    /// True when the transcript gained a user/assistant pair.
    #[must_use]
    pub const fn appended_turn(self) -> bool {
        matches!(self, Self::Replied | Self::FellBack)
    }
}
