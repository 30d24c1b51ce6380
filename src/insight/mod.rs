//! LLM-backed insight generation over a recent mood window.
//!
//! Single-shot, best-effort: the service never returns an error to its
//! caller. Every failure mode collapses to one of three fixed strings so
//! the surrounding UI can render whatever comes back verbatim, online or
//! offline.

use crate::journal::MoodEntry;
use crate::prompts;
use crate::provider::{Content, GenerateRequest, GenerationConfig, Provider};

pub use crate::prompts::{
    INSIGHT_EMPTY_LOG_MESSAGE, INSIGHT_EMPTY_RESPONSE_MESSAGE, INSIGHT_FALLBACK_MESSAGE,
};

/// Generates short supportive reflections from a window of mood entries.
///
/// Stateless and safely callable concurrently; callers should debounce on
/// rapid successive entry mutations (one call per entry-list change).
#[derive(Debug)]
pub struct InsightService<P> {
    provider: P,
    model: String,
}

impl<P: Provider> InsightService<P> {
    /// Create a service over the given provider and model.
    pub fn new(provider: P, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Produce a 2-3 sentence supportive reflection for the given window.
    ///
    /// The window is expected in most-to-least-recent order; the caller
    /// supplies the last entries by attributed timestamp. An empty window
    /// returns [`INSIGHT_EMPTY_LOG_MESSAGE`] without issuing a request.
    ///
    /// Never returns an empty string and never fails: provider errors are
    /// logged and replaced by [`INSIGHT_FALLBACK_MESSAGE`].
    pub async fn analyze_trend(&self, window: &[MoodEntry]) -> String {
        if window.is_empty() {
            return INSIGHT_EMPTY_LOG_MESSAGE.to_string();
        }

        let prompt = prompts::insight_prompt(
            window
                .iter()
                .map(|e| (e.score.as_u8(), e.note.as_str())),
        );

        let request = GenerateRequest::new(&self.model, vec![Content::user(prompt)])
            .with_generation_config(GenerationConfig::moderate());

        match self.provider.generate(request).await {
            Ok(response) => {
                let text = response.text();
                if text.trim().is_empty() {
                    tracing::debug!("insight response carried no text");
                    INSIGHT_EMPTY_RESPONSE_MESSAGE.to_string()
                } else {
                    text
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "insight generation failed, using fallback");
                INSIGHT_FALLBACK_MESSAGE.to_string()
            }
        }
    }
}
