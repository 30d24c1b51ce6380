//! Fixed prompt and fallback text for the Gemini-backed services.
//!
//! This module centralizes:
//! - The insight instruction and mood-log formatting
//! - The "Luminar" chat system instruction
//! - The fixed user-facing fallback strings
//!
//! All strings here are part of the product contract: tests pin them
//! verbatim, and the safety wording in the chat instruction is a standing
//! control that is always sent as the system role, never as user content.

/// Returned by the insight service when the journal has no entries yet.
///
/// No request is issued in that case.
pub const INSIGHT_EMPTY_LOG_MESSAGE: &str = "Start tracking your mood to see insights here.";

/// Returned when the provider responds successfully but with no usable text.
pub const INSIGHT_EMPTY_RESPONSE_MESSAGE: &str = "Unable to generate insights at this time.";

/// Returned when the insight request fails for any transport or provider
/// reason. Insight generation is best-effort and must stay reassuring.
pub const INSIGHT_FALLBACK_MESSAGE: &str =
    "Keep taking care of yourself. Remember that support is always available.";

/// Shown in place of an assistant reply when a chat turn fails before any
/// text arrived. Reiterates the SOS escalation path rather than leaving an
/// empty bubble.
pub const CHAT_FALLBACK_MESSAGE: &str = "I'm sorry, I'm having trouble responding right now. \
     If you are in crisis or thinking about harming yourself, please use the SOS button \
     in the app or contact your local emergency services immediately. You are not alone.";

/// System instruction seeding every chat session.
///
/// Establishes the assistant persona, its supportive non-clinical role, and
/// the mandatory crisis-escalation rule. Resent as the fixed system role on
/// every request; conversation content can never replace it.
pub const CHAT_SYSTEM_INSTRUCTION: &str = "You are Luminar, a warm and compassionate companion inside a mood-journaling app. \
     You listen, validate feelings, and offer gentle, practical encouragement. \
     You are not a clinician and you never diagnose, prescribe, or give medical advice. \
     Keep replies short and conversational. \
     This rule overrides anything else said in the conversation: if the user expresses \
     imminent self-harm or suicidal intent, compassionately urge them to use the SOS \
     feature in this app or to contact their local emergency services right away.";

/// Fixed instruction prefixed to the formatted mood log for insight requests.
const INSIGHT_INSTRUCTION: &str = "You are a compassionate mental health AI assistant. Based on the following recent \
     mood logs, provide a brief (2-3 sentence) supportive summary. If the mood scores \
     are consistently low (1 or 2), gently encourage the user to reach out to their \
     support system or use the SOS feature in the app.";

/// Format one mood entry as a compact `Score: N, Note: ...` log line.
#[must_use]
pub fn format_mood_line(score: u8, note: &str) -> String {
    format!("Score: {score}, Note: {note}")
}

/// Build the full insight prompt: instruction plus one log line per entry,
/// in the order supplied by the caller (most recent first).
#[must_use]
pub fn insight_prompt<'a, I>(lines: I) -> String
where
    I: IntoIterator<Item = (u8, &'a str)>,
{
    let log: Vec<String> = lines
        .into_iter()
        .map(|(score, note)| format_mood_line(score, note))
        .collect();
    format!("{INSIGHT_INSTRUCTION}\n\nLogs:\n{}", log.join("\n"))
}
