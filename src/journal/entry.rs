//! Mood entry data model.
//!
//! This module provides:
//! - [`MoodScore`]: the closed 1-5 scale with fixed labels and emoji
//! - [`MoodEntry`]: one immutable check-in record
//!
//! Entries are created once on check-in submission and never edited or
//! deleted. The `timestamp` is the instant the entry is attributed to and may
//! be backdated by the user; it is distinct from wall-clock insertion time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::JournalError;

/// Mood score on the closed 1-5 scale.
///
/// Each value maps to a fixed label and emoji. Serialized as the bare
/// integer so the on-disk journal stays interoperable with the
/// `{id, timestamp, score, note, tags}` record shape.
///
/// # Example
///
/// ```
/// use lumina::journal::MoodScore;
///
/// let score = MoodScore::try_from(4).unwrap();
/// assert_eq!(score, MoodScore::Good);
/// assert_eq!(score.label(), "Good");
/// assert!(MoodScore::try_from(6).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum MoodScore {
    /// Score 1.
    Crisis = 1,
    /// Score 2.
    Struggling = 2,
    /// Score 3.
    Okay = 3,
    /// Score 4.
    Good = 4,
    /// Score 5.
    Great = 5,
}

impl MoodScore {
    /// Fixed display label for this score.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Crisis => "Crisis",
            Self::Struggling => "Struggling",
            Self::Okay => "Okay",
            Self::Good => "Good",
            Self::Great => "Great",
        }
    }

    /// Fixed emoji for this score.
    #[must_use]
    pub const fn emoji(self) -> &'static str {
        match self {
            Self::Crisis => "😫",
            Self::Struggling => "😔",
            Self::Okay => "😐",
            Self::Good => "🙂",
            Self::Great => "🌟",
        }
    }

    /// The numeric value on the 1-5 scale.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// True for the low end of the scale (1 or 2), the range that triggers
    /// the gentle SOS nudge in insight prompts.
    #[must_use]
    pub const fn is_low(self) -> bool {
        matches!(self, Self::Crisis | Self::Struggling)
    }
}

impl TryFrom<u8> for MoodScore {
    type Error = JournalError;

    fn try_from(score: u8) -> Result<Self, Self::Error> {
        match score {
            1 => Ok(Self::Crisis),
            2 => Ok(Self::Struggling),
            3 => Ok(Self::Okay),
            4 => Ok(Self::Good),
            5 => Ok(Self::Great),
            _ => Err(JournalError::InvalidScore { score }),
        }
    }
}

impl From<MoodScore> for u8 {
    fn from(score: MoodScore) -> Self {
        score as Self
    }
}

/// One mood check-in.
///
/// Immutable after creation. Serialized with `timestamp` as integer
/// epoch-milliseconds and `score` as the bare 1-5 integer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MoodEntry {
    /// Unique, stable identifier; never reused.
    pub id: String,
    /// The instant the entry is attributed to (may be backdated).
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    /// Mood score on the 1-5 scale.
    pub score: MoodScore,
    /// Free text, optionally empty.
    pub note: String,
    /// Reserved for future categorization; always present, currently empty
    /// at creation.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl MoodEntry {
    /// Create a new entry with a fresh unique id and empty tags.
    #[must_use]
    pub fn new(score: MoodScore, note: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp,
            score,
            note: note.into(),
            tags: Vec::new(),
        }
    }
}
