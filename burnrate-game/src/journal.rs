//! Append-only narrative log shared by every subsystem.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Origin of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogSource {
    System,
    Ceo,
    Agent,
    Market,
    Event,
}

impl LogSource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "SYSTEM",
            Self::Ceo => "CEO",
            Self::Agent => "AGENT",
            Self::Market => "MARKET",
            Self::Event => "EVENT",
        }
    }
}

impl fmt::Display for LogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Emotional tone attached to an entry, used by the presentation layer only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    #[default]
    Neutral,
    Positive,
    Negative,
    Critical,
}

/// Immutable once appended; the history is never reordered or pruned here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: String,
    pub turn: u32,
    pub source: LogSource,
    pub text: String,
    pub sentiment: Sentiment,
    /// Milliseconds since the Unix epoch, supplied by the session clock.
    pub timestamp: u64,
}
