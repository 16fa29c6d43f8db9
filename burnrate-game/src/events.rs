//! Random world events issued by the oracle. At most one event is pending
//! at a time; events do not persist across turns unless re-issued.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    Opportunity,
    Crisis,
    MarketNews,
}

impl EventKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Opportunity => "OPPORTUNITY",
            Self::Crisis => "CRISIS",
            Self::MarketNews => "MARKET_NEWS",
        }
    }

    #[must_use]
    pub const fn is_crisis(self) -> bool {
        matches!(self, Self::Crisis)
    }
}

/// Interactive follow-up offered by an event; `action` is forwarded as the
/// next turn's command when the player takes the choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventChoice {
    pub label: String,
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomEvent {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Narrative description of the mechanical effect.
    pub effect: String,
    #[serde(default)]
    pub choices: Vec<EventChoice>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_kind_wire_spelling() {
        let json = serde_json::to_string(&EventKind::MarketNews).unwrap();
        assert_eq!(json, "\"MARKET_NEWS\"");
        assert!(EventKind::Crisis.is_crisis());
        assert!(!EventKind::Opportunity.is_crisis());
    }

    #[test]
    fn event_parses_without_choices() {
        let raw = r#"{
            "title": "Server Outage",
            "description": "The primary region went dark overnight.",
            "type": "CRISIS",
            "effect": "Users are churning until resolved."
        }"#;
        let event: RandomEvent = serde_json::from_str(raw).unwrap();
        assert!(event.choices.is_empty());
        assert_eq!(event.kind, EventKind::Crisis);
    }
}
