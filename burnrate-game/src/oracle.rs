//! Contract with the external simulation oracle.
//!
//! The oracle is an opaque remote generative service: it receives a bounded
//! snapshot of the game plus a player command and answers with structured
//! outcome data. This module defines that boundary: the request snapshot,
//! the `TurnResult` wire shape with its validation rules, and the
//! [`SimulationOracle`] trait an adapter implements. The engine and its
//! tests never depend on a live network; they take any implementation of
//! the trait.
//!
//! Adapters perform no retries: they either return a fully valid result or
//! fail cleanly with an [`OracleError`]. Retry policy, if any, belongs to
//! the caller.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::agent::{AgentRole, AgentStatus};
use crate::events::RandomEvent;
use crate::market::{BusinessPlan, Competitor};
use crate::objectives::Objective;
use crate::state::{AssetKind, GameStage, GameState, GameStatus};

/// Failure at the oracle boundary. A response that fails structural
/// validation is treated identically to a transport failure.
#[derive(Debug, Error)]
pub enum OracleError {
    /// Remote call failed before a response could be read.
    #[error("oracle transport failed: {0}")]
    Transport(String),
    /// Response was not parseable into the expected shape.
    #[error("oracle response was malformed: {0}")]
    Malformed(#[from] serde_json::Error),
    /// Response parsed but violated a contract rule.
    #[error("oracle response invalid: {0}")]
    Validation(&'static str),
}

/// Targeting of an agent update. The wire format is a plain string where
/// `"ANY"` means "the first agent currently IDLE, in stored order".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UpdateTarget {
    Agent(String),
    AnyIdle,
}

impl From<String> for UpdateTarget {
    fn from(value: String) -> Self {
        if value == "ANY" {
            Self::AnyIdle
        } else {
            Self::Agent(value)
        }
    }
}

impl From<UpdateTarget> for String {
    fn from(value: UpdateTarget) -> Self {
        match value {
            UpdateTarget::Agent(id) => id,
            UpdateTarget::AnyIdle => Self::from("ANY"),
        }
    }
}

/// Per-agent outcome of a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentUpdate {
    #[serde(rename = "agentId")]
    pub target: UpdateTarget,
    pub status: AgentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub morale_change: Option<i32>,
}

/// Candidate produced by a hiring outcome. Id, status, and morale are
/// assigned locally by the resolution engine, never by the oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAgentSpec {
    pub name: String,
    pub role: AgentRole,
    pub skill_level: i32,
    #[serde(default)]
    pub traits: Vec<String>,
}

/// Structured outcome of one simulated turn.
///
/// Fields without `#[serde(default)]` are contractually required; their
/// absence fails parsing and thereby the whole turn. The sequences are
/// required but may be empty; an empty `objectivesUpdate` means "no change".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnResult {
    pub cash_change: i64,
    pub user_change: i64,
    pub reputation_change: i32,
    pub product_quality_change: i32,
    pub narrative: String,
    pub agent_updates: Vec<AgentUpdate>,
    pub objectives_update: Vec<Objective>,
    pub suggested_actions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage_progression: Option<GameStage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_status_update: Option<GameStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_agent: Option<NewAgentSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_fired_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub random_event: Option<RandomEvent>,
}

impl TurnResult {
    /// Parse and validate a raw oracle response.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::Malformed`] for unparseable input and
    /// [`OracleError::Validation`] when a parsed result violates the
    /// contract (e.g. empty narrative).
    pub fn from_json(json: &str) -> Result<Self, OracleError> {
        let result: Self = serde_json::from_str(json)?;
        result.validate()?;
        Ok(result)
    }

    /// Contract rules that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::Validation`] naming the offending field.
    pub fn validate(&self) -> Result<(), OracleError> {
        if self.narrative.trim().is_empty() {
            return Err(OracleError::Validation("narrative must be non-empty"));
        }
        Ok(())
    }
}

/// Reply from a 1:1 chat turn with an agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub response: String,
    pub morale_change: i32,
    pub skill_change: i32,
}

impl ChatReply {
    /// Neutral placeholder used when the chat oracle fails; chat must
    /// never block game flow.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            response: String::from("..."),
            morale_change: 0,
            skill_change: 0,
        }
    }
}

/// Request for a generated media asset. Video handles that must be polled
/// to completion are resolved inside the adapter; the core only ever sees
/// a ready-to-use URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRequest {
    pub kind: AssetKind,
    pub prompt: String,
}

/// Condensed agent record included in the turn snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSummary {
    pub id: String,
    pub role: AgentRole,
    pub status: AgentStatus,
    pub morale: i32,
}

/// Bounded request context sent with every turn. Carries enough for the
/// oracle to reason about continuity but never the log history, keeping
/// request size independent of session length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    pub stage: GameStage,
    pub turn: u32,
    pub cash: i64,
    pub users: i64,
    pub product_quality: i32,
    pub agents: Vec<AgentSummary>,
    pub current_objectives: Vec<Objective>,
    pub business_plan: Option<BusinessPlan>,
}

impl StateSnapshot {
    /// Capture the snapshot of a live state.
    #[must_use]
    pub fn of(state: &GameState) -> Self {
        Self {
            stage: state.stage,
            turn: state.turn,
            cash: state.cash,
            users: state.users,
            product_quality: state.product_quality,
            agents: state
                .agents
                .iter()
                .map(|agent| AgentSummary {
                    id: agent.id.clone(),
                    role: agent.role,
                    status: agent.status,
                    morale: agent.morale,
                })
                .collect(),
            current_objectives: state.objectives.clone(),
            business_plan: state.business_plan.clone(),
        }
    }
}

/// The external generative service, abstracted per call shape.
///
/// Implementations are adapters over a remote text/structured-generation
/// service, or deterministic fakes for tests and scripted QA runs.
#[async_trait]
pub trait SimulationOracle: Send + Sync {
    /// Generate the initial business plan from a raw idea.
    async fn generate_plan(&self, idea: &str) -> Result<BusinessPlan, OracleError>;

    /// Simulate one turn of the company against a player command.
    async fn resolve_turn(
        &self,
        snapshot: &StateSnapshot,
        command: &str,
    ) -> Result<TurnResult, OracleError>;

    /// One chat exchange between the CEO and an agent.
    async fn chat(&self, agent: &AgentSummary, message: &str) -> Result<ChatReply, OracleError>;

    /// Search for real-world competitors in the plan's target market.
    async fn analyze_market(&self, target_market: &str) -> Result<Vec<Competitor>, OracleError>;

    /// Produce a media asset and return its final URL.
    async fn generate_media(&self, request: &MediaRequest) -> Result<String, OracleError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_result_json() -> String {
        String::from(
            r#"{
                "cashChange": -6100,
                "userChange": 0,
                "reputationChange": 0,
                "productQualityChange": 5,
                "narrative": "Team focused on the product.",
                "agentUpdates": [{"agentId": "ANY", "status": "WORKING"}],
                "objectivesUpdate": [],
                "suggestedActions": []
            }"#,
        )
    }

    #[test]
    fn parses_minimal_turn_result() {
        let result = TurnResult::from_json(&minimal_result_json()).unwrap();
        assert_eq!(result.cash_change, -6_100);
        assert_eq!(result.agent_updates.len(), 1);
        assert_eq!(result.agent_updates[0].target, UpdateTarget::AnyIdle);
        assert_eq!(result.agent_updates[0].status, AgentStatus::Working);
        assert!(result.agent_updates[0].morale_change.is_none());
        assert!(result.stage_progression.is_none());
    }

    #[test]
    fn missing_required_field_is_an_error() {
        let raw = minimal_result_json().replace("\"narrative\": \"Team focused on the product.\",", "");
        let err = TurnResult::from_json(&raw).unwrap_err();
        assert!(matches!(err, OracleError::Malformed(_)));
    }

    #[test]
    fn empty_narrative_fails_validation() {
        let raw = minimal_result_json().replace("Team focused on the product.", "  ");
        let err = TurnResult::from_json(&raw).unwrap_err();
        assert!(matches!(err, OracleError::Validation(_)));
    }

    #[test]
    fn unparseable_body_is_malformed() {
        let err = TurnResult::from_json("the model apologizes profusely").unwrap_err();
        assert!(matches!(err, OracleError::Malformed(_)));
    }

    #[test]
    fn update_target_round_trips_any_marker() {
        let any: UpdateTarget = String::from("ANY").into();
        assert_eq!(any, UpdateTarget::AnyIdle);
        let exact: UpdateTarget = String::from("dev1").into();
        assert_eq!(exact, UpdateTarget::Agent(String::from("dev1")));
        assert_eq!(String::from(UpdateTarget::AnyIdle), "ANY");

        let json = r#"{"agentId": "dev1", "status": "DONE", "moraleChange": -3}"#;
        let update: AgentUpdate = serde_json::from_str(json).unwrap();
        assert_eq!(update.target, UpdateTarget::Agent(String::from("dev1")));
        assert_eq!(update.morale_change, Some(-3));
    }

    #[test]
    fn snapshot_excludes_history() {
        let mut state = GameState::default();
        state.agents = crate::agent::founding_team();
        state.push_log(
            crate::journal::LogSource::System,
            "secret backlog",
            crate::journal::Sentiment::Neutral,
            0,
        );

        let snapshot = StateSnapshot::of(&state);
        assert_eq!(snapshot.agents.len(), 3);

        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(!json.contains("secret backlog"));
        assert!(!json.contains("history"));
        assert!(json.contains("\"productQuality\""));
    }

    #[test]
    fn optional_blocks_parse_when_present() {
        let raw = r#"{
            "cashChange": 1000,
            "userChange": 50,
            "reputationChange": 1,
            "productQualityChange": 0,
            "narrative": "An investor called back.",
            "agentUpdates": [],
            "objectivesUpdate": [],
            "suggestedActions": ["Close the round"],
            "stageProgression": "SEED",
            "gameStatusUpdate": "PLAYING",
            "newAgent": {"name": "Ravi", "role": "FINANCE", "skillLevel": 77},
            "agentFiredId": "mkt1",
            "randomEvent": {
                "title": "Press Leak",
                "description": "A draft deck leaked to a blog.",
                "type": "MARKET_NEWS",
                "effect": "Reputation volatility this week."
            }
        }"#;
        let result = TurnResult::from_json(raw).unwrap();
        assert_eq!(result.stage_progression, Some(GameStage::Seed));
        assert_eq!(result.game_status_update, Some(GameStatus::Playing));
        let hire = result.new_agent.unwrap();
        assert_eq!(hire.role, AgentRole::Finance);
        assert!(hire.traits.is_empty());
        assert_eq!(result.agent_fired_id.as_deref(), Some("mkt1"));
        assert!(result.random_event.is_some());
    }
}
