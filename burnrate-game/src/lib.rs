//! Burnrate Game Engine
//!
//! Platform-agnostic core for Burnrate, a satirical startup-simulation
//! game driven by an external generative oracle. This crate provides the
//! turn-resolution state machine, the card deck manager, the oracle
//! contract, and the session store, without UI, network, or
//! platform-specific dependencies. Adapters implement
//! [`SimulationOracle`] against a real service; tests and the QA harness
//! inject deterministic fakes.

pub mod agent;
pub mod cards;
pub mod constants;
pub mod events;
pub mod journal;
pub mod market;
pub mod objectives;
pub mod oracle;
pub mod session;
pub mod state;
pub mod turn;

// Re-export commonly used types
pub use agent::{Agent, AgentRole, AgentStatus, founding_team};
pub use cards::{ActionCard, CardCatalog, CardCategory, DealtCards, deal};
pub use constants::HAND_SIZE;
pub use events::{EventChoice, EventKind, RandomEvent};
pub use journal::{LogEntry, LogSource, Sentiment};
pub use market::{BusinessPlan, Competitor};
pub use objectives::{Objective, ObjectiveCategory};
pub use oracle::{
    AgentSummary, AgentUpdate, ChatReply, MediaRequest, NewAgentSpec, OracleError,
    SimulationOracle, StateSnapshot, TurnResult, UpdateTarget,
};
pub use session::{
    AvatarJob, CommandOrigin, GameSession, SessionError, SystemClock, TimeSource, TurnOutcome,
};
pub use state::{
    Asset, AssetKind, GameStage, GameState, GameStatus, Language, SuggestionList,
};
pub use turn::{TurnContext, resolve_turn};
