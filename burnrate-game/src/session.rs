//! Game session store: the single authoritative `GameState` slot.
//!
//! Every mutation flows through this type: the turn-resolution fold plus a
//! small set of scoped mutators for out-of-band updates (asset append,
//! avatar attach, chat deltas, language and tutorial toggles). Readers only
//! ever see a fully consistent state because each mutator replaces or edits
//! the state within a single `&mut self` call.
//!
//! One global busy semaphore serializes the long oracle operations: a new
//! command is rejected while a turn, market scan, or asset generation is in
//! flight, matching the reference behavior of a single shared flag.

use log::{debug, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

use crate::agent::{AgentRole, founding_team};
use crate::cards::{CardCatalog, deal};
use crate::constants::{
    HAND_SIZE, KICKOFF_COMMAND, MSG_MARKET_SCAN_FAILED, MSG_ONBOARDING_COMPLETE,
    MSG_SIMULATION_FAILED,
};
use crate::journal::{LogSource, Sentiment};
use crate::market::BusinessPlan;
use crate::oracle::{AgentSummary, ChatReply, MediaRequest, SimulationOracle, StateSnapshot};
use crate::state::{Asset, AssetKind, GameState};
use crate::turn::{TurnContext, resolve_turn};

/// Wall-clock abstraction so tests and replays can pin timestamps.
pub trait TimeSource {
    fn now_ms(&self) -> u64;
}

/// Default clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
    }
}

/// Where a command came from; only typed commands echo a CEO log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOrigin {
    Typed,
    Card,
    System,
}

/// Outcome of a command submission. `Failed` means the oracle call failed
/// and was surfaced in-world; the turn counter did not advance and the
/// command may be retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    Resolved,
    Failed,
}

/// Rejections raised before any oracle call is made.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("another operation is already in flight")]
    Busy,
    #[error("the game is not in a playable state")]
    NotPlaying,
    #[error("a game is already in progress")]
    AlreadyStarted,
    #[error("command must not be empty")]
    EmptyCommand,
    #[error("no business plan has been generated yet")]
    NoPlan,
    #[error("card `{0}` is not in the current hand")]
    UnknownCard(String),
    #[error("no agent with id `{0}`")]
    UnknownAgent(String),
    #[error("no chat is currently open")]
    NoActiveChat,
}

/// Avatar generation is fire-and-forget: hiring enqueues a job here, the
/// caller drives it through the oracle whenever convenient, and completion
/// posts back through [`GameSession::attach_avatar`], which is a no-op if
/// the agent was fired in the meantime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarJob {
    pub agent_id: String,
    pub prompt: String,
}

fn avatar_prompt(role: AgentRole) -> String {
    format!(
        "Cyberpunk pixel art portrait of a tech startup {role}, professional, futuristic style, character face close up"
    )
}

/// Owns the game state, the deterministic RNG, and the busy flag.
pub struct GameSession<C: TimeSource = SystemClock> {
    state: GameState,
    catalog: CardCatalog,
    rng: ChaCha20Rng,
    seed: u64,
    busy: bool,
    active_chat_agent: Option<String>,
    avatar_jobs: VecDeque<AvatarJob>,
    clock: C,
}

impl GameSession<SystemClock> {
    /// Session with the built-in card catalog and the system clock.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::with_clock(seed, SystemClock)
    }
}

impl<C: TimeSource> GameSession<C> {
    #[must_use]
    pub fn with_clock(seed: u64, clock: C) -> Self {
        Self::with_catalog(seed, CardCatalog::builtin().clone(), clock)
    }

    #[must_use]
    pub fn with_catalog(seed: u64, catalog: CardCatalog, clock: C) -> Self {
        let state = GameState::new_game(crate::state::Language::default(), &catalog);
        Self {
            state,
            catalog,
            rng: ChaCha20Rng::seed_from_u64(seed),
            seed,
            busy: false,
            active_chat_agent: None,
            avatar_jobs: VecDeque::new(),
            clock,
        }
    }

    /// Borrow the authoritative state.
    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    /// Borrow the state mutably. Intended for scripted QA setups; player
    /// flows go through the named mutators below.
    pub const fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    /// Apply a closure to the mutable game state.
    pub fn with_state_mut<R>(&mut self, f: impl FnOnce(&mut GameState) -> R) -> R {
        f(&mut self.state)
    }

    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.busy
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub fn active_chat_agent(&self) -> Option<&str> {
        self.active_chat_agent.as_deref()
    }

    fn ensure_ready(&self) -> Result<(), SessionError> {
        if self.busy {
            return Err(SessionError::Busy);
        }
        if self.state.status.is_terminal() {
            return Err(SessionError::NotPlaying);
        }
        Ok(())
    }

    /// Generate the business plan and boot the venture: founder roster,
    /// first hand, tutorial, a commissioned logo, and the kickoff turn
    /// that populates the initial objectives.
    ///
    /// Plan generation degrades to the fixed fallback plan on oracle
    /// failure; game start never blocks on the oracle.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when a game is already in progress or an
    /// operation is in flight.
    pub async fn start_game(
        &mut self,
        oracle: &dyn SimulationOracle,
        idea: &str,
    ) -> Result<(), SessionError> {
        if self.busy {
            return Err(SessionError::Busy);
        }
        if self.state.business_plan.is_some() {
            return Err(SessionError::AlreadyStarted);
        }

        self.busy = true;
        let plan = match oracle.generate_plan(idea).await {
            Ok(plan) => plan,
            Err(err) => {
                warn!("plan generation failed, using fallback plan: {err}");
                BusinessPlan::fallback()
            }
        };

        let mut state = GameState::new_game(self.state.language, &self.catalog);
        state.business_plan = Some(plan.clone());
        state.agents = founding_team();
        state.tutorial_active = true;
        let dealt = deal(&self.catalog, &state.deck, HAND_SIZE, &mut self.rng);
        state.hand = dealt.hand;
        state.deck = dealt.deck;
        state.push_log(
            LogSource::System,
            format!("Business Plan Generated: {} - {}", plan.name, plan.mission),
            Sentiment::Positive,
            self.clock.now_ms(),
        );
        self.state = state;
        self.busy = false;

        // Commission the launch logo, then run the kickoff turn that lets
        // the oracle seed the first objectives without player input.
        let logo_prompt = format!(
            "Minimalist futuristic logo for {} on black background",
            plan.name
        );
        self.generate_asset(oracle, AssetKind::Image, &logo_prompt)
            .await?;
        self.execute_command(oracle, KICKOFF_COMMAND, CommandOrigin::System)
            .await?;
        Ok(())
    }

    /// Submit a player command for turn resolution.
    ///
    /// On oracle success the replacement hand is dealt, the result is
    /// folded through the pure resolution engine, and the new state
    /// atomically replaces the old one. On oracle failure the prior state
    /// is kept byte-for-byte except for one in-world failure entry; the
    /// turn counter does not advance, so the command is retryable.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when the session is busy, the game is not
    /// in PLAYING status, or the command is blank.
    pub async fn execute_command(
        &mut self,
        oracle: &dyn SimulationOracle,
        command: &str,
        origin: CommandOrigin,
    ) -> Result<TurnOutcome, SessionError> {
        self.ensure_ready()?;
        if command.trim().is_empty() {
            return Err(SessionError::EmptyCommand);
        }

        self.busy = true;
        if origin == CommandOrigin::Typed {
            let now = self.clock.now_ms();
            self.state
                .push_log(LogSource::Ceo, command, Sentiment::Neutral, now);
        }

        let snapshot = StateSnapshot::of(&self.state);
        let outcome = match oracle.resolve_turn(&snapshot, command).await {
            Ok(result) => {
                let dealt = deal(&self.catalog, &self.state.deck, HAND_SIZE, &mut self.rng);
                let ctx = TurnContext {
                    dealt,
                    now_ms: self.clock.now_ms(),
                };
                let next = resolve_turn(&self.state, &result, ctx);
                if result.new_agent.is_some() {
                    self.enqueue_avatar_for_new_hire(&next);
                }
                debug!(
                    "turn {} resolved: cash {} users {} status {}",
                    next.turn, next.cash, next.users, next.status
                );
                self.state = next;
                TurnOutcome::Resolved
            }
            Err(err) => {
                warn!("turn resolution failed: {err}");
                let now = self.clock.now_ms();
                self.state.push_log(
                    LogSource::System,
                    MSG_SIMULATION_FAILED,
                    Sentiment::Negative,
                    now,
                );
                TurnOutcome::Failed
            }
        };
        self.busy = false;
        Ok(outcome)
    }

    /// Play an action card from the current hand, forwarding its effect
    /// directive verbatim as the turn command.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownCard`] when the card is not in hand,
    /// plus any [`execute_command`](Self::execute_command) rejection.
    pub async fn play_card(
        &mut self,
        oracle: &dyn SimulationOracle,
        card_id: &str,
    ) -> Result<TurnOutcome, SessionError> {
        let Some(card) = self.state.hand.iter().find(|card| card.id == card_id) else {
            return Err(SessionError::UnknownCard(card_id.to_string()));
        };
        let command = format!(
            "[ACTION CARD PLAYED]: {}. Effect: {}",
            card.title, card.effect_directive
        );
        self.execute_command(oracle, &command, CommandOrigin::Card)
            .await
    }

    /// Run a market scan against the plan's target market. The competitor
    /// list is replaced wholesale on success; a failed scan is surfaced as
    /// a logged failure and leaves the list unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when busy, terminal, or before a plan
    /// exists.
    pub async fn analyze_market(
        &mut self,
        oracle: &dyn SimulationOracle,
    ) -> Result<(), SessionError> {
        self.ensure_ready()?;
        let Some(plan) = self.state.business_plan.clone() else {
            return Err(SessionError::NoPlan);
        };

        self.busy = true;
        let now = self.clock.now_ms();
        self.state.push_log(
            LogSource::Ceo,
            "Initiating Global Market Scan...",
            Sentiment::Neutral,
            now,
        );
        match oracle.analyze_market(&plan.target_market).await {
            Ok(competitors) => {
                let count = competitors.len();
                self.state.competitors = competitors;
                let now = self.clock.now_ms();
                self.state.push_log(
                    LogSource::Market,
                    format!("Market Scan Complete. {count} threats identified."),
                    Sentiment::Neutral,
                    now,
                );
            }
            Err(err) => {
                warn!("market scan failed: {err}");
                let now = self.clock.now_ms();
                self.state.push_log(
                    LogSource::System,
                    MSG_MARKET_SCAN_FAILED,
                    Sentiment::Negative,
                    now,
                );
            }
        }
        self.busy = false;
        Ok(())
    }

    /// Commission a media asset. On success it is appended to the gallery;
    /// a failure is surfaced as a logged failure with nothing appended.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when busy or terminal.
    pub async fn generate_asset(
        &mut self,
        oracle: &dyn SimulationOracle,
        kind: AssetKind,
        prompt: &str,
    ) -> Result<(), SessionError> {
        self.ensure_ready()?;

        self.busy = true;
        let team = match kind {
            AssetKind::Image => "Design Team",
            AssetKind::Video => "Video Team",
        };
        let now = self.clock.now_ms();
        self.state.push_log(
            LogSource::Ceo,
            format!("Commissioning {team}: \"{prompt}\""),
            Sentiment::Neutral,
            now,
        );

        let request = MediaRequest {
            kind,
            prompt: prompt.to_string(),
        };
        match oracle.generate_media(&request).await {
            Ok(url) => {
                let id = self.state.next_asset_id();
                let now = self.clock.now_ms();
                self.state.assets.push(Asset {
                    id,
                    kind,
                    url,
                    prompt: prompt.to_string(),
                    created_at: now,
                });
                let produced = match kind {
                    AssetKind::Image => "Concept Art",
                    AssetKind::Video => "Video Ad",
                };
                self.state.push_log(
                    LogSource::Agent,
                    format!("{produced} generated successfully."),
                    Sentiment::Positive,
                    now,
                );
            }
            Err(err) => {
                warn!("asset generation failed: {err}");
                let now = self.clock.now_ms();
                self.state.push_log(
                    LogSource::Agent,
                    format!("Creative Task Failed: {err}"),
                    Sentiment::Negative,
                    now,
                );
            }
        }
        self.busy = false;
        Ok(())
    }

    /// Open a 1:1 chat with an agent.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownAgent`] when no such agent exists.
    pub fn open_chat(&mut self, agent_id: &str) -> Result<(), SessionError> {
        if self.state.agent(agent_id).is_none() {
            return Err(SessionError::UnknownAgent(agent_id.to_string()));
        }
        self.active_chat_agent = Some(agent_id.to_string());
        Ok(())
    }

    pub fn close_chat(&mut self) {
        self.active_chat_agent = None;
    }

    /// One chat exchange with the currently open agent. Chat never blocks
    /// game flow: an oracle failure degrades to a neutral placeholder
    /// reply. Morale and skill deltas apply to the active chat agent only,
    /// clamped to their meters.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoActiveChat`] without an open chat and
    /// [`SessionError::UnknownAgent`] if the agent has left since.
    pub async fn chat(
        &mut self,
        oracle: &dyn SimulationOracle,
        message: &str,
    ) -> Result<ChatReply, SessionError> {
        if self.state.status.is_terminal() {
            return Err(SessionError::NotPlaying);
        }
        let Some(agent_id) = self.active_chat_agent.clone() else {
            return Err(SessionError::NoActiveChat);
        };
        let Some(agent) = self.state.agent(&agent_id) else {
            return Err(SessionError::UnknownAgent(agent_id));
        };

        let profile = AgentSummary {
            id: agent.id.clone(),
            role: agent.role,
            status: agent.status,
            morale: agent.morale,
        };
        let reply = match oracle.chat(&profile, message).await {
            Ok(reply) => reply,
            Err(err) => {
                warn!("agent chat failed, using placeholder reply: {err}");
                ChatReply::fallback()
            }
        };

        if let Some(agent) = self.state.agent_mut(&agent_id) {
            agent.morale += reply.morale_change;
            agent.skill_level += reply.skill_change;
            agent.clamp();
        }
        Ok(reply)
    }

    /// Next queued avatar job, if any. The caller resolves it against the
    /// oracle and posts the result back via [`attach_avatar`](Self::attach_avatar).
    pub fn take_avatar_job(&mut self) -> Option<AvatarJob> {
        self.avatar_jobs.pop_front()
    }

    #[must_use]
    pub fn pending_avatar_jobs(&self) -> usize {
        self.avatar_jobs.len()
    }

    /// Attach a generated avatar to an agent. Idempotent; returns `false`
    /// without touching state when the agent no longer exists or the game
    /// has ended.
    pub fn attach_avatar(&mut self, agent_id: &str, url: &str) -> bool {
        if self.state.status.is_terminal() {
            return false;
        }
        match self.state.agent_mut(agent_id) {
            Some(agent) => {
                agent.avatar_url = Some(url.to_string());
                true
            }
            None => false,
        }
    }

    /// Clear the onboarding flag and note it in the feed.
    pub fn complete_tutorial(&mut self) {
        if !self.state.tutorial_active {
            return;
        }
        self.state.tutorial_active = false;
        let now = self.clock.now_ms();
        self.state.push_log(
            LogSource::System,
            MSG_ONBOARDING_COMPLETE,
            Sentiment::Neutral,
            now,
        );
    }

    pub fn toggle_language(&mut self) {
        self.state.language = self.state.language.toggled();
    }

    /// Full reset to a fresh initial state, preserving only the language
    /// preference. This is the only mutation allowed after WON/LOST.
    pub fn restart(&mut self) {
        self.state = GameState::new_game(self.state.language, &self.catalog);
        self.busy = false;
        self.active_chat_agent = None;
        self.avatar_jobs.clear();
    }

    fn enqueue_avatar_for_new_hire(&mut self, next: &GameState) {
        let hired = next
            .agents
            .iter()
            .find(|agent| self.state.agent(&agent.id).is_none());
        if let Some(agent) = hired {
            self.avatar_jobs.push_back(AvatarJob {
                agent_id: agent.id.clone(),
                prompt: avatar_prompt(agent.role),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{GameStatus, Language};

    struct FixedClock(u64);

    impl TimeSource for FixedClock {
        fn now_ms(&self) -> u64 {
            self.0
        }
    }

    fn session() -> GameSession<FixedClock> {
        GameSession::with_clock(42, FixedClock(1_000))
    }

    #[test]
    fn attach_avatar_is_noop_for_missing_agent() {
        let mut session = session();
        session.state_mut().agents = founding_team();
        assert!(session.attach_avatar("dev1", "data:image/png;base64,xyz"));
        assert_eq!(
            session.state().agent("dev1").unwrap().avatar_url.as_deref(),
            Some("data:image/png;base64,xyz")
        );
        assert!(!session.attach_avatar("ghost", "url"));
    }

    #[test]
    fn attach_avatar_refused_after_game_over() {
        let mut session = session();
        session.state_mut().agents = founding_team();
        session.state_mut().status = GameStatus::Lost;
        assert!(!session.attach_avatar("dev1", "url"));
    }

    #[test]
    fn restart_preserves_language_only() {
        let mut session = session();
        session.toggle_language();
        session.state_mut().cash = 99;
        session.state_mut().status = GameStatus::Lost;
        session.restart();
        assert_eq!(session.state().language, Language::Cn);
        assert_eq!(session.state().cash, crate::constants::INITIAL_CASH);
        assert_eq!(session.state().status, GameStatus::Playing);
        assert!(!session.is_busy());
    }

    #[test]
    fn complete_tutorial_logs_once() {
        let mut session = session();
        session.state_mut().tutorial_active = true;
        session.complete_tutorial();
        session.complete_tutorial();
        let count = session
            .state()
            .history
            .iter()
            .filter(|entry| entry.text == MSG_ONBOARDING_COMPLETE)
            .count();
        assert_eq!(count, 1);
        assert!(!session.state().tutorial_active);
    }

    #[test]
    fn open_chat_requires_known_agent() {
        let mut session = session();
        session.state_mut().agents = founding_team();
        assert_eq!(
            session.open_chat("nobody"),
            Err(SessionError::UnknownAgent(String::from("nobody")))
        );
        assert!(session.open_chat("mkt1").is_ok());
        assert_eq!(session.active_chat_agent(), Some("mkt1"));
        session.close_chat();
        assert!(session.active_chat_agent().is_none());
    }
}
