//! The single mutable game aggregate and its derived display metrics.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

use crate::agent::Agent;
use crate::cards::{ActionCard, CardCatalog};
use crate::constants::{
    DEFAULT_SUGGESTIONS, INITIAL_CASH, INITIAL_PRODUCT_QUALITY, INITIAL_REPUTATION,
    INFRA_USERS_PER_DOLLAR, METER_MAX, METER_MIN, REVENUE_DIVISOR, WEEKLY_BURN_PER_AGENT,
};
use crate::events::RandomEvent;
use crate::journal::{LogEntry, LogSource, Sentiment};
use crate::market::{BusinessPlan, Competitor};
use crate::objectives::Objective;

/// Suggestions are a bounded triple in practice.
pub type SuggestionList = SmallVec<[String; 3]>;

/// Terminal once WON or LOST; all mutation thereafter is disallowed except
/// a full reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum GameStatus {
    #[default]
    Playing,
    Won,
    Lost,
}

impl GameStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Playing => "PLAYING",
            Self::Won => "WON",
            Self::Lost => "LOST",
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Playing)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse lifecycle phase of the simulated company. The oracle may assign
/// any value; no monotonicity is enforced here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum GameStage {
    #[default]
    Garage,
    Seed,
    Growth,
    Ipo,
}

impl GameStage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Garage => "GARAGE",
            Self::Seed => "SEED",
            Self::Growth => "GROWTH",
            Self::Ipo => "IPO",
        }
    }
}

impl fmt::Display for GameStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameStage {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GARAGE" => Ok(Self::Garage),
            "SEED" => Ok(Self::Seed),
            "GROWTH" => Ok(Self::Growth),
            "IPO" => Ok(Self::Ipo),
            _ => Err(()),
        }
    }
}

/// UI language preference. String tables live in the presentation layer;
/// only the preference survives a restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Language {
    #[default]
    En,
    Cn,
}

impl Language {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::En => Self::Cn,
            Self::Cn => Self::En,
        }
    }
}

/// A generated media reference. Assets are append-only and never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AssetKind,
    pub url: String,
    pub prompt: String,
    pub created_at: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AssetKind {
    Image,
    Video,
}

impl AssetKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Image => "IMAGE",
            Self::Video => "VIDEO",
        }
    }
}

/// Single mutable aggregate owned exclusively by the game session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub status: GameStatus,
    pub stage: GameStage,
    pub turn: u32,
    pub cash: i64,
    /// Delta from the last resolved turn, display only.
    #[serde(default)]
    pub last_cash_change: i64,
    pub users: i64,
    #[serde(default)]
    pub last_user_change: i64,
    /// 0..=100
    pub reputation: i32,
    /// 0..=100
    pub product_quality: i32,
    #[serde(default)]
    pub history: Vec<LogEntry>,
    #[serde(default)]
    pub agents: Vec<Agent>,
    #[serde(default)]
    pub business_plan: Option<BusinessPlan>,
    #[serde(default)]
    pub assets: Vec<Asset>,
    #[serde(default)]
    pub competitors: Vec<Competitor>,
    #[serde(default)]
    pub objectives: Vec<Objective>,
    #[serde(default)]
    pub suggested_commands: SuggestionList,
    #[serde(default)]
    pub active_event: Option<RandomEvent>,
    #[serde(default)]
    pub tutorial_active: bool,
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub hand: Vec<ActionCard>,
    #[serde(default)]
    pub deck: Vec<ActionCard>,
    #[serde(default)]
    pub(crate) log_seq: u64,
    #[serde(default)]
    pub(crate) agent_seq: u64,
    #[serde(default)]
    pub(crate) asset_seq: u64,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new_game(Language::default(), CardCatalog::builtin())
    }
}

impl GameState {
    /// Fresh pre-plan state: full deck, empty hand, no roster yet.
    #[must_use]
    pub fn new_game(language: Language, catalog: &CardCatalog) -> Self {
        Self {
            status: GameStatus::Playing,
            stage: GameStage::Garage,
            turn: 1,
            cash: INITIAL_CASH,
            last_cash_change: 0,
            users: 0,
            last_user_change: 0,
            reputation: INITIAL_REPUTATION,
            product_quality: INITIAL_PRODUCT_QUALITY,
            history: Vec::new(),
            agents: Vec::new(),
            business_plan: None,
            assets: Vec::new(),
            competitors: Vec::new(),
            objectives: Vec::new(),
            suggested_commands: default_suggestions(),
            active_event: None,
            tutorial_active: false,
            language,
            hand: Vec::new(),
            deck: catalog.cards.clone(),
            log_seq: 0,
            agent_seq: 0,
            asset_seq: 0,
        }
    }

    /// Append a log entry stamped with the current turn. The id sequence is
    /// part of the state so the turn fold stays a pure function.
    pub fn push_log(
        &mut self,
        source: LogSource,
        text: impl Into<String>,
        sentiment: Sentiment,
        timestamp: u64,
    ) {
        self.log_seq += 1;
        self.history.push(LogEntry {
            id: format!("log-{:06}", self.log_seq),
            turn: self.turn,
            source,
            text: text.into(),
            sentiment,
            timestamp,
        });
    }

    /// Allocate the next unique agent id for a hire.
    pub(crate) fn next_agent_id(&mut self) -> String {
        self.agent_seq += 1;
        format!("hire-{:04}", self.agent_seq)
    }

    /// Allocate the next unique asset id.
    pub(crate) fn next_asset_id(&mut self) -> String {
        self.asset_seq += 1;
        format!("asset-{:04}", self.asset_seq)
    }

    #[must_use]
    pub fn agent(&self, agent_id: &str) -> Option<&Agent> {
        self.agents.iter().find(|agent| agent.id == agent_id)
    }

    pub fn agent_mut(&mut self, agent_id: &str) -> Option<&mut Agent> {
        self.agents.iter_mut().find(|agent| agent.id == agent_id)
    }

    /// Clamp reputation and product quality to their meters.
    pub fn clamp_meters(&mut self) {
        self.reputation = self.reputation.clamp(METER_MIN, METER_MAX);
        self.product_quality = self.product_quality.clamp(METER_MIN, METER_MAX);
    }

    /// Weekly cash outflow: headcount salaries plus server cost.
    #[must_use]
    pub fn weekly_burn(&self) -> i64 {
        let headcount = i64::try_from(self.agents.len()).unwrap_or(0);
        headcount * WEEKLY_BURN_PER_AGENT + self.users / INFRA_USERS_PER_DOLLAR
    }

    /// Weekly revenue estimate: $0.50 per user scaled by product quality.
    #[must_use]
    pub fn weekly_revenue(&self) -> i64 {
        self.users * i64::from(self.product_quality) / REVENUE_DIVISOR
    }

    /// Weeks of cash left at the current burn; `None` when burn is zero.
    #[must_use]
    pub fn runway_weeks(&self) -> Option<i64> {
        let burn = self.weekly_burn();
        if burn <= 0 {
            None
        } else {
            Some((self.cash / burn).max(0))
        }
    }
}

pub(crate) fn default_suggestions() -> SuggestionList {
    DEFAULT_SUGGESTIONS
        .iter()
        .map(|s| (*s).to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::founding_team;

    #[test]
    fn new_game_matches_initial_balance() {
        let state = GameState::default();
        assert_eq!(state.status, GameStatus::Playing);
        assert_eq!(state.stage, GameStage::Garage);
        assert_eq!(state.turn, 1);
        assert_eq!(state.cash, 50_000);
        assert_eq!(state.reputation, 50);
        assert_eq!(state.product_quality, 10);
        assert!(state.hand.is_empty());
        assert_eq!(state.deck.len(), CardCatalog::builtin().len());
        assert_eq!(state.suggested_commands.len(), 3);
    }

    #[test]
    fn push_log_allocates_sequential_ids() {
        let mut state = GameState::default();
        state.push_log(LogSource::System, "boot", Sentiment::Neutral, 1_000);
        state.push_log(LogSource::Ceo, "go", Sentiment::Neutral, 2_000);
        assert_eq!(state.history.len(), 2);
        assert_eq!(state.history[0].id, "log-000001");
        assert_eq!(state.history[1].id, "log-000002");
        assert_eq!(state.history[1].turn, 1);
        assert_eq!(state.history[1].timestamp, 2_000);
    }

    #[test]
    fn derived_financials_follow_the_economy_rules() {
        let mut state = GameState::default();
        state.agents = founding_team();
        state.users = 1_000;
        state.product_quality = 50;

        // 3 * 2000 + 1000 / 10
        assert_eq!(state.weekly_burn(), 6_100);
        // 1000 * 50 / 200
        assert_eq!(state.weekly_revenue(), 250);
        assert_eq!(state.runway_weeks(), Some(50_000 / 6_100));
    }

    #[test]
    fn runway_is_none_without_burn() {
        let state = GameState::new_game(Language::En, &CardCatalog::empty());
        assert_eq!(state.weekly_burn(), 0);
        assert!(state.runway_weeks().is_none());
    }

    #[test]
    fn clamp_meters_bounds_both_meters() {
        let mut state = GameState::default();
        state.reputation = 180;
        state.product_quality = -20;
        state.clamp_meters();
        assert_eq!(state.reputation, 100);
        assert_eq!(state.product_quality, 0);
    }

    #[test]
    fn stage_round_trips_through_str() {
        for stage in [
            GameStage::Garage,
            GameStage::Seed,
            GameStage::Growth,
            GameStage::Ipo,
        ] {
            assert_eq!(stage.as_str().parse::<GameStage>(), Ok(stage));
        }
        assert!("EXIT".parse::<GameStage>().is_err());
    }

    #[test]
    fn language_toggle_flips_both_ways() {
        assert_eq!(Language::En.toggled(), Language::Cn);
        assert_eq!(Language::Cn.toggled(), Language::En);
    }
}
