//! Deterministic scripted oracle used for QA runs.
//!
//! Reproduces the reference economy (salary burn, server cost, quality-
//! scaled revenue) plus occasional events, hires, and objective churn,
//! all drawn from a seeded RNG so every run is reproducible by seed. An
//! optional failure cadence makes every k-th turn call fail, exercising
//! the engine's failure-recovery path.

use std::sync::Mutex;

use async_trait::async_trait;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use burnrate_game::{
    AgentRole, AgentStatus, AgentSummary, AgentUpdate, BusinessPlan, ChatReply, Competitor,
    EventKind, GameStage, GameStatus, MediaRequest, NewAgentSpec, Objective, ObjectiveCategory,
    OracleError, RandomEvent, SimulationOracle, StateSnapshot, TurnResult, UpdateTarget,
};

const WEEKLY_BURN_PER_AGENT: i64 = 2_000;
const MAX_ROSTER: usize = 8;

const HIRE_POOL: [(&str, AgentRole); 4] = [
    ("Ravi", AgentRole::Finance),
    ("Lena", AgentRole::Product),
    ("Jonas", AgentRole::Engineer),
    ("Priya", AgentRole::Marketing),
];

pub struct ScriptedOracle {
    rng: Mutex<ChaCha20Rng>,
    turn_calls: Mutex<u64>,
    /// Every k-th `resolve_turn` call fails when non-zero.
    fail_every: u64,
}

impl ScriptedOracle {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(ChaCha20Rng::seed_from_u64(seed)),
            turn_calls: Mutex::new(0),
            fail_every: 0,
        }
    }

    #[must_use]
    pub fn with_failure_cadence(seed: u64, fail_every: u64) -> Self {
        Self {
            fail_every,
            ..Self::new(seed)
        }
    }

    fn objectives_for_stage(stage: GameStage) -> Vec<Objective> {
        let specs: [(&str, &str, &str, ObjectiveCategory); 3] = match stage {
            GameStage::Garage => [
                ("obj-mvp", "Ship a working MVP", "+5 Rep", ObjectiveCategory::Product),
                ("obj-users", "Reach 100 active users", "$5,000", ObjectiveCategory::Growth),
                ("obj-hire", "Make your first hire", "+3 Rep", ObjectiveCategory::Hiring),
            ],
            GameStage::Seed => [
                ("obj-round", "Close the seed round", "$50,000", ObjectiveCategory::Financial),
                ("obj-1k", "Reach 1,000 active users", "+5 Rep", ObjectiveCategory::Growth),
                ("obj-q50", "Push product quality past 50", "+5 Rep", ObjectiveCategory::Product),
            ],
            GameStage::Growth | GameStage::Ipo => [
                ("obj-10k", "Reach 10,000 active users", "$100,000", ObjectiveCategory::Growth),
                ("obj-team", "Grow the team to six", "+5 Rep", ObjectiveCategory::Hiring),
                ("obj-q80", "Push product quality past 80", "+10 Rep", ObjectiveCategory::Product),
            ],
        };
        specs
            .into_iter()
            .map(|(id, description, reward, category)| Objective {
                id: id.to_string(),
                description: description.to_string(),
                reward: reward.to_string(),
                is_completed: false,
                category,
            })
            .collect()
    }

    fn refresh_objectives(snapshot: &StateSnapshot) -> Vec<Objective> {
        if snapshot.current_objectives.is_empty() {
            return Self::objectives_for_stage(snapshot.stage);
        }
        let mut objectives = snapshot.current_objectives.clone();
        let mut changed = false;
        for objective in &mut objectives {
            if objective.is_completed {
                continue;
            }
            let met = match objective.id.as_str() {
                "obj-users" => snapshot.users >= 100,
                "obj-1k" => snapshot.users >= 1_000,
                "obj-10k" => snapshot.users >= 10_000,
                "obj-hire" => snapshot.agents.len() > 3,
                "obj-team" => snapshot.agents.len() >= 6,
                "obj-q50" => snapshot.product_quality > 50,
                "obj-q80" => snapshot.product_quality > 80,
                _ => false,
            };
            if met {
                objective.is_completed = true;
                changed = true;
            }
        }
        // Unchanged list means "no change" on the wire.
        if changed { objectives } else { Vec::new() }
    }
}

#[async_trait]
impl SimulationOracle for ScriptedOracle {
    async fn generate_plan(&self, idea: &str) -> Result<BusinessPlan, OracleError> {
        let valuation = {
            let mut rng = self.rng.lock().expect("rng lock poisoned");
            rng.gen_range(500_000..5_000_000)
        };
        Ok(BusinessPlan {
            name: String::from("Burnrate Labs"),
            mission: format!("Deliver on: {idea}"),
            target_market: String::from("Early adopters"),
            revenue_model: String::from("SaaS Subscription"),
            estimated_valuation: valuation,
        })
    }

    async fn resolve_turn(
        &self,
        snapshot: &StateSnapshot,
        command: &str,
    ) -> Result<TurnResult, OracleError> {
        {
            let mut calls = self.turn_calls.lock().expect("call counter lock poisoned");
            *calls += 1;
            if self.fail_every > 0 && *calls % self.fail_every == 0 {
                return Err(OracleError::Transport(String::from(
                    "scripted outage window",
                )));
            }
        }

        let mut rng = self.rng.lock().expect("rng lock poisoned");
        let headcount = i64::try_from(snapshot.agents.len()).unwrap_or(0);
        let burn = headcount * WEEKLY_BURN_PER_AGENT + snapshot.users / 10;
        let revenue = snapshot.users * i64::from(snapshot.product_quality) / 200;
        let windfall = if command.contains("Seed Pitch") && snapshot.product_quality > 30 {
            rng.gen_range(10_000..40_000)
        } else {
            0
        };

        let user_change = if command.contains("Viral Campaign") {
            rng.gen_range(200..800)
        } else {
            rng.gen_range(0..60) + snapshot.users / 20
        };
        let quality_change = if command.contains("Code Sprint") {
            rng.gen_range(4..9)
        } else {
            rng.gen_range(0..3)
        };

        let mut result = TurnResult {
            cash_change: revenue + windfall - burn,
            user_change,
            reputation_change: rng.gen_range(-2..3),
            product_quality_change: quality_change,
            narrative: format!("Week {} at the office: {command}", snapshot.turn),
            agent_updates: vec![AgentUpdate {
                target: UpdateTarget::AnyIdle,
                status: AgentStatus::Working,
                task_description: Some(format!("Executing: {command}")),
                morale_change: Some(rng.gen_range(-4..2)),
            }],
            objectives_update: Self::refresh_objectives(snapshot),
            suggested_actions: if rng.gen_bool(0.5) {
                vec![
                    String::from("Double down on what worked"),
                    String::from("Talk to your users"),
                ]
            } else {
                Vec::new()
            },
            stage_progression: None,
            game_status_update: None,
            new_agent: None,
            agent_fired_id: None,
            random_event: None,
        };

        if snapshot.users > 5_000 && snapshot.stage != GameStage::Ipo {
            result.stage_progression = Some(GameStage::Growth);
        } else if snapshot.users > 500 && snapshot.stage == GameStage::Garage {
            result.stage_progression = Some(GameStage::Seed);
        }

        if (command.contains("Scout Talent") || rng.gen_bool(0.1))
            && snapshot.agents.len() < MAX_ROSTER
        {
            let (name, role) = HIRE_POOL[rng.gen_range(0..HIRE_POOL.len())];
            result.new_agent = Some(NewAgentSpec {
                name: name.to_string(),
                role,
                skill_level: rng.gen_range(55..95),
                traits: vec![String::from("Scripted")],
            });
        }

        if rng.gen_bool(0.15) {
            let crisis = rng.gen_bool(0.5);
            result.random_event = Some(RandomEvent {
                title: if crisis {
                    String::from("Server Outage")
                } else {
                    String::from("Press Mention")
                },
                description: String::from("The simulation stirred up some chaos."),
                kind: if crisis {
                    EventKind::Crisis
                } else {
                    EventKind::Opportunity
                },
                effect: String::from("Expect metric swings next week."),
                choices: Vec::new(),
            });
        }

        if snapshot.stage == GameStage::Ipo && snapshot.users > 20_000 {
            result.game_status_update = Some(GameStatus::Won);
        }

        Ok(result)
    }

    async fn chat(&self, agent: &AgentSummary, _message: &str) -> Result<ChatReply, OracleError> {
        let mut rng = self.rng.lock().expect("rng lock poisoned");
        Ok(ChatReply {
            response: format!("{} nods thoughtfully.", agent.id),
            morale_change: rng.gen_range(-5..15),
            skill_change: rng.gen_range(0..3),
        })
    }

    async fn analyze_market(&self, target_market: &str) -> Result<Vec<Competitor>, OracleError> {
        Ok(vec![
            Competitor {
                name: String::from("Incumbent Corp"),
                description: format!("Owns distribution in {target_market}"),
                url: String::from("https://incumbent.example"),
                market_share: 35.0,
            },
            Competitor {
                name: String::from("FastFollower"),
                description: String::from("Shipped a clone last quarter"),
                url: String::from("https://fastfollower.example"),
                market_share: 12.0,
            },
        ])
    }

    async fn generate_media(&self, request: &MediaRequest) -> Result<String, OracleError> {
        Ok(format!(
            "data:image/png;base64,scripted-{}",
            request.prompt.len()
        ))
    }
}
