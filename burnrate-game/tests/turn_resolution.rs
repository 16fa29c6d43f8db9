//! End-to-end scenarios for the pure turn-resolution engine.

use burnrate_game::{
    Agent, AgentRole, AgentStatus, AgentUpdate, CardCatalog, DealtCards, GameState, GameStatus,
    Objective, ObjectiveCategory, TurnContext, TurnResult, UpdateTarget, deal, founding_team,
    resolve_turn,
};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

fn quiet_result(narrative: &str) -> TurnResult {
    TurnResult {
        cash_change: 0,
        user_change: 0,
        reputation_change: 0,
        product_quality_change: 0,
        narrative: narrative.to_string(),
        agent_updates: Vec::new(),
        objectives_update: Vec::new(),
        suggested_actions: Vec::new(),
        stage_progression: None,
        game_status_update: None,
        new_agent: None,
        agent_fired_id: None,
        random_event: None,
    }
}

fn ctx() -> TurnContext {
    TurnContext {
        dealt: DealtCards::default(),
        now_ms: 1_700_000_000_000,
    }
}

fn idle_company() -> GameState {
    let mut state = GameState::default();
    state.agents = founding_team();
    state
}

#[test]
fn scenario_a_product_focus_week() {
    let mut prior = idle_company();
    prior.cash = 50_000;
    let baseline_morale = prior.agents[0].morale;

    let mut result = quiet_result("Team focused on the product.");
    result.cash_change = -6_100;
    result.product_quality_change = 5;
    result.agent_updates.push(AgentUpdate {
        target: UpdateTarget::AnyIdle,
        status: AgentStatus::Working,
        task_description: None,
        morale_change: Some(-10),
    });

    let next = resolve_turn(&prior, &result, ctx());

    assert_eq!(next.cash, 43_900);
    assert_eq!(next.status, GameStatus::Playing);
    assert_eq!(next.turn, prior.turn + 1);
    assert_eq!(next.product_quality, prior.product_quality + 5);

    let working: Vec<&Agent> = next
        .agents
        .iter()
        .filter(|agent| agent.status == AgentStatus::Working)
        .collect();
    assert_eq!(working.len(), 1, "one previously-idle agent starts working");
    // -10 from the oracle plus +5 resting regeneration (was IDLE).
    assert_eq!(working[0].morale, baseline_morale - 5);
}

#[test]
fn scenario_b_bankruptcy_is_locally_enforced() {
    let mut prior = idle_company();
    prior.cash = 1_000;

    let mut result = quiet_result("Payroll cleared, nothing else did.");
    result.cash_change = -5_000;
    result.game_status_update = Some(GameStatus::Playing);

    let next = resolve_turn(&prior, &result, ctx());
    assert_eq!(next.cash, -4_000);
    assert_eq!(next.status, GameStatus::Lost);
}

#[test]
fn objective_completion_emits_exactly_one_entry() {
    let mut prior = idle_company();
    prior.objectives = vec![Objective {
        id: String::from("o1"),
        description: String::from("Reach 100 users"),
        reward: String::from("$5,000"),
        is_completed: false,
        category: ObjectiveCategory::Growth,
    }];

    let mut result = quiet_result("The counter ticked over 100.");
    result.objectives_update = vec![Objective {
        id: String::from("o1"),
        description: String::from("Reach 100 users"),
        reward: String::from("$5,000"),
        is_completed: true,
        category: ObjectiveCategory::Growth,
    }];

    let next = resolve_turn(&prior, &result, ctx());
    let completions: Vec<_> = next
        .history
        .iter()
        .filter(|entry| entry.text.starts_with("OBJECTIVE COMPLETE"))
        .collect();
    assert_eq!(completions.len(), 1);
    assert!(completions[0].text.contains("Reach 100 users"));
}

#[test]
fn meters_stay_bounded_across_chaotic_turns() {
    let mut rng = ChaCha20Rng::seed_from_u64(0xB0A2D);
    let catalog = CardCatalog::builtin();

    for seed in 0_u64..8 {
        let mut turn_rng = ChaCha20Rng::seed_from_u64(seed);
        let mut state = idle_company();

        for round in 0..60 {
            let mut result = quiet_result("Chaos reigns.");
            result.cash_change = turn_rng.gen_range(-30_000..30_000);
            result.user_change = turn_rng.gen_range(-5_000..5_000);
            result.reputation_change = turn_rng.gen_range(-80..80);
            result.product_quality_change = turn_rng.gen_range(-80..80);

            let dealt = deal(catalog, &state.deck, 4, &mut rng);
            let context = TurnContext {
                dealt,
                now_ms: round,
            };
            let prior_turn = state.turn;
            let next = resolve_turn(&state, &result, context);

            assert!((0..=100).contains(&next.reputation));
            assert!((0..=100).contains(&next.product_quality));
            assert!(next.users >= 0);
            assert_eq!(next.turn, prior_turn + 1);
            assert_eq!(next.hand.len(), 4);
            assert!(next.hand.iter().all(|card| catalog.contains(&card.id)));
            for agent in &next.agents {
                assert!((0..=100).contains(&agent.morale));
            }

            if next.cash < 0 {
                assert_eq!(next.status, GameStatus::Lost);
                break;
            }
            state = next;
        }
    }
}

#[test]
fn exact_id_update_beats_wildcard_for_named_agent() {
    let prior = idle_company();
    let mut result = quiet_result("Mia takes point on the redesign.");
    result.agent_updates.push(AgentUpdate {
        target: UpdateTarget::Agent(String::from("des1")),
        status: AgentStatus::Working,
        task_description: Some(String::from("Redesign onboarding")),
        morale_change: None,
    });

    let next = resolve_turn(&prior, &result, ctx());
    let mia = next
        .agents
        .iter()
        .find(|agent| agent.id == "des1")
        .unwrap();
    assert_eq!(mia.status, AgentStatus::Working);
    assert_eq!(mia.role, AgentRole::Designer);
    // The two agents ahead of Mia in roster order stay idle.
    assert_eq!(next.agents[0].status, AgentStatus::Idle);
    assert_eq!(next.agents[1].status, AgentStatus::Idle);
}

#[test]
fn hire_and_fire_in_one_turn_keeps_roster_consistent() {
    let prior = idle_company();
    let mut result = quiet_result("One in, one out.");
    result.new_agent = Some(burnrate_game::NewAgentSpec {
        name: String::from("Ravi"),
        role: AgentRole::Finance,
        skill_level: 70,
        traits: Vec::new(),
    });
    result.agent_fired_id = Some(String::from("dev1"));

    let next = resolve_turn(&prior, &result, ctx());
    assert_eq!(next.agents.len(), 3);
    assert!(next.agents.iter().all(|agent| agent.id != "dev1"));
    assert!(next.agents.iter().any(|agent| agent.name == "Ravi"));
}
