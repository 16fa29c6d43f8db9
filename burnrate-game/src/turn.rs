//! Turn-resolution engine: folds an oracle result into the prior state.
//!
//! `resolve_turn` is a pure, total, synchronous function. Given any
//! structurally valid `TurnResult` it produces a new consistent state
//! without panicking; every side effect (the oracle call, the shuffle, the
//! clock) happens before the fold and arrives here as plain data. If the
//! oracle call failed, this function is never reached: the session logs a
//! failure entry and leaves the prior state untouched, so a failed turn is
//! retryable without desynchronizing state.

use crate::agent::{Agent, AgentStatus};
use crate::cards::DealtCards;
use crate::constants::{HIRE_MORALE, MORALE_REST_REGEN, MORALE_WORK_BURN};
use crate::journal::{LogSource, Sentiment};
use crate::oracle::{NewAgentSpec, TurnResult, UpdateTarget};
use crate::state::{GameState, GameStatus, default_suggestions};

/// Inputs computed outside the pure fold: the pre-dealt replacement hand
/// (dealing is independent of simulation outcome) and the wall clock.
#[derive(Debug, Clone)]
pub struct TurnContext {
    pub dealt: DealtCards,
    pub now_ms: u64,
}

/// Merge `result` into `prior`, producing the next state.
///
/// The step order is load-bearing: agent folds run before hiring so a
/// wildcard update can never target the new hire, the bankruptcy check
/// overrides any oracle-supplied status, and completion logging compares
/// against the *prior* objectives list.
#[must_use]
pub fn resolve_turn(prior: &GameState, result: &TurnResult, ctx: TurnContext) -> GameState {
    let mut next = prior.clone();

    fold_agents(&mut next.agents, result);

    let hired = result.new_agent.as_ref().map(|spec| {
        let agent = build_hire(&mut next, spec);
        next.agents.push(agent.clone());
        agent
    });

    if let Some(fired_id) = &result.agent_fired_id {
        next.agents.retain(|agent| &agent.id != fired_id);
    }

    next.cash = prior.cash + result.cash_change;
    next.last_cash_change = result.cash_change;
    if next.cash < 0 {
        // Bankruptcy is enforced locally, never delegated to the oracle.
        next.status = GameStatus::Lost;
    } else if let Some(status) = result.game_status_update {
        next.status = status;
    }

    next.users = (prior.users + result.user_change).max(0);
    next.last_user_change = result.user_change;
    next.reputation = prior.reputation + result.reputation_change;
    next.product_quality = prior.product_quality + result.product_quality_change;
    next.clamp_meters();

    // The oracle may assign any stage; no monotonicity check.
    if let Some(stage) = result.stage_progression {
        next.stage = stage;
    }

    if !result.objectives_update.is_empty() {
        next.objectives = result.objectives_update.clone();
    }

    next.suggested_commands = if result.suggested_actions.is_empty() {
        default_suggestions()
    } else {
        result.suggested_actions.iter().cloned().collect()
    };

    next.hand = ctx.dealt.hand;
    next.deck = ctx.dealt.deck;

    next.active_event = result.random_event.clone();
    next.turn = prior.turn + 1;

    emit_logs(&mut next, prior, result, hired.as_ref(), ctx.now_ms);

    next
}

/// Apply agent updates in stored-roster order. A wildcard (`AnyIdle`)
/// update is consumed by the first currently-idle agent and no other.
/// Untouched agents left DONE reset to IDLE; nobody stays done forever.
fn fold_agents(agents: &mut [Agent], result: &TurnResult) {
    let mut consumed = vec![false; result.agent_updates.len()];

    for agent in agents.iter_mut() {
        let matched = result
            .agent_updates
            .iter()
            .enumerate()
            .find(|(idx, update)| match &update.target {
                UpdateTarget::Agent(id) => id == &agent.id,
                UpdateTarget::AnyIdle => !consumed[*idx] && agent.is_idle(),
            });

        if let Some((idx, update)) = matched {
            consumed[idx] = true;
            let regen = if agent.status == AgentStatus::Working {
                MORALE_WORK_BURN
            } else {
                MORALE_REST_REGEN
            };
            agent.morale += update.morale_change.unwrap_or(0) + regen;
            agent.status = update.status;
            if let Some(task) = &update.task_description {
                agent.current_task = Some(task.clone());
            }
            agent.clamp();
        } else if agent.status == AgentStatus::Done {
            agent.status = AgentStatus::Idle;
            agent.current_task = None;
        }
    }
}

fn build_hire(state: &mut GameState, spec: &NewAgentSpec) -> Agent {
    let mut agent = Agent {
        id: state.next_agent_id(),
        name: spec.name.clone(),
        role: spec.role,
        status: AgentStatus::Idle,
        current_task: None,
        skill_level: spec.skill_level,
        morale: HIRE_MORALE,
        traits: spec.traits.clone(),
        avatar_url: None,
    };
    agent.clamp();
    agent
}

fn emit_logs(
    next: &mut GameState,
    prior: &GameState,
    result: &TurnResult,
    hired: Option<&Agent>,
    now_ms: u64,
) {
    let narrative_sentiment = if result.cash_change > 0 || result.user_change > 0 {
        Sentiment::Positive
    } else {
        Sentiment::Neutral
    };
    next.push_log(
        LogSource::System,
        result.narrative.clone(),
        narrative_sentiment,
        now_ms,
    );

    if let Some(event) = &result.random_event {
        let sentiment = if event.kind.is_crisis() {
            Sentiment::Negative
        } else {
            Sentiment::Positive
        };
        next.push_log(
            LogSource::Event,
            format!("{}: {}", event.kind.as_str(), event.title),
            sentiment,
            now_ms,
        );
    }

    if let Some(agent) = hired {
        next.push_log(
            LogSource::System,
            format!("New hire onboarded: {} ({})", agent.name, agent.role),
            Sentiment::Positive,
            now_ms,
        );
    }

    if result.agent_fired_id.is_some() {
        next.push_log(
            LogSource::System,
            crate::constants::MSG_AGENT_DEPARTED,
            Sentiment::Negative,
            now_ms,
        );
    }

    for objective in &result.objectives_update {
        if objective.newly_completed(&prior.objectives) {
            next.push_log(
                LogSource::System,
                format!(
                    "OBJECTIVE COMPLETE: {} ({})",
                    objective.description, objective.reward
                ),
                Sentiment::Positive,
                now_ms,
            );
        }
    }
}
