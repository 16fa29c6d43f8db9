//! Centralized balance and tuning constants for Burnrate game logic.
//!
//! These values define the deterministic math the turn-resolution engine
//! applies on top of whatever the simulation oracle returns. Keeping them
//! together ensures gameplay can only be adjusted via code changes reviewed
//! in version control.

// Session economy ----------------------------------------------------------
pub(crate) const INITIAL_CASH: i64 = 50_000;
pub(crate) const INITIAL_REPUTATION: i32 = 50;
pub(crate) const INITIAL_PRODUCT_QUALITY: i32 = 10;
pub(crate) const WEEKLY_BURN_PER_AGENT: i64 = 2_000;
/// Server cost is $0.10 per active user per week.
pub(crate) const INFRA_USERS_PER_DOLLAR: i64 = 10;
/// Revenue is $0.50 per user scaled by product quality / 100.
pub(crate) const REVENUE_DIVISOR: i64 = 200;

// Meters -------------------------------------------------------------------
pub(crate) const METER_MIN: i32 = 0;
pub(crate) const METER_MAX: i32 = 100;

// Agents -------------------------------------------------------------------
/// Morale lost per turn while an agent was WORKING.
pub(crate) const MORALE_WORK_BURN: i32 = -5;
/// Morale regained per turn while an agent was resting.
pub(crate) const MORALE_REST_REGEN: i32 = 5;
pub(crate) const HIRE_MORALE: i32 = 100;

// Cards --------------------------------------------------------------------
/// Target hand size dealt at the start of every turn.
pub const HAND_SIZE: usize = 4;

// Fixed in-world messages ---------------------------------------------------
pub(crate) const MSG_SIMULATION_FAILED: &str = "System Error: Simulation failed.";
pub(crate) const MSG_MARKET_SCAN_FAILED: &str = "Market Scan Failed.";
pub(crate) const MSG_AGENT_DEPARTED: &str = "Agent has left the company.";
pub(crate) const MSG_ONBOARDING_COMPLETE: &str = "Onboarding Complete. Command Interface Active.";
pub(crate) const KICKOFF_COMMAND: &str = "Initialize Operations";

// Fallback suggestions surfaced when the oracle returns none ----------------
pub(crate) const DEFAULT_SUGGESTIONS: [&str; 3] =
    ["Analyze Metrics", "Scout Talent", "Product Iteration"];
