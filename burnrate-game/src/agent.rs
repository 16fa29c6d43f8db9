//! Agent roster: the simulated staff the player commands each turn.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{METER_MAX, METER_MIN};

/// Functional role of an agent within the company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AgentRole {
    Engineer,
    Designer,
    Marketing,
    Finance,
    Product,
}

impl AgentRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Engineer => "ENGINEER",
            Self::Designer => "DESIGNER",
            Self::Marketing => "MARKETING",
            Self::Finance => "FINANCE",
            Self::Product => "PRODUCT",
        }
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentRole {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ENGINEER" => Ok(Self::Engineer),
            "DESIGNER" => Ok(Self::Designer),
            "MARKETING" => Ok(Self::Marketing),
            "FINANCE" => Ok(Self::Finance),
            "PRODUCT" => Ok(Self::Product),
            _ => Err(()),
        }
    }
}

/// Workload state. DONE is transient: an agent left DONE with no fresh
/// update resets to IDLE on the next resolved turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum AgentStatus {
    #[default]
    Idle,
    Working,
    Stressed,
    Done,
}

impl AgentStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Working => "WORKING",
            Self::Stressed => "STRESSED",
            Self::Done => "DONE",
        }
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single staff member. Created by hiring events, removed by firing
/// events; there is no other deletion path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: String,
    pub name: String,
    pub role: AgentRole,
    #[serde(default)]
    pub status: AgentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_task: Option<String>,
    /// 0..=100
    pub skill_level: i32,
    /// 0..=100
    pub morale: i32,
    #[serde(default)]
    pub traits: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl Agent {
    /// Clamp morale and skill to their documented meters.
    pub fn clamp(&mut self) {
        self.morale = self.morale.clamp(METER_MIN, METER_MAX);
        self.skill_level = self.skill_level.clamp(METER_MIN, METER_MAX);
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self.status, AgentStatus::Idle)
    }
}

fn founder(id: &str, name: &str, role: AgentRole, skill: i32, morale: i32, trait_: &str) -> Agent {
    Agent {
        id: id.to_string(),
        name: name.to_string(),
        role,
        status: AgentStatus::Idle,
        current_task: None,
        skill_level: skill,
        morale,
        traits: vec![trait_.to_string()],
        avatar_url: None,
    }
}

/// Roster seeded when a new venture starts.
#[must_use]
pub fn founding_team() -> Vec<Agent> {
    vec![
        founder("dev1", "Alex", AgentRole::Engineer, 85, 90, "Pragmatic"),
        founder("mkt1", "Sarah", AgentRole::Marketing, 80, 95, "Charismatic"),
        founder("des1", "Mia", AgentRole::Designer, 90, 85, "Perfectionist"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_str() {
        for role in [
            AgentRole::Engineer,
            AgentRole::Designer,
            AgentRole::Marketing,
            AgentRole::Finance,
            AgentRole::Product,
        ] {
            assert_eq!(role.as_str().parse::<AgentRole>(), Ok(role));
        }
        assert!("CEO".parse::<AgentRole>().is_err());
    }

    #[test]
    fn clamp_bounds_meters() {
        let mut agent = founder("x", "X", AgentRole::Finance, 130, -4, "Frugal");
        agent.clamp();
        assert_eq!(agent.skill_level, 100);
        assert_eq!(agent.morale, 0);
    }

    #[test]
    fn founding_team_is_idle_with_unique_ids() {
        let team = founding_team();
        assert_eq!(team.len(), 3);
        assert!(team.iter().all(Agent::is_idle));
        let mut ids: Vec<_> = team.iter().map(|a| a.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }
}
