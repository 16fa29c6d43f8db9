//! Business plan and competitor intel records.

use serde::{Deserialize, Serialize};

/// Generated once at game start and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessPlan {
    pub name: String,
    pub mission: String,
    pub target_market: String,
    pub revenue_model: String,
    pub estimated_valuation: i64,
}

impl BusinessPlan {
    /// Fixed fallback used when plan generation fails; game start must
    /// never block on the oracle.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            name: String::from("Stealth Startup"),
            mission: String::from("To revolutionize the industry with AI."),
            target_market: String::from("Global Tech Consumers"),
            revenue_model: String::from("SaaS Subscription"),
            estimated_valuation: 1_000_000,
        }
    }
}

/// One rival surfaced by a market scan. The competitor list is replaced
/// wholesale by each scan, never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Competitor {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub url: String,
    /// Percentage 0..=100.
    pub market_share: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_plan_is_complete() {
        let plan = BusinessPlan::fallback();
        assert!(!plan.name.is_empty());
        assert!(plan.estimated_valuation > 0);
    }

    #[test]
    fn competitor_parses_without_url() {
        let raw = r#"{"name":"Rival","description":"Bigger war chest","marketShare":15.0}"#;
        let competitor: Competitor = serde_json::from_str(raw).unwrap();
        assert_eq!(competitor.url, "");
        assert!((competitor.market_share - 15.0).abs() < f32::EPSILON);
    }
}
