//! Board objectives: oracle-managed sub-goals with display rewards.

use serde::{Deserialize, Serialize};

/// Objective grouping used for presentation filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ObjectiveCategory {
    Growth,
    Hiring,
    Product,
    Financial,
}

/// A tracked sub-goal. The oracle owns the list: a non-empty
/// `objectivesUpdate` replaces it wholesale, an empty one means no change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Objective {
    pub id: String,
    pub description: String,
    /// Display string, e.g. "$5,000" or "+5 Rep".
    pub reward: String,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(rename = "type")]
    pub category: ObjectiveCategory,
}

impl Objective {
    /// True when `self` flipped to completed relative to the prior list.
    /// An objective absent from `prior` counts as previously incomplete.
    #[must_use]
    pub fn newly_completed(&self, prior: &[Objective]) -> bool {
        self.is_completed
            && !prior
                .iter()
                .any(|old| old.id == self.id && old.is_completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn objective(id: &str, done: bool) -> Objective {
        Objective {
            id: id.to_string(),
            description: format!("Objective {id}"),
            reward: String::from("$5,000"),
            is_completed: done,
            category: ObjectiveCategory::Growth,
        }
    }

    #[test]
    fn wire_category_field_is_type() {
        let raw = r#"{"id":"o1","description":"Ship MVP","reward":"+5 Rep","type":"PRODUCT"}"#;
        let parsed: Objective = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.category, ObjectiveCategory::Product);
        assert!(!parsed.is_completed);
        let json = serde_json::to_string(&parsed).unwrap();
        assert!(json.contains("\"type\":\"PRODUCT\""));
    }

    #[test]
    fn newly_completed_compares_by_id() {
        let prior = vec![objective("o1", false), objective("o2", true)];
        assert!(objective("o1", true).newly_completed(&prior));
        assert!(!objective("o2", true).newly_completed(&prior));
        assert!(objective("o3", true).newly_completed(&prior));
        assert!(!objective("o1", false).newly_completed(&prior));
    }
}
