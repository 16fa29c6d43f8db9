//! Action-card catalog and the hand-dealing rules.
//!
//! Cards are command shortcuts: playing one forwards its effect directive
//! verbatim into the next turn's command. The catalog is static
//! configuration; it is never generated at runtime.

use once_cell::sync::Lazy;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CardCategory {
    Growth,
    Product,
    Hr,
    Finance,
    Risk,
}

/// A predefined command shortcut.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionCard {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Display string, e.g. "$5k" or "Morale".
    pub cost: String,
    #[serde(rename = "type")]
    pub category: CardCategory,
    /// Instruction forwarded verbatim to the oracle when the card is played.
    #[serde(rename = "promptEffect")]
    pub effect_directive: String,
    pub icon: String,
}

/// Container for the full card list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CardCatalog {
    pub cards: Vec<ActionCard>,
}

impl CardCatalog {
    /// Create empty catalog (useful for tests).
    #[must_use]
    pub fn empty() -> Self {
        Self { cards: Vec::new() }
    }

    /// Load a catalog from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into valid cards.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Create a catalog from pre-parsed cards.
    #[must_use]
    pub fn from_cards(cards: Vec<ActionCard>) -> Self {
        Self { cards }
    }

    /// The built-in card set shipped with the game.
    #[must_use]
    pub fn builtin() -> &'static Self {
        &BUILTIN_CATALOG
    }

    #[must_use]
    pub fn contains(&self, card_id: &str) -> bool {
        self.cards.iter().any(|card| card.id == card_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Result of dealing a fresh hand: the hand plus the undrawn remainder.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DealtCards {
    pub hand: Vec<ActionCard>,
    pub deck: Vec<ActionCard>,
}

/// Deal a replacement hand from `deck`.
///
/// When the deck holds fewer than `hand_size` cards it is replaced with a
/// fresh full copy of the catalog before shuffling; no partial carry-over
/// of old deck state. The hand is capped at the catalog size, so a catalog
/// smaller than `hand_size` deals every card it has exactly once.
pub fn deal<R: Rng>(
    catalog: &CardCatalog,
    deck: &[ActionCard],
    hand_size: usize,
    rng: &mut R,
) -> DealtCards {
    let mut pool = if deck.len() < hand_size {
        catalog.cards.clone()
    } else {
        deck.to_vec()
    };
    pool.shuffle(rng);
    let take = hand_size.min(pool.len());
    let deck = pool.split_off(take);
    DealtCards { hand: pool, deck }
}

fn card(
    id: &str,
    title: &str,
    description: &str,
    cost: &str,
    category: CardCategory,
    icon: &str,
    effect: &str,
) -> ActionCard {
    ActionCard {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        cost: cost.to_string(),
        category,
        effect_directive: effect.to_string(),
        icon: icon.to_string(),
    }
}

static BUILTIN_CATALOG: Lazy<CardCatalog> = Lazy::new(|| {
    CardCatalog::from_cards(vec![
        card(
            "c_code_sprint",
            "Code Sprint",
            "Intense development cycle.",
            "Morale",
            CardCategory::Product,
            "Code",
            "Focus entirely on Product Quality. Agents work hard but lose morale.",
        ),
        card(
            "c_marketing",
            "Viral Campaign",
            "Run ads on social media.",
            "$5k",
            CardCategory::Growth,
            "Megaphone",
            "Spend $5,000 to boost Active Users significantly. Requires Marketing agent.",
        ),
        card(
            "c_fundraise",
            "Seed Pitch",
            "Meet with investors.",
            "Reputation",
            CardCategory::Finance,
            "DollarSign",
            "Attempt to raise cash. Success depends on Reputation and Product Quality.",
        ),
        card(
            "c_hackathon",
            "Hackathon",
            "Weekend coding event.",
            "$2k",
            CardCategory::Product,
            "Zap",
            "Boost Product Quality and Morale slightly, but costs money.",
        ),
        card(
            "c_hire",
            "Scout Talent",
            "Look for new hires.",
            "$1k",
            CardCategory::Hr,
            "UserPlus",
            "Search for a high-skill agent to hire. High probability of finding a candidate.",
        ),
        card(
            "c_cold_email",
            "Cold Outreach",
            "Email potential users.",
            "Free",
            CardCategory::Growth,
            "Mail",
            "Small boost to Users for free. Low impact but safe.",
        ),
        card(
            "c_optimize",
            "Refactor Code",
            "Clean up technical debt.",
            "Time",
            CardCategory::Product,
            "Feather",
            "Small Product Quality boost, prevents future bugs/crashes. Low stress.",
        ),
        card(
            "c_pivot",
            "Mini Pivot",
            "Adjust product fit.",
            "Users",
            CardCategory::Risk,
            "Shuffle",
            "Sacrifice some current users to significantly boost Product Quality/Market Fit.",
        ),
    ])
});
