//! Canonical in-memory session state for a single journey.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::catalog::{AnswerValue, MilestoneId, ProductId};

/// Identifier of the avatar the user picked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AvatarId(pub String);

impl AvatarId {
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self(value.trim().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Insertion-ordered set of selected products. Toggling a present product
/// removes it; toggling an absent one appends it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct ProductSet(SmallVec<[ProductId; 4]>);

impl ProductSet {
    #[must_use]
    pub fn new() -> Self {
        Self(SmallVec::new())
    }

    /// Flip membership of a product. Returns true when the product is
    /// present after the call.
    pub fn toggle(&mut self, product: ProductId) -> bool {
        if let Some(pos) = self.0.iter().position(|p| p == &product) {
            self.0.remove(pos);
            false
        } else {
            self.0.push(product);
            true
        }
    }

    #[must_use]
    pub fn contains(&self, product: &ProductId) -> bool {
        self.0.iter().any(|p| p == product)
    }

    /// True when any of the given products is selected.
    #[must_use]
    pub fn intersects(&self, products: &[ProductId]) -> bool {
        products.iter().any(|p| self.contains(p))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProductId> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl<'a> IntoIterator for &'a ProductSet {
    type Item = &'a ProductId;
    type IntoIter = std::slice::Iter<'a, ProductId>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<ProductId> for ProductSet {
    fn from_iter<I: IntoIterator<Item = ProductId>>(iter: I) -> Self {
        let mut set = Self::new();
        for product in iter {
            if !set.contains(&product) {
                set.0.push(product);
            }
        }
        set
    }
}

/// The two possible resolutions of an encounter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    /// The user fought the temptation off.
    Resisted,
    /// The trigger won this time.
    Conceded,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resisted => f.write_str("resisted"),
            Self::Conceded => f.write_str("conceded"),
        }
    }
}

/// Append-only record of one resolved encounter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterOutcome {
    pub template_name: String,
    pub resolution: Resolution,
    pub timestamp: DateTime<Utc>,
}

/// Session state for one journey. Created empty, mutated only by the
/// tracker and the encounter engine, discarded when the page session ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct JourneyState {
    pub selected_avatar: Option<AvatarId>,
    #[serde(default)]
    pub demographics: BTreeMap<String, String>,
    #[serde(default)]
    pub products: ProductSet,
    /// One-based catalog ordinal of the most recently answered milestone.
    #[serde(default)]
    pub progress: u32,
    #[serde(default)]
    pub answers: HashMap<MilestoneId, AnswerValue>,
    #[serde(default)]
    pub defeated_encounters: Vec<EncounterOutcome>,
    #[serde(default)]
    pub conceded_encounters: Vec<EncounterOutcome>,
}

impl JourneyState {
    #[must_use]
    pub fn answered_count(&self) -> u32 {
        u32::try_from(self.answers.len()).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn defeated_count(&self) -> u32 {
        u32::try_from(self.defeated_encounters.len()).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn conceded_count(&self) -> u32 {
        u32::try_from(self.conceded_encounters.len()).unwrap_or(u32::MAX)
    }

    /// Append a resolved encounter to the matching outcome log.
    pub fn record_outcome(&mut self, outcome: EncounterOutcome) {
        match outcome.resolution {
            Resolution::Resisted => self.defeated_encounters.push(outcome),
            Resolution::Conceded => self.conceded_encounters.push(outcome),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn product_set_toggle_is_involutive() {
        let mut set = ProductSet::new();
        assert!(set.toggle(ProductId::new("cigarettes")));
        assert!(set.toggle(ProductId::new("vapes")));
        assert_eq!(set.len(), 2);

        // Double toggle restores the prior membership.
        assert!(!set.toggle(ProductId::new("cigarettes")));
        assert!(set.toggle(ProductId::new("cigarettes")));
        assert!(set.contains(&ProductId::new("cigarettes")));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn product_set_preserves_insertion_order_and_uniqueness() {
        let set: ProductSet = [
            ProductId::new("vapes"),
            ProductId::new("cigarettes"),
            ProductId::new("vapes"),
        ]
        .into_iter()
        .collect();
        let ids: Vec<_> = set.iter().map(ProductId::as_str).collect();
        assert_eq!(ids, vec!["vapes", "cigarettes"]);
    }

    #[test]
    fn product_set_intersects_matches_any() {
        let mut set = ProductSet::new();
        set.toggle(ProductId::new("cigarettes"));
        assert!(set.intersects(&[ProductId::new("vapes"), ProductId::new("cigarettes")]));
        assert!(!set.intersects(&[ProductId::new("marijuana")]));
        assert!(!set.intersects(&[]));
    }

    #[test]
    fn outcomes_route_to_their_log() {
        let mut state = JourneyState::default();
        let when = Utc.with_ymd_and_hms(2026, 1, 5, 12, 0, 0).unwrap();
        state.record_outcome(EncounterOutcome {
            template_name: "Craving Beast".to_string(),
            resolution: Resolution::Resisted,
            timestamp: when,
        });
        state.record_outcome(EncounterOutcome {
            template_name: "Stress Goblin".to_string(),
            resolution: Resolution::Conceded,
            timestamp: when,
        });

        assert_eq!(state.defeated_count(), 1);
        assert_eq!(state.conceded_count(), 1);
        assert_eq!(state.defeated_encounters[0].template_name, "Craving Beast");
        assert_eq!(state.conceded_encounters[0].resolution, Resolution::Conceded);
    }

    #[test]
    fn state_serde_roundtrips() {
        let mut state = JourneyState::default();
        state.selected_avatar = Some(AvatarId::new("warrior"));
        state
            .demographics
            .insert("age".to_string(), "18-24".to_string());
        state.products.toggle(ProductId::new("cigarettes"));
        state.answers.insert(
            MilestoneId::new("first-craving"),
            AnswerValue::new("Morning"),
        );
        state.progress = 1;

        let json = serde_json::to_string(&state).unwrap();
        let back: JourneyState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
