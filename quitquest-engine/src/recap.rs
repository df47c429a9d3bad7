//! Journey recap: level, resist rate, and encouragement derived on demand
//! from accumulated session state. Nothing here is stored.

use serde::{Deserialize, Serialize};

use crate::constants::{LEVEL_BREAKPOINTS, SCORE_PER_ANSWER, SCORE_PER_RESIST};
use crate::session::JourneyState;

/// Fixed 10-entry title table, indexed by level.
const LEVEL_TITLES: [(u32, &str); 10] = [
    (1, "FRESH RECRUIT"),
    (2, "TRAIL WALKER"),
    (3, "PATH FINDER"),
    (4, "STEADY TREKKER"),
    (5, "TRIGGER TAMER"),
    (6, "CRAVING CRUSHER"),
    (7, "LEGENDARY HERO"),
    (8, "MYTHIC CHAMPION"),
    (9, "QUIT TITAN"),
    (10, "FREEDOM LEGEND"),
];

const FALLBACK_TITLE: &str = "BRAVE TRAVELER";

/// Encouragement bands keyed on resist rate, highest threshold first.
const ENCOURAGEMENTS: [(u32, &str); 4] = [
    (90, "Unstoppable! The monsters barely slow you down."),
    (75, "Strong work. You win far more battles than you lose."),
    (50, "Solid progress. More wins than losses, keep pressing."),
    (25, "Every resisted craving counts. Build on it."),
];

const ENCOURAGEMENT_FLOOR: &str = "Setbacks are part of the journey. Keep going.";

/// Derived, on-demand summary of a journey for the destination screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecapSummary {
    pub score: u32,
    pub level: u32,
    pub level_title: String,
    pub resist_rate: u32,
    pub encouragement: String,
    pub defeated: u32,
    pub conceded: u32,
    pub total_encounters: u32,
    pub answered: u32,
}

/// Percentage of encounters resisted, rounded to the nearest integer;
/// zero encounters means a rate of zero, never a division by zero.
#[must_use]
pub const fn resist_rate(defeated: u32, conceded: u32) -> u32 {
    let total = defeated + conceded;
    if total == 0 {
        return 0;
    }
    (defeated * 100 + total / 2) / total
}

/// Score: 10 points per resisted encounter, 5 per answered milestone.
#[must_use]
pub const fn score(defeated: u32, answered: u32) -> u32 {
    defeated * SCORE_PER_RESIST + answered * SCORE_PER_ANSWER
}

/// The largest level whose threshold the score meets. Monotonic
/// non-decreasing in score.
#[must_use]
pub fn level_for_score(score: u32) -> u32 {
    LEVEL_BREAKPOINTS
        .iter()
        .rev()
        .find(|(_, threshold)| score >= *threshold)
        .map_or(1, |(level, _)| *level)
}

/// Title for a level; unknown levels fall back to a generic title.
#[must_use]
pub fn level_title(level: u32) -> &'static str {
    LEVEL_TITLES
        .iter()
        .find(|(l, _)| *l == level)
        .map_or(FALLBACK_TITLE, |(_, title)| *title)
}

/// Encouragement message banded by resist rate.
#[must_use]
pub fn encouragement(resist_rate: u32) -> &'static str {
    ENCOURAGEMENTS
        .iter()
        .find(|(threshold, _)| resist_rate >= *threshold)
        .map_or(ENCOURAGEMENT_FLOOR, |(_, message)| *message)
}

/// Compute the full recap from session state.
#[must_use]
pub fn recap_summary(state: &JourneyState) -> RecapSummary {
    let defeated = state.defeated_count();
    let conceded = state.conceded_count();
    let answered = state.answered_count();
    let rate = resist_rate(defeated, conceded);
    let score = score(defeated, answered);
    let level = level_for_score(score);
    RecapSummary {
        score,
        level,
        level_title: level_title(level).to_string(),
        resist_rate: rate,
        encouragement: encouragement(rate).to_string(),
        defeated,
        conceded,
        total_encounters: defeated + conceded,
        answered,
    }
}
