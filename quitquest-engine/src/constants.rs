//! Centralized tuning constants for the QuitQuest journey logic.
//!
//! These values define the deterministic behavior of the intake flow.
//! Keeping them together ensures that pacing and scoring can only be
//! adjusted via code changes reviewed in version control, rather than
//! through external assets.

// Logging keys -------------------------------------------------------------
pub(crate) const DEBUG_ENV_VAR: &str = "QUITQUEST_DEBUG_LOGS";

// Section ids the presentation layer navigates between ---------------------
pub const SECTION_AVATAR: &str = "avatar-selection";
pub const SECTION_PRODUCTS: &str = "backpack-selection";
pub const SECTION_JOURNEY: &str = "journey-timeline";
pub const SECTION_DESTINATION: &str = "destination";

// Encounter tuning ---------------------------------------------------------
pub(crate) const ENCOUNTER_CHANCE_DEFAULT: f32 = 0.4;
pub(crate) const ENCOUNTER_SPAWN_DELAY_MS: u32 = 1_000;

// Auto-advance pacing ------------------------------------------------------
pub(crate) const AVATAR_ADVANCE_DELAY_MS: u32 = 500;
pub(crate) const DESTINATION_ADVANCE_DELAY_MS: u32 = 800;

// Scoring ------------------------------------------------------------------
pub(crate) const SCORE_PER_RESIST: u32 = 10;
pub(crate) const SCORE_PER_ANSWER: u32 = 5;

/// Level breakpoints: the level is the largest entry whose threshold the
/// score meets. Must stay sorted ascending by threshold.
pub(crate) const LEVEL_BREAKPOINTS: [(u32, u32); 10] = [
    (1, 0),
    (2, 5),
    (3, 10),
    (4, 20),
    (5, 30),
    (6, 40),
    (7, 50),
    (8, 60),
    (9, 80),
    (10, 100),
];
