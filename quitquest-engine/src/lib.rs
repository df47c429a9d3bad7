//! QuitQuest Intake Engine
//!
//! Platform-agnostic core logic for the QuitQuest gamified intake form.
//! This crate provides the journey state machine, encounter system, and
//! recap scoring without UI or platform-specific dependencies.

pub mod catalog;
pub mod clock;
pub mod constants;
pub mod encounter;
pub mod intake;
pub mod journey;
pub mod recap;
pub mod session;
pub mod signal;
pub mod submission;
pub mod timers;

// Re-export commonly used types
pub use catalog::{
    AnswerValue, CatalogError, EncounterCatalog, EncounterTemplate, Milestone, MilestoneCatalog,
    MilestoneId, ProductId,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use constants::{SECTION_AVATAR, SECTION_DESTINATION, SECTION_JOURNEY, SECTION_PRODUCTS};
pub use encounter::{
    EncounterChoice, EncounterEngine, EncounterPhase, EncounterRng, EncounterStats, pick_template,
    roll_trigger,
};
pub use intake::IntakeSession;
pub use journey::{AnswerError, AnswerRecorded, DemographicsError, JourneyTracker, ToggleOutcome};
pub use recap::{
    RecapSummary, encouragement, level_for_score, level_title, recap_summary, resist_rate, score,
};
pub use session::{AvatarId, EncounterOutcome, JourneyState, ProductSet, Resolution};
pub use signal::{JourneyEvent, SignalBatch, UiSignal};
pub use submission::{ContactFields, SubmissionError, SubmissionPayload, SubmissionSink};
pub use timers::{ScheduledTask, Scheduler, TaskHandle};

use std::sync::OnceLock;

/// Trait for abstracting catalog loading operations.
/// Platform-specific implementations should provide this.
pub trait CatalogSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the milestone catalog from the platform-specific source.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded or is malformed.
    fn load_milestones(&self) -> Result<MilestoneCatalog, Self::Error>;

    /// Load the encounter catalog from the platform-specific source.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded or is malformed.
    fn load_encounters(&self) -> Result<EncounterCatalog, Self::Error>;
}

fn embedded_catalogs() -> &'static (MilestoneCatalog, EncounterCatalog) {
    static CATALOGS: OnceLock<(MilestoneCatalog, EncounterCatalog)> = OnceLock::new();
    CATALOGS.get_or_init(|| {
        let milestones = MilestoneCatalog::from_json(include_str!("../assets/milestones.json"))
            .expect("valid embedded milestone catalog");
        let encounters = EncounterCatalog::from_json(include_str!("../assets/encounters.json"))
            .expect("valid embedded encounter catalog");
        (milestones, encounters)
    })
}

/// Catalog source backed by the JSON assets compiled into the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedCatalogs;

impl CatalogSource for EmbeddedCatalogs {
    type Error = std::convert::Infallible;

    fn load_milestones(&self) -> Result<MilestoneCatalog, Self::Error> {
        Ok(embedded_catalogs().0.clone())
    }

    fn load_encounters(&self) -> Result<EncounterCatalog, Self::Error> {
        Ok(embedded_catalogs().1.clone())
    }
}

/// Main engine for assembling intake sessions from a catalog source.
pub struct QuitQuestEngine<L>
where
    L: CatalogSource,
{
    source: L,
}

impl<L> QuitQuestEngine<L>
where
    L: CatalogSource,
{
    /// Create an engine with the provided catalog source.
    pub const fn new(source: L) -> Self {
        Self { source }
    }

    /// Construct a new session with the specified seed on the real clock.
    ///
    /// # Errors
    ///
    /// Returns an error if a catalog cannot be loaded.
    pub fn create_session(&self, seed: u64) -> Result<IntakeSession<SystemClock>, L::Error> {
        self.create_session_with_clock(seed, SystemClock)
    }

    /// Construct a new session with an explicit clock.
    ///
    /// # Errors
    ///
    /// Returns an error if a catalog cannot be loaded.
    pub fn create_session_with_clock<C: Clock>(
        &self,
        seed: u64,
        clock: C,
    ) -> Result<IntakeSession<C>, L::Error> {
        let milestones = self.source.load_milestones()?;
        let encounters = self.source.load_encounters()?;
        Ok(IntakeSession::with_clock(milestones, encounters, seed, clock))
    }
}
