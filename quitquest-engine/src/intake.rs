//! High-level session wrapper binding the journey tracker, the encounter
//! engine, and the scheduler into one event dispatcher.

use crate::catalog::{EncounterCatalog, MilestoneCatalog};
use crate::clock::{Clock, SystemClock};
use crate::constants::{
    AVATAR_ADVANCE_DELAY_MS, DESTINATION_ADVANCE_DELAY_MS, ENCOUNTER_SPAWN_DELAY_MS,
    SECTION_AVATAR, SECTION_DESTINATION, SECTION_PRODUCTS,
};
use crate::encounter::{EncounterEngine, EncounterStats};
use crate::journey::JourneyTracker;
use crate::recap::{RecapSummary, recap_summary};
use crate::session::JourneyState;
use crate::signal::{JourneyEvent, SignalBatch, UiSignal};
use crate::submission::SubmissionPayload;
use crate::timers::{Scheduler, TaskHandle};

/// One user's journey through the intake flow. All mutation happens
/// synchronously inside `handle`; the host applies the returned signals
/// and arms timers for the scheduled ones.
#[derive(Debug, Clone)]
pub struct IntakeSession<C: Clock = SystemClock> {
    tracker: JourneyTracker,
    engine: EncounterEngine,
    scheduler: Scheduler,
    clock: C,
}

impl IntakeSession<SystemClock> {
    /// Construct a session on the real wall clock.
    #[must_use]
    pub fn new(milestones: MilestoneCatalog, encounters: EncounterCatalog, seed: u64) -> Self {
        Self::with_clock(milestones, encounters, seed, SystemClock)
    }
}

impl<C: Clock> IntakeSession<C> {
    #[must_use]
    pub fn with_clock(
        milestones: MilestoneCatalog,
        encounters: EncounterCatalog,
        seed: u64,
        clock: C,
    ) -> Self {
        Self {
            tracker: JourneyTracker::new(milestones),
            engine: EncounterEngine::new(encounters, seed),
            scheduler: Scheduler::new(),
            clock,
        }
    }

    /// Override the encounter probability; clamped to `[0,1]`.
    #[must_use]
    pub fn with_encounter_chance(mut self, chance: f32) -> Self {
        self.engine = self.engine.with_chance(chance);
        self
    }

    /// Borrow the underlying session state.
    #[must_use]
    pub const fn state(&self) -> &JourneyState {
        self.tracker.state()
    }

    #[must_use]
    pub const fn tracker(&self) -> &JourneyTracker {
        &self.tracker
    }

    /// Derive the recap from the accumulated state.
    #[must_use]
    pub fn recap(&self) -> RecapSummary {
        recap_summary(self.tracker.state())
    }

    #[must_use]
    pub fn encounter_stats(&self) -> EncounterStats {
        self.engine.stats()
    }

    /// Redeem a fired timer. Returns `None` for handles cancelled by a
    /// reset that happened before the timer fired.
    pub fn complete_task(&mut self, handle: TaskHandle) -> Option<UiSignal> {
        self.scheduler.complete(handle)
    }

    #[must_use]
    pub fn pending_task_count(&self) -> usize {
        self.scheduler.pending_count()
    }

    /// Deterministically reseed the encounter draw streams.
    pub fn reseed(&mut self, seed: u64) {
        self.engine.reseed(seed);
    }

    /// Dispatch one input event, mutating session state and returning the
    /// resulting presentation signals.
    pub fn handle(&mut self, event: JourneyEvent) -> SignalBatch {
        let mut batch = SignalBatch::new();
        match event {
            JourneyEvent::AvatarChosen {
                id,
                demographics_json,
            } => {
                // A malformed payload rejects the whole selection; the
                // previous avatar stays, and no advance is signalled.
                if self.tracker.select_avatar(&id, &demographics_json).is_ok() {
                    batch.scheduled.push(self.scheduler.schedule(
                        AVATAR_ADVANCE_DELAY_MS,
                        UiSignal::AdvanceToSection {
                            section: SECTION_PRODUCTS.to_string(),
                        },
                    ));
                }
            }
            JourneyEvent::ProductToggled(product) => {
                let outcome = self.tracker.toggle_product(product);
                for (milestone, visible) in outcome.visibility {
                    batch.push(UiSignal::SetMilestoneVisibility { milestone, visible });
                }
                batch.push(UiSignal::SetContinueEnabled(outcome.continue_enabled));
            }
            JourneyEvent::MilestoneBecameVisible(milestone) => {
                if self.tracker.is_visible(&milestone)
                    && let Some(template) =
                        self.engine.check_milestone(self.tracker.state(), &milestone)
                {
                    batch.scheduled.push(self.scheduler.schedule(
                        ENCOUNTER_SPAWN_DELAY_MS,
                        UiSignal::SpawnEncounter(template),
                    ));
                }
            }
            JourneyEvent::MilestoneAnswered { milestone, value } => {
                if let Ok(recorded) = self.tracker.record_answer(&milestone, value)
                    && recorded.last_visible_answered
                {
                    batch.scheduled.push(self.scheduler.schedule(
                        DESTINATION_ADVANCE_DELAY_MS,
                        UiSignal::AdvanceToSection {
                            section: SECTION_DESTINATION.to_string(),
                        },
                    ));
                }
            }
            JourneyEvent::EncounterChoiceMade {
                template_name,
                choice,
            } => {
                let now = self.clock.now();
                if let Some(outcome) =
                    self.engine
                        .resolve(self.tracker.state_mut(), &template_name, choice, now)
                {
                    let recap = recap_summary(self.tracker.state());
                    batch.push(UiSignal::EncounterResolved { outcome, recap });
                }
            }
            JourneyEvent::SubmitRequested(contact) => match self.tracker.validate_for_submission()
            {
                Err(reason) => {
                    batch.push(UiSignal::SubmissionValidationFailed { reason });
                    batch.push(UiSignal::AdvanceToSection {
                        section: reason.refocus_section().to_string(),
                    });
                }
                Ok(()) => {
                    if let Ok(payload) =
                        SubmissionPayload::from_state(self.tracker.state(), contact)
                    {
                        batch.push(UiSignal::SubmissionReady(payload));
                    }
                }
            },
            JourneyEvent::ResetRequested => {
                self.scheduler.cancel_all();
                self.tracker.reset();
                self.engine.reset();
                for (milestone, visible) in self.tracker.visibility() {
                    batch.push(UiSignal::SetMilestoneVisibility { milestone, visible });
                }
                batch.push(UiSignal::SetContinueEnabled(false));
                batch.push(UiSignal::AdvanceToSection {
                    section: SECTION_AVATAR.to_string(),
                });
            }
        }
        batch
    }
}
