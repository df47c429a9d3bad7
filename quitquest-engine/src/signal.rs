//! The event/signal surface between the core and the presentation layer.
//!
//! Input events arrive from the host (clicks, intersection visibility,
//! submit); output signals tell the host what to render. The core never
//! touches the DOM or schedules real timers itself.

use crate::catalog::{AnswerValue, EncounterTemplate, MilestoneId, ProductId};
use crate::encounter::EncounterChoice;
use crate::recap::RecapSummary;
use crate::session::EncounterOutcome;
use crate::submission::{ContactFields, SubmissionError, SubmissionPayload};
use crate::timers::ScheduledTask;

/// Discrete user/host actions driving the session.
#[derive(Debug, Clone, PartialEq)]
pub enum JourneyEvent {
    AvatarChosen {
        id: String,
        /// Raw JSON demographics payload attached to the avatar card.
        demographics_json: String,
    },
    ProductToggled(ProductId),
    MilestoneBecameVisible(MilestoneId),
    MilestoneAnswered {
        milestone: MilestoneId,
        value: AnswerValue,
    },
    EncounterChoiceMade {
        template_name: String,
        choice: EncounterChoice,
    },
    SubmitRequested(ContactFields),
    ResetRequested,
}

/// Commands for the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum UiSignal {
    AdvanceToSection {
        section: String,
    },
    SetMilestoneVisibility {
        milestone: MilestoneId,
        visible: bool,
    },
    SetContinueEnabled(bool),
    SpawnEncounter(EncounterTemplate),
    EncounterResolved {
        outcome: EncounterOutcome,
        recap: RecapSummary,
    },
    SubmissionValidationFailed {
        reason: SubmissionError,
    },
    SubmissionReady(SubmissionPayload),
}

/// Everything one event produced: signals to apply now, plus delayed
/// signals the host should arm timers for and redeem through the
/// session's scheduler.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SignalBatch {
    pub immediate: Vec<UiSignal>,
    pub scheduled: Vec<ScheduledTask>,
}

impl SignalBatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, signal: UiSignal) {
        self.immediate.push(signal);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.immediate.is_empty() && self.scheduled.is_empty()
    }
}
