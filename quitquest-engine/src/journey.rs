//! Journey state tracker: owns the session state and the milestone
//! visibility derivation.

use std::collections::BTreeMap;
use thiserror::Error;

use crate::catalog::{AnswerValue, Milestone, MilestoneCatalog, MilestoneId, ProductId};
use crate::session::{AvatarId, JourneyState};
use crate::submission::SubmissionError;

/// Avatar selection carries a structured demographics payload; a payload
/// that does not parse as a string map is rejected wholesale so the
/// previous selection survives intact.
#[derive(Debug, Error)]
pub enum DemographicsError {
    #[error("demographics payload is not a map of strings: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Errors raised when recording a milestone answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnswerError {
    #[error("unknown milestone '{id}'")]
    UnknownMilestone { id: String },
}

/// Result of a product toggle: the recomputed visibility view plus the
/// continue-affordance state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub visibility: Vec<(MilestoneId, bool)>,
    pub continue_enabled: bool,
}

/// Result of recording an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerRecorded {
    /// One-based catalog ordinal of the answered milestone.
    pub ordinal: u32,
    /// True when the answered milestone is the last currently-visible one
    /// in catalog order. Note this is catalog order, not answer order: a
    /// user answering out of visual order can trigger this early.
    pub last_visible_answered: bool,
}

/// Owns the canonical session state and derives milestone visibility from
/// the product selection.
#[derive(Debug, Clone)]
pub struct JourneyTracker {
    state: JourneyState,
    catalog: MilestoneCatalog,
}

impl JourneyTracker {
    #[must_use]
    pub fn new(catalog: MilestoneCatalog) -> Self {
        Self {
            state: JourneyState::default(),
            catalog,
        }
    }

    /// Borrow the underlying session state.
    #[must_use]
    pub const fn state(&self) -> &JourneyState {
        &self.state
    }

    /// Borrow the underlying mutable session state.
    pub const fn state_mut(&mut self) -> &mut JourneyState {
        &mut self.state
    }

    #[must_use]
    pub const fn catalog(&self) -> &MilestoneCatalog {
        &self.catalog
    }

    /// Replace the avatar selection, last-write-wins.
    ///
    /// # Errors
    ///
    /// Returns `DemographicsError` when the payload does not parse as a
    /// string map; the previous avatar and demographics stay untouched.
    pub fn select_avatar(
        &mut self,
        id: &str,
        demographics_json: &str,
    ) -> Result<(), DemographicsError> {
        let demographics: BTreeMap<String, String> = serde_json::from_str(demographics_json)?;
        self.state.selected_avatar = Some(AvatarId::new(id));
        self.state.demographics = demographics;
        Ok(())
    }

    /// Flip membership of a product and eagerly recompute visibility for
    /// every milestone. The continue affordance is enabled iff the
    /// selection is non-empty.
    pub fn toggle_product(&mut self, product: ProductId) -> ToggleOutcome {
        self.state.products.toggle(product);
        ToggleOutcome {
            visibility: self.visibility(),
            continue_enabled: self.continue_enabled(),
        }
    }

    /// Current visibility of every milestone, in catalog order.
    #[must_use]
    pub fn visibility(&self) -> Vec<(MilestoneId, bool)> {
        self.catalog
            .iter()
            .map(|m| (m.id.clone(), m.visible_for(&self.state.products)))
            .collect()
    }

    /// Currently visible milestones, in catalog order.
    #[must_use]
    pub fn visible_milestones(&self) -> Vec<&Milestone> {
        self.catalog
            .iter()
            .filter(|m| m.visible_for(&self.state.products))
            .collect()
    }

    /// Whether a single milestone is currently visible. Unknown ids are
    /// not visible.
    #[must_use]
    pub fn is_visible(&self, id: &MilestoneId) -> bool {
        self.catalog
            .get(id)
            .is_some_and(|m| m.visible_for(&self.state.products))
    }

    #[must_use]
    pub fn continue_enabled(&self) -> bool {
        !self.state.products.is_empty()
    }

    /// Record an answer for a milestone, last-write-wins. Progress becomes
    /// the milestone's one-based catalog ordinal.
    ///
    /// # Errors
    ///
    /// Returns `AnswerError::UnknownMilestone` when the catalog does not
    /// contain the milestone.
    pub fn record_answer(
        &mut self,
        id: &MilestoneId,
        value: AnswerValue,
    ) -> Result<AnswerRecorded, AnswerError> {
        let Some(ordinal) = self.catalog.ordinal(id) else {
            return Err(AnswerError::UnknownMilestone {
                id: id.as_str().to_string(),
            });
        };
        self.state.answers.insert(id.clone(), value);
        self.state.progress = ordinal;

        let last_visible_answered = self
            .visible_milestones()
            .last()
            .is_some_and(|last| &last.id == id);
        Ok(AnswerRecorded {
            ordinal,
            last_visible_answered,
        })
    }

    /// Check submission readiness: an avatar and at least one product.
    ///
    /// # Errors
    ///
    /// Returns `MissingAvatar` when no avatar is chosen (regardless of
    /// products), then `MissingProducts` when the selection is empty.
    pub fn validate_for_submission(&self) -> Result<(), SubmissionError> {
        if self.state.selected_avatar.is_none() {
            return Err(SubmissionError::MissingAvatar);
        }
        if self.state.products.is_empty() {
            return Err(SubmissionError::MissingProducts);
        }
        Ok(())
    }

    /// Replace the session with a fresh default instance.
    pub fn reset(&mut self) {
        self.state = JourneyState::default();
    }
}
