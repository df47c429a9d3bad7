//! Submission payload assembly and the external sink seam.
//!
//! The engine only builds the structured record; actual transmission to a
//! third-party forms service is a platform concern behind `SubmissionSink`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::catalog::{AnswerValue, MilestoneId, ProductId};
use crate::constants::{SECTION_AVATAR, SECTION_PRODUCTS};
use crate::session::JourneyState;

/// Validation failures raised on a submit attempt. Both are surfaced as a
/// blocking notice and re-focus the relevant section; session state stays
/// untouched and resubmission is always possible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("Please select an avatar to begin your journey.")]
    MissingAvatar,
    #[error("Please select at least one product you want to quit.")]
    MissingProducts,
}

impl SubmissionError {
    /// Section the presentation layer should re-focus for this failure.
    #[must_use]
    pub const fn refocus_section(self) -> &'static str {
        match self {
            Self::MissingAvatar => SECTION_AVATAR,
            Self::MissingProducts => SECTION_PRODUCTS,
        }
    }
}

/// Contact details entered on the final form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ContactFields {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

/// The structured record handed to the external submission sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub avatar: String,
    pub demographics: BTreeMap<String, String>,
    pub products: Vec<ProductId>,
    pub answers: BTreeMap<MilestoneId, AnswerValue>,
    pub contact: ContactFields,
}

impl SubmissionPayload {
    /// Assemble the payload from validated session state.
    ///
    /// # Errors
    ///
    /// Returns the same validation errors as
    /// `JourneyTracker::validate_for_submission`; the payload is only
    /// built from a submission-ready session.
    pub fn from_state(
        state: &JourneyState,
        contact: ContactFields,
    ) -> Result<Self, SubmissionError> {
        let Some(avatar) = state.selected_avatar.as_ref() else {
            return Err(SubmissionError::MissingAvatar);
        };
        if state.products.is_empty() {
            return Err(SubmissionError::MissingProducts);
        }
        Ok(Self {
            avatar: avatar.as_str().to_string(),
            demographics: state.demographics.clone(),
            products: state.products.iter().cloned().collect(),
            answers: state
                .answers
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            contact,
        })
    }
}

/// Trait for abstracting the final form transmission.
/// Platform-specific implementations should provide this; the core never
/// performs network calls itself.
pub trait SubmissionSink {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Hand a submission-ready payload to the external service.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink cannot accept the payload.
    fn submit(&self, payload: &SubmissionPayload) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::AvatarId;

    fn ready_state() -> JourneyState {
        let mut state = JourneyState::default();
        state.selected_avatar = Some(AvatarId::new("warrior"));
        state
            .demographics
            .insert("age".to_string(), "25-34".to_string());
        state.products.toggle(ProductId::new("cigarettes"));
        state.products.toggle(ProductId::new("vapes"));
        state.answers.insert(
            MilestoneId::new("first-craving"),
            AnswerValue::new("Morning"),
        );
        state
    }

    #[test]
    fn payload_requires_avatar_then_products() {
        let state = JourneyState::default();
        assert_eq!(
            SubmissionPayload::from_state(&state, ContactFields::default()),
            Err(SubmissionError::MissingAvatar)
        );

        let mut with_avatar = JourneyState::default();
        with_avatar.selected_avatar = Some(AvatarId::new("warrior"));
        assert_eq!(
            SubmissionPayload::from_state(&with_avatar, ContactFields::default()),
            Err(SubmissionError::MissingProducts)
        );
    }

    #[test]
    fn payload_snapshot_preserves_selection_order() {
        let contact = ContactFields {
            first_name: "Ada".to_string(),
            last_name: "Quitwell".to_string(),
            email: "ada@example.com".to_string(),
            phone: "555-0100".to_string(),
        };
        let payload = SubmissionPayload::from_state(&ready_state(), contact).unwrap();
        let products: Vec<_> = payload.products.iter().map(ProductId::as_str).collect();
        assert_eq!(products, vec!["cigarettes", "vapes"]);
        assert_eq!(payload.avatar, "warrior");
    }

    #[test]
    fn payload_serializes_camel_case() {
        let contact = ContactFields {
            first_name: "Ada".to_string(),
            last_name: "Quitwell".to_string(),
            email: "ada@example.com".to_string(),
            phone: "555-0100".to_string(),
        };
        let payload = SubmissionPayload::from_state(&ready_state(), contact).unwrap();
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["contact"]["firstName"], "Ada");
        assert_eq!(json["avatar"], "warrior");
        assert_eq!(json["answers"]["first-craving"], "Morning");
    }

    #[test]
    fn refocus_sections_match_failures() {
        assert_eq!(
            SubmissionError::MissingAvatar.refocus_section(),
            SECTION_AVATAR
        );
        assert_eq!(
            SubmissionError::MissingProducts.refocus_section(),
            SECTION_PRODUCTS
        );
    }
}
