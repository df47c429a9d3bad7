//! Static milestone and encounter catalogs.
//!
//! Catalogs are loaded once at startup from JSON and validated eagerly so a
//! malformed entry fails at load time instead of surfacing later during a
//! random draw.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::session::ProductSet;

/// Identifier of a product the user is trying to quit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub String);

impl ProductId {
    /// Construct an id from a string slice, trimming whitespace.
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self(value.trim().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Identifier of a milestone question step.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MilestoneId(pub String);

impl MilestoneId {
    /// Construct an id from a string slice, trimming whitespace.
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self(value.trim().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// One answer option offered by a milestone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerValue(pub String);

impl AnswerValue {
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self(value.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// A gamified question step in the journey, gated by product relevance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: MilestoneId,
    pub prompt: String,
    /// Products that make this milestone relevant; empty means universal.
    #[serde(default)]
    pub required_products: Vec<ProductId>,
    pub options: Vec<AnswerValue>,
}

impl Milestone {
    /// Whether the milestone is relevant given the current product selection.
    /// Universal milestones (no required products) are always visible.
    #[must_use]
    pub fn visible_for(&self, products: &ProductSet) -> bool {
        self.required_products.is_empty() || products.intersects(&self.required_products)
    }
}

/// A monster template presented during a random encounter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterTemplate {
    pub name: String,
    pub glyph: String,
    /// Scene-setting line shown when the encounter appears.
    pub flavor: String,
    /// The monster's temptation line.
    pub taunt: String,
    pub linked_products: Vec<ProductId>,
}

impl EncounterTemplate {
    /// Whether the template is relevant given the current product selection.
    #[must_use]
    pub fn matches(&self, products: &ProductSet) -> bool {
        products.intersects(&self.linked_products)
    }
}

/// Errors raised when a catalog entry violates the documented shape.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("milestone at index {index} has an empty id")]
    EmptyMilestoneId { index: usize },
    #[error("duplicate milestone id '{id}'")]
    DuplicateMilestone { id: String },
    #[error("milestone '{id}' has no answer options")]
    NoOptions { id: String },
    #[error("encounter template at index {index} has an empty name")]
    EmptyTemplateName { index: usize },
    #[error("duplicate encounter template '{name}'")]
    DuplicateTemplate { name: String },
    #[error("encounter template '{name}' links no products")]
    NoLinkedProducts { name: String },
}

/// Ordered catalog of milestones; catalog order defines journey order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MilestoneCatalog {
    pub milestones: Vec<Milestone>,
}

impl MilestoneCatalog {
    /// Create an empty catalog (useful for tests).
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            milestones: Vec::new(),
        }
    }

    /// Load and validate a milestone catalog from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed or an entry is
    /// malformed (empty id, duplicate id, no options).
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Create a catalog from pre-parsed milestones.
    ///
    /// # Errors
    ///
    /// Returns an error if an entry is malformed.
    pub fn from_milestones(milestones: Vec<Milestone>) -> Result<Self, CatalogError> {
        let catalog = Self { milestones };
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let mut seen: HashSet<&str> = HashSet::new();
        for (index, milestone) in self.milestones.iter().enumerate() {
            if milestone.id.as_str().is_empty() {
                return Err(CatalogError::EmptyMilestoneId { index });
            }
            if !seen.insert(milestone.id.as_str()) {
                return Err(CatalogError::DuplicateMilestone {
                    id: milestone.id.as_str().to_string(),
                });
            }
            if milestone.options.is_empty() {
                return Err(CatalogError::NoOptions {
                    id: milestone.id.as_str().to_string(),
                });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn get(&self, id: &MilestoneId) -> Option<&Milestone> {
        self.milestones.iter().find(|m| &m.id == id)
    }

    /// One-based catalog position of a milestone, the progress ordinal.
    #[must_use]
    pub fn ordinal(&self, id: &MilestoneId) -> Option<u32> {
        self.milestones
            .iter()
            .position(|m| &m.id == id)
            .and_then(|idx| u32::try_from(idx + 1).ok())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Milestone> {
        self.milestones.iter()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.milestones.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.milestones.is_empty()
    }
}

impl<'a> IntoIterator for &'a MilestoneCatalog {
    type Item = &'a Milestone;
    type IntoIter = std::slice::Iter<'a, Milestone>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Catalog of encounter templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EncounterCatalog {
    pub templates: Vec<EncounterTemplate>,
}

impl EncounterCatalog {
    /// Create an empty catalog (useful for tests).
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            templates: Vec::new(),
        }
    }

    /// Load and validate an encounter catalog from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed or an entry is
    /// malformed (empty name, duplicate name, no linked products).
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Create a catalog from pre-parsed templates.
    ///
    /// # Errors
    ///
    /// Returns an error if an entry is malformed.
    pub fn from_templates(templates: Vec<EncounterTemplate>) -> Result<Self, CatalogError> {
        let catalog = Self { templates };
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let mut seen: HashSet<&str> = HashSet::new();
        for (index, template) in self.templates.iter().enumerate() {
            if template.name.is_empty() {
                return Err(CatalogError::EmptyTemplateName { index });
            }
            if !seen.insert(template.name.as_str()) {
                return Err(CatalogError::DuplicateTemplate {
                    name: template.name.clone(),
                });
            }
            if template.linked_products.is_empty() {
                return Err(CatalogError::NoLinkedProducts {
                    name: template.name.clone(),
                });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&EncounterTemplate> {
        self.templates.iter().find(|t| t.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EncounterTemplate> {
        self.templates.iter()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.templates.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
