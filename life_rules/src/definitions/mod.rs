//! Memory definitions: the immutable templates a player can keep.

mod catalog;
mod tint;

pub use catalog::*;
pub use tint::*;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

use crate::mechanics::{MemoryCategory, Trait};

/// Stable identifier of an authored memory, e.g. `"first-snow"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefinitionId(pub String);

impl DefinitionId {
    pub fn new(slug: impl Into<String>) -> Self {
        Self(slug.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DefinitionId {
    fn from(slug: &str) -> Self {
        Self::new(slug)
    }
}

impl std::fmt::Display for DefinitionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An authored memory. Never mutated at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryDefinition {
    pub id: DefinitionId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: MemoryCategory,

    /// Emotional weight in `[0, 1]`.
    pub weight: f32,

    /// Contribution to the blended world tint.
    #[serde(default)]
    pub tint: Tint,

    /// Traits pushed towards 1 while this memory is held.
    #[serde(default)]
    pub reinforces: BTreeSet<Trait>,

    /// Traits pushed towards 0 while this memory is held.
    #[serde(default)]
    pub erodes: BTreeSet<Trait>,

    /// Color shown for this memory in slots and echoes.
    #[serde(default)]
    pub display_tint: Tint,
}

impl MemoryDefinition {
    /// Create a definition with neutral defaults.
    pub fn new(id: impl Into<String>, title: impl Into<String>, category: MemoryCategory) -> Self {
        Self {
            id: DefinitionId::new(id),
            title: title.into(),
            description: String::new(),
            category,
            weight: 0.5,
            tint: Tint::NEUTRAL,
            reinforces: BTreeSet::new(),
            erodes: BTreeSet::new(),
            display_tint: Tint::NEUTRAL,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the emotional weight (clamped to `[0, 1]`).
    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight.clamp(0.0, 1.0);
        self
    }

    pub fn with_tint(mut self, tint: Tint) -> Self {
        self.tint = tint;
        self
    }

    pub fn with_display_tint(mut self, tint: Tint) -> Self {
        self.display_tint = tint;
        self
    }

    pub fn reinforcing(mut self, traits: impl IntoIterator<Item = Trait>) -> Self {
        self.reinforces.extend(traits);
        self
    }

    pub fn eroding(mut self, traits: impl IntoIterator<Item = Trait>) -> Self {
        self.erodes.extend(traits);
        self
    }

    /// Check that the definition is usable at runtime.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        if self.id.as_str().trim().is_empty() {
            return Err(DefinitionError::MissingId);
        }
        if self.title.trim().is_empty() {
            return Err(DefinitionError::MissingTitle(self.id.clone()));
        }
        if !self.weight.is_finite() || !(0.0..=1.0).contains(&self.weight) {
            return Err(DefinitionError::WeightOutOfRange {
                id: self.id.clone(),
                weight: self.weight,
            });
        }
        if !self.tint.is_valid() || !self.display_tint.is_valid() {
            return Err(DefinitionError::InvalidTint(self.id.clone()));
        }
        Ok(())
    }
}

/// Problems with an authored memory definition.
#[derive(Debug, Error, PartialEq)]
pub enum DefinitionError {
    #[error("memory definition has no id")]
    MissingId,

    #[error("memory definition '{0}' has no title")]
    MissingTitle(DefinitionId),

    #[error("memory definition '{id}' has weight {weight}, expected a value in [0, 1]")]
    WeightOutOfRange { id: DefinitionId, weight: f32 },

    #[error("memory definition '{0}' has a tint component outside [0, 1]")]
    InvalidTint(DefinitionId),

    #[error("memory definition '{0}' is defined more than once")]
    Duplicate(DefinitionId),
}
