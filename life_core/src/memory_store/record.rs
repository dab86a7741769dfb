//! Runtime memory records.

use life_rules::{DefinitionId, MemoryCategory, MemoryDefinition, WorldTime};
use std::sync::Arc;
use uuid::Uuid;

/// Unique identifier for a held memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordId(pub Uuid);

impl RecordId {
    /// Create a new random record ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A memory the player is currently holding.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryRecord {
    pub id: RecordId,

    /// The authored template this record was kept from.
    pub definition: Arc<MemoryDefinition>,

    /// When the memory was kept (virtual time).
    pub acquired_at: WorldTime,

    /// Whether the player has examined it.
    pub reflected: bool,

    /// Strength in `[0, 1]`, starting at 1 and only ever decaying.
    pub vividness: f32,
}

impl MemoryRecord {
    /// Create a fresh, fully vivid record.
    pub fn new(definition: Arc<MemoryDefinition>, acquired_at: WorldTime) -> Self {
        Self {
            id: RecordId::new(),
            definition,
            acquired_at,
            reflected: false,
            vividness: 1.0,
        }
    }

    pub fn definition_id(&self) -> &DefinitionId {
        &self.definition.id
    }

    pub fn title(&self) -> &str {
        &self.definition.title
    }

    pub fn category(&self) -> MemoryCategory {
        self.definition.category
    }

    /// Emotional weight scaled by how vivid the memory still is.
    pub fn weighted_presence(&self) -> f32 {
        self.definition.weight * self.vividness
    }

    /// Lower vividness by `amount`, never below `floor`. Returns whether it moved.
    pub(crate) fn fade(&mut self, amount: f32, floor: f32) -> bool {
        let faded = (self.vividness - amount).max(floor).min(self.vividness);
        let moved = faded < self.vividness;
        self.vividness = faded;
        moved
    }
}
