//! Echo points - places that remember the player.

use life_rules::{Position, Tint, WorldTime};
use serde::{Deserialize, Serialize};

/// Why an echo exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EchoSource {
    /// A memory was kept here.
    MemoryFormed,
    /// The player stood still here for a while.
    Lingered,
    /// Registered by a scripted world moment.
    Significant,
}

/// A decaying spatial record of emotional significance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EchoPoint {
    pub position: Position,
    /// Strength in `[0, 1]`, weakening every in-game hour.
    pub strength: f32,
    pub source: EchoSource,
    pub color: Tint,
    pub title: Option<String>,
    pub created_at: WorldTime,
}

impl EchoPoint {
    /// How strongly this echo is felt from `from`, given the feel radius.
    pub fn felt_from(&self, from: &Position, radius: f32) -> f32 {
        let distance = self.position.distance(from);
        if radius <= 0.0 || distance >= radius {
            return 0.0;
        }
        (1.0 - distance / radius) * self.strength
    }
}
