//! Identity mechanics: experience categories, identity traits and trait bands.

use serde::{Deserialize, Serialize};

/// Value every trait starts at and drifts back towards.
pub const NEUTRAL_TRAIT_VALUE: f32 = 0.5;

/// Fixed band boundaries for trait strength, ascending.
pub const TRAIT_THRESHOLDS: [f32; 3] = [0.3, 0.6, 0.9];

/// Closed set of experience categories a memory can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryCategory {
    Wonder,
    Joy,
    Loss,
    Connection,
    Solitude,
    Fear,
    Nature,
    Home,
}

impl MemoryCategory {
    pub const ALL: [MemoryCategory; 8] = [
        MemoryCategory::Wonder,
        MemoryCategory::Joy,
        MemoryCategory::Loss,
        MemoryCategory::Connection,
        MemoryCategory::Solitude,
        MemoryCategory::Fear,
        MemoryCategory::Nature,
        MemoryCategory::Home,
    ];
}

/// Identity traits the player's profile is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trait {
    Curious,
    Fearless,
    Fragile,
    Tender,
    Solitary,
    Connected,
    Wistful,
    Hopeful,
    Restless,
    Grounded,
}

impl Trait {
    pub const ALL: [Trait; 10] = [
        Trait::Curious,
        Trait::Fearless,
        Trait::Fragile,
        Trait::Tender,
        Trait::Solitary,
        Trait::Connected,
        Trait::Wistful,
        Trait::Hopeful,
        Trait::Restless,
        Trait::Grounded,
    ];

    /// The word used for this trait in generated prose.
    pub fn adjective(&self) -> &'static str {
        match self {
            Trait::Curious => "curious",
            Trait::Fearless => "fearless",
            Trait::Fragile => "fragile",
            Trait::Tender => "tender",
            Trait::Solitary => "solitary",
            Trait::Connected => "open-hearted",
            Trait::Wistful => "wistful",
            Trait::Hopeful => "hopeful",
            Trait::Restless => "restless",
            Trait::Grounded => "grounded",
        }
    }
}

impl std::fmt::Display for Trait {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Band a trait value falls into, delimited by [`TRAIT_THRESHOLDS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TraitBand {
    /// Below 0.3.
    Faint,
    /// 0.3 up to 0.6.
    Present,
    /// 0.6 up to 0.9.
    Strong,
    /// 0.9 and above.
    Defining,
}

impl TraitBand {
    /// Band for a trait value.
    pub fn of(value: f32) -> Self {
        match TRAIT_THRESHOLDS.iter().filter(|t| value >= **t).count() {
            0 => TraitBand::Faint,
            1 => TraitBand::Present,
            2 => TraitBand::Strong,
            _ => TraitBand::Defining,
        }
    }
}

/// Thresholds crossed when a value moves from `old` to `new`, in ascending order.
pub fn thresholds_crossed(old: f32, new: f32) -> Vec<f32> {
    TRAIT_THRESHOLDS
        .iter()
        .copied()
        .filter(|t| (old >= *t) != (new >= *t))
        .collect()
}
