//! Narrative Composer - the ending, written from what the player kept.
//!
//! Composition is a pure function of a final snapshot of every service. It
//! produces up to five passages in a fixed order:
//!
//! 1. **Opening**: when it ended, and how much was kept
//! 2. **Memories**: each kept memory, qualified by how vivid it still is
//! 3. **Identity**: who the player became, including contradictions
//! 4. **World**: the echoes left behind
//! 5. **Closing**: one line chosen by category combinations, in priority order
//!
//! Passages whose text comes out empty are dropped. Identical inputs always
//! give identical text.

mod sequencer;

pub use sequencer::*;

use life_rules::{MemoryCategory, NarratorConfig, Trait, TraitBand, WorldTime};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::echo_map::{EchoMap, EchoPoint, EchoSource};
use crate::identity::{IdentityModel, TraitProfile};
use crate::memory_store::{MemoryRecord, MemoryStore};

/// Pairs of traits that read as a contradiction when both are at least
/// [`TraitBand::Strong`].
const CONTRADICTIONS: [(Trait, Trait, &str); 4] = [
    (
        Trait::Fearless,
        Trait::Fragile,
        "You were fearless and fragile at once, and never settled which was true.",
    ),
    (
        Trait::Solitary,
        Trait::Connected,
        "You wanted to be alone and to be held, in equal measure.",
    ),
    (
        Trait::Hopeful,
        Trait::Wistful,
        "You looked back and forward with the same soft ache.",
    ),
    (
        Trait::Restless,
        Trait::Grounded,
        "Part of you wanted to stay, and part of you was already gone.",
    ),
];

/// Stage of the ending a passage belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PassageKind {
    Opening,
    Memories,
    Identity,
    World,
    Closing,
}

/// One unit of the closing narrative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub text: String,
    pub kind: PassageKind,
    /// Suggested time on screen, from the passage's line count.
    pub display_seconds: f32,
}

/// Final snapshot of every service, taken once when the session ends.
#[derive(Debug, Clone, PartialEq)]
pub struct NarrativeInput {
    pub records: Vec<MemoryRecord>,
    pub profile: TraitProfile,
    pub dominant_traits: Vec<Trait>,
    pub total_weight: f32,
    pub echoes: Vec<EchoPoint>,
    pub formatted_time: String,
}

impl Default for NarrativeInput {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            profile: TraitProfile::neutral(),
            dominant_traits: Vec::new(),
            total_weight: 0.0,
            echoes: Vec::new(),
            formatted_time: WorldTime::default().formatted(),
        }
    }
}

impl NarrativeInput {
    /// Snapshot whatever services are available; anything missing reads as
    /// empty or neutral.
    pub fn gather(
        store: Option<&MemoryStore>,
        identity: Option<&IdentityModel>,
        echoes: Option<&EchoMap>,
        clock: Option<&Clock>,
    ) -> Self {
        let mut input = Self::default();
        if let Some(store) = store {
            input.records = store.records();
            input.total_weight = store.total_weight();
        }
        if let Some(identity) = identity {
            input.profile = identity.profile();
            input.dominant_traits = identity.held_traits();
        }
        if let Some(echoes) = echoes {
            input.echoes = echoes.echoes();
        }
        if let Some(clock) = clock {
            input.formatted_time = clock.formatted();
        }
        input
    }
}

/// Writes the ending.
#[derive(Debug, Clone, Default)]
pub struct NarrativeComposer {
    config: NarratorConfig,
}

impl NarrativeComposer {
    pub fn new(config: NarratorConfig) -> Self {
        Self { config }
    }

    /// Compose from a gathered snapshot.
    pub fn compose_input(&self, input: &NarrativeInput) -> Vec<Passage> {
        self.compose(
            &input.records,
            &input.profile,
            &input.dominant_traits,
            input.total_weight,
            &input.echoes,
            &input.formatted_time,
        )
    }

    /// Compose the ending passages, in stage order, without empty ones.
    pub fn compose(
        &self,
        records: &[MemoryRecord],
        profile: &TraitProfile,
        dominant_traits: &[Trait],
        total_weight: f32,
        echoes: &[EchoPoint],
        formatted_time: &str,
    ) -> Vec<Passage> {
        [
            (PassageKind::Opening, opening(records.len(), formatted_time)),
            (PassageKind::Memories, memories(records, total_weight)),
            (PassageKind::Identity, identity(profile, dominant_traits)),
            (PassageKind::World, world(echoes)),
            (PassageKind::Closing, closing(records).to_string()),
        ]
        .into_iter()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(kind, text)| Passage {
            display_seconds: self.display_seconds(&text),
            text,
            kind,
        })
        .collect()
    }

    fn display_seconds(&self, text: &str) -> f32 {
        let lines = text.lines().count().max(1) as f32;
        (lines * self.config.seconds_per_line).max(self.config.min_display_seconds)
    }
}

fn opening(count: usize, formatted_time: &str) -> String {
    let held = match count {
        0 => "You had kept nothing. Your hands were empty, and strangely light.".to_string(),
        1 => "You had kept a single memory, and held it close.".to_string(),
        2 | 3 => "You had kept a few memories, enough to fill a pocket.".to_string(),
        n => format!(
            "You had kept {} memories, more than most would dare to carry.",
            number_word(n)
        ),
    };
    format!("{formatted_time}. The light began to thin.\n{held}")
}

fn memories(records: &[MemoryRecord], total_weight: f32) -> String {
    if records.is_empty() {
        return String::new();
    }

    let mut lines: Vec<String> = records
        .iter()
        .map(|record| match vividness_phrase(record.vividness) {
            Some(phrase) => format!("You remember {}, {}.", record.title(), phrase),
            None => format!("You remember {}.", record.title()),
        })
        .collect();

    let reflected = records.iter().filter(|r| r.reflected).count();
    if reflected == records.len() {
        lines.push("You had looked closely at every one of them.".to_string());
    } else if reflected > 0 {
        lines.push(format!(
            "You had looked closely at {} of them.",
            number_word(reflected)
        ));
    }

    lines.push(
        if total_weight >= 3.0 {
            "Together they weighed more than you expected."
        } else if total_weight >= 1.5 {
            "Together they had a quiet weight."
        } else {
            "Together they weighed almost nothing."
        }
        .to_string(),
    );
    lines.join("\n")
}

/// Qualifier for a memory's remaining vividness; `None` while still vivid.
pub fn vividness_phrase(vividness: f32) -> Option<&'static str> {
    if vividness > 0.85 {
        None
    } else if vividness > 0.6 {
        Some("fading")
    } else if vividness > 0.35 {
        Some("distant")
    } else {
        Some("barely a feeling")
    }
}

fn identity(profile: &TraitProfile, dominant_traits: &[Trait]) -> String {
    let mut lines = Vec::new();

    match dominant_traits.first() {
        None => lines.push(
            "You never quite became anyone in particular. Perhaps that was its own kind of freedom."
                .to_string(),
        ),
        Some(strongest) => {
            let adjectives: Vec<_> = dominant_traits
                .iter()
                .take(3)
                .map(|t| t.adjective())
                .collect();
            lines.push(format!("You had become someone {}.", join_list(&adjectives)));
            if TraitBand::of(profile.get(*strongest)) == TraitBand::Defining {
                lines.push(format!("Above all, you were {}.", strongest.adjective()));
            }
        }
    }

    let high = |which| TraitBand::of(profile.get(which)) >= TraitBand::Strong;
    for (a, b, sentence) in CONTRADICTIONS {
        if high(a) && high(b) {
            lines.push(sentence.to_string());
        }
    }
    lines.join("\n")
}

fn world(echoes: &[EchoPoint]) -> String {
    let count = |source| echoes.iter().filter(|e| e.source == source).count();
    let formed = count(EchoSource::MemoryFormed);
    let lingered = count(EchoSource::Lingered);
    let significant = count(EchoSource::Significant);

    if echoes.is_empty() {
        return "The world let you pass without a trace.".to_string();
    }

    let mut lines = Vec::new();
    if formed > 0 {
        lines.push(format!(
            "{} still {} with what you found there.",
            capitalize(&counted(formed, "place", "places")),
            if formed == 1 { "hums" } else { "hum" }
        ));
    }
    if lingered > 0 {
        lines.push(format!(
            "{} only that you stood still a while.",
            capitalize(&format!(
                "{} {}",
                counted(lingered, "place", "places"),
                if lingered == 1 { "remembers" } else { "remember" }
            ))
        ));
    }
    if significant > 0 {
        lines.push(format!(
            "The world itself marked {} as yours.",
            counted(significant, "moment", "moments")
        ));
    }

    let strongest = echoes
        .iter()
        .filter(|e| e.title.is_some())
        .fold(None::<&EchoPoint>, |best, echo| match best {
            Some(b) if b.strength >= echo.strength => Some(b),
            _ => Some(echo),
        });
    if let Some(title) = strongest.and_then(|e| e.title.as_deref()) {
        lines.push(format!("The strongest still whispers of {title}."));
    }
    lines.join("\n")
}

fn closing(records: &[MemoryRecord]) -> &'static str {
    let has = |category| records.iter().any(|r| r.category() == category);

    if records.is_empty() {
        "You were here. That was enough."
    } else if has(MemoryCategory::Loss) && has(MemoryCategory::Connection) {
        "You loved, and you lost, and you kept both. That is what it means to have lived."
    } else if has(MemoryCategory::Wonder) && has(MemoryCategory::Fear) {
        "You were afraid, and you looked anyway."
    } else if has(MemoryCategory::Solitude) && !has(MemoryCategory::Connection) {
        "You walked alone, and the quiet walked with you."
    } else if has(MemoryCategory::Joy) {
        "There was joy. Remember that, when you remember anything."
    } else if has(MemoryCategory::Nature) || has(MemoryCategory::Home) {
        "The world was larger than you, and it let you stay a while."
    } else {
        "You carried what you could. It was enough."
    }
}

fn number_word(n: usize) -> String {
    const WORDS: [&str; 11] = [
        "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    ];
    WORDS
        .get(n)
        .map(|w| w.to_string())
        .unwrap_or_else(|| n.to_string())
}

fn counted(n: usize, singular: &str, plural: &str) -> String {
    format!("{} {}", number_word(n), if n == 1 { singular } else { plural })
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn join_list(items: &[&str]) -> String {
    match items {
        [] => String::new(),
        [only] => only.to_string(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}
