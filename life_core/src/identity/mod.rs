//! Identity Model - who the player is becoming.
//!
//! The profile reflects what is held right now, not what was ever held:
//! keeping a memory shifts its reinforced traits up and its eroded traits
//! down, scaled by the memory's weight, and forgetting it applies the same
//! shifts in reverse. Independently, every trait drifts back towards neutral
//! over time, so an identity needs upkeep.
//!
//! Every shift reports band changes: one `ThresholdCrossed` per threshold in
//! [`TRAIT_THRESHOLDS`](life_rules::TRAIT_THRESHOLDS) actually crossed, in
//! ascending threshold order, preceded by a `TraitChanged`.

mod profile;

pub use profile::*;

use life_rules::{thresholds_crossed, IdentityConfig, MemoryDefinition, Trait, NEUTRAL_TRAIT_VALUE};
use tracing::debug;

use crate::events::{EventSink, IdentityEvent, LifeEvent, MemoryEvent, Subscriber};

#[derive(Debug, Clone)]
pub struct IdentityModel {
    config: IdentityConfig,
    profile: TraitProfile,
}

impl IdentityModel {
    pub fn new(config: IdentityConfig) -> Self {
        Self {
            config,
            profile: TraitProfile::neutral(),
        }
    }

    /// Apply the trait shifts of a memory being kept (`direction = 1.0`) or
    /// forgotten (`direction = -1.0`).
    fn absorb(&mut self, definition: &MemoryDefinition, direction: f32, sink: &mut dyn EventSink) {
        let reinforcement = self.config.reinforcement_rate * definition.weight * direction;
        let erosion = self.config.erosion_rate * definition.weight * direction;
        for which in &definition.reinforces {
            self.shift(*which, reinforcement, sink);
        }
        if direction < 0.0 && !self.config.restore_erosion_on_forget {
            return;
        }
        for which in &definition.erodes {
            self.shift(*which, -erosion, sink);
        }
    }

    /// Move a trait by `delta`, clamped to `[0, 1]`, publishing what changed.
    /// Returns the change actually applied.
    fn shift(&mut self, which: Trait, delta: f32, sink: &mut dyn EventSink) -> f32 {
        let old = self.profile.get(which);
        let new = self.profile.set(which, old + delta);
        let applied = new - old;
        let crossed = thresholds_crossed(old, new);

        if applied.abs() > self.config.change_epsilon || !crossed.is_empty() {
            sink.emit(IdentityEvent::TraitChanged { which, value: new }.into());
        }
        for threshold in crossed {
            debug!(%which, threshold, value = new, "trait crossed threshold");
            sink.emit(
                IdentityEvent::ThresholdCrossed {
                    which,
                    value: new,
                    threshold,
                    rising: new > old,
                }
                .into(),
            );
        }
        applied
    }

    /// Let every trait relax towards neutral for `real_seconds`.
    pub fn drift(&mut self, real_seconds: f32, sink: &mut dyn EventSink) {
        if !real_seconds.is_finite() || real_seconds <= 0.0 {
            return;
        }
        let step = self.config.neutral_drift_per_second * real_seconds;
        for which in Trait::ALL {
            let gap = NEUTRAL_TRAIT_VALUE - self.profile.get(which);
            if gap != 0.0 {
                self.shift(which, gap.clamp(-step, step), sink);
            }
        }
    }

    pub fn value(&self, which: Trait) -> f32 {
        self.profile.get(which)
    }

    /// At or above the configured has-trait threshold.
    pub fn has_trait(&self, which: Trait) -> bool {
        self.value(which) >= self.config.has_trait_threshold
    }

    /// How far above neutral a trait sits, in `[0, 0.5]`.
    pub fn strength(&self, which: Trait) -> f32 {
        (self.value(which) - NEUTRAL_TRAIT_VALUE).max(0.0)
    }

    /// Traits at or above `threshold`, strongest first.
    pub fn dominant_traits(&self, threshold: f32) -> Vec<Trait> {
        self.profile
            .above(threshold)
            .into_iter()
            .map(|(which, _)| which)
            .collect()
    }

    /// Traits the player "has", strongest first.
    pub fn held_traits(&self) -> Vec<Trait> {
        self.dominant_traits(self.config.has_trait_threshold)
    }

    /// Copy of the full profile.
    pub fn profile(&self) -> TraitProfile {
        self.profile.clone()
    }

    pub fn config(&self) -> &IdentityConfig {
        &self.config
    }
}

impl Subscriber for IdentityModel {
    fn handle(&mut self, event: &LifeEvent, sink: &mut dyn EventSink) {
        match event {
            LifeEvent::Memory(MemoryEvent::Kept(record)) => {
                self.absorb(&record.definition, 1.0, sink)
            }
            LifeEvent::Memory(MemoryEvent::Forgotten(record)) => {
                self.absorb(&record.definition, -1.0, sink)
            }
            _ => {}
        }
    }
}
