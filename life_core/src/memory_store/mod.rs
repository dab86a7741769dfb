//! Memory Store - the bounded set of memories the player keeps.
//!
//! The store is the only place that decides what is kept. Offering a memory
//! while every slot is taken never evicts anything on its own: it publishes
//! [`MemoryEvent::SlotsFull`] and waits for an explicit [`MemoryStore::replace`]
//! or [`MemoryStore::forget`] followed by [`MemoryStore::keep`].

mod blend;
mod record;

pub use blend::*;
pub use record::*;

use life_rules::{DefinitionId, MemoryCategory, MemoryConfig, MemoryDefinition, Tint, WorldTime};
use std::sync::Arc;
use tracing::debug;

use crate::events::{ClockEvent, EventSink, LifeEvent, MemoryEvent, Subscriber};

/// Result of offering a memory to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferOutcome {
    /// A free slot existed and the memory was kept.
    Kept(RecordId),
    /// A record for this definition is already held. Nothing changed.
    AlreadyHeld,
    /// Every slot is taken; the player has to choose what to let go.
    ChoiceRequired,
    /// The definition is unusable or unknown. Nothing changed.
    Rejected,
}

/// The bounded collection of held memories.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    config: MemoryConfig,
    /// Held records in acquisition order.
    records: Vec<MemoryRecord>,
}

impl MemoryStore {
    pub fn new(config: MemoryConfig) -> Self {
        Self {
            records: Vec::with_capacity(config.capacity),
            config,
        }
    }

    /// Offer a memory: keep it if there is room, otherwise ask for a choice.
    pub fn offer(
        &mut self,
        definition: Arc<MemoryDefinition>,
        now: WorldTime,
        sink: &mut dyn EventSink,
    ) -> OfferOutcome {
        if let Err(err) = definition.validate() {
            debug!(%err, "rejecting offered memory");
            return OfferOutcome::Rejected;
        }
        if self.holds(&definition.id) {
            debug!(id = %definition.id, "memory already held");
            return OfferOutcome::AlreadyHeld;
        }
        if self.is_full() {
            debug!(id = %definition.id, held = self.records.len(), "slots full, choice required");
            sink.emit(
                MemoryEvent::SlotsFull {
                    offered: definition,
                    held: self.records(),
                }
                .into(),
            );
            return OfferOutcome::ChoiceRequired;
        }
        OfferOutcome::Kept(self.commit_keep(definition, now, sink))
    }

    /// Keep a memory directly. Returns `None` without side effects when the
    /// definition is invalid, already held, or no slot is free.
    pub fn keep(
        &mut self,
        definition: Arc<MemoryDefinition>,
        now: WorldTime,
        sink: &mut dyn EventSink,
    ) -> Option<RecordId> {
        if definition.validate().is_err() || self.holds(&definition.id) || self.is_full() {
            debug!(id = %definition.id, "keep refused");
            return None;
        }
        Some(self.commit_keep(definition, now, sink))
    }

    /// Let go of a held memory. Returns whether anything was removed.
    pub fn forget(&mut self, id: RecordId, sink: &mut dyn EventSink) -> bool {
        let Some(index) = self.records.iter().position(|r| r.id == id) else {
            debug!(%id, "forget ignored, record not held");
            return false;
        };
        let record = self.records.remove(index);
        debug!(id = %record.definition.id, "memory forgotten");
        sink.emit(MemoryEvent::Forgotten(record).into());
        sink.emit(MemoryEvent::Changed.into());
        true
    }

    /// Forget `to_forget` and keep `definition` in its place, as one operation.
    ///
    /// Nothing happens unless both halves can succeed: the record must be held,
    /// the definition must be valid, and it must not already be held under a
    /// different record.
    pub fn replace(
        &mut self,
        to_forget: RecordId,
        definition: Arc<MemoryDefinition>,
        now: WorldTime,
        sink: &mut dyn EventSink,
    ) -> Option<RecordId> {
        let Some(outgoing) = self.get(to_forget) else {
            debug!(%to_forget, "replace ignored, record not held");
            return None;
        };
        let same_definition = outgoing.definition.id == definition.id;
        if definition.validate().is_err() || (!same_definition && self.holds(&definition.id)) {
            debug!(id = %definition.id, "replace refused");
            return None;
        }

        self.forget(to_forget, sink);
        Some(self.commit_keep(definition, now, sink))
    }

    /// Mark a held memory as examined. Returns whether the flag changed.
    pub fn reflect(&mut self, id: RecordId, sink: &mut dyn EventSink) -> bool {
        match self.records.iter_mut().find(|r| r.id == id) {
            Some(record) if !record.reflected => {
                record.reflected = true;
                sink.emit(MemoryEvent::Changed.into());
                true
            }
            _ => false,
        }
    }

    /// Fade every held memory by one hour's worth of decay.
    ///
    /// Publishes exactly one [`MemoryEvent::Changed`] per pass, even when every
    /// record already sits at the floor.
    pub fn decay_pass(&mut self, sink: &mut dyn EventSink) {
        let amount = self.config.decay_per_hour;
        let floor = self.config.vividness_floor;
        let faded = self
            .records
            .iter_mut()
            .map(|record| record.fade(amount, floor))
            .filter(|faded| *faded)
            .count();
        debug!(faded, held = self.records.len(), "decay pass");
        sink.emit(MemoryEvent::Changed.into());
    }

    fn commit_keep(
        &mut self,
        definition: Arc<MemoryDefinition>,
        now: WorldTime,
        sink: &mut dyn EventSink,
    ) -> RecordId {
        let record = MemoryRecord::new(definition, now);
        let id = record.id;
        debug!(id = %record.definition.id, at = %now, "memory kept");
        self.records.push(record.clone());
        sink.emit(MemoryEvent::Kept(record).into());
        sink.emit(MemoryEvent::Changed.into());
        id
    }

    /// Copy of every held record, in acquisition order.
    pub fn records(&self) -> Vec<MemoryRecord> {
        self.records.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MemoryRecord> {
        self.records.iter()
    }

    pub fn get(&self, id: RecordId) -> Option<&MemoryRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Record held for a definition, if any.
    pub fn find(&self, definition: &DefinitionId) -> Option<&MemoryRecord> {
        self.records.iter().find(|r| &r.definition.id == definition)
    }

    pub fn holds(&self, definition: &DefinitionId) -> bool {
        self.find(definition).is_some()
    }

    pub fn used_slots(&self) -> usize {
        self.records.len()
    }

    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    pub fn free_slots(&self) -> usize {
        self.config.capacity.saturating_sub(self.records.len())
    }

    pub fn is_full(&self) -> bool {
        self.records.len() >= self.config.capacity
    }

    pub fn has_category(&self, category: MemoryCategory) -> bool {
        self.records.iter().any(|r| r.category() == category)
    }

    /// Σ(weight × vividness) over every held memory.
    pub fn total_weight(&self) -> f32 {
        self.records.iter().map(MemoryRecord::weighted_presence).sum()
    }

    /// World tint from held memories, using the configured blend.
    pub fn blended_tint(&self) -> Tint {
        blend_tints(&self.records, self.config.tint_blend)
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }
}

impl Subscriber for MemoryStore {
    fn handle(&mut self, event: &LifeEvent, sink: &mut dyn EventSink) {
        if let LifeEvent::Clock(ClockEvent::HourElapsed(_)) = event {
            self.decay_pass(sink);
        }
    }
}
