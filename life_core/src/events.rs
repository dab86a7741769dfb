//! Life events - the only coupling between services.
//!
//! Every service publishes a closed set of events into an [`EventSink`]. Inside
//! a [`Session`](crate::Session) the sink is the [`EventBus`], a FIFO queue the
//! session drains after each operation, delivering every event to all
//! subscribers before the next one is taken off the queue.

use life_rules::{MemoryDefinition, Season, Trait};
use std::collections::VecDeque;
use std::sync::Arc;

use crate::memory_store::MemoryRecord;

/// Events published by the memory store.
#[derive(Debug, Clone)]
pub enum MemoryEvent {
    Kept(MemoryRecord),
    Forgotten(MemoryRecord),
    /// A memory was offered while every slot was taken. Nothing was kept.
    SlotsFull {
        offered: Arc<MemoryDefinition>,
        held: Vec<MemoryRecord>,
    },
    /// The held set or a record in it changed.
    Changed,
}

/// Events published by the clock.
#[derive(Debug, Clone, PartialEq)]
pub enum ClockEvent {
    /// A whole hour boundary was crossed; carries the new hour (0-23).
    HourElapsed(u32),
    /// Midnight was crossed; carries the new day counter.
    DayElapsed(u32),
    SeasonChanged(Season),
    /// Fired every step with the time of day normalised to `[0, 1)`.
    TimeOfDayUpdated(f32),
}

/// Events published by the identity model.
#[derive(Debug, Clone, PartialEq)]
pub enum IdentityEvent {
    TraitChanged {
        which: Trait,
        value: f32,
    },
    ThresholdCrossed {
        which: Trait,
        value: f32,
        threshold: f32,
        rising: bool,
    },
}

/// Any event travelling on the bus.
#[derive(Debug, Clone)]
pub enum LifeEvent {
    Memory(MemoryEvent),
    Clock(ClockEvent),
    Identity(IdentityEvent),
}

/// Coarse grouping used by listeners to filter what they receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTopic {
    Memory,
    Clock,
    Identity,
}

impl LifeEvent {
    pub fn topic(&self) -> EventTopic {
        match self {
            LifeEvent::Memory(_) => EventTopic::Memory,
            LifeEvent::Clock(_) => EventTopic::Clock,
            LifeEvent::Identity(_) => EventTopic::Identity,
        }
    }

    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            LifeEvent::Memory(MemoryEvent::Kept(_)) => "kept",
            LifeEvent::Memory(MemoryEvent::Forgotten(_)) => "forgotten",
            LifeEvent::Memory(MemoryEvent::SlotsFull { .. }) => "slots_full",
            LifeEvent::Memory(MemoryEvent::Changed) => "changed",
            LifeEvent::Clock(ClockEvent::HourElapsed(_)) => "hour_elapsed",
            LifeEvent::Clock(ClockEvent::DayElapsed(_)) => "day_elapsed",
            LifeEvent::Clock(ClockEvent::SeasonChanged(_)) => "season_changed",
            LifeEvent::Clock(ClockEvent::TimeOfDayUpdated(_)) => "time_of_day_updated",
            LifeEvent::Identity(IdentityEvent::TraitChanged { .. }) => "trait_changed",
            LifeEvent::Identity(IdentityEvent::ThresholdCrossed { .. }) => "threshold_crossed",
        }
    }
}

impl From<MemoryEvent> for LifeEvent {
    fn from(event: MemoryEvent) -> Self {
        LifeEvent::Memory(event)
    }
}

impl From<ClockEvent> for LifeEvent {
    fn from(event: ClockEvent) -> Self {
        LifeEvent::Clock(event)
    }
}

impl From<IdentityEvent> for LifeEvent {
    fn from(event: IdentityEvent) -> Self {
        LifeEvent::Identity(event)
    }
}

/// Destination for events published by a service.
pub trait EventSink {
    fn emit(&mut self, event: LifeEvent);
}

impl EventSink for Vec<LifeEvent> {
    fn emit(&mut self, event: LifeEvent) {
        self.push(event);
    }
}

/// A service that reacts to events published by its siblings.
pub trait Subscriber {
    fn handle(&mut self, event: &LifeEvent, sink: &mut dyn EventSink);
}

/// FIFO queue of events awaiting delivery.
#[derive(Debug, Default)]
pub struct EventBus {
    queue: VecDeque<LifeEvent>,
    published: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the oldest undelivered event.
    pub fn next_event(&mut self) -> Option<LifeEvent> {
        self.queue.pop_front()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Events published over the lifetime of the bus.
    pub fn published(&self) -> u64 {
        self.published
    }

    /// Drop everything still queued, returning how many events were lost.
    pub fn clear(&mut self) -> usize {
        let dropped = self.queue.len();
        self.queue.clear();
        dropped
    }
}

impl EventSink for EventBus {
    fn emit(&mut self, event: LifeEvent) {
        self.published += 1;
        self.queue.push_back(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bus_is_fifo() {
        let mut bus = EventBus::new();
        bus.emit(ClockEvent::HourElapsed(9).into());
        bus.emit(MemoryEvent::Changed.into());
        bus.emit(ClockEvent::DayElapsed(2).into());

        assert_eq!(bus.pending(), 3);
        assert_eq!(bus.next_event().map(|e| e.name()), Some("hour_elapsed"));
        assert_eq!(bus.next_event().map(|e| e.name()), Some("changed"));
        assert_eq!(bus.next_event().map(|e| e.name()), Some("day_elapsed"));
        assert!(bus.next_event().is_none());
        assert_eq!(bus.published(), 3);
    }

    #[test]
    fn test_topics() {
        let event: LifeEvent = IdentityEvent::TraitChanged {
            which: Trait::Curious,
            value: 0.7,
        }
        .into();
        assert_eq!(event.topic(), EventTopic::Identity);

        let event: LifeEvent = ClockEvent::SeasonChanged(Season::Summer).into();
        assert_eq!(event.topic(), EventTopic::Clock);
    }

    #[test]
    fn test_vec_sink_records_in_order() {
        let mut sink: Vec<LifeEvent> = Vec::new();
        sink.emit(MemoryEvent::Changed.into());
        sink.emit(ClockEvent::TimeOfDayUpdated(0.5).into());
        let names: Vec<_> = sink.iter().map(LifeEvent::name).collect();
        assert_eq!(names, vec!["changed", "time_of_day_updated"]);
    }

    #[test]
    fn test_clear() {
        let mut bus = EventBus::new();
        bus.emit(MemoryEvent::Changed.into());
        assert_eq!(bus.clear(), 1);
        assert_eq!(bus.pending(), 0);
        assert_eq!(bus.published(), 1);
    }
}
