//! Session - the composition root that owns every service.
//!
//! Nothing is reachable globally. The session constructs the services, feeds
//! them time and player position, and after every public operation drains the
//! [`EventBus`]: each event goes to the memory store, the identity model and
//! the echo map, in that order, and then to external listeners in the order
//! they subscribed. Events published while an event is being handled are
//! queued behind it and delivered before the operation returns.

use life_rules::{
    ConfigError, DefinitionId, LifeConfig, MemoryCatalog, MemoryDefinition, Position,
    SessionPhase, Tint,
};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

use crate::clock::Clock;
use crate::echo_map::EchoMap;
use crate::events::{EventBus, EventTopic, LifeEvent, Subscriber};
use crate::identity::IdentityModel;
use crate::memory_store::{MemoryStore, OfferOutcome, RecordId};
use crate::narrator::{NarrativeComposer, NarrativeInput, Passage, PassageSequencer};
use crate::presentation::{PresentationBridge, StatePush};

/// Upper bound on events delivered by a single operation.
const MAX_EVENTS_PER_OPERATION: usize = 10_000;

/// Read-only view of every service, handed to listeners with each event.
#[derive(Debug, Clone, Copy)]
pub struct LifeView<'a> {
    pub store: &'a MemoryStore,
    pub clock: &'a Clock,
    pub identity: &'a IdentityModel,
    pub echoes: &'a EchoMap,
    pub phase: SessionPhase,
}

/// A collaborator outside the core reacting to events, such as UI or audio.
pub trait SessionListener {
    fn on_event(&mut self, event: &LifeEvent, view: &LifeView<'_>);
}

impl<F> SessionListener for F
where
    F: FnMut(&LifeEvent, &LifeView<'_>),
{
    fn on_event(&mut self, event: &LifeEvent, view: &LifeView<'_>) {
        self(event, view)
    }
}

/// Handle returned by [`Session::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Registration {
    id: ListenerId,
    /// `None` receives every topic.
    topics: Option<Vec<EventTopic>>,
    listener: Box<dyn SessionListener>,
}

impl Registration {
    fn wants(&self, topic: EventTopic) -> bool {
        self.topics.as_ref().map_or(true, |topics| topics.contains(&topic))
    }
}

pub struct Session {
    config: LifeConfig,
    catalog: MemoryCatalog,
    bus: EventBus,
    store: MemoryStore,
    clock: Clock,
    identity: IdentityModel,
    echoes: EchoMap,
    phase: SessionPhase,
    listeners: Vec<Registration>,
    next_listener: u64,
    bridge: Option<Box<dyn PresentationBridge>>,
    composer: NarrativeComposer,
    ending: Option<Vec<Passage>>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("phase", &self.phase)
            .field("store", &self.store)
            .field("clock", &self.clock)
            .field("identity", &self.identity)
            .field("echoes", &self.echoes)
            .field("listeners", &self.listeners.len())
            .field("bridge", &self.bridge.is_some())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Build a session from a validated configuration, with an empty catalog.
    pub fn new(config: LifeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            catalog: MemoryCatalog::new(),
            bus: EventBus::new(),
            store: MemoryStore::new(config.memory.clone()),
            clock: Clock::new(config.clock.clone()),
            identity: IdentityModel::new(config.identity.clone()),
            echoes: EchoMap::new(config.echo.clone()),
            phase: SessionPhase::default(),
            listeners: Vec::new(),
            next_listener: 0,
            bridge: None,
            composer: NarrativeComposer::new(config.narrator.clone()),
            ending: None,
            config,
        })
    }

    pub fn with_catalog(mut self, catalog: MemoryCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_bridge(mut self, bridge: impl PresentationBridge + 'static) -> Self {
        self.set_bridge(bridge);
        self
    }

    pub fn set_bridge(&mut self, bridge: impl PresentationBridge + 'static) {
        self.bridge = Some(Box::new(bridge));
    }

    /// Register a listener for every event.
    pub fn subscribe(&mut self, listener: impl SessionListener + 'static) -> ListenerId {
        self.register(None, Box::new(listener))
    }

    /// Register a listener for the given topics only.
    pub fn subscribe_to(
        &mut self,
        topics: &[EventTopic],
        listener: impl SessionListener + 'static,
    ) -> ListenerId {
        self.register(Some(topics.to_vec()), Box::new(listener))
    }

    fn register(
        &mut self,
        topics: Option<Vec<EventTopic>>,
        listener: Box<dyn SessionListener>,
    ) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push(Registration { id, topics, listener });
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|r| r.id != id);
        self.listeners.len() < before
    }

    // Memory operations

    pub fn offer(&mut self, definition: Arc<MemoryDefinition>) -> OfferOutcome {
        let outcome = self.store.offer(definition, self.clock.now(), &mut self.bus);
        self.pump();
        outcome
    }

    /// Offer a catalog memory by id. Unknown ids are rejected.
    pub fn offer_by_id(&mut self, id: impl Into<DefinitionId>) -> OfferOutcome {
        let id = id.into();
        match self.catalog.get(&id) {
            Some(definition) => self.offer(definition),
            None => {
                debug!(%id, "offer ignored, unknown memory");
                OfferOutcome::Rejected
            }
        }
    }

    pub fn keep(&mut self, definition: Arc<MemoryDefinition>) -> Option<RecordId> {
        let kept = self.store.keep(definition, self.clock.now(), &mut self.bus);
        self.pump();
        kept
    }

    pub fn forget(&mut self, id: RecordId) -> bool {
        let forgotten = self.store.forget(id, &mut self.bus);
        self.pump();
        forgotten
    }

    pub fn replace(
        &mut self,
        to_forget: RecordId,
        definition: Arc<MemoryDefinition>,
    ) -> Option<RecordId> {
        let kept = self
            .store
            .replace(to_forget, definition, self.clock.now(), &mut self.bus);
        self.pump();
        kept
    }

    pub fn reflect(&mut self, id: RecordId) -> bool {
        let changed = self.store.reflect(id, &mut self.bus);
        self.pump();
        changed
    }

    // World

    /// Advance the simulation by one frame.
    ///
    /// The clock and trait drift are frozen while the phase is terminal; the
    /// echo map keeps sensing the player so the atmosphere does not cut out.
    /// Returns the atmosphere push sent to the bridge this step, if any.
    pub fn step(&mut self, real_seconds: f32, player: Position) -> Option<StatePush> {
        self.clock.advance(real_seconds, self.phase, &mut self.bus);
        self.pump();

        if !self.phase.is_terminal() {
            self.identity.drift(real_seconds, &mut self.bus);
            self.pump();
        }

        let push = self.echoes.update(real_seconds, player, self.clock.now());
        if let (Some(push), Some(bridge)) = (push, self.bridge.as_mut()) {
            bridge.push_state(push);
        }
        push
    }

    /// Mark a scripted world moment with an echo.
    pub fn register_significant(
        &mut self,
        position: Position,
        color: Tint,
        title: impl Into<String>,
    ) -> bool {
        self.echoes
            .register_significant(position, color, title, self.clock.now())
    }

    // Phase

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn set_phase(&mut self, phase: SessionPhase) {
        if phase != self.phase {
            info!(from = ?self.phase, to = ?phase, "session phase changed");
            self.phase = phase;
        }
    }

    /// Start the ending. Time stops from here on.
    pub fn begin_ending(&mut self) {
        if self.phase == SessionPhase::Exploring {
            self.set_phase(SessionPhase::Ending);
        }
    }

    /// Compose the closing narrative from the final state.
    ///
    /// The composer runs once; later calls return the same passages.
    pub fn compose_ending(&mut self) -> &[Passage] {
        if self.ending.is_none() {
            let input = NarrativeInput::gather(
                Some(&self.store),
                Some(&self.identity),
                Some(&self.echoes),
                Some(&self.clock),
            );
            let passages = self.composer.compose_input(&input);
            info!(passages = passages.len(), "ending composed");
            self.set_phase(SessionPhase::Ended);
            self.ending = Some(passages);
        }
        self.ending.as_deref().unwrap_or_default()
    }

    /// Sequencer ready to play the ending.
    pub fn ending_sequencer(&mut self) -> PassageSequencer {
        let passages = self.compose_ending().to_vec();
        PassageSequencer::new(passages, &self.config.narrator)
    }

    // Accessors

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn identity(&self) -> &IdentityModel {
        &self.identity
    }

    pub fn echoes(&self) -> &EchoMap {
        &self.echoes
    }

    pub fn catalog(&self) -> &MemoryCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &LifeConfig {
        &self.config
    }

    pub fn view(&self) -> LifeView<'_> {
        LifeView {
            store: &self.store,
            clock: &self.clock,
            identity: &self.identity,
            echoes: &self.echoes,
            phase: self.phase,
        }
    }

    /// Events published since the session started.
    pub fn events_published(&self) -> u64 {
        self.bus.published()
    }

    /// Deliver queued events until the bus is empty.
    fn pump(&mut self) {
        let mut delivered = 0;
        while let Some(event) = self.bus.next_event() {
            if delivered == MAX_EVENTS_PER_OPERATION {
                let dropped = self.bus.clear() + 1;
                warn!(dropped, "event delivery limit reached, dropping the rest");
                return;
            }
            delivered += 1;
            trace!(event = event.name(), "delivering");

            self.store.handle(&event, &mut self.bus);
            self.identity.handle(&event, &mut self.bus);
            self.echoes.handle(&event, &mut self.bus);

            let view = LifeView {
                store: &self.store,
                clock: &self.clock,
                identity: &self.identity,
                echoes: &self.echoes,
                phase: self.phase,
            };
            let topic = event.topic();
            for registration in self.listeners.iter_mut().filter(|r| r.wants(topic)) {
                registration.listener.on_event(&event, &view);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{ClockEvent, MemoryEvent};
    use crate::narrator::SequencerState;
    use life_rules::{MemoryCategory, Trait};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn definition(id: &str) -> Arc<MemoryDefinition> {
        Arc::new(
            MemoryDefinition::new(id, id, MemoryCategory::Wonder)
                .with_weight(1.0)
                .reinforcing([Trait::Curious]),
        )
    }

    fn session() -> Session {
        Session::new(LifeConfig::default()).unwrap()
    }

    #[test]
    fn test_invalid_config_is_refused() {
        let mut config = LifeConfig::default();
        config.memory.capacity = 1;
        assert!(Session::new(config).is_err());
    }

    #[test]
    fn test_listener_sees_identity_already_updated() {
        let mut session = session();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        session.subscribe(move |event: &LifeEvent, view: &LifeView<'_>| {
            if let LifeEvent::Memory(MemoryEvent::Kept(_)) = event {
                log.borrow_mut().push((
                    view.identity.value(Trait::Curious),
                    view.echoes.echoes().len(),
                ));
            }
        });

        session.keep(definition("lantern"));

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert!((seen[0].0 - 0.7).abs() < 0.0001);
        assert_eq!(seen[0].1, 1);
    }

    #[test]
    fn test_topic_filter() {
        let mut session = session();
        let names = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&names);
        session.subscribe_to(&[EventTopic::Identity], move |event: &LifeEvent, _: &LifeView<'_>| {
            log.borrow_mut().push(event.name());
        });

        session.keep(definition("lantern"));

        assert_eq!(*names.borrow(), vec!["trait_changed", "threshold_crossed"]);
    }

    #[test]
    fn test_unsubscribe() {
        let mut session = session();
        let count = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&count);
        let id = session.subscribe(move |_: &LifeEvent, _: &LifeView<'_>| {
            *counter.borrow_mut() += 1
        });

        assert!(session.unsubscribe(id));
        assert!(!session.unsubscribe(id));
        session.keep(definition("lantern"));
        assert_eq!(*count.borrow(), 0);
    }

    #[test]
    fn test_offer_unknown_id_is_rejected() {
        let mut session = session();
        assert_eq!(session.offer_by_id("nowhere"), OfferOutcome::Rejected);
        assert_eq!(session.events_published(), 0);
    }

    #[test]
    fn test_compose_ending_runs_once() {
        let mut session = session();
        session.keep(definition("lantern"));
        session.begin_ending();
        assert_eq!(session.phase(), SessionPhase::Ending);

        let first = session.compose_ending().to_vec();
        assert_eq!(session.phase(), SessionPhase::Ended);

        session.keep(definition("kettle"));
        let second = session.compose_ending().to_vec();
        assert_eq!(first, second);
    }

    #[test]
    fn test_ending_sequencer_plays_to_done() {
        let mut session = session();
        session.keep(definition("lantern"));
        session.begin_ending();

        let mut sequencer = session.ending_sequencer();
        assert_eq!(sequencer.state(), SequencerState::Idle);
        sequencer.start();

        let mut shown = Vec::new();
        let steps = (sequencer.total_duration() / 0.5).ceil() as usize + 4;
        for _ in 0..steps {
            if let Some(passage) = sequencer.current() {
                shown.push(passage.kind);
            }
            sequencer.tick(0.5);
        }
        shown.dedup();

        assert!(sequencer.is_done());
        assert_eq!(session.phase(), SessionPhase::Ended);
        let composed: Vec<_> = session.compose_ending().iter().map(|p| p.kind).collect();
        assert!(!composed.is_empty());
        assert_eq!(shown, composed);
    }

    #[test]
    fn test_long_frame_announces_every_hour_over_later_steps() {
        let mut config = LifeConfig::default();
        config.clock.time_scale = 3600.0;
        let mut session = Session::new(config).unwrap();
        let hours = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&hours);
        session.subscribe_to(&[EventTopic::Clock], move |event: &LifeEvent, _: &LifeView<'_>| {
            if let LifeEvent::Clock(ClockEvent::HourElapsed(_)) = event {
                *counter.borrow_mut() += 1;
            }
        });

        session.step(5000.0, Position::ORIGIN);
        assert!(*hours.borrow() < 5000);
        for _ in 0..4 {
            session.step(0.0, Position::ORIGIN);
        }

        assert_eq!(*hours.borrow(), 5000);
        assert_eq!(session.clock().day(), 209);
    }

    #[test]
    fn test_step_forwards_pushes_to_bridge() {
        let pushes = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&pushes);
        let mut session =
            session().with_bridge(move |push: StatePush| sink.borrow_mut().push(push));
        session.register_significant(Position::ORIGIN, Tint::NEUTRAL, "a bell");

        let returned: Vec<_> = (0..10)
            .filter_map(|_| session.step(0.1, Position::ORIGIN))
            .collect();

        assert!(!returned.is_empty());
        assert_eq!(*pushes.borrow(), returned);
    }
}
