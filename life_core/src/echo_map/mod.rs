//! Echo Map - places that remember.
//!
//! Echoes are left where memories are kept and where the player lingers. Each
//! step the map measures how strongly the nearest echoes are felt from the
//! player's position, eases its smoothed strength towards that, and while it
//! stays above a floor asks the presentation layer for small, repeated
//! atmosphere nudges.

mod linger;
mod point;

pub use linger::*;
pub use point::*;

use life_rules::{EchoConfig, Position, Tint, WorldTime};
use tracing::{debug, trace};

use crate::events::{ClockEvent, EventSink, LifeEvent, MemoryEvent, Subscriber};
use crate::presentation::StatePush;

#[derive(Debug, Clone)]
pub struct EchoMap {
    config: EchoConfig,
    echoes: Vec<EchoPoint>,
    /// Last position fed by the movement collaborator.
    player: Position,
    linger: LingerDetector,
    /// Smoothed felt strength.
    current_strength: f32,
    /// Seconds until the next atmosphere push may be sent.
    push_cooldown: f32,
}

impl EchoMap {
    pub fn new(config: EchoConfig) -> Self {
        Self {
            config,
            echoes: Vec::new(),
            player: Position::ORIGIN,
            linger: LingerDetector::new(),
            current_strength: 0.0,
            push_cooldown: 0.0,
        }
    }

    /// Advance one step with the player's current position.
    ///
    /// Returns an atmosphere push when one is due.
    pub fn update(
        &mut self,
        real_seconds: f32,
        player: Position,
        now: WorldTime,
    ) -> Option<StatePush> {
        let dt = if real_seconds.is_finite() { real_seconds.max(0.0) } else { 0.0 };
        self.player = player;

        if let Some(spot) = self.linger.sample(player, dt, &self.config) {
            debug!(x = spot.x, y = spot.y, z = spot.z, "player lingered");
            self.register(
                spot,
                EchoSource::Lingered,
                self.config.linger_tint,
                None,
                self.config.linger_echo_strength,
                now,
            );
        }

        let target = self.felt_strength_at(&player);
        let blend = (self.config.smoothing * dt).min(1.0);
        self.current_strength += (target - self.current_strength) * blend;
        trace!(target, current = self.current_strength, "echo strength");

        self.atmosphere_push(dt)
    }

    fn atmosphere_push(&mut self, dt: f32) -> Option<StatePush> {
        if self.current_strength <= self.config.push_floor {
            self.push_cooldown = 0.0;
            return None;
        }
        self.push_cooldown -= dt;
        if self.push_cooldown > 0.0 {
            return None;
        }
        self.push_cooldown = self.config.push_interval_seconds;
        Some(StatePush {
            saturation_delta: self.current_strength * self.config.push_saturation_scale,
            bloom_delta: self.current_strength * self.config.push_bloom_scale,
            duration_seconds: self.config.push_interval_seconds * 2.0,
        })
    }

    /// Strongest felt echo from `position`, unsmoothed.
    pub fn felt_strength_at(&self, position: &Position) -> f32 {
        self.echoes
            .iter()
            .map(|echo| echo.felt_from(position, self.config.feel_radius))
            .fold(0.0, f32::max)
    }

    /// Leave an echo, or strengthen the one already within the minimum
    /// separation. Returns whether a new echo was created.
    fn register(
        &mut self,
        position: Position,
        source: EchoSource,
        color: Tint,
        title: Option<String>,
        strength: f32,
        now: WorldTime,
    ) -> bool {
        let nearest = self
            .echoes
            .iter_mut()
            .map(|echo| (echo.position.distance(&position), echo))
            .filter(|(distance, _)| *distance < self.config.min_separation)
            .min_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        if let Some((_, existing)) = nearest {
            existing.strength = (existing.strength + strength).min(1.0);
            debug!(?source, strength = existing.strength, "echo strengthened");
            return false;
        }

        debug!(?source, "echo registered");
        self.echoes.push(EchoPoint {
            position,
            strength: strength.clamp(0.0, 1.0),
            source,
            color,
            title,
            created_at: now,
        });
        true
    }

    /// Mark a scripted world moment. Returns whether a new echo was created.
    pub fn register_significant(
        &mut self,
        position: Position,
        color: Tint,
        title: impl Into<String>,
        now: WorldTime,
    ) -> bool {
        self.register(
            position,
            EchoSource::Significant,
            color,
            Some(title.into()),
            self.config.significant_echo_strength,
            now,
        )
    }

    /// Weaken every echo by one hour and drop those below the floor.
    pub fn decay_pass(&mut self) {
        let amount = self.config.decay_per_hour;
        let floor = self.config.min_strength;
        let before = self.echoes.len();
        for echo in &mut self.echoes {
            echo.strength = (echo.strength - amount).max(0.0);
        }
        self.echoes.retain(|echo| echo.strength >= floor);
        if self.echoes.len() < before {
            debug!(removed = before - self.echoes.len(), "echoes faded away");
        }
    }

    /// Felt strength above the "near" threshold.
    pub fn is_near_echo(&self) -> bool {
        self.current_strength > self.config.near_threshold
    }

    pub fn current_strength(&self) -> f32 {
        self.current_strength
    }

    /// Copy of every live echo.
    pub fn echoes(&self) -> Vec<EchoPoint> {
        self.echoes.clone()
    }

    pub fn count_by_source(&self, source: EchoSource) -> usize {
        self.echoes.iter().filter(|e| e.source == source).count()
    }

    pub fn player_position(&self) -> Position {
        self.player
    }

    pub fn config(&self) -> &EchoConfig {
        &self.config
    }
}

impl Subscriber for EchoMap {
    fn handle(&mut self, event: &LifeEvent, _sink: &mut dyn EventSink) {
        match event {
            LifeEvent::Memory(MemoryEvent::Kept(record)) => {
                let definition = &record.definition;
                self.register(
                    self.player,
                    EchoSource::MemoryFormed,
                    definition.display_tint,
                    Some(definition.title.clone()),
                    self.config.memory_echo_strength,
                    record.acquired_at,
                );
            }
            LifeEvent::Clock(ClockEvent::HourElapsed(_)) => self.decay_pass(),
            _ => {}
        }
    }
}
