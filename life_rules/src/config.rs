//! Tunable parameters for every life-state service, loadable from TOML.
//!
//! Every field carries a default, so an empty document is a valid config:
//!
//! ```toml
//! [memory]
//! capacity = 8
//! tint_blend = "weighted"
//!
//! [clock]
//! time_scale = 120.0
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::definitions::Tint;

type Result<T> = std::result::Result<T, ConfigError>;

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LifeConfig {
    pub memory: MemoryConfig,
    pub clock: ClockConfig,
    pub identity: IdentityConfig,
    pub echo: EchoConfig,
    pub narrator: NarratorConfig,
}

/// How held memory tints are combined into one world tint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TintBlend {
    /// Running blend whose result depends on acquisition order.
    #[default]
    Running,
    /// Order-independent weighted average.
    Weighted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Maximum number of memories held at once (3 to 10).
    pub capacity: usize,
    /// Vividness lost by every record each in-game hour.
    pub decay_per_hour: f32,
    /// Vividness never drops below this.
    pub vividness_floor: f32,
    pub tint_blend: TintBlend,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            capacity: 6,
            decay_per_hour: 0.015,
            vividness_floor: 0.1,
            tint_blend: TintBlend::Running,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// In-game seconds per real second.
    pub time_scale: f32,
    pub start_day: u32,
    pub start_hour: f32,
    pub days_per_season: u32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            time_scale: 60.0,
            start_day: 1,
            start_hour: 8.0,
            days_per_season: 7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Shift towards 1 per unit of memory weight, for reinforced traits.
    pub reinforcement_rate: f32,
    /// Shift towards 0 per unit of memory weight, for eroded traits.
    pub erosion_rate: f32,
    /// Movement towards neutral per real second.
    pub neutral_drift_per_second: f32,
    /// Value at which a trait counts as held.
    pub has_trait_threshold: f32,
    /// Smallest change reported as a trait change.
    pub change_epsilon: f32,
    /// Whether forgetting an eroding memory gives the eroded traits back.
    pub restore_erosion_on_forget: bool,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            reinforcement_rate: 0.2,
            erosion_rate: 0.15,
            neutral_drift_per_second: 0.0002,
            has_trait_threshold: 0.6,
            change_epsilon: 0.001,
            restore_erosion_on_forget: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EchoConfig {
    /// Distance within which an echo is felt.
    pub feel_radius: f32,
    /// Registrations closer than this to an existing echo strengthen it instead.
    pub min_separation: f32,
    /// Largest per-sample movement still counted as standing still.
    pub linger_tolerance: f32,
    /// Seconds of stillness before a lingered echo is left.
    pub linger_seconds: f32,
    /// Distance from the last linger spot that re-arms linger detection.
    pub rearm_distance: f32,
    pub memory_echo_strength: f32,
    pub linger_echo_strength: f32,
    pub significant_echo_strength: f32,
    pub linger_tint: Tint,
    pub decay_per_hour: f32,
    /// Echoes weaker than this are removed.
    pub min_strength: f32,
    /// Rate at which the felt strength follows its target, per second.
    pub smoothing: f32,
    /// Felt strength above which the player is "near an echo".
    pub near_threshold: f32,
    /// Felt strength above which atmosphere pushes are sent.
    pub push_floor: f32,
    pub push_interval_seconds: f32,
    pub push_saturation_scale: f32,
    pub push_bloom_scale: f32,
}

impl Default for EchoConfig {
    fn default() -> Self {
        Self {
            feel_radius: 6.0,
            min_separation: 2.0,
            linger_tolerance: 0.05,
            linger_seconds: 6.0,
            rearm_distance: 3.0,
            memory_echo_strength: 1.0,
            linger_echo_strength: 0.4,
            significant_echo_strength: 1.0,
            linger_tint: Tint::rgb(0.85, 0.85, 0.95),
            decay_per_hour: 0.02,
            min_strength: 0.05,
            smoothing: 2.0,
            near_threshold: 0.1,
            push_floor: 0.05,
            push_interval_seconds: 0.5,
            push_saturation_scale: 0.15,
            push_bloom_scale: 0.25,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NarratorConfig {
    pub seconds_per_line: f32,
    pub min_display_seconds: f32,
    pub fade_in_seconds: f32,
    pub fade_out_seconds: f32,
}

impl Default for NarratorConfig {
    fn default() -> Self {
        Self {
            seconds_per_line: 3.0,
            min_display_seconds: 4.0,
            fade_in_seconds: 1.5,
            fade_out_seconds: 1.5,
        }
    }
}

impl LifeConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: LifeConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the given path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    /// Reject values the services cannot run with.
    pub fn validate(&self) -> Result<()> {
        let memory = &self.memory;
        if !(3..=10).contains(&memory.capacity) {
            return Err(invalid(format!(
                "memory.capacity must be between 3 and 10, got {}",
                memory.capacity
            )));
        }
        if !(0.0..1.0).contains(&memory.vividness_floor) {
            return Err(invalid("memory.vividness_floor must be in [0, 1)"));
        }
        non_negative("memory.decay_per_hour", memory.decay_per_hour)?;

        if !(self.clock.time_scale.is_finite() && self.clock.time_scale > 0.0) {
            return Err(invalid("clock.time_scale must be positive"));
        }
        if self.clock.start_day == 0 {
            return Err(invalid("clock.start_day must be at least 1"));
        }
        if self.clock.days_per_season == 0 {
            return Err(invalid("clock.days_per_season must be at least 1"));
        }
        if !(0.0..24.0).contains(&self.clock.start_hour) {
            return Err(invalid("clock.start_hour must be in [0, 24)"));
        }

        let identity = &self.identity;
        non_negative("identity.reinforcement_rate", identity.reinforcement_rate)?;
        non_negative("identity.erosion_rate", identity.erosion_rate)?;
        non_negative(
            "identity.neutral_drift_per_second",
            identity.neutral_drift_per_second,
        )?;
        non_negative("identity.change_epsilon", identity.change_epsilon)?;

        let echo = &self.echo;
        if !(echo.feel_radius.is_finite() && echo.feel_radius > 0.0) {
            return Err(invalid("echo.feel_radius must be positive"));
        }
        for (name, value) in [
            ("echo.min_separation", echo.min_separation),
            ("echo.linger_tolerance", echo.linger_tolerance),
            ("echo.linger_seconds", echo.linger_seconds),
            ("echo.rearm_distance", echo.rearm_distance),
            ("echo.decay_per_hour", echo.decay_per_hour),
            ("echo.min_strength", echo.min_strength),
            ("echo.smoothing", echo.smoothing),
            ("echo.push_interval_seconds", echo.push_interval_seconds),
        ] {
            non_negative(name, value)?;
        }

        non_negative("narrator.seconds_per_line", self.narrator.seconds_per_line)?;
        non_negative(
            "narrator.min_display_seconds",
            self.narrator.min_display_seconds,
        )?;
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(message.into())
}

fn non_negative(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be a finite, non-negative number")))
    }
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO failure when reading config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}
