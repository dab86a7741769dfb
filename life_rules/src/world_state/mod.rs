//! World vocabulary shared by every service: virtual time, seasons, positions
//! and the session phase.

use serde::{Deserialize, Serialize};

/// A point in the virtual calendar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldTime {
    /// Day counter, starting at 1.
    pub day: u32,
    /// Continuous hour of day in `[0, 24)`.
    pub hour: f32,
    pub season: Season,
}

impl Default for WorldTime {
    fn default() -> Self {
        Self {
            day: 1,
            hour: 0.0,
            season: Season::Spring,
        }
    }
}

impl WorldTime {
    /// Create a new world time.
    pub fn new(day: u32, hour: f32, season: Season) -> Self {
        Self { day, hour, season }
    }

    /// Whole minutes past the current hour.
    pub fn minute(&self) -> u32 {
        ((self.hour.fract() * 60.0).floor() as u32).min(59)
    }

    /// Hours elapsed since the start of day 1.
    pub fn total_hours(&self) -> f64 {
        (self.day.saturating_sub(1)) as f64 * 24.0 + self.hour as f64
    }

    /// "Day N, HH:MM".
    pub fn formatted(&self) -> String {
        format!(
            "Day {}, {:02}:{:02}",
            self.day,
            self.hour.floor() as u32,
            self.minute()
        )
    }

    /// Before 06:00 or after 20:00.
    pub fn is_night(&self) -> bool {
        self.hour < 6.0 || self.hour > 20.0
    }

    /// 06:00 to 08:00 or 17:00 to 19:00.
    pub fn is_golden_hour(&self) -> bool {
        (6.0..8.0).contains(&self.hour) || (17.0..19.0).contains(&self.hour)
    }
}

impl std::fmt::Display for WorldTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.formatted())
    }
}

/// Seasons of the year, cycling in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Season {
    #[default]
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    /// Season for a day counter (starting at 1).
    pub fn for_day(day: u32, days_per_season: u32) -> Self {
        let index = (day.saturating_sub(1) / days_per_season.max(1)) % 4;
        match index {
            0 => Season::Spring,
            1 => Season::Summer,
            2 => Season::Autumn,
            _ => Season::Winter,
        }
    }
}

/// A position in the world, in world units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub const ORIGIN: Position = Position {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn distance(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Coarse phase of the play session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SessionPhase {
    #[default]
    Exploring,
    /// The ending has been triggered; time no longer moves.
    Ending,
    /// The closing narrative has been composed.
    Ended,
}

impl SessionPhase {
    /// Whether time should stand still in this phase.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionPhase::Ending | SessionPhase::Ended)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_night() {
        let mut time = WorldTime::default();

        time.hour = 14.0;
        assert!(!time.is_night());

        time.hour = 22.0;
        assert!(time.is_night());

        time.hour = 4.0;
        assert!(time.is_night());

        time.hour = 20.0;
        assert!(!time.is_night());
    }

    #[test]
    fn test_golden_hour() {
        let mut time = WorldTime::default();

        time.hour = 7.5;
        assert!(time.is_golden_hour());

        time.hour = 18.0;
        assert!(time.is_golden_hour());

        time.hour = 12.0;
        assert!(!time.is_golden_hour());

        time.hour = 19.0;
        assert!(!time.is_golden_hour());
    }

    #[test]
    fn test_formatted() {
        let time = WorldTime::new(3, 9.5, Season::Spring);
        assert_eq!(time.formatted(), "Day 3, 09:30");

        let late = WorldTime::new(12, 23.99, Season::Summer);
        assert_eq!(late.formatted(), "Day 12, 23:59");
    }

    #[test]
    fn test_season_for_day() {
        assert_eq!(Season::for_day(1, 7), Season::Spring);
        assert_eq!(Season::for_day(7, 7), Season::Spring);
        assert_eq!(Season::for_day(8, 7), Season::Summer);
        assert_eq!(Season::for_day(22, 7), Season::Winter);
        assert_eq!(Season::for_day(29, 7), Season::Spring);
    }

    #[test]
    fn test_distance() {
        let a = Position::new(0.0, 0.0, 0.0);
        let b = Position::new(3.0, 4.0, 0.0);
        assert!((a.distance(&b) - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_terminal_phase() {
        assert!(!SessionPhase::Exploring.is_terminal());
        assert!(SessionPhase::Ending.is_terminal());
        assert!(SessionPhase::Ended.is_terminal());
    }
}
