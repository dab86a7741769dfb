//! Linger detection - noticing when the player stands still.

use life_rules::{EchoConfig, Position};

/// Tracks how long the player has been (nearly) motionless.
///
/// Fires once per linger episode. After firing it stays disarmed until the
/// player has moved further than the re-arm distance from the spot.
#[derive(Debug, Clone)]
pub struct LingerDetector {
    last_sample: Option<Position>,
    still_seconds: f32,
    /// Where the last lingered echo was left, while detection is disarmed.
    anchor: Option<Position>,
}

impl Default for LingerDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl LingerDetector {
    pub fn new() -> Self {
        Self {
            last_sample: None,
            still_seconds: 0.0,
            anchor: None,
        }
    }

    /// Feed one position sample. Returns the spot to mark when a linger completes.
    pub fn sample(
        &mut self,
        position: Position,
        real_seconds: f32,
        config: &EchoConfig,
    ) -> Option<Position> {
        match self.last_sample {
            Some(last) if last.distance(&position) <= config.linger_tolerance => {
                self.still_seconds += real_seconds;
            }
            _ => self.still_seconds = 0.0,
        }
        self.last_sample = Some(position);

        if let Some(anchor) = self.anchor {
            if anchor.distance(&position) > config.rearm_distance {
                self.anchor = None;
            } else {
                return None;
            }
        }

        if self.still_seconds >= config.linger_seconds {
            self.still_seconds = 0.0;
            self.anchor = Some(position);
            return Some(position);
        }
        None
    }

    pub fn is_armed(&self) -> bool {
        self.anchor.is_none()
    }

    pub fn still_seconds(&self) -> f32 {
        self.still_seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EchoConfig {
        EchoConfig {
            linger_seconds: 3.0,
            linger_tolerance: 0.1,
            rearm_distance: 2.0,
            ..EchoConfig::default()
        }
    }

    #[test]
    fn test_fires_after_stillness() {
        let config = config();
        let mut detector = LingerDetector::new();
        let spot = Position::new(1.0, 0.0, 1.0);

        let mut fired = Vec::new();
        for _ in 0..5 {
            if let Some(at) = detector.sample(spot, 1.0, &config) {
                fired.push(at);
            }
        }

        assert_eq!(fired, vec![spot]);
        assert!(!detector.is_armed());
    }

    #[test]
    fn test_movement_resets_stillness() {
        let config = config();
        let mut detector = LingerDetector::new();

        for step in 0..10 {
            let position = Position::new(step as f32, 0.0, 0.0);
            assert!(detector.sample(position, 1.0, &config).is_none());
        }
        assert_eq!(detector.still_seconds(), 0.0);
    }

    #[test]
    fn test_rearms_after_leaving_and_returning() {
        let config = config();
        let mut detector = LingerDetector::new();
        let spot = Position::ORIGIN;

        for _ in 0..4 {
            detector.sample(spot, 1.0, &config);
        }
        assert!(!detector.is_armed());

        // Lingering again on the same spot does nothing.
        for _ in 0..10 {
            assert!(detector.sample(spot, 1.0, &config).is_none());
        }

        detector.sample(Position::new(5.0, 0.0, 0.0), 1.0, &config);
        assert!(detector.is_armed());

        let mut fired = 0;
        for _ in 0..5 {
            if detector.sample(spot, 1.0, &config).is_some() {
                fired += 1;
            }
        }
        assert_eq!(fired, 1);
    }
}
