//! The push-state contract with the presentation layer.
//!
//! Services never drive rendering directly. When something should colour the
//! player's senses for a moment they produce a [`StatePush`]; the session hands
//! it to whatever [`PresentationBridge`] is installed, which owns applying the
//! nudge and reverting it once the duration has passed.

use serde::{Deserialize, Serialize};

/// A transient, time-bounded nudge to the emotional output of the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatePush {
    pub saturation_delta: f32,
    pub bloom_delta: f32,
    pub duration_seconds: f32,
}

/// Receiver of state pushes, implemented by the presentation layer.
pub trait PresentationBridge {
    fn push_state(&mut self, push: StatePush);
}

/// Bridge that keeps every push, for headless runs and tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingBridge {
    pub pushes: Vec<StatePush>,
}

impl PresentationBridge for RecordingBridge {
    fn push_state(&mut self, push: StatePush) {
        self.pushes.push(push);
    }
}

impl<F> PresentationBridge for F
where
    F: FnMut(StatePush),
{
    fn push_state(&mut self, push: StatePush) {
        self(push)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_bridge() {
        let mut bridge = RecordingBridge::default();
        bridge.push_state(StatePush {
            saturation_delta: 0.1,
            bloom_delta: 0.2,
            duration_seconds: 1.0,
        });
        assert_eq!(bridge.pushes.len(), 1);
    }

    #[test]
    fn test_closure_bridge() {
        let mut total = 0.0;
        {
            let mut bridge = |push: StatePush| total += push.bloom_delta;
            bridge.push_state(StatePush {
                saturation_delta: 0.0,
                bloom_delta: 0.25,
                duration_seconds: 1.0,
            });
        }
        assert_eq!(total, 0.25);
    }
}
