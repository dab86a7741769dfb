//! Color values carried by memories and echoes.

use serde::{Deserialize, Serialize};

/// Linear RGBA color with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tint {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    #[serde(default = "opaque")]
    pub a: f32,
}

fn opaque() -> f32 {
    1.0
}

impl Default for Tint {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

impl Tint {
    /// Plain white, the tint of a world holding nothing.
    pub const NEUTRAL: Tint = Tint {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };

    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    pub fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self {
            r: r.clamp(0.0, 1.0),
            g: g.clamp(0.0, 1.0),
            b: b.clamp(0.0, 1.0),
            a: a.clamp(0.0, 1.0),
        }
    }

    /// Interpolate towards `other`; `t` is clamped to `[0, 1]`.
    pub fn lerp(&self, other: &Tint, t: f32) -> Tint {
        let t = t.clamp(0.0, 1.0);
        Tint {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }

    /// Whether every component is finite and inside `[0, 1]`.
    pub fn is_valid(&self) -> bool {
        [self.r, self.g, self.b, self.a]
            .iter()
            .all(|c| c.is_finite() && (0.0..=1.0).contains(c))
    }

    /// Component-wise distance, for approximate comparisons.
    pub fn max_difference(&self, other: &Tint) -> f32 {
        (self.r - other.r)
            .abs()
            .max((self.g - other.g).abs())
            .max((self.b - other.b).abs())
            .max((self.a - other.a).abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_clamps() {
        let tint = Tint::rgb(1.5, -0.2, 0.5);
        assert_eq!(tint.r, 1.0);
        assert_eq!(tint.g, 0.0);
        assert_eq!(tint.b, 0.5);
        assert!(tint.is_valid());
    }

    #[test]
    fn test_lerp() {
        let black = Tint::rgb(0.0, 0.0, 0.0);
        let mid = black.lerp(&Tint::NEUTRAL, 0.5);
        assert!(mid.max_difference(&Tint::rgb(0.5, 0.5, 0.5)) < 0.001);

        let clamped = black.lerp(&Tint::NEUTRAL, 3.0);
        assert_eq!(clamped, Tint::NEUTRAL);
    }

    #[test]
    fn test_invalid_tint() {
        let tint = Tint {
            r: f32::NAN,
            g: 0.0,
            b: 0.0,
            a: 1.0,
        };
        assert!(!tint.is_valid());
    }
}
