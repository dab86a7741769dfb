//! Trait profile - the value of every identity trait.

use life_rules::{Trait, NEUTRAL_TRAIT_VALUE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Value in `[0, 1]` for each identity trait; neutral is 0.5.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitProfile {
    values: BTreeMap<Trait, f32>,
}

impl Default for TraitProfile {
    fn default() -> Self {
        Self::neutral()
    }
}

impl TraitProfile {
    /// Every trait at neutral.
    pub fn neutral() -> Self {
        Self {
            values: Trait::ALL.iter().map(|t| (*t, NEUTRAL_TRAIT_VALUE)).collect(),
        }
    }

    pub fn get(&self, which: Trait) -> f32 {
        self.values.get(&which).copied().unwrap_or(NEUTRAL_TRAIT_VALUE)
    }

    /// Set a value, clamped to `[0, 1]`. Returns the stored value.
    pub(crate) fn set(&mut self, which: Trait, value: f32) -> f32 {
        let value = value.clamp(0.0, 1.0);
        self.values.insert(which, value);
        value
    }

    /// Every trait and its value, in trait order.
    pub fn iter(&self) -> impl Iterator<Item = (Trait, f32)> + '_ {
        self.values.iter().map(|(t, v)| (*t, *v))
    }

    /// Traits at or above `threshold`, strongest first. Ties keep trait order.
    pub fn above(&self, threshold: f32) -> Vec<(Trait, f32)> {
        let mut traits: Vec<_> = self.iter().filter(|(_, v)| *v >= threshold).collect();
        traits.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        traits
    }

    /// The trait furthest above neutral, if any trait is above it.
    pub fn strongest(&self) -> Option<(Trait, f32)> {
        self.above(NEUTRAL_TRAIT_VALUE)
            .into_iter()
            .find(|(_, v)| *v > NEUTRAL_TRAIT_VALUE)
    }

    /// Whether every trait sits at neutral.
    pub fn is_neutral(&self) -> bool {
        self.values
            .values()
            .all(|v| (*v - NEUTRAL_TRAIT_VALUE).abs() < f32::EPSILON)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_profile() {
        let profile = TraitProfile::neutral();
        assert_eq!(profile.iter().count(), Trait::ALL.len());
        assert_eq!(profile.get(Trait::Hopeful), 0.5);
        assert!(profile.is_neutral());
        assert!(profile.strongest().is_none());
    }

    #[test]
    fn test_set_clamps() {
        let mut profile = TraitProfile::neutral();
        assert_eq!(profile.set(Trait::Curious, 1.4), 1.0);
        assert_eq!(profile.set(Trait::Fragile, -0.2), 0.0);
        assert!(!profile.is_neutral());
    }

    #[test]
    fn test_above_is_sorted_and_stable() {
        let mut profile = TraitProfile::neutral();
        profile.set(Trait::Tender, 0.7);
        profile.set(Trait::Curious, 0.9);
        profile.set(Trait::Restless, 0.7);

        let above = profile.above(0.6);
        let traits: Vec<_> = above.iter().map(|(t, _)| *t).collect();
        assert_eq!(traits, vec![Trait::Curious, Trait::Tender, Trait::Restless]);
        assert_eq!(profile.strongest().map(|(t, _)| t), Some(Trait::Curious));
    }
}
