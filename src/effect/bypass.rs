//! Which optional stages take part in the chain.

use serde::{Deserialize, Serialize};

/// Activity of the two optional light stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BypassState {
    pub bloom_active: bool,
    pub soft_glow_active: bool,
}

/// A stage is active only when its controlling value is strictly positive.
///
/// Zero, negatives and NaN all bypass.
pub fn resolve_bypass(glow_strength: f64, soft_glow_brightness: f64) -> BypassState {
    BypassState {
        bloom_active: glow_strength > 0.0,
        soft_glow_active: soft_glow_brightness > 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_thresholds() {
        assert_eq!(resolve_bypass(0.0, 0.0), BypassState::default());
        assert!(!resolve_bypass(-0.0, 0.3).bloom_active);
        assert!(resolve_bypass(0.0, 0.3).soft_glow_active);
        assert!(resolve_bypass(f64::MIN_POSITIVE, 0.0).bloom_active);
        assert!(!resolve_bypass(f64::NAN, f64::NAN).bloom_active);
        assert!(!resolve_bypass(f64::NAN, f64::NAN).soft_glow_active);
        assert!(!resolve_bypass(f64::NEG_INFINITY, -1.0).soft_glow_active);
    }

    proptest! {
        #[test]
        fn prop_positive_activates(strength in any::<f64>(), brightness in any::<f64>()) {
            let state = resolve_bypass(strength, brightness);
            prop_assert_eq!(state.bloom_active, strength > 0.0);
            prop_assert_eq!(state.soft_glow_active, brightness > 0.0);
        }

        #[test]
        fn prop_stages_are_independent(strength in 1e-9f64..1e9, brightness in -1e9f64..=0.0) {
            let state = resolve_bypass(strength, brightness);
            prop_assert!(state.bloom_active);
            prop_assert!(!state.soft_glow_active);
        }
    }
}
