//! Loudness curve
//!
//! Maps the user-facing loudness percentage (0-800) to a linear gain
//! multiplier across two linear segments:
//!
//! - 0% maps to exact silence
//! - (0, 600]% maps linearly onto (0, 6.0] — up to 6x is the recommended
//!   safe range (+15.6 dB)
//! - (600, 800]% maps linearly onto (6.0, 8.0] — the steeper experimental
//!   zone, continuous with the first segment at the 600% boundary

use tabamp_core::{MAX_VOLUME_PERCENT, SAFE_VOLUME_PERCENT};

/// Gain at the safe ceiling (600%)
pub const SAFE_MAX_GAIN: f32 = 6.0;

/// Gain at the hard ceiling (800%)
pub const MAX_GAIN: f32 = 8.0;

/// Convert a loudness percentage to a linear gain multiplier
///
/// Pure and allocation-free. Input outside [0, 800] is clamped, never
/// extrapolated; 0 yields exact silence, 100 yields unity gain.
#[must_use]
pub fn gain_for(percent: f32) -> f32 {
    let safe_max = f32::from(SAFE_VOLUME_PERCENT);
    let hard_max = f32::from(MAX_VOLUME_PERCENT);

    let percent = if percent.is_finite() {
        percent.clamp(0.0, hard_max)
    } else {
        0.0
    };

    if percent == 0.0 {
        0.0
    } else if percent <= safe_max {
        (percent / safe_max) * SAFE_MAX_GAIN
    } else {
        SAFE_MAX_GAIN + ((percent - safe_max) / (hard_max - safe_max)) * (MAX_GAIN - SAFE_MAX_GAIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn silence_at_zero() {
        assert_eq!(gain_for(0.0), 0.0);
        assert_eq!(gain_for(-5.0), 0.0);
        assert_eq!(gain_for(f32::NEG_INFINITY), 0.0);
        assert_eq!(gain_for(f32::NAN), 0.0);
    }

    #[test]
    fn unity_at_one_hundred() {
        assert!((gain_for(100.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn continuous_at_segment_boundary() {
        assert_eq!(gain_for(600.0), 6.0);

        // Both segments agree approaching the kink
        let below = gain_for(599.999);
        let above = gain_for(600.001);
        assert!((below - 6.0).abs() < 1e-3);
        assert!((above - 6.0).abs() < 1e-3);
    }

    #[test]
    fn ceiling_at_eight_hundred() {
        assert_eq!(gain_for(800.0), 8.0);
        // Clamped, not extrapolated
        assert_eq!(gain_for(999.0), gain_for(800.0));
    }

    #[test]
    fn second_segment_is_steeper() {
        let safe_slope = gain_for(600.0) / 600.0;
        let boost_slope = (gain_for(800.0) - gain_for(600.0)) / 200.0;
        assert!(boost_slope > safe_slope);
    }

    proptest! {
        #[test]
        fn monotone_non_decreasing(a in 0.0f32..800.0, b in 0.0f32..800.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(gain_for(lo) <= gain_for(hi));
        }

        #[test]
        fn bounded(percent in -1000.0f32..2000.0) {
            let gain = gain_for(percent);
            prop_assert!((0.0..=MAX_GAIN).contains(&gain));
        }
    }
}
