//! Per-chain gain stage
//!
//! Applies the loudness curve's linear gain to the buffer. Gain changes are
//! ramped over a short window to prevent zipper noise; mute forces the
//! target gain to zero without touching the stored percentage, so unmuting
//! restores the previous loudness.

use crate::chain::AudioStage;
use crate::curve::gain_for;
use tabamp_core::MAX_VOLUME_PERCENT;

/// Number of samples over which to ramp gain changes
/// At 44.1kHz, 64 samples = ~1.5ms, which is imperceptible but prevents clicks
const SMOOTH_SAMPLES: u32 = 64;

/// Loudness gain stage
pub struct GainStage {
    /// Stored loudness percentage (0-800)
    percent: u16,
    /// Mute state; overrides the percentage
    muted: bool,
    /// Gain currently applied to samples, ramped toward target
    current_gain: f32,
    /// Gain the ramp is heading to
    target_gain: f32,
    /// Frames remaining until current matches target
    smooth_samples_remaining: u32,
    enabled: bool,
}

impl GainStage {
    /// Create a gain stage at the given loudness, starting at its target
    /// (no ramp-in on chain creation)
    pub fn new(percent: u16, muted: bool) -> Self {
        let percent = percent.min(MAX_VOLUME_PERCENT);
        let gain = Self::effective_gain(percent, muted);

        Self {
            percent,
            muted,
            current_gain: gain,
            target_gain: gain,
            smooth_samples_remaining: 0,
            enabled: true,
        }
    }

    /// Set the loudness percentage (clamped to 0-800)
    pub fn set_percent(&mut self, percent: u16) {
        self.percent = percent.min(MAX_VOLUME_PERCENT);
        self.retarget();
    }

    /// Set the mute state
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        self.retarget();
    }

    /// Stored loudness percentage
    pub fn percent(&self) -> u16 {
        self.percent
    }

    /// Whether the stage is muted
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// The gain the stage is converging to (0.0 when muted)
    pub fn target_gain(&self) -> f32 {
        self.target_gain
    }

    fn effective_gain(percent: u16, muted: bool) -> f32 {
        if muted {
            0.0
        } else {
            gain_for(f32::from(percent))
        }
    }

    fn retarget(&mut self) {
        let new_target = Self::effective_gain(self.percent, self.muted);
        if (new_target - self.target_gain).abs() > 1e-6 {
            self.target_gain = new_target;
            self.smooth_samples_remaining = SMOOTH_SAMPLES;
        }
    }

    #[inline]
    fn smooth_gain(&mut self) {
        if self.smooth_samples_remaining == 0 {
            return;
        }

        let alpha = 1.0 / self.smooth_samples_remaining as f32;
        self.current_gain += alpha * (self.target_gain - self.current_gain);
        self.smooth_samples_remaining -= 1;

        // Snap to target when done
        if self.smooth_samples_remaining == 0 {
            self.current_gain = self.target_gain;
        }
    }
}

impl AudioStage for GainStage {
    fn process(&mut self, buffer: &mut [f32], _sample_rate: u32) {
        if !self.enabled {
            return;
        }

        // Fast path: settled at unity, nothing to do
        if self.smooth_samples_remaining == 0 && (self.current_gain - 1.0).abs() < 1e-6 {
            return;
        }

        // Fast path: settled at silence
        if self.smooth_samples_remaining == 0 && self.current_gain == 0.0 {
            buffer.fill(0.0);
            return;
        }

        for chunk in buffer.chunks_exact_mut(2) {
            self.smooth_gain();
            chunk[0] *= self.current_gain;
            chunk[1] *= self.current_gain;
        }
    }

    fn reset(&mut self) {
        // Snap the ramp; filter-free stage has no other state
        self.current_gain = self.target_gain;
        self.smooth_samples_remaining = 0;
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn name(&self) -> &str {
        "Gain"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_at_target() {
        let stage = GainStage::new(100, false);
        assert_eq!(stage.percent(), 100);
        assert!((stage.target_gain() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn percent_clamped() {
        let mut stage = GainStage::new(100, false);
        stage.set_percent(2000);
        assert_eq!(stage.percent(), 800);
        assert!((stage.target_gain() - 8.0).abs() < 1e-6);
    }

    #[test]
    fn mute_forces_zero_and_unmute_restores() {
        let mut stage = GainStage::new(400, false);
        let boosted = stage.target_gain();
        assert!(boosted > 1.0);

        stage.set_muted(true);
        assert_eq!(stage.target_gain(), 0.0);
        assert_eq!(stage.percent(), 400); // Percentage preserved

        stage.set_muted(false);
        assert_eq!(stage.target_gain(), boosted);
    }

    #[test]
    fn applies_gain_after_ramp() {
        let mut stage = GainStage::new(200, false);
        let mut buffer = vec![0.25f32; 512];

        stage.process(&mut buffer, 44100);

        // Gain of 2.0 applied from the start (no ramp at creation)
        for sample in &buffer {
            assert!((sample - 0.5).abs() < 1e-5);
        }
    }

    #[test]
    fn muted_output_is_silent_after_ramp() {
        let mut stage = GainStage::new(400, false);
        stage.set_muted(true);

        // First buffer rides the ramp down; second is fully silent
        let mut buffer = vec![0.5f32; 256];
        stage.process(&mut buffer, 44100);
        let mut buffer = vec![0.5f32; 256];
        stage.process(&mut buffer, 44100);

        for sample in &buffer {
            assert_eq!(*sample, 0.0);
        }
    }

    #[test]
    fn unity_passthrough_unchanged() {
        let mut stage = GainStage::new(100, false);
        let original = vec![0.3f32, -0.7, 0.1, 0.9];
        let mut buffer = original.clone();

        stage.process(&mut buffer, 44100);

        assert_eq!(buffer, original);
    }

    #[test]
    fn disabled_stage_bypassed() {
        let mut stage = GainStage::new(800, false);
        stage.set_enabled(false);

        let original = vec![0.5f32; 8];
        let mut buffer = original.clone();
        stage.process(&mut buffer, 44100);

        assert_eq!(buffer, original);
    }
}
