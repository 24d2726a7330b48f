//! Dynamics stage
//!
//! A compressor that doubles as a safety net against hard clipping at high
//! boost. Two fixed configurations:
//!
//! - safety net (overdrive off): ratio 1:1 with the threshold at the
//!   ceiling — structurally present but not audibly engaged
//! - overdrive: threshold -18 dB, ratio 8:1, fast attack, moderate release,
//!   trading artifacts for perceived loudness
//!
//! In overdrive an odd-symmetric soft clipper follows the compressor as a
//! last-resort ceiling, saturating smoothly instead of truncating.

use crate::chain::AudioStage;

/// Safety-net configuration: pass-through until the signal hits the ceiling
const SAFETY_THRESHOLD_DB: f32 = 0.0;
const SAFETY_RATIO: f32 = 1.0;
const SAFETY_ATTACK_MS: f32 = 5.0;
const SAFETY_RELEASE_MS: f32 = 50.0;

/// Overdrive configuration
const OVERDRIVE_THRESHOLD_DB: f32 = -18.0;
const OVERDRIVE_RATIO: f32 = 8.0;
const OVERDRIVE_ATTACK_MS: f32 = 3.0;
const OVERDRIVE_RELEASE_MS: f32 = 250.0;

/// Peak-hold release, independent of the user-facing release time
const PEAK_RELEASE_MS: f32 = 50.0;

const NOISE_FLOOR_DB: f32 = -120.0;

/// Odd-symmetric soft saturation: `x / (1 + k|x|)`
///
/// Monotonic, approaches but never exceeds ±1/k for ±infinite input.
#[derive(Debug, Clone, Copy)]
pub struct SoftClipper {
    k: f32,
}

impl SoftClipper {
    /// Create a clipper with a ±1 asymptotic ceiling
    pub fn new() -> Self {
        Self { k: 1.0 }
    }

    /// Transfer function for a single sample
    #[inline]
    pub fn transfer(&self, x: f32) -> f32 {
        x / (1.0 + self.k * x.abs())
    }
}

impl Default for SoftClipper {
    fn default() -> Self {
        Self::new()
    }
}

/// Compressor/limiter safety stage with optional overdrive coloration
///
/// Uses a two-stage design: a peak detector with instant attack and slow
/// release holds the level across waveform cycles, and the gain reduction
/// itself is smoothed with the configured attack/release times.
pub struct DynamicsStage {
    overdrive: bool,
    clipper: SoftClipper,
    enabled: bool,

    // Peak level detector (in dB); instant attack, slow release
    peak_level_db: f32,

    // Smoothed gain reduction in dB
    gain_reduction_db: f32,

    // Coefficient cache
    peak_release_coeff: f32,
    gr_attack_coeff: f32,
    gr_release_coeff: f32,

    sample_rate: u32,
    needs_update: bool,
}

impl DynamicsStage {
    /// Create a dynamics stage in safety-net mode
    pub fn new() -> Self {
        let mut stage = Self {
            overdrive: false,
            clipper: SoftClipper::new(),
            enabled: true,
            peak_level_db: NOISE_FLOOR_DB,
            gain_reduction_db: 0.0,
            peak_release_coeff: 0.0,
            gr_attack_coeff: 0.0,
            gr_release_coeff: 0.0,
            sample_rate: 44100,
            needs_update: true,
        };
        stage.update_coefficients();
        stage
    }

    /// Enable or disable overdrive coloration
    pub fn set_overdrive(&mut self, overdrive: bool) {
        if self.overdrive != overdrive {
            self.overdrive = overdrive;
            self.needs_update = true;
        }
    }

    /// Whether overdrive is engaged
    pub fn overdrive(&self) -> bool {
        self.overdrive
    }

    fn threshold_db(&self) -> f32 {
        if self.overdrive {
            OVERDRIVE_THRESHOLD_DB
        } else {
            SAFETY_THRESHOLD_DB
        }
    }

    fn ratio(&self) -> f32 {
        if self.overdrive {
            OVERDRIVE_RATIO
        } else {
            SAFETY_RATIO
        }
    }

    fn update_coefficients(&mut self) {
        if !self.needs_update {
            return;
        }

        let sr = self.sample_rate as f32;
        let (attack_ms, release_ms) = if self.overdrive {
            (OVERDRIVE_ATTACK_MS, OVERDRIVE_RELEASE_MS)
        } else {
            (SAFETY_ATTACK_MS, SAFETY_RELEASE_MS)
        };

        // coeff = exp(-1 / (time_ms * sample_rate / 1000)):
        // 63.2% response at the specified time
        self.peak_release_coeff = (-1.0 / (PEAK_RELEASE_MS * sr / 1000.0)).exp();
        self.gr_attack_coeff = (-1.0 / (attack_ms * sr / 1000.0)).exp();
        self.gr_release_coeff = (-1.0 / (release_ms * sr / 1000.0)).exp();

        self.needs_update = false;
    }

    /// Output level for a given input level, hard knee (both in dB)
    #[inline]
    fn compute_output_level(&self, input_db: f32) -> f32 {
        let threshold = self.threshold_db();
        if input_db <= threshold {
            input_db
        } else {
            threshold + (input_db - threshold) / self.ratio()
        }
    }

    #[inline]
    fn compute_gain_reduction(&self, input_db: f32) -> f32 {
        self.compute_output_level(input_db) - input_db
    }

    /// Instant attack, fixed-rate release toward the noise floor so peaks
    /// hold across waveform cycles
    #[inline]
    fn update_peak_level(&mut self, input_db: f32) {
        if input_db > self.peak_level_db {
            self.peak_level_db = input_db;
        } else {
            self.peak_level_db =
                self.peak_release_coeff * (self.peak_level_db - NOISE_FLOOR_DB) + NOISE_FLOOR_DB;
        }
    }

    #[inline]
    fn smooth_gain_reduction(&mut self, target_gr_db: f32) {
        let coeff = if target_gr_db < self.gain_reduction_db {
            self.gr_attack_coeff
        } else {
            self.gr_release_coeff
        };

        self.gain_reduction_db = coeff * self.gain_reduction_db + (1.0 - coeff) * target_gr_db;
    }

    #[inline]
    fn db_to_linear(db: f32) -> f32 {
        10.0_f32.powf(db / 20.0)
    }

    #[inline]
    fn linear_to_db(linear: f32) -> f32 {
        if linear > 1e-10 {
            20.0 * linear.log10()
        } else {
            -200.0
        }
    }
}

impl Default for DynamicsStage {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioStage for DynamicsStage {
    fn process(&mut self, buffer: &mut [f32], sample_rate: u32) {
        if !self.enabled {
            return;
        }

        if self.sample_rate != sample_rate {
            self.sample_rate = sample_rate;
            self.needs_update = true;
        }

        self.update_coefficients();

        for chunk in buffer.chunks_exact_mut(2) {
            // Linked stereo: the louder channel drives detection
            let max_sample = chunk[0].abs().max(chunk[1].abs());

            let input_db = Self::linear_to_db(max_sample);

            self.update_peak_level(input_db);
            let target_gr_db = self.compute_gain_reduction(self.peak_level_db);
            self.smooth_gain_reduction(target_gr_db);

            let gain = Self::db_to_linear(self.gain_reduction_db);

            let mut left = chunk[0] * gain;
            let mut right = chunk[1] * gain;

            if self.overdrive {
                left = self.clipper.transfer(left);
                right = self.clipper.transfer(right);
            }

            chunk[0] = left;
            chunk[1] = right;
        }
    }

    fn reset(&mut self) {
        self.peak_level_db = NOISE_FLOOR_DB;
        self.gain_reduction_db = 0.0;
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn name(&self) -> &str {
        if self.overdrive {
            "Dynamics (overdrive)"
        } else {
            "Dynamics (safety)"
        }
    }
}
