//! Biquad filter shared by the tone stage and the equalizer bank
//!
//! Tone retunes and EQ edits land mid-stream, so a parameter change never
//! swaps coefficients outright: the active set drifts toward the target
//! set one exponential step per frame, which keeps live adjustments free
//! of zipper noise.

use std::f32::consts::PI;

/// Per-frame step of the active-toward-target coefficient drift.
/// 0.002 settles in roughly 3 ms at 44.1 kHz.
const SMOOTH_COEFF: f32 = 0.002;

/// Stereo biquad with smoothed coefficient updates
#[derive(Debug, Clone)]
pub(crate) struct Biquad {
    // Where the set_* methods point the filter
    target_b0: f32,
    target_b1: f32,
    target_b2: f32,
    target_a1: f32,
    target_a2: f32,

    // What the audio actually runs through, drifting toward the targets
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,

    // Direct-form-I history, left then right
    x1_l: f32,
    x2_l: f32,
    y1_l: f32,
    y2_l: f32,

    x1_r: f32,
    x2_r: f32,
    y1_r: f32,
    y2_r: f32,
}

impl Biquad {
    /// Create a filter with neutral (pass-through) coefficients
    pub(crate) fn new() -> Self {
        Self {
            target_b0: 1.0,
            target_b1: 0.0,
            target_b2: 0.0,
            target_a1: 0.0,
            target_a2: 0.0,
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
            x1_l: 0.0,
            x2_l: 0.0,
            y1_l: 0.0,
            y2_l: 0.0,
            x1_r: 0.0,
            x2_r: 0.0,
            y1_r: 0.0,
            y2_r: 0.0,
        }
    }

    /// One drift step, called per frame from `process_sample`
    #[inline]
    fn smooth_coefficients(&mut self) {
        self.b0 += SMOOTH_COEFF * (self.target_b0 - self.b0);
        self.b1 += SMOOTH_COEFF * (self.target_b1 - self.b1);
        self.b2 += SMOOTH_COEFF * (self.target_b2 - self.b2);
        self.a1 += SMOOTH_COEFF * (self.target_a1 - self.a1);
        self.a2 += SMOOTH_COEFF * (self.target_a2 - self.a2);
    }

    fn set_target_coefficients(&mut self, b0: f32, b1: f32, b2: f32, a1: f32, a2: f32) {
        self.target_b0 = b0;
        self.target_b1 = b1;
        self.target_b2 = b2;
        self.target_a1 = a1;
        self.target_a2 = a2;
    }

    /// Target a neutral pass-through; the smoother ramps down any active
    /// boost without a click
    pub(crate) fn set_identity(&mut self) {
        self.set_target_coefficients(1.0, 0.0, 0.0, 0.0, 0.0);
    }

    /// Target a peaking band at the given center frequency
    pub(crate) fn set_peaking(&mut self, sample_rate: f32, frequency: f32, q: f32, gain_db: f32) {
        if sample_rate < 1.0 {
            return;
        }

        let a = 10.0_f32.powf(gain_db / 40.0);
        // Centers above 45% of the rate go unstable; pull them down
        let clamped_freq = frequency.min(sample_rate * 0.45);
        let omega = 2.0 * PI * clamped_freq / sample_rate;
        let sin_omega = omega.sin();
        let cos_omega = omega.cos();
        let alpha = sin_omega / (2.0 * q);

        let b0 = 1.0 + alpha * a;
        let b1 = -2.0 * cos_omega;
        let b2 = 1.0 - alpha * a;
        let a0 = 1.0 + alpha / a;
        let a1 = -2.0 * cos_omega;
        let a2 = 1.0 - alpha / a;

        self.set_target_coefficients(b0 / a0, b1 / a0, b2 / a0, a1 / a0, a2 / a0);
    }

    /// Target a low shelf below the given corner frequency
    pub(crate) fn set_low_shelf(&mut self, sample_rate: f32, frequency: f32, q: f32, gain_db: f32) {
        if sample_rate < 1.0 {
            return;
        }

        let a = 10.0_f32.powf(gain_db / 40.0);
        let clamped_freq = frequency.min(sample_rate * 0.45);
        let omega = 2.0 * PI * clamped_freq / sample_rate;
        let sin_omega = omega.sin();
        let cos_omega = omega.cos();
        let alpha = sin_omega / 2.0 * ((a + 1.0 / a) * (1.0 / q - 1.0) + 2.0).sqrt();
        let beta = 2.0 * a.sqrt() * alpha;

        let b0 = a * ((a + 1.0) - (a - 1.0) * cos_omega + beta);
        let b1 = 2.0 * a * ((a - 1.0) - (a + 1.0) * cos_omega);
        let b2 = a * ((a + 1.0) - (a - 1.0) * cos_omega - beta);
        let a0 = (a + 1.0) + (a - 1.0) * cos_omega + beta;
        let a1 = -2.0 * ((a - 1.0) + (a + 1.0) * cos_omega);
        let a2 = (a + 1.0) + (a - 1.0) * cos_omega - beta;

        self.set_target_coefficients(b0 / a0, b1 / a0, b2 / a0, a1 / a0, a2 / a0);
    }

    /// Target a high shelf above the given corner frequency
    pub(crate) fn set_high_shelf(
        &mut self,
        sample_rate: f32,
        frequency: f32,
        q: f32,
        gain_db: f32,
    ) {
        if sample_rate < 1.0 {
            return;
        }

        let a = 10.0_f32.powf(gain_db / 40.0);
        let clamped_freq = frequency.min(sample_rate * 0.45);
        let omega = 2.0 * PI * clamped_freq / sample_rate;
        let sin_omega = omega.sin();
        let cos_omega = omega.cos();
        let alpha = sin_omega / 2.0 * ((a + 1.0 / a) * (1.0 / q - 1.0) + 2.0).sqrt();
        let beta = 2.0 * a.sqrt() * alpha;

        let b0 = a * ((a + 1.0) + (a - 1.0) * cos_omega + beta);
        let b1 = -2.0 * a * ((a - 1.0) + (a + 1.0) * cos_omega);
        let b2 = a * ((a + 1.0) + (a - 1.0) * cos_omega - beta);
        let a0 = (a + 1.0) - (a - 1.0) * cos_omega + beta;
        let a1 = 2.0 * ((a - 1.0) - (a + 1.0) * cos_omega);
        let a2 = (a + 1.0) - (a - 1.0) * cos_omega - beta;

        self.set_target_coefficients(b0 / a0, b1 / a0, b2 / a0, a1 / a0, a2 / a0);
    }

    /// Process one stereo frame
    #[inline]
    pub(crate) fn process_sample(&mut self, left: f32, right: f32) -> (f32, f32) {
        self.smooth_coefficients();

        let mut out_l = self.b0 * left + self.b1 * self.x1_l + self.b2 * self.x2_l
            - self.a1 * self.y1_l
            - self.a2 * self.y2_l;

        // Decaying tails drop into denormal range; zero them out
        if out_l.abs() < 1e-15 {
            out_l = 0.0;
        }

        self.x2_l = self.x1_l;
        self.x1_l = left;
        self.y2_l = self.y1_l;
        self.y1_l = out_l;

        let mut out_r = self.b0 * right + self.b1 * self.x1_r + self.b2 * self.x2_r
            - self.a1 * self.y1_r
            - self.a2 * self.y2_r;

        if out_r.abs() < 1e-15 {
            out_r = 0.0;
        }

        self.x2_r = self.x1_r;
        self.x1_r = right;
        self.y2_r = self.y1_r;
        self.y1_r = out_r;

        (out_l, out_r)
    }

    /// Clear the sample history and snap the drift to its targets
    pub(crate) fn reset(&mut self) {
        self.x1_l = 0.0;
        self.x2_l = 0.0;
        self.y1_l = 0.0;
        self.y2_l = 0.0;
        self.x1_r = 0.0;
        self.x2_r = 0.0;
        self.y1_r = 0.0;
        self.y2_r = 0.0;
        self.b0 = self.target_b0;
        self.b1 = self.target_b1;
        self.b2 = self.target_b2;
        self.a1 = self.target_a1;
        self.a2 = self.target_a2;
    }
}
