//! Tone-shaping stage
//!
//! One biquad retuned in place when the mode changes: the surrounding chain
//! is never rebuilt, and coefficient smoothing covers the transition so a
//! live switch is click-free.

use crate::biquad::Biquad;
use crate::chain::AudioStage;
use tabamp_core::ToneMode;

/// Voice preset: speech presence shelf
const VOICE_FREQUENCY_HZ: f32 = 3000.0;
const VOICE_Q: f32 = 0.9;
const VOICE_GAIN_DB: f32 = 10.0;

/// Bass preset: low shelf
const BASS_FREQUENCY_HZ: f32 = 120.0;
const BASS_Q: f32 = 0.707;
const BASS_GAIN_DB: f32 = 11.0;

/// Swappable tone-shaping stage
pub struct ToneStage {
    mode: ToneMode,
    filter: Biquad,
    enabled: bool,
    sample_rate: u32,
    needs_update: bool,
}

impl ToneStage {
    /// Create a tone stage in the given mode
    pub fn new(mode: ToneMode) -> Self {
        Self {
            mode,
            filter: Biquad::new(),
            enabled: true,
            sample_rate: 44100,
            needs_update: true,
        }
    }

    /// Current mode
    pub fn mode(&self) -> ToneMode {
        self.mode
    }

    /// Retune to a new mode without rebuilding the stage
    ///
    /// Takes effect on the next processed buffer; only filter parameters
    /// change, upstream and downstream wiring is untouched.
    pub fn set_mode(&mut self, mode: ToneMode) {
        if self.mode != mode {
            self.mode = mode;
            self.needs_update = true;
        }
    }

    fn update_filter(&mut self) {
        if !self.needs_update {
            return;
        }

        let sr = self.sample_rate as f32;
        match self.mode {
            ToneMode::Default => self.filter.set_identity(),
            ToneMode::Voice => {
                self.filter
                    .set_high_shelf(sr, VOICE_FREQUENCY_HZ, VOICE_Q, VOICE_GAIN_DB);
            }
            ToneMode::Bass => {
                self.filter
                    .set_low_shelf(sr, BASS_FREQUENCY_HZ, BASS_Q, BASS_GAIN_DB);
            }
        }

        self.needs_update = false;
    }
}

impl AudioStage for ToneStage {
    fn process(&mut self, buffer: &mut [f32], sample_rate: u32) {
        if !self.enabled {
            return;
        }

        if self.sample_rate != sample_rate {
            self.sample_rate = sample_rate;
            self.filter.reset();
            self.needs_update = true;
        }

        self.update_filter();

        for chunk in buffer.chunks_exact_mut(2) {
            let (l, r) = self.filter.process_sample(chunk[0], chunk[1]);
            chunk[0] = l;
            chunk[1] = r;
        }
    }

    fn reset(&mut self) {
        self.needs_update = true;
        self.update_filter();
        self.filter.reset();
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn name(&self) -> &str {
        match self.mode {
            ToneMode::Default => "Tone (neutral)",
            ToneMode::Voice => "Tone (voice)",
            ToneMode::Bass => "Tone (bass)",
        }
    }
}
