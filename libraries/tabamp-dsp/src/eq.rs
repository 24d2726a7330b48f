//! Ten-band equalizer
//!
//! Fixed-frequency peaking filters wired strictly in series, ascending
//! order. Each band's gain is independently clamped; a non-numeric value
//! defaults that band to 0 dB instead of failing the call.

use crate::biquad::Biquad;
use crate::chain::AudioStage;
use tabamp_core::{EqGains, EQ_BAND_COUNT, EQ_BAND_FREQUENCIES};

/// Q factor shared by all bands
pub const BAND_Q: f32 = 1.0;

/// Below this magnitude a band is treated as flat and bypassed to identity
const FLAT_THRESHOLD_DB: f32 = 0.01;

/// Named equalizer preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EqPreset {
    /// All bands at 0 dB
    #[default]
    Flat,
    /// Enhanced mid frequencies for speech
    Voice,
    /// Enhanced low frequencies
    Bass,
    /// User-defined band gains
    Custom,
}

impl EqPreset {
    /// Gain values for this preset, one per band
    pub fn gains(&self) -> [f32; EQ_BAND_COUNT] {
        match self {
            Self::Flat | Self::Custom => [0.0; EQ_BAND_COUNT],
            Self::Voice => [-2.0, -1.0, 0.0, 2.0, 4.0, 4.0, 2.0, 0.0, -1.0, -2.0],
            Self::Bass => [6.0, 5.0, 4.0, 2.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
        }
    }

    /// Preset name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Flat => "Flat",
            Self::Voice => "Voice",
            Self::Bass => "Bass",
            Self::Custom => "Custom",
        }
    }
}

/// Ten-band series equalizer
pub struct EqualizerBank {
    /// One filter per fixed center frequency, ascending
    filters: Vec<Biquad>,
    gains: EqGains,
    preset: EqPreset,
    enabled: bool,
    sample_rate: u32,
    needs_update: bool,
}

impl EqualizerBank {
    /// Create a flat equalizer
    pub fn new() -> Self {
        Self::with_gains(EqGains::flat())
    }

    /// Create an equalizer with the given band gains
    pub fn with_gains(gains: EqGains) -> Self {
        Self {
            filters: (0..EQ_BAND_COUNT).map(|_| Biquad::new()).collect(),
            gains,
            preset: EqPreset::Custom,
            enabled: true,
            sample_rate: 44100,
            needs_update: true,
        }
    }

    /// Number of bands
    pub fn band_count(&self) -> usize {
        self.filters.len()
    }

    /// Center frequency for a band
    pub fn band_frequency(&self, index: usize) -> Option<f32> {
        EQ_BAND_FREQUENCIES.get(index).copied()
    }

    /// Current gain vector
    pub fn gains(&self) -> EqGains {
        self.gains
    }

    /// Set all band gains at once
    ///
    /// Values are already sanitized by [`EqGains`]; applying the same
    /// vector twice leaves per-band state identical.
    pub fn set_gains(&mut self, gains: EqGains) {
        if self.gains == gains {
            return;
        }
        self.gains = gains;
        self.preset = EqPreset::Custom;
        self.needs_update = true;
    }

    /// Set one band's gain in dB (clamped)
    pub fn set_band_gain(&mut self, index: usize, gain_db: f32) {
        if index >= EQ_BAND_COUNT {
            return;
        }
        self.gains.set(index, gain_db);
        self.preset = EqPreset::Custom;
        self.needs_update = true;
    }

    /// Apply a named preset
    pub fn set_preset(&mut self, preset: EqPreset) {
        self.gains = EqGains::from_slice(&preset.gains());
        self.preset = preset;
        self.needs_update = true;
    }

    /// Current preset (`Custom` after any direct gain edit)
    pub fn preset(&self) -> EqPreset {
        self.preset
    }

    fn update_coefficients(&mut self) {
        if !self.needs_update {
            return;
        }

        let sr = self.sample_rate as f32;
        for (index, filter) in self.filters.iter_mut().enumerate() {
            let gain_db = self.gains.get(index).unwrap_or(0.0);
            if gain_db.abs() < FLAT_THRESHOLD_DB {
                filter.set_identity();
            } else {
                filter.set_peaking(sr, EQ_BAND_FREQUENCIES[index], BAND_Q, gain_db);
            }
        }

        self.needs_update = false;
    }
}

impl Default for EqualizerBank {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioStage for EqualizerBank {
    fn process(&mut self, buffer: &mut [f32], sample_rate: u32) {
        if !self.enabled {
            return;
        }

        if self.sample_rate != sample_rate {
            self.sample_rate = sample_rate;
            for filter in &mut self.filters {
                filter.reset();
            }
            self.needs_update = true;
        }

        self.update_coefficients();

        for chunk in buffer.chunks_exact_mut(2) {
            let mut left = chunk[0];
            let mut right = chunk[1];

            for filter in &mut self.filters {
                (left, right) = filter.process_sample(left, right);
            }

            chunk[0] = left;
            chunk[1] = right;
        }
    }

    fn reset(&mut self) {
        self.needs_update = true;
        self.update_coefficients();
        for filter in &mut self.filters {
            filter.reset();
        }
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn name(&self) -> &str {
        "10-Band EQ"
    }
}
