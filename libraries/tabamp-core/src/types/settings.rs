//! User-facing processing settings
//!
//! Settings are owned by the processing controller and pushed one-way into
//! live processing chains. All setters clamp or default out-of-range input
//! instead of rejecting it, so a buggy control surface can never wedge the
//! audio path.

use serde::{Deserialize, Serialize};

/// Hard ceiling for the loudness percentage (boost zone included)
pub const MAX_VOLUME_PERCENT: u16 = 800;

/// Recommended safe ceiling; the range above it is the experimental zone
pub const SAFE_VOLUME_PERCENT: u16 = 600;

/// Unity gain (native page volume)
pub const UNITY_VOLUME_PERCENT: u16 = 100;

/// Number of equalizer bands
pub const EQ_BAND_COUNT: usize = 10;

/// Fixed equalizer band center frequencies (Hz), ascending
pub const EQ_BAND_FREQUENCIES: [f32; EQ_BAND_COUNT] = [
    31.0, 62.0, 125.0, 250.0, 500.0, 1000.0, 2000.0, 4000.0, 8000.0, 16000.0,
];

/// Minimum per-band equalizer gain in dB
pub const EQ_GAIN_MIN_DB: f32 = -24.0;

/// Maximum per-band equalizer gain in dB
pub const EQ_GAIN_MAX_DB: f32 = 24.0;

/// Tone-shaping preset selecting the tone stage topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToneMode {
    /// Neutral passthrough
    #[default]
    Default,
    /// Speech presence boost (~3 kHz shelf)
    Voice,
    /// Low-shelf bass boost
    Bass,
}

impl ToneMode {
    /// Convert to string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Voice => "voice",
            Self::Bass => "bass",
        }
    }

    /// Look up a mode by its wire name
    ///
    /// Returns `None` for unknown input; callers fall back to
    /// `ToneMode::default()` rather than erroring.
    #[must_use]
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "default" => Some(Self::Default),
            "voice" => Some(Self::Voice),
            "bass" => Some(Self::Bass),
            _ => None,
        }
    }
}

impl std::fmt::Display for ToneMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-band equalizer gains in dB
///
/// Always holds exactly [`EQ_BAND_COUNT`] values, each clamped to
/// [[`EQ_GAIN_MIN_DB`], [`EQ_GAIN_MAX_DB`]]. Non-finite input defaults the
/// affected band to 0 dB without failing the whole call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EqGains([f32; EQ_BAND_COUNT]);

impl EqGains {
    /// Create a flat (all 0 dB) gain vector
    #[must_use]
    pub fn flat() -> Self {
        Self([0.0; EQ_BAND_COUNT])
    }

    /// Build from an arbitrary slice
    ///
    /// Short input is padded with 0 dB, long input is truncated, each value
    /// is clamped independently and non-numeric (NaN/infinite) values become
    /// 0 dB.
    #[must_use]
    pub fn from_slice(values: &[f32]) -> Self {
        let mut gains = [0.0; EQ_BAND_COUNT];
        for (slot, &value) in gains.iter_mut().zip(values.iter()) {
            *slot = Self::sanitize(value);
        }
        Self(gains)
    }

    /// Set a single band's gain, clamped
    pub fn set(&mut self, band: usize, gain_db: f32) {
        if let Some(slot) = self.0.get_mut(band) {
            *slot = Self::sanitize(gain_db);
        }
    }

    /// Get a single band's gain
    #[must_use]
    pub fn get(&self, band: usize) -> Option<f32> {
        self.0.get(band).copied()
    }

    /// Borrow the full gain vector
    #[must_use]
    pub fn as_array(&self) -> &[f32; EQ_BAND_COUNT] {
        &self.0
    }

    /// Whether every band sits at 0 dB
    #[must_use]
    pub fn is_flat(&self) -> bool {
        self.0.iter().all(|g| *g == 0.0)
    }

    fn sanitize(value: f32) -> f32 {
        if value.is_finite() {
            value.clamp(EQ_GAIN_MIN_DB, EQ_GAIN_MAX_DB)
        } else {
            0.0
        }
    }
}

impl Default for EqGains {
    fn default() -> Self {
        Self::flat()
    }
}

impl From<[f32; EQ_BAND_COUNT]> for EqGains {
    fn from(values: [f32; EQ_BAND_COUNT]) -> Self {
        Self::from_slice(&values)
    }
}

/// Complete processing settings for one tab context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Loudness percentage (0-800); 100 is unity gain
    pub volume_percent: u16,

    /// Mute state, independent of `volume_percent`
    pub muted: bool,

    /// Tone-shaping preset
    pub mode: ToneMode,

    /// Equalizer band gains
    pub eq_gains: EqGains,
}

impl Settings {
    /// Apply a partial update, keeping unspecified fields
    ///
    /// Raw values are sanitized here: the volume is clamped to the hard
    /// ceiling (the controller applies the tighter overdrive-dependent
    /// clamp), and the EQ vector is coerced to exactly ten clamped entries.
    pub fn merge(&mut self, update: &SettingsUpdate) {
        if let Some(volume) = update.volume_percent {
            self.volume_percent = volume.min(MAX_VOLUME_PERCENT);
        }
        if let Some(muted) = update.muted {
            self.muted = muted;
        }
        if let Some(mode) = update.mode {
            self.mode = mode;
        }
        if let Some(ref gains) = update.eq_gains {
            self.eq_gains = EqGains::from_slice(gains);
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            volume_percent: UNITY_VOLUME_PERCENT,
            muted: false,
            mode: ToneMode::Default,
            eq_gains: EqGains::flat(),
        }
    }
}

/// Partial settings update; `None` fields retain their prior value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsUpdate {
    /// New loudness percentage, if changing
    pub volume_percent: Option<u16>,
    /// New mute state, if changing
    pub muted: Option<bool>,
    /// New tone mode, if changing
    pub mode: Option<ToneMode>,
    /// New EQ vector, if changing (coerced to ten entries on apply)
    pub eq_gains: Option<Vec<f32>>,
}
