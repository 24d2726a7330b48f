//! Tabamp DSP
//!
//! Signal-processing stages for the Tabamp per-tab loudness engine.
//! All stages operate in-place on interleaved stereo f32 samples and are
//! real-time safe: no allocation, no blocking, parameter changes smoothed
//! to avoid clicks.
//!
//! Available stages:
//! - **GainStage**: loudness boost driven by the two-segment gain curve
//! - **ToneStage**: swappable tone preset (default / voice / bass)
//! - **EqualizerBank**: ten fixed-frequency peaking filters in series
//! - **DynamicsStage**: compressor safety net with optional overdrive and
//!   soft clipping
//! - **ProcessingChain**: the fixed gain → tone → EQ → dynamics wiring
//!
//! # Example
//!
//! ```rust
//! use tabamp_core::Settings;
//! use tabamp_dsp::ProcessingChain;
//!
//! let mut settings = Settings::default();
//! settings.volume_percent = 300;
//!
//! let mut chain = ProcessingChain::new(&settings, false);
//! let mut buffer = vec![0.1f32; 1024];
//! chain.process(&mut buffer, 48000);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod biquad;
mod chain;
pub mod curve;
mod dynamics;
mod eq;
mod gain;
mod tone;

pub use chain::{AudioStage, ProcessingChain};
pub use curve::{gain_for, MAX_GAIN, SAFE_MAX_GAIN};
pub use dynamics::{DynamicsStage, SoftClipper};
pub use eq::{EqPreset, EqualizerBank, BAND_Q};
pub use gain::GainStage;
pub use tone::ToneStage;
