//! Tabamp Core
//!
//! Shared types for the Tabamp per-tab loudness and tone-shaping engine.
//!
//! This crate defines:
//! - **Settings Types**: `Settings`, `SettingsUpdate`, `ToneMode`, `EqGains`
//! - **Capability Types**: `Capability`, `RestrictionReason`
//! - **Identity Types**: `SourceId`
//!
//! # Example
//!
//! ```rust
//! use tabamp_core::{Settings, SettingsUpdate, ToneMode};
//!
//! let mut settings = Settings::default();
//! assert_eq!(settings.volume_percent, 100);
//!
//! settings.merge(&SettingsUpdate {
//!     volume_percent: Some(250),
//!     mode: Some(ToneMode::Bass),
//!     ..SettingsUpdate::default()
//! });
//! assert_eq!(settings.volume_percent, 250);
//! assert_eq!(settings.mode, ToneMode::Bass);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod types;

// Re-export commonly used types
pub use types::{
    Capability, EqGains, RestrictionReason, Settings, SettingsUpdate, SourceId, ToneMode,
    EQ_BAND_COUNT, EQ_BAND_FREQUENCIES, EQ_GAIN_MAX_DB, EQ_GAIN_MIN_DB, MAX_VOLUME_PERCENT,
    SAFE_VOLUME_PERCENT, UNITY_VOLUME_PERCENT,
};
