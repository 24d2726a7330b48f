//! Domain types shared across the Tabamp crates

mod capability;
mod settings;
mod source;

pub use capability::{Capability, RestrictionReason};
pub use settings::{
    EqGains, Settings, SettingsUpdate, ToneMode, EQ_BAND_COUNT, EQ_BAND_FREQUENCIES,
    EQ_GAIN_MAX_DB, EQ_GAIN_MIN_DB, MAX_VOLUME_PERCENT, SAFE_VOLUME_PERCENT, UNITY_VOLUME_PERCENT,
};
pub use source::SourceId;
