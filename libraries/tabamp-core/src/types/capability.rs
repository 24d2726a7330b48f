//! Processing capability for a tab context
//!
//! Derived state: recomputed when a tap attempt fails or a protected-content
//! signal is observed. Once a context loses the ability to process, the loss
//! is sticky for the lifetime of that context.

use serde::{Deserialize, Serialize};

/// Why a context fell back to bounded direct control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestrictionReason {
    /// An encrypted-content signal was observed on a tracked source
    EncryptedContent,
    /// A tracked source has an active content-decryption association
    ActiveDecryption,
    /// The page explicitly blocks advanced processing
    PolicyBlocked,
    /// Tapping was rejected for a source that requires protected handling
    TapRejected,
    /// The host provides no audio-processing backend at all
    BackendUnavailable,
}

impl RestrictionReason {
    /// Human-readable explanation for the control surface
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EncryptedContent => "encrypted content detected",
            Self::ActiveDecryption => "protected playback session active",
            Self::PolicyBlocked => "page policy blocks audio processing",
            Self::TapRejected => "audio tap rejected by the page",
            Self::BackendUnavailable => "no audio processing backend available",
        }
    }
}

impl std::fmt::Display for RestrictionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether full processing chains may be built in this context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capability {
    /// True while processing chains may be built (full 0-800% range)
    pub can_process: bool,
    /// Set once restricted; never cleared within the context
    pub reason: Option<RestrictionReason>,
}

impl Capability {
    /// Initial state: full processing available
    #[must_use]
    pub fn capable() -> Self {
        Self {
            can_process: true,
            reason: None,
        }
    }

    /// Restricted state with the reason that triggered it
    #[must_use]
    pub fn restricted(reason: RestrictionReason) -> Self {
        Self {
            can_process: false,
            reason: Some(reason),
        }
    }
}

impl Default for Capability {
    fn default() -> Self {
        Self::capable()
    }
}
