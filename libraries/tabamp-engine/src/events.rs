//! Control-plane events
//!
//! Inbound [`SourceEvent`]s come from the embedder's discovery and
//! protected-content feeds. Outbound [`EngineEvent`]s accumulate on the
//! controller and are drained by the embedder after each call, mirroring
//! the single-threaded callback model: no cross-thread channels, just a
//! queue emptied at the call boundary.

use crate::error::TapError;
use tabamp_core::{RestrictionReason, SourceId};

/// Notification from the host about a tracked source or the context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceEvent {
    /// A candidate source appeared in the context
    Appeared(SourceId),
    /// A previously deferred source signalled readiness to play
    Ready(SourceId),
    /// A source ended, detached, or was removed
    Ended(SourceId),
    /// An encrypted-content signal fired on a tracked source
    Encrypted(SourceId),
    /// A content-decryption association became active on a tracked source
    DecryptionActive(SourceId),
    /// The page declared a policy flag blocking advanced processing
    PolicyBlocked,
}

/// Notification from the engine to the embedder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// A source was bound to a processing chain
    SourceBound {
        /// The bound source
        source: SourceId,
    },
    /// A source's chain was torn down
    SourceUnbound {
        /// The released source
        source: SourceId,
    },
    /// A bind attempt failed and a retry is registered on the source's
    /// readiness signal
    SourceDeferred {
        /// The deferred source
        source: SourceId,
        /// Bind attempts made so far
        attempts: u8,
    },
    /// All bind attempts on a source are exhausted; it stays on bounded
    /// native control while the rest of the context keeps full processing
    SourceUnprocessable {
        /// The source that could not be bound
        source: SourceId,
        /// The last tap failure, surfaced so controls are never inert
        /// without an explanation
        reason: TapError,
    },
    /// The context transitioned from capable to restricted
    CapabilityChanged {
        /// Whether full processing is still available (always false here;
        /// the transition is one-way)
        can_process: bool,
        /// Why the context was restricted
        reason: RestrictionReason,
    },
}

/// Callback invoked on the capability transition, at most once per context
pub type CapabilityCallback = Box<dyn Fn(bool, RestrictionReason) + Send + Sync>;
