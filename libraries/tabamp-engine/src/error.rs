//! Error types for source binding

use thiserror::Error;

/// Why a tap attempt on a single source failed
///
/// Tap failures are local to the failing source: a `NotReady` source gets a
/// deferred retry, a `Protected` source drops the whole context to the
/// restricted control path, and other sources keep processing either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TapError {
    /// The source exists but is not ready to be tapped yet
    #[error("source not ready for tapping")]
    NotReady,

    /// The source carries protected content and refuses processing taps
    #[error("source rejected tap due to content protection")]
    Protected,

    /// The host backend rejected the tap for a non-content reason
    #[error("host backend rejected tap: {0}")]
    Backend(&'static str),
}

/// Result type for tap operations
pub type TapResult = std::result::Result<(), TapError>;
