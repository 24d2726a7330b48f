//! Host media backend abstraction
//!
//! The engine never talks to a page or a platform audio API directly; it
//! drives this trait. A production implementation wraps the embedder's
//! media layer, tests use a scripted mock.

use crate::error::TapResult;
use tabamp_core::SourceId;

/// Environment-provided media operations for one tab context
pub trait MediaHost: Send {
    /// Whether the host exposes an audio-processing backend at all
    ///
    /// When this is false the context can only ever use bounded direct
    /// control, equivalent to an immediate capability loss at startup.
    fn backend_available(&self) -> bool;

    /// Sources already present when the context is entered
    fn existing_sources(&self) -> Vec<SourceId>;

    /// Attempt a direct in-place tap of the source's element output
    fn tap_element(&mut self, source: SourceId) -> TapResult;

    /// Attempt a capture-based tap mirroring the source's output
    ///
    /// Tried only after [`tap_element`](Self::tap_element) fails; a failed
    /// attempt must leave the source untouched.
    fn tap_capture(&mut self, source: SourceId) -> TapResult;

    /// Release any tap held on the source
    fn release(&mut self, source: SourceId);

    /// Set the source's native volume property (0.0 to 1.0)
    ///
    /// The bounded direct-control path used when processing is restricted.
    fn set_native_volume(&mut self, source: SourceId, volume: f32);

    /// Set the source's native mute property
    fn set_native_muted(&mut self, source: SourceId, muted: bool);
}
