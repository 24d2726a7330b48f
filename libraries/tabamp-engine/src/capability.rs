//! Capability guard
//!
//! Two states, one transition. A context starts capable; the first
//! restriction signal drops it to restricted for the rest of its lifetime.
//! No re-probing for recovery: flapping between control surfaces
//! mid-playback is a worse experience than a stable fallback. A fresh
//! navigation builds a fresh guard.

use tabamp_core::{Capability, RestrictionReason};
use tracing::info;

/// Sticky capable/restricted state for one tab context
#[derive(Debug, Default)]
pub struct CapabilityGuard {
    reason: Option<RestrictionReason>,
}

impl CapabilityGuard {
    /// Create a guard in the capable state
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether full processing is still allowed
    pub fn can_process(&self) -> bool {
        self.reason.is_none()
    }

    /// The restriction reason, if restricted
    pub fn reason(&self) -> Option<RestrictionReason> {
        self.reason
    }

    /// Drop to restricted
    ///
    /// Returns true only on the transition; later calls keep the original
    /// reason and return false, so callers fire their notification exactly
    /// once.
    pub fn restrict(&mut self, reason: RestrictionReason) -> bool {
        if self.reason.is_some() {
            return false;
        }
        info!(%reason, "processing capability restricted");
        self.reason = Some(reason);
        true
    }

    /// Snapshot for external state queries
    pub fn capability(&self) -> Capability {
        match self.reason {
            None => Capability::capable(),
            Some(reason) => Capability::restricted(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_capable() {
        let guard = CapabilityGuard::new();
        assert!(guard.can_process());
        assert_eq!(guard.reason(), None);
    }

    #[test]
    fn restrict_transitions_once() {
        let mut guard = CapabilityGuard::new();

        assert!(guard.restrict(RestrictionReason::EncryptedContent));
        assert!(!guard.can_process());

        // Second signal is absorbed; the first reason wins
        assert!(!guard.restrict(RestrictionReason::PolicyBlocked));
        assert_eq!(guard.reason(), Some(RestrictionReason::EncryptedContent));
    }

    #[test]
    fn capability_snapshot_reflects_state() {
        let mut guard = CapabilityGuard::new();
        assert!(guard.capability().can_process);

        guard.restrict(RestrictionReason::ActiveDecryption);
        let cap = guard.capability();
        assert!(!cap.can_process);
        assert_eq!(cap.reason, Some(RestrictionReason::ActiveDecryption));
    }
}
