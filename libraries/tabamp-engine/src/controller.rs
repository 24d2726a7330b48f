//! Processing controller
//!
//! The top-level handle for one tab context: it owns the settings, the
//! capability guard, and the source binder, and translates control-plane
//! calls and host events into chain mutations. It is a settings-holder
//! plus dispatcher, not a protocol: every setter clamps or defaults bad
//! input instead of erroring, so a buggy control surface can never wedge
//! the audio path.

use serde::Serialize;
use tabamp_core::{
    Capability, EqGains, RestrictionReason, Settings, SettingsUpdate, SourceId, ToneMode,
    MAX_VOLUME_PERCENT, SAFE_VOLUME_PERCENT,
};
use tracing::{debug, warn};

use crate::binder::{BindOutcome, MixingLayout, SourceBinder};
use crate::capability::CapabilityGuard;
use crate::events::{CapabilityCallback, EngineEvent, SourceEvent};
use crate::host::MediaHost;

/// Snapshot of controller state for the external control plane
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineState {
    /// Stored loudness percentage
    pub volume_percent: u16,
    /// Stored mute state
    pub muted: bool,
    /// Stored tone mode
    pub mode: ToneMode,
    /// Stored equalizer gains
    pub eq_gains: EqGains,
    /// Whether full processing is available
    pub can_process: bool,
    /// Why processing is restricted, if it is
    pub capability_reason: Option<RestrictionReason>,
    /// Number of live processing chains
    pub active_chain_count: usize,
}

/// Per-context controller tying settings, capability, and binding together
pub struct ProcessingController<H: MediaHost> {
    binder: SourceBinder<H>,
    guard: CapabilityGuard,
    settings: Settings,
    overdrive: bool,
    capability_callback: Option<CapabilityCallback>,
    pending_events: Vec<EngineEvent>,
}

impl<H: MediaHost> ProcessingController<H> {
    /// Create a controller for one context
    ///
    /// A host with no processing backend restricts the context immediately;
    /// since the capability callback cannot be installed yet, that startup
    /// restriction is observable through [`drain_events`](Self::drain_events)
    /// and [`state`](Self::state).
    pub fn new(host: H, layout: MixingLayout, overdrive: bool) -> Self {
        let settings = Settings::default();
        let binder = SourceBinder::new(host, layout, settings.clone(), overdrive);

        let mut controller = Self {
            binder,
            guard: CapabilityGuard::new(),
            settings,
            overdrive,
            capability_callback: None,
            pending_events: Vec::new(),
        };

        if !controller.binder.host().backend_available() {
            warn!("no processing backend; context starts restricted");
            controller.restrict(RestrictionReason::BackendUnavailable);
        }

        controller
    }

    /// Install the capability-changed callback
    ///
    /// Fired at most once per context, on the capable-to-restricted
    /// transition.
    pub fn set_capability_callback(&mut self, callback: CapabilityCallback) {
        self.capability_callback = Some(callback);
    }

    /// Run the startup scan over sources already present in the context
    pub fn scan(&mut self) {
        if !self.guard.can_process() {
            return;
        }
        for (source, outcome) in self.binder.scan() {
            self.record_outcome(source, outcome);
        }
    }

    /// The loudness ceiling under the current overdrive flag
    pub fn max_allowed_percent(&self) -> u16 {
        if self.overdrive {
            MAX_VOLUME_PERCENT
        } else {
            SAFE_VOLUME_PERCENT
        }
    }

    /// Set the loudness percentage, clamped to the allowed range
    ///
    /// Skips the cross-boundary push when the clamped value equals the last
    /// applied one.
    pub fn set_volume_percent(&mut self, percent: u16) {
        let clamped = percent.min(self.max_allowed_percent());
        if clamped == self.settings.volume_percent {
            return;
        }
        self.settings.volume_percent = clamped;
        self.push();
    }

    /// Set the mute state
    ///
    /// Muting zeroes the effective gain without touching the stored
    /// percentage, so unmuting restores the prior loudness.
    pub fn set_muted(&mut self, muted: bool) {
        self.settings.muted = muted;
        self.push();
    }

    /// Set the tone mode
    ///
    /// Untyped callers coerce through [`ToneMode::from_name`], defaulting
    /// unknown names to the neutral mode before reaching here.
    pub fn set_mode(&mut self, mode: ToneMode) {
        self.settings.mode = mode;
        self.push();
    }

    /// Set the equalizer gains from an arbitrary slice
    ///
    /// Coerced to exactly ten clamped entries; non-numeric values become
    /// 0 dB.
    pub fn set_eq_gains(&mut self, values: &[f32]) {
        self.settings.eq_gains = EqGains::from_slice(values);
        self.push();
    }

    /// Flip the externally supplied overdrive flag
    ///
    /// Disabling overdrive pulls a stored volume above the safe ceiling
    /// back down to it.
    pub fn set_overdrive(&mut self, overdrive: bool) {
        self.overdrive = overdrive;
        self.settings.volume_percent = self.settings.volume_percent.min(self.max_allowed_percent());
        self.push();
    }

    /// Apply a partial settings update in one push
    ///
    /// Unspecified fields keep their prior value. Works with zero chains:
    /// stored settings seed any chain created later.
    pub fn apply_settings(&mut self, update: &SettingsUpdate) {
        self.settings.merge(update);
        self.settings.volume_percent = self.settings.volume_percent.min(self.max_allowed_percent());
        self.push();
    }

    /// Side-effect-free state snapshot
    pub fn state(&self) -> EngineState {
        let Capability { can_process, reason } = self.guard.capability();
        EngineState {
            volume_percent: self.settings.volume_percent,
            muted: self.settings.muted,
            mode: self.settings.mode,
            eq_gains: self.settings.eq_gains,
            can_process,
            capability_reason: reason,
            active_chain_count: self.binder.active_chain_count(),
        }
    }

    /// React to a host source or context event
    pub fn handle_source_event(&mut self, event: SourceEvent) {
        match event {
            SourceEvent::Appeared(source) => {
                if self.guard.can_process() {
                    let outcome = self.binder.source_appeared(source);
                    self.record_outcome(source, outcome);
                } else {
                    // Restricted: no tap attempts, but the source still
                    // gets bounded native control
                    self.binder.observe(source);
                    self.binder
                        .push_native(self.settings.volume_percent, self.settings.muted);
                }
            }
            SourceEvent::Ready(source) => {
                if self.guard.can_process() {
                    let outcome = self.binder.source_ready(source);
                    self.record_outcome(source, outcome);
                }
            }
            SourceEvent::Ended(source) => {
                if self.binder.source_ended(source) {
                    self.pending_events
                        .push(EngineEvent::SourceUnbound { source });
                }
            }
            SourceEvent::Encrypted(source) => {
                debug!(%source, "encrypted-content signal");
                self.restrict(RestrictionReason::EncryptedContent);
            }
            SourceEvent::DecryptionActive(source) => {
                debug!(%source, "active decryption association");
                self.restrict(RestrictionReason::ActiveDecryption);
            }
            SourceEvent::PolicyBlocked => {
                self.restrict(RestrictionReason::PolicyBlocked);
            }
        }
    }

    /// Run one bound source's chain over a buffer
    ///
    /// Pass-through once restricted: loudness is then governed by the
    /// sources' native volume properties, not the processing graph.
    pub fn process_source(&mut self, source: SourceId, buffer: &mut [f32], sample_rate: u32) {
        if !self.guard.can_process() {
            return;
        }
        self.binder.process_source(source, buffer, sample_rate);
    }

    /// Run the shared bus stage over the mixed buffer, if the context has
    /// one
    pub fn process_mix(&mut self, buffer: &mut [f32], sample_rate: u32) {
        if !self.guard.can_process() {
            return;
        }
        self.binder.process_mix(buffer, sample_rate);
    }

    /// Take all accumulated engine events
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Whether any engine events are waiting
    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    /// The underlying binder, for state inspection
    pub fn binder(&self) -> &SourceBinder<H> {
        &self.binder
    }

    fn record_outcome(&mut self, source: SourceId, outcome: BindOutcome) {
        match outcome {
            BindOutcome::Bound => {
                self.pending_events.push(EngineEvent::SourceBound { source });
            }
            BindOutcome::Deferred { attempts } => {
                self.pending_events
                    .push(EngineEvent::SourceDeferred { source, attempts });
            }
            BindOutcome::GaveUp(reason) => {
                self.pending_events
                    .push(EngineEvent::SourceUnprocessable { source, reason });
            }
            BindOutcome::Rejected(_) => {
                self.restrict(RestrictionReason::TapRejected);
            }
            BindOutcome::AlreadyBound | BindOutcome::Untracked => {}
        }
    }

    fn push(&mut self) {
        if self.guard.can_process() {
            self.binder.apply_settings(&self.settings, self.overdrive);
        } else {
            self.binder
                .push_native(self.settings.volume_percent, self.settings.muted);
        }
    }

    fn restrict(&mut self, reason: RestrictionReason) {
        if !self.guard.restrict(reason) {
            return;
        }

        // Taps go away; the sources stay under bounded native control
        self.binder.release_all();
        self.binder
            .push_native(self.settings.volume_percent, self.settings.muted);

        self.pending_events.push(EngineEvent::CapabilityChanged {
            can_process: false,
            reason,
        });
        if let Some(callback) = &self.capability_callback {
            callback(false, reason);
        }
    }
}
