//! Source discovery and chain binding
//!
//! The binder owns the per-source processing chains and the optional
//! shared master bus. Discovery is idempotent, tap attempts follow the
//! two-strategy order (element tap, then capture tap), and a source that
//! is not ready yet gets one pending retry registered against its own
//! readiness signal instead of being polled.

use std::collections::{HashMap, HashSet};

use tabamp_core::{Settings, SourceId};
use tabamp_dsp::ProcessingChain;
use tracing::{debug, warn};

use crate::bus::MasterBus;
use crate::error::TapError;
use crate::host::MediaHost;

/// Total bind attempts per source before giving up
///
/// Retries are driven by the source's lifecycle, not wall-clock polling;
/// the cap only guarantees termination for sources that signal readiness
/// repeatedly without ever becoming tappable.
pub const MAX_BIND_ATTEMPTS: u8 = 3;

/// How chains reach the output destination in this context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MixingLayout {
    /// Each chain carries its own dynamics stage and output connection
    PerSource,
    /// Chains share one master bus and one destination connection
    SharedBus,
}

/// Result of a discovery or readiness event for one source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    /// A chain was built and wired
    Bound,
    /// The source already has a chain; nothing was done
    AlreadyBound,
    /// The tap failed recoverably; a retry waits on the readiness signal
    Deferred {
        /// Attempts made so far
        attempts: u8,
    },
    /// The attempt cap was reached; the source stays on bounded native
    /// control with the last tap failure as the reason
    GaveUp(TapError),
    /// The source refused the tap for content-protection reasons
    Rejected(TapError),
    /// The event referenced a source the binder is not tracking
    Untracked,
}

/// Discovery, binding, and teardown of source processing chains
pub struct SourceBinder<H: MediaHost> {
    host: H,
    layout: MixingLayout,
    chains: HashMap<SourceId, ProcessingChain>,
    /// Bind attempts consumed per deferred source; one entry is one
    /// pending retry registration
    pending: HashMap<SourceId, u8>,
    /// Every live source in the context, bound or not
    known: HashSet<SourceId>,
    bus: Option<MasterBus>,
    settings: Settings,
    overdrive: bool,
}

impl<H: MediaHost> SourceBinder<H> {
    /// Create a binder for one context
    pub fn new(host: H, layout: MixingLayout, settings: Settings, overdrive: bool) -> Self {
        let bus = match layout {
            MixingLayout::PerSource => None,
            MixingLayout::SharedBus => Some(MasterBus::new(overdrive)),
        };

        Self {
            host,
            layout,
            chains: HashMap::new(),
            pending: HashMap::new(),
            known: HashSet::new(),
            bus,
            settings,
            overdrive,
        }
    }

    /// Synchronous startup scan of sources already present in the context
    pub fn scan(&mut self) -> Vec<(SourceId, BindOutcome)> {
        let sources = self.host.existing_sources();
        sources
            .into_iter()
            .map(|source| (source, self.source_appeared(source)))
            .collect()
    }

    /// React to a newly observed source
    ///
    /// Idempotent: a source already bound or already awaiting retry is left
    /// alone, so duplicate discovery events can never double-bind.
    pub fn source_appeared(&mut self, source: SourceId) -> BindOutcome {
        self.known.insert(source);

        if self.chains.contains_key(&source) {
            debug!(%source, "duplicate discovery for bound source ignored");
            return BindOutcome::AlreadyBound;
        }
        if let Some(&attempts) = self.pending.get(&source) {
            debug!(%source, "duplicate discovery for deferred source ignored");
            return BindOutcome::Deferred { attempts };
        }

        self.try_bind(source, 1)
    }

    /// Track a source without attempting any tap
    ///
    /// Used once the context is restricted: the roster keeps growing so
    /// bounded native control reaches late-appearing sources, but no tap
    /// is ever tried again.
    pub fn observe(&mut self, source: SourceId) {
        self.known.insert(source);
    }

    /// React to a deferred source signalling readiness
    pub fn source_ready(&mut self, source: SourceId) -> BindOutcome {
        if self.chains.contains_key(&source) {
            return BindOutcome::AlreadyBound;
        }
        let Some(attempts) = self.pending.remove(&source) else {
            return BindOutcome::Untracked;
        };

        self.try_bind(source, attempts + 1)
    }

    /// Tear down a source's chain and cancel any pending retry
    ///
    /// Returns true if a bound chain was released.
    pub fn source_ended(&mut self, source: SourceId) -> bool {
        self.known.remove(&source);
        self.pending.remove(&source);

        if self.chains.remove(&source).is_none() {
            return false;
        }

        self.host.release(source);
        if let Some(bus) = &mut self.bus {
            bus.unroute_source();
        }
        debug!(%source, "chain released");
        true
    }

    fn try_bind(&mut self, source: SourceId, attempts: u8) -> BindOutcome {
        let element_err = match self.host.tap_element(source) {
            Ok(()) => return self.finish_bind(source, attempts),
            Err(err) => err,
        };

        let capture_err = match self.host.tap_capture(source) {
            Ok(()) => return self.finish_bind(source, attempts),
            Err(err) => err,
        };

        if element_err == TapError::Protected || capture_err == TapError::Protected {
            warn!(%source, "both tap strategies rejected protected source");
            return BindOutcome::Rejected(TapError::Protected);
        }

        // Unbound is not uncontrolled: the source follows volume and mute
        // within the native range until a tap succeeds
        self.apply_native_control(source);

        if attempts >= MAX_BIND_ATTEMPTS {
            warn!(%source, attempts, "giving up on unbindable source");
            return BindOutcome::GaveUp(capture_err);
        }

        debug!(%source, attempts, ?capture_err, "tap deferred until source is ready");
        self.pending.insert(source, attempts);
        BindOutcome::Deferred { attempts }
    }

    fn finish_bind(&mut self, source: SourceId, attempts: u8) -> BindOutcome {
        self.build_chain(source);
        if attempts > 1 {
            // Interim native control from earlier failed attempts must not
            // stack under the chain's own gain
            self.host.set_native_volume(source, 1.0);
            self.host.set_native_muted(source, false);
        }
        BindOutcome::Bound
    }

    fn apply_native_control(&mut self, source: SourceId) {
        let volume = f32::from(self.settings.volume_percent.min(100)) / 100.0;
        self.host.set_native_volume(source, volume);
        self.host.set_native_muted(source, self.settings.muted);
    }

    fn build_chain(&mut self, source: SourceId) {
        let chain = match self.layout {
            MixingLayout::PerSource => ProcessingChain::new(&self.settings, self.overdrive),
            MixingLayout::SharedBus => {
                if let Some(bus) = &mut self.bus {
                    // Checked and set as one step; only the first source
                    // establishes the destination connection
                    bus.connect_output();
                    bus.route_source();
                }
                ProcessingChain::without_dynamics(&self.settings)
            }
        };

        debug!(%source, layout = ?self.layout, "chain bound");
        self.chains.insert(source, chain);
    }

    /// Push a settings snapshot into every live chain
    ///
    /// Within each chain the stage order is gain, mode, EQ, dynamics, so
    /// the most audible parameter is never the stale one.
    pub fn apply_settings(&mut self, settings: &Settings, overdrive: bool) {
        self.settings = settings.clone();
        self.overdrive = overdrive;

        for chain in self.chains.values_mut() {
            chain.apply_settings(settings, overdrive);
        }
        if let Some(bus) = &mut self.bus {
            bus.set_overdrive(overdrive);
        }

        // Known sources without a chain (deferred or given up) still follow
        // volume and mute within the bounded native range
        self.push_native_unbound(settings.volume_percent, settings.muted);
    }

    /// Push bounded native controls to known sources with no chain
    ///
    /// A tap failure is local to its source: the rest of the context keeps
    /// full processing while the unbindable source stays controllable
    /// through its native volume and mute properties, capped at 100%.
    pub fn push_native_unbound(&mut self, volume_percent: u16, muted: bool) {
        let volume = f32::from(volume_percent.min(100)) / 100.0;
        for &source in &self.known {
            if !self.chains.contains_key(&source) {
                self.host.set_native_volume(source, volume);
                self.host.set_native_muted(source, muted);
            }
        }
    }

    /// Push bounded native controls to every known source
    ///
    /// The restricted fallback: volume capped at the native 100% range,
    /// applied through the source's own volume and mute properties.
    pub fn push_native(&mut self, volume_percent: u16, muted: bool) {
        let volume = f32::from(volume_percent.min(100)) / 100.0;
        for &source in &self.known {
            self.host.set_native_volume(source, volume);
            self.host.set_native_muted(source, muted);
        }
    }

    /// Release every chain and pending retry, keeping the source roster
    ///
    /// Used on the capability transition: the sources are still live and
    /// still need bounded native control, only their taps go away.
    pub fn release_all(&mut self) {
        for &source in self.chains.keys() {
            self.host.release(source);
            if let Some(bus) = &mut self.bus {
                bus.unroute_source();
            }
        }
        self.chains.clear();
        self.pending.clear();
    }

    /// Run a bound source's chain over a buffer
    pub fn process_source(&mut self, source: SourceId, buffer: &mut [f32], sample_rate: u32) {
        if let Some(chain) = self.chains.get_mut(&source) {
            chain.process(buffer, sample_rate);
        }
    }

    /// Run the shared bus stage over the mixed buffer
    ///
    /// No-op in per-source layout, where each chain carries its own
    /// dynamics.
    pub fn process_mix(&mut self, buffer: &mut [f32], sample_rate: u32) {
        if let Some(bus) = &mut self.bus {
            bus.process(buffer, sample_rate);
        }
    }

    /// Number of bound chains
    pub fn active_chain_count(&self) -> usize {
        self.chains.len()
    }

    /// Whether a source currently has a chain
    pub fn is_bound(&self, source: SourceId) -> bool {
        self.chains.contains_key(&source)
    }

    /// Whether a source has a pending retry registration
    pub fn is_deferred(&self, source: SourceId) -> bool {
        self.pending.contains_key(&source)
    }

    /// The shared bus, if this context uses one
    pub fn bus(&self) -> Option<&MasterBus> {
        self.bus.as_ref()
    }

    /// A bound source's chain, for state inspection
    pub fn chain(&self, source: SourceId) -> Option<&ProcessingChain> {
        self.chains.get(&source)
    }

    /// The backing host
    pub fn host(&self) -> &H {
        &self.host
    }
}
