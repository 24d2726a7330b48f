//! Master bus for single-mixing-point contexts
//!
//! Some contexts expose only one mixing point, so per-source chains are
//! built without their own dynamics stage and everything funnels through
//! this shared stage instead. The bus connects to the output destination
//! exactly once; wiring a second source into it must never repeat the
//! connection step, which the host would reject or double-route.

use tabamp_dsp::{AudioStage, DynamicsStage};
use tracing::debug;

/// Shared output stage for one context
pub struct MasterBus {
    dynamics: DynamicsStage,
    connected: bool,
    routed_sources: usize,
}

impl MasterBus {
    /// Create an unconnected bus
    pub fn new(overdrive: bool) -> Self {
        let mut dynamics = DynamicsStage::new();
        dynamics.set_overdrive(overdrive);
        Self {
            dynamics,
            connected: false,
            routed_sources: 0,
        }
    }

    /// Establish the single bus-to-destination connection
    ///
    /// Checked and set as one step; returns true only the first time. Every
    /// source wired afterwards reuses the existing connection.
    pub fn connect_output(&mut self) -> bool {
        if self.connected {
            return false;
        }
        debug!("master bus connected to output destination");
        self.connected = true;
        true
    }

    /// Whether the bus-to-destination connection exists
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Record a source routed into the bus
    pub fn route_source(&mut self) {
        self.routed_sources += 1;
    }

    /// Record a source leaving the bus
    pub fn unroute_source(&mut self) {
        self.routed_sources = self.routed_sources.saturating_sub(1);
    }

    /// Number of sources currently routed through the bus
    pub fn routed_sources(&self) -> usize {
        self.routed_sources
    }

    /// Retune the shared dynamics stage
    pub fn set_overdrive(&mut self, overdrive: bool) {
        self.dynamics.set_overdrive(overdrive);
    }

    /// Run the shared dynamics stage over the mixed buffer
    pub fn process(&mut self, buffer: &mut [f32], sample_rate: u32) {
        self.dynamics.process(buffer, sample_rate);
    }

    /// Clear the shared stage's detector state
    pub fn reset(&mut self) {
        self.dynamics.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connects_exactly_once() {
        let mut bus = MasterBus::new(false);
        assert!(!bus.is_connected());

        assert!(bus.connect_output());
        assert!(bus.is_connected());

        // Wiring more sources never re-runs the connection step
        for _ in 0..5 {
            assert!(!bus.connect_output());
            bus.route_source();
        }
        assert_eq!(bus.routed_sources(), 5);
    }

    #[test]
    fn route_counting_is_balanced() {
        let mut bus = MasterBus::new(false);
        bus.route_source();
        bus.route_source();
        bus.unroute_source();
        assert_eq!(bus.routed_sources(), 1);

        // Never underflows
        bus.unroute_source();
        bus.unroute_source();
        assert_eq!(bus.routed_sources(), 0);
    }
}
