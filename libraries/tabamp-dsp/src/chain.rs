//! Processing chain
//!
//! The fixed per-source stage ordering: gain, tone, equalizer, then the
//! optional dynamics safety net. Contexts that mix several sources into a
//! shared bus build their chains without dynamics and run one shared stage
//! after the mix instead.

use crate::dynamics::DynamicsStage;
use crate::eq::EqualizerBank;
use crate::gain::GainStage;
use crate::tone::ToneStage;
use tabamp_core::Settings;

/// In-place audio processing stage
///
/// Buffers are interleaved stereo f32. Implementations must be real-time
/// safe: no allocation or blocking in `process`.
pub trait AudioStage: Send {
    /// Process a buffer in place
    fn process(&mut self, buffer: &mut [f32], sample_rate: u32);

    /// Clear internal state (filter history, ramps, detectors)
    fn reset(&mut self);

    /// Enable or disable the stage; a disabled stage passes audio through
    fn set_enabled(&mut self, enabled: bool);

    /// Whether the stage is enabled
    fn is_enabled(&self) -> bool;

    /// Human-readable stage name for diagnostics
    fn name(&self) -> &str;
}

/// One source's complete processing path
pub struct ProcessingChain {
    gain: GainStage,
    tone: ToneStage,
    eq: EqualizerBank,
    dynamics: Option<DynamicsStage>,
}

impl ProcessingChain {
    /// Build a chain with its own dynamics stage
    pub fn new(settings: &Settings, overdrive: bool) -> Self {
        let mut dynamics = DynamicsStage::new();
        dynamics.set_overdrive(overdrive);

        Self {
            gain: GainStage::new(settings.volume_percent, settings.muted),
            tone: ToneStage::new(settings.mode),
            eq: EqualizerBank::with_gains(settings.eq_gains),
            dynamics: Some(dynamics),
        }
    }

    /// Build a chain without dynamics, for contexts where a shared stage
    /// runs after the mix bus
    pub fn without_dynamics(settings: &Settings) -> Self {
        Self {
            gain: GainStage::new(settings.volume_percent, settings.muted),
            tone: ToneStage::new(settings.mode),
            eq: EqualizerBank::with_gains(settings.eq_gains),
            dynamics: None,
        }
    }

    /// Push the full settings snapshot into every stage
    ///
    /// Stages compare against their current parameters, so re-applying an
    /// unchanged snapshot is free.
    pub fn apply_settings(&mut self, settings: &Settings, overdrive: bool) {
        self.gain.set_percent(settings.volume_percent);
        self.gain.set_muted(settings.muted);
        self.tone.set_mode(settings.mode);
        self.eq.set_gains(settings.eq_gains);
        if let Some(dynamics) = &mut self.dynamics {
            dynamics.set_overdrive(overdrive);
        }
    }

    /// Process a buffer through all stages in order
    pub fn process(&mut self, buffer: &mut [f32], sample_rate: u32) {
        self.gain.process(buffer, sample_rate);
        self.tone.process(buffer, sample_rate);
        self.eq.process(buffer, sample_rate);
        if let Some(dynamics) = &mut self.dynamics {
            dynamics.process(buffer, sample_rate);
        }
    }

    /// Reset every stage's internal state
    pub fn reset(&mut self) {
        self.gain.reset();
        self.tone.reset();
        self.eq.reset();
        if let Some(dynamics) = &mut self.dynamics {
            dynamics.reset();
        }
    }

    /// The gain stage's converged target (0.0 when muted)
    pub fn target_gain(&self) -> f32 {
        self.gain.target_gain()
    }

    /// Gain stage accessor
    pub fn gain(&self) -> &GainStage {
        &self.gain
    }

    /// Tone stage accessor
    pub fn tone(&self) -> &ToneStage {
        &self.tone
    }

    /// Equalizer accessor
    pub fn eq(&self) -> &EqualizerBank {
        &self.eq
    }

    /// Dynamics accessor (`None` for shared-bus chains)
    pub fn dynamics(&self) -> Option<&DynamicsStage> {
        self.dynamics.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabamp_core::ToneMode;

    fn settings(volume: u16) -> Settings {
        Settings {
            volume_percent: volume,
            ..Settings::default()
        }
    }

    #[test]
    fn builds_all_stages() {
        let chain = ProcessingChain::new(&settings(100), false);
        assert_eq!(chain.gain().percent(), 100);
        assert_eq!(chain.tone().mode(), ToneMode::Default);
        assert!(chain.eq().gains().is_flat());
        assert!(chain.dynamics().is_some());
    }

    #[test]
    fn shared_bus_chain_has_no_dynamics() {
        let chain = ProcessingChain::without_dynamics(&settings(100));
        assert!(chain.dynamics().is_none());
    }

    #[test]
    fn default_settings_pass_signal_through() {
        let mut chain = ProcessingChain::new(&Settings::default(), false);

        let original = crate::tests::generate_sine(440.0, 44100, 0.02);
        let mut buffer = original.clone();
        chain.process(&mut buffer, 44100);

        for (orig, proc) in original.iter().zip(buffer.iter()) {
            assert!((orig - proc).abs() < 1e-3);
        }
    }

    #[test]
    fn boost_raises_amplitude() {
        let mut chain = ProcessingChain::new(&settings(200), false);

        let mut buffer = vec![0.1f32; 1024];
        chain.process(&mut buffer, 44100);

        // 200% -> gain 2.0; dynamics in safety mode leaves it alone
        for sample in buffer.iter().skip(256) {
            assert!((sample - 0.2).abs() < 1e-2);
        }
    }

    #[test]
    fn mute_silences_without_losing_volume() {
        let mut cfg = settings(400);
        cfg.muted = true;
        let mut chain = ProcessingChain::new(&cfg, false);

        assert_eq!(chain.target_gain(), 0.0);
        assert_eq!(chain.gain().percent(), 400);

        let mut buffer = vec![0.5f32; 512];
        chain.process(&mut buffer, 44100);
        for sample in &buffer {
            assert_eq!(*sample, 0.0);
        }

        // Unmute restores the stored loudness without a new volume push
        cfg.muted = false;
        chain.apply_settings(&cfg, false);
        assert!((chain.target_gain() - 4.0).abs() < 1e-6);
    }

    #[test]
    fn reapplying_same_settings_is_stable() {
        let cfg = settings(300);
        let mut chain = ProcessingChain::new(&cfg, false);

        let before = chain.target_gain();
        chain.apply_settings(&cfg, false);
        chain.apply_settings(&cfg, false);
        assert_eq!(chain.target_gain(), before);
    }

    #[test]
    fn apply_settings_reaches_every_stage() {
        let mut chain = ProcessingChain::new(&Settings::default(), false);

        let mut cfg = settings(500);
        cfg.mode = ToneMode::Bass;
        cfg.eq_gains.set(0, 6.0);
        chain.apply_settings(&cfg, true);

        assert_eq!(chain.gain().percent(), 500);
        assert_eq!(chain.tone().mode(), ToneMode::Bass);
        assert_eq!(chain.eq().gains().get(0), Some(6.0));
        assert!(chain.dynamics().unwrap().overdrive());
    }

    #[test]
    fn output_stays_finite_under_extremes() {
        let mut cfg = settings(800);
        cfg.mode = ToneMode::Bass;
        for band in 0..10 {
            cfg.eq_gains.set(band, 24.0);
        }
        let mut chain = ProcessingChain::new(&cfg, true);

        let mut buffer = crate::tests::generate_sine(60.0, 44100, 0.2);
        chain.process(&mut buffer, 44100);

        for sample in &buffer {
            assert!(sample.is_finite());
            // Overdrive's soft clipper bounds the output
            assert!(sample.abs() < 1.0);
        }
    }
}
