//! End-to-end processing chain tests
//!
//! Feeds synthetic signals through full chains and checks loudness,
//! tone-shaping, and safety behavior at the output.

use tabamp_core::{Settings, ToneMode};
use tabamp_dsp::{gain_for, ProcessingChain};

fn sine(freq: f32, sample_rate: u32, duration_secs: f32, amplitude: f32) -> Vec<f32> {
    let frames = (sample_rate as f32 * duration_secs) as usize;
    let mut samples = Vec::with_capacity(frames * 2);
    for i in 0..frames {
        let t = i as f32 / sample_rate as f32;
        let s = amplitude * (2.0 * std::f32::consts::PI * freq * t).sin();
        samples.push(s);
        samples.push(s);
    }
    samples
}

fn rms(buffer: &[f32]) -> f32 {
    (buffer.iter().map(|s| s * s).sum::<f32>() / buffer.len() as f32).sqrt()
}

#[test]
fn boost_scales_rms_by_the_curve_gain() {
    for percent in [100u16, 200, 400, 600] {
        let settings = Settings {
            volume_percent: percent,
            ..Settings::default()
        };
        let mut chain = ProcessingChain::new(&settings, false);

        let input = sine(440.0, 44100, 0.1, 0.05);
        let input_rms = rms(&input);

        let mut buffer = input;
        chain.process(&mut buffer, 44100);

        let expected = input_rms * gain_for(f32::from(percent));
        let actual = rms(&buffer);
        assert!(
            (actual - expected).abs() / expected < 0.05,
            "{percent}%: expected rms ~{expected}, got {actual}"
        );
    }
}

#[test]
fn voice_mode_favors_presence_over_bass() {
    let settings = Settings {
        mode: ToneMode::Voice,
        ..Settings::default()
    };
    let mut chain = ProcessingChain::new(&settings, false);
    chain.reset();

    let mut presence = sine(3000.0, 44100, 0.2, 0.1);
    let presence_in = rms(&presence);
    chain.process(&mut presence, 44100);
    let presence_ratio = rms(&presence) / presence_in;

    let mut chain = ProcessingChain::new(&settings, false);
    chain.reset();
    let mut low = sine(100.0, 44100, 0.2, 0.1);
    let low_in = rms(&low);
    chain.process(&mut low, 44100);
    let low_ratio = rms(&low) / low_in;

    assert!(
        presence_ratio > low_ratio * 1.3,
        "voice mode: presence ratio {presence_ratio} vs low ratio {low_ratio}"
    );
}

#[test]
fn bass_mode_favors_low_end() {
    let settings = Settings {
        mode: ToneMode::Bass,
        ..Settings::default()
    };
    let mut chain = ProcessingChain::new(&settings, false);
    chain.reset();

    let mut low = sine(60.0, 44100, 0.3, 0.1);
    let low_in = rms(&low);
    chain.process(&mut low, 44100);
    let low_ratio = rms(&low) / low_in;

    assert!(low_ratio > 1.5, "bass mode should boost 60 Hz, got {low_ratio}");
}

#[test]
fn eq_boost_and_cut_shape_the_band() {
    let mut boosted = Settings::default();
    boosted.eq_gains.set(5, 12.0); // 1 kHz
    let mut cut = Settings::default();
    cut.eq_gains.set(5, -12.0);

    let mut boost_chain = ProcessingChain::new(&boosted, false);
    boost_chain.reset();
    let mut cut_chain = ProcessingChain::new(&cut, false);
    cut_chain.reset();

    let input = sine(1000.0, 44100, 0.2, 0.05);
    let input_rms = rms(&input);

    let mut buffer = input.clone();
    boost_chain.process(&mut buffer, 44100);
    assert!(rms(&buffer) > input_rms * 1.5);

    let mut buffer = input;
    cut_chain.process(&mut buffer, 44100);
    assert!(rms(&buffer) < input_rms * 0.7);
}

#[test]
fn overdrive_output_never_exceeds_unity() {
    let settings = Settings {
        volume_percent: 800,
        ..Settings::default()
    };
    let mut chain = ProcessingChain::new(&settings, true);

    // 8x gain on near-full-scale input would clip hard without the
    // compressor and soft clipper
    let mut buffer = sine(440.0, 44100, 0.5, 0.9);
    chain.process(&mut buffer, 44100);

    for sample in &buffer {
        assert!(sample.is_finite());
        assert!(sample.abs() < 1.0, "output exceeded unity: {sample}");
    }
}

#[test]
fn silence_in_silence_out() {
    let settings = Settings {
        volume_percent: 600,
        mode: ToneMode::Bass,
        ..Settings::default()
    };
    let mut chain = ProcessingChain::new(&settings, true);

    let mut buffer = vec![0.0f32; 4096];
    chain.process(&mut buffer, 44100);

    for sample in &buffer {
        assert_eq!(*sample, 0.0);
    }
}

#[test]
fn sample_rate_change_mid_stream_stays_stable() {
    let settings = Settings {
        mode: ToneMode::Voice,
        ..Settings::default()
    };
    let mut chain = ProcessingChain::new(&settings, false);

    let mut buffer = sine(1000.0, 44100, 0.05, 0.1);
    chain.process(&mut buffer, 44100);

    // Same chain, new rate: filters retune without blowing up
    let mut buffer = sine(1000.0, 48000, 0.05, 0.1);
    chain.process(&mut buffer, 48000);

    for sample in &buffer {
        assert!(sample.is_finite());
    }
}
