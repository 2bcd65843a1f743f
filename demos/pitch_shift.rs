//! Pitch shifting example.
//!
//! Shifts a sine by a few musical intervals and reports how much of the output
//! energy stays on the shifted partial, with and without phase locking.
//!
//! Run with: cargo run --example pitch_shift

use std::f32::consts::PI;

use pitchlock::{FrameAnalyzer, ShiftParams, WindowType};

/// Fraction of spectral energy within one bin of `freq_hz`.
fn concentration(signal: &[f32], sample_rate: u32, freq_hz: f64) -> f64 {
    let fft_size = 2048;
    let hop = 512;
    let center = (freq_hz * fft_size as f64 / sample_rate as f64).round() as usize;
    let mut analyzer = FrameAnalyzer::new(fft_size, hop, WindowType::Hann);
    let (mut band, mut total) = (0.0f64, 0.0f64);
    for block in signal.windows(fft_size).step_by(hop).skip(4) {
        let frame = analyzer.analyze(block).expect("block is fft_size long");
        for (bin, &m) in frame.magnitudes.iter().enumerate() {
            let e = (m as f64).powi(2);
            total += e;
            if bin + 1 >= center && bin <= center + 1 {
                band += e;
            }
        }
    }
    band / total.max(f64::MIN_POSITIVE)
}

fn main() {
    let sample_rate = 44100u32;

    // 2 seconds of 440 Hz (A4)
    let duration_secs = 2.0;
    let num_samples = (duration_secs * sample_rate as f32) as usize;
    let input: Vec<f32> = (0..num_samples)
        .map(|i| 0.5 * (2.0 * PI * 440.0 * i as f32 / sample_rate as f32).sin())
        .collect();

    println!("Pitch Shift Demo");
    println!(
        "Input: {} samples ({:.2}s), 440 Hz (A4)\n",
        input.len(),
        duration_secs
    );

    let intervals = [
        ("+1 semitone ", 2.0f64.powf(1.0 / 12.0)),
        ("+1 octave   ", 2.0),
        ("-1 octave   ", 0.5),
        ("-5 semitones", 2.0f64.powf(-5.0 / 12.0)),
    ];

    for (label, ratio) in intervals {
        let target = 440.0 * ratio;
        let mut report = Vec::new();
        for locking in [true, false] {
            let params = ShiftParams::new(ratio)
                .expect("ratio is positive")
                .with_sample_rate(sample_rate)
                .with_phase_locking(locking);
            let output = pitchlock::pitch_shift(&input, &params).expect("pitch shift failed");
            assert_eq!(output.len(), input.len());
            report.push(concentration(&output, sample_rate, target));
        }
        println!(
            "{} (factor {:.4}) -> ~{:.0} Hz   on-partial energy: locked {:.1}%, unlocked {:.1}%",
            label,
            ratio,
            target,
            report[0] * 100.0,
            report[1] * 100.0
        );
    }

    println!(
        "\nAll outputs have the same length as input ({} samples).",
        input.len()
    );
}
