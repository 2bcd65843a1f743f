//! Real-time streaming example.
//!
//! Drives a StreamProcessor in fixed-size chunks, the way an audio callback
//! would, while a pitch fader moves and phase locking is switched off and back
//! on mid-stream.
//!
//! Run with: cargo run --example realtime_stream

use std::f32::consts::PI;

use pitchlock::{ShiftParams, StreamProcessor, SynthesisPath};

fn main() {
    let sample_rate = 44100u32;

    let params = ShiftParams::new(1.0)
        .expect("ratio is positive")
        .with_sample_rate(sample_rate)
        .with_fft_size(2048);
    let mut processor = StreamProcessor::new(&params).expect("valid parameters");

    println!("Real-time Streaming Demo");
    println!(
        "Latency: {} samples ({:.1}ms)",
        processor.latency_samples(),
        processor.latency_samples() as f64 / sample_rate as f64 * 1000.0
    );

    // 4 seconds of a two-note chord
    let total_samples = sample_rate as usize * 4;
    let input: Vec<f32> = (0..total_samples)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            0.5 * (2.0 * PI * 440.0 * t).sin() + 0.3 * (2.0 * PI * 660.0 * t).sin()
        })
        .collect();

    let chunk_size = 512;
    let mut output = vec![0.0f32; chunk_size];
    let mut peak_level = 0.0f32;
    let mut locked_chunks = 0;
    let mut basic_chunks = 0;
    let mut current_ratio = 1.0;

    for (chunk_idx, chunk) in input.chunks(chunk_size).enumerate() {
        // Fader sweeps up a whole tone over the 4 seconds
        let progress = (chunk_idx * chunk_size) as f64 / total_samples as f64;
        current_ratio = 2.0f64.powf(2.0 * progress / 12.0);
        processor
            .set_pitch_ratio(current_ratio)
            .expect("ratio is positive");

        // Locking off for the middle second
        let locking = !(0.25..0.5).contains(&progress);
        if processor.phase_locking_enabled() != locking {
            println!(
                "{:.2}s: phase locking {}",
                progress * 4.0,
                if locking { "on" } else { "off" }
            );
            processor.set_phase_locking(locking);
        }

        let out = &mut output[..chunk.len()];
        processor.process(chunk, out).expect("process failed");
        peak_level = out.iter().fold(peak_level, |acc, &s| acc.max(s.abs()));

        match processor.last_path() {
            Some(SynthesisPath::Locked { .. }) => locked_chunks += 1,
            Some(SynthesisPath::Basic) => basic_chunks += 1,
            None => {}
        }
    }

    println!(
        "Processed {} samples ({:.2}s)",
        total_samples,
        total_samples as f64 / sample_rate as f64
    );
    println!("Final ratio: {:.4}", current_ratio);
    println!("Chunks ending locked: {}, basic: {}", locked_chunks, basic_chunks);
    println!("Output peak level: {:.3}", peak_level);
}
