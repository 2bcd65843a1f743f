#![allow(dead_code)]

use std::f32::consts::PI;

use pitchlock::{FrameAnalyzer, WindowType};

pub fn gen_sine<F>(freq_hz: f32, sr: u32, n: usize, amp_fn: F) -> Vec<f32>
where
    F: Fn(usize) -> f32,
{
    (0..n)
        .map(|i| {
            let phase = 2.0 * PI * freq_hz * i as f32 / sr as f32;
            amp_fn(i) * phase.sin()
        })
        .collect()
}

/// Band-limited sawtooth: harmonics `1..=harmonics` with 1/h amplitudes.
pub fn gen_sawtooth(f0_hz: f32, harmonics: usize, sr: u32, n: usize, amp: f32) -> Vec<f32> {
    (0..n)
        .map(|i| {
            let t = i as f32 / sr as f32;
            (1..=harmonics)
                .map(|h| amp / h as f32 * (2.0 * PI * f0_hz * h as f32 * t).sin())
                .sum::<f32>()
        })
        .collect()
}

/// Deterministic xorshift noise in [-1, 1).
pub struct Noise(u64);

impl Noise {
    pub fn new(seed: u64) -> Self {
        Self(seed.max(1))
    }

    pub fn next_f32(&mut self) -> f32 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        ((self.0 >> 40) as f32 / (1u64 << 24) as f32) * 2.0 - 1.0
    }
}

pub fn assert_finite(samples: &[f32], label: &str) {
    for (i, &s) in samples.iter().enumerate() {
        assert!(s.is_finite(), "{}: sample {} is not finite ({})", label, i, s);
    }
}

pub fn windowed_rms(signal: &[f32], start: usize, len: usize) -> f64 {
    if signal.is_empty() || len == 0 {
        return 0.0;
    }
    let start = start.min(signal.len());
    let end = (start + len).min(signal.len());
    if end <= start {
        return 0.0;
    }
    let sum_sq: f64 = signal[start..end]
        .iter()
        .map(|&s| {
            let v = s as f64;
            v * v
        })
        .sum();
    (sum_sq / (end - start) as f64).sqrt()
}

pub fn count_positive_zero_crossings(signal: &[f32], start: usize, end: usize) -> usize {
    if signal.len() < 2 {
        return 0;
    }
    let start = start.min(signal.len() - 1);
    let end = end.min(signal.len());
    if end <= start + 1 {
        return 0;
    }
    (start..end - 1)
        .filter(|&i| signal[i] <= 0.0 && signal[i + 1] > 0.0)
        .count()
}

pub fn estimate_freq_zero_crossings(signal: &[f32], sr: u32, start: usize, end: usize) -> f64 {
    if end <= start + 1 {
        return 0.0;
    }
    let crossings = count_positive_zero_crossings(signal, start, end) as f64;
    crossings * sr as f64 / (end - start) as f64
}

/// Largest sample-to-sample jump in `signal[start..end]`.
pub fn max_step(signal: &[f32], start: usize, end: usize) -> f32 {
    signal[start..end]
        .windows(2)
        .map(|w| (w[1] - w[0]).abs())
        .fold(0.0, f32::max)
}

/// Share of spectral energy within one bin of `center_bin`, summed over
/// Hann-windowed frames of `signal[start..end]` taken `hop` apart.
pub fn band_concentration(
    signal: &[f32],
    fft_size: usize,
    hop: usize,
    center_bin: usize,
    start: usize,
    end: usize,
) -> f64 {
    let mut analyzer = FrameAnalyzer::new(fft_size, hop, WindowType::Hann);
    let mut in_band = 0.0f64;
    let mut total = 0.0f64;
    let mut pos = start;
    while pos + fft_size <= end {
        let frame = analyzer
            .analyze(&signal[pos..pos + fft_size])
            .expect("block length matches fft size");
        for (bin, &m) in frame.magnitudes.iter().enumerate() {
            let e = m as f64 * m as f64;
            total += e;
            if bin + 1 >= center_bin && bin <= center_bin + 1 {
                in_band += e;
            }
        }
        pos += hop;
    }
    if total > 0.0 {
        in_band / total
    } else {
        0.0
    }
}

/// Mean magnitude spectrum of Hann-windowed frames of `signal[start..end]`.
pub fn average_spectrum(
    signal: &[f32],
    fft_size: usize,
    hop: usize,
    start: usize,
    end: usize,
) -> Vec<f64> {
    let mut analyzer = FrameAnalyzer::new(fft_size, hop, WindowType::Hann);
    let mut acc = vec![0.0f64; fft_size / 2 + 1];
    let mut frames = 0usize;
    let mut pos = start;
    while pos + fft_size <= end {
        let frame = analyzer
            .analyze(&signal[pos..pos + fft_size])
            .expect("block length matches fft size");
        for (a, &m) in acc.iter_mut().zip(frame.magnitudes) {
            *a += m as f64;
        }
        frames += 1;
        pos += hop;
    }
    if frames > 0 {
        acc.iter_mut().for_each(|a| *a /= frames as f64);
    }
    acc
}
