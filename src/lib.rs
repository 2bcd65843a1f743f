#![forbid(unsafe_code)]
//! Identity phase-locked pitch shifting.
//!
//! `pitchlock` shifts the pitch of audio in the short-time frequency domain
//! without changing its duration. A plain phase vocoder smears tonal content
//! because neighbouring bins drift apart in phase; this crate detects the
//! spectral peaks of every frame, assigns each bin to the peak that controls
//! it, and rotates the whole region with its peak so the vertical phase
//! relationships of the analysis survive the shift.
//!
//! # Quick Start
//!
//! ```
//! use pitchlock::ShiftParams;
//!
//! // 1 second of 440 Hz sine at 44.1 kHz
//! let input: Vec<f32> = (0..44100)
//!     .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 44100.0).sin())
//!     .collect();
//!
//! let params = ShiftParams::new(1.5).unwrap().with_sample_rate(44100);
//! let output = pitchlock::pitch_shift(&input, &params).unwrap();
//! assert_eq!(output.len(), input.len()); // same length, ~660 Hz
//! ```
//!
//! # Streaming
//!
//! For real-time use, feed audio in blocks via [`StreamProcessor`]:
//!
//! ```
//! use pitchlock::{ShiftParams, StreamProcessor};
//!
//! let params = ShiftParams::new(0.75).unwrap().with_fft_size(1024);
//! let mut processor = StreamProcessor::new(&params).unwrap();
//! let block = [0.0f32; 256];
//! let mut out = [0.0f32; 256];
//! processor.process(&block, &mut out).unwrap();
//! processor.set_phase_locking(false); // takes effect on the next frame
//! ```
//!
//! # Frame-level core
//!
//! [`SpectralShifter`] works on analysis frames supplied by any STFT front
//! end, producing the shifted half-spectrum for each hop.

pub mod core;
pub mod error;
pub mod shift;
pub mod stft;
pub mod stream;

pub use core::types::{
    AnalysisFrame, AudioBuffer, Channels, Sample, ShiftParams, DEFAULT_MAX_PEAKS,
    PITCH_RATIO_MAX, PITCH_RATIO_MIN,
};
pub use core::window::WindowType;
pub use error::ShiftError;
pub use shift::{PeakSet, RegionMap, SpectralShifter, SynthesisPath};
pub use stft::{FrameAnalyzer, OverlapAdd};
pub use stream::StreamProcessor;

/// Deinterleaves multi-channel audio into separate per-channel vectors.
#[inline]
fn deinterleave(input: &[f32], num_channels: usize) -> Vec<Vec<f32>> {
    (0..num_channels)
        .map(|ch| {
            input
                .iter()
                .skip(ch)
                .step_by(num_channels)
                .copied()
                .collect()
        })
        .collect()
}

/// Interleaves per-channel vectors into a single buffer, truncating to the shortest channel.
#[inline]
fn interleave(channels: &[Vec<f32>]) -> Vec<f32> {
    let min_len = channels.iter().map(|c| c.len()).min().unwrap_or(0);
    (0..min_len)
        .flat_map(|i| channels.iter().map(move |ch| ch[i]))
        .collect()
}

/// Validates that input is non-empty and contains only finite samples.
///
/// Returns `Ok(false)` if input is empty (caller should return `Ok(vec![])`),
/// `Ok(true)` if input is valid, or `Err` if it contains NaN/Inf.
#[inline]
fn validate_input(input: &[f32]) -> Result<bool, ShiftError> {
    if input.is_empty() {
        return Ok(false);
    }
    if input.iter().any(|s| !s.is_finite()) {
        return Err(ShiftError::NonFiniteInput);
    }
    Ok(true)
}

/// Runs one channel through a fresh processor and removes its latency.
fn shift_channel(samples: &[f32], params: &ShiftParams) -> Result<Vec<f32>, ShiftError> {
    let mut processor = StreamProcessor::new(params)?;
    let latency = processor.latency_samples();

    let mut padded = Vec::with_capacity(samples.len() + latency);
    padded.extend_from_slice(samples);
    padded.resize(samples.len() + latency, 0.0);

    let mut output = vec![0.0f32; padded.len()];
    processor.process(&padded, &mut output)?;
    output.drain(..latency);
    Ok(output)
}

/// Shifts the pitch of audio without changing its duration.
///
/// `params.pitch_ratio` > 1.0 raises the pitch; < 1.0 lowers it. For stereo
/// input, provide interleaved L/R samples; each channel is processed by its
/// own shifter.
///
/// # Errors
///
/// Returns [`ShiftError::InvalidPitchRatio`] if the ratio is outside
/// [`PITCH_RATIO_MIN`]..=[`PITCH_RATIO_MAX`], other [`ShiftError`] variants
/// for invalid parameters, and [`ShiftError::NonFiniteInput`] if the input
/// contains NaN or infinite samples.
pub fn pitch_shift(input: &[f32], params: &ShiftParams) -> Result<Vec<f32>, ShiftError> {
    params.validate()?;
    if !validate_input(input)? {
        return Ok(vec![]);
    }

    let num_channels = params.channels.count();
    let channels = deinterleave(input, num_channels);

    let mut channel_outputs: Vec<Vec<f32>> = Vec::with_capacity(num_channels);
    for channel_data in &channels {
        channel_outputs.push(shift_channel(channel_data, params)?);
    }
    Ok(interleave(&channel_outputs))
}

/// Shifts the pitch of an [`AudioBuffer`] and returns a new `AudioBuffer`.
///
/// The sample rate and channel layout are taken from the input buffer,
/// overriding whatever is set in `params`.
pub fn pitch_shift_buffer(
    buffer: &AudioBuffer,
    params: &ShiftParams,
) -> Result<AudioBuffer, ShiftError> {
    let mut effective_params = params.clone();
    effective_params.sample_rate = buffer.sample_rate;
    effective_params.channels = buffer.channels;

    let output = pitch_shift(&buffer.data, &effective_params)?;
    AudioBuffer::new(output, buffer.channels, buffer.sample_rate)
}
