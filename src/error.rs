//! Error types for the pitchlock crate.

use std::fmt;

/// Errors that can occur while configuring or driving a pitch shifter.
#[derive(Debug, Clone, PartialEq)]
pub enum ShiftError {
    /// Pitch ratio must be positive, finite, and within the supported range.
    InvalidPitchRatio(f64),
    /// FFT size must be a power of two and at least 8.
    InvalidFftSize(usize),
    /// Hop size must be non-zero and at most half the FFT size.
    InvalidHopSize { hop: usize, fft_size: usize },
    /// Channel count must be 1 or 2.
    InvalidChannels(u16),
    /// Sample rate must be positive.
    InvalidSampleRate(u32),
    /// Bin capacity below 3 or a zero peak capacity.
    InvalidCapacity(usize),
    /// A frame is wider than the instance was sized for.
    FrameTooLarge { provided: usize, capacity: usize },
    /// Analysis arrays or output spectrum disagree in length.
    FrameMismatch { expected: usize, provided: usize },
    /// Input contains NaN or infinite samples.
    NonFiniteInput,
}

impl fmt::Display for ShiftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShiftError::InvalidPitchRatio(r) => {
                write!(f, "invalid pitch ratio: {r}. Must be positive and finite.")
            }
            ShiftError::InvalidFftSize(s) => {
                write!(f, "invalid FFT size: {s}. Must be a power of two of at least 8.")
            }
            ShiftError::InvalidHopSize { hop, fft_size } => {
                write!(
                    f,
                    "invalid hop size: {hop}. Must be between 1 and {}.",
                    fft_size / 2
                )
            }
            ShiftError::InvalidChannels(c) => {
                write!(f, "invalid channel count: {c}. Must be 1 or 2.")
            }
            ShiftError::InvalidSampleRate(sr) => {
                write!(f, "invalid sample rate: {sr}. Must be greater than 0.")
            }
            ShiftError::InvalidCapacity(c) => {
                write!(f, "invalid capacity: {c}")
            }
            ShiftError::FrameTooLarge { provided, capacity } => {
                write!(
                    f,
                    "frame too large: {} bins provided, capacity is {}",
                    provided, capacity
                )
            }
            ShiftError::FrameMismatch { expected, provided } => {
                write!(
                    f,
                    "frame length mismatch: expected {} bins, got {}",
                    expected, provided
                )
            }
            ShiftError::NonFiniteInput => write!(f, "input contains NaN or infinite samples"),
        }
    }
}

impl std::error::Error for ShiftError {}
