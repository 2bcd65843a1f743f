//! Resynthesis: inverse FFT and windowed overlap-add.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

use crate::core::fft::{num_bins, COMPLEX_ZERO};
use crate::core::window::{generate_window, overlap_gain, WindowType};
use crate::error::ShiftError;

/// Minimum overlap gain, guards normalization against degenerate windows.
const OVERLAP_GAIN_EPSILON: f32 = 1e-6;

/// Rebuilds a time-domain signal from one half-spectrum per hop.
pub struct OverlapAdd {
    fft_size: usize,
    hop: usize,
    window: Vec<f32>,
    ifft: Arc<dyn Fft<f32>>,
    fft_buffer: Vec<Complex<f32>>,
    fft_scratch: Vec<Complex<f32>>,
    /// Running overlap-add sum; the first `hop` samples complete each frame.
    accum: Vec<f32>,
    /// IFFT normalization and window overlap gain folded together.
    scale: f32,
}

impl OverlapAdd {
    pub fn new(fft_size: usize, hop: usize, window_type: WindowType) -> Self {
        let ifft = FftPlanner::new().plan_fft_inverse(fft_size);
        let scratch_len = ifft.get_inplace_scratch_len();
        let window = generate_window(window_type, fft_size);
        let gain = overlap_gain(&window, hop).max(OVERLAP_GAIN_EPSILON);

        Self {
            fft_size,
            hop,
            window,
            ifft,
            fft_buffer: vec![COMPLEX_ZERO; fft_size],
            fft_scratch: vec![COMPLEX_ZERO; scratch_len],
            accum: vec![0.0; fft_size],
            scale: 1.0 / (fft_size as f32 * gain),
        }
    }

    #[inline]
    pub fn hop(&self) -> usize {
        self.hop
    }

    pub fn reset(&mut self) {
        self.accum.iter_mut().for_each(|s| *s = 0.0);
    }

    /// Adds the frame described by `spectrum` (one value per bin up to
    /// Nyquist) and writes the `hop` samples it completes into `out`.
    pub fn synthesize(
        &mut self,
        spectrum: &[Complex<f32>],
        out: &mut [f32],
    ) -> Result<(), ShiftError> {
        let num_bins = num_bins(self.fft_size);
        if spectrum.len() != num_bins {
            return Err(ShiftError::FrameMismatch {
                expected: num_bins,
                provided: spectrum.len(),
            });
        }
        if out.len() != self.hop {
            return Err(ShiftError::FrameMismatch {
                expected: self.hop,
                provided: out.len(),
            });
        }

        self.fft_buffer[..num_bins].copy_from_slice(spectrum);
        for bin in 1..num_bins - 1 {
            self.fft_buffer[self.fft_size - bin] = spectrum[bin].conj();
        }
        self.ifft
            .process_with_scratch(&mut self.fft_buffer, &mut self.fft_scratch);

        for ((acc, c), &w) in self.accum.iter_mut().zip(&self.fft_buffer).zip(&self.window) {
            *acc += c.re * w * self.scale;
        }

        out.copy_from_slice(&self.accum[..self.hop]);
        self.accum.copy_within(self.hop.., 0);
        let tail = self.fft_size - self.hop;
        self.accum[tail..].iter_mut().for_each(|s| *s = 0.0);
        Ok(())
    }
}
