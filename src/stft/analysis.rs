//! Short-time analysis: window, forward FFT, and instantaneous frequency.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

use crate::core::fft::{num_bins, COMPLEX_ZERO};
use crate::core::types::AnalysisFrame;
use crate::core::window::{generate_window, WindowType};
use crate::error::ShiftError;
use crate::shift::phase_locking::wrap_phase;

const TWO_PI: f32 = 2.0 * PI;

/// Turns successive blocks of `fft_size` samples, taken `hop` samples apart,
/// into analysis frames.
///
/// All buffers are allocated at construction.
pub struct FrameAnalyzer {
    fft_size: usize,
    hop: usize,
    window: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
    fft_buffer: Vec<Complex<f32>>,
    fft_scratch: Vec<Complex<f32>>,
    /// Phase advance per hop of a bin-centred sinusoid.
    expected_phase_advance: Vec<f32>,
    prev_phase: Vec<f32>,
    magnitudes: Vec<f32>,
    phases: Vec<f32>,
    frequencies: Vec<f32>,
}

impl FrameAnalyzer {
    /// Creates an analyzer. `fft_size` and `hop` are expected to have been
    /// validated through [`ShiftParams::validate`](crate::ShiftParams::validate).
    pub fn new(fft_size: usize, hop: usize, window_type: WindowType) -> Self {
        let num_bins = num_bins(fft_size);
        let fft = FftPlanner::new().plan_fft_forward(fft_size);
        let scratch_len = fft.get_inplace_scratch_len();

        let expected_phase_advance = (0..num_bins)
            .map(|bin| TWO_PI * bin as f32 * hop as f32 / fft_size as f32)
            .collect();

        Self {
            fft_size,
            hop,
            window: generate_window(window_type, fft_size),
            fft,
            fft_buffer: vec![COMPLEX_ZERO; fft_size],
            fft_scratch: vec![COMPLEX_ZERO; scratch_len],
            expected_phase_advance,
            prev_phase: vec![0.0; num_bins],
            magnitudes: vec![0.0; num_bins],
            phases: vec![0.0; num_bins],
            frequencies: vec![0.0; num_bins],
        }
    }

    #[inline]
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    #[inline]
    pub fn hop(&self) -> usize {
        self.hop
    }

    #[inline]
    pub fn num_bins(&self) -> usize {
        self.magnitudes.len()
    }

    /// Forgets the previous frame's phases.
    pub fn reset(&mut self) {
        self.prev_phase.iter_mut().for_each(|p| *p = 0.0);
    }

    /// Analyzes one block of exactly `fft_size` samples.
    ///
    /// Successive calls must be `hop` samples apart for the instantaneous
    /// frequency to be meaningful.
    pub fn analyze(&mut self, block: &[f32]) -> Result<AnalysisFrame<'_>, ShiftError> {
        if block.len() != self.fft_size {
            return Err(ShiftError::FrameMismatch {
                expected: self.fft_size,
                provided: block.len(),
            });
        }

        for ((slot, &sample), &win) in self.fft_buffer.iter_mut().zip(block).zip(&self.window) {
            *slot = Complex::new(sample * win, 0.0);
        }
        self.fft
            .process_with_scratch(&mut self.fft_buffer, &mut self.fft_scratch);

        for bin in 0..self.magnitudes.len() {
            let c = self.fft_buffer[bin];
            let phase = c.arg();
            let expected = self.expected_phase_advance[bin];
            let deviation = wrap_phase(phase - self.prev_phase[bin] - expected);

            self.magnitudes[bin] = c.norm();
            self.phases[bin] = phase;
            self.frequencies[bin] = expected + deviation;
            self.prev_phase[bin] = phase;
        }

        Ok(AnalysisFrame {
            magnitudes: &self.magnitudes,
            phases: &self.phases,
            frequencies: &self.frequencies,
        })
    }
}
