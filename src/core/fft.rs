//! FFT-related constants and utilities shared across the crate.

use rustfft::num_complex::Complex;

/// Zero-valued complex number, used for FFT buffer initialization.
pub const COMPLEX_ZERO: Complex<f32> = Complex::new(0.0, 0.0);

/// Number of non-redundant bins produced by a real FFT of `fft_size` samples.
#[inline]
pub fn num_bins(fft_size: usize) -> usize {
    fft_size / 2 + 1
}
