//! Core types, window functions, and FFT helpers.

pub mod fft;
pub mod types;
pub mod window;

pub use types::*;
pub use window::{generate_window, overlap_gain, WindowType};
