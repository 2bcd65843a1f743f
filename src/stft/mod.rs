//! Short-time Fourier analysis and overlap-add resynthesis around the
//! spectral core.

pub mod analysis;
pub mod synthesis;

pub use analysis::FrameAnalyzer;
pub use synthesis::OverlapAdd;
