//! Identity phase-locked pitch shifting in the frequency domain.

pub mod mode;
pub mod peaks;
pub mod phase_locking;
pub mod regions;
pub mod shifter;

pub use mode::{ModeController, ModeTransition};
pub use peaks::PeakSet;
pub use phase_locking::wrap_phase;
pub use regions::RegionMap;
pub use shifter::{SpectralShifter, SynthesisPath};
