//! The per-stream pitch-shifting core.

use rustfft::num_complex::Complex;

use crate::core::types::AnalysisFrame;
use crate::error::ShiftError;
use crate::shift::mode::{ModeController, ModeTransition};
use crate::shift::peaks::PeakSet;
use crate::shift::phase_locking::{basic_synthesis, locked_synthesis, NO_PEAK};
use crate::shift::regions::RegionMap;

/// Which synthesis path produced a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthesisPath {
    /// Identity phase locking around `peaks` detected peaks.
    Locked { peaks: usize },
    /// Plain phase vocoder update (locking disabled, or no peaks found).
    Basic,
}

/// Identity phase-locked pitch shifter operating on one analysis frame per hop.
///
/// Owns the persisted phase of every synthesis bin plus all per-frame scratch
/// (peak set, region map, driver table, sanitized analysis copies). Everything
/// is sized at construction; [`process_frame`](Self::process_frame) never
/// allocates. Frames must be fed in temporal order, one instance per stream.
pub struct SpectralShifter {
    max_bins: usize,
    /// Bin count of the last processed frame.
    active_bins: usize,
    peaks: PeakSet,
    regions: RegionMap,
    mode: ModeController,
    /// Phase of every synthesis bin, carried across frames.
    phases: Vec<f32>,
    /// Peak driving each synthesis bin in Pass 1.
    drivers: Vec<usize>,
    magnitudes: Vec<f32>,
    analysis_phases: Vec<f32>,
    frequencies: Vec<f32>,
}

impl SpectralShifter {
    /// Creates a shifter for frames of up to `max_bins` bins, recording at
    /// most `max_peaks` peaks per frame. Locking starts enabled.
    pub fn new(max_bins: usize, max_peaks: usize) -> Result<Self, ShiftError> {
        if max_bins < 3 {
            return Err(ShiftError::InvalidCapacity(max_bins));
        }
        if max_peaks == 0 {
            return Err(ShiftError::InvalidCapacity(max_peaks));
        }
        log::debug!(
            "spectral shifter: {} bins, {} peaks per frame",
            max_bins,
            max_peaks
        );
        Ok(Self {
            max_bins,
            active_bins: 0,
            peaks: PeakSet::new(max_bins, max_peaks),
            regions: RegionMap::new(max_bins),
            mode: ModeController::new(true),
            phases: vec![0.0; max_bins],
            drivers: vec![NO_PEAK; max_bins],
            magnitudes: vec![0.0; max_bins],
            analysis_phases: vec![0.0; max_bins],
            frequencies: vec![0.0; max_bins],
        })
    }

    /// Sets the initial locking state.
    pub fn with_phase_locking(mut self, enabled: bool) -> Self {
        self.mode = ModeController::new(enabled);
        self
    }

    /// Turns locking on or off from the next frame.
    #[inline]
    pub fn set_phase_locking(&mut self, enabled: bool) {
        self.mode.set_enabled(enabled);
    }

    #[inline]
    pub fn phase_locking_enabled(&self) -> bool {
        self.mode.is_enabled()
    }

    /// Largest frame this instance accepts.
    #[inline]
    pub fn max_bins(&self) -> usize {
        self.max_bins
    }

    /// Current phase of every synthesis bin of the last frame.
    #[inline]
    pub fn phases(&self) -> &[f32] {
        &self.phases[..self.active_bins]
    }

    /// Peaks detected in the last locked frame.
    #[inline]
    pub fn peaks(&self) -> &PeakSet {
        &self.peaks
    }

    /// Regions of influence of the last locked frame.
    #[inline]
    pub fn regions(&self) -> &RegionMap {
        &self.regions
    }

    /// Clears the persisted phases, as if no frame had been processed.
    pub fn reset(&mut self) {
        self.phases.iter_mut().for_each(|p| *p = 0.0);
        self.active_bins = 0;
    }

    /// Shifts one analysis frame by `pitch_ratio` into `spectrum`.
    ///
    /// `spectrum` must have one entry per analysis bin. Non-finite analysis
    /// values are treated as zero so they cannot reach the persisted phases.
    pub fn process_frame(
        &mut self,
        frame: &AnalysisFrame<'_>,
        pitch_ratio: f64,
        spectrum: &mut [Complex<f32>],
    ) -> Result<SynthesisPath, ShiftError> {
        let ratio = frame_ratio(pitch_ratio)?;
        let num_bins = frame.num_bins();
        if num_bins > self.max_bins {
            return Err(ShiftError::FrameTooLarge {
                provided: num_bins,
                capacity: self.max_bins,
            });
        }
        if spectrum.len() != num_bins {
            return Err(ShiftError::FrameMismatch {
                expected: num_bins,
                provided: spectrum.len(),
            });
        }
        if num_bins < 3 {
            return Err(ShiftError::InvalidCapacity(num_bins));
        }

        sanitize(frame.magnitudes, &mut self.magnitudes[..num_bins], true);
        sanitize(frame.phases, &mut self.analysis_phases[..num_bins], false);
        sanitize(frame.frequencies, &mut self.frequencies[..num_bins], false);
        let clean = AnalysisFrame {
            magnitudes: &self.magnitudes[..num_bins],
            phases: &self.analysis_phases[..num_bins],
            frequencies: &self.frequencies[..num_bins],
        };
        let phases = &mut self.phases[..num_bins];
        self.active_bins = num_bins;

        if self.mode.begin_frame() == ModeTransition::Disabled {
            log::debug!("phase locking disabled, re-initializing {} phases", num_bins);
            phases.copy_from_slice(clean.phases);
        }

        if !self.mode.is_enabled() {
            basic_synthesis(&clean, ratio, phases, spectrum);
            return Ok(SynthesisPath::Basic);
        }

        self.peaks.detect(clean.magnitudes);
        if self.peaks.saturated() {
            log::trace!(
                "peak capacity of {} reached, remaining bins unflagged",
                self.peaks.capacity()
            );
        }
        if self.peaks.is_empty() {
            log::trace!("no peaks in frame, using basic synthesis");
            basic_synthesis(&clean, ratio, phases, spectrum);
            return Ok(SynthesisPath::Basic);
        }

        self.regions.assign(self.peaks.bins(), num_bins);
        locked_synthesis(
            &clean,
            &self.peaks,
            &self.regions,
            ratio,
            &mut self.drivers,
            phases,
            spectrum,
        );
        Ok(SynthesisPath::Locked {
            peaks: self.peaks.len(),
        })
    }
}

/// Converts a pitch ratio to the `f32` the synthesis runs at, rejecting
/// ratios that are not positive and finite in either precision.
pub(crate) fn frame_ratio(pitch_ratio: f64) -> Result<f32, ShiftError> {
    let ratio = pitch_ratio as f32;
    if !pitch_ratio.is_finite() || !ratio.is_finite() || ratio <= 0.0 {
        return Err(ShiftError::InvalidPitchRatio(pitch_ratio));
    }
    Ok(ratio)
}

/// Copies `src` into `dst`, replacing non-finite values (and, for
/// magnitudes, negative ones) with zero.
#[inline]
fn sanitize(src: &[f32], dst: &mut [f32], non_negative: bool) {
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = if !s.is_finite() || (non_negative && s < 0.0) {
            0.0
        } else {
            s
        };
    }
}
