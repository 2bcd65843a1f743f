//! Phase-locked synthesis for pitch shifting (Laroche & Dolson 1999).
//!
//! Synthesis bin `k` takes its content from fractional analysis bin
//! `k / ratio`. Bins driven by a spectral peak accumulate phase horizontally,
//! frame to frame. Every other bin inherits the rotation its controlling peak
//! underwent, which keeps the peak's neighbourhood vertically coherent.
//!
//! Non-peak bins can sit on either side of the synthesis bin holding their
//! peak's updated phase, so synthesis runs in two full passes: all peak-driven
//! bins first, then everything else.

use rustfft::num_complex::Complex;
use std::f32::consts::PI;

use crate::core::fft::COMPLEX_ZERO;
use crate::core::types::AnalysisFrame;
use crate::shift::peaks::PeakSet;
use crate::shift::regions::RegionMap;

const TWO_PI: f32 = 2.0 * PI;

/// Marks a synthesis bin that no peak drives in the current frame.
pub(crate) const NO_PEAK: usize = usize::MAX;

/// Fractional analysis position feeding one synthesis bin.
#[derive(Debug, Clone, Copy, PartialEq)]
struct SourcePos {
    bin: usize,
    frac: f32,
}

impl SourcePos {
    /// Locates the source of `synth_bin`, or `None` when it lies beyond the
    /// last analysis bin.
    #[inline]
    fn locate(synth_bin: usize, ratio: f32, num_bins: usize) -> Option<Self> {
        let last = num_bins - 1;
        let pos = synth_bin as f32 / ratio;
        if !(pos <= last as f32) {
            return None;
        }
        let bin = pos.floor() as usize;
        if bin >= last {
            return Some(Self { bin: last, frac: 0.0 });
        }
        Some(Self {
            bin,
            frac: pos - bin as f32,
        })
    }

    /// Nearest integer analysis bin.
    #[inline]
    fn nearest(self) -> usize {
        if self.frac >= 0.5 {
            self.bin + 1
        } else {
            self.bin
        }
    }

    #[inline]
    fn magnitude(self, magnitudes: &[f32]) -> f32 {
        if self.frac == 0.0 {
            magnitudes[self.bin]
        } else {
            magnitudes[self.bin] * (1.0 - self.frac) + magnitudes[self.bin + 1] * self.frac
        }
    }

    /// Interpolates along the shorter arc between the bracketing phases.
    #[inline]
    fn phase(self, phases: &[f32]) -> f32 {
        if self.frac == 0.0 {
            phases[self.bin]
        } else {
            let lower = phases[self.bin];
            lower + self.frac * wrap_phase(phases[self.bin + 1] - lower)
        }
    }
}

/// Synthesis bin holding the updated phase of analysis peak `peak`.
#[inline]
fn anchor_bin(peak: usize, ratio: f32, num_bins: usize) -> Option<usize> {
    let anchor = (peak as f32 * ratio).round() as usize;
    (anchor < num_bins).then_some(anchor)
}

/// Wraps a phase value to (-PI, PI].
#[inline]
pub fn wrap_phase(phase: f32) -> f32 {
    let wrapped = phase - ((phase + PI) / TWO_PI).floor() * TWO_PI;
    if wrapped <= -PI {
        wrapped + TWO_PI
    } else {
        wrapped
    }
}

/// Horizontal update: the previous phase advanced by the scaled frequency.
///
/// An advance that overflows restarts the bin at 0 instead of leaving a NaN
/// in the persisted state.
#[inline]
fn accumulate(prev: f32, frequency: f32, ratio: f32) -> f32 {
    let phase = wrap_phase(prev + frequency * ratio);
    if phase.is_finite() {
        phase
    } else {
        0.0
    }
}

/// Plain phase vocoder update, used when locking is off or a frame has no
/// peaks: every bin accumulates the instantaneous frequency of its nearest
/// source bin.
pub(crate) fn basic_synthesis(
    frame: &AnalysisFrame<'_>,
    ratio: f32,
    phases: &mut [f32],
    spectrum: &mut [Complex<f32>],
) {
    let num_bins = spectrum.len();
    for (k, out) in spectrum.iter_mut().enumerate() {
        match SourcePos::locate(k, ratio, num_bins) {
            Some(pos) => {
                let phase = accumulate(phases[k], frame.frequencies[pos.nearest()], ratio);
                phases[k] = phase;
                *out = Complex::from_polar(pos.magnitude(frame.magnitudes), phase);
            }
            None => {
                phases[k] = 0.0;
                *out = COMPLEX_ZERO;
            }
        }
    }
}

/// Two-pass identity phase-locked synthesis.
///
/// `drivers` is per-synthesis-bin scratch. After the call it holds the
/// analysis peak each bin accumulated from in Pass 1, or [`NO_PEAK`].
pub(crate) fn locked_synthesis(
    frame: &AnalysisFrame<'_>,
    peaks: &PeakSet,
    regions: &RegionMap,
    ratio: f32,
    drivers: &mut [usize],
    phases: &mut [f32],
    spectrum: &mut [Complex<f32>],
) {
    let num_bins = spectrum.len();
    let drivers = &mut drivers[..num_bins];

    for (k, driver) in drivers.iter_mut().enumerate() {
        *driver = match SourcePos::locate(k, ratio, num_bins) {
            Some(pos) if peaks.is_peak(pos.nearest()) => pos.nearest(),
            _ => NO_PEAK,
        };
    }
    // A peak that no synthesis bin rounds onto still needs its anchor
    // updated before Pass 2 reads it.
    for &peak in peaks.bins() {
        if let Some(anchor) = anchor_bin(peak, ratio, num_bins) {
            if drivers[anchor] == NO_PEAK {
                drivers[anchor] = peak;
            }
        }
    }

    // Pass 1: peak-driven bins
    for (k, &peak) in drivers.iter().enumerate() {
        if peak == NO_PEAK {
            continue;
        }
        let magnitude =
            SourcePos::locate(k, ratio, num_bins).map_or(0.0, |pos| pos.magnitude(frame.magnitudes));
        let phase = accumulate(phases[k], frame.frequencies[peak], ratio);
        phases[k] = phase;
        spectrum[k] = Complex::from_polar(magnitude, phase);
    }

    // Pass 2: everything else, rotated with the controlling peak
    for (k, &driver) in drivers.iter().enumerate() {
        if driver != NO_PEAK {
            continue;
        }
        let Some(pos) = SourcePos::locate(k, ratio, num_bins) else {
            phases[k] = 0.0;
            spectrum[k] = COMPLEX_ZERO;
            continue;
        };
        let source = pos.nearest();
        let peak = regions.owner(source);
        let phase = match anchor_bin(peak, ratio, num_bins) {
            Some(anchor) => {
                let rotation = phases[anchor] - frame.phases[peak];
                wrap_phase(pos.phase(frame.phases) + rotation)
            }
            None => accumulate(phases[k], frame.frequencies[source], ratio),
        };
        // Written even though it is recomputed next frame: readers of the
        // phase state expect a current value for every bin.
        phases[k] = phase;
        spectrum[k] = Complex::from_polar(pos.magnitude(frame.magnitudes), phase);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Frame {
        magnitudes: Vec<f32>,
        phases: Vec<f32>,
        frequencies: Vec<f32>,
    }

    impl Frame {
        fn view(&self) -> AnalysisFrame<'_> {
            AnalysisFrame::new(&self.magnitudes, &self.phases, &self.frequencies).unwrap()
        }
    }

    fn tone_frame(num_bins: usize, peak: usize) -> Frame {
        let mut magnitudes = vec![0.0f32; num_bins];
        magnitudes[peak - 1] = 0.5;
        magnitudes[peak] = 1.0;
        magnitudes[peak + 1] = 0.5;
        let phases = (0..num_bins)
            .map(|k| wrap_phase(0.3 + PI * k as f32))
            .collect();
        let frequencies = vec![0.25; num_bins];
        Frame {
            magnitudes,
            phases,
            frequencies,
        }
    }

    fn locked_run(frame: &Frame, ratio: f32, phases: &mut [f32]) -> (Vec<Complex<f32>>, Vec<usize>) {
        let num_bins = frame.magnitudes.len();
        let mut peaks = PeakSet::new(num_bins, 16);
        peaks.detect(&frame.magnitudes);
        let mut regions = RegionMap::new(num_bins);
        regions.assign(peaks.bins(), num_bins);
        let mut drivers = vec![NO_PEAK; num_bins];
        let mut spectrum = vec![COMPLEX_ZERO; num_bins];
        locked_synthesis(
            &frame.view(),
            &peaks,
            &regions,
            ratio,
            &mut drivers,
            phases,
            &mut spectrum,
        );
        (spectrum, drivers)
    }

    #[test]
    fn test_wrap_phase() {
        assert!((wrap_phase(0.0) - 0.0).abs() < 1e-6);
        assert!((wrap_phase(PI + 0.1) - (-PI + 0.1)).abs() < 1e-5);
        assert!((wrap_phase(-PI - 0.1) - (PI - 0.1)).abs() < 1e-5);
        assert!((wrap_phase(10.0 * PI + 0.5) - wrap_phase(0.5)).abs() < 1e-4);
        // The interval is half-open at -PI
        assert!((wrap_phase(-PI) - PI).abs() < 1e-6);
        assert!((wrap_phase(PI) - PI).abs() < 1e-6);
    }

    #[test]
    fn test_source_position() {
        let pos = SourcePos::locate(15, 1.5, 64).unwrap();
        assert_eq!(pos.bin, 10);
        assert!(pos.frac.abs() < 1e-6);

        let pos = SourcePos::locate(16, 1.5, 64).unwrap();
        assert_eq!(pos.bin, 10);
        assert_eq!(pos.nearest(), 11);

        // Pitching down reads past the last analysis bin
        assert!(SourcePos::locate(40, 0.5, 64).is_none());
        assert_eq!(SourcePos::locate(63, 1.0, 64).unwrap().nearest(), 63);
    }

    #[test]
    fn test_interpolation() {
        let mags = [0.0f32, 1.0, 0.0];
        let pos = SourcePos { bin: 0, frac: 0.25 };
        assert!((pos.magnitude(&mags) - 0.25).abs() < 1e-6);

        // Shorter arc across the wrap point
        let phases = [PI - 0.1, -PI + 0.1];
        let pos = SourcePos { bin: 0, frac: 0.5 };
        assert!(wrap_phase(pos.phase(&phases) - PI).abs() < 1e-5);
    }

    #[test]
    fn test_basic_accumulates_scaled_frequency() {
        let frame = tone_frame(32, 10);
        let mut phases = vec![0.0f32; 32];
        let mut spectrum = vec![COMPLEX_ZERO; 32];
        basic_synthesis(&frame.view(), 1.0, &mut phases, &mut spectrum);
        basic_synthesis(&frame.view(), 1.0, &mut phases, &mut spectrum);
        assert!((phases[10] - 0.5).abs() < 1e-6);
        assert!((spectrum[10].norm() - 1.0).abs() < 1e-6);
        assert!((spectrum[10].arg() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_basic_silences_out_of_range_bins() {
        let frame = tone_frame(32, 10);
        let mut phases = vec![1.0f32; 32];
        let mut spectrum = vec![Complex::new(1.0, 1.0); 32];
        basic_synthesis(&frame.view(), 0.5, &mut phases, &mut spectrum);
        for k in 16..32 {
            assert_eq!(spectrum[k], COMPLEX_ZERO, "bin {}", k);
            assert_eq!(phases[k], 0.0);
        }
    }

    #[test]
    fn test_peak_accumulates_and_neighbours_rotate() {
        let frame = tone_frame(64, 20);
        let mut phases = vec![0.0f32; 64];
        let (spectrum, drivers) = locked_run(&frame, 1.5, &mut phases);

        // Bin 30 sits exactly on the peak
        assert_eq!(drivers[30], 20);
        assert!((phases[30] - 0.25 * 1.5).abs() < 1e-6);

        // Rotation = synthesized peak phase - analysis peak phase
        let rotation = phases[30] - frame.phases[20];

        // Bin 27 reads analysis bin 18 exactly
        assert_eq!(drivers[27], NO_PEAK);
        let expected = frame.phases[18] + rotation;
        assert!(wrap_phase(phases[27] - expected).abs() < 1e-5);

        // Bin 28 reads between analysis bins 18 and 19
        assert_eq!(drivers[28], NO_PEAK);
        let pos = SourcePos::locate(28, 1.5, 64).unwrap();
        let expected = pos.phase(&frame.phases) + rotation;
        assert!(wrap_phase(phases[28] - expected).abs() < 1e-5);

        // Every written phase is reflected in the output spectrum
        for k in 0..64 {
            if spectrum[k].norm() > 1e-3 {
                assert!(wrap_phase(spectrum[k].arg() - phases[k]).abs() < 1e-4, "bin {}", k);
            }
        }
    }

    #[test]
    fn test_pitch_down_anchor_is_produced_in_first_pass() {
        // With ratio 0.5 synthesis bins read even analysis bins only, so a
        // peak at an odd bin is reached through its anchor.
        let frame = tone_frame(64, 21);
        let mut phases = vec![0.0f32; 64];
        let (_, drivers) = locked_run(&frame, 0.5, &mut phases);
        let anchor = (21.0f32 * 0.5).round() as usize;
        assert_eq!(drivers[anchor], 21);
        assert!((phases[anchor] - 0.25 * 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_peaks_sharing_an_anchor() {
        // At ratio 0.25 peaks 19 and 21 both round to synthesis bin 5, and no
        // synthesis bin reads either of them directly. The lower peak claims
        // the anchor; both regions rotate against its phase.
        let num_bins = 64;
        let mut magnitudes = vec![0.01f32; num_bins];
        magnitudes[19] = 1.0;
        magnitudes[20] = 0.5;
        magnitudes[21] = 0.8;
        let frame = Frame {
            magnitudes,
            phases: (0..num_bins).map(|k| (k as f32 * 0.7).sin()).collect(),
            frequencies: (0..num_bins).map(|k| 0.01 * k as f32).collect(),
        };
        let mut phases = vec![0.0f32; num_bins];
        let (_, drivers) = locked_run(&frame, 0.25, &mut phases);

        assert_eq!(drivers[5], 19);
        assert!((phases[5] - frame.frequencies[19] * 0.25).abs() < 1e-6);

        // Bin 4 reads analysis bin 16, owned by peak 19
        let expected = frame.phases[16] + phases[5] - frame.phases[19];
        assert!(wrap_phase(phases[4] - expected).abs() < 1e-5);

        // Bin 6 reads analysis bin 24, owned by peak 21 through the same anchor
        let expected = frame.phases[24] + phases[5] - frame.phases[21];
        assert!(wrap_phase(phases[6] - expected).abs() < 1e-5);
    }

    #[test]
    fn test_second_frame_reads_current_peak_phase() {
        // Pitching up puts non-peak bins below their peak's synthesis bin;
        // they must see this frame's peak phase, not last frame's.
        let frame = tone_frame(64, 20);
        let mut phases = vec![0.0f32; 64];
        locked_run(&frame, 2.0, &mut phases);
        locked_run(&frame, 2.0, &mut phases);
        let peak_phase = phases[40];
        assert!((peak_phase - wrap_phase(2.0 * 0.25 * 2.0)).abs() < 1e-5);
        let rotation = peak_phase - frame.phases[20];
        assert!(wrap_phase(phases[38] - (frame.phases[19] + rotation)).abs() < 1e-5);
    }
}
