//! Spectral peak detection.
//!
//! A bin is a peak when its magnitude strictly exceeds both immediate
//! neighbours. Peaks are detected independently per frame and recorded into
//! buffers sized once at construction.

/// Per-frame set of spectral peaks.
///
/// Holds an `is_peak` flag per bin plus the ascending list of peak bins.
/// Recording stops once `capacity` peaks are found; later bins are left
/// unflagged.
#[derive(Debug, Clone)]
pub struct PeakSet {
    flags: Vec<bool>,
    bins: Vec<usize>,
    capacity: usize,
    num_bins: usize,
    saturated: bool,
}

impl PeakSet {
    /// Creates a peak set able to hold frames of up to `max_bins` bins and
    /// at most `capacity` peaks.
    pub fn new(max_bins: usize, capacity: usize) -> Self {
        Self {
            flags: vec![false; max_bins],
            bins: Vec::with_capacity(capacity),
            capacity,
            num_bins: 0,
            saturated: false,
        }
    }

    /// Scans `magnitudes` and records every strict local maximum.
    ///
    /// Bin 0 and the last bin are never peaks. Non-finite magnitudes never
    /// qualify and never let a neighbour qualify. `magnitudes.len()` must
    /// not exceed the bin capacity.
    pub fn detect(&mut self, magnitudes: &[f32]) {
        let num_bins = magnitudes.len().min(self.flags.len());
        self.flags[..num_bins].iter_mut().for_each(|f| *f = false);
        self.bins.clear();
        self.num_bins = num_bins;
        self.saturated = false;

        if num_bins < 3 {
            return;
        }

        for bin in 1..num_bins - 1 {
            let mag = magnitudes[bin];
            let lower = magnitudes[bin - 1];
            let upper = magnitudes[bin + 1];
            if !(mag.is_finite() && lower.is_finite() && upper.is_finite()) {
                continue;
            }
            if mag > lower && mag > upper {
                if self.bins.len() == self.capacity {
                    self.saturated = true;
                    break;
                }
                self.flags[bin] = true;
                self.bins.push(bin);
            }
        }
    }

    /// Returns true if `bin` was flagged in the last detected frame.
    #[inline]
    pub fn is_peak(&self, bin: usize) -> bool {
        bin < self.num_bins && self.flags[bin]
    }

    /// Ascending peak bin indices of the last detected frame.
    #[inline]
    pub fn bins(&self) -> &[usize] {
        &self.bins
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Maximum number of peaks recorded per frame.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// True if the last frame had more local maxima than the capacity.
    #[inline]
    pub fn saturated(&self) -> bool {
        self.saturated
    }

    /// Number of bins in the last detected frame.
    #[inline]
    pub fn num_bins(&self) -> usize {
        self.num_bins
    }
}
