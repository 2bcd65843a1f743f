//! Region-of-influence assignment.
//!
//! Maps every analysis bin to the peak that controls it. Boundaries sit at
//! the integer midpoint between adjacent peaks; a bin exactly halfway
//! between two peaks belongs to the lower one.

/// Controlling peak bin for every analysis bin of the current frame.
#[derive(Debug, Clone)]
pub struct RegionMap {
    owner: Vec<usize>,
    num_bins: usize,
}

impl RegionMap {
    /// Creates a region map for frames of up to `max_bins` bins.
    pub fn new(max_bins: usize) -> Self {
        Self {
            owner: vec![0; max_bins],
            num_bins: 0,
        }
    }

    /// Assigns each of the first `num_bins` bins to its nearest peak.
    ///
    /// `peaks` must be ascending. With no peaks the map is left empty and
    /// callers are expected to skip locking for the frame.
    pub fn assign(&mut self, peaks: &[usize], num_bins: usize) {
        let num_bins = num_bins.min(self.owner.len());
        self.num_bins = num_bins;

        match peaks {
            [] => self.num_bins = 0,
            [only] => self.owner[..num_bins].iter_mut().for_each(|o| *o = *only),
            _ => {
                let mut cursor = 0;
                for bin in 0..num_bins {
                    while cursor + 1 < peaks.len() && bin > (peaks[cursor] + peaks[cursor + 1]) / 2 {
                        cursor += 1;
                    }
                    self.owner[bin] = peaks[cursor];
                }
            }
        }
    }

    /// Peak bin controlling `bin`.
    #[inline]
    pub fn owner(&self, bin: usize) -> usize {
        self.owner[bin]
    }

    /// Assignments for the current frame; empty when no peaks were found.
    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        &self.owner[..self.num_bins]
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.num_bins == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_peak_covers_everything() {
        let mut map = RegionMap::new(2049);
        map.assign(&[41], 2049);
        assert_eq!(map.as_slice().len(), 2049);
        assert!(map.as_slice().iter().all(|&o| o == 41));
    }

    #[test]
    fn test_no_peaks_leaves_map_empty() {
        let mut map = RegionMap::new(16);
        map.assign(&[3], 16);
        map.assign(&[], 16);
        assert!(map.is_empty());
        assert!(map.as_slice().is_empty());
    }

    #[test]
    fn test_midpoint_tie_goes_to_lower_peak() {
        let mut map = RegionMap::new(12);
        // Peaks at 2 and 6: bin 4 is equidistant
        map.assign(&[2, 6], 12);
        assert_eq!(map.owner(3), 2);
        assert_eq!(map.owner(4), 2);
        assert_eq!(map.owner(5), 6);
        assert_eq!(map.owner(0), 2);
        assert_eq!(map.owner(11), 6);
    }

    #[test]
    fn test_odd_gap_splits_at_nearest() {
        let mut map = RegionMap::new(12);
        // Peaks at 2 and 7: bin 4 is nearer 2, bin 5 nearer 7
        map.assign(&[2, 7], 12);
        assert_eq!(map.owner(4), 2);
        assert_eq!(map.owner(5), 7);
    }

    #[test]
    fn test_every_bin_assigned_to_nearest() {
        let peaks = [3usize, 10, 11, 40, 77, 200];
        let num_bins = 257;
        let mut map = RegionMap::new(num_bins);
        map.assign(&peaks, num_bins);

        let mut counts = vec![0usize; peaks.len()];
        for (bin, &owner) in map.as_slice().iter().enumerate() {
            let idx = peaks.iter().position(|&p| p == owner).unwrap();
            counts[idx] += 1;
            let best = peaks
                .iter()
                .map(|&p| (p as i64 - bin as i64).abs())
                .min()
                .unwrap();
            assert_eq!((owner as i64 - bin as i64).abs(), best, "bin {}", bin);
        }
        assert_eq!(counts.iter().sum::<usize>(), num_bins);
        assert!(counts.iter().all(|&c| c > 0));
    }
}
