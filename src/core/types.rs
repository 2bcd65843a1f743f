use crate::core::window::WindowType;
use crate::error::ShiftError;

/// A single audio sample (32-bit float, range -1.0 to 1.0).
pub type Sample = f32;

/// Smallest pitch ratio accepted by the offline API (three octaves down).
pub const PITCH_RATIO_MIN: f64 = 0.125;
/// Largest pitch ratio accepted by the offline API (three octaves up).
pub const PITCH_RATIO_MAX: f64 = 8.0;
/// Default upper bound on the number of peaks recorded per frame.
pub const DEFAULT_MAX_PEAKS: usize = 512;

/// Channel layout of interleaved audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Channels {
    Mono,
    Stereo,
}

impl Channels {
    /// Number of interleaved channels.
    #[inline]
    pub fn count(self) -> usize {
        match self {
            Channels::Mono => 1,
            Channels::Stereo => 2,
        }
    }

    /// Converts a raw channel count.
    ///
    /// # Errors
    /// Returns `ShiftError::InvalidChannels` for anything other than 1 or 2.
    pub fn from_count(count: u16) -> Result<Self, ShiftError> {
        match count {
            1 => Ok(Channels::Mono),
            2 => Ok(Channels::Stereo),
            other => Err(ShiftError::InvalidChannels(other)),
        }
    }
}

/// Buffer holding audio samples in interleaved format.
///
/// For mono audio, samples are stored sequentially: `[s0, s1, s2, ...]`
/// For stereo audio, samples are interleaved: `[L0, R0, L1, R1, ...]`
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    /// Raw interleaved sample data.
    pub data: Vec<Sample>,
    pub channels: Channels,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl AudioBuffer {
    /// Create a new audio buffer.
    ///
    /// # Errors
    /// Returns `ShiftError::InvalidSampleRate` if sample_rate is 0.
    pub fn new(
        data: Vec<Sample>,
        channels: Channels,
        sample_rate: u32,
    ) -> Result<Self, ShiftError> {
        if sample_rate == 0 {
            return Err(ShiftError::InvalidSampleRate(sample_rate));
        }
        Ok(Self {
            data,
            channels,
            sample_rate,
        })
    }

    /// Number of frames in the buffer (total samples / channels).
    pub fn num_frames(&self) -> usize {
        self.data.len() / self.channels.count()
    }

    /// Duration of the audio in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.num_frames() as f64 / self.sample_rate as f64
    }

    /// Returns true if the buffer contains no samples.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get a single channel's data as a new vector.
    pub fn channel_data(&self, channel: usize) -> Vec<Sample> {
        let num_ch = self.channels.count();
        if channel >= num_ch {
            return Vec::new();
        }
        self.data
            .iter()
            .skip(channel)
            .step_by(num_ch)
            .copied()
            .collect()
    }
}

/// One hop of short-time analysis: three arrays indexed by frequency bin.
///
/// `frequencies` holds each bin's instantaneous frequency as the true phase
/// advance per analysis hop, in radians.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisFrame<'a> {
    pub magnitudes: &'a [f32],
    pub phases: &'a [f32],
    pub frequencies: &'a [f32],
}

impl<'a> AnalysisFrame<'a> {
    /// Bundles the three analysis arrays.
    ///
    /// # Errors
    /// Returns `ShiftError::FrameMismatch` if the arrays differ in length.
    pub fn new(
        magnitudes: &'a [f32],
        phases: &'a [f32],
        frequencies: &'a [f32],
    ) -> Result<Self, ShiftError> {
        let expected = magnitudes.len();
        for provided in [phases.len(), frequencies.len()] {
            if provided != expected {
                return Err(ShiftError::FrameMismatch { expected, provided });
            }
        }
        Ok(Self {
            magnitudes,
            phases,
            frequencies,
        })
    }

    #[inline]
    pub fn num_bins(&self) -> usize {
        self.magnitudes.len()
    }
}

/// Parameters controlling a pitch shift.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShiftParams {
    /// Pitch ratio: >1.0 = higher, <1.0 = lower, 1.0 = unchanged.
    pub pitch_ratio: f64,
    /// Sample rate in Hz (default: 44100).
    pub sample_rate: u32,
    /// Channel layout (default: mono).
    pub channels: Channels,
    /// FFT size (default: 2048).
    pub fft_size: usize,
    /// Hop size (default: fft_size / 4).
    pub hop_size: Option<usize>,
    /// Analysis and synthesis window (default: Hann).
    pub window: WindowType,
    /// Peaks recorded per frame before detection stops (default: 512).
    pub max_peaks: usize,
    /// Whether identity phase locking is enabled (default: true).
    pub phase_locking: bool,
}

impl ShiftParams {
    /// Create new shift parameters with the given ratio.
    ///
    /// # Errors
    /// Returns `ShiftError::InvalidPitchRatio` if ratio is not positive and finite.
    pub fn new(pitch_ratio: f64) -> Result<Self, ShiftError> {
        if !pitch_ratio.is_finite() || pitch_ratio <= 0.0 {
            return Err(ShiftError::InvalidPitchRatio(pitch_ratio));
        }
        Ok(Self {
            pitch_ratio,
            sample_rate: 44100,
            channels: Channels::Mono,
            fft_size: 2048,
            hop_size: None,
            window: WindowType::Hann,
            max_peaks: DEFAULT_MAX_PEAKS,
            phase_locking: true,
        })
    }

    /// Set the sample rate.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Set the channel layout.
    pub fn with_channels(mut self, channels: Channels) -> Self {
        self.channels = channels;
        self
    }

    /// Set the FFT size.
    pub fn with_fft_size(mut self, fft_size: usize) -> Self {
        self.fft_size = fft_size;
        self
    }

    /// Set an explicit hop size.
    pub fn with_hop_size(mut self, hop_size: usize) -> Self {
        self.hop_size = Some(hop_size);
        self
    }

    /// Set the window type.
    pub fn with_window(mut self, window: WindowType) -> Self {
        self.window = window;
        self
    }

    /// Set the per-frame peak capacity.
    pub fn with_max_peaks(mut self, max_peaks: usize) -> Self {
        self.max_peaks = max_peaks;
        self
    }

    /// Enable or disable identity phase locking.
    pub fn with_phase_locking(mut self, enabled: bool) -> Self {
        self.phase_locking = enabled;
        self
    }

    /// Get the effective hop size.
    pub fn effective_hop_size(&self) -> usize {
        self.hop_size.unwrap_or(self.fft_size / 4)
    }

    /// Validate all parameters.
    pub fn validate(&self) -> Result<(), ShiftError> {
        if !self.pitch_ratio.is_finite()
            || !(PITCH_RATIO_MIN..=PITCH_RATIO_MAX).contains(&self.pitch_ratio)
        {
            return Err(ShiftError::InvalidPitchRatio(self.pitch_ratio));
        }
        if self.sample_rate == 0 {
            return Err(ShiftError::InvalidSampleRate(self.sample_rate));
        }
        if self.fft_size < 8 || !self.fft_size.is_power_of_two() {
            return Err(ShiftError::InvalidFftSize(self.fft_size));
        }
        let hop = self.effective_hop_size();
        if hop == 0 || hop > self.fft_size / 2 {
            return Err(ShiftError::InvalidHopSize {
                hop,
                fft_size: self.fft_size,
            });
        }
        if self.max_peaks == 0 {
            return Err(ShiftError::InvalidCapacity(self.max_peaks));
        }
        Ok(())
    }
}
