use rustfft::num_complex::Complex;

use crate::core::fft::{num_bins, COMPLEX_ZERO};
use crate::core::types::ShiftParams;
use crate::error::ShiftError;
use crate::shift::shifter::{frame_ratio, SpectralShifter, SynthesisPath};
use crate::stft::analysis::FrameAnalyzer;
use crate::stft::synthesis::OverlapAdd;

/// Streaming sample-in/sample-out pitch shifter for one mono stream.
///
/// Every input sample produces one output sample, delayed by
/// [`latency_samples`](Self::latency_samples). Buffers are allocated in
/// [`new`](Self::new); [`process`](Self::process) does not allocate.
pub struct StreamProcessor {
    fft_size: usize,
    hop: usize,
    pitch_ratio: f64,
    analyzer: FrameAnalyzer,
    shifter: SpectralShifter,
    resynth: OverlapAdd,
    spectrum: Vec<Complex<f32>>,
    /// Last `fft_size` input samples; a frame runs each time it fills.
    input_fifo: Vec<f32>,
    /// Finished samples of the last frame, read out over the next hop.
    output_fifo: Vec<f32>,
    /// Write position in `input_fifo`.
    rover: usize,
    last_path: Option<SynthesisPath>,
}

impl StreamProcessor {
    /// Creates a processor from validated parameters.
    ///
    /// `params.channels` is ignored; interleaved audio needs one processor
    /// per channel.
    pub fn new(params: &ShiftParams) -> Result<Self, ShiftError> {
        params.validate()?;
        let fft_size = params.fft_size;
        let hop = params.effective_hop_size();
        let num_bins = num_bins(fft_size);
        let shifter = SpectralShifter::new(num_bins, params.max_peaks)?
            .with_phase_locking(params.phase_locking);

        log::debug!(
            "stream processor: fft {} hop {} ratio {} locking {}",
            fft_size,
            hop,
            params.pitch_ratio,
            params.phase_locking
        );

        Ok(Self {
            fft_size,
            hop,
            pitch_ratio: params.pitch_ratio,
            analyzer: FrameAnalyzer::new(fft_size, hop, params.window),
            shifter,
            resynth: OverlapAdd::new(fft_size, hop, params.window),
            spectrum: vec![COMPLEX_ZERO; num_bins],
            input_fifo: vec![0.0; fft_size],
            output_fifo: vec![0.0; hop],
            rover: fft_size - hop,
            last_path: None,
        })
    }

    /// Delay between an input sample and its shifted output.
    #[inline]
    pub fn latency_samples(&self) -> usize {
        self.fft_size
    }

    #[inline]
    pub fn pitch_ratio(&self) -> f64 {
        self.pitch_ratio
    }

    /// Changes the pitch ratio from the next frame on.
    pub fn set_pitch_ratio(&mut self, ratio: f64) -> Result<(), ShiftError> {
        frame_ratio(ratio)?;
        self.pitch_ratio = ratio;
        Ok(())
    }

    /// Turns phase locking on or off from the next frame on.
    #[inline]
    pub fn set_phase_locking(&mut self, enabled: bool) {
        self.shifter.set_phase_locking(enabled);
    }

    #[inline]
    pub fn phase_locking_enabled(&self) -> bool {
        self.shifter.phase_locking_enabled()
    }

    /// Path taken by the most recent frame, if any frame has run yet.
    #[inline]
    pub fn last_path(&self) -> Option<SynthesisPath> {
        self.last_path
    }

    /// The spectral core, for inspection of its phase state.
    #[inline]
    pub fn shifter(&self) -> &SpectralShifter {
        &self.shifter
    }

    /// Clears all buffered audio and phase state.
    pub fn reset(&mut self) {
        self.analyzer.reset();
        self.shifter.reset();
        self.resynth.reset();
        self.input_fifo.iter_mut().for_each(|s| *s = 0.0);
        self.output_fifo.iter_mut().for_each(|s| *s = 0.0);
        self.rover = self.fft_size - self.hop;
        self.last_path = None;
    }

    /// Shifts `input` into `output`, which must be the same length.
    pub fn process(&mut self, input: &[f32], output: &mut [f32]) -> Result<(), ShiftError> {
        if output.len() != input.len() {
            return Err(ShiftError::FrameMismatch {
                expected: input.len(),
                provided: output.len(),
            });
        }

        let fifo_offset = self.fft_size - self.hop;
        for (&sample, out) in input.iter().zip(output.iter_mut()) {
            self.input_fifo[self.rover] = sample;
            *out = self.output_fifo[self.rover - fifo_offset];
            self.rover += 1;

            if self.rover == self.fft_size {
                self.process_hop()?;
                self.rover = fifo_offset;
            }
        }
        Ok(())
    }

    fn process_hop(&mut self) -> Result<(), ShiftError> {
        let frame = self.analyzer.analyze(&self.input_fifo)?;
        let path = self
            .shifter
            .process_frame(&frame, self.pitch_ratio, &mut self.spectrum)?;
        self.resynth.synthesize(&self.spectrum, &mut self.output_fifo)?;
        self.input_fifo.copy_within(self.hop.., 0);
        self.last_path = Some(path);
        Ok(())
    }
}
