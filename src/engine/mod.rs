pub mod params;

use crate::dsp::db_to_lin;
use crate::dsp::filter::{DEFAULT_Q, FilterTopology, OnePoleFilter};
use crate::dsp::shaper::shape_with_policy;
use crate::error::{EngineError, Result};
use params::Params;

/// Fixed channel topology of the engine.
pub const CHANNELS: usize = 2;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Prepared,
    Processing,
}

/// Waveshaper followed by a one-pole lowpass, driven one block at a time.
///
/// Everything `process` touches is allocated in [`BlockProcessor::prepare`];
/// the audio callback itself never allocates, locks or logs.
pub struct BlockProcessor {
    state: EngineState,
    sample_rate: f32,
    max_frames: usize,
    /// Shaped samples waiting for the filter, one buffer per channel.
    scratch: [Vec<f32>; CHANNELS],
    filter: OnePoleFilter,
    /// Cutoff the filter coefficient was last built from.
    last_cutoff: f32,
}

impl BlockProcessor {
    pub fn new() -> Result<Self> {
        let initial_cutoff = *params::CUTOFF_HZ.end();
        let filter = OnePoleFilter::new(
            CHANNELS,
            FilterTopology::FirstOrderLowpass,
            initial_cutoff,
            DEFAULT_Q,
        )?;

        Ok(Self {
            state: EngineState::Uninitialized,
            sample_rate: 0.0,
            max_frames: 0,
            scratch: [Vec::new(), Vec::new()],
            filter,
            last_cutoff: initial_cutoff,
        })
    }

    /// Size the engine for a sample rate and an upper bound on block length.
    ///
    /// Safe to call again when the host changes either value. Filter memory is
    /// cleared; the coefficient is rebuilt only when the rate differs.
    pub fn prepare(&mut self, sample_rate: f32, max_frames: u32) -> Result<()> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(EngineError::InvalidSampleRate(sample_rate));
        }
        if max_frames == 0 {
            return Err(EngineError::InvalidMaxFrames);
        }

        let max_frames = max_frames as usize;
        for buffer in &mut self.scratch {
            let additional = max_frames.saturating_sub(buffer.len());
            buffer
                .try_reserve_exact(additional)
                .map_err(|source| EngineError::Allocation {
                    what: "intermediate buffer",
                    source,
                })?;
            buffer.resize(max_frames, 0.0);
        }

        if sample_rate != self.sample_rate {
            self.filter.set_sample_rate(sample_rate);
        }
        self.sample_rate = sample_rate;
        self.max_frames = max_frames;
        self.filter.reset();
        self.state = EngineState::Prepared;

        Ok(())
    }

    /// Run one block: shape every sample into the intermediate buffer, then
    /// filter it into `output`.
    ///
    /// The block is validated before anything is written; on error `output`
    /// is left exactly as the caller passed it.
    pub fn process(
        &mut self,
        params: &Params,
        input: &[&[f32]],
        output: &mut [&mut [f32]],
    ) -> Result<()> {
        let frames = self.validate(input, output)?;

        let gain_in = db_to_lin(params.input_gain_db);
        let gain_out = db_to_lin(params.output_gain_db);

        for (scratch, src) in self.scratch.iter_mut().zip(input) {
            for (dst, &sample) in scratch[..frames].iter_mut().zip(src.iter()) {
                *dst = shape_with_policy(sample, gain_in, gain_out, params.shaping);
            }
        }

        if params.cutoff_hz != self.last_cutoff {
            self.filter.set_cutoff(params.cutoff_hz, self.sample_rate);
            self.last_cutoff = params.cutoff_hz;
        }

        let [left, right] = &self.scratch;
        self.filter
            .process(&[&left[..frames], &right[..frames]], output);

        self.state = EngineState::Processing;
        Ok(())
    }

    fn validate(&self, input: &[&[f32]], output: &[&mut [f32]]) -> Result<usize> {
        if self.state == EngineState::Uninitialized {
            return Err(EngineError::NotPrepared);
        }

        for count in [input.len(), output.len()] {
            if count != CHANNELS {
                return Err(EngineError::ChannelCount {
                    expected: CHANNELS,
                    actual: count,
                });
            }
        }

        let frames = input[0].len();
        let lengths = input
            .iter()
            .map(|c| c.len())
            .chain(output.iter().map(|c| c.len()));
        for len in lengths {
            if len != frames {
                return Err(EngineError::LengthMismatch {
                    expected: frames,
                    actual: len,
                });
            }
        }

        if frames > self.max_frames {
            return Err(EngineError::BlockTooLarge {
                frames,
                max_frames: self.max_frames,
            });
        }

        Ok(frames)
    }

    pub const fn state(&self) -> EngineState {
        self.state
    }

    pub const fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub const fn max_frames(&self) -> usize {
        self.max_frames
    }

    pub const fn filter(&self) -> &OnePoleFilter {
        &self.filter
    }

    /// Coefficient rebuilds so far, including those from `prepare` at a new rate.
    pub const fn coefficient_updates(&self) -> u64 {
        self.filter.coefficient_updates()
    }
}
