use crate::error::{EngineError, Result};
use std::f32::consts::PI;

/// Q of the first-order family. A one-pole section has no resonance, the value
/// is carried so the filter reports the same shape as its design table.
pub const DEFAULT_Q: f32 = std::f32::consts::FRAC_1_SQRT_2;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum FilterTopology {
    #[default]
    FirstOrderLowpass,
}

/// Per-channel memory of the recurrence.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct FilterState {
    previous_output: f32,
    coefficient: f32,
}

impl FilterState {
    pub const fn previous_output(&self) -> f32 {
        self.previous_output
    }

    pub const fn coefficient(&self) -> f32 {
        self.coefficient
    }
}

/// One-pole lowpass, one state slot per channel.
///
/// `y[n] = c * x[n] + (1 - c) * y[n-1]`
///
/// `c` is the feed-forward gain of the bilinear-transform first-order lowpass:
/// with `K = tan(pi * fc / fs)`, `c = K / (1 + K)`. The feedback term
/// `1 - c = 1 / (1 + K)` then stays in `(0, 1)` for every cutoff below Nyquist,
/// so the step response rises monotonically and no frequency is boosted.
#[derive(Debug)]
pub struct OnePoleFilter {
    states: Vec<FilterState>,
    topology: FilterTopology,
    q: f32,
    cutoff_hz: f32,
    sample_rate: f32,
    coefficient_updates: u64,
}

impl OnePoleFilter {
    /// Lower bound on the cutoff so the tangent never collapses to zero.
    const MIN_CUTOFF_HZ: f32 = 0.1;
    /// Fraction of the sample rate the cutoff is held below. Past Nyquist the
    /// prewarped tangent changes sign.
    const MAX_CUTOFF_RATIO: f32 = 0.499;

    pub fn new(
        channel_count: usize,
        topology: FilterTopology,
        initial_cutoff_hz: f32,
        q: f32,
    ) -> Result<Self> {
        if channel_count == 0 {
            return Err(EngineError::NoChannels);
        }

        let mut states = Vec::new();
        states
            .try_reserve_exact(channel_count)
            .map_err(|source| EngineError::Allocation {
                what: "filter state",
                source,
            })?;
        // Passthrough until a sample rate arrives.
        states.resize(
            channel_count,
            FilterState {
                previous_output: 0.0,
                coefficient: 1.0,
            },
        );

        Ok(Self {
            states,
            topology,
            q,
            cutoff_hz: initial_cutoff_hz,
            sample_rate: 0.0,
            coefficient_updates: 0,
        })
    }

    pub fn compute_coefficient(cutoff_hz: f32, sample_rate: f32) -> f32 {
        if sample_rate.is_nan() || sample_rate <= 0.0 {
            return 1.0;
        }

        let fc = cutoff_hz
            .min(sample_rate * Self::MAX_CUTOFF_RATIO)
            .max(Self::MIN_CUTOFF_HZ);
        let k = (PI * fc / sample_rate).tan();
        k / (1.0 + k)
    }

    /// Store a new sample rate and rebuild the coefficient for the current cutoff.
    pub fn set_sample_rate(&mut self, rate_hz: f32) {
        self.set_cutoff(self.cutoff_hz, rate_hz);
    }

    pub fn set_cutoff(&mut self, cutoff_hz: f32, sample_rate: f32) {
        self.cutoff_hz = cutoff_hz;
        self.sample_rate = sample_rate;

        let coefficient = match self.topology {
            FilterTopology::FirstOrderLowpass => Self::compute_coefficient(cutoff_hz, sample_rate),
        };
        for state in &mut self.states {
            state.coefficient = coefficient;
        }
        self.coefficient_updates += 1;
    }

    /// Filter each input channel into the matching output channel.
    ///
    /// Channels beyond the shorter of `input`, `output` and the state count
    /// are left untouched, as are samples past the shorter slice of a pair.
    pub fn process(&mut self, input: &[&[f32]], output: &mut [&mut [f32]]) {
        for ((state, src), dst) in self.states.iter_mut().zip(input).zip(output.iter_mut()) {
            let c = state.coefficient;
            let mut acc = state.previous_output;
            for (y, &x) in dst.iter_mut().zip(src.iter()) {
                acc = c.mul_add(x, (1.0 - c) * acc);
                *y = acc;
            }
            state.previous_output = acc;
        }
    }

    /// Filter buffers that are both source and destination.
    pub fn process_in_place(&mut self, buffers: &mut [&mut [f32]]) {
        for (state, buffer) in self.states.iter_mut().zip(buffers.iter_mut()) {
            let c = state.coefficient;
            let mut acc = state.previous_output;
            for sample in buffer.iter_mut() {
                acc = c.mul_add(*sample, (1.0 - c) * acc);
                *sample = acc;
            }
            state.previous_output = acc;
        }
    }

    /// Clear the filter memory, keeping the coefficient.
    pub fn reset(&mut self) {
        for state in &mut self.states {
            state.previous_output = 0.0;
        }
    }

    pub fn coefficient(&self) -> f32 {
        self.states[0].coefficient
    }

    pub fn states(&self) -> &[FilterState] {
        &self.states
    }

    pub const fn cutoff(&self) -> f32 {
        self.cutoff_hz
    }

    pub const fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub const fn q(&self) -> f32 {
        self.q
    }

    pub const fn topology(&self) -> FilterTopology {
        self.topology
    }

    pub fn channel_count(&self) -> usize {
        self.states.len()
    }

    /// Number of coefficient rebuilds since construction.
    pub const fn coefficient_updates(&self) -> u64 {
        self.coefficient_updates
    }
}
