//! One-pole parameter smoothing.
//!
//! Targets are shared by every channel; each channel keeps its own live
//! values and update countdown in a [`SmoothingState`]. Live values move
//! toward their targets once every `update_interval` samples, with a step
//! coefficient chosen so that a change settles to within 1/e after the
//! response time.

use super::{DEFAULT_RESPONSE_TIME_MS, DEFAULT_UPDATE_INTERVAL};

/// Live values closer than this to their target snap onto it.
const SNAP_DISTANCE: f64 = 1e-6;

/// Shared smoothing targets and timing.
#[derive(Debug, Clone)]
pub struct ParameterSmoother {
    targets: Vec<f64>,
    update_interval: usize,
    response_time_ms: f32,
    sample_rate: f64,
    coefficient: f64,
}

/// Per-channel smoothing progress.
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothingState {
    live: Vec<f64>,
    countdown: usize,
}

impl SmoothingState {
    /// Current (smoothed) parameter values.
    pub fn live(&self) -> &[f64] {
        &self.live
    }

    /// Move every live value straight to its target.
    pub fn jump_to(&mut self, targets: &[f64]) {
        self.live.copy_from_slice(targets);
    }
}

impl ParameterSmoother {
    /// Create a smoother whose targets start at `initial`.
    pub fn new(initial: Vec<f64>) -> Self {
        let mut smoother = Self {
            targets: initial,
            update_interval: DEFAULT_UPDATE_INTERVAL,
            response_time_ms: DEFAULT_RESPONSE_TIME_MS,
            sample_rate: crate::DEFAULT_SAMPLE_RATE,
            coefficient: 1.0,
        };
        smoother.update_coefficient();
        smoother
    }

    /// Fresh per-channel state, already settled on the current targets.
    pub fn state(&self) -> SmoothingState {
        SmoothingState {
            live: self.targets.clone(),
            countdown: 0,
        }
    }

    pub fn prepare(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
        self.update_coefficient();
    }

    pub fn targets(&self) -> &[f64] {
        &self.targets
    }

    /// Replace the targets. Extra values beyond the parameter count are ignored.
    pub fn set_targets(&mut self, values: &[f64]) {
        let n = self.targets.len().min(values.len());
        self.targets[..n].copy_from_slice(&values[..n]);
    }

    pub fn update_interval(&self) -> usize {
        self.update_interval
    }

    /// Samples between smoothing steps. Zero is treated as one.
    pub fn set_update_interval(&mut self, samples: usize) {
        self.update_interval = samples.max(1);
        self.update_coefficient();
    }

    pub fn response_time_ms(&self) -> f32 {
        self.response_time_ms
    }

    /// Time constant of the smoothing. Zero or negative means instant.
    pub fn set_response_time_ms(&mut self, milliseconds: f32) {
        self.response_time_ms = if milliseconds.is_finite() {
            milliseconds.max(0.0)
        } else {
            0.0
        };
        self.update_coefficient();
    }

    /// Fraction of the remaining distance covered per smoothing step.
    pub fn coefficient(&self) -> f64 {
        self.coefficient
    }

    fn update_coefficient(&mut self) {
        let tau_samples = f64::from(self.response_time_ms) * 1e-3 * self.sample_rate;
        self.coefficient = if tau_samples > 0.0 {
            1.0 - (-(self.update_interval as f64) / tau_samples).exp()
        } else {
            1.0
        };
    }

    /// Advance one sample. Returns true when any live value moved.
    pub fn tick(&self, state: &mut SmoothingState) -> bool {
        if state.countdown > self.update_interval {
            state.countdown = self.update_interval;
        }
        if state.countdown > 0 {
            state.countdown -= 1;
            return false;
        }
        state.countdown = self.update_interval - 1;

        let mut changed = false;
        for (live, &target) in state.live.iter_mut().zip(&self.targets) {
            if *live == target {
                continue;
            }
            *live += self.coefficient * (target - *live);
            if (target - *live).abs() < SNAP_DISTANCE {
                *live = target;
            }
            changed = true;
        }
        changed
    }
}
