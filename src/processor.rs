//! The processing contract shared by engines, units and chains.

use std::sync::{Arc, Mutex, PoisonError};

use crate::circuit::CircuitLayout;
use crate::error::Result;

/// Something that turns an input signal into an output signal under a set
/// of normalized parameters.
///
/// `prepare` must be called before the first `process*` call. Processing
/// calls are allocation-free after `prepare`.
pub trait CircuitProcessor {
    /// Configure for an audio format. Calling again reconfigures cleanly and
    /// discards previous smoothing and signal state.
    fn prepare(&mut self, sample_rate: f64, buffer_size: usize) -> Result<()>;

    /// Process `num_samples` samples of one channel from `input` into `output`.
    fn process(
        &mut self,
        input: &[f32],
        output: &mut [f32],
        num_samples: usize,
        channel: usize,
    ) -> Result<()>;

    /// Process `num_samples` samples of one channel, overwriting `buffer`.
    fn process_in_place(&mut self, buffer: &mut [f32], num_samples: usize, channel: usize) -> Result<()>;

    /// Process a single sample of one channel.
    fn process_sample(&mut self, sample: f32, channel: usize) -> Result<f32>;

    /// Apply parameters immediately and return the vector actually applied.
    fn set_parameters_no_smoothing(&mut self, parameters: Vec<f64>) -> Result<Vec<f64>>;

    /// Set smoothing targets and return the vector actually applied.
    fn set_parameters_with_smoothing(&mut self, parameters: Vec<f64>) -> Result<Vec<f64>>;

    /// Samples between successive smoothing steps.
    fn set_parameter_update_interval_in_samples(&mut self, samples: usize);

    /// Time constant of smoothed parameter changes.
    fn set_smooth_response_time_milliseconds(&mut self, milliseconds: f32);

    /// Whether `license` authorizes use. Processing is never gated on this.
    fn authenticate_with_license(&mut self, license: &str) -> bool;
}

/// An engine a processing unit can be built around.
pub trait CircuitEngine: CircuitProcessor + Clone + Send {
    /// Build an engine for a layout.
    fn from_layout(layout: &CircuitLayout) -> Result<Self>;
}

impl<P: CircuitProcessor + ?Sized> CircuitProcessor for Box<P> {
    fn prepare(&mut self, sample_rate: f64, buffer_size: usize) -> Result<()> {
        (**self).prepare(sample_rate, buffer_size)
    }

    fn process(&mut self, input: &[f32], output: &mut [f32], num_samples: usize, channel: usize) -> Result<()> {
        (**self).process(input, output, num_samples, channel)
    }

    fn process_in_place(&mut self, buffer: &mut [f32], num_samples: usize, channel: usize) -> Result<()> {
        (**self).process_in_place(buffer, num_samples, channel)
    }

    fn process_sample(&mut self, sample: f32, channel: usize) -> Result<f32> {
        (**self).process_sample(sample, channel)
    }

    fn set_parameters_no_smoothing(&mut self, parameters: Vec<f64>) -> Result<Vec<f64>> {
        (**self).set_parameters_no_smoothing(parameters)
    }

    fn set_parameters_with_smoothing(&mut self, parameters: Vec<f64>) -> Result<Vec<f64>> {
        (**self).set_parameters_with_smoothing(parameters)
    }

    fn set_parameter_update_interval_in_samples(&mut self, samples: usize) {
        (**self).set_parameter_update_interval_in_samples(samples)
    }

    fn set_smooth_response_time_milliseconds(&mut self, milliseconds: f32) {
        (**self).set_smooth_response_time_milliseconds(milliseconds)
    }

    fn authenticate_with_license(&mut self, license: &str) -> bool {
        (**self).authenticate_with_license(license)
    }
}

/// A stage shared with other owners. Each call holds the lock for its
/// duration. A poisoned lock is recovered.
impl<P: CircuitProcessor + ?Sized> CircuitProcessor for Arc<Mutex<P>> {
    fn prepare(&mut self, sample_rate: f64, buffer_size: usize) -> Result<()> {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .prepare(sample_rate, buffer_size)
    }

    fn process(&mut self, input: &[f32], output: &mut [f32], num_samples: usize, channel: usize) -> Result<()> {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .process(input, output, num_samples, channel)
    }

    fn process_in_place(&mut self, buffer: &mut [f32], num_samples: usize, channel: usize) -> Result<()> {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .process_in_place(buffer, num_samples, channel)
    }

    fn process_sample(&mut self, sample: f32, channel: usize) -> Result<f32> {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .process_sample(sample, channel)
    }

    fn set_parameters_no_smoothing(&mut self, parameters: Vec<f64>) -> Result<Vec<f64>> {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .set_parameters_no_smoothing(parameters)
    }

    fn set_parameters_with_smoothing(&mut self, parameters: Vec<f64>) -> Result<Vec<f64>> {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .set_parameters_with_smoothing(parameters)
    }

    fn set_parameter_update_interval_in_samples(&mut self, samples: usize) {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .set_parameter_update_interval_in_samples(samples)
    }

    fn set_smooth_response_time_milliseconds(&mut self, milliseconds: f32) {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .set_smooth_response_time_milliseconds(milliseconds)
    }

    fn authenticate_with_license(&mut self, license: &str) -> bool {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .authenticate_with_license(license)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets;

    #[test]
    fn test_shared_stage_sees_one_state() {
        let unit = crate::CircuitUnit::new(presets::volume_pot(0.5).unwrap()).unwrap();
        let shared = Arc::new(Mutex::new(unit));
        let mut a = Arc::clone(&shared);
        let mut b = Arc::clone(&shared);

        a.prepare(48000.0, 32).unwrap();
        b.set_parameters_no_smoothing(vec![0.9]).unwrap();
        let y = a.process_sample(1.0, 0).unwrap();
        assert!((y - 0.9).abs() < 1e-3, "output {y}");
    }

    #[test]
    fn test_boxed_stage_forwards() {
        let unit = crate::CircuitUnit::new(presets::volume_pot(0.25).unwrap()).unwrap();
        let mut boxed: Box<dyn CircuitProcessor> = Box::new(unit);
        boxed.prepare(48000.0, 32).unwrap();
        let y = boxed.process_sample(1.0, 0).unwrap();
        assert!((y - 0.25).abs() < 1e-3, "output {y}");
    }
}
