//! Ordered composition of processing stages.

use log::debug;

use crate::error::{CircuitError, Result};
use crate::processor::CircuitProcessor;

/// A boxed processing stage.
pub type Stage = Box<dyn CircuitProcessor + Send>;

/// An ordered list of stages run as one processor, each stage's output
/// feeding the next stage's input.
///
/// A chain is itself a [`CircuitProcessor`], so chains nest. It always has
/// at least one stage.
///
/// Parameter vectors are piped: every stage receives the vector returned by
/// the stage before it, so a stage can claim its leading entries and pass
/// the rest on.
pub struct CircuitChain {
    stages: Vec<Stage>,
}

impl std::fmt::Debug for CircuitChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircuitChain")
            .field("stages", &self.len())
            .finish()
    }
}

impl CircuitChain {
    /// Build a chain. An empty list is rejected.
    pub fn new(stages: Vec<Stage>) -> Result<Self> {
        if stages.is_empty() {
            return Err(CircuitError::EmptyChain);
        }
        Ok(Self { stages })
    }

    /// Start a chain with a single stage.
    pub fn single(stage: impl CircuitProcessor + Send + 'static) -> Self {
        Self {
            stages: vec![Box::new(stage) as Stage],
        }
    }

    /// Append a stage at the end.
    pub fn push(&mut self, stage: impl CircuitProcessor + Send + 'static) {
        self.stages.push(Box::new(stage));
    }

    /// Builder form of [`push`](Self::push).
    pub fn then(mut self, stage: impl CircuitProcessor + Send + 'static) -> Self {
        self.push(stage);
        self
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Always `false`; construction rejects an empty stage list.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl CircuitProcessor for CircuitChain {
    fn prepare(&mut self, sample_rate: f64, buffer_size: usize) -> Result<()> {
        debug!("preparing chain of {} stages", self.len());
        for stage in &mut self.stages {
            stage.prepare(sample_rate, buffer_size)?;
        }
        Ok(())
    }

    fn process(&mut self, input: &[f32], output: &mut [f32], num_samples: usize, channel: usize) -> Result<()> {
        let (first, rest) = self
            .stages
            .split_first_mut()
            .ok_or(CircuitError::EmptyChain)?;
        first.process(input, output, num_samples, channel)?;
        for stage in rest {
            stage.process_in_place(output, num_samples, channel)?;
        }
        Ok(())
    }

    fn process_in_place(&mut self, buffer: &mut [f32], num_samples: usize, channel: usize) -> Result<()> {
        for stage in &mut self.stages {
            stage.process_in_place(buffer, num_samples, channel)?;
        }
        Ok(())
    }

    fn process_sample(&mut self, sample: f32, channel: usize) -> Result<f32> {
        self.stages
            .iter_mut()
            .try_fold(sample, |x, stage| stage.process_sample(x, channel))
    }

    fn set_parameters_no_smoothing(&mut self, parameters: Vec<f64>) -> Result<Vec<f64>> {
        self.stages
            .iter_mut()
            .try_fold(parameters, |p, stage| stage.set_parameters_no_smoothing(p))
    }

    fn set_parameters_with_smoothing(&mut self, parameters: Vec<f64>) -> Result<Vec<f64>> {
        self.stages
            .iter_mut()
            .try_fold(parameters, |p, stage| stage.set_parameters_with_smoothing(p))
    }

    fn set_parameter_update_interval_in_samples(&mut self, samples: usize) {
        for stage in &mut self.stages {
            stage.set_parameter_update_interval_in_samples(samples);
        }
    }

    fn set_smooth_response_time_milliseconds(&mut self, milliseconds: f32) {
        for stage in &mut self.stages {
            stage.set_smooth_response_time_milliseconds(milliseconds);
        }
    }

    /// Every stage is asked; the chain is authorized only if all of them are.
    fn authenticate_with_license(&mut self, license: &str) -> bool {
        self.stages
            .iter_mut()
            .fold(true, |all, stage| stage.authenticate_with_license(license) && all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Gain stage that claims `claims` leading parameters.
    #[derive(Debug, Default)]
    struct Gain {
        gain: f32,
        claims: usize,
        received: Vec<f64>,
        interval: usize,
        asked: bool,
        accepts: bool,
    }

    impl Gain {
        fn new(gain: f32, claims: usize) -> Self {
            Self {
                gain,
                claims,
                accepts: true,
                ..Default::default()
            }
        }

        fn strip(&mut self, parameters: Vec<f64>) -> Result<Vec<f64>> {
            if parameters.len() < self.claims {
                return Err(CircuitError::MissingParameter {
                    index: parameters.len(),
                    provided: parameters.len(),
                });
            }
            self.received = parameters.clone();
            Ok(parameters[self.claims..].to_vec())
        }
    }

    impl CircuitProcessor for Gain {
        fn prepare(&mut self, _sample_rate: f64, _buffer_size: usize) -> Result<()> {
            Ok(())
        }

        fn process(&mut self, input: &[f32], output: &mut [f32], num_samples: usize, _channel: usize) -> Result<()> {
            for (y, x) in output[..num_samples].iter_mut().zip(&input[..num_samples]) {
                *y = self.gain * x;
            }
            Ok(())
        }

        fn process_in_place(&mut self, buffer: &mut [f32], num_samples: usize, _channel: usize) -> Result<()> {
            buffer[..num_samples].iter_mut().for_each(|x| *x *= self.gain);
            Ok(())
        }

        fn process_sample(&mut self, sample: f32, _channel: usize) -> Result<f32> {
            Ok(self.gain * sample)
        }

        fn set_parameters_no_smoothing(&mut self, parameters: Vec<f64>) -> Result<Vec<f64>> {
            self.strip(parameters)
        }

        fn set_parameters_with_smoothing(&mut self, parameters: Vec<f64>) -> Result<Vec<f64>> {
            self.strip(parameters)
        }

        fn set_parameter_update_interval_in_samples(&mut self, samples: usize) {
            self.interval = samples;
        }

        fn set_smooth_response_time_milliseconds(&mut self, _milliseconds: f32) {}

        fn authenticate_with_license(&mut self, _license: &str) -> bool {
            self.asked = true;
            self.accepts
        }
    }

    fn shared(gain: Gain) -> Arc<Mutex<Gain>> {
        Arc::new(Mutex::new(gain))
    }

    #[test]
    fn test_empty_chain_rejected() {
        assert_eq!(CircuitChain::new(Vec::new()).unwrap_err(), CircuitError::EmptyChain);
    }

    #[test]
    fn test_process_threads_stages() {
        let mut chain = CircuitChain::single(Gain::new(2.0, 0)).then(Gain::new(3.0, 0));
        assert_eq!(chain.len(), 2);
        assert!(!chain.is_empty());

        let mut out = [0.0f32; 3];
        chain.process(&[1.0, -1.0, 0.5], &mut out, 3, 0).unwrap();
        assert_eq!(out, [6.0, -6.0, 3.0]);

        let mut buf = [1.0f32, 2.0];
        chain.process_in_place(&mut buf, 2, 0).unwrap();
        assert_eq!(buf, [6.0, 12.0]);

        assert_eq!(chain.process_sample(0.25, 0).unwrap(), 1.5);
    }

    #[test]
    fn test_parameters_are_piped() {
        let a = shared(Gain::new(1.0, 1));
        let b = shared(Gain::new(1.0, 2));
        let mut chain = CircuitChain::single(Arc::clone(&a)).then(Arc::clone(&b));

        let rest = chain
            .set_parameters_no_smoothing(vec![0.1, 0.2, 0.3, 0.4])
            .unwrap();
        assert_eq!(rest, vec![0.4]);
        assert_eq!(a.lock().unwrap().received, vec![0.1, 0.2, 0.3, 0.4]);
        assert_eq!(b.lock().unwrap().received, vec![0.2, 0.3, 0.4]);
    }

    #[test]
    fn test_parameter_error_passes_through() {
        let mut chain = CircuitChain::single(Gain::new(1.0, 1)).then(Gain::new(1.0, 2));
        let err = chain.set_parameters_with_smoothing(vec![0.5, 0.5]).unwrap_err();
        assert_eq!(err, CircuitError::MissingParameter { index: 1, provided: 1 });
    }

    #[test]
    fn test_settings_broadcast() {
        let a = shared(Gain::new(1.0, 0));
        let b = shared(Gain::new(1.0, 0));
        let mut chain = CircuitChain::single(Arc::clone(&a)).then(Arc::clone(&b));
        chain.set_parameter_update_interval_in_samples(9);
        assert_eq!(a.lock().unwrap().interval, 9);
        assert_eq!(b.lock().unwrap().interval, 9);
    }

    #[test]
    fn test_license_requires_every_stage() {
        let first = shared(Gain {
            accepts: false,
            ..Gain::new(1.0, 0)
        });
        let last = shared(Gain::new(1.0, 0));
        let mut chain = CircuitChain::single(Arc::clone(&first)).then(Arc::clone(&last));

        assert!(!chain.authenticate_with_license("key"));
        // every stage was still asked
        assert!(first.lock().unwrap().asked);
        assert!(last.lock().unwrap().asked);

        first.lock().unwrap().accepts = true;
        assert!(chain.authenticate_with_license("key"));
    }

    #[test]
    fn test_nested_chain() {
        let inner = CircuitChain::single(Gain::new(2.0, 0)).then(Gain::new(2.0, 0));
        let mut outer = CircuitChain::single(inner).then(Gain::new(0.5, 0));
        assert_eq!(outer.process_sample(3.0, 0).unwrap(), 6.0);
    }
}
