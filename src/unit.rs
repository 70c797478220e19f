//! A circuit layout bound to the engine that runs it.

use crate::circuit::CircuitLayout;
use crate::error::Result;
use crate::processor::{CircuitEngine, CircuitProcessor};
use crate::solver::{EngineConfig, MnaEngine};

/// One processing stage: a layout and its engine.
///
/// The unit owns both exclusively. Every processing call is forwarded to
/// the engine unchanged; the layout is kept for inspection and is never
/// modified by processing.
#[derive(Debug, Clone)]
pub struct CircuitUnit<E = MnaEngine> {
    layout: CircuitLayout,
    engine: E,
}

impl CircuitUnit<MnaEngine> {
    /// Build a unit around the reference engine.
    pub fn new(layout: CircuitLayout) -> Result<Self> {
        Self::build(layout)
    }

    /// Build a unit around the reference engine with custom configuration.
    pub fn with_config(layout: CircuitLayout, config: EngineConfig) -> Result<Self> {
        let engine = MnaEngine::with_config(&layout, config)?;
        Ok(Self::with_engine(layout, engine))
    }
}

impl<E: CircuitEngine> CircuitUnit<E> {
    /// Build a unit around any engine type.
    pub fn build(layout: CircuitLayout) -> Result<Self> {
        let engine = E::from_layout(&layout)?;
        Ok(Self::with_engine(layout, engine))
    }

    /// Pair a layout with an engine that was already built for it.
    pub fn with_engine(layout: CircuitLayout, engine: E) -> Self {
        Self { layout, engine }
    }

    pub fn layout(&self) -> &CircuitLayout {
        &self.layout
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Output tag copied from the layout.
    pub fn output_tag(&self) -> f32 {
        self.layout.output_tag
    }
}

impl<E: CircuitEngine> CircuitProcessor for CircuitUnit<E> {
    fn prepare(&mut self, sample_rate: f64, buffer_size: usize) -> Result<()> {
        self.engine.prepare(sample_rate, buffer_size)
    }

    fn process(&mut self, input: &[f32], output: &mut [f32], num_samples: usize, channel: usize) -> Result<()> {
        self.engine.process(input, output, num_samples, channel)
    }

    fn process_in_place(&mut self, buffer: &mut [f32], num_samples: usize, channel: usize) -> Result<()> {
        self.engine.process_in_place(buffer, num_samples, channel)
    }

    fn process_sample(&mut self, sample: f32, channel: usize) -> Result<f32> {
        self.engine.process_sample(sample, channel)
    }

    fn set_parameters_no_smoothing(&mut self, parameters: Vec<f64>) -> Result<Vec<f64>> {
        self.engine.set_parameters_no_smoothing(parameters)
    }

    fn set_parameters_with_smoothing(&mut self, parameters: Vec<f64>) -> Result<Vec<f64>> {
        self.engine.set_parameters_with_smoothing(parameters)
    }

    fn set_parameter_update_interval_in_samples(&mut self, samples: usize) {
        self.engine.set_parameter_update_interval_in_samples(samples)
    }

    fn set_smooth_response_time_milliseconds(&mut self, milliseconds: f32) {
        self.engine.set_smooth_response_time_milliseconds(milliseconds)
    }

    fn authenticate_with_license(&mut self, license: &str) -> bool {
        self.engine.authenticate_with_license(license)
    }
}
