//! The MNA-backed processing engine.

use std::f64::consts::PI;

use log::{debug, info, trace, warn};

use crate::circuit::CircuitLayout;
use crate::components::taper::clamp_normalized;
use crate::error::{CircuitError, Result};
use crate::processor::{CircuitEngine, CircuitProcessor};

use super::mna::MnaMatrix;
use super::netlist::{Companion, Junctions, Netlist, StampInputs};
use super::newton::NewtonRaphson;
use super::smoothing::{ParameterSmoother, SmoothingState};
use super::{
    CONVERGENCE_TOLERANCE, DC_MAX_ITERATIONS, DEFAULT_DC_BLOCKER_CUTOFF,
    DEFAULT_RESPONSE_TIME_MS, DEFAULT_UPDATE_INTERVAL, MAX_ITERATIONS,
};

/// Which credentials an engine accepts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LicensePolicy {
    /// Any credential is accepted.
    #[default]
    Unrestricted,
    /// Only this exact key is accepted.
    Key(String),
}

impl LicensePolicy {
    pub fn accepts(&self, license: &str) -> bool {
        match self {
            LicensePolicy::Unrestricted => true,
            LicensePolicy::Key(key) => key == license,
        }
    }
}

/// Configuration for the engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum Newton-Raphson iterations per sample.
    pub max_iterations: usize,
    /// Convergence tolerance for Newton-Raphson (volts).
    pub tolerance: f64,
    /// Maximum Newton-Raphson iterations for the DC operating point.
    pub dc_max_iterations: usize,
    /// Number of independent channels allocated by `prepare`.
    pub num_channels: usize,
    /// Cutoff of the output DC blocker in Hz.
    pub dc_blocker_cutoff: f64,
    /// Initial number of samples between smoothing steps.
    pub update_interval: usize,
    /// Initial smoothing response time in milliseconds.
    pub response_time_ms: f32,
    /// Credentials accepted by `authenticate_with_license`.
    pub license: LicensePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_iterations: MAX_ITERATIONS,
            tolerance: CONVERGENCE_TOLERANCE,
            dc_max_iterations: DC_MAX_ITERATIONS,
            num_channels: 2,
            dc_blocker_cutoff: DEFAULT_DC_BLOCKER_CUTOFF,
            update_interval: DEFAULT_UPDATE_INTERVAL,
            response_time_ms: DEFAULT_RESPONSE_TIME_MS,
            license: LicensePolicy::Unrestricted,
        }
    }
}

impl EngineConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum Newton-Raphson iterations.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the convergence tolerance (in volts).
    ///
    /// Higher tolerance = faster convergence but less accuracy.
    /// - 1e-6 (default): Very precise, may need more iterations
    /// - 1e-4: Good balance for most audio applications
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_dc_max_iterations(mut self, dc_max_iterations: usize) -> Self {
        self.dc_max_iterations = dc_max_iterations;
        self
    }

    /// Set how many channels `prepare` allocates state for (at least one).
    pub fn with_num_channels(mut self, num_channels: usize) -> Self {
        self.num_channels = num_channels.max(1);
        self
    }

    pub fn with_dc_blocker_cutoff(mut self, hz: f64) -> Self {
        self.dc_blocker_cutoff = hz;
        self
    }

    pub fn with_update_interval(mut self, samples: usize) -> Self {
        self.update_interval = samples;
        self
    }

    pub fn with_response_time_ms(mut self, milliseconds: f32) -> Self {
        self.response_time_ms = milliseconds;
        self
    }

    pub fn with_license(mut self, license: LicensePolicy) -> Self {
        self.license = license;
        self
    }
}

/// First-order DC blocker: y[n] = x[n] - x[n-1] + R * y[n-1].
#[derive(Debug, Clone)]
struct DcBlocker {
    r: f64,
    x1: f64,
    y1: f64,
}

impl DcBlocker {
    fn new(cutoff: f64, sample_rate: f64) -> Self {
        Self {
            r: (-2.0 * PI * cutoff.max(0.0) / sample_rate).exp(),
            x1: 0.0,
            y1: 0.0,
        }
    }

    /// Start settled on a constant input level.
    fn settle(&mut self, level: f64) {
        self.x1 = level;
        self.y1 = 0.0;
    }

    fn process(&mut self, x: f64) -> f64 {
        let y = x - self.x1 + self.r * self.y1;
        self.x1 = x;
        self.y1 = y;
        y
    }
}

/// Everything one channel needs to run independently.
#[derive(Debug, Clone)]
struct ChannelState {
    matrix: MnaMatrix,
    newton: NewtonRaphson,
    companions: Vec<Companion>,
    junctions: Junctions,
    smoothing: SmoothingState,
    /// Conductance of every variable leg at the live parameter values
    legs: Vec<f64>,
    dc_blocker: DcBlocker,
    /// Set when the linear system matrix must be factored again
    refactor: bool,
}

impl ChannelState {
    fn new(
        netlist: &Netlist,
        smoother: &ParameterSmoother,
        config: &EngineConfig,
        sample_rate: f64,
    ) -> Self {
        let mut state = Self {
            matrix: MnaMatrix::new(netlist.size),
            newton: NewtonRaphson::with_config(netlist.size, config.max_iterations, config.tolerance),
            companions: vec![Companion::default(); netlist.num_capacitors()],
            junctions: netlist.junctions(),
            smoothing: smoother.state(),
            legs: vec![0.0; netlist.legs.len()],
            dc_blocker: DcBlocker::new(config.dc_blocker_cutoff, sample_rate),
            refactor: true,
        };
        state.refresh_legs(netlist);
        state
    }

    fn refresh_legs(&mut self, netlist: &Netlist) {
        netlist.leg_conductances(self.smoothing.live(), &mut self.legs);
        self.refactor = true;
    }

    /// Find the DC operating point (capacitors open, input at 0 V) and
    /// start every piece of state from it.
    fn settle_dc(&mut self, netlist: &Netlist, config: &EngineConfig) -> Result<usize> {
        let mut newton = NewtonRaphson::with_config(netlist.size, config.dc_max_iterations, config.tolerance);
        let Self {
            matrix,
            junctions,
            legs,
            ..
        } = self;
        let inputs = StampInputs {
            input: 0.0,
            legs: legs.as_slice(),
            companions: None,
        };
        let result = newton.solve(matrix, netlist.is_nonlinear(), true, |m| {
            netlist.stamp(m, &inputs, junctions)
        });
        self.refactor = true;

        match result {
            Ok(iterations) => {
                netlist.settle_companions(&self.matrix, &mut self.companions);
                self.dc_blocker.settle(netlist.output(&self.matrix));
                Ok(iterations)
            }
            Err(e) => {
                self.matrix.reset_solution();
                self.junctions.reset();
                self.companions.fill(Companion::default());
                self.dc_blocker.settle(0.0);
                Err(e)
            }
        }
    }

    /// Advance one sample.
    fn step(&mut self, netlist: &Netlist, smoother: &ParameterSmoother, dt: f64, x: f64) -> Result<f64> {
        if smoother.tick(&mut self.smoothing) {
            self.refresh_legs(netlist);
        }

        let Self {
            matrix,
            newton,
            companions,
            junctions,
            legs,
            dc_blocker,
            refactor,
            ..
        } = self;
        let inputs = StampInputs {
            input: x,
            legs: legs.as_slice(),
            companions: Some((companions.as_slice(), dt)),
        };
        newton.solve(matrix, netlist.is_nonlinear(), *refactor, |m| {
            netlist.stamp(m, &inputs, junctions)
        })?;
        *refactor = false;

        netlist.update_companions(matrix, companions, dt);

        let y = netlist.output(matrix);
        Ok(if netlist.has_dc_blocker {
            dc_blocker.process(y)
        } else {
            y
        })
    }
}

/// Reference engine: a layout solved sample by sample with modified nodal
/// analysis.
///
/// State for `config.num_channels` channels is allocated in `prepare`; the
/// processing calls themselves never allocate.
#[derive(Debug, Clone)]
pub struct MnaEngine {
    netlist: Netlist,
    config: EngineConfig,
    smoother: ParameterSmoother,
    channels: Vec<ChannelState>,
    sample_rate: f64,
    dt: f64,
    buffer_size: usize,
    licensed: bool,
}

impl MnaEngine {
    /// Build an engine for the given layout with default configuration.
    pub fn new(layout: &CircuitLayout) -> Result<Self> {
        Self::with_config(layout, EngineConfig::default())
    }

    /// Build an engine with custom configuration.
    pub fn with_config(layout: &CircuitLayout, config: EngineConfig) -> Result<Self> {
        let netlist = Netlist::compile(layout)?;

        let mut smoother = ParameterSmoother::new(netlist.initial_parameters.clone());
        smoother.set_update_interval(config.update_interval);
        smoother.set_response_time_ms(config.response_time_ms);

        info!(
            "MNA engine: {} nodes, {} unknowns, {} parameters, {}",
            netlist.num_nodes,
            netlist.size,
            netlist.num_parameters,
            if netlist.is_nonlinear() { "nonlinear" } else { "linear" },
        );

        Ok(Self {
            netlist,
            config,
            smoother,
            channels: Vec::new(),
            sample_rate: 0.0,
            dt: 0.0,
            buffer_size: 0,
            licensed: false,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Whether `prepare` has been called.
    pub fn is_prepared(&self) -> bool {
        !self.channels.is_empty()
    }

    /// Sample rate given to the last `prepare` (0 before).
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Buffer size given to the last `prepare`.
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Number of parameters the layout reads.
    pub fn num_parameters(&self) -> usize {
        self.netlist.num_parameters
    }

    /// Current smoothing targets.
    pub fn target_parameters(&self) -> &[f64] {
        self.smoother.targets()
    }

    /// Live (smoothed) parameter values of one channel.
    pub fn live_parameters(&self, channel: usize) -> Option<&[f64]> {
        self.channels.get(channel).map(|c| c.smoothing.live())
    }

    /// Result of the last `authenticate_with_license`.
    pub fn is_licensed(&self) -> bool {
        self.licensed
    }

    fn check_channel(&self, channel: usize) -> Result<()> {
        if self.channels.is_empty() {
            return Err(CircuitError::NotPrepared);
        }
        if channel >= self.channels.len() {
            return Err(CircuitError::ChannelOutOfRange {
                channel,
                num_channels: self.channels.len(),
            });
        }
        Ok(())
    }

    /// Validate a parameter vector and return its clamped copy.
    fn clamp_parameters(&self, parameters: &[f64]) -> Result<Vec<f64>> {
        let required = self.netlist.num_parameters;
        if parameters.len() < required {
            return Err(CircuitError::MissingParameter {
                index: parameters.len(),
                provided: parameters.len(),
            });
        }
        if let Some((index, &value)) = parameters[..required]
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite())
        {
            return Err(CircuitError::InvalidParameterValue { index, value });
        }
        Ok(parameters.iter().copied().map(clamp_normalized).collect())
    }

    fn run_channel(&mut self, channel: usize, x: f64) -> Result<f64> {
        let Self {
            netlist,
            smoother,
            channels,
            dt,
            ..
        } = self;
        channels[channel].step(netlist, smoother, *dt, x)
    }
}

impl CircuitProcessor for MnaEngine {
    fn prepare(&mut self, sample_rate: f64, buffer_size: usize) -> Result<()> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(CircuitError::InvalidSampleRate { sample_rate });
        }

        self.sample_rate = sample_rate;
        self.dt = 1.0 / sample_rate;
        self.buffer_size = buffer_size;
        self.smoother.prepare(sample_rate);

        let mut channel = ChannelState::new(&self.netlist, &self.smoother, &self.config, sample_rate);
        match channel.settle_dc(&self.netlist, &self.config) {
            Ok(iterations) => debug!(
                "prepared at {} Hz, block {}, {} channels, DC point in {} iterations",
                sample_rate, buffer_size, self.config.num_channels, iterations
            ),
            Err(e) => warn!("DC operating point failed ({e}); starting from zero state"),
        }

        self.channels = vec![channel; self.config.num_channels.max(1)];
        Ok(())
    }

    fn process(&mut self, input: &[f32], output: &mut [f32], num_samples: usize, channel: usize) -> Result<()> {
        self.check_channel(channel)?;
        if input.len() < num_samples {
            return Err(CircuitError::BufferTooShort {
                required: num_samples,
                len: input.len(),
            });
        }
        if output.len() < num_samples {
            return Err(CircuitError::BufferTooShort {
                required: num_samples,
                len: output.len(),
            });
        }

        for (x, y) in input[..num_samples].iter().zip(&mut output[..num_samples]) {
            *y = self.run_channel(channel, f64::from(*x))? as f32;
        }
        Ok(())
    }

    fn process_in_place(&mut self, buffer: &mut [f32], num_samples: usize, channel: usize) -> Result<()> {
        self.check_channel(channel)?;
        if buffer.len() < num_samples {
            return Err(CircuitError::BufferTooShort {
                required: num_samples,
                len: buffer.len(),
            });
        }

        for sample in &mut buffer[..num_samples] {
            *sample = self.run_channel(channel, f64::from(*sample))? as f32;
        }
        Ok(())
    }

    fn process_sample(&mut self, sample: f32, channel: usize) -> Result<f32> {
        self.check_channel(channel)?;
        Ok(self.run_channel(channel, f64::from(sample))? as f32)
    }

    fn set_parameters_no_smoothing(&mut self, parameters: Vec<f64>) -> Result<Vec<f64>> {
        let applied = self.clamp_parameters(&parameters)?;
        trace!("parameters (immediate): {:?}", applied);

        self.smoother.set_targets(&applied);
        for channel in &mut self.channels {
            channel.smoothing.jump_to(self.smoother.targets());
            channel.refresh_legs(&self.netlist);
        }
        Ok(applied)
    }

    fn set_parameters_with_smoothing(&mut self, parameters: Vec<f64>) -> Result<Vec<f64>> {
        let applied = self.clamp_parameters(&parameters)?;
        trace!("parameters (smoothed): {:?}", applied);

        self.smoother.set_targets(&applied);
        Ok(applied)
    }

    fn set_parameter_update_interval_in_samples(&mut self, samples: usize) {
        self.smoother.set_update_interval(samples);
    }

    fn set_smooth_response_time_milliseconds(&mut self, milliseconds: f32) {
        self.smoother.set_response_time_ms(milliseconds);
    }

    fn authenticate_with_license(&mut self, license: &str) -> bool {
        self.licensed = self.config.license.accepts(license);
        self.licensed
    }
}

impl CircuitEngine for MnaEngine {
    fn from_layout(layout: &CircuitLayout) -> Result<Self> {
        Self::new(layout)
    }
}
