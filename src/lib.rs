//! # PointToPoint
//!
//! Circuit layouts as real-time audio processors.
//!
//! This library provides:
//! - A declarative layout (netlist) of numbered nodes and typed elements
//! - User-controlled variable resistors and potentiometers with a shared taper
//! - A processing unit that runs a layout sample by sample with smoothed
//!   parameter control
//! - Chains that compose units (and other chains) into one processor
//!
//! ## Architecture
//!
//! - [`circuit`] - Layout representation and validation
//! - [`components`] - Element catalog (resistors, capacitors, diodes, tubes, ...)
//! - [`solver`] - MNA engine, Newton-Raphson and parameter smoothing
//! - [`processor`] - The processing contract every stage implements
//! - [`unit`] / [`chain`] - Single stages and their composition
//! - [`presets`] - Ready-made layouts
//!
//! ## Usage
//!
//! ```no_run
//! use point_to_point::{presets, CircuitProcessor, CircuitUnit};
//!
//! let mut unit = CircuitUnit::new(presets::volume_pot(0.5)?)?;
//! unit.prepare(48000.0, 256)?;
//! unit.set_parameters_with_smoothing(vec![0.8])?;
//!
//! let input = vec![0.0f32; 256];
//! let mut output = vec![0.0f32; 256];
//! unit.process(&input, &mut output, 256, 0)?;
//! # Ok::<(), point_to_point::CircuitError>(())
//! ```
//!
//! ## Circuit Simulation Method
//!
//! The reference engine uses Modified Nodal Analysis (MNA). For each sample
//! dt = 1/sample_rate:
//!
//! 1. Assemble the system matrix A and source vector z
//! 2. Solve Ax = z for node voltages and branch currents
//! 3. For nonlinear elements, iterate using Newton-Raphson until convergence
//!
//! Capacitors are discretized using the trapezoidal rule.

pub mod chain;
pub mod circuit;
pub mod components;
pub mod error;
pub mod presets;
pub mod processor;
pub mod solver;
pub mod unit;

// Re-export main types for convenience
pub use chain::CircuitChain;
pub use circuit::CircuitLayout;
pub use error::{CircuitError, Result};
pub use processor::{CircuitEngine, CircuitProcessor};
pub use solver::{EngineConfig, LicensePolicy, MnaEngine};
pub use unit::CircuitUnit;

/// Default sample rate in Hz
pub const DEFAULT_SAMPLE_RATE: f64 = 48000.0;

/// Thermal voltage at room temperature (26 mV)
pub const THERMAL_VOLTAGE: f64 = 26.0e-3;
