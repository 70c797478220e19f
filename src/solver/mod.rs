//! MNA (Modified Nodal Analysis) solver.
//!
//! This module provides the numerical engine behind every processing unit.
//!
//! ## Modified Nodal Analysis
//!
//! MNA assembles a system of equations Ax = z where:
//! - x contains node voltages and branch currents
//! - A is the conductance/coefficient matrix
//! - z is the source vector
//!
//! The matrix structure is:
//! ```text
//! [ G   B ] [ v ]   [ i ]
//! [ C   D ] [ j ] = [ e ]
//! ```
//!
//! where:
//! - G is the conductance matrix (node equations)
//! - B, C connect voltage sources to nodes
//! - D is 0 (ideal voltage sources)
//! - v is the vector of node voltages
//! - j is the vector of voltage source currents (the circuit input is one of them)
//! - i is the sum of current sources into each node
//! - e is the vector of voltage source values
//!
//! Capacitors use the trapezoidal companion model. Diodes, transistors and
//! triodes are linearized per Newton-Raphson iteration with junction
//! voltage limiting.

mod devices;
mod engine;
mod mna;
mod netlist;
mod newton;
mod smoothing;

pub use engine::{EngineConfig, LicensePolicy, MnaEngine};
pub use mna::MnaMatrix;
pub use newton::NewtonRaphson;
pub use smoothing::{ParameterSmoother, SmoothingState};

/// Convergence tolerance for Newton-Raphson iteration.
pub const CONVERGENCE_TOLERANCE: f64 = 1e-6;

/// Maximum Newton-Raphson iterations per time step.
pub const MAX_ITERATIONS: usize = 50;

/// Maximum Newton-Raphson iterations for the DC operating point.
pub const DC_MAX_ITERATIONS: usize = 200;

/// Minimum conductance from every node to ground, to prevent a singular matrix.
pub const MIN_CONDUCTANCE: f64 = 1e-12;

/// Default number of samples between smoothing steps.
pub const DEFAULT_UPDATE_INTERVAL: usize = 16;

/// Default smoothing response time in milliseconds.
pub const DEFAULT_RESPONSE_TIME_MS: f32 = 20.0;

/// Default DC blocker cutoff in Hz.
pub const DEFAULT_DC_BLOCKER_CUTOFF: f64 = 5.0;
