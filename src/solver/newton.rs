//! Newton-Raphson iteration for nonlinear circuits.

use super::mna::MnaMatrix;
use super::{CONVERGENCE_TOLERANCE, MAX_ITERATIONS};
use crate::error::{CircuitError, Result};

/// Newton-Raphson solver for nonlinear circuits.
#[derive(Debug, Clone)]
pub struct NewtonRaphson {
    /// Maximum iterations
    pub max_iterations: usize,
    /// Convergence tolerance
    pub tolerance: f64,
    /// Previous solution for convergence check
    x_prev: Vec<f64>,
}

impl NewtonRaphson {
    /// Create a solver for systems of dimension `size` with default limits.
    pub fn new(size: usize) -> Self {
        Self::with_config(size, MAX_ITERATIONS, CONVERGENCE_TOLERANCE)
    }

    /// Create a solver with custom iteration limit and tolerance.
    pub fn with_config(size: usize, max_iterations: usize, tolerance: f64) -> Self {
        Self {
            max_iterations: max_iterations.max(1),
            tolerance,
            x_prev: vec![0.0; size],
        }
    }

    /// Solve the system.
    ///
    /// `assemble` stamps every element into a cleared matrix, linearizing
    /// nonlinear elements around the current `matrix.x`. A linear system is
    /// solved once, and only refactored when `refactor` is set (the LU of an
    /// unchanged matrix is reused).
    ///
    /// Returns the number of iterations used.
    pub fn solve<F>(
        &mut self,
        matrix: &mut MnaMatrix,
        nonlinear: bool,
        refactor: bool,
        mut assemble: F,
    ) -> Result<usize>
    where
        F: FnMut(&mut MnaMatrix),
    {
        if !nonlinear {
            matrix.clear();
            assemble(matrix);
            if refactor {
                matrix.factor()?;
            }
            matrix.solve()?;
            return Ok(1);
        }

        // Use previous solution as initial guess
        self.x_prev.copy_from_slice(&matrix.x);

        for iter in 0..self.max_iterations {
            matrix.clear();
            assemble(matrix);
            matrix.factor()?;
            matrix.solve()?;

            if self.residual(matrix) < self.tolerance {
                return Ok(iter + 1);
            }

            self.x_prev.copy_from_slice(&matrix.x);
        }

        Err(CircuitError::convergence_failure(
            self.max_iterations,
            self.residual(matrix),
        ))
    }

    /// Largest change between the last two iterates.
    fn residual(&self, matrix: &MnaMatrix) -> f64 {
        matrix
            .x
            .iter()
            .zip(&self.x_prev)
            .map(|(x, prev)| (x - prev).abs())
            .fold(0.0, f64::max)
    }
}
