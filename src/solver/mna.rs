//! MNA matrix assembly and solving.

use crate::error::{CircuitError, Result};

/// MNA matrix system Ax = z.
///
/// All storage is allocated once in [`MnaMatrix::new`]; clearing, stamping,
/// factoring and solving never allocate.
#[derive(Debug, Clone)]
pub struct MnaMatrix {
    /// System matrix A (row-major)
    pub a: Vec<f64>,
    /// Source vector z
    pub z: Vec<f64>,
    /// Solution vector x
    pub x: Vec<f64>,
    /// Matrix dimension
    pub size: usize,
    /// LU decomposition of A (for efficient solving)
    lu: Vec<f64>,
    /// Pivot indices for LU decomposition
    pivots: Vec<usize>,
    /// Permuted right-hand side
    scratch: Vec<f64>,
}

impl MnaMatrix {
    /// Create a zeroed system of the given dimension.
    pub fn new(size: usize) -> Self {
        Self {
            a: vec![0.0; size * size],
            z: vec![0.0; size],
            x: vec![0.0; size],
            size,
            lu: vec![0.0; size * size],
            pivots: vec![0; size],
            scratch: vec![0.0; size],
        }
    }

    /// Clear the matrix and source vector to zero. The solution is kept as
    /// the starting point for the next Newton-Raphson step.
    pub fn clear(&mut self) {
        self.a.fill(0.0);
        self.z.fill(0.0);
    }

    /// Add to matrix element at (row, col).
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        self.a[row * self.size + col] += value;
    }

    /// Add to source vector element.
    pub fn add_source(&mut self, row: usize, value: f64) {
        self.z[row] += value;
    }

    /// Stamp a conductance between two nodes.
    /// For a conductance G between nodes n1 and n2:
    ///   A[n1,n1] += G
    ///   A[n2,n2] += G
    ///   A[n1,n2] -= G
    ///   A[n2,n1] -= G
    pub fn stamp_conductance(&mut self, n1: Option<usize>, n2: Option<usize>, g: f64) {
        if let Some(i) = n1 {
            self.add(i, i, g);
        }
        if let Some(j) = n2 {
            self.add(j, j, g);
        }
        if let (Some(i), Some(j)) = (n1, n2) {
            self.add(i, j, -g);
            self.add(j, i, -g);
        }
    }

    /// Stamp a voltage source between two nodes with branch current at index br.
    /// V[n+] - V[n-] = E
    pub fn stamp_voltage_source(
        &mut self,
        n_pos: Option<usize>,
        n_neg: Option<usize>,
        br: usize,
        voltage: f64,
    ) {
        if let Some(i) = n_pos {
            self.add(br, i, 1.0);
            self.add(i, br, 1.0);
        }
        if let Some(j) = n_neg {
            self.add(br, j, -1.0);
            self.add(j, br, -1.0);
        }
        self.z[br] = voltage;
    }

    /// Stamp a current source between two nodes.
    /// Current flows from n+ to n- through the source's external circuit,
    /// i.e. it leaves node n+ and enters node n-.
    pub fn stamp_current_source(&mut self, n_pos: Option<usize>, n_neg: Option<usize>, current: f64) {
        if let Some(i) = n_pos {
            self.add_source(i, -current);
        }
        if let Some(j) = n_neg {
            self.add_source(j, current);
        }
    }

    /// Stamp a VCCS (Voltage-Controlled Current Source).
    /// I = gm * (V[ctrl+] - V[ctrl-]), leaving out+ and entering out-.
    pub fn stamp_vccs(
        &mut self,
        n_out_pos: Option<usize>,
        n_out_neg: Option<usize>,
        n_ctrl_pos: Option<usize>,
        n_ctrl_neg: Option<usize>,
        gm: f64,
    ) {
        if let (Some(i), Some(k)) = (n_out_pos, n_ctrl_pos) {
            self.add(i, k, gm);
        }
        if let (Some(i), Some(l)) = (n_out_pos, n_ctrl_neg) {
            self.add(i, l, -gm);
        }
        if let (Some(j), Some(k)) = (n_out_neg, n_ctrl_pos) {
            self.add(j, k, -gm);
        }
        if let (Some(j), Some(l)) = (n_out_neg, n_ctrl_neg) {
            self.add(j, l, gm);
        }
    }

    /// Perform LU decomposition with partial pivoting.
    pub fn factor(&mut self) -> Result<()> {
        let n = self.size;
        self.lu.copy_from_slice(&self.a);

        for (i, p) in self.pivots.iter_mut().enumerate() {
            *p = i;
        }

        for k in 0..n {
            // Find pivot
            let mut max_val = self.lu[k * n + k].abs();
            let mut max_row = k;

            for i in (k + 1)..n {
                let val = self.lu[i * n + k].abs();
                if val > max_val {
                    max_val = val;
                    max_row = i;
                }
            }

            if max_val < 1e-15 {
                return Err(CircuitError::SingularMatrix);
            }

            if max_row != k {
                self.pivots.swap(k, max_row);
                for j in 0..n {
                    self.lu.swap(k * n + j, max_row * n + j);
                }
            }

            // Eliminate
            let pivot = self.lu[k * n + k];
            for i in (k + 1)..n {
                let factor = self.lu[i * n + k] / pivot;
                self.lu[i * n + k] = factor;
                for j in (k + 1)..n {
                    self.lu[i * n + j] -= factor * self.lu[k * n + j];
                }
            }
        }

        Ok(())
    }

    /// Solve for the current source vector using the last factorization.
    pub fn solve(&mut self) -> Result<()> {
        let n = self.size;

        // Apply pivot permutation to z
        for i in 0..n {
            self.scratch[i] = self.z[self.pivots[i]];
        }

        // Forward substitution (L * y = Pb)
        for i in 0..n {
            for j in 0..i {
                self.scratch[i] -= self.lu[i * n + j] * self.scratch[j];
            }
        }

        // Back substitution (U * x = y)
        for i in (0..n).rev() {
            for j in (i + 1)..n {
                self.scratch[i] -= self.lu[i * n + j] * self.scratch[j];
            }
            let diag = self.lu[i * n + i];
            if diag.abs() < 1e-15 {
                return Err(CircuitError::SingularMatrix);
            }
            self.scratch[i] /= diag;
        }

        self.x.copy_from_slice(&self.scratch);
        Ok(())
    }

    /// Get the voltage at a node.
    pub fn voltage(&self, node: Option<usize>) -> f64 {
        match node {
            Some(i) => self.x[i],
            None => 0.0, // Ground
        }
    }

    /// Reset the solution vector.
    pub fn reset_solution(&mut self) {
        self.x.fill(0.0);
    }
}
