//! MNA matrix assembly and solving.

use crate::error::{DcopError, Result};

use super::{PIVOT_TOLERANCE, RANK_TOLERANCE};

/// MNA matrix system Ax = z.
#[derive(Debug)]
pub struct MnaMatrix {
    /// System matrix A (row-major)
    pub a: Vec<f64>,
    /// Source vector z
    pub z: Vec<f64>,
    /// Solution vector x
    pub x: Vec<f64>,
    /// Matrix dimension
    pub size: usize,
    /// LU decomposition of A
    lu: Vec<f64>,
    /// Pivot indices for the LU decomposition
    pivots: Vec<usize>,
}

impl MnaMatrix {
    /// Create a zero-initialized system of the given dimension.
    pub fn new(size: usize) -> Self {
        Self {
            a: vec![0.0; size * size],
            z: vec![0.0; size],
            x: vec![0.0; size],
            size,
            lu: vec![0.0; size * size],
            pivots: vec![0; size],
        }
    }

    /// Get matrix element at (row, col).
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.a[row * self.size + col]
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
    /// Terms whose index is ground (`None`) are dropped.
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

    /// Stamp a current source between two nodes.
    /// The defined current flows from n1 to n2: it leaves n1 and enters n2.
    pub fn stamp_current_source(&mut self, n1: Option<usize>, n2: Option<usize>, current: f64) {
        if let Some(i) = n1 {
            self.add_source(i, -current);
        }
        if let Some(j) = n2 {
            self.add_source(j, current);
        }
    }

    /// Stamp a voltage source between two nodes with branch row `br`.
    /// KVL equation: V[n+] - V[n-] = E
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

    /// Numeric rank of A, via Gaussian elimination with partial pivoting
    /// on a scratch copy. Pivots below [`RANK_TOLERANCE`] do not count.
    pub fn rank(&self) -> usize {
        let n = self.size;
        let mut m = self.a.clone();
        let mut rank = 0;

        for col in 0..n {
            // Find the largest remaining pivot in this column.
            let mut max_val = 0.0f64;
            let mut max_row = rank;
            for row in rank..n {
                let val = m[row * n + col].abs();
                if val > max_val {
                    max_val = val;
                    max_row = row;
                }
            }

            if max_val < RANK_TOLERANCE {
                continue;
            }

            if max_row != rank {
                for j in 0..n {
                    m.swap(rank * n + j, max_row * n + j);
                }
            }

            let pivot = m[rank * n + col];
            for row in (rank + 1)..n {
                let factor = m[row * n + col] / pivot;
                if factor != 0.0 {
                    for j in col..n {
                        m[row * n + j] -= factor * m[rank * n + j];
                    }
                }
            }

            rank += 1;
            if rank == n {
                break;
            }
        }

        rank
    }

    /// Perform LU decomposition with partial pivoting.
    pub fn factor(&mut self) -> Result<()> {
        let n = self.size;
        self.lu.copy_from_slice(&self.a);

        for i in 0..n {
            self.pivots[i] = i;
        }

        for k in 0..n {
            let mut max_val = self.lu[k * n + k].abs();
            let mut max_row = k;

            for i in (k + 1)..n {
                let val = self.lu[i * n + k].abs();
                if val > max_val {
                    max_val = val;
                    max_row = i;
                }
            }

            if max_val < PIVOT_TOLERANCE {
                tracing::error!(column = k, size = n, "vanishing pivot during factorization");
                return Err(DcopError::degenerate(k, n));
            }

            if max_row != k {
                self.pivots.swap(k, max_row);
                for j in 0..n {
                    self.lu.swap(k * n + j, max_row * n + j);
                }
            }

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

    /// Solve the system using the pre-computed LU decomposition.
    pub fn solve(&mut self) -> Result<()> {
        let n = self.size;

        // Apply pivot permutation to z
        let b = self.z.clone();
        for i in 0..n {
            self.x[i] = b[self.pivots[i]];
        }

        // Forward substitution (L * y = Pb)
        for i in 0..n {
            for j in 0..i {
                self.x[i] -= self.lu[i * n + j] * self.x[j];
            }
        }

        // Back substitution (U * x = y)
        for i in (0..n).rev() {
            for j in (i + 1)..n {
                self.x[i] -= self.lu[i * n + j] * self.x[j];
            }
            let diag = self.lu[i * n + i];
            if diag.abs() < PIVOT_TOLERANCE {
                return Err(DcopError::degenerate(i, n));
            }
            self.x[i] /= diag;
        }

        Ok(())
    }

    /// Get the voltage at a dense node index; `None` is ground.
    pub fn voltage(&self, node: Option<usize>) -> f64 {
        match node {
            Some(i) => self.x[i],
            None => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_conductance_stamp_pattern() {
        let mut m = MnaMatrix::new(2);
        m.stamp_conductance(Some(0), Some(1), 0.5);
        assert_relative_eq!(m.get(0, 0), 0.5);
        assert_relative_eq!(m.get(1, 1), 0.5);
        assert_relative_eq!(m.get(0, 1), -0.5);
        assert_relative_eq!(m.get(1, 0), -0.5);
    }

    #[test]
    fn test_conductance_stamp_drops_ground_terms() {
        let mut m = MnaMatrix::new(1);
        m.stamp_conductance(Some(0), None, 2.0);
        assert_relative_eq!(m.get(0, 0), 2.0);
    }

    #[test]
    fn test_current_source_stamp_signs() {
        let mut m = MnaMatrix::new(2);
        m.stamp_current_source(Some(0), Some(1), 1.5);
        assert_relative_eq!(m.z[0], -1.5);
        assert_relative_eq!(m.z[1], 1.5);
    }

    #[test]
    fn test_factor_and_solve_small_system() {
        // 2x + y = 5, x + 3y = 10
        let mut m = MnaMatrix::new(2);
        m.add(0, 0, 2.0);
        m.add(0, 1, 1.0);
        m.add(1, 0, 1.0);
        m.add(1, 1, 3.0);
        m.z[0] = 5.0;
        m.z[1] = 10.0;

        m.factor().unwrap();
        m.solve().unwrap();
        assert_relative_eq!(m.x[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(m.x[1], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rank_of_full_rank_matrix() {
        let mut m = MnaMatrix::new(2);
        m.add(0, 0, 1.0);
        m.add(1, 1, 1.0);
        assert_eq!(m.rank(), 2);
    }

    #[test]
    fn test_rank_detects_dependent_rows() {
        // Second row is twice the first.
        let mut m = MnaMatrix::new(2);
        m.add(0, 0, 1.0);
        m.add(0, 1, 2.0);
        m.add(1, 0, 2.0);
        m.add(1, 1, 4.0);
        assert_eq!(m.rank(), 1);
    }

    #[test]
    fn test_factor_rejects_singular_matrix() {
        let mut m = MnaMatrix::new(2);
        m.add(0, 0, 1.0);
        m.add(0, 1, 1.0);
        m.add(1, 0, 1.0);
        m.add(1, 1, 1.0);
        assert!(m.factor().is_err());
    }

    #[test]
    fn test_zero_size_system_is_trivial() {
        let mut m = MnaMatrix::new(0);
        assert_eq!(m.rank(), 0);
        m.factor().unwrap();
        m.solve().unwrap();
        assert!(m.x.is_empty());
    }
}
