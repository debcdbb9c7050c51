//! MNA (Modified Nodal Analysis) solver.
//!
//! This module assembles and solves the augmented system Ax = z where:
//! - x contains node voltages followed by voltage-source branch currents
//! - A is the conductance/coefficient matrix
//! - z is the source vector
//!
//! The matrix structure is:
//! ```text
//! [ G   B ] [ v ]   [ i ]
//! [ C   0 ] [ j ] = [ e ]
//! ```
//!
//! where G is the conductance matrix (node equations), B and C connect
//! voltage sources to nodes, v is the node-voltage vector, j the
//! voltage-source currents, i the per-node current-source sums and e the
//! voltage-source values.

mod dc;
mod mna;

pub use dc::{solve, DcSolution};
pub use mna::MnaMatrix;

/// Resistances below this magnitude are treated as degenerate.
pub const RESISTANCE_EPSILON: f64 = 1e-15;

/// Replacement resistance for degenerate resistors (ohms).
pub const MIN_RESISTANCE: f64 = 1e-12;

/// Pivots below this magnitude abort LU factorization.
pub const PIVOT_TOLERANCE: f64 = 1e-15;

/// Pivots below this magnitude do not count toward the numeric rank.
pub const RANK_TOLERANCE: f64 = 1e-13;
