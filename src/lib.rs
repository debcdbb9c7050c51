//! # dcop_core
//!
//! A DC operating-point solver for resistive networks, built on Modified
//! Nodal Analysis (MNA).
//!
//! Given an arbitrary topology of resistors, independent voltage and
//! current sources, and zero-impedance wires, the engine produces every
//! node's voltage relative to ground and the branch current through every
//! voltage source.
//!
//! ## Architecture
//!
//! - [`netlist`] - element storage, the incremental node-identity
//!   assigner invoked as wires are drawn, and the union-find structure
//!   that consolidates wire equivalences at solve time
//! - [`elements`] - element models (resistors, sources, wires)
//! - [`solver`] - MNA matrix assembly, degeneracy detection and the
//!   direct dense solve
//! - [`error`] - the unified [`DcopError`] type
//!
//! ## Solve pipeline
//!
//! Each call to [`Netlist::solve`] runs, in order:
//!
//! 1. Precondition checks (non-empty netlist, no unconnected terminals,
//!    a ground reference exists)
//! 2. Union-find consolidation of all wire-implied node equivalences
//! 3. Dense column assignment for each distinct non-ground node group
//! 4. Floating-group detection
//! 5. Matrix/vector stamping
//! 6. Numeric rank check, then LU factorization and solve
//!
//! All per-solve state is rebuilt from scratch every call, so repeated
//! solves after arbitrary topology edits never read stale indices.
//!
//! ## Example
//!
//! ```
//! use dcop_core::{CurrentSource, Endpoint, Netlist, Resistor, Terminal};
//!
//! let mut net = Netlist::new();
//! let i1 = net.add_element(CurrentSource::new("I1", 2.0));
//! let r1 = net.add_element(Resistor::new("R1", 5.0));
//! net.add_wire("W1", Endpoint::pin(i1, Terminal::T1), Endpoint::Ground)?;
//! net.add_wire("W2", Endpoint::pin(i1, Terminal::T2), Endpoint::pin(r1, Terminal::T1))?;
//! net.add_wire("W3", Endpoint::pin(r1, Terminal::T2), Endpoint::Ground)?;
//!
//! let solution = net.solve()?;
//! assert!((solution.node_voltages[0] - 10.0).abs() < 1e-9);
//! # Ok::<(), dcop_core::DcopError>(())
//! ```

pub mod elements;
pub mod error;
pub mod netlist;
pub mod solver;

// Re-export main types for convenience
pub use elements::{CurrentSource, Element, Endpoint, Resistor, Terminal, VoltageSource, Wire};
pub use error::{DcopError, Result};
pub use netlist::{ElementId, Netlist, NodeId};
pub use solver::{solve, DcSolution};
