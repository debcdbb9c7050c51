//! Error types for the dcop circuit solver.
//!
//! This module provides a unified error type [`DcopError`] covering every
//! failure the engine can report. Invalid circuit topologies are *expected*
//! outcomes: they travel through [`Result`] and never abort the process.

use thiserror::Error;

use crate::netlist::{ElementId, NodeId};

/// Result type alias using [`DcopError`].
pub type Result<T> = std::result::Result<T, DcopError>;

/// Unified error type for all dcop operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DcopError {
    // ============ Topology Errors ============
    /// The netlist has no elements at all.
    #[error("Netlist is empty - nothing to solve")]
    EmptyNetlist,

    /// A non-wire element has an unconnected terminal at solve time.
    #[error("Element '{name}' has an unconnected terminal")]
    IncompleteNetlist { name: String },

    /// No non-wire element references ground, so the system has no
    /// absolute reference potential.
    #[error("Circuit has no connection to ground (node 0)")]
    UngroundedCircuit,

    /// One or more node groups have no path to ground or to any
    /// voltage source; their absolute potential is undetermined.
    #[error("Floating node group(s) detected: {nodes:?}")]
    FloatingTopology { nodes: Vec<NodeId> },

    /// The assembled MNA matrix is numerically rank-deficient.
    #[error("Circuit matrix is singular or rank-deficient (rank {rank}/{size})")]
    DegenerateTopology { rank: usize, size: usize },

    // ============ Usage Errors ============
    /// An endpoint references an element that is not in the netlist.
    #[error("Element {id} not found in netlist")]
    ElementNotFound { id: ElementId },
}

impl DcopError {
    /// Create an incomplete-netlist error for the named element.
    pub fn incomplete(name: impl Into<String>) -> Self {
        Self::IncompleteNetlist { name: name.into() }
    }

    /// Create a degenerate-topology error from a rank check.
    pub fn degenerate(rank: usize, size: usize) -> Self {
        Self::DegenerateTopology { rank, size }
    }
}
