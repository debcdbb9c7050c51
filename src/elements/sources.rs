//! Independent voltage and current sources.

use crate::netlist::{ElementId, NodeId};

/// An independent voltage source.
///
/// Voltage sources get an extra row/column in the MNA matrix for their
/// branch current. The source enforces: V(terminal 1) - V(terminal 2) = V.
#[derive(Debug, Clone)]
pub struct VoltageSource {
    pub id: ElementId,
    pub name: String,
    /// Terminal node ids; terminal 0 is the positive terminal.
    pub nodes: [Option<NodeId>; 2],
    /// Source voltage in volts.
    pub voltage: f64,
}

impl VoltageSource {
    /// Create a new, unconnected voltage source.
    pub fn new(name: impl Into<String>, voltage: f64) -> Self {
        Self {
            id: ElementId(0),
            name: name.into(),
            nodes: [None, None],
            voltage,
        }
    }
}

/// An independent current source.
///
/// Current sources add directly to the RHS vector; the defined current
/// flows from terminal 0 to terminal 1.
#[derive(Debug, Clone)]
pub struct CurrentSource {
    pub id: ElementId,
    pub name: String,
    /// Terminal node ids; current flows from terminal 0 to terminal 1.
    pub nodes: [Option<NodeId>; 2],
    /// Source current in amps.
    pub current: f64,
}

impl CurrentSource {
    /// Create a new, unconnected current source.
    pub fn new(name: impl Into<String>, current: f64) -> Self {
        Self {
            id: ElementId(0),
            name: name.into(),
            nodes: [None, None],
            current,
        }
    }
}
