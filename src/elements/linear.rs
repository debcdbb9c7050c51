//! Linear passive components.

use crate::netlist::{ElementId, NodeId};

/// A resistor element.
///
/// Resistors stamp a conductance G = 1/R into the MNA matrix. A
/// near-zero resistance is clamped at stamp time rather than rejected;
/// see [`crate::solver::MIN_RESISTANCE`].
#[derive(Debug, Clone)]
pub struct Resistor {
    pub id: ElementId,
    pub name: String,
    /// Terminal node ids; `None` = unconnected.
    pub nodes: [Option<NodeId>; 2],
    /// Resistance in ohms.
    pub resistance: f64,
}

impl Resistor {
    /// Create a new, unconnected resistor.
    pub fn new(name: impl Into<String>, resistance: f64) -> Self {
        Self {
            id: ElementId(0),
            name: name.into(),
            nodes: [None, None],
            resistance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_resistor_is_unconnected() {
        let r = Resistor::new("R1", 1000.0);
        assert_eq!(r.nodes, [None, None]);
        assert!((r.resistance - 1000.0).abs() < 1e-12);
    }
}
