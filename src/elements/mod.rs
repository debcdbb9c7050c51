//! Circuit element models.
//!
//! This module provides the supported element kinds:
//! - Linear: Resistor
//! - Sources: Voltage Source, Current Source
//! - Topology: Wire (zero impedance, derived terminal nodes)
//!
//! Non-wire elements store their two terminal node ids directly; a wire
//! derives them from the endpoints it connects.

mod linear;
mod sources;
mod wire;

pub use linear::Resistor;
pub use sources::{CurrentSource, VoltageSource};
pub use wire::{Endpoint, Terminal, Wire};

use crate::netlist::{ElementId, NodeId};

/// A circuit element.
#[derive(Debug, Clone)]
pub enum Element {
    Resistor(Resistor),
    VoltageSource(VoltageSource),
    CurrentSource(CurrentSource),
    Wire(Wire),
}

impl Element {
    /// Get the element id.
    pub fn id(&self) -> ElementId {
        match self {
            Element::Resistor(r) => r.id,
            Element::VoltageSource(v) => v.id,
            Element::CurrentSource(i) => i.id,
            Element::Wire(w) => w.id,
        }
    }

    /// Get the element name.
    pub fn name(&self) -> &str {
        match self {
            Element::Resistor(r) => &r.name,
            Element::VoltageSource(v) => &v.name,
            Element::CurrentSource(i) => &i.name,
            Element::Wire(w) => &w.name,
        }
    }

    /// Get the element value (ohms, volts, amps; 0 for wires).
    pub fn value(&self) -> f64 {
        match self {
            Element::Resistor(r) => r.resistance,
            Element::VoltageSource(v) => v.voltage,
            Element::CurrentSource(i) => i.current,
            Element::Wire(_) => 0.0,
        }
    }

    /// Check if this element is a wire.
    pub fn is_wire(&self) -> bool {
        matches!(self, Element::Wire(_))
    }

    /// The stored terminal node pair, or `None` for wires (their nodes
    /// are derived, never stored).
    pub fn stored_nodes(&self) -> Option<&[Option<NodeId>; 2]> {
        match self {
            Element::Resistor(r) => Some(&r.nodes),
            Element::VoltageSource(v) => Some(&v.nodes),
            Element::CurrentSource(i) => Some(&i.nodes),
            Element::Wire(_) => None,
        }
    }

    /// Mutable access to the stored terminal node pair. Returns `None`
    /// for wires, which makes any attempt to set a wire's nodes a no-op.
    pub fn stored_nodes_mut(&mut self) -> Option<&mut [Option<NodeId>; 2]> {
        match self {
            Element::Resistor(r) => Some(&mut r.nodes),
            Element::VoltageSource(v) => Some(&mut v.nodes),
            Element::CurrentSource(i) => Some(&mut i.nodes),
            Element::Wire(_) => None,
        }
    }

    pub(crate) fn set_id(&mut self, id: ElementId) {
        match self {
            Element::Resistor(r) => r.id = id,
            Element::VoltageSource(v) => v.id = id,
            Element::CurrentSource(i) => i.id = id,
            Element::Wire(w) => w.id = id,
        }
    }
}

impl From<Resistor> for Element {
    fn from(r: Resistor) -> Self {
        Element::Resistor(r)
    }
}

impl From<VoltageSource> for Element {
    fn from(v: VoltageSource) -> Self {
        Element::VoltageSource(v)
    }
}

impl From<CurrentSource> for Element {
    fn from(i: CurrentSource) -> Self {
        Element::CurrentSource(i)
    }
}

impl From<Wire> for Element {
    fn from(w: Wire) -> Self {
        Element::Wire(w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_nodes_are_never_stored() {
        let mut e: Element = Wire::new("W1", Endpoint::Ground, Endpoint::Ground).into();
        assert!(e.is_wire());
        assert!(e.stored_nodes().is_none());
        assert!(e.stored_nodes_mut().is_none());
        assert_eq!(e.value(), 0.0);
    }
}
