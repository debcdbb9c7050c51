//! Ideal wires and the endpoints they connect.

use std::fmt;

use crate::netlist::ElementId;

/// One of the two connection points of a two-terminal element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Terminal {
    /// Terminal 0 (positive terminal for sources).
    T1,
    /// Terminal 1.
    T2,
}

impl Terminal {
    /// Index of this terminal into an element's node pair.
    pub fn index(&self) -> usize {
        match self {
            Terminal::T1 => 0,
            Terminal::T2 => 1,
        }
    }
}

/// What a wire end is attached to: the ground rail, or a terminal of
/// another element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// The ground rail (node 0).
    Ground,
    /// A terminal of another element.
    Pin {
        element: ElementId,
        terminal: Terminal,
    },
}

impl Endpoint {
    /// Convenience constructor for a pin endpoint.
    pub fn pin(element: ElementId, terminal: Terminal) -> Self {
        Endpoint::Pin { element, terminal }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Ground => write!(f, "GND"),
            Endpoint::Pin { element, terminal } => {
                write!(f, "{}-T{}", element, terminal.index() + 1)
            }
        }
    }
}

/// A zero-impedance wire between two endpoints.
///
/// A wire stores no node pair of its own: its terminal nodes are derived
/// at query time by dereferencing the two endpoints it connects (see
/// [`Netlist::wire_nodes`](crate::netlist::Netlist::wire_nodes)). A cached
/// pair would have to be invalidated on every merge; deriving makes the
/// wire's electrical identity follow the elements it connects by
/// construction.
#[derive(Debug, Clone)]
pub struct Wire {
    pub id: ElementId,
    pub name: String,
    pub a: Endpoint,
    pub b: Endpoint,
}

impl Wire {
    /// Create a new wire between two endpoints.
    pub fn new(name: impl Into<String>, a: Endpoint, b: Endpoint) -> Self {
        Self {
            id: ElementId(0),
            name: name.into(),
            a,
            b,
        }
    }
}
