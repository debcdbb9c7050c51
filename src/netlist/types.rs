//! Core identifier types for the netlist.

use std::fmt;

/// A unique identifier for an electrical node.
/// Node 0 is always ground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The ground node (always id 0).
    pub const GROUND: NodeId = NodeId(0);

    /// Check if this is the ground node.
    pub fn is_ground(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ground() {
            write!(f, "GND")
        } else {
            write!(f, "N{}", self.0)
        }
    }
}

/// A stable handle for an element in the netlist.
///
/// Handles are assigned by [`Netlist::add_element`](super::Netlist::add_element)
/// and stay valid across removals of other elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub usize);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

/// Monotonic allocator for fresh node ids.
///
/// Node ids are never reused: merges retire ids without freeing them, so
/// the counter only moves forward. Ground (0) is reserved and never
/// handed out.
#[derive(Debug, Clone)]
pub struct NodeIdAllocator {
    next: usize,
}

impl NodeIdAllocator {
    /// Create an allocator whose first id is 1.
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Allocate a fresh node id.
    pub fn alloc(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }

    /// The id the next call to [`alloc`](Self::alloc) will return.
    pub fn peek(&self) -> NodeId {
        NodeId(self.next)
    }
}

impl Default for NodeIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ground_is_node_zero() {
        assert!(NodeId::GROUND.is_ground());
        assert!(!NodeId(1).is_ground());
        assert_eq!(format!("{}", NodeId::GROUND), "GND");
        assert_eq!(format!("{}", NodeId(3)), "N3");
    }

    #[test]
    fn test_allocator_never_yields_ground() {
        let mut alloc = NodeIdAllocator::new();
        assert_eq!(alloc.alloc(), NodeId(1));
        assert_eq!(alloc.alloc(), NodeId(2));
        assert_eq!(alloc.peek(), NodeId(3));
    }
}
