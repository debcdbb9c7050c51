//! Netlist representation and node-identity bookkeeping.
//!
//! The [`Netlist`] holds the flat element collection and decides, wire by
//! wire, which terminals share an electrical node. The batch union-find
//! consolidation that the solver trusts at solve time lives in
//! [`union_find`].

mod graph;
mod types;
mod union_find;

pub use graph::Netlist;
pub use types::{ElementId, NodeId, NodeIdAllocator};
pub use union_find::UnionFind;
