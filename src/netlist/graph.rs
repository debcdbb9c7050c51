//! The netlist: flat element storage plus the incremental node-identity
//! assigner invoked as wires are drawn.

use std::collections::BTreeMap;

use tracing::debug;

use super::types::{ElementId, NodeId, NodeIdAllocator};
use crate::elements::{Element, Endpoint, Wire};
use crate::error::{DcopError, Result};

/// The flat collection of circuit elements.
///
/// The netlist owns the elements and the monotonic node-id counter. It
/// performs no topology validation on its own: callers are expected to
/// reject self-loops, same-element connections and duplicate wires before
/// calling [`connect`](Netlist::connect). All per-solve bookkeeping (the
/// union-find representative table, the dense node index) is rebuilt from
/// scratch inside [`solve`](crate::solver::solve) and never stored here.
#[derive(Debug, Default)]
pub struct Netlist {
    /// Elements keyed by stable id; iteration is id-ordered, which fixes
    /// the enumeration order of voltage sources during stamping.
    elements: BTreeMap<ElementId, Element>,
    next_element: usize,
    nodes: NodeIdAllocator,
}

impl Netlist {
    /// Create an empty netlist.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element, assigning it a stable id.
    pub fn add_element(&mut self, element: impl Into<Element>) -> ElementId {
        let id = ElementId(self.next_element);
        self.next_element += 1;
        let mut element = element.into();
        element.set_id(id);
        debug!(%id, name = element.name(), "added element");
        self.elements.insert(id, element);
        id
    }

    /// Remove an element. Wires referencing it keep their endpoints but
    /// derive them as unconnected from then on.
    pub fn remove_element(&mut self, id: ElementId) -> Option<Element> {
        let removed = self.elements.remove(&id);
        if let Some(ref e) = removed {
            debug!(%id, name = e.name(), "removed element");
        }
        removed
    }

    /// Look up an element by id.
    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    /// Look up an element by id, mutably.
    pub fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(&id)
    }

    /// Iterate over all elements in id order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }

    /// Number of elements in the netlist.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Check whether the netlist has no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Remove every element and reset the id counters.
    pub fn clear(&mut self) {
        self.elements.clear();
        self.next_element = 0;
        self.nodes = NodeIdAllocator::new();
        debug!("cleared netlist");
    }

    /// Current node id of an endpoint: ground reads as node 0, a pin
    /// reads its element's stored terminal id (`None` = unconnected).
    ///
    /// Returns [`DcopError::ElementNotFound`] if the pin's element is not
    /// in the netlist; `connect` with a dangling handle is caller misuse.
    pub fn endpoint_node(&self, endpoint: Endpoint) -> Result<Option<NodeId>> {
        match endpoint {
            Endpoint::Ground => Ok(Some(NodeId::GROUND)),
            Endpoint::Pin { element, terminal } => {
                let e = self
                    .elements
                    .get(&element)
                    .ok_or(DcopError::ElementNotFound { id: element })?;
                // Wires have no terminals of their own; a pin can only
                // target a non-wire element.
                Ok(e.stored_nodes().and_then(|nodes| nodes[terminal.index()]))
            }
        }
    }

    /// Derive a wire's terminal node pair from its endpoints.
    ///
    /// Nothing is cached: the pair always reflects the *current* node
    /// assignment of whatever the wire connects. An endpoint whose
    /// element has been removed derives as unconnected.
    pub fn wire_nodes(&self, wire: &Wire) -> [Option<NodeId>; 2] {
        [self.peek_endpoint(wire.a), self.peek_endpoint(wire.b)]
    }

    fn peek_endpoint(&self, endpoint: Endpoint) -> Option<NodeId> {
        match endpoint {
            Endpoint::Ground => Some(NodeId::GROUND),
            Endpoint::Pin { element, terminal } => self
                .elements
                .get(&element)?
                .stored_nodes()
                .and_then(|nodes| nodes[terminal.index()]),
        }
    }

    /// Terminal node pair of any element: stored for non-wires, derived
    /// for wires.
    pub fn terminal_nodes(&self, element: &Element) -> [Option<NodeId>; 2] {
        match element {
            Element::Wire(w) => self.wire_nodes(w),
            Element::Resistor(r) => r.nodes,
            Element::VoltageSource(v) => v.nodes,
            Element::CurrentSource(i) => i.nodes,
        }
    }

    /// Decide the shared node identity for a new wire connection between
    /// two endpoints, mutating stored terminal ids in place.
    ///
    /// Rules, in order:
    /// 1. both unconnected: allocate a fresh id and assign it to both;
    /// 2. exactly one unconnected: propagate the existing id;
    /// 3. both equal: no-op;
    /// 4. both different: rewrite every terminal holding the second id to
    ///    the first - unless either id is ground, in which case every
    ///    terminal holding *either* id becomes ground (ground absorbs any
    ///    group it touches).
    ///
    /// The caller has already rejected self-loops, same-element pairs and
    /// duplicate wires.
    pub fn connect(&mut self, a: Endpoint, b: Endpoint) -> Result<()> {
        let node_a = self.endpoint_node(a)?;
        let node_b = self.endpoint_node(b)?;

        match (node_a, node_b) {
            (None, None) => {
                let fresh = self.nodes.alloc();
                self.assign(a, fresh);
                self.assign(b, fresh);
                debug!(%a, %b, node = %fresh, "allocated fresh node");
            }
            (Some(n), None) => {
                self.assign(b, n);
                debug!(%b, node = %n, "propagated node");
            }
            (None, Some(n)) => {
                self.assign(a, n);
                debug!(%a, node = %n, "propagated node");
            }
            (Some(x), Some(y)) if x == y => {}
            (Some(x), Some(y)) => {
                if x.is_ground() || y.is_ground() {
                    self.rewrite(&[x, y], NodeId::GROUND);
                    debug!(%x, %y, "ground absorbed merged group");
                } else {
                    self.rewrite(&[y], x);
                    debug!(from = %y, into = %x, "merged nodes");
                }
            }
        }

        Ok(())
    }

    /// Connect two endpoints and record the wire element joining them.
    pub fn add_wire(
        &mut self,
        name: impl Into<String>,
        a: Endpoint,
        b: Endpoint,
    ) -> Result<ElementId> {
        self.connect(a, b)?;
        Ok(self.add_element(Wire::new(name, a, b)))
    }

    /// Write `node` into the terminal an endpoint names. Setting a wire's
    /// nodes (or a removed element's) is a no-op.
    fn assign(&mut self, endpoint: Endpoint, node: NodeId) {
        if let Endpoint::Pin { element, terminal } = endpoint {
            if let Some(nodes) = self
                .elements
                .get_mut(&element)
                .and_then(|e| e.stored_nodes_mut())
            {
                nodes[terminal.index()] = Some(node);
            }
        }
    }

    /// Rewrite every stored terminal holding any id in `from` to `to`.
    fn rewrite(&mut self, from: &[NodeId], to: NodeId) {
        for element in self.elements.values_mut() {
            if let Some(nodes) = element.stored_nodes_mut() {
                for slot in nodes.iter_mut() {
                    if let Some(n) = *slot {
                        if from.contains(&n) {
                            *slot = Some(to);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Resistor, Terminal, VoltageSource};

    fn pin(id: ElementId, t: Terminal) -> Endpoint {
        Endpoint::pin(id, t)
    }

    fn stored(net: &Netlist, id: ElementId) -> [Option<NodeId>; 2] {
        *net.element(id).unwrap().stored_nodes().unwrap()
    }

    #[test]
    fn test_fresh_allocation_for_two_unconnected_terminals() {
        let mut net = Netlist::new();
        let r1 = net.add_element(Resistor::new("R1", 1000.0));
        let r2 = net.add_element(Resistor::new("R2", 2000.0));

        net.add_wire("W1", pin(r1, Terminal::T2), pin(r2, Terminal::T1))
            .unwrap();

        let n = stored(&net, r1)[1].unwrap();
        assert!(!n.is_ground());
        assert_eq!(stored(&net, r2)[0], Some(n));
    }

    #[test]
    fn test_propagation_to_unconnected_terminal() {
        let mut net = Netlist::new();
        let r1 = net.add_element(Resistor::new("R1", 1000.0));
        let r2 = net.add_element(Resistor::new("R2", 2000.0));

        net.add_wire("W1", Endpoint::Ground, pin(r1, Terminal::T1))
            .unwrap();
        assert_eq!(stored(&net, r1)[0], Some(NodeId::GROUND));

        net.add_wire("W2", pin(r1, Terminal::T2), pin(r2, Terminal::T1))
            .unwrap();
        let shared = stored(&net, r1)[1].unwrap();
        assert_eq!(stored(&net, r2)[0], Some(shared));
    }

    #[test]
    fn test_connect_is_idempotent() {
        let mut net = Netlist::new();
        let r1 = net.add_element(Resistor::new("R1", 1000.0));
        let r2 = net.add_element(Resistor::new("R2", 2000.0));

        net.connect(pin(r1, Terminal::T2), pin(r2, Terminal::T1))
            .unwrap();
        let before = (stored(&net, r1), stored(&net, r2));

        // Repeating the same connection must not change any node id.
        net.connect(pin(r1, Terminal::T2), pin(r2, Terminal::T1))
            .unwrap();
        assert_eq!(before, (stored(&net, r1), stored(&net, r2)));
    }

    #[test]
    fn test_merge_rewrites_whole_netlist() {
        let mut net = Netlist::new();
        let r1 = net.add_element(Resistor::new("R1", 1.0));
        let r2 = net.add_element(Resistor::new("R2", 1.0));
        let r3 = net.add_element(Resistor::new("R3", 1.0));

        // Two separate groups: {R1.t2, R2.t1} and {R2.t2, R3.t1}.
        net.connect(pin(r1, Terminal::T2), pin(r2, Terminal::T1))
            .unwrap();
        net.connect(pin(r2, Terminal::T2), pin(r3, Terminal::T1))
            .unwrap();
        assert_ne!(stored(&net, r2)[0], stored(&net, r2)[1]);

        // Merging the groups rewrites every holder of the second id.
        net.connect(pin(r1, Terminal::T2), pin(r2, Terminal::T2))
            .unwrap();
        let n = stored(&net, r1)[1];
        assert_eq!(stored(&net, r2)[0], n);
        assert_eq!(stored(&net, r2)[1], n);
        assert_eq!(stored(&net, r3)[0], n);
    }

    #[test]
    fn test_ground_absorbs_merged_group() {
        let mut net = Netlist::new();
        let r1 = net.add_element(Resistor::new("R1", 1.0));
        let r2 = net.add_element(Resistor::new("R2", 1.0));

        net.connect(pin(r1, Terminal::T2), pin(r2, Terminal::T1))
            .unwrap();
        assert!(!stored(&net, r1)[1].unwrap().is_ground());

        // Wiring the shared node to ground rewrites every holder to 0.
        net.connect(pin(r2, Terminal::T1), Endpoint::Ground).unwrap();
        assert_eq!(stored(&net, r1)[1], Some(NodeId::GROUND));
        assert_eq!(stored(&net, r2)[0], Some(NodeId::GROUND));
    }

    #[test]
    fn test_union_order_independence() {
        // connect(A,B); connect(B,C) vs connect(A,C); connect(B,C) must
        // yield the same equivalence classes.
        let build = |order: &[(Terminal, Terminal, usize, usize)]| {
            let mut net = Netlist::new();
            let ids = [
                net.add_element(Resistor::new("R1", 1.0)),
                net.add_element(Resistor::new("R2", 1.0)),
                net.add_element(Resistor::new("R3", 1.0)),
            ];
            for &(ta, tb, ea, eb) in order {
                net.connect(pin(ids[ea], ta), pin(ids[eb], tb)).unwrap();
            }
            let class: Vec<_> = ids
                .iter()
                .map(|&id| stored(&net, id)[0])
                .collect();
            // All three terminal-1 slots must hold one identical id.
            assert!(class[0].is_some());
            assert!(class.iter().all(|n| *n == class[0]));
        };

        use Terminal::T1;
        build(&[(T1, T1, 0, 1), (T1, T1, 1, 2)]);
        build(&[(T1, T1, 0, 2), (T1, T1, 1, 2)]);
        build(&[(T1, T1, 1, 2), (T1, T1, 0, 1)]);
    }

    #[test]
    fn test_wire_nodes_follow_merges() {
        let mut net = Netlist::new();
        let r1 = net.add_element(Resistor::new("R1", 1.0));
        let v1 = net.add_element(VoltageSource::new("V1", 5.0));

        let w = net
            .add_wire("W1", pin(r1, Terminal::T1), pin(v1, Terminal::T1))
            .unwrap();

        // Merging the shared node into ground must be visible through the
        // wire's derived pair without touching the wire itself.
        net.connect(pin(r1, Terminal::T1), Endpoint::Ground).unwrap();
        let wire = match net.element(w).unwrap() {
            Element::Wire(wire) => wire.clone(),
            _ => unreachable!(),
        };
        assert_eq!(
            net.wire_nodes(&wire),
            [Some(NodeId::GROUND), Some(NodeId::GROUND)]
        );
    }

    #[test]
    fn test_dangling_wire_endpoint_derives_unconnected() {
        let mut net = Netlist::new();
        let r1 = net.add_element(Resistor::new("R1", 1.0));
        let r2 = net.add_element(Resistor::new("R2", 1.0));
        let w = net
            .add_wire("W1", pin(r1, Terminal::T2), pin(r2, Terminal::T1))
            .unwrap();

        net.remove_element(r2);
        let wire = match net.element(w).unwrap() {
            Element::Wire(wire) => wire.clone(),
            _ => unreachable!(),
        };
        let nodes = net.wire_nodes(&wire);
        assert!(nodes[0].is_some());
        assert_eq!(nodes[1], None);
    }

    #[test]
    fn test_connect_rejects_dangling_handle() {
        let mut net = Netlist::new();
        let r1 = net.add_element(Resistor::new("R1", 1.0));
        net.remove_element(r1);
        let err = net
            .connect(pin(r1, Terminal::T1), Endpoint::Ground)
            .unwrap_err();
        assert_eq!(err, DcopError::ElementNotFound { id: r1 });
    }

    #[test]
    fn test_clear_resets_counters() {
        let mut net = Netlist::new();
        let r1 = net.add_element(Resistor::new("R1", 1.0));
        net.connect(pin(r1, Terminal::T1), Endpoint::Ground).unwrap();
        net.clear();
        assert!(net.is_empty());
        let r = net.add_element(Resistor::new("R1", 1.0));
        assert_eq!(r, ElementId(0));
    }
}
