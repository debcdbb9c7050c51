//! DC operating-point solve pipeline.
//!
//! One call to [`solve`] runs the whole chain: precondition checks,
//! union-find consolidation of wire equivalences, dense node indexing,
//! degeneracy detection, matrix stamping and the linear solve. Nothing is
//! cached between calls; the netlist can be edited arbitrarily between
//! solves.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use tracing::{debug, error, warn};

use crate::elements::{Element, Resistor};
use crate::error::{DcopError, Result};
use crate::netlist::{ElementId, Netlist, NodeId, UnionFind};

use super::mna::MnaMatrix;
use super::{MIN_RESISTANCE, RESISTANCE_EPSILON};

/// The result of a DC operating-point solve.
///
/// A snapshot: it stays consistent with the netlist as it was at solve
/// time, and is simply discarded after the next topology edit.
#[derive(Debug, Clone)]
pub struct DcSolution {
    /// Voltage of each dense-indexed node, relative to ground.
    pub node_voltages: Vec<f64>,
    /// Branch current of each voltage source, in stamping order
    /// (ascending element id).
    pub source_currents: Vec<f64>,
    /// Canonical representative id -> dense column index.
    node_map: BTreeMap<NodeId, usize>,
    /// Every raw node id referenced at solve time -> its column
    /// (`None` = the id belongs to ground's group).
    columns: HashMap<NodeId, Option<usize>>,
    /// Voltage-source element -> index into `source_currents`.
    source_index: HashMap<ElementId, usize>,
}

impl DcSolution {
    /// The dense node index used by this solve: canonical non-ground
    /// representative -> column into [`node_voltages`](Self::node_voltages).
    pub fn node_map(&self) -> &BTreeMap<NodeId, usize> {
        &self.node_map
    }

    /// Voltage of a node by raw id. Ground and every id absorbed into
    /// ground's group read as 0.0; an id the solve never saw is `None`.
    pub fn voltage(&self, node: NodeId) -> Option<f64> {
        if node.is_ground() {
            return Some(0.0);
        }
        self.columns
            .get(&node)
            .map(|col| col.map_or(0.0, |i| self.node_voltages[i]))
    }

    /// Voltage across an element: V(terminal 1) - V(terminal 2).
    /// A wire reads 0.0 (both derived terminals share a node).
    pub fn element_voltage(&self, netlist: &Netlist, id: ElementId) -> Option<f64> {
        let element = netlist.element(id)?;
        let [n1, n2] = netlist.terminal_nodes(element);
        let v1 = self.voltage(n1?)?;
        let v2 = self.voltage(n2?)?;
        Some(v1 - v2)
    }

    /// Current through an element, positive when flowing terminal 1 to
    /// terminal 2. Wires carry no defined current in this model.
    pub fn element_current(&self, netlist: &Netlist, id: ElementId) -> Option<f64> {
        match netlist.element(id)? {
            Element::Resistor(r) => {
                let v = self.element_voltage(netlist, id)?;
                Some(v / effective_resistance(r))
            }
            Element::VoltageSource(_) => {
                let k = *self.source_index.get(&id)?;
                Some(self.source_currents[k])
            }
            Element::CurrentSource(i) => Some(i.current),
            Element::Wire(_) => None,
        }
    }
}

/// Resistance actually stamped for a resistor; near-zero values clamp to
/// [`MIN_RESISTANCE`] so they never divide to infinity.
fn effective_resistance(r: &Resistor) -> f64 {
    if r.resistance.abs() < RESISTANCE_EPSILON {
        MIN_RESISTANCE
    } else {
        r.resistance
    }
}

/// Compute the DC operating point of the netlist.
///
/// Returns the node voltages and voltage-source branch currents, or the
/// first topology error encountered (see [`DcopError`]).
pub fn solve(netlist: &Netlist) -> Result<DcSolution> {
    if netlist.is_empty() {
        return Err(DcopError::EmptyNetlist);
    }

    // Every non-wire terminal must be connected before we can solve.
    for element in netlist.elements() {
        if let Some(nodes) = element.stored_nodes() {
            if nodes.iter().any(|n| n.is_none()) {
                return Err(DcopError::incomplete(element.name()));
            }
        }
    }

    // Fold all wire-implied equivalences into canonical representatives.
    // This pass is the authoritative grouping; the eager assigner in
    // `Netlist::connect` only pre-seeds the stored ids it reads from.
    let mut uf = UnionFind::new();
    for element in netlist.elements() {
        if let Element::Wire(w) = element {
            if let [Some(a), Some(b)] = netlist.wire_nodes(w) {
                uf.union(a, b);
            }
        }
    }
    let ground_root = uf.find(NodeId::GROUND);

    // Without a ground reference the potentials are only defined up to a
    // constant; reject before looking at the matrix.
    let touches_ground = netlist.elements().any(|e| {
        e.stored_nodes().is_some_and(|nodes| {
            nodes
                .iter()
                .flatten()
                .any(|&n| uf.find(n) == ground_root)
        })
    });
    if !touches_ground {
        return Err(DcopError::UngroundedCircuit);
    }

    // Dense column per distinct non-ground representative, assigned in
    // ascending raw-id order for reproducibility.
    let mut reps: BTreeSet<NodeId> = BTreeSet::new();
    for element in netlist.elements() {
        if let Some(nodes) = element.stored_nodes() {
            for &node in nodes.iter().flatten() {
                let root = uf.find(node);
                if root != ground_root {
                    reps.insert(root);
                }
            }
        }
    }
    let node_map: BTreeMap<NodeId, usize> = reps
        .iter()
        .enumerate()
        .map(|(index, &root)| (root, index))
        .collect();
    for (root, index) in &node_map {
        debug!(node = %root, index, "mapped node to matrix column");
    }

    detect_floating_groups(netlist, &mut uf, ground_root)?;

    // Resolve every raw terminal id to its column once, up front.
    let mut columns: HashMap<NodeId, Option<usize>> = HashMap::new();
    for element in netlist.elements() {
        for node in netlist.terminal_nodes(element).into_iter().flatten() {
            let root = uf.find(node);
            let col = (root != ground_root).then(|| node_map[&root]);
            columns.insert(node, col);
        }
    }

    let num_nodes = node_map.len();
    let num_vsources = netlist
        .elements()
        .filter(|e| matches!(e, Element::VoltageSource(_)))
        .count();
    let size = num_nodes + num_vsources;

    let mut matrix = MnaMatrix::new(size);
    let mut source_index = HashMap::new();
    let mut vs_row = 0usize;

    // Ground resolves to no column at all.
    let column = |node: Option<NodeId>| node.and_then(|n| columns.get(&n).copied().flatten());

    for element in netlist.elements() {
        match element {
            Element::Resistor(r) => {
                if r.resistance.abs() < RESISTANCE_EPSILON {
                    warn!(
                        name = %r.name,
                        "near-zero resistance; stamping as 1e-12 ohms"
                    );
                }
                let g = 1.0 / effective_resistance(r);
                let n1 = column(r.nodes[0]);
                let n2 = column(r.nodes[1]);
                debug!(name = %r.name, g, "stamping resistor");
                matrix.stamp_conductance(n1, n2, g);
            }
            Element::CurrentSource(i) => {
                let n1 = column(i.nodes[0]);
                let n2 = column(i.nodes[1]);
                debug!(name = %i.name, current = i.current, "stamping current source");
                matrix.stamp_current_source(n1, n2, i.current);
            }
            Element::VoltageSource(v) => {
                let n1 = column(v.nodes[0]);
                let n2 = column(v.nodes[1]);
                let row = num_nodes + vs_row;
                debug!(name = %v.name, voltage = v.voltage, row, "stamping voltage source");
                matrix.stamp_voltage_source(n1, n2, row, v.voltage);
                source_index.insert(v.id, vs_row);
                vs_row += 1;
            }
            // Wires contribute nothing: their whole effect is that both
            // endpoints resolved to the same column.
            Element::Wire(_) => {}
        }
    }

    // Rank gate before the solve proper; catches conflicting constraints
    // (e.g. parallel voltage sources) that the floating check cannot see.
    let rank = matrix.rank();
    if rank < size {
        error!(rank, size, "circuit matrix is rank-deficient");
        return Err(DcopError::degenerate(rank, size));
    }

    matrix.factor()?;
    matrix.solve()?;

    let node_voltages = matrix.x[..num_nodes].to_vec();
    let source_currents = matrix.x[num_nodes..size].to_vec();
    debug!(?node_voltages, ?source_currents, "solve complete");

    Ok(DcSolution {
        node_voltages,
        source_currents,
        node_map,
        columns,
        source_index,
    })
}

/// Reject node groups with no conductive path to ground or to any
/// voltage source.
///
/// Anchors are ground's group and every group touched by a voltage-source
/// terminal; anchoring then spreads across non-wire elements, since any
/// two-terminal device ties the potentials of its terminal groups
/// together. Groups left unreached have no determinable absolute
/// potential. The matrix rank check remains as an independent second net
/// for the degeneracies this traversal cannot see.
fn detect_floating_groups(
    netlist: &Netlist,
    uf: &mut UnionFind,
    ground_root: NodeId,
) -> Result<()> {
    // Group adjacency through non-wire elements.
    let mut edges: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
    for element in netlist.elements() {
        if let Some(&[Some(a), Some(b)]) = element.stored_nodes() {
            let (ra, rb) = (uf.find(a), uf.find(b));
            if ra != rb {
                edges.entry(ra).or_default().push(rb);
                edges.entry(rb).or_default().push(ra);
            }
        }
    }

    let mut anchored: HashSet<NodeId> = HashSet::new();
    let mut queue: VecDeque<NodeId> = VecDeque::new();
    anchored.insert(ground_root);
    queue.push_back(ground_root);
    for element in netlist.elements() {
        if let Element::VoltageSource(v) = element {
            for &node in v.nodes.iter().flatten() {
                let root = uf.find(node);
                if anchored.insert(root) {
                    queue.push_back(root);
                }
            }
        }
    }

    while let Some(group) = queue.pop_front() {
        if let Some(neighbors) = edges.get(&group) {
            for &next in neighbors {
                if anchored.insert(next) {
                    queue.push_back(next);
                }
            }
        }
    }

    let mut floating: BTreeSet<NodeId> = BTreeSet::new();
    for element in netlist.elements() {
        for node in netlist.terminal_nodes(element).into_iter().flatten() {
            let root = uf.find(node);
            if !anchored.contains(&root) {
                floating.insert(root);
            }
        }
    }

    if floating.is_empty() {
        Ok(())
    } else {
        Err(DcopError::FloatingTopology {
            nodes: floating.into_iter().collect(),
        })
    }
}

impl Netlist {
    /// Run a full DC operating-point solve on the current topology.
    pub fn solve(&self) -> Result<DcSolution> {
        solve(self)
    }
}
