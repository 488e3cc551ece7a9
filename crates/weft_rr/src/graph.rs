//! The routing-resource graph: node arena, CSR edge arrays and metadata.
//!
//! Nodes are referenced by [`RrNodeId`] everywhere. Once built, only the
//! occupancy counters mutate; the node and edge topology is fixed.

use crate::ids::RrNodeId;
use crate::indexed_data::IndexedData;
use crate::indices::NodeLookup;
use crate::segments::SegDetails;
use serde::{Deserialize, Serialize};
use std::fmt;
use weft_arch::{BlockTypeId, GraphType, SwitchId};

/// The six kinds of routing resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RrNodeKind {
    /// Abstract driver of a pin class.
    Source,
    /// Abstract receiver of a pin class.
    Sink,
    /// Block output pin.
    Opin,
    /// Block input pin.
    Ipin,
    /// Horizontal wire segment.
    ChanX,
    /// Vertical wire segment.
    ChanY,
}

impl RrNodeKind {
    /// Every kind, in lookup-table order.
    pub const ALL: [RrNodeKind; 6] = [
        RrNodeKind::Source,
        RrNodeKind::Sink,
        RrNodeKind::Opin,
        RrNodeKind::Ipin,
        RrNodeKind::ChanX,
        RrNodeKind::ChanY,
    ];

    /// Position in [`RrNodeKind::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Returns `true` for CHANX and CHANY.
    pub fn is_wire(self) -> bool {
        matches!(self, RrNodeKind::ChanX | RrNodeKind::ChanY)
    }
}

impl fmt::Display for RrNodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RrNodeKind::Source => "SOURCE",
            RrNodeKind::Sink => "SINK",
            RrNodeKind::Opin => "OPIN",
            RrNodeKind::Ipin => "IPIN",
            RrNodeKind::ChanX => "CHANX",
            RrNodeKind::ChanY => "CHANY",
        };
        f.write_str(name)
    }
}

/// Signal direction along a wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Driven at the low-coordinate end.
    Inc,
    /// Driven at the high-coordinate end.
    Dec,
    /// Drivable from either end.
    Bi,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Inc => "INC_DIRECTION",
            Direction::Dec => "DEC_DIRECTION",
            Direction::Bi => "BI_DIRECTION",
        };
        f.write_str(name)
    }
}

/// Number of drivers a wire may have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Drivers {
    /// Exactly one mux drives the wire.
    Single,
    /// Several tri-state buffers or pass transistors drive the wire.
    MultiBuffered,
}

impl fmt::Display for Drivers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Drivers::Single => "SINGLE",
            Drivers::MultiBuffered => "MULTI_BUFFERED",
        };
        f.write_str(name)
    }
}

/// One routing resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RrNode {
    /// Resource kind.
    pub kind: RrNodeKind,
    /// Lowest column covered.
    pub xlow: i32,
    /// Lowest row covered.
    pub ylow: i32,
    /// Highest column covered.
    pub xhigh: i32,
    /// Highest row covered.
    pub yhigh: i32,
    /// Pin class (SOURCE/SINK), pin number (OPIN/IPIN) or track (wires).
    pub ptc: u32,
    /// Number of nets that may use the node simultaneously.
    pub capacity: u32,
    /// Current usage.
    pub occ: u32,
    /// Number of incoming edges.
    pub fan_in: u32,
    /// Wire resistance; zero for pins.
    pub r: f32,
    /// Wire capacitance; zero for pins.
    pub c: f32,
    /// Row of the indexed cost table.
    pub cost_index: u32,
    /// Wire direction, `None` for pins.
    pub direction: Option<Direction>,
    /// Wire driver multiplicity, `None` for pins.
    pub drivers: Option<Drivers>,
}

impl RrNode {
    pub(crate) fn new(kind: RrNodeKind, xlow: i32, ylow: i32, xhigh: i32, yhigh: i32) -> Self {
        Self {
            kind,
            xlow,
            ylow,
            xhigh,
            yhigh,
            ptc: 0,
            capacity: 1,
            occ: 0,
            fan_in: 0,
            r: 0.0,
            c: 0.0,
            cost_index: 0,
            direction: None,
            drivers: None,
        }
    }

    /// Number of tiles the node spans along its long axis.
    pub fn span(&self) -> u32 {
        ((self.xhigh - self.xlow) + (self.yhigh - self.ylow) + 1) as u32
    }
}

/// A directed edge and the switch that implements it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RrEdge {
    /// Target node.
    pub to: RrNodeId,
    /// Switch type index.
    pub switch: SwitchId,
}

/// A built routing-resource graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RrGraph {
    pub(crate) graph_type: GraphType,
    pub(crate) nx: u32,
    pub(crate) ny: u32,
    pub(crate) nodes_per_chan: u32,
    pub(crate) chan_width: u32,
    pub(crate) nodes: Vec<RrNode>,
    /// `edge_starts[i]..edge_starts[i + 1]` indexes `edges` for node `i`.
    pub(crate) edge_starts: Vec<u32>,
    pub(crate) edges: Vec<RrEdge>,
    pub(crate) lookup: NodeLookup,
    pub(crate) indexed_data: Vec<IndexedData>,
    pub(crate) seg_details: Vec<SegDetails>,
    /// Actual input Fc per block type and pin.
    pub(crate) fc_in: Vec<Vec<u32>>,
    pub(crate) opin_mux_size: Vec<u32>,
}

impl RrGraph {
    /// Assembles a graph from per-node adjacency lists.
    pub(crate) fn from_adjacency(
        header: GraphHeader,
        nodes: Vec<RrNode>,
        adjacency: Vec<Vec<RrEdge>>,
        lookup: NodeLookup,
    ) -> Self {
        let mut edge_starts = Vec::with_capacity(nodes.len() + 1);
        let mut edges = Vec::with_capacity(adjacency.iter().map(Vec::len).sum());
        edge_starts.push(0);
        for list in adjacency {
            edges.extend(list);
            edge_starts.push(edges.len() as u32);
        }
        Self {
            graph_type: header.graph_type,
            nx: header.nx,
            ny: header.ny,
            nodes_per_chan: header.nodes_per_chan,
            chan_width: header.chan_width,
            nodes,
            edge_starts,
            edges,
            lookup,
            indexed_data: Vec::new(),
            seg_details: header.seg_details,
            fc_in: header.fc_in,
            opin_mux_size: header.opin_mux_size,
        }
    }

    /// The kind of graph that was built.
    pub fn graph_type(&self) -> GraphType {
        self.graph_type
    }

    /// Core columns of the grid the graph was built for.
    pub fn nx(&self) -> u32 {
        self.nx
    }

    /// Core rows of the grid the graph was built for.
    pub fn ny(&self) -> u32 {
        self.ny
    }

    /// Tracks per channel (1 for global graphs).
    pub fn nodes_per_chan(&self) -> u32 {
        self.nodes_per_chan
    }

    /// Actual channel width; the capacity of global-graph wires.
    pub fn chan_width(&self) -> u32 {
        self.chan_width
    }

    /// Number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// All nodes in id order.
    pub fn nodes(&self) -> &[RrNode] {
        &self.nodes
    }

    /// Iterates all node ids.
    pub fn node_ids(&self) -> impl Iterator<Item = RrNodeId> {
        (0..self.nodes.len() as u32).map(RrNodeId::from_raw)
    }

    /// The node with the given id.
    pub fn node(&self, id: RrNodeId) -> &RrNode {
        &self.nodes[id.index()]
    }

    /// Outgoing edges of `id` in construction order.
    pub fn edges(&self, id: RrNodeId) -> &[RrEdge] {
        let start = self.edge_starts[id.index()] as usize;
        let end = self.edge_starts[id.index() + 1] as usize;
        &self.edges[start..end]
    }

    /// Returns `true` if an edge `from -> to` exists.
    pub fn has_edge(&self, from: RrNodeId, to: RrNodeId) -> bool {
        self.edges(from).iter().any(|e| e.to == to)
    }

    /// The node-index lookup.
    pub fn lookup(&self) -> &NodeLookup {
        &self.lookup
    }

    /// Looks up a node by kind, tile and ptc.
    pub fn find(&self, kind: RrNodeKind, x: i32, y: i32, ptc: u32) -> Option<RrNodeId> {
        self.lookup.get(kind, x, y, ptc)
    }

    /// The indexed cost table.
    pub fn indexed_data(&self) -> &[IndexedData] {
        &self.indexed_data
    }

    /// Per-track segment details.
    pub fn seg_details(&self) -> &[SegDetails] {
        &self.seg_details
    }

    /// Actual Fc of input `pin` on `block_type`, 0 if unknown.
    pub fn fc_in(&self, block_type: BlockTypeId, pin: u32) -> u32 {
        self.fc_in
            .get(block_type.index())
            .and_then(|pins| pins.get(pin as usize))
            .copied()
            .unwrap_or(0)
    }

    /// Fan-in of `id` right after OPIN edges were built.
    pub fn opin_mux_size(&self, id: RrNodeId) -> u32 {
        self.opin_mux_size.get(id.index()).copied().unwrap_or(0)
    }

    /// Sets all occupancies to zero.
    pub fn reset_occupancy(&mut self) {
        for node in &mut self.nodes {
            node.occ = 0;
        }
    }

    /// Adds one use of `id`.
    pub fn add_occupancy(&mut self, id: RrNodeId) {
        self.nodes[id.index()].occ += 1;
    }

    /// A one-line description used in error messages.
    pub fn describe(&self, id: RrNodeId) -> String {
        match self.nodes.get(id.index()) {
            Some(n) => format!(
                "node {id} ({} ({},{}) to ({},{}) ptc {})",
                n.kind, n.xlow, n.ylow, n.xhigh, n.yhigh, n.ptc
            ),
            None => format!("node {id} (out of range)"),
        }
    }
}

/// Graph-wide values fixed before node creation.
pub(crate) struct GraphHeader {
    pub graph_type: GraphType,
    pub nx: u32,
    pub ny: u32,
    pub nodes_per_chan: u32,
    pub chan_width: u32,
    pub seg_details: Vec<SegDetails>,
    pub fc_in: Vec<Vec<u32>>,
    pub opin_mux_size: Vec<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny() -> RrGraph {
        let mut lookup = NodeLookup::builder(1, 1);
        let nodes = vec![
            RrNode::new(RrNodeKind::Source, 1, 1, 1, 1),
            RrNode::new(RrNodeKind::Opin, 1, 1, 1, 1),
            RrNode::new(RrNodeKind::ChanX, 1, 0, 1, 0),
        ];
        lookup.insert(RrNodeKind::Source, 1, 1, 0, RrNodeId::from_raw(0));
        lookup.insert(RrNodeKind::Opin, 1, 1, 0, RrNodeId::from_raw(1));
        lookup.insert(RrNodeKind::ChanX, 1, 0, 0, RrNodeId::from_raw(2));
        let sw = SwitchId::from_raw(0);
        let adjacency = vec![
            vec![RrEdge {
                to: RrNodeId::from_raw(1),
                switch: sw,
            }],
            vec![RrEdge {
                to: RrNodeId::from_raw(2),
                switch: sw,
            }],
            Vec::new(),
        ];
        let header = GraphHeader {
            graph_type: GraphType::Bidir,
            nx: 1,
            ny: 1,
            nodes_per_chan: 1,
            chan_width: 1,
            seg_details: Vec::new(),
            fc_in: Vec::new(),
            opin_mux_size: Vec::new(),
        };
        RrGraph::from_adjacency(header, nodes, adjacency, lookup.finish())
    }

    #[test]
    fn csr_edges_follow_adjacency() {
        let g = tiny();
        assert_eq!(g.num_nodes(), 3);
        assert_eq!(g.num_edges(), 2);
        assert_eq!(g.edges(RrNodeId::from_raw(0))[0].to, RrNodeId::from_raw(1));
        assert!(g.edges(RrNodeId::from_raw(2)).is_empty());
        assert!(g.has_edge(RrNodeId::from_raw(1), RrNodeId::from_raw(2)));
        assert!(!g.has_edge(RrNodeId::from_raw(2), RrNodeId::from_raw(1)));
    }

    #[test]
    fn describe_mentions_kind_and_coordinates() {
        let g = tiny();
        assert_eq!(
            g.describe(RrNodeId::from_raw(2)),
            "node 2 (CHANX (1,0) to (1,0) ptc 0)"
        );
        assert!(g.describe(RrNodeId::from_raw(9)).contains("out of range"));
    }

    #[test]
    fn occupancy_mutates() {
        let mut g = tiny();
        g.add_occupancy(RrNodeId::from_raw(1));
        g.add_occupancy(RrNodeId::from_raw(1));
        assert_eq!(g.node(RrNodeId::from_raw(1)).occ, 2);
        g.reset_occupancy();
        assert_eq!(g.node(RrNodeId::from_raw(1)).occ, 0);
    }

    #[test]
    fn span_counts_tiles() {
        let n = RrNode::new(RrNodeKind::ChanY, 2, 1, 2, 4);
        assert_eq!(n.span(), 4);
    }
}
