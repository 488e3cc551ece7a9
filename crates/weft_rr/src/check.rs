//! Structural validation of a built graph.
//!
//! [`check_node`] checks one node in isolation; [`check_rr_graph`] runs it
//! over every node and adds the edge, duplicate-edge, pass-transistor and
//! fan-in checks. Both stop at the first violation.

use crate::error::RrGraphError;
use crate::graph::{RrGraph, RrNodeKind};
use crate::ids::RrNodeId;
use crate::warnings::codes;
use weft_arch::{Architecture, GraphType, Grid, PinClassKind};
use weft_diagnostics::{Diagnostic, DiagnosticSink};

/// Validates the static attributes of node `id`.
pub fn check_node(
    graph: &RrGraph,
    arch: &Architecture,
    grid: &Grid,
    id: RrNodeId,
) -> Result<(), RrGraphError> {
    let node = graph.node(id);
    let fail = |what: String| Err(RrGraphError::graph(format!("{}: {what}", graph.describe(id))));
    let (nx, ny) = (graph.nx() as i32, graph.ny() as i32);

    if node.xlow > node.xhigh || node.ylow > node.yhigh {
        return fail("rectangle is inverted".to_string());
    }
    if node.xlow < 0 || node.xhigh > nx + 1 || node.ylow < 0 || node.yhigh > ny + 1 {
        return fail(format!("lies outside the {}x{} grid", nx + 2, ny + 2));
    }
    if node.cost_index as usize >= graph.indexed_data().len() {
        return fail(format!(
            "cost index {} is out of range (table has {} entries)",
            node.cost_index,
            graph.indexed_data().len()
        ));
    }

    let global = graph.graph_type() == GraphType::Global;
    match node.kind {
        RrNodeKind::Source | RrNodeKind::Sink | RrNodeKind::Opin | RrNodeKind::Ipin => {
            let tile = grid.tile(node.xlow, node.ylow);
            let block_type = match tile {
                Some(t) if t.height_offset == 0 => t.block_type,
                _ => None,
            };
            let Some(block_type) = block_type else {
                return fail("no block is anchored here".to_string());
            };
            let block = arch.block_type(block_type);
            if node.xlow != node.xhigh || (node.yhigh - node.ylow + 1) as u32 != block.height {
                return fail(format!(
                    "spans ({}..={}, {}..={}) but a '{}' block has height {}",
                    node.xlow, node.xhigh, node.ylow, node.yhigh, block.name, block.height
                ));
            }
            match node.kind {
                RrNodeKind::Source | RrNodeKind::Sink => {
                    let expected = if node.kind == RrNodeKind::Source {
                        PinClassKind::Driver
                    } else {
                        PinClassKind::Receiver
                    };
                    let Some(class) = block.classes().get(node.ptc as usize) else {
                        return fail(format!("'{}' has no pin class {}", block.name, node.ptc));
                    };
                    if class.kind != expected {
                        return fail(format!("pin class {} is a {:?} class", node.ptc, class.kind));
                    }
                    if node.capacity as usize != class.pins.len() {
                        return fail(format!(
                            "capacity {}, expected {} (pins in class)",
                            node.capacity,
                            class.pins.len()
                        ));
                    }
                }
                _ => {
                    let expected = if node.kind == RrNodeKind::Opin {
                        PinClassKind::Driver
                    } else {
                        PinClassKind::Receiver
                    };
                    if node.ptc >= block.num_pins() {
                        return fail(format!("'{}' has no pin {}", block.name, node.ptc));
                    }
                    if block.pin_kind(node.ptc) != expected {
                        return fail(format!("pin {} is not a {:?} pin", node.ptc, expected));
                    }
                    if node.capacity != 1 {
                        return fail(format!("capacity {}, expected 1", node.capacity));
                    }
                }
            }
        }
        RrNodeKind::ChanX | RrNodeKind::ChanY => {
            let horizontal = node.kind == RrNodeKind::ChanX;
            let ok = if horizontal {
                node.xlow >= 1 && node.xhigh <= nx && node.yhigh <= ny && node.ylow == node.yhigh
            } else {
                node.ylow >= 1 && node.yhigh <= ny && node.xhigh <= nx && node.xlow == node.xhigh
            };
            if !ok {
                return fail("wire is not inside a channel".to_string());
            }
            if global && node.span() != 1 {
                return fail("global wire spans more than one segment".to_string());
            }
            let (max_ptc, capacity) = if global {
                (1, graph.chan_width())
            } else {
                (graph.nodes_per_chan(), 1)
            };
            if node.ptc >= max_ptc {
                return fail(format!("track {} exceeds {} tracks per channel", node.ptc, max_ptc));
            }
            if node.capacity != capacity {
                return fail(format!("capacity {}, expected {capacity}", node.capacity));
            }
        }
    }

    if node.kind == RrNodeKind::Sink && !graph.edges(id).is_empty() {
        return fail(format!("SINK has {} outgoing edges", graph.edges(id).len()));
    }
    if node.kind.is_wire() {
        if node.r < 0.0 || node.c < 0.0 {
            return fail(format!("negative R ({}) or C ({})", node.r, node.c));
        }
    } else if node.r != 0.0 || node.c != 0.0 {
        return fail(format!("R = {} and C = {}, expected 0", node.r, node.c));
    }
    Ok(())
}

/// Validates the whole graph.
///
/// Fatal violations return [`RrGraphError::Graph`]. Nodes without outgoing
/// edges and channel wires without fan-in are reported to `sink` as
/// warnings; the fringe warning is emitted once.
pub fn check_rr_graph(
    graph: &RrGraph,
    arch: &Architecture,
    grid: &Grid,
    check_pass_transistors: bool,
    sink: &DiagnosticSink,
) -> Result<(), RrGraphError> {
    let num_nodes = graph.num_nodes();
    let num_switches = arch.switches.len();
    let mut fan_in = vec![0u32; num_nodes];

    for id in graph.node_ids() {
        check_node(graph, arch, grid, id)?;
        let node = graph.node(id);
        let edges = graph.edges(id);

        for edge in edges {
            if edge.to.index() >= num_nodes {
                return Err(RrGraphError::graph(format!(
                    "{}: edge to node {} is out of range ({} nodes)",
                    graph.describe(id),
                    edge.to,
                    num_nodes
                )));
            }
            if edge.switch.index() >= num_switches {
                return Err(RrGraphError::graph(format!(
                    "{}: edge to node {} uses switch {} but only {} exist",
                    graph.describe(id),
                    edge.to,
                    edge.switch,
                    num_switches
                )));
            }
            fan_in[edge.to.index()] += 1;
        }

        let mut sorted: Vec<_> = edges.to_vec();
        sorted.sort_by_key(|e| (e.to, e.switch));
        for group in sorted.chunk_by(|a, b| a.to == b.to) {
            if group.len() < 2 {
                continue;
            }
            let to = graph.node(group[0].to);
            let legal = node.kind.is_wire()
                && to.kind.is_wire()
                && group.len() == 2
                && arch.switch(group[0].switch).buffered != arch.switch(group[1].switch).buffered;
            if !legal {
                return Err(RrGraphError::graph(format!(
                    "{} has {} edges to {}; only one buffered plus one pass-transistor edge \
                     between two wires is allowed",
                    graph.describe(id),
                    group.len(),
                    graph.describe(group[0].to)
                )));
            }
        }

        if check_pass_transistors && node.kind.is_wire() {
            for edge in edges {
                if arch.switch(edge.switch).buffered || !graph.node(edge.to).kind.is_wire() {
                    continue;
                }
                let mirrored = graph
                    .edges(edge.to)
                    .iter()
                    .any(|back| back.to == id && back.switch == edge.switch);
                if !mirrored {
                    return Err(RrGraphError::graph(format!(
                        "pass transistor from {} to {} (switch {}) has no reverse edge",
                        graph.describe(id),
                        graph.describe(edge.to),
                        edge.switch
                    )));
                }
            }
        }

        if edges.is_empty() && node.kind != RrNodeKind::Sink {
            sink.emit(
                Diagnostic::warning(
                    codes::NO_OUT_EDGES,
                    format!("{} has no outgoing edges", graph.describe(id)),
                )
                .at(node.xlow, node.ylow),
            );
        }
    }

    let mut fringe_reported = false;
    for id in graph.node_ids() {
        let node = graph.node(id);
        let count = fan_in[id.index()];
        if node.kind == RrNodeKind::Source {
            if count != 0 {
                return Err(RrGraphError::graph(format!(
                    "SOURCE {} has a fanin of {count}, expected 0",
                    graph.describe(id)
                )));
            }
            continue;
        }
        if count != 0 {
            continue;
        }
        if node.kind.is_wire() {
            if !fringe_reported {
                sink.emit(
                    Diagnostic::warning(
                        codes::FRINGE_NO_FANIN,
                        format!("{} has no fanin", graph.describe(id)),
                    )
                    .at(node.xlow, node.ylow)
                    .with_note("wires at the chip fringe may be undriven"),
                );
                fringe_reported = true;
            }
            continue;
        }
        if node.kind == RrNodeKind::Ipin {
            if let Some(block_type) = grid.block_type_at(node.xlow, node.ylow) {
                let block = arch.block_type(block_type);
                if block.is_global_pin(node.ptc) || graph.fc_in(block_type, node.ptc) == 0 {
                    continue;
                }
            }
        }
        return Err(RrGraphError::graph(format!("{} has no fanin", graph.describe(id))));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::tests::{fabric, grid, small_graph};
    use crate::builder::build_rr_graph;
    use crate::graph::{GraphHeader, RrEdge, RrNode};
    use crate::indexed_data::build_indexed_data;
    use crate::indices::NodeLookup;
    use weft_arch::{
        ArchSwitch, BaseCostType, Directionality, FcSpec, PinLocations, RoutingParams,
    };

    /// One clb at (1,1): SOURCE, SINK, OPIN, IPIN, then CHANX wires at
    /// (1,0) track 0 and (1,1) tracks 0 and 1. Only the first wire is
    /// driven by the output pin; every wire feeds the input pin.
    fn hand_graph(arch: &Architecture, extra: &[(u32, u32)]) -> RrGraph {
        let pin = |kind, ptc, cost_index| {
            let mut n = RrNode::new(kind, 1, 1, 1, 1);
            n.ptc = ptc;
            n.cost_index = cost_index;
            n
        };
        let wire = |y, ptc| {
            let mut n = RrNode::new(RrNodeKind::ChanX, 1, y, 1, y);
            n.ptc = ptc;
            n.cost_index = 4;
            n
        };
        let nodes = vec![
            pin(RrNodeKind::Source, 1, 0),
            pin(RrNodeKind::Sink, 0, 1),
            pin(RrNodeKind::Opin, 1, 2),
            pin(RrNodeKind::Ipin, 0, 3),
            wire(0, 0),
            wire(1, 0),
            wire(1, 1),
        ];
        let sw = arch.delayless_switch;
        let mut adjacency = vec![Vec::new(); nodes.len()];
        for (from, to) in [(0, 2), (2, 4), (3, 1), (4, 3), (5, 3), (6, 3)]
            .into_iter()
            .chain(extra.iter().copied())
        {
            adjacency[from as usize].push(RrEdge {
                to: RrNodeId::from_raw(to),
                switch: sw,
            });
        }
        let header = GraphHeader {
            graph_type: GraphType::Bidir,
            nx: 1,
            ny: 1,
            nodes_per_chan: 2,
            chan_width: 2,
            seg_details: Vec::new(),
            fc_in: vec![vec![2, 0], vec![2, 0]],
            opin_mux_size: Vec::new(),
        };
        let lookup = NodeLookup::builder(1, 1).finish();
        let mut graph = RrGraph::from_adjacency(header, nodes, adjacency, lookup);
        graph.indexed_data = build_indexed_data(arch, &graph.nodes, 1, 1, BaseCostType::DemandOnly);
        graph
    }

    fn plain_arch() -> Architecture {
        fabric(
            1,
            Directionality::Bidir,
            true,
            FcSpec::Frac(1.0),
            PinLocations::AllSides,
        )
    }

    #[test]
    fn fringe_warning_is_reported_once() {
        let arch = plain_arch();
        let grid = grid(&arch, 1, 1, false);
        let g = hand_graph(&arch, &[]);
        let sink = DiagnosticSink::new();
        check_rr_graph(&g, &arch, &grid, true, &sink).unwrap();
        let diags = sink.diagnostics();
        let fringe: Vec<_> = diags
            .iter()
            .filter(|d| d.code == codes::FRINGE_NO_FANIN)
            .collect();
        assert_eq!(fringe.len(), 1);
        assert_eq!(sink.error_count(), 0);
    }

    #[test]
    fn source_with_fanin_is_an_error() {
        let arch = plain_arch();
        let grid = grid(&arch, 1, 1, false);
        let g = hand_graph(&arch, &[(5, 0)]);
        let err = check_rr_graph(&g, &arch, &grid, true, &DiagnosticSink::new()).unwrap_err();
        assert!(err.to_string().contains("SOURCE"), "{err}");
        assert!(err.to_string().contains("fanin of 1"), "{err}");
    }

    #[test]
    fn doubled_edge_between_pins_is_an_error() {
        let arch = plain_arch();
        let grid = grid(&arch, 1, 1, false);
        let g = hand_graph(&arch, &[(0, 2)]);
        let err = check_rr_graph(&g, &arch, &grid, true, &DiagnosticSink::new()).unwrap_err();
        assert!(err.to_string().contains("2 edges to node 2"), "{err}");
    }

    #[test]
    fn buffered_plus_pass_transistor_pair_is_legal() {
        let mut arch = plain_arch();
        let pass = arch
            .add_switch(ArchSwitch {
                name: "pass".to_string(),
                buffered: false,
                r: 50.0,
                cin: 0.0,
                cout: 0.0,
                tdel: 0.0,
            })
            .unwrap();
        let grid = grid(&arch, 1, 1, false);

        // Two buffered edges between the same pair of wires.
        let g = hand_graph(&arch, &[(5, 6), (5, 6), (6, 5)]);
        let err = check_rr_graph(&g, &arch, &grid, true, &DiagnosticSink::new()).unwrap_err();
        assert!(err.to_string().contains("2 edges to"), "{err}");

        // One of them a mirrored pass transistor.
        let mut g = hand_graph(&arch, &[(5, 6), (5, 6), (6, 5)]);
        let from_5 = g.edge_starts[5] as usize;
        let from_6 = g.edge_starts[6] as usize;
        assert_eq!(g.edges[from_5 + 2].to, RrNodeId::from_raw(6));
        assert_eq!(g.edges[from_6 + 1].to, RrNodeId::from_raw(5));
        g.edges[from_5 + 2].switch = pass;
        g.edges[from_6 + 1].switch = pass;
        let sink = DiagnosticSink::new();
        check_rr_graph(&g, &arch, &grid, true, &sink).unwrap();
        assert_eq!(sink.error_count(), 0);
    }

    #[test]
    fn node_without_edges_is_a_warning() {
        let arch = plain_arch();
        let grid = grid(&arch, 1, 1, false);
        let mut g = hand_graph(&arch, &[]);
        // Drop the OPIN -> wire edge: the OPIN has no way out.
        g.edges.remove(1);
        for start in g.edge_starts.iter_mut().skip(3) {
            *start -= 1;
        }
        let sink = DiagnosticSink::new();
        check_rr_graph(&g, &arch, &grid, true, &sink).unwrap();
        assert!(sink
            .diagnostics()
            .iter()
            .any(|d| d.code == codes::NO_OUT_EDGES && d.message.contains("OPIN")));
    }

    #[test]
    fn node_attributes_are_checked() {
        let arch = plain_arch();
        let grid = grid(&arch, 1, 1, false);

        let mut g = hand_graph(&arch, &[]);
        g.nodes[4].capacity = 2;
        let err = check_node(&g, &arch, &grid, RrNodeId::from_raw(4)).unwrap_err();
        assert!(err.to_string().contains("capacity 2, expected 1"), "{err}");

        let mut g = hand_graph(&arch, &[]);
        g.nodes[2].xlow = 0;
        g.nodes[2].xhigh = 0;
        let err = check_node(&g, &arch, &grid, RrNodeId::from_raw(2)).unwrap_err();
        assert!(err.to_string().contains("no block is anchored"), "{err}");

        let mut g = hand_graph(&arch, &[]);
        g.nodes[3].ptc = 1;
        let err = check_node(&g, &arch, &grid, RrNodeId::from_raw(3)).unwrap_err();
        assert!(err.to_string().contains("is not a Receiver pin"), "{err}");

        let mut g = hand_graph(&arch, &[]);
        g.nodes[0].r = 1.0;
        assert!(check_node(&g, &arch, &grid, RrNodeId::from_raw(0)).is_err());

        let mut g = hand_graph(&arch, &[]);
        g.nodes[6].ptc = 2;
        let err = check_node(&g, &arch, &grid, RrNodeId::from_raw(6)).unwrap_err();
        assert!(err.to_string().contains("exceeds 2 tracks"), "{err}");
    }

    #[test]
    fn built_graph_passes_again() {
        let (arch, grid, g) = small_graph();
        let sink = DiagnosticSink::new();
        check_rr_graph(&g, &arch, &grid, true, &sink).unwrap();
        assert_eq!(sink.error_count(), 0);
    }

    #[test]
    fn unmirrored_pass_transistor_is_an_error() {
        let mut arch = fabric(
            1,
            Directionality::Bidir,
            false,
            FcSpec::Frac(1.0),
            PinLocations::AllSides,
        );
        let grid = grid(&arch, 2, 2, false);
        let sink = DiagnosticSink::new();
        let mut g = build_rr_graph(&arch, &grid, &RoutingParams::bidir(2), &sink)
            .unwrap()
            .graph;
        let other = arch
            .add_switch(ArchSwitch {
                name: "other".to_string(),
                buffered: false,
                r: 50.0,
                cin: 0.0,
                cout: 0.0,
                tdel: 0.0,
            })
            .unwrap();
        let index = g
            .node_ids()
            .filter(|&id| g.node(id).kind.is_wire())
            .flat_map(|id| {
                let start = g.edge_starts[id.index()] as usize;
                g.edges(id)
                    .iter()
                    .enumerate()
                    .map(move |(k, e)| (start + k, *e))
            })
            .find(|(_, e)| g.node(e.to).kind.is_wire() && !arch.switch(e.switch).buffered)
            .map(|(index, _)| index)
            .unwrap();
        g.edges[index].switch = other;
        let err = check_rr_graph(&g, &arch, &grid, true, &sink).unwrap_err();
        assert!(err.to_string().contains("no reverse edge"), "{err}");
        assert!(check_rr_graph(&g, &arch, &grid, false, &sink).is_ok());
    }
}
