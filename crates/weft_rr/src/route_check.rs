//! Validation of a completed routing against the graph.
//!
//! A routing is one trace per net. A trace lists nodes in the order the
//! router emitted them: it starts at the net's SOURCE and walks a path to
//! a SINK; after each SINK the next element is a node already on the
//! net's tree, from which the next branch continues.

use crate::error::RrGraphError;
use crate::graph::{RrGraph, RrNode, RrNodeKind};
use crate::ids::RrNodeId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use weft_arch::{Architecture, BlockTypeId, Grid, SwitchId};

/// A placed block instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedBlock {
    /// Instance name.
    pub name: String,
    /// Block type name.
    pub block_type: String,
    /// Anchor column.
    pub x: i32,
    /// Anchor row.
    pub y: i32,
}

/// One pin of a placed block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetPin {
    /// Index into [`RoutingProblem::blocks`].
    pub block: usize,
    /// Block pin number.
    pub pin: u32,
}

/// A net to be routed from one driver to its sinks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteNet {
    /// Net name.
    pub name: String,
    /// Driving pin.
    pub driver: NetPin,
    /// Receiving pins.
    pub sinks: Vec<NetPin>,
}

/// The placed netlist a routing refers to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingProblem {
    /// Placed blocks.
    pub blocks: Vec<PlacedBlock>,
    /// Nets, in the same order as [`RouteTraces::nets`].
    pub nets: Vec<RouteNet>,
}

/// One step of a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceElement {
    /// The node reached.
    pub node: RrNodeId,
    /// Switch used to leave the node; `None` at SINKs.
    #[serde(default)]
    pub switch: Option<SwitchId>,
}

/// The router's output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTraces {
    /// One trace per net.
    pub nets: Vec<Vec<TraceElement>>,
    /// Output pins reserved inside blocks: `[block][class]` lists OPIN nodes.
    #[serde(default)]
    pub opins_used_locally: Vec<Vec<Vec<RrNodeId>>>,
}

/// Recounts every node's occupancy from the traces and the locally used
/// output pins.
///
/// The first element of a branch (the node after a SINK) is already on the
/// tree and is not counted again.
pub fn recompute_occupancy_from_scratch(
    graph: &mut RrGraph,
    traces: &RouteTraces,
) -> Result<(), RrGraphError> {
    graph.reset_occupancy();
    let num_nodes = graph.num_nodes();
    let in_range = |id: RrNodeId, what: &str| {
        if id.index() < num_nodes {
            Ok(())
        } else {
            Err(RrGraphError::route(format!(
                "{what} references node {id}, but the graph has {num_nodes} nodes"
            )))
        }
    };

    for (net, trace) in traces.nets.iter().enumerate() {
        let mut after_sink = false;
        for element in trace {
            in_range(element.node, &format!("net {net}"))?;
            if !after_sink {
                graph.add_occupancy(element.node);
            }
            after_sink = graph.node(element.node).kind == RrNodeKind::Sink;
        }
    }
    for (block, classes) in traces.opins_used_locally.iter().enumerate() {
        for opins in classes {
            for &opin in opins {
                in_range(opin, &format!("locally used output pins of block {block}"))?;
                graph.add_occupancy(opin);
            }
        }
    }
    Ok(())
}

/// Returns `true` if no node is used beyond its capacity.
pub fn feasible_routing(graph: &RrGraph) -> bool {
    graph.nodes().iter().all(|n| n.occ <= n.capacity)
}

/// Validates a complete routing.
///
/// Recomputes occupancy, then checks capacities, locally used output pins
/// and every net's trace: it must start at the driver's SOURCE, step only
/// along adjacent nodes, form a tree, end at a SINK and reach each sink pin
/// exactly once.
pub fn check_route(
    graph: &mut RrGraph,
    arch: &Architecture,
    grid: &Grid,
    problem: &RoutingProblem,
    traces: &RouteTraces,
) -> Result<(), RrGraphError> {
    if traces.nets.len() != problem.nets.len() {
        return Err(RrGraphError::route(format!(
            "{} traces for {} nets",
            traces.nets.len(),
            problem.nets.len()
        )));
    }
    let block_types = problem
        .blocks
        .iter()
        .map(|b| {
            arch.block_type_by_name(&b.block_type).ok_or_else(|| {
                RrGraphError::route(format!(
                    "block '{}' has unknown type '{}'",
                    b.name, b.block_type
                ))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    for net in &problem.nets {
        for pin in std::iter::once(&net.driver).chain(&net.sinks) {
            if pin.block >= problem.blocks.len() {
                return Err(RrGraphError::route(format!(
                    "net '{}': pin {} is on block {}, but only {} blocks are placed",
                    net.name,
                    pin.pin,
                    pin.block,
                    problem.blocks.len()
                )));
            }
        }
    }

    recompute_occupancy_from_scratch(graph, traces)?;
    if let Some(id) = graph.node_ids().find(|&id| {
        let n = graph.node(id);
        n.occ > n.capacity
    }) {
        let n = graph.node(id);
        return Err(RrGraphError::route(format!(
            "routing is not feasible: {} has occupancy {} over capacity {}",
            graph.describe(id),
            n.occ,
            n.capacity
        )));
    }
    let checker = RouteChecker {
        graph: &*graph,
        arch,
        grid,
        problem,
        block_types,
    };
    checker.check_locally_used_opins(traces)?;
    for (index, trace) in traces.nets.iter().enumerate() {
        checker.check_net(index, trace)?;
    }
    Ok(())
}

struct RouteChecker<'a> {
    graph: &'a RrGraph,
    arch: &'a Architecture,
    grid: &'a Grid,
    problem: &'a RoutingProblem,
    block_types: Vec<BlockTypeId>,
}

impl RouteChecker<'_> {
    fn check_locally_used_opins(&self, traces: &RouteTraces) -> Result<(), RrGraphError> {
        for (block, classes) in traces.opins_used_locally.iter().enumerate() {
            let Some(&block_type) = self.block_types.get(block) else {
                return Err(RrGraphError::route(format!(
                    "locally used output pins given for unknown block {block}"
                )));
            };
            let def = self.arch.block_type(block_type);
            for (class, opins) in classes.iter().enumerate() {
                for &id in opins {
                    let node = self.graph.node(id);
                    if node.kind != RrNodeKind::Opin {
                        return Err(RrGraphError::route(format!(
                            "{} is used locally by block {block} but is not an OPIN",
                            self.graph.describe(id)
                        )));
                    }
                    if def.class_of(node.ptc) as usize != class {
                        return Err(RrGraphError::route(format!(
                            "{} is used locally by block {block} as class {class}, \
                             but its pin belongs to class {}",
                            self.graph.describe(id),
                            def.class_of(node.ptc)
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    fn check_net(&self, index: usize, trace: &[TraceElement]) -> Result<(), RrGraphError> {
        let net = &self.problem.nets[index];
        let fail = |what: String| Err(RrGraphError::route(format!("net '{}': {what}", net.name)));
        let Some(first) = trace.first() else {
            return fail("has no routing".to_string());
        };
        self.check_switch(first)?;
        self.check_source(net, first.node)?;

        let mut pin_done = vec![false; net.sinks.len()];
        let mut connected: HashSet<RrNodeId> = HashSet::from([first.node]);
        for pair in trace.windows(2) {
            let (prev, cur) = (pair[0].node, pair[1].node);
            self.check_switch(&pair[1])?;
            let kind = self.graph.node(cur).kind;
            if self.graph.node(prev).kind == RrNodeKind::Sink {
                if !connected.contains(&cur) {
                    return fail(format!(
                        "{} does not link into the existing routing",
                        self.graph.describe(cur)
                    ));
                }
            } else {
                if !self.check_adjacent(prev, cur) {
                    return fail(format!(
                        "non-adjacent steps from {} to {}",
                        self.graph.describe(prev),
                        self.graph.describe(cur)
                    ));
                }
                if connected.contains(&cur) && kind != RrNodeKind::Sink {
                    return fail(format!(
                        "routing is not a tree: {} is revisited",
                        self.graph.describe(cur)
                    ));
                }
                connected.insert(cur);
                if kind == RrNodeKind::Sink {
                    self.check_sink(net, cur, &mut pin_done)?;
                }
            }
        }

        if let Some(last) = trace.last() {
            if self.graph.node(last.node).kind != RrNodeKind::Sink {
                return fail(format!(
                    "trace ends at {}, not at a SINK",
                    self.graph.describe(last.node)
                ));
            }
        }
        if let Some(missing) = pin_done.iter().position(|done| !done) {
            let pin = net.sinks[missing];
            let block = self
                .problem
                .blocks
                .get(pin.block)
                .map_or("?", |b| b.name.as_str());
            return fail(format!("pin {} of block '{block}' is never reached", pin.pin));
        }
        Ok(())
    }

    fn check_switch(&self, element: &TraceElement) -> Result<(), RrGraphError> {
        match element.switch {
            Some(sw) if sw.index() >= self.arch.switches.len() => {
                Err(RrGraphError::route(format!(
                    "{} leaves through switch {sw}, but only {} exist",
                    self.graph.describe(element.node),
                    self.arch.switches.len()
                )))
            }
            _ => Ok(()),
        }
    }

    fn check_source(&self, net: &RouteNet, id: RrNodeId) -> Result<(), RrGraphError> {
        let node = self.graph.node(id);
        let fail = |what: &str| {
            Err(RrGraphError::route(format!(
                "net '{}' starts at {}: {what}",
                net.name,
                self.graph.describe(id)
            )))
        };
        if node.kind != RrNodeKind::Source {
            return fail("not a SOURCE");
        }
        let Some(block) = self.problem.blocks.get(net.driver.block) else {
            return fail("the driver block does not exist");
        };
        if (node.xlow, node.ylow) != (block.x, block.y) {
            return fail(&format!("the driver block is at ({}, {})", block.x, block.y));
        }
        let def = self.arch.block_type(self.block_types[net.driver.block]);
        if net.driver.pin >= def.num_pins() || def.class_of(net.driver.pin) != node.ptc {
            return fail(&format!(
                "driver pin {} is not in pin class {}",
                net.driver.pin, node.ptc
            ));
        }
        Ok(())
    }

    /// Marks the first unreached sink pin whose block sits at the SINK's
    /// tile and whose class is the SINK's class.
    fn check_sink(
        &self,
        net: &RouteNet,
        id: RrNodeId,
        pin_done: &mut [bool],
    ) -> Result<(), RrGraphError> {
        let node = self.graph.node(id);
        let candidates: Vec<usize> = net
            .sinks
            .iter()
            .enumerate()
            .filter(|&(i, pin)| {
                let Some(block) = self.problem.blocks.get(pin.block) else {
                    return false;
                };
                let def = self.arch.block_type(self.block_types[pin.block]);
                !pin_done[i]
                    && (block.x, block.y) == (node.xlow, node.ylow)
                    && pin.pin < def.num_pins()
                    && def.class_of(pin.pin) == node.ptc
            })
            .map(|(i, _)| i)
            .collect();
        let Some(&first) = candidates.first() else {
            return Err(RrGraphError::route(format!(
                "net '{}': {} does not connect to any of its pins",
                net.name,
                self.graph.describe(id)
            )));
        };
        let pad = self.arch.block_type(self.block_types[net.sinks[first].block]);
        if pad.is_io && candidates.len() > 1 {
            return Err(RrGraphError::route(format!(
                "net '{}': {} is reached once but serves {} I/O pad pins",
                net.name,
                self.graph.describe(id),
                candidates.len()
            )));
        }
        pin_done[first] = true;
        Ok(())
    }

    /// Returns `true` if `to` follows `from` along an edge and the two
    /// resources physically touch.
    fn check_adjacent(&self, from: RrNodeId, to: RrNodeId) -> bool {
        if !self.graph.has_edge(from, to) {
            return false;
        }
        let (a, b) = (self.graph.node(from), self.graph.node(to));
        use RrNodeKind::*;
        match (a.kind, b.kind) {
            (Source, Opin) => same_rect(a, b) && self.class_of(b) == Some(a.ptc),
            (Ipin, Sink) => same_rect(a, b) && self.class_of(a) == Some(b.ptc),
            // Direct connections may span any distance.
            (Opin, Ipin) => true,
            (Opin, ChanX | ChanY) => pin_touches_wire(a, b),
            (ChanX | ChanY, Ipin) => pin_touches_wire(b, a),
            (ChanX, ChanX) => a.ylow == b.ylow && a.xhigh + 1 >= b.xlow && b.xhigh + 1 >= a.xlow,
            (ChanY, ChanY) => a.xlow == b.xlow && a.yhigh + 1 >= b.ylow && b.yhigh + 1 >= a.ylow,
            (ChanX, ChanY) => chanx_chany_adjacent(a, b),
            (ChanY, ChanX) => chanx_chany_adjacent(b, a),
            _ => false,
        }
    }

    /// Class of the pin behind an OPIN or IPIN node.
    fn class_of(&self, pin_node: &RrNode) -> Option<u32> {
        let block_type = self.grid.block_type_at(pin_node.xlow, pin_node.ylow)?;
        let def = self.arch.block_type(block_type);
        (pin_node.ptc < def.num_pins()).then(|| def.class_of(pin_node.ptc))
    }
}

fn same_rect(a: &RrNode, b: &RrNode) -> bool {
    (a.xlow, a.ylow, a.xhigh, a.yhigh) == (b.xlow, b.ylow, b.xhigh, b.yhigh)
}

/// A pin of the block spanning `pin`'s rectangle touches `wire` when the
/// wire runs along one of the block's tile edges.
fn pin_touches_wire(pin: &RrNode, wire: &RrNode) -> bool {
    match wire.kind {
        RrNodeKind::ChanX => {
            (wire.xlow..=wire.xhigh).contains(&pin.xlow)
                && wire.ylow >= pin.ylow - 1
                && wire.ylow <= pin.yhigh
        }
        _ => {
            (wire.xlow == pin.xlow || wire.xlow == pin.xlow - 1)
                && wire.ylow <= pin.yhigh
                && wire.yhigh >= pin.ylow
        }
    }
}

fn chanx_chany_adjacent(chanx: &RrNode, chany: &RrNode) -> bool {
    !(chany.ylow > chanx.ylow + 1
        || chany.yhigh < chanx.ylow
        || chanx.xlow > chany.xlow + 1
        || chanx.xhigh < chany.xlow)
}
