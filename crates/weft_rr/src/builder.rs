//! Graph construction: nodes, pin patterns, switch blocks and edges.
//!
//! [`build_rr_graph`] is the only entry point. It allocates tracks, turns
//! Fc specifications into track counts, creates every node, wires the
//! fabric and finally runs [`check_rr_graph`] over the result.

use crate::channel::FabricContext;
use crate::check::check_rr_graph;
use crate::direct::{direct_targets, resolve_directs, ResolvedDirect};
use crate::error::RrGraphError;
use crate::fc::{actual_fc, should_perturb_ipins, ActualFc};
use crate::graph::{GraphHeader, RrEdge, RrGraph, RrNode, RrNodeKind};
use crate::ids::RrNodeId;
use crate::indexed_data::{
    build_indexed_data, wire_cost_index, IPIN_COST_INDEX, OPIN_COST_INDEX, SINK_COST_INDEX,
    SOURCE_COST_INDEX,
};
use crate::indices::{NodeLookup, NodeLookupBuilder};
use crate::opin::MuxOffsets;
use crate::pin_pattern::{pin_to_track_map, PinTrackMap, TrackToPinLookup};
use crate::scratch::EdgeScratch;
use crate::segments::{alloc_seg_details, global_seg_details, Channel, SegDetails};
use crate::switch_block::{SblockPattern, SwitchBlockConn};
use crate::warnings::{codes, BuildWarnings};
use weft_arch::{
    Architecture, BlockType, BlockTypeId, Directionality, GraphType, Grid, PinClassKind,
    RoutingParams,
};
use weft_common::{InternalError, WeftResult};
use weft_diagnostics::{Diagnostic, DiagnosticSink};

/// A successfully built graph and the advisory conditions met on the way.
#[derive(Debug, Clone)]
pub struct BuiltGraph {
    /// The validated graph.
    pub graph: RrGraph,
    /// Fc clipping and channel-width adjustment flags.
    pub warnings: BuildWarnings,
}

/// Builds and validates the routing-resource graph of `grid`.
///
/// Warnings and pattern inconsistencies go to `sink`; the returned
/// [`BuildWarnings`] mirrors the advisory ones as flags.
pub fn build_rr_graph(
    arch: &Architecture,
    grid: &Grid,
    params: &RoutingParams,
    sink: &DiagnosticSink,
) -> Result<BuiltGraph, RrGraphError> {
    validate_params(params)?;
    arch.validate()?;
    validate_grid(arch, grid)?;

    let (nx, ny) = (grid.nx(), grid.ny());
    let global = params.graph_type == GraphType::Global;
    let unidir = params.graph_type.is_unidir();
    let directionality = if unidir {
        Directionality::Unidir
    } else {
        Directionality::Bidir
    };
    let fac = directionality.group_size();
    let mut warnings = BuildWarnings::NONE;

    let (seg_details, nodes_per_chan, chan_width) = if global {
        let details = global_seg_details(arch.global_route_switch);
        (details, 1, params.channel_width)
    } else {
        let (details, actual) = alloc_seg_details(
            params.channel_width,
            nx.max(ny),
            &arch.segments,
            directionality,
            params.graph_type == GraphType::UnidirTileable,
        )?;
        if actual == 0 {
            return Err(RrGraphError::InvalidOption(format!(
                "no tracks could be allocated for a channel width of {}",
                params.channel_width
            )));
        }
        if actual != params.channel_width {
            sink.emit(
                Diagnostic::warning(
                    codes::CHAN_WIDTH_CHANGED,
                    format!(
                        "channel width changed from {} to {actual} to fit the segment mix",
                        params.channel_width
                    ),
                )
                .with_note("segment frequencies and lengths decide how many tracks fit"),
            );
            warnings.insert(BuildWarnings::CHAN_WIDTH_CHANGED);
        }
        (details, actual, actual)
    };

    let sets = nodes_per_chan / fac;
    let fc_in = actual_fc(arch, PinClassKind::Receiver, sets, fac, params.ignore_fc_0, global)?;
    let fc_out = actual_fc(arch, PinClassKind::Driver, sets, fac, params.ignore_fc_0, global)?;
    if fc_in.clipped || fc_out.clipped {
        sink.emit(Diagnostic::warning(
            codes::FC_CLIPPED,
            format!("Fc clipped to the channel width of {nodes_per_chan}"),
        ));
        warnings.insert(BuildWarnings::FC_CLIPPED);
    }

    let directs = resolve_directs(arch)?;

    let wire_capacity = if global { chan_width } else { 1 };
    let (mut nodes, lookup) =
        create_nodes(arch, grid, &seg_details, nodes_per_chan, wire_capacity)?;

    let patterns = PinPatterns::build(arch, &fc_in, &fc_out, nodes_per_chan, fac, params, sink);

    let chan_x = Channel::new(&seg_details, nx);
    let chan_y = Channel::new(&seg_details, ny);
    let sb_conn = if unidir {
        None
    } else {
        Some(SwitchBlockConn::new(nodes_per_chan, params.switch_block_type, params.fs)?)
    };
    let sb_pattern = unidir.then(|| {
        SblockPattern::build(nx, ny, chan_x, chan_y, params.fs, params.switch_block_type)
    });
    let ctx = FabricContext {
        arch,
        grid,
        lookup: &lookup,
        chan_x,
        chan_y,
        unidir,
        track_to_ipin: &patterns.track_to_ipin,
        sb_conn: sb_conn.as_ref(),
        sb_pattern: sb_pattern.as_ref(),
        fs_per_side: params.fs / 3,
    };
    let edges = build_edges(&ctx, &nodes, &patterns, &fc_out, &directs);
    if edges.mux_clipped {
        sink.emit(Diagnostic::warning(
            codes::FC_CLIPPED,
            "output Fc clipped to the wire muxes available in a channel",
        ));
        warnings.insert(BuildWarnings::FC_CLIPPED);
    }

    for (node, fan_in) in nodes.iter_mut().zip(&edges.fan_in) {
        node.fan_in = *fan_in;
    }
    let header = GraphHeader {
        graph_type: params.graph_type,
        nx,
        ny,
        nodes_per_chan,
        chan_width,
        seg_details,
        fc_in: fc_in.per_type,
        opin_mux_size: edges.opin_mux_size,
    };
    let mut graph = RrGraph::from_adjacency(header, nodes, edges.adjacency, lookup);
    graph.indexed_data = build_indexed_data(arch, &graph.nodes, nx, ny, params.base_cost_type);

    check_rr_graph(&graph, arch, grid, params.check_pass_transistors, sink)?;
    Ok(BuiltGraph { graph, warnings })
}

fn validate_params(params: &RoutingParams) -> Result<(), RrGraphError> {
    let invalid = |msg: String| Err(RrGraphError::InvalidOption(msg));
    if params.channel_width == 0 {
        return invalid("channel width must be positive".to_string());
    }
    if params.graph_type.is_unidir() {
        if params.fs == 0 || params.fs % 3 != 0 {
            return invalid(format!(
                "Fs must be a positive multiple of 3 for unidirectional graphs, got {}",
                params.fs
            ));
        }
        if params.channel_width % 2 != 0 {
            return invalid(format!(
                "unidirectional channel width must be even, got {}",
                params.channel_width
            ));
        }
    } else if params.fs != 3 {
        return invalid(format!(
            "Fs must be 3 for bidirectional and global graphs, got {}",
            params.fs
        ));
    }
    Ok(())
}

fn validate_grid(arch: &Architecture, grid: &Grid) -> Result<(), RrGraphError> {
    for x in 0..=grid.nx() as i32 + 1 {
        for y in 0..=grid.ny() as i32 + 1 {
            if let Some(id) = grid.block_type_at(x, y) {
                if id.index() >= arch.block_types.len() {
                    return Err(RrGraphError::arch(format!(
                        "grid tile ({x},{y}) uses block type {id}, which is not declared"
                    )));
                }
            }
        }
    }
    Ok(())
}

/// Tiles holding the anchor (offset 0) row of a block, column-major.
fn anchors(grid: &Grid) -> Vec<(i32, i32, BlockTypeId)> {
    let mut out = Vec::new();
    for x in 0..=grid.nx() as i32 + 1 {
        for y in 0..=grid.ny() as i32 + 1 {
            let Some(tile) = grid.tile(x, y) else {
                continue;
            };
            if let (0, Some(block_type)) = (tile.height_offset, tile.block_type) {
                out.push((x, y, block_type));
            }
        }
    }
    out
}

fn push_node(
    nodes: &mut Vec<RrNode>,
    lookup: &mut NodeLookupBuilder,
    node: RrNode,
) -> WeftResult<()> {
    let id = RrNodeId::from_raw(nodes.len() as u32);
    for x in node.xlow..=node.xhigh {
        for y in node.ylow..=node.yhigh {
            if !lookup.insert(node.kind, x, y, node.ptc, id) {
                return Err(InternalError::new(format!(
                    "{} node {id} at ({x},{y}) lies outside the grid",
                    node.kind
                )));
            }
        }
    }
    nodes.push(node);
    Ok(())
}

/// Creates every node: per block its class nodes then its pin nodes, then
/// all CHANX wires, then all CHANY wires.
fn create_nodes(
    arch: &Architecture,
    grid: &Grid,
    seg_details: &[SegDetails],
    nodes_per_chan: u32,
    wire_capacity: u32,
) -> WeftResult<(Vec<RrNode>, NodeLookup)> {
    let (nx, ny) = (grid.nx(), grid.ny());
    let mut nodes = Vec::new();
    let mut lookup = NodeLookup::builder(nx, ny);

    for (x, y, block_type) in anchors(grid) {
        add_block_nodes(&mut nodes, &mut lookup, arch.block_type(block_type), x, y)?;
    }

    let chan_x = Channel::new(seg_details, nx);
    for y in 0..=ny {
        for x in 1..=nx {
            for track in 0..nodes_per_chan {
                if chan_x.seg_start(track, y, x) != x {
                    continue;
                }
                let end = chan_x.seg_end(track, x, y);
                let rect = (x as i32, y as i32, end as i32, y as i32);
                let node = wire_node(arch, RrNodeKind::ChanX, chan_x, track, rect, wire_capacity);
                push_node(&mut nodes, &mut lookup, node)?;
            }
        }
    }
    let chan_y = Channel::new(seg_details, ny);
    for x in 0..=nx {
        for y in 1..=ny {
            for track in 0..nodes_per_chan {
                if chan_y.seg_start(track, x, y) != y {
                    continue;
                }
                let end = chan_y.seg_end(track, y, x);
                let rect = (x as i32, y as i32, x as i32, end as i32);
                let node = wire_node(arch, RrNodeKind::ChanY, chan_y, track, rect, wire_capacity);
                push_node(&mut nodes, &mut lookup, node)?;
            }
        }
    }
    Ok((nodes, lookup.finish()))
}

fn add_block_nodes(
    nodes: &mut Vec<RrNode>,
    lookup: &mut NodeLookupBuilder,
    block: &BlockType,
    x: i32,
    y: i32,
) -> WeftResult<()> {
    let top = y + block.height as i32 - 1;
    for (index, class) in block.classes().iter().enumerate() {
        let (kind, cost_index) = match class.kind {
            PinClassKind::Driver => (RrNodeKind::Source, SOURCE_COST_INDEX),
            PinClassKind::Receiver => (RrNodeKind::Sink, SINK_COST_INDEX),
        };
        let mut node = RrNode::new(kind, x, y, x, top);
        node.ptc = index as u32;
        node.capacity = class.pins.len() as u32;
        node.cost_index = cost_index;
        push_node(nodes, lookup, node)?;
    }
    for pin in 0..block.num_pins() {
        let (kind, cost_index) = match block.pin_kind(pin) {
            PinClassKind::Driver => (RrNodeKind::Opin, OPIN_COST_INDEX),
            PinClassKind::Receiver => (RrNodeKind::Ipin, IPIN_COST_INDEX),
        };
        let mut node = RrNode::new(kind, x, y, x, top);
        node.ptc = pin;
        node.cost_index = cost_index;
        push_node(nodes, lookup, node)?;
    }
    Ok(())
}

fn wire_node(
    arch: &Architecture,
    kind: RrNodeKind,
    channel: Channel<'_>,
    track: u32,
    (xlow, ylow, xhigh, yhigh): (i32, i32, i32, i32),
    capacity: u32,
) -> RrNode {
    let details = channel.track(track);
    let mut node = RrNode::new(kind, xlow, ylow, xhigh, yhigh);
    let length = node.span() as f32;
    node.ptc = track;
    node.capacity = capacity;
    node.r = length * details.r_metal;
    node.c = length * details.c_metal;
    node.direction = Some(details.direction);
    node.drivers = Some(details.drivers);
    node.cost_index = wire_cost_index(arch, kind, details.segment.as_raw());
    node
}

/// Pin-to-track tables per block type.
struct PinPatterns {
    /// Output-pin tables; unused by unidirectional graphs.
    opin: Vec<Option<PinTrackMap>>,
    track_to_ipin: Vec<Option<TrackToPinLookup>>,
}

impl PinPatterns {
    fn build(
        arch: &Architecture,
        fc_in: &ActualFc,
        fc_out: &ActualFc,
        width: u32,
        fac: u32,
        params: &RoutingParams,
        sink: &DiagnosticSink,
    ) -> Self {
        let unidir = params.graph_type.is_unidir();
        let check_coverage = params.graph_type != GraphType::Global;
        let mut opin = Vec::with_capacity(arch.block_types.len());
        let mut track_to_ipin = Vec::with_capacity(arch.block_types.len());

        for (index, block) in arch.block_types.iter().enumerate() {
            let max_in = fc_in.max_for_type(index);
            let max_out = fc_out.max_for_type(index);

            let ipins = (max_in > 0).then(|| {
                let perturb = !unidir && should_perturb_ipins(max_in, max_out, width);
                let map =
                    pin_to_track_map(block, PinClassKind::Receiver, max_in, width, fac, perturb);
                if check_coverage {
                    report_uncovered(sink, block, "input", &map, width, &fc_in.per_type[index]);
                }
                TrackToPinLookup::new(&map, &fc_in.per_type[index], width)
            });
            track_to_ipin.push(ipins);

            let opins = (!unidir && max_out > 0).then(|| {
                let map = pin_to_track_map(block, PinClassKind::Driver, max_out, width, 1, false);
                if check_coverage {
                    report_uncovered(sink, block, "output", &map, width, &fc_out.per_type[index]);
                }
                map
            });
            opin.push(opins);
        }
        Self {
            opin,
            track_to_ipin,
        }
    }
}

fn report_uncovered(
    sink: &DiagnosticSink,
    block: &BlockType,
    what: &str,
    map: &PinTrackMap,
    width: u32,
    pin_fc: &[u32],
) {
    let missing = map.uncovered_tracks(width, pin_fc);
    if missing.is_empty() {
        return;
    }
    sink.emit(
        Diagnostic::error(
            codes::TRACK_UNREACHED,
            format!(
                "tracks {missing:?} of a {width}-track channel are not reached by any {what} \
                 pin of block type '{}'",
                block.name
            ),
        )
        .with_help("raise the Fc of the block type or change the channel width"),
    );
}

/// Adjacency lists and fan-in counters filled while wiring the fabric.
struct FabricEdges {
    adjacency: Vec<Vec<RrEdge>>,
    fan_in: Vec<u32>,
    opin_mux_size: Vec<u32>,
    mux_clipped: bool,
}

impl FabricEdges {
    fn commit(&mut self, from: RrNodeId, scratch: &mut EdgeScratch) {
        let edges = scratch.commit();
        for edge in &edges {
            self.fan_in[edge.to.index()] += 1;
        }
        self.adjacency[from.index()].extend(edges);
    }
}

fn build_edges(
    ctx: &FabricContext<'_>,
    nodes: &[RrNode],
    patterns: &PinPatterns,
    fc_out: &ActualFc,
    directs: &[ResolvedDirect],
) -> FabricEdges {
    let num_nodes = nodes.len();
    let mut out = FabricEdges {
        adjacency: vec![Vec::new(); num_nodes],
        fan_in: vec![0; num_nodes],
        opin_mux_size: Vec::new(),
        mux_clipped: false,
    };
    let mut scratch = EdgeScratch::new(num_nodes);
    let mut offsets = MuxOffsets::new(ctx.grid.nx(), ctx.grid.ny());
    let lookup = ctx.lookup;
    let delayless = ctx.arch.delayless_switch;

    for (x, y, block_type) in anchors(ctx.grid) {
        let block = ctx.arch.block_type(block_type);
        for (index, class) in block.classes().iter().enumerate() {
            let class_index = index as u32;
            match class.kind {
                PinClassKind::Driver => {
                    let Some(source) = lookup.get(RrNodeKind::Source, x, y, class_index) else {
                        continue;
                    };
                    for &pin in &class.pins {
                        if let Some(opin) = lookup.get(RrNodeKind::Opin, x, y, pin) {
                            scratch.push(opin, delayless);
                        }
                    }
                    out.commit(source, &mut scratch);
                }
                PinClassKind::Receiver => {
                    let Some(sink) = lookup.get(RrNodeKind::Sink, x, y, class_index) else {
                        continue;
                    };
                    for &pin in &class.pins {
                        if let Some(ipin) = lookup.get(RrNodeKind::Ipin, x, y, pin) {
                            scratch.push(sink, delayless);
                            out.commit(ipin, &mut scratch);
                        }
                    }
                }
            }
        }

        for pin in 0..block.num_pins() {
            if block.pin_kind(pin) != PinClassKind::Driver {
                continue;
            }
            let Some(opin) = lookup.get(RrNodeKind::Opin, x, y, pin) else {
                continue;
            };
            let fc = fc_out.per_type[block_type.index()][pin as usize];
            if ctx.unidir {
                out.mux_clipped |=
                    ctx.unidir_opin_edges(&mut scratch, &mut offsets, x, y, pin, fc);
            } else if let Some(map) = &patterns.opin[block_type.index()] {
                ctx.bidir_opin_edges(&mut scratch, map, x, y, pin, fc);
            }
            for target in direct_targets(directs, ctx.grid, x, y, pin) {
                if let Some(ipin) = lookup.get(RrNodeKind::Ipin, target.x, target.y, target.ipin) {
                    scratch.push_once(ipin, target.switch);
                }
            }
            out.commit(opin, &mut scratch);
        }
    }
    out.opin_mux_size = out.fan_in.clone();

    for (index, node) in nodes.iter().enumerate() {
        let (chan, start) = match node.kind {
            RrNodeKind::ChanX => (node.ylow, node.xlow),
            RrNodeKind::ChanY => (node.xlow, node.ylow),
            _ => continue,
        };
        ctx.wire_edges(&mut scratch, node.kind, chan as u32, start as u32, node.ptc);
        out.commit(RrNodeId::from_raw(index as u32), &mut scratch);
    }
    out
}
