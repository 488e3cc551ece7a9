//! Routing-resource graph construction and validation for island-style
//! FPGAs.
//!
//! [`build_rr_graph`] turns an [`Architecture`](weft_arch::Architecture),
//! a [`Grid`](weft_arch::Grid) and [`RoutingParams`](weft_arch::RoutingParams)
//! into an [`RrGraph`]: one node per pin class, pin and wire segment, with
//! edges for every programmable switch. The graph is validated before it is
//! returned. [`check_route`] validates a router's output against the graph,
//! and [`GraphSnapshot`] stores a built graph on disk.

#![warn(missing_docs)]

pub mod builder;
pub mod check;
pub mod direct;
pub mod dump;
pub mod error;
pub mod fc;
pub mod graph;
pub mod ids;
pub mod indexed_data;
pub mod indices;
pub mod pin_pattern;
pub mod route_check;
pub mod segments;
pub mod snapshot;
pub mod switch_block;
pub mod warnings;

mod channel;
mod opin;
mod scratch;

pub use builder::{build_rr_graph, BuiltGraph};
pub use check::{check_node, check_rr_graph};
pub use dump::dump_rr_graph;
pub use error::RrGraphError;
pub use graph::{Direction, Drivers, RrEdge, RrGraph, RrNode, RrNodeKind};
pub use ids::RrNodeId;
pub use indexed_data::IndexedData;
pub use indices::NodeLookup;
pub use route_check::{
    check_route, feasible_routing, recompute_occupancy_from_scratch, NetPin, PlacedBlock,
    RouteNet, RouteTraces, RoutingProblem, TraceElement,
};
pub use segments::SegDetails;
pub use snapshot::{fingerprint, GraphSnapshot};
pub use warnings::BuildWarnings;

#[cfg(test)]
mod tests {
    use super::*;
    use weft_diagnostics::DiagnosticSink;

    const RING: &str = r#"
[routing]
channel_width = 4
delayless_switch = "delayless"
wire_to_ipin_switch = "delayless"

[[switch]]
name = "delayless"

[[switch]]
name = "mux"
r = 120.0
tdel = 4e-11

[[segment]]
name = "l1"
directionality = "bidir"
wire_switch = "mux"
r_metal = 10.0
c_metal = 1e-15

[[block_type]]
name = "io"
is_io = true
fc_in = { frac = 1.0 }
fc_out = { frac = 1.0 }
pin_locations = "all_sides"

[[block_type.port]]
name = "outpad"
kind = "input"
num_pins = 1

[[block_type.port]]
name = "inpad"
kind = "output"
num_pins = 1

[[block_type]]
name = "clb"
fc_in = { frac = 1.0 }
fc_out = { frac = 1.0 }
pin_locations = "all_sides"

[[block_type.port]]
name = "I"
kind = "input"
num_pins = 1

[[block_type.port]]
name = "O"
kind = "output"
num_pins = 1

[grid]
nx = 2
ny = 2
io = "io"
fill = "clb"
"#;

    #[test]
    fn graph_from_config_file() {
        let config = weft_config::load_config_from_str(RING).unwrap();
        let resolved = weft_config::resolve(&config).unwrap();
        let sink = DiagnosticSink::new();
        let built =
            build_rr_graph(&resolved.arch, &resolved.grid, &resolved.params, &sink).unwrap();
        let graph = &built.graph;

        assert_eq!((graph.nx(), graph.ny(), graph.chan_width()), (2, 2, 4));
        assert!(!sink.has_errors());
        // 4 clbs and 8 pads, each with two classes and two pins.
        let blocks = graph.nodes().iter().filter(|n| !n.kind.is_wire()).count();
        assert_eq!(blocks, 12 * 4);
        // Length-1 wires: 3 rows of 2 CHANX and 3 columns of 2 CHANY per track.
        let wires = graph.nodes().len() - blocks;
        assert_eq!(wires, (6 + 6) * 4);

        check_rr_graph(graph, &resolved.arch, &resolved.grid, true, &sink).unwrap();
        let snapshot = GraphSnapshot::capture(graph.clone()).unwrap();
        assert_eq!(snapshot.fingerprint(), fingerprint(graph).unwrap());
    }
}
