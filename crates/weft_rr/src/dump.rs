//! Plain-text dump of a built graph for offline diffing.

use crate::graph::RrGraph;
use std::io::{self, Write};

fn opt<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// Writes one line per node, then the indexed cost table.
pub fn dump_rr_graph(graph: &RrGraph, out: &mut impl Write) -> io::Result<()> {
    for id in graph.node_ids() {
        let n = graph.node(id);
        write!(
            out,
            "Node: {id} {} ({},{}) to ({},{}) Ptc: {} Direction: {} Drivers: {} \
             Capacity: {} Occ: {} R: {:e} C: {:e} Cost index: {} Fan-in: {}",
            n.kind,
            n.xlow,
            n.ylow,
            n.xhigh,
            n.yhigh,
            n.ptc,
            opt(n.direction),
            opt(n.drivers),
            n.capacity,
            n.occ,
            n.r,
            n.c,
            n.cost_index,
            n.fan_in,
        )?;
        let edges = graph.edges(id);
        write!(out, " Edges:")?;
        for e in edges {
            write!(out, " {}", e.to)?;
        }
        write!(out, " Switches:")?;
        for e in edges {
            write!(out, " {}", e.switch)?;
        }
        writeln!(out)?;
    }

    writeln!(out)?;
    for (index, d) in graph.indexed_data().iter().enumerate() {
        writeln!(
            out,
            "Cost index {index}: base {:e} saved {:e} ortho {} seg {} inv_length {:e} \
             T_linear {:e} T_quadratic {:e} C_load {:e}",
            d.base_cost,
            d.saved_base_cost,
            opt(d.ortho_cost_index),
            opt(d.seg_index),
            d.inv_length,
            d.t_linear,
            d.t_quadratic,
            d.c_load,
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::tests::small_graph;

    #[test]
    fn one_line_per_node_then_costs() {
        let (_, _, graph) = small_graph();
        let mut out = Vec::new();
        dump_rr_graph(&graph, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let node_lines: Vec<&str> = text.lines().take_while(|l| !l.is_empty()).collect();
        assert_eq!(node_lines.len(), graph.num_nodes());
        assert!(node_lines[0].starts_with("Node: 0 "), "{}", node_lines[0]);
        assert!(node_lines.iter().any(|l| l.contains(" CHANY (0,1) to (0,1) ")));
        assert!(text.contains("Direction: BI_DIRECTION Drivers: MULTI_BUFFERED"));
        let cost_lines = text.lines().filter(|l| l.starts_with("Cost index ")).count();
        assert_eq!(cost_lines, graph.indexed_data().len());
    }

    #[test]
    fn dump_is_stable() {
        let (_, _, a) = small_graph();
        let (_, _, b) = small_graph();
        let (mut x, mut y) = (Vec::new(), Vec::new());
        dump_rr_graph(&a, &mut x).unwrap();
        dump_rr_graph(&b, &mut y).unwrap();
        assert_eq!(x, y);
    }
}
