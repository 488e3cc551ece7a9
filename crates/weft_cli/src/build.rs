//! `weft build`: construct and validate the routing-resource graph.

use std::io::Write;

use weft_diagnostics::DiagnosticSink;
use weft_rr::GraphSnapshot;

use crate::pipeline::{build_graph, kind_counts, load_resolved, render_diagnostics};
use crate::{BuildArgs, GlobalArgs};

/// Runs the `weft build` command.
///
/// Loads the configuration, applies command-line overrides, builds the graph
/// and optionally writes a dump and a snapshot. Returns exit code 0 on
/// success, 1 if the build failed or reported errors.
pub fn run(args: &BuildArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let mut resolved = load_resolved(global)?;
    if let Some(width) = args.channel_width {
        resolved.params.channel_width = width;
    }
    if let Some(graph_type) = args.graph_type {
        resolved.params.graph_type = graph_type.into();
    }

    if !global.quiet {
        eprintln!(
            "   Building {:?} graph on a {}x{} grid, W = {}",
            resolved.params.graph_type,
            resolved.grid.nx(),
            resolved.grid.ny(),
            resolved.params.channel_width
        );
    }

    let sink = DiagnosticSink::new();
    let built = match build_graph(&resolved, &sink) {
        Ok(built) => built,
        Err(e) => {
            render_diagnostics(&sink, args.format, global);
            eprintln!("error: {e}");
            return Ok(1);
        }
    };
    render_diagnostics(&sink, args.format, global);
    let graph = &built.graph;

    if let Some(path) = &args.dump {
        let mut out = std::io::BufWriter::new(std::fs::File::create(path)?);
        weft_rr::dump_rr_graph(graph, &mut out)?;
        out.flush()?;
    }
    let snapshot = GraphSnapshot::capture(built.graph.clone())?;
    if let Some(path) = &args.snapshot {
        snapshot.write(path)?;
    }

    if !global.quiet {
        eprintln!(
            "   Built {} nodes, {} edges, W = {}",
            graph.num_nodes(),
            graph.num_edges(),
            graph.chan_width()
        );
        if global.verbose {
            for (kind, count) in kind_counts(graph) {
                eprintln!("   {:>8} {count}", kind.to_string());
            }
        }
        eprintln!("   Warnings: {}", built.warnings);
        eprintln!("   Fingerprint: {}", snapshot.fingerprint());
    }

    if sink.has_errors() {
        Ok(1)
    } else {
        Ok(0)
    }
}
