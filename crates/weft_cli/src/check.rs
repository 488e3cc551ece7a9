//! `weft check`: validate a routing against the graph.

use serde::{Deserialize, Serialize};
use weft_diagnostics::DiagnosticSink;
use weft_rr::{RouteTraces, RoutingProblem};

use crate::pipeline::{load_resolved, obtain_graph, render_diagnostics};
use crate::{CheckArgs, GlobalArgs, ReportFormat};

/// Contents of a `--routing` JSON file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoutingFile {
    /// The placed netlist.
    pub problem: RoutingProblem,
    /// The router's output for it.
    pub traces: RouteTraces,
}

/// Runs the `weft check` command. Returns 1 if the routing is illegal.
pub fn run(args: &CheckArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let resolved = load_resolved(global)?;
    let text = std::fs::read_to_string(&args.routing)
        .map_err(|e| format!("failed to read {}: {e}", args.routing.display()))?;
    let routing: RoutingFile = serde_json::from_str(&text)
        .map_err(|e| format!("failed to parse {}: {e}", args.routing.display()))?;

    let sink = DiagnosticSink::new();
    let mut graph = obtain_graph(&resolved, args.snapshot.as_deref(), &sink, global)?;
    render_diagnostics(&sink, ReportFormat::Text, global);

    match weft_rr::check_route(
        &mut graph,
        &resolved.arch,
        &resolved.grid,
        &routing.problem,
        &routing.traces,
    ) {
        Ok(()) => {
            if !global.quiet {
                eprintln!(
                    "   Routing of {} net(s) is legal",
                    routing.problem.nets.len()
                );
            }
            Ok(0)
        }
        Err(e) => {
            eprintln!("error: {e}");
            Ok(1)
        }
    }
}
