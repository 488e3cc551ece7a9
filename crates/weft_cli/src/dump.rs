//! `weft dump`: write the plain-text listing of a graph.

use std::io::Write;

use weft_diagnostics::DiagnosticSink;

use crate::pipeline::{load_resolved, obtain_graph};
use crate::{DumpArgs, GlobalArgs};

/// Runs the `weft dump` command.
pub fn run(args: &DumpArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let resolved = load_resolved(global)?;
    let sink = DiagnosticSink::new();
    let graph = obtain_graph(&resolved, args.snapshot.as_deref(), &sink, global)?;

    let mut out = std::io::BufWriter::new(std::fs::File::create(&args.output)?);
    weft_rr::dump_rr_graph(&graph, &mut out)?;
    out.flush()?;

    if !global.quiet {
        eprintln!(
            "   Wrote {} nodes to {}",
            graph.num_nodes(),
            args.output.display()
        );
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::tests::{global, project};
    use weft_rr::GraphSnapshot;

    #[test]
    fn snapshot_and_rebuild_dump_identically() {
        let dir = project();
        let g = global(dir.path());

        let rebuilt = dir.path().join("rebuilt.txt");
        let args = DumpArgs {
            output: rebuilt.clone(),
            snapshot: None,
        };
        assert_eq!(run(&args, &g).unwrap(), 0);

        let resolved = load_resolved(&g).unwrap();
        let sink = DiagnosticSink::new();
        let graph = obtain_graph(&resolved, None, &sink, &g).unwrap();
        let snap_path = dir.path().join("g.weft");
        GraphSnapshot::capture(graph).unwrap().write(&snap_path).unwrap();

        let loaded = dir.path().join("loaded.txt");
        let args = DumpArgs {
            output: loaded.clone(),
            snapshot: Some(snap_path),
        };
        assert_eq!(run(&args, &g).unwrap(), 0);

        assert_eq!(
            std::fs::read_to_string(rebuilt).unwrap(),
            std::fs::read_to_string(loaded).unwrap()
        );
    }
}
