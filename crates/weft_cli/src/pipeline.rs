//! Shared steps for CLI commands: locating and resolving the configuration,
//! building the graph and rendering diagnostics.

use std::path::{Path, PathBuf};

use weft_config::{ResolvedConfig, CONFIG_FILE_NAME};
use weft_diagnostics::{DiagnosticRenderer, DiagnosticSink, TerminalRenderer};
use weft_rr::{BuiltGraph, GraphSnapshot, RrGraph, RrNodeKind};

use crate::{GlobalArgs, ReportFormat};

/// Resolves the configuration file from `--config`.
///
/// A directory means the `weft.toml` inside it; no flag means `weft.toml` in
/// the current directory.
pub fn config_path(global: &GlobalArgs) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let path = match &global.config {
        Some(p) => PathBuf::from(p),
        None => std::env::current_dir()?,
    };
    if path.is_dir() {
        Ok(path.join(CONFIG_FILE_NAME))
    } else {
        Ok(path)
    }
}

/// Loads and resolves the configuration.
pub fn load_resolved(global: &GlobalArgs) -> Result<ResolvedConfig, Box<dyn std::error::Error>> {
    let path = config_path(global)?;
    if global.verbose {
        eprintln!("   Loading {}", path.display());
    }
    let config = weft_config::load_config_file(&path)?;
    Ok(weft_config::resolve(&config)?)
}

/// Builds the graph for `resolved`, reporting diagnostics into `sink`.
pub fn build_graph(
    resolved: &ResolvedConfig,
    sink: &DiagnosticSink,
) -> Result<BuiltGraph, weft_rr::RrGraphError> {
    weft_rr::build_rr_graph(&resolved.arch, &resolved.grid, &resolved.params, sink)
}

/// Returns the graph from `snapshot` if given, otherwise builds it.
///
/// A snapshot must have been built for the same grid.
pub fn obtain_graph(
    resolved: &ResolvedConfig,
    snapshot: Option<&Path>,
    sink: &DiagnosticSink,
    global: &GlobalArgs,
) -> Result<RrGraph, Box<dyn std::error::Error>> {
    let Some(path) = snapshot else {
        return Ok(build_graph(resolved, sink)?.graph);
    };
    let graph = GraphSnapshot::read(path)?.into_graph();
    let (nx, ny) = (resolved.grid.nx(), resolved.grid.ny());
    if (graph.nx(), graph.ny()) != (nx, ny) {
        return Err(format!(
            "snapshot {} was built for a {}x{} grid, but the configuration describes {nx}x{ny}",
            path.display(),
            graph.nx(),
            graph.ny()
        )
        .into());
    }
    if global.verbose {
        eprintln!("   Loaded {} ({} nodes)", path.display(), graph.num_nodes());
    }
    Ok(graph)
}

/// Prints accumulated diagnostics in the requested format.
pub fn render_diagnostics(sink: &DiagnosticSink, format: ReportFormat, global: &GlobalArgs) {
    let diagnostics = sink.diagnostics();
    if diagnostics.is_empty() {
        return;
    }
    match format {
        ReportFormat::Text => {
            let renderer = TerminalRenderer::new(global.color);
            for diag in &diagnostics {
                eprintln!("{}", renderer.render(diag));
            }
            if !global.quiet {
                eprintln!(
                    "   Result: {} error(s), {} warning(s)",
                    sink.error_count(),
                    sink.warning_count()
                );
            }
        }
        ReportFormat::Json => {
            let json =
                serde_json::to_string_pretty(&diagnostics).unwrap_or_else(|_| "[]".to_string());
            println!("{json}");
        }
    }
}

/// Node counts per kind, in kind order.
pub fn kind_counts(graph: &RrGraph) -> Vec<(RrNodeKind, usize)> {
    RrNodeKind::ALL
        .iter()
        .map(|&kind| {
            let count = graph.nodes().iter().filter(|n| n.kind == kind).count();
            (kind, count)
        })
        .collect()
}
