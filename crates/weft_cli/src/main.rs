//! Weft CLI: builds, validates and inspects routing-resource graphs.
//!
//! Provides `weft build` to construct and check a graph from a `weft.toml`
//! architecture description, `weft check` to validate a routing against it,
//! and `weft dump` to write a plain-text listing of every node and edge.

#![warn(missing_docs)]

mod build;
mod check;
mod dump;
mod pipeline;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use weft_arch::GraphType;

/// Weft: routing-resource graphs for island-style FPGAs.
#[derive(Parser, Debug)]
#[command(name = "weft", version, about = "Weft routing-resource graph toolkit")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a `weft.toml` file or the directory containing one.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build and validate the routing-resource graph.
    Build(BuildArgs),
    /// Validate a routing against the graph.
    Check(CheckArgs),
    /// Write a plain-text dump of the graph.
    Dump(DumpArgs),
}

/// Arguments for the `weft build` subcommand.
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Override the configured channel width.
    #[arg(short = 'w', long)]
    pub channel_width: Option<u32>,

    /// Override the configured graph type.
    #[arg(short, long, value_enum)]
    pub graph_type: Option<CliGraphType>,

    /// Also write a text dump to this file.
    #[arg(long)]
    pub dump: Option<PathBuf>,

    /// Save a binary snapshot of the graph to this file.
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// Output format for diagnostics.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Arguments for the `weft check` subcommand.
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// JSON file holding the placed netlist and the router's traces.
    #[arg(long)]
    pub routing: PathBuf,

    /// Load the graph from a snapshot instead of rebuilding it.
    #[arg(long)]
    pub snapshot: Option<PathBuf>,
}

/// Arguments for the `weft dump` subcommand.
#[derive(Parser, Debug)]
pub struct DumpArgs {
    /// Destination file.
    pub output: PathBuf,

    /// Dump a saved snapshot instead of rebuilding the graph.
    #[arg(long)]
    pub snapshot: Option<PathBuf>,
}

/// Graph type selectable on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CliGraphType {
    /// One wide track per channel.
    Global,
    /// Bidirectional wires.
    Bidir,
    /// Unidirectional wires.
    Unidir,
    /// Unidirectional wires with a tileable channel width.
    UnidirTileable,
}

impl From<CliGraphType> for GraphType {
    fn from(value: CliGraphType) -> Self {
        match value {
            CliGraphType::Global => GraphType::Global,
            CliGraphType::Bidir => GraphType::Bidir,
            CliGraphType::Unidir => GraphType::Unidir,
            CliGraphType::UnidirTileable => GraphType::UnidirTileable,
        }
    }
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from terminal capabilities.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Diagnostic output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose information.
    pub verbose: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to a config file or directory.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => std::env::var("TERM").is_ok_and(|t| t != "dumb"),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
        config: cli.config,
    };

    let result = match cli.command {
        Command::Build(ref args) => build::run(args, &global),
        Command::Check(ref args) => check::run(args, &global),
        Command::Dump(ref args) => dump::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_build_default() {
        let cli = Cli::parse_from(["weft", "build"]);
        match cli.command {
            Command::Build(ref args) => {
                assert!(args.channel_width.is_none());
                assert!(args.graph_type.is_none());
                assert!(args.dump.is_none());
                assert!(args.snapshot.is_none());
                assert_eq!(args.format, ReportFormat::Text);
            }
            _ => panic!("expected Build command"),
        }
    }

    #[test]
    fn parse_build_with_overrides() {
        let cli = Cli::parse_from([
            "weft",
            "build",
            "--channel-width",
            "12",
            "--graph-type",
            "unidir-tileable",
            "--snapshot",
            "g.weft",
        ]);
        match cli.command {
            Command::Build(ref args) => {
                assert_eq!(args.channel_width, Some(12));
                assert_eq!(args.graph_type, Some(CliGraphType::UnidirTileable));
                assert_eq!(args.snapshot.as_deref(), Some(std::path::Path::new("g.weft")));
            }
            _ => panic!("expected Build command"),
        }
    }

    #[test]
    fn parse_check_requires_routing() {
        assert!(Cli::try_parse_from(["weft", "check"]).is_err());
        let cli = Cli::parse_from(["weft", "check", "--routing", "r.json"]);
        assert!(matches!(cli.command, Command::Check(ref a) if a.snapshot.is_none()));
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::parse_from(["weft", "--quiet", "--color", "never", "dump", "out.txt"]);
        assert!(cli.quiet);
        assert!(!cli.verbose);
        assert_eq!(cli.color, ColorChoice::Never);
        assert!(matches!(cli.command, Command::Dump(_)));
    }

    #[test]
    fn graph_type_maps_onto_arch() {
        assert_eq!(GraphType::from(CliGraphType::Global), GraphType::Global);
        assert_eq!(
            GraphType::from(CliGraphType::UnidirTileable),
            GraphType::UnidirTileable
        );
    }
}
