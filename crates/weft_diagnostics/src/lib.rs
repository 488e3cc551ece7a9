//! Diagnostic creation, severity management, and terminal rendering.
//!
//! Graph construction and validation report advisory conditions (clipped Fc,
//! fringe wires without fanin, uncovered tracks) as structured
//! [`Diagnostic`] values. The thread-safe [`DiagnosticSink`] accumulates
//! them and [`TerminalRenderer`] formats them for humans.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::{Diagnostic, GridLoc};
pub use renderer::{DiagnosticRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
