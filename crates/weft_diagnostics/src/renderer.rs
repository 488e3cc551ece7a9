//! Diagnostic rendering backends.

use crate::diagnostic::Diagnostic;

/// Trait for rendering diagnostics into formatted output strings.
pub trait DiagnosticRenderer {
    /// Renders a single diagnostic into a formatted string.
    fn render(&self, diag: &Diagnostic) -> String;
}

/// Renders diagnostics in a rustc-style terminal format.
///
/// Produces output like:
/// ```text
/// warning[W003]: fringe node 57 has no fanin
///   --> (1, 0)
///    = note: possible on a fringe node with low Fc_out
/// ```
pub struct TerminalRenderer {
    /// Whether to use ANSI color codes in output.
    pub color: bool,
}

impl TerminalRenderer {
    /// Creates a new terminal renderer.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint_severity(&self, diag: &Diagnostic) -> String {
        if !self.color {
            return diag.severity.to_string();
        }
        let ansi = match diag.severity {
            crate::Severity::Error => "31",
            crate::Severity::Warning => "33",
            crate::Severity::Note => "36",
        };
        format!("\x1b[1;{ansi}m{}\x1b[0m", diag.severity)
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic) -> String {
        let mut out = format!(
            "{}[{}]: {}\n",
            self.paint_severity(diag),
            diag.code,
            diag.message
        );
        if let Some(loc) = diag.location {
            out.push_str(&format!("  --> {loc}\n"));
        }
        for note in &diag.notes {
            out.push_str(&format!("   = note: {note}\n"));
        }
        for help in &diag.help {
            out.push_str(&format!("   = help: {help}\n"));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::{Category, DiagnosticCode};

    #[test]
    fn render_with_location_and_notes() {
        let diag = Diagnostic::warning(
            DiagnosticCode::new(Category::Warning, 3),
            "fringe node 57 has no fanin",
        )
        .at(1, 0)
        .with_note("possible on a fringe node with low Fc_out")
        .with_help("increase fc_out");
        let output = TerminalRenderer::new(false).render(&diag);
        assert!(output.starts_with("warning[W003]: fringe node 57 has no fanin\n"));
        assert!(output.contains("  --> (1, 0)"));
        assert!(output.contains("= note: possible on a fringe node with low Fc_out"));
        assert!(output.contains("= help: increase fc_out"));
    }

    #[test]
    fn render_without_location() {
        let diag = Diagnostic::error(DiagnosticCode::new(Category::Graph, 101), "bad edge");
        let output = TerminalRenderer::new(false).render(&diag);
        assert_eq!(output, "error[G101]: bad edge\n");
    }

    #[test]
    fn color_wraps_severity() {
        let diag = Diagnostic::error(DiagnosticCode::new(Category::Route, 1), "x");
        let output = TerminalRenderer::new(true).render(&diag);
        assert!(output.starts_with("\x1b[1;31merror\x1b[0m[R001]"));
    }
}
