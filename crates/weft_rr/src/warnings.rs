//! Non-fatal build outcomes returned alongside the graph.

use serde::{Deserialize, Serialize};
use std::fmt;
use weft_diagnostics::{Category, DiagnosticCode};

/// Bitmask of advisory conditions raised while building a graph.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct BuildWarnings(u8);

impl BuildWarnings {
    /// No warnings.
    pub const NONE: BuildWarnings = BuildWarnings(0);
    /// Some pin's Fc exceeded what the channel could provide.
    pub const FC_CLIPPED: BuildWarnings = BuildWarnings(1);
    /// The segment allocator changed the channel width.
    pub const CHAN_WIDTH_CHANGED: BuildWarnings = BuildWarnings(2);

    /// Raw bits.
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Returns `true` if every bit of `other` is set.
    pub fn contains(self, other: BuildWarnings) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns `true` if no bit is set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Sets the bits of `other`.
    pub fn insert(&mut self, other: BuildWarnings) {
        self.0 |= other.0;
    }
}

impl std::ops::BitOr for BuildWarnings {
    type Output = BuildWarnings;

    fn bitor(self, rhs: BuildWarnings) -> BuildWarnings {
        BuildWarnings(self.0 | rhs.0)
    }
}

impl fmt::Display for BuildWarnings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::new();
        if self.contains(Self::FC_CLIPPED) {
            names.push("FC_CLIPPED");
        }
        if self.contains(Self::CHAN_WIDTH_CHANGED) {
            names.push("CHAN_WIDTH_CHANGED");
        }
        if names.is_empty() {
            f.write_str("none")
        } else {
            f.write_str(&names.join(" | "))
        }
    }
}

/// Diagnostic codes emitted by the builder and validators.
pub mod codes {
    use super::*;

    /// Fc clipped to the channel.
    pub const FC_CLIPPED: DiagnosticCode = DiagnosticCode::new(Category::Warning, 1);
    /// Channel width adjusted by the segment allocator.
    pub const CHAN_WIDTH_CHANGED: DiagnosticCode = DiagnosticCode::new(Category::Warning, 2);
    /// A channel wire has no fanin.
    pub const FRINGE_NO_FANIN: DiagnosticCode = DiagnosticCode::new(Category::Warning, 3);
    /// A non-sink node has no outgoing edges.
    pub const NO_OUT_EDGES: DiagnosticCode = DiagnosticCode::new(Category::Warning, 4);
    /// A track is not reached by any pin of a block type.
    pub const TRACK_UNREACHED: DiagnosticCode = DiagnosticCode::new(Category::Pattern, 1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_operations() {
        let mut w = BuildWarnings::NONE;
        assert!(w.is_empty());
        w.insert(BuildWarnings::FC_CLIPPED);
        assert!(w.contains(BuildWarnings::FC_CLIPPED));
        assert!(!w.contains(BuildWarnings::CHAN_WIDTH_CHANGED));
        let both = w | BuildWarnings::CHAN_WIDTH_CHANGED;
        assert_eq!(both.bits(), 3);
    }

    #[test]
    fn display_names_flags() {
        assert_eq!(BuildWarnings::NONE.to_string(), "none");
        let both = BuildWarnings::FC_CLIPPED | BuildWarnings::CHAN_WIDTH_CHANGED;
        assert_eq!(both.to_string(), "FC_CLIPPED | CHAN_WIDTH_CHANGED");
    }

    #[test]
    fn codes_render_with_prefix() {
        assert_eq!(codes::FC_CLIPPED.to_string(), "W001");
        assert_eq!(codes::TRACK_UNREACHED.to_string(), "P001");
    }
}
