//! Error types for graph construction, validation and snapshots.

use std::path::PathBuf;
use weft_arch::ArchError;
use weft_common::InternalError;

/// Errors raised by the routing-resource graph subsystem.
///
/// The first three variants are the message channels a caller reports
/// separately: architecture configuration problems, structural graph
/// violations and routing-trace violations.
#[derive(Debug, thiserror::Error)]
pub enum RrGraphError {
    /// The architecture cannot be turned into a graph.
    #[error("architecture error: {message}")]
    Arch {
        /// Description including the offending declaration.
        message: String,
    },

    /// A structural invariant of the graph is violated.
    #[error("graph error: {message}")]
    Graph {
        /// Description including node id, kind and coordinates.
        message: String,
    },

    /// A routing trace is illegal.
    #[error("route error: {message}")]
    Route {
        /// Description including net and node.
        message: String,
    },

    /// A build parameter is unusable.
    #[error("invalid build option: {0}")]
    InvalidOption(String),

    /// A snapshot file is malformed.
    #[error("invalid snapshot {path}: {reason}")]
    Snapshot {
        /// The snapshot file path.
        path: PathBuf,
        /// What is wrong.
        reason: String,
    },

    /// A bug in graph construction.
    #[error(transparent)]
    Internal(#[from] InternalError),

    /// The graph could not be encoded.
    #[error("serialization error: {reason}")]
    Serialization {
        /// The encoder's message.
        reason: String,
    },

    /// Snapshot or dump I/O failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// The path being accessed.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },
}

impl RrGraphError {
    pub(crate) fn arch(message: impl Into<String>) -> Self {
        RrGraphError::Arch {
            message: message.into(),
        }
    }

    pub(crate) fn graph(message: impl Into<String>) -> Self {
        RrGraphError::Graph {
            message: message.into(),
        }
    }

    pub(crate) fn route(message: impl Into<String>) -> Self {
        RrGraphError::Route {
            message: message.into(),
        }
    }
}

impl From<ArchError> for RrGraphError {
    fn from(err: ArchError) -> Self {
        RrGraphError::arch(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channels_are_distinct() {
        assert!(RrGraphError::arch("Range mismatch from clb.cout to clb.cin")
            .to_string()
            .starts_with("architecture error:"));
        assert!(RrGraphError::graph("node 3 has no fanin")
            .to_string()
            .starts_with("graph error:"));
        assert!(RrGraphError::route("net 0 is not a tree")
            .to_string()
            .starts_with("route error:"));
    }

    #[test]
    fn arch_error_converts() {
        let err: RrGraphError = ArchError::UnknownBlockType("dsp".to_string()).into();
        assert_eq!(
            err.to_string(),
            "architecture error: unknown block type 'dsp'"
        );
    }

    #[test]
    fn internal_error_is_transparent() {
        let err: RrGraphError = InternalError::new("CHANX node 9 lies outside the grid").into();
        assert_eq!(
            err.to_string(),
            "internal error: CHANX node 9 lies outside the grid"
        );
    }
}
