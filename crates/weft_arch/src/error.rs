//! Error types for architecture construction.

/// Errors raised while assembling or validating an architecture.
#[derive(Debug, thiserror::Error)]
pub enum ArchError {
    /// A referenced switch does not exist.
    #[error("unknown switch '{0}'")]
    UnknownSwitch(String),

    /// A referenced block type does not exist.
    #[error("unknown block type '{0}'")]
    UnknownBlockType(String),

    /// Two entities of the same kind share a name.
    #[error("duplicate {kind} name '{name}'")]
    DuplicateName {
        /// Entity kind ("switch", "segment", "block type").
        kind: &'static str,
        /// The repeated name.
        name: String,
    },

    /// A block type description is inconsistent.
    #[error("invalid block type '{name}': {reason}")]
    InvalidBlockType {
        /// Block type name.
        name: String,
        /// What is wrong.
        reason: String,
    },

    /// A pin reference does not name a port (or pin) of the block.
    #[error("bad pin name '{text}' for block type '{block}'")]
    BadPinName {
        /// Block type name.
        block: String,
        /// The offending text.
        text: String,
    },

    /// A segment description is inconsistent.
    #[error("invalid segment '{name}': {reason}")]
    InvalidSegment {
        /// Segment name.
        name: String,
        /// What is wrong.
        reason: String,
    },

    /// A grid layout cannot be realized.
    #[error("invalid grid: {reason}")]
    InvalidGrid {
        /// What is wrong.
        reason: String,
    },
}
