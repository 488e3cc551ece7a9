//! Common result and error types for the weft toolkit.

/// The result type for operations that can only fail because of a bug.
///
/// User-facing problems (bad architecture descriptions, illegal routings)
/// have their own error enums in the crates that detect them. `Err` here
/// means an internal invariant of weft itself was broken.
pub type WeftResult<T> = Result<T, InternalError>;

/// An internal error indicating a bug in weft, not a problem with the input.
#[derive(Debug, thiserror::Error)]
#[error("internal error: {message}")]
pub struct InternalError {
    /// Description of the broken invariant.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}
