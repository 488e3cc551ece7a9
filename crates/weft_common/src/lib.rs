//! Shared foundational types used across the weft routing-graph toolkit.
//!
//! Provides the internal-error result type used for "this is a bug" paths
//! and the content hash used to fingerprint built graphs and snapshots.

#![warn(missing_docs)]

pub mod hash;
pub mod result;

pub use hash::ContentHash;
pub use result::{InternalError, WeftResult};
