//! Parsing and validation of `weft.toml` fabric descriptions.
//!
//! A `weft.toml` names switches, wire segments, block types, direct
//! connections, the grid layout and the routing parameters. [`load_config`]
//! parses and validates it; [`resolve`] turns name references into IDs and
//! produces the [`Architecture`](weft_arch::Architecture),
//! [`Grid`](weft_arch::Grid) and [`RoutingParams`](weft_arch::RoutingParams)
//! the graph builder consumes.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_file, load_config_from_str, CONFIG_FILE_NAME};
pub use resolve::{resolve, ResolvedConfig};
pub use types::*;
