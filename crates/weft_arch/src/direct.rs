//! Direct block-to-block connection declarations.

use crate::ids::SwitchId;
use serde::{Deserialize, Serialize};

/// A direct pin-range to pin-range shortcut that bypasses the routing
/// fabric (carry chains and the like).
///
/// Pin ranges use the syntax `type.port[msb:lsb]`, `type.port[i]` or
/// `type.port`; they are parsed when the graph is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectDef {
    /// Direct name, used in error messages.
    pub name: String,
    /// Driving pin range.
    pub from_pin: String,
    /// Receiving pin range.
    pub to_pin: String,
    /// Column offset from the driving block to the receiving block.
    pub x_offset: i32,
    /// Row offset from the driving block to the receiving block.
    pub y_offset: i32,
    /// Switch on the generated edges; the delayless switch when absent.
    pub switch: Option<SwitchId>,
}
