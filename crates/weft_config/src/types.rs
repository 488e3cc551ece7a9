//! Configuration types deserialized from `weft.toml`.

use serde::Deserialize;
use weft_arch::{
    BaseCostType, BlockTypeDef, Directionality, GraphType, GridLayout, SwitchBlockType,
};

/// The top-level configuration.
#[derive(Debug, Deserialize)]
pub struct WeftConfig {
    /// Routing parameters.
    pub routing: RoutingConfig,
    /// Switch types.
    #[serde(default, rename = "switch")]
    pub switches: Vec<SwitchConfig>,
    /// Wire segment types.
    #[serde(default, rename = "segment")]
    pub segments: Vec<SegmentConfig>,
    /// Block types.
    #[serde(default, rename = "block_type")]
    pub block_types: Vec<BlockTypeDef>,
    /// Direct connections.
    #[serde(default, rename = "direct")]
    pub directs: Vec<DirectConfig>,
    /// Grid layout.
    pub grid: GridLayout,
}

/// The `[routing]` table.
#[derive(Debug, Deserialize)]
pub struct RoutingConfig {
    /// Graph kind.
    #[serde(default = "default_graph_type")]
    pub graph_type: GraphType,
    /// Requested tracks per channel.
    pub channel_width: u32,
    /// Bidirectional switch-block topology.
    #[serde(default = "default_switch_block_type")]
    pub switch_block_type: SwitchBlockType,
    /// Switch-block flexibility.
    #[serde(default = "default_fs")]
    pub fs: u32,
    /// Treat explicit Fc = 0 as the minimum.
    #[serde(default)]
    pub ignore_fc_0: bool,
    /// Verify pass-transistor edges are mirrored.
    #[serde(default = "default_true")]
    pub check_pass_transistors: bool,
    /// Base-cost policy.
    #[serde(default)]
    pub base_cost_type: BaseCostType,
    /// Name of the zero-delay switch.
    pub delayless_switch: String,
    /// Name of the wire-to-input-pin switch.
    pub wire_to_ipin_switch: String,
    /// Name of the switch for global-routing wires; the delayless switch
    /// when absent.
    #[serde(default)]
    pub global_route_switch: Option<String>,
}

fn default_graph_type() -> GraphType {
    GraphType::Bidir
}

fn default_switch_block_type() -> SwitchBlockType {
    SwitchBlockType::Wilton
}

fn default_fs() -> u32 {
    3
}

fn default_true() -> bool {
    true
}

/// A `[[switch]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct SwitchConfig {
    /// Switch name.
    pub name: String,
    /// Buffered (mux / tri-state) rather than pass transistor.
    #[serde(default = "default_true")]
    pub buffered: bool,
    /// Resistance.
    #[serde(default)]
    pub r: f32,
    /// Input capacitance.
    #[serde(default)]
    pub cin: f32,
    /// Output capacitance.
    #[serde(default)]
    pub cout: f32,
    /// Intrinsic delay.
    #[serde(default)]
    pub tdel: f32,
}

/// A `[[segment]]` entry. Switches are referenced by name.
#[derive(Debug, Clone, Deserialize)]
pub struct SegmentConfig {
    /// Segment name.
    pub name: String,
    /// Length in blocks; ignored for longlines.
    #[serde(default = "default_length")]
    pub length: u32,
    /// Relative channel share.
    #[serde(default = "default_frequency")]
    pub frequency: u32,
    /// Spans the whole chip.
    #[serde(default)]
    pub longline: bool,
    /// Wire directionality.
    pub directionality: Directionality,
    /// Switch driving this wire from other wires.
    pub wire_switch: String,
    /// Switch driving this wire from output pins; the wire switch when absent.
    #[serde(default)]
    pub opin_switch: Option<String>,
    /// Metal resistance per block.
    #[serde(default)]
    pub r_metal: f32,
    /// Metal capacitance per block.
    #[serde(default)]
    pub c_metal: f32,
    /// Connection-block pattern; all positions when absent.
    #[serde(default)]
    pub cb: Option<Vec<bool>>,
    /// Switch-block pattern; all junctions when absent.
    #[serde(default)]
    pub sb: Option<Vec<bool>>,
}

fn default_length() -> u32 {
    1
}

fn default_frequency() -> u32 {
    1
}

/// A `[[direct]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectConfig {
    /// Direct name.
    pub name: String,
    /// Driving pin range, `type.port[msb:lsb]`.
    pub from_pin: String,
    /// Receiving pin range.
    pub to_pin: String,
    /// Column offset.
    #[serde(default)]
    pub x_offset: i32,
    /// Row offset.
    #[serde(default)]
    pub y_offset: i32,
    /// Switch name; the delayless switch when absent.
    #[serde(default)]
    pub switch: Option<String>,
}
