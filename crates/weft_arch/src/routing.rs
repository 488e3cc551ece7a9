//! Global routing parameters chosen per build.

use serde::{Deserialize, Serialize};

/// The kind of routing-resource graph to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphType {
    /// One synthetic longline-like node per channel location; capacity is the
    /// channel width.
    Global,
    /// Bidirectional wires joined by Fs=3 switch blocks.
    Bidir,
    /// Single-driver wires with mux-based switch blocks.
    Unidir,
    /// Unidirectional, with whole segment groups so every tile is identical.
    UnidirTileable,
}

impl GraphType {
    /// Returns `true` for the two unidirectional variants.
    pub fn is_unidir(self) -> bool {
        matches!(self, GraphType::Unidir | GraphType::UnidirTileable)
    }
}

/// Bidirectional switch-block topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchBlockType {
    /// Track `t` connects only to track `t` (disjoint).
    Subset,
    /// Wilton's rotating pattern.
    Wilton,
    /// Universal switch block: symmetric pairing of opposite track ends.
    Universal,
}

/// How the base cost of each indexed cost entry is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseCostType {
    /// Unit cost for every routable resource.
    #[default]
    DemandOnly,
    /// Unit cost scaled down by wire length.
    DemandOnlyNormalizedLength,
}

/// Per-build routing parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingParams {
    /// Graph kind.
    pub graph_type: GraphType,
    /// Requested tracks per channel.
    pub channel_width: u32,
    /// Topology for bidirectional switch blocks.
    pub switch_block_type: SwitchBlockType,
    /// Switch-block flexibility; a multiple of 3.
    pub fs: u32,
    /// Treat an explicit Fc of 0 as the minimum instead of no connection.
    pub ignore_fc_0: bool,
    /// Verify every pass-transistor edge is mirrored.
    pub check_pass_transistors: bool,
    /// Base-cost policy for the indexed cost table.
    pub base_cost_type: BaseCostType,
}

impl RoutingParams {
    /// Detailed bidirectional defaults with the given width.
    pub fn bidir(channel_width: u32) -> Self {
        Self {
            graph_type: GraphType::Bidir,
            channel_width,
            switch_block_type: SwitchBlockType::Wilton,
            fs: 3,
            ignore_fc_0: false,
            check_pass_transistors: true,
            base_cost_type: BaseCostType::DemandOnly,
        }
    }

    /// Unidirectional defaults with the given width.
    pub fn unidir(channel_width: u32) -> Self {
        Self {
            graph_type: GraphType::Unidir,
            ..Self::bidir(channel_width)
        }
    }
}
