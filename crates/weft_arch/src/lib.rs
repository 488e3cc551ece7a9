//! FPGA fabric architecture model for routing-resource graph construction.
//!
//! An [`Architecture`] is a set of arenas (switches, wire segments, block
//! types, direct connections) addressed by the opaque IDs in [`ids`],
//! together with the special switches the graph builder needs. The
//! [`Grid`] assigns block types to tiles.
//!
//! ```
//! use weft_arch::{Architecture, ArchSwitch};
//!
//! let mut arch = Architecture::new();
//! let sw = arch.add_switch(ArchSwitch::delayless("delayless")).unwrap();
//! assert_eq!(arch.switch(sw).name, "delayless");
//! ```

#![warn(missing_docs)]

pub mod block;
pub mod direct;
pub mod error;
pub mod grid;
pub mod ids;
pub mod routing;
pub mod side;
pub mod types;

pub use block::{
    perimeter_slots, BlockType, BlockTypeDef, CustomPinLoc, PinClass, PinClassKind,
    PinLocations, Port, PortKind,
};
pub use direct::DirectDef;
pub use error::ArchError;
pub use grid::{ColumnDef, Grid, GridLayout, GridTile};
pub use ids::{BlockTypeId, SegmentId, SwitchId};
pub use routing::{BaseCostType, GraphType, RoutingParams, SwitchBlockType};
pub use side::Side;
pub use types::{ArchSwitch, Directionality, FcSpec, SegmentDef};

use serde::{Deserialize, Serialize};

/// The fabric description consumed by the graph builder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Architecture {
    /// All switch types; indices are edge switch indices.
    pub switches: Vec<ArchSwitch>,
    /// All wire segment types.
    pub segments: Vec<SegmentDef>,
    /// All block types.
    pub block_types: Vec<BlockType>,
    /// Direct connections.
    pub directs: Vec<DirectDef>,
    /// Zero-delay switch for SOURCE/SINK hookups and default directs.
    pub delayless_switch: SwitchId,
    /// Switch from a wire into a block input pin.
    pub wire_to_ipin_switch: SwitchId,
    /// Switch used for the synthetic wire of global-routing graphs.
    pub global_route_switch: SwitchId,
}

impl Architecture {
    /// Creates an empty architecture.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a switch and returns its ID.
    pub fn add_switch(&mut self, switch: ArchSwitch) -> Result<SwitchId, ArchError> {
        if self.switch_by_name(&switch.name).is_some() {
            return Err(ArchError::DuplicateName {
                kind: "switch",
                name: switch.name,
            });
        }
        let id = SwitchId::from_raw(self.switches.len() as u32);
        self.switches.push(switch);
        Ok(id)
    }

    /// Adds a segment type after checking its patterns and switch references.
    pub fn add_segment(&mut self, segment: SegmentDef) -> Result<SegmentId, ArchError> {
        let invalid = |reason: &str| ArchError::InvalidSegment {
            name: segment.name.clone(),
            reason: reason.to_string(),
        };
        if self.segments.iter().any(|s| s.name == segment.name) {
            return Err(ArchError::DuplicateName {
                kind: "segment",
                name: segment.name,
            });
        }
        if segment.length == 0 && !segment.longline {
            return Err(invalid("length must be at least 1"));
        }
        if segment.frequency == 0 {
            return Err(invalid("frequency must be positive"));
        }
        if segment.cb.is_empty() {
            return Err(invalid("cb pattern needs at least 1 entry"));
        }
        if segment.sb.len() < 2 {
            return Err(invalid("sb pattern needs at least 2 entries"));
        }
        for sw in [segment.wire_switch, segment.opin_switch] {
            if sw.index() >= self.switches.len() {
                return Err(invalid(&format!("switch index {sw} out of range")));
            }
        }
        let id = SegmentId::from_raw(self.segments.len() as u32);
        self.segments.push(segment);
        Ok(id)
    }

    /// Adds a block type, deriving its pin tables.
    pub fn add_block_type(&mut self, def: BlockTypeDef) -> Result<BlockTypeId, ArchError> {
        if self.block_type_by_name(&def.name).is_some() {
            return Err(ArchError::DuplicateName {
                kind: "block type",
                name: def.name,
            });
        }
        let id = BlockTypeId::from_raw(self.block_types.len() as u32);
        self.block_types.push(BlockType::from_def(def)?);
        Ok(id)
    }

    /// Adds a direct connection declaration.
    pub fn add_direct(&mut self, direct: DirectDef) {
        self.directs.push(direct);
    }

    /// Returns the switch with the given ID.
    pub fn switch(&self, id: SwitchId) -> &ArchSwitch {
        &self.switches[id.index()]
    }

    /// Returns the segment type with the given ID.
    pub fn segment(&self, id: SegmentId) -> &SegmentDef {
        &self.segments[id.index()]
    }

    /// Returns the block type with the given ID.
    pub fn block_type(&self, id: BlockTypeId) -> &BlockType {
        &self.block_types[id.index()]
    }

    /// Looks up a switch by name.
    pub fn switch_by_name(&self, name: &str) -> Option<SwitchId> {
        self.switches
            .iter()
            .position(|s| s.name == name)
            .map(|i| SwitchId::from_raw(i as u32))
    }

    /// Looks up a block type by name.
    pub fn block_type_by_name(&self, name: &str) -> Option<BlockTypeId> {
        self.block_types
            .iter()
            .position(|b| b.name == name)
            .map(|i| BlockTypeId::from_raw(i as u32))
    }

    /// Checks that the special switches and direct switches exist.
    pub fn validate(&self) -> Result<(), ArchError> {
        let specials = [
            self.delayless_switch,
            self.wire_to_ipin_switch,
            self.global_route_switch,
        ];
        for sw in specials
            .into_iter()
            .chain(self.directs.iter().filter_map(|d| d.switch))
        {
            if sw.index() >= self.switches.len() {
                return Err(ArchError::UnknownSwitch(format!("#{sw}")));
            }
        }
        Ok(())
    }
}
