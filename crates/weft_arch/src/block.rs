//! Physical block types, their pins, pin classes and pin placement.
//!
//! A block type is described by a [`BlockTypeDef`] (pure data, as written in
//! a configuration file). [`BlockType::from_def`] derives the per-pin tables
//! the graph builder needs: pin classes, global-pin flags, and the
//! (pin, height offset, side) placement map.

use crate::error::ArchError;
use crate::side::Side;
use crate::types::FcSpec;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Direction of a block port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortKind {
    /// Receives signals from the routing fabric.
    Input,
    /// Drives signals into the routing fabric.
    Output,
    /// Clock input. Always a global pin.
    Clock,
}

/// A named group of pins on a block type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    /// Port name, used in direct declarations and custom pin locations.
    pub name: String,
    /// Port direction.
    pub kind: PortKind,
    /// Number of pins in the port.
    pub num_pins: u32,
    /// Pins are logically equivalent (form one pin class).
    #[serde(default)]
    pub equivalent: bool,
    /// Pins are routed on a dedicated global network, not the fabric.
    #[serde(default)]
    pub global: bool,
    /// Per-port Fc override.
    #[serde(default)]
    pub fc: Option<FcSpec>,
}

/// Whether a pin class drives or receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PinClassKind {
    /// Output pins; the class becomes a SOURCE node.
    Driver,
    /// Input pins; the class becomes a SINK node.
    Receiver,
}

/// A set of logically equivalent pins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinClass {
    /// Driver or receiver.
    pub kind: PinClassKind,
    /// Block pin numbers belonging to the class.
    pub pins: Vec<u32>,
}

/// One entry of a custom pin placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomPinLoc {
    /// Side of the block.
    pub side: Side,
    /// Height offset from the anchor tile.
    #[serde(default)]
    pub offset: u32,
    /// Pins placed here, as `port` (all pins) or `port[i]`.
    pub pins: Vec<String>,
}

/// How pins are distributed over the block perimeter.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinLocations {
    /// Round-robin over the perimeter slots, one slot per pin.
    #[default]
    Spread,
    /// Every pin on every perimeter slot (typical for I/O pads).
    AllSides,
    /// Explicit placement.
    Custom(Vec<CustomPinLoc>),
}

/// Serializable description of a block type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockTypeDef {
    /// Block type name.
    pub name: String,
    /// Number of grid rows the block occupies.
    #[serde(default = "default_height")]
    pub height: u32,
    /// Ports in pin-number order.
    #[serde(default, rename = "port")]
    pub ports: Vec<Port>,
    /// Default Fc for input pins.
    pub fc_in: FcSpec,
    /// Default Fc for output pins.
    pub fc_out: FcSpec,
    /// Pin placement.
    #[serde(default)]
    pub pin_locations: PinLocations,
    /// The block is an I/O pad.
    #[serde(default)]
    pub is_io: bool,
}

fn default_height() -> u32 {
    1
}

/// A block type with derived pin tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockType {
    /// Block type name.
    pub name: String,
    /// Number of grid rows the block occupies.
    pub height: u32,
    /// Ports in pin-number order.
    pub ports: Vec<Port>,
    /// Default Fc for input pins.
    pub fc_in: FcSpec,
    /// Default Fc for output pins.
    pub fc_out: FcSpec,
    /// The block is an I/O pad.
    pub is_io: bool,
    classes: Vec<PinClass>,
    pin_class: Vec<u32>,
    pin_port: Vec<u32>,
    pin_global: Vec<bool>,
    /// Flattened `[pin][offset][side]` placement map.
    pinloc: Vec<bool>,
}

impl BlockType {
    /// Builds a block type and derives its pin classes and placement map.
    pub fn from_def(def: BlockTypeDef) -> Result<Self, ArchError> {
        if def.height == 0 {
            return Err(ArchError::InvalidBlockType {
                name: def.name,
                reason: "height must be at least 1".to_string(),
            });
        }

        let mut classes = Vec::new();
        let mut pin_class = Vec::new();
        let mut pin_port = Vec::new();
        let mut pin_global = Vec::new();
        let mut next_pin = 0u32;
        for (port_index, port) in def.ports.iter().enumerate() {
            let kind = match port.kind {
                PortKind::Output => PinClassKind::Driver,
                PortKind::Input | PortKind::Clock => PinClassKind::Receiver,
            };
            let global = port.global || port.kind == PortKind::Clock;
            let pins: Vec<u32> = (next_pin..next_pin + port.num_pins).collect();
            if port.equivalent {
                pin_class.extend(std::iter::repeat(classes.len() as u32).take(pins.len()));
                classes.push(PinClass { kind, pins });
            } else {
                for pin in pins {
                    pin_class.push(classes.len() as u32);
                    classes.push(PinClass {
                        kind,
                        pins: vec![pin],
                    });
                }
            }
            pin_port.extend(std::iter::repeat(port_index as u32).take(port.num_pins as usize));
            pin_global.extend(std::iter::repeat(global).take(port.num_pins as usize));
            next_pin += port.num_pins;
        }

        let mut block = Self {
            name: def.name,
            height: def.height,
            ports: def.ports,
            fc_in: def.fc_in,
            fc_out: def.fc_out,
            is_io: def.is_io,
            classes,
            pin_class,
            pin_port,
            pin_global,
            pinloc: vec![false; next_pin as usize * def.height as usize * 4],
        };
        block.place_pins(&def.pin_locations)?;
        Ok(block)
    }

    fn place_pins(&mut self, locations: &PinLocations) -> Result<(), ArchError> {
        let slots = perimeter_slots(self.height);
        match locations {
            PinLocations::Spread => {
                for pin in 0..self.num_pins() {
                    let (offset, side) = slots[pin as usize % slots.len()];
                    self.set_pinloc(pin, offset, side);
                }
            }
            PinLocations::AllSides => {
                for pin in 0..self.num_pins() {
                    for &(offset, side) in &slots {
                        self.set_pinloc(pin, offset, side);
                    }
                }
            }
            PinLocations::Custom(locs) => {
                for loc in locs {
                    let legal = loc.offset < self.height
                        && match loc.side {
                            Side::Top => loc.offset == self.height - 1,
                            Side::Bottom => loc.offset == 0,
                            Side::Left | Side::Right => true,
                        };
                    if !legal {
                        return Err(ArchError::InvalidBlockType {
                            name: self.name.clone(),
                            reason: format!(
                                "pins cannot be placed on side {} at offset {}",
                                loc.side, loc.offset
                            ),
                        });
                    }
                    for pin_name in &loc.pins {
                        for pin in self.resolve_pin_name(pin_name)? {
                            self.set_pinloc(pin, loc.offset, loc.side);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Resolves `port` or `port[i]` to block pin numbers.
    fn resolve_pin_name(&self, text: &str) -> Result<Range<u32>, ArchError> {
        let bad = || ArchError::BadPinName {
            block: self.name.clone(),
            text: text.to_string(),
        };
        let (port_name, index) = match text.split_once('[') {
            Some((name, rest)) => {
                let idx = rest
                    .strip_suffix(']')
                    .and_then(|s| s.trim().parse::<u32>().ok())
                    .ok_or_else(bad)?;
                (name, Some(idx))
            }
            None => (text, None),
        };
        let range = self.port_pins(port_name).ok_or_else(bad)?;
        match index {
            None => Ok(range),
            Some(i) if i < range.end - range.start => Ok(range.start + i..range.start + i + 1),
            Some(_) => Err(bad()),
        }
    }

    fn set_pinloc(&mut self, pin: u32, offset: u32, side: Side) {
        let idx = self.pinloc_index(pin, offset, side);
        self.pinloc[idx] = true;
    }

    fn pinloc_index(&self, pin: u32, offset: u32, side: Side) -> usize {
        ((pin as usize * self.height as usize) + offset as usize) * 4 + side.index()
    }

    /// Total number of pins.
    pub fn num_pins(&self) -> u32 {
        self.pin_class.len() as u32
    }

    /// All pin classes.
    pub fn classes(&self) -> &[PinClass] {
        &self.classes
    }

    /// The class containing `pin`.
    pub fn class_of(&self, pin: u32) -> u32 {
        self.pin_class[pin as usize]
    }

    /// Driver/receiver kind of `pin`.
    pub fn pin_kind(&self, pin: u32) -> PinClassKind {
        self.classes[self.class_of(pin) as usize].kind
    }

    /// Returns `true` if `pin` is routed on a global network.
    pub fn is_global_pin(&self, pin: u32) -> bool {
        self.pin_global[pin as usize]
    }

    /// Returns `true` if `pin` is present on `side` of the tile at `offset`.
    pub fn pin_at(&self, pin: u32, offset: u32, side: Side) -> bool {
        offset < self.height && self.pinloc[self.pinloc_index(pin, offset, side)]
    }

    /// The port a pin belongs to.
    pub fn port_of(&self, pin: u32) -> &Port {
        &self.ports[self.pin_port[pin as usize] as usize]
    }

    /// Pin-number range of the named port.
    pub fn port_pins(&self, name: &str) -> Option<Range<u32>> {
        let mut start = 0;
        for port in &self.ports {
            if port.name == name {
                return Some(start..start + port.num_pins);
            }
            start += port.num_pins;
        }
        None
    }

    /// The Fc specification governing `pin`.
    pub fn fc_for_pin(&self, pin: u32) -> FcSpec {
        let port = self.port_of(pin);
        port.fc.unwrap_or(match self.pin_kind(pin) {
            PinClassKind::Driver => self.fc_out,
            PinClassKind::Receiver => self.fc_in,
        })
    }
}

/// Perimeter slots of a block of the given height in canonical clockwise
/// order: LEFT bottom to top, TOP, RIGHT top to bottom, BOTTOM.
pub fn perimeter_slots(height: u32) -> Vec<(u32, Side)> {
    let mut slots = Vec::with_capacity(2 * height as usize + 2);
    slots.extend((0..height).map(|h| (h, Side::Left)));
    slots.push((height - 1, Side::Top));
    slots.extend((0..height).rev().map(|h| (h, Side::Right)));
    slots.push((0, Side::Bottom));
    slots
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port(name: &str, kind: PortKind, num_pins: u32, equivalent: bool) -> Port {
        Port {
            name: name.to_string(),
            kind,
            num_pins,
            equivalent,
            global: false,
            fc: None,
        }
    }

    fn clb_def(locations: PinLocations) -> BlockTypeDef {
        BlockTypeDef {
            name: "clb".to_string(),
            height: 1,
            ports: vec![
                port("I", PortKind::Input, 4, true),
                port("O", PortKind::Output, 2, false),
                port("clk", PortKind::Clock, 1, false),
            ],
            fc_in: FcSpec::Frac(0.5),
            fc_out: FcSpec::Abs(2),
            pin_locations: locations,
            is_io: false,
        }
    }

    #[test]
    fn classes_follow_equivalence() {
        let clb = BlockType::from_def(clb_def(PinLocations::Spread)).unwrap();
        assert_eq!(clb.num_pins(), 7);
        // I is one class, each O pin its own class, clk its own class
        assert_eq!(clb.classes().len(), 4);
        assert_eq!(clb.classes()[0].pins, vec![0, 1, 2, 3]);
        assert_eq!(clb.class_of(4), 1);
        assert_eq!(clb.class_of(5), 2);
        assert_eq!(clb.pin_kind(5), PinClassKind::Driver);
        assert_eq!(clb.pin_kind(6), PinClassKind::Receiver);
        assert!(clb.is_global_pin(6));
        assert!(!clb.is_global_pin(0));
    }

    #[test]
    fn spread_round_robins_over_sides() {
        let clb = BlockType::from_def(clb_def(PinLocations::Spread)).unwrap();
        assert!(clb.pin_at(0, 0, Side::Left));
        assert!(clb.pin_at(1, 0, Side::Top));
        assert!(clb.pin_at(2, 0, Side::Right));
        assert!(clb.pin_at(3, 0, Side::Bottom));
        assert!(clb.pin_at(4, 0, Side::Left));
        assert!(!clb.pin_at(0, 0, Side::Top));
    }

    #[test]
    fn all_sides_places_everywhere() {
        let io = BlockType::from_def(clb_def(PinLocations::AllSides)).unwrap();
        for side in Side::ALL {
            assert!(io.pin_at(3, 0, side));
        }
    }

    #[test]
    fn custom_locations_and_port_indexing() {
        let locs = vec![
            CustomPinLoc {
                side: Side::Left,
                offset: 0,
                pins: vec!["I".to_string()],
            },
            CustomPinLoc {
                side: Side::Right,
                offset: 0,
                pins: vec!["O[1]".to_string()],
            },
        ];
        let clb = BlockType::from_def(clb_def(PinLocations::Custom(locs))).unwrap();
        assert!(clb.pin_at(2, 0, Side::Left));
        assert!(clb.pin_at(5, 0, Side::Right));
        assert!(!clb.pin_at(4, 0, Side::Right));
    }

    #[test]
    fn custom_top_must_be_on_top_offset() {
        let mut def = clb_def(PinLocations::Custom(vec![CustomPinLoc {
            side: Side::Top,
            offset: 0,
            pins: vec!["I".to_string()],
        }]));
        def.height = 2;
        let err = BlockType::from_def(def).unwrap_err();
        assert!(err.to_string().contains("side TOP at offset 0"));
    }

    #[test]
    fn custom_unknown_port_rejected() {
        let def = clb_def(PinLocations::Custom(vec![CustomPinLoc {
            side: Side::Left,
            offset: 0,
            pins: vec!["nope[0]".to_string()],
        }]));
        assert!(matches!(
            BlockType::from_def(def),
            Err(ArchError::BadPinName { .. })
        ));
    }

    #[test]
    fn fc_override_per_port() {
        let mut def = clb_def(PinLocations::Spread);
        def.ports[1].fc = Some(FcSpec::Full);
        let clb = BlockType::from_def(def).unwrap();
        assert_eq!(clb.fc_for_pin(0), FcSpec::Frac(0.5));
        assert_eq!(clb.fc_for_pin(4), FcSpec::Full);
    }

    #[test]
    fn perimeter_order_for_tall_block() {
        let slots = perimeter_slots(2);
        assert_eq!(
            slots,
            vec![
                (0, Side::Left),
                (1, Side::Left),
                (1, Side::Top),
                (1, Side::Right),
                (0, Side::Right),
                (0, Side::Bottom),
            ]
        );
    }
}
