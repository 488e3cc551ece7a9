//! Switch and wire-segment descriptions.

use crate::ids::SwitchId;
use serde::{Deserialize, Serialize};

/// A programmable switch type.
///
/// Buffered switches drive in one direction; unbuffered switches are pass
/// transistors and conduct both ways, which the graph must mirror.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchSwitch {
    /// Switch name, referenced by segments and directs.
    pub name: String,
    /// `true` for a tri-state buffer or mux, `false` for a pass transistor.
    pub buffered: bool,
    /// Equivalent resistance in ohms.
    pub r: f32,
    /// Input capacitance in farads.
    pub cin: f32,
    /// Output capacitance in farads.
    pub cout: f32,
    /// Intrinsic delay in seconds.
    pub tdel: f32,
}

impl ArchSwitch {
    /// A zero-delay buffered switch, used for SOURCE/SINK hookups and directs.
    pub fn delayless(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            buffered: true,
            r: 0.0,
            cin: 0.0,
            cout: 0.0,
            tdel: 0.0,
        }
    }
}

/// Whether wires of a segment type are driven from both ends or from one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Directionality {
    /// Tri-state or pass-transistor wires usable in either direction.
    Bidir,
    /// Single-driver wires, allocated in INC/DEC pairs.
    Unidir,
}

impl Directionality {
    /// Tracks are consumed in groups of this size (1 bidir, 2 unidir).
    pub fn group_size(self) -> u32 {
        match self {
            Directionality::Bidir => 1,
            Directionality::Unidir => 2,
        }
    }
}

/// A wire segment type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentDef {
    /// Segment name.
    pub name: String,
    /// Length in logic blocks spanned. Ignored for longlines.
    pub length: u32,
    /// Relative share of the channel given to this segment type.
    pub frequency: u32,
    /// Spans the entire chip.
    pub longline: bool,
    /// Wire directionality.
    pub directionality: Directionality,
    /// Switch used to drive this wire from another wire.
    pub wire_switch: SwitchId,
    /// Switch used to drive this wire from a block output pin.
    pub opin_switch: SwitchId,
    /// Metal resistance per logic block spanned.
    pub r_metal: f32,
    /// Metal capacitance per logic block spanned.
    pub c_metal: f32,
    /// Connection-block pattern: whether a block pin may connect at each
    /// position along the wire. Tiled over the wire length.
    pub cb: Vec<bool>,
    /// Switch-block pattern: whether a switch box exists at each of the
    /// `length + 1` junctions along the wire. Tiled over the wire length.
    pub sb: Vec<bool>,
}

/// A pin's connectivity to the adjoining channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FcSpec {
    /// Fraction of the tracks in the channel.
    Frac(f32),
    /// Absolute number of tracks.
    Abs(u32),
    /// Every track. Only meaningful for output pins.
    Full,
}

impl FcSpec {
    /// Returns `true` for an explicit zero connectivity.
    pub fn is_zero(self) -> bool {
        match self {
            FcSpec::Frac(f) => f == 0.0,
            FcSpec::Abs(n) => n == 0,
            FcSpec::Full => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_sizes() {
        assert_eq!(Directionality::Bidir.group_size(), 1);
        assert_eq!(Directionality::Unidir.group_size(), 2);
    }

    #[test]
    fn fc_zero_detection() {
        assert!(FcSpec::Abs(0).is_zero());
        assert!(FcSpec::Frac(0.0).is_zero());
        assert!(!FcSpec::Frac(0.25).is_zero());
        assert!(!FcSpec::Full.is_zero());
    }

    #[test]
    fn fc_serde_forms() {
        let frac: FcSpec = serde_json::from_str(r#"{"frac":0.5}"#).unwrap();
        assert_eq!(frac, FcSpec::Frac(0.5));
        let abs: FcSpec = serde_json::from_str(r#"{"abs":3}"#).unwrap();
        assert_eq!(abs, FcSpec::Abs(3));
        let full: FcSpec = serde_json::from_str(r#""full""#).unwrap();
        assert_eq!(full, FcSpec::Full);
    }

    #[test]
    fn delayless_is_buffered_and_free() {
        let sw = ArchSwitch::delayless("delayless");
        assert!(sw.buffered);
        assert_eq!(sw.tdel, 0.0);
        assert_eq!(sw.r, 0.0);
    }
}
