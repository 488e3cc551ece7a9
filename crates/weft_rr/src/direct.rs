//! Direct block-to-block connections.
//!
//! A direct names a range of output pins on one block type and an equally
//! sized range of input pins on another (or the same) type at a fixed grid
//! offset. Pins pair up in declaration order: `clb.cout[0:3]` to
//! `clb.cin[3:0]` joins `cout[0]` to `cin[3]` and `cout[3]` to `cin[0]`.

use crate::error::RrGraphError;
use weft_arch::{ArchError, Architecture, BlockTypeId, DirectDef, Grid, PinClassKind, SwitchId};

/// A contiguous run of block pins in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinRange {
    /// Block type owning the pins.
    pub block_type: BlockTypeId,
    /// Block pin number declared first.
    pub first: u32,
    /// Block pin number declared last.
    pub last: u32,
}

impl PinRange {
    /// Number of pins in the range.
    pub fn len(&self) -> u32 {
        self.first.abs_diff(self.last) + 1
    }

    /// Always `false`; a range holds at least one pin.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Declaration position of `pin`, if it lies in the range.
    pub fn position(&self, pin: u32) -> Option<u32> {
        let (lo, hi) = (self.first.min(self.last), self.first.max(self.last));
        if pin < lo || pin > hi {
            return None;
        }
        Some(pin.abs_diff(self.first))
    }

    /// The pin at declaration position `k`.
    pub fn at(&self, k: u32) -> u32 {
        if self.first <= self.last {
            self.first + k
        } else {
            self.first - k
        }
    }

    /// Iterates the pins in declaration order.
    pub fn pins(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.len()).map(move |k| self.at(k))
    }
}

/// Parses `type.port[a:b]`, `type.port[i]` or `type.port` against `arch`.
///
/// Indices are relative to the port; a bare port name covers the whole port
/// in ascending order.
pub fn parse_pin_range(arch: &Architecture, text: &str) -> Result<PinRange, ArchError> {
    let bad = |block: &str| ArchError::BadPinName {
        block: block.to_string(),
        text: text.to_string(),
    };
    let (type_name, rest) = text.split_once('.').ok_or_else(|| bad(""))?;
    let block_type = arch
        .block_type_by_name(type_name)
        .ok_or_else(|| ArchError::UnknownBlockType(type_name.to_string()))?;
    let block = arch.block_type(block_type);

    let (port_name, indices) = match rest.split_once('[') {
        Some((port, tail)) => {
            let inner = tail.strip_suffix(']').ok_or_else(|| bad(type_name))?;
            (port, Some(inner))
        }
        None => (rest, None),
    };
    let port_pins = block.port_pins(port_name).ok_or_else(|| bad(type_name))?;
    let port_len = port_pins.end - port_pins.start;

    let parse_index = |s: &str| -> Result<u32, ArchError> {
        let i: u32 = s.trim().parse().map_err(|_| bad(type_name))?;
        if i >= port_len {
            return Err(bad(type_name));
        }
        Ok(port_pins.start + i)
    };
    let (first, last) = match indices {
        None => {
            if port_len == 0 {
                return Err(bad(type_name));
            }
            (port_pins.start, port_pins.end - 1)
        }
        Some(inner) => match inner.split_once(':') {
            Some((a, b)) => (parse_index(a)?, parse_index(b)?),
            None => {
                let i = parse_index(inner)?;
                (i, i)
            }
        },
    };
    Ok(PinRange {
        block_type,
        first,
        last,
    })
}

/// A direct with its pin ranges resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDirect {
    /// Direct name.
    pub name: String,
    /// Driving pins.
    pub from: PinRange,
    /// Receiving pins.
    pub to: PinRange,
    /// Column offset to the receiving block.
    pub x_offset: i32,
    /// Row offset to the receiving block.
    pub y_offset: i32,
    /// Switch on the generated edges.
    pub switch: SwitchId,
}

impl ResolvedDirect {
    /// The receiving pin paired with driving pin `opin`, if `opin` is in
    /// the from-range.
    pub fn target_pin(&self, opin: u32) -> Option<u32> {
        self.from.position(opin).map(|k| self.to.at(k))
    }
}

fn resolve_one(arch: &Architecture, def: &DirectDef) -> Result<ResolvedDirect, RrGraphError> {
    let from = parse_pin_range(arch, &def.from_pin)?;
    let to = parse_pin_range(arch, &def.to_pin)?;
    if from.len() != to.len() {
        return Err(RrGraphError::arch(format!(
            "Range mismatch from {} to {}",
            def.from_pin, def.to_pin
        )));
    }
    let from_block = arch.block_type(from.block_type);
    if let Some(pin) = from.pins().find(|&p| from_block.pin_kind(p) != PinClassKind::Driver) {
        return Err(RrGraphError::arch(format!(
            "direct '{}': pin {pin} of '{}' is not an output",
            def.name, from_block.name
        )));
    }
    let to_block = arch.block_type(to.block_type);
    if let Some(pin) = to.pins().find(|&p| to_block.pin_kind(p) != PinClassKind::Receiver) {
        return Err(RrGraphError::arch(format!(
            "direct '{}': pin {pin} of '{}' is not an input",
            def.name, to_block.name
        )));
    }
    Ok(ResolvedDirect {
        name: def.name.clone(),
        from,
        to,
        x_offset: def.x_offset,
        y_offset: def.y_offset,
        switch: def.switch.unwrap_or(arch.delayless_switch),
    })
}

/// Resolves every direct of `arch`. Fails on the first malformed one,
/// before any edge is built.
pub fn resolve_directs(arch: &Architecture) -> Result<Vec<ResolvedDirect>, RrGraphError> {
    arch.directs.iter().map(|d| resolve_one(arch, d)).collect()
}

/// A direct edge from an output pin: the receiving block's anchor tile,
/// the input pin and the switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectTarget {
    /// Anchor column of the receiving block.
    pub x: i32,
    /// Anchor row of the receiving block.
    pub y: i32,
    /// Input pin on the receiving block.
    pub ipin: u32,
    /// Switch on the edge.
    pub switch: SwitchId,
}

/// Direct targets of output `opin` of the block anchored at `(x, y)`.
///
/// The receiving tile must lie strictly inside the core and hold the
/// direct's to-type; tall receivers are addressed at their anchor.
pub fn direct_targets(
    directs: &[ResolvedDirect],
    grid: &Grid,
    x: i32,
    y: i32,
    opin: u32,
) -> Vec<DirectTarget> {
    let Some(from_type) = grid.block_type_at(x, y) else {
        return Vec::new();
    };
    let mut targets = Vec::new();
    for direct in directs.iter().filter(|d| d.from.block_type == from_type) {
        let tx = x + direct.x_offset;
        let ty = y + direct.y_offset;
        if tx <= 0 || tx >= grid.nx() as i32 + 1 || ty <= 0 || ty >= grid.ny() as i32 + 1 {
            continue;
        }
        let Some(tile) = grid.tile(tx, ty) else {
            continue;
        };
        if tile.block_type != Some(direct.to.block_type) {
            continue;
        }
        if let Some(ipin) = direct.target_pin(opin) {
            targets.push(DirectTarget {
                x: tx,
                y: ty - tile.height_offset as i32,
                ipin,
                switch: direct.switch,
            });
        }
    }
    targets
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_arch::{ArchSwitch, BlockTypeDef, FcSpec, PinLocations, Port, PortKind};

    fn port(name: &str, kind: PortKind, num_pins: u32) -> Port {
        Port {
            name: name.to_string(),
            kind,
            num_pins,
            equivalent: false,
            global: false,
            fc: None,
        }
    }

    /// `clb` pins: cin 0..4, cout 4..8, I 8..9.
    fn arch() -> Architecture {
        let mut arch = Architecture::new();
        arch.delayless_switch = arch.add_switch(ArchSwitch::delayless("delayless")).unwrap();
        arch.add_block_type(BlockTypeDef {
            name: "clb".to_string(),
            height: 1,
            ports: vec![
                port("cin", PortKind::Input, 4),
                port("cout", PortKind::Output, 4),
                port("I", PortKind::Input, 1),
            ],
            fc_in: FcSpec::Frac(0.5),
            fc_out: FcSpec::Frac(0.5),
            pin_locations: PinLocations::Spread,
            is_io: false,
        })
        .unwrap();
        arch
    }

    fn direct(from: &str, to: &str) -> DirectDef {
        DirectDef {
            name: "carry".to_string(),
            from_pin: from.to_string(),
            to_pin: to.to_string(),
            x_offset: 0,
            y_offset: 1,
            switch: None,
        }
    }

    #[test]
    fn parses_range_forms() {
        let a = arch();
        let r = parse_pin_range(&a, "clb.cout[3:1]").unwrap();
        assert_eq!((r.first, r.last, r.len()), (7, 5, 3));
        let r = parse_pin_range(&a, "clb.cin[2]").unwrap();
        assert_eq!((r.first, r.last), (2, 2));
        let r = parse_pin_range(&a, "clb.cout").unwrap();
        assert_eq!((r.first, r.last), (4, 7));
        assert_eq!(r.pins().collect::<Vec<_>>(), vec![4, 5, 6, 7]);
    }

    #[test]
    fn rejects_bad_names() {
        let a = arch();
        assert!(matches!(
            parse_pin_range(&a, "dsp.cout"),
            Err(ArchError::UnknownBlockType(_))
        ));
        assert!(matches!(
            parse_pin_range(&a, "clb.cout[4]"),
            Err(ArchError::BadPinName { .. })
        ));
        assert!(matches!(
            parse_pin_range(&a, "clb.nope"),
            Err(ArchError::BadPinName { .. })
        ));
        assert!(matches!(
            parse_pin_range(&a, "clb.cout[1:x]"),
            Err(ArchError::BadPinName { .. })
        ));
        assert!(parse_pin_range(&a, "clbcout").is_err());
    }

    #[test]
    fn ascending_to_descending_reverses() {
        let mut a = arch();
        a.add_direct(direct("clb.cout[0:3]", "clb.cin[3:0]"));
        let d = &resolve_directs(&a).unwrap()[0];
        // cout[0] is pin 4, cin[3] is pin 3
        assert_eq!(d.target_pin(4), Some(3));
        assert_eq!(d.target_pin(7), Some(0));
        assert_eq!(d.target_pin(5), Some(2));
        assert_eq!(d.target_pin(0), None);
        assert_eq!(d.switch, a.delayless_switch);
    }

    #[test]
    fn descending_to_ascending_reverses() {
        let mut a = arch();
        a.add_direct(direct("clb.cout[3:0]", "clb.cin[0:3]"));
        let d = &resolve_directs(&a).unwrap()[0];
        assert_eq!(d.target_pin(7), Some(0));
        assert_eq!(d.target_pin(4), Some(3));
    }

    #[test]
    fn same_order_keeps_order() {
        let mut a = arch();
        a.add_direct(direct("clb.cout[3:0]", "clb.cin[3:0]"));
        let d = &resolve_directs(&a).unwrap()[0];
        assert_eq!(d.target_pin(7), Some(3));
        assert_eq!(d.target_pin(4), Some(0));
    }

    #[test]
    fn unequal_ranges_are_an_arch_error() {
        let mut a = arch();
        a.add_direct(direct("clb.cout[2:0]", "clb.cin[3:0]"));
        let err = resolve_directs(&a).unwrap_err();
        match err {
            RrGraphError::Arch { message } => {
                assert_eq!(message, "Range mismatch from clb.cout[2:0] to clb.cin[3:0]")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn direction_of_pins_is_checked() {
        let mut a = arch();
        a.add_direct(direct("clb.cin[0]", "clb.I"));
        assert!(matches!(
            resolve_directs(&a),
            Err(RrGraphError::Arch { .. })
        ));
    }

    #[test]
    fn targets_stay_inside_core() {
        let mut a = arch();
        a.add_direct(direct("clb.cout", "clb.cin"));
        let directs = resolve_directs(&a).unwrap();
        let clb = a.block_type_by_name("clb").unwrap();
        let mut grid = Grid::new(1, 2);
        grid.place(1, 1, clb, 1).unwrap();
        grid.place(1, 2, clb, 1).unwrap();

        let t = direct_targets(&directs, &grid, 1, 1, 5);
        assert_eq!(
            t,
            vec![DirectTarget {
                x: 1,
                y: 2,
                ipin: 1,
                switch: a.delayless_switch
            }]
        );
        // (1, 3) is the IO row
        assert!(direct_targets(&directs, &grid, 1, 2, 5).is_empty());
        // not an output covered by the direct
        assert!(direct_targets(&directs, &grid, 1, 1, 8).is_empty());
    }
}
