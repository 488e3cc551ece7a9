//! Output-pin connections into the routing fabric.

use crate::channel::FabricContext;
use crate::graph::{Direction, RrNodeKind};
use crate::pin_pattern::PinTrackMap;
use crate::scratch::EdgeScratch;
use weft_arch::{PinClassKind, Side};

/// Round-robin position per channel location, shared by every output pin
/// that drives into it so consecutive pins start on different muxes.
pub(crate) struct MuxOffsets {
    nx: u32,
    ny: u32,
    chan_x: Vec<u32>,
    chan_y: Vec<u32>,
}

impl MuxOffsets {
    pub(crate) fn new(nx: u32, ny: u32) -> Self {
        let cells = ((nx + 1) * (ny + 1)) as usize;
        Self {
            nx,
            ny,
            chan_x: vec![0; cells],
            chan_y: vec![0; cells],
        }
    }

    fn get_mut(&mut self, kind: RrNodeKind, chan: u32, seg: u32) -> &mut u32 {
        match kind {
            RrNodeKind::ChanY => &mut self.chan_y[(chan * (self.ny + 1) + seg) as usize],
            _ => &mut self.chan_x[(chan * (self.nx + 1) + seg) as usize],
        }
    }
}

impl FabricContext<'_> {
    /// Bidirectional: output pin `pin` of the block anchored at `(x, y)`
    /// follows its pin-to-track table on every side it appears.
    pub(crate) fn bidir_opin_edges(
        &self,
        scratch: &mut EdgeScratch,
        map: &PinTrackMap,
        x: i32,
        y: i32,
        pin: u32,
        fc: u32,
    ) {
        let (nx, ny) = (self.grid.nx() as i32, self.grid.ny() as i32);
        let Some(block_type) = self.grid.block_type_at(x, y) else {
            return;
        };
        let height = self.arch.block_type(block_type).height;
        for offset in 0..height {
            for side in Side::ALL {
                let tracks = map.tracks(pin, offset, side);
                if tracks.is_empty() {
                    continue;
                }
                let tr_i = if side == Side::Left { x - 1 } else { x };
                let row = y + offset as i32;
                let tr_j = if side == Side::Bottom { row - 1 } else { row };
                let kind = if side.is_vertical() {
                    RrNodeKind::ChanX
                } else {
                    RrNodeKind::ChanY
                };
                if tr_i < 0 || tr_i > nx || tr_j < 0 || tr_j > ny {
                    continue;
                }
                let on_core_edge = match kind {
                    RrNodeKind::ChanX => tr_i < 1,
                    _ => tr_j < 1,
                };
                if on_core_edge {
                    continue;
                }
                let (chan, seg) = match kind {
                    RrNodeKind::ChanX => (tr_j as u32, tr_i as u32),
                    _ => (tr_i as u32, tr_j as u32),
                };
                let channel = self.channel(kind);
                for &track in tracks.iter().take(fc as usize) {
                    if !channel.is_cblock(chan, seg, track) {
                        continue;
                    }
                    if let Some(wire) = self.wire(kind, chan, seg, track) {
                        scratch.push_once(wire, channel.track(track).opin_switch);
                    }
                }
            }
        }
    }

    /// Unidirectional: output pin `pin` drives `fc / 2` INC and `fc / 2`
    /// DEC muxes in each adjoining channel. Returns `true` if fewer muxes
    /// were available than requested.
    pub(crate) fn unidir_opin_edges(
        &self,
        scratch: &mut EdgeScratch,
        offsets: &mut MuxOffsets,
        x: i32,
        y: i32,
        pin: u32,
        fc: u32,
    ) -> bool {
        let Some(block_type) = self.grid.block_type_at(x, y) else {
            return false;
        };
        let block = self.arch.block_type(block_type);
        if fc == 0 || block.is_global_pin(pin) || block.pin_kind(pin) != PinClassKind::Driver {
            return false;
        }
        let (nx, ny) = (self.grid.nx() as i64, self.grid.ny() as i64);
        let mut clipped = false;
        for offset in 0..block.height {
            for side in Side::ALL {
                if !block.pin_at(pin, offset, side) {
                    continue;
                }
                let vert = side.is_vertical();
                let row = y as i64 + offset as i64;
                let kind = if vert {
                    RrNodeKind::ChanX
                } else {
                    RrNodeKind::ChanY
                };
                let mut chan = if vert { row } else { x as i64 };
                let seg = if vert { x as i64 } else { row };
                if !side.is_positive() {
                    chan -= 1;
                }
                let (seg_max, chan_max) = if vert { (nx, ny) } else { (ny, nx) };
                if chan < 0 || seg < 1 || seg > seg_max || chan > chan_max {
                    continue;
                }
                clipped |=
                    self.unidir_opin_to_chan(scratch, offsets, kind, chan as u32, seg as u32, fc);
            }
        }
        clipped
    }

    fn unidir_opin_to_chan(
        &self,
        scratch: &mut EdgeScratch,
        offsets: &mut MuxOffsets,
        kind: RrNodeKind,
        chan: u32,
        seg: u32,
        fc: u32,
    ) -> bool {
        let channel = self.channel(kind);
        let inc = channel.label_wire_muxes(chan, seg, Direction::Inc, true);
        let dec = channel.label_wire_muxes(chan, seg, Direction::Dec, true);
        let mut half = (fc / 2) as usize;
        let mut clipped = false;
        if half > inc.len() || half > dec.len() {
            clipped = true;
            half = inc.len().min(dec.len());
        }
        if half == 0 {
            return clipped;
        }
        let ofs = offsets.get_mut(kind, chan, seg);
        for _ in 0..half {
            let inc_track = inc[*ofs as usize % inc.len()];
            let dec_track = dec[*ofs as usize % dec.len()];
            *ofs += 1;
            for track in [inc_track, dec_track] {
                if let Some(wire) = self.wire(kind, chan, seg, track) {
                    scratch.push_once(wire, channel.track(track).opin_switch);
                }
            }
        }
        clipped
    }
}
