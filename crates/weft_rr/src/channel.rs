//! Outgoing edges of channel wires.
//!
//! A wire node is processed once, from the position where it starts. It
//! connects to input pins along its length, to perpendicular wires at every
//! switch block it passes and to the same-direction wires abutting its two
//! ends.

use crate::graph::{Direction, RrNodeKind};
use crate::ids::RrNodeId;
use crate::indices::NodeLookup;
use crate::pin_pattern::TrackToPinLookup;
use crate::scratch::EdgeScratch;
use crate::segments::Channel;
use crate::switch_block::{SblockPattern, SwitchBlockConn};
use weft_arch::{Architecture, Grid, Side, SwitchId};

/// Read-only state shared by every edge-building call.
pub(crate) struct FabricContext<'a> {
    pub arch: &'a Architecture,
    pub grid: &'a Grid,
    pub lookup: &'a NodeLookup,
    pub chan_x: Channel<'a>,
    pub chan_y: Channel<'a>,
    pub unidir: bool,
    /// Per block type; `None` for types without routable inputs.
    pub track_to_ipin: &'a [Option<TrackToPinLookup>],
    pub sb_conn: Option<&'a SwitchBlockConn>,
    pub sb_pattern: Option<&'a SblockPattern>,
    pub fs_per_side: u32,
}

/// A wire position reached through a switch block.
struct ChanSeg {
    kind: RrNodeKind,
    chan: u32,
    seg: u32,
    /// Junction coordinate along the target channel.
    sb: u32,
    /// Side of the junction the target wire lies on.
    side: Side,
}

impl<'a> FabricContext<'a> {
    pub(crate) fn channel(&self, kind: RrNodeKind) -> Channel<'a> {
        match kind {
            RrNodeKind::ChanY => self.chan_y,
            _ => self.chan_x,
        }
    }

    /// Last position along channels of `kind`.
    fn seg_dim(&self, kind: RrNodeKind) -> u32 {
        match kind {
            RrNodeKind::ChanY => self.grid.ny(),
            _ => self.grid.nx(),
        }
    }

    /// Last channel number of `kind`.
    fn chan_dim(&self, kind: RrNodeKind) -> u32 {
        match kind {
            RrNodeKind::ChanY => self.grid.nx(),
            _ => self.grid.ny(),
        }
    }

    /// The wire node of `track` covering position `seg` of channel `chan`.
    pub(crate) fn wire(
        &self,
        kind: RrNodeKind,
        chan: u32,
        seg: u32,
        track: u32,
    ) -> Option<RrNodeId> {
        match kind {
            RrNodeKind::ChanY => self.lookup.get(kind, chan as i32, seg as i32, track),
            _ => self.lookup.get(kind, seg as i32, chan as i32, track),
        }
    }

    /// Collects every outgoing edge of the wire of `track` starting at
    /// `start` in channel `chan`.
    pub(crate) fn wire_edges(
        &self,
        scratch: &mut EdgeScratch,
        kind: RrNodeKind,
        chan: u32,
        start: u32,
        track: u32,
    ) {
        let end = self.channel(kind).seg_end(track, start, chan);
        self.track_to_pins(scratch, kind, chan, start, end, track);

        let perpendicular = match kind {
            RrNodeKind::ChanX => RrNodeKind::ChanY,
            _ => RrNodeKind::ChanX,
        };
        if chan > 0 {
            self.track_to_tracks(scratch, kind, chan, start, track, perpendicular, chan);
        }
        if chan < self.chan_dim(kind) {
            self.track_to_tracks(scratch, kind, chan, start, track, perpendicular, chan + 1);
        }

        let seg_dim = self.seg_dim(kind);
        for target in [start - 1, end + 1] {
            if target > 0 && target <= seg_dim {
                self.track_to_tracks(scratch, kind, chan, start, track, kind, target);
            }
        }
    }

    /// Edges into the input pins of the blocks on either side of the wire.
    fn track_to_pins(
        &self,
        scratch: &mut EdgeScratch,
        kind: RrNodeKind,
        chan: u32,
        start: u32,
        end: u32,
        track: u32,
    ) {
        let channel = self.channel(kind);
        let width = channel.width();
        for j in start..=end {
            if !channel.is_cblock(chan, j, track) {
                continue;
            }
            for pass in 0..2 {
                let (x, y, side) = match kind {
                    RrNodeKind::ChanY => {
                        (chan + pass, j, if pass == 0 { Side::Right } else { Side::Left })
                    }
                    _ => (j, chan + pass, if pass == 0 { Side::Top } else { Side::Bottom }),
                };
                let Some(tile) = self.grid.tile(x as i32, y as i32) else {
                    continue;
                };
                let Some(block_type) = tile.block_type else {
                    continue;
                };
                let Some(pins) = self
                    .track_to_ipin
                    .get(block_type.index())
                    .and_then(Option::as_ref)
                else {
                    continue;
                };
                let phy = channel.phy_track(track, chan, j) % width;
                let anchor_y = y as i32 - tile.height_offset as i32;
                for &pin in pins.pins(phy, tile.height_offset, side) {
                    let ipin = self.lookup.get(RrNodeKind::Ipin, x as i32, anchor_y, pin);
                    if let Some(ipin) = ipin {
                        scratch.push_once(ipin, self.arch.wire_to_ipin_switch);
                    }
                }
            }
        }
    }

    /// Edges from a wire to the wires of `to_kind` at position `to_seg`,
    /// over every switch block between the wire's two ends.
    #[allow(clippy::too_many_arguments)]
    fn track_to_tracks(
        &self,
        scratch: &mut EdgeScratch,
        from_kind: RrNodeKind,
        from_chan: u32,
        from_seg: u32,
        from_track: u32,
        to_kind: RrNodeKind,
        to_seg: u32,
    ) {
        let from = self.channel(from_kind);
        let details = from.track(from_track);
        let end_sb = from.seg_end(from_track, from_seg, from_chan);
        let start_sb = from_seg - 1;
        let (side_a, side_b) = match from_kind {
            RrNodeKind::ChanY => (Side::Top, Side::Bottom),
            _ => (Side::Right, Side::Left),
        };

        let same_kind = to_kind == from_kind;
        let (lo, hi) = if same_kind {
            (to_seg - 1, to_seg)
        } else {
            (start_sb, end_sb)
        };
        for sb_seg in lo.max(start_sb)..=hi.min(end_sb) {
            let from_is_sblock = sb_seg == start_sb
                || sb_seg == end_sb
                || from.is_sblock(from_chan, from_seg, sb_seg, from_track);
            let (to_chan, to_sb) = if same_kind {
                (from_chan, sb_seg)
            } else {
                (sb_seg, from_chan)
            };
            let is_behind = if same_kind {
                sb_seg == lo
            } else {
                to_seg > from_chan
            };
            let side = match (to_kind, is_behind) {
                (RrNodeKind::ChanY, true) => Side::Top,
                (RrNodeKind::ChanY, false) => Side::Bottom,
                (_, true) => Side::Right,
                (_, false) => Side::Left,
            };
            let target = ChanSeg {
                kind: to_kind,
                chan: to_chan,
                seg: to_seg,
                sb: to_sb,
                side,
            };

            // Unidirectional: DEC wires enter a junction from its top or
            // right side, INC wires from its bottom or left side.
            if sb_seg < end_sb {
                if !self.unidir {
                    self.bidir_to_chan_seg(
                        scratch,
                        side_a,
                        from_track,
                        from_is_sblock,
                        details.wire_switch,
                        &target,
                    );
                } else if from_is_sblock && details.direction == Direction::Dec {
                    self.unidir_to_chan_seg(scratch, side_a, from_track, &target);
                }
            }
            if sb_seg > start_sb {
                if !self.unidir {
                    self.bidir_to_chan_seg(
                        scratch,
                        side_b,
                        from_track,
                        from_is_sblock,
                        details.wire_switch,
                        &target,
                    );
                } else if from_is_sblock && details.direction == Direction::Inc {
                    self.unidir_to_chan_seg(scratch, side_b, from_track, &target);
                }
            }
        }
    }

    fn bidir_to_chan_seg(
        &self,
        scratch: &mut EdgeScratch,
        from_side: Side,
        from_track: u32,
        from_is_sblock: bool,
        from_switch: SwitchId,
        target: &ChanSeg,
    ) {
        let Some(conn) = self.sb_conn else {
            return;
        };
        let to_channel = self.channel(target.kind);
        for &to_track in conn.targets(from_side, target.side, from_track) {
            let Some(to_node) = self.wire(target.kind, target.chan, target.seg, to_track) else {
                continue;
            };
            if scratch.is_targeted(to_node) {
                continue;
            }
            let to_switch = to_channel.track(to_track).wire_switch;
            let to_is_sblock = to_channel.is_sblock(target.chan, target.seg, target.sb, to_track);
            for switch in self
                .switch_types(from_is_sblock, to_is_sblock, from_switch, to_switch)
                .into_iter()
                .flatten()
            {
                scratch.push(to_node, switch);
            }
        }
    }

    /// Switches between two bidirectional wires.
    ///
    /// The forward switch exists when the source wire has a switch box
    /// here; a backward pass transistor exists when the target has one.
    /// Two pass transistors collapse into the one with lower resistance.
    fn switch_types(
        &self,
        from_is_sblock: bool,
        to_is_sblock: bool,
        from_switch: SwitchId,
        to_switch: SwitchId,
    ) -> [Option<SwitchId>; 2] {
        let buffered = |s: SwitchId| self.arch.switch(s).buffered;
        let forward = from_is_sblock.then_some(to_switch);
        let backward = (to_is_sblock && !buffered(from_switch)).then_some(from_switch);
        match (forward, backward) {
            (Some(f), Some(b)) if !buffered(f) => {
                let (lo, hi) = (f.min(b), f.max(b));
                let pick = if self.arch.switch(hi).r < self.arch.switch(lo).r {
                    hi
                } else {
                    lo
                };
                [Some(pick), None]
            }
            (forward, backward) => [forward, backward],
        }
    }

    fn unidir_to_chan_seg(
        &self,
        scratch: &mut EdgeScratch,
        from_side: Side,
        from_track: u32,
        target: &ChanSeg,
    ) {
        let Some(pattern) = self.sb_pattern else {
            return;
        };
        let to_channel = self.channel(target.kind);
        let (sb_x, sb_y) = match target.kind {
            RrNodeKind::ChanY => (target.chan, target.sb),
            _ => (target.sb, target.chan),
        };
        let to_dir = if target.sb < target.seg {
            Direction::Inc
        } else {
            Direction::Dec
        };
        let labels = to_channel.label_wire_muxes(target.chan, target.seg, to_dir, false);
        if labels.is_empty() {
            return;
        }
        let Some(to_mux) = pattern.mux(sb_x, sb_y, from_side, target.side, from_track) else {
            return;
        };
        // Fs > 3 takes consecutive muxes.
        for i in 0..self.fs_per_side {
            let to_track = labels[(to_mux + i) as usize % labels.len()];
            let Some(to_node) = self.wire(target.kind, target.chan, target.seg, to_track) else {
                continue;
            };
            scratch.push_once(to_node, to_channel.track(to_track).wire_switch);
        }
    }
}
