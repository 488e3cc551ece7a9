//! Switch-block connection patterns.
//!
//! Bidirectional fabrics use one location-independent table,
//! [`SwitchBlockConn`], indexed by (from side, to side, track). Unidirectional
//! fabrics need a pattern per junction because wire staggering changes which
//! wires end or pass at each one; [`SblockPattern`] holds the mux label each
//! incoming wire drives.

use crate::error::RrGraphError;
use crate::graph::Direction;
use crate::segments::{find_label_of_track, Channel, IncomingWires};
use weft_arch::{Side, SwitchBlockType};

/// Track reached from `track` on side `from` when turning to side `to` in a
/// switch block of the given topology and `width` tracks per side.
///
/// Returns `None` for `from == to` or an empty channel.
pub fn simple_switch_block_track(
    from: Side,
    to: Side,
    track: u32,
    sb_type: SwitchBlockType,
    width: u32,
) -> Option<u32> {
    if from == to || width == 0 {
        return None;
    }
    let w = width as i64;
    let t = track as i64;
    let to_track = match sb_type {
        SwitchBlockType::Subset => t,
        SwitchBlockType::Wilton => match (from, to) {
            (Side::Left, Side::Right)
            | (Side::Right, Side::Left)
            | (Side::Bottom, Side::Top)
            | (Side::Top, Side::Bottom) => t,
            (Side::Left, Side::Top) | (Side::Top, Side::Left) => w - t,
            (Side::Left, Side::Bottom) | (Side::Right, Side::Top) => w + t - 1,
            (Side::Right, Side::Bottom) | (Side::Bottom, Side::Right) => 2 * w - 2 - t,
            (Side::Bottom, Side::Left) | (Side::Top, Side::Right) => t + 1,
            _ => return None,
        },
        SwitchBlockType::Universal => match (from, to) {
            (Side::Left, Side::Top)
            | (Side::Right, Side::Bottom)
            | (Side::Bottom, Side::Right)
            | (Side::Top, Side::Left) => w - 1 - t,
            _ => t,
        },
    };
    Some(to_track.rem_euclid(w) as u32)
}

/// Location-independent bidirectional switch-block table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchBlockConn {
    width: u32,
    /// `targets[(from * 4 + to) * width + track]`.
    targets: Vec<Option<u32>>,
}

impl SwitchBlockConn {
    /// Builds the table for `width` tracks. Bidirectional switch blocks are
    /// only defined for Fs = 3.
    pub fn new(width: u32, sb_type: SwitchBlockType, fs: u32) -> Result<Self, RrGraphError> {
        if fs != 3 {
            return Err(RrGraphError::InvalidOption(format!(
                "bidirectional switch blocks require Fs = 3, got {fs}"
            )));
        }
        let mut targets = Vec::with_capacity(16 * width as usize);
        for from in Side::ALL {
            for to in Side::ALL {
                for track in 0..width {
                    targets.push(simple_switch_block_track(from, to, track, sb_type, width));
                }
            }
        }
        Ok(Self { width, targets })
    }

    /// Tracks on side `to` that `track` on side `from` connects to.
    pub fn targets(&self, from: Side, to: Side, track: u32) -> &[u32] {
        if track >= self.width {
            return &[];
        }
        let idx = (from.index() * 4 + to.index()) * self.width as usize + track as usize;
        match &self.targets[idx] {
            Some(t) => std::slice::from_ref(t),
            None => &[],
        }
    }
}

/// Per-junction unidirectional switch-block pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SblockPattern {
    nx: u32,
    ny: u32,
    width: u32,
    /// `muxes[((junction * 4 + from) * 4 + to) * width + track]`, where
    /// `junction = x * (ny + 1) + y`.
    muxes: Vec<Option<u32>>,
}

impl SblockPattern {
    /// Computes the pattern for every junction `(0..=nx, 0..=ny)`.
    ///
    /// `chan_x` and `chan_y` describe the horizontal and vertical channels.
    pub fn build(
        nx: u32,
        ny: u32,
        chan_x: Channel<'_>,
        chan_y: Channel<'_>,
        fs: u32,
        sb_type: SwitchBlockType,
    ) -> Self {
        let width = chan_x.width();
        let mut pattern = Self {
            nx,
            ny,
            width,
            muxes: vec![None; ((nx + 1) * (ny + 1) * 16 * width) as usize],
        };
        let fs_per_side = (fs / 3).max(1);
        for x in 0..=nx {
            for y in 0..=ny {
                pattern.load_junction(x, y, chan_x, chan_y, fs_per_side, sb_type);
            }
        }
        pattern
    }

    fn slot(&self, x: u32, y: u32, from: Side, to: Side, track: u32) -> usize {
        let junction = (x * (self.ny + 1) + y) as usize;
        ((junction * 4 + from.index()) * 4 + to.index()) * self.width as usize + track as usize
    }

    /// Mux label on side `to` driven by `track` entering junction `(x, y)`
    /// from side `from`, if any.
    pub fn mux(&self, x: u32, y: u32, from: Side, to: Side, track: u32) -> Option<u32> {
        if x > self.nx || y > self.ny || track >= self.width {
            return None;
        }
        self.muxes[self.slot(x, y, from, to, track)]
    }

    fn set_if_empty(&mut self, x: u32, y: u32, from: Side, to: Side, track: u32, mux: u32) {
        let slot = self.slot(x, y, from, to, track);
        if self.muxes[slot].is_none() {
            self.muxes[slot] = Some(mux);
        }
    }

    /// Core junctions see the same number of ending wires and muxes on every
    /// side, so ending wires can use a one-to-one topology; passing wires
    /// (and every incoming wire at the chip edge) are staggered over the
    /// muxes `fs_per_side` apart so mux sizes differ by at most one.
    fn load_junction(
        &mut self,
        x: u32,
        y: u32,
        chan_x: Channel<'_>,
        chan_y: Channel<'_>,
        fs_per_side: u32,
        sb_type: SwitchBlockType,
    ) {
        let x_edge = x < 1 || x >= self.nx;
        let y_edge = y < 1 || y >= self.ny;
        let corner = x_edge && y_edge;
        let core = !x_edge && !y_edge;

        let mut incoming: [Option<IncomingWires>; 4] = [None, None, None, None];
        let mut muxes: [Vec<u32>; 4] = Default::default();
        for side in Side::ALL {
            let exists = match side {
                Side::Top => y < self.ny,
                Side::Right => x < self.nx,
                Side::Bottom => y > 0,
                Side::Left => x > 0,
            };
            if !exists {
                continue;
            }
            let vert = side.is_vertical();
            let channel = if vert { chan_y } else { chan_x };
            let chan = if vert { x } else { y };
            let sb_seg = if vert { y } else { x };
            let seg = if side.is_positive() { sb_seg + 1 } else { sb_seg };
            let (end_dir, start_dir) = if side.is_positive() {
                (Direction::Dec, Direction::Inc)
            } else {
                (Direction::Inc, Direction::Dec)
            };
            incoming[side.index()] = Some(channel.label_incoming_wires(chan, seg, sb_seg, end_dir));
            muxes[side.index()] = channel.label_wire_muxes(chan, seg, start_dir, false);
        }

        for to in Side::ALL {
            let num_muxes = muxes[to.index()].len() as u32;
            if num_muxes == 0 {
                continue;
            }

            let mut staggered = 0u32;
            for from in [to.clockwise(), to.counter_clockwise()] {
                let Some(wires) = &incoming[from.index()] else {
                    continue;
                };
                for track in 0..self.width {
                    let Some(label) = wires.labels[track as usize] else {
                        continue;
                    };
                    if label < wires.num_ending && (corner || core) {
                        if label <= num_muxes {
                            if let Some(mux) =
                                simple_switch_block_track(from, to, label, sb_type, num_muxes)
                            {
                                self.set_if_empty(x, y, from, to, track, mux);
                            }
                        }
                    } else {
                        let mux = (staggered * fs_per_side) % num_muxes;
                        let slot = self.slot(x, y, from, to, track);
                        self.muxes[slot] = Some(mux);
                        staggered += 1;
                    }
                }
            }

            // Straight through: an ending wire continues on the wire driven
            // from its own track. Passing wires have no connection here.
            let opp = to.opposite();
            if let Some(wires) = &incoming[opp.index()] {
                for track in 0..self.width {
                    match wires.labels[track as usize] {
                        Some(label) if label < wires.num_ending => {
                            if let Some(mux) = find_label_of_track(&muxes[to.index()], track) {
                                let slot = self.slot(x, y, opp, to, track);
                                self.muxes[slot] = Some(mux);
                            }
                        }
                        _ => {}
                    }
                }
            }
        }
    }
}
