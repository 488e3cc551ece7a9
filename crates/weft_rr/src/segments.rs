//! Per-track segment details and the geometric queries built on them.
//!
//! A channel of width W is a list of [`SegDetails`], one per track. A track
//! is cut into wires of its segment length; the cut points are staggered by
//! track (`start`) and by channel, so wire extents depend on the channel
//! number as well as the position along it. [`Channel`] answers the
//! extent, connection-block and switch-block questions for one channel
//! orientation.

use crate::error::RrGraphError;
use crate::graph::{Direction, Drivers};
use serde::{Deserialize, Serialize};
use weft_arch::{Directionality, SegmentDef, SegmentId, SwitchId};

/// Static description of one track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegDetails {
    /// Wire length in tiles.
    pub length: u32,
    /// Stagger: the position (1-based, within a length period) where
    /// wires of this track start in channel 0.
    pub start: u32,
    /// The wire spans the whole chip.
    pub longline: bool,
    /// First track of the group of same-type tracks this track belongs to.
    pub group_start: u32,
    /// Tracks in the group.
    pub group_size: u32,
    /// Connection-block pattern, `length` entries.
    pub cb: Vec<bool>,
    /// Switch-block pattern, `length + 1` entries.
    pub sb: Vec<bool>,
    /// Metal resistance per tile.
    pub r_metal: f32,
    /// Metal capacitance per tile.
    pub c_metal: f32,
    /// Switch driving this track from other wires.
    pub wire_switch: SwitchId,
    /// Switch driving this track from output pins.
    pub opin_switch: SwitchId,
    /// Signal direction.
    pub direction: Direction,
    /// Driver multiplicity.
    pub drivers: Drivers,
    /// Segment type the track was allocated from.
    pub segment: SegmentId,
}

impl SegDetails {
    /// Tracks per direction pair: 1 for bidir tracks, 2 for unidir tracks.
    pub fn group_factor(&self) -> u32 {
        match self.direction {
            Direction::Bi => 1,
            Direction::Inc | Direction::Dec => 2,
        }
    }
}

/// Distributes `num_sets` track sets over segment types by frequency.
///
/// Demand-driven largest remainder: each round gives a set (or a whole
/// length group when `full_groups`) to the type with the highest
/// outstanding demand. A final group that overshoots by more than half is
/// taken back.
pub fn seg_track_counts(
    num_sets: u32,
    segments: &[SegmentDef],
    max_len: u32,
    full_groups: bool,
) -> Vec<u32> {
    let mut result = vec![0u32; segments.len()];
    if segments.is_empty() {
        return result;
    }
    let lengths: Vec<u32> = segments
        .iter()
        .map(|s| (if s.longline { max_len } else { s.length }).max(1))
        .collect();
    let scale: f64 = lengths.iter().map(|&l| l as f64).product();
    let freq_sum: u32 = segments.iter().map(|s| s.frequency).sum();
    let reduce = scale * freq_sum as f64;

    let mut demand: Vec<f64> = segments
        .iter()
        .zip(&lengths)
        .map(|(s, &len)| {
            let d = scale * num_sets as f64 * s.frequency as f64;
            if full_groups {
                d / len as f64
            } else {
                d
            }
        })
        .collect();

    let mut assigned = 0u32;
    let mut imax = 0usize;
    let mut size = 0u32;
    while assigned < num_sets {
        let mut max = 0.0;
        for (i, &d) in demand.iter().enumerate() {
            if d > max {
                imax = i;
                max = d;
            }
        }
        size = if full_groups { lengths[imax] } else { 1 };
        demand[imax] -= reduce;
        result[imax] += size;
        assigned += size;
    }

    if assigned - num_sets > size / 2 {
        result[imax] -= size;
    }
    result
}

/// Allocates per-track details for a detailed-routing channel.
///
/// Returns the details and the actual channel width, which may differ from
/// `width` when the segment mix cannot fill it exactly.
pub fn alloc_seg_details(
    width: u32,
    max_len: u32,
    segments: &[SegmentDef],
    directionality: Directionality,
    full_groups: bool,
) -> Result<(Vec<SegDetails>, u32), RrGraphError> {
    if let Some(seg) = segments.iter().find(|s| s.directionality != directionality) {
        return Err(RrGraphError::arch(format!(
            "segment '{}' is {:?} but the graph is {:?}",
            seg.name, seg.directionality, directionality
        )));
    }
    let fac = directionality.group_size();
    let sets = seg_track_counts(width / fac, segments, max_len, full_groups);
    let actual_width = sets.iter().sum::<u32>() * fac;

    let mut details = Vec::with_capacity(actual_width as usize);
    let mut cur_track = 0u32;
    for (index, seg) in segments.iter().enumerate() {
        let first_track = cur_track;
        let ntracks = fac * sets[index];
        if ntracks == 0 {
            continue;
        }
        let length = (if seg.longline { max_len } else { seg.length }).max(1);
        let cb: Vec<bool> = (0..length as usize)
            .map(|j| seg.cb[j % seg.cb.len()])
            .collect();
        let sb: Vec<bool> = (0..=length as usize)
            .map(|j| seg.sb[j % seg.sb.len()])
            .collect();

        let mut group_start = 0;
        for itrack in 0..ntracks {
            if (itrack / fac) % length == 0 && itrack % fac == 0 {
                group_start = cur_track;
            }
            let mut group_size = (ntracks + first_track - group_start).min(length * fac);
            if group_size == 0 {
                group_size = length * fac;
            }
            let (direction, drivers) = match directionality {
                Directionality::Bidir => (Direction::Bi, Drivers::MultiBuffered),
                Directionality::Unidir if itrack % 2 == 1 => (Direction::Dec, Drivers::Single),
                Directionality::Unidir => (Direction::Inc, Drivers::Single),
            };
            details.push(SegDetails {
                length,
                start: (cur_track / fac) % length + 1,
                longline: seg.longline,
                group_start,
                group_size,
                cb: cb.clone(),
                sb: sb.clone(),
                r_metal: seg.r_metal,
                c_metal: seg.c_metal,
                wire_switch: seg.wire_switch,
                opin_switch: seg.opin_switch,
                direction,
                drivers,
                segment: SegmentId::from_raw(index as u32),
            });
            cur_track += 1;
        }
    }
    Ok((details, actual_width))
}

/// The single synthetic track of a global-routing channel.
pub fn global_seg_details(switch: SwitchId) -> Vec<SegDetails> {
    vec![SegDetails {
        length: 1,
        start: 1,
        longline: false,
        group_start: 0,
        group_size: 1,
        cb: vec![true],
        sb: vec![true, true],
        r_metal: 0.0,
        c_metal: 0.0,
        wire_switch: switch,
        opin_switch: switch,
        direction: Direction::Bi,
        drivers: Drivers::MultiBuffered,
        segment: SegmentId::from_raw(0),
    }]
}

/// Wire labels entering a switch block from one side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingWires {
    /// Label per track; `None` for tracks that do not enter the block.
    pub labels: Vec<Option<u32>>,
    /// Ending plus passing wires.
    pub num_incoming: u32,
    /// Wires that end at the block; they hold labels `0..num_ending`.
    pub num_ending: u32,
}

/// Geometric queries over the tracks of one channel orientation.
///
/// `seg_max` is the last valid position along the channel (`nx` for CHANX,
/// `ny` for CHANY).
#[derive(Debug, Clone, Copy)]
pub struct Channel<'a> {
    details: &'a [SegDetails],
    seg_max: u32,
}

impl<'a> Channel<'a> {
    /// Creates a view over `details` for channels of length `seg_max`.
    pub fn new(details: &'a [SegDetails], seg_max: u32) -> Self {
        Self { details, seg_max }
    }

    /// Number of tracks.
    pub fn width(&self) -> u32 {
        self.details.len() as u32
    }

    /// Details of `track`.
    pub fn track(&self, track: u32) -> &'a SegDetails {
        &self.details[track as usize]
    }

    /// Last valid position along the channel.
    pub fn seg_max(&self) -> u32 {
        self.seg_max
    }

    /// First position of the wire of `track` covering `seg` in channel `chan`.
    pub fn seg_start(&self, track: u32, chan: u32, seg: u32) -> u32 {
        let d = self.track(track);
        if d.longline {
            return 1;
        }
        let len = d.length as i64;
        let seg = seg as i64;
        let start = seg - (seg + len + chan as i64 - d.start as i64).rem_euclid(len);
        start.max(1) as u32
    }

    /// Last position of the wire of `track` starting at `start`.
    pub fn seg_end(&self, track: u32, start: u32, chan: u32) -> u32 {
        let d = self.track(track);
        if d.longline {
            return self.seg_max;
        }
        let len = d.length;
        let mut end = start + len - 1;
        if start == 1 {
            let first_full = (len - (chan % len) + d.start - 1) % len + 1;
            if first_full > 1 {
                end = first_full - 1;
            }
        }
        end.min(self.seg_max)
    }

    /// Whether a block pin may connect to `track` at position `seg`.
    pub fn is_cblock(&self, chan: u32, seg: u32, track: u32) -> bool {
        let d = self.track(track);
        let start = self.seg_start(track, chan, seg);
        let Some(ofs) = seg.checked_sub(start) else {
            return false;
        };
        let mut ofs = ofs as usize;
        if ofs >= d.cb.len() {
            return false;
        }
        if d.direction == Direction::Dec {
            ofs = d.cb.len() - 1 - ofs;
        }
        d.cb[ofs]
    }

    /// Whether the wire of `track` covering `wire_seg` has a switch box at
    /// the junction `sb_seg` (between positions `sb_seg` and `sb_seg + 1`).
    pub fn is_sblock(&self, chan: u32, wire_seg: u32, sb_seg: u32, track: u32) -> bool {
        let d = self.track(track);
        let start = self.seg_start(track, chan, wire_seg) as i64;
        let mut ofs = sb_seg as i64 - start + 1;
        let len = d.length as i64;
        if !(0..=len).contains(&ofs) {
            return false;
        }
        if d.direction == Direction::Dec {
            ofs = len - ofs;
        }
        d.sb[ofs as usize]
    }

    /// Maps a logical track to the physical track used for pin patterns.
    ///
    /// Within a group of same-type tracks the mapping rotates with
    /// `chan + seg` so pins see every stagger position across the chip.
    pub fn phy_track(&self, track: u32, chan: u32, seg: u32) -> u32 {
        let d = self.track(track);
        let fac = d.group_factor();
        let sets = (d.group_size / fac).max(1);
        let first = (chan + seg).saturating_sub(1) % sets;
        let vpr_offset = (track - d.group_start) / fac;
        let phy_offset = (first + vpr_offset) % sets;
        d.group_start + fac * phy_offset + (track - d.group_start) % fac
    }

    /// Tracks of direction `dir` whose driving end is at `seg`, in track
    /// order. These are the wires a mux at this position can drive.
    pub fn label_wire_muxes(&self, chan: u32, seg: u32, dir: Direction, check_cb: bool) -> Vec<u32> {
        let mut muxes = Vec::new();
        for track in 0..self.width() {
            let d = self.track(track);
            if d.direction != dir {
                continue;
            }
            let start = self.seg_start(track, chan, seg);
            let is_endpoint = match d.direction {
                Direction::Dec => seg == self.seg_end(track, start, chan),
                _ => seg == start,
            };
            if is_endpoint && (!check_cb || d.cb[0]) {
                muxes.push(track);
            }
        }
        muxes
    }

    /// Labels the wires of direction `dir` at `seg` that enter the switch
    /// block at `sb_seg`: ending wires first, then passing wires that have
    /// a switch box there.
    pub fn label_incoming_wires(&self, chan: u32, seg: u32, sb_seg: u32, dir: Direction) -> IncomingWires {
        let mut labels = vec![None; self.width() as usize];
        let mut num_ending = 0;
        let mut num_passing = 0;
        for pass in 0..2 {
            for track in 0..self.width() {
                let d = self.track(track);
                if d.direction != dir {
                    continue;
                }
                let start = self.seg_start(track, chan, seg);
                let is_endpoint = match d.direction {
                    Direction::Dec => seg == start,
                    _ => seg == self.seg_end(track, start, chan),
                };
                if pass == 0 && is_endpoint {
                    labels[track as usize] = Some(num_ending);
                    num_ending += 1;
                } else if pass == 1 && !is_endpoint && self.is_sblock(chan, seg, sb_seg, track) {
                    labels[track as usize] = Some(num_ending + num_passing);
                    num_passing += 1;
                }
            }
        }
        IncomingWires {
            labels,
            num_incoming: num_ending + num_passing,
            num_ending,
        }
    }
}

/// The label whose mux drives `track`, or the label of the highest track
/// when none does.
pub fn find_label_of_track(muxes: &[u32], track: u32) -> Option<u32> {
    if let Some(i) = muxes.iter().position(|&t| t == track) {
        return Some(i as u32);
    }
    let mut best: Option<(usize, u32)> = None;
    for (i, &t) in muxes.iter().enumerate() {
        if best.map_or(true, |(_, m)| t > m) {
            best = Some((i, t));
        }
    }
    best.map(|(i, _)| i as u32)
}
