//! Pin-to-track connection patterns.
//!
//! Every physical pin instance (pin, height offset, side) of a block type
//! gets a list of tracks in the adjoining channel. Pins are ordered around
//! the perimeter first, then tracks are spread over them either uniformly
//! or with the dense/sparse perturbed pattern used for input pins.

use weft_arch::{perimeter_slots, BlockType, PinClassKind, Side};

/// Track lists for one block type and one pin kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinTrackMap {
    height: u32,
    fc: u32,
    /// `tracks[(pin * height + offset) * 4 + side]`, empty where the pin is
    /// absent.
    tracks: Vec<Vec<u32>>,
}

impl PinTrackMap {
    fn empty(num_pins: u32, height: u32, fc: u32) -> Self {
        Self {
            height,
            fc,
            tracks: vec![Vec::new(); (num_pins * height * 4) as usize],
        }
    }

    fn slot(&self, pin: u32, offset: u32, side: Side) -> usize {
        ((pin * self.height + offset) * 4) as usize + side.index()
    }

    /// The pattern's Fc (the largest Fc of any pin of the kind).
    pub fn fc(&self) -> u32 {
        self.fc
    }

    /// Tracks of `pin` on `side` at `offset`; empty if the pin is not there.
    pub fn tracks(&self, pin: u32, offset: u32, side: Side) -> &[u32] {
        if offset >= self.height {
            return &[];
        }
        self.tracks
            .get(self.slot(pin, offset, side))
            .map_or(&[], Vec::as_slice)
    }

    /// Tracks in `0..width` that no pin reaches through the first
    /// `pin_fc[pin]` tracks of its list.
    pub fn uncovered_tracks(&self, width: u32, pin_fc: &[u32]) -> Vec<u32> {
        let mut conns = vec![0u32; width as usize];
        let per_pin = (self.height * 4) as usize;
        for (slot, tracks) in self.tracks.iter().enumerate() {
            let fc = pin_fc.get(slot / per_pin).copied().unwrap_or(0);
            for &t in tracks.iter().take(fc as usize) {
                if let Some(c) = conns.get_mut(t as usize) {
                    *c += 1;
                }
            }
        }
        (0..width).filter(|&t| conns[t as usize] == 0).collect()
    }
}

/// Physical pins of `kind` in canonical perimeter order.
///
/// Laps over the perimeter slots (LEFT bottom to top, TOP, RIGHT top to
/// bottom, BOTTOM); on each lap every slot contributes its next pin of the
/// requested kind. Global pins are skipped.
pub fn pin_order(block: &BlockType, kind: PinClassKind) -> Vec<(u32, u32, Side)> {
    let slots = perimeter_slots(block.height);
    let candidates: Vec<Vec<u32>> = slots
        .iter()
        .map(|&(offset, side)| {
            (0..block.num_pins())
                .filter(|&pin| {
                    block.pin_kind(pin) == kind
                        && !block.is_global_pin(pin)
                        && block.pin_at(pin, offset, side)
                })
                .collect()
        })
        .collect();
    let total: usize = candidates.iter().map(Vec::len).sum();

    let mut order = Vec::with_capacity(total);
    let mut lap = 0;
    while order.len() < total {
        for (slot, &(offset, side)) in slots.iter().enumerate() {
            if let Some(&pin) = candidates[slot].get(lap) {
                order.push((pin, offset, side));
            }
        }
        lap += 1;
    }
    order
}

/// Builds the pin-to-track table for `kind` pins of `block`.
///
/// `fc` is the largest Fc of those pins; `group` is 2 for unidirectional
/// channels (tracks are handed out in INC/DEC pairs) and 1 otherwise.
pub fn pin_to_track_map(
    block: &BlockType,
    kind: PinClassKind,
    fc: u32,
    width: u32,
    group: u32,
    perturb: bool,
) -> PinTrackMap {
    let mut map = PinTrackMap::empty(block.num_pins(), block.height, fc);
    if fc == 0 || width == 0 {
        return map;
    }
    let order = pin_order(block, kind);
    if order.is_empty() {
        return map;
    }
    if perturb && group == 1 {
        load_perturbed(&mut map, &order, fc, width);
    } else {
        load_uniform(&mut map, &order, fc, width, group);
    }
    map
}

/// Spreads the Fc connections of every pin evenly over the channel,
/// staggering the starting track from pin to pin.
fn load_uniform(map: &mut PinTrackMap, order: &[(u32, u32, Side)], fc: u32, width: u32, group: u32) {
    let pairs = (width / group).max(1);
    let fc_groups = (fc / group).max(1);
    let num_phys = order.len() as f32;
    let step = pairs as f32 / (fc_groups as f32 * num_phys);
    let fc_step = pairs as f32 / fc_groups as f32;

    for (i, &(pin, offset, side)) in order.iter().enumerate() {
        let mut tracks = Vec::with_capacity(fc as usize);
        for j in 0..fc_groups {
            let ftrack = i as f32 * step + j as f32 * fc_step;
            let itrack = (ftrack as u32 * group).min(width - group);
            tracks.extend(itrack..itrack + group);
        }
        let slot = map.slot(pin, offset, side);
        map.tracks[slot] = tracks;
    }
}

/// Places `Fc/2 + 1` connections over one half of the channel and the rest
/// over the other half, alternating the dense half between pins.
fn load_perturbed(map: &mut PinTrackMap, order: &[(u32, u32, Side)], fc: u32, width: u32) {
    let fc_dense = fc / 2 + 1;
    let fc_sparse = fc.saturating_sub(fc_dense);
    let step = width as f32 / (fc as f32 * order.len() as f32);
    let spacing_dense = width as f32 / (2 * fc_dense) as f32;
    let spacing_sparse = if fc_sparse > 0 {
        width as f32 / (2 * fc_sparse) as f32
    } else {
        0.0
    };

    for (i, &(pin, offset, side)) in order.iter().enumerate() {
        let halves = if i % 2 == 0 {
            [(fc_dense, spacing_dense), (fc_sparse, spacing_sparse)]
        } else {
            [(fc_sparse, spacing_sparse), (fc_dense, spacing_dense)]
        };
        let mut ftrack = i as f32 * step;
        let mut tracks = Vec::with_capacity(fc as usize);
        for (count, spacing) in halves {
            for _ in 0..count {
                tracks.push(ftrack as u32 % width);
                ftrack += spacing;
            }
        }
        let slot = map.slot(pin, offset, side);
        map.tracks[slot] = tracks;
    }
}

/// Inverse of the input-pin table: which pins each (track, offset, side)
/// reaches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackToPinLookup {
    height: u32,
    /// `pins[(track * height + offset) * 4 + side]`.
    pins: Vec<Vec<u32>>,
}

impl TrackToPinLookup {
    /// Inverts `map`, using the first `pin_fc[pin]` tracks of each pin.
    pub fn new(map: &PinTrackMap, pin_fc: &[u32], width: u32) -> Self {
        let height = map.height;
        let mut pins = vec![Vec::new(); (width * height * 4) as usize];
        for (pin, &fc) in pin_fc.iter().enumerate() {
            for offset in 0..height {
                for side in Side::ALL {
                    let tracks = map.tracks(pin as u32, offset, side);
                    for &track in tracks.iter().take(fc as usize) {
                        if track < width {
                            pins[((track * height + offset) * 4) as usize + side.index()]
                                .push(pin as u32);
                        }
                    }
                }
            }
        }
        Self { height, pins }
    }

    /// Pins reachable from `track` on `side` of the tile at `offset`.
    pub fn pins(&self, track: u32, offset: u32, side: Side) -> &[u32] {
        if offset >= self.height {
            return &[];
        }
        self.pins
            .get(((track * self.height + offset) * 4) as usize + side.index())
            .map_or(&[], Vec::as_slice)
    }
}
