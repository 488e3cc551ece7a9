//! The indexed cost table shared by nodes with the same cost index.

use crate::graph::{RrNode, RrNodeKind};
use serde::{Deserialize, Serialize};
use weft_arch::{Architecture, BaseCostType, SwitchId};

/// Cost index of SOURCE nodes.
pub const SOURCE_COST_INDEX: u32 = 0;
/// Cost index of SINK nodes.
pub const SINK_COST_INDEX: u32 = 1;
/// Cost index of OPIN nodes.
pub const OPIN_COST_INDEX: u32 = 2;
/// Cost index of IPIN nodes.
pub const IPIN_COST_INDEX: u32 = 3;
/// First wire cost index; CHANX segment `i` is `CHANX_COST_INDEX_START + i`
/// and CHANY segment `i` follows all CHANX entries.
pub const CHANX_COST_INDEX_START: u32 = 4;

/// Router cost and timing parameters for one cost index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedData {
    /// Base cost of using a node.
    pub base_cost: f32,
    /// Copy of `base_cost` the router can restore from.
    pub saved_base_cost: f32,
    /// Cost index of the same segment in the other channel direction.
    pub ortho_cost_index: Option<u32>,
    /// Segment type of wire entries.
    pub seg_index: Option<u32>,
    /// Reciprocal of the wire length in tiles.
    pub inv_length: f32,
    /// Linear delay term.
    pub t_linear: f32,
    /// Quadratic delay term.
    pub t_quadratic: f32,
    /// Capacitive load seen by an upstream pass transistor.
    pub c_load: f32,
}

impl IndexedData {
    fn pin(base_cost: f32) -> Self {
        Self {
            base_cost,
            saved_base_cost: base_cost,
            ortho_cost_index: None,
            seg_index: None,
            inv_length: 0.0,
            t_linear: 0.0,
            t_quadratic: 0.0,
            c_load: 0.0,
        }
    }
}

/// Number of wire segment types the table is sized for.
pub(crate) fn num_seg_types(arch: &Architecture) -> u32 {
    (arch.segments.len() as u32).max(1)
}

/// Cost index of a wire node of `segment`.
pub(crate) fn wire_cost_index(arch: &Architecture, kind: RrNodeKind, segment: u32) -> u32 {
    match kind {
        RrNodeKind::ChanY => CHANX_COST_INDEX_START + num_seg_types(arch) + segment,
        _ => CHANX_COST_INDEX_START + segment,
    }
}

fn median(mut values: Vec<f32>) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(f32::total_cmp);
    values[values.len() / 2]
}

/// Builds the table for a finished node set.
///
/// `nx`/`ny` bound the effective length of long wires in each direction.
pub(crate) fn build_indexed_data(
    arch: &Architecture,
    nodes: &[RrNode],
    nx: u32,
    ny: u32,
    base_cost_type: BaseCostType,
) -> Vec<IndexedData> {
    let num_seg = num_seg_types(arch);
    let mut table = Vec::with_capacity((CHANX_COST_INDEX_START + 2 * num_seg) as usize);
    table.push(IndexedData::pin(1.0));
    table.push(IndexedData::pin(0.0));
    table.push(IndexedData::pin(1.0));
    let mut ipin = IndexedData::pin(0.95);
    ipin.t_linear = arch
        .switches
        .get(arch.wire_to_ipin_switch.index())
        .map_or(0.0, |s| s.tdel);
    table.push(ipin);

    let mut rs: Vec<Vec<f32>> = vec![Vec::new(); 2 * num_seg as usize];
    let mut cs: Vec<Vec<f32>> = vec![Vec::new(); 2 * num_seg as usize];
    for node in nodes.iter().filter(|n| n.kind.is_wire()) {
        let Some(slot) = node.cost_index.checked_sub(CHANX_COST_INDEX_START) else {
            continue;
        };
        if let (Some(r), Some(c)) = (rs.get_mut(slot as usize), cs.get_mut(slot as usize)) {
            r.push(node.r);
            c.push(node.c);
        }
    }

    for (dir, max_len) in [(0u32, nx), (1u32, ny)] {
        for seg in 0..num_seg {
            let slot = (dir * num_seg + seg) as usize;
            let def = arch.segments.get(seg as usize);
            let length = match def {
                Some(d) if !d.longline => d.length.min(max_len),
                _ => max_len,
            }
            .max(1);
            let inv_length = 1.0 / length as f32;
            let base_cost = match base_cost_type {
                BaseCostType::DemandOnly => 1.0,
                BaseCostType::DemandOnlyNormalizedLength => length as f32,
            };
            let ortho = CHANX_COST_INDEX_START + (1 - dir) * num_seg + seg;
            let mut entry = IndexedData {
                base_cost,
                saved_base_cost: base_cost,
                ortho_cost_index: Some(ortho),
                seg_index: Some(seg),
                inv_length,
                t_linear: 0.0,
                t_quadratic: 0.0,
                c_load: 0.0,
            };
            if !rs[slot].is_empty() {
                let switch = def.map_or(arch.global_route_switch, |d| d.wire_switch);
                let r = median(std::mem::take(&mut rs[slot]));
                let c = median(std::mem::take(&mut cs[slot]));
                load_wire_timing(arch, switch, r, c, &mut entry);
            }
            table.push(entry);
        }
    }
    table
}

fn load_wire_timing(
    arch: &Architecture,
    switch: SwitchId,
    r: f32,
    c: f32,
    entry: &mut IndexedData,
) {
    let Some(sw) = arch.switches.get(switch.index()) else {
        return;
    };
    if sw.buffered {
        entry.t_linear = sw.tdel + sw.r * c + 0.5 * r * c;
        entry.t_quadratic = 0.0;
        entry.c_load = 0.0;
    } else {
        entry.t_linear = sw.tdel + 0.5 * sw.r * c;
        entry.t_quadratic = (sw.r + r) * 0.5 * c;
        entry.c_load = c;
    }
}
