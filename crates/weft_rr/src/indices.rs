//! Flat node-index lookup keyed by (kind, x, y, ptc).
//!
//! Each (kind, x, y) cell owns a contiguous run of the `ids` array indexed
//! by ptc. Unused slots hold a sentinel and read back as `None`.

use crate::graph::RrNodeKind;
use crate::ids::RrNodeId;
use serde::{Deserialize, Serialize};

const NONE: u32 = u32::MAX;

/// The finished lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeLookup {
    nx: u32,
    ny: u32,
    /// `cell_starts[c]..cell_starts[c + 1]` indexes `ids` for cell `c`.
    cell_starts: Vec<u32>,
    ids: Vec<u32>,
}

impl NodeLookup {
    /// Starts a lookup for a grid with an `nx × ny` core.
    pub fn builder(nx: u32, ny: u32) -> NodeLookupBuilder {
        let cells = RrNodeKind::ALL.len() * (nx as usize + 2) * (ny as usize + 2);
        NodeLookupBuilder {
            nx,
            ny,
            cells: vec![Vec::new(); cells],
        }
    }

    fn cell(&self, kind: RrNodeKind, x: i32, y: i32) -> Option<usize> {
        cell_index(self.nx, self.ny, kind, x, y)
    }

    /// Returns the node at (kind, x, y, ptc), `None` if out of range or
    /// unused.
    pub fn get(&self, kind: RrNodeKind, x: i32, y: i32, ptc: u32) -> Option<RrNodeId> {
        let cell = self.cell(kind, x, y)?;
        let start = self.cell_starts[cell] as usize;
        let end = self.cell_starts[cell + 1] as usize;
        let slot = start + ptc as usize;
        if slot >= end {
            return None;
        }
        match self.ids[slot] {
            NONE => None,
            id => Some(RrNodeId::from_raw(id)),
        }
    }

    /// Number of ptc slots (used or not) in a cell.
    pub fn cell_len(&self, kind: RrNodeKind, x: i32, y: i32) -> u32 {
        match self.cell(kind, x, y) {
            Some(cell) => self.cell_starts[cell + 1] - self.cell_starts[cell],
            None => 0,
        }
    }

    /// Iterates every populated entry as `(kind, x, y, ptc, id)`.
    pub fn entries(&self) -> impl Iterator<Item = (RrNodeKind, i32, i32, u32, RrNodeId)> + '_ {
        let height = self.ny as usize + 2;
        let width = self.nx as usize + 2;
        (0..self.cell_starts.len() - 1).flat_map(move |cell| {
            let kind = RrNodeKind::ALL[cell / (width * height)];
            let x = ((cell / height) % width) as i32;
            let y = (cell % height) as i32;
            let start = self.cell_starts[cell] as usize;
            let end = self.cell_starts[cell + 1] as usize;
            self.ids[start..end]
                .iter()
                .enumerate()
                .filter(|(_, &id)| id != NONE)
                .map(move |(ptc, &id)| (kind, x, y, ptc as u32, RrNodeId::from_raw(id)))
        })
    }
}

fn cell_index(nx: u32, ny: u32, kind: RrNodeKind, x: i32, y: i32) -> Option<usize> {
    if x < 0 || y < 0 || x > nx as i32 + 1 || y > ny as i32 + 1 {
        return None;
    }
    let width = nx as usize + 2;
    let height = ny as usize + 2;
    Some((kind.index() * width + x as usize) * height + y as usize)
}

/// Accumulates entries before flattening into a [`NodeLookup`].
#[derive(Debug)]
pub struct NodeLookupBuilder {
    nx: u32,
    ny: u32,
    cells: Vec<Vec<u32>>,
}

impl NodeLookupBuilder {
    /// Records `id` at (kind, x, y, ptc). Returns `false` if the tile is
    /// outside the grid.
    pub fn insert(&mut self, kind: RrNodeKind, x: i32, y: i32, ptc: u32, id: RrNodeId) -> bool {
        let Some(cell) = cell_index(self.nx, self.ny, kind, x, y) else {
            return false;
        };
        let slots = &mut self.cells[cell];
        if slots.len() <= ptc as usize {
            slots.resize(ptc as usize + 1, NONE);
        }
        slots[ptc as usize] = id.as_raw();
        true
    }

    /// Returns the node recorded so far at (kind, x, y, ptc).
    pub fn get(&self, kind: RrNodeKind, x: i32, y: i32, ptc: u32) -> Option<RrNodeId> {
        let cell = cell_index(self.nx, self.ny, kind, x, y)?;
        match self.cells[cell].get(ptc as usize) {
            Some(&id) if id != NONE => Some(RrNodeId::from_raw(id)),
            _ => None,
        }
    }

    /// Flattens the accumulated cells.
    pub fn finish(self) -> NodeLookup {
        let mut cell_starts = Vec::with_capacity(self.cells.len() + 1);
        let mut ids = Vec::new();
        cell_starts.push(0);
        for cell in self.cells {
            ids.extend(cell);
            cell_starts.push(ids.len() as u32);
        }
        NodeLookup {
            nx: self.nx,
            ny: self.ny,
            cell_starts,
            ids,
        }
    }
}
