//! The device grid: which block type occupies each tile.
//!
//! The grid has `(nx + 2) × (ny + 2)` tiles. Row and column 0 and
//! `nx + 1`/`ny + 1` form the I/O ring; the core is `1..=nx × 1..=ny`.
//! Blocks taller than one tile occupy consecutive rows; every covered tile
//! records its height offset from the anchor (offset 0) tile.

use crate::error::ArchError;
use crate::ids::BlockTypeId;
use crate::Architecture;
use serde::{Deserialize, Serialize};

/// One grid tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GridTile {
    /// The block type covering this tile, `None` when empty.
    pub block_type: Option<BlockTypeId>,
    /// Rows between this tile and the block's anchor tile.
    pub height_offset: u32,
}

/// A column override in a [`GridLayout`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Block type name filling the column.
    pub block_type: String,
    /// First core column (1-based).
    pub start: u32,
    /// Repeat period; 0 places the column once.
    #[serde(default)]
    pub repeat: u32,
}

/// A declarative grid description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridLayout {
    /// Core columns.
    pub nx: u32,
    /// Core rows.
    pub ny: u32,
    /// I/O block type for the perimeter ring (corners stay empty).
    #[serde(default)]
    pub io: Option<String>,
    /// Block type filling the core.
    pub fill: String,
    /// Column overrides, applied in order.
    #[serde(default, rename = "column")]
    pub columns: Vec<ColumnDef>,
}

/// The device grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    nx: u32,
    ny: u32,
    /// Column-major, `(nx + 2) * (ny + 2)` tiles.
    tiles: Vec<GridTile>,
}

impl Grid {
    /// Creates a grid with an `nx × ny` core and every tile empty.
    pub fn new(nx: u32, ny: u32) -> Self {
        Self {
            nx,
            ny,
            tiles: vec![GridTile::default(); ((nx + 2) * (ny + 2)) as usize],
        }
    }

    /// Core columns.
    pub fn nx(&self) -> u32 {
        self.nx
    }

    /// Core rows.
    pub fn ny(&self) -> u32 {
        self.ny
    }

    fn slot(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x > self.nx as i32 + 1 || y > self.ny as i32 + 1 {
            return None;
        }
        Some(x as usize * (self.ny as usize + 2) + y as usize)
    }

    /// Returns the tile at `(x, y)`, or `None` outside the grid.
    pub fn tile(&self, x: i32, y: i32) -> Option<&GridTile> {
        self.slot(x, y).map(|i| &self.tiles[i])
    }

    /// Returns the block type covering `(x, y)`, `None` when empty or outside.
    pub fn block_type_at(&self, x: i32, y: i32) -> Option<BlockTypeId> {
        self.tile(x, y).and_then(|t| t.block_type)
    }

    /// Places a block of `height` rows with its anchor at `(x, y)`.
    pub fn place(
        &mut self,
        x: i32,
        y: i32,
        block_type: BlockTypeId,
        height: u32,
    ) -> Result<(), ArchError> {
        for offset in 0..height {
            let slot = self
                .slot(x, y + offset as i32)
                .ok_or_else(|| ArchError::InvalidGrid {
                    reason: format!(
                        "block type {block_type} at ({x}, {y}) does not fit in the grid"
                    ),
                })?;
            self.tiles[slot] = GridTile {
                block_type: Some(block_type),
                height_offset: offset,
            };
        }
        Ok(())
    }

    /// Builds a grid from a declarative layout.
    ///
    /// Columns are stacked from row 1 upward with blocks of the column's
    /// type while they fit; leftover rows stay empty.
    pub fn from_layout(arch: &Architecture, layout: &GridLayout) -> Result<Self, ArchError> {
        if layout.nx == 0 || layout.ny == 0 {
            return Err(ArchError::InvalidGrid {
                reason: "grid core must be at least 1x1".to_string(),
            });
        }
        let lookup = |name: &str| {
            arch.block_type_by_name(name)
                .ok_or_else(|| ArchError::UnknownBlockType(name.to_string()))
        };
        let mut grid = Grid::new(layout.nx, layout.ny);
        let (nx, ny) = (layout.nx as i32, layout.ny as i32);

        if let Some(io_name) = &layout.io {
            let io = lookup(io_name)?;
            for x in 1..=nx {
                grid.place(x, 0, io, 1)?;
                grid.place(x, ny + 1, io, 1)?;
            }
            for y in 1..=ny {
                grid.place(0, y, io, 1)?;
                grid.place(nx + 1, y, io, 1)?;
            }
        }

        let mut column_type = vec![lookup(&layout.fill)?; layout.nx as usize + 1];
        for column in &layout.columns {
            let id = lookup(&column.block_type)?;
            let mut x = column.start;
            while x >= 1 && x <= layout.nx {
                column_type[x as usize] = id;
                if column.repeat == 0 {
                    break;
                }
                x += column.repeat;
            }
        }

        for x in 1..=nx {
            let id = column_type[x as usize];
            let height = arch.block_type(id).height as i32;
            let mut y = 1;
            while y + height - 1 <= ny {
                grid.place(x, y, id, height as u32)?;
                y += height;
            }
        }
        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{BlockTypeDef, PinLocations};
    use crate::types::FcSpec;

    fn arch_with(types: &[(&str, u32)]) -> Architecture {
        let mut arch = Architecture::new();
        for &(name, height) in types {
            arch.add_block_type(BlockTypeDef {
                name: name.to_string(),
                height,
                ports: Vec::new(),
                fc_in: FcSpec::Frac(1.0),
                fc_out: FcSpec::Frac(1.0),
                pin_locations: PinLocations::Spread,
                is_io: name == "io",
            })
            .unwrap();
        }
        arch
    }

    #[test]
    fn io_ring_without_corners() {
        let arch = arch_with(&[("io", 1), ("clb", 1)]);
        let layout = GridLayout {
            nx: 3,
            ny: 2,
            io: Some("io".to_string()),
            fill: "clb".to_string(),
            columns: Vec::new(),
        };
        let grid = Grid::from_layout(&arch, &layout).unwrap();
        let io = arch.block_type_by_name("io");
        let clb = arch.block_type_by_name("clb");
        assert_eq!(grid.block_type_at(0, 0), None);
        assert_eq!(grid.block_type_at(4, 3), None);
        assert_eq!(grid.block_type_at(0, 1), io);
        assert_eq!(grid.block_type_at(2, 3), io);
        assert_eq!(grid.block_type_at(2, 2), clb);
        assert_eq!(grid.block_type_at(5, 1), None);
        assert_eq!(grid.block_type_at(-1, 1), None);
    }

    #[test]
    fn tall_columns_stack_and_leave_gaps() {
        let arch = arch_with(&[("clb", 1), ("mult", 2)]);
        let layout = GridLayout {
            nx: 4,
            ny: 5,
            io: None,
            fill: "clb".to_string(),
            columns: vec![ColumnDef {
                block_type: "mult".to_string(),
                start: 2,
                repeat: 2,
            }],
        };
        let grid = Grid::from_layout(&arch, &layout).unwrap();
        let mult = arch.block_type_by_name("mult");
        for x in [2, 4] {
            assert_eq!(grid.block_type_at(x, 1), mult);
            assert_eq!(grid.tile(x, 2).unwrap().height_offset, 1);
            assert_eq!(grid.tile(x, 3).unwrap().height_offset, 0);
            assert_eq!(grid.block_type_at(x, 5), None);
        }
        assert_eq!(grid.block_type_at(3, 5), arch.block_type_by_name("clb"));
    }

    #[test]
    fn unknown_fill_is_rejected() {
        let arch = arch_with(&[("clb", 1)]);
        let layout = GridLayout {
            nx: 1,
            ny: 1,
            io: None,
            fill: "dsp".to_string(),
            columns: Vec::new(),
        };
        let err = Grid::from_layout(&arch, &layout).unwrap_err();
        assert!(matches!(err, ArchError::UnknownBlockType(name) if name == "dsp"));
    }

    #[test]
    fn place_out_of_grid_fails() {
        let mut grid = Grid::new(2, 2);
        let err = grid.place(1, 3, BlockTypeId::from_raw(0), 2).unwrap_err();
        assert!(err.to_string().contains("does not fit"));
    }
}
