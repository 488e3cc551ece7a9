//! Block sides and their rotations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A side of a block or of a switch-block junction.
///
/// The discriminants are the array indices used by the pattern tables.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Upper edge.
    Top = 0,
    /// Right edge.
    Right = 1,
    /// Lower edge.
    Bottom = 2,
    /// Left edge.
    Left = 3,
}

impl Side {
    /// All sides in index order.
    pub const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];

    /// Returns the table index of this side.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Returns the side with the given table index (taken modulo 4).
    pub fn from_index(index: usize) -> Side {
        Side::ALL[index % 4]
    }

    /// The next side clockwise.
    pub fn clockwise(self) -> Side {
        Side::from_index(self.index() + 1)
    }

    /// The facing side.
    pub fn opposite(self) -> Side {
        Side::from_index(self.index() + 2)
    }

    /// The next side counter-clockwise.
    pub fn counter_clockwise(self) -> Side {
        Side::from_index(self.index() + 3)
    }

    /// Returns `true` for TOP and BOTTOM, whose adjoining channels are horizontal.
    pub fn is_vertical(self) -> bool {
        matches!(self, Side::Top | Side::Bottom)
    }

    /// Returns `true` for TOP and RIGHT, the sides facing increasing coordinates.
    pub fn is_positive(self) -> bool {
        matches!(self, Side::Top | Side::Right)
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Side::Top => "TOP",
            Side::Right => "RIGHT",
            Side::Bottom => "BOTTOM",
            Side::Left => "LEFT",
        };
        f.write_str(s)
    }
}
