//! Opaque ID newtypes for architecture entities.
//!
//! Each ID is a thin `u32` wrapper that is `Copy`, `Hash`, and
//! `Serialize`/`Deserialize`, indexing one of the arenas in
//! [`Architecture`](crate::Architecture).

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }

            /// Returns the index as a `usize` for arena access.
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// ID of a switch type. Also the switch index carried on graph edges.
    SwitchId
);

define_id!(
    /// ID of a wire segment type.
    SegmentId
);

define_id!(
    /// ID of a physical block type (CLB, I/O pad, multiplier...).
    BlockTypeId
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn raw_and_index_agree() {
        let id = SegmentId::from_raw(3);
        assert_eq!(id.as_raw(), 3);
        assert_eq!(id.index(), 3);
        assert_eq!(id.to_string(), "3");
    }

    #[test]
    fn ids_hash_by_value() {
        let set: HashSet<_> = [SwitchId::from_raw(1), SwitchId::from_raw(1), SwitchId::from_raw(2)]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn serde_is_transparent_number() {
        let json = serde_json::to_string(&BlockTypeId::from_raw(5)).unwrap();
        assert_eq!(json, "5");
    }
}
