//! Index newtypes for graph entities.

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
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
    /// Index of a node in an [`RrGraph`](crate::RrGraph).
    RrNodeId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_roundtrip_and_ordering() {
        let a = RrNodeId::from_raw(3);
        let b = RrNodeId::from_raw(7);
        assert_eq!(a.as_raw(), 3);
        assert_eq!(b.index(), 7);
        assert!(a < b);
        assert_eq!(format!("{b}"), "7");
    }
}
