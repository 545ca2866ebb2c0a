//! Index newtypes for elements and faces of a partition.
//!
//! Public APIs and error values carry these; the kernels index with raw
//! `usize` and wrap only when a value leaves them.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! mesh_index {
    (
        $(#[$meta:meta])*
        $name:ident, $prefix:literal
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[repr(transparent)]
        #[serde(transparent)]
        pub struct $name(usize);

        impl $name {
            #[inline]
            pub const fn new(index: usize) -> Self {
                Self(index)
            }

            #[inline]
            pub const fn get(self) -> usize {
                self.0
            }

            /// Indices `0..n`.
            pub fn range(n: usize) -> impl ExactSizeIterator<Item = $name> {
                (0..n).map($name)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline]
            fn from(idx: $name) -> usize {
                idx.0
            }
        }

        impl<T> std::ops::Index<$name> for [T] {
            type Output = T;
            #[inline]
            fn index(&self, idx: $name) -> &T {
                &self[idx.0]
            }
        }

        impl<T> std::ops::Index<$name> for Vec<T> {
            type Output = T;
            #[inline]
            fn index(&self, idx: $name) -> &T {
                &self[idx.0]
            }
        }
    };
}

mesh_index!(
    /// Tetrahedron of a partition.
    ///
    /// # Example
    ///
    /// ```
    /// use inciter::types::ElementIndex;
    ///
    /// let elem = ElementIndex::new(42);
    /// assert_eq!(elem.get(), 42);
    /// assert_eq!(elem.to_string(), "E42");
    /// ```
    ElementIndex,
    "E"
);

mesh_index!(
    /// Triangle in a partition's face list; boundary faces come first.
    FaceIndex,
    "F"
);
