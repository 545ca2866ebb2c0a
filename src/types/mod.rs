//! Strongly-typed index types shared across the crate.

mod indices;

pub use indices::{ElementIndex, FaceIndex};
