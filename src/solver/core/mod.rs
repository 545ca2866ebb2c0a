//! Core solution containers.

mod fields;

pub use fields::Fields;
