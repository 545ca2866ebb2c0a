//! Geometric and mass operators on tetrahedra.
//!
//! This module provides:
//! - Jacobians, shape-function gradients and reference-coordinate maps
//! - Triangle areas, normals and centroids
//! - Element mass matrices for the Dubiner basis (`faer` matrices)

mod geometric;
mod mass;

pub use geometric::{
    TetCoords, TriCoords, Vec3, checked_jacobian, cross, crossdiv, dot, inverse_jacobian, jacobian, length,
    physical_coordinates, reference_coordinates, shape_functions, shape_gradients, sub,
    tet_centroid, triangle_area, triangle_centroid, triangle_normal, triple,
};
pub use mass::{mass_diagonal, mass_matrix, mass_matrix_inv};
