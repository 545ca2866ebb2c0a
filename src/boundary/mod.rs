//! Boundary condition injection.
//!
//! Side-set ids from the configuration are resolved once into
//! [`SideSetBcs`]. DG systems turn boundary faces into ghost states
//! ([`FlowBoundary`]); edge-based CG systems act on boundary nodes
//! ([`dirbc`], [`symmetry_normals`], [`apply_symmetry`]).
//!
//! | policy        | DG ghost state                      | CG nodes |
//! |---------------|-------------------------------------|----------|
//! | `Dirichlet`   | analytic solution                   | solution increment over the step |
//! | `Symmetry`    | normal momentum reversed            | normal velocity removed |
//! | `Extrapolate` | interior state                      | none |
//! | `Outlet`      | back pressure when subsonic outflow | none |

mod ghost;
mod nodal;
mod side_sets;

pub use ghost::{
    BcContext, DirichletBc, ExtrapolateBc, FlowBoundary, FlowBoundaryCondition, OutletBc, SymmetryBc,
};
pub use nodal::{
    apply_symmetry, dirbc, normalize_normals, symmetry_area_vectors, symmetry_normals,
};
pub use side_sets::SideSetBcs;

use serde::{Deserialize, Serialize};

/// Boundary policy of a side set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BcKind {
    Dirichlet,
    Symmetry,
    Extrapolate,
    Outlet,
}
