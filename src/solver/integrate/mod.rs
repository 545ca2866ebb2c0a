//! DG integrals over elements and faces.
//!
//! The semi-discrete DG system for element K is
//!
//! M dU/dt = ∫_K F(u)·∇B dV - ∮_∂K F*·n B dA + ∫_K s B dV + N(u)
//!
//! with the diagonal Dubiner mass matrix M. Each term has its own pass:
//!
//! | pass                      | term |
//! |---------------------------|------|
//! | [`vol_int`]               | ∫ F(u)·∇B (ndof > 1 only) |
//! | [`surf_int`]              | internal faces, scattered to both sides |
//! | [`bnd_surf_int`]          | boundary faces against ghost states |
//! | [`src_int`]               | problem source |
//! | [`non_conservative_int`]  | multi-material α∇·v and v·∇(αp) terms |
//!
//! The surface passes must run before the non-conservative pass: they fill
//! the [`RiemannDerivatives`] it consumes.
//!
//! Solution dofs are stored with stride `rdof` (component `c`, mode `k` at
//! column `offset + c * rdof + k`), right-hand sides with stride `ndof`.

mod initialize;
mod non_conservative;
mod source;
mod surface;
mod volume;

pub use initialize::{initialize, l2_project};
pub use non_conservative::{RiemannDerivatives, non_conservative_int};
pub use source::src_int;
pub use surface::{bnd_surf_int, face_points, surf_int};
pub use volume::vol_int;

#[cfg(feature = "parallel")]
pub(crate) use non_conservative::non_conservative_element;
#[cfg(feature = "parallel")]
pub(crate) use source::src_int_element;
#[cfg(feature = "parallel")]
pub(crate) use surface::{boundary_face, internal_face, scatter};
#[cfg(feature = "parallel")]
pub(crate) use volume::vol_int_element;

use crate::equations::Physics;
use crate::flux::RiemannSolver;
use crate::mesh::MeshPartition;
use crate::operators::{TetCoords, Vec3, reference_coordinates};
use crate::polynomial::{BasisValues, MASS_DIAGONAL, eval_basis, eval_state};
use crate::solver::Fields;

/// Dof layout of one DG system inside a shared solution buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DgLayout {
    /// Conserved components
    pub ncomp: usize,
    /// First column of the system in the solution buffer
    pub offset: usize,
    /// Evolved dofs per component
    pub ndof: usize,
    /// Reconstructed dofs per component (stride of the solution)
    pub rdof: usize,
}

impl DgLayout {
    pub fn new(ncomp: usize, ndof: usize, rdof: usize) -> Self {
        Self {
            ncomp,
            offset: 0,
            ndof,
            rdof,
        }
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Solution column of component `c`, mode `k`, relative to `offset`.
    #[inline]
    pub fn col(&self, c: usize, k: usize) -> usize {
        c * self.rdof + k
    }

    /// Right-hand-side column of component `c`, mode `k`.
    #[inline]
    pub fn rhs_col(&self, c: usize, k: usize) -> usize {
        c * self.ndof + k
    }

    /// Columns of the solution buffer used by this system.
    pub fn width(&self) -> usize {
        self.ncomp * self.rdof
    }

    /// Modes evaluated in an element carrying `ndofel` evolved dofs.
    #[inline]
    pub fn eval_dofs(&self, ndofel: usize) -> usize {
        if self.rdof > self.ndof { self.rdof } else { ndofel }
    }
}

/// Everything an integral pass reads besides the state.
#[derive(Clone, Copy)]
pub struct DgContext<'a> {
    pub physics: &'a Physics,
    pub flux: &'a dyn RiemannSolver,
    pub part: &'a MeshPartition,
    pub layout: DgLayout,
    /// Evolved dofs per element
    pub ndofel: &'a [usize],
}

impl DgContext<'_> {
    pub fn nelem(&self) -> usize {
        self.part.n_elements()
    }

    /// Modal dofs of element `e` (component stride `rdof`).
    #[inline]
    pub(crate) fn dofs<'u>(&self, u: &'u Fields, e: usize) -> &'u [f64] {
        let o = self.layout.offset;
        &u.row(e)[o..o + self.layout.width()]
    }

    /// Cell averages of element `e`.
    pub fn average(&self, u: &Fields, e: usize) -> Vec<f64> {
        (0..self.layout.ncomp)
            .map(|c| u.get(e, self.layout.col(c, 0), self.layout.offset))
            .collect()
    }

    /// Basis values and state of element `e` at physical point `x`.
    pub(crate) fn state_at(&self, u: &Fields, e: usize, pts: &TetCoords, x: Vec3) -> (BasisValues, Vec<f64>) {
        let nd = self.layout.eval_dofs(self.ndofel[e]);
        let xi = reference_coordinates(pts, x);
        let b = eval_basis(nd, xi[0], xi[1], xi[2]);
        let s = eval_state(self.layout.ncomp, self.layout.rdof, nd, self.dofs(u, e), &b);
        (b, s)
    }
}

/// Diagonal mass matrix, `vol × MASS_DIAGONAL[k]`, with the layout of a
/// right-hand side.
pub fn mass_lhs(layout: DgLayout, part: &MeshPartition) -> Fields {
    let mut lhs = Fields::new(part.n_elements(), layout.ncomp * layout.ndof);
    for (e, g) in part.geometry.elements.iter().enumerate() {
        for c in 0..layout.ncomp {
            for k in 0..layout.ndof {
                lhs.set(e, layout.rhs_col(c, k), 0, g.volume * MASS_DIAGONAL[k]);
            }
        }
    }
    lhs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::TetMesh;

    #[test]
    fn test_layout_columns() {
        let l = DgLayout::new(5, 1, 4).with_offset(3);
        assert_eq!(l.col(2, 1), 9);
        assert_eq!(l.rhs_col(2, 0), 2);
        assert_eq!(l.width(), 20);
        assert_eq!(l.eval_dofs(1), 4);
        assert_eq!(DgLayout::new(5, 4, 4).eval_dofs(1), 1);
    }

    #[test]
    fn test_mass_lhs_sums_to_volume() {
        let mesh = TetMesh::structured_box([2, 1, 1], [0.0; 3], [2.0, 1.0, 1.0]).unwrap();
        let part = MeshPartition::new(mesh).unwrap();
        let lhs = mass_lhs(DgLayout::new(1, 4, 4), &part);
        let total: f64 = (0..part.n_elements()).map(|e| lhs.get(e, 0, 0)).sum();
        assert!((total - 2.0).abs() < 1e-12);
        assert!((lhs.get(0, 1, 0) - lhs.get(0, 0, 0) / 10.0).abs() < 1e-14);
    }
}
