//! L2 projection of initial conditions onto the Dubiner basis.

use super::DgLayout;
use crate::mesh::MeshPartition;
use crate::operators::{Vec3, physical_coordinates};
use crate::polynomial::{MASS_DIAGONAL, eval_basis, gauss_tet, ng_init};
use crate::problem::{Problem, SystemParams};
use crate::solver::Fields;

/// Project a pointwise function onto the first `ndof` modes of every
/// element: U_k = ∫ f B_k / ∫ B_k².
///
/// Modes `ndof..rdof` are zeroed.
pub fn l2_project<F>(layout: DgLayout, part: &MeshPartition, f: F, u: &mut Fields)
where
    F: Fn(Vec3) -> Vec<f64>,
{
    let q = gauss_tet(ng_init(layout.ndof));
    for e in 0..part.n_elements() {
        let pts = part.mesh.element_coords(e);
        let mut modes = vec![0.0; layout.ncomp * layout.rdof];
        for (xi, w) in q.points.iter().zip(&q.weights) {
            let s = f(physical_coordinates(&pts, *xi));
            debug_assert_eq!(s.len(), layout.ncomp);
            let b = eval_basis(layout.ndof, xi[0], xi[1], xi[2]);
            for (c, sc) in s.iter().enumerate() {
                for k in 0..layout.ndof {
                    modes[layout.col(c, k)] += w * sc * b[k];
                }
            }
        }
        for c in 0..layout.ncomp {
            for k in 0..layout.ndof {
                modes[layout.col(c, k)] /= MASS_DIAGONAL[k];
            }
        }
        let row = u.row_mut(e);
        row[layout.offset..layout.offset + modes.len()].copy_from_slice(&modes);
    }
}

/// Set the initial condition of a problem at time `t`.
pub fn initialize(
    layout: DgLayout,
    part: &MeshPartition,
    problem: &Problem,
    sys: SystemParams<'_>,
    t: f64,
    u: &mut Fields,
) {
    l2_project(layout, part, |x| problem.solution(sys, x, t), u);
}
