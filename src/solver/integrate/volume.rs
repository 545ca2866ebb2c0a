//! Volume integral ∫_K F(u)·∇B_k dV.

use super::DgContext;
use crate::equations::ConservationLaw;
use crate::operators::{dot, inverse_jacobian};
use crate::polynomial::{eval_basis, eval_dbdx, eval_state, gauss_tet, ng_vol};
use crate::solver::Fields;

/// Add the volume integral of every element to `rhs`.
///
/// P0 elements have no volume term.
pub fn vol_int(ctx: &DgContext<'_>, u: &Fields, rhs: &mut Fields) {
    for e in 0..ctx.nelem() {
        vol_int_element(ctx, u, e, rhs.row_mut(e));
    }
}

/// Volume integral of element `e` into its right-hand-side row.
pub(crate) fn vol_int_element(ctx: &DgContext<'_>, u: &Fields, e: usize, r: &mut [f64]) {
    let nd = ctx.ndofel[e];
    if nd == 1 {
        return;
    }
    let layout = ctx.layout;
    let pts = ctx.part.mesh.element_coords(e);
    let jinv = inverse_jacobian(&pts);
    let vol = ctx.part.geometry.elements[e].volume;
    let neval = layout.eval_dofs(nd);
    let dofs = ctx.dofs(u, e);

    let q = gauss_tet(ng_vol(nd));
    for (xi, w) in q.points.iter().zip(&q.weights) {
        let b = eval_basis(neval, xi[0], xi[1], xi[2]);
        let state = eval_state(layout.ncomp, layout.rdof, neval, dofs, &b);
        let dbdx = eval_dbdx(nd, *xi, &jinv);
        let flux = ctx.physics.flux(&state);
        let wt = vol * w;
        for (c, fc) in flux.iter().enumerate() {
            for k in 1..nd {
                r[layout.rhs_col(c, k)] += wt * dot(*fc, dbdx[k]);
            }
        }
    }
}
