//! Source integral ∫_K s(x, t) B_k dV.

use super::DgContext;
use crate::operators::physical_coordinates;
use crate::polynomial::{eval_basis, gauss_tet, ng_vol};
use crate::problem::{Problem, SystemParams};
use crate::solver::Fields;

/// Add the problem source of every element to `rhs`.
pub fn src_int(ctx: &DgContext<'_>, problem: &Problem, t: f64, rhs: &mut Fields) {
    if !problem.has_source() {
        return;
    }
    for e in 0..ctx.nelem() {
        src_int_element(ctx, problem, t, e, rhs.row_mut(e));
    }
}

pub(crate) fn src_int_element(
    ctx: &DgContext<'_>,
    problem: &Problem,
    t: f64,
    e: usize,
    r: &mut [f64],
) {
    let nd = ctx.ndofel[e];
    let pts = ctx.part.mesh.element_coords(e);
    let vol = ctx.part.geometry.elements[e].volume;
    let sys = SystemParams::Flow(ctx.physics);
    let q = gauss_tet(ng_vol(nd));
    for (xi, w) in q.points.iter().zip(&q.weights) {
        let x = physical_coordinates(&pts, *xi);
        let s = problem.source(sys, x, t);
        let b = eval_basis(nd, xi[0], xi[1], xi[2]);
        let wt = vol * w;
        for (c, sc) in s.iter().enumerate() {
            for k in 0..nd {
                r[ctx.layout.rhs_col(c, k)] += wt * sc * b[k];
            }
        }
    }
}
