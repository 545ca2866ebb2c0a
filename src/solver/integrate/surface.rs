//! Surface integrals ∮ F*·n B_k dA over internal and boundary faces.
//!
//! Every internal face is visited once: the flux at each quadrature point
//! is subtracted from the left element and added to the right element, so
//! the two contributions are exact negatives of each other.

use super::{DgContext, RiemannDerivatives};
use crate::boundary::{BcContext, FlowBoundary};
use crate::equations::Physics;
use crate::flux::{FluxContext, FluxError, RiemannFlux};
use crate::mesh::MeshPartition;
use crate::operators::Vec3;
use crate::polynomial::{BasisValues, TriRule, gauss_tri, ng_face};
use crate::solver::Fields;
use crate::solver::reconstruction::safe_reco;
use crate::types::FaceIndex;

/// Physical quadrature points of face `f` with weights scaled by the face
/// area.
pub fn face_points(part: &MeshPartition, f: FaceIndex, rule: TriRule) -> Vec<(Vec3, f64)> {
    let face = part.faces.face(f);
    let area = part.geometry.faces[f.get()].area;
    let [p0, p1, p2] = face.nodes.map(|p| part.mesh.point(p));
    let q = gauss_tri(rule);
    q.points
        .iter()
        .zip(&q.weights)
        .map(|(s, w)| {
            let l0 = 1.0 - s[0] - s[1];
            let x = std::array::from_fn(|i| l0 * p0[i] + s[0] * p1[i] + s[1] * p2[i]);
            (x, area * w)
        })
        .collect()
}

/// Visit the quadrature points of internal face `f` with the weight, the
/// basis values of the left and right element and the Riemann flux along
/// the face normal.
pub(crate) fn internal_face<V>(ctx: &DgContext<'_>, u: &Fields, f: FaceIndex, mut visit: V) -> Result<(), FluxError>
where
    V: FnMut(f64, &BasisValues, &BasisValues, &RiemannFlux),
{
    let part = ctx.part;
    let face = part.faces.face(f);
    let Some(right) = face.right else { return Ok(()) };
    let (l, r) = (face.left.get(), right.get());
    let n = part.geometry.faces[f.get()].normal;
    let nd = ctx
        .layout
        .eval_dofs(ctx.ndofel[l])
        .max(ctx.layout.eval_dofs(ctx.ndofel[r]));
    let pl = part.mesh.element_coords(l);
    let pr = part.mesh.element_coords(r);
    let averages = match ctx.physics {
        Physics::MultiMat(m) => Some((m.nmat(), ctx.average(u, l), ctx.average(u, r))),
        Physics::CompFlow(_) => None,
    };
    let fctx = FluxContext::new(ctx.physics, n);

    for (x, wt) in face_points(part, f, ng_face(nd)) {
        let (bl, mut ul) = ctx.state_at(u, l, &pl, x);
        let (br, mut ur) = ctx.state_at(u, r, &pr, x);
        if let Some((nmat, avg_l, avg_r)) = &averages {
            safe_reco(*nmat, avg_l, avg_r, &mut ul, &mut ur);
        }
        let fl = ctx.flux.flux(&ul, &ur, &fctx)?;
        visit(wt, &bl, &br, &fl);
    }
    Ok(())
}

/// Visit the quadrature points of boundary face `f` with the weight, the
/// basis values of the interior element and the flux against the ghost
/// state.
pub(crate) fn boundary_face<V>(
    ctx: &DgContext<'_>,
    boundary: &FlowBoundary<'_>,
    t: f64,
    u: &Fields,
    f: FaceIndex,
    mut visit: V,
) -> Result<(), FluxError>
where
    V: FnMut(f64, &BasisValues, &RiemannFlux),
{
    let part = ctx.part;
    let l = part.faces.face(f).left.get();
    let n = part.geometry.faces[f.get()].normal;
    let nd = ctx.layout.eval_dofs(ctx.ndofel[l]);
    let pl = part.mesh.element_coords(l);
    let avg_l = ctx.average(u, l);
    let fctx = FluxContext::new(ctx.physics, n);

    for (x, wt) in face_points(part, f, ng_face(nd)) {
        let (bl, mut ul) = ctx.state_at(u, l, &pl, x);
        let mut ghost = boundary.ghost_state(ctx.physics, f, &BcContext::new(t, x, n, &ul));
        if let Physics::MultiMat(m) = ctx.physics {
            let avg_r = ghost.clone();
            safe_reco(m.nmat(), &avg_l, &avg_r, &mut ul, &mut ghost);
        }
        let fl = ctx.flux.flux(&ul, &ghost, &fctx)?;
        visit(wt, &bl, &fl);
    }
    Ok(())
}

/// Add `sign × wt × F* × B_k` to a right-hand-side row.
#[inline]
pub(crate) fn scatter(ctx: &DgContext<'_>, nd: usize, sign: f64, wt: f64, b: &BasisValues, fl: &[f64], r: &mut [f64]) {
    for (c, fc) in fl.iter().take(ctx.layout.ncomp).enumerate() {
        for k in 0..nd {
            r[ctx.layout.rhs_col(c, k)] += sign * wt * fc * b[k];
        }
    }
}

/// Internal-face integrals.
///
/// For multi-material systems `derivs` accumulates the interface partial
/// pressures and normal velocity of every face.
pub fn surf_int(
    ctx: &DgContext<'_>,
    u: &Fields,
    rhs: &mut Fields,
    mut derivs: Option<&mut RiemannDerivatives>,
) -> Result<(), FluxError> {
    let part = ctx.part;
    for f in part.faces.internal() {
        let face = part.faces.face(f);
        let Some(right) = face.right else { continue };
        let (l, r) = (face.left.get(), right.get());
        let n = part.geometry.faces[f.get()].normal;
        let (ndl, ndr) = (ctx.ndofel[l], ctx.ndofel[r]);
        internal_face(ctx, u, f, |wt, bl, br, fl| {
            scatter(ctx, ndl, -1.0, wt, bl, &fl.flux, rhs.row_mut(l));
            scatter(ctx, ndr, 1.0, wt, br, &fl.flux, rhs.row_mut(r));
            if let Some(d) = derivs.as_deref_mut() {
                RiemannDerivatives::accumulate(d.row_mut(l), wt, n, &fl.derivatives, 1.0);
                RiemannDerivatives::accumulate(d.row_mut(r), wt, n, &fl.derivatives, -1.0);
            }
        })?;
    }
    Ok(())
}

/// Boundary-face integrals against the ghost states of `boundary`.
pub fn bnd_surf_int(
    ctx: &DgContext<'_>,
    boundary: &FlowBoundary<'_>,
    t: f64,
    u: &Fields,
    rhs: &mut Fields,
    mut derivs: Option<&mut RiemannDerivatives>,
) -> Result<(), FluxError> {
    let part = ctx.part;
    for f in 0..part.faces.nbfac() {
        let fi = FaceIndex::new(f);
        let l = part.faces.face(fi).left.get();
        let n = part.geometry.faces[f].normal;
        let nd = ctx.ndofel[l];
        boundary_face(ctx, boundary, t, u, fi, |wt, bl, fl| {
            scatter(ctx, nd, -1.0, wt, bl, &fl.flux, rhs.row_mut(l));
            if let Some(d) = derivs.as_deref_mut() {
                RiemannDerivatives::accumulate(d.row_mut(l), wt, n, &fl.derivatives, 1.0);
            }
        })?;
    }
    Ok(())
}
