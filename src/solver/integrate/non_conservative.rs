//! Non-conservative terms of the multi-material system.
//!
//! With the interface partial pressures (α_k p_k)* and normal velocity v*
//! from the Riemann solver, the element integrals
//!
//! ∇(α_k p_k) ≈ (1/|K|) ∮ (α_k p_k)* n dA,   ∇·v ≈ (1/|K|) ∮ v* dA
//!
//! give the right-hand sides
//!
//! α_k ∇·v                          (volume fraction k)
//! -v·(Y_k ∇p - ∇(α_k p_k))         (energy of material k)
//!
//! with mass fractions Y_k = α_kρ_k / ρ and ∇p = Σ_k ∇(α_k p_k).
//!
//! The surface integrals are element constants, so the terms update the
//! cell average only; higher modes receive nothing.

use super::DgContext;
use crate::equations::{
    MultiMat, RHO_FLOOR, density_idx, energy_idx, momentum_idx, volfrac_idx,
};
use crate::operators::Vec3;
use crate::polynomial::{eval_basis, eval_state, gauss_tet, ng_vol};
use crate::solver::Fields;

/// Per-element surface integrals of the Riemann derivative terms.
///
/// Rows `3k + j` hold ∮ (α_k p_k)* n_j dA, row `3 nmat` holds ∮ v* dA.
/// Filled by the surface passes, consumed by [`non_conservative_int`] in
/// the same right-hand-side evaluation.
#[derive(Clone, Debug, PartialEq)]
pub struct RiemannDerivatives {
    nmat: usize,
    nrows: usize,
    data: Vec<f64>,
}

impl RiemannDerivatives {
    pub fn new(nmat: usize, nelem: usize) -> Self {
        let nrows = 3 * nmat + 1;
        Self {
            nmat,
            nrows,
            data: vec![0.0; nrows * nelem],
        }
    }

    pub fn nmat(&self) -> usize {
        self.nmat
    }

    /// Number of rows per element, `3 nmat + 1`.
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn row(&self, e: usize) -> &[f64] {
        &self.data[e * self.nrows..(e + 1) * self.nrows]
    }

    pub fn row_mut(&mut self, e: usize) -> &mut [f64] {
        &mut self.data[e * self.nrows..(e + 1) * self.nrows]
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Add one face point: `terms` holds the `nmat` partial pressures
    /// followed by the normal velocity, `sign` is +1 when `n` points out of
    /// the element and -1 otherwise.
    #[inline]
    pub fn accumulate(row: &mut [f64], wt: f64, n: Vec3, terms: &[f64], sign: f64) {
        if terms.is_empty() {
            return;
        }
        let nmat = terms.len() - 1;
        debug_assert_eq!(row.len(), 3 * nmat + 1);
        for k in 0..nmat {
            for j in 0..3 {
                row[3 * k + j] += sign * wt * terms[k] * n[j];
            }
        }
        row[3 * nmat] += sign * wt * terms[nmat];
    }
}

/// Add the non-conservative terms of every element to `rhs`.
pub fn non_conservative_int(
    ctx: &DgContext<'_>,
    law: &MultiMat,
    u: &Fields,
    derivs: &RiemannDerivatives,
    rhs: &mut Fields,
) {
    for e in 0..ctx.nelem() {
        non_conservative_element(ctx, law, u, e, derivs.row(e), rhs.row_mut(e));
    }
}

pub(crate) fn non_conservative_element(
    ctx: &DgContext<'_>,
    law: &MultiMat,
    u: &Fields,
    e: usize,
    deriv: &[f64],
    r: &mut [f64],
) {
    let layout = ctx.layout;
    let nmat = law.nmat();
    let nd = ctx.ndofel[e];
    let neval = layout.eval_dofs(nd);
    let vol = ctx.part.geometry.elements[e].volume;
    let d: Vec<f64> = deriv.iter().map(|v| v / vol).collect();
    let divv = d[3 * nmat];
    let dp: Vec3 = std::array::from_fn(|j| (0..nmat).map(|k| d[3 * k + j]).sum());
    let dofs = ctx.dofs(u, e);

    let mut ncf = vec![0.0; layout.ncomp];
    let q = gauss_tet(ng_vol(nd));
    for (xi, w) in q.points.iter().zip(&q.weights) {
        let b = eval_basis(neval, xi[0], xi[1], xi[2]);
        let ugp = eval_state(layout.ncomp, layout.rdof, neval, dofs, &b);
        let rhob = (0..nmat)
            .map(|k| ugp[density_idx(nmat, k)])
            .sum::<f64>()
            .max(RHO_FLOOR);
        let vel: Vec3 = std::array::from_fn(|j| ugp[momentum_idx(nmat, j)] / rhob);

        ncf.fill(0.0);
        for k in 0..nmat {
            ncf[volfrac_idx(nmat, k)] = ugp[volfrac_idx(nmat, k)] * divv;
            let y = ugp[density_idx(nmat, k)] / rhob;
            ncf[energy_idx(nmat, k)] = -(0..3)
                .map(|j| vel[j] * (y * dp[j] - d[3 * k + j]))
                .sum::<f64>();
        }

        let wt = vol * w;
        for (c, nc) in ncf.iter().enumerate() {
            r[layout.rhs_col(c, 0)] += wt * nc;
        }
    }
}
