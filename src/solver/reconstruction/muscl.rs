//! MUSCL reconstruction of edge-end states for edge-based CG.
//!
//! With Δ₂ = u_q - u_p along the edge and the nodal gradients g_p, g_q,
//! the one-sided differences are Δ₁ = 2 g_p·(x_q - x_p) - Δ₂ and
//! Δ₃ = 2 g_q·(x_q - x_p) - Δ₂. The edge-end states are
//!
//! u_L = u_p + ¼ [(1-κ) φ(r_L) Δ₁ + (1+κ) φ(1/r_L) Δ₂]
//! u_R = u_q - ¼ [(1-κ) φ(r_R) Δ₃ + (1+κ) φ(1/r_R) Δ₂]
//!
//! with the Van Leer limiter φ(r) = (|r| + r) / (|r| + 1).

use crate::operators::{Vec3, dot, sub};

/// Blending parameter κ (third-order upwind-biased).
pub const MUSCL_KAPPA: f64 = 1.0 / 3.0;

/// Regularisation of the slope ratios.
pub const MUSCL_EPS: f64 = 1.0e-9;

#[inline]
fn van_leer(r: f64) -> f64 {
    (r.abs() + r) / (r.abs() + 1.0)
}

/// Reconstruct the states at the midpoint of edge p-q in place.
///
/// On entry `u_l` and `u_r` hold the nodal values at p and q;
/// `grad_p[c]` and `grad_q[c]` are the nodal gradients of component `c`.
/// With `realizability` each reconstructed value is clipped into the range
/// spanned by the two nodal values.
pub fn muscl(
    xp: Vec3,
    xq: Vec3,
    grad_p: &[Vec3],
    grad_q: &[Vec3],
    u_l: &mut [f64],
    u_r: &mut [f64],
    realizability: bool,
) {
    debug_assert_eq!(u_l.len(), u_r.len());
    let vw = sub(xq, xp);
    let m1 = 1.0 - MUSCL_KAPPA;
    let p1 = 1.0 + MUSCL_KAPPA;

    for c in 0..u_l.len() {
        let (ul, ur) = (u_l[c], u_r[c]);
        let delta2 = ur - ul;
        let delta1 = 2.0 * dot(grad_p[c], vw) - delta2;
        let delta3 = 2.0 * dot(grad_q[c], vw) - delta2;

        let r_l = (delta2 + MUSCL_EPS) / (delta1 + MUSCL_EPS);
        let r_r = (delta2 + MUSCL_EPS) / (delta3 + MUSCL_EPS);
        let r_l_inv = (delta1 + MUSCL_EPS) / (delta2 + MUSCL_EPS);
        let r_r_inv = (delta3 + MUSCL_EPS) / (delta2 + MUSCL_EPS);

        let mut l = ul + 0.25 * (delta1 * m1 * van_leer(r_l) + delta2 * p1 * van_leer(r_l_inv));
        let mut r = ur - 0.25 * (delta3 * m1 * van_leer(r_r) + delta2 * p1 * van_leer(r_r_inv));

        if realizability {
            let (lo, hi) = (ul.min(ur), ul.max(ur));
            l = l.clamp(lo, hi);
            r = r.clamp(lo, hi);
        }
        u_l[c] = l;
        u_r[c] = r;
    }
}
