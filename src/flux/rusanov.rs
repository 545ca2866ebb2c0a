//! Rusanov (local Lax-Friedrichs) flux.
//!
//! F* = ½ (F(u_l) + F(u_r))·n - ½ s_max (u_r - u_l)
//!
//! with s_max = max(|v_l·n| + a_l, |v_r·n| + a_r). Works for any
//! [`ConservationLaw`].

use crate::equations::{ConservationLaw, MultiMat};
use crate::operators::{Vec3, dot};

/// Rusanov numerical flux.
pub fn rusanov_flux<L: ConservationLaw + ?Sized>(law: &L, u_l: &[f64], u_r: &[f64], n: Vec3) -> Vec<f64> {
    let f_l = law.normal_flux(u_l, n);
    let f_r = law.normal_flux(u_r, n);
    let s = law.normal_wave_speed(u_l, n).max(law.normal_wave_speed(u_r, n));
    f_l.iter()
        .zip(&f_r)
        .zip(u_l.iter().zip(u_r))
        .map(|((fl, fr), (ul, ur))| 0.5 * (fl + fr) - 0.5 * s * (ur - ul))
        .collect()
}

/// Interface partial pressures and normal velocity for the
/// non-conservative terms, as arithmetic averages of the two sides.
///
/// Returns `nmat + 1` values: α_k p_k for every material, then v·n.
pub fn averaged_derivatives(law: &MultiMat, u_l: &[f64], u_r: &[f64], n: Vec3) -> Vec<f64> {
    let ap_l = law.partial_pressures(u_l);
    let ap_r = law.partial_pressures(u_r);
    let mut d: Vec<f64> = ap_l.iter().zip(&ap_r).map(|(l, r)| 0.5 * (l + r)).collect();
    // the α flux is ½(α_l v_l + α_r v_r)·n, so the matching divergence
    // uses the same average
    let vn_l = dot(law.velocity(u_l), n);
    let vn_r = dot(law.velocity(u_r), n);
    d.push(0.5 * (vn_l + vn_r));
    d
}
