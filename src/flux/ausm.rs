//! AUSM+-up flux for velocity-equilibrium multi-material flow.
//!
//! The interface mass flux and pressure are built from polynomial Mach
//! number splittings (Liou 2006):
//!
//! M₁±(M) = ½(M ± |M|)
//! M₂±(M) = ±¼(M ± 1)²
//! M₄±(M) = M₁± if |M| ≥ 1, else M₂±(1 ∓ 16β M₂∓)
//! P₅±(M) = M₁±/M if |M| ≥ 1, else M₂±((±2 - M) ∓ 16α M M₂∓)
//!
//! with low-Mach scaling f_a = M₀(2 - M₀). Every conserved quantity is
//! upwinded with the sign of the interface velocity; the momentum gets the
//! interface pressure p₁/₂ = Σ_k (α_kp_k)₁/₂.
//!
//! Besides the flux, the solver returns the interface partial pressures
//! (α_kp_k)₁/₂ and the interface normal velocity, which feed the
//! non-conservative terms.

use crate::equations::{
    CompFlow, ConservationLaw, MultiMat, density_idx, energy_idx, momentum_idx, volfrac_idx,
};
use crate::operators::{Vec3, dot};

/// Free-stream Mach number used for low-Mach scaling.
const MACH_INF: f64 = 0.1;
const K_P: f64 = 0.25;
const K_U: f64 = 0.75;
const SIGMA: f64 = 1.0;
const BETA: f64 = 1.0 / 8.0;

/// Primitive view of one side, shared by the single- and multi-material
/// layouts.
struct MaterialView {
    alpha: Vec<f64>,
    arho: Vec<f64>,
    ap: Vec<f64>,
    /// α_kρ_kE_k
    arhoe: Vec<f64>,
    rho: f64,
    vel: Vec3,
    vn: f64,
    a: f64,
}

impl MaterialView {
    fn multimat(law: &MultiMat, u: &[f64], n: Vec3) -> Self {
        let nmat = law.nmat();
        let vel = law.velocity(u);
        Self {
            alpha: (0..nmat).map(|k| u[volfrac_idx(nmat, k)]).collect(),
            arho: (0..nmat).map(|k| u[density_idx(nmat, k)]).collect(),
            ap: law.partial_pressures(u),
            arhoe: (0..nmat).map(|k| u[energy_idx(nmat, k)]).collect(),
            rho: law.bulk_density(u),
            vel,
            vn: dot(vel, n),
            a: law.sound_speed(u),
        }
    }

    fn compflow(law: &CompFlow, u: &[f64], n: Vec3) -> Self {
        let vel = law.velocity(u);
        Self {
            alpha: vec![1.0],
            arho: vec![u[0]],
            ap: vec![law.pressure(u)],
            arhoe: vec![u[4]],
            rho: u[0],
            vel,
            vn: dot(vel, n),
            a: law.sound_speed(u),
        }
    }

    fn pressure(&self) -> f64 {
        self.ap.iter().sum()
    }
}

#[inline]
fn m1(m: f64, sign: f64) -> f64 {
    0.5 * (m + sign * m.abs())
}

#[inline]
fn m2(m: f64, sign: f64) -> f64 {
    sign * 0.25 * (m + sign) * (m + sign)
}

fn m4(m: f64, sign: f64) -> f64 {
    if m.abs() >= 1.0 {
        m1(m, sign)
    } else {
        m2(m, sign) * (1.0 - sign * 16.0 * BETA * m2(m, -sign))
    }
}

fn p5(m: f64, sign: f64, alpha: f64) -> f64 {
    if m.abs() >= 1.0 {
        m1(m, sign) / m
    } else {
        m2(m, sign) * ((sign * 2.0 - m) - sign * 16.0 * alpha * m * m2(m, -sign))
    }
}

/// Interface velocity, partial pressures and upwind side.
struct Interface {
    vriem: f64,
    ap12: Vec<f64>,
}

fn interface(l: &MaterialView, r: &MaterialView) -> Interface {
    let ac12 = (0.5 * (l.a + r.a)).max(f64::MIN_POSITIVE);
    let ml = l.vn / ac12;
    let mr = r.vn / ac12;

    let mbar2 = (l.vn * l.vn + r.vn * r.vn) / (2.0 * ac12 * ac12);
    let mo2 = mbar2.max(MACH_INF * MACH_INF).min(1.0);
    let mo = mo2.sqrt();
    let fa = mo * (2.0 - mo);
    let alpha = 3.0 / 16.0 * (-4.0 + 5.0 * fa * fa);

    let rho12 = 0.5 * (l.rho + r.rho);
    let (pl, pr) = (l.pressure(), r.pressure());
    let m12 = m4(ml, 1.0) + m4(mr, -1.0)
        - K_P / fa * (1.0 - SIGMA * mbar2).max(0.0) * (pr - pl) / (rho12 * ac12 * ac12);

    let (p_l, p_r) = (p5(ml, 1.0, alpha), p5(mr, -1.0, alpha));
    let ap12 = (0..l.ap.len())
        .map(|k| {
            p_l * l.ap[k] + p_r * r.ap[k]
                - K_U * p_l * p_r * (l.arho[k] + r.arho[k]) * fa * ac12 * (r.vn - l.vn)
        })
        .collect();

    Interface {
        vriem: ac12 * m12,
        ap12,
    }
}

/// AUSM+-up flux for multi-material flow.
///
/// Returns the flux and `nmat + 1` derivative terms: interface partial
/// pressures followed by the interface normal velocity.
pub fn ausm_flux_multimat(law: &MultiMat, u_l: &[f64], u_r: &[f64], n: Vec3) -> (Vec<f64>, Vec<f64>) {
    let nmat = law.nmat();
    let l = MaterialView::multimat(law, u_l, n);
    let r = MaterialView::multimat(law, u_r, n);
    let iface = interface(&l, &r);
    let up = if iface.vriem >= 0.0 { &l } else { &r };
    let p12: f64 = iface.ap12.iter().sum();

    let mut f = vec![0.0; law.ncomp()];
    for k in 0..nmat {
        f[volfrac_idx(nmat, k)] = iface.vriem * up.alpha[k];
        f[density_idx(nmat, k)] = iface.vriem * up.arho[k];
        f[energy_idx(nmat, k)] = iface.vriem * (up.arhoe[k] + up.ap[k]);
    }
    for j in 0..3 {
        f[momentum_idx(nmat, j)] = iface.vriem * up.rho * up.vel[j] + p12 * n[j];
    }

    let mut derivs = iface.ap12;
    derivs.push(iface.vriem);
    (f, derivs)
}

/// AUSM+-up flux for single-material flow.
pub fn ausm_flux_compflow(law: &CompFlow, u_l: &[f64], u_r: &[f64], n: Vec3) -> Vec<f64> {
    let l = MaterialView::compflow(law, u_l, n);
    let r = MaterialView::compflow(law, u_r, n);
    let iface = interface(&l, &r);
    let up = if iface.vriem >= 0.0 { &l } else { &r };
    let p12 = iface.ap12[0];

    let mut f = vec![0.0; 5];
    f[0] = iface.vriem * up.rho;
    for j in 0..3 {
        f[1 + j] = iface.vriem * up.rho * up.vel[j] + p12 * n[j];
    }
    f[4] = iface.vriem * (up.arhoe[0] + up.ap[0]);
    f
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equations::StiffenedGas;

    const TOL: f64 = 1e-10;

    fn water_air() -> MultiMat {
        MultiMat::new(vec![StiffenedGas::new(4.4, 6.0e8, 1000.0), StiffenedGas::ideal(1.4)])
    }

    #[test]
    fn test_splittings_sum() {
        for m in [-2.0, -0.7, -0.1, 0.0, 0.3, 0.9, 1.5] {
            assert!((m4(m, 1.0) + m4(m, -1.0) - m).abs() < 1e-14, "M4 at {m}");
            let alpha = 3.0 / 16.0;
            assert!((p5(m, 1.0, alpha) + p5(m, -1.0, alpha) - 1.0).abs() < 1e-14, "P5 at {m}");
        }
    }

    #[test]
    fn test_uniform_state_gives_physical_flux() {
        let law = water_air();
        let u = law.conserved(&[0.3, 0.7], &[1000.0, 1.0], &[1.0e5, 1.0e5], [0.0; 3]);
        let n = [0.0, 1.0, 0.0];
        let (f, d) = ausm_flux_multimat(&law, &u, &u, n);
        let exact = law.normal_flux(&u, n);
        for c in 0..law.ncomp() {
            assert!((f[c] - exact[c]).abs() < TOL * exact[c].abs().max(1.0), "component {c}");
        }
        assert_eq!(d.len(), 3);
        assert!(((d[0] + d[1]) - 1.0e5).abs() < 1e-5);
        assert!(d[2].abs() < TOL);
    }

    #[test]
    fn test_compflow_consistency() {
        let law = CompFlow::new(StiffenedGas::ideal(1.4));
        let u = law.conserved(1.0, [0.2, 0.0, 0.0], 1.0);
        let n = [1.0, 0.0, 0.0];
        let f = ausm_flux_compflow(&law, &u, &u, n);
        let exact = law.normal_flux(&u, n);
        for c in 0..5 {
            assert!((f[c] - exact[c]).abs() < TOL);
        }
    }
}
