//! HLL and HLLC approximate Riemann solvers for single-material flow.
//!
//! Wave speeds use the Davis estimates
//!
//! s_l = min(v_l·n - a_l, v_r·n - a_r),  s_r = max(v_l·n + a_l, v_r·n + a_r)
//!
//! HLL averages the state between the two waves:
//!
//! F* = (s_r F_l - s_l F_r + s_l s_r (u_r - u_l)) / (s_r - s_l)
//!
//! HLLC restores the contact wave with speed s_m and the star pressure
//! p* = p_l + ρ_l (s_l - v_l·n)(s_m - v_l·n).
//!
//! Reference: Toro, "Riemann Solvers and Numerical Methods for Fluid Dynamics"

use crate::equations::{CompFlow, ConservationLaw, EquationOfState};
use crate::operators::{Vec3, dot};

struct Side {
    rho: f64,
    vn: f64,
    p: f64,
    a: f64,
    flux: Vec<f64>,
}

fn side(law: &CompFlow, u: &[f64], n: Vec3) -> Side {
    let p = law.pressure(u);
    Side {
        rho: u[0],
        vn: dot(law.velocity(u), n),
        p,
        a: law.eos.sound_speed(u[0], p),
        flux: law.normal_flux(u, n),
    }
}

fn davis_speeds(l: &Side, r: &Side) -> (f64, f64) {
    ((l.vn - l.a).min(r.vn - r.a), (l.vn + l.a).max(r.vn + r.a))
}

/// HLL numerical flux.
pub fn hll_flux(law: &CompFlow, u_l: &[f64], u_r: &[f64], n: Vec3) -> Vec<f64> {
    let l = side(law, u_l, n);
    let r = side(law, u_r, n);
    let (s_l, s_r) = davis_speeds(&l, &r);

    if s_l >= 0.0 {
        l.flux
    } else if s_r <= 0.0 {
        r.flux
    } else {
        let inv_ds = 1.0 / (s_r - s_l);
        (0..u_l.len())
            .map(|c| inv_ds * (s_r * l.flux[c] - s_l * r.flux[c] + s_l * s_r * (u_r[c] - u_l[c])))
            .collect()
    }
}

/// Star state and flux of one side of the HLLC fan.
fn hllc_star(u: &[f64], s: &Side, s_k: f64, s_m: f64, p_star: f64, n: Vec3) -> Vec<f64> {
    let inv = 1.0 / (s_k - s_m);
    let rho_star = inv * u[0] * (s_k - s.vn);
    let mut star = vec![0.0; 5];
    star[0] = rho_star;
    for j in 0..3 {
        star[1 + j] = inv * (u[1 + j] * (s_k - s.vn) + (p_star - s.p) * n[j]);
    }
    star[4] = inv * (u[4] * (s_k - s.vn) - s.p * s.vn + p_star * s_m);

    let mut f = vec![0.0; 5];
    f[0] = star[0] * s_m;
    for j in 0..3 {
        f[1 + j] = star[1 + j] * s_m + p_star * n[j];
    }
    f[4] = (star[4] + p_star) * s_m;
    f
}

/// HLLC numerical flux.
pub fn hllc_flux(law: &CompFlow, u_l: &[f64], u_r: &[f64], n: Vec3) -> Vec<f64> {
    let l = side(law, u_l, n);
    let r = side(law, u_r, n);
    let (s_l, s_r) = davis_speeds(&l, &r);

    if s_l >= 0.0 {
        return l.flux;
    }
    if s_r <= 0.0 {
        return r.flux;
    }

    let ml = l.rho * (s_l - l.vn);
    let mr = r.rho * (s_r - r.vn);
    let s_m = (r.p - l.p + ml * l.vn - mr * r.vn) / (ml - mr);
    let p_star = l.p + ml * (s_m - l.vn);

    if s_m >= 0.0 {
        hllc_star(u_l, &l, s_l, s_m, p_star, n)
    } else {
        hllc_star(u_r, &r, s_r, s_m, p_star, n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equations::StiffenedGas;

    const TOL: f64 = 1e-12;

    fn sod() -> (CompFlow, Vec<f64>, Vec<f64>) {
        let law = CompFlow::new(StiffenedGas::ideal(1.4));
        let l = law.conserved(1.0, [0.0; 3], 1.0);
        let r = law.conserved(0.125, [0.0; 3], 0.1);
        (law, l, r)
    }

    #[test]
    fn test_consistency() {
        let (law, _, _) = sod();
        let u = law.conserved(0.8, [0.3, -0.1, 0.2], 0.7);
        let n = [0.0, 0.0, 1.0];
        let exact = law.normal_flux(&u, n);
        let f_hll = hll_flux(&law, &u, &u, n);
        let f_hllc = hllc_flux(&law, &u, &u, n);
        for c in 0..5 {
            assert!((f_hll[c] - exact[c]).abs() < TOL);
            assert!((f_hllc[c] - exact[c]).abs() < TOL);
        }
    }

    #[test]
    fn test_sod_mass_flux_positive() {
        let (law, l, r) = sod();
        let n = [1.0, 0.0, 0.0];
        assert!(hll_flux(&law, &l, &r, n)[0] > 0.0);
        assert!(hllc_flux(&law, &l, &r, n)[0] > 0.0);
    }

    #[test]
    fn test_hllc_preserves_stationary_contact() {
        // equal pressure, zero velocity, density jump: no mass flux
        let law = CompFlow::new(StiffenedGas::ideal(1.4));
        let l = law.conserved(1.0, [0.0; 3], 1.0);
        let r = law.conserved(0.1, [0.0; 3], 1.0);
        let f = hllc_flux(&law, &l, &r, [1.0, 0.0, 0.0]);
        assert!(f[0].abs() < TOL);
        assert!((f[1] - 1.0).abs() < TOL);
        assert!(f[4].abs() < TOL);
    }

    #[test]
    fn test_antisymmetry() {
        let (law, l, r) = sod();
        let n = [0.0, 1.0, 0.0];
        let m = [0.0, -1.0, 0.0];
        let f = hllc_flux(&law, &l, &r, n);
        let g = hllc_flux(&law, &r, &l, m);
        for c in 0..5 {
            assert!((f[c] + g[c]).abs() < 1e-10);
        }
    }
}
