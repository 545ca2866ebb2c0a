//! Multi-material flow problems.
//!
//! Every problem starts two-material states from a pure material on each
//! side of an interface, with the absent material carried at a volume
//! fraction at the absence floor.

use crate::equations::{
    ConservationLaw, EquationOfState, MultiMat, VOLFRAC_FLOOR, density_idx, energy_idx, volfrac_idx,
};
use crate::operators::Vec3;

const ALPHA_MIN: f64 = VOLFRAC_FLOOR;

/// Volume fractions with material `k` dominant.
fn dominant(nmat: usize, k: usize) -> Vec<f64> {
    let rest = ALPHA_MIN * (nmat - 1) as f64;
    (0..nmat)
        .map(|m| if m == k { 1.0 - rest } else { ALPHA_MIN })
        .collect()
}

/// State at a common pressure and velocity with densities from a reference
/// temperature.
fn thermal_state(law: &MultiMat, alpha: &[f64], p: f64, temperature: f64, vel: Vec3) -> Vec<f64> {
    let rho: Vec<f64> = law.materials.iter().map(|m| m.density(p, temperature)).collect();
    law.conserved(alpha, &rho, &vec![p; law.nmat()], vel)
}

/// Two-material Sod shock tube, diaphragm at x = 0.5.
pub(super) fn sod_shocktube(law: &MultiMat, x: Vec3) -> Vec<f64> {
    let nmat = law.nmat();
    let (k, rho, p) = if x[0] < 0.5 { (0, 1.0, 1.0) } else { (1.min(nmat - 1), 0.125, 0.1) };
    law.conserved(&dominant(nmat, k), &vec![rho; nmat], &vec![p; nmat], [0.0; 3])
}

/// High-pressure water against air at x = 0.75.
pub(super) fn water_air_shocktube(law: &MultiMat, x: Vec3) -> Vec<f64> {
    let nmat = law.nmat();
    if x[0] < 0.75 {
        thermal_state(law, &dominant(nmat, 0), 1.0e9, 494.646, [0.0; 3])
    } else {
        thermal_state(law, &dominant(nmat, 1.min(nmat - 1)), 1.0e5, 34.844, [0.0; 3])
    }
}

/// Triple-point problem: a high-pressure region (x < 1) driving into two
/// low-pressure materials separated at y = 1.5.
pub(super) fn triple_point(law: &MultiMat, x: Vec3) -> Vec<f64> {
    let nmat = law.nmat();
    let second = 1.min(nmat - 1);
    if x[0] < 1.0 {
        thermal_state(law, &dominant(nmat, 0), 1.0, 4.355_400_7e-4, [0.0; 3])
    } else if x[1] < 1.5 {
        thermal_state(law, &dominant(nmat, second), 0.1, 3.484_320_6e-4, [0.0; 3])
    } else {
        thermal_state(law, &dominant(nmat, 0), 0.1, 3.484_320_6e-4, [0.0; 3])
    }
}

/// Uniform advection velocity of the interface-advection problem.
pub(super) const ADVECTION_VELOCITY: Vec3 = [1.0, 1.0, 0.0];

/// Concentric material rings in the x-y plane translating with a uniform
/// velocity at uniform pressure.
///
/// Material 0 fills the outside; material k > 0 sits inside radius
/// `0.35 / k`, so the innermost ring belongs to the last material.
pub(super) fn interface_advection(law: &MultiMat, x: Vec3, t: f64) -> Vec<f64> {
    let nmat = law.nmat();
    let v = ADVECTION_VELOCITY;
    let cx = 0.45 + v[0] * t;
    let cy = 0.45 + v[1] * t;
    let r = ((x[0] - cx).powi(2) + (x[1] - cy).powi(2)).sqrt();
    let k = (1..nmat)
        .rev()
        .find(|&k| r < 0.35 / k as f64)
        .unwrap_or(0);
    let rho: Vec<f64> = (0..nmat).map(|m| 1.0 + m as f64).collect();
    law.conserved(&dominant(nmat, k), &rho, &vec![1.0; nmat], v)
}

/// Output quantities of a multi-material state: volume fractions, bulk
/// density, velocity, bulk pressure and total energy density.
pub(super) fn output(law: &MultiMat, u: &[f64]) -> Vec<f64> {
    let nmat = law.nmat();
    let mut out: Vec<f64> = (0..nmat).map(|k| u[volfrac_idx(nmat, k)]).collect();
    let rho: f64 = (0..nmat).map(|k| u[density_idx(nmat, k)]).sum();
    out.push(rho);
    out.extend(law.velocity(u));
    out.push(law.pressure(u));
    out.push((0..nmat).map(|k| u[energy_idx(nmat, k)]).sum());
    out
}

pub(super) fn field_names(nmat: usize) -> Vec<String> {
    let mut names: Vec<String> = (1..=nmat).map(|k| format!("volfrac{k}")).collect();
    names.extend(
        [
            "density",
            "x-velocity",
            "y-velocity",
            "z-velocity",
            "pressure",
            "total_energy_density",
        ]
        .map(String::from),
    );
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equations::StiffenedGas;

    fn water_air() -> MultiMat {
        MultiMat::new(vec![
            StiffenedGas::new(4.4, 6.0e8, 1000.0),
            StiffenedGas::ideal(1.4),
        ])
    }

    #[test]
    fn test_sod_pressures() {
        let gas = StiffenedGas::ideal(1.4);
        let law = MultiMat::new(vec![gas, gas]);
        let l = sod_shocktube(&law, [0.1, 0.0, 0.0]);
        let r = sod_shocktube(&law, [0.9, 0.0, 0.0]);
        assert!((law.pressure(&l) - 1.0).abs() < 1e-12);
        assert!((law.pressure(&r) - 0.1).abs() < 1e-12);
        assert!(l[volfrac_idx(2, 0)] > 0.99);
        assert!(r[volfrac_idx(2, 1)] > 0.99);
    }

    #[test]
    fn test_water_air_states() {
        let law = water_air();
        let u = water_air_shocktube(&law, [0.5, 0.0, 0.0]);
        assert!((law.pressure(&u) - 1.0e9).abs() < 1e-3);
        assert!(law.first_non_physical(&u).is_none());
        let u = water_air_shocktube(&law, [0.9, 0.0, 0.0]);
        assert!((law.pressure(&u) - 1.0e5).abs() < 1e-6);
    }

    #[test]
    fn test_interface_translates() {
        let gas = StiffenedGas::ideal(1.4);
        let law = MultiMat::new(vec![gas, gas, gas]);
        let at0 = interface_advection(&law, [0.45, 0.45, 0.0], 0.0);
        let at1 = interface_advection(&law, [0.55, 0.55, 0.0], 0.1);
        assert_eq!(at0, at1);
        // centre belongs to the innermost material
        assert!(at0[volfrac_idx(3, 2)] > 0.99);
        let outside = interface_advection(&law, [0.0, 0.0, 0.0], 0.0);
        assert!(outside[volfrac_idx(3, 0)] > 0.99);
    }

    #[test]
    fn test_output_layout() {
        let law = water_air();
        let u = triple_point(&law, [0.5, 0.5, 0.0]);
        let out = output(&law, &u);
        assert_eq!(out.len(), field_names(2).len());
        // recovering p = 1 from ρE cancels terms of size p_c
        let pstiff = law.materials[0].pstiff;
        assert!((out[6] - 1.0).abs() < 1e-12 * pstiff, "p = {}", out[6]);
    }
}
