//! Single-material compressible flow problems.

use std::f64::consts::{FRAC_1_SQRT_2, PI};

use super::NlEnergyGrowthParams;
use crate::equations::{CompFlow, EquationOfState};
use crate::operators::Vec3;

/// Sod's shock tube: diaphragm at x = 0.5, gas at rest.
pub(super) fn sod_shocktube(law: &CompFlow, x: Vec3) -> Vec<f64> {
    let (rho, p) = if x[0] < 0.5 { (1.0, 1.0) } else { (0.125, 0.1) };
    law.conserved(rho, [0.0; 3], p)
}

/// Sod's shock tube with the diaphragm rotated 45° about the z axis.
pub(super) fn rotated_sod_shocktube(law: &CompFlow, x: Vec3) -> Vec<f64> {
    let xr = FRAC_1_SQRT_2 * (x[0] + x[1]);
    sod_shocktube(law, [xr, 0.0, x[2]])
}

/// Steady vortical flow with a source that balances it.
///
/// ρ = 1, v = (αx - βy, βx + αy, -2αz), p = p₀ - 2α²z².
pub(super) fn vortical_flow(law: &CompFlow, alpha: f64, beta: f64, p0: f64, x: Vec3) -> Vec<f64> {
    let [x, y, z] = x;
    let vel = [alpha * x - beta * y, beta * x + alpha * y, -2.0 * alpha * z];
    let p = p0 - 2.0 * alpha * alpha * z * z;
    law.conserved(1.0, vel, p)
}

pub(super) fn vortical_flow_source(law: &CompFlow, alpha: f64, beta: f64, x: Vec3) -> Vec<f64> {
    let [x, y, z] = x;
    let g = law.eos.gamma;
    let u = alpha * x - beta * y;
    let v = beta * x + alpha * y;
    let sx = alpha * u - beta * v;
    let sy = beta * u + alpha * v;
    let se = sx * u + sy * v + 8.0 * alpha.powi(3) * z * z / (g - 1.0);
    vec![0.0, sx, sy, 0.0, se]
}

impl NlEnergyGrowthParams {
    fn shape(&self, x: Vec3) -> (f64, Vec3) {
        let c = |i: usize| (self.beta[i] * PI * x[i]).cos();
        let s = |i: usize| -self.beta[i] * PI * (self.beta[i] * PI * x[i]).sin();
        let h = c(0) * c(1) * c(2);
        (h, [s(0) * c(1) * c(2), c(0) * s(1) * c(2), c(0) * c(1) * s(2)])
    }

    fn internal_energy(&self, h: f64, t: f64) -> f64 {
        (-3.0 * (self.ce + self.kappa * h * h * t)).powf(-1.0 / 3.0)
    }

    fn density(&self, x: Vec3, t: f64) -> f64 {
        let r2 = x[0] * x[0] + x[1] * x[1] + x[2] * x[2];
        self.r0 + (-self.alpha * t).exp() * (1.0 - r2)
    }

    /// Gas at rest whose density decays and whose specific internal energy
    /// e = (-3(c_e + κh²t))^(-1/3) grows.
    pub(super) fn solution(&self, x: Vec3, t: f64) -> Vec<f64> {
        let (h, _) = self.shape(x);
        let rho = self.density(x, t);
        let e = self.internal_energy(h, t);
        vec![rho, 0.0, 0.0, 0.0, rho * e]
    }

    pub(super) fn source(&self, law: &CompFlow, x: Vec3, t: f64) -> Vec<f64> {
        let g = law.eos.gamma;
        let (h, dh) = self.shape(x);
        let rho = self.density(x, t);
        let e = self.internal_energy(h, t);
        let e4 = e.powi(4);
        let decay = (-self.alpha * t).exp();
        let r2 = x[0] * x[0] + x[1] * x[1] + x[2] * x[2];

        let drho_dt = -self.alpha * decay * (1.0 - r2);
        let de_dt = self.kappa * h * h * e4;
        let mut s = vec![0.0; 5];
        s[0] = drho_dt;
        for i in 0..3 {
            let drho_dx = -2.0 * x[i] * decay;
            let de_dx = 2.0 * self.kappa * h * t * e4 * dh[i];
            s[1 + i] = (g - 1.0) * (drho_dx * e + rho * de_dx);
        }
        s[4] = drho_dt * e + rho * de_dt;
        s
    }
}

/// Density, velocity, specific total energy and pressure, for field output.
pub(super) fn primitive(law: &CompFlow, u: &[f64]) -> [f64; 6] {
    let rho = u[0];
    [
        rho,
        u[1] / rho,
        u[2] / rho,
        u[3] / rho,
        u[4] / rho,
        law.eos.pressure(u[0], u[1], u[2], u[3], u[4]),
    ]
}

pub(super) const FIELDS: [&str; 6] = [
    "density",
    "x-velocity",
    "y-velocity",
    "z-velocity",
    "specific_total_energy",
    "pressure",
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equations::StiffenedGas;

    #[test]
    fn test_sod_energies() {
        let law = CompFlow::new(StiffenedGas::ideal(1.4));
        let l = sod_shocktube(&law, [0.2, 0.0, 0.0]);
        let r = sod_shocktube(&law, [0.7, 0.0, 0.0]);
        assert!((l[4] - 2.5).abs() < 1e-12);
        assert!((r[4] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_rotated_sod_diaphragm() {
        let law = CompFlow::new(StiffenedGas::ideal(1.4));
        // (0.4, 0.4) lies beyond the rotated diaphragm x + y = 0.5·√2
        assert_eq!(rotated_sod_shocktube(&law, [0.4, 0.4, 0.0])[0], 0.125);
        assert_eq!(rotated_sod_shocktube(&law, [0.3, 0.0, 0.0])[0], 1.0);
    }
}
