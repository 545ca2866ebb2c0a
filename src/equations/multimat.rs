//! Multi-material compressible flow with velocity equilibrium.
//!
//! The conserved state of `nmat` materials is laid out as
//!
//! | components                  | meaning                        |
//! |-----------------------------|--------------------------------|
//! | `0 .. nmat`                 | volume fractions α_k           |
//! | `nmat .. 2 nmat`            | partial densities α_kρ_k       |
//! | `2 nmat .. 2 nmat + 3`      | bulk momentum ρv               |
//! | `2 nmat + 3 .. 3 nmat + 3`  | partial total energies α_kρ_kE_k |
//!
//! The volume fraction equation is advective, ∂α/∂t + v·∇α = 0. It is
//! split into the conservative flux αv and the non-conservative term α∇·v,
//! which is integrated separately from the Riemann derivatives.

use super::{ConservationLaw, NonPhysical, StiffenedGas};
use crate::operators::Vec3;

/// Lower bound on the bulk density in mixture quantities.
pub const RHO_FLOOR: f64 = 1e-14;

/// Volume fraction below which a material is considered absent.
pub const VOLFRAC_FLOOR: f64 = 1e-12;

/// Round-off allowance when checking volume fractions against [0, 1].
pub const VOLFRAC_TOLERANCE: f64 = 1e-10;

#[inline]
pub fn volfrac_idx(_nmat: usize, k: usize) -> usize {
    k
}

#[inline]
pub fn density_idx(nmat: usize, k: usize) -> usize {
    nmat + k
}

#[inline]
pub fn momentum_idx(nmat: usize, dir: usize) -> usize {
    2 * nmat + dir
}

#[inline]
pub fn energy_idx(nmat: usize, k: usize) -> usize {
    2 * nmat + 3 + k
}

/// Number of conserved components for `nmat` materials.
#[inline]
pub fn multimat_ncomp(nmat: usize) -> usize {
    3 * nmat + 3
}

/// Velocity-equilibrium multi-material flow.
#[derive(Clone, Debug, PartialEq)]
pub struct MultiMat {
    pub materials: Vec<StiffenedGas>,
}

impl MultiMat {
    pub fn new(materials: Vec<StiffenedGas>) -> Self {
        Self { materials }
    }

    #[inline]
    pub fn nmat(&self) -> usize {
        self.materials.len()
    }

    /// Bulk density Σ α_kρ_k clamped below by [`RHO_FLOOR`].
    #[inline]
    pub fn bulk_density(&self, u: &[f64]) -> f64 {
        let nmat = self.nmat();
        (0..nmat)
            .map(|k| u[density_idx(nmat, k)])
            .sum::<f64>()
            .max(RHO_FLOOR)
    }

    /// Volume-fraction-weighted material pressures α_k p_k.
    pub fn partial_pressures(&self, u: &[f64]) -> Vec<f64> {
        let nmat = self.nmat();
        let v = self.velocity(u);
        self.materials
            .iter()
            .enumerate()
            .map(|(k, m)| {
                m.partial_pressure(
                    u[density_idx(nmat, k)],
                    v[0],
                    v[1],
                    v[2],
                    u[energy_idx(nmat, k)],
                    u[volfrac_idx(nmat, k)],
                )
            })
            .collect()
    }

    /// Bulk pressure Σ α_k p_k.
    pub fn pressure(&self, u: &[f64]) -> f64 {
        self.partial_pressures(u).iter().sum()
    }

    /// Conserved state from per-material volume fractions, densities and
    /// pressures and the shared velocity.
    pub fn conserved(&self, alpha: &[f64], rho: &[f64], p: &[f64], vel: Vec3) -> Vec<f64> {
        let nmat = self.nmat();
        assert_eq!(alpha.len(), nmat);
        assert_eq!(rho.len(), nmat);
        assert_eq!(p.len(), nmat);
        let mut u = vec![0.0; multimat_ncomp(nmat)];
        let mut rhob = 0.0;
        for (k, m) in self.materials.iter().enumerate() {
            let arho = alpha[k] * rho[k];
            u[volfrac_idx(nmat, k)] = alpha[k];
            u[density_idx(nmat, k)] = arho;
            u[energy_idx(nmat, k)] = m.partial_total_energy(arho, vel[0], vel[1], vel[2], p[k], alpha[k]);
            rhob += arho;
        }
        for dir in 0..3 {
            u[momentum_idx(nmat, dir)] = rhob * vel[dir];
        }
        u
    }
}

impl ConservationLaw for MultiMat {
    fn ncomp(&self) -> usize {
        multimat_ncomp(self.nmat())
    }

    fn flux(&self, u: &[f64]) -> Vec<Vec3> {
        let nmat = self.nmat();
        let v = self.velocity(u);
        let ap = self.partial_pressures(u);
        let p: f64 = ap.iter().sum();
        let mut f = vec![[0.0; 3]; self.ncomp()];
        for j in 0..3 {
            for k in 0..nmat {
                f[volfrac_idx(nmat, k)][j] = v[j] * u[volfrac_idx(nmat, k)];
                f[density_idx(nmat, k)][j] = v[j] * u[density_idx(nmat, k)];
                f[energy_idx(nmat, k)][j] = v[j] * (u[energy_idx(nmat, k)] + ap[k]);
            }
            for i in 0..3 {
                f[momentum_idx(nmat, i)][j] = u[momentum_idx(nmat, i)] * v[j];
            }
            f[momentum_idx(nmat, j)][j] += p;
        }
        f
    }

    fn velocity(&self, u: &[f64]) -> Vec3 {
        let nmat = self.nmat();
        let rhob = self.bulk_density(u);
        [
            u[momentum_idx(nmat, 0)] / rhob,
            u[momentum_idx(nmat, 1)] / rhob,
            u[momentum_idx(nmat, 2)] / rhob,
        ]
    }

    /// Largest material sound speed among materials that are present.
    fn sound_speed(&self, u: &[f64]) -> f64 {
        let nmat = self.nmat();
        let ap = self.partial_pressures(u);
        let mut a: f64 = 0.0;
        for (k, m) in self.materials.iter().enumerate() {
            let alpha = u[volfrac_idx(nmat, k)];
            if alpha > VOLFRAC_FLOOR {
                a = a.max(m.partial_sound_speed(u[density_idx(nmat, k)], ap[k], alpha));
            }
        }
        a
    }

    fn momentum_offset(&self) -> usize {
        momentum_idx(self.nmat(), 0)
    }

    fn n_derivatives(&self) -> usize {
        3 * self.nmat() + 1
    }

    fn first_non_physical(&self, u: &[f64]) -> Option<NonPhysical> {
        let nmat = self.nmat();
        for k in 0..nmat {
            let a = u[volfrac_idx(nmat, k)];
            if !(-VOLFRAC_TOLERANCE..=1.0 + VOLFRAC_TOLERANCE).contains(&a) {
                return Some(NonPhysical::volume_fraction(volfrac_idx(nmat, k), a));
            }
            let arho = u[density_idx(nmat, k)];
            if arho < 0.0 {
                return Some(NonPhysical::density(density_idx(nmat, k), arho));
            }
        }
        let ap = self.partial_pressures(u);
        for (k, m) in self.materials.iter().enumerate() {
            let alpha = u[volfrac_idx(nmat, k)];
            if alpha > VOLFRAC_FLOOR && ap[k] + alpha * m.pstiff < 0.0 {
                return Some(NonPhysical::pressure(energy_idx(nmat, k), ap[k] / alpha));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    fn water_air() -> MultiMat {
        MultiMat::new(vec![StiffenedGas::new(4.4, 6.0e8, 1000.0), StiffenedGas::ideal(1.4)])
    }

    #[test]
    fn test_indexing_layout() {
        assert_eq!(multimat_ncomp(2), 9);
        assert_eq!(volfrac_idx(2, 1), 1);
        assert_eq!(density_idx(2, 0), 2);
        assert_eq!(momentum_idx(2, 2), 6);
        assert_eq!(energy_idx(2, 1), 8);
    }

    #[test]
    fn test_conserved_round_trip() {
        let law = water_air();
        let u = law.conserved(&[0.25, 0.75], &[1000.0, 1.2], &[1.0e5, 1.0e5], [10.0, 0.0, 0.0]);
        let v = law.velocity(&u);
        assert!((v[0] - 10.0).abs() < 1e-10);
        let p = law.pressure(&u);
        assert!(((p - 1.0e5) / 1.0e5).abs() < 1e-8, "p = {p}");
        assert!(law.first_non_physical(&u).is_none());
    }

    #[test]
    fn test_flux_consistent_with_single_material() {
        use crate::equations::CompFlow;
        let gas = StiffenedGas::ideal(1.4);
        let mm = MultiMat::new(vec![gas, gas]);
        let cf = CompFlow::new(gas);
        let vel = [0.3, -0.2, 0.1];
        let u = mm.conserved(&[0.5, 0.5], &[1.0, 1.0], &[1.0, 1.0], vel);
        let uc = cf.conserved(1.0, vel, 1.0);
        let fm = mm.flux(&u);
        let fc = cf.flux(&uc);
        for j in 0..3 {
            let mass = fm[density_idx(2, 0)][j] + fm[density_idx(2, 1)][j];
            assert!((mass - fc[0][j]).abs() < TOL);
            let energy = fm[energy_idx(2, 0)][j] + fm[energy_idx(2, 1)][j];
            assert!((energy - fc[4][j]).abs() < TOL);
            for i in 0..3 {
                assert!((fm[momentum_idx(2, i)][j] - fc[1 + i][j]).abs() < TOL);
            }
        }
    }

    #[test]
    fn test_volume_fraction_out_of_range() {
        let law = water_air();
        let mut u = law.conserved(&[0.5, 0.5], &[1000.0, 1.2], &[1.0e5, 1.0e5], [0.0; 3]);
        u[volfrac_idx(2, 1)] = 1.2;
        let bad = law.first_non_physical(&u).unwrap();
        assert_eq!(bad.component, 1);
    }
}
