//! Single-material compressible Euler equations.
//!
//! Conserved state `[ρ, ρu, ρv, ρw, ρE]`, closed by a stiffened gas:
//!
//! ∂ρ/∂t  + ∇·(ρv)          = 0
//! ∂ρv/∂t + ∇·(ρv⊗v + pI)   = 0
//! ∂ρE/∂t + ∇·(v(ρE + p))   = 0

use super::{ConservationLaw, EquationOfState, NonPhysical, StiffenedGas};
use crate::operators::Vec3;

/// Number of conserved components.
pub const COMPFLOW_NCOMP: usize = 5;

/// Compressible single-material flow.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CompFlow {
    pub eos: StiffenedGas,
}

impl CompFlow {
    pub fn new(eos: StiffenedGas) -> Self {
        Self { eos }
    }

    /// Pressure of a conserved state.
    #[inline]
    pub fn pressure(&self, u: &[f64]) -> f64 {
        self.eos.pressure(u[0], u[1], u[2], u[3], u[4])
    }

    /// Conserved state from primitive variables.
    pub fn conserved(&self, rho: f64, vel: Vec3, p: f64) -> Vec<f64> {
        vec![
            rho,
            rho * vel[0],
            rho * vel[1],
            rho * vel[2],
            self.eos.total_energy(rho, vel[0], vel[1], vel[2], p),
        ]
    }
}

impl ConservationLaw for CompFlow {
    fn ncomp(&self) -> usize {
        COMPFLOW_NCOMP
    }

    fn flux(&self, u: &[f64]) -> Vec<Vec3> {
        let rho = u[0];
        let v = [u[1] / rho, u[2] / rho, u[3] / rho];
        let p = self.pressure(u);
        let mut f = vec![[0.0; 3]; COMPFLOW_NCOMP];
        for j in 0..3 {
            f[0][j] = u[1 + j];
            for i in 0..3 {
                f[1 + i][j] = u[1 + i] * v[j];
            }
            f[1 + j][j] += p;
            f[4][j] = v[j] * (u[4] + p);
        }
        f
    }

    fn velocity(&self, u: &[f64]) -> Vec3 {
        [u[1] / u[0], u[2] / u[0], u[3] / u[0]]
    }

    fn sound_speed(&self, u: &[f64]) -> f64 {
        self.eos.sound_speed(u[0], self.pressure(u))
    }

    fn momentum_offset(&self) -> usize {
        1
    }

    fn first_non_physical(&self, u: &[f64]) -> Option<NonPhysical> {
        if !(u[0] > 0.0) {
            return Some(NonPhysical::density(0, u[0]));
        }
        let p = self.pressure(u);
        if !(p + self.eos.pstiff >= 0.0) {
            return Some(NonPhysical::pressure(4, p));
        }
        None
    }
}
