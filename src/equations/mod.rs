//! Conservation law abstractions.
//!
//! Provides a trait-based interface for the hyperbolic systems solved with
//! discontinuous Galerkin:
//!
//! ∂u/∂t + ∇·F(u) = s(x, t)
//!
//! - [`CompFlow`]: single-material compressible Euler
//! - [`MultiMat`]: velocity-equilibrium multi-material flow
//! - [`Physics`]: enum over both for runtime dispatch
//!
//! Thermodynamics go through [`StiffenedGas`]. Scalar advection-diffusion
//! ([`Transport`]) is discretised with continuous Galerkin instead and only
//! carries parameters here.

mod compflow;
mod eos;
mod multimat;
mod transport;

pub use compflow::{COMPFLOW_NCOMP, CompFlow};
pub use eos::{EosTable, EquationOfState, StiffenedGas};
pub use multimat::{
    MultiMat, RHO_FLOOR, VOLFRAC_FLOOR, VOLFRAC_TOLERANCE, density_idx, energy_idx, momentum_idx,
    multimat_ncomp, volfrac_idx,
};
pub use transport::Transport;

use crate::operators::{Vec3, dot};

/// Which bound a non-physical state violates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Quantity {
    Density,
    Pressure,
    VolumeFraction,
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Quantity::Density => write!(f, "density"),
            Quantity::Pressure => write!(f, "pressure"),
            Quantity::VolumeFraction => write!(f, "volume fraction"),
        }
    }
}

/// A violated physical bound: the offending component and value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NonPhysical {
    pub quantity: Quantity,
    pub component: usize,
    pub value: f64,
}

impl NonPhysical {
    pub fn density(component: usize, value: f64) -> Self {
        Self {
            quantity: Quantity::Density,
            component,
            value,
        }
    }

    pub fn pressure(component: usize, value: f64) -> Self {
        Self {
            quantity: Quantity::Pressure,
            component,
            value,
        }
    }

    pub fn volume_fraction(component: usize, value: f64) -> Self {
        Self {
            quantity: Quantity::VolumeFraction,
            component,
            value,
        }
    }
}

/// A hyperbolic system of conservation laws in 3D.
pub trait ConservationLaw: Send + Sync {
    /// Number of conserved components.
    fn ncomp(&self) -> usize;

    /// Physical flux tensor: `flux(u)[c][j]` is the flux of component `c`
    /// in direction `j`.
    fn flux(&self, u: &[f64]) -> Vec<Vec3>;

    /// Advective velocity of a state.
    fn velocity(&self, u: &[f64]) -> Vec3;

    /// Speed of sound of a state.
    fn sound_speed(&self, u: &[f64]) -> f64;

    /// Index of the x-momentum component.
    fn momentum_offset(&self) -> usize;

    /// Rows of the per-element Riemann derivative buffer used by the
    /// non-conservative terms (zero for conservative systems).
    fn n_derivatives(&self) -> usize {
        0
    }

    /// First violated physical bound, if any.
    fn first_non_physical(&self, u: &[f64]) -> Option<NonPhysical>;

    /// Maximum absolute wave speed |v| + a.
    fn max_wave_speed(&self, u: &[f64]) -> f64 {
        let v = self.velocity(u);
        dot(v, v).sqrt() + self.sound_speed(u)
    }

    /// Maximum wave speed in direction `n`: |v·n| + a.
    fn normal_wave_speed(&self, u: &[f64], n: Vec3) -> f64 {
        dot(self.velocity(u), n).abs() + self.sound_speed(u)
    }

    /// Flux projected on a unit normal, F(u)·n.
    fn normal_flux(&self, u: &[f64], n: Vec3) -> Vec<f64> {
        self.flux(u).iter().map(|f| dot(*f, n)).collect()
    }
}

/// Runtime selection between the supported hydrodynamic systems.
#[derive(Clone, Debug, PartialEq)]
pub enum Physics {
    CompFlow(CompFlow),
    MultiMat(MultiMat),
}

impl Physics {
    /// Number of materials (one for single-material flow).
    pub fn nmat(&self) -> usize {
        match self {
            Physics::CompFlow(_) => 1,
            Physics::MultiMat(m) => m.nmat(),
        }
    }

    /// Material constants.
    pub fn materials(&self) -> &[StiffenedGas] {
        match self {
            Physics::CompFlow(c) => std::slice::from_ref(&c.eos),
            Physics::MultiMat(m) => &m.materials,
        }
    }

    /// Bulk pressure of a state.
    pub fn pressure(&self, u: &[f64]) -> f64 {
        match self {
            Physics::CompFlow(c) => c.pressure(u),
            Physics::MultiMat(m) => m.pressure(u),
        }
    }

    pub fn is_multimat(&self) -> bool {
        matches!(self, Physics::MultiMat(_))
    }
}

impl ConservationLaw for Physics {
    fn ncomp(&self) -> usize {
        match self {
            Physics::CompFlow(c) => c.ncomp(),
            Physics::MultiMat(m) => m.ncomp(),
        }
    }

    fn flux(&self, u: &[f64]) -> Vec<Vec3> {
        match self {
            Physics::CompFlow(c) => c.flux(u),
            Physics::MultiMat(m) => m.flux(u),
        }
    }

    fn velocity(&self, u: &[f64]) -> Vec3 {
        match self {
            Physics::CompFlow(c) => c.velocity(u),
            Physics::MultiMat(m) => m.velocity(u),
        }
    }

    fn sound_speed(&self, u: &[f64]) -> f64 {
        match self {
            Physics::CompFlow(c) => c.sound_speed(u),
            Physics::MultiMat(m) => m.sound_speed(u),
        }
    }

    fn momentum_offset(&self) -> usize {
        match self {
            Physics::CompFlow(c) => c.momentum_offset(),
            Physics::MultiMat(m) => m.momentum_offset(),
        }
    }

    fn n_derivatives(&self) -> usize {
        match self {
            Physics::CompFlow(c) => c.n_derivatives(),
            Physics::MultiMat(m) => m.n_derivatives(),
        }
    }

    fn first_non_physical(&self, u: &[f64]) -> Option<NonPhysical> {
        match self {
            Physics::CompFlow(c) => c.first_non_physical(u),
            Physics::MultiMat(m) => m.first_non_physical(u),
        }
    }
}
