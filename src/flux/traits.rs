//! Trait-based Riemann solver abstraction.
//!
//! A Riemann solver maps a left state, a right state and the unit normal
//! pointing from left to right to the numerical flux F*·n, plus any
//! auxiliary derivative terms the non-conservative integrator consumes.
//!
//! # Example
//! ```
//! use inciter::equations::{CompFlow, Physics, StiffenedGas};
//! use inciter::flux::{FluxContext, RiemannSolver, StandardFlux};
//!
//! let law = CompFlow::new(StiffenedGas::ideal(1.4));
//! let left = law.conserved(1.0, [0.0; 3], 1.0);
//! let right = law.conserved(0.125, [0.0; 3], 0.1);
//! let physics = Physics::CompFlow(law);
//! let ctx = FluxContext::new(&physics, [1.0, 0.0, 0.0]);
//!
//! let out = StandardFlux::Hllc.flux(&left, &right, &ctx).unwrap();
//! assert!(out.flux[0] > 0.0);
//! assert!(out.derivatives.is_empty());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{
    ausm_flux_compflow, ausm_flux_multimat, averaged_derivatives, hll_flux, hllc_flux,
    rusanov_flux,
};
use crate::equations::Physics;
use crate::operators::Vec3;

/// Context provided to numerical flux computations.
#[derive(Clone, Copy, Debug)]
pub struct FluxContext<'a> {
    /// The system being solved, with its material constants
    pub physics: &'a Physics,
    /// Unit normal pointing from the left to the right state
    pub normal: Vec3,
}

impl<'a> FluxContext<'a> {
    #[inline]
    pub fn new(physics: &'a Physics, normal: Vec3) -> Self {
        Self { physics, normal }
    }
}

/// Numerical flux and derivative terms at one interface point.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RiemannFlux {
    /// F*·n, one entry per component
    pub flux: Vec<f64>,
    /// Interface partial pressures α_kp_k and normal velocity for
    /// multi-material systems; empty otherwise
    pub derivatives: Vec<f64>,
}

/// A solver was handed a system it has no flux for.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{flux} flux does not support {system} flow")]
pub struct FluxError {
    pub flux: &'static str,
    pub system: &'static str,
}

/// Approximate Riemann solver.
///
/// Implementations must be consistent, F*(u, u; n) = F(u)·n, and
/// conservative, F*(u_l, u_r; n) = -F*(u_r, u_l; -n). Systems for which
/// [`RiemannSolver::supports`] is false yield a [`FluxError`].
pub trait RiemannSolver: Send + Sync {
    fn flux(&self, u_l: &[f64], u_r: &[f64], ctx: &FluxContext<'_>) -> Result<RiemannFlux, FluxError>;

    /// Human-readable name for logging.
    fn name(&self) -> &'static str;

    /// Whether the solver handles this system.
    fn supports(&self, physics: &Physics) -> bool;
}

/// Rusanov flux; any system.
#[derive(Clone, Copy, Debug, Default)]
pub struct RusanovFlux;

impl RiemannSolver for RusanovFlux {
    fn flux(&self, u_l: &[f64], u_r: &[f64], ctx: &FluxContext<'_>) -> Result<RiemannFlux, FluxError> {
        let flux = rusanov_flux(ctx.physics, u_l, u_r, ctx.normal);
        let derivatives = match ctx.physics {
            Physics::MultiMat(m) => averaged_derivatives(m, u_l, u_r, ctx.normal),
            Physics::CompFlow(_) => Vec::new(),
        };
        Ok(RiemannFlux { flux, derivatives })
    }

    fn name(&self) -> &'static str {
        "rusanov"
    }

    fn supports(&self, _physics: &Physics) -> bool {
        true
    }
}

/// HLL flux; single-material flow only.
#[derive(Clone, Copy, Debug, Default)]
pub struct HllFlux;

fn multimat_unsupported(flux: &'static str) -> FluxError {
    FluxError {
        flux,
        system: "multi-material",
    }
}

impl RiemannSolver for HllFlux {
    fn flux(&self, u_l: &[f64], u_r: &[f64], ctx: &FluxContext<'_>) -> Result<RiemannFlux, FluxError> {
        match ctx.physics {
            Physics::CompFlow(c) => Ok(RiemannFlux {
                flux: hll_flux(c, u_l, u_r, ctx.normal),
                derivatives: Vec::new(),
            }),
            Physics::MultiMat(_) => Err(multimat_unsupported(self.name())),
        }
    }

    fn name(&self) -> &'static str {
        "hll"
    }

    fn supports(&self, physics: &Physics) -> bool {
        !physics.is_multimat()
    }
}

/// HLLC flux; single-material flow only.
#[derive(Clone, Copy, Debug, Default)]
pub struct HllcFlux;

impl RiemannSolver for HllcFlux {
    fn flux(&self, u_l: &[f64], u_r: &[f64], ctx: &FluxContext<'_>) -> Result<RiemannFlux, FluxError> {
        match ctx.physics {
            Physics::CompFlow(c) => Ok(RiemannFlux {
                flux: hllc_flux(c, u_l, u_r, ctx.normal),
                derivatives: Vec::new(),
            }),
            Physics::MultiMat(_) => Err(multimat_unsupported(self.name())),
        }
    }

    fn name(&self) -> &'static str {
        "hllc"
    }

    fn supports(&self, physics: &Physics) -> bool {
        !physics.is_multimat()
    }
}

/// AUSM+-up flux; any system.
#[derive(Clone, Copy, Debug, Default)]
pub struct AusmFlux;

impl RiemannSolver for AusmFlux {
    fn flux(&self, u_l: &[f64], u_r: &[f64], ctx: &FluxContext<'_>) -> Result<RiemannFlux, FluxError> {
        Ok(match ctx.physics {
            Physics::CompFlow(c) => RiemannFlux {
                flux: ausm_flux_compflow(c, u_l, u_r, ctx.normal),
                derivatives: Vec::new(),
            },
            Physics::MultiMat(m) => {
                let (flux, derivatives) = ausm_flux_multimat(m, u_l, u_r, ctx.normal);
                RiemannFlux { flux, derivatives }
            }
        })
    }

    fn name(&self) -> &'static str {
        "ausm"
    }

    fn supports(&self, _physics: &Physics) -> bool {
        true
    }
}

/// Enum wrapper for the built-in Riemann solvers.
///
/// Dispatches without a virtual call and doubles as the configuration
/// value selecting the solver.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StandardFlux {
    #[default]
    Rusanov,
    Hll,
    Hllc,
    Ausm,
}

impl RiemannSolver for StandardFlux {
    #[inline]
    fn flux(&self, u_l: &[f64], u_r: &[f64], ctx: &FluxContext<'_>) -> Result<RiemannFlux, FluxError> {
        match self {
            StandardFlux::Rusanov => RusanovFlux.flux(u_l, u_r, ctx),
            StandardFlux::Hll => HllFlux.flux(u_l, u_r, ctx),
            StandardFlux::Hllc => HllcFlux.flux(u_l, u_r, ctx),
            StandardFlux::Ausm => AusmFlux.flux(u_l, u_r, ctx),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            StandardFlux::Rusanov => "rusanov",
            StandardFlux::Hll => "hll",
            StandardFlux::Hllc => "hllc",
            StandardFlux::Ausm => "ausm",
        }
    }

    fn supports(&self, physics: &Physics) -> bool {
        match self {
            StandardFlux::Rusanov | StandardFlux::Ausm => true,
            StandardFlux::Hll | StandardFlux::Hllc => !physics.is_multimat(),
        }
    }
}

/// Type alias for boxed solvers selected at runtime.
pub type BoxedFlux = Box<dyn RiemannSolver>;

/// Create a boxed solver from its enum tag.
pub fn create_flux(flux_type: StandardFlux) -> BoxedFlux {
    match flux_type {
        StandardFlux::Rusanov => Box::new(RusanovFlux),
        StandardFlux::Hll => Box::new(HllFlux),
        StandardFlux::Hllc => Box::new(HllcFlux),
        StandardFlux::Ausm => Box::new(AusmFlux),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equations::{CompFlow, MultiMat, StiffenedGas};

    const TOL: f64 = 1e-12;

    #[test]
    fn test_enum_matches_boxed() {
        let law = CompFlow::new(StiffenedGas::ideal(1.4));
        let l = law.conserved(1.0, [0.1, 0.0, 0.0], 1.0);
        let r = law.conserved(0.5, [0.0, 0.1, 0.0], 0.4);
        let physics = Physics::CompFlow(law);
        let ctx = FluxContext::new(&physics, [0.0, 0.6, 0.8]);
        for ft in [StandardFlux::Rusanov, StandardFlux::Hll, StandardFlux::Hllc, StandardFlux::Ausm] {
            let a = ft.flux(&l, &r, &ctx).unwrap();
            let b = create_flux(ft).flux(&l, &r, &ctx).unwrap();
            assert_eq!(ft.name(), create_flux(ft).name());
            for c in 0..5 {
                assert!((a.flux[c] - b.flux[c]).abs() < TOL);
            }
        }
    }

    #[test]
    fn test_support_matrix() {
        let gas = StiffenedGas::ideal(1.4);
        let mm = Physics::MultiMat(MultiMat::new(vec![gas, gas]));
        let cf = Physics::CompFlow(CompFlow::new(gas));
        assert!(StandardFlux::Ausm.supports(&mm));
        assert!(StandardFlux::Rusanov.supports(&mm));
        assert!(!StandardFlux::Hllc.supports(&mm));
        assert!(StandardFlux::Hllc.supports(&cf));
    }

    #[test]
    fn test_single_material_solvers_refuse_mixtures() {
        let gas = StiffenedGas::ideal(1.4);
        let law = MultiMat::new(vec![gas, gas]);
        let u = law.conserved(&[0.4, 0.6], &[1.0, 0.5], &[1.0, 1.0], [0.1, 0.0, 0.0]);
        let physics = Physics::MultiMat(law);
        let ctx = FluxContext::new(&physics, [1.0, 0.0, 0.0]);
        for ft in [StandardFlux::Hll, StandardFlux::Hllc] {
            let err = ft.flux(&u, &u, &ctx).unwrap_err();
            assert_eq!(err.flux, ft.name());
            assert_eq!(err.to_string(), format!("{} flux does not support multi-material flow", ft.name()));
            assert!(create_flux(ft).flux(&u, &u, &ctx).is_err());
        }
    }

    #[test]
    fn test_multimat_derivative_count() {
        let gas = StiffenedGas::ideal(1.4);
        let law = MultiMat::new(vec![gas, gas]);
        let u = law.conserved(&[0.4, 0.6], &[1.0, 0.5], &[1.0, 1.0], [0.1, 0.0, 0.0]);
        let physics = Physics::MultiMat(law);
        let ctx = FluxContext::new(&physics, [1.0, 0.0, 0.0]);
        for ft in [StandardFlux::Rusanov, StandardFlux::Ausm] {
            let out = ft.flux(&u, &u, &ctx).unwrap();
            assert_eq!(out.flux.len(), 9);
            assert_eq!(out.derivatives.len(), 3);
            assert!((out.derivatives[2] - 0.1).abs() < TOL);
        }
    }

    #[test]
    fn test_serde_names() {
        let ft: StandardFlux = serde_json::from_str("\"hllc\"").unwrap();
        assert_eq!(ft, StandardFlux::Hllc);
        assert_eq!(serde_json::to_string(&StandardFlux::Ausm).unwrap(), "\"ausm\"");
    }
}
