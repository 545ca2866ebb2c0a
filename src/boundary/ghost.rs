//! Ghost states for DG boundary faces.
//!
//! The flux across a boundary face is the Riemann flux between the
//! interior trace and a ghost state built from it:
//!
//! | policy        | ghost state |
//! |---------------|-------------|
//! | `Dirichlet`   | problem solution at the face point |
//! | `Symmetry`    | interior with the normal momentum reversed |
//! | `Extrapolate` | interior |
//! | `Outlet`      | interior with the back pressure for subsonic outflow |

use crate::equations::{
    ConservationLaw, Physics, VOLFRAC_FLOOR, density_idx, volfrac_idx,
};
use crate::operators::{Vec3, dot};
use crate::problem::{Problem, SystemParams};
use crate::types::FaceIndex;

use super::{BcKind, SideSetBcs};

/// Context for boundary condition evaluation at one face point.
#[derive(Clone, Copy, Debug)]
pub struct BcContext<'a> {
    /// Time the ghost state is requested for
    pub time: f64,
    /// Physical position of the face point
    pub point: Vec3,
    /// Outward unit normal
    pub normal: Vec3,
    /// Interior state at the point
    pub interior: &'a [f64],
}

impl<'a> BcContext<'a> {
    pub fn new(time: f64, point: Vec3, normal: Vec3, interior: &'a [f64]) -> Self {
        Self {
            time,
            point,
            normal,
            interior,
        }
    }
}

/// Boundary condition for compressible single- and multi-material flow.
pub trait FlowBoundaryCondition: Send + Sync {
    /// Exterior state used in the flux computation.
    fn ghost_state(&self, physics: &Physics, ctx: &BcContext<'_>) -> Vec<f64>;

    /// Name for logging.
    fn name(&self) -> &'static str;
}

/// Analytic solution of the problem.
#[derive(Clone, Copy, Debug)]
pub struct DirichletBc<'a> {
    pub problem: &'a Problem,
}

impl FlowBoundaryCondition for DirichletBc<'_> {
    fn ghost_state(&self, physics: &Physics, ctx: &BcContext<'_>) -> Vec<f64> {
        self.problem
            .solution(SystemParams::Flow(physics), ctx.point, ctx.time)
    }

    fn name(&self) -> &'static str {
        "dirichlet"
    }
}

/// Mirror state: u_ghost = u - 2 (u·n) n for the momentum.
#[derive(Clone, Copy, Debug, Default)]
pub struct SymmetryBc;

impl FlowBoundaryCondition for SymmetryBc {
    fn ghost_state(&self, physics: &Physics, ctx: &BcContext<'_>) -> Vec<f64> {
        let mut g = ctx.interior.to_vec();
        let m = physics.momentum_offset();
        let n = ctx.normal;
        let mn = dot([g[m], g[m + 1], g[m + 2]], n);
        for i in 0..3 {
            g[m + i] -= 2.0 * mn * n[i];
        }
        g
    }

    fn name(&self) -> &'static str {
        "symmetry"
    }
}

/// Zero-gradient state.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExtrapolateBc;

impl FlowBoundaryCondition for ExtrapolateBc {
    fn ghost_state(&self, _physics: &Physics, ctx: &BcContext<'_>) -> Vec<f64> {
        ctx.interior.to_vec()
    }

    fn name(&self) -> &'static str {
        "extrapolate"
    }
}

/// Pressure outlet.
///
/// Subsonic outflow keeps density, velocity and volume fractions of the
/// interior and imposes the back pressure; supersonic outflow, inflow and
/// outlets without a back pressure extrapolate.
#[derive(Clone, Copy, Debug, Default)]
pub struct OutletBc {
    pub pressure: Option<f64>,
}

impl FlowBoundaryCondition for OutletBc {
    fn ghost_state(&self, physics: &Physics, ctx: &BcContext<'_>) -> Vec<f64> {
        let u = ctx.interior;
        let Some(pb) = self.pressure else {
            return u.to_vec();
        };
        let vel = physics.velocity(u);
        let vn = dot(vel, ctx.normal);
        if vn < 0.0 || vn >= physics.sound_speed(u) {
            return u.to_vec();
        }
        match physics {
            Physics::CompFlow(law) => law.conserved(u[0], vel, pb),
            Physics::MultiMat(law) => {
                let nmat = law.nmat();
                let alpha: Vec<f64> = (0..nmat).map(|k| u[volfrac_idx(nmat, k)]).collect();
                let rho: Vec<f64> = (0..nmat)
                    .map(|k| u[density_idx(nmat, k)] / alpha[k].max(VOLFRAC_FLOOR))
                    .collect();
                law.conserved(&alpha, &rho, &vec![pb; nmat], vel)
            }
        }
    }

    fn name(&self) -> &'static str {
        "outlet"
    }
}

/// Dispatches boundary faces of one flow system to their condition.
///
/// Faces without a configured condition extrapolate.
pub struct FlowBoundary<'a> {
    bcs: &'a SideSetBcs,
    dirichlet: DirichletBc<'a>,
    outlet: OutletBc,
}

impl<'a> FlowBoundary<'a> {
    pub fn new(bcs: &'a SideSetBcs, problem: &'a Problem) -> Self {
        Self {
            bcs,
            dirichlet: DirichletBc { problem },
            outlet: OutletBc {
                pressure: bcs.outlet_pressure(),
            },
        }
    }

    /// Condition applied on boundary face `f`.
    pub fn condition(&self, f: FaceIndex) -> &dyn FlowBoundaryCondition {
        match self.bcs.face_kind(f) {
            Some(BcKind::Dirichlet) => &self.dirichlet,
            Some(BcKind::Symmetry) => &SymmetryBc,
            Some(BcKind::Outlet) => &self.outlet,
            Some(BcKind::Extrapolate) | None => &ExtrapolateBc,
        }
    }

    /// Ghost state on boundary face `f`.
    pub fn ghost_state(&self, physics: &Physics, f: FaceIndex, ctx: &BcContext<'_>) -> Vec<f64> {
        self.condition(f).ghost_state(physics, ctx)
    }
}
