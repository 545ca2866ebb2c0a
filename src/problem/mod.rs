//! Problem definitions: initial conditions, analytic solutions, sources and
//! Dirichlet data.
//!
//! A [`Problem`] is plain configuration data. The system it runs on is
//! passed in as [`SystemParams`] when the problem is evaluated, so one enum
//! serves every PDE family:
//!
//! | family               | problems |
//! |----------------------|----------|
//! | compressible flow    | `SodShocktube`, `RotatedSodShocktube`, `VorticalFlow`, `NlEnergyGrowth` |
//! | multi-material flow  | `MultiMatSodShocktube`, `WaterAirShocktube`, `TriplePoint`, `InterfaceAdvection` |
//! | scalar transport     | `ShearDiff`, `SlotCyl` |
//! | any                  | `UserDefined` |
//!
//! # Example
//! ```
//! use inciter::equations::{CompFlow, Physics, StiffenedGas};
//! use inciter::problem::{Problem, SystemParams};
//!
//! let physics = Physics::CompFlow(CompFlow::new(StiffenedGas::ideal(1.4)));
//! let u = Problem::SodShocktube.solution(SystemParams::Flow(&physics), [0.25, 0.0, 0.0], 0.0);
//! assert!((u[4] - 2.5).abs() < 1e-12);
//! ```

mod compflow;
mod multimat;
mod transport;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::BcConfig;
use crate::equations::{ConservationLaw, Physics, Transport};
use crate::operators::Vec3;
use crate::registry::PdeKind;

/// Physical parameters a problem is evaluated against.
#[derive(Clone, Copy, Debug)]
pub enum SystemParams<'a> {
    /// Compressible single- or multi-material flow
    Flow(&'a Physics),
    /// Scalar advection-diffusion
    Transport(&'a Transport),
}

impl SystemParams<'_> {
    pub fn ncomp(&self) -> usize {
        match self {
            SystemParams::Flow(p) => p.ncomp(),
            SystemParams::Transport(t) => t.ncomp,
        }
    }

    pub fn kind(&self) -> PdeKind {
        match self {
            SystemParams::Flow(Physics::CompFlow(_)) => PdeKind::CompFlowDg,
            SystemParams::Flow(Physics::MultiMat(_)) => PdeKind::MultiMatDg,
            SystemParams::Transport(_) => PdeKind::TransportCg,
        }
    }
}

/// Parameters of the steady vortical flow.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VorticalFlowParams {
    pub alpha: f64,
    pub beta: f64,
    pub p0: f64,
}

impl Default for VorticalFlowParams {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            beta: 1.0,
            p0: 10.0,
        }
    }
}

/// Parameters of the non-linear energy growth problem.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NlEnergyGrowthParams {
    /// Internal energy parameter (negative)
    pub ce: f64,
    /// Base density
    pub r0: f64,
    /// Density decay rate
    pub alpha: f64,
    /// Energy growth rate
    pub kappa: f64,
    /// Wave numbers of the energy shape function
    pub beta: Vec3,
}

impl Default for NlEnergyGrowthParams {
    fn default() -> Self {
        Self {
            ce: -1.0,
            r0: 2.0,
            alpha: 0.25,
            kappa: 0.8,
            beta: [1.0, 0.75, 0.5],
        }
    }
}

/// Parameters of the shear-diffusion point release.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShearDiffParams {
    /// x position of the release
    pub x0: f64,
    /// Time at which the peak concentration is one
    pub t_ref: f64,
}

impl Default for ShearDiffParams {
    fn default() -> Self {
        Self {
            x0: 7200.0,
            t_ref: 1.0,
        }
    }
}

/// Problem selector with runtime dispatch.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Problem {
    /// Uniform user-supplied conserved state, no analytic solution
    UserDefined {
        #[serde(default)]
        state: Vec<f64>,
    },
    #[default]
    SodShocktube,
    RotatedSodShocktube,
    VorticalFlow(VorticalFlowParams),
    NlEnergyGrowth(NlEnergyGrowthParams),
    MultiMatSodShocktube,
    WaterAirShocktube,
    TriplePoint,
    InterfaceAdvection,
    ShearDiff(ShearDiffParams),
    SlotCyl,
}

impl Problem {
    pub fn name(&self) -> &'static str {
        match self {
            Problem::UserDefined { .. } => "user_defined",
            Problem::SodShocktube => "sod_shocktube",
            Problem::RotatedSodShocktube => "rotated_sod_shocktube",
            Problem::VorticalFlow(_) => "vortical_flow",
            Problem::NlEnergyGrowth(_) => "nl_energy_growth",
            Problem::MultiMatSodShocktube => "multi_mat_sod_shocktube",
            Problem::WaterAirShocktube => "water_air_shocktube",
            Problem::TriplePoint => "triple_point",
            Problem::InterfaceAdvection => "interface_advection",
            Problem::ShearDiff(_) => "shear_diff",
            Problem::SlotCyl => "slot_cyl",
        }
    }

    /// Whether the problem is defined for a PDE family.
    pub fn supports(&self, kind: PdeKind) -> bool {
        match self {
            Problem::UserDefined { .. } => true,
            Problem::SodShocktube
            | Problem::RotatedSodShocktube
            | Problem::VorticalFlow(_)
            | Problem::NlEnergyGrowth(_) => kind == PdeKind::CompFlowDg,
            Problem::MultiMatSodShocktube
            | Problem::WaterAirShocktube
            | Problem::TriplePoint
            | Problem::InterfaceAdvection => kind == PdeKind::MultiMatDg,
            Problem::ShearDiff(_) | Problem::SlotCyl => kind == PdeKind::TransportCg,
        }
    }

    /// Whether `solution` is exact at every time rather than only the
    /// initial condition.
    pub fn has_analytic_solution(&self) -> bool {
        matches!(
            self,
            Problem::VorticalFlow(_)
                | Problem::NlEnergyGrowth(_)
                | Problem::InterfaceAdvection
                | Problem::ShearDiff(_)
                | Problem::SlotCyl
        )
    }

    /// Conserved state at point `x` and time `t`.
    ///
    /// Problems without an analytic solution return their initial
    /// condition regardless of `t`.
    pub fn solution(&self, sys: SystemParams<'_>, x: Vec3, t: f64) -> Vec<f64> {
        match (self, sys) {
            (Problem::UserDefined { state }, sys) => {
                let mut u = state.clone();
                u.resize(sys.ncomp(), 0.0);
                u
            }
            (Problem::SodShocktube, SystemParams::Flow(Physics::CompFlow(law))) => {
                compflow::sod_shocktube(law, x)
            }
            (Problem::RotatedSodShocktube, SystemParams::Flow(Physics::CompFlow(law))) => {
                compflow::rotated_sod_shocktube(law, x)
            }
            (Problem::VorticalFlow(p), SystemParams::Flow(Physics::CompFlow(law))) => {
                compflow::vortical_flow(law, p.alpha, p.beta, p.p0, x)
            }
            (Problem::NlEnergyGrowth(p), SystemParams::Flow(Physics::CompFlow(_))) => p.solution(x, t),
            (Problem::MultiMatSodShocktube, SystemParams::Flow(Physics::MultiMat(law))) => {
                multimat::sod_shocktube(law, x)
            }
            (Problem::WaterAirShocktube, SystemParams::Flow(Physics::MultiMat(law))) => {
                multimat::water_air_shocktube(law, x)
            }
            (Problem::TriplePoint, SystemParams::Flow(Physics::MultiMat(law))) => {
                multimat::triple_point(law, x)
            }
            (Problem::InterfaceAdvection, SystemParams::Flow(Physics::MultiMat(law))) => {
                multimat::interface_advection(law, x, t)
            }
            (Problem::ShearDiff(p), SystemParams::Transport(params)) => {
                transport::shear_diff(params, p.x0, p.t_ref, x, t)
            }
            (Problem::SlotCyl, SystemParams::Transport(params)) => transport::slot_cyl(params, x, t),
            (problem, sys) => mismatch(problem, sys),
        }
    }

    /// Source term s(x, t) of the balance law.
    pub fn source(&self, sys: SystemParams<'_>, x: Vec3, t: f64) -> Vec<f64> {
        match (self, sys) {
            (Problem::VorticalFlow(p), SystemParams::Flow(Physics::CompFlow(law))) => {
                compflow::vortical_flow_source(law, p.alpha, p.beta, x)
            }
            (Problem::NlEnergyGrowth(p), SystemParams::Flow(Physics::CompFlow(law))) => {
                p.source(law, x, t)
            }
            (_, sys) => vec![0.0; sys.ncomp()],
        }
    }

    /// Whether the problem has a non-zero source term.
    pub fn has_source(&self) -> bool {
        matches!(self, Problem::VorticalFlow(_) | Problem::NlEnergyGrowth(_))
    }

    /// Increment of the solution over one step, `solution(t+dt) - solution(t)`.
    pub fn dirichlet_increment(&self, sys: SystemParams<'_>, x: Vec3, t: f64, dt: f64) -> Vec<f64> {
        let s1 = self.solution(sys, x, t);
        let s2 = self.solution(sys, x, t + dt);
        s2.iter().zip(&s1).map(|(b, a)| b - a).collect()
    }

    /// Side sets the problem expects boundary conditions on.
    ///
    /// Problems with an exact solution are driven through their Dirichlet
    /// side sets; shock tubes through their symmetry and extrapolation
    /// side sets.
    pub fn boundary_side_ids(&self, bcs: &BcConfig) -> BTreeSet<i32> {
        match self {
            Problem::SodShocktube
            | Problem::RotatedSodShocktube
            | Problem::MultiMatSodShocktube
            | Problem::WaterAirShocktube
            | Problem::TriplePoint => bcs
                .extrapolate
                .iter()
                .chain(&bcs.symmetry)
                .chain(&bcs.outlet)
                .copied()
                .collect(),
            _ => bcs.dirichlet.iter().copied().collect(),
        }
    }

    /// Prescribed transport velocity of component `c` at `x`.
    pub fn prescribed_velocity(&self, sys: SystemParams<'_>, x: Vec3, c: usize) -> Vec3 {
        match (self, sys) {
            (Problem::ShearDiff(_), SystemParams::Transport(params)) => {
                transport::shear_velocity(params, x, c)
            }
            (Problem::SlotCyl, _) => transport::rotation_velocity(x),
            _ => [0.0; 3],
        }
    }

    /// Names of the output fields produced by [`Problem::field_output`].
    pub fn field_names(&self, sys: SystemParams<'_>) -> Vec<String> {
        let base: Vec<String> = match sys {
            SystemParams::Flow(Physics::CompFlow(_)) => {
                compflow::FIELDS.iter().map(|s| s.to_string()).collect()
            }
            SystemParams::Flow(Physics::MultiMat(law)) => multimat::field_names(law.nmat()),
            SystemParams::Transport(t) => (1..=t.ncomp).map(|c| format!("c{c}")).collect(),
        };
        let analytic = self.has_analytic_solution();
        base.into_iter()
            .flat_map(|name| {
                let mut v = vec![format!("{name}_numerical")];
                if analytic {
                    v.push(format!("{name}_analytical"));
                }
                v
            })
            .collect()
    }

    /// Output fields at a set of points given the conserved states there.
    ///
    /// Returns one column per name of [`Problem::field_names`], numerical
    /// and analytical values interleaved for problems with an exact
    /// solution.
    pub fn field_output(
        &self,
        sys: SystemParams<'_>,
        states: &[Vec<f64>],
        points: &[Vec3],
        t: f64,
    ) -> Vec<Vec<f64>> {
        assert_eq!(states.len(), points.len(), "one point per state required");
        let derived = |u: &[f64]| -> Vec<f64> {
            match sys {
                SystemParams::Flow(Physics::CompFlow(law)) => compflow::primitive(law, u).to_vec(),
                SystemParams::Flow(Physics::MultiMat(law)) => multimat::output(law, u),
                SystemParams::Transport(_) => u.to_vec(),
            }
        };
        let analytic = self.has_analytic_solution();
        let nfield = self.field_names(sys).len();
        let mut out = vec![Vec::with_capacity(states.len()); nfield];
        for (u, &x) in states.iter().zip(points) {
            let num = derived(u);
            let exact = analytic.then(|| derived(&self.solution(sys, x, t)));
            for (i, v) in num.iter().enumerate() {
                match &exact {
                    Some(a) => {
                        out[2 * i].push(*v);
                        out[2 * i + 1].push(a[i]);
                    }
                    None => out[i].push(*v),
                }
            }
        }
        out
    }
}

fn mismatch(problem: &Problem, sys: SystemParams<'_>) -> Vec<f64> {
    debug_assert!(
        problem.supports(sys.kind()),
        "problem {} is not defined for {:?}",
        problem.name(),
        sys.kind()
    );
    log::warn!("problem {} is not defined for {:?}; using zero state", problem.name(), sys.kind());
    vec![0.0; sys.ncomp()]
}
