//! Run configuration.
//!
//! Every PDE system is described by an explicit, serde-derived struct and
//! the whole deck is validated once with [`Config::validate`] before
//! systems are built. Decks are JSON:
//!
//! ```
//! use inciter::config::Config;
//!
//! let deck = r#"{
//!     "discretization": { "ndof": 4, "rdof": 4, "cfl": 0.3, "flux": "hllc" },
//!     "compflow": [{
//!         "material": { "gamma": 1.4 },
//!         "problem": { "type": "sod_shocktube" },
//!         "bc": { "extrapolate": [1, 2], "symmetry": [3, 4, 5, 6] }
//!     }]
//! }"#;
//! let config = Config::from_json_str(deck).unwrap();
//! config.validate().unwrap();
//! assert_eq!(config.compflow.len(), 1);
//! ```

mod error;

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub use error::ConfigError;

use crate::equations::{CompFlow, ConservationLaw, MultiMat, Physics, StiffenedGas, Transport};
use crate::flux::{RiemannSolver, StandardFlux};
use crate::polynomial::is_supported_ndof;
use crate::problem::Problem;
use crate::registry::PdeKind;
use crate::solver::{NonPhysicalPolicy, ReconstructionKind};

fn default_dof() -> usize {
    1
}

fn default_cfl() -> f64 {
    0.5
}

fn default_interval() -> u64 {
    1
}

/// Spatial discretisation and stage-level policies shared by all systems.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiscretizationConfig {
    /// Evolved dofs per component: 1 (P0), 4 (P1) or 10 (P2)
    #[serde(default = "default_dof")]
    pub ndof: usize,
    /// Reconstructed dofs; 4 with `ndof = 1` selects P0P1
    #[serde(default = "default_dof")]
    pub rdof: usize,
    #[serde(default = "default_cfl")]
    pub cfl: f64,
    /// Initial time
    #[serde(default)]
    pub t0: f64,
    #[serde(default)]
    pub flux: StandardFlux,
    #[serde(default)]
    pub reconstruction: ReconstructionKind,
    /// Clip MUSCL edge states into the range of the endpoint states
    #[serde(default)]
    pub realizability: bool,
    #[serde(default)]
    pub nonphysical: NonPhysicalPolicy,
}

impl Default for DiscretizationConfig {
    fn default() -> Self {
        Self {
            ndof: 1,
            rdof: 1,
            cfl: default_cfl(),
            t0: 0.0,
            flux: StandardFlux::default(),
            reconstruction: ReconstructionKind::default(),
            realizability: false,
            nonphysical: NonPhysicalPolicy::default(),
        }
    }
}

impl DiscretizationConfig {
    pub fn with_dofs(mut self, ndof: usize, rdof: usize) -> Self {
        self.ndof = ndof;
        self.rdof = rdof;
        self
    }

    pub fn with_cfl(mut self, cfl: f64) -> Self {
        self.cfl = cfl;
        self
    }

    pub fn with_t0(mut self, t0: f64) -> Self {
        self.t0 = t0;
        self
    }

    pub fn with_flux(mut self, flux: StandardFlux) -> Self {
        self.flux = flux;
        self
    }

    pub fn with_reconstruction(mut self, reconstruction: ReconstructionKind) -> Self {
        self.reconstruction = reconstruction;
        self
    }

    pub fn with_realizability(mut self, enable: bool) -> Self {
        self.realizability = enable;
        self
    }

    pub fn with_nonphysical(mut self, policy: NonPhysicalPolicy) -> Self {
        self.nonphysical = policy;
        self
    }

    /// Whether P0 solutions are reconstructed to P1 before integration.
    pub fn reconstructs(&self) -> bool {
        self.rdof > self.ndof
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [("ndof", self.ndof), ("rdof", self.rdof)] {
            if !is_supported_ndof(value) {
                return Err(ConfigError::UnsupportedDofs { name, value });
            }
        }
        if self.rdof != self.ndof && !(self.ndof == 1 && self.rdof == 4) {
            return Err(ConfigError::InvalidRdof {
                ndof: self.ndof,
                rdof: self.rdof,
            });
        }
        if !(self.cfl > 0.0 && self.cfl.is_finite()) {
            return Err(ConfigError::InvalidParameter {
                name: "cfl",
                reason: format!("must be positive, got {}", self.cfl),
            });
        }
        Ok(())
    }
}

/// Boundary policies by side-set id.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BcConfig {
    /// Analytic solution imposed
    #[serde(default)]
    pub dirichlet: Vec<i32>,
    /// Normal velocity removed
    #[serde(default)]
    pub symmetry: Vec<i32>,
    /// Interior state copied
    #[serde(default)]
    pub extrapolate: Vec<i32>,
    /// Interior state copied, pressure set for subsonic outflow
    #[serde(default)]
    pub outlet: Vec<i32>,
    /// Back pressure of subsonic outlets
    #[serde(default)]
    pub outlet_pressure: Option<f64>,
}

impl BcConfig {
    pub fn with_dirichlet(mut self, sides: Vec<i32>) -> Self {
        self.dirichlet = sides;
        self
    }

    pub fn with_symmetry(mut self, sides: Vec<i32>) -> Self {
        self.symmetry = sides;
        self
    }

    pub fn with_extrapolate(mut self, sides: Vec<i32>) -> Self {
        self.extrapolate = sides;
        self
    }

    pub fn with_outlet(mut self, sides: Vec<i32>, pressure: Option<f64>) -> Self {
        self.outlet = sides;
        self.outlet_pressure = pressure;
        self
    }

    /// Every configured side set, in order.
    pub fn side_sets(&self) -> impl Iterator<Item = i32> + '_ {
        self.dirichlet
            .iter()
            .chain(&self.symmetry)
            .chain(&self.extrapolate)
            .chain(&self.outlet)
            .copied()
    }

    pub(crate) fn validate(&self, system: &str) -> Result<(), ConfigError> {
        let mut seen: BTreeMap<i32, usize> = BTreeMap::new();
        for id in self.side_sets() {
            *seen.entry(id).or_default() += 1;
        }
        if let Some((&side_set, _)) = seen.iter().find(|&(_, &n)| n > 1) {
            return Err(ConfigError::ConflictingBoundary {
                system: system.to_string(),
                side_set,
            });
        }
        if let Some(p) = self.outlet_pressure {
            if !p.is_finite() {
                return Err(ConfigError::InvalidParameter {
                    name: "outlet_pressure",
                    reason: format!("must be finite, got {p}"),
                });
            }
        }
        Ok(())
    }
}

/// Single-material compressible flow system.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CompFlowConfig {
    #[serde(default)]
    pub material: StiffenedGas,
    #[serde(default)]
    pub problem: Problem,
    #[serde(default)]
    pub bc: BcConfig,
}

impl CompFlowConfig {
    pub fn new(material: StiffenedGas, problem: Problem) -> Self {
        Self {
            material,
            problem,
            bc: BcConfig::default(),
        }
    }

    pub fn with_bc(mut self, bc: BcConfig) -> Self {
        self.bc = bc;
        self
    }

    pub fn physics(&self) -> Physics {
        Physics::CompFlow(CompFlow::new(self.material))
    }
}

/// Multi-material compressible flow system.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MultiMatConfig {
    pub materials: Vec<StiffenedGas>,
    #[serde(default = "default_multimat_problem")]
    pub problem: Problem,
    #[serde(default)]
    pub bc: BcConfig,
}

fn default_multimat_problem() -> Problem {
    Problem::MultiMatSodShocktube
}

impl MultiMatConfig {
    pub fn new(materials: Vec<StiffenedGas>, problem: Problem) -> Self {
        Self {
            materials,
            problem,
            bc: BcConfig::default(),
        }
    }

    pub fn with_bc(mut self, bc: BcConfig) -> Self {
        self.bc = bc;
        self
    }

    pub fn physics(&self) -> Physics {
        Physics::MultiMat(MultiMat::new(self.materials.clone()))
    }
}

/// Scalar transport system (continuous Galerkin).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransportConfig {
    #[serde(flatten)]
    pub params: Transport,
    pub problem: Problem,
    #[serde(default)]
    pub bc: BcConfig,
}

impl TransportConfig {
    pub fn new(params: Transport, problem: Problem) -> Self {
        Self {
            params,
            problem,
            bc: BcConfig::default(),
        }
    }

    pub fn with_bc(mut self, bc: BcConfig) -> Self {
        self.bc = bc;
        self
    }
}

/// Diagnostics cadence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    /// Compute diagnostics every `interval` iterations
    #[serde(default = "default_interval")]
    pub interval: u64,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            interval: default_interval(),
        }
    }
}

/// Complete run configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub discretization: DiscretizationConfig,
    #[serde(default)]
    pub compflow: Vec<CompFlowConfig>,
    #[serde(default)]
    pub multimat: Vec<MultiMatConfig>,
    #[serde(default)]
    pub transport: Vec<TransportConfig>,
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

impl Config {
    pub fn new(discretization: DiscretizationConfig) -> Self {
        Self {
            discretization,
            ..Self::default()
        }
    }

    pub fn with_compflow(mut self, system: CompFlowConfig) -> Self {
        self.compflow.push(system);
        self
    }

    pub fn with_multimat(mut self, system: MultiMatConfig) -> Self {
        self.multimat.push(system);
        self
    }

    pub fn with_transport(mut self, system: TransportConfig) -> Self {
        self.transport.push(system);
        self
    }

    pub fn with_diagnostics_interval(mut self, interval: u64) -> Self {
        self.diagnostics.interval = interval;
        self
    }

    /// Parse a JSON deck. Call [`Config::validate`] before use.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Read and parse a JSON deck from disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Serialise to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the deck to disk as JSON.
    pub fn to_json_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Construction-time checks of every system.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let disc = &self.discretization;
        disc.validate()?;
        if self.diagnostics.interval == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "diagnostics.interval",
                reason: "must be at least 1".to_string(),
            });
        }

        for (i, sys) in self.compflow.iter().enumerate() {
            let name = format!("compflow[{i}]");
            check_flow(&name, &sys.problem, &sys.physics(), disc.flux)?;
            sys.bc.validate(&name)?;
        }

        for (i, sys) in self.multimat.iter().enumerate() {
            let name = format!("multimat[{i}]");
            check_flow(&name, &sys.problem, &sys.physics(), disc.flux)?;
            sys.bc.validate(&name)?;
        }

        for (i, sys) in self.transport.iter().enumerate() {
            let name = format!("transport[{i}]");
            check_transport(&name, &sys.params, &sys.problem)?;
            if matches!(sys.problem, Problem::ShearDiff(_)) && disc.t0 <= 0.0 {
                return Err(ConfigError::InvalidParameter {
                    name: "t0",
                    reason: format!("{name}: shear diffusion starts from a point release and needs t0 > 0"),
                });
            }
            sys.bc.validate(&name)?;
        }
        Ok(())
    }
}

fn check_material(system: &str, material: usize, m: &StiffenedGas) -> Result<(), ConfigError> {
    if m.is_valid() {
        return Ok(());
    }
    Err(ConfigError::InvalidMaterial {
        system: system.to_string(),
        material,
        reason: format!("gamma = {}, pstiff = {}, cv = {}", m.gamma, m.pstiff, m.cv),
    })
}

fn check_problem(system: &str, problem: &Problem, kind: PdeKind, ncomp: usize) -> Result<(), ConfigError> {
    if !problem.supports(kind) {
        return Err(ConfigError::UnknownProblem {
            system: system.to_string(),
            problem: problem.name(),
        });
    }
    if let Problem::UserDefined { state } = problem {
        if !state.is_empty() && state.len() != ncomp {
            return Err(ConfigError::ComponentCountMismatch {
                system: system.to_string(),
                parameter: "state",
                expected: ncomp,
                found: state.len(),
            });
        }
    }
    Ok(())
}

/// Materials, problem and flux of a DG flow system.
pub(crate) fn check_flow(
    system: &str,
    problem: &Problem,
    physics: &Physics,
    flux: StandardFlux,
) -> Result<(), ConfigError> {
    let kind = match physics {
        Physics::CompFlow(law) => {
            check_material(system, 0, &law.eos)?;
            PdeKind::CompFlowDg
        }
        Physics::MultiMat(law) => {
            if law.materials.len() < 2 {
                return Err(ConfigError::MissingMaterials {
                    system: system.to_string(),
                    found: law.materials.len(),
                });
            }
            for (k, m) in law.materials.iter().enumerate() {
                check_material(system, k, m)?;
            }
            PdeKind::MultiMatDg
        }
    };
    check_problem(system, problem, kind, physics.ncomp())?;
    if !flux.supports(physics) {
        return Err(ConfigError::IncompatibleFlux {
            system: system.to_string(),
            flux: flux.name(),
        });
    }
    Ok(())
}

/// Component counts, coefficients and problem of a CG transport system.
pub(crate) fn check_transport(system: &str, p: &Transport, problem: &Problem) -> Result<(), ConfigError> {
    if p.ncomp == 0 {
        return Err(ConfigError::InvalidParameter {
            name: "ncomp",
            reason: format!("{system} transports no scalars"),
        });
    }
    check_problem(system, problem, PdeKind::TransportCg, p.ncomp)?;

    // shear diffusion needs every coefficient; otherwise missing lists
    // default to zero
    let required = matches!(problem, Problem::ShearDiff(_));
    for (parameter, values) in [("u0", &p.u0), ("lambda", &p.lambda), ("diffusivity", &p.diffusivity)] {
        if (required || !values.is_empty()) && values.len() != p.ncomp {
            return Err(ConfigError::ComponentCountMismatch {
                system: system.to_string(),
                parameter,
                expected: p.ncomp,
                found: values.len(),
            });
        }
    }
    if let Some(d) = p.diffusivity.iter().find(|d| !(**d >= 0.0)) {
        return Err(ConfigError::InvalidParameter {
            name: "diffusivity",
            reason: format!("{system}: must be non-negative, got {d}"),
        });
    }
    Ok(())
}
