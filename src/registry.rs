//! PDE systems built from a configuration, keyed by their family.
//!
//! DG systems (single- and multi-material flow) share one element-based
//! solution buffer and CG systems (scalar transport) one node-based buffer;
//! each system is placed at its own column offset in the buffer of its
//! family, in configuration order.
//!
//! # Example
//! ```
//! use inciter::config::{BcConfig, CompFlowConfig, Config, DiscretizationConfig};
//! use inciter::equations::StiffenedGas;
//! use inciter::mesh::{MeshPartition, TetMesh};
//! use inciter::problem::Problem;
//! use inciter::registry::{PdeKind, PdeRegistry};
//!
//! let mesh = TetMesh::structured_box([4, 1, 1], [0.0; 3], [1.0, 0.25, 0.25]).unwrap();
//! let part = MeshPartition::new(mesh).unwrap();
//! let config = Config::new(DiscretizationConfig::default()).with_compflow(
//!     CompFlowConfig::new(StiffenedGas::ideal(1.4), Problem::SodShocktube)
//!         .with_bc(BcConfig::default().with_extrapolate(vec![1, 2]).with_symmetry(vec![3, 4, 5, 6])),
//! );
//! let registry = PdeRegistry::from_config(&config, &part).unwrap();
//! assert_eq!(registry.count(PdeKind::CompFlowDg), 1);
//! assert_eq!(registry.element_width(), 5);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::mesh::MeshPartition;
use crate::solver::{CgTransport, DgSystem, Fields, SolverError, StateReport};

/// PDE family together with its discretisation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PdeKind {
    /// Single-material compressible flow on DG
    CompFlowDg,
    /// Multi-material compressible flow on DG
    MultiMatDg,
    /// Scalar advection-diffusion on edge-based CG
    TransportCg,
}

impl PdeKind {
    pub fn name(&self) -> &'static str {
        match self {
            PdeKind::CompFlowDg => "compflow_dg",
            PdeKind::MultiMatDg => "multimat_dg",
            PdeKind::TransportCg => "transport_cg",
        }
    }

    /// Whether unknowns live on elements rather than nodes.
    pub fn is_dg(&self) -> bool {
        !matches!(self, PdeKind::TransportCg)
    }
}

/// A built system.
#[derive(Clone, Debug)]
pub enum PdeSystem {
    Dg(DgSystem),
    Cg(CgTransport),
}

impl PdeSystem {
    /// Columns the system occupies in the buffer of its family.
    pub fn width(&self) -> usize {
        match self {
            PdeSystem::Dg(s) => s.layout().width(),
            PdeSystem::Cg(s) => s.ncomp(),
        }
    }

    pub fn field_names(&self) -> Vec<String> {
        match self {
            PdeSystem::Dg(s) => s.field_names(),
            PdeSystem::Cg(s) => s.field_names(),
        }
    }
}

/// Solution buffers of all systems on one partition.
#[derive(Clone, Debug)]
pub struct Solutions {
    /// One row per element
    pub elements: Fields,
    /// One row per node
    pub nodes: Fields,
}

/// Every system of a run on one partition.
#[derive(Clone, Debug, Default)]
pub struct PdeRegistry {
    systems: BTreeMap<PdeKind, Vec<PdeSystem>>,
    element_width: usize,
    node_width: usize,
}

impl PdeRegistry {
    /// Validate `config` and build all of its systems on `part`.
    pub fn from_config(config: &Config, part: &MeshPartition) -> Result<Self, SolverError> {
        config.validate()?;
        let disc = &config.discretization;
        let mut registry = Self::default();

        for sys in &config.compflow {
            let dg = DgSystem::new(sys.physics(), sys.problem.clone(), &sys.bc, disc, part)?;
            registry.insert(PdeKind::CompFlowDg, PdeSystem::Dg(dg));
        }
        for sys in &config.multimat {
            let dg = DgSystem::new(sys.physics(), sys.problem.clone(), &sys.bc, disc, part)?;
            registry.insert(PdeKind::MultiMatDg, PdeSystem::Dg(dg));
        }
        for sys in &config.transport {
            let cg = CgTransport::new(sys.params.clone(), sys.problem.clone(), &sys.bc, disc, part)?;
            registry.insert(PdeKind::TransportCg, PdeSystem::Cg(cg));
        }

        log::info!(
            "registry: {} systems ({}), element width {}, node width {}",
            registry.len(),
            registry
                .systems
                .iter()
                .map(|(k, v)| format!("{} x{}", k.name(), v.len()))
                .collect::<Vec<_>>()
                .join(", "),
            registry.element_width,
            registry.node_width
        );
        Ok(registry)
    }

    /// Append a system, placing it after the systems of its family.
    pub fn insert(&mut self, kind: PdeKind, system: PdeSystem) {
        let system = match system {
            PdeSystem::Dg(s) => {
                let s = s.with_offset(self.element_width);
                self.element_width += s.layout().width();
                PdeSystem::Dg(s)
            }
            PdeSystem::Cg(s) => {
                let s = s.with_offset(self.node_width);
                self.node_width += s.ncomp();
                PdeSystem::Cg(s)
            }
        };
        self.systems.entry(kind).or_default().push(system);
    }

    /// Systems of one family, in configuration order.
    pub fn get(&self, kind: PdeKind) -> &[PdeSystem] {
        self.systems.get(&kind).map_or(&[], Vec::as_slice)
    }

    pub fn count(&self, kind: PdeKind) -> usize {
        self.get(kind).len()
    }

    pub fn len(&self) -> usize {
        self.systems.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All systems with their family.
    pub fn iter(&self) -> impl Iterator<Item = (PdeKind, &PdeSystem)> {
        self.systems
            .iter()
            .flat_map(|(&k, v)| v.iter().map(move |s| (k, s)))
    }

    /// Columns of the element buffer.
    pub fn element_width(&self) -> usize {
        self.element_width
    }

    /// Columns of the node buffer.
    pub fn node_width(&self) -> usize {
        self.node_width
    }

    /// Buffers holding every system's solution at time `t`.
    pub fn initial_solutions(&self, part: &MeshPartition, t: f64) -> Solutions {
        let mut sol = Solutions {
            elements: Fields::new(part.n_elements(), self.element_width),
            nodes: Fields::new(part.n_nodes(), self.node_width),
        };
        for (_, sys) in self.iter() {
            match sys {
                PdeSystem::Dg(s) => s.initialize(part, t, &mut sol.elements),
                PdeSystem::Cg(s) => s.initialize(part, t, &mut sol.nodes),
            }
        }
        sol
    }

    /// Smallest stable time step over all systems.
    pub fn dt(&self, part: &MeshPartition, sol: &Solutions) -> f64 {
        self.iter()
            .map(|(_, sys)| match sys {
                PdeSystem::Dg(s) => s.dt(part, &sol.elements),
                PdeSystem::Cg(s) => s.dt(part),
            })
            .fold(f64::INFINITY, f64::min)
    }

    /// Advance every system by one step of size `dt` from `t`.
    ///
    /// Returns the combined state report of the DG systems.
    pub fn step(
        &self,
        part: &MeshPartition,
        t: f64,
        dt: f64,
        sol: &mut Solutions,
    ) -> Result<StateReport, SolverError> {
        let mut report = StateReport::default();
        for (_, sys) in self.iter() {
            match sys {
                PdeSystem::Dg(s) => report.merge(s.step(part, t, dt, &mut sol.elements)?),
                PdeSystem::Cg(s) => s.step(part, t, dt, &mut sol.nodes),
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BcConfig, CompFlowConfig, DiscretizationConfig, MultiMatConfig, TransportConfig};
    use crate::equations::{StiffenedGas, Transport};
    use crate::mesh::TetMesh;
    use crate::problem::{Problem, ShearDiffParams};

    fn part() -> MeshPartition {
        let mesh = TetMesh::structured_box([4, 1, 1], [0.0; 3], [1.0, 0.25, 0.25]).unwrap();
        MeshPartition::new(mesh).unwrap()
    }

    fn config() -> Config {
        let closed = BcConfig::default().with_symmetry(vec![1, 2, 3, 4, 5, 6]);
        Config::new(DiscretizationConfig::default().with_cfl(0.4).with_t0(0.5))
            .with_compflow(CompFlowConfig::new(StiffenedGas::ideal(1.4), Problem::SodShocktube).with_bc(closed.clone()))
            .with_multimat(
                MultiMatConfig::new(
                    vec![StiffenedGas::ideal(1.4), StiffenedGas::ideal(1.6)],
                    Problem::MultiMatSodShocktube,
                )
                .with_bc(closed.clone()),
            )
            .with_transport(TransportConfig::new(
                Transport::new(2)
                    .with_u0(vec![0.1, 0.2])
                    .with_lambda(vec![0.0, 0.0])
                    .with_diffusivity(vec![0.01, 0.02]),
                Problem::ShearDiff(ShearDiffParams { x0: 0.25, t_ref: 1.0 }),
            ))
    }

    #[test]
    fn test_offsets_follow_configuration_order() {
        let part = part();
        let reg = PdeRegistry::from_config(&config(), &part).unwrap();
        assert_eq!(reg.len(), 3);
        assert_eq!(reg.count(PdeKind::CompFlowDg), 1);
        assert_eq!(reg.count(PdeKind::MultiMatDg), 1);
        assert_eq!(reg.count(PdeKind::TransportCg), 1);

        // P0: 5 single-material components, then 2 + 2 + 3 + 2 multi-material
        let PdeSystem::Dg(multi) = &reg.get(PdeKind::MultiMatDg)[0] else {
            panic!("multi-material flow must be DG");
        };
        assert_eq!(multi.layout().offset, 5);
        assert_eq!(reg.element_width(), 14);
        assert_eq!(reg.node_width(), 2);
    }

    #[test]
    fn test_step_advances_all_systems() {
        let part = part();
        let reg = PdeRegistry::from_config(&config(), &part).unwrap();
        let mut sol = reg.initial_solutions(&part, 0.5);
        let before = sol.clone();
        let dt = reg.dt(&part, &sol);
        assert!(dt.is_finite() && dt > 0.0);
        let report = reg.step(&part, 0.5, dt, &mut sol).unwrap();
        assert!(report.is_clean());
        assert_eq!(report.checked, 2 * part.n_elements());
        assert_ne!(before.elements.as_slice(), sol.elements.as_slice());
        assert_ne!(before.nodes.as_slice(), sol.nodes.as_slice());
    }

    #[test]
    fn test_invalid_deck_is_rejected() {
        let mut c = config();
        c.transport[0].params.u0.pop();
        assert!(matches!(
            PdeRegistry::from_config(&c, &part()),
            Err(SolverError::Config(_))
        ));
    }
}
