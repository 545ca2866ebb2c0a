//! # inciter
//!
//! Partition-local time advance for flow and transport solvers on
//! unstructured tetrahedral meshes.
//!
//! This crate provides the building blocks of one mesh partition's step:
//! - Equations of state and conservation laws (single- and multi-material
//!   compressible flow, scalar transport)
//! - Tetrahedral geometry, the Dubiner basis and Gauss quadrature
//! - Least-squares, MUSCL and interface-safe reconstruction
//! - Riemann solvers (Rusanov, HLL, HLLC, AUSM+up)
//! - DG volume, surface, source and non-conservative integrals
//! - Edge-based CG assembly on the median dual
//! - Boundary conditions on side sets
//! - Stable time steps and SSP-RK3 stages
//! - Error-norm diagnostics and the halo exchange between partitions

pub mod boundary;
pub mod comm;
pub mod config;
pub mod equations;
pub mod flux;
pub mod mesh;
pub mod operators;
pub mod polynomial;
pub mod problem;
pub mod registry;
pub mod solver;
pub mod time;
pub mod types;

// Re-export main types for convenience
pub use boundary::{BcKind, SideSetBcs};
pub use comm::{HaloExchange, NodeCommMap, PartitionWorker, run_partitioned};
pub use config::{
    BcConfig, CompFlowConfig, Config, ConfigError, DiscretizationConfig, MultiMatConfig,
    TransportConfig,
};
pub use equations::{
    CompFlow, ConservationLaw, EquationOfState, MultiMat, Physics, StiffenedGas, Transport,
};
pub use flux::{RiemannSolver, StandardFlux};
pub use mesh::{MeshError, MeshPartition, TetMesh};
pub use problem::{Problem, SystemParams};
pub use registry::{PdeKind, PdeRegistry, PdeSystem, Solutions};
pub use solver::{
    CgTransport, DgSystem, Fields, NodeDiagnostics, NonPhysicalPolicy, ReconstructionKind,
    SolverError, StateReport,
};
pub use time::{ssp_rk3_step, ssp_rk3_step_timed};
pub use types::{ElementIndex, FaceIndex};
