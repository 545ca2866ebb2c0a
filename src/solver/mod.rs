//! Discretisation of the PDE systems on one mesh partition.
//!
//! # Submodules
//!
//! - [`core`]: Solution containers ([`Fields`])
//! - [`reconstruction`]: Least-squares P0→P1, extended stencil, MUSCL and
//!   safe interface reconstruction
//! - [`integrate`]: DG volume, surface, source and non-conservative integrals
//! - [`diagnostics`]: Error norms and their reduction across partitions
//!
//! # Systems
//!
//! - [`DgSystem`]: compressible single- and multi-material flow on DG
//! - [`CgTransport`]: scalar advection-diffusion on edge-based CG
//!
//! Both advance with SSP-RK3 and report non-physical cell averages
//! according to a [`NonPhysicalPolicy`].

mod cg;
pub mod core;
mod dg;
pub mod diagnostics;
mod error;
pub mod integrate;
mod policy;
pub mod reconstruction;

pub use cg::{CgTransport, divide_by_nodal_volume};
pub use core::Fields;
pub use dg::DgSystem;
pub use error::SolverError;
pub use policy::{NonPhysicalPolicy, StateReport, check_physical_states};
pub use reconstruction::{ReconstructionKind, ReconstructionStats};

// Re-export diagnostics
pub use diagnostics::{
    DiagnosticsHistory, DiagnosticsRecord, DiagnosticsStamp, NodeDiagnostics,
    compute_local_diagnostics, element_diagnostics, finalize, merge_diagnostics,
};
