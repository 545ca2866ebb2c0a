//! Solution diagnostics.
//!
//! - [`compute_local_diagnostics`], [`merge_diagnostics`], [`finalize`]:
//!   partition-local error norms and their reduction
//! - [`NodeDiagnostics`]: sampled nodal diagnostics of CG systems
//! - [`DiagnosticsHistory`]: time series tracking

mod diagnostics;

pub use diagnostics::{
    DT, DiagnosticsHistory, DiagnosticsRecord, DiagnosticsStamp, ITER, L2ERR, L2SOL, LINFERR,
    NUMDIAG, NodeDiagnostics, TIME, compute_local_diagnostics, element_diagnostics, finalize,
    merge_diagnostics,
};
