//! Configuration errors.

use thiserror::Error;

/// Errors detected while loading or validating a configuration.
///
/// All of them are raised before any integration starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A per-component parameter list has the wrong length.
    #[error("{system}: parameter '{parameter}' has {found} entries, expected {expected}")]
    ComponentCountMismatch {
        system: String,
        parameter: &'static str,
        expected: usize,
        found: usize,
    },

    /// Degrees of freedom outside {1, 4, 10}.
    #[error("unsupported {name} = {value}, expected 1, 4 or 10")]
    UnsupportedDofs { name: &'static str, value: usize },

    /// Reconstructed dofs incompatible with the evolved dofs.
    #[error("rdof = {rdof} is incompatible with ndof = {ndof}")]
    InvalidRdof { ndof: usize, rdof: usize },

    /// A multi-material system with fewer than two materials.
    #[error("{system}: multi-material flow needs at least 2 materials, found {found}")]
    MissingMaterials { system: String, found: usize },

    /// Material constants outside their valid range.
    #[error("{system}: material {material} is invalid ({reason})")]
    InvalidMaterial {
        system: String,
        material: usize,
        reason: String,
    },

    /// Problem not defined for the system it is attached to.
    #[error("{system}: problem '{problem}' is not available for this system")]
    UnknownProblem { system: String, problem: &'static str },

    /// Riemann solver that cannot handle the system.
    #[error("{system}: flux '{flux}' does not support this system")]
    IncompatibleFlux { system: String, flux: &'static str },

    /// A side set configured with more than one boundary policy.
    #[error("{system}: side set {side_set} has more than one boundary condition")]
    ConflictingBoundary { system: String, side_set: i32 },

    /// Scalar parameter outside its valid range.
    #[error("invalid {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// Configuration file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file is not valid JSON for this schema.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
