//! Errors raised while advancing a partition.

use thiserror::Error;

use crate::config::ConfigError;
use crate::equations::Quantity;
use crate::flux::FluxError;
use crate::mesh::MeshError;
use crate::types::ElementIndex;

/// Solver error.
#[derive(Debug, Error)]
pub enum SolverError {
    /// Invalid mesh or geometry.
    #[error("mesh error: {0}")]
    Mesh(#[from] MeshError),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The Riemann solver cannot handle the system.
    #[error("flux error: {0}")]
    Flux(#[from] FluxError),

    /// A cell average left the admissible set under the `Abort` policy.
    #[error("non-physical {quantity} {value:e} in component {component} of element {element}")]
    NonPhysicalState {
        element: ElementIndex,
        quantity: Quantity,
        component: usize,
        value: f64,
    },

    /// Halo exchange failed (peer disconnected or protocol violated).
    #[error("halo exchange failed: {0}")]
    Halo(String),
}
