//! Reconstruction of higher-order states from lower-order data.
//!
//! - P0 → P1 least squares over face neighbours ([`LeastSquaresLhs`],
//!   [`int_least_sq_p0p1`], [`bnd_least_sq_p0p1`], [`solve_least_sq_p0p1`])
//! - P0 → P1 least squares over node neighbours
//!   ([`reco_least_sq_ext_stencil`])
//! - [`transform_p0p1`]: physical gradients to Dubiner dofs
//! - [`muscl`]: limited edge-end states for edge-based CG
//! - [`safe_reco`]: bounded face states at material interfaces
//!
//! Reconstruction of a stage always completes before any integral reads
//! the reconstructed dofs.

mod ext_stencil;
mod least_squares;
mod muscl;
mod safe_reco;

pub use ext_stencil::reco_least_sq_ext_stencil;
pub use least_squares::{
    LeastSquaresLhs, LeastSquaresRhs, bnd_least_sq_p0p1, int_least_sq_p0p1, least_squares_rhs,
    solve_least_sq_p0p1, transform_p0p1,
};
pub use muscl::{MUSCL_EPS, MUSCL_KAPPA, muscl};
pub use safe_reco::safe_reco;

use serde::{Deserialize, Serialize};

/// Stencil used for P0 → P1 reconstruction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconstructionKind {
    /// Face neighbours, boundary faces through ghost states
    #[default]
    LeastSquares,
    /// Every element sharing a node
    ExtendedStencil,
}

/// Counters returned by a reconstruction pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconstructionStats {
    /// Elements that received a gradient
    pub reconstructed: usize,
    /// Elements whose normal equations were singular (zero gradient)
    pub singular: usize,
}

impl ReconstructionStats {
    pub fn merge(&mut self, other: ReconstructionStats) {
        self.reconstructed += other.reconstructed;
        self.singular += other.singular;
    }
}
