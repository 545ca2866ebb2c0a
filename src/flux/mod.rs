//! Numerical flux functions.
//!
//! Provides approximate Riemann solvers for DG face integrals:
//! - Rusanov (local Lax-Friedrichs) for any system
//! - HLL/HLLC for single-material compressible flow
//! - AUSM+-up for single- and multi-material flow
//!
//! # Flux Trait
//!
//! The [`RiemannSolver`] trait returns the numerical flux together with the
//! derivative terms needed by the multi-material non-conservative
//! integrator.
//!
//! ## Built-in Solvers
//! - [`RusanovFlux`], [`HllFlux`], [`HllcFlux`], [`AusmFlux`]
//! - [`StandardFlux`]: enum for dispatch when the solver comes from configuration

mod ausm;
mod hll;
mod rusanov;
pub mod traits;

pub use ausm::{ausm_flux_compflow, ausm_flux_multimat};
pub use hll::{hll_flux, hllc_flux};
pub use rusanov::{averaged_derivatives, rusanov_flux};

pub use traits::{
    AusmFlux, BoxedFlux, FluxContext, FluxError, HllFlux, HllcFlux, RiemannFlux, RiemannSolver, RusanovFlux,
    StandardFlux, create_flux,
};
