//! Scalar advection-diffusion, solved with continuous Galerkin.
//!
//! Each of the `ncomp` scalars obeys
//!
//! ∂c/∂t + v(x)·∇c = D ∇²c
//!
//! with a prescribed velocity field supplied by the problem and a constant
//! isotropic diffusivity per component.

use serde::{Deserialize, Serialize};

/// Parameters of a transport system.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Transport {
    /// Number of transported scalars
    pub ncomp: usize,
    /// Free-stream velocity per component
    #[serde(default)]
    pub u0: Vec<f64>,
    /// Shear rate per component
    #[serde(default)]
    pub lambda: Vec<f64>,
    /// Diffusivity per component
    #[serde(default)]
    pub diffusivity: Vec<f64>,
}

impl Transport {
    /// Pure advection of `ncomp` scalars.
    pub fn new(ncomp: usize) -> Self {
        Self {
            ncomp,
            u0: vec![0.0; ncomp],
            lambda: vec![0.0; ncomp],
            diffusivity: vec![0.0; ncomp],
        }
    }

    pub fn with_u0(mut self, u0: Vec<f64>) -> Self {
        self.u0 = u0;
        self
    }

    pub fn with_lambda(mut self, lambda: Vec<f64>) -> Self {
        self.lambda = lambda;
        self
    }

    pub fn with_diffusivity(mut self, diffusivity: Vec<f64>) -> Self {
        self.diffusivity = diffusivity;
        self
    }

    /// Diffusivity of component `c` (zero when not configured).
    #[inline]
    pub fn diffusivity(&self, c: usize) -> f64 {
        self.diffusivity.get(c).copied().unwrap_or(0.0)
    }

    /// Largest diffusivity over all components.
    pub fn max_diffusivity(&self) -> f64 {
        self.diffusivity.iter().copied().fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_zero() {
        let t = Transport::new(2);
        assert_eq!(t.u0, vec![0.0, 0.0]);
        assert_eq!(t.diffusivity(5), 0.0);
        assert_eq!(t.max_diffusivity(), 0.0);
    }

    #[test]
    fn test_builder() {
        let t = Transport::new(2).with_diffusivity(vec![0.1, 0.3]).with_u0(vec![1.0, 2.0]);
        assert_eq!(t.max_diffusivity(), 0.3);
        assert_eq!(t.diffusivity(1), 0.3);
        assert_eq!(t.u0[1], 2.0);
    }
}
