//! Stiffened-gas equation of state.
//!
//! Closes the Euler equations of every material with
//!
//! p = (γ - 1)(ρE - ½ρ|v|² - p_c) - p_c
//!
//! where p_c is the stiffness pressure. An ideal gas is the special case
//! p_c = 0. All functions are pure and may be called from any thread.
//!
//! Non-physical inputs are not guarded here: a negative density or
//! p + p_c < 0 yields a NaN sound speed. Callers check states through
//! [`crate::solver::check_physical_states`].

use serde::{Deserialize, Serialize};

/// Closure mapping conserved or primitive state to thermodynamic quantities.
pub trait EquationOfState: Send + Sync {
    /// Pressure from conserved variables.
    fn pressure(&self, rho: f64, rhou: f64, rhov: f64, rhow: f64, rhoe: f64) -> f64;

    /// Speed of sound.
    fn sound_speed(&self, rho: f64, p: f64) -> f64;

    /// Total energy per unit volume from primitive variables.
    fn total_energy(&self, rho: f64, u: f64, v: f64, w: f64, p: f64) -> f64;

    /// Density from pressure and temperature.
    fn density(&self, p: f64, temperature: f64) -> f64;
}

fn default_cv() -> f64 {
    717.5
}

/// Stiffened-gas material constants.
///
/// # Example
///
/// ```
/// use inciter::equations::{EquationOfState, StiffenedGas};
///
/// let air = StiffenedGas::ideal(1.4);
/// let rhoe = air.total_energy(1.0, 0.0, 0.0, 0.0, 1.0);
/// assert!((rhoe - 2.5).abs() < 1e-12);
/// assert!((air.pressure(1.0, 0.0, 0.0, 0.0, rhoe) - 1.0).abs() < 1e-12);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StiffenedGas {
    /// Ratio of specific heats
    pub gamma: f64,
    /// Stiffness pressure p_c
    #[serde(default)]
    pub pstiff: f64,
    /// Specific heat at constant volume
    #[serde(default = "default_cv")]
    pub cv: f64,
}

impl Default for StiffenedGas {
    fn default() -> Self {
        Self::ideal(1.4)
    }
}

impl StiffenedGas {
    pub fn new(gamma: f64, pstiff: f64, cv: f64) -> Self {
        Self { gamma, pstiff, cv }
    }

    /// Ideal gas with the default specific heat.
    pub fn ideal(gamma: f64) -> Self {
        Self {
            gamma,
            pstiff: 0.0,
            cv: default_cv(),
        }
    }

    /// Set the specific heat at constant volume.
    pub fn with_cv(mut self, cv: f64) -> Self {
        self.cv = cv;
        self
    }

    /// True when the constants describe a usable material.
    pub fn is_valid(&self) -> bool {
        self.gamma > 1.0 && self.pstiff >= 0.0 && self.cv > 0.0
    }

    /// Material pressure weighted by its volume fraction, α_k p_k, from
    /// the material's partial density α_kρ_k and partial energy α_kρ_kE_k.
    ///
    /// The bulk velocity (u, v, w) is shared by all materials.
    pub fn partial_pressure(&self, arho: f64, u: f64, v: f64, w: f64, arhoe: f64, alpha: f64) -> f64 {
        let ke = 0.5 * arho * (u * u + v * v + w * w);
        (self.gamma - 1.0) * (arhoe - ke - alpha * self.pstiff) - alpha * self.pstiff
    }

    /// Partial total energy α_kρ_kE_k from the partial density and the
    /// material pressure p_k.
    pub fn partial_total_energy(&self, arho: f64, u: f64, v: f64, w: f64, p: f64, alpha: f64) -> f64 {
        alpha * (p + self.pstiff) / (self.gamma - 1.0)
            + 0.5 * arho * (u * u + v * v + w * w)
            + alpha * self.pstiff
    }

    /// Material sound speed from partial quantities, sqrt(γ(α_kp_k + α_kp_c)/(α_kρ_k)).
    #[inline]
    pub fn partial_sound_speed(&self, arho: f64, ap: f64, alpha: f64) -> f64 {
        (self.gamma * (ap + alpha * self.pstiff) / arho).sqrt()
    }

    /// Temperature from conserved variables.
    pub fn temperature(&self, rho: f64, rhou: f64, rhov: f64, rhow: f64, rhoe: f64) -> f64 {
        let ke = 0.5 * (rhou * rhou + rhov * rhov + rhow * rhow) / rho;
        (rhoe - ke - self.pstiff) / (rho * self.cv)
    }
}

impl EquationOfState for StiffenedGas {
    #[inline]
    fn pressure(&self, rho: f64, rhou: f64, rhov: f64, rhow: f64, rhoe: f64) -> f64 {
        let ke = 0.5 * (rhou * rhou + rhov * rhov + rhow * rhow) / rho;
        (self.gamma - 1.0) * (rhoe - ke - self.pstiff) - self.pstiff
    }

    #[inline]
    fn sound_speed(&self, rho: f64, p: f64) -> f64 {
        (self.gamma * (p + self.pstiff) / rho).sqrt()
    }

    #[inline]
    fn total_energy(&self, rho: f64, u: f64, v: f64, w: f64, p: f64) -> f64 {
        (p + self.pstiff) / (self.gamma - 1.0) + 0.5 * rho * (u * u + v * v + w * w) + self.pstiff
    }

    #[inline]
    fn density(&self, p: f64, temperature: f64) -> f64 {
        (p + self.pstiff) / ((self.gamma - 1.0) * self.cv * temperature)
    }
}

/// Material constants of every configured system, selected by
/// `(system, material)`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EosTable {
    systems: Vec<Vec<StiffenedGas>>,
}

impl EosTable {
    pub fn new(systems: Vec<Vec<StiffenedGas>>) -> Self {
        Self { systems }
    }

    /// Append a system and return its index.
    pub fn push_system(&mut self, materials: Vec<StiffenedGas>) -> usize {
        self.systems.push(materials);
        self.systems.len() - 1
    }

    pub fn n_systems(&self) -> usize {
        self.systems.len()
    }

    /// All materials of a system.
    pub fn materials(&self, system: usize) -> Option<&[StiffenedGas]> {
        self.systems.get(system).map(Vec::as_slice)
    }

    /// Constants of material `k` of `system`.
    pub fn material(&self, system: usize, k: usize) -> Option<&StiffenedGas> {
        self.systems.get(system).and_then(|m| m.get(k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    #[test]
    fn test_sod_states() {
        let eos = StiffenedGas::ideal(1.4);
        let el = eos.total_energy(1.0, 0.0, 0.0, 0.0, 1.0);
        let er = eos.total_energy(0.125, 0.0, 0.0, 0.0, 0.1);
        assert!((el - 2.5).abs() < TOL, "left ρE = {el}");
        assert!((er - 0.25).abs() < TOL, "right ρE = {er}");
        assert!((eos.pressure(1.0, 0.0, 0.0, 0.0, el) - 1.0).abs() < TOL);
        assert!((eos.pressure(0.125, 0.0, 0.0, 0.0, er) - 0.1).abs() < TOL);
    }

    #[test]
    fn test_stiffened_round_trip() {
        let water = StiffenedGas::new(4.4, 6.0e8, 1000.0);
        let (rho, u, v, w, p) = (1000.0, 3.0, -1.0, 0.5, 1.0e5);
        let rhoe = water.total_energy(rho, u, v, w, p);
        let back = water.pressure(rho, rho * u, rho * v, rho * w, rhoe);
        assert!(((back - p) / p).abs() < 1e-9, "p = {back}");
        let a = water.sound_speed(rho, p);
        assert!(a.is_finite() && a > 0.0);
    }

    #[test]
    fn test_sound_speed_nan_for_vacuum() {
        let eos = StiffenedGas::ideal(1.4);
        assert!(eos.sound_speed(-1.0, 1.0).is_nan());
        assert!(eos.sound_speed(1.0, -1.0).is_nan());
        assert_eq!(eos.sound_speed(1.0, 0.0), 0.0);
    }

    #[test]
    fn test_density_temperature_inverse() {
        let eos = StiffenedGas::new(1.4, 0.0, 717.5);
        let rho = eos.density(1.0e5, 300.0);
        let rhoe = eos.total_energy(rho, 0.0, 0.0, 0.0, 1.0e5);
        let t = eos.temperature(rho, 0.0, 0.0, 0.0, rhoe);
        assert!((t - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_partial_forms_reduce_to_single_material() {
        let eos = StiffenedGas::new(4.4, 6.0e8, 1000.0);
        let (rho, u, p) = (998.0, 2.0, 2.0e5);
        let rhoe = eos.total_energy(rho, u, 0.0, 0.0, p);
        let pe = eos.partial_total_energy(rho, u, 0.0, 0.0, p, 1.0);
        assert!((rhoe - pe).abs() / rhoe < TOL);
        let ap = eos.partial_pressure(0.5 * rho, u, 0.0, 0.0, 0.5 * rhoe, 0.5);
        assert!((ap - 0.5 * p).abs() / p < 1e-9);
    }

    #[test]
    fn test_table_lookup() {
        let table = EosTable::new(vec![
            vec![StiffenedGas::ideal(1.4)],
            vec![StiffenedGas::new(4.4, 6.0e8, 1000.0), StiffenedGas::ideal(1.4)],
        ]);
        assert_eq!(table.n_systems(), 2);
        assert_eq!(table.material(1, 0).map(|m| m.gamma), Some(4.4));
        assert!(table.material(0, 1).is_none());
        assert!(table.material(2, 0).is_none());
    }
}
