//! What to do when a stage produces a non-physical state.
//!
//! After every step the cell averages are checked for negative density or
//! pressure and for volume fractions outside [0, 1]. Interior states are
//! never clamped; the policy only decides whether a violation is ignored,
//! logged and counted, or turned into an error.

use serde::{Deserialize, Serialize};

use super::{Fields, SolverError};
use crate::equations::{ConservationLaw, NonPhysical};
use crate::types::ElementIndex;

/// Handling of non-physical states.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NonPhysicalPolicy {
    /// Skip the check
    Ignore,
    /// Log each offending element at `warn!` and count it
    #[default]
    Report,
    /// Stop at the first offending element
    Abort,
}

/// Outcome of a state check.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StateReport {
    /// Elements inspected
    pub checked: usize,
    /// Elements with at least one violation
    pub violations: usize,
    /// First offending element and what was wrong with it
    pub first: Option<(ElementIndex, NonPhysical)>,
}

impl StateReport {
    pub fn is_clean(&self) -> bool {
        self.violations == 0
    }

    /// Combine with the report of another system or partition.
    pub fn merge(&mut self, other: StateReport) {
        self.checked += other.checked;
        self.violations += other.violations;
        if self.first.is_none() {
            self.first = other.first;
        }
    }
}

/// Check the cell averages of one system.
///
/// `u` stores component `c`, mode `k` of element `e` at column
/// `offset + c * rdof + k`.
pub fn check_physical_states<L: ConservationLaw + ?Sized>(
    law: &L,
    u: &Fields,
    offset: usize,
    rdof: usize,
    policy: NonPhysicalPolicy,
) -> Result<StateReport, SolverError> {
    let mut report = StateReport::default();
    if policy == NonPhysicalPolicy::Ignore {
        return Ok(report);
    }

    let ncomp = law.ncomp();
    let mut avg = vec![0.0; ncomp];
    for e in 0..u.nunk() {
        for (c, a) in avg.iter_mut().enumerate() {
            *a = u.get(e, c * rdof, offset);
        }
        report.checked += 1;
        let Some(bad) = law.first_non_physical(&avg) else {
            continue;
        };
        let element = ElementIndex::new(e);
        if policy == NonPhysicalPolicy::Abort {
            return Err(SolverError::NonPhysicalState {
                element,
                quantity: bad.quantity,
                component: bad.component,
                value: bad.value,
            });
        }
        log::warn!(
            "non-physical {} {:e} in component {} of element {element}",
            bad.quantity,
            bad.value,
            bad.component
        );
        report.violations += 1;
        report.first.get_or_insert((element, bad));
    }
    Ok(report)
}
