//! Error norms of a solution against the problem's analytic solution.
//!
//! Every partition fills a `NUMDIAG × ncomp` table of partial sums over the
//! unknowns it owns:
//!
//! | row       | partial value        | merge | finalised |
//! |-----------|----------------------|-------|-----------|
//! | `L2SOL`   | Σ w u²               | sum   | √(Σ / V)  |
//! | `L2ERR`   | Σ w (u - a)²         | sum   | √(Σ / V)  |
//! | `LINFERR` | max \|u - a\|        | max   | as is     |
//! | `ITER`    | iteration count      | copy  | as is     |
//! | `TIME`    | physical time        | copy  | as is     |
//! | `DT`      | time step            | copy  | as is     |
//!
//! with the weight `w` of an unknown (nodal or element volume), the
//! analytic value `a` and the total domain volume `V`. Metadata rows are
//! only filled in their first column.
//!
//! # Example
//!
//! ```ignore
//! use inciter::solver::{NodeDiagnostics, DiagnosticsHistory};
//!
//! let diag = NodeDiagnostics::new(10);
//! let mut history = DiagnosticsHistory::default();
//! // ... time loop ...
//! if let Some(local) = diag.compute(&sys, &part, &u, &owned, it, t, dt) {
//!     history.push(finalize(&local, part.geometry.total_volume()));
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::equations::ConservationLaw;
use crate::mesh::MeshPartition;
use crate::problem::SystemParams;
use crate::solver::{CgTransport, DgSystem, Fields};

pub const L2SOL: usize = 0;
pub const L2ERR: usize = 1;
pub const LINFERR: usize = 2;
pub const ITER: usize = 3;
pub const TIME: usize = 4;
pub const DT: usize = 5;
/// Number of diagnostic rows.
pub const NUMDIAG: usize = 6;

/// Iteration, time and time step written into the metadata rows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DiagnosticsStamp {
    pub it: u64,
    pub t: f64,
    pub dt: f64,
}

/// Larger of two errors; NaN wins so diverged unknowns stay visible.
#[inline]
fn max_error(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() { f64::NAN } else { a.max(b) }
}

/// Partial diagnostics of one partition.
///
/// `analytic(i)` returns the exact solution of unknown `i`, `weights` the
/// volume each unknown stands for. Unknowns with `owned[i] == false` are
/// counted by another partition and skipped.
pub fn compute_local_diagnostics<F>(
    u: &Fields,
    offset: usize,
    ncomp: usize,
    analytic: F,
    weights: &[f64],
    owned: &[bool],
    stamp: DiagnosticsStamp,
) -> Vec<Vec<f64>>
where
    F: Fn(usize) -> Vec<f64>,
{
    assert_eq!(weights.len(), u.nunk(), "one weight per unknown required");
    assert_eq!(owned.len(), u.nunk(), "one ownership flag per unknown required");

    let mut diag = vec![vec![0.0; ncomp]; NUMDIAG];
    for i in (0..u.nunk()).filter(|&i| owned[i]) {
        let a = analytic(i);
        let w = weights[i];
        for c in 0..ncomp {
            let v = u.get(i, c, offset);
            let err = v - a[c];
            diag[L2SOL][c] += v * v * w;
            diag[L2ERR][c] += err * err * w;
            diag[LINFERR][c] = max_error(diag[LINFERR][c], err.abs());
        }
    }
    if ncomp > 0 {
        diag[ITER][0] = stamp.it as f64;
        diag[TIME][0] = stamp.t;
        diag[DT][0] = stamp.dt;
    }
    diag
}

/// Combine the partial diagnostics of another partition into `into`.
pub fn merge_diagnostics(into: &mut [Vec<f64>], other: &[Vec<f64>]) {
    assert_eq!(into.len(), NUMDIAG, "diagnostics table must have NUMDIAG rows");
    assert_eq!(other.len(), NUMDIAG, "diagnostics table must have NUMDIAG rows");
    for row in [L2SOL, L2ERR] {
        for (a, b) in into[row].iter_mut().zip(&other[row]) {
            *a += b;
        }
    }
    for (a, b) in into[LINFERR].iter_mut().zip(&other[LINFERR]) {
        *a = max_error(*a, *b);
    }
}

/// Finalised diagnostics of one iteration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticsRecord {
    pub it: u64,
    pub t: f64,
    pub dt: f64,
    /// Volume-weighted L2 norm of the solution per component
    pub l2_solution: Vec<f64>,
    /// Volume-weighted L2 norm of the error per component
    pub l2_error: Vec<f64>,
    /// Maximum error per component
    pub linf_error: Vec<f64>,
}

impl DiagnosticsRecord {
    /// One line summary for logging.
    pub fn summary_line(&self) -> String {
        let fmt = |v: &[f64]| {
            v.iter()
                .map(|x| format!("{x:.3e}"))
                .collect::<Vec<_>>()
                .join(",")
        };
        format!(
            "it={} t={:.4e} dt={:.3e} L2(u)=[{}] L2(err)=[{}] Linf(err)=[{}]",
            self.it,
            self.t,
            self.dt,
            fmt(&self.l2_solution),
            fmt(&self.l2_error),
            fmt(&self.linf_error)
        )
    }

    /// All norms finite.
    pub fn is_finite(&self) -> bool {
        self.l2_solution
            .iter()
            .chain(&self.l2_error)
            .chain(&self.linf_error)
            .all(|x| x.is_finite())
    }
}

/// Turn merged partial sums into norms.
pub fn finalize(diag: &[Vec<f64>], total_volume: f64) -> DiagnosticsRecord {
    assert_eq!(diag.len(), NUMDIAG, "diagnostics table must have NUMDIAG rows");
    let l2 = |row: &[f64]| -> Vec<f64> {
        row.iter().map(|s| (s / total_volume).sqrt()).collect()
    };
    let meta = |row: usize| diag[row].first().copied().unwrap_or(0.0);
    DiagnosticsRecord {
        it: meta(ITER) as u64,
        t: meta(TIME),
        dt: meta(DT),
        l2_solution: l2(&diag[L2SOL]),
        l2_error: l2(&diag[L2ERR]),
        linf_error: diag[LINFERR].clone(),
    }
}

/// Diagnostics of a nodal (CG) system, every `interval` iterations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeDiagnostics {
    interval: u64,
}

impl NodeDiagnostics {
    pub fn new(interval: u64) -> Self {
        Self {
            interval: interval.max(1),
        }
    }

    pub fn interval(&self) -> u64 {
        self.interval
    }

    /// Whether iteration `it` (zero based, about to complete) is sampled.
    pub fn due(&self, it: u64) -> bool {
        (it + 1) % self.interval == 0
    }

    /// Partial diagnostics of `u` after step `it` from `t` to `t + dt`.
    ///
    /// The analytic solution is evaluated at `t + dt`. Returns `None` for
    /// iterations that are not sampled.
    #[allow(clippy::too_many_arguments)]
    pub fn compute(
        &self,
        sys: &CgTransport,
        part: &MeshPartition,
        u: &Fields,
        owned: &[bool],
        it: u64,
        t: f64,
        dt: f64,
    ) -> Option<Vec<Vec<f64>>> {
        if !self.due(it) {
            return None;
        }
        let params = SystemParams::Transport(sys.params());
        let time = t + dt;
        let stamp = DiagnosticsStamp {
            it: it + 1,
            t: time,
            dt,
        };
        Some(compute_local_diagnostics(
            u,
            sys.offset(),
            sys.ncomp(),
            |p| sys.problem().solution(params, part.mesh.point(p), time),
            &part.geometry.nodal_volume,
            owned,
            stamp,
        ))
    }
}

/// Partial diagnostics of the cell averages of a DG system.
///
/// Elements are never shared between partitions, so all of them count.
pub fn element_diagnostics(
    sys: &DgSystem,
    part: &MeshPartition,
    u: &Fields,
    stamp: DiagnosticsStamp,
) -> Vec<Vec<f64>> {
    let layout = sys.layout();
    let ncomp = sys.physics().ncomp();
    let params = SystemParams::Flow(sys.physics());
    let weights: Vec<f64> = part.geometry.elements.iter().map(|g| g.volume).collect();
    let owned = vec![true; part.n_elements()];

    // averages live in dof 0 of every component
    let mut avg = Fields::new(part.n_elements(), ncomp);
    for e in 0..part.n_elements() {
        for c in 0..ncomp {
            avg.set(e, c, 0, u.get(e, c * layout.rdof, layout.offset));
        }
    }
    compute_local_diagnostics(
        &avg,
        0,
        ncomp,
        |e| {
            sys.problem()
                .solution(params, part.geometry.elements[e].centroid, stamp.t)
        },
        &weights,
        &owned,
        stamp,
    )
}

/// Time series of finalised diagnostics.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DiagnosticsHistory {
    records: Vec<DiagnosticsRecord>,
    max_linf_seen: f64,
}

impl DiagnosticsHistory {
    pub fn push(&mut self, record: DiagnosticsRecord) {
        log::info!("{}", record.summary_line());
        let linf = record.linf_error.iter().copied().fold(0.0, f64::max);
        if linf > self.max_linf_seen {
            self.max_linf_seen = linf;
        }
        self.records.push(record);
    }

    pub fn records(&self) -> &[DiagnosticsRecord] {
        &self.records
    }

    pub fn initial(&self) -> Option<&DiagnosticsRecord> {
        self.records.first()
    }

    pub fn current(&self) -> Option<&DiagnosticsRecord> {
        self.records.last()
    }

    /// Largest pointwise error seen so far.
    pub fn max_linf_seen(&self) -> f64 {
        self.max_linf_seen
    }

    /// Relative change of the L2 solution norm of component `c` between the
    /// first and the latest record.
    pub fn l2_solution_drift(&self, c: usize) -> f64 {
        match (self.initial(), self.current()) {
            (Some(first), Some(last)) => {
                let a = first.l2_solution[c];
                let b = last.l2_solution[c];
                if a.abs() > 1e-14 { (b - a) / a.abs() } else { b - a }
            }
            _ => 0.0,
        }
    }

    /// No record carries NaN or infinite norms.
    pub fn is_stable(&self) -> bool {
        self.records.iter().all(DiagnosticsRecord::is_finite)
    }

    /// Log first and latest records.
    pub fn log_summary(&self) {
        let (Some(first), Some(last)) = (self.initial(), self.current()) else {
            log::info!("no diagnostics recorded");
            return;
        };
        log::info!("=== Diagnostics Summary ===");
        log::info!("records: {}", self.records.len());
        log::info!("first:  {}", first.summary_line());
        log::info!("latest: {}", last.summary_line());
        log::info!("max Linf error seen: {:.3e}", self.max_linf_seen);
    }
}
