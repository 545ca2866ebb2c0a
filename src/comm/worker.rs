//! Partition workers advancing an edge-based CG system together.
//!
//! A worker owns one mesh partition, its [`CgTransport`] system and its end
//! of the halo. Construction completes the partition-local geometry with
//! the contributions of neighbours:
//!
//! | quantity                 | completion |
//! |--------------------------|------------|
//! | nodal volumes            | summed over partitions |
//! | dual-face normals        | summed over partitions holding the edge |
//! | symmetry area vectors    | summed, then normalised |
//! | Dirichlet node flags     | union over partitions |
//!
//! Edges held by a lower-ranked neighbour are left to that neighbour. Every
//! right-hand-side evaluation then sums nodal partials twice per stage:
//! once for the gradients and once for the right-hand side itself.

use std::collections::{BTreeMap, HashSet};

use super::{HaloExchange, NodeCommMap};
use crate::mesh::{MeshPartition, edge_key};
use crate::boundary::{normalize_normals, symmetry_area_vectors};
use crate::operators::Vec3;
use crate::solver::diagnostics::{DiagnosticsRecord, NodeDiagnostics, finalize, merge_diagnostics};
use crate::solver::{CgTransport, DiagnosticsHistory, Fields, SolverError, divide_by_nodal_volume};
use crate::time::try_ssp_rk3_step_timed;

/// One partition of a distributed CG run.
#[derive(Debug)]
pub struct PartitionWorker {
    part: MeshPartition,
    sys: CgTransport,
    comm: NodeCommMap,
    halo: HaloExchange,
    owned: Vec<bool>,
}

/// State of a partition after [`PartitionWorker::run`].
#[derive(Clone, Debug)]
pub struct PartitionOutcome {
    pub rank: usize,
    pub part: MeshPartition,
    pub u: Fields,
    pub t: f64,
    pub history: DiagnosticsHistory,
}

impl PartitionWorker {
    /// Complete the shared geometry of the partition.
    ///
    /// Collective: every worker of the group must be constructed
    /// concurrently.
    pub fn new(
        mut part: MeshPartition,
        mut sys: CgTransport,
        comm: NodeCommMap,
        mut halo: HaloExchange,
    ) -> Result<Self, SolverError> {
        if comm.rank() != halo.rank() {
            return Err(SolverError::Halo(format!(
                "node map of rank {} paired with halo of rank {}",
                comm.rank(),
                halo.rank()
            )));
        }
        let npoin = part.n_nodes();
        let gid = part.mesh.gid().to_vec();

        // nodal volumes
        let mut vol = Fields::from_vec(npoin, 1, part.geometry.nodal_volume.clone());
        halo.exchange_sum(&comm, &part.mesh, &mut vol)?;
        part.geometry.nodal_volume = vol.as_slice().to_vec();

        // dual normals, and the edges a lower rank takes care of
        let own_normals = part.geometry.dual_normals().clone();
        let received = halo.exchange_edges(&comm, &own_normals)?;
        let mut foreign = HashSet::new();
        for (&n, edges) in &received {
            part.geometry.merge_dual_normals(edges);
            if n < comm.rank() {
                for key in edges.keys() {
                    if let (Some(p), Some(q)) = (part.mesh.lid(key[0]), part.mesh.lid(key[1])) {
                        foreign.insert(edge_key(p, q));
                    }
                }
            }
        }
        log::debug!(
            "rank {}: {} of {} edges held by lower ranks",
            comm.rank(),
            foreign.len(),
            part.adjacency.edges.len()
        );
        sys.set_foreign_edges(foreign);

        // symmetry normals
        let mut area = Fields::new(npoin, 3);
        for (p, v) in symmetry_area_vectors(&part.faces, &part.geometry, sys.bcs()) {
            area.row_mut(p).copy_from_slice(&v);
        }
        halo.exchange_sum(&comm, &part.mesh, &mut area)?;
        let vectors: BTreeMap<usize, Vec3> = (0..npoin)
            .map(|p| (p, std::array::from_fn(|i| area.get(p, i, 0))))
            .collect();
        sys.set_symmetry_normals(&part, &normalize_normals(vectors));

        // Dirichlet nodes
        let mut flags = Fields::new(npoin, 1);
        for &p in sys.dirichlet_nodes() {
            flags.set(p, 0, 0, 1.0);
        }
        halo.exchange_sum(&comm, &part.mesh, &mut flags)?;
        sys.set_dirichlet_nodes((0..npoin).filter(|&p| flags.get(p, 0, 0) > 0.0).collect());

        let owned = comm.ownership_mask(&part.mesh);
        log::info!(
            "rank {}: {} nodes ({} owned), {} global ids from {} to {}",
            comm.rank(),
            npoin,
            owned.iter().filter(|&&o| o).count(),
            gid.len(),
            gid.iter().min().copied().unwrap_or(0),
            gid.iter().max().copied().unwrap_or(0)
        );
        Ok(Self {
            part,
            sys,
            comm,
            halo,
            owned,
        })
    }

    pub fn rank(&self) -> usize {
        self.comm.rank()
    }

    pub fn partition(&self) -> &MeshPartition {
        &self.part
    }

    pub fn system(&self) -> &CgTransport {
        &self.sys
    }

    /// Local nodes counted by this partition.
    pub fn owned(&self) -> &[bool] {
        &self.owned
    }

    /// Global stable time step.
    pub fn dt(&mut self) -> Result<f64, SolverError> {
        let local = self.sys.dt(&self.part);
        self.halo.reduce_min(local)
    }

    /// Complete du/dt at every local node, in solution layout.
    pub fn dudt(&mut self, t: f64, u: &Fields) -> Result<Fields, SolverError> {
        let volume = &self.part.geometry.nodal_volume;

        let mut grad = self.sys.grad_partial(&self.part, u);
        self.halo.exchange_sum(&self.comm, &self.part.mesh, &mut grad)?;
        divide_by_nodal_volume(volume, &mut grad);

        let mut rhs = Fields::new(self.part.n_nodes(), self.sys.ncomp());
        self.sys.rhs_partial(&self.part, t, u, &grad, &mut rhs);
        self.halo.exchange_sum(&self.comm, &self.part.mesh, &mut rhs)?;
        divide_by_nodal_volume(volume, &mut rhs);

        Ok(self.sys.to_solution_layout(&rhs, u.nprop()))
    }

    /// One SSP-RK3 step followed by the Dirichlet overwrite.
    pub fn step(&mut self, t: f64, dt: f64, u: &mut Fields) -> Result<(), SolverError> {
        let u_old = u.clone();
        try_ssp_rk3_step_timed(u, |v, ts| self.dudt(ts, v), t, dt)?;
        self.sys.apply_dirichlet(&self.part, t, dt, &u_old, u);
        Ok(())
    }

    /// Global diagnostics after step `it`, if sampled.
    ///
    /// Collective: the decision only depends on `it`, so all workers take
    /// the same branch.
    pub fn diagnostics(
        &mut self,
        diag: &NodeDiagnostics,
        u: &Fields,
        it: u64,
        t: f64,
        dt: f64,
    ) -> Result<Option<DiagnosticsRecord>, SolverError> {
        let Some(local) = diag.compute(&self.sys, &self.part, u, &self.owned, it, t, dt) else {
            return Ok(None);
        };
        let volume = self.halo.reduce_sum(self.part.geometry.total_volume())?;
        let tables = self.halo.all_gather_table(local)?;
        let mut merged = tables[0].clone();
        for table in &tables[1..] {
            merge_diagnostics(&mut merged, table);
        }
        Ok(Some(finalize(&merged, volume)))
    }

    /// Advance `nsteps` steps from `t0` with the global stable time step.
    pub fn run(
        mut self,
        mut u: Fields,
        t0: f64,
        nsteps: u64,
        diag: NodeDiagnostics,
    ) -> Result<PartitionOutcome, SolverError> {
        let mut t = t0;
        let mut history = DiagnosticsHistory::default();
        for it in 0..nsteps {
            let dt = self.dt()?;
            if !dt.is_finite() {
                return Err(SolverError::Halo(format!(
                    "rank {}: no finite time step at t = {t}",
                    self.rank()
                )));
            }
            self.step(t, dt, &mut u)?;
            if let Some(record) = self.diagnostics(&diag, &u, it, t, dt)? {
                if self.rank() == 0 {
                    history.push(record);
                }
            }
            t += dt;
        }
        Ok(PartitionOutcome {
            rank: self.rank(),
            part: self.part,
            u,
            t,
            history,
        })
    }
}

/// Run a CG system on every partition, one thread per partition.
///
/// `parts[r]` is paired with `systems[r]`. Each solution starts from the
/// problem's solution at `t0`.
pub fn run_partitioned(
    parts: Vec<MeshPartition>,
    systems: Vec<CgTransport>,
    t0: f64,
    nsteps: u64,
    diag: NodeDiagnostics,
) -> Result<Vec<PartitionOutcome>, SolverError> {
    assert_eq!(parts.len(), systems.len(), "one system per partition required");
    let meshes: Vec<_> = parts.iter().map(|p| &p.mesh).collect();
    let maps = NodeCommMap::build(&meshes);
    let halos = HaloExchange::mesh(parts.len());

    let results: Vec<Result<PartitionOutcome, SolverError>> = std::thread::scope(|s| {
        let handles: Vec<_> = parts
            .into_iter()
            .zip(systems)
            .zip(maps)
            .zip(halos)
            .map(|(((part, sys), comm), halo)| {
                s.spawn(move || {
                    let u = sys.initial_solution(&part, t0);
                    PartitionWorker::new(part, sys, comm, halo)?.run(u, t0, nsteps, diag)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| {
                h.join()
                    .unwrap_or_else(|_| Err(SolverError::Halo("partition worker panicked".to_string())))
            })
            .collect()
    });
    results.into_iter().collect()
}
