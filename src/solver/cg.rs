//! Edge-based continuous Galerkin scalar transport.
//!
//! Nodes carry the unknowns and own the median-dual control volumes. The
//! semi-discrete system at node p is
//!
//! V_p du_p/dt = -Σ_q F_pq - Σ_tri B_p + Σ_e D_p
//!
//! with
//!
//! | term   | expression |
//! |--------|------------|
//! | F_pq   | ½ (v·D_pq)(u_L + u_R) - ½ \|v·D_pq\| (u_R - u_L), MUSCL edge states |
//! | B_p    | A/12 (2u_p + u_b + u_c) v_p·n on side-set triangles |
//! | D_p    | -κ \|K\| ∇N_p·∇u_e (Galerkin diffusion) |
//!
//! where D_pq is the dual-face normal of edge p-q oriented from p to q. For
//! a uniform state the edge sums telescope against the boundary terms, so
//! free streams are preserved exactly.
//!
//! Every term is a sum of per-element, per-edge or per-triangle parts. A
//! partition computes its own parts ([`CgTransport::rhs_partial`]); the
//! partial sums of shared nodes are added across partitions before the
//! division by the nodal volume. Edges shared with a lower-numbered
//! partition are marked foreign and skipped so each edge flux is counted
//! once.

use std::collections::{BTreeMap, HashSet};

use super::Fields;
use super::error::SolverError;
use super::reconstruction::muscl;
use crate::boundary::{BcKind, SideSetBcs, apply_symmetry, dirbc, symmetry_normals};
use crate::config::{BcConfig, DiscretizationConfig, check_transport};
use crate::equations::Transport;
use crate::mesh::{Edge, MeshPartition};
use crate::operators::{Vec3, dot, shape_gradients, triangle_area, triangle_normal};
use crate::problem::{Problem, SystemParams};
use crate::registry::PdeKind;
use crate::time::{diffusion_dt, element_length, min_dt, ssp_rk3_step_timed};

/// A CG transport system on one mesh partition.
#[derive(Clone, Debug)]
pub struct CgTransport {
    params: Transport,
    problem: Problem,
    offset: usize,
    cfl: f64,
    realizability: bool,
    bcs: SideSetBcs,
    /// Prescribed velocity, columns `3c..3c+3` for component `c`
    velocity: Fields,
    dirichlet: Vec<usize>,
    foreign_edges: HashSet<Edge>,
}

impl CgTransport {
    pub fn new(
        params: Transport,
        problem: Problem,
        bc: &BcConfig,
        disc: &DiscretizationConfig,
        part: &MeshPartition,
    ) -> Result<Self, SolverError> {
        let system = format!("{:?}", PdeKind::TransportCg);
        disc.validate()?;
        check_transport(&system, &params, &problem)?;
        bc.validate(&system)?;
        let bcs = SideSetBcs::new(bc, &part.mesh, &part.faces);
        let normals = symmetry_normals(&part.faces, &part.geometry, &bcs);
        log::info!(
            "{} transporting {} scalars on {} nodes, {} edges",
            problem.name(),
            params.ncomp,
            part.n_nodes(),
            part.adjacency.edges.len()
        );

        let mut sys = Self {
            dirichlet: bcs.nodes(BcKind::Dirichlet).to_vec(),
            velocity: Fields::new(part.n_nodes(), 3 * params.ncomp),
            params,
            problem,
            offset: 0,
            cfl: disc.cfl,
            realizability: disc.realizability,
            bcs,
            foreign_edges: HashSet::new(),
        };
        sys.set_symmetry_normals(part, &normals);
        Ok(sys)
    }

    /// Place the system at column `offset` of a shared solution buffer.
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn ncomp(&self) -> usize {
        self.params.ncomp
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn params(&self) -> &Transport {
        &self.params
    }

    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    pub fn bcs(&self) -> &SideSetBcs {
        &self.bcs
    }

    fn sys(&self) -> SystemParams<'_> {
        SystemParams::Transport(&self.params)
    }

    /// Velocity of component `c` at node `p`.
    pub fn velocity(&self, p: usize, c: usize) -> Vec3 {
        std::array::from_fn(|j| self.velocity.get(p, 3 * c + j, 0))
    }

    /// Re-evaluate the prescribed velocity and remove its normal component
    /// at the given symmetry nodes.
    pub fn set_symmetry_normals(&mut self, part: &MeshPartition, normals: &BTreeMap<usize, Vec3>) {
        let sys = SystemParams::Transport(&self.params);
        for p in 0..part.n_nodes() {
            let x = part.mesh.point(p);
            for c in 0..self.params.ncomp {
                let v = self.problem.prescribed_velocity(sys, x, c);
                for (j, vj) in v.iter().enumerate() {
                    self.velocity.set(p, 3 * c + j, 0, *vj);
                }
            }
        }
        for c in 0..self.params.ncomp {
            apply_symmetry(normals, &mut self.velocity, [3 * c, 3 * c + 1, 3 * c + 2]);
        }
    }

    /// Nodes whose values are prescribed by the problem's solution.
    pub fn dirichlet_nodes(&self) -> &[usize] {
        &self.dirichlet
    }

    pub fn set_dirichlet_nodes(&mut self, mut nodes: Vec<usize>) {
        nodes.sort_unstable();
        nodes.dedup();
        self.dirichlet = nodes;
    }

    /// Skip the fluxes of these (local, sorted) edges.
    pub fn set_foreign_edges(&mut self, edges: HashSet<Edge>) {
        self.foreign_edges = edges;
    }

    /// Set the problem's solution at time `t`.
    pub fn initialize(&self, part: &MeshPartition, t: f64, u: &mut Fields) {
        for p in 0..part.n_nodes() {
            let s = self.problem.solution(self.sys(), part.mesh.point(p), t);
            for (c, v) in s.iter().enumerate() {
                u.set(p, c, self.offset, *v);
            }
        }
    }

    /// Freshly allocated solution holding only this system.
    pub fn initial_solution(&self, part: &MeshPartition, t: f64) -> Fields {
        let mut u = Fields::new(part.n_nodes(), self.offset + self.ncomp());
        self.initialize(part, t, &mut u);
        u
    }

    /// Partition's share of the lumped nodal gradients, Σ_e |K|/4 ∇u_e.
    pub fn grad_partial(&self, part: &MeshPartition, u: &Fields) -> Fields {
        let ncomp = self.ncomp();
        let mut g = Fields::new(part.n_nodes(), 3 * ncomp);
        for e in 0..part.n_elements() {
            let n = part.mesh.element_nodes(e);
            let (grad, j) = shape_gradients(&part.mesh.element_coords(e));
            let w = j / 24.0;
            for c in 0..ncomp {
                let ge: Vec3 = std::array::from_fn(|i| {
                    (0..4).map(|b| grad[b][i] * u.get(n[b], c, self.offset)).sum()
                });
                for &p in &n {
                    for i in 0..3 {
                        *g.get_mut(p, 3 * c + i, 0) += w * ge[i];
                    }
                }
            }
        }
        g
    }

    /// Nodal gradients on a serial mesh.
    pub fn nodal_gradients(&self, part: &MeshPartition, u: &Fields) -> Fields {
        let mut g = self.grad_partial(part, u);
        divide_by_nodal_volume(&part.geometry.nodal_volume, &mut g);
        g
    }

    /// Partition's share of `V_p du_p/dt`.
    ///
    /// `grad` must hold the complete nodal gradients. `rhs` has one column
    /// per component. Prescribed velocities are steady, so the time is
    /// unused.
    pub fn rhs_partial(&self, part: &MeshPartition, _t: f64, u: &Fields, grad: &Fields, rhs: &mut Fields) {
        let ncomp = self.ncomp();
        let npoin = part.n_nodes();
        assert_eq!(u.nunk(), npoin, "solution must have one row per node");
        assert_eq!(grad.nprop(), 3 * ncomp, "gradient width mismatch");
        assert_eq!(rhs.nprop(), ncomp, "rhs width mismatch");
        rhs.fill(0.0);

        let gid = part.mesh.gid();
        let grad_of = |p: usize| -> Vec<Vec3> {
            (0..ncomp)
                .map(|c| std::array::from_fn(|i| grad.get(p, 3 * c + i, 0)))
                .collect()
        };

        // domain-edge integral
        let mut ul = vec![0.0; ncomp];
        let mut ur = vec![0.0; ncomp];
        for &[p, q] in &part.adjacency.edges {
            if self.foreign_edges.contains(&[p, q]) {
                continue;
            }
            let Some(d) = part.geometry.dual_normal(gid[p], gid[q]) else {
                continue;
            };
            for c in 0..ncomp {
                ul[c] = u.get(p, c, self.offset);
                ur[c] = u.get(q, c, self.offset);
            }
            muscl(
                part.mesh.point(p),
                part.mesh.point(q),
                &grad_of(p),
                &grad_of(q),
                &mut ul,
                &mut ur,
                self.realizability,
            );
            for c in 0..ncomp {
                let (vp, vq) = (self.velocity(p, c), self.velocity(q, c));
                let v: Vec3 = std::array::from_fn(|i| 0.5 * (vp[i] + vq[i]));
                let vn = dot(v, d);
                let f = 0.5 * vn * (ul[c] + ur[c]) - 0.5 * vn.abs() * (ur[c] - ul[c]);
                *rhs.get_mut(p, c, 0) -= f;
                *rhs.get_mut(q, c, 0) += f;
            }
        }

        // boundary integral
        for tri in part.faces.side_set_triangles() {
            let pts = tri.map(|p| part.mesh.point(p));
            let area = triangle_area(&pts);
            let n = triangle_normal(&pts);
            for a in 0..3 {
                let (p, b, c2) = (tri[a], tri[(a + 1) % 3], tri[(a + 2) % 3]);
                for c in 0..ncomp {
                    let s = 2.0 * u.get(p, c, self.offset) + u.get(b, c, self.offset) + u.get(c2, c, self.offset);
                    *rhs.get_mut(p, c, 0) -= area / 12.0 * s * dot(self.velocity(p, c), n);
                }
            }
        }

        // diffusion
        if self.params.max_diffusivity() > 0.0 {
            for e in 0..part.n_elements() {
                let n = part.mesh.element_nodes(e);
                let (grad, j) = shape_gradients(&part.mesh.element_coords(e));
                let vol = j / 6.0;
                for c in 0..ncomp {
                    let k = self.params.diffusivity(c);
                    if k <= 0.0 {
                        continue;
                    }
                    let ge: Vec3 = std::array::from_fn(|i| {
                        (0..4).map(|b| grad[b][i] * u.get(n[b], c, self.offset)).sum()
                    });
                    for a in 0..4 {
                        *rhs.get_mut(n[a], c, 0) -= k * vol * dot(grad[a], ge);
                    }
                }
            }
        }
    }

    /// du/dt on a serial mesh, in solution layout.
    pub fn dudt(&self, part: &MeshPartition, t: f64, u: &Fields) -> Fields {
        let grad = self.nodal_gradients(part, u);
        let mut rhs = Fields::new(part.n_nodes(), self.ncomp());
        self.rhs_partial(part, t, u, &grad, &mut rhs);
        divide_by_nodal_volume(&part.geometry.nodal_volume, &mut rhs);
        self.to_solution_layout(&rhs, u.nprop())
    }

    /// Copy an `npoin × ncomp` buffer into columns `offset..` of a buffer
    /// `nprop` wide.
    pub fn to_solution_layout(&self, rhs: &Fields, nprop: usize) -> Fields {
        let mut out = Fields::new(rhs.nunk(), nprop);
        for p in 0..rhs.nunk() {
            for c in 0..self.ncomp() {
                out.set(p, c, self.offset, rhs.get(p, c, 0));
            }
        }
        out
    }

    /// Overwrite Dirichlet nodes of `u` with `u_old` plus the solution
    /// increment over `[t, t + dt]`.
    pub fn apply_dirichlet(&self, part: &MeshPartition, t: f64, dt: f64, u_old: &Fields, u: &mut Fields) {
        for (p, inc) in dirbc(&self.problem, self.sys(), &self.dirichlet, &part.mesh, t, dt) {
            for (c, (set, d)) in inc.into_iter().enumerate() {
                if set {
                    u.set(p, c, self.offset, u_old.get(p, c, self.offset) + d);
                }
            }
        }
    }

    /// Stable time step from advection and diffusion limits.
    pub fn dt(&self, part: &MeshPartition) -> f64 {
        let ncomp = self.ncomp();
        let dmax = self.params.max_diffusivity();
        let mut diffusion = f64::INFINITY;
        let pairs: Vec<(f64, f64)> = part
            .geometry
            .elements
            .iter()
            .enumerate()
            .map(|(e, g)| {
                let l = element_length(g.volume);
                diffusion = diffusion.min(diffusion_dt(l, dmax));
                let speed = part
                    .mesh
                    .element_nodes(e)
                    .iter()
                    .flat_map(|&p| (0..ncomp).map(move |c| (p, c)))
                    .map(|(p, c)| {
                        let v = self.velocity(p, c);
                        dot(v, v).sqrt()
                    })
                    .fold(0.0, f64::max);
                (l, speed)
            })
            .collect();
        min_dt(pairs, self.cfl).min(self.cfl * diffusion)
    }

    /// Advance `u` by one SSP-RK3 step on a serial mesh.
    pub fn step(&self, part: &MeshPartition, t: f64, dt: f64, u: &mut Fields) {
        let u_old = u.clone();
        ssp_rk3_step_timed(u, |v, ts| self.dudt(part, ts, v), t, dt);
        self.apply_dirichlet(part, t, dt, &u_old, u);
    }

    /// Σ_p V_p u_p of component `c`.
    pub fn integral(&self, part: &MeshPartition, u: &Fields, c: usize) -> f64 {
        part.geometry
            .nodal_volume
            .iter()
            .enumerate()
            .map(|(p, v)| v * u.get(p, c, self.offset))
            .sum()
    }

    pub fn field_names(&self) -> Vec<String> {
        self.problem.field_names(self.sys())
    }

    /// Output fields at mesh nodes.
    pub fn field_output(&self, part: &MeshPartition, u: &Fields, t: f64) -> Vec<Vec<f64>> {
        let states: Vec<Vec<f64>> = (0..part.n_nodes())
            .map(|p| (0..self.ncomp()).map(|c| u.get(p, c, self.offset)).collect())
            .collect();
        let points: Vec<Vec3> = (0..part.n_nodes()).map(|p| part.mesh.point(p)).collect();
        self.problem.field_output(self.sys(), &states, &points, t)
    }
}

/// Divide every row of `f` by the volume of its node.
pub fn divide_by_nodal_volume(volume: &[f64], f: &mut Fields) {
    assert_eq!(volume.len(), f.nunk(), "one volume per node required");
    for (p, v) in volume.iter().enumerate() {
        for x in f.row_mut(p) {
            *x /= v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use crate::mesh::TetMesh;
    use crate::problem::ShearDiffParams;

    const TOL: f64 = 1e-10;

    fn cube(n: usize) -> MeshPartition {
        let mesh = TetMesh::structured_box([n, n, n], [0.0; 3], [1.0; 3]).unwrap();
        MeshPartition::new(mesh).unwrap()
    }

    fn shear(u0: f64, lambda: f64, d: f64) -> (Transport, Problem) {
        let params = Transport::new(1)
            .with_u0(vec![u0])
            .with_lambda(vec![lambda])
            .with_diffusivity(vec![d]);
        let problem = Problem::ShearDiff(ShearDiffParams { x0: 0.25, t_ref: 1.0 });
        (params, problem)
    }

    fn system(part: &MeshPartition, params: Transport, problem: Problem, bc: &BcConfig) -> CgTransport {
        let disc = DiscretizationConfig::default().with_cfl(0.5);
        CgTransport::new(params, problem, bc, &disc, part).unwrap()
    }

    #[test]
    fn test_free_stream_is_preserved() {
        let part = cube(3);
        let (params, problem) = shear(0.7, 0.0, 0.0);
        let sys = system(&part, params, problem, &BcConfig::default());
        let mut u = Fields::new(part.n_nodes(), 1);
        u.fill(2.5);
        let d = sys.dudt(&part, 1.0, &u);
        for p in 0..part.n_nodes() {
            assert!(d.get(p, 0, 0).abs() < TOL, "node {p}: {}", d.get(p, 0, 0));
        }
    }

    #[test]
    fn test_linear_field_advects_exactly_inside() {
        let part = cube(3);
        let (params, problem) = shear(1.0, 0.0, 0.0);
        let sys = system(&part, params, problem, &BcConfig::default());
        let mut u = Fields::new(part.n_nodes(), 1);
        for p in 0..part.n_nodes() {
            u.set(p, 0, 0, part.mesh.point(p)[0]);
        }
        let g = sys.nodal_gradients(&part, &u);
        let d = sys.dudt(&part, 1.0, &u);
        for p in 0..part.n_nodes() {
            assert!((g.get(p, 0, 0) - 1.0).abs() < TOL);
            let x = part.mesh.point(p);
            if x.iter().all(|&xi| xi > 1e-12 && xi < 1.0 - 1e-12) {
                assert!((d.get(p, 0, 0) + 1.0).abs() < TOL, "node {p}: {}", d.get(p, 0, 0));
            }
        }
    }

    #[test]
    fn test_diffusion_of_quadratic_inside() {
        // u = x², D = 0.5, no advection: du/dt = D ∂²u/∂x² = 1
        let part = cube(4);
        let (params, problem) = shear(0.0, 0.0, 0.5);
        let sys = system(&part, params, problem, &BcConfig::default());
        let mut u = Fields::new(part.n_nodes(), 1);
        for p in 0..part.n_nodes() {
            u.set(p, 0, 0, part.mesh.point(p)[0].powi(2));
        }
        let d = sys.dudt(&part, 1.0, &u);
        for p in 0..part.n_nodes() {
            let x = part.mesh.point(p);
            if x.iter().all(|&xi| xi > 1e-12 && xi < 1.0 - 1e-12) {
                assert!((d.get(p, 0, 0) - 1.0).abs() < 1e-8, "node {p}: {}", d.get(p, 0, 0));
            }
        }
    }

    #[test]
    fn test_dirichlet_nodes_follow_solution() {
        let part = cube(3);
        let (params, problem) = shear(0.5, 0.2, 0.05);
        let bc = BcConfig::default().with_dirichlet(vec![1, 2, 3, 4, 5, 6]);
        let sys = system(&part, params, problem, &bc);
        let mut u = sys.initial_solution(&part, 1.0);
        let dt = sys.dt(&part);
        assert!(dt.is_finite() && dt > 0.0);
        sys.step(&part, 1.0, dt, &mut u);

        let exact = sys.initial_solution(&part, 1.0 + dt);
        assert!(!sys.dirichlet_nodes().is_empty());
        for &p in sys.dirichlet_nodes() {
            assert!((u.get(p, 0, 0) - exact.get(p, 0, 0)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_symmetry_removes_normal_velocity() {
        let part = cube(2);
        let (params, problem) = shear(1.0, 0.0, 0.0);
        let bc = BcConfig::default().with_symmetry(vec![1, 2]);
        let sys = system(&part, params, problem, &bc);
        assert_eq!(sys.bcs().nodes(BcKind::Symmetry).len(), 18);
        for &p in sys.bcs().nodes(BcKind::Symmetry) {
            let v = sys.velocity(p, 0);
            assert!(v[0].abs() < 1e-14, "node {p}: {v:?}");
        }
        // interior nodes keep the prescribed velocity
        let centre = (0..part.n_nodes())
            .find(|&p| part.mesh.point(p) == [0.5, 0.5, 0.5])
            .unwrap();
        assert_eq!(sys.velocity(centre, 0), [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_dt_without_motion_is_unbounded() {
        let part = cube(1);
        let (params, problem) = shear(0.0, 0.0, 0.0);
        let sys = system(&part, params, problem, &BcConfig::default());
        assert_eq!(sys.dt(&part), f64::INFINITY);
    }

    #[test]
    fn test_mismatched_coefficients_are_rejected() {
        let part = cube(1);
        let params = Transport::new(2)
            .with_u0(vec![0.1, 0.2])
            .with_lambda(vec![0.0])
            .with_diffusivity(vec![0.1, 0.1, 0.1]);
        let problem = Problem::ShearDiff(ShearDiffParams::default());
        let disc = DiscretizationConfig::default();
        let err = CgTransport::new(params, problem, &BcConfig::default(), &disc, &part);
        assert!(matches!(
            err,
            Err(SolverError::Config(ConfigError::ComponentCountMismatch {
                parameter: "lambda",
                expected: 2,
                found: 1,
                ..
            }))
        ));

        let (params, problem) = shear(0.1, 0.0, -1.0);
        let err = CgTransport::new(params, problem, &BcConfig::default(), &disc, &part);
        assert!(matches!(err, Err(SolverError::Config(ConfigError::InvalidParameter { name: "diffusivity", .. }))));
    }
}
