//! Discontinuous Galerkin flow systems.
//!
//! [`DgSystem`] owns everything a compressible single- or multi-material
//! system needs to advance on one mesh partition: the physics, the problem,
//! cached boundary side sets, the least-squares matrices of P0P1
//! reconstruction and the diagonal mass matrix.
//!
//! One right-hand-side evaluation runs
//!
//! 1. [`DgSystem::reconstruct`] (P0P1 only): cell-average gradients from
//!    face neighbours or the node-neighbour stencil, converted to P1 dofs
//! 2. [`DgSystem::rhs`]: volume, surface, boundary, source and
//!    non-conservative integrals
//! 3. [`DgSystem::dudt`]: division by the mass matrix
//!
//! and [`DgSystem::step`] advances one SSP-RK3 step, then applies the
//! non-physical state policy.
//!
//! # Example
//! ```
//! use inciter::config::{BcConfig, DiscretizationConfig};
//! use inciter::equations::{CompFlow, Physics, StiffenedGas};
//! use inciter::mesh::{MeshPartition, TetMesh};
//! use inciter::problem::Problem;
//! use inciter::solver::DgSystem;
//!
//! let mesh = TetMesh::structured_box([4, 1, 1], [0.0; 3], [1.0, 0.25, 0.25]).unwrap();
//! let part = MeshPartition::new(mesh).unwrap();
//! let physics = Physics::CompFlow(CompFlow::new(StiffenedGas::ideal(1.4)));
//! let bc = BcConfig::default().with_extrapolate(vec![1, 2]).with_symmetry(vec![3, 4, 5, 6]);
//! let disc = DiscretizationConfig::default().with_cfl(0.5);
//!
//! let sys = DgSystem::new(physics, Problem::SodShocktube, &bc, &disc, &part).unwrap();
//! let mut u = sys.initial_solution(&part, 0.0);
//! let dt = sys.dt(&part, &u);
//! let report = sys.step(&part, 0.0, dt, &mut u).unwrap();
//! assert!(report.is_clean());
//! ```

use super::error::SolverError;
use super::integrate::{
    DgContext, DgLayout, RiemannDerivatives, bnd_surf_int, initialize, mass_lhs,
    non_conservative_int, src_int, surf_int, vol_int,
};
use super::policy::{NonPhysicalPolicy, StateReport, check_physical_states};
use super::reconstruction::{
    LeastSquaresLhs, ReconstructionKind, ReconstructionStats, bnd_least_sq_p0p1,
    int_least_sq_p0p1, least_squares_rhs, reco_least_sq_ext_stencil, solve_least_sq_p0p1,
    transform_p0p1,
};
use super::Fields;
use crate::boundary::{BcContext, FlowBoundary, SideSetBcs};
use crate::config::{BcConfig, DiscretizationConfig, check_flow};
use crate::equations::{ConservationLaw, Physics};
use crate::flux::{RiemannSolver, StandardFlux};
use crate::mesh::MeshPartition;
use crate::operators::Vec3;
use crate::problem::{Problem, SystemParams};
use crate::time::{flow_dt, try_ssp_rk3_step_timed};
use crate::types::FaceIndex;

/// A DG flow system on one mesh partition.
#[derive(Clone, Debug)]
pub struct DgSystem {
    physics: Physics,
    problem: Problem,
    layout: DgLayout,
    flux: StandardFlux,
    reconstruction: ReconstructionKind,
    policy: NonPhysicalPolicy,
    cfl: f64,
    bcs: SideSetBcs,
    ls_lhs: Option<LeastSquaresLhs>,
    lhs: Fields,
    ndofel: Vec<usize>,
    elem_faces: Vec<Vec<FaceIndex>>,
}

impl DgSystem {
    /// Build a system, rejecting invalid materials, dofs, fluxes or problems.
    pub fn new(
        physics: Physics,
        problem: Problem,
        bc: &BcConfig,
        disc: &DiscretizationConfig,
        part: &MeshPartition,
    ) -> Result<Self, SolverError> {
        let system = format!("{:?}", SystemParams::Flow(&physics).kind());
        disc.validate()?;
        check_flow(&system, &problem, &physics, disc.flux)?;
        bc.validate(&system)?;

        let nelem = part.n_elements();
        let layout = DgLayout::new(physics.ncomp(), disc.ndof, disc.rdof);
        let ls_lhs = (disc.reconstructs() && disc.reconstruction == ReconstructionKind::LeastSquares)
            .then(|| LeastSquaresLhs::new(&part.faces, &part.geometry));

        let mut elem_faces = vec![Vec::with_capacity(4); nelem];
        for (f, face) in part.faces.faces().iter().enumerate() {
            elem_faces[face.left.get()].push(FaceIndex::new(f));
            if let Some(r) = face.right {
                elem_faces[r.get()].push(FaceIndex::new(f));
            }
        }

        log::info!(
            "{} on {} elements, {} faces ({} boundary): ndof {}, rdof {}, flux {}",
            problem.name(),
            nelem,
            part.faces.n_faces(),
            part.faces.nbfac(),
            disc.ndof,
            disc.rdof,
            disc.flux.name()
        );

        Ok(Self {
            lhs: mass_lhs(layout, part),
            bcs: SideSetBcs::new(bc, &part.mesh, &part.faces),
            physics,
            problem,
            layout,
            flux: disc.flux,
            reconstruction: disc.reconstruction,
            policy: disc.nonphysical,
            cfl: disc.cfl,
            ls_lhs,
            ndofel: vec![disc.ndof; nelem],
            elem_faces,
        })
    }

    /// Place the system at column `offset` of a shared solution buffer.
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.layout = self.layout.with_offset(offset);
        self
    }

    pub fn physics(&self) -> &Physics {
        &self.physics
    }

    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    pub fn layout(&self) -> DgLayout {
        self.layout
    }

    pub fn bcs(&self) -> &SideSetBcs {
        &self.bcs
    }

    /// Diagonal mass matrix in right-hand-side layout.
    pub fn lhs(&self) -> &Fields {
        &self.lhs
    }

    /// Evolved dofs per element.
    pub fn ndofel(&self) -> &[usize] {
        &self.ndofel
    }

    fn params(&self) -> SystemParams<'_> {
        SystemParams::Flow(&self.physics)
    }

    fn context<'a>(&'a self, part: &'a MeshPartition) -> DgContext<'a> {
        DgContext {
            physics: &self.physics,
            flux: &self.flux as &dyn RiemannSolver,
            part,
            layout: self.layout,
            ndofel: &self.ndofel,
        }
    }

    /// Project the problem's solution at time `t` into `u`.
    pub fn initialize(&self, part: &MeshPartition, t: f64, u: &mut Fields) {
        initialize(self.layout, part, &self.problem, self.params(), t, u);
    }

    /// Freshly allocated solution holding only this system.
    pub fn initial_solution(&self, part: &MeshPartition, t: f64) -> Fields {
        let mut u = Fields::new(part.n_elements(), self.layout.offset + self.layout.width());
        self.initialize(part, t, &mut u);
        u
    }

    /// Reconstruct P1 dofs from cell averages (no-op unless rdof > ndof).
    pub fn reconstruct(&self, part: &MeshPartition, t: f64, u: &mut Fields) -> ReconstructionStats {
        let DgLayout {
            ncomp,
            offset,
            ndof,
            rdof,
        } = self.layout;
        if rdof <= ndof {
            return ReconstructionStats::default();
        }

        let stats = match (&self.ls_lhs, self.reconstruction) {
            (Some(lhs), ReconstructionKind::LeastSquares) => {
                let boundary = FlowBoundary::new(&self.bcs, &self.problem);
                let mut rhs = least_squares_rhs(part.n_elements(), ncomp);
                int_least_sq_p0p1(ncomp, offset, rdof, &part.faces, &part.geometry, u, &mut rhs);
                bnd_least_sq_p0p1(
                    ncomp,
                    offset,
                    rdof,
                    &part.faces,
                    &part.geometry,
                    u,
                    |f, avg| {
                        let g = &part.geometry.faces[f.get()];
                        let ctx = BcContext::new(t, g.centroid, g.normal, avg);
                        Some(boundary.ghost_state(&self.physics, f, &ctx))
                    },
                    &mut rhs,
                );
                solve_least_sq_p0p1(ncomp, offset, rdof, lhs, &rhs, u)
            }
            _ => reco_least_sq_ext_stencil(
                ncomp,
                offset,
                rdof,
                &part.mesh,
                &part.adjacency,
                &part.geometry,
                u,
            ),
        };
        transform_p0p1(ncomp, offset, rdof, &part.mesh, u);
        if stats.singular > 0 {
            log::debug!(
                "{} of {} elements fell back to zero gradients",
                stats.singular,
                stats.reconstructed
            );
        }
        stats
    }

    /// Zeroed right-hand-side storage.
    pub fn new_rhs(&self, part: &MeshPartition) -> Fields {
        Fields::new(part.n_elements(), self.layout.ncomp * self.layout.ndof)
    }

    /// Assemble the right-hand side of the reconstructed state `u`.
    pub fn rhs(&self, part: &MeshPartition, t: f64, u: &Fields, rhs: &mut Fields) -> Result<(), SolverError> {
        assert_eq!(rhs.nunk(), part.n_elements(), "rhs must have one row per element");
        assert_eq!(rhs.nprop(), self.layout.ncomp * self.layout.ndof, "rhs width mismatch");
        rhs.fill(0.0);

        let ctx = self.context(part);
        let boundary = FlowBoundary::new(&self.bcs, &self.problem);
        let mut derivs = match &self.physics {
            Physics::MultiMat(law) => Some(RiemannDerivatives::new(law.nmat(), part.n_elements())),
            Physics::CompFlow(_) => None,
        };

        vol_int(&ctx, u, rhs);
        surf_int(&ctx, u, rhs, derivs.as_mut())?;
        bnd_surf_int(&ctx, &boundary, t, u, rhs, derivs.as_mut())?;
        src_int(&ctx, &self.problem, t, rhs);
        if let (Physics::MultiMat(law), Some(d)) = (&self.physics, &derivs) {
            non_conservative_int(&ctx, law, u, d, rhs);
        }
        Ok(())
    }

    /// Element-parallel right-hand side.
    ///
    /// Every element integrates its own faces, so each face flux is
    /// evaluated twice; the result matches [`DgSystem::rhs`] to rounding.
    #[cfg(feature = "parallel")]
    pub fn rhs_parallel(&self, part: &MeshPartition, t: f64, u: &Fields, rhs: &mut Fields) -> Result<(), SolverError> {
        use rayon::prelude::*;

        use crate::flux::FluxError;
        use super::integrate::{
            boundary_face, internal_face, non_conservative_element, scatter, src_int_element,
            vol_int_element,
        };

        assert_eq!(rhs.nunk(), part.n_elements(), "rhs must have one row per element");
        assert_eq!(rhs.nprop(), self.layout.ncomp * self.layout.ndof, "rhs width mismatch");

        let ctx = self.context(part);
        let boundary = FlowBoundary::new(&self.bcs, &self.problem);
        let nrows = self.physics.n_derivatives();
        let nprop = rhs.nprop();

        rhs.as_mut_slice()
            .par_chunks_mut(nprop)
            .enumerate()
            .try_for_each(|(e, r)| -> Result<(), FluxError> {
                r.fill(0.0);
                let nd = ctx.ndofel[e];
                let mut deriv = vec![0.0; nrows];
                vol_int_element(&ctx, u, e, r);

                for &f in &self.elem_faces[e] {
                    let face = part.faces.face(f);
                    let n: Vec3 = part.geometry.faces[f.get()].normal;
                    if face.is_boundary() {
                        boundary_face(&ctx, &boundary, t, u, f, |wt, bl, fl| {
                            scatter(&ctx, nd, -1.0, wt, bl, &fl.flux, r);
                            RiemannDerivatives::accumulate(&mut deriv, wt, n, &fl.derivatives, 1.0);
                        })?;
                    } else {
                        let is_left = face.left.get() == e;
                        let sign = if is_left { -1.0 } else { 1.0 };
                        internal_face(&ctx, u, f, |wt, bl, br, fl| {
                            let b = if is_left { bl } else { br };
                            scatter(&ctx, nd, sign, wt, b, &fl.flux, r);
                            RiemannDerivatives::accumulate(&mut deriv, wt, n, &fl.derivatives, -sign);
                        })?;
                    }
                }

                if self.problem.has_source() {
                    src_int_element(&ctx, &self.problem, t, e, r);
                }
                if let Physics::MultiMat(law) = &self.physics {
                    non_conservative_element(&ctx, law, u, e, &deriv, r);
                }
                Ok(())
            })?;
        Ok(())
    }

    /// Time derivative of the solution, `M⁻¹ R(u)`, in solution layout.
    ///
    /// `u` is reconstructed on a copy first; reconstructed modes beyond
    /// `ndof` get a zero derivative.
    pub fn dudt(&self, part: &MeshPartition, t: f64, u: &Fields) -> Result<Fields, SolverError> {
        let mut ur = u.clone();
        self.reconstruct(part, t, &mut ur);

        let mut rhs = self.new_rhs(part);
        #[cfg(feature = "parallel")]
        self.rhs_parallel(part, t, &ur, &mut rhs)?;
        #[cfg(not(feature = "parallel"))]
        self.rhs(part, t, &ur, &mut rhs)?;

        let mut out = Fields::new(u.nunk(), u.nprop());
        let l = self.layout;
        for e in 0..part.n_elements() {
            for c in 0..l.ncomp {
                for k in 0..self.ndofel[e] {
                    let i = l.rhs_col(c, k);
                    out.set(e, l.col(c, k), l.offset, rhs.get(e, i, 0) / self.lhs.get(e, i, 0));
                }
            }
        }
        Ok(out)
    }

    /// Stable time step of the state `u`.
    pub fn dt(&self, part: &MeshPartition, u: &Fields) -> f64 {
        let l = self.layout;
        flow_dt(&self.physics, &part.geometry, u, l.offset, l.rdof, l.ndof, self.cfl)
    }

    /// Apply the non-physical state policy to the cell averages of `u`.
    pub fn check_states(&self, u: &Fields) -> Result<StateReport, SolverError> {
        let l = self.layout;
        check_physical_states(&self.physics, u, l.offset, l.rdof, self.policy)
    }

    /// Advance `u` by one SSP-RK3 step from `t` and check the new state.
    pub fn step(&self, part: &MeshPartition, t: f64, dt: f64, u: &mut Fields) -> Result<StateReport, SolverError> {
        try_ssp_rk3_step_timed(u, |v, ts| self.dudt(part, ts, v), t, dt)?;
        self.check_states(u)
    }

    /// Volume integral of component `c` over the partition.
    pub fn integral(&self, part: &MeshPartition, u: &Fields, c: usize) -> f64 {
        part.geometry
            .elements
            .iter()
            .enumerate()
            .map(|(e, g)| g.volume * u.get(e, self.layout.col(c, 0), self.layout.offset))
            .sum()
    }

    /// Output field names, see [`Problem::field_names`].
    pub fn field_names(&self) -> Vec<String> {
        self.problem.field_names(self.params())
    }

    /// Output fields at element centroids from the cell averages.
    pub fn field_output(&self, part: &MeshPartition, u: &Fields, t: f64) -> Vec<Vec<f64>> {
        let ctx = self.context(part);
        let states: Vec<Vec<f64>> = (0..part.n_elements()).map(|e| ctx.average(u, e)).collect();
        let points: Vec<Vec3> = part.geometry.elements.iter().map(|g| g.centroid).collect();
        self.problem.field_output(self.params(), &states, &points, t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use crate::equations::{CompFlow, MultiMat, StiffenedGas};
    use crate::mesh::TetMesh;
    use crate::solver::SolverError;

    const TOL: f64 = 1e-12;

    fn tube(n: usize) -> MeshPartition {
        let mesh = TetMesh::structured_box([n, 2, 2], [0.0; 3], [1.0, 0.5, 0.5]).unwrap();
        MeshPartition::new(mesh).unwrap()
    }

    fn compflow() -> Physics {
        Physics::CompFlow(CompFlow::new(StiffenedGas::ideal(1.4)))
    }

    fn multimat() -> Physics {
        let gas = StiffenedGas::ideal(1.4);
        Physics::MultiMat(MultiMat::new(vec![gas, gas]))
    }

    fn closed_box() -> BcConfig {
        BcConfig::default().with_symmetry(vec![1, 2, 3, 4, 5, 6])
    }

    #[test]
    fn test_uniform_flow_is_steady() {
        let part = tube(3);
        let physics = compflow();
        let Physics::CompFlow(law) = &physics else { unreachable!() };
        let state = law.conserved(1.2, [0.3, -0.1, 0.2], 0.9);
        let bc = BcConfig::default().with_extrapolate(vec![1, 2, 3, 4, 5, 6]);
        let disc = DiscretizationConfig::default().with_dofs(4, 4).with_flux(StandardFlux::Hllc);
        let problem = Problem::UserDefined { state };
        let sys = DgSystem::new(physics, problem, &bc, &disc, &part).unwrap();

        let u = sys.initial_solution(&part, 0.0);
        let d = sys.dudt(&part, 0.0, &u).unwrap();
        assert!(d.as_slice().iter().all(|v| v.abs() < 1e-10));
    }

    #[test]
    fn test_closed_box_conserves_mass_and_energy() {
        let part = tube(4);
        let disc = DiscretizationConfig::default();
        let sys = DgSystem::new(compflow(), Problem::SodShocktube, &closed_box(), &disc, &part).unwrap();

        let mut u = sys.initial_solution(&part, 0.0);
        let mass = sys.integral(&part, &u, 0);
        let energy = sys.integral(&part, &u, 4);
        let dt = sys.dt(&part, &u);
        assert!(dt.is_finite() && dt > 0.0);
        for i in 0..3 {
            let report = sys.step(&part, i as f64 * dt, dt, &mut u).unwrap();
            assert!(report.is_clean());
        }
        assert!((sys.integral(&part, &u, 0) - mass).abs() < TOL);
        assert!((sys.integral(&part, &u, 4) - energy).abs() < TOL);
    }

    #[test]
    fn test_sod_diaphragm_starts_moving_right() {
        let part = tube(8);
        let disc = DiscretizationConfig::default();
        let sys = DgSystem::new(compflow(), Problem::SodShocktube, &closed_box(), &disc, &part).unwrap();
        let u = sys.initial_solution(&part, 0.0);
        let d = sys.dudt(&part, 0.0, &u).unwrap();

        // x-momentum grows only next to the diaphragm, towards low pressure
        let mut push = 0.0;
        for (e, g) in part.geometry.elements.iter().enumerate() {
            let dm = d.get(e, 1, 0);
            if (g.centroid[0] - 0.5).abs() < 0.125 {
                assert!(dm > -TOL, "element {e} at {:?}: {dm}", g.centroid);
                push += g.volume * dm;
            } else {
                assert!(dm.abs() < TOL);
            }
        }
        assert!(push > 0.0);
    }

    #[test]
    fn test_multimat_closed_box_conserves_partial_masses() {
        let part = tube(4);
        let disc = DiscretizationConfig::default().with_flux(StandardFlux::Ausm);
        let problem = Problem::MultiMatSodShocktube;
        let sys = DgSystem::new(multimat(), problem, &closed_box(), &disc, &part).unwrap();

        let mut u = sys.initial_solution(&part, 0.0);
        let masses: Vec<f64> = (2..4).map(|c| sys.integral(&part, &u, c)).collect();
        let dt = sys.dt(&part, &u);
        let report = sys.step(&part, 0.0, dt, &mut u).unwrap();
        assert!(report.is_clean());
        for (k, c) in (2..4).enumerate() {
            assert!((sys.integral(&part, &u, c) - masses[k]).abs() < TOL);
        }
    }

    #[test]
    fn test_multimat_interface_rhs_stays_bounded() {
        let part = tube(3);
        let disc = DiscretizationConfig::default().with_dofs(1, 4).with_flux(StandardFlux::Ausm);
        let bc = BcConfig::default().with_extrapolate(vec![1, 2]).with_symmetry(vec![3, 4, 5, 6]);
        let sys = DgSystem::new(multimat(), Problem::MultiMatSodShocktube, &bc, &disc, &part).unwrap();
        let mut u = sys.initial_solution(&part, 0.0);
        sys.reconstruct(&part, 0.0, &mut u);
        let mut rhs = sys.new_rhs(&part);
        sys.rhs(&part, 0.0, &u, &mut rhs).unwrap();
        let worst = rhs.as_slice().iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        assert!(worst.is_finite() && worst < 10.0, "max |rhs| = {worst}");
    }

    #[test]
    fn test_default_cfl_keeps_sod_physical() {
        let part = tube(4);
        let disc = DiscretizationConfig::default().with_nonphysical(NonPhysicalPolicy::Abort);
        let sys = DgSystem::new(compflow(), Problem::SodShocktube, &closed_box(), &disc, &part).unwrap();
        let mut u = sys.initial_solution(&part, 0.0);
        let mut t = 0.0;
        for _ in 0..10 {
            let dt = sys.dt(&part, &u);
            sys.step(&part, t, dt, &mut u).unwrap();
            t += dt;
        }
        assert!(u.as_slice().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_rejects_incompatible_flux() {
        let part = tube(1);
        let disc = DiscretizationConfig::default().with_flux(StandardFlux::Hllc);
        let err = DgSystem::new(multimat(), Problem::MultiMatSodShocktube, &closed_box(), &disc, &part);
        assert!(matches!(err, Err(SolverError::Config(ConfigError::IncompatibleFlux { .. }))));

        let disc = DiscretizationConfig::default();
        let err = DgSystem::new(compflow(), Problem::MultiMatSodShocktube, &closed_box(), &disc, &part);
        assert!(matches!(err, Err(SolverError::Config(ConfigError::UnknownProblem { .. }))));
    }

    #[test]
    fn test_rejects_invalid_materials_and_dofs() {
        let part = tube(1);
        let disc = DiscretizationConfig::default();
        let bad_gas = Physics::CompFlow(CompFlow::new(StiffenedGas::ideal(0.9)));
        let err = DgSystem::new(bad_gas, Problem::SodShocktube, &closed_box(), &disc, &part);
        assert!(matches!(err, Err(SolverError::Config(ConfigError::InvalidMaterial { material: 0, .. }))));

        let single = Physics::MultiMat(MultiMat::new(vec![StiffenedGas::ideal(1.4)]));
        let err = DgSystem::new(single, Problem::MultiMatSodShocktube, &closed_box(), &disc, &part);
        assert!(matches!(err, Err(SolverError::Config(ConfigError::MissingMaterials { found: 1, .. }))));

        let disc = DiscretizationConfig::default().with_dofs(4, 1);
        let err = DgSystem::new(compflow(), Problem::SodShocktube, &closed_box(), &disc, &part);
        assert!(matches!(err, Err(SolverError::Config(ConfigError::InvalidRdof { ndof: 4, rdof: 1 }))));
    }

    #[test]
    fn test_extended_stencil_matches_linear_data() {
        let part = tube(3);
        let disc = DiscretizationConfig::default()
            .with_dofs(1, 4)
            .with_reconstruction(ReconstructionKind::ExtendedStencil);
        let sys = DgSystem::new(compflow(), Problem::SodShocktube, &closed_box(), &disc, &part).unwrap();
        let mut u = Fields::new(part.n_elements(), sys.layout().width());
        for (e, g) in part.geometry.elements.iter().enumerate() {
            u.set(e, 0, 0, 1.0 + 2.0 * g.centroid[0]);
        }
        let stats = sys.reconstruct(&part, 0.0, &mut u);
        assert_eq!(stats.singular, 0);
        // P1 mode 1 of a linear field in x: ∂u/∂ξ = 2 U₁
        let pts = part.mesh.element_coords(0);
        let expected = 2.0 * (pts[1][0] - pts[0][0]) / 2.0;
        assert!((u.get(0, 1, 0) - expected).abs() < 1e-10);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_serial() {
        let part = tube(3);
        for (physics, problem, flux, dofs) in [
            (compflow(), Problem::SodShocktube, StandardFlux::Hllc, (4, 4)),
            (compflow(), Problem::SodShocktube, StandardFlux::Rusanov, (1, 4)),
            (multimat(), Problem::MultiMatSodShocktube, StandardFlux::Ausm, (1, 4)),
        ] {
            let disc = DiscretizationConfig::default().with_dofs(dofs.0, dofs.1).with_flux(flux);
            let bc = BcConfig::default().with_extrapolate(vec![1, 2]).with_symmetry(vec![3, 4, 5, 6]);
            let sys = DgSystem::new(physics, problem, &bc, &disc, &part).unwrap();
            let mut u = sys.initial_solution(&part, 0.0);
            sys.reconstruct(&part, 0.0, &mut u);

            let mut serial = sys.new_rhs(&part);
            let mut parallel = sys.new_rhs(&part);
            sys.rhs(&part, 0.0, &u, &mut serial).unwrap();
            sys.rhs_parallel(&part, 0.0, &u, &mut parallel).unwrap();
            for (a, b) in serial.as_slice().iter().zip(parallel.as_slice()) {
                assert!((a - b).abs() < 1e-10 * (1.0 + a.abs()), "serial {a} vs parallel {b}");
            }
        }
    }
}
