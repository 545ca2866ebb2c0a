//! Whole-run tests: decks read from disk, every system stepped together,
//! and CG transport advanced on several partitions at once.

use inciter::comm::NodeCommMap;
use inciter::config::{BcConfig, CompFlowConfig, Config, DiscretizationConfig, MultiMatConfig, TransportConfig};
use inciter::equations::{StiffenedGas, Transport};
use inciter::problem::{Problem, ShearDiffParams};
use inciter::solver::diagnostics::{NUMDIAG, finalize};
use inciter::{CgTransport, MeshPartition, NodeDiagnostics, PdeKind, PdeRegistry, TetMesh, run_partitioned};

const TOL: f64 = 1e-12;

fn closed() -> BcConfig {
    BcConfig::default().with_symmetry(vec![1, 2, 3, 4, 5, 6])
}

fn deck() -> Config {
    Config::new(DiscretizationConfig::default().with_cfl(0.3).with_t0(0.25))
        .with_compflow(
            CompFlowConfig::new(StiffenedGas::ideal(1.4), Problem::SodShocktube)
                .with_bc(BcConfig::default().with_extrapolate(vec![1, 2]).with_symmetry(vec![3, 4, 5, 6])),
        )
        .with_multimat(
            MultiMatConfig::new(
                vec![StiffenedGas::ideal(1.4), StiffenedGas::ideal(1.6)],
                Problem::MultiMatSodShocktube,
            )
            .with_bc(closed()),
        )
        .with_transport(
            TransportConfig::new(
                Transport::new(1)
                    .with_u0(vec![0.5])
                    .with_lambda(vec![0.1])
                    .with_diffusivity(vec![0.01]),
                Problem::ShearDiff(ShearDiffParams { x0: 0.3, t_ref: 0.25 }),
            )
            .with_bc(BcConfig::default().with_dirichlet(vec![1, 2]).with_symmetry(vec![3, 4, 5, 6])),
        )
        .with_diagnostics_interval(2)
}

fn diffusion(t_ref: f64) -> (Transport, Problem) {
    let params = Transport::new(1)
        .with_u0(vec![0.0])
        .with_lambda(vec![0.0])
        .with_diffusivity(vec![0.02]);
    (params, Problem::ShearDiff(ShearDiffParams { x0: 0.4, t_ref }))
}

#[test]
fn test_deck_from_disk_drives_every_system() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deck.json");
    deck().to_json_file(&path).unwrap();

    let loaded = Config::from_json_file(&path).unwrap();
    assert_eq!(loaded.to_json().unwrap(), deck().to_json().unwrap());

    let mesh = TetMesh::structured_box([4, 2, 2], [0.0; 3], [1.0, 0.5, 0.5]).unwrap();
    let part = MeshPartition::new(mesh).unwrap();
    let registry = PdeRegistry::from_config(&loaded, &part).unwrap();
    assert_eq!(registry.count(PdeKind::CompFlowDg), 1);
    assert_eq!(registry.count(PdeKind::MultiMatDg), 1);
    assert_eq!(registry.count(PdeKind::TransportCg), 1);

    let mut t = loaded.discretization.t0;
    let mut sol = registry.initial_solutions(&part, t);
    for _ in 0..3 {
        let dt = registry.dt(&part, &sol);
        assert!(dt.is_finite() && dt > 0.0);
        let report = registry.step(&part, t, dt, &mut sol).unwrap();
        assert!(report.is_clean(), "{report:?}");
        t += dt;
    }
    assert!(sol.elements.as_slice().iter().all(|x| x.is_finite()));
    assert!(sol.nodes.as_slice().iter().all(|x| x.is_finite()));
}

#[test]
fn test_malformed_deck_is_a_config_error() {
    assert!(Config::from_json_str("{ \"discretization\": 3 }").is_err());
    let missing = Config::from_json_file("/nonexistent/deck.json");
    assert!(missing.is_err());
}

#[test]
fn test_closed_box_diffusion_conserves_total() {
    let mesh = TetMesh::structured_box([4, 3, 2], [0.0; 3], [1.0, 0.75, 0.5]).unwrap();
    let part = MeshPartition::new(mesh).unwrap();
    let (params, problem) = diffusion(0.1);
    let disc = DiscretizationConfig::default().with_cfl(0.5);
    let sys = CgTransport::new(params, problem, &closed(), &disc, &part).unwrap();

    let mut u = sys.initial_solution(&part, 0.1);
    let before = sys.integral(&part, &u, 0);
    let mut t = 0.1;
    for _ in 0..5 {
        let dt = sys.dt(&part);
        assert!(dt.is_finite());
        sys.step(&part, t, dt, &mut u);
        t += dt;
    }
    let after = sys.integral(&part, &u, 0);
    assert!(
        (after - before).abs() < TOL * before.abs().max(1.0),
        "total changed from {before} to {after}"
    );
}

#[test]
fn test_exact_state_has_zero_error() {
    let mesh = TetMesh::structured_box([3, 2, 2], [0.0; 3], [1.0, 0.5, 0.5]).unwrap();
    let part = MeshPartition::new(mesh).unwrap();
    let params = Transport::new(2)
        .with_u0(vec![0.3, 0.6])
        .with_lambda(vec![0.1, 0.0])
        .with_diffusivity(vec![0.01, 0.03]);
    let problem = Problem::ShearDiff(ShearDiffParams { x0: 0.2, t_ref: 0.5 });
    let disc = DiscretizationConfig::default();
    let sys = CgTransport::new(params, problem, &BcConfig::default(), &disc, &part).unwrap();

    let (t, dt) = (0.5, 0.01);
    let u = sys.initial_solution(&part, t + dt);
    let owned = vec![true; part.n_nodes()];
    let diag = NodeDiagnostics::new(2);

    assert!(diag.compute(&sys, &part, &u, &owned, 0, t, dt).is_none());
    let table = diag.compute(&sys, &part, &u, &owned, 1, t, dt).unwrap();
    assert_eq!(table.len(), NUMDIAG);

    let record = finalize(&table, part.geometry.total_volume());
    assert_eq!(record.it, 2);
    assert!((record.t - (t + dt)).abs() < TOL);
    assert!((record.dt - dt).abs() < TOL);
    for c in 0..2 {
        assert!(record.l2_solution[c] > 0.0);
        assert!(record.l2_error[c].abs() < TOL);
        assert!(record.linf_error[c].abs() < TOL);
    }
}

#[test]
fn test_three_partitions_match_serial_and_conserve() {
    let mesh = TetMesh::structured_box([6, 2, 2], [0.0; 3], [1.5, 0.5, 0.5]).unwrap();
    let (params, problem) = diffusion(0.2);
    let disc = DiscretizationConfig::default().with_cfl(0.5);
    let (t0, nsteps) = (0.2, 3);

    let serial = MeshPartition::new(mesh.clone()).unwrap();
    let sys = CgTransport::new(params.clone(), problem.clone(), &closed(), &disc, &serial).unwrap();
    let mut u = sys.initial_solution(&serial, t0);
    let total = sys.integral(&serial, &u, 0);
    let mut t = t0;
    for _ in 0..nsteps {
        let dt = sys.dt(&serial);
        sys.step(&serial, t, dt, &mut u);
        t += dt;
    }

    let nelem = mesh.n_elements();
    let parts: Vec<MeshPartition> = (0..3)
        .map(|r| {
            let els: Vec<usize> = (r * nelem / 3..(r + 1) * nelem / 3).collect();
            MeshPartition::new(mesh.subset(&els).unwrap()).unwrap()
        })
        .collect();
    let systems: Vec<CgTransport> = parts
        .iter()
        .map(|p| CgTransport::new(params.clone(), problem.clone(), &closed(), &disc, p).unwrap())
        .collect();

    let outcomes = run_partitioned(parts, systems, t0, nsteps, NodeDiagnostics::new(1)).unwrap();
    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[0].history.records().len(), nsteps as usize);

    let meshes: Vec<&TetMesh> = outcomes.iter().map(|o| &o.part.mesh).collect();
    let maps = NodeCommMap::build(&meshes);
    let mut distributed = 0.0;
    for (o, comm) in outcomes.iter().zip(&maps) {
        assert!((o.t - t).abs() < TOL);
        let owned = comm.ownership_mask(&o.part.mesh);
        for (p, &g) in o.part.mesh.gid().iter().enumerate() {
            let expected = u.get(g, 0, 0);
            let got = o.u.get(p, 0, 0);
            let tol = 1e-10 * expected.abs().max(1.0);
            assert!((got - expected).abs() < tol, "node {g} on rank {}: {got} vs {expected}", o.rank);
            if owned[p] {
                distributed += o.part.geometry.nodal_volume[p] * got;
            }
        }
    }
    assert!((distributed - total).abs() < 1e-10 * total.abs().max(1.0));
}
