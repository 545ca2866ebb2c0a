//! Stable time-step sizes.
//!
//! Every element contributes `L / s` with a length scale `L` and its fastest
//! signal speed `s`; the global step is the minimum scaled by the CFL
//! number. Node-based schemes use `L = ∛|K|`. DG schemes use the face-based
//! `L = |K| / Σ|∂K|` and divide the CFL number by `2p + 1`.

use crate::equations::ConservationLaw;
use crate::mesh::MeshGeometry;
use crate::polynomial::degree_of;
use crate::solver::Fields;

/// Signal speeds below this are treated as zero.
pub const SPEED_TOL: f64 = 1e-14;

/// Length scale of an element.
#[inline]
pub fn element_length(volume: f64) -> f64 {
    volume.cbrt()
}

/// Length scale of a DG element: volume over total face area.
#[inline]
pub fn dg_element_length(volume: f64, surface: f64) -> f64 {
    volume / surface
}

/// CFL number of a DG scheme evolving `ndof` dofs per component.
pub fn dg_cfl(cfl: f64, ndof: usize) -> f64 {
    cfl / (2 * degree_of(ndof) + 1) as f64
}

/// Smallest `cfl × L / s` over `(L, s)` pairs.
///
/// Returns `f64::INFINITY` when every speed is zero.
pub fn min_dt<I>(pairs: I, cfl: f64) -> f64
where
    I: IntoIterator<Item = (f64, f64)>,
{
    pairs
        .into_iter()
        .filter(|&(_, s)| s >= SPEED_TOL)
        .map(|(l, s)| cfl * l / s)
        .fold(f64::INFINITY, f64::min)
}

/// Explicit diffusion limit `L² / (2D)`, infinite without diffusion.
pub fn diffusion_dt(length: f64, diffusivity: f64) -> f64 {
    if diffusivity > 0.0 {
        length * length / (2.0 * diffusivity)
    } else {
        f64::INFINITY
    }
}

/// Time step of a DG flow system from its cell averages.
///
/// The signal speed of an element is `|v| + a` of its average state
/// (largest material sound speed for multi-material flow).
pub fn flow_dt<L: ConservationLaw + ?Sized>(
    law: &L,
    geometry: &MeshGeometry,
    u: &Fields,
    offset: usize,
    rdof: usize,
    ndof: usize,
    cfl: f64,
) -> f64 {
    let mut avg = vec![0.0; law.ncomp()];
    let pairs = geometry.elements.iter().enumerate().map(|(e, g)| {
        for (c, a) in avg.iter_mut().enumerate() {
            *a = u.get(e, c * rdof, offset);
        }
        (dg_element_length(g.volume, g.surface), law.max_wave_speed(&avg))
    });
    min_dt(pairs, dg_cfl(cfl, ndof))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equations::{CompFlow, StiffenedGas};
    use crate::mesh::{MeshPartition, TetMesh};

    const TOL: f64 = 1e-14;

    #[test]
    fn test_zero_speed_is_unbounded() {
        assert_eq!(min_dt([(1.0, 0.0), (0.5, 1e-16)], 0.5), f64::INFINITY);
        assert_eq!(diffusion_dt(1.0, 0.0), f64::INFINITY);
    }

    #[test]
    fn test_dt_scaling() {
        let dt1 = min_dt([(1.0, 1.0), (0.5, 1.0)], 0.5);
        let dt2 = min_dt([(1.0, 2.0), (0.5, 2.0)], 0.5);
        assert!((dt1 - 0.25).abs() < TOL);
        assert!((dt2 / dt1 - 0.5).abs() < TOL, "dt should halve when speed doubles");
        assert!((dg_cfl(0.9, 4) - 0.3).abs() < TOL);
        assert!((dg_cfl(1.0, 10) - 0.2).abs() < TOL);
        assert!((diffusion_dt(0.2, 0.5) - 0.04).abs() < TOL);
    }

    #[test]
    fn test_flow_dt_at_rest() {
        let mesh = TetMesh::structured_box([1, 1, 1], [0.0; 3], [1.0; 3]).unwrap();
        let part = MeshPartition::new(mesh).unwrap();
        let law = CompFlow::new(StiffenedGas::ideal(1.4));
        let state = law.conserved(1.4, [0.0; 3], 1.0);
        let n = part.n_elements();
        let mut u = Fields::new(n, 5);
        for e in 0..n {
            for (c, v) in state.iter().enumerate() {
                u.set(e, c, 0, *v);
            }
        }
        // unit sound speed, P0
        let dt = flow_dt(&law, &part.geometry, &u, 0, 1, 1, 0.5);
        let lmin = part
            .geometry
            .elements
            .iter()
            .map(|g| dg_element_length(g.volume, g.surface))
            .fold(f64::INFINITY, f64::min);
        assert!((dt - 0.5 * lmin).abs() < 1e-12);
        let cube = part.geometry.total_volume().cbrt();
        assert!(lmin < 0.25 * cube);
    }
}
