//! Least-squares reconstruction over the node-neighbour stencil.
//!
//! The stencil of element e is every other element sharing at least one
//! node with it, which keeps the normal equations well conditioned on
//! boundary elements with few face neighbours.

use faer::{Mat, linalg::solvers::Solve};

use crate::mesh::{MeshAdjacency, MeshGeometry, TetMesh};
use crate::operators::sub;
use crate::solver::Fields;

use super::ReconstructionStats;
use super::least_squares::is_singular;

/// Elements sharing a node with `e`, excluding `e`, sorted and unique.
fn node_stencil(mesh: &TetMesh, adjacency: &MeshAdjacency, e: usize) -> Vec<usize> {
    let mut stencil: Vec<usize> = mesh
        .element_nodes(e)
        .iter()
        .flat_map(|&p| adjacency.esup.around(p).iter().copied())
        .filter(|&n| n != e)
        .collect();
    stencil.sort_unstable();
    stencil.dedup();
    stencil
}

/// Reconstruct the physical gradients of `ncomp` components into dofs 1..3
/// from the node-neighbour stencil.
///
/// Singular stencils get a zero gradient; the caller applies
/// [`super::transform_p0p1`] afterwards.
pub fn reco_least_sq_ext_stencil(
    ncomp: usize,
    offset: usize,
    rdof: usize,
    mesh: &TetMesh,
    adjacency: &MeshAdjacency,
    geometry: &MeshGeometry,
    u: &mut Fields,
) -> ReconstructionStats {
    debug_assert!(rdof >= 4);
    let mut stats = ReconstructionStats::default();
    for e in 0..u.nunk() {
        let xe = geometry.elements[e].centroid;
        let stencil = node_stencil(mesh, adjacency, e);

        let mut a = [[0.0; 3]; 3];
        let mut b = Mat::<f64>::zeros(3, ncomp);
        for &n in &stencil {
            let dx = sub(geometry.elements[n].centroid, xe);
            for i in 0..3 {
                for j in 0..3 {
                    a[i][j] += dx[i] * dx[j];
                }
            }
            for c in 0..ncomp {
                let du = u.get(n, c * rdof, offset) - u.get(e, c * rdof, offset);
                for i in 0..3 {
                    b[(i, c)] += dx[i] * du;
                }
            }
        }

        let det = a[0][0] * (a[1][1] * a[2][2] - a[1][2] * a[2][1])
            - a[0][1] * (a[1][0] * a[2][2] - a[1][2] * a[2][0])
            + a[0][2] * (a[1][0] * a[2][1] - a[1][1] * a[2][0]);
        if stencil.is_empty() || is_singular(&a, det) {
            stats.singular += 1;
            log::debug!(
                "singular extended-stencil matrix in element {e} ({} neighbours), gradient set to zero",
                stencil.len()
            );
            for c in 0..ncomp {
                for i in 1..4 {
                    u.set(e, c * rdof + i, offset, 0.0);
                }
            }
            continue;
        }

        let lhs = Mat::<f64>::from_fn(3, 3, |i, j| a[i][j]);
        let grad = lhs.as_ref().full_piv_lu().solve(&b);
        for c in 0..ncomp {
            for i in 0..3 {
                u.set(e, c * rdof + 1 + i, offset, grad[(i, c)]);
            }
        }
        stats.reconstructed += 1;
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::MeshPartition;
    use crate::operators::dot;

    #[test]
    fn test_linear_field_is_reproduced() {
        let mesh = TetMesh::structured_box([2, 3, 2], [0.0; 3], [1.0, 2.0, 1.0]).unwrap();
        let part = MeshPartition::new(mesh).unwrap();
        let b = [[1.0, -2.0, 0.5], [0.0, 0.25, -3.0]];
        let mut u = Fields::new(part.n_elements(), 8);
        for (e, g) in part.geometry.elements.iter().enumerate() {
            u.set(e, 0, 0, 1.0 + dot(b[0], g.centroid));
            u.set(e, 4, 0, -2.0 + dot(b[1], g.centroid));
        }
        let stats = reco_least_sq_ext_stencil(
            2,
            0,
            4,
            &part.mesh,
            &part.adjacency,
            &part.geometry,
            &mut u,
        );
        assert_eq!(stats.singular, 0);
        assert_eq!(stats.reconstructed, part.n_elements());
        for e in 0..part.n_elements() {
            for c in 0..2 {
                for i in 0..3 {
                    assert!((u.get(e, c * 4 + 1 + i, 0) - b[c][i]).abs() < 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_stencil_excludes_self() {
        let mesh = TetMesh::structured_box([1, 1, 1], [0.0; 3], [1.0; 3]).unwrap();
        let adj = MeshAdjacency::new(&mesh);
        let s = node_stencil(&mesh, &adj, 0);
        assert!(!s.contains(&0));
        // all six Kuhn tetrahedra share the main diagonal
        assert_eq!(s.len(), 5);
    }
}
