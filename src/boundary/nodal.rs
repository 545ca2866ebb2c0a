//! Boundary conditions on mesh nodes for edge-based CG.

use std::collections::BTreeMap;

use crate::mesh::{FaceData, MeshGeometry, TetMesh};
use crate::operators::{Vec3, dot, length};
use crate::problem::{Problem, SystemParams};
use crate::solver::Fields;
use crate::types::FaceIndex;

use super::{BcKind, SideSetBcs};

/// Dirichlet increments of `nodes`.
///
/// The value of node p is one `(set, increment)` pair per component with
/// increment `solution(t + dt) - solution(t)`. `nodes` are usually
/// `bcs.nodes(BcKind::Dirichlet)`; partitioned runs pass the union over
/// neighbouring partitions.
pub fn dirbc(
    problem: &Problem,
    sys: SystemParams<'_>,
    nodes: &[usize],
    mesh: &TetMesh,
    t: f64,
    dt: f64,
) -> BTreeMap<usize, Vec<(bool, f64)>> {
    nodes
        .iter()
        .map(|&p| {
            let inc = problem.dirichlet_increment(sys, mesh.point(p), t, dt);
            (p, inc.into_iter().map(|d| (true, d)).collect())
        })
        .collect()
}

/// Area vectors of symmetry faces summed at their nodes.
pub fn symmetry_area_vectors(
    faces: &FaceData,
    geometry: &MeshGeometry,
    bcs: &SideSetBcs,
) -> BTreeMap<usize, Vec3> {
    let mut sums: BTreeMap<usize, Vec3> = BTreeMap::new();
    for f in 0..faces.nbfac() {
        let fi = FaceIndex::new(f);
        if bcs.face_kind(fi) != Some(BcKind::Symmetry) {
            continue;
        }
        let g = &geometry.faces[f];
        for &p in &faces.face(fi).nodes {
            let n = sums.entry(p).or_insert([0.0; 3]);
            for i in 0..3 {
                n[i] += g.area * g.normal[i];
            }
        }
    }
    sums
}

/// Normalise nodal vectors, dropping zero ones.
pub fn normalize_normals(mut vectors: BTreeMap<usize, Vec3>) -> BTreeMap<usize, Vec3> {
    vectors.retain(|_, n| length(*n) > 0.0);
    for n in vectors.values_mut() {
        let l = length(*n);
        for v in n.iter_mut() {
            *v /= l;
        }
    }
    vectors
}

/// Area-weighted outward unit normals of nodes on symmetry side sets.
///
/// Every symmetry boundary face contributes its area vector to its three
/// nodes; the sums are normalised.
pub fn symmetry_normals(
    faces: &FaceData,
    geometry: &MeshGeometry,
    bcs: &SideSetBcs,
) -> BTreeMap<usize, Vec3> {
    normalize_normals(symmetry_area_vectors(faces, geometry, bcs))
}

/// Remove the normal component of the vector stored in columns `cols` at
/// every symmetry node.
pub fn apply_symmetry(normals: &BTreeMap<usize, Vec3>, u: &mut Fields, cols: [usize; 3]) {
    for (&p, n) in normals {
        let v = cols.map(|c| u.get(p, c, 0));
        let vn = dot(v, *n);
        for i in 0..3 {
            u.set(p, cols[i], 0, v[i] - vn * n[i]);
        }
    }
}
