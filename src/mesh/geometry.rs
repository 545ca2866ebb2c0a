//! Element, face and dual-mesh geometry.
//!
//! # Dual-face normals
//!
//! Edge-based CG assembly uses the median dual mesh: the control volume of
//! node p is bounded by triangles joining edge midpoints, face centroids and
//! element centroids. Inside one tetrahedron the dual face of edge p-q has
//! area vector
//!
//! D_pq = (J/24) (∇N_q - ∇N_p)
//!
//! pointing from p towards q. Summing over the elements around the edge
//! gives the edge normal. Because Σ_a ∇N_a = 0 in every element,
//! Σ_q D_pq = -Σ_e |K_e| ∇N_p, which vanishes at interior nodes and equals
//! minus the node's share of the boundary area at boundary nodes.
//!
//! Normals are stored once per edge keyed by global ids and oriented from the
//! lower to the higher global id.

use std::collections::HashMap;

use super::{FaceData, LPOED, LPOFA, MeshError, TetMesh};
use crate::operators::{
    Vec3, checked_jacobian, shape_gradients, tet_centroid, triangle_area, triangle_centroid, triangle_normal,
};
use crate::types::ElementIndex;

/// Volume, centroid and total face area of an element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ElementGeometry {
    pub volume: f64,
    pub centroid: Vec3,
    pub surface: f64,
}

/// Area, outward unit normal and centroid of a face.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceGeometry {
    pub area: f64,
    pub normal: Vec3,
    pub centroid: Vec3,
}

/// Geometry derived from a mesh partition.
#[derive(Clone, Debug)]
pub struct MeshGeometry {
    pub elements: Vec<ElementGeometry>,
    pub faces: Vec<FaceGeometry>,
    /// Lumped nodal volumes (a quarter of every surrounding element)
    pub nodal_volume: Vec<f64>,
    dual_normals: HashMap<[usize; 2], Vec3>,
}

impl MeshGeometry {
    /// Compute all geometry, re-checking Jacobian positivity.
    pub fn new(mesh: &TetMesh, faces: &FaceData) -> Result<Self, MeshError> {
        let gid = mesh.gid();
        let mut elements = Vec::with_capacity(mesh.n_elements());
        let mut nodal_volume = vec![0.0; mesh.n_nodes()];
        let mut dual_normals: HashMap<[usize; 2], Vec3> = HashMap::new();

        for e in 0..mesh.n_elements() {
            let pts = mesh.element_coords(e);
            let n = mesh.element_nodes(e);
            checked_jacobian(ElementIndex::new(e), n.map(|p| gid[p]), &pts)?;
            let (grad, j) = shape_gradients(&pts);
            let volume = j / 6.0;
            elements.push(ElementGeometry {
                volume,
                centroid: tet_centroid(&pts),
                surface: LPOFA.iter().map(|f| triangle_area(&f.map(|a| pts[a]))).sum(),
            });
            for &p in &n {
                nodal_volume[p] += volume / 4.0;
            }

            let j24 = j / 24.0;
            for [a, b] in LPOED {
                let (gp, gq) = (gid[n[a]], gid[n[b]]);
                // contribution oriented from a to b, stored low-to-high gid
                let s = if gp < gq { 1.0 } else { -1.0 };
                let key = if gp < gq { [gp, gq] } else { [gq, gp] };
                let d = dual_normals.entry(key).or_insert([0.0; 3]);
                for i in 0..3 {
                    d[i] += s * j24 * (grad[b][i] - grad[a][i]);
                }
            }
        }

        let face_geom = faces
            .faces()
            .iter()
            .map(|f| {
                let tri = f.nodes.map(|p| mesh.point(p));
                FaceGeometry {
                    area: triangle_area(&tri),
                    normal: triangle_normal(&tri),
                    centroid: triangle_centroid(&tri),
                }
            })
            .collect();

        Ok(Self {
            elements,
            faces: face_geom,
            nodal_volume,
            dual_normals,
        })
    }

    /// Dual-face normal of edge p-q (global ids), oriented from p to q.
    pub fn dual_normal(&self, gp: usize, gq: usize) -> Option<Vec3> {
        if gp < gq {
            self.dual_normals.get(&[gp, gq]).copied()
        } else {
            self.dual_normals.get(&[gq, gp]).map(|n| [-n[0], -n[1], -n[2]])
        }
    }

    /// All dual normals, keyed by (low gid, high gid).
    pub fn dual_normals(&self) -> &HashMap<[usize; 2], Vec3> {
        &self.dual_normals
    }

    /// Add partial dual normals received from a neighbouring partition.
    pub fn merge_dual_normals(&mut self, partial: &HashMap<[usize; 2], Vec3>) {
        for (key, n) in partial {
            if let Some(d) = self.dual_normals.get_mut(key) {
                for i in 0..3 {
                    d[i] += n[i];
                }
            }
        }
    }

    /// Add partial nodal volumes of shared nodes.
    pub fn merge_nodal_volumes(&mut self, partial: &[(usize, f64)]) {
        for &(p, v) in partial {
            self.nodal_volume[p] += v;
        }
    }

    /// Sum of element volumes.
    pub fn total_volume(&self) -> f64 {
        self.elements.iter().map(|g| g.volume).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::MeshAdjacency;

    const TOL: f64 = 1e-12;

    fn box_geometry(n: [usize; 3]) -> (TetMesh, MeshAdjacency, FaceData, MeshGeometry) {
        let mesh = TetMesh::structured_box(n, [0.0; 3], [1.0, 2.0, 1.5]).unwrap();
        let adj = MeshAdjacency::new(&mesh);
        let fd = FaceData::new(&mesh, &adj).unwrap();
        let geo = MeshGeometry::new(&mesh, &fd).unwrap();
        (mesh, adj, fd, geo)
    }

    #[test]
    fn test_volumes() {
        let (_, _, _, geo) = box_geometry([2, 2, 2]);
        assert!((geo.total_volume() - 3.0).abs() < TOL);
        let nodal: f64 = geo.nodal_volume.iter().sum();
        assert!((nodal - 3.0).abs() < TOL);
    }

    #[test]
    fn test_element_surfaces_match_face_list() {
        // interior faces bound two elements, boundary faces one
        let (_, _, fd, geo) = box_geometry([2, 2, 2]);
        let elements: f64 = geo.elements.iter().map(|g| g.surface).sum();
        let faces: f64 = fd
            .faces()
            .iter()
            .zip(&geo.faces)
            .map(|(f, g)| if f.is_boundary() { g.area } else { 2.0 * g.area })
            .sum();
        assert!((elements - faces).abs() < 1e-10);
        assert!(geo.elements.iter().all(|g| g.surface > 0.0));
    }

    #[test]
    fn test_boundary_normals_point_outward() {
        let (_, _, fd, geo) = box_geometry([2, 2, 2]);
        let center = [0.5, 1.0, 0.75];
        for f in 0..fd.nbfac() {
            let g = &geo.faces[f];
            let r: Vec<f64> = (0..3).map(|j| g.centroid[j] - center[j]).collect();
            assert!(g.normal[0] * r[0] + g.normal[1] * r[1] + g.normal[2] * r[2] > 0.0);
        }
    }

    #[test]
    fn test_dual_normal_antisymmetry() {
        let (mesh, adj, _, geo) = box_geometry([1, 1, 1]);
        for &[p, q] in &adj.edges {
            let (gp, gq) = (mesh.gid()[p], mesh.gid()[q]);
            let a = geo.dual_normal(gp, gq).unwrap();
            let b = geo.dual_normal(gq, gp).unwrap();
            for i in 0..3 {
                assert!((a[i] + b[i]).abs() < TOL);
            }
        }
    }

    #[test]
    fn test_dual_volumes_close() {
        // Σ_q D_pq + (boundary share) = 0 for every node
        let (mesh, adj, fd, geo) = box_geometry([2, 2, 2]);
        let mut closure = vec![[0.0; 3]; mesh.n_nodes()];
        for p in 0..mesh.n_nodes() {
            for &q in adj.psup.around(p) {
                let d = geo.dual_normal(mesh.gid()[p], mesh.gid()[q]).unwrap();
                for i in 0..3 {
                    closure[p][i] += d[i];
                }
            }
        }
        for f in 0..fd.nbfac() {
            let face = &fd.faces()[f];
            let g = &geo.faces[f];
            for &p in &face.nodes {
                for i in 0..3 {
                    closure[p][i] += g.area / 3.0 * g.normal[i];
                }
            }
        }
        for c in closure {
            for v in c {
                assert!(v.abs() < TOL);
            }
        }
    }
}
