//! Derived adjacency structures of a tetrahedral partition.
//!
//! All structures are built once at setup and are immutable afterwards:
//! - `esup`: elements surrounding points (CSR)
//! - `psup`: points surrounding points (CSR, sorted)
//! - `edges`: unique edges as sorted node pairs
//! - `esued`: elements surrounding each edge
//! - `esuel`: face neighbours of each element (`None` across the partition boundary)

use std::collections::HashMap;

use super::TetMesh;

/// Local node pairs forming the six edges of a tetrahedron.
pub const LPOED: [[usize; 2]; 6] = [[0, 1], [1, 2], [2, 0], [0, 3], [1, 3], [2, 3]];

/// Local node triples forming the four faces of a tetrahedron.
///
/// Face `k` is opposite vertex `k` and is ordered so that its right-hand
/// normal points out of a positively oriented element.
pub const LPOFA: [[usize; 3]; 4] = [[1, 2, 3], [2, 0, 3], [3, 0, 1], [0, 2, 1]];

/// Unordered mesh edge stored as a sorted node pair.
pub type Edge = [usize; 2];

/// Sorted key for the edge between `a` and `b`.
#[inline]
pub fn edge_key(a: usize, b: usize) -> Edge {
    if a < b { [a, b] } else { [b, a] }
}

/// Orientation of edge `e1` relative to `e2`: +1 equal, -1 reversed, 0 otherwise.
#[inline]
pub fn orient(e1: Edge, e2: Edge) -> f64 {
    if e1 == e2 {
        1.0
    } else if e1[0] == e2[1] && e1[1] == e2[0] {
        -1.0
    } else {
        0.0
    }
}

/// Compressed "items surrounding i" list.
#[derive(Clone, Debug, Default)]
pub struct Csr {
    offsets: Vec<usize>,
    items: Vec<usize>,
}

impl Csr {
    fn from_lists(lists: Vec<Vec<usize>>) -> Self {
        let mut offsets = Vec::with_capacity(lists.len() + 1);
        offsets.push(0);
        let mut items = Vec::new();
        for l in lists {
            items.extend(l);
            offsets.push(items.len());
        }
        Self { offsets, items }
    }

    /// Items surrounding `i`.
    #[inline]
    pub fn around(&self, i: usize) -> &[usize] {
        &self.items[self.offsets[i]..self.offsets[i + 1]]
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Adjacency of a mesh partition.
#[derive(Clone, Debug)]
pub struct MeshAdjacency {
    pub esup: Csr,
    pub psup: Csr,
    pub edges: Vec<Edge>,
    pub esued: HashMap<Edge, Vec<usize>>,
    pub esuel: Vec<[Option<usize>; 4]>,
}

impl MeshAdjacency {
    pub fn new(mesh: &TetMesh) -> Self {
        let npoin = mesh.n_nodes();
        let inpoel = mesh.inpoel();

        let mut esup_lists = vec![Vec::new(); npoin];
        for (e, nodes) in inpoel.iter().enumerate() {
            for &p in nodes {
                esup_lists[p].push(e);
            }
        }

        let mut psup_lists = vec![Vec::new(); npoin];
        let mut esued: HashMap<Edge, Vec<usize>> = HashMap::new();
        for (e, nodes) in inpoel.iter().enumerate() {
            for [a, b] in LPOED {
                let (p, q) = (nodes[a], nodes[b]);
                psup_lists[p].push(q);
                psup_lists[q].push(p);
                esued.entry(edge_key(p, q)).or_default().push(e);
            }
        }
        for l in &mut psup_lists {
            l.sort_unstable();
            l.dedup();
        }
        let mut edges: Vec<Edge> = esued.keys().copied().collect();
        edges.sort_unstable();

        let mut esuel = vec![[None; 4]; inpoel.len()];
        let mut open: HashMap<[usize; 3], (usize, usize)> = HashMap::with_capacity(2 * inpoel.len());
        for (e, nodes) in inpoel.iter().enumerate() {
            for (f, lf) in LPOFA.iter().enumerate() {
                let mut key = [nodes[lf[0]], nodes[lf[1]], nodes[lf[2]]];
                key.sort_unstable();
                if let Some((ne, nf)) = open.remove(&key) {
                    esuel[e][f] = Some(ne);
                    esuel[ne][nf] = Some(e);
                } else {
                    open.insert(key, (e, f));
                }
            }
        }

        log::info!(
            "mesh adjacency: {} points, {} elements, {} edges",
            npoin,
            inpoel.len(),
            edges.len()
        );

        Self {
            esup: Csr::from_lists(esup_lists),
            psup: Csr::from_lists(psup_lists),
            edges,
            esued,
            esuel,
        }
    }

    /// Elements sharing the edge between `p` and `q`.
    pub fn elements_around_edge(&self, p: usize, q: usize) -> &[usize] {
        self.esued.get(&edge_key(p, q)).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lpofa_faces_point_outward() {
        use crate::operators::{dot, sub, tet_centroid, triangle_centroid, triangle_normal};
        let tet = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
        let c = tet_centroid(&tet);
        for f in LPOFA {
            let tri = [tet[f[0]], tet[f[1]], tet[f[2]]];
            let n = triangle_normal(&tri);
            assert!(dot(n, sub(triangle_centroid(&tri), c)) > 0.0);
        }
    }

    #[test]
    fn test_orient() {
        assert_eq!(orient([1, 2], [1, 2]), 1.0);
        assert_eq!(orient([2, 1], [1, 2]), -1.0);
        assert_eq!(orient([2, 3], [1, 2]), 0.0);
    }

    #[test]
    fn test_box_adjacency() {
        let mesh = TetMesh::structured_box([1, 1, 1], [0.0; 3], [1.0; 3]).unwrap();
        let adj = MeshAdjacency::new(&mesh);
        // 12 cube edges + 6 face diagonals + 1 body diagonal
        assert_eq!(adj.edges.len(), 19);
        // the body diagonal is shared by all six tets
        assert_eq!(adj.elements_around_edge(0, 7).len(), 6);
        // corner 0 touches every other cube vertex
        assert_eq!(adj.psup.around(0).len(), 7);
        assert_eq!(adj.esup.around(0).len(), 6);
        // each tet has two internal and two exterior faces
        for nb in &adj.esuel {
            assert_eq!(nb.iter().filter(|n| n.is_some()).count(), 2);
        }
    }
}
