//! Tetrahedral mesh partition: coordinates, connectivity, ids and side sets.
//!
//! Local node indices are dense and contiguous. `gid` maps local to global
//! ids and `lid` is its inverse. Side sets are lists of boundary triangles
//! given as local node triples.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use super::MeshError;
use crate::operators::{TetCoords, Vec3, checked_jacobian, jacobian};
use crate::types::ElementIndex;

/// Unstructured tetrahedral mesh partition.
#[derive(Clone, Debug)]
pub struct TetMesh {
    coord: [Vec<f64>; 3],
    inpoel: Vec<[usize; 4]>,
    gid: Vec<usize>,
    lid: HashMap<usize, usize>,
    side_sets: BTreeMap<i32, Vec<[usize; 3]>>,
}

impl TetMesh {
    /// Create a serial mesh whose global ids equal the local ids.
    pub fn new(coord: [Vec<f64>; 3], inpoel: Vec<[usize; 4]>) -> Result<Self, MeshError> {
        let gid = (0..coord[0].len()).collect();
        Self::with_global_ids(coord, inpoel, gid)
    }

    /// Create a partition with an explicit local-to-global id map.
    ///
    /// Validates coordinate lengths, connectivity bounds, id uniqueness and
    /// the sign of every element Jacobian.
    pub fn with_global_ids(
        coord: [Vec<f64>; 3],
        inpoel: Vec<[usize; 4]>,
        gid: Vec<usize>,
    ) -> Result<Self, MeshError> {
        let (nx, ny, nz) = (coord[0].len(), coord[1].len(), coord[2].len());
        if nx != ny || nx != nz {
            return Err(MeshError::CoordinateLengthMismatch { x: nx, y: ny, z: nz });
        }
        if gid.len() != nx {
            return Err(MeshError::GlobalIdLengthMismatch {
                expected: nx,
                found: gid.len(),
            });
        }

        let mut lid = HashMap::with_capacity(gid.len());
        for (l, &g) in gid.iter().enumerate() {
            if lid.insert(g, l).is_some() {
                return Err(MeshError::DuplicateGlobalId(g));
            }
        }

        for (e, nodes) in inpoel.iter().enumerate() {
            if let Some(&node) = nodes.iter().find(|&&n| n >= nx) {
                return Err(MeshError::NodeOutOfRange {
                    element: ElementIndex::new(e),
                    node,
                    nnode: nx,
                });
            }
        }

        let mesh = Self {
            coord,
            inpoel,
            gid,
            lid,
            side_sets: BTreeMap::new(),
        };
        mesh.validate_jacobians()?;
        Ok(mesh)
    }

    /// Attach a side set of boundary triangles (local node ids).
    pub fn with_side_set(mut self, id: i32, faces: Vec<[usize; 3]>) -> Self {
        self.side_sets.entry(id).or_default().extend(faces);
        self
    }

    /// Check every element Jacobian, returning them on success.
    pub fn validate_jacobians(&self) -> Result<Vec<f64>, MeshError> {
        let mut jac = Vec::with_capacity(self.inpoel.len());
        for e in 0..self.inpoel.len() {
            let nodes = self.inpoel[e].map(|p| self.gid[p]);
            jac.push(checked_jacobian(ElementIndex::new(e), nodes, &self.element_coords(e))?);
        }
        Ok(jac)
    }

    pub fn n_nodes(&self) -> usize {
        self.coord[0].len()
    }

    pub fn n_elements(&self) -> usize {
        self.inpoel.len()
    }

    pub fn coord(&self) -> &[Vec<f64>; 3] {
        &self.coord
    }

    pub fn inpoel(&self) -> &[[usize; 4]] {
        &self.inpoel
    }

    #[inline]
    pub fn element_nodes(&self, e: usize) -> [usize; 4] {
        self.inpoel[e]
    }

    #[inline]
    pub fn point(&self, p: usize) -> Vec3 {
        [self.coord[0][p], self.coord[1][p], self.coord[2][p]]
    }

    /// Vertex coordinates of element `e`.
    #[inline]
    pub fn element_coords(&self, e: usize) -> TetCoords {
        let n = self.inpoel[e];
        [self.point(n[0]), self.point(n[1]), self.point(n[2]), self.point(n[3])]
    }

    /// Local-to-global node id map.
    pub fn gid(&self) -> &[usize] {
        &self.gid
    }

    /// Global-to-local lookup.
    pub fn lid(&self, global: usize) -> Option<usize> {
        self.lid.get(&global).copied()
    }

    pub fn side_sets(&self) -> &BTreeMap<i32, Vec<[usize; 3]>> {
        &self.side_sets
    }

    /// Sorted, unique local nodes of a side set (empty for unknown ids).
    pub fn side_set_nodes(&self, id: i32) -> Vec<usize> {
        let nodes: BTreeSet<usize> = self
            .side_sets
            .get(&id)
            .map(|faces| faces.iter().flatten().copied().collect())
            .unwrap_or_default();
        nodes.into_iter().collect()
    }

    /// Side-set id → sorted node list, for every side set.
    pub fn side_set_node_map(&self) -> BTreeMap<i32, Vec<usize>> {
        self.side_sets
            .keys()
            .map(|&id| (id, self.side_set_nodes(id)))
            .collect()
    }

    /// Structured box of `nx × ny × nz` hexahedra, each split into six
    /// tetrahedra along the main diagonal.
    ///
    /// Used as a verification fixture. Side sets 1..=6 are the faces
    /// x = lo, x = hi, y = lo, y = hi, z = lo, z = hi.
    pub fn structured_box(n: [usize; 3], lo: Vec3, hi: Vec3) -> Result<Self, MeshError> {
        if n.iter().any(|&k| k == 0) {
            return Err(MeshError::InvalidBox(format!("cell counts must be positive, got {n:?}")));
        }
        if (0..3).any(|j| hi[j] <= lo[j]) {
            return Err(MeshError::InvalidBox(format!("empty extent {lo:?}..{hi:?}")));
        }

        let [nx, ny, nz] = n;
        let node = |i: usize, j: usize, k: usize| i + (nx + 1) * (j + (ny + 1) * k);
        let npoin = (nx + 1) * (ny + 1) * (nz + 1);

        let mut coord = [
            Vec::with_capacity(npoin),
            Vec::with_capacity(npoin),
            Vec::with_capacity(npoin),
        ];
        for k in 0..=nz {
            for j in 0..=ny {
                for i in 0..=nx {
                    coord[0].push(lo[0] + (hi[0] - lo[0]) * i as f64 / nx as f64);
                    coord[1].push(lo[1] + (hi[1] - lo[1]) * j as f64 / ny as f64);
                    coord[2].push(lo[2] + (hi[2] - lo[2]) * k as f64 / nz as f64);
                }
            }
        }

        // Kuhn subdivision: one tet per axis permutation, walking from the
        // low corner to the high corner of the cell.
        const PERMS: [[usize; 3]; 6] = [
            [0, 1, 2],
            [0, 2, 1],
            [1, 0, 2],
            [1, 2, 0],
            [2, 0, 1],
            [2, 1, 0],
        ];
        let mut inpoel = Vec::with_capacity(6 * nx * ny * nz);
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    for perm in PERMS {
                        let mut ijk = [i, j, k];
                        let mut tet = [node(i, j, k); 4];
                        for (step, &axis) in perm.iter().enumerate() {
                            ijk[axis] += 1;
                            tet[step + 1] = node(ijk[0], ijk[1], ijk[2]);
                        }
                        let pts = tet.map(|p| [coord[0][p], coord[1][p], coord[2][p]]);
                        if jacobian(&pts) < 0.0 {
                            tet.swap(2, 3);
                        }
                        inpoel.push(tet);
                    }
                }
            }
        }

        let mut mesh = Self::new(coord, inpoel)?;

        // classify exterior faces by which box face they lie on
        let mut count: HashMap<[usize; 3], ([usize; 3], usize)> = HashMap::new();
        for nodes in &mesh.inpoel {
            for f in super::LPOFA {
                let tri = [nodes[f[0]], nodes[f[1]], nodes[f[2]]];
                let mut key = tri;
                key.sort_unstable();
                count.entry(key).or_insert((tri, 0)).1 += 1;
            }
        }
        let tol = 1e-12 * (0..3).map(|j| hi[j] - lo[j]).fold(0.0, f64::max);
        let mut sides: BTreeMap<i32, Vec<[usize; 3]>> = BTreeMap::new();
        let mut exterior: Vec<[usize; 3]> = count
            .into_values()
            .filter(|&(_, c)| c == 1)
            .map(|(tri, _)| tri)
            .collect();
        exterior.sort_unstable();
        for tri in exterior {
            let p: Vec<Vec3> = tri.iter().map(|&v| mesh.point(v)).collect();
            for axis in 0..3 {
                if p.iter().all(|x| (x[axis] - lo[axis]).abs() < tol) {
                    sides.entry(2 * axis as i32 + 1).or_default().push(tri);
                } else if p.iter().all(|x| (x[axis] - hi[axis]).abs() < tol) {
                    sides.entry(2 * axis as i32 + 2).or_default().push(tri);
                }
            }
        }
        mesh.side_sets = sides;
        Ok(mesh)
    }

    /// Sub-mesh made of `elements` (local ids of `self`).
    ///
    /// Nodes are renumbered in order of first appearance but keep their
    /// global ids. Side-set triangles that bound a kept element are kept.
    ///
    /// # Panics
    /// Panics if an element index is out of range.
    pub fn subset(&self, elements: &[usize]) -> Result<Self, MeshError> {
        let mut local: HashMap<usize, usize> = HashMap::new();
        let mut order = Vec::new();
        for &e in elements {
            for &p in &self.inpoel[e] {
                local.entry(p).or_insert_with(|| {
                    order.push(p);
                    order.len() - 1
                });
            }
        }

        let coord = [0, 1, 2].map(|j| order.iter().map(|&p| self.coord[j][p]).collect());
        let inpoel = elements
            .iter()
            .map(|&e| self.inpoel[e].map(|p| local[&p]))
            .collect();
        let gid = order.iter().map(|&p| self.gid[p]).collect();
        let mut mesh = Self::with_global_ids(coord, inpoel, gid)?;

        let kept_faces: HashSet<[usize; 3]> = elements
            .iter()
            .flat_map(|&e| {
                let n = self.inpoel[e];
                super::LPOFA.map(|f| {
                    let mut key = [n[f[0]], n[f[1]], n[f[2]]];
                    key.sort_unstable();
                    key
                })
            })
            .collect();
        for (&id, tris) in &self.side_sets {
            let kept: Vec<[usize; 3]> = tris
                .iter()
                .filter(|tri| {
                    let mut key = **tri;
                    key.sort_unstable();
                    kept_faces.contains(&key)
                })
                .map(|tri| tri.map(|p| local[&p]))
                .collect();
            if !kept.is_empty() {
                mesh.side_sets.insert(id, kept);
            }
        }
        Ok(mesh)
    }
}
