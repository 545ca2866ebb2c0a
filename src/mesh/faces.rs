//! Face connectivity for discontinuous Galerkin integration.
//!
//! Faces are numbered boundary-first: indices `0..nbfac` are exterior faces
//! of the partition, the rest are internal. Every face stores its nodes
//! ordered so the right-hand normal points out of the left element, the left
//! element, and the right element for internal faces.

use std::collections::{BTreeMap, HashMap};

use super::{LPOFA, MeshAdjacency, MeshError, TetMesh};
use crate::types::{ElementIndex, FaceIndex};

/// One triangular face.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Face {
    /// Local node ids, oriented outward from `left`
    pub nodes: [usize; 3],
    /// Element on the inner side of the normal
    pub left: ElementIndex,
    /// Element on the outer side (None on the partition boundary)
    pub right: Option<ElementIndex>,
}

impl Face {
    pub fn is_boundary(&self) -> bool {
        self.right.is_none()
    }
}

/// Face list with side-set membership of boundary faces.
#[derive(Clone, Debug)]
pub struct FaceData {
    faces: Vec<Face>,
    nbfac: usize,
    bface: BTreeMap<i32, Vec<FaceIndex>>,
    face_side_set: Vec<Option<i32>>,
}

impl FaceData {
    /// Build the face list and resolve side-set triangles to boundary faces.
    pub fn new(mesh: &TetMesh, adjacency: &MeshAdjacency) -> Result<Self, MeshError> {
        let inpoel = mesh.inpoel();
        let mut boundary = Vec::new();
        let mut internal = Vec::new();

        for (e, nodes) in inpoel.iter().enumerate() {
            for (f, lf) in LPOFA.iter().enumerate() {
                let tri = [nodes[lf[0]], nodes[lf[1]], nodes[lf[2]]];
                match adjacency.esuel[e][f] {
                    None => boundary.push(Face {
                        nodes: tri,
                        left: ElementIndex::new(e),
                        right: None,
                    }),
                    Some(nb) if e < nb => internal.push(Face {
                        nodes: tri,
                        left: ElementIndex::new(e),
                        right: Some(ElementIndex::new(nb)),
                    }),
                    Some(_) => {}
                }
            }
        }

        let nbfac = boundary.len();
        let mut lookup: HashMap<[usize; 3], usize> = HashMap::with_capacity(nbfac);
        for (i, face) in boundary.iter().enumerate() {
            let mut key = face.nodes;
            key.sort_unstable();
            lookup.insert(key, i);
        }

        let mut bface: BTreeMap<i32, Vec<FaceIndex>> = BTreeMap::new();
        let mut face_side_set = vec![None; nbfac];
        for (&id, tris) in mesh.side_sets() {
            for tri in tris {
                let mut key = *tri;
                key.sort_unstable();
                let Some(&f) = lookup.get(&key) else {
                    return Err(MeshError::SideSetFaceNotFound { side_set: id, face: *tri });
                };
                face_side_set[f] = Some(id);
                bface.entry(id).or_default().push(FaceIndex::new(f));
            }
        }

        let untagged = face_side_set.iter().filter(|s| s.is_none()).count();
        if untagged > 0 {
            log::debug!("{untagged} of {nbfac} boundary faces belong to no side set");
        }

        let mut faces = boundary;
        faces.extend(internal);
        Ok(Self {
            faces,
            nbfac,
            bface,
            face_side_set,
        })
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    #[inline]
    pub fn face(&self, f: FaceIndex) -> &Face {
        &self.faces[f]
    }

    pub fn n_faces(&self) -> usize {
        self.faces.len()
    }

    /// Number of boundary faces (they occupy indices `0..nbfac`).
    pub fn nbfac(&self) -> usize {
        self.nbfac
    }

    /// Boundary faces of each side set.
    pub fn bface(&self) -> &BTreeMap<i32, Vec<FaceIndex>> {
        &self.bface
    }

    /// Side set of a boundary face, if any.
    pub fn side_set_of(&self, f: FaceIndex) -> Option<i32> {
        self.face_side_set.get(f.get()).copied().flatten()
    }

    /// Outward-oriented boundary triangles of every side set.
    pub fn side_set_triangles(&self) -> Vec<[usize; 3]> {
        self.bface
            .values()
            .flatten()
            .map(|&f| self.faces[f].nodes)
            .collect()
    }

    /// Internal faces, as indices.
    pub fn internal(&self) -> impl Iterator<Item = FaceIndex> + '_ {
        (self.nbfac..self.faces.len()).map(FaceIndex::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_faces() {
        let mesh = TetMesh::structured_box([2, 1, 1], [0.0; 3], [2.0, 1.0, 1.0]).unwrap();
        let adj = MeshAdjacency::new(&mesh);
        let fd = FaceData::new(&mesh, &adj).unwrap();
        // every element has four faces; boundary faces counted once,
        // internal faces twice
        assert_eq!(fd.nbfac() + 2 * (fd.n_faces() - fd.nbfac()), 4 * mesh.n_elements());
        // every exterior face of the box fixture is tagged
        for f in 0..fd.nbfac() {
            assert!(fd.side_set_of(FaceIndex::new(f)).is_some());
        }
        for f in fd.internal() {
            assert!(fd.face(f).right.is_some());
        }
        assert_eq!(fd.side_set_triangles().len(), fd.nbfac());
    }

    #[test]
    fn test_unknown_side_set_triangle() {
        let mesh = TetMesh::structured_box([1, 1, 1], [0.0; 3], [1.0; 3])
            .unwrap()
            .with_side_set(9, vec![[0, 7, 1]]);
        let adj = MeshAdjacency::new(&mesh);
        let err = FaceData::new(&mesh, &adj).unwrap_err();
        assert!(matches!(err, MeshError::SideSetFaceNotFound { side_set: 9, .. }));
    }
}
