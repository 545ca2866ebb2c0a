//! A mesh partition bundled with its derived data.

use super::{FaceData, MeshAdjacency, MeshError, MeshGeometry, TetMesh};

/// Mesh chunk owned by one worker: connectivity plus everything derived
/// from it once at setup.
#[derive(Clone, Debug)]
pub struct MeshPartition {
    pub mesh: TetMesh,
    pub adjacency: MeshAdjacency,
    pub faces: FaceData,
    pub geometry: MeshGeometry,
}

impl MeshPartition {
    pub fn new(mesh: TetMesh) -> Result<Self, MeshError> {
        let adjacency = MeshAdjacency::new(&mesh);
        let faces = FaceData::new(&mesh, &adjacency)?;
        let geometry = MeshGeometry::new(&mesh, &faces)?;
        log::info!(
            "partition ready: {} elements, {} faces ({} boundary), {} side sets",
            mesh.n_elements(),
            faces.n_faces(),
            faces.nbfac(),
            mesh.side_sets().len()
        );
        Ok(Self {
            mesh,
            adjacency,
            faces,
            geometry,
        })
    }

    pub fn n_elements(&self) -> usize {
        self.mesh.n_elements()
    }

    pub fn n_nodes(&self) -> usize {
        self.mesh.n_nodes()
    }
}
