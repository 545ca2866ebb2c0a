//! Tetrahedral mesh partitions.
//!
//! Provides:
//! - `TetMesh`: coordinates, connectivity, global ids and side sets
//! - `MeshAdjacency`: surrounding points/elements, edges and face neighbours
//! - `FaceData`: boundary-first face list with side-set membership
//! - `MeshGeometry`: volumes, centroids, face normals and dual-face normals
//! - `MeshPartition`: all of the above built once for a worker

mod adjacency;
mod error;
mod faces;
mod geometry;
mod partition;
mod tet_mesh;

pub use adjacency::{Csr, Edge, LPOED, LPOFA, MeshAdjacency, edge_key, orient};
pub use error::MeshError;
pub use faces::{Face, FaceData};
pub use geometry::{ElementGeometry, FaceGeometry, MeshGeometry};
pub use partition::MeshPartition;
pub use tet_mesh::TetMesh;
