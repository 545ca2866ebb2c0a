//! Mesh construction and validation errors.

use thiserror::Error;

use crate::types::ElementIndex;

/// Errors raised while building or validating a mesh partition.
///
/// All of them are fatal: no partial result is meaningful once the mesh is
/// inconsistent.
#[derive(Debug, Error)]
pub enum MeshError {
    /// Left-handed or degenerate tetrahedron.
    #[error("element {element} has non-positive Jacobian {jacobian:e} (global node ids {nodes:?})")]
    NonPositiveJacobian {
        element: ElementIndex,
        nodes: [usize; 4],
        jacobian: f64,
    },

    /// Connectivity refers to a node that does not exist.
    #[error("element {element} references node {node} but the partition has {nnode} nodes")]
    NodeOutOfRange {
        element: ElementIndex,
        node: usize,
        nnode: usize,
    },

    /// Coordinate arrays have different lengths.
    #[error("coordinate arrays differ in length: x={x}, y={y}, z={z}")]
    CoordinateLengthMismatch { x: usize, y: usize, z: usize },

    /// Local-to-global map does not cover every node.
    #[error("global id map has {found} entries for {expected} nodes")]
    GlobalIdLengthMismatch { expected: usize, found: usize },

    /// The same global id is used by two local nodes.
    #[error("global id {0} appears more than once")]
    DuplicateGlobalId(usize),

    /// A side-set triangle is not the boundary face of any element.
    #[error("side set {side_set}: triangle {face:?} is not a boundary face of the partition")]
    SideSetFaceNotFound { side_set: i32, face: [usize; 3] },

    /// Invalid arguments to the structured box fixture.
    #[error("invalid box mesh: {0}")]
    InvalidBox(String),
}
