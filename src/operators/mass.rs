//! Element mass matrices for the modal Dubiner basis.
//!
//! The basis is orthogonal on the reference tetrahedron and the element map
//! is affine, so the mass matrix of every element is diagonal:
//! M = |K| diag(MASS_DIAGONAL).

use faer::Mat;

use crate::polynomial::{MASS_DIAGONAL, MAX_NDOF, TetRule, eval_basis, gauss_tet};

/// Diagonal of the element mass matrix.
pub fn mass_diagonal(ndof: usize, volume: f64) -> [f64; MAX_NDOF] {
    let mut m = [0.0; MAX_NDOF];
    for k in 0..ndof.min(MAX_NDOF) {
        m[k] = volume * MASS_DIAGONAL[k];
    }
    m
}

/// Assemble the full element mass matrix by quadrature.
///
/// Used to verify orthogonality; the solver only needs [`mass_diagonal`].
pub fn mass_matrix(ndof: usize, volume: f64) -> Mat<f64> {
    let q = gauss_tet(TetRule::P14);
    let mut m = Mat::zeros(ndof, ndof);
    for (p, w) in q.points.iter().zip(&q.weights) {
        let b = eval_basis(ndof, p[0], p[1], p[2]);
        for i in 0..ndof {
            for j in 0..ndof {
                m[(i, j)] += volume * w * b[i] * b[j];
            }
        }
    }
    m
}

/// Compute the inverse mass matrix (diagonal).
pub fn mass_matrix_inv(ndof: usize, volume: f64) -> Mat<f64> {
    let mut m_inv = Mat::zeros(ndof, ndof);
    for k in 0..ndof {
        m_inv[(k, k)] = 1.0 / (volume * MASS_DIAGONAL[k]);
    }
    m_inv
}
