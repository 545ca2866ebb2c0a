//! Modal basis and quadrature on tetrahedra.
//!
//! This module provides:
//! - The orthogonal Dubiner basis for P0, P1 and P2 on the reference tetrahedron
//! - Symmetric Gauss rules on the reference tetrahedron and triangle
//! - Point-count selection by degrees of freedom

mod dubiner;
mod quadrature;

pub use dubiner::{
    BasisGradients, BasisValues, MASS_DIAGONAL, MAX_NDOF, degree_of, eval_basis, eval_dbdx,
    eval_dbdx_p1, eval_dbdx_p2, eval_dbdxi, eval_state, is_supported_ndof,
};
pub use quadrature::{
    QuadratureError, TetQuadrature, TetRule, TriQuadrature, TriRule, gauss_tet, gauss_tri,
    ng_face, ng_init, ng_vol, tet_rule_for_degree, tri_rule_for_degree,
};
