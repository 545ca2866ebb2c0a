//! Orthogonal Dubiner basis on the reference tetrahedron.
//!
//! The modal DG solution in an element is u(ξ) = Σ_k U_k B_k(ξ) with
//! B_0 = 1, so U_0 is the cell average. The first four functions span P1,
//! the first ten span P2:
//!
//! | ndof | order |
//! |-----:|------:|
//! | 1    | P0    |
//! | 4    | P1    |
//! | 10   | P2    |
//!
//! The basis is L2-orthogonal; see [`MASS_DIAGONAL`].

use crate::operators::Vec3;

/// Largest supported number of dofs per element.
pub const MAX_NDOF: usize = 10;

/// Diagonal of the reference mass matrix divided by the element volume.
pub const MASS_DIAGONAL: [f64; MAX_NDOF] = [
    1.0,
    1.0 / 10.0,
    3.0 / 10.0,
    3.0 / 5.0,
    1.0 / 35.0,
    1.0 / 21.0,
    1.0 / 14.0,
    1.0 / 7.0,
    3.0 / 14.0,
    3.0 / 7.0,
];

/// Basis values; only the first `ndof` entries are meaningful.
pub type BasisValues = [f64; MAX_NDOF];

/// Basis gradients; only the first `ndof` entries are meaningful.
pub type BasisGradients = [Vec3; MAX_NDOF];

/// Polynomial degree represented by `ndof` dofs.
pub fn degree_of(ndof: usize) -> usize {
    match ndof {
        1 => 0,
        4 => 1,
        _ => 2,
    }
}

/// True for the dof counts the basis supports.
pub fn is_supported_ndof(ndof: usize) -> bool {
    matches!(ndof, 1 | 4 | 10)
}

/// Evaluate the first `ndof` basis functions at a reference point.
///
/// # Example
///
/// ```
/// use inciter::polynomial::eval_basis;
///
/// let b = eval_basis(4, 0.25, 0.25, 0.25);
/// assert!((b[0] - 1.0).abs() < 1e-14);
/// // P1 modes vanish at the centroid
/// assert!(b[1].abs() < 1e-14 && b[2].abs() < 1e-14 && b[3].abs() < 1e-14);
/// ```
pub fn eval_basis(ndof: usize, xi: f64, eta: f64, zeta: f64) -> BasisValues {
    let mut b = [0.0; MAX_NDOF];
    b[0] = 1.0;
    if ndof > 1 {
        b[1] = 2.0 * xi + eta + zeta - 1.0;
        b[2] = 3.0 * eta + zeta - 1.0;
        b[3] = 4.0 * zeta - 1.0;
    }
    if ndof > 4 {
        let (x, y, z) = (xi, eta, zeta);
        b[4] = 6.0 * x * x + y * y + z * z + 6.0 * x * y + 6.0 * x * z + 2.0 * y * z
            - 6.0 * x
            - 2.0 * y
            - 2.0 * z
            + 1.0;
        b[5] = 5.0 * y * y + z * z + 10.0 * x * y + 2.0 * x * z + 6.0 * y * z
            - 2.0 * x
            - 6.0 * y
            - 2.0 * z
            + 1.0;
        b[6] = 6.0 * z * z + 12.0 * x * z + 6.0 * y * z - 2.0 * x - y - 7.0 * z + 1.0;
        b[7] = 10.0 * y * y + z * z + 8.0 * y * z - 8.0 * y - 2.0 * z + 1.0;
        b[8] = 6.0 * z * z + 18.0 * y * z - 3.0 * y - 7.0 * z + 1.0;
        b[9] = 15.0 * z * z - 10.0 * z + 1.0;
    }
    b
}

/// Reference-space derivatives ∂B_k/∂(ξ, η, ζ) at a point.
pub fn eval_dbdxi(ndof: usize, xi: f64, eta: f64, zeta: f64) -> BasisGradients {
    let mut d = [[0.0; 3]; MAX_NDOF];
    if ndof > 1 {
        d[1] = [2.0, 1.0, 1.0];
        d[2] = [0.0, 3.0, 1.0];
        d[3] = [0.0, 0.0, 4.0];
    }
    if ndof > 4 {
        let (x, y, z) = (xi, eta, zeta);
        d[4] = [
            12.0 * x + 6.0 * y + 6.0 * z - 6.0,
            6.0 * x + 2.0 * y + 2.0 * z - 2.0,
            6.0 * x + 2.0 * y + 2.0 * z - 2.0,
        ];
        d[5] = [
            10.0 * y + 2.0 * z - 2.0,
            10.0 * x + 10.0 * y + 6.0 * z - 6.0,
            2.0 * x + 6.0 * y + 2.0 * z - 2.0,
        ];
        d[6] = [12.0 * z - 2.0, 6.0 * z - 1.0, 12.0 * x + 6.0 * y + 12.0 * z - 7.0];
        d[7] = [0.0, 20.0 * y + 8.0 * z - 8.0, 8.0 * y + 2.0 * z - 2.0];
        d[8] = [0.0, 18.0 * z - 3.0, 18.0 * y + 12.0 * z - 7.0];
        d[9] = [0.0, 0.0, 30.0 * z - 10.0];
    }
    d
}

/// Map reference derivatives to physical space with the inverse Jacobian.
fn to_physical(ndof: usize, dref: &BasisGradients, jac_inv: &[Vec3; 3]) -> BasisGradients {
    let mut d = [[0.0; 3]; MAX_NDOF];
    for k in 1..ndof.min(MAX_NDOF) {
        for i in 0..3 {
            d[k][i] = dref[k][0] * jac_inv[0][i] + dref[k][1] * jac_inv[1][i] + dref[k][2] * jac_inv[2][i];
        }
    }
    d
}

/// Physical derivatives of the P1 modes; constant over an element.
pub fn eval_dbdx_p1(ndof: usize, jac_inv: &[Vec3; 3]) -> BasisGradients {
    let dref = eval_dbdxi(ndof.min(4), 0.0, 0.0, 0.0);
    to_physical(ndof.min(4), &dref, jac_inv)
}

/// Physical derivatives of all modes at a reference point (P2 modes are
/// point-dependent).
pub fn eval_dbdx_p2(ndof: usize, point: Vec3, jac_inv: &[Vec3; 3]) -> BasisGradients {
    let dref = eval_dbdxi(ndof, point[0], point[1], point[2]);
    to_physical(ndof, &dref, jac_inv)
}

/// Physical basis derivatives at a point for any supported `ndof`.
pub fn eval_dbdx(ndof: usize, point: Vec3, jac_inv: &[Vec3; 3]) -> BasisGradients {
    if ndof > 4 {
        eval_dbdx_p2(ndof, point, jac_inv)
    } else {
        eval_dbdx_p1(ndof, jac_inv)
    }
}

/// Evaluate `ncomp` components of a modal state at a point.
///
/// `dofs` holds component `c`, mode `k` at index `c * stride + k`; only
/// the first `ndof` modes are summed.
pub fn eval_state(ncomp: usize, stride: usize, ndof: usize, dofs: &[f64], b: &BasisValues) -> Vec<f64> {
    let mut u = vec![0.0; ncomp];
    for (c, uc) in u.iter_mut().enumerate() {
        let base = c * stride;
        *uc = (0..ndof).map(|k| dofs[base + k] * b[k]).sum();
    }
    u
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polynomial::{TetRule, gauss_tet};

    const TOL: f64 = 1e-12;

    #[test]
    fn test_orthogonality_and_mass_diagonal() {
        let q = gauss_tet(TetRule::P14);
        for i in 0..MAX_NDOF {
            for j in 0..MAX_NDOF {
                let m: f64 = q
                    .points
                    .iter()
                    .zip(&q.weights)
                    .map(|(p, w)| {
                        let b = eval_basis(10, p[0], p[1], p[2]);
                        w * b[i] * b[j]
                    })
                    .sum();
                let expected = if i == j { MASS_DIAGONAL[i] } else { 0.0 };
                assert!((m - expected).abs() < TOL, "M[{i}][{j}] = {m}");
            }
        }
    }

    #[test]
    fn test_higher_modes_have_zero_mean() {
        let q = gauss_tet(TetRule::P11);
        for k in 1..MAX_NDOF {
            let mean: f64 = q
                .points
                .iter()
                .zip(&q.weights)
                .map(|(p, w)| w * eval_basis(10, p[0], p[1], p[2])[k])
                .sum();
            assert!(mean.abs() < TOL, "mode {k} mean = {mean}");
        }
    }

    #[test]
    fn test_reference_derivatives_match_finite_differences() {
        let h = 1e-6;
        let p = [0.21, 0.17, 0.33];
        let d = eval_dbdxi(10, p[0], p[1], p[2]);
        for dir in 0..3 {
            let mut pp = p;
            let mut pm = p;
            pp[dir] += h;
            pm[dir] -= h;
            let bp = eval_basis(10, pp[0], pp[1], pp[2]);
            let bm = eval_basis(10, pm[0], pm[1], pm[2]);
            for k in 0..MAX_NDOF {
                let fd = (bp[k] - bm[k]) / (2.0 * h);
                assert!((fd - d[k][dir]).abs() < 1e-6, "mode {k} dir {dir}");
            }
        }
    }

    #[test]
    fn test_physical_derivatives_on_reference_tet() {
        let identity = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
        let d = eval_dbdx_p1(4, &identity);
        assert_eq!(d[1], [2.0, 1.0, 1.0]);
        assert_eq!(d[3], [0.0, 0.0, 4.0]);
        assert_eq!(d[0], [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_eval_state_uses_stride() {
        // two components, stride 4, P1 dofs
        let dofs = [1.0, 0.5, 0.0, 0.0, 2.0, 0.0, 0.0, 0.25];
        let b = eval_basis(4, 0.0, 0.0, 0.0);
        let u = eval_state(2, 4, 4, &dofs, &b);
        // at the origin B1 = -1, B3 = -1
        assert!((u[0] - 0.5).abs() < TOL);
        assert!((u[1] - 1.75).abs() < TOL);
    }
}
