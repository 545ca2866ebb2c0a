//! Geometric primitives for linear tetrahedra and triangles.
//!
//! The reference tetrahedron has vertices (0,0,0), (1,0,0), (0,1,0), (0,0,1).
//! The affine map to physical space is
//!
//! x(ξ, η, ζ) = x₀ + (x₁-x₀) ξ + (x₂-x₀) η + (x₃-x₀) ζ
//!
//! so the Jacobian matrix is constant per element and its determinant is six
//! times the signed volume. The rows of the inverse Jacobian are the
//! physical gradients of the reference coordinates, which are also the
//! gradients of the P1 shape functions of vertices 1, 2 and 3.

use crate::mesh::MeshError;
use crate::types::ElementIndex;

/// Three-component vector.
pub type Vec3 = [f64; 3];

/// Vertex coordinates of one tetrahedron.
pub type TetCoords = [Vec3; 4];

/// Vertex coordinates of one triangle.
pub type TriCoords = [Vec3; 3];

#[inline]
pub fn sub(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
pub fn dot(a: Vec3, b: Vec3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
pub fn cross(a: Vec3, b: Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Cross product divided by a scalar.
#[inline]
pub fn crossdiv(a: Vec3, b: Vec3, d: f64) -> Vec3 {
    let c = cross(a, b);
    [c[0] / d, c[1] / d, c[2] / d]
}

/// Scalar triple product a · (b × c).
#[inline]
pub fn triple(a: Vec3, b: Vec3, c: Vec3) -> f64 {
    dot(a, cross(b, c))
}

#[inline]
pub fn length(a: Vec3) -> f64 {
    dot(a, a).sqrt()
}

/// Jacobian determinant of the reference-to-physical map (6 × signed volume).
///
/// # Example
///
/// ```
/// use inciter::operators::jacobian;
///
/// let tet = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
/// assert!((jacobian(&tet) - 1.0).abs() < 1e-14);
/// ```
#[inline]
pub fn jacobian(p: &TetCoords) -> f64 {
    let ba = sub(p[1], p[0]);
    let ca = sub(p[2], p[0]);
    let da = sub(p[3], p[0]);
    triple(ba, ca, da)
}

/// Jacobian determinant of element `element`, rejecting non-positive
/// values.
///
/// `nodes` are the global node ids reported in the error.
pub fn checked_jacobian(
    element: ElementIndex,
    nodes: [usize; 4],
    p: &TetCoords,
) -> Result<f64, MeshError> {
    let j = jacobian(p);
    if j > 0.0 {
        Ok(j)
    } else {
        Err(MeshError::NonPositiveJacobian {
            element,
            nodes,
            jacobian: j,
        })
    }
}

/// Inverse of the Jacobian matrix.
///
/// Row `j` holds ∂ξ_j/∂x, so `inv[j][i] = ∂ξ_j/∂x_i`. The caller must have
/// verified that the determinant is positive.
pub fn inverse_jacobian(p: &TetCoords) -> [Vec3; 3] {
    let ba = sub(p[1], p[0]);
    let ca = sub(p[2], p[0]);
    let da = sub(p[3], p[0]);
    let det = triple(ba, ca, da);
    [crossdiv(ca, da, det), crossdiv(da, ba, det), crossdiv(ba, ca, det)]
}

/// Gradients of the four P1 shape functions, `grad[a][j] = ∂N_a/∂x_j`.
///
/// Returns the gradients together with the Jacobian determinant.
pub fn shape_gradients(p: &TetCoords) -> ([Vec3; 4], f64) {
    let ba = sub(p[1], p[0]);
    let ca = sub(p[2], p[0]);
    let da = sub(p[3], p[0]);
    let det = triple(ba, ca, da);
    let mut grad = [[0.0; 3]; 4];
    grad[1] = crossdiv(ca, da, det);
    grad[2] = crossdiv(da, ba, det);
    grad[3] = crossdiv(ba, ca, det);
    for i in 0..3 {
        grad[0][i] = -grad[1][i] - grad[2][i] - grad[3][i];
    }
    (grad, det)
}

/// Values of the four P1 shape functions at a reference point.
#[inline]
pub fn shape_functions(xi: f64, eta: f64, zeta: f64) -> [f64; 4] {
    [1.0 - xi - eta - zeta, xi, eta, zeta]
}

/// Map a physical point into reference coordinates of a tetrahedron.
pub fn reference_coordinates(p: &TetCoords, x: Vec3) -> Vec3 {
    let inv = inverse_jacobian(p);
    let d = sub(x, p[0]);
    [dot(inv[0], d), dot(inv[1], d), dot(inv[2], d)]
}

/// Map a reference point to physical coordinates.
pub fn physical_coordinates(p: &TetCoords, xi: Vec3) -> Vec3 {
    let n = shape_functions(xi[0], xi[1], xi[2]);
    let mut x = [0.0; 3];
    for (a, na) in n.iter().enumerate() {
        for j in 0..3 {
            x[j] += na * p[a][j];
        }
    }
    x
}

/// Centroid of a tetrahedron.
pub fn tet_centroid(p: &TetCoords) -> Vec3 {
    let mut c = [0.0; 3];
    for v in p {
        for j in 0..3 {
            c[j] += 0.25 * v[j];
        }
    }
    c
}

/// Area of a triangle.
pub fn triangle_area(t: &TriCoords) -> f64 {
    0.5 * length(cross(sub(t[1], t[0]), sub(t[2], t[0])))
}

/// Unit normal of a triangle following the right-hand rule on its vertex order.
pub fn triangle_normal(t: &TriCoords) -> Vec3 {
    let n = cross(sub(t[1], t[0]), sub(t[2], t[0]));
    let l = length(n);
    [n[0] / l, n[1] / l, n[2] / l]
}

/// Centroid of a triangle.
pub fn triangle_centroid(t: &TriCoords) -> Vec3 {
    let mut c = [0.0; 3];
    for v in t {
        for j in 0..3 {
            c[j] += v[j] / 3.0;
        }
    }
    c
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    #[test]
    fn test_checked_jacobian_rejects_flat_element() {
        let flat = [[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]];
        match checked_jacobian(ElementIndex::new(3), [7, 8, 9, 10], &flat) {
            Err(MeshError::NonPositiveJacobian { element, nodes, jacobian }) => {
                assert_eq!(element.get(), 3);
                assert_eq!(nodes, [7, 8, 9, 10]);
                assert_eq!(jacobian, 0.0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    fn skewed_tet() -> TetCoords {
        [
            [0.1, 0.2, -0.3],
            [1.3, 0.1, 0.2],
            [0.4, 1.1, 0.1],
            [0.2, 0.3, 0.9],
        ]
    }

    #[test]
    fn test_reference_jacobian() {
        let tet = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
        assert!((jacobian(&tet) - 1.0).abs() < TOL);
        let inv = inverse_jacobian(&tet);
        for j in 0..3 {
            for i in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((inv[j][i] - expected).abs() < TOL);
            }
        }
    }

    #[test]
    fn test_swapped_vertices_flip_sign() {
        let mut tet = skewed_tet();
        let j = jacobian(&tet);
        assert!(j > 0.0);
        tet.swap(1, 2);
        assert!((jacobian(&tet) + j).abs() < TOL);
    }

    #[test]
    fn test_shape_gradients_sum_to_zero() {
        let (grad, det) = shape_gradients(&skewed_tet());
        assert!(det > 0.0);
        for j in 0..3 {
            let s: f64 = grad.iter().map(|g| g[j]).sum();
            assert!(s.abs() < TOL);
        }
    }

    #[test]
    fn test_shape_gradients_reproduce_linear_field() {
        // u = 2x - y + 3z + 1
        let tet = skewed_tet();
        let (grad, _) = shape_gradients(&tet);
        let u: Vec<f64> = tet.iter().map(|p| 2.0 * p[0] - p[1] + 3.0 * p[2] + 1.0).collect();
        let expected = [2.0, -1.0, 3.0];
        for j in 0..3 {
            let g: f64 = (0..4).map(|a| grad[a][j] * u[a]).sum();
            assert!((g - expected[j]).abs() < 1e-10);
        }
    }

    #[test]
    fn test_reference_round_trip() {
        let tet = skewed_tet();
        let xi = [0.2, 0.3, 0.1];
        let x = physical_coordinates(&tet, xi);
        let back = reference_coordinates(&tet, x);
        for j in 0..3 {
            assert!((back[j] - xi[j]).abs() < TOL);
        }
    }

    #[test]
    fn test_shape_functions_partition_unity() {
        for &(a, b, c) in &[(0.0, 0.0, 0.0), (0.25, 0.25, 0.25), (0.1, 0.6, 0.2)] {
            let s: f64 = shape_functions(a, b, c).iter().sum();
            assert!((s - 1.0).abs() < TOL);
        }
    }

    #[test]
    fn test_triangle_area_and_normal() {
        let t = [[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        assert!((triangle_area(&t) - 1.0).abs() < TOL);
        let n = triangle_normal(&t);
        assert!((n[2] - 1.0).abs() < TOL);
        let c = triangle_centroid(&t);
        assert!((c[0] - 2.0 / 3.0).abs() < TOL);
    }
}
