//! Face-neighbour least-squares reconstruction of P1 gradients.
//!
//! For element e with face neighbours j the gradient g minimises
//! Σ_j |u_j - u_e - g·Δx_j|², giving the normal equations
//!
//! (Σ_j Δx_j Δx_jᵀ) g = Σ_j Δx_j (u_j - u_e)
//!
//! The matrix depends on geometry only and is built once; the right-hand
//! side is rebuilt every stage from cell averages.

use crate::mesh::{FaceData, MeshGeometry, TetMesh};
use crate::operators::{Vec3, sub};
use crate::solver::Fields;
use crate::types::FaceIndex;

use super::ReconstructionStats;

/// Relative determinant threshold below which a normal-equation matrix is
/// treated as singular.
const SINGULAR_TOL: f64 = 1.0e-12;

/// Per-element normal-equation matrices.
#[derive(Clone, Debug)]
pub struct LeastSquaresLhs {
    lhs: Vec<[[f64; 3]; 3]>,
}

fn add_outer(m: &mut [[f64; 3]; 3], dx: Vec3) {
    for i in 0..3 {
        for j in 0..3 {
            m[i][j] += dx[i] * dx[j];
        }
    }
}

impl LeastSquaresLhs {
    /// Accumulate Σ Δx Δxᵀ over the faces of every element.
    ///
    /// Internal faces use the centroid difference of the two elements,
    /// boundary faces the vector from the element centroid to the face
    /// centroid.
    pub fn new(faces: &FaceData, geometry: &MeshGeometry) -> Self {
        let mut lhs = vec![[[0.0; 3]; 3]; geometry.elements.len()];
        for (f, face) in faces.faces().iter().enumerate() {
            let l = face.left.get();
            let xl = geometry.elements[l].centroid;
            match face.right {
                Some(r) => {
                    let dx = sub(geometry.elements[r.get()].centroid, xl);
                    add_outer(&mut lhs[l], dx);
                    add_outer(&mut lhs[r.get()], dx);
                }
                None => add_outer(&mut lhs[l], sub(geometry.faces[f].centroid, xl)),
            }
        }
        Self { lhs }
    }

    pub fn element(&self, e: usize) -> &[[f64; 3]; 3] {
        &self.lhs[e]
    }

    pub fn len(&self) -> usize {
        self.lhs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lhs.is_empty()
    }
}

/// Right-hand sides of the normal equations, one 3-vector per element and
/// component (`e * ncomp + c`).
pub type LeastSquaresRhs = Vec<Vec3>;

/// Zeroed right-hand side storage.
pub fn least_squares_rhs(nelem: usize, ncomp: usize) -> LeastSquaresRhs {
    vec![[0.0; 3]; nelem * ncomp]
}

/// Internal-face contributions Δx (u_R - u_L) to both neighbours.
pub fn int_least_sq_p0p1(
    ncomp: usize,
    offset: usize,
    rdof: usize,
    faces: &FaceData,
    geometry: &MeshGeometry,
    u: &Fields,
    rhs: &mut [Vec3],
) {
    debug_assert_eq!(rhs.len(), u.nunk() * ncomp);
    for f in faces.internal() {
        let face = faces.face(f);
        let Some(r) = face.right else { continue };
        let (l, r) = (face.left.get(), r.get());
        let dx = sub(geometry.elements[r].centroid, geometry.elements[l].centroid);
        for c in 0..ncomp {
            let du = u.get(r, c * rdof, offset) - u.get(l, c * rdof, offset);
            for i in 0..3 {
                rhs[l * ncomp + c][i] += dx[i] * du;
                rhs[r * ncomp + c][i] += dx[i] * du;
            }
        }
    }
}

/// Boundary-face contributions using a ghost state.
///
/// `ghost` receives the face and the cell average of its element and
/// returns the boundary state at the face centroid, or `None` for faces
/// without a boundary condition (no contribution).
#[allow(clippy::too_many_arguments)]
pub fn bnd_least_sq_p0p1<G>(
    ncomp: usize,
    offset: usize,
    rdof: usize,
    faces: &FaceData,
    geometry: &MeshGeometry,
    u: &Fields,
    mut ghost: G,
    rhs: &mut [Vec3],
) where
    G: FnMut(FaceIndex, &[f64]) -> Option<Vec<f64>>,
{
    let mut avg = vec![0.0; ncomp];
    for f in 0..faces.nbfac() {
        let fi = FaceIndex::new(f);
        let l = faces.face(fi).left.get();
        for (c, a) in avg.iter_mut().enumerate() {
            *a = u.get(l, c * rdof, offset);
        }
        let Some(ub) = ghost(fi, &avg) else { continue };
        let dx = sub(geometry.faces[f].centroid, geometry.elements[l].centroid);
        for c in 0..ncomp {
            let du = ub[c] - avg[c];
            for i in 0..3 {
                rhs[l * ncomp + c][i] += dx[i] * du;
            }
        }
    }
}

fn det3(a: &[[f64; 3]; 3]) -> f64 {
    a[0][0] * (a[1][1] * a[2][2] - a[1][2] * a[2][1])
        - a[0][1] * (a[1][0] * a[2][2] - a[1][2] * a[2][0])
        + a[0][2] * (a[1][0] * a[2][1] - a[1][1] * a[2][0])
}

/// True if `a` is numerically singular relative to its own scale.
pub(super) fn is_singular(a: &[[f64; 3]; 3], det: f64) -> bool {
    let scale = (a[0][0] + a[1][1] + a[2][2]) / 3.0;
    !(det.abs() > SINGULAR_TOL * scale.powi(3)) || scale <= 0.0
}

/// Cramer's rule for a 3×3 system with known determinant.
fn cramer(a: &[[f64; 3]; 3], det: f64, b: Vec3) -> Vec3 {
    let mut x = [0.0; 3];
    for (k, xk) in x.iter_mut().enumerate() {
        let mut m = *a;
        for i in 0..3 {
            m[i][k] = b[i];
        }
        *xk = det3(&m) / det;
    }
    x
}

/// Solve the normal equations and store the physical gradient of each
/// component in dofs 1..3.
///
/// Singular elements get a zero gradient.
pub fn solve_least_sq_p0p1(
    ncomp: usize,
    offset: usize,
    rdof: usize,
    lhs: &LeastSquaresLhs,
    rhs: &[Vec3],
    u: &mut Fields,
) -> ReconstructionStats {
    debug_assert!(rdof >= 4);
    let mut stats = ReconstructionStats::default();
    for e in 0..u.nunk() {
        let a = lhs.element(e);
        let det = det3(a);
        let singular = is_singular(a, det);
        if singular {
            stats.singular += 1;
            log::debug!(
                "singular least-squares matrix in element {e} (det {det:e}), gradient set to zero ({} so far)",
                stats.singular
            );
        }
        for c in 0..ncomp {
            let g = if singular { [0.0; 3] } else { cramer(a, det, rhs[e * ncomp + c]) };
            for (i, gi) in g.iter().enumerate() {
                u.set(e, c * rdof + 1 + i, offset, *gi);
            }
        }
        if !singular {
            stats.reconstructed += 1;
        }
    }
    stats
}

/// Convert physical gradients stored in dofs 1..3 to Dubiner P1 dofs.
///
/// With reference derivatives g_ξ = Jᵀ g, where the columns of J are the
/// edge vectors x_j - x_0, the P1 modes satisfy ∂u/∂ξ = 2U₁,
/// ∂u/∂η = U₁ + 3U₂ and ∂u/∂ζ = U₁ + U₂ + 4U₃.
pub fn transform_p0p1(ncomp: usize, offset: usize, rdof: usize, mesh: &TetMesh, u: &mut Fields) {
    for e in 0..u.nunk() {
        let p = mesh.element_coords(e);
        let edges = [sub(p[1], p[0]), sub(p[2], p[0]), sub(p[3], p[0])];
        for c in 0..ncomp {
            let g: Vec3 = std::array::from_fn(|i| u.get(e, c * rdof + 1 + i, offset));
            let gxi: Vec3 = std::array::from_fn(|j| {
                edges[j][0] * g[0] + edges[j][1] * g[1] + edges[j][2] * g[2]
            });
            let w1 = gxi[0] / 2.0;
            let w2 = (gxi[1] - w1) / 3.0;
            let w3 = (gxi[2] - w1 - w2) / 4.0;
            u.set(e, c * rdof + 1, offset, w1);
            u.set(e, c * rdof + 2, offset, w2);
            u.set(e, c * rdof + 3, offset, w3);
        }
    }
}
