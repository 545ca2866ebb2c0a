//! Symmetric Gauss quadrature on the reference tetrahedron and triangle.
//!
//! Rules are stored in reference coordinates with weights normalised to sum
//! to one, so an integral over a physical element is
//!
//! ∫_K f dV ≈ |K| Σ_q w_q f(x(ξ_q))
//!
//! Points are generated from barycentric orbits: a tetrahedron point with
//! barycentric coordinates (λ₀, λ₁, λ₂, λ₃) sits at (ξ, η, ζ) = (λ₁, λ₂, λ₃).
//!
//! | tet points | exact degree | triangle points | exact degree |
//! |-----------:|-------------:|----------------:|-------------:|
//! | 1          | 1            | 1               | 1            |
//! | 4          | 2            | 3               | 2            |
//! | 5          | 3            | 6               | 4            |
//! | 11         | 4            | 7               | 5            |
//! | 14         | 5            |                 |              |

use thiserror::Error;

/// A point count with no matching rule.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("no {element} quadrature rule with {points} points")]
pub struct QuadratureError {
    pub element: &'static str,
    pub points: usize,
}

/// Tetrahedron rules by point count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TetRule {
    P1,
    P4,
    P5,
    P11,
    P14,
}

impl TetRule {
    pub const ALL: [TetRule; 5] = [TetRule::P1, TetRule::P4, TetRule::P5, TetRule::P11, TetRule::P14];

    pub fn npoints(self) -> usize {
        match self {
            TetRule::P1 => 1,
            TetRule::P4 => 4,
            TetRule::P5 => 5,
            TetRule::P11 => 11,
            TetRule::P14 => 14,
        }
    }

    /// Highest polynomial degree integrated exactly.
    pub fn degree(self) -> usize {
        match self {
            TetRule::P1 => 1,
            TetRule::P4 => 2,
            TetRule::P5 => 3,
            TetRule::P11 => 4,
            TetRule::P14 => 5,
        }
    }
}

impl TryFrom<usize> for TetRule {
    type Error = QuadratureError;

    fn try_from(points: usize) -> Result<Self, Self::Error> {
        TetRule::ALL
            .into_iter()
            .find(|r| r.npoints() == points)
            .ok_or(QuadratureError {
                element: "tetrahedron",
                points,
            })
    }
}

/// Triangle rules by point count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TriRule {
    P1,
    P3,
    P6,
    P7,
}

impl TriRule {
    pub const ALL: [TriRule; 4] = [TriRule::P1, TriRule::P3, TriRule::P6, TriRule::P7];

    pub fn npoints(self) -> usize {
        match self {
            TriRule::P1 => 1,
            TriRule::P3 => 3,
            TriRule::P6 => 6,
            TriRule::P7 => 7,
        }
    }

    /// Highest polynomial degree integrated exactly.
    pub fn degree(self) -> usize {
        match self {
            TriRule::P1 => 1,
            TriRule::P3 => 2,
            TriRule::P6 => 4,
            TriRule::P7 => 5,
        }
    }
}

impl TryFrom<usize> for TriRule {
    type Error = QuadratureError;

    fn try_from(points: usize) -> Result<Self, Self::Error> {
        TriRule::ALL
            .into_iter()
            .find(|r| r.npoints() == points)
            .ok_or(QuadratureError {
                element: "triangle",
                points,
            })
    }
}

/// Quadrature rule on the reference tetrahedron.
#[derive(Clone, Debug)]
pub struct TetQuadrature {
    /// Reference coordinates (ξ, η, ζ) of each point
    pub points: Vec<[f64; 3]>,
    /// Normalised weights (sum to one)
    pub weights: Vec<f64>,
}

/// Quadrature rule on the reference triangle.
///
/// Points are the barycentric weights (λ₁, λ₂) of the second and third face
/// vertex; the first vertex carries 1 - λ₁ - λ₂.
#[derive(Clone, Debug)]
pub struct TriQuadrature {
    /// Reference coordinates of each point
    pub points: Vec<[f64; 2]>,
    /// Normalised weights (sum to one)
    pub weights: Vec<f64>,
}

impl TetQuadrature {
    /// Number of quadrature points.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// True if the rule has no points.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    fn push_barycentric(&mut self, l: [f64; 4], w: f64) {
        self.points.push([l[1], l[2], l[3]]);
        self.weights.push(w);
    }

    /// Centroid point.
    fn s4(&mut self, w: f64) {
        self.push_barycentric([0.25; 4], w);
    }

    /// Orbit of (a, a, a, 1-3a): four points.
    fn s31(&mut self, a: f64, w: f64) {
        let b = 1.0 - 3.0 * a;
        for k in 0..4 {
            let mut l = [a; 4];
            l[k] = b;
            self.push_barycentric(l, w);
        }
    }

    /// Orbit of (a, a, 1/2-a, 1/2-a): six points.
    fn s22(&mut self, a: f64, w: f64) {
        let b = 0.5 - a;
        for (i, j) in [(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)] {
            let mut l = [b; 4];
            l[i] = a;
            l[j] = a;
            self.push_barycentric(l, w);
        }
    }
}

impl TriQuadrature {
    /// Number of quadrature points.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// True if the rule has no points.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    fn s3(&mut self, w: f64) {
        self.points.push([1.0 / 3.0, 1.0 / 3.0]);
        self.weights.push(w);
    }

    /// Orbit of (a, a, 1-2a): three points.
    fn s21(&mut self, a: f64, w: f64) {
        let b = 1.0 - 2.0 * a;
        for l in [[a, a, b], [a, b, a], [b, a, a]] {
            self.points.push([l[1], l[2]]);
            self.weights.push(w);
        }
    }
}

/// Gauss quadrature rule on the reference tetrahedron.
pub fn gauss_tet(rule: TetRule) -> TetQuadrature {
    let ng = rule.npoints();
    let mut q = TetQuadrature {
        points: Vec::with_capacity(ng),
        weights: Vec::with_capacity(ng),
    };
    match rule {
        TetRule::P1 => q.s4(1.0),
        TetRule::P4 => q.s31(0.138_196_601_125_010_5, 0.25),
        TetRule::P5 => {
            q.s4(-0.8);
            q.s31(1.0 / 6.0, 0.45);
        }
        TetRule::P11 => {
            q.s4(-0.013_155_555_555_555_56 * 6.0);
            q.s31(0.071_428_571_428_571_4, 0.007_622_222_222_222_222 * 6.0);
            q.s22(0.399_403_576_166_799, 0.024_888_888_888_888_89 * 6.0);
        }
        TetRule::P14 => {
            q.s31(0.092_735_250_310_891_2, 0.012_248_840_519_393_66 * 6.0);
            q.s31(0.310_885_919_263_300_6, 0.018_781_320_953_002_64 * 6.0);
            q.s22(0.454_496_295_874_350_4, 0.007_091_003_462_846_911 * 6.0);
        }
    }
    q
}

/// Gauss quadrature rule on the reference triangle.
pub fn gauss_tri(rule: TriRule) -> TriQuadrature {
    let ng = rule.npoints();
    let mut q = TriQuadrature {
        points: Vec::with_capacity(ng),
        weights: Vec::with_capacity(ng),
    };
    match rule {
        TriRule::P1 => q.s3(1.0),
        TriRule::P3 => q.s21(1.0 / 6.0, 1.0 / 3.0),
        TriRule::P6 => {
            q.s21(0.445_948_490_915_964_89, 0.223_381_589_678_011_47);
            q.s21(0.091_576_213_509_770_743, 0.109_951_743_655_321_87);
        }
        TriRule::P7 => {
            q.s3(0.225);
            q.s21(0.470_142_064_105_115_1, 0.132_394_152_788_506_2);
            q.s21(0.101_286_507_323_456_3, 0.125_939_180_544_827_2);
        }
    }
    q
}

/// Volume rule for an element with `ndof` dofs.
pub fn ng_vol(ndof: usize) -> TetRule {
    match ndof {
        1 => TetRule::P1,
        4 => TetRule::P5,
        _ => TetRule::P11,
    }
}

/// Face rule for an element with `ndof` dofs.
pub fn ng_face(ndof: usize) -> TriRule {
    match ndof {
        1 => TriRule::P1,
        4 => TriRule::P3,
        _ => TriRule::P6,
    }
}

/// Volume rule used when projecting initial conditions.
pub fn ng_init(ndof: usize) -> TetRule {
    match ndof {
        1 => TetRule::P5,
        4 => TetRule::P11,
        _ => TetRule::P14,
    }
}

/// Smallest tetrahedron rule that integrates polynomials of `degree` exactly.
pub fn tet_rule_for_degree(degree: usize) -> TetQuadrature {
    let rule = match degree {
        0 | 1 => TetRule::P1,
        2 => TetRule::P4,
        3 => TetRule::P5,
        4 => TetRule::P11,
        _ => TetRule::P14,
    };
    gauss_tet(rule)
}

/// Smallest triangle rule that integrates polynomials of `degree` exactly.
pub fn tri_rule_for_degree(degree: usize) -> TriQuadrature {
    let rule = match degree {
        0 | 1 => TriRule::P1,
        2 => TriRule::P3,
        3 | 4 => TriRule::P6,
        _ => TriRule::P7,
    };
    gauss_tri(rule)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    /// Exact ∫ ξ^a η^b ζ^c over the reference tet, divided by its volume 1/6.
    fn tet_monomial(a: u32, b: u32, c: u32) -> f64 {
        let f = |n: u32| -> f64 { (1..=n).map(f64::from).product() };
        6.0 * f(a) * f(b) * f(c) / f(a + b + c + 3)
    }

    /// Exact ∫ s^a t^b over the reference triangle, divided by its area 1/2.
    fn tri_monomial(a: u32, b: u32) -> f64 {
        let f = |n: u32| -> f64 { (1..=n).map(f64::from).product() };
        2.0 * f(a) * f(b) / f(a + b + 2)
    }

    #[test]
    fn test_weights_sum_to_one() {
        for rule in TetRule::ALL {
            let q = gauss_tet(rule);
            assert_eq!(q.len(), rule.npoints());
            let s: f64 = q.weights.iter().sum();
            assert!((s - 1.0).abs() < TOL, "tet rule {rule:?}: sum = {s}");
        }
        for rule in TriRule::ALL {
            let q = gauss_tri(rule);
            assert_eq!(q.len(), rule.npoints());
            let s: f64 = q.weights.iter().sum();
            assert!((s - 1.0).abs() < TOL, "tri rule {rule:?}: sum = {s}");
        }
    }

    #[test]
    fn test_tet_rules_exact_to_their_degree() {
        for rule in TetRule::ALL {
            let (q, deg) = (gauss_tet(rule), rule.degree() as u32);
            for a in 0..=deg {
                for b in 0..=(deg - a) {
                    for c in 0..=(deg - a - b) {
                        let approx: f64 = q
                            .points
                            .iter()
                            .zip(&q.weights)
                            .map(|(p, w)| w * p[0].powi(a as i32) * p[1].powi(b as i32) * p[2].powi(c as i32))
                            .sum();
                        let exact = tet_monomial(a, b, c);
                        assert!(
                            (approx - exact).abs() < TOL,
                            "rule {rule:?} fails on x^{a} y^{b} z^{c}: {approx} vs {exact}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_tri_rules_exact_to_their_degree() {
        for rule in TriRule::ALL {
            let (q, deg) = (gauss_tri(rule), rule.degree() as u32);
            for a in 0..=deg {
                for b in 0..=(deg - a) {
                    let approx: f64 = q
                        .points
                        .iter()
                        .zip(&q.weights)
                        .map(|(p, w)| w * p[0].powi(a as i32) * p[1].powi(b as i32))
                        .sum();
                    let exact = tri_monomial(a, b);
                    assert!((approx - exact).abs() < TOL, "rule {rule:?} fails on s^{a} t^{b}");
                }
            }
        }
    }

    #[test]
    fn test_points_inside_reference_element() {
        for rule in TetRule::ALL {
            for p in gauss_tet(rule).points {
                assert!(p.iter().all(|&c| c > 0.0));
                assert!(p[0] + p[1] + p[2] < 1.0);
            }
        }
    }

    #[test]
    fn test_point_counts_by_dofs() {
        assert_eq!(ng_vol(1).npoints(), 1);
        assert_eq!(ng_vol(4).npoints(), 5);
        assert_eq!(ng_vol(10).npoints(), 11);
        assert_eq!(ng_face(4).npoints(), 3);
        assert_eq!(ng_face(10).npoints(), 6);
        assert_eq!(tet_rule_for_degree(4).len(), 11);
        assert_eq!(tri_rule_for_degree(3).len(), 6);
    }

    #[test]
    fn test_rules_by_point_count() {
        assert_eq!(TetRule::try_from(11), Ok(TetRule::P11));
        assert_eq!(TriRule::try_from(7), Ok(TriRule::P7));
        let err = TetRule::try_from(6).unwrap_err();
        assert_eq!(err.points, 6);
        assert_eq!(err.to_string(), "no tetrahedron quadrature rule with 6 points");
        assert!(TriRule::try_from(4).is_err());
    }
}
