//! Scalar transport problems.

use std::f64::consts::PI;

use crate::equations::Transport;
use crate::operators::Vec3;

/// Shear-diffusion of a point release (Okubo's solution in two dimensions).
///
/// A unit peak released at (x₀, 0) is advected by the shear flow
/// v = (u₀ + λy, 0, 0) and spreads with diffusivity D:
///
/// c = M exp(-a²/(4Dtb) - y²/(4Dt)) / (4πDt√b)
///
/// with a = x - x₀ - u₀t - ½λyt, b = 1 + λ²t²/12 and M chosen so the
/// peak equals one at `t_ref`.
pub(super) fn shear_diff(params: &Transport, x0: f64, t_ref: f64, x: Vec3, t: f64) -> Vec<f64> {
    (0..params.ncomp)
        .map(|c| {
            let u0 = params.u0.get(c).copied().unwrap_or(0.0);
            let lambda = params.lambda.get(c).copied().unwrap_or(0.0);
            let d = params.diffusivity(c);
            if t <= 0.0 || d <= 0.0 {
                return 0.0;
            }
            let b = 1.0 + lambda * lambda * t * t / 12.0;
            let m = 4.0 * PI * d * t_ref * (1.0 + lambda * lambda * t_ref * t_ref / 12.0).sqrt();
            let a = x[0] - x0 - u0 * t - 0.5 * lambda * x[1] * t;
            m * (-a * a / (4.0 * d * t * b) - x[1] * x[1] / (4.0 * d * t)).exp()
                / (4.0 * PI * d * t * b.sqrt())
        })
        .collect()
}

pub(super) fn shear_velocity(params: &Transport, x: Vec3, c: usize) -> Vec3 {
    let u0 = params.u0.get(c).copied().unwrap_or(0.0);
    let lambda = params.lambda.get(c).copied().unwrap_or(0.0);
    [u0 + lambda * x[1], 0.0, 0.0]
}

const CYL_RADIUS: f64 = 0.15;
const ROTATION_CENTER: [f64; 2] = [0.5, 0.5];

/// Zalesak's rotating shapes: a slotted cylinder, a cone and a hump turning
/// counter-clockwise about (0.5, 0.5) with unit angular velocity.
pub(super) fn slot_cyl(params: &Transport, x: Vec3, t: f64) -> Vec<f64> {
    // rotate the point back to its position at t = 0
    let (s, c) = t.sin_cos();
    let dx = x[0] - ROTATION_CENTER[0];
    let dy = x[1] - ROTATION_CENTER[1];
    let px = ROTATION_CENTER[0] + c * dx + s * dy;
    let py = ROTATION_CENTER[1] - s * dx + c * dy;

    let dist = |cx: f64, cy: f64| ((px - cx).powi(2) + (py - cy).powi(2)).sqrt() / CYL_RADIUS;
    let mut value = 0.0;

    let r = dist(0.5, 0.25);
    if r < 1.0 {
        value = 1.0 - r;
    }
    let r = dist(0.25, 0.5);
    if r < 1.0 {
        value = 0.25 * (1.0 + (PI * r).cos());
    }
    let r = dist(0.5, 0.75);
    let in_slot = (px - 0.5).abs() < 0.025 && py < 0.8;
    if r < 1.0 && !in_slot {
        value = 1.0;
    }
    vec![value; params.ncomp]
}

pub(super) fn rotation_velocity(x: Vec3) -> Vec3 {
    [ROTATION_CENTER[1] - x[1], x[0] - ROTATION_CENTER[0], 0.0]
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    #[test]
    fn test_shear_diff_peak_at_reference_time() {
        let params = Transport::new(1)
            .with_u0(vec![0.5])
            .with_lambda(vec![0.0])
            .with_diffusivity(vec![2.0]);
        let c = shear_diff(&params, 10.0, 3.0, [10.0 + 0.5 * 3.0, 0.0, 0.0], 3.0);
        assert!((c[0] - 1.0).abs() < TOL);
    }

    #[test]
    fn test_shear_diff_solves_pde() {
        // ∂c/∂t + (u0 + λy) ∂c/∂x = D (∂²c/∂x² + ∂²c/∂y²)
        let params = Transport::new(1)
            .with_u0(vec![1.0])
            .with_lambda(vec![0.2])
            .with_diffusivity(vec![0.5]);
        let f = |x: f64, y: f64, t: f64| shear_diff(&params, 0.0, 1.0, [x, y, 0.0], t)[0];
        let (x, y, t, h) = (1.3, 0.4, 1.5, 1e-3);
        let dt = (f(x, y, t + h) - f(x, y, t - h)) / (2.0 * h);
        let dx = (f(x + h, y, t) - f(x - h, y, t)) / (2.0 * h);
        let dxx = (f(x + h, y, t) - 2.0 * f(x, y, t) + f(x - h, y, t)) / (h * h);
        let dyy = (f(x, y + h, t) - 2.0 * f(x, y, t) + f(x, y - h, t)) / (h * h);
        let residual = dt + (1.0 + 0.2 * y) * dx - 0.5 * (dxx + dyy);
        assert!(residual.abs() < 1e-5, "residual {residual}");
    }

    #[test]
    fn test_slot_cyl_shapes() {
        let params = Transport::new(2);
        assert_eq!(slot_cyl(&params, [0.5, 0.25, 0.0], 0.0), vec![1.0, 1.0]);
        assert!((slot_cyl(&params, [0.25, 0.5, 0.0], 0.0)[0] - 0.5).abs() < TOL);
        assert_eq!(slot_cyl(&params, [0.5, 0.7, 0.0], 0.0)[0], 0.0);
        assert_eq!(slot_cyl(&params, [0.6, 0.75, 0.0], 0.0)[0], 1.0);
        // a quarter turn carries the cone tip to (0.75, 0.5)
        let q = slot_cyl(&params, [0.75, 0.5, 0.0], 0.5 * PI);
        assert!((q[0] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_rotation_velocity() {
        assert_eq!(rotation_velocity([0.5, 0.25, 0.0]), [0.25, 0.0, 0.0]);
    }
}
