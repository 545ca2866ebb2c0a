//! Strong Stability Preserving Runge-Kutta time integration.
//!
//! SSP-RK3 (Shu-Osher form) is optimal for hyperbolic conservation laws.
//! It maintains the TVD property of the spatial discretization.

use std::convert::Infallible;

use crate::solver::Fields;

/// Perform one step of SSP-RK3 time integration.
///
/// The Shu-Osher form:
/// u1 = u + dt * L(u)
/// u2 = 3/4 * u + 1/4 * u1 + 1/4 * dt * L(u1)
/// u_new = 1/3 * u + 2/3 * u2 + 2/3 * dt * L(u2)
///
/// For time-dependent boundary conditions or sources use
/// [`ssp_rk3_step_timed`].
pub fn ssp_rk3_step<F>(u: &mut Fields, rhs_fn: F, dt: f64)
where
    F: Fn(&Fields) -> Fields,
{
    ssp_rk3_step_timed(u, |v, _| rhs_fn(v), 0.0, dt);
}

/// Perform one step of SSP-RK3 with a time-dependent right-hand side.
///
/// Stage times are t, t + dt and t + dt/2. `rhs_fn` returns du/dt with
/// the shape of `u`.
pub fn ssp_rk3_step_timed<F>(u: &mut Fields, rhs_fn: F, t: f64, dt: f64)
where
    F: Fn(&Fields, f64) -> Fields,
{
    let step: Result<(), Infallible> = try_ssp_rk3_step_timed(u, |v, ts| Ok(rhs_fn(v, ts)), t, dt);
    match step {
        Ok(()) => {}
        Err(never) => match never {},
    }
}

/// SSP-RK3 step with a fallible right-hand side.
///
/// On error `u` is left untouched and the error is returned.
pub fn try_ssp_rk3_step_timed<F, E>(u: &mut Fields, mut rhs_fn: F, t: f64, dt: f64) -> Result<(), E>
where
    F: FnMut(&Fields, f64) -> Result<Fields, E>,
{
    // Stage 1: u1 = u + dt * L(u, t)
    let l_u = rhs_fn(u, t)?;
    let mut u1 = u.clone();
    u1.axpy(dt, &l_u);

    // Stage 2: u2 = 3/4 * u + 1/4 * u1 + 1/4 * dt * L(u1, t + dt)
    let l_u1 = rhs_fn(&u1, t + dt)?;
    let mut u2 = u.clone();
    u2.lincomb(0.75, 0.25, &u1);
    u2.axpy(0.25 * dt, &l_u1);

    // Stage 3: u_new = 1/3 * u + 2/3 * u2 + 2/3 * dt * L(u2, t + dt/2)
    let l_u2 = rhs_fn(&u2, t + 0.5 * dt)?;
    u.lincomb(1.0 / 3.0, 2.0 / 3.0, &u2);
    u.axpy(2.0 / 3.0 * dt, &l_u2);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ssp_rk3_linear_rhs() {
        // L(u) = c u, exact u(t) = u0 exp(c t)
        let mut u = Fields::new(2, 3);
        u.fill(1.0);
        let c = 1.0;
        let dt = 0.01;
        for _ in 0..10 {
            ssp_rk3_step(
                &mut u,
                |v| {
                    let mut r = v.clone();
                    r.lincomb(c, 0.0, v);
                    r
                },
                dt,
            );
        }
        let expected = (c * 0.1f64).exp();
        for &v in u.as_slice() {
            assert!((v - expected).abs() < 1e-6, "expected {expected}, got {v}");
        }
    }

    #[test]
    fn test_ssp_rk3_integrates_quadratic_in_time() {
        // du/dt = t², third order is exact for this
        let mut u = Fields::new(1, 1);
        let rhs = |v: &Fields, t: f64| {
            let mut r = Fields::new(v.nunk(), v.nprop());
            r.fill(t * t);
            r
        };
        ssp_rk3_step_timed(&mut u, rhs, 1.0, 0.5);
        let exact = (1.5f64.powi(3) - 1.0) / 3.0;
        assert!((u.get(0, 0, 0) - exact).abs() < 1e-12);
    }

    #[test]
    fn test_failed_stage_leaves_state_untouched() {
        let mut u = Fields::new(2, 1);
        u.fill(3.0);
        let mut calls = 0;
        let out = try_ssp_rk3_step_timed(
            &mut u,
            |v, _| {
                calls += 1;
                if calls == 2 { Err("stage 2") } else { Ok(v.clone()) }
            },
            0.0,
            0.1,
        );
        assert_eq!(out, Err("stage 2"));
        assert_eq!(u.as_slice(), &[3.0, 3.0]);
    }
}
