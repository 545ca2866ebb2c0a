//! Time integration and time-step control.

mod cfl;
mod ssp_rk3;

pub use cfl::{SPEED_TOL, dg_cfl, dg_element_length, diffusion_dt, element_length, flow_dt, min_dt};
pub use ssp_rk3::{ssp_rk3_step, ssp_rk3_step_timed, try_ssp_rk3_step_timed};
