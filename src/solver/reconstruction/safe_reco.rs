//! Interface-safe face states for multi-material flow.

use crate::equations::{VOLFRAC_FLOOR, density_idx, energy_idx, volfrac_idx};

/// Make reconstructed face states of a multi-material system safe.
///
/// `avg_l`/`avg_r` are the cell averages on both sides of the face (the
/// ghost state on a boundary face) and `state_l`/`state_r` the
/// reconstructed face states, updated in place. For every material:
///
/// - volume fractions are bounded by the two cell averages;
/// - where either side holds no more than [`VOLFRAC_FLOOR`] of the material,
///   its volume fraction, partial density and partial energy revert to the
///   cell averages on both sides.
pub fn safe_reco(
    nmat: usize,
    avg_l: &[f64],
    avg_r: &[f64],
    state_l: &mut [f64],
    state_r: &mut [f64],
) {
    for k in 0..nmat {
        let vf = volfrac_idx(nmat, k);
        let (al, ar) = (avg_l[vf], avg_r[vf]);
        if al <= VOLFRAC_FLOOR || ar <= VOLFRAC_FLOOR {
            for c in [vf, density_idx(nmat, k), energy_idx(nmat, k)] {
                state_l[c] = avg_l[c];
                state_r[c] = avg_r[c];
            }
            continue;
        }
        let (lo, hi) = (al.min(ar), al.max(ar));
        state_l[vf] = state_l[vf].clamp(lo, hi);
        state_r[vf] = state_r[vf].clamp(lo, hi);
    }
}
