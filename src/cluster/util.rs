/// Absolute difference of two coordinates on one axis.
///
/// With `period` set the axis wraps, and the difference is the shorter of
/// the direct and wrap-around distances.
#[inline]
pub(crate) fn axis_delta(x: f32, y: f32, period: Option<f32>) -> f32 {
    let d = (x - y).abs();
    match period {
        Some(w) => {
            let d = d.rem_euclid(w);
            d.min(w - d)
        }
        None => d,
    }
}

/// Total order used to break density ties: `(rho, index)`.
///
/// Returns true when point `q` ranks above point `p`.
#[inline]
pub(crate) fn ranks_above(rho_q: f32, q: usize, rho_p: f32, p: usize) -> bool {
    rho_q > rho_p || (rho_q == rho_p && q > p)
}
