//! One-dimensional helpers shared by grid fill and surface evaluation.

/// Index of the bucket nearest to `x` by absolute difference.
///
/// Exact ties resolve to the lowest index. Returns `None` for an empty axis.
pub fn snap_to_bucket(buckets: &[f64], x: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &b) in buckets.iter().enumerate() {
        let dist = (b - x).abs();
        match best {
            Some((_, d)) if dist < d => best = Some((i, dist)),
            None => best = Some((i, dist)),
            _ => {}
        }
    }
    best.map(|(i, _)| i)
}

/// Segment `(left, right, weight)` used to evaluate at `x` on a sorted axis.
///
/// The value is `(1 − w)·y[left] + w·y[right]`. Outside the axis range the
/// first or last segment is reused with `w < 0` or `w > 1` (linear
/// extrapolation). A single-node axis yields `(0, 0, 0.0)`.
pub(crate) fn segment(axis: &[f64], x: f64) -> (usize, usize, f64) {
    let n = axis.len();
    if n < 2 {
        return (0, 0, 0.0);
    }
    let right = axis.partition_point(|&a| a < x).clamp(1, n - 1);
    let left = right - 1;
    let w = (x - axis[left]) / (axis[right] - axis[left]);
    (left, right, w)
}

/// `x` clamped into `[axis[0], axis[n - 1]]`; unchanged for an empty axis.
pub(crate) fn clamp_to_axis(axis: &[f64], x: f64) -> f64 {
    match (axis.first(), axis.last()) {
        (Some(&lo), Some(&hi)) => x.max(lo).min(hi),
        _ => x,
    }
}

/// Linear interpolation through sorted `(xs, ys)` with linear extrapolation.
pub(crate) fn interp_linear(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    let (l, r, w) = segment(xs, x);
    (1.0 - w) * ys[l] + w * ys[r]
}

/// Fill missing cells along one grid line by linear interpolation over the
/// known cells, extrapolating beyond them.
///
/// Known cells are left untouched. Lines with fewer than two known cells are
/// not modified. Returns the number of cells filled.
pub(crate) fn fill_line(axis: &[f64], cells: &mut [Option<f64>]) -> usize {
    let (xs, ys): (Vec<f64>, Vec<f64>) = axis
        .iter()
        .zip(cells.iter())
        .filter_map(|(&x, c)| c.map(|v| (x, v)))
        .unzip();
    if xs.len() < 2 {
        return 0;
    }
    let mut filled = 0;
    for (cell, &x) in cells.iter_mut().zip(axis) {
        if cell.is_none() {
            *cell = Some(interp_linear(&xs, &ys, x));
            filled += 1;
        }
    }
    filled
}
