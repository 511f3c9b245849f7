//! Internal root-finding utilities for implied volatility extraction.

/// Configuration for Brent's bracketed root finder.
pub(crate) struct BrentConfig {
    /// Maximum number of iterations.
    pub max_iter: usize,
    /// Absolute convergence tolerance on the root location.
    pub x_tol: f64,
}

/// Find a root of `f` in `[lo, hi]` with Brent's method.
///
/// Combines bisection, secant and inverse quadratic interpolation, falling
/// back to bisection whenever an interpolated step would leave the bracket or
/// shrink it too slowly. Returns `None` when `f(lo)` and `f(hi)` share a sign,
/// when `f` produces a non-finite value, or when `max_iter` is exhausted.
///
/// # References
/// - Brent, R.P. "Algorithms for Minimization without Derivatives" (1973), ch. 4
pub(crate) fn brent_root<F>(f: F, lo: f64, hi: f64, config: &BrentConfig) -> Option<f64>
where
    F: Fn(f64) -> f64,
{
    let mut a = lo;
    let mut b = hi;
    let mut fa = f(a);
    let mut fb = f(b);

    if !fa.is_finite() || !fb.is_finite() {
        return None;
    }
    if fa == 0.0 {
        return Some(a);
    }
    if fb == 0.0 {
        return Some(b);
    }
    if (fa > 0.0) == (fb > 0.0) {
        return None;
    }

    let mut c = b;
    let mut fc = fb;
    let mut d = b - a;
    let mut e = d;

    for _ in 0..config.max_iter {
        // Keep the root between b and c
        if (fb > 0.0) == (fc > 0.0) {
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
        // b is always the best estimate
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }

        let tol = 2.0 * f64::EPSILON * b.abs() + 0.5 * config.x_tol;
        let xm = 0.5 * (c - b);
        if xm.abs() <= tol || fb == 0.0 {
            return Some(b);
        }

        if e.abs() >= tol && fa.abs() > fb.abs() {
            let s = fb / fa;
            let (mut p, mut q) = if a == c {
                // Secant
                (2.0 * xm * s, 1.0 - s)
            } else {
                // Inverse quadratic interpolation
                let qa = fa / fc;
                let r = fb / fc;
                (
                    s * (2.0 * xm * qa * (qa - r) - (b - a) * (r - 1.0)),
                    (qa - 1.0) * (r - 1.0) * (s - 1.0),
                )
            };
            if p > 0.0 {
                q = -q;
            }
            p = p.abs();
            let min1 = 3.0 * xm * q - (tol * q).abs();
            let min2 = (e * q).abs();
            if 2.0 * p < min1.min(min2) {
                e = d;
                d = p / q;
            } else {
                d = xm;
                e = d;
            }
        } else {
            d = xm;
            e = d;
        }

        a = b;
        fa = fb;
        b += if d.abs() > tol { d } else { tol.copysign(xm) };
        fb = f(b);
        if !fb.is_finite() {
            return None;
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn config() -> BrentConfig {
        BrentConfig {
            max_iter: 100,
            x_tol: 1e-12,
        }
    }

    #[test]
    fn finds_sqrt_two() {
        let root = brent_root(|x| x * x - 2.0, 0.0, 2.0, &config()).unwrap();
        assert_abs_diff_eq!(root, std::f64::consts::SQRT_2, epsilon = 1e-10);
    }

    #[test]
    fn finds_cubic_root() {
        let f = |x: f64| x * x * x - x - 2.0;
        let root = brent_root(f, 1.0, 2.0, &config()).unwrap();
        assert!(f(root).abs() < 1e-9);
    }

    #[test]
    fn reversed_bracket_still_converges() {
        let root = brent_root(|x| x - 0.3, 1.0, 0.0, &config()).unwrap();
        assert_abs_diff_eq!(root, 0.3, epsilon = 1e-10);
    }

    #[test]
    fn no_sign_change_returns_none() {
        assert!(brent_root(|x| x * x + 1.0, -1.0, 1.0, &config()).is_none());
    }

    #[test]
    fn endpoint_root_is_returned() {
        assert_eq!(brent_root(|x| x - 1.0, 1.0, 3.0, &config()), Some(1.0));
    }

    #[test]
    fn nan_objective_returns_none() {
        assert!(brent_root(|_| f64::NAN, 0.0, 1.0, &config()).is_none());
    }

    #[test]
    fn iteration_bound_is_respected() {
        let tight = BrentConfig {
            max_iter: 1,
            x_tol: 1e-15,
        };
        assert!(brent_root(|x| x.powi(3) - 0.123, 0.0, 10.0, &tight).is_none());
    }

    #[test]
    fn steep_function_converges() {
        let root = brent_root(|x| (10.0 * (x - 0.7)).tanh(), 0.0, 5.0, &config()).unwrap();
        assert_abs_diff_eq!(root, 0.7, epsilon = 1e-9);
    }
}
