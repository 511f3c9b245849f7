//! Single-expiry implied volatility curves and butterfly filtering.
//!
//! An [`ExpiryCurve`] is the strike-sorted slice of solved quotes sharing one
//! time to expiry. The [`ArbitrageFilter`] inspects each curve's discrete
//! curvature and drops points forming a sharp concave kink.

pub mod arbitrage;

pub use arbitrage::{ArbitrageFilter, ArbitrageReport, ButterflyViolation};

use serde::{Deserialize, Serialize};

use crate::error::{self, IvSurfError};
use crate::types::Quote;

/// Implied volatilities at one expiry, strictly ascending in strike.
///
/// # Examples
/// ```
/// use ivsurface::smile::ExpiryCurve;
///
/// let curve = ExpiryCurve::new(0.25, vec![90.0, 100.0, 110.0], vec![0.24, 0.20, 0.23])?;
/// let d2 = curve.second_differences();
/// assert_eq!(d2.len(), 1);
/// assert!((d2[0] - 0.07).abs() < 1e-12);
/// # Ok::<(), ivsurface::IvSurfError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpiryCurve {
    expiry: f64,
    strikes: Vec<f64>,
    vols: Vec<f64>,
}

impl ExpiryCurve {
    /// Minimum distinct strikes needed to measure curvature.
    pub const MIN_STRIKES: usize = 3;

    /// Create a curve from strike-sorted data.
    ///
    /// # Errors
    /// Returns [`IvSurfError::InvalidInput`] if lengths differ, any value is
    /// non-finite, or strikes are not strictly increasing.
    pub fn new(expiry: f64, strikes: Vec<f64>, vols: Vec<f64>) -> error::Result<Self> {
        if strikes.len() != vols.len() {
            return Err(IvSurfError::InvalidInput {
                message: format!(
                    "strikes ({}) and vols ({}) must have the same length",
                    strikes.len(),
                    vols.len()
                ),
            });
        }
        if strikes.iter().chain(vols.iter()).any(|x| !x.is_finite()) {
            return Err(IvSurfError::InvalidInput {
                message: format!("curve at expiry {expiry} contains non-finite values"),
            });
        }
        if strikes.windows(2).any(|w| w[0] >= w[1]) {
            return Err(IvSurfError::InvalidInput {
                message: format!("strikes must be strictly increasing at expiry {expiry}"),
            });
        }
        Ok(Self {
            expiry,
            strikes,
            vols,
        })
    }

    pub fn expiry(&self) -> f64 {
        self.expiry
    }

    pub fn strikes(&self) -> &[f64] {
        &self.strikes
    }

    pub fn vols(&self) -> &[f64] {
        &self.vols
    }

    /// Number of distinct strikes.
    pub fn len(&self) -> usize {
        self.strikes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strikes.is_empty()
    }

    /// Discrete second difference `σ[i−1] − 2σ[i] + σ[i+1]` for each interior
    /// point; entry `j` belongs to strike index `j + 1`.
    pub fn second_differences(&self) -> Vec<f64> {
        self.vols
            .windows(3)
            .map(|w| w[0] - 2.0 * w[1] + w[2])
            .collect()
    }
}

/// A curve together with the input indices of the quotes behind each strike.
#[derive(Debug)]
pub(crate) struct CurveGroup {
    pub curve: ExpiryCurve,
    /// `members[j]` lists the quote indices placed at `curve.strikes()[j]`.
    pub members: Vec<Vec<usize>>,
}

/// Group solved quotes by exact expiry into strike-sorted curves.
///
/// Quotes sharing a strike within one expiry (a call and a put, say) collapse
/// to a single point carrying the IV of the last such quote in input order.
/// Groups are returned in ascending expiry.
///
/// # Errors
/// Returns [`IvSurfError::InvalidInput`] if any quote has no implied volatility.
pub(crate) fn group_by_expiry(quotes: &[Quote]) -> error::Result<Vec<CurveGroup>> {
    if let Some(q) = quotes.iter().find(|q| q.iv().is_none()) {
        return Err(IvSurfError::InvalidInput {
            message: format!(
                "quote at strike {} expiry {} has no implied volatility",
                q.strike(),
                q.expiry()
            ),
        });
    }
    let mut order: Vec<usize> = (0..quotes.len()).collect();
    // Stable sort keeps input order among equal (expiry, strike) keys
    order.sort_by(|&a, &b| {
        quotes[a]
            .expiry()
            .total_cmp(&quotes[b].expiry())
            .then(quotes[a].strike().total_cmp(&quotes[b].strike()))
    });

    let mut groups = Vec::new();
    for chunk in order.chunk_by(|&a, &b| quotes[a].expiry() == quotes[b].expiry()) {
        let expiry = quotes[chunk[0]].expiry();
        let mut strikes: Vec<f64> = Vec::new();
        let mut vols: Vec<f64> = Vec::new();
        let mut members: Vec<Vec<usize>> = Vec::new();
        for &idx in chunk {
            let q = &quotes[idx];
            let iv = q.iv().unwrap_or(f64::NAN);
            match strikes.last() {
                Some(&k) if k == q.strike() => {
                    if let (Some(v), Some(m)) = (vols.last_mut(), members.last_mut()) {
                        *v = iv;
                        m.push(idx);
                    }
                }
                _ => {
                    strikes.push(q.strike());
                    vols.push(iv);
                    members.push(vec![idx]);
                }
            }
        }
        let curve = ExpiryCurve::new(expiry, strikes, vols)?;
        groups.push(CurveGroup { curve, members });
    }
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OptionType;
    use approx::assert_abs_diff_eq;

    fn solved(strike: f64, expiry: f64, iv: f64) -> Quote {
        Quote::new(strike, expiry, OptionType::Call, 1.0, 100.0, 0.0)
            .unwrap()
            .with_iv(Some(iv))
    }

    #[test]
    fn second_differences_of_linear_curve_vanish() {
        let curve = ExpiryCurve::new(0.5, vec![1.0, 2.0, 3.0, 4.0], vec![0.3, 0.28, 0.26, 0.24])
            .unwrap();
        for d in curve.second_differences() {
            assert_abs_diff_eq!(d, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn short_curve_has_no_second_differences() {
        let curve = ExpiryCurve::new(0.5, vec![1.0, 2.0], vec![0.3, 0.2]).unwrap();
        assert!(curve.second_differences().is_empty());
    }

    #[test]
    fn rejects_unsorted_or_duplicate_strikes() {
        assert!(ExpiryCurve::new(0.5, vec![2.0, 1.0], vec![0.2, 0.2]).is_err());
        assert!(ExpiryCurve::new(0.5, vec![1.0, 1.0], vec![0.2, 0.2]).is_err());
        assert!(ExpiryCurve::new(0.5, vec![1.0], vec![0.2, 0.2]).is_err());
    }

    #[test]
    fn groups_sorted_by_expiry_then_strike() {
        let quotes = vec![
            solved(110.0, 0.5, 0.21),
            solved(90.0, 0.25, 0.25),
            solved(100.0, 0.5, 0.20),
            solved(100.0, 0.25, 0.22),
        ];
        let groups = group_by_expiry(&quotes).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].curve.expiry(), 0.25);
        assert_eq!(groups[0].curve.strikes(), &[90.0, 100.0]);
        assert_eq!(groups[0].members, vec![vec![1], vec![3]]);
        assert_eq!(groups[1].curve.strikes(), &[100.0, 110.0]);
        assert_eq!(groups[1].members, vec![vec![2], vec![0]]);
    }

    #[test]
    fn duplicate_strike_collapses_to_last_quote() {
        let quotes = vec![solved(100.0, 0.5, 0.20), solved(100.0, 0.5, 0.26)];
        let groups = group_by_expiry(&quotes).unwrap();
        assert_eq!(groups[0].curve.len(), 1);
        assert_eq!(groups[0].curve.vols(), &[0.26]);
        assert_eq!(groups[0].members[0], vec![0, 1]);
    }

    #[test]
    fn unsolved_quote_is_rejected() {
        let q = Quote::new(100.0, 0.5, OptionType::Call, 1.0, 100.0, 0.0).unwrap();
        assert!(matches!(
            group_by_expiry(&[q]),
            Err(IvSurfError::InvalidInput { .. })
        ));
    }
}
