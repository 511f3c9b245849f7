//! Butterfly (convexity) filtering of per-expiry IV curves.
//!
//! For a fixed expiry, a sharp concave kink in implied volatility across
//! strikes means the butterfly spread centred there is mispriced. The filter
//! measures the discrete second difference `σ[i−1] − 2σ[i] + σ[i+1]` at every
//! interior strike and drops points where it falls below a threshold
//! (default −0.06).
//!
//! This is a local heuristic on the raw IV curve. It does not prove the
//! surviving surface free of butterfly or calendar arbitrage: it ignores the
//! strike spacing and never looks across expiries. All second differences are
//! taken from the unfiltered curve, so removing one point never triggers
//! further removals.
//!
//! # References
//! - Gatheral, J. "The Volatility Surface" (2006), ch. 2 (butterfly spreads)

use serde::{Deserialize, Serialize};

use crate::error;
use crate::smile::{ExpiryCurve, group_by_expiry};
use crate::types::Quote;
use crate::validate::validate_finite;

/// Report on butterfly violations found by the filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArbitrageReport {
    /// Whether no point was flagged.
    pub is_free: bool,
    /// Flagged points, ascending by expiry then strike.
    pub butterfly_violations: Vec<ButterflyViolation>,
}

impl Default for ArbitrageReport {
    fn default() -> Self {
        Self::clean()
    }
}

impl ArbitrageReport {
    /// Create a report indicating no violation was found.
    pub fn clean() -> Self {
        Self {
            is_free: true,
            butterfly_violations: Vec::new(),
        }
    }

    /// Merge two reports, combining all violations.
    ///
    /// The merged report is violation-free only if both source reports are free.
    ///
    /// # Examples
    ///
    /// ```
    /// use ivsurface::smile::{ArbitrageReport, ButterflyViolation};
    ///
    /// let clean = ArbitrageReport::clean();
    /// let violated = ArbitrageReport {
    ///     is_free: false,
    ///     butterfly_violations: vec![ButterflyViolation {
    ///         expiry: 0.25, strike: 450.0, second_difference: -0.3, magnitude: 0.3,
    ///     }],
    /// };
    /// let merged = clean.merge(&violated);
    /// assert!(!merged.is_free);
    /// assert_eq!(merged.butterfly_violations.len(), 1);
    /// ```
    pub fn merge(&self, other: &ArbitrageReport) -> ArbitrageReport {
        let mut violations = self.butterfly_violations.clone();
        violations.extend(other.butterfly_violations.iter().cloned());
        ArbitrageReport {
            is_free: self.is_free && other.is_free,
            butterfly_violations: violations,
        }
    }

    /// Return the worst (largest magnitude) violation, if any.
    pub fn worst_violation(&self) -> Option<&ButterflyViolation> {
        self.butterfly_violations.iter().max_by(|a, b| {
            a.magnitude
                .partial_cmp(&b.magnitude)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    }
}

/// A point dropped for a concave kink in its expiry curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButterflyViolation {
    /// Time to expiry of the curve.
    pub expiry: f64,
    /// Strike of the dropped point.
    pub strike: f64,
    /// Second difference at the point (below the threshold).
    pub second_difference: f64,
    /// Absolute value of the second difference.
    pub magnitude: f64,
}

/// Local convexity filter for solved quotes.
///
/// # Examples
/// ```
/// use ivsurface::smile::{ArbitrageFilter, ExpiryCurve};
///
/// let filter = ArbitrageFilter::default();
/// let kinked = ExpiryCurve::new(
///     0.25,
///     vec![90.0, 95.0, 100.0, 105.0, 110.0],
///     vec![0.22, 0.21, 0.35, 0.21, 0.22],
/// )?;
/// let report = filter.inspect(&kinked);
/// assert_eq!(report.butterfly_violations.len(), 1);
/// assert_eq!(report.butterfly_violations[0].strike, 100.0);
/// # Ok::<(), ivsurface::IvSurfError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArbitrageFilter {
    threshold: f64,
}

impl Default for ArbitrageFilter {
    fn default() -> Self {
        Self {
            threshold: Self::DEFAULT_THRESHOLD,
        }
    }
}

impl ArbitrageFilter {
    /// Empirical curvature threshold; not derived, tune per instrument.
    pub const DEFAULT_THRESHOLD: f64 = -0.06;

    /// Create a filter flagging second differences strictly below `threshold`.
    ///
    /// # Errors
    /// Returns [`IvSurfError::InvalidInput`](error::IvSurfError::InvalidInput) if `threshold` is not finite.
    pub fn new(threshold: f64) -> error::Result<Self> {
        validate_finite(threshold, "convexity threshold")?;
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Flag the interior points of one curve whose second difference is below
    /// the threshold. Curves with fewer than three strikes are always clean.
    pub fn inspect(&self, curve: &ExpiryCurve) -> ArbitrageReport {
        if curve.len() < ExpiryCurve::MIN_STRIKES {
            return ArbitrageReport::clean();
        }
        let violations: Vec<ButterflyViolation> = curve
            .second_differences()
            .into_iter()
            .enumerate()
            .filter(|&(_, d2)| d2 < self.threshold)
            .map(|(j, d2)| ButterflyViolation {
                expiry: curve.expiry(),
                strike: curve.strikes()[j + 1],
                second_difference: d2,
                magnitude: d2.abs(),
            })
            .collect();
        ArbitrageReport {
            is_free: violations.is_empty(),
            butterfly_violations: violations,
        }
    }

    /// Strike-sorted curves, one per distinct expiry, in ascending expiry.
    ///
    /// # Errors
    /// Returns [`IvSurfError::InvalidInput`](error::IvSurfError::InvalidInput) if any quote has no implied volatility.
    pub fn curves(&self, quotes: &[Quote]) -> error::Result<Vec<ExpiryCurve>> {
        Ok(group_by_expiry(quotes)?
            .into_iter()
            .map(|g| g.curve)
            .collect())
    }

    /// Surviving quotes, in input order.
    ///
    /// # Errors
    /// Returns [`IvSurfError::InvalidInput`](error::IvSurfError::InvalidInput) if any quote has no implied volatility.
    pub fn filter(&self, quotes: &[Quote]) -> error::Result<Vec<Quote>> {
        self.filter_report(quotes).map(|(kept, _)| kept)
    }

    /// Surviving quotes plus a report of every dropped point.
    ///
    /// Every quote behind a flagged strike is dropped, including both legs
    /// when a call and a put share the strike.
    ///
    /// # Errors
    /// Returns [`IvSurfError::InvalidInput`](error::IvSurfError::InvalidInput) if any quote has no implied volatility.
    pub fn filter_report(&self, quotes: &[Quote]) -> error::Result<(Vec<Quote>, ArbitrageReport)> {
        let groups = group_by_expiry(quotes)?;
        let mut keep = vec![true; quotes.len()];
        let mut report = ArbitrageReport::clean();

        for group in &groups {
            let curve_report = self.inspect(&group.curve);
            if curve_report.is_free {
                continue;
            }
            for violation in &curve_report.butterfly_violations {
                let j = group
                    .curve
                    .strikes()
                    .partition_point(|&k| k < violation.strike);
                if let Some(members) = group.members.get(j) {
                    for &idx in members {
                        keep[idx] = false;
                    }
                }
            }
            report = report.merge(&curve_report);
        }

        let kept: Vec<Quote> = quotes
            .iter()
            .zip(&keep)
            .filter(|&(_, &k)| k)
            .map(|(q, _)| q.clone())
            .collect();

        #[cfg(feature = "logging")]
        tracing::debug!(
            n_curves = groups.len(),
            n_in = quotes.len(),
            n_kept = kept.len(),
            n_violations = report.butterfly_violations.len(),
            "butterfly filter applied"
        );

        Ok((kept, report))
    }
}
