//! Implied volatility by bracketed root-finding on the Black-Scholes price.
//!
//! The objective `f(σ) = price(σ) − observed` is monotone in σ, so a sign change
//! across the bracket `[σ_lo, σ_hi]` guarantees a unique root. Prices outside
//! the range reachable from the bracket (below intrinsic, above the underlying)
//! have no sign change and yield `None`.
//!
//! An undefined result is expected for stale or crossed market quotes and is
//! never reported as an error.

use serde::{Deserialize, Serialize};

use crate::error::{self, IvSurfError};
use crate::implied::black;
use crate::optim::{BrentConfig, brent_root};
use crate::types::{OptionType, Quote};
use crate::validate::{validate_interval, validate_positive};

/// Bracket, tolerance and iteration bound for the implied volatility search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Lower end of the volatility bracket.
    pub vol_lower: f64,
    /// Upper end of the volatility bracket.
    pub vol_upper: f64,
    /// Absolute tolerance on σ.
    pub tolerance: f64,
    /// Iteration bound; exhausting it yields an undefined volatility.
    pub max_iterations: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            vol_lower: 1e-6,
            vol_upper: 5.0,
            tolerance: 1e-6,
            max_iterations: 100,
        }
    }
}

impl SolverConfig {
    /// Check the bracket and tolerance are usable.
    ///
    /// # Errors
    /// Returns [`IvSurfError::InvalidInput`] for a non-positive or inverted
    /// bracket, a non-positive tolerance, or a zero iteration bound.
    pub fn validate(&self) -> error::Result<()> {
        validate_positive(self.vol_lower, "vol_lower")?;
        validate_interval(self.vol_lower, self.vol_upper, "volatility bracket")?;
        validate_positive(self.tolerance, "solver tolerance")?;
        if self.max_iterations == 0 {
            return Err(IvSurfError::InvalidInput {
                message: "max_iterations must be at least 1".into(),
            });
        }
        Ok(())
    }
}

/// Implied volatility solver over a fixed volatility bracket.
///
/// # Examples
/// ```
/// use ivsurface::implied::{call_price, ImpliedVolSolver};
/// use ivsurface::OptionType;
///
/// let solver = ImpliedVolSolver::default();
/// let price = call_price(450.0, 460.0, 0.25, 0.045, 0.21);
/// let iv = solver
///     .solve_price(price, 450.0, 460.0, 0.25, 0.045, OptionType::Call)
///     .unwrap();
/// assert!((iv - 0.21).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ImpliedVolSolver {
    config: SolverConfig,
}

impl ImpliedVolSolver {
    /// Create a solver with a custom bracket and tolerance.
    ///
    /// # Errors
    /// Returns [`IvSurfError::InvalidInput`] if the config fails validation.
    pub fn new(config: SolverConfig) -> error::Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Implied volatility reproducing `price`, or `None` if undefined.
    ///
    /// Returns `None` immediately for `price ≤ 0`, `expiry ≤ 0` or any
    /// non-finite input, and when the price is not bracketed.
    pub fn solve_price(
        &self,
        price: f64,
        spot: f64,
        strike: f64,
        expiry: f64,
        rate: f64,
        option_type: OptionType,
    ) -> Option<f64> {
        if !(price > 0.0 && expiry > 0.0) {
            return None;
        }
        if ![price, spot, strike, expiry, rate].iter().all(|x| x.is_finite())
            || spot <= 0.0
            || strike <= 0.0
        {
            return None;
        }

        let objective = |vol: f64| black::price(spot, strike, expiry, rate, vol, option_type) - price;
        let brent = BrentConfig {
            max_iter: self.config.max_iterations,
            x_tol: self.config.tolerance,
        };
        brent_root(objective, self.config.vol_lower, self.config.vol_upper, &brent)
    }

    /// Implied volatility of a quote's mid price.
    pub fn solve(&self, quote: &Quote) -> Option<f64> {
        self.solve_price(
            quote.mid(),
            quote.underlying(),
            quote.strike(),
            quote.expiry(),
            quote.rate(),
            quote.option_type(),
        )
    }
}

/// Implied volatility with the default bracket `[1e-6, 5.0]` and tolerance `1e-6`.
pub fn implied_volatility(
    price: f64,
    spot: f64,
    strike: f64,
    expiry: f64,
    rate: f64,
    option_type: OptionType,
) -> Option<f64> {
    ImpliedVolSolver::default().solve_price(price, spot, strike, expiry, rate, option_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::implied::{call_price, put_price};
    use approx::assert_abs_diff_eq;

    #[test]
    fn call_round_trip() {
        for &vol in &[0.08, 0.2, 0.45, 1.1, 2.5] {
            for &k in &[400.0, 450.0, 500.0] {
                let p = call_price(450.0, k, 0.25, 0.045, vol);
                let iv = implied_volatility(p, 450.0, k, 0.25, 0.045, OptionType::Call).unwrap();
                assert_abs_diff_eq!(iv, vol, epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn put_round_trip() {
        let p = put_price(100.0, 110.0, 0.5, 0.02, 0.3);
        let iv = implied_volatility(p, 100.0, 110.0, 0.5, 0.02, OptionType::Put).unwrap();
        assert_abs_diff_eq!(iv, 0.3, epsilon = 1e-5);
    }

    #[test]
    fn non_positive_price_is_undefined() {
        assert!(implied_volatility(0.0, 100.0, 100.0, 0.5, 0.0, OptionType::Call).is_none());
        assert!(implied_volatility(-1.0, 100.0, 100.0, 0.5, 0.0, OptionType::Call).is_none());
    }

    #[test]
    fn non_positive_expiry_is_undefined() {
        assert!(implied_volatility(5.0, 100.0, 100.0, 0.0, 0.0, OptionType::Call).is_none());
        assert!(implied_volatility(5.0, 100.0, 100.0, -0.1, 0.0, OptionType::Put).is_none());
    }

    #[test]
    fn price_below_intrinsic_is_undefined() {
        // Intrinsic of the call is 20.
        assert!(implied_volatility(15.0, 120.0, 100.0, 0.5, 0.0, OptionType::Call).is_none());
    }

    #[test]
    fn call_price_above_spot_is_undefined() {
        assert!(implied_volatility(130.0, 120.0, 100.0, 0.5, 0.0, OptionType::Call).is_none());
    }

    #[test]
    fn nan_inputs_are_undefined() {
        assert!(implied_volatility(f64::NAN, 100.0, 100.0, 0.5, 0.0, OptionType::Call).is_none());
        assert!(implied_volatility(5.0, f64::NAN, 100.0, 0.5, 0.0, OptionType::Call).is_none());
        assert!(implied_volatility(5.0, 100.0, 100.0, 0.5, f64::INFINITY, OptionType::Call).is_none());
    }

    #[test]
    fn solve_uses_quote_fields() {
        let p = call_price(450.0, 440.0, 30.0 / 365.0, 0.045, 0.19);
        let q = Quote::new(440.0, 30.0 / 365.0, OptionType::Call, p, 450.0, 0.045).unwrap();
        let iv = ImpliedVolSolver::default().solve(&q).unwrap();
        assert_abs_diff_eq!(iv, 0.19, epsilon = 1e-5);
    }

    #[test]
    fn narrow_bracket_excludes_high_vol() {
        let solver = ImpliedVolSolver::new(SolverConfig {
            vol_upper: 0.5,
            ..SolverConfig::default()
        })
        .unwrap();
        let p = call_price(100.0, 100.0, 1.0, 0.0, 0.8);
        assert!(solver.solve_price(p, 100.0, 100.0, 1.0, 0.0, OptionType::Call).is_none());
    }

    #[test]
    fn invalid_config_rejected() {
        let bad = SolverConfig {
            vol_lower: 2.0,
            vol_upper: 1.0,
            ..SolverConfig::default()
        };
        assert!(ImpliedVolSolver::new(bad).is_err());
        let zero_iter = SolverConfig {
            max_iterations: 0,
            ..SolverConfig::default()
        };
        assert!(matches!(
            ImpliedVolSolver::new(zero_iter),
            Err(IvSurfError::InvalidInput { .. })
        ));
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let cfg: SolverConfig = serde_json::from_str(r#"{"tolerance": 1e-8}"#).unwrap();
        assert_eq!(cfg.tolerance, 1e-8);
        assert_eq!(cfg.vol_upper, 5.0);
        assert_eq!(cfg.max_iterations, 100);
    }
}
