//! Core domain types for surface construction.
//!
//! # Newtype Strategy
//!
//! **Outputs use newtypes**: [`Vol`], [`Variance`], [`Strike`], [`Tenor`] wrap
//! return values so callers can't accidentally mix a volatility with a variance.
//!
//! **Inputs use bare `f64`**: API methods like `black_vol(expiry, strike)` accept
//! raw floats; parameter names document them.
//!
//! # Why no `Eq` or `Ord`?
//! These types wrap `f64`, which does not implement `Eq` or `Ord` because `NaN`
//! breaks total ordering. We derive `PartialEq` and `PartialOrd` only.

use serde::{Deserialize, Serialize};

use crate::error;
use crate::validate::{validate_finite, validate_positive};

/// Strike price `K` of an option contract.
///
/// # Examples
/// ```
/// use ivsurface::types::Strike;
/// let strike = Strike(450.0);
/// assert_eq!(strike.0, 450.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Strike(pub f64);

/// Time to expiry `T` in years (annualized, `days / 365`).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Tenor(pub f64);

/// Implied volatility `σ`, measured as annualized standard deviation.
///
/// A vol of 0.20 represents 20% annualized volatility.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Vol(pub f64);

/// Total variance `σ²T`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Variance(pub f64);

/// Option type: call or put.
///
/// Selects the pricing formula branch during implied volatility extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    /// Right to buy at strike price.
    Call,
    /// Right to sell at strike price.
    Put,
}

/// One row as delivered by a market-data collaborator, before any cleaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawQuote {
    pub strike: f64,
    pub bid: f64,
    pub ask: f64,
    pub volume: f64,
    /// Provider's expiry label, e.g. `"2026-11-20"` or `"sim"`.
    pub expiry_label: String,
    pub days_to_expiry: f64,
    pub option_type: OptionType,
    pub underlying: f64,
}

impl RawQuote {
    /// Mid price `(bid + ask) / 2`.
    pub fn mid(&self) -> f64 {
        0.5 * (self.bid + self.ask)
    }
}

/// A cleaned option quote as seen by the core pipeline.
///
/// `iv` is `None` until the solver stage attaches it, and stays `None` when the
/// implied volatility is undefined for this price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    strike: f64,
    expiry: f64,
    option_type: OptionType,
    mid: f64,
    underlying: f64,
    rate: f64,
    label: String,
    iv: Option<f64>,
}

impl Quote {
    /// Create a quote without an implied volatility.
    ///
    /// # Errors
    /// Returns [`IvSurfError::InvalidInput`](crate::IvSurfError::InvalidInput)
    /// if strike, expiry, mid or underlying is not positive and finite, or the
    /// rate is not finite.
    pub fn new(
        strike: f64,
        expiry: f64,
        option_type: OptionType,
        mid: f64,
        underlying: f64,
        rate: f64,
    ) -> error::Result<Self> {
        validate_positive(strike, "strike")?;
        validate_positive(expiry, "expiry")?;
        validate_positive(mid, "mid price")?;
        validate_positive(underlying, "underlying")?;
        validate_finite(rate, "rate")?;
        Ok(Self {
            strike,
            expiry,
            option_type,
            mid,
            underlying,
            rate,
            label: String::new(),
            iv: None,
        })
    }

    /// Attach the provider's expiry label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Copy of this quote with the given implied volatility attached.
    pub fn with_iv(&self, iv: Option<f64>) -> Self {
        Self {
            iv,
            ..self.clone()
        }
    }

    pub fn strike(&self) -> f64 {
        self.strike
    }

    /// Time to expiry in years.
    pub fn expiry(&self) -> f64 {
        self.expiry
    }

    pub fn option_type(&self) -> OptionType {
        self.option_type
    }

    pub fn mid(&self) -> f64 {
        self.mid
    }

    pub fn underlying(&self) -> f64 {
        self.underlying
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Implied volatility, if solved and defined.
    pub fn iv(&self) -> Option<f64> {
        self.iv
    }
}
