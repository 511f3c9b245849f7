//! Black-Scholes closed-form pricing.
//!
//! # Formula
//! ```text
//! C = S·N(d₁) − K·e^(−rT)·N(d₂)
//! P = K·e^(−rT)·N(−d₂) − S·N(−d₁)
//! d₁ = (ln(S/K) + (r + σ²/2)·T) / (σ√T),  d₂ = d₁ − σ√T
//! ```
//!
//! With `T ≤ 0` or `σ ≤ 0` both prices collapse to undiscounted intrinsic value.
//! Callers must pass `spot > 0` and `strike > 0`.

use std::f64::consts::SQRT_2;

use crate::conventions::{discount_factor, intrinsic_value};
use crate::types::OptionType;

/// Standard normal cumulative distribution, `N(x) = ½·(1 + erf(x/√2))`.
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * (1.0 + libm::erf(x / SQRT_2))
}

fn d1_d2(spot: f64, strike: f64, expiry: f64, rate: f64, vol: f64) -> (f64, f64) {
    let sd = vol * expiry.sqrt();
    let d1 = ((spot / strike).ln() + (rate + 0.5 * vol * vol) * expiry) / sd;
    (d1, d1 - sd)
}

/// Black-Scholes price of a European call.
///
/// # Examples
/// ```
/// use ivsurface::implied::call_price;
///
/// let c = call_price(100.0, 100.0, 1.0, 0.0, 0.2);
/// assert!((c - 7.965567).abs() < 1e-5);
/// ```
pub fn call_price(spot: f64, strike: f64, expiry: f64, rate: f64, vol: f64) -> f64 {
    if expiry <= 0.0 || vol <= 0.0 {
        return intrinsic_value(spot, strike, OptionType::Call);
    }
    let (d1, d2) = d1_d2(spot, strike, expiry, rate, vol);
    spot * norm_cdf(d1) - strike * discount_factor(rate, expiry) * norm_cdf(d2)
}

/// Black-Scholes price of a European put.
pub fn put_price(spot: f64, strike: f64, expiry: f64, rate: f64, vol: f64) -> f64 {
    if expiry <= 0.0 || vol <= 0.0 {
        return intrinsic_value(spot, strike, OptionType::Put);
    }
    let (d1, d2) = d1_d2(spot, strike, expiry, rate, vol);
    strike * discount_factor(rate, expiry) * norm_cdf(-d2) - spot * norm_cdf(-d1)
}

/// Black-Scholes price dispatched on option type.
pub fn price(
    spot: f64,
    strike: f64,
    expiry: f64,
    rate: f64,
    vol: f64,
    option_type: OptionType,
) -> f64 {
    match option_type {
        OptionType::Call => call_price(spot, strike, expiry, rate, vol),
        OptionType::Put => put_price(spot, strike, expiry, rate, vol),
    }
}
