//! Market conventions shared by the pricing and data-preparation stages.

use crate::types::OptionType;

/// Day count used to annualize days-to-expiry (ACT/365).
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Convert calendar days to expiry into a year fraction: T = days / 365.
pub fn tenor_from_days(days: f64) -> f64 {
    days / DAYS_PER_YEAR
}

/// Continuously compounded discount factor `exp(-r·T)`.
pub fn discount_factor(rate: f64, expiry: f64) -> f64 {
    (-rate * expiry).exp()
}

/// Undiscounted intrinsic value: `max(S − K, 0)` for calls, `max(K − S, 0)` for puts.
pub fn intrinsic_value(spot: f64, strike: f64, option_type: OptionType) -> f64 {
    match option_type {
        OptionType::Call => (spot - strike).max(0.0),
        OptionType::Put => (strike - spot).max(0.0),
    }
}
