//! Input validation helpers.
//!
//! Standardizes validation across the crate using `!is_finite()` to reject
//! NaN, +Inf, and -Inf uniformly.

use crate::error::IvSurfError;

/// Validate that a value is strictly positive and finite (rejects NaN, Inf, zero, negatives).
pub(crate) fn validate_positive(value: f64, name: &str) -> crate::error::Result<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(IvSurfError::InvalidInput {
            message: format!("{name} must be positive and finite, got {value}"),
        });
    }
    Ok(value)
}

/// Validate that a value is finite (rejects NaN and Inf; allows zero and negatives).
pub(crate) fn validate_finite(value: f64, name: &str) -> crate::error::Result<f64> {
    if !value.is_finite() {
        return Err(IvSurfError::InvalidInput {
            message: format!("{name} must be finite, got {value}"),
        });
    }
    Ok(value)
}

/// Validate that `low < high`, both finite.
pub(crate) fn validate_interval(low: f64, high: f64, name: &str) -> crate::error::Result<()> {
    validate_finite(low, name)?;
    validate_finite(high, name)?;
    if low >= high {
        return Err(IvSurfError::InvalidInput {
            message: format!("{name} lower bound {low} must be below upper bound {high}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_rejects_zero_nan_inf() {
        assert!(validate_positive(0.0, "x").is_err());
        assert!(validate_positive(-1.0, "x").is_err());
        assert!(validate_positive(f64::NAN, "x").is_err());
        assert!(validate_positive(f64::INFINITY, "x").is_err());
        assert_eq!(validate_positive(2.0, "x").unwrap(), 2.0);
    }

    #[test]
    fn interval_requires_ordering() {
        assert!(validate_interval(0.01, 3.0, "band").is_ok());
        assert!(validate_interval(3.0, 3.0, "band").is_err());
        assert!(validate_interval(f64::NAN, 3.0, "band").is_err());
    }
}
