//! Spend normalization service
//!
//! Converts a price charged every `cycle_days` into comparable monthly and
//! yearly figures, using the same 30/365-day convention as renewal
//! scheduling. Nothing is rounded here; round only when displaying.

use super::renewal::{DAYS_PER_MONTH, DAYS_PER_YEAR};
use crate::types::{Result, SubtrackError};

fn per_period(price: f64, cycle_days: i64, period_days: i64) -> Result<f64> {
    if cycle_days <= 0 {
        return Err(SubtrackError::InvalidCycle { days: cycle_days });
    }
    Ok(price * period_days as f64 / cycle_days as f64)
}

/// Monthly equivalent: `price * 30 / cycle_days`.
///
/// # Examples
/// ```
/// use subtrack::services::normalizer::monthly_equivalent;
///
/// let monthly = monthly_equivalent(120.0, 365).unwrap();
/// assert!((monthly - 9.863).abs() < 0.001);
/// assert!(monthly_equivalent(10.0, 0).is_err());
/// ```
pub fn monthly_equivalent(price: f64, cycle_days: i64) -> Result<f64> {
    per_period(price, cycle_days, DAYS_PER_MONTH)
}

/// Yearly equivalent: `price * 365 / cycle_days`
pub fn yearly_equivalent(price: f64, cycle_days: i64) -> Result<f64> {
    per_period(price, cycle_days, DAYS_PER_YEAR)
}

/// Round to cents for presentation
pub fn round_for_display(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
