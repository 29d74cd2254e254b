//! Derived feature columns: age, employment tenure and affordability ratios.
//!
//! Every function here is total. Invalid inputs (missing operands, zero or
//! negative denominators, the unemployed sentinel) yield a null for that row
//! and never an error or a non-finite value.

use arrow::array::{Array, Float64Array};

/// `AGE_YEARS = -DAYS_BIRTH / days_per_year`
///
/// A non-negative `DAYS_BIRTH` (birth on or after the application date) is
/// treated as invalid and yields a null.
#[must_use]
pub fn age_years(days_birth: &Float64Array, days_per_year: f64) -> Float64Array {
    days_birth
        .iter()
        .map(|d| d.filter(|d| d.is_finite() && *d < 0.0).map(|d| -d / days_per_year))
        .collect()
}

/// Null out the "not employed" sentinel in `DAYS_EMPLOYED`
#[must_use]
pub fn clean_days_employed(days_employed: &Float64Array, sentinel: f64) -> Float64Array {
    days_employed
        .iter()
        .map(|d| d.filter(|d| d.is_finite() && *d != sentinel))
        .collect()
}

/// `EMPLOYMENT_YEARS = -DAYS_EMPLOYED / days_per_year` on the cleaned column
///
/// Positive day counts other than the sentinel cannot describe a tenure and
/// yield a null as well.
#[must_use]
pub fn employment_years(cleaned_days: &Float64Array, days_per_year: f64) -> Float64Array {
    cleaned_days
        .iter()
        // adding 0.0 turns the -0.0 of a zero-day tenure into 0.0
        .map(|d| d.filter(|d| *d <= 0.0).map(|d| -d / days_per_year + 0.0))
        .collect()
}

/// Ratio `numerator / denominator` with invalid operands mapped to null
#[must_use]
pub fn guarded_ratio(numerator: &Float64Array, denominator: &Float64Array) -> Float64Array {
    debug_assert_eq!(numerator.len(), denominator.len());
    numerator
        .iter()
        .zip(denominator.iter())
        .map(|(n, d)| match (n, d) {
            (Some(n), Some(d)) if n.is_finite() && n >= 0.0 && d.is_finite() && d > 0.0 => {
                Some(n / d).filter(|r| r.is_finite())
            }
            _ => None,
        })
        .collect()
}

/// Number of null entries, used for derivation logging
#[must_use]
pub fn null_count(array: &Float64Array) -> usize {
    array.null_count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_guards_zero_and_missing_denominators() {
        let annuity = Float64Array::from(vec![Some(5000.0), Some(1000.0), None, Some(10.0)]);
        let income = Float64Array::from(vec![Some(0.0), Some(4000.0), Some(1.0), None]);
        let dti = guarded_ratio(&annuity, &income);
        assert!(dti.is_null(0));
        assert_eq!(dti.value(1), 0.25);
        assert!(dti.is_null(2));
        assert!(dti.is_null(3));
    }

    #[test]
    fn sentinel_becomes_missing_tenure() {
        let days = Float64Array::from(vec![Some(-3652.5), Some(365_243.0), Some(0.0)]);
        let cleaned = clean_days_employed(&days, 365_243.0);
        let years = employment_years(&cleaned, 365.25);
        assert_eq!(years.value(0), 10.0);
        assert!(years.is_null(1));
        assert_eq!(years.value(2), 0.0);
        assert!(years.value(2).is_sign_positive());
    }

    #[test]
    fn age_is_positive_years() {
        let days = Float64Array::from(vec![Some(-36525.0), Some(10.0)]);
        let age = age_years(&days, 365.25);
        assert_eq!(age.value(0), 100.0);
        assert!(age.is_null(1));
    }
}
