//! Money calculation utilities using rust_decimal for precision
//!
//! All ledger amounts are stored and serialized as `f64`, but every
//! computation runs on `Decimal` internally and is rounded exactly once at
//! the end of each derived value. Rounding is 2 decimal places, half-up.

use rust_decimal::prelude::*;

/// Rounding strategy for monetary values (2 decimal places, half-up)
pub const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Maximum allowed monetary amount (€1,000,000)
pub const MAX_AMOUNT: f64 = 1_000_000.0;

/// Convert f64 to Decimal for calculation
///
/// Input values should be validated as finite at the boundary. If
/// NaN/Infinity somehow reaches here, logs an error and returns ZERO to
/// avoid silent corruption in financial calculations.
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in monetary calculation, defaulting to zero");
        Decimal::ZERO
    })
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    round2(value)
        .to_f64()
        // SAFETY: Decimal rounded to 2dp with inputs bounded by MAX_AMOUNT
        // is always within f64 representable range
        .expect("Decimal rounded to 2dp is always representable as f64")
}

/// Round a Decimal to 2 decimal places, half-up
#[inline]
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// `amount * rate / 100`, unrounded; callers round once at the end
#[inline]
pub fn percent_of(amount: Decimal, rate: Decimal) -> Decimal {
    amount * rate / Decimal::ONE_HUNDRED
}

/// Convert a major-unit amount to minor units (cents) for the payment rail.
///
/// The amount is rounded to 2dp first, so the result is always exact.
pub fn to_minor_units(amount: f64) -> i64 {
    (round2(to_decimal(amount)) * Decimal::ONE_HUNDRED)
        .to_i64()
        .unwrap_or_else(|| {
            tracing::error!(amount, "Amount not representable in minor units, defaulting to zero");
            0
        })
}

/// Compare two monetary values for equality (within 0.01 tolerance)
pub fn money_eq(a: f64, b: f64) -> bool {
    let diff = (to_decimal(a) - to_decimal(b)).abs();
    diff < MONEY_TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_half_up_at_two_decimals() {
        assert_eq!(to_f64(to_decimal(10.005)), 10.01);
        assert_eq!(to_f64(to_decimal(10.004)), 10.0);
        assert_eq!(to_f64(to_decimal(2.675)), 2.68);
    }

    #[test]
    fn percent_of_exact_tenth() {
        // 10% of 100 = 10, no float drift
        let v = percent_of(to_decimal(100.0), to_decimal(10.0));
        assert_eq!(to_f64(v), 10.0);
    }

    #[test]
    fn minor_units_are_exact() {
        assert_eq!(to_minor_units(198.0), 19800);
        assert_eq!(to_minor_units(0.01), 1);
        assert_eq!(to_minor_units(12.345), 1235); // rounded first
        assert_eq!(to_minor_units(0.0), 0);
    }

    #[test]
    fn money_eq_tolerates_sub_cent_noise() {
        assert!(money_eq(10.0, 10.004));
        assert!(!money_eq(10.0, 10.02));
    }

    #[test]
    fn non_finite_input_collapses_to_zero() {
        assert_eq!(to_decimal(f64::NAN), Decimal::ZERO);
        assert_eq!(to_minor_units(f64::INFINITY), 0);
    }
}
