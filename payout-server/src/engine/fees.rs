//! Fee Schedule
//!
//! Static table mapping each payout rail to its processor fee rate, amount
//! bounds, and settlement time. Used by the eligibility evaluator (net
//! estimates) and the batch executor (the authoritative fee deduction).

use shared::models::payout::PayoutMethod;
use shared::money::{to_decimal, to_f64};

use super::{EngineError, EngineResult};

/// One fee schedule row
#[derive(Debug, Clone, Copy)]
pub struct FeeScheduleEntry {
    pub method: PayoutMethod,
    /// Fraction of the batch total (0.01 = 1%)
    pub fee_rate: f64,
    /// Inclusive transfer-amount bounds; None = unbounded (standard rail)
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    pub estimated_arrival: &'static str,
}

/// The static schedule
pub fn fee_entry(method: PayoutMethod) -> FeeScheduleEntry {
    match method {
        PayoutMethod::AchStandard => FeeScheduleEntry {
            method,
            fee_rate: 0.0,
            min_amount: None,
            max_amount: None,
            estimated_arrival: "1-3 business days",
        },
        PayoutMethod::AchInstant => FeeScheduleEntry {
            method,
            fee_rate: 0.01,
            min_amount: Some(1.0),
            max_amount: Some(100_000.0),
            estimated_arrival: "within 30 minutes",
        },
        PayoutMethod::DebitInstant => FeeScheduleEntry {
            method,
            fee_rate: 0.01,
            min_amount: Some(1.0),
            max_amount: Some(5_000.0),
            estimated_arrival: "within 30 minutes",
        },
    }
}

/// `round2(amount * fee_rate)`: the processor fee for a batch total
pub fn calculate_fee(amount: f64, method: PayoutMethod) -> f64 {
    let entry = fee_entry(method);
    if entry.fee_rate == 0.0 {
        return 0.0;
    }
    // fee_rate is a fraction, not a percentage
    let fee = to_decimal(amount) * to_decimal(entry.fee_rate);
    to_f64(fee)
}

/// Reject transfer amounts outside the rail's bounds before any money moves.
pub fn validate_transfer_amount(amount: f64, method: PayoutMethod) -> EngineResult<()> {
    let entry = fee_entry(method);
    let min = entry.min_amount.unwrap_or(f64::MIN);
    let max = entry.max_amount.unwrap_or(f64::MAX);
    if amount < min || amount > max {
        return Err(EngineError::AmountOutOfRange {
            method: method.as_str(),
            amount,
            min: entry.min_amount.unwrap_or(0.0),
            max: entry.max_amount.unwrap_or(f64::MAX),
        });
    }
    Ok(())
}

/// Convenience: fee and net for a batch total in one step
pub fn fee_and_net(total_amount: f64, method: PayoutMethod) -> (f64, f64) {
    let fee = calculate_fee(total_amount, method);
    let net = to_f64(to_decimal(total_amount) - to_decimal(fee));
    (fee, net)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_ach_is_free() {
        assert_eq!(calculate_fee(1000.0, PayoutMethod::AchStandard), 0.0);
        assert!(validate_transfer_amount(0.5, PayoutMethod::AchStandard).is_ok());
    }

    #[test]
    fn instant_fee_is_one_percent_rounded() {
        // $200 batch on ach_instant → $2.00 fee, $198.00 net
        let (fee, net) = fee_and_net(200.0, PayoutMethod::AchInstant);
        assert_eq!(fee, 2.0);
        assert_eq!(net, 198.0);

        // Sub-cent fee rounds half-up: 0.333 * 0.01 = 0.00333 → 0.00
        assert_eq!(calculate_fee(0.333, PayoutMethod::AchInstant), 0.0);
        // 0.55 * 0.01 = 0.0055 → 0.01
        assert_eq!(calculate_fee(0.55, PayoutMethod::AchInstant), 0.01);
    }

    #[test]
    fn instant_bounds_are_enforced() {
        assert!(validate_transfer_amount(0.5, PayoutMethod::AchInstant).is_err());
        assert!(validate_transfer_amount(1.0, PayoutMethod::AchInstant).is_ok());
        assert!(validate_transfer_amount(100_000.0, PayoutMethod::AchInstant).is_ok());
        assert!(validate_transfer_amount(100_000.01, PayoutMethod::AchInstant).is_err());

        assert!(validate_transfer_amount(5_000.0, PayoutMethod::DebitInstant).is_ok());
        let err = validate_transfer_amount(6_000.0, PayoutMethod::DebitInstant).unwrap_err();
        assert!(matches!(err, EngineError::AmountOutOfRange { .. }));
    }
}
