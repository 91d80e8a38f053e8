//! Commission Calculator
//!
//! Pure function from (post-discount purchase amount, quantity, product
//! commission config, company platform fee rate) to the affiliate commission
//! and the platform's cut of it. Each derived value is rounded exactly once,
//! half-up at 2 decimals, never on intermediate sums.

use rust_decimal::Decimal;
use shared::models::product::{CommissionType, Product};
use shared::money::{MAX_AMOUNT, percent_of, to_decimal, to_f64};

use super::{EngineError, EngineResult, require_finite};

/// Default platform fee when the company has not configured one (percent)
pub const DEFAULT_PLATFORM_FEE_RATE: f64 = 20.0;

/// Maximum allowed quantity per sale
const MAX_QUANTITY: i64 = 9999;

/// A product's commission configuration
#[derive(Debug, Clone, Copy)]
pub struct CommissionConfig {
    pub commission_type: CommissionType,
    pub commission_rate: f64,
}

impl From<&Product> for CommissionConfig {
    fn from(p: &Product) -> Self {
        Self {
            commission_type: p.commission_type,
            commission_rate: p.commission_rate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommissionBreakdown {
    /// The affiliate's earned share of the sale (also their gross payout
    /// amount; the platform fee is deducted at aggregate-payout time, not
    /// here, so the ledger shows true commission earned)
    pub commission_amount: f64,
    /// The platform's cut of the commission
    pub platform_fee: f64,
}

/// Calculate commission and platform fee for one sale.
///
/// `purchase_amount` is what the customer actually paid, post-discount.
/// `platform_fee_rate` is a percent; pass `None` for the default 20.
pub fn calculate_commission(
    purchase_amount: f64,
    quantity: i64,
    config: &CommissionConfig,
    platform_fee_rate: Option<f64>,
) -> EngineResult<CommissionBreakdown> {
    require_finite(purchase_amount, "purchase_amount")?;
    require_finite(config.commission_rate, "commission_rate")?;

    if purchase_amount < 0.0 {
        return Err(EngineError::InvalidAmount(format!(
            "purchase_amount must be non-negative, got {purchase_amount}"
        )));
    }
    if purchase_amount > MAX_AMOUNT {
        return Err(EngineError::InvalidAmount(format!(
            "purchase_amount exceeds maximum allowed ({MAX_AMOUNT}), got {purchase_amount}"
        )));
    }
    if quantity < 1 {
        return Err(EngineError::InvalidQuantity(format!(
            "quantity must be at least 1, got {quantity}"
        )));
    }
    if quantity > MAX_QUANTITY {
        return Err(EngineError::InvalidQuantity(format!(
            "quantity exceeds maximum allowed ({MAX_QUANTITY}), got {quantity}"
        )));
    }
    if config.commission_rate < 0.0 {
        return Err(EngineError::InvalidAmount(format!(
            "commission_rate must be non-negative, got {}",
            config.commission_rate
        )));
    }

    let fee_rate = platform_fee_rate.unwrap_or(DEFAULT_PLATFORM_FEE_RATE);
    require_finite(fee_rate, "platform_fee_rate")?;
    if !(0.0..=100.0).contains(&fee_rate) {
        return Err(EngineError::InvalidAmount(format!(
            "platform_fee_rate must be in [0, 100], got {fee_rate}"
        )));
    }

    let commission = match config.commission_type {
        CommissionType::Percentage => {
            percent_of(to_decimal(purchase_amount), to_decimal(config.commission_rate))
        }
        // Flat rate is per-unit
        CommissionType::Flat => to_decimal(config.commission_rate) * Decimal::from(quantity),
    };

    let commission_amount = to_f64(commission);
    // Platform fee derives from the rounded commission, so the two stored
    // values always reconcile to the cent
    let platform_fee = to_f64(percent_of(to_decimal(commission_amount), to_decimal(fee_rate)));

    Ok(CommissionBreakdown {
        commission_amount,
        platform_fee,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pct(rate: f64) -> CommissionConfig {
        CommissionConfig {
            commission_type: CommissionType::Percentage,
            commission_rate: rate,
        }
    }

    fn flat(rate: f64) -> CommissionConfig {
        CommissionConfig {
            commission_type: CommissionType::Flat,
            commission_rate: rate,
        }
    }

    #[test]
    fn percentage_commission_with_default_platform_fee() {
        // 10% of €100 → €10.00 commission; default 20% platform fee → €2.00
        let result = calculate_commission(100.0, 1, &pct(10.0), None).unwrap();
        assert_eq!(result.commission_amount, 10.0);
        assert_eq!(result.platform_fee, 2.0);
    }

    #[test]
    fn flat_commission_scales_per_unit() {
        // €5 flat per unit, 3 units → €15.00
        let result = calculate_commission(200.0, 3, &flat(5.0), None).unwrap();
        assert_eq!(result.commission_amount, 15.0);
        assert_eq!(result.platform_fee, 3.0);
    }

    #[test]
    fn custom_platform_fee_rate() {
        let result = calculate_commission(100.0, 1, &pct(10.0), Some(30.0)).unwrap();
        assert_eq!(result.platform_fee, 3.0);

        let zero = calculate_commission(100.0, 1, &pct(10.0), Some(0.0)).unwrap();
        assert_eq!(zero.platform_fee, 0.0);
    }

    #[test]
    fn rejects_invalid_quantity_and_amount() {
        assert!(matches!(
            calculate_commission(100.0, 0, &pct(10.0), None),
            Err(EngineError::InvalidQuantity(_))
        ));
        assert!(matches!(
            calculate_commission(-1.0, 1, &pct(10.0), None),
            Err(EngineError::InvalidAmount(_))
        ));
        assert!(matches!(
            calculate_commission(f64::NAN, 1, &pct(10.0), None),
            Err(EngineError::InvalidAmount(_))
        ));
        assert!(matches!(
            calculate_commission(100.0, 10_000, &pct(10.0), None),
            Err(EngineError::InvalidQuantity(_))
        ));
    }

    #[test]
    fn rounding_happens_once_at_the_end() {
        // 3.33% of 9.99 = 0.332667 → 0.33, fee 20% of 0.33 = 0.066 → 0.07
        let result = calculate_commission(9.99, 1, &pct(3.33), None).unwrap();
        assert_eq!(result.commission_amount, 0.33);
        assert_eq!(result.platform_fee, 0.07);
    }

    #[test]
    fn calculation_is_deterministic() {
        let a = calculate_commission(123.45, 7, &flat(1.99), Some(17.5)).unwrap();
        let b = calculate_commission(123.45, 7, &flat(1.99), Some(17.5)).unwrap();
        assert_eq!(a, b);
    }
}
