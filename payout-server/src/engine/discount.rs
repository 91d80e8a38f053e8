//! Discount Resolver
//!
//! Computes the affiliate discount applied to the customer-facing price.
//! Percentage discounts apply to the pre-discount subtotal; flat discounts
//! are per-unit and scale with quantity, matching the commission's per-unit
//! flat semantics.

use rust_decimal::Decimal;
use shared::models::product::{DiscountType, Product};
use shared::money::{percent_of, to_decimal, to_f64};

use super::{EngineError, EngineResult, require_finite};

/// A product's discount configuration, lifted out so the resolver can be
/// exercised without a full Product row.
#[derive(Debug, Clone, Default)]
pub struct DiscountConfig {
    pub enabled: bool,
    pub discount_type: Option<DiscountType>,
    pub value: Option<f64>,
}

impl From<&Product> for DiscountConfig {
    fn from(p: &Product) -> Self {
        Self {
            enabled: p.affiliate_discount_enabled,
            discount_type: p.affiliate_discount_type,
            value: p.affiliate_discount_value,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiscountResult {
    pub discount_amount: f64,
    pub discount_applied: bool,
}

impl DiscountResult {
    fn none() -> Self {
        Self {
            discount_amount: 0.0,
            discount_applied: false,
        }
    }
}

/// Resolve the discount for a sale.
///
/// `subtotal` is `unit_price * quantity`, pre-discount. A disabled config or
/// one with a missing type/value resolves to no discount; malformed config
/// never fails a sale.
pub fn resolve_discount(config: &DiscountConfig, subtotal: f64, quantity: i64) -> DiscountResult {
    if !config.enabled {
        return DiscountResult::none();
    }
    let (Some(discount_type), Some(value)) = (config.discount_type, config.value) else {
        return DiscountResult::none();
    };
    if !value.is_finite() || value <= 0.0 {
        return DiscountResult::none();
    }

    let discount = match discount_type {
        DiscountType::Percentage => percent_of(to_decimal(subtotal), to_decimal(value)),
        // Flat amount is per-unit, scaled by quantity
        DiscountType::Flat => to_decimal(value) * Decimal::from(quantity),
    };

    // Never discount past the subtotal itself
    let discount = discount.min(to_decimal(subtotal));

    DiscountResult {
        discount_amount: to_f64(discount),
        discount_applied: true,
    }
}

/// Inverse operation: given an amount already net of a percentage discount
/// `rate`, recover `(original_amount, discount_amount)`.
///
/// This is the only division underlying a money computation in the engine.
/// Configs with `rate >= 100` are rejected so the denominator never hits
/// zero.
pub fn recover_original_amount(
    purchase_amount: f64,
    rate: f64,
) -> EngineResult<(f64, f64)> {
    require_finite(purchase_amount, "purchase_amount")?;
    require_finite(rate, "discount rate")?;
    if purchase_amount < 0.0 {
        return Err(EngineError::InvalidAmount(format!(
            "purchase_amount must be non-negative, got {purchase_amount}"
        )));
    }
    if !(0.0..100.0).contains(&rate) {
        return Err(EngineError::UnsupportedDiscountConfig(format!(
            "percentage discount rate must be in [0, 100), got {rate}"
        )));
    }

    let multiplier = Decimal::ONE - to_decimal(rate) / Decimal::ONE_HUNDRED;
    let original = to_decimal(purchase_amount) / multiplier;
    let original_rounded = to_f64(original);
    let discount = to_f64(original - to_decimal(purchase_amount));
    Ok((original_rounded, discount))
}
