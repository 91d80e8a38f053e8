//! Product Model

use serde::{Deserialize, Serialize};

/// Commission type enum
///
/// Unknown values fail closed at deserialization; there is no default
/// fallback to percentage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CommissionType {
    Percentage,
    Flat,
}

/// Affiliate discount type enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    Percentage,
    Flat,
}

/// Product entity
///
/// Invariants (enforced on create):
/// - `inventory_quantity >= 0` whenever `inventory_tracking` is on
/// - `commission_rate >= 0`; percentage rates in [0, 100]
/// - percentage `affiliate_discount_value` strictly below 100 (the inverse
///   discount recovery divides by `1 - value/100`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub product_id: String,
    pub company_id: String,
    pub name: String,
    /// Listed unit price before any affiliate discount
    pub price: f64,
    /// ISO currency code, lowercase (e.g. "eur", "usd")
    pub currency: String,
    pub commission_rate: f64,
    pub commission_type: CommissionType,
    pub affiliate_discount_enabled: bool,
    pub affiliate_discount_type: Option<DiscountType>,
    pub affiliate_discount_value: Option<f64>,
    pub inventory_tracking: bool,
    pub inventory_quantity: i64,
    /// When set, in-app checkout is bypassed and sales arrive via webhook
    pub external_checkout_url: Option<String>,
    pub created_at: i64,
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub company_id: String,
    pub name: String,
    pub price: f64,
    pub currency: String,
    pub commission_rate: f64,
    pub commission_type: CommissionType,
    #[serde(default)]
    pub affiliate_discount_enabled: bool,
    pub affiliate_discount_type: Option<DiscountType>,
    pub affiliate_discount_value: Option<f64>,
    #[serde(default)]
    pub inventory_tracking: bool,
    #[serde(default)]
    pub inventory_quantity: i64,
    pub external_checkout_url: Option<String>,
}
