//! Purchase Model (ledger entry)

use serde::{Deserialize, Serialize};

/// How the customer paid
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// In-app checkout through the platform
    Platform,
    /// External checkout, reconciled through the webhook path
    External,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseStatus {
    Completed,
    Refunded,
}

/// Immutable purchase ledger entry.
///
/// Never mutated after creation; inventory side-effects land on the Product
/// row, not here. `purchase_amount` is the post-discount amount the customer
/// actually paid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Purchase {
    pub purchase_id: String,
    pub product_id: String,
    pub partnership_id: String,
    pub affiliate_id: String,
    pub company_id: String,
    pub customer_email: String,
    pub purchase_amount: f64,
    pub commission_amount: f64,
    pub platform_fee: f64,
    pub quantity: i64,
    pub discount_applied: bool,
    pub discount_amount: f64,
    pub status: PurchaseStatus,
    pub payment_method: PaymentMethod,
    /// Processor-side ID for externally reported sales (webhook idempotency key)
    pub external_purchase_id: Option<String>,
    /// When the sale happened (Unix millis); webhook may backdate
    pub purchased_at: i64,
    pub created_at: i64,
}
