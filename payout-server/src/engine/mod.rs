//! Commission & payout computation engine
//!
//! The money-bearing core: discount resolution, commission calculation, the
//! purchase/lead recorder, payout eligibility, and the batch executor. Pure
//! computation lives in free functions; the services take their collaborators
//! (repositories, gateway, audit) injected.

pub mod commission;
pub mod discount;
pub mod eligibility;
pub mod executor;
pub mod fees;
pub mod recorder;

pub use commission::{CommissionBreakdown, CommissionConfig, calculate_commission};
pub use discount::{DiscountConfig, DiscountResult, recover_original_amount, resolve_discount};
pub use eligibility::{EligibilityDecision, EligibleBatch, SkipReason, evaluate};
pub use executor::{BatchReport, PayoutEngine};
pub use fees::{FeeScheduleEntry, calculate_fee, fee_entry, validate_transfer_amount};
pub use recorder::{
    CheckoutRequest, ExternalPurchaseEvent, PurchaseRecorder, RecordedPurchase,
};

use thiserror::Error;

use crate::db::repository::RepoError;
use crate::payments::PaymentError;

/// Engine error taxonomy.
///
/// Validation and state errors propagate straight to the caller with no
/// partial writes; payment and database failures inside the batch path are
/// caught per affiliate instead (see `executor`).
#[derive(Debug, Error)]
pub enum EngineError {
    // ========== Validation ==========
    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("missing required field: {0}")]
    MissingRequiredField(&'static str),

    #[error("unsupported discount config: {0}")]
    UnsupportedDiscountConfig(String),

    // ========== State ==========
    #[error("partnership {0} is not approved")]
    PartnershipNotApproved(String),

    #[error("insufficient inventory for product {product_id}: requested {requested}, available {available}")]
    InsufficientInventory {
        product_id: String,
        requested: i64,
        available: i64,
    },

    #[error("product not found: {0}")]
    ProductNotFound(String),

    #[error("partnership not found: {0}")]
    PartnershipNotFound(String),

    #[error("product uses external checkout: {0}")]
    ExternalCheckout(String),

    #[error("transfer amount {amount} out of range for {method} (allowed {min}..{max})")]
    AmountOutOfRange {
        method: &'static str,
        amount: f64,
        min: f64,
        max: f64,
    },

    // ========== External dependencies ==========
    #[error("payment error: {0}")]
    Payment(#[from] PaymentError),

    #[error("database error: {0}")]
    Database(#[from] RepoError),
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Validate that an f64 money value is finite (not NaN, not Infinity)
#[inline]
pub(crate) fn require_finite(value: f64, field_name: &str) -> EngineResult<()> {
    if !value.is_finite() {
        return Err(EngineError::InvalidAmount(format!(
            "{field_name} must be a finite number, got {value}"
        )));
    }
    Ok(())
}
