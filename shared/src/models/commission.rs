//! Commission Model

use serde::{Deserialize, Serialize};

/// Commission status lifecycle: `pending → approved → paid` (or `rejected`).
///
/// The payout engine only ever consumes commissions in `approved` state; the
/// flip to `paid` is the final step that finalizes a payout.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CommissionStatus {
    Pending,
    Approved,
    Paid,
    Rejected,
}

/// One row per commission-bearing event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commission {
    pub commission_id: String,
    pub purchase_id: Option<String>,
    pub partnership_id: String,
    pub affiliate_id: String,
    pub company_id: String,
    /// Commission earned on the sale
    pub commission_amount: f64,
    /// The affiliate's gross share before processor fee. Equals
    /// `commission_amount`; the platform fee is accounted separately so the
    /// ledger shows true commission earned
    pub affiliate_payout_amount: f64,
    pub platform_fee_amount: f64,
    pub status: CommissionStatus,
    /// Set when the owning payout succeeds
    pub payout_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create commission payload (written transactionally with its purchase)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommissionCreate {
    pub purchase_id: Option<String>,
    pub partnership_id: String,
    pub affiliate_id: String,
    pub company_id: String,
    pub commission_amount: f64,
    pub affiliate_payout_amount: f64,
    pub platform_fee_amount: f64,
}
