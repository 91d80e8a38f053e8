//! Partnership Model

use serde::{Deserialize, Serialize};

/// Partnership status lifecycle
///
/// Only `approved` partnerships may generate chargeable commissions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PartnershipStatus {
    Pending,
    Approved,
    Rejected,
    Suspended,
}

/// Partnership entity: links one affiliate to one company (and optionally
/// one product) under a unique referral code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Partnership {
    pub partnership_id: String,
    pub affiliate_id: String,
    pub company_id: String,
    pub product_id: Option<String>,
    /// Unique referral code used by the external-purchase webhook
    pub affiliate_code: String,
    pub status: PartnershipStatus,
    pub created_at: i64,
}

/// Create partnership payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnershipCreate {
    pub affiliate_id: String,
    pub company_id: String,
    pub product_id: Option<String>,
    pub affiliate_code: String,
    #[serde(default = "default_status")]
    pub status: PartnershipStatus,
}

fn default_status() -> PartnershipStatus {
    PartnershipStatus::Pending
}
