//! Payout Models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Supported payout rails (fee schedule keys)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PayoutMethod {
    AchStandard,
    AchInstant,
    DebitInstant,
}

impl PayoutMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayoutMethod::AchStandard => "ach_standard",
            PayoutMethod::AchInstant => "ach_instant",
            PayoutMethod::DebitInstant => "debit_instant",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PayoutFrequency {
    Weekly,
    Biweekly,
    Monthly,
}

impl PayoutFrequency {
    /// Days until the next scheduled run
    pub fn interval_days(&self) -> i64 {
        match self {
            PayoutFrequency::Weekly => 7,
            PayoutFrequency::Biweekly => 14,
            PayoutFrequency::Monthly => 30,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PayoutStatus {
    Processing,
    Scheduled,
    Paid,
    Failed,
}

/// One payout preference per affiliate.
///
/// Read-only to the payout engine except for advancing
/// `next_scheduled_payout_date` after a successful run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoutPreference {
    pub affiliate_id: String,
    pub auto_payout_enabled: bool,
    pub preferred_payout_method: PayoutMethod,
    pub payout_frequency: PayoutFrequency,
    pub minimum_payout_threshold: f64,
    pub next_scheduled_payout_date: NaiveDate,
    /// Payment-processor payee account (None until the affiliate onboards)
    pub stripe_account_id: Option<String>,
    pub updated_at: i64,
}

/// Payout batch record, created exactly once per successful batch execution.
///
/// `commission_ids` is the exact set paid; a commission id must appear in at
/// most one non-failed payout ever.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payout {
    pub payout_id: String,
    pub affiliate_id: String,
    /// Sum of the referenced commissions' `affiliate_payout_amount`s
    pub total_amount: f64,
    pub platform_fee_total: f64,
    pub commission_ids: Vec<String>,
    pub status: PayoutStatus,
    pub stripe_transfer_id: Option<String>,
    pub payout_method: PayoutMethod,
    /// Processor fee deducted from `total_amount` before transfer
    pub stripe_fee_amount: f64,
    pub scheduled_date: NaiveDate,
    pub created_at: i64,
}
