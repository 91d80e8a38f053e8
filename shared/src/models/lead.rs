//! Lead Model

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LeadType {
    Click,
    Conversion,
}

/// Where the lead event came from: a typed tagged union per event source
/// rather than an open-ended metadata map, so malformed payloads are caught
/// at the boundary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum LeadSource {
    Checkout { purchase_id: String },
    Webhook { external_purchase_id: Option<String> },
    LandingPage { referrer: Option<String> },
}

/// Tracked customer interaction attributed to a partnership.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub lead_id: String,
    pub partnership_id: String,
    pub affiliate_id: String,
    pub company_id: String,
    pub product_id: Option<String>,
    pub purchase_id: Option<String>,
    pub lead_type: LeadType,
    pub customer_email: Option<String>,
    pub lead_source: LeadSource,
    pub created_at: i64,
}
