//! Payment gateway seam
//!
//! The engine only ever sees the `PaymentGateway` trait. The concrete
//! Stripe client is injected at startup, a scriptable mock in tests. No
//! global client singleton.

pub mod mock;
pub mod stripe;

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use mock::MockGateway;
pub use stripe::StripeGateway;

/// Errors raised by the payment rail
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("transfer declined by processor: {code}: {message}")]
    Api { code: String, message: String },

    #[error("payment gateway request failed: {0}")]
    Http(String),

    #[error("payment gateway timed out after {0}ms")]
    Timeout(u64),

    #[error("unexpected payment gateway response: {0}")]
    InvalidResponse(String),

    #[error("payee account not found: {0}")]
    AccountNotFound(String),
}

/// A funds transfer to a payee account, amounts in minor units (cents)
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub destination_account: String,
    pub amount_minor: i64,
    pub currency: String,
    pub description: String,
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct TransferReceipt {
    pub transfer_id: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VerificationState {
    Verified,
    Pending,
    Restricted,
}

/// Payee account standing as reported by the processor
#[derive(Debug, Clone)]
pub struct AccountStatus {
    pub verification: VerificationState,
    pub charges_enabled: bool,
    pub payouts_enabled: bool,
}

impl AccountStatus {
    pub fn is_verified(&self) -> bool {
        self.verification == VerificationState::Verified
    }
}

/// Abstract transfer operation the payout engine depends on
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Move funds to a payee. Returns a processor transfer id or fails;
    /// there is no partial success.
    async fn create_transfer(&self, req: TransferRequest)
    -> Result<TransferReceipt, PaymentError>;

    /// Look up the payee account standing
    async fn account_status(&self, account_id: &str) -> Result<AccountStatus, PaymentError>;
}
