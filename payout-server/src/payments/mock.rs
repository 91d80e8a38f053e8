//! In-process gateway double for tests and local development.
//!
//! Accounts and failures are scripted up front; every transfer is recorded
//! so tests can assert exactly what would have hit the rail.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use super::{
    AccountStatus, PaymentError, PaymentGateway, TransferReceipt, TransferRequest,
    VerificationState,
};

#[derive(Default)]
pub struct MockGateway {
    accounts: Mutex<HashMap<String, AccountStatus>>,
    /// Accounts whose transfers are scripted to fail, with the error message
    failing_accounts: Mutex<HashMap<String, String>>,
    transfers: Mutex<Vec<TransferRequest>>,
    counter: AtomicU64,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fully verified payee account
    pub fn add_verified_account(&self, account_id: &str) {
        self.accounts.lock().unwrap().insert(
            account_id.to_string(),
            AccountStatus {
                verification: VerificationState::Verified,
                charges_enabled: true,
                payouts_enabled: true,
            },
        );
    }

    /// Register a payee account stuck in onboarding
    pub fn add_pending_account(&self, account_id: &str) {
        self.accounts.lock().unwrap().insert(
            account_id.to_string(),
            AccountStatus {
                verification: VerificationState::Pending,
                charges_enabled: false,
                payouts_enabled: false,
            },
        );
    }

    /// Script every transfer to this account to fail
    pub fn fail_transfers_to(&self, account_id: &str, message: &str) {
        self.failing_accounts
            .lock()
            .unwrap()
            .insert(account_id.to_string(), message.to_string());
    }

    /// All transfers attempted so far, in order
    pub fn transfers(&self) -> Vec<TransferRequest> {
        self.transfers.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_transfer(
        &self,
        req: TransferRequest,
    ) -> Result<TransferReceipt, PaymentError> {
        if let Some(message) = self
            .failing_accounts
            .lock()
            .unwrap()
            .get(&req.destination_account)
        {
            return Err(PaymentError::Api {
                code: "transfer_failed".to_string(),
                message: message.clone(),
            });
        }

        self.transfers.lock().unwrap().push(req);
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(TransferReceipt {
            transfer_id: format!("tr_mock_{n}"),
        })
    }

    async fn account_status(&self, account_id: &str) -> Result<AccountStatus, PaymentError> {
        self.accounts
            .lock()
            .unwrap()
            .get(account_id)
            .cloned()
            .ok_or_else(|| PaymentError::AccountNotFound(account_id.to_string()))
    }
}
