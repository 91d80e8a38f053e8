//! Stripe transfer client
//!
//! Thin reqwest client for the two Stripe endpoints the engine needs:
//! `POST /v1/transfers` and `GET /v1/accounts/{id}`. Form-encoded request
//! bodies, bearer auth, an idempotency key per transfer, bounded timeout.

use std::time::Duration;

use serde::Deserialize;

use super::{
    AccountStatus, PaymentError, PaymentGateway, TransferReceipt, TransferRequest,
    VerificationState,
};

const DEFAULT_BASE_URL: &str = "https://api.stripe.com";

pub struct StripeGateway {
    http: reqwest::Client,
    base_url: String,
    secret_key: String,
    timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
struct StripeTransfer {
    id: String,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    #[serde(default)]
    code: Option<String>,
    message: String,
}

#[derive(Debug, Deserialize)]
struct StripeAccount {
    #[serde(default)]
    charges_enabled: bool,
    #[serde(default)]
    payouts_enabled: bool,
    #[serde(default)]
    requirements: Option<StripeRequirements>,
}

#[derive(Debug, Deserialize)]
struct StripeRequirements {
    #[serde(default)]
    disabled_reason: Option<String>,
}

impl StripeGateway {
    pub fn new(secret_key: impl Into<String>, timeout_ms: u64) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .expect("reqwest client construction cannot fail with static options");
        Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            secret_key: secret_key.into(),
            timeout_ms,
        }
    }

    /// Point the client at a different host (stripe-mock, test server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn map_request_error(&self, e: reqwest::Error) -> PaymentError {
        if e.is_timeout() {
            PaymentError::Timeout(self.timeout_ms)
        } else {
            PaymentError::Http(e.to_string())
        }
    }
}

#[async_trait::async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_transfer(
        &self,
        req: TransferRequest,
    ) -> Result<TransferReceipt, PaymentError> {
        let url = format!("{}/v1/transfers", self.base_url);
        let amount = req.amount_minor.to_string();

        let mut form: Vec<(String, String)> = vec![
            ("amount".to_string(), amount),
            ("currency".to_string(), req.currency.clone()),
            ("destination".to_string(), req.destination_account.clone()),
            ("description".to_string(), req.description.clone()),
        ];
        for (k, v) in &req.metadata {
            form.push((format!("metadata[{k}]"), v.clone()));
        }

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.secret_key)
            // Retries after a timeout must not move funds twice
            .header("Idempotency-Key", uuid::Uuid::new_v4().to_string())
            .form(&form)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        if response.status().is_success() {
            let transfer: StripeTransfer = response
                .json()
                .await
                .map_err(|e| PaymentError::InvalidResponse(e.to_string()))?;
            Ok(TransferReceipt {
                transfer_id: transfer.id,
            })
        } else {
            let status = response.status();
            let body: StripeErrorBody = response
                .json()
                .await
                .map_err(|_| PaymentError::InvalidResponse(format!("HTTP {status}")))?;
            Err(PaymentError::Api {
                code: body.error.code.unwrap_or_else(|| status.to_string()),
                message: body.error.message,
            })
        }
    }

    async fn account_status(&self, account_id: &str) -> Result<AccountStatus, PaymentError> {
        let url = format!("{}/v1/accounts/{}", self.base_url, account_id);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(PaymentError::AccountNotFound(account_id.to_string()));
        }
        if !response.status().is_success() {
            return Err(PaymentError::InvalidResponse(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let account: StripeAccount = response
            .json()
            .await
            .map_err(|e| PaymentError::InvalidResponse(e.to_string()))?;

        let disabled = account
            .requirements
            .as_ref()
            .and_then(|r| r.disabled_reason.as_deref())
            .is_some();

        let verification = if disabled {
            VerificationState::Restricted
        } else if account.charges_enabled && account.payouts_enabled {
            VerificationState::Verified
        } else {
            VerificationState::Pending
        };

        Ok(AccountStatus {
            verification,
            charges_enabled: account.charges_enabled,
            payouts_enabled: account.payouts_enabled,
        })
    }
}
