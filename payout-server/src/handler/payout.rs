//! Payout Handlers
//!
//! The batch trigger authenticates the cron caller with a shared secret in
//! the `Authorization` header. A bad or missing secret is fatal to the run;
//! nothing executes.

use axum::Json;
use axum::extract::{Path, State};
use chrono::Utc;
use http::HeaderMap;
use serde::Serialize;

use crate::common::{AppError, AppResponse, ok};
use crate::engine::BatchReport;
use crate::server::ServerState;
use shared::models::payout::{Payout, PayoutPreference};

/// Batch job response contract:
/// `{success: true, results: {processed, skipped, failed, errors}}`
#[derive(Debug, Serialize)]
pub struct BatchRunResponse {
    pub success: bool,
    pub results: BatchReport,
}

fn authorize_cron(state: &ServerState, headers: &HeaderMap) -> Result<(), AppError> {
    let secret = state.config.cron_secret.as_str();
    if secret.is_empty() {
        // Refuse to run unauthenticated rather than run open
        return Err(AppError::Unauthorized);
    }
    let presented = headers
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::Unauthorized)?;
    if presented != format!("Bearer {secret}") {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

/// POST /api/payouts/run, the scheduled batch trigger
pub async fn run_batch(
    State(state): State<ServerState>,
    headers: HeaderMap,
) -> Result<Json<BatchRunResponse>, AppError> {
    authorize_cron(&state, &headers)?;

    let today = Utc::now().date_naive();
    let results = state.payout_engine.run(today).await?;

    Ok(Json(BatchRunResponse {
        success: true,
        results,
    }))
}

/// GET /api/payouts
pub async fn list_payouts(
    State(state): State<ServerState>,
) -> Result<Json<AppResponse<Vec<Payout>>>, AppError> {
    let payouts = state.payouts().list_all().await?;
    Ok(ok(payouts))
}

/// PUT /api/payout-preferences/{affiliate_id}
pub async fn upsert_preference(
    State(state): State<ServerState>,
    Path(affiliate_id): Path<String>,
    Json(mut pref): Json<PayoutPreference>,
) -> Result<Json<AppResponse<PayoutPreference>>, AppError> {
    pref.affiliate_id = affiliate_id;
    let saved = state.payout_preferences().upsert(pref).await?;
    Ok(ok(saved))
}
