//! External Purchase Webhook Handler

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::common::AppError;
use crate::engine::ExternalPurchaseEvent;
use crate::server::ServerState;

/// Webhook response contract: `{success, purchase_id, commission_amount}`
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub success: bool,
    pub purchase_id: String,
    pub commission_amount: f64,
}

/// POST /api/webhooks/purchase
///
/// Validation failures name the missing/invalid field; retries with the same
/// `external_purchase_id` are idempotent.
pub async fn record_external_purchase(
    State(state): State<ServerState>,
    Json(event): Json<ExternalPurchaseEvent>,
) -> Result<Json<WebhookResponse>, AppError> {
    let recorded = state.recorder.record_external_purchase(event).await?;
    Ok(Json(WebhookResponse {
        success: true,
        purchase_id: recorded.purchase_id,
        commission_amount: recorded.commission_amount,
    }))
}
