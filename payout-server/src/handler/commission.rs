//! Commission Approval Handlers
//!
//! Company workflow: `pending → approved` makes a commission visible to the
//! payout engine; `pending → rejected` takes it out of play permanently.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;

use crate::audit::AuditAction;
use crate::common::{AppError, AppResponse, ok};
use crate::server::ServerState;
use shared::models::commission::{Commission, CommissionStatus};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub company_id: String,
    pub status: Option<CommissionStatus>,
}

/// GET /api/commissions?company_id=...&status=pending
pub async fn list(
    State(state): State<ServerState>,
    Query(params): Query<ListParams>,
) -> Result<Json<AppResponse<Vec<Commission>>>, AppError> {
    let commissions = state
        .commissions()
        .list_by_company(&params.company_id, params.status)
        .await?;
    Ok(ok(commissions))
}

/// POST /api/commissions/{id}/approve
pub async fn approve(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<AppResponse<Commission>>, AppError> {
    let commission = state.commissions().approve(&id).await?;
    write_audit(&state, AuditAction::CommissionApproved, &commission).await;
    Ok(ok(commission))
}

/// POST /api/commissions/{id}/reject
pub async fn reject(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<AppResponse<Commission>>, AppError> {
    let commission = state.commissions().reject(&id).await?;
    write_audit(&state, AuditAction::CommissionRejected, &commission).await;
    Ok(ok(commission))
}

async fn write_audit(state: &ServerState, action: AuditAction, commission: &Commission) {
    if let Err(e) = state
        .audit
        .append(
            action,
            "commission",
            commission.commission_id.clone(),
            serde_json::json!({
                "affiliate_id": commission.affiliate_id,
                "commission_amount": commission.commission_amount,
                "platform_fee_amount": commission.platform_fee_amount,
            }),
        )
        .await
    {
        tracing::error!(error = %e, commission_id = %commission.commission_id, "Failed to write commission audit entry");
    }
}
