//! Audit Log Handlers

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;

use crate::audit::types::AuditListResponse;
use crate::audit::{AuditChainVerification, AuditQuery};
use crate::common::{AppError, AppResponse, ok};
use crate::server::ServerState;

/// GET /api/audit
pub async fn query(
    State(state): State<ServerState>,
    Query(q): Query<AuditQuery>,
) -> Result<Json<AppResponse<AuditListResponse>>, AppError> {
    let (items, total) = state
        .audit
        .query(&q)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    Ok(ok(AuditListResponse { items, total }))
}

#[derive(Debug, Deserialize)]
pub struct VerifyParams {
    pub from: Option<i64>,
    pub to: Option<i64>,
}

/// GET /api/audit/verify, recompute the hash chain
pub async fn verify_chain(
    State(state): State<ServerState>,
    Query(params): Query<VerifyParams>,
) -> Result<Json<AppResponse<AuditChainVerification>>, AppError> {
    let verification = state
        .audit
        .verify_chain(params.from, params.to)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    Ok(ok(verification))
}
