//! Ledger Handlers
//!
//! Checkout recording plus product/partnership creation. Purchase-path
//! errors propagate immediately to the caller as a clear failure reason.

use axum::Json;
use axum::extract::{Path, State};

use crate::common::{AppError, AppResponse, ok};
use crate::engine::{CheckoutRequest, RecordedPurchase};
use crate::server::ServerState;
use shared::models::partnership::{Partnership, PartnershipCreate};
use shared::models::product::{Product, ProductCreate};
use shared::models::purchase::Purchase;

/// POST /api/purchases, in-app checkout
pub async fn record_purchase(
    State(state): State<ServerState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<AppResponse<RecordedPurchase>>, AppError> {
    let recorded = state.recorder.record_purchase(request).await?;
    Ok(ok(recorded))
}

/// GET /api/purchases/{id}
pub async fn get_purchase(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<AppResponse<Purchase>>, AppError> {
    let purchase = crate::db::repository::PurchaseRepository::new(state.db.clone())
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Purchase {id} not found")))?;
    Ok(ok(purchase))
}

/// POST /api/products
pub async fn create_product(
    State(state): State<ServerState>,
    Json(request): Json<ProductCreate>,
) -> Result<Json<AppResponse<Product>>, AppError> {
    let product = state.products().create(request).await?;
    Ok(ok(product))
}

/// POST /api/partnerships
pub async fn create_partnership(
    State(state): State<ServerState>,
    Json(request): Json<PartnershipCreate>,
) -> Result<Json<AppResponse<Partnership>>, AppError> {
    let partnership = state.partnerships().create(request).await?;
    Ok(ok(partnership))
}
