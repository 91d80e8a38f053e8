//! Ledger Routes
//!
//! In-app checkout recording plus the catalog surface that feeds it.

use axum::{
    Router,
    routing::{get, post},
};

use crate::handler;
use crate::server::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/purchases", post(handler::ledger::record_purchase))
        .route("/api/purchases/{id}", get(handler::ledger::get_purchase))
        .route("/api/products", post(handler::ledger::create_product))
        .route("/api/partnerships", post(handler::ledger::create_partnership))
}
