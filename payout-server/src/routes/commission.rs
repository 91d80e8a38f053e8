//! Commission Routes
//!
//! Company approval workflow feeding the payout engine.

use axum::{
    Router,
    routing::{get, post},
};

use crate::handler;
use crate::server::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/commissions", get(handler::commission::list))
        .route(
            "/api/commissions/{id}/approve",
            post(handler::commission::approve),
        )
        .route(
            "/api/commissions/{id}/reject",
            post(handler::commission::reject),
        )
}
