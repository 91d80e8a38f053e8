//! Webhook Routes

use axum::{Router, routing::post};

use crate::handler;
use crate::server::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route(
        "/api/webhooks/purchase",
        post(handler::webhook::record_external_purchase),
    )
}
