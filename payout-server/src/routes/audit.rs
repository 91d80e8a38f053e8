//! Audit Log Routes

use axum::{Router, routing::get};

use crate::handler;
use crate::server::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/audit", get(handler::audit::query))
        .route("/api/audit/verify", get(handler::audit::verify_chain))
}
