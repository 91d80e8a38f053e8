//! Health Routes

use axum::{Router, routing::get};

use crate::handler;
use crate::server::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/health", get(handler::health::health))
}
