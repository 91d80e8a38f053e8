//! Payout Routes

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::handler;
use crate::server::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        // Batch trigger - cron shared secret required
        .route("/api/payouts/run", post(handler::payout::run_batch))
        .route("/api/payouts", get(handler::payout::list_payouts))
        .route(
            "/api/payout-preferences/{affiliate_id}",
            put(handler::payout::upsert_preference),
        )
}
