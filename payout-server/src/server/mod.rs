//! Server core: configuration, shared state, HTTP entry point

pub mod config;
pub mod state;

pub use config::Config;
pub use state::ServerState;

use tokio_util::sync::CancellationToken;

use crate::scheduler::PayoutScheduler;

/// The HTTP server plus its background tasks
pub struct Server {
    state: ServerState,
}

impl Server {
    pub fn with_state(state: ServerState) -> Self {
        Self { state }
    }

    /// Bind, start the payout scheduler, and serve until ctrl-c.
    pub async fn run(self) -> anyhow::Result<()> {
        let shutdown = CancellationToken::new();

        let scheduler = PayoutScheduler::new(self.state.clone(), shutdown.clone());
        let scheduler_handle = tokio::spawn(scheduler.run());

        let app = crate::routes::build_app(&self.state).with_state(self.state.clone());

        let addr = format!("0.0.0.0:{}", self.state.config.http_port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        tracing::info!(addr = %addr, "HTTP server listening");

        let shutdown_for_server = shutdown.clone();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                tokio::signal::ctrl_c()
                    .await
                    .expect("Failed to install ctrl-c handler");
                tracing::info!("Shutdown signal received");
                shutdown_for_server.cancel();
            })
            .await?;

        shutdown.cancel();
        let _ = scheduler_handle.await;
        Ok(())
    }
}
