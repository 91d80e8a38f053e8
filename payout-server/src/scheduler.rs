//! Payout run scheduler
//!
//! Fires the batch run once a day at the configured UTC hour, through the
//! same entry point the authenticated HTTP trigger uses, so an external cron
//! can replace or supplement this task without behavioral difference.

use chrono::{Duration as ChronoDuration, NaiveTime, Utc};
use tokio_util::sync::CancellationToken;

use crate::server::ServerState;

pub struct PayoutScheduler {
    state: ServerState,
    shutdown: CancellationToken,
}

impl PayoutScheduler {
    pub fn new(state: ServerState, shutdown: CancellationToken) -> Self {
        Self { state, shutdown }
    }

    /// 主循环：定点触发批付 + 关机信号响应
    pub async fn run(self) {
        tracing::info!(
            hour = self.state.config.payout_run_hour,
            "Payout scheduler started"
        );

        loop {
            let sleep_duration = Self::duration_until_next_run(self.state.config.payout_run_hour);
            tracing::info!(
                "Next payout run in {} minutes",
                sleep_duration.as_secs() / 60
            );

            tokio::select! {
                _ = tokio::time::sleep(sleep_duration) => {
                    self.run_once().await;
                }
                _ = self.shutdown.cancelled() => {
                    tracing::info!("Payout scheduler received shutdown signal");
                    return;
                }
            }
        }
    }

    async fn run_once(&self) {
        let today = Utc::now().date_naive();
        match self.state.payout_engine.run(today).await {
            Ok(report) => {
                tracing::info!(
                    processed = report.processed,
                    skipped = report.skipped,
                    failed = report.failed,
                    "Scheduled payout run completed"
                );
            }
            Err(e) => {
                // Fatal class: candidate list unavailable. Next day retries.
                tracing::error!(error = %e, "Scheduled payout run aborted");
            }
        }
    }

    fn duration_until_next_run(run_hour: u32) -> std::time::Duration {
        let now = Utc::now();
        let run_time = NaiveTime::from_hms_opt(run_hour, 0, 0)
            .unwrap_or_else(|| NaiveTime::from_hms_opt(6, 0, 0).unwrap());
        let today_run = now.date_naive().and_time(run_time).and_utc();
        let next = if today_run > now {
            today_run
        } else {
            today_run + ChronoDuration::days(1)
        };
        (next - now)
            .to_std()
            .unwrap_or(std::time::Duration::from_secs(60))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_run_is_within_a_day() {
        let d = PayoutScheduler::duration_until_next_run(6);
        assert!(d <= std::time::Duration::from_secs(24 * 3600));
    }
}
