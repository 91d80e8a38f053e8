//! Payout Preference Repository

use super::{BaseRepository, RepoError, RepoResult};
use chrono::NaiveDate;
use shared::models::payout::{PayoutFrequency, PayoutPreference};
use shared::util;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct PayoutPreferenceRepository {
    base: BaseRepository,
}

impl PayoutPreferenceRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Affiliate-facing upsert, one preference row per affiliate
    /// (UNIQUE 索引保证)。
    pub async fn upsert(&self, mut pref: PayoutPreference) -> RepoResult<PayoutPreference> {
        if !pref.minimum_payout_threshold.is_finite() || pref.minimum_payout_threshold < 0.0 {
            return Err(RepoError::Validation(format!(
                "minimum_payout_threshold must be non-negative, got {}",
                pref.minimum_payout_threshold
            )));
        }
        pref.updated_at = util::now_millis();

        let mut result = self
            .base
            .db()
            .query(
                r#"
                DELETE payout_preference WHERE affiliate_id = $affiliate_id;
                CREATE payout_preference CONTENT $pref;
                "#,
            )
            .bind(("affiliate_id", pref.affiliate_id.clone()))
            .bind(("pref", pref))
            .await
            .map_err(RepoError::from)?;
        let rows: Vec<PayoutPreference> = result.take(1).map_err(RepoError::from)?;
        rows.into_iter()
            .next()
            .ok_or_else(|| RepoError::Database("Failed to upsert payout preference".to_string()))
    }

    pub async fn find_by_affiliate(
        &self,
        affiliate_id: &str,
    ) -> RepoResult<Option<PayoutPreference>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM payout_preference WHERE affiliate_id = $aid LIMIT 1")
            .bind(("aid", affiliate_id.to_string()))
            .await
            .map_err(RepoError::from)?;
        let rows: Vec<PayoutPreference> = result.take(0).map_err(RepoError::from)?;
        Ok(rows.into_iter().next())
    }

    /// All candidates for today's batch run: auto payout on, schedule due.
    ///
    /// `next_scheduled_payout_date` serializes as an ISO date string, so the
    /// lexicographic comparison is also the chronological one.
    pub async fn find_due(&self, today: NaiveDate) -> RepoResult<Vec<PayoutPreference>> {
        let rows: Vec<PayoutPreference> = self
            .base
            .db()
            .query(
                r#"
                SELECT * FROM payout_preference
                WHERE auto_payout_enabled = true
                  AND next_scheduled_payout_date <= $today
                ORDER BY affiliate_id ASC
                "#,
            )
            .bind(("today", today.format("%Y-%m-%d").to_string()))
            .await
            .map_err(RepoError::from)?
            .take(0)
            .map_err(RepoError::from)?;
        Ok(rows)
    }

    /// Advance the schedule after a successful payout run.
    pub async fn advance_schedule(
        &self,
        affiliate_id: &str,
        frequency: PayoutFrequency,
        from: NaiveDate,
    ) -> RepoResult<()> {
        let next = from + chrono::Duration::days(frequency.interval_days());
        self.base
            .db()
            .query(
                r#"
                UPDATE payout_preference
                SET next_scheduled_payout_date = $next, updated_at = $now
                WHERE affiliate_id = $aid
                "#,
            )
            .bind(("aid", affiliate_id.to_string()))
            .bind(("next", next.format("%Y-%m-%d").to_string()))
            .bind(("now", util::now_millis()))
            .await
            .map_err(RepoError::from)?
            .check()
            .map_err(RepoError::from)?;
        Ok(())
    }
}
