//! Commission Repository

use super::{BaseRepository, RepoError, RepoResult};
use shared::models::commission::{Commission, CommissionStatus};
use shared::util;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct CommissionRepository {
    base: BaseRepository,
}

impl CommissionRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_id(&self, commission_id: &str) -> RepoResult<Option<Commission>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM commission WHERE commission_id = $cid LIMIT 1")
            .bind(("cid", commission_id.to_string()))
            .await
            .map_err(RepoError::from)?;
        let rows: Vec<Commission> = result.take(0).map_err(RepoError::from)?;
        Ok(rows.into_iter().next())
    }

    /// The payout engine's working set: approved, unpaid commissions.
    /// Selected immediately before use so a concurrent run that already paid
    /// them cannot hand us stale rows.
    pub async fn find_approved_by_affiliate(
        &self,
        affiliate_id: &str,
    ) -> RepoResult<Vec<Commission>> {
        let rows: Vec<Commission> = self
            .base
            .db()
            .query(
                "SELECT * FROM commission WHERE affiliate_id = $aid AND status = 'approved' ORDER BY created_at ASC",
            )
            .bind(("aid", affiliate_id.to_string()))
            .await
            .map_err(RepoError::from)?
            .take(0)
            .map_err(RepoError::from)?;
        Ok(rows)
    }

    /// Company-facing listing (approval queue and history)
    pub async fn list_by_company(
        &self,
        company_id: &str,
        status: Option<CommissionStatus>,
    ) -> RepoResult<Vec<Commission>> {
        let mut query = String::from("SELECT * FROM commission WHERE company_id = $cid");
        if status.is_some() {
            query.push_str(" AND status = $status");
        }
        query.push_str(" ORDER BY created_at ASC");

        let mut q = self
            .base
            .db()
            .query(query)
            .bind(("cid", company_id.to_string()));
        if let Some(status) = status {
            q = q.bind(("status", status));
        }
        let rows: Vec<Commission> = q
            .await
            .map_err(RepoError::from)?
            .take(0)
            .map_err(RepoError::from)?;
        Ok(rows)
    }

    /// All commissions for one affiliate, any status
    pub async fn list_by_affiliate(&self, affiliate_id: &str) -> RepoResult<Vec<Commission>> {
        let rows: Vec<Commission> = self
            .base
            .db()
            .query("SELECT * FROM commission WHERE affiliate_id = $aid ORDER BY created_at ASC")
            .bind(("aid", affiliate_id.to_string()))
            .await
            .map_err(RepoError::from)?
            .take(0)
            .map_err(RepoError::from)?;
        Ok(rows)
    }

    /// Company approval workflow: `pending → approved`
    pub async fn approve(&self, commission_id: &str) -> RepoResult<Commission> {
        self.transition(commission_id, CommissionStatus::Pending, CommissionStatus::Approved)
            .await
    }

    /// Company approval workflow: `pending → rejected`
    pub async fn reject(&self, commission_id: &str) -> RepoResult<Commission> {
        self.transition(commission_id, CommissionStatus::Pending, CommissionStatus::Rejected)
            .await
    }

    async fn transition(
        &self,
        commission_id: &str,
        from: CommissionStatus,
        to: CommissionStatus,
    ) -> RepoResult<Commission> {
        let mut result = self
            .base
            .db()
            .query(
                r#"
                UPDATE commission
                SET status = $to, updated_at = $now
                WHERE commission_id = $cid AND status = $from
                RETURN AFTER
                "#,
            )
            .bind(("cid", commission_id.to_string()))
            .bind(("from", from))
            .bind(("to", to))
            .bind(("now", util::now_millis()))
            .await
            .map_err(RepoError::from)?;
        let rows: Vec<Commission> = result.take(0).map_err(RepoError::from)?;
        rows.into_iter().next().ok_or_else(|| {
            RepoError::NotFound(format!(
                "Commission {commission_id} not found in expected state"
            ))
        })
    }

    /// Final payout step: flip the exact paid set `approved → paid`.
    ///
    /// Compare-and-swap on status，并发批次只有一个能改到行。
    /// Returns the number of rows actually flipped; the caller logs a
    /// reconciliation error when it differs from the expected count.
    pub async fn mark_paid(
        &self,
        commission_ids: &[String],
        payout_id: &str,
    ) -> RepoResult<usize> {
        let mut result = self
            .base
            .db()
            .query(
                r#"
                UPDATE commission
                SET status = 'paid', payout_id = $payout_id, updated_at = $now
                WHERE commission_id IN $ids AND status = 'approved'
                RETURN AFTER
                "#,
            )
            .bind(("ids", commission_ids.to_vec()))
            .bind(("payout_id", payout_id.to_string()))
            .bind(("now", util::now_millis()))
            .await
            .map_err(RepoError::from)?;
        let rows: Vec<Commission> = result.take(0).map_err(RepoError::from)?;
        Ok(rows.len())
    }
}
