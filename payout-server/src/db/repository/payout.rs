//! Payout Repository
//!
//! 每次成功批付恰好写入一行。行内 commission_ids 是本次支付的精确集合。

use super::{BaseRepository, RepoError, RepoResult};
use shared::models::payout::Payout;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct PayoutRepository {
    base: BaseRepository,
}

impl PayoutRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Persist the payout record. Called only after the transfer confirmed
    /// success: a payout row must never claim money moved when it did not.
    pub async fn create(&self, payout: Payout) -> RepoResult<Payout> {
        let created: Option<Payout> = self
            .base
            .db()
            .create("payout")
            .content(payout)
            .await
            .map_err(RepoError::from)?;
        created.ok_or_else(|| RepoError::Database("Failed to create payout".to_string()))
    }

    pub async fn find_by_id(&self, payout_id: &str) -> RepoResult<Option<Payout>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM payout WHERE payout_id = $pid LIMIT 1")
            .bind(("pid", payout_id.to_string()))
            .await
            .map_err(RepoError::from)?;
        let rows: Vec<Payout> = result.take(0).map_err(RepoError::from)?;
        Ok(rows.into_iter().next())
    }

    pub async fn list_by_affiliate(&self, affiliate_id: &str) -> RepoResult<Vec<Payout>> {
        let rows: Vec<Payout> = self
            .base
            .db()
            .query("SELECT * FROM payout WHERE affiliate_id = $aid ORDER BY created_at DESC")
            .bind(("aid", affiliate_id.to_string()))
            .await
            .map_err(RepoError::from)?
            .take(0)
            .map_err(RepoError::from)?;
        Ok(rows)
    }

    pub async fn list_all(&self) -> RepoResult<Vec<Payout>> {
        let rows: Vec<Payout> = self
            .base
            .db()
            .query("SELECT * FROM payout ORDER BY created_at DESC")
            .await
            .map_err(RepoError::from)?
            .take(0)
            .map_err(RepoError::from)?;
        Ok(rows)
    }
}
