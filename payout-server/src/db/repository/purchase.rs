//! Purchase Repository
//!
//! Purchase 是不可变账本行。购买 + 佣金两行写入在同一事务内，
//! 账本不变量（金额字段一致）绝不跨事务分裂。

use super::{BaseRepository, RepoError, RepoResult};
use shared::models::commission::Commission;
use shared::models::purchase::Purchase;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct PurchaseRepository {
    base: BaseRepository,
}

impl PurchaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Insert the purchase ledger row and its commission row in one
    /// transaction. Lead insertion and inventory decrement are follow-up
    /// effects outside this boundary (idempotent, retriable).
    pub async fn create_with_commission(
        &self,
        purchase: Purchase,
        commission: Commission,
    ) -> RepoResult<(Purchase, Commission)> {
        let mut result = self
            .base
            .db()
            .query(
                r#"
                BEGIN TRANSACTION;
                CREATE purchase CONTENT $purchase;
                CREATE commission CONTENT $commission;
                COMMIT TRANSACTION;
                "#,
            )
            .bind(("purchase", purchase))
            .bind(("commission", commission))
            .await
            .map_err(RepoError::from)?;

        let purchases: Vec<Purchase> = result.take(0).map_err(RepoError::from)?;
        let commissions: Vec<Commission> = result.take(1).map_err(RepoError::from)?;

        match (purchases.into_iter().next(), commissions.into_iter().next()) {
            (Some(p), Some(c)) => Ok((p, c)),
            _ => Err(RepoError::Database(
                "Purchase transaction returned no rows".to_string(),
            )),
        }
    }

    pub async fn find_by_id(&self, purchase_id: &str) -> RepoResult<Option<Purchase>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM purchase WHERE purchase_id = $pid LIMIT 1")
            .bind(("pid", purchase_id.to_string()))
            .await
            .map_err(RepoError::from)?;
        let rows: Vec<Purchase> = result.take(0).map_err(RepoError::from)?;
        Ok(rows.into_iter().next())
    }

    /// Webhook idempotency lookup: an external purchase id that was already
    /// recorded short-circuits to the existing ledger row.
    pub async fn find_by_external_id(
        &self,
        external_purchase_id: &str,
    ) -> RepoResult<Option<Purchase>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM purchase WHERE external_purchase_id = $eid LIMIT 1")
            .bind(("eid", external_purchase_id.to_string()))
            .await
            .map_err(RepoError::from)?;
        let rows: Vec<Purchase> = result.take(0).map_err(RepoError::from)?;
        Ok(rows.into_iter().next())
    }

    pub async fn list_by_affiliate(&self, affiliate_id: &str) -> RepoResult<Vec<Purchase>> {
        let rows: Vec<Purchase> = self
            .base
            .db()
            .query("SELECT * FROM purchase WHERE affiliate_id = $aid ORDER BY created_at DESC")
            .bind(("aid", affiliate_id.to_string()))
            .await
            .map_err(RepoError::from)?
            .take(0)
            .map_err(RepoError::from)?;
        Ok(rows)
    }
}
