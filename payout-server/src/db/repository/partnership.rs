//! Partnership Repository
//!
//! affiliate_code 由 UNIQUE 索引保证唯一。

use super::{BaseRepository, RepoError, RepoResult};
use shared::models::partnership::{Partnership, PartnershipCreate, PartnershipStatus};
use shared::util;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct PartnershipRepository {
    base: BaseRepository,
}

impl PartnershipRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(&self, data: PartnershipCreate) -> RepoResult<Partnership> {
        if data.affiliate_code.trim().is_empty() {
            return Err(RepoError::Validation(
                "affiliate_code must not be empty".to_string(),
            ));
        }

        let partnership = Partnership {
            partnership_id: util::new_id(),
            affiliate_id: data.affiliate_id,
            company_id: data.company_id,
            product_id: data.product_id,
            affiliate_code: data.affiliate_code,
            status: data.status,
            created_at: util::now_millis(),
        };

        let created: Option<Partnership> = self
            .base
            .db()
            .create("partnership")
            .content(partnership)
            .await
            .map_err(RepoError::from)?;
        created.ok_or_else(|| RepoError::Database("Failed to create partnership".to_string()))
    }

    pub async fn find_by_id(&self, partnership_id: &str) -> RepoResult<Option<Partnership>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM partnership WHERE partnership_id = $pid LIMIT 1")
            .bind(("pid", partnership_id.to_string()))
            .await
            .map_err(RepoError::from)?;
        let rows: Vec<Partnership> = result.take(0).map_err(RepoError::from)?;
        Ok(rows.into_iter().next())
    }

    /// Webhook lookup: referral code + company, regardless of status.
    ///
    /// The caller distinguishes "no such code" from "code exists but the
    /// partnership is not approved".
    pub async fn find_by_code_and_company(
        &self,
        affiliate_code: &str,
        company_id: &str,
    ) -> RepoResult<Option<Partnership>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM partnership WHERE affiliate_code = $code AND company_id = $cid LIMIT 1",
            )
            .bind(("code", affiliate_code.to_string()))
            .bind(("cid", company_id.to_string()))
            .await
            .map_err(RepoError::from)?;
        let rows: Vec<Partnership> = result.take(0).map_err(RepoError::from)?;
        Ok(rows.into_iter().next())
    }

    /// Company approval workflow: flip the partnership status
    pub async fn set_status(
        &self,
        partnership_id: &str,
        status: PartnershipStatus,
    ) -> RepoResult<Partnership> {
        let mut result = self
            .base
            .db()
            .query("UPDATE partnership SET status = $status WHERE partnership_id = $pid RETURN AFTER")
            .bind(("status", status))
            .bind(("pid", partnership_id.to_string()))
            .await
            .map_err(RepoError::from)?;
        let rows: Vec<Partnership> = result.take(0).map_err(RepoError::from)?;
        rows.into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Partnership {partnership_id} not found")))
    }
}
