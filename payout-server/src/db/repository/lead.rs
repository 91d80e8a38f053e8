//! Lead Repository

use super::{BaseRepository, RepoError, RepoResult};
use shared::models::lead::Lead;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct LeadRepository {
    base: BaseRepository,
}

impl LeadRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(&self, lead: Lead) -> RepoResult<Lead> {
        let created: Option<Lead> = self
            .base
            .db()
            .create("lead")
            .content(lead)
            .await
            .map_err(RepoError::from)?;
        created.ok_or_else(|| RepoError::Database("Failed to create lead".to_string()))
    }

    pub async fn list_by_partnership(&self, partnership_id: &str) -> RepoResult<Vec<Lead>> {
        let rows: Vec<Lead> = self
            .base
            .db()
            .query("SELECT * FROM lead WHERE partnership_id = $pid ORDER BY created_at DESC")
            .bind(("pid", partnership_id.to_string()))
            .await
            .map_err(RepoError::from)?
            .take(0)
            .map_err(RepoError::from)?;
        Ok(rows)
    }
}
