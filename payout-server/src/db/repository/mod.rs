//! Repository Module
//!
//! One repository per table, all speaking plain SurrealQL through a shared
//! `BaseRepository`. Rows carry their own `*_id` snowflake fields; the
//! SurrealDB record id is an implementation detail the application never
//! touches.

pub mod commission;
pub mod lead;
pub mod partnership;
pub mod payout;
pub mod payout_preference;
pub mod product;
pub mod purchase;

pub use commission::CommissionRepository;
pub use lead::LeadRepository;
pub use partnership::PartnershipRepository;
pub use payout::PayoutRepository;
pub use payout_preference::PayoutPreferenceRepository;
pub use product::ProductRepository;
pub use purchase::PurchaseRepository;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        let msg = err.to_string();
        let lowered = msg.to_lowercase();
        if lowered.contains("unique") || lowered.contains("already exists") {
            RepoError::Duplicate(msg)
        } else {
            RepoError::Database(msg)
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}
