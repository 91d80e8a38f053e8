//! Database Module
//!
//! Embedded SurrealDB storage. RocksDB on disk in production, in-memory
//! engine in tests; both hand out the same `Surreal<Db>` handle.

pub mod repository;

use crate::common::AppError;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

const NAMESPACE: &str = "referra";
const DATABASE: &str = "ledger";

/// Database service, owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the on-disk database and apply schema definitions
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        let db = Surreal::new::<RocksDb>(db_path)
            .await
            .map_err(|e| AppError::Database(format!("Failed to open database: {e}")))?;
        Self::finish_init(db).await
    }

    /// In-memory database for tests
    pub async fn new_mem() -> Result<Self, AppError> {
        let db = Surreal::new::<Mem>(())
            .await
            .map_err(|e| AppError::Database(format!("Failed to open mem database: {e}")))?;
        Self::finish_init(db).await
    }

    async fn finish_init(db: Surreal<Db>) -> Result<Self, AppError> {
        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::Database(format!("Failed to select namespace: {e}")))?;

        define_schema(&db)
            .await
            .map_err(|e| AppError::Database(format!("Failed to define schema: {e}")))?;

        tracing::info!("Database connection established (SurrealDB embedded)");
        Ok(Self { db })
    }
}

/// Apply table and index definitions.
///
/// Statements are idempotent (`IF NOT EXISTS`), so this runs on every boot.
async fn define_schema(db: &Surreal<Db>) -> Result<(), surrealdb::Error> {
    db.query(
        r#"
        DEFINE TABLE IF NOT EXISTS product SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS uq_product_id ON TABLE product COLUMNS product_id UNIQUE;

        DEFINE TABLE IF NOT EXISTS partnership SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS uq_partnership_id ON TABLE partnership COLUMNS partnership_id UNIQUE;
        DEFINE INDEX IF NOT EXISTS uq_partnership_code ON TABLE partnership COLUMNS affiliate_code UNIQUE;

        DEFINE TABLE IF NOT EXISTS purchase SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS uq_purchase_id ON TABLE purchase COLUMNS purchase_id UNIQUE;
        DEFINE INDEX IF NOT EXISTS idx_purchase_affiliate ON TABLE purchase COLUMNS affiliate_id;

        DEFINE TABLE IF NOT EXISTS commission SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS uq_commission_id ON TABLE commission COLUMNS commission_id UNIQUE;
        DEFINE INDEX IF NOT EXISTS idx_commission_affiliate_status ON TABLE commission COLUMNS affiliate_id, status;

        DEFINE TABLE IF NOT EXISTS payout_preference SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS uq_pref_affiliate ON TABLE payout_preference COLUMNS affiliate_id UNIQUE;

        DEFINE TABLE IF NOT EXISTS payout SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS uq_payout_id ON TABLE payout COLUMNS payout_id UNIQUE;
        DEFINE INDEX IF NOT EXISTS idx_payout_affiliate ON TABLE payout COLUMNS affiliate_id;

        DEFINE TABLE IF NOT EXISTS lead SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS uq_lead_id ON TABLE lead COLUMNS lead_id UNIQUE;

        DEFINE TABLE IF NOT EXISTS audit_log SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS uq_audit_sequence ON TABLE audit_log COLUMNS sequence UNIQUE;
        "#,
    )
    .await?
    // Statement-level failures live in the response, not the await
    .check()?;
    Ok(())
}
