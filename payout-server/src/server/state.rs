use std::path::PathBuf;
use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::audit::AuditStorage;
use crate::db::DbService;
use crate::db::repository::{
    CommissionRepository, LeadRepository, PartnershipRepository, PayoutPreferenceRepository,
    PayoutRepository, ProductRepository, PurchaseRepository,
};
use crate::engine::{PayoutEngine, PurchaseRecorder};
use crate::payments::{PaymentGateway, StripeGateway};
use crate::server::Config;

/// Everything handlers and background tasks share.
///
/// The payment gateway is a trait object injected here: production wires
/// the Stripe client, tests wire a mock. Core components never reach for a
/// global.
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: Surreal<Db>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub audit: AuditStorage,
    pub recorder: PurchaseRecorder,
    pub payout_engine: PayoutEngine,
}

impl ServerState {
    /// Production wiring: on-disk database + Stripe gateway
    pub async fn initialize(config: &Config) -> Self {
        let db_path = PathBuf::from(&config.work_dir).join("referra.db");
        let db_service = DbService::new(&db_path.to_string_lossy())
            .await
            .expect("Failed to initialize database");

        let gateway: Arc<dyn PaymentGateway> = Arc::new(StripeGateway::new(
            config.stripe_secret_key.clone(),
            config.transfer_timeout_ms,
        ));

        Self::with_parts(config.clone(), db_service.db, gateway)
    }

    /// Shared wiring, usable with any database handle and gateway (tests
    /// pass a Mem database and a mock gateway)
    pub fn with_parts(
        config: Config,
        db: Surreal<Db>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        let audit = AuditStorage::new(db.clone());

        let recorder = PurchaseRecorder::new(
            ProductRepository::new(db.clone()),
            PartnershipRepository::new(db.clone()),
            PurchaseRepository::new(db.clone()),
            LeadRepository::new(db.clone()),
            audit.clone(),
            config.platform_fee_rate,
        );

        let payout_engine = PayoutEngine::new(
            PayoutPreferenceRepository::new(db.clone()),
            CommissionRepository::new(db.clone()),
            PayoutRepository::new(db.clone()),
            Arc::clone(&gateway),
            audit.clone(),
            config.payout_currency.clone(),
        );

        Self {
            config,
            db,
            gateway,
            audit,
            recorder,
            payout_engine,
        }
    }

    pub fn work_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.work_dir)
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.db.clone())
    }

    pub fn partnerships(&self) -> PartnershipRepository {
        PartnershipRepository::new(self.db.clone())
    }

    pub fn commissions(&self) -> CommissionRepository {
        CommissionRepository::new(self.db.clone())
    }

    pub fn payout_preferences(&self) -> PayoutPreferenceRepository {
        PayoutPreferenceRepository::new(self.db.clone())
    }

    pub fn payouts(&self) -> PayoutRepository {
        PayoutRepository::new(self.db.clone())
    }
}
