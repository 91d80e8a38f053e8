//! Shared test fixtures: in-memory database, mock payment gateway, seeded
//! catalog rows.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use payout_server::db::DbService;
use payout_server::payments::{MockGateway, PaymentGateway};
use payout_server::server::{Config, ServerState};
use shared::models::partnership::{Partnership, PartnershipCreate, PartnershipStatus};
use shared::models::payout::{PayoutFrequency, PayoutMethod, PayoutPreference};
use shared::models::product::{CommissionType, DiscountType, Product, ProductCreate};
use shared::util;

pub fn test_config() -> Config {
    Config {
        work_dir: "/tmp/referra-test".to_string(),
        http_port: 0,
        environment: "test".to_string(),
        log_level: "warn".to_string(),
        cron_secret: "test-cron-secret".to_string(),
        stripe_secret_key: "sk_test_unused".to_string(),
        platform_fee_rate: 20.0,
        payout_currency: "usd".to_string(),
        transfer_timeout_ms: 1_000,
        payout_run_hour: 6,
    }
}

pub async fn test_state() -> (ServerState, Arc<MockGateway>) {
    let db = DbService::new_mem().await.expect("mem db");
    let gateway = Arc::new(MockGateway::new());
    let state = ServerState::with_parts(
        test_config(),
        db.db,
        Arc::clone(&gateway) as Arc<dyn PaymentGateway>,
    );
    (state, gateway)
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// A plain product: €100, 10% commission, no discount, no inventory tracking
pub fn product_create(company_id: &str) -> ProductCreate {
    ProductCreate {
        company_id: company_id.to_string(),
        name: "Widget".to_string(),
        price: 100.0,
        currency: "usd".to_string(),
        commission_rate: 10.0,
        commission_type: CommissionType::Percentage,
        affiliate_discount_enabled: false,
        affiliate_discount_type: None,
        affiliate_discount_value: None,
        inventory_tracking: false,
        inventory_quantity: 0,
        external_checkout_url: None,
    }
}

pub fn discounted_product_create(company_id: &str) -> ProductCreate {
    ProductCreate {
        affiliate_discount_enabled: true,
        affiliate_discount_type: Some(DiscountType::Percentage),
        affiliate_discount_value: Some(10.0),
        price: 50.0,
        ..product_create(company_id)
    }
}

pub async fn seed_product(state: &ServerState, create: ProductCreate) -> Product {
    state.products().create(create).await.expect("seed product")
}

pub async fn seed_approved_partnership(
    state: &ServerState,
    affiliate_id: &str,
    company_id: &str,
) -> Partnership {
    state
        .partnerships()
        .create(PartnershipCreate {
            affiliate_id: affiliate_id.to_string(),
            company_id: company_id.to_string(),
            product_id: None,
            affiliate_code: format!("code-{affiliate_id}-{}", util::new_id()),
            status: PartnershipStatus::Approved,
        })
        .await
        .expect("seed partnership")
}

/// Preference due today on ach_instant with the given threshold and payee
pub async fn seed_preference(
    state: &ServerState,
    affiliate_id: &str,
    threshold: f64,
    account: Option<&str>,
) -> PayoutPreference {
    seed_preference_with_method(state, affiliate_id, threshold, account, PayoutMethod::AchInstant)
        .await
}

pub async fn seed_preference_with_method(
    state: &ServerState,
    affiliate_id: &str,
    threshold: f64,
    account: Option<&str>,
    method: PayoutMethod,
) -> PayoutPreference {
    state
        .payout_preferences()
        .upsert(PayoutPreference {
            affiliate_id: affiliate_id.to_string(),
            auto_payout_enabled: true,
            preferred_payout_method: method,
            payout_frequency: PayoutFrequency::Weekly,
            minimum_payout_threshold: threshold,
            next_scheduled_payout_date: today(),
            stripe_account_id: account.map(str::to_string),
            updated_at: 0,
        })
        .await
        .expect("seed preference")
}

/// Record `count` checkout purchases and approve the resulting commissions.
/// Returns the approved commission ids.
pub async fn seed_approved_commissions(
    state: &ServerState,
    product: &Product,
    partnership: &Partnership,
    count: usize,
    quantity: i64,
) -> Vec<String> {
    for _ in 0..count {
        state
            .recorder
            .record_purchase(payout_server::engine::CheckoutRequest {
                product_id: product.product_id.clone(),
                partnership_id: partnership.partnership_id.clone(),
                customer_email: "customer@example.com".to_string(),
                quantity,
            })
            .await
            .expect("record purchase");
    }

    let pending = state
        .commissions()
        .list_by_affiliate(&partnership.affiliate_id)
        .await
        .expect("list commissions");

    let mut ids = Vec::new();
    for c in pending {
        if c.status == shared::models::commission::CommissionStatus::Pending {
            state
                .commissions()
                .approve(&c.commission_id)
                .await
                .expect("approve commission");
            ids.push(c.commission_id);
        }
    }
    ids
}
