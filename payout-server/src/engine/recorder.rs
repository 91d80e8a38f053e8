//! Purchase/Lead Recording
//!
//! Records a completed sale as an immutable ledger entry (purchase + derived
//! commission fields) plus a conversion lead, and decrements tracked
//! inventory. Two entry points: the in-app checkout path and the
//! external-purchase webhook path.

use rust_decimal::Decimal;
use shared::models::commission::{Commission, CommissionStatus};
use shared::models::lead::{Lead, LeadSource, LeadType};
use shared::models::partnership::{Partnership, PartnershipStatus};
use shared::models::product::{DiscountType, Product};
use shared::models::purchase::{PaymentMethod, Purchase, PurchaseStatus};
use shared::money::{to_decimal, to_f64};
use shared::util;

use super::commission::{CommissionConfig, calculate_commission};
use super::discount::{DiscountConfig, recover_original_amount, resolve_discount};
use super::{EngineError, EngineResult, require_finite};
use crate::audit::{AuditAction, AuditStorage};
use crate::db::repository::{
    LeadRepository, PartnershipRepository, ProductRepository, PurchaseRepository,
};

/// In-app checkout payload
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CheckoutRequest {
    pub product_id: String,
    pub partnership_id: String,
    pub customer_email: String,
    pub quantity: i64,
}

/// External-purchase webhook payload
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ExternalPurchaseEvent {
    pub affiliate_code: String,
    pub product_id: String,
    pub customer_email: String,
    /// Post-discount amount the customer paid, as reported externally
    pub purchase_amount: f64,
    pub quantity: Option<i64>,
    pub external_purchase_id: Option<String>,
    /// Unix millis; defaults to now
    pub purchased_at: Option<i64>,
}

/// What both recording paths hand back to the caller
#[derive(Debug, Clone, serde::Serialize)]
pub struct RecordedPurchase {
    pub purchase_id: String,
    pub purchase_amount: f64,
    pub commission_amount: f64,
    pub platform_fee: f64,
    pub discount_applied: bool,
    pub discount_amount: f64,
}

impl From<&Purchase> for RecordedPurchase {
    fn from(p: &Purchase) -> Self {
        Self {
            purchase_id: p.purchase_id.clone(),
            purchase_amount: p.purchase_amount,
            commission_amount: p.commission_amount,
            platform_fee: p.platform_fee,
            discount_applied: p.discount_applied,
            discount_amount: p.discount_amount,
        }
    }
}

/// The recording service. All collaborators injected.
#[derive(Clone)]
pub struct PurchaseRecorder {
    products: ProductRepository,
    partnerships: PartnershipRepository,
    purchases: PurchaseRepository,
    leads: LeadRepository,
    audit: AuditStorage,
    platform_fee_rate: f64,
}

impl PurchaseRecorder {
    pub fn new(
        products: ProductRepository,
        partnerships: PartnershipRepository,
        purchases: PurchaseRepository,
        leads: LeadRepository,
        audit: AuditStorage,
        platform_fee_rate: f64,
    ) -> Self {
        Self {
            products,
            partnerships,
            purchases,
            leads,
            audit,
            platform_fee_rate,
        }
    }

    /// In-app checkout: validate, compute, persist one ledger row.
    pub async fn record_purchase(&self, req: CheckoutRequest) -> EngineResult<RecordedPurchase> {
        if req.customer_email.trim().is_empty() {
            return Err(EngineError::MissingRequiredField("customer_email"));
        }

        let product = self
            .products
            .find_by_id(&req.product_id)
            .await?
            .ok_or_else(|| EngineError::ProductNotFound(req.product_id.clone()))?;

        let partnership = self
            .partnerships
            .find_by_id(&req.partnership_id)
            .await?
            .ok_or_else(|| EngineError::PartnershipNotFound(req.partnership_id.clone()))?;
        if partnership.status != PartnershipStatus::Approved {
            return Err(EngineError::PartnershipNotApproved(
                partnership.partnership_id.clone(),
            ));
        }

        // External-checkout products never take this path: the sale settles
        // on the external system and comes back through the webhook
        if let Some(url) = &product.external_checkout_url {
            return Err(EngineError::ExternalCheckout(url.clone()));
        }

        if product.inventory_tracking && req.quantity > product.inventory_quantity {
            return Err(EngineError::InsufficientInventory {
                product_id: product.product_id.clone(),
                requested: req.quantity,
                available: product.inventory_quantity,
            });
        }

        // Subtotal → discount → what the customer pays
        let subtotal = to_decimal(product.price) * Decimal::from(req.quantity.max(0));
        let discount = resolve_discount(
            &DiscountConfig::from(&product),
            to_f64(subtotal),
            req.quantity,
        );
        let purchase_amount = to_f64(subtotal - to_decimal(discount.discount_amount));

        let breakdown = calculate_commission(
            purchase_amount,
            req.quantity,
            &CommissionConfig::from(&product),
            Some(self.platform_fee_rate),
        )?;

        let now = util::now_millis();
        let purchase = Purchase {
            purchase_id: util::new_id(),
            product_id: product.product_id.clone(),
            partnership_id: partnership.partnership_id.clone(),
            affiliate_id: partnership.affiliate_id.clone(),
            company_id: partnership.company_id.clone(),
            customer_email: req.customer_email.clone(),
            purchase_amount,
            commission_amount: breakdown.commission_amount,
            platform_fee: breakdown.platform_fee,
            quantity: req.quantity,
            discount_applied: discount.discount_applied,
            discount_amount: discount.discount_amount,
            status: PurchaseStatus::Completed,
            payment_method: PaymentMethod::Platform,
            external_purchase_id: None,
            purchased_at: now,
            created_at: now,
        };

        let source = LeadSource::Checkout {
            purchase_id: purchase.purchase_id.clone(),
        };
        self.persist(
            &product,
            &partnership,
            purchase,
            breakdown.commission_amount,
            breakdown.platform_fee,
            source,
            AuditAction::PurchaseRecorded,
        )
        .await
    }

    /// Webhook path: partnership resolved by referral code, amounts as
    /// reported by the external system, idempotent on the external id.
    pub async fn record_external_purchase(
        &self,
        event: ExternalPurchaseEvent,
    ) -> EngineResult<RecordedPurchase> {
        if event.affiliate_code.trim().is_empty() {
            return Err(EngineError::MissingRequiredField("affiliate_code"));
        }
        if event.product_id.trim().is_empty() {
            return Err(EngineError::MissingRequiredField("product_id"));
        }
        if event.customer_email.trim().is_empty() {
            return Err(EngineError::MissingRequiredField("customer_email"));
        }
        require_finite(event.purchase_amount, "purchase_amount")?;
        if event.purchase_amount <= 0.0 {
            return Err(EngineError::InvalidAmount(format!(
                "purchase_amount must be positive, got {}",
                event.purchase_amount
            )));
        }
        let quantity = event.quantity.unwrap_or(1);

        // 幂等：同一 external_purchase_id 重复投递返回已有账本行
        if let Some(eid) = &event.external_purchase_id
            && let Some(existing) = self.purchases.find_by_external_id(eid).await?
        {
            tracing::debug!(external_purchase_id = %eid, "External purchase already recorded, skipping");
            return Ok(RecordedPurchase::from(&existing));
        }

        let product = self
            .products
            .find_by_id(&event.product_id)
            .await?
            .ok_or_else(|| EngineError::ProductNotFound(event.product_id.clone()))?;

        let partnership = self
            .partnerships
            .find_by_code_and_company(&event.affiliate_code, &product.company_id)
            .await?
            .ok_or_else(|| EngineError::PartnershipNotFound(event.affiliate_code.clone()))?;
        if partnership.status != PartnershipStatus::Approved {
            return Err(EngineError::PartnershipNotApproved(
                partnership.partnership_id.clone(),
            ));
        }

        // The reported amount is already net of discount; reconstruct the
        // discount for the ledger from the product's config
        let (discount_applied, discount_amount) = if product.affiliate_discount_enabled {
            match (product.affiliate_discount_type, product.affiliate_discount_value) {
                (Some(DiscountType::Percentage), Some(rate)) => {
                    let (_original, discount) =
                        recover_original_amount(event.purchase_amount, rate)?;
                    (true, discount)
                }
                (Some(DiscountType::Flat), Some(value)) => {
                    let discount = to_f64(to_decimal(value) * Decimal::from(quantity));
                    (true, discount)
                }
                _ => (false, 0.0),
            }
        } else {
            (false, 0.0)
        };

        let breakdown = calculate_commission(
            event.purchase_amount,
            quantity,
            &CommissionConfig::from(&product),
            Some(self.platform_fee_rate),
        )?;

        let now = util::now_millis();
        let purchase = Purchase {
            purchase_id: util::new_id(),
            product_id: product.product_id.clone(),
            partnership_id: partnership.partnership_id.clone(),
            affiliate_id: partnership.affiliate_id.clone(),
            company_id: partnership.company_id.clone(),
            customer_email: event.customer_email.clone(),
            purchase_amount: event.purchase_amount,
            commission_amount: breakdown.commission_amount,
            platform_fee: breakdown.platform_fee,
            quantity,
            discount_applied,
            discount_amount,
            status: PurchaseStatus::Completed,
            payment_method: PaymentMethod::External,
            external_purchase_id: event.external_purchase_id.clone(),
            purchased_at: event.purchased_at.unwrap_or(now),
            created_at: now,
        };

        let source = LeadSource::Webhook {
            external_purchase_id: event.external_purchase_id.clone(),
        };
        self.persist(
            &product,
            &partnership,
            purchase,
            breakdown.commission_amount,
            breakdown.platform_fee,
            source,
            AuditAction::ExternalPurchaseRecorded,
        )
        .await
    }

    /// Shared tail of both paths: transactional purchase+commission insert,
    /// then the idempotent follow-up effects (lead, inventory, audit).
    /// A purchase that succeeded is never rolled back by a follow-up failure.
    #[allow(clippy::too_many_arguments)]
    async fn persist(
        &self,
        product: &Product,
        partnership: &Partnership,
        purchase: Purchase,
        commission_amount: f64,
        platform_fee: f64,
        lead_source: LeadSource,
        audit_action: AuditAction,
    ) -> EngineResult<RecordedPurchase> {
        let now = util::now_millis();
        let commission = Commission {
            commission_id: util::new_id(),
            purchase_id: Some(purchase.purchase_id.clone()),
            partnership_id: partnership.partnership_id.clone(),
            affiliate_id: partnership.affiliate_id.clone(),
            company_id: partnership.company_id.clone(),
            commission_amount,
            // The affiliate's gross share equals the commission; the platform
            // fee is deducted at aggregate-payout time, not per sale
            affiliate_payout_amount: commission_amount,
            platform_fee_amount: platform_fee,
            status: CommissionStatus::Pending,
            payout_id: None,
            created_at: now,
            updated_at: now,
        };

        let (purchase, commission) = self
            .purchases
            .create_with_commission(purchase, commission)
            .await?;

        tracing::info!(
            purchase_id = %purchase.purchase_id,
            affiliate_id = %purchase.affiliate_id,
            purchase_amount = purchase.purchase_amount,
            commission_amount = purchase.commission_amount,
            "Purchase recorded"
        );

        if let Err(e) = self
            .audit
            .append(
                audit_action,
                "purchase",
                purchase.purchase_id.clone(),
                serde_json::json!({
                    "purchase_amount": purchase.purchase_amount,
                    "commission_amount": purchase.commission_amount,
                    "platform_fee": purchase.platform_fee,
                    "discount_amount": purchase.discount_amount,
                    "commission_id": commission.commission_id,
                    "quantity": purchase.quantity,
                }),
            )
            .await
        {
            tracing::error!(error = %e, purchase_id = %purchase.purchase_id, "Failed to write audit entry for purchase");
        }

        // Follow-up: conversion lead. Retriable, never fatal to the purchase.
        let lead = Lead {
            lead_id: util::new_id(),
            partnership_id: partnership.partnership_id.clone(),
            affiliate_id: partnership.affiliate_id.clone(),
            company_id: partnership.company_id.clone(),
            product_id: Some(product.product_id.clone()),
            purchase_id: Some(purchase.purchase_id.clone()),
            lead_type: LeadType::Conversion,
            customer_email: Some(purchase.customer_email.clone()),
            lead_source,
            created_at: now,
        };
        if let Err(e) = self.leads.create(lead).await {
            tracing::error!(error = %e, purchase_id = %purchase.purchase_id, "Failed to record conversion lead");
        }

        // Follow-up: inventory decrement. The purchase is the source of
        // truth; a shortfall here is corrected out-of-band.
        if product.inventory_tracking {
            match self
                .products
                .decrement_inventory(&product.product_id, purchase.quantity)
                .await
            {
                Ok(true) => {}
                Ok(false) => {
                    tracing::warn!(
                        product_id = %product.product_id,
                        quantity = purchase.quantity,
                        "Inventory decrement skipped, insufficient stock at decrement time"
                    );
                }
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        product_id = %product.product_id,
                        "Inventory decrement failed after purchase was recorded"
                    );
                }
            }
        }

        Ok(RecordedPurchase::from(&purchase))
    }
}
