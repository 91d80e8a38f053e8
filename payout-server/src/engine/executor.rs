//! Payout Batch Executor
//!
//! One invocation per scheduled run: scans due payout preferences, evaluates
//! eligibility per affiliate, and executes transfers. Each affiliate runs in
//! its own error boundary: one failure never cancels or rolls back another
//! affiliate's payout. Ordering inside one batch is strict: transfer
//! confirms, then the payout row is persisted, then commissions flip to
//! `paid`.

use std::sync::Arc;

use chrono::NaiveDate;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use shared::models::payout::{Payout, PayoutStatus};
use shared::money::to_minor_units;
use shared::util;

use super::eligibility::{EligibilityDecision, EligibleBatch, SkipReason, evaluate};
use super::fees::{fee_and_net, validate_transfer_amount};
use super::{EngineError, EngineResult};
use crate::audit::{AuditAction, AuditStorage};
use crate::db::repository::{
    CommissionRepository, PayoutPreferenceRepository, PayoutRepository,
};
use crate::payments::{AccountStatus, PaymentGateway, TransferRequest};

/// Caller-visible batch report (the scheduled job's HTTP contract)
#[derive(Debug, Default, Clone, serde::Serialize)]
pub struct BatchReport {
    pub processed: u32,
    pub skipped: u32,
    pub failed: u32,
    pub errors: Vec<String>,
}

enum AffiliateOutcome {
    Processed(Payout),
    Skipped(SkipReason),
    Failed(String),
}

/// Per-affiliate advisory lock for overlapping batch runs.
///
/// Held for the duration of one affiliate's processing; the CAS paid-flip is
/// the database-level backstop behind it.
struct InFlightGuard {
    map: Arc<DashMap<String, ()>>,
    key: String,
}

impl InFlightGuard {
    fn try_acquire(map: &Arc<DashMap<String, ()>>, key: &str) -> Option<Self> {
        match map.entry(key.to_string()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(v) => {
                v.insert(());
                Some(Self {
                    map: Arc::clone(map),
                    key: key.to_string(),
                })
            }
        }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.map.remove(&self.key);
    }
}

#[derive(Clone)]
pub struct PayoutEngine {
    prefs: PayoutPreferenceRepository,
    commissions: CommissionRepository,
    payouts: PayoutRepository,
    gateway: Arc<dyn PaymentGateway>,
    audit: AuditStorage,
    in_flight: Arc<DashMap<String, ()>>,
    /// Transfer currency (all ledger amounts share one platform currency)
    currency: String,
}

impl PayoutEngine {
    pub fn new(
        prefs: PayoutPreferenceRepository,
        commissions: CommissionRepository,
        payouts: PayoutRepository,
        gateway: Arc<dyn PaymentGateway>,
        audit: AuditStorage,
        currency: String,
    ) -> Self {
        Self {
            prefs,
            commissions,
            payouts,
            gateway,
            audit,
            in_flight: Arc::new(DashMap::new()),
            currency,
        }
    }

    /// Run one batch over all due affiliates.
    ///
    /// Returns `Err` only for the fatal class (the due-list query failing);
    /// nothing proceeds without a confirmed candidate list. Everything per
    /// affiliate is aggregated into the report instead.
    pub async fn run(&self, today: NaiveDate) -> EngineResult<BatchReport> {
        let due = self.prefs.find_due(today).await?;
        tracing::info!(candidates = due.len(), date = %today, "Payout batch run started");

        let mut report = BatchReport::default();

        for pref in due {
            let affiliate_id = pref.affiliate_id.clone();
            match self.process_affiliate(&pref, today).await {
                AffiliateOutcome::Processed(payout) => {
                    report.processed += 1;
                    tracing::info!(
                        affiliate_id = %affiliate_id,
                        payout_id = %payout.payout_id,
                        total_amount = payout.total_amount,
                        "Payout executed"
                    );
                    // Follow-up, log-only: advance the schedule so the next
                    // run does not re-visit this affiliate tomorrow
                    if let Err(e) = self
                        .prefs
                        .advance_schedule(&affiliate_id, pref.payout_frequency, today)
                        .await
                    {
                        tracing::error!(
                            error = %e,
                            affiliate_id = %affiliate_id,
                            "Failed to advance payout schedule after successful payout"
                        );
                    }
                }
                AffiliateOutcome::Skipped(reason) => {
                    report.skipped += 1;
                    tracing::info!(
                        affiliate_id = %affiliate_id,
                        reason = reason.as_str(),
                        "Affiliate skipped"
                    );
                }
                AffiliateOutcome::Failed(message) => {
                    report.failed += 1;
                    report
                        .errors
                        .push(format!("{affiliate_id}: {message}"));
                    tracing::warn!(
                        affiliate_id = %affiliate_id,
                        error = %message,
                        "Affiliate payout failed; commissions remain approved for retry"
                    );
                }
            }
        }

        if let Err(e) = self
            .audit
            .append(
                AuditAction::BatchRunCompleted,
                "payout_batch",
                today.format("%Y-%m-%d").to_string(),
                serde_json::json!({
                    "processed": report.processed,
                    "skipped": report.skipped,
                    "failed": report.failed,
                }),
            )
            .await
        {
            tracing::error!(error = %e, "Failed to write batch-run audit entry");
        }

        tracing::info!(
            processed = report.processed,
            skipped = report.skipped,
            failed = report.failed,
            "Payout batch run finished"
        );
        Ok(report)
    }

    /// One affiliate, one error boundary.
    async fn process_affiliate(
        &self,
        pref: &shared::models::payout::PayoutPreference,
        today: NaiveDate,
    ) -> AffiliateOutcome {
        let Some(_guard) = InFlightGuard::try_acquire(&self.in_flight, &pref.affiliate_id) else {
            return AffiliateOutcome::Skipped(SkipReason::AlreadyInFlight);
        };

        // Payee standing, fetched up front so `evaluate` stays pure
        let account: Option<AccountStatus> = match &pref.stripe_account_id {
            None => None,
            Some(account_id) => match self.gateway.account_status(account_id).await {
                Ok(status) => Some(status),
                Err(e) => {
                    return AffiliateOutcome::Failed(format!("account status lookup: {e}"));
                }
            },
        };

        // Approved set selected immediately before use: a concurrent run
        // that already paid them cannot hand us stale rows
        let commissions = match self
            .commissions
            .find_approved_by_affiliate(&pref.affiliate_id)
            .await
        {
            Ok(rows) => rows,
            Err(e) => return AffiliateOutcome::Failed(format!("commission query: {e}")),
        };

        let batch = match evaluate(pref, account.as_ref(), commissions) {
            EligibilityDecision::Skip(reason) => return AffiliateOutcome::Skipped(reason),
            EligibilityDecision::Eligible(batch) => batch,
        };

        match self.execute_batch(&batch, today).await {
            Ok(payout) => AffiliateOutcome::Processed(payout),
            Err(e) => {
                if let Err(audit_err) = self
                    .audit
                    .append(
                        AuditAction::PayoutFailed,
                        "payout",
                        batch.affiliate_id.clone(),
                        serde_json::json!({
                            "total_amount": batch.total_amount,
                            "commission_count": batch.commissions.len(),
                            "error": e.to_string(),
                        }),
                    )
                    .await
                {
                    tracing::error!(error = %audit_err, "Failed to write payout-failure audit entry");
                }
                AffiliateOutcome::Failed(e.to_string())
            }
        }
    }

    /// Transfer → payout row → audit → paid flip, in that order.
    async fn execute_batch(&self, batch: &EligibleBatch, today: NaiveDate) -> EngineResult<Payout> {
        let (stripe_fee, net_amount) = fee_and_net(batch.total_amount, batch.method);
        // Bounds checked before any money moves
        validate_transfer_amount(net_amount, batch.method)?;

        let commission_ids: Vec<String> = batch
            .commissions
            .iter()
            .map(|c| c.commission_id.clone())
            .collect();

        // The gateway owns the wire timeout; a timeout surfaces as a
        // PaymentError and lands in the failed bucket, never in processed
        let receipt = self
            .gateway
            .create_transfer(TransferRequest {
                destination_account: batch.stripe_account_id.clone(),
                amount_minor: to_minor_units(net_amount),
                currency: self.currency.clone(),
                description: format!(
                    "Affiliate payout ({} commissions)",
                    batch.commissions.len()
                ),
                metadata: std::collections::HashMap::from([
                    ("affiliate_id".to_string(), batch.affiliate_id.clone()),
                    (
                        "commission_count".to_string(),
                        batch.commissions.len().to_string(),
                    ),
                ]),
            })
            .await?;

        let payout = Payout {
            payout_id: util::new_id(),
            affiliate_id: batch.affiliate_id.clone(),
            total_amount: batch.total_amount,
            platform_fee_total: batch.platform_fee_total,
            commission_ids: commission_ids.clone(),
            status: PayoutStatus::Processing,
            stripe_transfer_id: Some(receipt.transfer_id.clone()),
            payout_method: batch.method,
            stripe_fee_amount: stripe_fee,
            scheduled_date: today,
            created_at: util::now_millis(),
        };

        let payout = match self.payouts.create(payout).await {
            Ok(p) => p,
            Err(e) => {
                // Money moved but the record did not land. Surface loudly
                // with the transfer id so operators can reconcile by hand.
                tracing::error!(
                    affiliate_id = %batch.affiliate_id,
                    transfer_id = %receipt.transfer_id,
                    error = %e,
                    "Transfer succeeded but payout persistence failed, manual reconciliation required"
                );
                return Err(EngineError::Database(e));
            }
        };

        crate::audit_log!(
            "payout_executed",
            payout.payout_id.as_str(),
            affiliate_id = payout.affiliate_id.as_str(),
            transfer_id = receipt.transfer_id.as_str(),
            net_amount = net_amount
        );
        if let Err(e) = self
            .audit
            .append(
                AuditAction::PayoutExecuted,
                "payout",
                payout.payout_id.clone(),
                serde_json::json!({
                    "affiliate_id": payout.affiliate_id,
                    "transfer_id": receipt.transfer_id,
                    "total_amount": payout.total_amount,
                    "stripe_fee_amount": payout.stripe_fee_amount,
                    "net_amount": net_amount,
                    "commission_count": commission_ids.len(),
                }),
            )
            .await
        {
            tracing::error!(error = %e, payout_id = %payout.payout_id, "Failed to write payout audit entry");
        }

        // Final step: the CAS flip that finalizes the payout. Fewer rows
        // than expected means another run raced us. Reconciliation, not
        // rollback: the transfer already happened.
        match self.commissions.mark_paid(&commission_ids, &payout.payout_id).await {
            Ok(flipped) if flipped == commission_ids.len() => {
                if let Err(e) = self
                    .audit
                    .append(
                        AuditAction::CommissionsMarkedPaid,
                        "payout",
                        payout.payout_id.clone(),
                        serde_json::json!({
                            "commission_ids": commission_ids,
                            "count": flipped,
                        }),
                    )
                    .await
                {
                    tracing::error!(error = %e, "Failed to write paid-flip audit entry");
                }
            }
            Ok(flipped) => {
                tracing::error!(
                    payout_id = %payout.payout_id,
                    expected = commission_ids.len(),
                    flipped,
                    "Paid-flip count mismatch, concurrent run suspected, manual reconciliation required"
                );
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    payout_id = %payout.payout_id,
                    "Failed to mark commissions paid after payout creation"
                );
            }
        }

        Ok(payout)
    }
}
