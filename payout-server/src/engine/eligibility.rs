//! Payout Eligibility Evaluator
//!
//! Pure query + decision step: given an affiliate's standing preferences,
//! their payee account status, and their approved commissions, decide
//! whether a payout fires today and what the batch totals are. No mutation
//! happens here; the executor owns all writes, which keeps this
//! independently testable.

use rust_decimal::Decimal;
use shared::models::commission::Commission;
use shared::models::payout::{PayoutMethod, PayoutPreference};
use shared::money::{to_decimal, to_f64};

use crate::payments::AccountStatus;

/// Why an affiliate was passed over this run
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NoStripeAccount,
    AccountNotVerified,
    NoCommissions,
    BelowThreshold,
    /// Another run is still processing this affiliate
    AlreadyInFlight,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::NoStripeAccount => "no_stripe_account",
            SkipReason::AccountNotVerified => "account_not_verified",
            SkipReason::NoCommissions => "no_commissions",
            SkipReason::BelowThreshold => "below_threshold",
            SkipReason::AlreadyInFlight => "already_in_flight",
        }
    }
}

/// Everything the executor needs to pay one affiliate
#[derive(Debug, Clone)]
pub struct EligibleBatch {
    pub affiliate_id: String,
    pub stripe_account_id: String,
    pub commissions: Vec<Commission>,
    /// Sum of the commissions' `affiliate_payout_amount`s
    pub total_amount: f64,
    pub platform_fee_total: f64,
    pub method: PayoutMethod,
}

#[derive(Debug, Clone)]
pub enum EligibilityDecision {
    Eligible(EligibleBatch),
    Skip(SkipReason),
}

/// Decide whether a payout fires for this affiliate.
///
/// `account` is the pre-fetched payee standing (None when no payee id is on
/// file). `commissions` must be the affiliate's `approved` set, selected
/// immediately before use.
pub fn evaluate(
    pref: &PayoutPreference,
    account: Option<&AccountStatus>,
    commissions: Vec<Commission>,
) -> EligibilityDecision {
    let Some(stripe_account_id) = pref.stripe_account_id.clone() else {
        return EligibilityDecision::Skip(SkipReason::NoStripeAccount);
    };

    match account {
        Some(status) if status.is_verified() => {}
        _ => return EligibilityDecision::Skip(SkipReason::AccountNotVerified),
    }

    if commissions.is_empty() {
        return EligibilityDecision::Skip(SkipReason::NoCommissions);
    }

    // Exact sums: rounded inputs, Decimal accumulation, single rounding out
    let total: Decimal = commissions
        .iter()
        .map(|c| to_decimal(c.affiliate_payout_amount))
        .sum();
    let platform_fee_total: Decimal = commissions
        .iter()
        .map(|c| to_decimal(c.platform_fee_amount))
        .sum();
    let total_amount = to_f64(total);

    if total_amount < pref.minimum_payout_threshold {
        return EligibilityDecision::Skip(SkipReason::BelowThreshold);
    }

    EligibilityDecision::Eligible(EligibleBatch {
        affiliate_id: pref.affiliate_id.clone(),
        stripe_account_id,
        commissions,
        total_amount,
        platform_fee_total: to_f64(platform_fee_total),
        method: pref.preferred_payout_method,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payments::VerificationState;
    use chrono::NaiveDate;
    use shared::models::commission::CommissionStatus;
    use shared::models::payout::PayoutFrequency;

    fn pref(threshold: f64, account: Option<&str>) -> PayoutPreference {
        PayoutPreference {
            affiliate_id: "aff_1".to_string(),
            auto_payout_enabled: true,
            preferred_payout_method: PayoutMethod::AchInstant,
            payout_frequency: PayoutFrequency::Weekly,
            minimum_payout_threshold: threshold,
            next_scheduled_payout_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            stripe_account_id: account.map(str::to_string),
            updated_at: 0,
        }
    }

    fn verified() -> AccountStatus {
        AccountStatus {
            verification: VerificationState::Verified,
            charges_enabled: true,
            payouts_enabled: true,
        }
    }

    fn commission(id: &str, amount: f64) -> Commission {
        Commission {
            commission_id: id.to_string(),
            purchase_id: None,
            partnership_id: "p_1".to_string(),
            affiliate_id: "aff_1".to_string(),
            company_id: "co_1".to_string(),
            commission_amount: amount,
            affiliate_payout_amount: amount,
            platform_fee_amount: amount * 0.2,
            status: CommissionStatus::Approved,
            payout_id: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn skips_without_payee_account() {
        let decision = evaluate(&pref(50.0, None), None, vec![commission("c1", 100.0)]);
        assert!(matches!(
            decision,
            EligibilityDecision::Skip(SkipReason::NoStripeAccount)
        ));
    }

    #[test]
    fn skips_unverified_account() {
        let pending = AccountStatus {
            verification: VerificationState::Pending,
            charges_enabled: false,
            payouts_enabled: false,
        };
        let decision = evaluate(
            &pref(50.0, Some("acct_1")),
            Some(&pending),
            vec![commission("c1", 100.0)],
        );
        assert!(matches!(
            decision,
            EligibilityDecision::Skip(SkipReason::AccountNotVerified)
        ));
    }

    #[test]
    fn skips_with_no_approved_commissions() {
        let decision = evaluate(&pref(50.0, Some("acct_1")), Some(&verified()), vec![]);
        assert!(matches!(
            decision,
            EligibilityDecision::Skip(SkipReason::NoCommissions)
        ));
    }

    #[test]
    fn skips_below_threshold() {
        // $40 approved against a $50 threshold
        let decision = evaluate(
            &pref(50.0, Some("acct_1")),
            Some(&verified()),
            vec![commission("c1", 25.0), commission("c2", 15.0)],
        );
        assert!(matches!(
            decision,
            EligibilityDecision::Skip(SkipReason::BelowThreshold)
        ));
    }

    #[test]
    fn eligible_batch_carries_exact_totals() {
        let decision = evaluate(
            &pref(50.0, Some("acct_1")),
            Some(&verified()),
            vec![commission("c1", 30.10), commission("c2", 29.90)],
        );
        let EligibilityDecision::Eligible(batch) = decision else {
            panic!("expected eligible");
        };
        assert_eq!(batch.total_amount, 60.0);
        assert_eq!(batch.platform_fee_total, 12.0);
        assert_eq!(batch.commissions.len(), 2);
        assert_eq!(batch.stripe_account_id, "acct_1");
        assert_eq!(batch.method, PayoutMethod::AchInstant);
    }

    #[test]
    fn threshold_exactly_met_is_eligible() {
        let decision = evaluate(
            &pref(50.0, Some("acct_1")),
            Some(&verified()),
            vec![commission("c1", 50.0)],
        );
        assert!(matches!(decision, EligibilityDecision::Eligible(_)));
    }
}
