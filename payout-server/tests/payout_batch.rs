//! Payout batch engine: end-to-end runs over the in-memory database with
//! the mock gateway. Covers the ledger invariants: threshold gating,
//! conservation, no double payment, failure isolation.

mod common;

use common::*;
use shared::models::commission::CommissionStatus;
use shared::models::payout::{PayoutMethod, PayoutStatus};
use shared::money::money_eq;

#[tokio::test]
async fn below_threshold_affiliate_is_skipped_not_processed() {
    let (state, gateway) = test_state().await;
    let product = seed_product(&state, product_create("co_1")).await;
    let partnership = seed_approved_partnership(&state, "aff_1", "co_1").await;
    gateway.add_verified_account("acct_1");
    seed_preference(&state, "aff_1", 50.0, Some("acct_1")).await;

    // 4 × €100 sales at 10% → $40 approved, threshold $50
    seed_approved_commissions(&state, &product, &partnership, 4, 1).await;

    let report = state.payout_engine.run(today()).await.unwrap();
    assert_eq!(report.processed, 0);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.failed, 0);

    // Commissions untouched, still approved for the next cycle
    let commissions = state
        .commissions()
        .find_approved_by_affiliate("aff_1")
        .await
        .unwrap();
    assert_eq!(commissions.len(), 4);
    assert!(state.payouts().list_by_affiliate("aff_1").await.unwrap().is_empty());
}

#[tokio::test]
async fn executes_payout_with_fee_deduction_and_exact_minor_units() {
    let (state, gateway) = test_state().await;
    let product = seed_product(&state, product_create("co_1")).await;
    let partnership = seed_approved_partnership(&state, "aff_1", "co_1").await;
    gateway.add_verified_account("acct_1");
    seed_preference(&state, "aff_1", 50.0, Some("acct_1")).await;

    // 2 × (€100 × qty 10) at 10% → $100 commission each → $200 approved
    let commission_ids = seed_approved_commissions(&state, &product, &partnership, 2, 10).await;
    assert_eq!(commission_ids.len(), 2);

    let report = state.payout_engine.run(today()).await.unwrap();
    assert_eq!(report.processed, 1);
    assert_eq!(report.skipped, 0);
    assert_eq!(report.failed, 0);

    // ach_instant: 1% of $200 → $2.00 fee, $198.00 net, 19800 minor units
    let payouts = state.payouts().list_by_affiliate("aff_1").await.unwrap();
    assert_eq!(payouts.len(), 1);
    let payout = &payouts[0];
    assert_eq!(payout.total_amount, 200.0);
    assert_eq!(payout.stripe_fee_amount, 2.0);
    assert_eq!(payout.payout_method, PayoutMethod::AchInstant);
    assert_eq!(payout.status, PayoutStatus::Processing);
    assert!(payout.stripe_transfer_id.is_some());
    assert_eq!(payout.scheduled_date, today());

    let fetched = state
        .payouts()
        .find_by_id(&payout.payout_id)
        .await
        .unwrap()
        .expect("payout retrievable by id");
    assert_eq!(fetched.total_amount, payout.total_amount);

    let transfers = gateway.transfers();
    assert_eq!(transfers.len(), 1);
    assert_eq!(transfers[0].amount_minor, 19_800);
    assert_eq!(transfers[0].destination_account, "acct_1");

    // Conservation: payout total equals the referenced commissions exactly
    let mut sum = 0.0;
    for id in &payout.commission_ids {
        let c = state.commissions().find_by_id(id).await.unwrap().unwrap();
        assert_eq!(c.status, CommissionStatus::Paid);
        assert_eq!(c.payout_id.as_deref(), Some(payout.payout_id.as_str()));
        sum += c.affiliate_payout_amount;
    }
    assert!(money_eq(sum, payout.total_amount));
    assert_eq!(payout.commission_ids.len(), 2);
}

#[tokio::test]
async fn rerun_never_double_pays() {
    let (state, gateway) = test_state().await;
    let product = seed_product(&state, product_create("co_1")).await;
    let partnership = seed_approved_partnership(&state, "aff_1", "co_1").await;
    gateway.add_verified_account("acct_1");
    seed_preference(&state, "aff_1", 50.0, Some("acct_1")).await;
    seed_approved_commissions(&state, &product, &partnership, 2, 10).await;

    let first = state.payout_engine.run(today()).await.unwrap();
    assert_eq!(first.processed, 1);

    // Force the schedule due again, as if a second scheduler instance fired
    seed_preference(&state, "aff_1", 50.0, Some("acct_1")).await;

    let second = state.payout_engine.run(today()).await.unwrap();
    assert_eq!(second.processed, 0);
    assert_eq!(second.skipped, 1); // no approved commissions left

    // Exactly one payout, one transfer, no commission in two sets
    let payouts = state.payouts().list_by_affiliate("aff_1").await.unwrap();
    assert_eq!(payouts.len(), 1);
    assert_eq!(gateway.transfers().len(), 1);

    let mut seen = std::collections::HashSet::new();
    for payout in &payouts {
        for id in &payout.commission_ids {
            assert!(seen.insert(id.clone()), "commission {id} paid twice");
        }
    }
}

#[tokio::test]
async fn one_affiliates_failure_never_touches_anothers_payout() {
    let (state, gateway) = test_state().await;
    let product = seed_product(&state, product_create("co_1")).await;
    let partnership_a = seed_approved_partnership(&state, "aff_a", "co_1").await;
    let partnership_b = seed_approved_partnership(&state, "aff_b", "co_1").await;

    gateway.add_verified_account("acct_a");
    gateway.add_verified_account("acct_b");
    gateway.fail_transfers_to("acct_a", "insufficient platform balance");

    seed_preference(&state, "aff_a", 50.0, Some("acct_a")).await;
    seed_preference(&state, "aff_b", 50.0, Some("acct_b")).await;

    seed_approved_commissions(&state, &product, &partnership_a, 2, 10).await;
    seed_approved_commissions(&state, &product, &partnership_b, 2, 10).await;

    let report = state.payout_engine.run(today()).await.unwrap();
    assert_eq!(report.processed, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains("aff_a"));

    // B's payout exists
    let payouts_b = state.payouts().list_by_affiliate("aff_b").await.unwrap();
    assert_eq!(payouts_b.len(), 1);

    // A's commissions remain approved for retry, no payout row
    assert!(state.payouts().list_by_affiliate("aff_a").await.unwrap().is_empty());
    let approved_a = state
        .commissions()
        .find_approved_by_affiliate("aff_a")
        .await
        .unwrap();
    assert_eq!(approved_a.len(), 2);
}

#[tokio::test]
async fn skip_reasons_cover_missing_and_unverified_accounts() {
    let (state, gateway) = test_state().await;
    let product = seed_product(&state, product_create("co_1")).await;

    // aff_none: no payee account on file
    let p_none = seed_approved_partnership(&state, "aff_none", "co_1").await;
    seed_preference(&state, "aff_none", 10.0, None).await;
    seed_approved_commissions(&state, &product, &p_none, 1, 10).await;

    // aff_pend: account exists but onboarding incomplete
    let p_pend = seed_approved_partnership(&state, "aff_pend", "co_1").await;
    gateway.add_pending_account("acct_pend");
    seed_preference(&state, "aff_pend", 10.0, Some("acct_pend")).await;
    seed_approved_commissions(&state, &product, &p_pend, 1, 10).await;

    // aff_empty: verified but nothing approved
    seed_approved_partnership(&state, "aff_empty", "co_1").await;
    gateway.add_verified_account("acct_empty");
    seed_preference(&state, "aff_empty", 10.0, Some("acct_empty")).await;

    let report = state.payout_engine.run(today()).await.unwrap();
    assert_eq!(report.processed, 0);
    assert_eq!(report.skipped, 3);
    assert_eq!(report.failed, 0);
    assert!(gateway.transfers().is_empty());
}

#[tokio::test]
async fn out_of_range_transfer_fails_before_any_money_moves() {
    let (state, gateway) = test_state().await;
    let product = seed_product(&state, product_create("co_1")).await;
    let partnership = seed_approved_partnership(&state, "aff_1", "co_1").await;
    gateway.add_verified_account("acct_1");
    // debit_instant caps at $5,000
    seed_preference_with_method(
        &state,
        "aff_1",
        50.0,
        Some("acct_1"),
        PayoutMethod::DebitInstant,
    )
    .await;

    // 6 × (€100 × qty 99) at 10% → $5,940 approved; net after 1% fee is
    // $5,880.60, over the $5,000 debit_instant cap
    seed_approved_commissions(&state, &product, &partnership, 6, 99).await;

    let report = state.payout_engine.run(today()).await.unwrap();
    assert_eq!(report.processed, 0);
    assert_eq!(report.failed, 1);
    assert!(report.errors[0].contains("out of range"));

    // Nothing hit the rail, commissions stay approved
    assert!(gateway.transfers().is_empty());
    let approved = state
        .commissions()
        .find_approved_by_affiliate("aff_1")
        .await
        .unwrap();
    assert_eq!(approved.len(), 6);
}

#[tokio::test]
async fn standard_ach_carries_no_processor_fee() {
    let (state, gateway) = test_state().await;
    let product = seed_product(&state, product_create("co_1")).await;
    let partnership = seed_approved_partnership(&state, "aff_1", "co_1").await;
    gateway.add_verified_account("acct_1");
    seed_preference_with_method(
        &state,
        "aff_1",
        50.0,
        Some("acct_1"),
        PayoutMethod::AchStandard,
    )
    .await;
    seed_approved_commissions(&state, &product, &partnership, 2, 10).await;

    let report = state.payout_engine.run(today()).await.unwrap();
    assert_eq!(report.processed, 1);

    let payout = &state.payouts().list_by_affiliate("aff_1").await.unwrap()[0];
    assert_eq!(payout.stripe_fee_amount, 0.0);
    // Full $200 transferred
    assert_eq!(gateway.transfers()[0].amount_minor, 20_000);
}

#[tokio::test]
async fn successful_run_advances_the_schedule() {
    let (state, gateway) = test_state().await;
    let product = seed_product(&state, product_create("co_1")).await;
    let partnership = seed_approved_partnership(&state, "aff_1", "co_1").await;
    gateway.add_verified_account("acct_1");
    seed_preference(&state, "aff_1", 50.0, Some("acct_1")).await;
    seed_approved_commissions(&state, &product, &partnership, 2, 10).await;

    state.payout_engine.run(today()).await.unwrap();

    let pref = state
        .payout_preferences()
        .find_by_affiliate("aff_1")
        .await
        .unwrap()
        .unwrap();
    // Weekly frequency
    assert_eq!(pref.next_scheduled_payout_date, today() + chrono::Duration::days(7));

    // Immediately re-running finds no due candidates
    let report = state.payout_engine.run(today()).await.unwrap();
    assert_eq!(report.processed + report.skipped + report.failed, 0);
}

#[tokio::test]
async fn batch_run_leaves_an_intact_audit_chain() {
    let (state, gateway) = test_state().await;
    let product = seed_product(&state, product_create("co_1")).await;
    let partnership = seed_approved_partnership(&state, "aff_1", "co_1").await;
    gateway.add_verified_account("acct_1");
    seed_preference(&state, "aff_1", 50.0, Some("acct_1")).await;
    seed_approved_commissions(&state, &product, &partnership, 2, 10).await;

    state.payout_engine.run(today()).await.unwrap();

    let verification = state.audit.verify_chain(None, None).await.unwrap();
    assert!(verification.chain_intact);
    // Purchases, approvals, payout, paid flip, batch summary all left marks
    assert!(verification.total_entries >= 5);
}
