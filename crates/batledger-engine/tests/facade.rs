// SPDX-FileCopyrightText: 2026 Batledger Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The outward-facing [`Contributions`] API surface.

use batledger_core::types::{ContributionType, WalletProvider};
use batledger_engine::contributions::Contributions;
use batledger_engine::router::{self, RouteState, SendOutcome};
use batledger_storage::queries;
use batledger_test_utils::TestHarnessBuilder;

#[tokio::test(start_paused = true)]
async fn one_time_tip_reaches_the_publisher() {
    let harness = TestHarnessBuilder::new()
        .with_registered_publisher("brave.com")
        .with_vg_tokens(8)
        .build()
        .await;
    let contributions = Contributions::new(harness.ctx.clone());

    let outcome = contributions.one_time_tip("brave.com", 1.0).await.unwrap();
    assert_eq!(outcome, SendOutcome::Sent);
    let total = contributions.contributed_total("brave.com").await.unwrap();
    assert!((total - 1.0).abs() < 1e-10);
}

#[tokio::test(start_paused = true)]
async fn recurring_tips_round_trip() {
    let harness = TestHarnessBuilder::new().build().await;
    let contributions = Contributions::new(harness.ctx.clone());

    contributions.set_recurring_tip("a.org", 1.0).await.unwrap();
    contributions.set_recurring_tip("b.org", 2.0).await.unwrap();
    contributions.set_recurring_tip("a.org", 3.0).await.unwrap();
    contributions.remove_recurring_tip("b.org").await.unwrap();

    let tips = contributions.recurring_tips().await.unwrap();
    assert_eq!(tips.len(), 1);
    assert_eq!(tips[0].publisher_id, "a.org");
    assert!((tips[0].amount - 3.0).abs() < 1e-10);
}

#[tokio::test(start_paused = true)]
async fn zero_amount_deletes_a_recurring_tip() {
    let harness = TestHarnessBuilder::new().build().await;
    let contributions = Contributions::new(harness.ctx.clone());

    contributions.set_recurring_tip("a.org", 2.0).await.unwrap();
    contributions.set_recurring_tip("a.org", 0.0).await.unwrap();
    assert!(contributions.recurring_tips().await.unwrap().is_empty());

    // Zeroing a tip that never existed is also fine.
    contributions.set_recurring_tip("never.org", 0.0).await.unwrap();
    assert!(contributions.recurring_tips().await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn balance_covers_all_sources() {
    let harness = TestHarnessBuilder::new()
        .with_provider(WalletProvider::Uphold)
        .with_external_balance(12.5)
        .with_vg_tokens(4)
        .with_sku_tokens(2)
        .build()
        .await;
    let contributions = Contributions::new(harness.ctx.clone());

    let balance = contributions.balance().await.unwrap();
    assert!((balance.grant_tokens - 1.0).abs() < 1e-10);
    assert!((balance.purchased_tokens - 0.5).abs() < 1e-10);
    assert_eq!(balance.external, Some(12.5));
}

#[tokio::test(start_paused = true)]
async fn initialize_resumes_an_interrupted_contribution() {
    let harness = TestHarnessBuilder::new()
        .with_registered_publisher("brave.com")
        .with_vg_tokens(8)
        .build()
        .await;
    let ctx = &harness.ctx;

    // A routed send persisted before the crash but never dispatched.
    let state = RouteState {
        contribution_type: ContributionType::OneTime,
        publisher_id: "brave.com".into(),
        amount: 1.0,
        save_pending: false,
    };
    ctx.jobs.initialize(router::KIND, &state).await.unwrap();

    let contributions = Contributions::new(ctx.clone());
    contributions.initialize().await.unwrap();

    let total = contributions.contributed_total("brave.com").await.unwrap();
    assert!((total - 1.0).abs() < 1e-10);
    assert!(ctx.jobs.active(router::KIND).await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn initialize_retries_deferred_contributions() {
    let harness = TestHarnessBuilder::new()
        .with_registered_publisher("late.org")
        .with_vg_tokens(8)
        .build()
        .await;
    let ctx = &harness.ctx;
    queries::pending::insert(&ctx.db, "late.org", 1.5).await.unwrap();

    let contributions = Contributions::new(ctx.clone());
    contributions.initialize().await.unwrap();

    let total = contributions.contributed_total("late.org").await.unwrap();
    assert!((total - 1.5).abs() < 1e-10);
    assert_eq!(queries::pending::count(&ctx.db).await.unwrap(), 0);
}

#[tokio::test(start_paused = true)]
async fn visits_accumulate_for_the_cycle() {
    let harness = TestHarnessBuilder::new().build().await;
    let contributions = Contributions::new(harness.ctx.clone());

    contributions.record_visit("brave.com", 10.0).await.unwrap();
    contributions.record_visit("brave.com", 5.0).await.unwrap();

    let activity = queries::activity::list(&harness.ctx.db).await.unwrap();
    assert_eq!(activity.len(), 1);
    assert_eq!(activity[0].visits, 2);
    assert!((activity[0].duration_secs - 15.0).abs() < 1e-10);
}
