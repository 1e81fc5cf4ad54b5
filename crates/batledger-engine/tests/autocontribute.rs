// SPDX-FileCopyrightText: 2026 Batledger Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Auto-contribute cycle behavior: funding selection, budget caps, sends,
//! and crash resumption.

use batledger_core::types::{
    ContributionSource, PublisherActivity, TokenType, WalletProvider,
};
use batledger_core::LedgerError;
use batledger_engine::autocontribute::processor::{
    self, AcPublisher, AcState, AcStep,
};
use batledger_engine::tokens::vendor;
use batledger_storage::queries;
use batledger_test_utils::{StaticPrefs, TestHarnessBuilder};

fn activities() -> Vec<PublisherActivity> {
    vec![
        PublisherActivity {
            publisher_id: "brave.com".into(),
            visits: 4,
            duration_secs: 14.0,
        },
        PublisherActivity {
            publisher_id: "any.org".into(),
            visits: 2,
            duration_secs: 10.0,
        },
    ]
}

fn single_publisher(publisher_id: &str) -> Vec<AcPublisher> {
    vec![AcPublisher {
        publisher_id: publisher_id.to_string(),
        weight: 1.0,
        votes: 0,
        amount: 0.0,
        completed: false,
    }]
}

#[tokio::test(start_paused = true)]
async fn grant_funded_cycle_spends_the_whole_budget() {
    let harness = TestHarnessBuilder::new()
        .with_registered_publisher("brave.com")
        .with_registered_publisher("any.org")
        .with_vg_tokens(8)
        .with_prefs(StaticPrefs {
            amount: 2.0,
            ..StaticPrefs::default()
        })
        // Constant 0.3 darts: every vote lands on any.org ([0, 0.4944)).
        .with_random(vec![0.3])
        .build()
        .await;
    let ctx = &harness.ctx;

    let job_id = processor::initialize(ctx, &activities()).await.unwrap().unwrap();
    processor::run(ctx, &job_id).await.unwrap();

    let any = queries::contributions::publisher_total(&ctx.db, "any.org").await.unwrap();
    assert!((any - 2.0).abs() < 1e-10);
    assert_eq!(
        ctx.tokens.available_balance(TokenType::Vg).await.unwrap(),
        0.0
    );
    assert!(ctx.jobs.active(processor::KIND).await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn zero_budget_completes_without_reserving() {
    let harness = TestHarnessBuilder::new()
        .with_vg_tokens(8)
        .with_prefs(StaticPrefs {
            amount: 0.0,
            ..StaticPrefs::default()
        })
        .build()
        .await;
    let ctx = &harness.ctx;

    let job_id = processor::initialize(ctx, &activities()).await.unwrap().unwrap();
    processor::run(ctx, &job_id).await.unwrap();

    assert!((ctx.tokens.available_balance(TokenType::Vg).await.unwrap() - 2.0).abs() < 1e-10);
    assert_eq!(queries::contributions::count(&ctx.db).await.unwrap(), 0);
    assert!(ctx.jobs.active(processor::KIND).await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn disabled_pref_creates_no_job() {
    let harness = TestHarnessBuilder::new()
        .with_prefs(StaticPrefs {
            enabled: false,
            ..StaticPrefs::default()
        })
        .build()
        .await;
    assert!(processor::initialize(&harness.ctx, &activities())
        .await
        .unwrap()
        .is_none());
}

#[tokio::test(start_paused = true)]
async fn external_funding_purchases_then_contributes() {
    let harness = TestHarnessBuilder::new()
        .with_provider(WalletProvider::Uphold)
        .with_external_balance(30.0)
        .with_registered_publisher("brave.com")
        .with_registered_publisher("any.org")
        .with_prefs(StaticPrefs {
            amount: 5.0,
            ..StaticPrefs::default()
        })
        .with_random(vec![0.3])
        .build()
        .await;
    let ctx = &harness.ctx;

    let job_id = processor::initialize(ctx, &activities()).await.unwrap().unwrap();
    processor::run(ctx, &job_id).await.unwrap();

    // 5.0 BAT went to the order, 20 tokens were bought and fully spent.
    let transfers = harness.wallet.transfers().await;
    assert_eq!(transfers[0].0, "order-address");
    assert!((transfers[0].1 - 5.0).abs() < 1e-10);
    assert_eq!(
        ctx.tokens.available_balance(TokenType::Sku).await.unwrap(),
        0.0
    );
    let any = queries::contributions::publisher_total(&ctx.db, "any.org").await.unwrap();
    assert!((any - 5.0).abs() < 1e-10);
}

#[tokio::test(start_paused = true)]
async fn external_budget_is_capped_at_the_balance() {
    let harness = TestHarnessBuilder::new()
        .with_provider(WalletProvider::Uphold)
        .with_external_balance(1.0)
        .with_registered_publisher("brave.com")
        .with_registered_publisher("any.org")
        .with_prefs(StaticPrefs {
            amount: 20.0,
            ..StaticPrefs::default()
        })
        .with_random(vec![0.3])
        .build()
        .await;
    let ctx = &harness.ctx;

    let job_id = processor::initialize(ctx, &activities()).await.unwrap().unwrap();
    processor::run(ctx, &job_id).await.unwrap();

    let transfers = harness.wallet.transfers().await;
    assert!((transfers[0].1 - 1.0).abs() < 1e-10);
}

#[tokio::test(start_paused = true)]
async fn zero_external_balance_is_a_successful_noop() {
    let harness = TestHarnessBuilder::new()
        .with_provider(WalletProvider::Uphold)
        .with_external_balance(0.0)
        .with_prefs(StaticPrefs {
            amount: 20.0,
            ..StaticPrefs::default()
        })
        .build()
        .await;
    let ctx = &harness.ctx;

    let job_id = processor::initialize(ctx, &activities()).await.unwrap().unwrap();
    processor::run(ctx, &job_id).await.unwrap();

    assert!(harness.wallet.transfers().await.is_empty());
    assert!(ctx.jobs.active(processor::KIND).await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn resume_after_purchase_transfer_ignores_drained_balance() {
    let harness = TestHarnessBuilder::new()
        .with_provider(WalletProvider::Uphold)
        .with_external_balance(5.0)
        .with_registered_publisher("brave.com")
        .with_random(vec![0.3])
        .build()
        .await;
    let ctx = &harness.ctx;

    // The purchase sub-job ran to completion (funds left the wallet, tokens
    // landed in the Sku pool), then the process died before the cycle job
    // advanced past Pending.
    let purchase_job = vendor::initialize(ctx, 5.0).await.unwrap();
    vendor::run(ctx, &purchase_job).await.unwrap();
    harness.wallet.set_balance(Some(0.0)).await;

    let state = AcState {
        step: AcStep::Pending,
        source: ContributionSource::External,
        amount: 5.0,
        publishers: single_publisher("brave.com"),
        purchase_job: Some(purchase_job),
        reserved_tokens: Vec::new(),
    };
    let job_id = ctx.jobs.initialize(processor::KIND, &state).await.unwrap();
    processor::run(ctx, &job_id).await.unwrap();

    // The drained wallet is irrelevant on resume: the already-bought tokens
    // fund the cycle, same terminal outcome as an uninterrupted run.
    let total = queries::contributions::publisher_total(&ctx.db, "brave.com").await.unwrap();
    assert!((total - 5.0).abs() < 1e-10);
    assert_eq!(
        ctx.tokens.available_balance(TokenType::Sku).await.unwrap(),
        0.0
    );
    assert!(ctx.jobs.active(processor::KIND).await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn purchased_token_source_is_rejected() {
    let harness = TestHarnessBuilder::new().with_sku_tokens(8).build().await;
    let ctx = &harness.ctx;

    let state = AcState {
        step: AcStep::Pending,
        source: ContributionSource::SkuToken,
        amount: 1.0,
        publishers: single_publisher("brave.com"),
        purchase_job: None,
        reserved_tokens: Vec::new(),
    };
    let job_id = ctx.jobs.initialize(processor::KIND, &state).await.unwrap();
    let err = processor::run(ctx, &job_id).await.unwrap_err();
    assert!(matches!(err, LedgerError::Unsupported(_)));
    assert!((ctx.tokens.available_balance(TokenType::Sku).await.unwrap() - 2.0).abs() < 1e-10);
}

#[tokio::test(start_paused = true)]
async fn resume_in_sending_re_reserves_and_finishes() {
    let harness = TestHarnessBuilder::new()
        .with_registered_publisher("brave.com")
        .with_vg_tokens(4)
        .with_random(vec![0.3])
        .build()
        .await;
    let ctx = &harness.ctx;

    // Craft a job that crashed after reserving and allocating.
    let held = ctx.tokens.reserve_tokens(TokenType::Vg, 1.0).await.unwrap();
    let ids = held.token_ids();
    drop(held); // reservations evaporate with the "crash"
    let state = AcState {
        step: AcStep::Sending,
        source: ContributionSource::VgToken,
        amount: 1.0,
        publishers: vec![AcPublisher {
            publisher_id: "brave.com".into(),
            weight: 1.0,
            votes: 4,
            amount: 1.0,
            completed: false,
        }],
        purchase_job: None,
        reserved_tokens: ids,
    };
    let job_id = ctx.jobs.initialize(processor::KIND, &state).await.unwrap();
    processor::run(ctx, &job_id).await.unwrap();

    let total = queries::contributions::publisher_total(&ctx.db, "brave.com").await.unwrap();
    assert!((total - 1.0).abs() < 1e-10);
    assert_eq!(
        ctx.tokens.available_balance(TokenType::Vg).await.unwrap(),
        0.0
    );
}

#[tokio::test(start_paused = true)]
async fn internal_send_failures_give_up_after_the_ceiling() {
    let harness = TestHarnessBuilder::new()
        .with_registered_publisher("brave.com")
        .with_vg_tokens(4)
        .with_prefs(StaticPrefs {
            amount: 1.0,
            ..StaticPrefs::default()
        })
        .with_random(vec![0.3])
        .build()
        .await;
    harness.payment.fail_votes("brave.com", 10).await;
    let ctx = &harness.ctx;

    let job_id = processor::initialize(
        ctx,
        &[PublisherActivity {
            publisher_id: "brave.com".into(),
            visits: 4,
            duration_secs: 14.0,
        }],
    )
    .await
    .unwrap()
    .unwrap();
    processor::run(ctx, &job_id).await.unwrap();

    // Three attempts, then the cycle completed and the tokens returned.
    assert_eq!(harness.payment.vote_attempts().await, 3);
    assert!((ctx.tokens.available_balance(TokenType::Vg).await.unwrap() - 1.0).abs() < 1e-10);
    assert!(ctx.jobs.active(processor::KIND).await.unwrap().is_empty());
}
