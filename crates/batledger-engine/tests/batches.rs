// SPDX-FileCopyrightText: 2026 Batledger Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Batch jobs over lists: recurring tips and deferred (pending)
//! contributions.

mod recurring_batch {
    use batledger_core::types::RecurringContribution;
    use batledger_engine::processors::recurring::{self, RecurringItem, RecurringState};
    use batledger_storage::queries;
    use batledger_test_utils::TestHarnessBuilder;

    fn tip(publisher_id: &str, amount: f64) -> RecurringContribution {
        RecurringContribution {
            publisher_id: publisher_id.to_string(),
            amount,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn batch_sends_every_tip() {
        let harness = TestHarnessBuilder::new()
            .with_registered_publisher("a.org")
            .with_registered_publisher("b.org")
            .with_vg_tokens(16)
            .build()
            .await;
        let ctx = &harness.ctx;

        let job_id = recurring::initialize(ctx, &[tip("a.org", 1.0), tip("b.org", 2.0)])
            .await
            .unwrap();
        recurring::run(ctx, &job_id).await.unwrap();

        let a = queries::contributions::publisher_total(&ctx.db, "a.org").await.unwrap();
        let b = queries::contributions::publisher_total(&ctx.db, "b.org").await.unwrap();
        assert!((a - 1.0).abs() < 1e-10);
        assert!((b - 2.0).abs() < 1e-10);
        assert!(ctx.jobs.active(recurring::KIND).await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn one_failure_does_not_abort_the_batch() {
        let harness = TestHarnessBuilder::new()
            .with_registered_publisher("b.org")
            .with_vg_tokens(16)
            .build()
            .await;
        let ctx = &harness.ctx;

        // a.org is unregistered: it becomes pending, and b.org still sends.
        let job_id = recurring::initialize(ctx, &[tip("a.org", 1.0), tip("b.org", 2.0)])
            .await
            .unwrap();
        recurring::run(ctx, &job_id).await.unwrap();

        assert_eq!(queries::pending::count(&ctx.db).await.unwrap(), 1);
        let b = queries::contributions::publisher_total(&ctx.db, "b.org").await.unwrap();
        assert!((b - 2.0).abs() < 1e-10);
    }

    #[tokio::test(start_paused = true)]
    async fn resume_skips_completed_items() {
        let harness = TestHarnessBuilder::new()
            .with_registered_publisher("a.org")
            .with_registered_publisher("b.org")
            .with_vg_tokens(16)
            .build()
            .await;
        let ctx = &harness.ctx;

        let state = RecurringState {
            items: vec![
                RecurringItem {
                    publisher_id: "a.org".into(),
                    amount: 1.0,
                    completed: true,
                },
                RecurringItem {
                    publisher_id: "b.org".into(),
                    amount: 2.0,
                    completed: false,
                },
            ],
        };
        let job_id = ctx.jobs.initialize(recurring::KIND, &state).await.unwrap();
        recurring::run(ctx, &job_id).await.unwrap();

        // Only the incomplete item was sent.
        let a = queries::contributions::publisher_total(&ctx.db, "a.org").await.unwrap();
        let b = queries::contributions::publisher_total(&ctx.db, "b.org").await.unwrap();
        assert_eq!(a, 0.0);
        assert!((b - 2.0).abs() < 1e-10);
    }
}

mod pending_batch {
    use batledger_core::types::PendingContribution;
    use batledger_engine::processors::pending;
    use batledger_storage::queries;
    use batledger_test_utils::TestHarnessBuilder;
    use chrono::Utc;

    #[tokio::test(start_paused = true)]
    async fn pending_rows_are_claimed_and_sent() {
        let harness = TestHarnessBuilder::new()
            .with_registered_publisher("a.org")
            .with_vg_tokens(8)
            .build()
            .await;
        let ctx = &harness.ctx;
        queries::pending::insert(&ctx.db, "a.org", 1.0).await.unwrap();

        let job_id = pending::initialize(ctx).await.unwrap().unwrap();
        pending::run(ctx, &job_id).await.unwrap();

        let total = queries::contributions::publisher_total(&ctx.db, "a.org").await.unwrap();
        assert!((total - 1.0).abs() < 1e-10);
        assert_eq!(queries::pending::count(&ctx.db).await.unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_pending_creates_no_job() {
        let harness = TestHarnessBuilder::new().build().await;
        assert!(pending::initialize(&harness.ctx).await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn expired_rows_are_dropped_without_a_send() {
        let harness = TestHarnessBuilder::new()
            .with_registered_publisher("old.org")
            .with_vg_tokens(8)
            .build()
            .await;
        let ctx = &harness.ctx;
        queries::pending::reinsert(
            &ctx.db,
            &PendingContribution {
                id: 0,
                publisher_id: "old.org".into(),
                amount: 1.0,
                created_at: "2020-01-01T00:00:00.000Z".into(),
            },
        )
        .await
        .unwrap();

        let job_id = pending::initialize(ctx).await.unwrap().unwrap();
        pending::run(ctx, &job_id).await.unwrap();

        // Treated as sent: no contribution, no re-enqueue.
        assert_eq!(queries::contributions::count(&ctx.db).await.unwrap(), 0);
        assert_eq!(queries::pending::count(&ctx.db).await.unwrap(), 0);
        assert!(harness.payment.votes().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_send_is_reenqueued_with_original_timestamp() {
        let harness = TestHarnessBuilder::new().with_vg_tokens(8).build().await;
        let ctx = &harness.ctx;
        let created_at = Utc::now().to_rfc3339();
        queries::pending::reinsert(
            &ctx.db,
            &PendingContribution {
                id: 0,
                publisher_id: "still-ghost.org".into(),
                amount: 1.0,
                created_at: created_at.clone(),
            },
        )
        .await
        .unwrap();

        let job_id = pending::initialize(ctx).await.unwrap().unwrap();
        pending::run(ctx, &job_id).await.unwrap();

        // Publisher still unregistered: the row is back with its first
        // deferral time, and the batch completed anyway.
        let rows = queries::pending::claim_all(&ctx.db).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].created_at, created_at);
        assert!(ctx.jobs.active(pending::KIND).await.unwrap().is_empty());
    }
}
