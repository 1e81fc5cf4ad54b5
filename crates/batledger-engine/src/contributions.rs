// SPDX-FileCopyrightText: 2026 Batledger Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outward-facing contribution API.
//!
//! The embedding application talks to [`Contributions`]: tips, recurring tip
//! management, activity recording, balances, and cycle control. Crash
//! recovery happens in [`Contributions::initialize`], which re-runs every
//! interrupted top-level job before anything new starts; child jobs
//! (purchases, AC, recurring batches) are resumed through their parents.

use batledger_core::types::{ContributionType, RecurringContribution, TokenType};
use batledger_core::LedgerError;
use batledger_storage::queries;
use tracing::{info, warn};

use crate::context::EngineContext;
use crate::processors::{fee, pending};
use crate::router::{self, SendOutcome};
use crate::scheduler::Scheduler;

/// Spendable funds across every source.
#[derive(Debug, Clone, PartialEq)]
pub struct Balance {
    /// Unreserved grant token value in BAT.
    pub grant_tokens: f64,
    /// Unreserved purchased token value in BAT.
    pub purchased_tokens: f64,
    /// External wallet balance, if one is connected and reachable.
    pub external: Option<f64>,
}

/// The contribution subsystem handle.
#[derive(Clone)]
pub struct Contributions {
    ctx: EngineContext,
    scheduler: Scheduler,
}

impl Contributions {
    pub fn new(ctx: EngineContext) -> Self {
        let scheduler = Scheduler::new(ctx.clone());
        Self { ctx, scheduler }
    }

    pub fn context(&self) -> &EngineContext {
        &self.ctx
    }

    /// Resume interrupted jobs and retry deferred contributions.
    ///
    /// Individual resume failures are logged and skipped; one poisoned job
    /// must not block startup.
    pub async fn initialize(&self) -> Result<(), LedgerError> {
        for job in self.ctx.jobs.active(router::KIND).await? {
            info!(job_id = %job.id, "resuming interrupted contribution");
            if let Err(e) = router::run(&self.ctx, &job.id).await {
                warn!(job_id = %job.id, error = %e, "contribution resume failed");
            }
        }
        for job in self.ctx.jobs.active(fee::KIND).await? {
            let ctx = self.ctx.clone();
            let job_id = job.id.clone();
            tokio::spawn(async move {
                if let Err(e) = fee::run(&ctx, &job_id).await {
                    warn!(job_id = %job_id, error = %e, "fee resume failed");
                }
            });
        }
        for job in self.ctx.jobs.active(pending::KIND).await? {
            if let Err(e) = pending::run(&self.ctx, &job.id).await {
                warn!(job_id = %job.id, error = %e, "pending batch resume failed");
            }
        }
        self.process_pending().await
    }

    /// Run the contribution cycle timer until [`Contributions::shutdown`].
    pub async fn run_scheduler(&self) -> Result<(), LedgerError> {
        self.scheduler.run().await
    }

    pub fn shutdown(&self) {
        self.scheduler.shutdown();
    }

    /// Tip a publisher once, deferring the tip if the publisher cannot be
    /// paid yet.
    pub async fn one_time_tip(
        &self,
        publisher_id: &str,
        amount: f64,
    ) -> Result<SendOutcome, LedgerError> {
        router::send_or_save_pending_contribution(
            &self.ctx,
            ContributionType::OneTime,
            publisher_id,
            amount,
        )
        .await
    }

    /// Route and send a contribution without the pending fallback.
    pub async fn send_contribution(
        &self,
        contribution_type: ContributionType,
        publisher_id: &str,
        amount: f64,
    ) -> Result<SendOutcome, LedgerError> {
        router::send_contribution(&self.ctx, contribution_type, publisher_id, amount).await
    }

    /// Create or update a monthly tip. A zero (or negative) amount deletes
    /// the tip, same as [`Contributions::remove_recurring_tip`].
    pub async fn set_recurring_tip(
        &self,
        publisher_id: &str,
        amount: f64,
    ) -> Result<(), LedgerError> {
        if amount <= 0.0 {
            return queries::recurring::delete(&self.ctx.db, publisher_id).await;
        }
        queries::recurring::upsert(&self.ctx.db, publisher_id, amount).await
    }

    pub async fn remove_recurring_tip(&self, publisher_id: &str) -> Result<(), LedgerError> {
        queries::recurring::delete(&self.ctx.db, publisher_id).await
    }

    pub async fn recurring_tips(&self) -> Result<Vec<RecurringContribution>, LedgerError> {
        queries::recurring::list(&self.ctx.db).await
    }

    /// Record one publisher visit for this cycle's auto-contribute weighting.
    pub async fn record_visit(
        &self,
        publisher_id: &str,
        duration_secs: f64,
    ) -> Result<(), LedgerError> {
        queries::activity::record_visit(&self.ctx.db, publisher_id, duration_secs).await
    }

    /// Spendable funds across token pools and the external wallet.
    pub async fn balance(&self) -> Result<Balance, LedgerError> {
        let grant_tokens = self.ctx.tokens.available_balance(TokenType::Vg).await?;
        let purchased_tokens = self.ctx.tokens.available_balance(TokenType::Sku).await?;
        let external = if self.ctx.wallet.has_external_wallet() {
            self.ctx.wallet.get_balance().await?
        } else {
            None
        };
        Ok(Balance {
            grant_tokens,
            purchased_tokens,
            external,
        })
    }

    /// Total BAT ever contributed to a publisher.
    pub async fn contributed_total(&self, publisher_id: &str) -> Result<f64, LedgerError> {
        queries::contributions::publisher_total(&self.ctx.db, publisher_id).await
    }

    /// Trigger the next contribution cycle immediately.
    pub fn start_contributions_now(&self) {
        self.scheduler.fire_now();
    }

    /// Restart the 30-day cycle clock from now.
    pub async fn reset_reconcile_stamp(&self) -> Result<(), LedgerError> {
        self.scheduler.reset_reconcile_stamp().await
    }

    /// Retry every deferred contribution in one batch pass.
    pub async fn process_pending(&self) -> Result<(), LedgerError> {
        if let Some(job_id) = pending::initialize(&self.ctx).await? {
            pending::run(&self.ctx, &job_id).await?;
        }
        Ok(())
    }
}
