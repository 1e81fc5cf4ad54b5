// SPDX-FileCopyrightText: 2026 Batledger Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contribution routing: one-shot jobs that pick a funding path.
//!
//! A send goes through the external processor when a custodial wallet is
//! connected, otherwise through the token processor (grant tokens first,
//! then purchased tokens). The "or save pending" variant catches exactly the
//! publisher-not-registered failure and defers the contribution instead of
//! failing it.

use batledger_core::types::{ContributionType, TokenType};
use batledger_core::LedgerError;
use batledger_storage::queries;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::context::EngineContext;
use crate::processors::{external, token};

/// Job kind tag for routed one-shot contributions.
pub const KIND: &str = "contribution";

/// What happened to a routed send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    SavedPending,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteState {
    pub contribution_type: ContributionType,
    pub publisher_id: String,
    pub amount: f64,
    /// Whether a not-registered failure becomes a pending row.
    pub save_pending: bool,
}

/// Route and send a contribution, failing on any error.
pub async fn send_contribution(
    ctx: &EngineContext,
    contribution_type: ContributionType,
    publisher_id: &str,
    amount: f64,
) -> Result<SendOutcome, LedgerError> {
    route(ctx, contribution_type, publisher_id, amount, false).await
}

/// Route and send a contribution, deferring it as pending when the publisher
/// is not (yet) able to receive payment.
pub async fn send_or_save_pending_contribution(
    ctx: &EngineContext,
    contribution_type: ContributionType,
    publisher_id: &str,
    amount: f64,
) -> Result<SendOutcome, LedgerError> {
    route(ctx, contribution_type, publisher_id, amount, true).await
}

async fn route(
    ctx: &EngineContext,
    contribution_type: ContributionType,
    publisher_id: &str,
    amount: f64,
    save_pending: bool,
) -> Result<SendOutcome, LedgerError> {
    let state = RouteState {
        contribution_type,
        publisher_id: publisher_id.to_string(),
        amount,
        save_pending,
    };
    let job_id = ctx.jobs.initialize(KIND, &state).await?;
    run(ctx, &job_id).await
}

/// Run (or resume) a routed contribution job.
pub async fn run(ctx: &EngineContext, job_id: &str) -> Result<SendOutcome, LedgerError> {
    let state = match ctx.jobs.load::<RouteState>(job_id).await? {
        crate::job_store::JobResume::Active(state) => state,
        crate::job_store::JobResume::Completed { error: None } => return Ok(SendOutcome::Sent),
        crate::job_store::JobResume::Completed { error: Some(e) } => {
            return Err(LedgerError::Internal(format!("contribution job failed: {e}")));
        }
        crate::job_store::JobResume::Missing => {
            return Err(LedgerError::Internal(format!("no contribution job {job_id}")));
        }
    };

    let result = dispatch(ctx, &state).await;
    match result {
        Ok(()) => {
            ctx.jobs.complete(job_id).await?;
            Ok(SendOutcome::Sent)
        }
        Err(LedgerError::PublisherNotRegistered { .. }) if state.save_pending => {
            queries::pending::insert(&ctx.db, &state.publisher_id, state.amount).await?;
            ctx.jobs.complete(job_id).await?;
            info!(
                publisher_id = %state.publisher_id,
                amount = state.amount,
                "contribution saved as pending"
            );
            Ok(SendOutcome::SavedPending)
        }
        Err(e) => {
            ctx.jobs.fail(job_id, &e.to_string()).await?;
            Err(e)
        }
    }
}

async fn dispatch(ctx: &EngineContext, state: &RouteState) -> Result<(), LedgerError> {
    if ctx.wallet.has_external_wallet() {
        debug!(publisher_id = %state.publisher_id, "routing to external wallet");
        return external::send(
            ctx,
            state.contribution_type,
            &state.publisher_id,
            state.amount,
        )
        .await;
    }
    // Grant tokens are preferred; purchased tokens back a tip only when the
    // grant pool cannot cover it.
    let vg_balance = ctx.tokens.available_balance(TokenType::Vg).await?;
    let token_type = if vg_balance + 1e-9 >= state.amount {
        TokenType::Vg
    } else {
        TokenType::Sku
    };
    token::send(
        ctx,
        state.contribution_type,
        &state.publisher_id,
        state.amount,
        token_type,
    )
    .await
}
