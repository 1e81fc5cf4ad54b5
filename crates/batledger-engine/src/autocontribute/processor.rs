// SPDX-FileCopyrightText: 2026 Batledger Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The monthly auto-contribute job.
//!
//! Funding is decided when the job first runs: grant tokens when no external
//! wallet is connected, otherwise a SKU token purchase capped at the wallet
//! balance. Purchased tokens are never reused for auto-contribute — only the
//! batch bought for this very cycle. After tokens are reserved, votes are
//! allocated across publishers by weight and each publisher gets one send,
//! spaced by a jittered delay.
//!
//! Retry asymmetry is deliberate: internally-funded sends give up after a
//! small ceiling, externally-funded sends retry without bound because the
//! money has already left the user's wallet.

use std::collections::BTreeMap;

use batledger_core::types::{ContributionSource, ContributionType, TokenType, TOKEN_VALUE};
use batledger_core::LedgerError;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::autocontribute::calculator;
use crate::context::EngineContext;
use crate::delay::{backoff_delay, jittered_delay};
use crate::job_store::JobResume;
use crate::processors::token;
use crate::tokens::{vendor, TokenHold};

/// Job kind tag for auto-contribute cycles.
pub const KIND: &str = "auto-contribute";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcStep {
    Pending,
    Sending,
    Complete,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcPublisher {
    pub publisher_id: String,
    pub weight: f64,
    pub votes: u32,
    pub amount: f64,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcState {
    pub step: AcStep,
    pub source: ContributionSource,
    /// Budget in BAT; capped at the external balance for wallet funding.
    pub amount: f64,
    pub publishers: Vec<AcPublisher>,
    pub purchase_job: Option<String>,
    /// Held token ids, persisted so a resumed job re-reserves exactly them.
    pub reserved_tokens: Vec<i64>,
}

/// Build an auto-contribute job from this cycle's activity snapshot.
///
/// Returns `None` when auto-contribute is disabled.
pub async fn initialize(
    ctx: &EngineContext,
    activities: &[batledger_core::types::PublisherActivity],
) -> Result<Option<String>, LedgerError> {
    if !ctx.prefs.ac_enabled() {
        return Ok(None);
    }
    let weights = calculator::calculate_weights(
        activities,
        ctx.prefs.ac_minimum_visits(),
        ctx.prefs.ac_minimum_duration_secs(),
    );
    let source = if ctx.wallet.has_external_wallet() {
        ContributionSource::External
    } else {
        ContributionSource::VgToken
    };
    let state = AcState {
        step: AcStep::Pending,
        source,
        amount: ctx.prefs.ac_amount(),
        publishers: weights
            .into_iter()
            .map(|(publisher_id, weight)| AcPublisher {
                publisher_id,
                weight,
                votes: 0,
                amount: 0.0,
                completed: false,
            })
            .collect(),
        purchase_job: None,
        reserved_tokens: Vec::new(),
    };
    Ok(Some(ctx.jobs.initialize(KIND, &state).await?))
}

/// Run (or resume) an auto-contribute job to completion.
pub async fn run(ctx: &EngineContext, job_id: &str) -> Result<(), LedgerError> {
    let mut state = match ctx.jobs.load::<AcState>(job_id).await? {
        JobResume::Active(state) => state,
        JobResume::Completed { .. } | JobResume::Missing => return Ok(()),
    };

    match state.step {
        AcStep::Pending => {
            if state.amount <= 0.0 || state.publishers.is_empty() {
                info!(job_id, "nothing to auto-contribute");
                return ctx.jobs.complete(job_id).await;
            }
            let hold = match secure_tokens(ctx, job_id, &mut state).await? {
                Some(hold) => hold,
                None => return ctx.jobs.complete(job_id).await,
            };
            allocate(ctx, &mut state, &hold);
            state.reserved_tokens = hold.token_ids();
            state.step = AcStep::Sending;
            ctx.jobs.save(job_id, &state).await?;
            send_all(ctx, job_id, &mut state, hold).await
        }
        AcStep::Sending => {
            let hold = ctx.tokens.reserve_tokens_by_ids(&state.reserved_tokens).await?;
            send_all(ctx, job_id, &mut state, hold).await
        }
        AcStep::Complete => ctx.jobs.complete(job_id).await,
    }
}

/// Reserve the tokens that fund this cycle, purchasing them first when the
/// funding source is an external wallet. `None` means "nothing to
/// contribute" and the job completes successfully.
async fn secure_tokens(
    ctx: &EngineContext,
    job_id: &str,
    state: &mut AcState,
) -> Result<Option<TokenHold>, LedgerError> {
    let token_type = match state.source {
        ContributionSource::VgToken => TokenType::Vg,
        ContributionSource::SkuToken => {
            let e = LedgerError::Unsupported(
                "auto-contribute cannot spend previously purchased tokens".into(),
            );
            ctx.jobs.fail(job_id, &e.to_string()).await?;
            return Err(e);
        }
        ContributionSource::External => {
            // The budget is derived from the live balance exactly once,
            // before the purchase starts. After the purchase job exists the
            // wallet may already be drained by its transfer; re-reading the
            // balance on resume would turn a funded cycle into a no-op and
            // strand the bought tokens.
            if state.purchase_job.is_none() {
                let balance = ctx.wallet.get_balance().await?.unwrap_or(0.0);
                if balance <= 0.0 {
                    info!(job_id, "no external balance to auto-contribute");
                    return Ok(None);
                }
                state.amount = state.amount.min(balance);
                let purchase_job = vendor::initialize(ctx, state.amount).await?;
                state.purchase_job = Some(purchase_job);
                ctx.jobs.save(job_id, state).await?;
            }
            let purchase_job = state.purchase_job.clone().unwrap_or_default();
            vendor::run(ctx, &purchase_job).await?;
            TokenType::Sku
        }
    };
    let hold = ctx.tokens.reserve_tokens(token_type, state.amount).await?;
    if hold.is_empty() {
        warn!(job_id, amount = state.amount, "no tokens to fund auto-contribute");
        return Ok(None);
    }
    Ok(Some(hold))
}

/// Spread the hold's votes across publishers by weight.
fn allocate(ctx: &EngineContext, state: &mut AcState, hold: &TokenHold) {
    let weights: BTreeMap<String, f64> = state
        .publishers
        .iter()
        .map(|p| (p.publisher_id.clone(), p.weight))
        .collect();
    let votes = calculator::allocate_votes(&weights, hold.count() as u32, ctx.random.as_ref());
    for publisher in &mut state.publishers {
        let n = votes.get(&publisher.publisher_id).copied().unwrap_or(0);
        publisher.votes = n;
        publisher.amount = n as f64 * TOKEN_VALUE;
    }
}

async fn send_all(
    ctx: &EngineContext,
    job_id: &str,
    state: &mut AcState,
    mut hold: TokenHold,
) -> Result<(), LedgerError> {
    let unbounded = state.source == ContributionSource::External;
    let inter_send = if unbounded {
        ctx.config.external_contribution_delay
    } else {
        ctx.config.background_contribution_delay
    };

    for index in 0..state.publishers.len() {
        if state.publishers[index].completed {
            continue;
        }
        let publisher_id = state.publishers[index].publisher_id.clone();
        let take = (state.publishers[index].votes as usize).min(hold.count());
        if take > 0 {
            tokio::time::sleep(jittered_delay(ctx.random.as_ref(), inter_send)).await;
            let mut retry = 0;
            loop {
                let child = hold.split(take);
                match token::send_with_hold(
                    ctx,
                    ContributionType::AutoContribute,
                    &publisher_id,
                    child,
                )
                .await
                {
                    Ok(()) => break,
                    Err(LedgerError::PublisherNotRegistered { .. }) => {
                        warn!(publisher_id, "skipping unregistered publisher");
                        break;
                    }
                    Err(e) => {
                        retry += 1;
                        if !unbounded && retry >= ctx.config.internal_send_retries {
                            warn!(publisher_id, error = %e, "giving up on publisher");
                            break;
                        }
                        warn!(publisher_id, retry, error = %e, "auto-contribute send failed");
                        tokio::time::sleep(backoff_delay(&ctx.config, retry - 1)).await;
                    }
                }
            }
        }
        state.publishers[index].completed = true;
        state.reserved_tokens = hold.token_ids();
        ctx.jobs.save(job_id, state).await?;
    }

    state.step = AcStep::Complete;
    ctx.jobs.save(job_id, state).await?;
    ctx.jobs.complete(job_id).await?;
    info!(job_id, amount = state.amount, "auto-contribute cycle finished");
    Ok(())
}
