// SPDX-FileCopyrightText: 2026 Batledger Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Platform fee transfer for externally-funded contributions.
//!
//! Each external contribution spawns one independent fee job. The fee is
//! best-effort: after the retry ceiling the job gives up permanently and the
//! contribution that already succeeded is never blocked or rolled back.

use batledger_core::LedgerError;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::context::EngineContext;
use crate::delay::{backoff_delay, jittered_delay};
use crate::job_store::JobResume;

/// Job kind tag for fee transfers.
pub const KIND: &str = "contribution-fee";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeState {
    /// Fee amount in BAT, already computed from the contribution.
    pub amount: f64,
    pub retry_count: u32,
}

/// Create a fee job row without running it.
pub async fn initialize(ctx: &EngineContext, amount: f64) -> Result<String, LedgerError> {
    ctx.jobs
        .initialize(
            KIND,
            &FeeState {
                amount,
                retry_count: 0,
            },
        )
        .await
}

/// Run (or resume) a fee job.
///
/// Returns `Ok` whether the fee was sent or permanently abandoned; only
/// storage failures surface as errors.
pub async fn run(ctx: &EngineContext, job_id: &str) -> Result<(), LedgerError> {
    let mut state = match ctx.jobs.load::<FeeState>(job_id).await? {
        JobResume::Active(state) => state,
        JobResume::Completed { .. } | JobResume::Missing => return Ok(()),
    };

    tokio::time::sleep(jittered_delay(
        ctx.random.as_ref(),
        ctx.config.background_contribution_delay,
    ))
    .await;

    let destination = ctx.wallet.contribution_fee_address();
    loop {
        if state.retry_count >= ctx.config.fee_retries {
            warn!(job_id, amount = state.amount, "fee transfer abandoned");
            ctx.jobs.fail(job_id, "fee transfer abandoned").await?;
            return Ok(());
        }
        match ctx
            .wallet
            .transfer_bat(&destination, state.amount, Some("contribution fee"))
            .await
        {
            Ok(Some(_)) => {
                info!(job_id, amount = state.amount, "fee transferred");
                ctx.jobs.complete(job_id).await?;
                return Ok(());
            }
            Ok(None) => {
                warn!(job_id, "no wallet available for fee transfer");
            }
            Err(e) => {
                warn!(job_id, retry = state.retry_count, error = %e, "fee transfer failed");
            }
        }
        let delay = backoff_delay(&ctx.config, state.retry_count);
        state.retry_count += 1;
        ctx.jobs.save(job_id, &state).await?;
        tokio::time::sleep(delay).await;
    }
}
