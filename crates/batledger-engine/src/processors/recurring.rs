// SPDX-FileCopyrightText: 2026 Batledger Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Monthly recurring tip batch job.
//!
//! Iterates a snapshot of the recurring rows, one jittered send at a time,
//! persisting progress after every item so a restart resumes at the first
//! incomplete tip. An individual failure never aborts the batch.

use batledger_core::types::{ContributionType, RecurringContribution};
use batledger_core::LedgerError;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::context::EngineContext;
use crate::delay::jittered_delay;
use crate::job_store::JobResume;
use crate::router;

/// Job kind tag for recurring tip batches.
pub const KIND: &str = "recurring-contributions";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringItem {
    pub publisher_id: String,
    pub amount: f64,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringState {
    pub items: Vec<RecurringItem>,
}

/// Create a batch job over a snapshot of recurring tips.
pub async fn initialize(
    ctx: &EngineContext,
    tips: &[RecurringContribution],
) -> Result<String, LedgerError> {
    let state = RecurringState {
        items: tips
            .iter()
            .map(|tip| RecurringItem {
                publisher_id: tip.publisher_id.clone(),
                amount: tip.amount,
                completed: false,
            })
            .collect(),
    };
    ctx.jobs.initialize(KIND, &state).await
}

/// Run (or resume) a recurring tip batch.
pub async fn run(ctx: &EngineContext, job_id: &str) -> Result<(), LedgerError> {
    let mut state = match ctx.jobs.load::<RecurringState>(job_id).await? {
        JobResume::Active(state) => state,
        JobResume::Completed { .. } | JobResume::Missing => return Ok(()),
    };

    for index in 0..state.items.len() {
        if state.items[index].completed {
            continue;
        }
        tokio::time::sleep(jittered_delay(
            ctx.random.as_ref(),
            ctx.config.background_contribution_delay,
        ))
        .await;
        let item = &state.items[index];
        match router::send_or_save_pending_contribution(
            ctx,
            ContributionType::Recurring,
            &item.publisher_id,
            item.amount,
        )
        .await
        {
            Ok(outcome) => {
                info!(publisher_id = %item.publisher_id, ?outcome, "recurring tip processed");
            }
            Err(e) => {
                // This tip stays configured; it gets another chance next month.
                warn!(publisher_id = %item.publisher_id, error = %e, "recurring tip failed");
            }
        }
        state.items[index].completed = true;
        ctx.jobs.save(job_id, &state).await?;
    }
    ctx.jobs.complete(job_id).await
}
