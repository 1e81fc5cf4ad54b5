// SPDX-FileCopyrightText: 2026 Batledger Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deferred (pending) contribution batch job.
//!
//! A pass claims every pending row up front, then retries each one: expired
//! rows are dropped as implicitly sent, failed sends are re-enqueued with
//! their original creation time so the 90-day clock keeps counting from the
//! first deferral.

use batledger_core::types::{ContributionType, PendingContribution};
use batledger_core::LedgerError;
use batledger_storage::queries;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::context::EngineContext;
use crate::delay::jittered_delay;
use crate::job_store::JobResume;
use crate::router;

/// Job kind tag for pending contribution batches.
pub const KIND: &str = "pending-contributions";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingItem {
    pub contribution: PendingContribution,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingState {
    pub items: Vec<PendingItem>,
}

/// Claim all pending rows and create a batch job over them.
///
/// Returns `None` when there is nothing pending.
pub async fn initialize(ctx: &EngineContext) -> Result<Option<String>, LedgerError> {
    let claimed = queries::pending::claim_all(&ctx.db).await?;
    if claimed.is_empty() {
        return Ok(None);
    }
    let state = PendingState {
        items: claimed
            .into_iter()
            .map(|contribution| PendingItem {
                contribution,
                completed: false,
            })
            .collect(),
    };
    Ok(Some(ctx.jobs.initialize(KIND, &state).await?))
}

/// Run (or resume) a pending contribution batch.
pub async fn run(ctx: &EngineContext, job_id: &str) -> Result<(), LedgerError> {
    let mut state = match ctx.jobs.load::<PendingState>(job_id).await? {
        JobResume::Active(state) => state,
        JobResume::Completed { .. } | JobResume::Missing => return Ok(()),
    };

    for index in 0..state.items.len() {
        if state.items[index].completed {
            continue;
        }
        let item = state.items[index].contribution.clone();
        if is_expired(&item, ctx.config.pending_expiry_days) {
            info!(
                publisher_id = %item.publisher_id,
                created_at = %item.created_at,
                "pending contribution expired"
            );
        } else {
            tokio::time::sleep(jittered_delay(
                ctx.random.as_ref(),
                ctx.config.background_contribution_delay,
            ))
            .await;
            match router::send_contribution(
                ctx,
                ContributionType::OneTime,
                &item.publisher_id,
                item.amount,
            )
            .await
            {
                Ok(_) => {
                    info!(publisher_id = %item.publisher_id, "pending contribution sent");
                }
                Err(e) => {
                    warn!(
                        publisher_id = %item.publisher_id,
                        error = %e,
                        "pending send failed, re-enqueueing"
                    );
                    queries::pending::reinsert(&ctx.db, &item).await?;
                }
            }
        }
        state.items[index].completed = true;
        ctx.jobs.save(job_id, &state).await?;
    }
    ctx.jobs.complete(job_id).await
}

/// Rows older than the expiry window are treated as sent. An unparseable
/// timestamp also counts as expired: it can never age out otherwise.
fn is_expired(item: &PendingContribution, expiry_days: i64) -> bool {
    match DateTime::parse_from_rfc3339(&item.created_at) {
        Ok(created_at) => {
            Utc::now() - created_at.with_timezone(&Utc) > ChronoDuration::days(expiry_days)
        }
        Err(e) => {
            warn!(created_at = %item.created_at, error = %e, "bad pending timestamp");
            true
        }
    }
}
