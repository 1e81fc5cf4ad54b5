// SPDX-FileCopyrightText: 2026 Batledger Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The monthly contribution cycle timer.
//!
//! On startup the scheduler first resumes any interrupted cycle jobs, then
//! arms a timer for `last fire + reconcile interval`. A fired cycle
//! snapshots the recurring tips and the activity accumulator, resets the
//! accumulator, advances the stamp, and runs one cycle job that sequences
//! the recurring batch before auto-contribute. Either half resumes
//! independently after a crash because the cycle state records the child
//! job ids.

use std::sync::Arc;
use std::time::Duration;

use batledger_core::types::{PublisherActivity, RecurringContribution};
use batledger_core::LedgerError;
use batledger_storage::queries;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::autocontribute::processor as autocontribute;
use crate::context::EngineContext;
use crate::job_store::JobResume;
use crate::processors::recurring;

/// Job kind tag for scheduled contribution cycles.
pub const KIND: &str = "scheduled-contribution";

/// Engine-state key holding the unix timestamp of the last cycle fire.
pub const RECONCILE_STAMP_KEY: &str = "reconcile_stamp";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleStep {
    Recurring,
    AutoContribute,
    Complete,
}

/// Persisted state of one contribution cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionJobState {
    pub step: ScheduleStep,
    /// Snapshot of recurring tips at fire time.
    pub recurring: Vec<RecurringContribution>,
    /// Snapshot of the activity accumulator at fire time.
    pub activities: Vec<PublisherActivity>,
    pub recurring_job: Option<String>,
    pub ac_job: Option<String>,
}

/// Long-lived cycle timer with a "fire now" override.
#[derive(Clone)]
pub struct Scheduler {
    ctx: EngineContext,
    fire_now: Arc<Notify>,
    shutdown: CancellationToken,
}

impl Scheduler {
    pub fn new(ctx: EngineContext) -> Self {
        Self {
            ctx,
            fire_now: Arc::new(Notify::new()),
            shutdown: CancellationToken::new(),
        }
    }

    /// Fire the next cycle immediately. If no wait is armed yet, the next
    /// one fires as soon as it starts.
    pub fn fire_now(&self) {
        self.fire_now.notify_one();
    }

    /// Stop the timer loop after the current cycle, if any.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Restart the 30-day clock from now.
    pub async fn reset_reconcile_stamp(&self) -> Result<(), LedgerError> {
        set_stamp(&self.ctx, Utc::now().timestamp()).await
    }

    /// Resume interrupted cycles, then loop: wait for the schedule (or a
    /// fire-now), run one cycle, re-arm.
    pub async fn run(&self) -> Result<(), LedgerError> {
        for job in self.ctx.jobs.active(KIND).await? {
            info!(job_id = %job.id, "resuming interrupted contribution cycle");
            if let Err(e) = run_cycle_job(&self.ctx, &job.id).await {
                warn!(job_id = %job.id, error = %e, "cycle resume failed");
            }
        }
        loop {
            let wait = self.next_fire_delay().await?;
            debug!(wait_secs = wait.as_secs(), "contribution timer armed");
            tokio::select! {
                _ = self.shutdown.cancelled() => return Ok(()),
                _ = tokio::time::sleep(wait) => {}
                _ = self.fire_now.notified() => {}
            }
            if let Err(e) = start_cycle(&self.ctx).await {
                warn!(error = %e, "contribution cycle failed");
            }
        }
    }

    async fn next_fire_delay(&self) -> Result<Duration, LedgerError> {
        let interval = self.ctx.config.reconcile_interval.as_secs() as i64;
        let now = Utc::now().timestamp();
        let last = queries::state::get(&self.ctx.db, RECONCILE_STAMP_KEY)
            .await?
            .and_then(|v| v.parse::<i64>().ok());
        match last {
            Some(last) => Ok(Duration::from_secs((last + interval - now).max(0) as u64)),
            None => {
                // First run ever: start the clock, fire one interval from now.
                set_stamp(&self.ctx, now).await?;
                Ok(self.ctx.config.reconcile_interval)
            }
        }
    }
}

async fn set_stamp(ctx: &EngineContext, stamp: i64) -> Result<(), LedgerError> {
    queries::state::set(&ctx.db, RECONCILE_STAMP_KEY, &stamp.to_string()).await
}

/// Snapshot this cycle's inputs, advance the stamp, and run the cycle job.
pub async fn start_cycle(ctx: &EngineContext) -> Result<(), LedgerError> {
    let recurring = queries::recurring::list(&ctx.db).await?;
    let activities = queries::activity::take_all(&ctx.db).await?;
    set_stamp(ctx, Utc::now().timestamp()).await?;
    let state = ContributionJobState {
        step: ScheduleStep::Recurring,
        recurring,
        activities,
        recurring_job: None,
        ac_job: None,
    };
    let job_id = ctx.jobs.initialize(KIND, &state).await?;
    info!(job_id, "contribution cycle started");
    run_cycle_job(ctx, &job_id).await
}

/// Run (or resume) one cycle job: recurring tips first, then auto-contribute.
pub async fn run_cycle_job(ctx: &EngineContext, job_id: &str) -> Result<(), LedgerError> {
    let mut state = match ctx.jobs.load::<ContributionJobState>(job_id).await? {
        JobResume::Active(state) => state,
        JobResume::Completed { .. } | JobResume::Missing => return Ok(()),
    };

    loop {
        match state.step {
            ScheduleStep::Recurring => {
                if state.recurring_job.is_none() && !state.recurring.is_empty() {
                    let child = recurring::initialize(ctx, &state.recurring).await?;
                    state.recurring_job = Some(child);
                    ctx.jobs.save(job_id, &state).await?;
                }
                if let Some(child) = state.recurring_job.clone() {
                    recurring::run(ctx, &child).await?;
                }
                state.step = ScheduleStep::AutoContribute;
                ctx.jobs.save(job_id, &state).await?;
            }
            ScheduleStep::AutoContribute => {
                if state.ac_job.is_none() {
                    state.ac_job = autocontribute::initialize(ctx, &state.activities).await?;
                    ctx.jobs.save(job_id, &state).await?;
                }
                if let Some(child) = state.ac_job.clone() {
                    autocontribute::run(ctx, &child).await?;
                }
                state.step = ScheduleStep::Complete;
                ctx.jobs.save(job_id, &state).await?;
            }
            ScheduleStep::Complete => {
                return ctx.jobs.complete(job_id).await;
            }
        }
    }
}
