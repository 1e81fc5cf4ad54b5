// SPDX-FileCopyrightText: 2026 Batledger Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed access to durable job rows.
//!
//! Every resumable job persists its state as a serde_json blob keyed by a
//! string kind. The critical invariant: a blob must deserialize into the
//! exact state struct registered for its kind; if it does not, the job is
//! failed closed with a terminal error rather than partially executed.

use std::sync::Arc;

use batledger_core::LedgerError;
use batledger_storage::{queries, Database, JobRow};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

/// Terminal error recorded when a state blob fails to deserialize.
pub const INVALID_STATE_ERROR: &str = "invalid state";

/// Outcome of loading a job for resumption.
#[derive(Debug)]
pub enum JobResume<S> {
    /// The job is incomplete; continue from this state.
    Active(S),
    /// The job already reached a terminal state.
    Completed { error: Option<String> },
    /// No such job row.
    Missing,
}

/// Handle to the `jobs` table with typed state (de)serialization.
#[derive(Clone)]
pub struct JobStore {
    db: Arc<Database>,
}

impl JobStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Persist a new job row with its initial state. Returns the job id.
    pub async fn initialize<S: Serialize>(
        &self,
        kind: &str,
        state: &S,
    ) -> Result<String, LedgerError> {
        let id = uuid::Uuid::new_v4().to_string();
        let blob = serde_json::to_string(state)
            .map_err(|e| LedgerError::Internal(format!("state serialization: {e}")))?;
        queries::jobs::create(&self.db, &id, kind, &blob).await?;
        debug!(job_id = %id, kind, "job initialized");
        Ok(id)
    }

    /// Rewrite a job's persisted state. Call after every state transition,
    /// before the next irreversible side effect.
    pub async fn save<S: Serialize>(&self, id: &str, state: &S) -> Result<(), LedgerError> {
        let blob = serde_json::to_string(state)
            .map_err(|e| LedgerError::Internal(format!("state serialization: {e}")))?;
        queries::jobs::save_state(&self.db, id, &blob).await
    }

    /// Mark a job successfully completed.
    pub async fn complete(&self, id: &str) -> Result<(), LedgerError> {
        queries::jobs::complete(&self.db, id, None).await?;
        debug!(job_id = %id, "job completed");
        Ok(())
    }

    /// Mark a job completed with a terminal failure reason.
    pub async fn fail(&self, id: &str, error: &str) -> Result<(), LedgerError> {
        queries::jobs::complete(&self.db, id, Some(error)).await?;
        warn!(job_id = %id, error, "job failed");
        Ok(())
    }

    /// Load a job for resumption.
    ///
    /// A blob that cannot deserialize into `S` fails the job closed and
    /// returns [`LedgerError::InvalidState`].
    pub async fn load<S: DeserializeOwned>(
        &self,
        id: &str,
    ) -> Result<JobResume<S>, LedgerError> {
        let Some(row) = queries::jobs::get(&self.db, id).await? else {
            return Ok(JobResume::Missing);
        };
        if row.completed_at.is_some() {
            return Ok(JobResume::Completed { error: row.error });
        }
        match serde_json::from_str(&row.state) {
            Ok(state) => Ok(JobResume::Active(state)),
            Err(e) => {
                self.fail(id, INVALID_STATE_ERROR).await?;
                Err(LedgerError::InvalidState(format!(
                    "job {id}: {e}"
                )))
            }
        }
    }

    /// All incomplete jobs of a kind, oldest first.
    pub async fn active(&self, kind: &str) -> Result<Vec<JobRow>, LedgerError> {
        queries::jobs::active_by_kind(&self.db, kind).await
    }
}
