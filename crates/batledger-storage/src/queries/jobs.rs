// SPDX-FileCopyrightText: 2026 Batledger Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable job rows backing the engine's resumable jobs.
//!
//! A job row is created before its first step runs, its state blob is
//! rewritten after every step, and it is marked completed (optionally with a
//! terminal error) exactly once. Active-job scans drive crash recovery.

use batledger_core::LedgerError;
use rusqlite::params;

use crate::database::Database;
use crate::models::JobRow;

fn row_to_job(row: &rusqlite::Row<'_>) -> Result<JobRow, rusqlite::Error> {
    Ok(JobRow {
        id: row.get(0)?,
        kind: row.get(1)?,
        state: row.get(2)?,
        error: row.get(3)?,
        created_at: row.get(4)?,
        completed_at: row.get(5)?,
    })
}

const JOB_COLUMNS: &str = "id, kind, state, error, created_at, completed_at";

/// Persist a new job row.
pub async fn create(
    db: &Database,
    id: &str,
    kind: &str,
    state: &str,
) -> Result<(), LedgerError> {
    let (id, kind, state) = (id.to_string(), kind.to_string(), state.to_string());
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO jobs (id, kind, state) VALUES (?1, ?2, ?3)",
                params![id, kind, state],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Rewrite a job's state blob.
pub async fn save_state(db: &Database, id: &str, state: &str) -> Result<(), LedgerError> {
    let (id, state) = (id.to_string(), state.to_string());
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE jobs SET state = ?1 WHERE id = ?2 AND completed_at IS NULL",
                params![state, id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Mark a job completed, optionally carrying a terminal error.
pub async fn complete(
    db: &Database,
    id: &str,
    error: Option<&str>,
) -> Result<(), LedgerError> {
    let id = id.to_string();
    let error = error.map(str::to_string);
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE jobs
                 SET completed_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now'), error = ?1
                 WHERE id = ?2 AND completed_at IS NULL",
                params![error, id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch one job row.
pub async fn get(db: &Database, id: &str) -> Result<Option<JobRow>, LedgerError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                &format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = ?1"),
                params![id],
                |row| row_to_job(row),
            );
            match result {
                Ok(job) => Ok(Some(job)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All incomplete jobs of a kind, oldest first.
pub async fn active_by_kind(db: &Database, kind: &str) -> Result<Vec<JobRow>, LedgerError> {
    let kind = kind.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {JOB_COLUMNS} FROM jobs
                 WHERE kind = ?1 AND completed_at IS NULL
                 ORDER BY created_at ASC, id ASC"
            ))?;
            let rows = stmt.query_map(params![kind], |row| row_to_job(row))?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lifecycle_create_save_complete() {
        let db = Database::open_in_memory().await.unwrap();
        create(&db, "job-1", "auto-contribute", "{\"step\":0}")
            .await
            .unwrap();

        save_state(&db, "job-1", "{\"step\":1}").await.unwrap();
        let job = get(&db, "job-1").await.unwrap().unwrap();
        assert_eq!(job.state, "{\"step\":1}");
        assert!(job.completed_at.is_none());

        complete(&db, "job-1", None).await.unwrap();
        let job = get(&db, "job-1").await.unwrap().unwrap();
        assert!(job.completed_at.is_some());
        assert!(job.error.is_none());
    }

    #[tokio::test]
    async fn completed_jobs_excluded_from_active_scan() {
        let db = Database::open_in_memory().await.unwrap();
        create(&db, "a", "purchase-tokens", "{}").await.unwrap();
        create(&db, "b", "purchase-tokens", "{}").await.unwrap();
        create(&db, "c", "contribution-fee", "{}").await.unwrap();
        complete(&db, "a", Some("invalid state")).await.unwrap();

        let active = active_by_kind(&db, "purchase-tokens").await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, "b");
    }

    #[tokio::test]
    async fn complete_with_error_records_reason() {
        let db = Database::open_in_memory().await.unwrap();
        create(&db, "bad", "auto-contribute", "not json").await.unwrap();
        complete(&db, "bad", Some("invalid state")).await.unwrap();
        let job = get(&db, "bad").await.unwrap().unwrap();
        assert_eq!(job.error.as_deref(), Some("invalid state"));
    }

    #[tokio::test]
    async fn save_after_complete_is_a_no_op() {
        let db = Database::open_in_memory().await.unwrap();
        create(&db, "done", "contribution", "{\"v\":1}").await.unwrap();
        complete(&db, "done", None).await.unwrap();
        save_state(&db, "done", "{\"v\":2}").await.unwrap();
        let job = get(&db, "done").await.unwrap().unwrap();
        assert_eq!(job.state, "{\"v\":1}");
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let db = Database::open_in_memory().await.unwrap();
        assert!(get(&db, "nope").await.unwrap().is_none());
    }
}
