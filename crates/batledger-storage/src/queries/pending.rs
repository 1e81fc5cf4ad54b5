// SPDX-FileCopyrightText: 2026 Batledger Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pending contribution rows: tips deferred until the publisher can be paid.

use batledger_core::types::PendingContribution;
use batledger_core::LedgerError;
use rusqlite::params;

use crate::database::Database;

/// Save a contribution that could not reach its publisher.
pub async fn insert(db: &Database, publisher_id: &str, amount: f64) -> Result<i64, LedgerError> {
    let publisher_id = publisher_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO pending_contributions (publisher_id, amount) VALUES (?1, ?2)",
                params![publisher_id, amount],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Re-save a previously claimed pending row (a failed send keeps its
/// original creation time so expiry still counts from the first deferral).
pub async fn reinsert(db: &Database, item: &PendingContribution) -> Result<(), LedgerError> {
    let publisher_id = item.publisher_id.clone();
    let amount = item.amount;
    let created_at = item.created_at.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO pending_contributions (publisher_id, amount, created_at)
                 VALUES (?1, ?2, ?3)",
                params![publisher_id, amount, created_at],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Atomically read and delete all pending rows.
///
/// A processing pass owns every row it claims; failed sends are re-enqueued
/// individually via [`reinsert`].
pub async fn claim_all(db: &Database) -> Result<Vec<PendingContribution>, LedgerError> {
    db.connection()
        .call(|conn| {
            let tx = conn.transaction()?;
            let items = {
                let mut stmt = tx.prepare(
                    "SELECT id, publisher_id, amount, created_at
                     FROM pending_contributions ORDER BY id ASC",
                )?;
                let rows = stmt.query_map([], |row| {
                    Ok(PendingContribution {
                        id: row.get(0)?,
                        publisher_id: row.get(1)?,
                        amount: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                })?;
                rows.collect::<Result<Vec<_>, _>>()?
            };
            tx.execute("DELETE FROM pending_contributions", [])?;
            tx.commit()?;
            Ok(items)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Number of pending rows currently saved.
pub async fn count(db: &Database) -> Result<i64, LedgerError> {
    db.connection()
        .call(|conn| {
            let n: i64 = conn.query_row(
                "SELECT COUNT(*) FROM pending_contributions",
                [],
                |row| row.get(0),
            )?;
            Ok(n)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
