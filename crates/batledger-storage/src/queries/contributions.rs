// SPDX-FileCopyrightText: 2026 Batledger Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Completed contribution records.

use batledger_core::types::Contribution;
use batledger_core::LedgerError;
use rusqlite::params;

use crate::database::Database;

/// Record a successfully completed contribution.
pub async fn insert(
    db: &Database,
    id: &str,
    contribution: &Contribution,
) -> Result<(), LedgerError> {
    let id = id.to_string();
    let contribution_type = contribution.contribution_type.to_string();
    let publisher_id = contribution.publisher_id.clone();
    let amount = contribution.amount;
    let source = contribution.source.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO contributions (id, contribution_type, publisher_id, amount, source)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id, contribution_type, publisher_id, amount, source],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Total BAT contributed to one publisher across all completed contributions.
pub async fn publisher_total(db: &Database, publisher_id: &str) -> Result<f64, LedgerError> {
    let publisher_id = publisher_id.to_string();
    db.connection()
        .call(move |conn| {
            let total: f64 = conn.query_row(
                "SELECT COALESCE(SUM(amount), 0.0) FROM contributions WHERE publisher_id = ?1",
                params![publisher_id],
                |row| row.get(0),
            )?;
            Ok(total)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Number of completed contributions recorded.
pub async fn count(db: &Database) -> Result<i64, LedgerError> {
    db.connection()
        .call(|conn| {
            let n: i64 =
                conn.query_row("SELECT COUNT(*) FROM contributions", [], |row| row.get(0))?;
            Ok(n)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
