// SPDX-FileCopyrightText: 2026 Batledger Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recurring contribution (monthly tip) rows.

use batledger_core::types::RecurringContribution;
use batledger_core::LedgerError;
use rusqlite::params;

use crate::database::Database;

/// Create or update a recurring tip for a publisher.
pub async fn upsert(db: &Database, publisher_id: &str, amount: f64) -> Result<(), LedgerError> {
    let publisher_id = publisher_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO recurring_contributions (publisher_id, amount)
                 VALUES (?1, ?2)
                 ON CONFLICT(publisher_id) DO UPDATE SET
                     amount = excluded.amount,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![publisher_id, amount],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Delete a recurring tip.
pub async fn delete(db: &Database, publisher_id: &str) -> Result<(), LedgerError> {
    let publisher_id = publisher_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "DELETE FROM recurring_contributions WHERE publisher_id = ?1",
                params![publisher_id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All recurring tips, stable publisher order.
pub async fn list(db: &Database) -> Result<Vec<RecurringContribution>, LedgerError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT publisher_id, amount FROM recurring_contributions
                 ORDER BY publisher_id ASC",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(RecurringContribution {
                    publisher_id: row.get(0)?,
                    amount: row.get(1)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}
