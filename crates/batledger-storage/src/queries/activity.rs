// SPDX-FileCopyrightText: 2026 Batledger Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Publisher activity accumulator.
//!
//! Visits and durations only grow within a cycle; the scheduler snapshots
//! and resets the whole table at each contribution cycle boundary.

use batledger_core::types::PublisherActivity;
use batledger_core::LedgerError;
use rusqlite::params;

use crate::database::Database;

/// Record one visit with its duration for a publisher.
pub async fn record_visit(
    db: &Database,
    publisher_id: &str,
    duration_secs: f64,
) -> Result<(), LedgerError> {
    let publisher_id = publisher_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO publisher_activity (publisher_id, visits, duration_secs)
                 VALUES (?1, 1, ?2)
                 ON CONFLICT(publisher_id) DO UPDATE SET
                     visits = visits + 1,
                     duration_secs = duration_secs + excluded.duration_secs",
                params![publisher_id, duration_secs],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Current-cycle activity for all publishers.
pub async fn list(db: &Database) -> Result<Vec<PublisherActivity>, LedgerError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT publisher_id, visits, duration_secs FROM publisher_activity
                 ORDER BY publisher_id ASC",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(PublisherActivity {
                    publisher_id: row.get(0)?,
                    visits: row.get(1)?,
                    duration_secs: row.get(2)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Atomically read and clear the accumulator (cycle boundary).
pub async fn take_all(db: &Database) -> Result<Vec<PublisherActivity>, LedgerError> {
    db.connection()
        .call(|conn| {
            let tx = conn.transaction()?;
            let items = {
                let mut stmt = tx.prepare(
                    "SELECT publisher_id, visits, duration_secs FROM publisher_activity
                     ORDER BY publisher_id ASC",
                )?;
                let rows = stmt.query_map([], |row| {
                    Ok(PublisherActivity {
                        publisher_id: row.get(0)?,
                        visits: row.get(1)?,
                        duration_secs: row.get(2)?,
                    })
                })?;
                rows.collect::<Result<Vec<_>, _>>()?
            };
            tx.execute("DELETE FROM publisher_activity", [])?;
            tx.commit()?;
            Ok(items)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn visits_and_durations_accumulate() {
        let db = Database::open_in_memory().await.unwrap();
        record_visit(&db, "brave.com", 10.0).await.unwrap();
        record_visit(&db, "brave.com", 4.0).await.unwrap();
        record_visit(&db, "any.org", 10.0).await.unwrap();

        let activity = list(&db).await.unwrap();
        assert_eq!(activity.len(), 2);
        let brave = activity.iter().find(|a| a.publisher_id == "brave.com").unwrap();
        assert_eq!(brave.visits, 2);
        assert!((brave.duration_secs - 14.0).abs() < 1e-10);
    }

    #[tokio::test]
    async fn take_all_resets_the_cycle() {
        let db = Database::open_in_memory().await.unwrap();
        record_visit(&db, "brave.com", 10.0).await.unwrap();

        let taken = take_all(&db).await.unwrap();
        assert_eq!(taken.len(), 1);
        assert!(list(&db).await.unwrap().is_empty());

        // Fresh accumulation starts from zero.
        record_visit(&db, "brave.com", 3.0).await.unwrap();
        let activity = list(&db).await.unwrap();
        assert_eq!(activity[0].visits, 1);
        assert!((activity[0].duration_secs - 3.0).abs() < 1e-10);
    }
}
