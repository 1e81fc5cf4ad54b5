// SPDX-FileCopyrightText: 2026 Batledger Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Engine key/value state (reconcile stamp and similar scalars).

use batledger_core::LedgerError;
use rusqlite::params;

use crate::database::Database;

/// Read a state value.
pub async fn get(db: &Database, key: &str) -> Result<Option<String>, LedgerError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT value FROM engine_state WHERE key = ?1",
                params![key],
                |row| row.get(0),
            );
            match result {
                Ok(value) => Ok(Some(value)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Write (or overwrite) a state value.
pub async fn set(db: &Database, key: &str, value: &str) -> Result<(), LedgerError> {
    let (key, value) = (key.to_string(), value.to_string());
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO engine_state (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
