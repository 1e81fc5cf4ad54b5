// SPDX-FileCopyrightText: 2026 Batledger Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contribution token pool queries.
//!
//! Tokens are append-only until redeemed: a token is created once (purchase
//! or grant), then marked redeemed exactly once with the contribution that
//! spent it. Reservation is an in-process concern of the engine's token
//! manager and is never persisted here.

use batledger_core::types::{ContributionToken, TokenType};
use batledger_core::LedgerError;
use rusqlite::params;

use crate::database::Database;
use crate::models::NewToken;

fn row_to_token(row: &rusqlite::Row<'_>) -> Result<ContributionToken, rusqlite::Error> {
    let token_type: String = row.get(1)?;
    Ok(ContributionToken {
        id: row.get(0)?,
        token_type: token_type
            .parse()
            .map_err(|_| rusqlite::Error::InvalidQuery)?,
        value: row.get(2)?,
        unblinded_token: row.get(3)?,
        public_key: row.get(4)?,
        expires_at: row.get(5)?,
    })
}

const TOKEN_COLUMNS: &str =
    "id, token_type, value, unblinded_token, public_key, expires_at";

/// Insert a batch of freshly acquired tokens in one transaction, alongside a
/// metadata batch record. Returns the assigned token ids in insertion order.
pub async fn insert_tokens(
    db: &Database,
    tokens: Vec<NewToken>,
    token_type: TokenType,
) -> Result<Vec<i64>, LedgerError> {
    let batch_id = uuid::Uuid::new_v4().to_string();
    let type_tag = token_type.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO token_batches (id, token_type, token_count) VALUES (?1, ?2, ?3)",
                params![batch_id, type_tag, tokens.len() as i64],
            )?;
            let mut ids = Vec::with_capacity(tokens.len());
            for token in &tokens {
                tx.execute(
                    "INSERT INTO contribution_tokens
                     (token_type, value, unblinded_token, public_key, batch_id, expires_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        type_tag,
                        token.value,
                        token.unblinded_token,
                        token.public_key,
                        batch_id,
                        token.expires_at,
                    ],
                )?;
                ids.push(tx.last_insert_rowid());
            }
            tx.commit()?;
            Ok(ids)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All unredeemed, unexpired tokens of a type, oldest first.
pub async fn spendable_tokens(
    db: &Database,
    token_type: TokenType,
) -> Result<Vec<ContributionToken>, LedgerError> {
    let type_tag = token_type.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TOKEN_COLUMNS} FROM contribution_tokens
                 WHERE token_type = ?1 AND redeemed_at IS NULL
                   AND (expires_at IS NULL
                        OR expires_at > strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
                 ORDER BY id ASC"
            ))?;
            let rows = stmt.query_map(params![type_tag], |row| row_to_token(row))?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch unredeemed tokens by exact id set (used to re-reserve after a crash).
pub async fn tokens_by_ids(
    db: &Database,
    ids: Vec<i64>,
) -> Result<Vec<ContributionToken>, LedgerError> {
    db.connection()
        .call(move |conn| {
            let placeholders = ids
                .iter()
                .map(|_| "?")
                .collect::<Vec<_>>()
                .join(", ");
            let mut stmt = conn.prepare(&format!(
                "SELECT {TOKEN_COLUMNS} FROM contribution_tokens
                 WHERE redeemed_at IS NULL AND id IN ({placeholders})
                 ORDER BY id ASC"
            ))?;
            let rows = stmt.query_map(
                rusqlite::params_from_iter(ids.iter()),
                |row| row_to_token(row),
            )?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Mark tokens redeemed by the given contribution. Idempotent per token:
/// an already redeemed token is left untouched.
pub async fn mark_tokens_redeemed(
    db: &Database,
    ids: Vec<i64>,
    contribution_id: &str,
) -> Result<(), LedgerError> {
    let contribution_id = contribution_id.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            for id in &ids {
                tx.execute(
                    "UPDATE contribution_tokens
                     SET redeemed_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now'),
                         contribution_id = ?1
                     WHERE id = ?2 AND redeemed_at IS NULL",
                    params![contribution_id, id],
                )?;
            }
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
