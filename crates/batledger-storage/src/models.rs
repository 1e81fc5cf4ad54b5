// SPDX-FileCopyrightText: 2026 Batledger Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row types for storage entities that have no cross-crate domain type.
//!
//! Domain types shared across trait boundaries live in
//! `batledger-core::types` and are re-exported here for convenience.

pub use batledger_core::types::{
    ContributionToken, PendingContribution, PublisherActivity, RecurringContribution,
};

/// A persisted job row.
///
/// `state` is an opaque serialized blob; the engine's job store owns the
/// mapping from `kind` to a concrete state struct. A row with
/// `completed_at` set is excluded from resumption scans.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRow {
    pub id: String,
    pub kind: String,
    pub state: String,
    pub error: Option<String>,
    pub created_at: String,
    pub completed_at: Option<String>,
}

/// A token to be inserted; ids are assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewToken {
    pub value: f64,
    pub unblinded_token: String,
    pub public_key: String,
    pub expires_at: Option<String>,
}
