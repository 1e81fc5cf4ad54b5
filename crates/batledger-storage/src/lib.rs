// SPDX-FileCopyrightText: 2026 Batledger Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the batledger rewards engine.
//!
//! All access goes through [`Database`], a single tokio-rusqlite background
//! connection, and the typed query modules in [`queries`]. The schema is
//! created by embedded refinery migrations on open.

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

pub use database::Database;
pub use models::{JobRow, NewToken};
