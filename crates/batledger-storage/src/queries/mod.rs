// SPDX-FileCopyrightText: 2026 Batledger Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules, one per table group.

pub mod activity;
pub mod contributions;
pub mod jobs;
pub mod pending;
pub mod recurring;
pub mod state;
pub mod tokens;
