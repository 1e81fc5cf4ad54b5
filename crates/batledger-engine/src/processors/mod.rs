// SPDX-FileCopyrightText: 2026 Batledger Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contribution processors: the send paths and batch jobs behind the router.

pub mod external;
pub mod fee;
pub mod pending;
pub mod recurring;
pub mod token;
