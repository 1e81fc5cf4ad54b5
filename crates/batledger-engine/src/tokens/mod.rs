// SPDX-FileCopyrightText: 2026 Batledger Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contribution token pool: reservation, redemption, and purchase.

pub mod manager;
pub mod vendor;

pub use manager::{TokenHold, TokenManager};
