// SPDX-FileCopyrightText: 2026 Batledger Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Auto-contribute: weighting, vote allocation, and the monthly AC job.

pub mod calculator;
pub mod processor;
