// SPDX-FileCopyrightText: 2026 Batledger Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delay and backoff generation.
//!
//! Two flavors: exponential backoff for retry envelopes (base doubling up to
//! a cap), and jittered delays with a given expected value for spacing out
//! background sends. Both are pure given a [`RandomSource`].

use std::time::Duration;

use crate::context::{EngineConfig, RandomSource};

/// Exponential backoff delay for the given retry count: `base * 2^retry`,
/// capped at `backoff_cap`.
pub fn backoff_delay(config: &EngineConfig, retry_count: u32) -> Duration {
    let base = config.backoff_base.as_secs_f64();
    let cap = config.backoff_cap.as_secs_f64();
    let exp = 2f64.powi(retry_count.min(31) as i32);
    Duration::from_secs_f64((base * exp).min(cap))
}

/// Jittered delay drawn uniformly from `[0, 2 * expected)`, preserving the
/// expected value.
pub fn jittered_delay(random: &dyn RandomSource, expected: Duration) -> Duration {
    Duration::from_secs_f64(expected.as_secs_f64() * 2.0 * random.next_f64())
}
