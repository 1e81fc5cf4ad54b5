// SPDX-FileCopyrightText: 2026 Batledger Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User preference trait for auto-contribute settings.

/// Auto-contribute preferences owned by the embedding application.
pub trait UserPrefs: Send + Sync {
    /// Whether auto-contribute is enabled at all.
    fn ac_enabled(&self) -> bool;

    /// Minimum visit count for a publisher to qualify.
    fn ac_minimum_visits(&self) -> i64;

    /// Minimum cumulative duration (seconds) for a publisher to qualify.
    fn ac_minimum_duration_secs(&self) -> f64;

    /// Monthly auto-contribute budget in BAT.
    fn ac_amount(&self) -> f64;
}
