// SPDX-FileCopyrightText: 2026 Batledger Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed user preferences for tests.

use batledger_core::UserPrefs;

/// Immutable auto-contribute preferences.
#[derive(Debug, Clone)]
pub struct StaticPrefs {
    pub enabled: bool,
    pub min_visits: i64,
    pub min_duration_secs: f64,
    pub amount: f64,
}

impl Default for StaticPrefs {
    fn default() -> Self {
        Self {
            enabled: true,
            min_visits: 1,
            min_duration_secs: 8.0,
            amount: 20.0,
        }
    }
}

impl UserPrefs for StaticPrefs {
    fn ac_enabled(&self) -> bool {
        self.enabled
    }

    fn ac_minimum_visits(&self) -> i64 {
        self.min_visits
    }

    fn ac_minimum_duration_secs(&self) -> f64 {
        self.min_duration_secs
    }

    fn ac_amount(&self) -> f64 {
        self.amount
    }
}
