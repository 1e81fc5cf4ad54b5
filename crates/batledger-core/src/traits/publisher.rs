// SPDX-FileCopyrightText: 2026 Batledger Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Publisher lookup trait.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::LedgerError;
use crate::types::Publisher;

/// Lookup of publisher registration and payout addresses.
#[async_trait]
pub trait PublisherService: Send + Sync {
    /// Fetch one publisher, or `None` if unknown.
    async fn get_publisher(&self, publisher_id: &str) -> Result<Option<Publisher>, LedgerError>;

    /// Fetch a batch of publishers; absent ids are simply missing from the map.
    async fn get_publishers(
        &self,
        publisher_ids: &[String],
    ) -> Result<HashMap<String, Publisher>, LedgerError>;
}
