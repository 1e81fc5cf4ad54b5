// SPDX-FileCopyrightText: 2026 Batledger Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory publisher registry mock.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use batledger_core::types::{Publisher, WalletProvider};
use batledger_core::{LedgerError, PublisherService};

/// Mock publisher lookup backed by a map; unknown ids resolve to `None`.
pub struct MockPublisherService {
    publishers: Arc<Mutex<HashMap<String, Publisher>>>,
}

impl MockPublisherService {
    pub fn new() -> Self {
        Self {
            publishers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn add(&self, publisher: Publisher) {
        self.publishers
            .lock()
            .await
            .insert(publisher.id.clone(), publisher);
    }
}

impl Default for MockPublisherService {
    fn default() -> Self {
        Self::new()
    }
}

/// A registered publisher with a payout address for every provider, in the
/// form `{id}-{provider}`.
pub fn registered_publisher(id: &str) -> Publisher {
    let wallet_addresses = [
        WalletProvider::Uphold,
        WalletProvider::Gemini,
        WalletProvider::Bitflyer,
    ]
    .into_iter()
    .map(|provider| (provider, format!("{id}-{provider}")))
    .collect();
    Publisher {
        id: id.to_string(),
        registered: true,
        wallet_addresses,
    }
}

#[async_trait]
impl PublisherService for MockPublisherService {
    async fn get_publisher(&self, publisher_id: &str) -> Result<Option<Publisher>, LedgerError> {
        Ok(self.publishers.lock().await.get(publisher_id).cloned())
    }

    async fn get_publishers(
        &self,
        publisher_ids: &[String],
    ) -> Result<HashMap<String, Publisher>, LedgerError> {
        let publishers = self.publishers.lock().await;
        Ok(publisher_ids
            .iter()
            .filter_map(|id| publishers.get(id).map(|p| (id.clone(), p.clone())))
            .collect())
    }
}
