// SPDX-FileCopyrightText: 2026 Batledger Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock custodial wallet with transfer capture.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use batledger_core::types::{ExternalTransfer, WalletProvider};
use batledger_core::{ExternalWalletManager, LedgerError};

#[derive(Default)]
struct Inner {
    balance: Option<f64>,
    /// Successful transfers as `(destination, amount, description)`.
    transfers: Vec<(String, f64, Option<String>)>,
    transfer_attempts: u32,
    fail_transfers: u32,
}

/// Mock external wallet.
///
/// Every successful transfer is recorded; `fail_transfers` rejects the next
/// N attempts with a transient wallet error.
pub struct MockExternalWallet {
    provider: Option<WalletProvider>,
    inner: Arc<Mutex<Inner>>,
}

impl MockExternalWallet {
    /// A disconnected wallet (no provider).
    pub fn new() -> Self {
        Self {
            provider: None,
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    /// A connected wallet for `provider`.
    pub fn connected(provider: WalletProvider) -> Self {
        Self {
            provider: Some(provider),
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    pub async fn set_balance(&self, balance: Option<f64>) {
        self.inner.lock().await.balance = balance;
    }

    /// Fail the next `times` transfer attempts.
    pub async fn fail_transfers(&self, times: u32) {
        self.inner.lock().await.fail_transfers = times;
    }

    /// Successful transfers as `(destination, amount, description)`.
    pub async fn transfers(&self) -> Vec<(String, f64, Option<String>)> {
        self.inner.lock().await.transfers.clone()
    }

    /// All transfer calls, including rejected ones.
    pub async fn transfer_attempts(&self) -> u32 {
        self.inner.lock().await.transfer_attempts
    }

    /// Poll until a transfer to `destination` lands; returns its amount.
    ///
    /// Intended for paused-clock tests waiting on a spawned background job.
    pub async fn wait_for_transfer_to(&self, destination: &str) -> f64 {
        loop {
            if let Some((_, amount, _)) = self
                .inner
                .lock()
                .await
                .transfers
                .iter()
                .find(|(dest, _, _)| dest == destination)
            {
                return *amount;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }
}

impl Default for MockExternalWallet {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExternalWalletManager for MockExternalWallet {
    fn provider(&self) -> Option<WalletProvider> {
        self.provider
    }

    async fn get_balance(&self) -> Result<Option<f64>, LedgerError> {
        if self.provider.is_none() {
            return Ok(None);
        }
        Ok(self.inner.lock().await.balance)
    }

    async fn transfer_bat(
        &self,
        destination: &str,
        amount: f64,
        description: Option<&str>,
    ) -> Result<Option<ExternalTransfer>, LedgerError> {
        let mut inner = self.inner.lock().await;
        inner.transfer_attempts += 1;
        if inner.fail_transfers > 0 {
            inner.fail_transfers -= 1;
            return Err(LedgerError::Wallet("transfer rejected".into()));
        }
        let Some(provider) = self.provider else {
            return Ok(None);
        };
        inner.transfers.push((
            destination.to_string(),
            amount,
            description.map(str::to_string),
        ));
        let transaction_id = format!("tx-{}", inner.transfers.len());
        Ok(Some(ExternalTransfer {
            provider,
            transaction_id,
        }))
    }

    fn contribution_fee_address(&self) -> String {
        "fee-address".into()
    }

    fn contribution_token_order_address(&self) -> String {
        "order-address".into()
    }
}
