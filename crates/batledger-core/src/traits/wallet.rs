// SPDX-FileCopyrightText: 2026 Batledger Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! External custodial wallet trait (Uphold, Gemini, bitFlyer).

use async_trait::async_trait;

use crate::error::LedgerError;
use crate::types::{ExternalTransfer, WalletProvider};

/// Access to the user's linked custodial wallet, if any.
#[async_trait]
pub trait ExternalWalletManager: Send + Sync {
    /// The provider of the currently linked wallet, or `None` if not linked.
    fn provider(&self) -> Option<WalletProvider>;

    /// Whether the user has a linked external wallet.
    fn has_external_wallet(&self) -> bool {
        self.provider().is_some()
    }

    /// Current BAT balance, or `None` if unavailable.
    async fn get_balance(&self) -> Result<Option<f64>, LedgerError>;

    /// Transfer BAT to a destination address.
    ///
    /// Returns `None` when no wallet is linked or the provider does not
    /// support the transfer; callers treat that as a hard failure when funds
    /// are required.
    async fn transfer_bat(
        &self,
        destination: &str,
        amount: f64,
        description: Option<&str>,
    ) -> Result<Option<ExternalTransfer>, LedgerError>;

    /// Address that receives the 5% platform contribution fee.
    fn contribution_fee_address(&self) -> String;

    /// Address that funds contribution token orders.
    fn contribution_token_order_address(&self) -> String;
}
