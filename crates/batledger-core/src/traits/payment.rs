// SPDX-FileCopyrightText: 2026 Batledger Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Payment service trait for orders, token credentials, and vote redemption.

use async_trait::async_trait;

use crate::error::LedgerError;
use crate::types::{
    ContributionType, Order, SignedTokens, VoteCredential, WalletProvider,
};

/// A requested line item when creating an order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItemRequest {
    pub sku: String,
    pub quantity: u32,
}

/// The BAT payment service.
///
/// All calls are network I/O and may fail transiently; callers own the
/// retry/backoff envelope.
#[async_trait]
pub trait PaymentService: Send + Sync {
    /// Create an order for the given line items.
    async fn create_order(&self, items: &[OrderItemRequest]) -> Result<Order, LedgerError>;

    /// Fetch the current state of an order.
    async fn get_order(&self, order_id: &str) -> Result<Order, LedgerError>;

    /// Report an external wallet transaction so the service can verify payment.
    async fn post_external_transaction(
        &self,
        order_id: &str,
        transaction_id: &str,
        provider: WalletProvider,
    ) -> Result<(), LedgerError>;

    /// Submit blinded tokens for signing against a paid order item.
    async fn post_credentials(
        &self,
        order_id: &str,
        item_id: &str,
        blinded_tokens: &[String],
    ) -> Result<(), LedgerError>;

    /// Fetch the signed token batch for a previously submitted claim.
    ///
    /// May fail while the batch is still being signed; treated as retryable.
    async fn get_credentials(
        &self,
        order_id: &str,
        item_id: &str,
    ) -> Result<SignedTokens, LedgerError>;

    /// Redeem signed token votes for a publisher.
    async fn post_publisher_votes(
        &self,
        publisher_id: &str,
        vote_type: ContributionType,
        votes: &[VoteCredential],
    ) -> Result<(), LedgerError>;
}
