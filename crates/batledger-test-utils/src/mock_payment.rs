// SPDX-FileCopyrightText: 2026 Batledger Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock payment service with configurable order and vote behavior.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use batledger_core::traits::payment::OrderItemRequest;
use batledger_core::types::{
    ContributionType, Order, OrderItem, OrderStatus, SignedTokens, VoteCredential,
    WalletProvider, TOKEN_VALUE,
};
use batledger_core::{LedgerError, PaymentService};

#[derive(Default)]
struct Inner {
    orders: HashMap<String, Order>,
    order_counter: u32,
    unit_price: Option<f64>,
    /// Polls remaining before `get_order` reports Paid.
    paid_after_polls: u32,
    get_order_calls: u32,
    external_transaction_calls: u32,
    fail_external_transactions: u32,
    /// Blinded tokens submitted per (order_id, item_id).
    credentials: HashMap<(String, String), Vec<String>>,
    votes: Vec<(String, ContributionType, usize)>,
    vote_attempts: u32,
    fail_votes_for: HashMap<String, u32>,
}

/// Mock payment service.
///
/// Orders contain exactly one vote line item priced at [`TOKEN_VALUE`]
/// unless overridden. Votes and transaction reports are captured for
/// assertion; targeted failure counters let tests exercise retry envelopes.
pub struct MockPaymentService {
    inner: Arc<Mutex<Inner>>,
}

impl MockPaymentService {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    /// Override the per-vote unit price on future orders.
    pub async fn set_unit_price(&self, price: f64) {
        self.inner.lock().await.unit_price = Some(price);
    }

    /// Require `polls` GetOrder calls before an order reports Paid.
    pub async fn set_paid_after_polls(&self, polls: u32) {
        self.inner.lock().await.paid_after_polls = polls;
    }

    /// Fail the next `times` external transaction reports.
    pub async fn fail_external_transactions(&self, times: u32) {
        self.inner.lock().await.fail_external_transactions = times;
    }

    /// Fail the next `times` vote posts for one publisher.
    pub async fn fail_votes(&self, publisher_id: &str, times: u32) {
        self.inner
            .lock()
            .await
            .fail_votes_for
            .insert(publisher_id.to_string(), times);
    }

    /// Id of the most recently created order.
    pub async fn last_order_id(&self) -> Option<String> {
        let inner = self.inner.lock().await;
        if inner.order_counter == 0 {
            None
        } else {
            Some(format!("order-{}", inner.order_counter))
        }
    }

    pub async fn get_order_calls(&self) -> u32 {
        self.inner.lock().await.get_order_calls
    }

    pub async fn external_transaction_calls(&self) -> u32 {
        self.inner.lock().await.external_transaction_calls
    }

    /// Successfully posted votes as `(publisher_id, type, vote count)`.
    pub async fn votes(&self) -> Vec<(String, ContributionType, usize)> {
        self.inner.lock().await.votes.clone()
    }

    /// All vote posts including failed ones.
    pub async fn vote_attempts(&self) -> u32 {
        self.inner.lock().await.vote_attempts
    }
}

impl Default for MockPaymentService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentService for MockPaymentService {
    async fn create_order(&self, items: &[OrderItemRequest]) -> Result<Order, LedgerError> {
        let mut inner = self.inner.lock().await;
        inner.order_counter += 1;
        let price = inner.unit_price.unwrap_or(TOKEN_VALUE);
        let order = Order {
            id: format!("order-{}", inner.order_counter),
            status: OrderStatus::Pending,
            items: items
                .iter()
                .enumerate()
                .map(|(i, item)| OrderItem {
                    id: format!("item-{}", i + 1),
                    quantity: item.quantity,
                    price,
                })
                .collect(),
        };
        inner.orders.insert(order.id.clone(), order.clone());
        Ok(order)
    }

    async fn get_order(&self, order_id: &str) -> Result<Order, LedgerError> {
        let mut inner = self.inner.lock().await;
        inner.get_order_calls += 1;
        let paid = if inner.paid_after_polls > 0 {
            inner.paid_after_polls -= 1;
            false
        } else {
            true
        };
        let mut order = inner
            .orders
            .get(order_id)
            .cloned()
            .ok_or_else(|| LedgerError::Payment {
                message: format!("unknown order {order_id}"),
                source: None,
            })?;
        if paid {
            order.status = OrderStatus::Paid;
            inner.orders.insert(order.id.clone(), order.clone());
        }
        Ok(order)
    }

    async fn post_external_transaction(
        &self,
        order_id: &str,
        _transaction_id: &str,
        _provider: WalletProvider,
    ) -> Result<(), LedgerError> {
        let mut inner = self.inner.lock().await;
        inner.external_transaction_calls += 1;
        if inner.fail_external_transactions > 0 {
            inner.fail_external_transactions -= 1;
            return Err(LedgerError::Payment {
                message: format!("transaction report rejected for {order_id}"),
                source: None,
            });
        }
        Ok(())
    }

    async fn post_credentials(
        &self,
        order_id: &str,
        item_id: &str,
        blinded_tokens: &[String],
    ) -> Result<(), LedgerError> {
        let mut inner = self.inner.lock().await;
        inner.credentials.insert(
            (order_id.to_string(), item_id.to_string()),
            blinded_tokens.to_vec(),
        );
        Ok(())
    }

    async fn get_credentials(
        &self,
        order_id: &str,
        item_id: &str,
    ) -> Result<SignedTokens, LedgerError> {
        let inner = self.inner.lock().await;
        let blinded = inner
            .credentials
            .get(&(order_id.to_string(), item_id.to_string()))
            .ok_or_else(|| LedgerError::Payment {
                message: "credentials not yet signed".into(),
                source: None,
            })?;
        Ok(SignedTokens {
            signed_tokens: blinded.iter().map(|b| format!("signed-{b}")).collect(),
            batch_proof: "batch-proof".into(),
            public_key: "issuer-pk".into(),
        })
    }

    async fn post_publisher_votes(
        &self,
        publisher_id: &str,
        vote_type: ContributionType,
        votes: &[VoteCredential],
    ) -> Result<(), LedgerError> {
        let mut inner = self.inner.lock().await;
        inner.vote_attempts += 1;
        if let Some(remaining) = inner.fail_votes_for.get_mut(publisher_id) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(LedgerError::Payment {
                    message: format!("vote post rejected for {publisher_id}"),
                    source: None,
                });
            }
        }
        inner
            .votes
            .push((publisher_id.to_string(), vote_type, votes.len()));
        Ok(())
    }
}
