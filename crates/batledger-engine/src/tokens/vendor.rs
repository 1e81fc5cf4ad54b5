// SPDX-FileCopyrightText: 2026 Batledger Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SKU token purchase: a resumable, strictly forward state machine.
//!
//! Order → transfer → report transaction → poll paid → blind → claim →
//! unblind+store. State is persisted before every network call, so a crash
//! mid-purchase resumes at the last completed step and never re-spends
//! funds. Once the external transfer has happened, every remaining step
//! retries indefinitely: abandoning bought-and-paid-for tokens is not
//! acceptable.

use batledger_core::types::{ExternalTransfer, OrderStatus, TokenType, TOKEN_VALUE};
use batledger_core::traits::payment::OrderItemRequest;
use batledger_core::LedgerError;
use batledger_storage::NewToken;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::context::EngineContext;
use crate::delay::backoff_delay;
use crate::job_store::JobResume;

/// Job kind tag for token purchases.
pub const KIND: &str = "purchase-tokens";

/// SKU identifier for a contribution vote line item.
const VOTE_SKU: &str = "contribution-vote";

/// Forward-only purchase progression. Each step records exactly the data
/// needed to resume from that point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PurchaseStep {
    Pending,
    OrderCreated,
    TransferCompleted,
    TransactionSent,
    OrderPaid,
    TokensCreated,
    TokensClaimed,
    Complete,
}

/// Persisted purchase job state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseState {
    pub step: PurchaseStep,
    /// Requested BAT amount; quantity = ceil(amount / vote unit).
    pub amount: f64,
    pub quantity: u32,
    pub order_id: Option<String>,
    pub order_item_id: Option<String>,
    pub transfer: Option<ExternalTransfer>,
    /// Locally generated token secrets, set at TokensCreated.
    pub tokens: Vec<String>,
    pub blinded_tokens: Vec<String>,
}

impl PurchaseState {
    fn new(amount: f64) -> Self {
        Self {
            step: PurchaseStep::Pending,
            amount,
            quantity: (amount / TOKEN_VALUE).ceil() as u32,
            order_id: None,
            order_item_id: None,
            transfer: None,
            tokens: Vec::new(),
            blinded_tokens: Vec::new(),
        }
    }
}

/// Create a purchase job row without running it.
pub async fn initialize(ctx: &EngineContext, amount: f64) -> Result<String, LedgerError> {
    ctx.jobs.initialize(KIND, &PurchaseState::new(amount)).await
}

/// Run (or resume) a purchase job to its terminal state.
///
/// Returns the ids of the inserted tokens on success. A job that already
/// completed successfully returns an empty id list (the tokens are in the
/// pool; the caller reserves from the pool, not from this return value).
pub async fn run(ctx: &EngineContext, job_id: &str) -> Result<Vec<i64>, LedgerError> {
    let mut state = match ctx.jobs.load::<PurchaseState>(job_id).await? {
        JobResume::Active(state) => state,
        JobResume::Completed { error: None } => return Ok(Vec::new()),
        JobResume::Completed { error: Some(e) } => {
            return Err(LedgerError::Internal(format!("purchase job failed: {e}")));
        }
        JobResume::Missing => {
            return Err(LedgerError::Internal(format!("no purchase job {job_id}")));
        }
    };

    let mut inserted = Vec::new();
    loop {
        match state.step {
            PurchaseStep::Pending => {
                let items = [OrderItemRequest {
                    sku: VOTE_SKU.to_string(),
                    quantity: state.quantity,
                }];
                let order = match ctx.payment.create_order(&items).await {
                    Ok(order) => order,
                    Err(e) => return fail(ctx, job_id, e).await,
                };
                // Pricing contract: exactly one vote line item at the fixed
                // unit price. A mismatch is terminal, not retryable.
                if order.items.len() != 1 {
                    let e = LedgerError::InvalidOrder(format!(
                        "expected 1 item, got {}",
                        order.items.len()
                    ));
                    return fail(ctx, job_id, e).await;
                }
                let item = &order.items[0];
                if item.quantity != state.quantity
                    || (item.price - TOKEN_VALUE).abs() > f64::EPSILON
                {
                    let e = LedgerError::InvalidOrder(format!(
                        "unexpected quantity {} or unit price {}",
                        item.quantity, item.price
                    ));
                    return fail(ctx, job_id, e).await;
                }
                state.order_id = Some(order.id.clone());
                state.order_item_id = Some(item.id.clone());
                state.step = PurchaseStep::OrderCreated;
                ctx.jobs.save(job_id, &state).await?;
                debug!(job_id, order_id = %order.id, "order created");
            }
            PurchaseStep::OrderCreated => {
                let destination = ctx.wallet.contribution_token_order_address();
                let total = state.quantity as f64 * TOKEN_VALUE;
                let order_id = state.order_id.clone().unwrap_or_default();
                let transfer = match ctx
                    .wallet
                    .transfer_bat(&destination, total, Some(&order_id))
                    .await
                {
                    Ok(Some(transfer)) => transfer,
                    Ok(None) => {
                        let e = LedgerError::Wallet(
                            "no external wallet available for token order".into(),
                        );
                        return fail(ctx, job_id, e).await;
                    }
                    Err(e) => return fail(ctx, job_id, e).await,
                };
                state.transfer = Some(transfer);
                state.step = PurchaseStep::TransferCompleted;
                ctx.jobs.save(job_id, &state).await?;
                info!(job_id, amount = total, "order funds transferred");
            }
            PurchaseStep::TransferCompleted => {
                // Funds have left the user's wallet: from here on, retry forever.
                let order_id = state.order_id.clone().unwrap_or_default();
                let transfer = state.transfer.clone().ok_or_else(|| {
                    LedgerError::InvalidState("transfer missing after TransferCompleted".into())
                })?;
                let mut retry = 0;
                loop {
                    match ctx
                        .payment
                        .post_external_transaction(
                            &order_id,
                            &transfer.transaction_id,
                            transfer.provider,
                        )
                        .await
                    {
                        Ok(()) => break,
                        Err(e) => {
                            warn!(job_id, retry, error = %e, "transaction report failed");
                            tokio::time::sleep(backoff_delay(&ctx.config, retry)).await;
                            retry += 1;
                        }
                    }
                }
                state.step = PurchaseStep::TransactionSent;
                ctx.jobs.save(job_id, &state).await?;
            }
            PurchaseStep::TransactionSent => {
                let order_id = state.order_id.clone().unwrap_or_default();
                let mut retry = 0;
                loop {
                    match ctx.payment.get_order(&order_id).await {
                        Ok(order) if order.status == OrderStatus::Paid => break,
                        Ok(_) => {
                            debug!(job_id, retry, "order not yet paid");
                        }
                        Err(e) => {
                            warn!(job_id, retry, error = %e, "order poll failed");
                        }
                    }
                    tokio::time::sleep(backoff_delay(&ctx.config, retry)).await;
                    retry += 1;
                }
                state.step = PurchaseStep::OrderPaid;
                ctx.jobs.save(job_id, &state).await?;
                info!(job_id, order_id = %order_id, "order paid");
            }
            PurchaseStep::OrderPaid => {
                let pair = match ctx.crypto.create_blinded_tokens(state.quantity as usize) {
                    Ok(pair) => pair,
                    Err(e) => return fail(ctx, job_id, e).await,
                };
                state.tokens = pair.tokens;
                state.blinded_tokens = pair.blinded_tokens;
                state.step = PurchaseStep::TokensCreated;
                ctx.jobs.save(job_id, &state).await?;
            }
            PurchaseStep::TokensCreated => {
                let order_id = state.order_id.clone().unwrap_or_default();
                let item_id = state.order_item_id.clone().unwrap_or_default();
                let mut retry = 0;
                loop {
                    match ctx
                        .payment
                        .post_credentials(&order_id, &item_id, &state.blinded_tokens)
                        .await
                    {
                        Ok(()) => break,
                        Err(e) => {
                            warn!(job_id, retry, error = %e, "credential claim failed");
                            tokio::time::sleep(backoff_delay(&ctx.config, retry)).await;
                            retry += 1;
                        }
                    }
                }
                state.step = PurchaseStep::TokensClaimed;
                ctx.jobs.save(job_id, &state).await?;
            }
            PurchaseStep::TokensClaimed => {
                let order_id = state.order_id.clone().unwrap_or_default();
                let item_id = state.order_item_id.clone().unwrap_or_default();
                let mut retry = 0;
                let (unblinded, public_key) = loop {
                    match ctx.payment.get_credentials(&order_id, &item_id).await {
                        Ok(signed) => {
                            // A proof that does not verify usually means the
                            // batch is not ready yet; retry rather than abort.
                            match ctx.crypto.unblind_tokens(
                                &state.tokens,
                                &state.blinded_tokens,
                                &signed.signed_tokens,
                                &signed.batch_proof,
                                &signed.public_key,
                            ) {
                                Some(unblinded) => break (unblinded, signed.public_key),
                                None => {
                                    warn!(job_id, retry, "batch proof did not verify");
                                }
                            }
                        }
                        Err(e) => {
                            warn!(job_id, retry, error = %e, "signed token fetch failed");
                        }
                    }
                    tokio::time::sleep(backoff_delay(&ctx.config, retry)).await;
                    retry += 1;
                };
                let new_tokens: Vec<NewToken> = unblinded
                    .into_iter()
                    .map(|unblinded_token| NewToken {
                        value: TOKEN_VALUE,
                        unblinded_token,
                        public_key: public_key.clone(),
                        expires_at: None,
                    })
                    .collect();
                inserted = ctx.tokens.insert_tokens(new_tokens, TokenType::Sku).await?;
                state.step = PurchaseStep::Complete;
                ctx.jobs.save(job_id, &state).await?;
                info!(job_id, count = inserted.len(), "purchased tokens stored");
            }
            PurchaseStep::Complete => {
                ctx.jobs.complete(job_id).await?;
                return Ok(inserted);
            }
        }
    }
}

async fn fail(
    ctx: &EngineContext,
    job_id: &str,
    error: LedgerError,
) -> Result<Vec<i64>, LedgerError> {
    ctx.jobs.fail(job_id, &error.to_string()).await?;
    Err(error)
}
