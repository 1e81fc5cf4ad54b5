// SPDX-FileCopyrightText: 2026 Batledger Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Token-funded contribution sends.
//!
//! A send reserves tokens, signs one redemption credential per token, posts
//! them as publisher votes, and only then marks the tokens redeemed. Any
//! failure before redemption drops the hold and the tokens return to the
//! pool untouched.

use batledger_core::types::{
    Contribution, ContributionSource, ContributionType, TokenType, VoteCredential,
};
use batledger_core::LedgerError;
use batledger_storage::queries;
use tracing::{debug, info};

use crate::context::EngineContext;
use crate::tokens::TokenHold;

/// Reserve tokens of `token_type` covering `amount` and send them as votes.
pub async fn send(
    ctx: &EngineContext,
    contribution_type: ContributionType,
    publisher_id: &str,
    amount: f64,
    token_type: TokenType,
) -> Result<(), LedgerError> {
    check_publisher(ctx, publisher_id).await?;
    let hold = ctx.tokens.reserve_tokens(token_type, amount).await?;
    if hold.total_value() + 1e-9 < amount {
        // The hold drops here and releases whatever it grabbed.
        return Err(LedgerError::InsufficientFunds);
    }
    send_with_hold(ctx, contribution_type, publisher_id, hold).await
}

/// Send an already-reserved hold as votes for one publisher.
///
/// Consumes the hold: on success its tokens are redeemed; on failure it is
/// dropped and the tokens are released (back to a parent hold, if split).
pub async fn send_with_hold(
    ctx: &EngineContext,
    contribution_type: ContributionType,
    publisher_id: &str,
    hold: TokenHold,
) -> Result<(), LedgerError> {
    check_publisher(ctx, publisher_id).await?;
    let tokens = hold.tokens();
    if tokens.is_empty() {
        return Err(LedgerError::InsufficientFunds);
    }

    let message = format!("{publisher_id}|{contribution_type}");
    let credentials: Vec<VoteCredential> = tokens
        .iter()
        .map(|token| {
            ctx.crypto
                .sign_message(&token.unblinded_token, &message)
                .ok_or_else(|| {
                    LedgerError::Crypto(format!("failed to sign vote for token {}", token.id))
                })
        })
        .collect::<Result<_, _>>()?;
    debug!(
        publisher_id,
        votes = credentials.len(),
        "posting publisher votes"
    );
    ctx.payment
        .post_publisher_votes(publisher_id, contribution_type, &credentials)
        .await?;

    // Votes accepted; now burn the tokens and record the contribution.
    let source = match tokens[0].token_type {
        TokenType::Vg => ContributionSource::VgToken,
        TokenType::Sku => ContributionSource::SkuToken,
    };
    let contribution = Contribution {
        contribution_type,
        publisher_id: publisher_id.to_string(),
        amount: hold.total_value(),
        source,
    };
    let contribution_id = uuid::Uuid::new_v4().to_string();
    queries::contributions::insert(&ctx.db, &contribution_id, &contribution).await?;
    ctx.tokens.redeem_hold(hold, &contribution_id).await?;
    info!(
        publisher_id,
        amount = contribution.amount,
        %contribution_type,
        "token contribution sent"
    );
    Ok(())
}

async fn check_publisher(ctx: &EngineContext, publisher_id: &str) -> Result<(), LedgerError> {
    match ctx.publishers.get_publisher(publisher_id).await? {
        Some(publisher) if publisher.registered => Ok(()),
        _ => Err(LedgerError::PublisherNotRegistered {
            publisher_id: publisher_id.to_string(),
        }),
    }
}
