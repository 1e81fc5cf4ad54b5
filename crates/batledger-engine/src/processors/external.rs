// SPDX-FileCopyrightText: 2026 Batledger Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Externally-funded contribution sends.
//!
//! Pays a publisher directly from the user's custodial wallet, then spawns
//! an independent fee job for the 5% platform fee. A publisher without a
//! payout address for the connected provider is reported as not registered,
//! which makes the send pending-eligible at the router.

use batledger_core::types::{Contribution, ContributionSource, ContributionType};
use batledger_core::LedgerError;
use batledger_storage::queries;
use tracing::{info, warn};

use crate::context::EngineContext;
use crate::processors::fee;

/// Send `amount` BAT from the external wallet to `publisher_id`.
pub async fn send(
    ctx: &EngineContext,
    contribution_type: ContributionType,
    publisher_id: &str,
    amount: f64,
) -> Result<(), LedgerError> {
    let Some(provider) = ctx.wallet.provider() else {
        return Err(LedgerError::Wallet("no external wallet connected".into()));
    };
    let Some(publisher) = ctx.publishers.get_publisher(publisher_id).await? else {
        return Err(LedgerError::PublisherNotRegistered {
            publisher_id: publisher_id.to_string(),
        });
    };
    if !publisher.registered {
        return Err(LedgerError::PublisherNotRegistered {
            publisher_id: publisher_id.to_string(),
        });
    }
    let Some(address) = publisher.wallet_addresses.get(&provider) else {
        return Err(LedgerError::PublisherNotRegistered {
            publisher_id: publisher_id.to_string(),
        });
    };

    let transfer = ctx
        .wallet
        .transfer_bat(address, amount, Some(publisher_id))
        .await?
        .ok_or_else(|| LedgerError::Wallet("external transfer unavailable".into()))?;

    let contribution = Contribution {
        contribution_type,
        publisher_id: publisher_id.to_string(),
        amount,
        source: ContributionSource::External,
    };
    let contribution_id = uuid::Uuid::new_v4().to_string();
    queries::contributions::insert(&ctx.db, &contribution_id, &contribution).await?;
    info!(
        publisher_id,
        amount,
        provider = %transfer.provider,
        transaction_id = %transfer.transaction_id,
        "external contribution sent"
    );

    // The fee rides on its own job so a fee hiccup can never undo the send.
    let fee_amount = amount * ctx.config.contribution_fee_rate;
    let fee_job = fee::initialize(ctx, fee_amount).await?;
    let fee_ctx = ctx.clone();
    tokio::spawn(async move {
        if let Err(e) = fee::run(&fee_ctx, &fee_job).await {
            warn!(job_id = %fee_job, error = %e, "fee job aborted");
        }
    });
    Ok(())
}
