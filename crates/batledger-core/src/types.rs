// SPDX-FileCopyrightText: 2026 Batledger Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common domain types used across the batledger workspace.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Fixed BAT value of a single contribution token ("vote").
pub const TOKEN_VALUE: f64 = 0.25;

/// The kind of contribution token held in the pool.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum TokenType {
    /// Derived from a promotional grant.
    Vg,
    /// Purchased through the SKU order flow.
    Sku,
}

/// A spendable contribution token backed by a row in the token store.
///
/// Tokens are referenced by integer id everywhere; reservation ownership is
/// a set of ids, never an object graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionToken {
    pub id: i64,
    pub token_type: TokenType,
    /// BAT value, normally [`TOKEN_VALUE`].
    pub value: f64,
    /// Opaque unblinded token secret used to sign redemption messages.
    pub unblinded_token: String,
    /// Issuer public key the token was signed under.
    pub public_key: String,
    /// ISO 8601 expiry, if the issuer set one. Expired tokens are never reserved.
    pub expires_at: Option<String>,
}

/// What triggered a contribution.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum ContributionType {
    OneTime,
    Recurring,
    AutoContribute,
}

/// Where the BAT for a contribution comes from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum ContributionSource {
    /// Anonymous grant-derived tokens.
    VgToken,
    /// Purchased SKU tokens.
    SkuToken,
    /// Connected custodial wallet.
    External,
}

/// Supported custodial wallet providers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum WalletProvider {
    Uphold,
    Gemini,
    Bitflyer,
}

/// Ephemeral contribution request passed between the router and processors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub contribution_type: ContributionType,
    pub publisher_id: String,
    /// Amount in BAT.
    pub amount: f64,
    pub source: ContributionSource,
}

/// Browsing activity accumulated for one publisher within a cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublisherActivity {
    pub publisher_id: String,
    pub visits: i64,
    pub duration_secs: f64,
}

/// A user-configured monthly tip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringContribution {
    pub publisher_id: String,
    pub amount: f64,
}

/// A contribution deferred because its publisher cannot currently be paid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingContribution {
    pub id: i64,
    pub publisher_id: String,
    pub amount: f64,
    /// ISO 8601 creation timestamp; rows older than 90 days are treated as sent.
    pub created_at: String,
}

/// Lifecycle status of a payment service order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
pub enum OrderStatus {
    Pending,
    Paid,
    Canceled,
}

/// A line item on a payment service order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: String,
    pub quantity: u32,
    /// Unit price in BAT.
    pub price: f64,
}

/// An order returned by the payment service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
}

/// Result of a completed BAT transfer from an external wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalTransfer {
    pub provider: WalletProvider,
    pub transaction_id: String,
}

/// Locally generated random tokens and their blinded counterparts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlindedTokenPair {
    pub tokens: Vec<String>,
    pub blinded_tokens: Vec<String>,
}

/// Server-signed tokens with the batch proof needed for unblinding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedTokens {
    pub signed_tokens: Vec<String>,
    pub batch_proof: String,
    pub public_key: String,
}

/// A signed redemption message for one token vote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteCredential {
    pub preimage: String,
    pub signature: String,
}

/// Publisher registration info returned by the publisher service.
#[derive(Debug, Clone, PartialEq)]
pub struct Publisher {
    pub id: String,
    pub registered: bool,
    /// Payout addresses keyed by wallet provider.
    pub wallet_addresses: HashMap<WalletProvider, String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn string_tagged_enums_round_trip() {
        for source in [
            ContributionSource::VgToken,
            ContributionSource::SkuToken,
            ContributionSource::External,
        ] {
            let s = source.to_string();
            assert_eq!(ContributionSource::from_str(&s).unwrap(), source);
        }
        for provider in [
            WalletProvider::Uphold,
            WalletProvider::Gemini,
            WalletProvider::Bitflyer,
        ] {
            let s = provider.to_string();
            assert_eq!(WalletProvider::from_str(&s).unwrap(), provider);
        }
        assert_eq!(TokenType::from_str("Sku").unwrap(), TokenType::Sku);
        assert_eq!(ContributionType::AutoContribute.to_string(), "AutoContribute");
    }

    #[test]
    fn contribution_serializes_with_tags() {
        let contribution = Contribution {
            contribution_type: ContributionType::OneTime,
            publisher_id: "brave.com".into(),
            amount: 5.0,
            source: ContributionSource::External,
        };
        let json = serde_json::to_string(&contribution).unwrap();
        let parsed: Contribution = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, contribution);
    }

    #[test]
    fn token_value_is_quarter_bat() {
        assert!((TOKEN_VALUE - 0.25).abs() < f64::EPSILON);
    }
}
