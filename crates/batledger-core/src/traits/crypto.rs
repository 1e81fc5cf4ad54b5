// SPDX-FileCopyrightText: 2026 Batledger Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Privacy-pass cryptography trait: blind, unblind, and sign operations.
//!
//! The primitive implementation lives outside the engine; this trait only
//! exposes what the token vendor and the token contribution processor need.

use crate::error::LedgerError;
use crate::types::{BlindedTokenPair, VoteCredential};

/// Blinded-token cryptography collaborator.
pub trait PrivacyPass: Send + Sync {
    /// Generate `count` random tokens and their blinded counterparts.
    fn create_blinded_tokens(&self, count: usize) -> Result<BlindedTokenPair, LedgerError>;

    /// Unblind a signed batch, verifying the batch proof against the issuer
    /// public key. Returns `None` on verification failure (callers treat
    /// this as retryable: the batch may simply not be ready yet).
    fn unblind_tokens(
        &self,
        tokens: &[String],
        blinded_tokens: &[String],
        signed_tokens: &[String],
        batch_proof: &str,
        public_key: &str,
    ) -> Option<Vec<String>>;

    /// Sign a redemption message with an unblinded token secret.
    fn sign_message(&self, unblinded_token: &str, message: &str) -> Option<VoteCredential>;
}
