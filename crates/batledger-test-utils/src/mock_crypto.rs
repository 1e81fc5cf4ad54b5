// SPDX-FileCopyrightText: 2026 Batledger Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic privacy-pass mock.
//!
//! "Cryptography" here is string concatenation: blinded, signed, and
//! unblinded forms are all derivable by eye in test failures.

use std::sync::Mutex;

use batledger_core::types::{BlindedTokenPair, VoteCredential};
use batledger_core::{LedgerError, PrivacyPass};

pub struct MockPrivacyPass {
    counter: Mutex<u64>,
}

impl MockPrivacyPass {
    pub fn new() -> Self {
        Self {
            counter: Mutex::new(0),
        }
    }
}

impl Default for MockPrivacyPass {
    fn default() -> Self {
        Self::new()
    }
}

impl PrivacyPass for MockPrivacyPass {
    fn create_blinded_tokens(&self, count: usize) -> Result<BlindedTokenPair, LedgerError> {
        let mut counter = self.counter.lock().expect("counter poisoned");
        let start = *counter;
        *counter += count as u64;
        let tokens: Vec<String> = (start..start + count as u64)
            .map(|i| format!("token-{i}"))
            .collect();
        let blinded_tokens = tokens.iter().map(|t| format!("blinded-{t}")).collect();
        Ok(BlindedTokenPair {
            tokens,
            blinded_tokens,
        })
    }

    fn unblind_tokens(
        &self,
        tokens: &[String],
        blinded_tokens: &[String],
        signed_tokens: &[String],
        batch_proof: &str,
        _public_key: &str,
    ) -> Option<Vec<String>> {
        if tokens.len() != signed_tokens.len()
            || blinded_tokens.len() != signed_tokens.len()
            || batch_proof.is_empty()
        {
            return None;
        }
        Some(signed_tokens.iter().map(|s| format!("unblinded-{s}")).collect())
    }

    fn sign_message(&self, unblinded_token: &str, message: &str) -> Option<VoteCredential> {
        Some(VoteCredential {
            preimage: format!("{unblinded_token}:{message}"),
            signature: format!("sig-{unblinded_token}"),
        })
    }
}
