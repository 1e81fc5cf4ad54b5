// SPDX-FileCopyrightText: 2026 Batledger Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the batledger rewards engine.

use thiserror::Error;

/// The primary error type used across all batledger crates.
///
/// Job-internal errors are values threaded through continuations, never
/// panics: a processor decides from the variant whether the failure is
/// terminal or retryable (see the engine's retry envelopes).
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Payment service errors (order creation, credential claims, vote posting).
    #[error("payment service error: {message}")]
    Payment {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// External wallet provider errors (balance fetch, BAT transfer).
    #[error("external wallet error: {0}")]
    Wallet(String),

    /// Privacy-pass cryptography errors (blinding, unblinding, signing).
    #[error("token cryptography error: {0}")]
    Crypto(String),

    /// The publisher is not registered or has no payable address for the
    /// user's wallet provider. Distinct variant: the router uses it to
    /// decide pending-contribution eligibility.
    #[error("publisher not registered: {publisher_id}")]
    PublisherNotRegistered { publisher_id: String },

    /// A persisted job state blob failed to deserialize into the struct
    /// associated with its job kind. The job must fail closed.
    #[error("invalid job state: {0}")]
    InvalidState(String),

    /// An order returned by the payment service violates the pricing
    /// contract (wrong item count or unexpected unit price). Never retried.
    #[error("invalid order: {0}")]
    InvalidOrder(String),

    /// The requested operation is not supported for the current funding
    /// source or wallet configuration (e.g. SKU-funded auto-contribute).
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// Not enough spendable tokens (or external balance) to fund a send.
    /// Terminal for the individual contribution; never retried.
    #[error("insufficient funds")]
    InsufficientFunds,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Whether this error may be resolved by retrying the same call later.
    ///
    /// Terminal contract violations and state corruption are never
    /// retryable; network-facing collaborator failures are.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LedgerError::Payment { .. } | LedgerError::Wallet(_) | LedgerError::Crypto(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(
            LedgerError::Payment {
                message: "timeout".into(),
                source: None,
            }
            .is_transient()
        );
        assert!(LedgerError::Wallet("rate limited".into()).is_transient());
        assert!(!LedgerError::InvalidOrder("wrong unit price".into()).is_transient());
        assert!(!LedgerError::InvalidState("schema drift".into()).is_transient());
        assert!(
            !LedgerError::PublisherNotRegistered {
                publisher_id: "example.com".into(),
            }
            .is_transient()
        );
    }

    #[test]
    fn display_includes_context() {
        let err = LedgerError::PublisherNotRegistered {
            publisher_id: "brave.com".into(),
        };
        assert_eq!(err.to_string(), "publisher not registered: brave.com");
    }
}
