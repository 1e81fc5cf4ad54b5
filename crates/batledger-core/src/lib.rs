// SPDX-FileCopyrightText: 2026 Batledger Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the batledger rewards engine.
//!
//! This crate provides the error type, domain types, and collaborator trait
//! definitions shared across the batledger workspace. The contribution
//! processing logic lives in `batledger-engine`; persistence lives in
//! `batledger-storage`.

pub mod error;
pub mod traits;
pub mod types;

pub use error::LedgerError;
pub use traits::{
    ExternalWalletManager, PaymentService, PrivacyPass, PublisherService, UserPrefs,
};
pub use types::{
    Contribution, ContributionSource, ContributionToken, ContributionType,
    PendingContribution, PublisherActivity, RecurringContribution, TokenType,
    WalletProvider, TOKEN_VALUE,
};
