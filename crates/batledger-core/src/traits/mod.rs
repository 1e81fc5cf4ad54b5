// SPDX-FileCopyrightText: 2026 Batledger Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits consumed by the contribution engine.
//!
//! Every network- or browser-facing dependency of the engine is expressed as
//! a trait here: the payment service, the external wallet manager, the
//! privacy-pass cryptography, the publisher lookup service, and user
//! preferences. The embedding application supplies the real implementations;
//! tests supply mocks.

pub mod crypto;
pub mod payment;
pub mod prefs;
pub mod publisher;
pub mod wallet;

pub use crypto::PrivacyPass;
pub use payment::PaymentService;
pub use prefs::UserPrefs;
pub use publisher::PublisherService;
pub use wallet::ExternalWalletManager;
