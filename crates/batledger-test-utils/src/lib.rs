// SPDX-FileCopyrightText: 2026 Batledger Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for batledger integration tests.
//!
//! Provides mock collaborators and a harness builder for fast, deterministic,
//! CI-runnable tests without payment, wallet, or publisher services.
//!
//! # Components
//!
//! - [`MockPaymentService`] - orders, credential signing, and vote capture
//! - [`MockExternalWallet`] - custodial wallet with transfer capture
//! - [`MockPrivacyPass`] - deterministic blind/unblind/sign
//! - [`MockPublisherService`] - in-memory publisher registry
//! - [`StaticPrefs`] / [`SequenceRandom`] - fixed preferences and randomness
//! - [`TestHarnessBuilder`] - wires everything into an `EngineContext`

pub mod harness;
pub mod mock_crypto;
pub mod mock_payment;
pub mod mock_publisher;
pub mod mock_wallet;
pub mod prefs;
pub mod random;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_crypto::MockPrivacyPass;
pub use mock_payment::MockPaymentService;
pub use mock_publisher::MockPublisherService;
pub use mock_wallet::MockExternalWallet;
pub use prefs::StaticPrefs;
pub use random::SequenceRandom;
