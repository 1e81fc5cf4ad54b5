// SPDX-FileCopyrightText: 2026 Batledger Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Engine context: explicit configuration and collaborator wiring.
//!
//! Everything a processor needs is threaded through [`EngineContext`] by
//! reference; there is no ambient global state. The context is cheap to
//! clone (all fields are `Arc` or small) so jobs can be spawned onto the
//! runtime without lifetime gymnastics.

use std::sync::Arc;
use std::time::Duration;

use batledger_core::{
    ExternalWalletManager, PaymentService, PrivacyPass, PublisherService, UserPrefs,
};
use batledger_storage::Database;
use rand::Rng;

use crate::job_store::JobStore;
use crate::tokens::TokenManager;

/// Substitutable source of uniform random numbers in `[0, 1)`.
///
/// Vote allocation and jittered delays draw from this so tests can pin a
/// deterministic sequence.
pub trait RandomSource: Send + Sync {
    fn next_f64(&self) -> f64;
}

/// Production randomness backed by the thread-local RNG.
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn next_f64(&self) -> f64 {
        rand::thread_rng().r#gen::<f64>()
    }
}

/// Tunable engine limits and intervals.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Time between scheduled contribution cycles.
    pub reconcile_interval: Duration,
    /// Expected jittered delay between internally-funded background sends.
    pub background_contribution_delay: Duration,
    /// Expected jittered delay between externally-funded sends.
    pub external_contribution_delay: Duration,
    /// First backoff delay.
    pub backoff_base: Duration,
    /// Backoff ceiling.
    pub backoff_cap: Duration,
    /// Per-publisher retry ceiling for internally-funded sends.
    pub internal_send_retries: u32,
    /// Retry ceiling for the platform fee transfer.
    pub fee_retries: u32,
    /// Days after which a pending contribution is treated as sent.
    pub pending_expiry_days: i64,
    /// Platform fee rate applied to externally-funded contributions.
    pub contribution_fee_rate: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reconcile_interval: Duration::from_secs(30 * 24 * 60 * 60),
            background_contribution_delay: Duration::from_secs(45),
            external_contribution_delay: Duration::from_secs(450),
            backoff_base: Duration::from_secs(15),
            backoff_cap: Duration::from_secs(30 * 60),
            internal_send_retries: 3,
            fee_retries: 3,
            pending_expiry_days: 90,
            contribution_fee_rate: 0.05,
        }
    }
}

/// Shared handle to every collaborator and subsystem a job step touches.
#[derive(Clone)]
pub struct EngineContext {
    pub config: Arc<EngineConfig>,
    pub db: Arc<Database>,
    pub payment: Arc<dyn PaymentService>,
    pub wallet: Arc<dyn ExternalWalletManager>,
    pub crypto: Arc<dyn PrivacyPass>,
    pub publishers: Arc<dyn PublisherService>,
    pub prefs: Arc<dyn UserPrefs>,
    pub random: Arc<dyn RandomSource>,
    pub jobs: JobStore,
    pub tokens: TokenManager,
}

impl EngineContext {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: EngineConfig,
        db: Arc<Database>,
        payment: Arc<dyn PaymentService>,
        wallet: Arc<dyn ExternalWalletManager>,
        crypto: Arc<dyn PrivacyPass>,
        publishers: Arc<dyn PublisherService>,
        prefs: Arc<dyn UserPrefs>,
        random: Arc<dyn RandomSource>,
    ) -> Self {
        let jobs = JobStore::new(db.clone());
        let tokens = TokenManager::new(db.clone());
        Self {
            config: Arc::new(config),
            db,
            payment,
            wallet,
            crypto,
            publishers,
            prefs,
            random,
            jobs,
            tokens,
        }
    }
}
