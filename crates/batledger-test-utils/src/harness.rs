// SPDX-FileCopyrightText: 2026 Batledger Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builder-style test harness wiring mocks into an [`EngineContext`].

use std::sync::Arc;

use batledger_core::types::{Publisher, TokenType, WalletProvider};
use batledger_engine::{EngineConfig, EngineContext};
use batledger_storage::{Database, NewToken};

use crate::mock_crypto::MockPrivacyPass;
use crate::mock_payment::MockPaymentService;
use crate::mock_publisher::{registered_publisher, MockPublisherService};
use crate::mock_wallet::MockExternalWallet;
use crate::prefs::StaticPrefs;
use crate::random::SequenceRandom;

/// A fully wired engine over an in-memory database and mock collaborators.
pub struct TestHarness {
    pub ctx: EngineContext,
    pub payment: Arc<MockPaymentService>,
    pub wallet: Arc<MockExternalWallet>,
    pub crypto: Arc<MockPrivacyPass>,
    pub publishers: Arc<MockPublisherService>,
    pub random: Arc<SequenceRandom>,
}

/// Builder for [`TestHarness`].
pub struct TestHarnessBuilder {
    config: EngineConfig,
    provider: Option<WalletProvider>,
    external_balance: Option<f64>,
    vg_tokens: usize,
    sku_tokens: usize,
    publishers: Vec<Publisher>,
    prefs: StaticPrefs,
    random: Vec<f64>,
}

impl TestHarnessBuilder {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            provider: None,
            external_balance: None,
            vg_tokens: 0,
            sku_tokens: 0,
            publishers: Vec::new(),
            prefs: StaticPrefs::default(),
            random: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Connect an external wallet for `provider`.
    pub fn with_provider(mut self, provider: WalletProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_external_balance(mut self, balance: f64) -> Self {
        self.external_balance = Some(balance);
        self
    }

    /// Seed the pool with `count` quarter-BAT grant tokens.
    pub fn with_vg_tokens(mut self, count: usize) -> Self {
        self.vg_tokens = count;
        self
    }

    /// Seed the pool with `count` quarter-BAT purchased tokens.
    pub fn with_sku_tokens(mut self, count: usize) -> Self {
        self.sku_tokens = count;
        self
    }

    /// Register a publisher with a payout address for every provider.
    pub fn with_registered_publisher(mut self, id: &str) -> Self {
        self.publishers.push(registered_publisher(id));
        self
    }

    /// Register a publisher with payout addresses for specific providers only.
    pub fn with_publisher_addresses(
        mut self,
        id: &str,
        addresses: &[(WalletProvider, &str)],
    ) -> Self {
        self.publishers.push(Publisher {
            id: id.to_string(),
            registered: true,
            wallet_addresses: addresses
                .iter()
                .map(|(provider, address)| (*provider, address.to_string()))
                .collect(),
        });
        self
    }

    pub fn with_prefs(mut self, prefs: StaticPrefs) -> Self {
        self.prefs = prefs;
        self
    }

    /// Pin the random sequence (cycled) used for darts and jitter.
    pub fn with_random(mut self, values: Vec<f64>) -> Self {
        self.random = values;
        self
    }

    pub async fn build(self) -> TestHarness {
        let db = Arc::new(
            Database::open_in_memory()
                .await
                .expect("in-memory database"),
        );
        let payment = Arc::new(MockPaymentService::new());
        let wallet = Arc::new(match self.provider {
            Some(provider) => MockExternalWallet::connected(provider),
            None => MockExternalWallet::new(),
        });
        wallet.set_balance(self.external_balance).await;
        let crypto = Arc::new(MockPrivacyPass::new());
        let publishers = Arc::new(MockPublisherService::new());
        for publisher in self.publishers {
            publishers.add(publisher).await;
        }
        let random = Arc::new(SequenceRandom::new(self.random));

        let ctx = EngineContext::new(
            self.config,
            db,
            payment.clone(),
            wallet.clone(),
            crypto.clone(),
            publishers.clone(),
            Arc::new(self.prefs),
            random.clone(),
        );
        seed_tokens(&ctx, TokenType::Vg, self.vg_tokens, "vg").await;
        seed_tokens(&ctx, TokenType::Sku, self.sku_tokens, "sku").await;

        TestHarness {
            ctx,
            payment,
            wallet,
            crypto,
            publishers,
            random,
        }
    }
}

impl Default for TestHarnessBuilder {
    fn default() -> Self {
        Self::new()
    }
}

async fn seed_tokens(ctx: &EngineContext, token_type: TokenType, count: usize, prefix: &str) {
    if count == 0 {
        return;
    }
    let tokens = (0..count)
        .map(|i| NewToken {
            value: batledger_core::TOKEN_VALUE,
            unblinded_token: format!("{prefix}-seed-{i}"),
            public_key: "issuer-pk".into(),
            expires_at: None,
        })
        .collect();
    ctx.tokens
        .insert_tokens(tokens, token_type)
        .await
        .expect("seed tokens");
}
