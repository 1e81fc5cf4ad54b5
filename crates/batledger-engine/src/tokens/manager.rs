// SPDX-FileCopyrightText: 2026 Batledger Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contribution token pool with exclusive in-process reservation.
//!
//! Reservation is the unit of concurrency control for token spending: a
//! token id lives in at most one live [`TokenHold`] at a time, enforced by a
//! process-wide reserved-id set. Reservations are NOT persisted; a resumable
//! job that must survive a restart records its held ids in its own job state
//! and re-reserves them by id on resume.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use batledger_core::types::{ContributionToken, TokenType};
use batledger_core::LedgerError;
use batledger_storage::{queries, Database, NewToken};
use tracing::debug;

/// Owner of the token pool and the reserved-id set.
#[derive(Clone)]
pub struct TokenManager {
    db: Arc<Database>,
    reserved: Arc<Mutex<HashSet<i64>>>,
}

/// An exclusive reservation over a set of tokens.
///
/// Dropping a hold without redeeming releases its tokens: a child returns
/// them to its parent, a root removes their ids from the reserved set. No
/// leak either way.
#[derive(Debug)]
pub struct TokenHold {
    reserved: Arc<Mutex<HashSet<i64>>>,
    tokens: Arc<Mutex<Vec<ContributionToken>>>,
    parent: Option<Arc<Mutex<Vec<ContributionToken>>>>,
}

impl TokenManager {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            db,
            reserved: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Greedily reserve unreserved, unexpired tokens of `token_type` until
    /// their summed value covers `amount` (or storage is exhausted).
    ///
    /// An empty hold means "insufficient funds" and is not an error; callers
    /// must check [`TokenHold::total_value`].
    pub async fn reserve_tokens(
        &self,
        token_type: TokenType,
        amount: f64,
    ) -> Result<TokenHold, LedgerError> {
        let candidates = queries::tokens::spendable_tokens(&self.db, token_type).await?;
        let mut selected = Vec::new();
        {
            let mut reserved = self.reserved.lock().expect("reserved set poisoned");
            let mut total = 0.0;
            for token in candidates {
                if total >= amount {
                    break;
                }
                if reserved.contains(&token.id) {
                    continue;
                }
                reserved.insert(token.id);
                total += token.value;
                selected.push(token);
            }
        }
        debug!(
            token_type = %token_type,
            requested = amount,
            reserved = selected.len(),
            "tokens reserved"
        );
        Ok(self.hold_for(selected))
    }

    /// Reserve a specific, previously-known id set (resume after crash).
    ///
    /// Does not filter by type; the caller already knows the exact set.
    /// Errors if any id is already held elsewhere in this process.
    pub async fn reserve_tokens_by_ids(&self, ids: &[i64]) -> Result<TokenHold, LedgerError> {
        let tokens = queries::tokens::tokens_by_ids(&self.db, ids.to_vec()).await?;
        {
            let mut reserved = self.reserved.lock().expect("reserved set poisoned");
            for token in &tokens {
                if !reserved.insert(token.id) {
                    // Roll back what we just inserted before bailing.
                    for t in &tokens {
                        if t.id == token.id {
                            break;
                        }
                        reserved.remove(&t.id);
                    }
                    return Err(LedgerError::Internal(format!(
                        "token {} is already reserved",
                        token.id
                    )));
                }
            }
        }
        Ok(self.hold_for(tokens))
    }

    /// Sum over unreserved, unexpired tokens of a type.
    ///
    /// Display/feasibility use only: not safe to base a reservation decision
    /// on under concurrency — reserve, then check the hold.
    pub async fn available_balance(&self, token_type: TokenType) -> Result<f64, LedgerError> {
        let candidates = queries::tokens::spendable_tokens(&self.db, token_type).await?;
        let reserved = self.reserved.lock().expect("reserved set poisoned");
        Ok(candidates
            .iter()
            .filter(|t| !reserved.contains(&t.id))
            .map(|t| t.value)
            .sum())
    }

    /// Durably persist newly acquired tokens with a batch record.
    pub async fn insert_tokens(
        &self,
        tokens: Vec<NewToken>,
        token_type: TokenType,
    ) -> Result<Vec<i64>, LedgerError> {
        queries::tokens::insert_tokens(&self.db, tokens, token_type).await
    }

    /// O(1) membership test against the in-process reserved-id set.
    pub fn is_token_reserved(&self, id: i64) -> bool {
        self.reserved
            .lock()
            .expect("reserved set poisoned")
            .contains(&id)
    }

    /// Consume a hold: mark its tokens redeemed by `contribution_id` and
    /// release their reservations. The tokens can never be spent again.
    pub async fn redeem_hold(
        &self,
        hold: TokenHold,
        contribution_id: &str,
    ) -> Result<(), LedgerError> {
        let tokens: Vec<ContributionToken> = {
            let mut list = hold.tokens.lock().expect("hold tokens poisoned");
            list.drain(..).collect()
        };
        let ids: Vec<i64> = tokens.iter().map(|t| t.id).collect();
        queries::tokens::mark_tokens_redeemed(&self.db, ids.clone(), contribution_id).await?;
        let mut reserved = self.reserved.lock().expect("reserved set poisoned");
        for id in &ids {
            reserved.remove(id);
        }
        debug!(count = ids.len(), contribution_id, "tokens redeemed");
        Ok(())
    }

    fn hold_for(&self, tokens: Vec<ContributionToken>) -> TokenHold {
        TokenHold {
            reserved: self.reserved.clone(),
            tokens: Arc::new(Mutex::new(tokens)),
            parent: None,
        }
    }
}

impl TokenHold {
    /// Snapshot of the held tokens.
    pub fn tokens(&self) -> Vec<ContributionToken> {
        self.tokens.lock().expect("hold tokens poisoned").clone()
    }

    /// Held token ids, in hold order.
    pub fn token_ids(&self) -> Vec<i64> {
        self.tokens
            .lock()
            .expect("hold tokens poisoned")
            .iter()
            .map(|t| t.id)
            .collect()
    }

    /// Summed BAT value of the held tokens.
    pub fn total_value(&self) -> f64 {
        self.tokens
            .lock()
            .expect("hold tokens poisoned")
            .iter()
            .map(|t| t.value)
            .sum()
    }

    pub fn count(&self) -> usize {
        self.tokens.lock().expect("hold tokens poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Transfer ownership of `count` tokens to a new child hold.
    ///
    /// Dropping the child returns its tokens to this hold; redeeming the
    /// child consumes them. Panics in debug builds if `count` exceeds the
    /// held token count; callers size splits from [`TokenHold::count`].
    pub fn split(&mut self, count: usize) -> TokenHold {
        let mut tokens = self.tokens.lock().expect("hold tokens poisoned");
        debug_assert!(count <= tokens.len());
        let take = count.min(tokens.len());
        let child_tokens: Vec<ContributionToken> = tokens.drain(..take).collect();
        TokenHold {
            reserved: self.reserved.clone(),
            tokens: Arc::new(Mutex::new(child_tokens)),
            parent: Some(self.tokens.clone()),
        }
    }
}

impl Drop for TokenHold {
    fn drop(&mut self) {
        let mut tokens = self.tokens.lock().expect("hold tokens poisoned");
        if tokens.is_empty() {
            return;
        }
        match &self.parent {
            Some(parent) => {
                parent
                    .lock()
                    .expect("hold tokens poisoned")
                    .append(&mut tokens);
            }
            None => {
                let mut reserved = self.reserved.lock().expect("reserved set poisoned");
                for token in tokens.drain(..) {
                    reserved.remove(&token.id);
                }
            }
        }
    }
}
