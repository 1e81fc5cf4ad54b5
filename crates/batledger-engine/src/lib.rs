// SPDX-FileCopyrightText: 2026 Batledger Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contribution processing engine.
//!
//! Wires the token pool, resumable job store, contribution processors, and
//! the monthly cycle scheduler behind the [`Contributions`] facade. All
//! collaborators (payment service, external wallet, privacy-pass crypto,
//! publisher lookup, preferences) are injected through [`EngineContext`].

pub mod autocontribute;
pub mod context;
pub mod contributions;
pub mod delay;
pub mod job_store;
pub mod processors;
pub mod router;
pub mod scheduler;
pub mod tokens;

pub use context::{EngineConfig, EngineContext, OsRandom, RandomSource};
pub use contributions::{Balance, Contributions};
pub use job_store::{JobResume, JobStore};
pub use router::SendOutcome;
pub use scheduler::Scheduler;
pub use tokens::{TokenHold, TokenManager};
