// SPDX-FileCopyrightText: 2026 Batledger Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic random source for tests.

use std::sync::Mutex;

use batledger_engine::RandomSource;

/// Cycles through a fixed sequence of values.
///
/// Cycling (rather than draining) keeps jittered delays working after vote
/// allocation has consumed its share of the sequence. An empty sequence
/// yields a constant 0.5.
pub struct SequenceRandom {
    values: Vec<f64>,
    index: Mutex<usize>,
}

impl SequenceRandom {
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            index: Mutex::new(0),
        }
    }
}

impl RandomSource for SequenceRandom {
    fn next_f64(&self) -> f64 {
        if self.values.is_empty() {
            return 0.5;
        }
        let mut index = self.index.lock().expect("index poisoned");
        let value = self.values[*index % self.values.len()];
        *index += 1;
        value
    }
}
