// SPDX-FileCopyrightText: 2026 Batledger Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Publisher weighting and vote allocation for auto-contribute.
//!
//! Engagement duration maps to a concave score so very long sessions on one
//! site cannot dominate the whole budget. Votes are then drawn
//! weighted-randomly rather than split proportionally: with small vote
//! budgets a proportional split would systematically starve low-weight
//! publishers, while random draws track the distribution over many cycles.

use std::collections::BTreeMap;

use batledger_core::types::PublisherActivity;

use crate::context::RandomSource;

/// Convert an engagement duration into a concave attention score.
///
/// `score = (-b + sqrt(b^2 + 4ac)) / 2a` with
/// `a = 15000 - 100m`, `b = 200m - 15000`, `c = 100s`,
/// where `s` is the duration and `m` the minimum-duration threshold, both in
/// seconds. Returns 0 for non-positive durations, negative thresholds, and
/// thresholds large enough to make the curve degenerate.
pub fn seconds_to_score(duration_secs: f64, min_duration_secs: f64) -> f64 {
    if duration_secs <= 0.0 || min_duration_secs < 0.0 {
        return 0.0;
    }
    let a = 15000.0 - 100.0 * min_duration_secs;
    if a <= 0.0 {
        return 0.0;
    }
    let b = 2.0 * 100.0 * min_duration_secs - 15000.0;
    let c = 100.0 * duration_secs;
    (-b + (b * b + 4.0 * a * c).sqrt()) / (2.0 * a)
}

/// Score each qualifying publisher and normalize to weights summing to 1.
///
/// Publishers below either threshold are dropped entirely. An empty result
/// means nothing qualified this cycle.
pub fn calculate_weights(
    activities: &[PublisherActivity],
    min_visits: i64,
    min_duration_secs: f64,
) -> BTreeMap<String, f64> {
    let mut scores = BTreeMap::new();
    let mut total = 0.0;
    for activity in activities {
        if activity.visits < min_visits || activity.duration_secs < min_duration_secs {
            continue;
        }
        let score = seconds_to_score(activity.duration_secs, min_duration_secs);
        if score <= 0.0 {
            continue;
        }
        total += score;
        scores.insert(activity.publisher_id.clone(), score);
    }
    if total <= 0.0 {
        return BTreeMap::new();
    }
    for score in scores.values_mut() {
        *score /= total;
    }
    scores
}

/// Distribute `total_votes` across publishers by repeated weighted-random
/// draws over the cumulative weight distribution.
pub fn allocate_votes(
    weights: &BTreeMap<String, f64>,
    total_votes: u32,
    random: &dyn RandomSource,
) -> BTreeMap<String, u32> {
    let mut votes: BTreeMap<String, u32> = BTreeMap::new();
    if weights.is_empty() {
        return votes;
    }
    for _ in 0..total_votes {
        let dart = random.next_f64();
        let mut upto = 0.0;
        let mut chosen = None;
        for (publisher_id, weight) in weights {
            upto += weight;
            if dart < upto {
                chosen = Some(publisher_id);
                break;
            }
        }
        // Rounding can leave the cumulative sum a hair under 1.0.
        let publisher_id = chosen
            .or_else(|| weights.keys().next_back())
            .expect("weights is non-empty");
        *votes.entry(publisher_id.clone()).or_insert(0) += 1;
    }
    votes
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Mutex;

    struct SequenceRandom(Mutex<Vec<f64>>);

    impl RandomSource for SequenceRandom {
        fn next_f64(&self) -> f64 {
            self.0.lock().unwrap().remove(0)
        }
    }

    fn activity(publisher_id: &str, visits: i64, duration_secs: f64) -> PublisherActivity {
        PublisherActivity {
            publisher_id: publisher_id.to_string(),
            visits,
            duration_secs,
        }
    }

    #[test]
    fn score_matches_known_values() {
        assert!((seconds_to_score(11.0, 3.0) - 1.0508).abs() < 1e-4);
        assert_eq!(seconds_to_score(0.0, 1.0), 0.0);
        assert_eq!(seconds_to_score(3.0, -1.0), 0.0);
        assert_eq!(seconds_to_score(-5.0, 1.0), 0.0);
        // Threshold past the curve's validity range.
        assert_eq!(seconds_to_score(10.0, 150.0), 0.0);
    }

    #[test]
    fn weights_for_two_publishers() {
        let activities = [activity("brave.com", 4, 14.0), activity("any.org", 2, 10.0)];
        let weights = calculate_weights(&activities, 1, 2.0);
        assert_eq!(weights.len(), 2);
        assert!((weights["brave.com"] - 0.5056).abs() < 1e-4);
        assert!((weights["any.org"] - 0.4944).abs() < 1e-4);
        assert!((weights.values().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn weights_filter_below_thresholds() {
        let activities = [
            activity("ok.com", 3, 20.0),
            activity("few-visits.com", 1, 40.0),
            activity("short.com", 5, 1.0),
        ];
        let weights = calculate_weights(&activities, 2, 5.0);
        assert_eq!(weights.len(), 1);
        assert!((weights["ok.com"] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn weights_empty_when_nothing_qualifies() {
        let activities = [activity("a.com", 0, 0.0)];
        assert!(calculate_weights(&activities, 1, 2.0).is_empty());
    }

    #[test]
    fn votes_follow_the_cumulative_walk() {
        let activities = [activity("brave.com", 4, 14.0), activity("any.org", 2, 10.0)];
        let weights = calculate_weights(&activities, 1, 2.0);
        let random = SequenceRandom(Mutex::new(vec![
            0.1123, 0.8454, 0.534, 0.0324, 0.9787, 0.43, 0.67, 0.22, 0.454, 0.987,
        ]));
        let votes = allocate_votes(&weights, 10, &random);
        // any.org covers [0, 0.4944); five darts land in each interval.
        assert_eq!(votes["any.org"], 5);
        assert_eq!(votes["brave.com"], 5);
    }

    #[test]
    fn votes_total_is_preserved() {
        let mut weights = BTreeMap::new();
        weights.insert("a.com".to_string(), 0.2);
        weights.insert("b.com".to_string(), 0.3);
        weights.insert("c.com".to_string(), 0.5);
        let random = SequenceRandom(Mutex::new(
            (0..25).map(|i| (i as f64) / 25.0).collect(),
        ));
        let votes = allocate_votes(&weights, 25, &random);
        assert_eq!(votes.values().sum::<u32>(), 25);
    }

    #[test]
    fn dart_at_the_boundary_credits_the_last_publisher() {
        let mut weights = BTreeMap::new();
        weights.insert("only.com".to_string(), 1.0);
        let random = SequenceRandom(Mutex::new(vec![0.9999999999999999]));
        let votes = allocate_votes(&weights, 1, &random);
        assert_eq!(votes["only.com"], 1);
    }

    #[test]
    fn no_votes_without_weights() {
        let random = SequenceRandom(Mutex::new(vec![]));
        assert!(allocate_votes(&BTreeMap::new(), 5, &random).is_empty());
    }

    proptest! {
        #[test]
        fn score_is_monotonic_in_duration(
            base in 0.1f64..10_000.0,
            delta in 0.0f64..10_000.0,
            min in 0.0f64..120.0,
        ) {
            let lo = seconds_to_score(base, min);
            let hi = seconds_to_score(base + delta, min);
            prop_assert!(hi >= lo - 1e-9);
        }

        #[test]
        fn weights_always_normalize(
            durations in proptest::collection::vec(1.0f64..5_000.0, 1..8),
        ) {
            let activities: Vec<_> = durations
                .iter()
                .enumerate()
                .map(|(i, d)| activity(&format!("p{i}.com"), 5, *d))
                .collect();
            let weights = calculate_weights(&activities, 1, 2.0);
            let sum: f64 = weights.values().sum();
            prop_assert!((sum - 1.0).abs() < 1e-9);
        }
    }
}
