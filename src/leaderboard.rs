//! Percentage-ranked leaderboard view
//!
//! This module derives a ranked top-N view from the participant registry.
//! It is a pure function of a registry snapshot: nothing here mutates
//! state, and ties keep registration order because the underlying sort is
//! stable.

use itertools::Itertools;
use serde::Serialize;

use super::{
    TruncatedVec,
    participant::{Participant, Registry},
};

/// A single leaderboard entry
///
/// Carries the display fields a client needs: name, raw score, the
/// question total recorded at registration, and the two-decimal
/// percentage the ranking is based on.
#[derive(Debug, Clone, Serialize)]
pub struct Standing {
    /// The participant's display name
    name: String,
    /// Cumulative correct-answer count
    score: u64,
    /// Question count recorded at registration
    total_questions: usize,
    /// Score as a percentage of total questions, rounded to two decimals
    percentage: f64,
}

impl Standing {
    fn from_participant(participant: &Participant) -> Self {
        Self {
            name: participant.name().to_owned(),
            score: participant.score(),
            total_questions: participant.total_questions(),
            percentage: participant.percentage(),
        }
    }

    /// Returns the participant's display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the cumulative correct-answer count
    pub fn score(&self) -> u64 {
        self.score
    }

    /// Returns the question count recorded at registration
    pub fn total_questions(&self) -> usize {
        self.total_questions
    }

    /// Returns the ranking percentage
    pub fn percentage(&self) -> f64 {
        self.percentage
    }
}

/// Derives the top-N standings from a registry snapshot
///
/// Participants are ranked by percentage descending; participants with no
/// recorded questions rank at 0. Ties keep registration order. The
/// returned [`TruncatedVec`] reports the exact number of ranked
/// participants alongside the truncated list.
///
/// # Arguments
///
/// * `registry` - The registry snapshot to rank
/// * `limit` - Maximum number of standings to include
pub fn top(registry: &Registry, limit: usize) -> TruncatedVec<Standing> {
    let ranked = registry
        .all()
        .iter()
        .sorted_by(|a, b| b.percentage().total_cmp(&a.percentage()))
        .map(Standing::from_participant);

    TruncatedVec::new(ranked, limit, registry.count())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn registry_with_scores(scores: &[(&str, u64, usize)]) -> Registry {
        let mut registry = Registry::default();
        for (name, score, total) in scores {
            let id = registry.register(name, *total).unwrap();
            for _ in 0..*score {
                registry.record_correct(id).unwrap();
            }
        }
        registry
    }

    #[test]
    fn test_top_orders_by_percentage_descending() {
        let registry =
            registry_with_scores(&[("Three", 3, 5), ("Four", 4, 5), ("Two", 2, 5)]);

        let standings = top(&registry, 3);

        let names: Vec<_> = standings.items().iter().map(Standing::name).collect();
        assert_eq!(names, vec!["Four", "Three", "Two"]);
        assert_eq!(standings.exact_count(), 3);
    }

    #[test]
    fn test_top_truncates_but_keeps_exact_count() {
        let registry = registry_with_scores(&[
            ("A", 5, 5),
            ("B", 4, 5),
            ("C", 3, 5),
            ("D", 2, 5),
        ]);

        let standings = top(&registry, crate::constants::leaderboard::DEFAULT_TOP_COUNT);

        assert_eq!(standings.items().len(), 3);
        assert_eq!(standings.exact_count(), 4);
    }

    #[test]
    fn test_ties_keep_registration_order() {
        let registry =
            registry_with_scores(&[("First", 2, 4), ("Second", 2, 4), ("Winner", 3, 4)]);

        let standings = top(&registry, 3);

        let names: Vec<_> = standings.items().iter().map(Standing::name).collect();
        assert_eq!(names, vec!["Winner", "First", "Second"]);
    }

    #[test]
    fn test_zero_total_questions_ranks_last() {
        let registry = registry_with_scores(&[("NoQuestions", 0, 0), ("Scored", 1, 5)]);

        let standings = top(&registry, 2);

        assert_eq!(standings.items()[0].name(), "Scored");
        assert_eq!(standings.items()[1].name(), "NoQuestions");
        assert!(standings.items()[1].percentage().abs() < f64::EPSILON);
    }

    #[test]
    fn test_ranking_uses_percentage_not_raw_score() {
        // 3/4 (75%) beats 4/8 (50%) even though the raw score is lower.
        let registry = registry_with_scores(&[("Raw", 4, 8), ("Ratio", 3, 4)]);

        let standings = top(&registry, 2);

        assert_eq!(standings.items()[0].name(), "Ratio");
    }

    #[test]
    fn test_empty_registry() {
        let registry = Registry::default();
        let standings = top(&registry, 3);

        assert!(standings.items().is_empty());
        assert_eq!(standings.exact_count(), 0);
    }
}
