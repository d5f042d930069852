//! # Quizround Library
//!
//! This library implements the core of a timed, shared-round multiple
//! choice quiz. One round is shared by every connected participant: a
//! countdown runs per question, answers are collected at most once per
//! participant and question, stragglers are timed out server-side, and
//! progression to the next question is an explicit transition.
//!
//! The crate holds no HTTP or storage code. A host application owns a
//! [`round::Round`] (typically behind a single mutex), wires its request
//! handlers to the round's operations, and persists the serde-serializable
//! state however it likes.

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::missing_errors_doc)]

use derive_where::derive_where;
use itertools::Itertools;
use serde::Serialize;

pub mod constants;

pub mod leaderboard;
pub mod ledger;
pub mod participant;
pub mod question;
pub mod round;

/// Errors surfaced by round operations
///
/// This enum aggregates the per-module error types so callers of
/// [`round::Round`] handle a single error surface.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, derive_more::From)]
pub enum Error {
    /// Question bank loading or lookup failed
    #[error(transparent)]
    Question(question::Error),
    /// Participant registry rejected the operation
    #[error(transparent)]
    Participant(participant::Error),
}

/// A truncated vector that maintains the exact count while limiting displayed items
///
/// Used by the leaderboard to return a bounded top-N while still reporting
/// how many participants were ranked in total.
#[derive(Debug, Clone, Serialize)]
#[derive_where(Default)]
pub struct TruncatedVec<T> {
    /// The exact total count of items
    exact_count: usize,
    /// The truncated list of items (up to the limit)
    items: Vec<T>,
}

impl<T: Clone> TruncatedVec<T> {
    /// Creates a new truncated vector from an iterator
    ///
    /// # Arguments
    ///
    /// * `list` - An iterator over items to include
    /// * `limit` - Maximum number of items to include in the truncated vector
    /// * `exact_count` - The exact total count of items (may be larger than limit)
    pub fn new<I: Iterator<Item = T>>(list: I, limit: usize, exact_count: usize) -> Self {
        let items = list.take(limit).collect_vec();
        Self { exact_count, items }
    }

    /// Maps a function over the items in the truncated vector
    pub fn map<F, U>(self, f: F) -> TruncatedVec<U>
    where
        F: Fn(T) -> U,
    {
        TruncatedVec {
            exact_count: self.exact_count,
            items: self.items.into_iter().map(f).collect_vec(),
        }
    }

    /// Returns the exact count of items
    pub fn exact_count(&self) -> usize {
        self.exact_count
    }

    /// Returns the truncated items
    pub fn items(&self) -> &[T] {
        &self.items
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_truncated_vec_new() {
        let data = vec![1, 2, 3, 4, 5];
        let truncated = TruncatedVec::new(data.into_iter(), 3, 5);

        assert_eq!(truncated.exact_count(), 5);
        assert_eq!(truncated.items(), &[1, 2, 3]);
    }

    #[test]
    fn test_truncated_vec_limit_larger_than_items() {
        let data = vec![1, 2, 3];
        let truncated = TruncatedVec::new(data.into_iter(), 5, 3);

        assert_eq!(truncated.exact_count(), 3);
        assert_eq!(truncated.items(), &[1, 2, 3]);
    }

    #[test]
    fn test_truncated_vec_map() {
        let data = vec![1, 2, 3];
        let truncated = TruncatedVec::new(data.into_iter(), 3, 5);
        let mapped = truncated.map(|x| x * 2);

        assert_eq!(mapped.exact_count(), 5);
        assert_eq!(mapped.items(), &[2, 4, 6]);
    }

    #[test]
    fn test_error_from_module_errors() {
        let err: Error = question::Error::NotFound { index: 7, count: 3 }.into();
        assert!(matches!(err, Error::Question(_)));

        let err: Error = participant::Error::UnknownParticipant(participant::Id::new()).into();
        assert!(matches!(err, Error::Participant(_)));
    }
}
