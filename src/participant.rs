//! Participant registry and scoring
//!
//! This module tracks the set of registered participants for the current
//! round and their cumulative scores. Participants are round-scoped: they
//! are created on registration and discarded wholesale on round reset.

use std::{collections::HashMap, fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;
use uuid::Uuid;

/// A unique identifier for participants in the round
///
/// Each participant gets a fresh identifier on registration that persists
/// until the round is reset.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, DeserializeFromStr, SerializeDisplay,
)]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random participant ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for Id {
    /// Creates a new random participant ID (same as `new()`)
    fn default() -> Self {
        Self::new()
    }
}

impl Display for Id {
    /// Formats the ID as a UUID string
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for Id {
    type Err = uuid::Error;

    /// Parses an ID from a UUID string
    ///
    /// # Errors
    ///
    /// Returns a `uuid::Error` if the string is not a valid UUID.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s)?))
    }
}

/// Errors that can occur when managing participants
#[derive(Error, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The round has reached the maximum number of allowed participants
    #[error("maximum number of participants reached")]
    MaximumParticipants,
    /// The referenced participant is not registered
    #[error("unknown participant {0}")]
    UnknownParticipant(Id),
}

/// A registered participant and their cumulative score
///
/// The score counts correct answers; `total_questions` is the bank size
/// recorded at registration time, so percentage standings stay meaningful
/// even if a bank were swapped between rounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    /// Unique identifier assigned at registration
    id: Id,
    /// Display name (placeholder when the participant registered blank)
    name: String,
    /// Cumulative count of correct answers
    score: u64,
    /// Question count recorded at registration time
    total_questions: usize,
}

impl Participant {
    /// Returns the participant's unique identifier
    pub fn id(&self) -> Id {
        self.id
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

    /// Returns the score as a percentage of total questions, rounded to
    /// two decimals
    ///
    /// Participants registered against an empty bank rank at 0.
    pub fn percentage(&self) -> f64 {
        if self.total_questions == 0 {
            return 0.0;
        }
        let raw = self.score as f64 / self.total_questions as f64 * 100.0;
        (raw * 100.0).round() / 100.0
    }
}

/// Serialization helper for the Registry struct
#[derive(Deserialize)]
struct RegistrySerde {
    participants: Vec<Participant>,
}

/// Tracks all registered participants for the current round
///
/// Participants are kept in registration order, which doubles as the
/// stable tie-break order for the leaderboard.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(from = "RegistrySerde")]
pub struct Registry {
    /// Participants in registration order
    participants: Vec<Participant>,

    /// Lookup from ID to position in `participants` (rebuilt on deserialize)
    #[serde(skip_serializing)]
    index: HashMap<Id, usize>,
}

impl From<RegistrySerde> for Registry {
    /// Reconstructs the Registry from serialized data
    ///
    /// This rebuilds the ID lookup from the participant list, which is
    /// necessary since the lookup is not serialized.
    fn from(serde: RegistrySerde) -> Self {
        let RegistrySerde { participants } = serde;
        let index = participants
            .iter()
            .enumerate()
            .map(|(position, participant)| (participant.id, position))
            .collect();
        Self {
            participants,
            index,
        }
    }
}

impl Registry {
    /// Registers a new participant and assigns them a fresh identifier
    ///
    /// Blank names (after trimming) fall back to the placeholder name.
    /// Repeat names are not deduplicated; every registration produces a
    /// distinct participant.
    ///
    /// # Arguments
    ///
    /// * `name` - The requested display name
    /// * `total_questions` - Bank size to record on the participant
    ///
    /// # Errors
    ///
    /// Returns [`Error::MaximumParticipants`] if the registry is full.
    pub fn register(&mut self, name: &str, total_questions: usize) -> Result<Id, Error> {
        if self.participants.len() >= crate::constants::participant::MAX_PARTICIPANT_COUNT {
            return Err(Error::MaximumParticipants);
        }

        let name = name.trim();
        let name = if name.is_empty() {
            crate::constants::participant::PLACEHOLDER_NAME.to_owned()
        } else {
            name.to_owned()
        };

        let id = Id::new();
        self.index.insert(id, self.participants.len());
        self.participants.push(Participant {
            id,
            name,
            score: 0,
            total_questions,
        });

        Ok(id)
    }

    /// Increments a participant's score by one
    ///
    /// # Returns
    ///
    /// The participant's updated score.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownParticipant`] if the ID is not registered.
    pub fn record_correct(&mut self, participant_id: Id) -> Result<u64, Error> {
        let position = *self
            .index
            .get(&participant_id)
            .ok_or(Error::UnknownParticipant(participant_id))?;

        let participant = &mut self.participants[position];
        participant.score += 1;
        Ok(participant.score)
    }

    /// Looks up a participant by ID
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownParticipant`] if the ID is not registered.
    pub fn get(&self, participant_id: Id) -> Result<&Participant, Error> {
        self.index
            .get(&participant_id)
            .map(|position| &self.participants[*position])
            .ok_or(Error::UnknownParticipant(participant_id))
    }

    /// Returns all participants in registration order
    pub fn all(&self) -> &[Participant] {
        &self.participants
    }

    /// Returns the IDs of all participants in registration order
    pub fn ids(&self) -> impl Iterator<Item = Id> + '_ {
        self.participants.iter().map(Participant::id)
    }

    /// Returns the number of registered participants
    pub fn count(&self) -> usize {
        self.participants.len()
    }

    /// Checks whether no participants are registered
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Removes all participants (used by round reset)
    pub fn clear(&mut self) {
        self.participants.clear();
        self.index.clear();
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_register_assigns_distinct_ids() {
        let mut registry = Registry::default();

        let first = registry.register("Alice", 5).unwrap();
        let second = registry.register("Alice", 5).unwrap();

        // Repeat names create distinct participants.
        assert_ne!(first, second);
        assert_eq!(registry.count(), 2);
    }

    #[test]
    fn test_register_blank_name_uses_placeholder() {
        let mut registry = Registry::default();

        let id = registry.register("   ", 5).unwrap();
        assert_eq!(
            registry.get(id).unwrap().name(),
            crate::constants::participant::PLACEHOLDER_NAME
        );
    }

    #[test]
    fn test_register_trims_name() {
        let mut registry = Registry::default();

        let id = registry.register("  Bob  ", 5).unwrap();
        assert_eq!(registry.get(id).unwrap().name(), "Bob");
    }

    #[test]
    fn test_record_correct_increments_score() {
        let mut registry = Registry::default();
        let id = registry.register("Alice", 5).unwrap();

        assert_eq!(registry.record_correct(id).unwrap(), 1);
        assert_eq!(registry.record_correct(id).unwrap(), 2);
        assert_eq!(registry.get(id).unwrap().score(), 2);
    }

    #[test]
    fn test_record_correct_unknown_participant() {
        let mut registry = Registry::default();
        let unknown = Id::new();

        assert_eq!(
            registry.record_correct(unknown),
            Err(Error::UnknownParticipant(unknown))
        );
    }

    #[test]
    fn test_registration_order_is_preserved() {
        let mut registry = Registry::default();
        registry.register("First", 3).unwrap();
        registry.register("Second", 3).unwrap();
        registry.register("Third", 3).unwrap();

        let names: Vec<_> = registry.all().iter().map(Participant::name).collect();
        assert_eq!(names, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn test_clear_removes_everything() {
        let mut registry = Registry::default();
        let id = registry.register("Alice", 5).unwrap();

        registry.clear();

        assert_eq!(registry.count(), 0);
        assert!(registry.is_empty());
        assert!(matches!(
            registry.get(id),
            Err(Error::UnknownParticipant(_))
        ));
    }

    #[test]
    fn test_percentage_rounding() {
        let mut registry = Registry::default();
        let id = registry.register("Alice", 3).unwrap();
        registry.record_correct(id).unwrap();

        // 1/3 rounds to 33.33, not 33.333...
        let percentage = registry.get(id).unwrap().percentage();
        assert!((percentage - 33.33).abs() < f64::EPSILON);
    }

    #[test]
    fn test_percentage_zero_questions() {
        let mut registry = Registry::default();
        let id = registry.register("Alice", 0).unwrap();

        assert!(registry.get(id).unwrap().percentage().abs() < f64::EPSILON);
    }

    #[test]
    fn test_id_round_trips_through_display() {
        let id = Id::new();
        let parsed: Id = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }
}
