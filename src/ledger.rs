//! Answer ledger with an at-most-one-record guarantee
//!
//! This module records every answer (or timeout) submitted during the
//! round. The central invariant is that at most one record exists per
//! (participant, question) pair: the first submission wins and later
//! submissions for the same pair are no-ops that return the existing
//! record. The timeout sweep in [`crate::round`] relies on this to stay
//! idempotent under repeated polling.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use web_time::SystemTime;

use super::{
    participant::{self, Id, Registry},
    question::Question,
};

/// A single graded answer, recorded once and never mutated
///
/// A `None` chosen option means the participant was timed out without
/// answering; it is always graded incorrect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRecord {
    /// The participant who answered (or was timed out)
    participant_id: Id,
    /// Index of the question this record belongs to
    question_index: usize,
    /// The chosen option index, or `None` for a timeout
    chosen_option: Option<usize>,
    /// Whether the chosen option was the correct one
    correct: bool,
    /// When the record was created
    submitted_at: SystemTime,
}

impl AnswerRecord {
    /// Returns the participant this record belongs to
    pub fn participant_id(&self) -> Id {
        self.participant_id
    }

    /// Returns the question index this record belongs to
    pub fn question_index(&self) -> usize {
        self.question_index
    }

    /// Returns the chosen option index, or `None` for a timeout
    pub fn chosen_option(&self) -> Option<usize> {
        self.chosen_option
    }

    /// Returns whether the answer was correct
    pub fn correct(&self) -> bool {
        self.correct
    }

    /// Returns when the record was created
    pub fn submitted_at(&self) -> SystemTime {
        self.submitted_at
    }
}

/// Serialization helper for the AnswerLedger struct
#[derive(Deserialize)]
struct LedgerSerde {
    records: Vec<AnswerRecord>,
}

/// Records at most one answer per (participant, question) pair
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(from = "LedgerSerde")]
pub struct AnswerLedger {
    /// All records in submission order
    records: Vec<AnswerRecord>,

    /// Lookup from (participant, question) to position in `records`
    /// (rebuilt on deserialize)
    #[serde(skip_serializing)]
    index: HashMap<(Id, usize), usize>,
}

impl From<LedgerSerde> for AnswerLedger {
    /// Reconstructs the AnswerLedger from serialized data
    ///
    /// This rebuilds the pair lookup from the record list, which is
    /// necessary since the lookup is not serialized.
    fn from(serde: LedgerSerde) -> Self {
        let LedgerSerde { records } = serde;
        let index = records
            .iter()
            .enumerate()
            .map(|(position, record)| ((record.participant_id, record.question_index), position))
            .collect();
        Self { records, index }
    }
}

impl AnswerLedger {
    /// Records an answer (or timeout) for a (participant, question) pair
    ///
    /// If a record already exists for the pair, the call is a no-op that
    /// returns the existing record; the first submission wins. Otherwise
    /// the choice is graded against `question`, the record is stored, and
    /// a correct answer increments the participant's score in `registry`.
    ///
    /// # Arguments
    ///
    /// * `registry` - Registry to validate the participant and score against
    /// * `participant_id` - The submitting participant
    /// * `question_index` - Index of the question being answered
    /// * `question` - The question used for grading
    /// * `choice` - The chosen option index, or `None` for a timeout
    ///
    /// # Errors
    ///
    /// Returns [`participant::Error::UnknownParticipant`] if the
    /// participant is not registered. Prior state is left unchanged.
    pub fn submit(
        &mut self,
        registry: &mut Registry,
        participant_id: Id,
        question_index: usize,
        question: &Question,
        choice: Option<usize>,
    ) -> Result<&AnswerRecord, participant::Error> {
        registry.get(participant_id)?;

        if let Some(position) = self.index.get(&(participant_id, question_index)) {
            return Ok(&self.records[*position]);
        }

        let correct = question.is_correct(choice);
        if correct {
            registry.record_correct(participant_id)?;
        }

        let position = self.records.len();
        self.records.push(AnswerRecord {
            participant_id,
            question_index,
            chosen_option: choice,
            correct,
            submitted_at: SystemTime::now(),
        });
        self.index
            .insert((participant_id, question_index), position);

        Ok(&self.records[position])
    }

    /// Checks whether a record exists for a (participant, question) pair
    pub fn has_answer(&self, participant_id: Id, question_index: usize) -> bool {
        self.index.contains_key(&(participant_id, question_index))
    }

    /// Counts the records for a given question
    pub fn count_for_question(&self, question_index: usize) -> usize {
        self.records
            .iter()
            .filter(|record| record.question_index == question_index)
            .count()
    }

    /// Returns all records for a given question in submission order
    pub fn records_for_question(&self, question_index: usize) -> Vec<&AnswerRecord> {
        self.records
            .iter()
            .filter(|record| record.question_index == question_index)
            .collect()
    }

    /// Returns the participants from `all_participants` that have no
    /// record for the given question
    ///
    /// Set difference between the supplied participants and those with a
    /// record; the timeout sweep feeds this back into [`Self::submit`].
    pub fn participants_without_answer(
        &self,
        question_index: usize,
        all_participants: impl IntoIterator<Item = Id>,
    ) -> HashSet<Id> {
        let answered: HashSet<Id> = self
            .records
            .iter()
            .filter(|record| record.question_index == question_index)
            .map(|record| record.participant_id)
            .collect();

        all_participants
            .into_iter()
            .filter(|id| !answered.contains(id))
            .collect()
    }

    /// Returns the total number of records in the ledger
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Checks whether the ledger holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Removes all records (used by round reset)
    pub fn clear(&mut self) {
        self.records.clear();
        self.index.clear();
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::question::QuestionBank;

    fn test_bank() -> QuestionBank {
        QuestionBank::from_json(
            r#"{
                "questions": [
                    {"question": "Q0?", "options": ["a", "b", "c"], "correct_answer": 2},
                    {"question": "Q1?", "options": ["a", "b"], "correct_answer": 0}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_submit_correct_answer_scores() {
        let bank = test_bank();
        let mut registry = Registry::default();
        let mut ledger = AnswerLedger::default();
        let id = registry.register("Alice", 2).unwrap();

        let record = ledger
            .submit(&mut registry, id, 0, bank.get(0).unwrap(), Some(2))
            .unwrap();

        assert!(record.correct());
        assert_eq!(record.chosen_option(), Some(2));
        assert_eq!(registry.get(id).unwrap().score(), 1);
    }

    #[test]
    fn test_submit_incorrect_answer_does_not_score() {
        let bank = test_bank();
        let mut registry = Registry::default();
        let mut ledger = AnswerLedger::default();
        let id = registry.register("Alice", 2).unwrap();

        let record = ledger
            .submit(&mut registry, id, 0, bank.get(0).unwrap(), Some(0))
            .unwrap();

        assert!(!record.correct());
        assert_eq!(registry.get(id).unwrap().score(), 0);
    }

    #[test]
    fn test_submit_timeout_is_incorrect() {
        let bank = test_bank();
        let mut registry = Registry::default();
        let mut ledger = AnswerLedger::default();
        let id = registry.register("Alice", 2).unwrap();

        let record = ledger
            .submit(&mut registry, id, 0, bank.get(0).unwrap(), None)
            .unwrap();

        assert!(!record.correct());
        assert_eq!(record.chosen_option(), None);
    }

    #[test]
    fn test_resubmission_is_ignored() {
        let bank = test_bank();
        let mut registry = Registry::default();
        let mut ledger = AnswerLedger::default();
        let id = registry.register("Alice", 2).unwrap();

        ledger
            .submit(&mut registry, id, 0, bank.get(0).unwrap(), Some(0))
            .unwrap();
        // Second submission with the correct answer must not overwrite
        // the first or award a point.
        let record = ledger
            .submit(&mut registry, id, 0, bank.get(0).unwrap(), Some(2))
            .unwrap();

        assert_eq!(record.chosen_option(), Some(0));
        assert!(!record.correct());
        assert_eq!(ledger.count_for_question(0), 1);
        assert_eq!(registry.get(id).unwrap().score(), 0);
    }

    #[test]
    fn test_resubmitting_correct_answer_does_not_double_score() {
        let bank = test_bank();
        let mut registry = Registry::default();
        let mut ledger = AnswerLedger::default();
        let id = registry.register("Alice", 2).unwrap();

        ledger
            .submit(&mut registry, id, 0, bank.get(0).unwrap(), Some(2))
            .unwrap();
        ledger
            .submit(&mut registry, id, 0, bank.get(0).unwrap(), Some(2))
            .unwrap();

        assert_eq!(registry.get(id).unwrap().score(), 1);
    }

    #[test]
    fn test_submit_unknown_participant() {
        let bank = test_bank();
        let mut registry = Registry::default();
        let mut ledger = AnswerLedger::default();
        let unknown = Id::new();

        let result = ledger.submit(&mut registry, unknown, 0, bank.get(0).unwrap(), Some(0));

        assert!(matches!(
            result,
            Err(participant::Error::UnknownParticipant(_))
        ));
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_same_participant_different_questions() {
        let bank = test_bank();
        let mut registry = Registry::default();
        let mut ledger = AnswerLedger::default();
        let id = registry.register("Alice", 2).unwrap();

        ledger
            .submit(&mut registry, id, 0, bank.get(0).unwrap(), Some(2))
            .unwrap();
        ledger
            .submit(&mut registry, id, 1, bank.get(1).unwrap(), Some(0))
            .unwrap();

        assert_eq!(ledger.len(), 2);
        assert_eq!(registry.get(id).unwrap().score(), 2);
    }

    #[test]
    fn test_participants_without_answer() {
        let bank = test_bank();
        let mut registry = Registry::default();
        let mut ledger = AnswerLedger::default();
        let answered = registry.register("Alice", 2).unwrap();
        let silent = registry.register("Bob", 2).unwrap();

        ledger
            .submit(&mut registry, answered, 0, bank.get(0).unwrap(), Some(1))
            .unwrap();

        let missing = ledger.participants_without_answer(0, registry.ids().collect::<Vec<_>>());

        assert_eq!(missing.len(), 1);
        assert!(missing.contains(&silent));
    }

    #[test]
    fn test_count_for_question_ignores_other_questions() {
        let bank = test_bank();
        let mut registry = Registry::default();
        let mut ledger = AnswerLedger::default();
        let id = registry.register("Alice", 2).unwrap();

        ledger
            .submit(&mut registry, id, 1, bank.get(1).unwrap(), Some(0))
            .unwrap();

        assert_eq!(ledger.count_for_question(0), 0);
        assert_eq!(ledger.count_for_question(1), 1);
    }

    #[test]
    fn test_clear_removes_all_records() {
        let bank = test_bank();
        let mut registry = Registry::default();
        let mut ledger = AnswerLedger::default();
        let id = registry.register("Alice", 2).unwrap();

        ledger
            .submit(&mut registry, id, 0, bank.get(0).unwrap(), Some(2))
            .unwrap();
        ledger.clear();

        assert!(ledger.is_empty());
        assert!(!ledger.has_answer(id, 0));
    }
}
