//! Round state machine: countdown, timeout sweep, and progression
//!
//! This module owns the single shared round of the process: the current
//! question index, the per-question countdown, and the active flag,
//! together with the participant registry and answer ledger it arbitrates.
//! All timing and scoring decisions happen here, server-side; clients only
//! observe the [`Status`] payload.
//!
//! Every mutating operation takes `&mut self`, so a host application gets
//! the single-writer discipline of the design by putting the `Round`
//! behind one mutex (or equivalent). The timeout sweep is deliberately
//! part of a mutating method, [`Round::poll_status`], rather than hidden
//! behind a read-shaped call.

use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use tracing::{debug, warn};
use web_time::{Duration, SystemTime};

use super::{
    Error, TruncatedVec, leaderboard,
    leaderboard::Standing,
    ledger::AnswerLedger,
    participant::{self, Id, Participant, Registry},
    question::QuestionBank,
};

/// The lifecycle phase of the round
///
/// The initial phase is `InProgress(0)`; there is no separate not-started
/// phase, the clock simply restarts when the first participant of a fresh
/// round registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    /// The round is on the given question index
    InProgress(usize),
    /// The round has advanced past its last question
    Complete,
}

/// Response payload for a successful registration
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Registration {
    /// Identifier assigned to the new participant
    pub participant_id: Id,
    /// Total number of questions in the round
    pub total_questions: usize,
}

/// Response payload for an answer submission
///
/// Reports the stored record's correctness (the first submission wins, so
/// a resubmission reports the original grading), the correct option for
/// client-side reveal, and the participant's updated score.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SubmitOutcome {
    /// Whether the stored answer was correct
    pub correct: bool,
    /// Index of the correct option for the submitted question
    pub correct_option: usize,
    /// The participant's cumulative score after this submission
    pub score: u64,
    /// Total number of questions in the round
    pub total_questions: usize,
}

/// Result of an advance transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AdvanceOutcome {
    /// The round moved on to the given question index
    Advanced {
        /// The new current question index
        new_question_index: usize,
    },
    /// The round is complete (advancing past the end is an idempotent
    /// no-op that keeps returning this)
    Complete,
}

/// Status payload returned by [`Round::poll_status`]
#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Status {
    /// The current question index
    pub current_question_index: usize,
    /// Time remaining on the current question's countdown, in seconds
    #[serde_as(as = "serde_with::DurationSecondsWithFrac<f64>")]
    pub time_remaining: Duration,
    /// Whether every registered participant has a record for the current
    /// question
    pub all_answered: bool,
    /// Number of registered participants
    pub total_participants: usize,
    /// Number of records for the current question
    pub answered_count: usize,
    /// Whether the round is still in progress
    pub active: bool,
}

/// Diagnostic snapshot of the full round state
///
/// Read-only view for operator inspection; unlike [`Round::poll_status`]
/// it never runs the timeout sweep.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    /// The current question index
    pub current_question_index: usize,
    /// When the current question's countdown started
    pub question_start_time: SystemTime,
    /// Whether the round is still in progress
    pub active: bool,
    /// All registered participants in registration order
    pub participants: Vec<Participant>,
    /// Chosen options recorded for the current question, by participant
    pub current_answers: Vec<(Id, Option<usize>)>,
}

/// The single shared round of the process
///
/// Owns the question bank, participant registry, answer ledger, and the
/// round-state fields; it is the one source of truth every status query
/// consults.
#[serde_as]
#[derive(Debug, Serialize, Deserialize)]
pub struct Round {
    /// The immutable question sequence
    bank: QuestionBank,
    /// Fixed countdown per question
    #[serde_as(as = "serde_with::DurationSecondsWithFrac<f64>")]
    question_duration: Duration,
    /// Registered participants and their scores
    registry: Registry,
    /// Recorded answers and timeouts
    ledger: AnswerLedger,
    /// The current question index (monotonically non-decreasing within a
    /// round)
    current_question_index: usize,
    /// When the current question's countdown started
    question_start_time: SystemTime,
    /// True while the round is in progress
    active: bool,
}

impl Round {
    /// Creates a round over the given bank with the default per-question
    /// duration
    pub fn new(bank: QuestionBank) -> Self {
        Self::with_question_duration(
            bank,
            Duration::from_secs(crate::constants::round::DEFAULT_QUESTION_DURATION),
        )
    }

    /// Creates a round with an explicit per-question duration
    ///
    /// The duration is clamped to the configured bounds.
    pub fn with_question_duration(bank: QuestionBank, question_duration: Duration) -> Self {
        let question_duration = question_duration.clamp(
            Duration::from_secs(crate::constants::round::MIN_QUESTION_DURATION),
            Duration::from_secs(crate::constants::round::MAX_QUESTION_DURATION),
        );

        Self {
            bank,
            question_duration,
            registry: Registry::default(),
            ledger: AnswerLedger::default(),
            current_question_index: 0,
            question_start_time: SystemTime::now(),
            active: true,
        }
    }

    /// Returns the question bank
    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    /// Returns the participant registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Returns the answer ledger
    pub fn ledger(&self) -> &AnswerLedger {
        &self.ledger
    }

    /// Returns the fixed per-question duration
    pub fn question_duration(&self) -> Duration {
        self.question_duration
    }

    /// Returns the current lifecycle phase
    pub fn phase(&self) -> Phase {
        if self.active {
            Phase::InProgress(self.current_question_index)
        } else {
            Phase::Complete
        }
    }

    /// Registers a new participant
    ///
    /// The first participant of a fresh round (empty registry) restarts
    /// the clock: index 0, fresh start time, active. This is distinct
    /// from [`Round::reset_to_start`], which also discards participants
    /// and answers.
    ///
    /// # Errors
    ///
    /// Returns [`participant::Error::MaximumParticipants`] if the round
    /// is full.
    pub fn register(&mut self, name: &str) -> Result<Registration, participant::Error> {
        let first_of_round = self.registry.is_empty();

        let participant_id = self.registry.register(name, self.bank.count())?;

        if first_of_round {
            self.current_question_index = 0;
            self.question_start_time = SystemTime::now();
            self.active = true;
            debug!(%participant_id, "first registration restarted the round clock");
        }

        Ok(Registration {
            participant_id,
            total_questions: self.bank.count(),
        })
    }

    /// Submits an answer for a question
    ///
    /// Idempotent per (participant, question): the first submission wins
    /// and later calls report the originally stored grading. A correct
    /// first submission increments the participant's score.
    ///
    /// # Arguments
    ///
    /// * `participant_id` - The submitting participant
    /// * `question_index` - Index of the question being answered
    /// * `choice` - The chosen option index, or `None` for no answer
    ///
    /// # Errors
    ///
    /// Returns an error for an out-of-range question index or an unknown
    /// participant; prior state is left unchanged.
    pub fn submit_answer(
        &mut self,
        participant_id: Id,
        question_index: usize,
        choice: Option<usize>,
    ) -> Result<SubmitOutcome, Error> {
        let question = self.bank.get(question_index)?;

        let record = self.ledger.submit(
            &mut self.registry,
            participant_id,
            question_index,
            question,
            choice,
        )?;
        let correct = record.correct();

        let score = self.registry.get(participant_id)?.score();

        Ok(SubmitOutcome {
            correct,
            correct_option: question.correct_option(),
            score,
            total_questions: self.bank.count(),
        })
    }

    /// Polls the round status, timing out stragglers when the countdown
    /// has expired
    ///
    /// Computes the remaining time and answer counts for the current
    /// question. When the countdown has expired and not everyone has
    /// answered, every participant without a record is given a timeout
    /// record (no answer, incorrect) before the counts are recomputed.
    /// The sweep is best-effort: a failure to record one participant is
    /// logged and does not block the others, and the ledger's
    /// at-most-one-record invariant makes repeated polls idempotent in
    /// net effect.
    ///
    /// Once everyone has answered, the reported remaining time is forced
    /// to zero; advancing to the next question remains a separate,
    /// explicit transition.
    pub fn poll_status(&mut self) -> Status {
        let elapsed = self.question_start_time.elapsed().unwrap_or_default();
        let mut time_remaining = self.question_duration.saturating_sub(elapsed);

        let total_participants = self.registry.count();
        let mut answered_count = self.ledger.count_for_question(self.current_question_index);
        let mut all_answered = total_participants > 0 && answered_count >= total_participants;

        if time_remaining.is_zero() && !all_answered {
            self.sweep_timeouts();

            answered_count = self.ledger.count_for_question(self.current_question_index);
            all_answered = total_participants > 0 && answered_count >= total_participants;
        }

        if all_answered {
            time_remaining = Duration::ZERO;
        }

        Status {
            current_question_index: self.current_question_index,
            time_remaining,
            all_answered,
            total_participants,
            answered_count,
            active: self.active,
        }
    }

    /// Records a timeout for every participant without an answer to the
    /// current question
    fn sweep_timeouts(&mut self) {
        let Ok(question) = self.bank.get(self.current_question_index) else {
            // Empty bank: nothing to time out against.
            return;
        };
        let question = question.clone();

        let participant_ids: Vec<Id> = self.registry.ids().collect();
        let missing = self
            .ledger
            .participants_without_answer(self.current_question_index, participant_ids);

        for participant_id in missing {
            if let Err(error) = self.ledger.submit(
                &mut self.registry,
                participant_id,
                self.current_question_index,
                &question,
                None,
            ) {
                warn!(%participant_id, %error, "timeout sweep skipped a participant");
            }
        }

        debug!(
            question_index = self.current_question_index,
            "timeout sweep completed"
        );
    }

    /// Advances to the next question, or completes the round
    ///
    /// Advancing refreshes the countdown. Advancing from the last
    /// question sets the round inactive and returns
    /// [`AdvanceOutcome::Complete`]; advancing an already-complete round
    /// is an idempotent no-op that returns the same (it never errors).
    pub fn advance(&mut self) -> AdvanceOutcome {
        if !self.active {
            return AdvanceOutcome::Complete;
        }

        if self.current_question_index + 1 < self.bank.count() {
            self.current_question_index += 1;
            self.question_start_time = SystemTime::now();
            debug!(
                new_question_index = self.current_question_index,
                "advanced to next question"
            );
            AdvanceOutcome::Advanced {
                new_question_index: self.current_question_index,
            }
        } else {
            self.active = false;
            debug!("round complete");
            AdvanceOutcome::Complete
        }
    }

    /// Resets the round to its starting state
    ///
    /// Index 0, fresh start time, active; all participants and answers
    /// are discarded. Valid from any state.
    pub fn reset_to_start(&mut self) {
        self.current_question_index = 0;
        self.question_start_time = SystemTime::now();
        self.active = true;
        self.ledger.clear();
        self.registry.clear();
        debug!("round reset to start");
    }

    /// Derives the top-N leaderboard standings
    pub fn leaderboard(&self, limit: usize) -> TruncatedVec<Standing> {
        leaderboard::top(&self.registry, limit)
    }

    /// Returns a diagnostic snapshot of the full round state
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            current_question_index: self.current_question_index,
            question_start_time: self.question_start_time,
            active: self.active,
            participants: self.registry.all().to_vec(),
            current_answers: self
                .ledger
                .records_for_question(self.current_question_index)
                .into_iter()
                .map(|record| (record.participant_id(), record.chosen_option()))
                .collect(),
        }
    }
}
