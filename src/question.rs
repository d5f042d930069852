//! Question bank loading and lookup
//!
//! This module owns the ordered, immutable sequence of questions for the
//! process. The bank is loaded once at startup from a JSON source, fully
//! validated, and never mutated afterwards. Every other component refers
//! to questions by their dense 0-based index in this bank.

use std::path::Path;

use garde::Validate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while loading or consulting the question bank
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The backing resource could not be read at all
    #[error("question source could not be read: {0}")]
    Unreadable(String),
    /// The backing resource is not valid structured data
    #[error("question source is not valid JSON: {0}")]
    Malformed(String),
    /// A question in the source failed validation
    #[error("question {index} is invalid: {message}")]
    Invalid {
        /// Index of the offending question in the source
        index: usize,
        /// Description of the validation failure
        message: String,
    },
    /// The source holds more questions than the bank allows
    #[error("question source holds {count} questions, limit is {limit}")]
    TooManyQuestions {
        /// Number of questions in the source
        count: usize,
        /// Maximum number of questions allowed
        limit: usize,
    },
    /// A question index was outside the bank's range
    #[error("question index {index} is out of range (bank holds {count})")]
    NotFound {
        /// The requested index
        index: usize,
        /// Number of questions in the bank
        count: usize,
    },
}

/// A single multiple choice question
///
/// Questions are immutable once loaded. The `correct_option` field indexes
/// into `options`; submissions are graded by comparing the chosen index
/// against it.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Question {
    /// The prompt text shown to participants
    #[garde(length(max = crate::constants::question::MAX_PROMPT_LENGTH))]
    #[serde(rename = "question")]
    prompt: String,
    /// The ordered list of answer options
    #[garde(
        length(
            min = crate::constants::question::MIN_OPTION_COUNT,
            max = crate::constants::question::MAX_OPTION_COUNT,
        ),
        inner(length(max = crate::constants::question::MAX_OPTION_LENGTH)),
    )]
    options: Vec<String>,
    /// Index of the correct option (validated against `options` at load)
    #[garde(skip)]
    #[serde(rename = "correct_answer")]
    correct_option: usize,
}

impl Question {
    /// Returns the prompt text
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Returns the ordered answer options
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Returns the index of the correct option
    pub fn correct_option(&self) -> usize {
        self.correct_option
    }

    /// Grades a chosen option against this question
    ///
    /// A `None` choice (timeout, no answer) is always incorrect.
    pub fn is_correct(&self, choice: Option<usize>) -> bool {
        choice == Some(self.correct_option)
    }
}

/// Serialization shape of the question source
///
/// Matches the external configuration format: a top-level object with a
/// `questions` array.
#[derive(Debug, Deserialize)]
struct QuestionSource {
    questions: Vec<Question>,
}

/// The ordered, immutable sequence of questions for the process
///
/// Loaded once at startup; read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    /// Builds a bank from an already-parsed list of questions
    ///
    /// Validates every question the same way [`QuestionBank::from_json`]
    /// does.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Invalid`] or [`Error::TooManyQuestions`] if the
    /// list fails validation.
    pub fn new(questions: Vec<Question>) -> Result<Self, Error> {
        let limit = crate::constants::question::MAX_QUESTION_COUNT;
        if questions.len() > limit {
            return Err(Error::TooManyQuestions {
                count: questions.len(),
                limit,
            });
        }

        for (index, question) in questions.iter().enumerate() {
            question.validate().map_err(|report| Error::Invalid {
                index,
                message: report.to_string(),
            })?;

            if question.correct_option >= question.options.len() {
                return Err(Error::Invalid {
                    index,
                    message: format!(
                        "correct_answer {} does not index into {} options",
                        question.correct_option,
                        question.options.len()
                    ),
                });
            }
        }

        Ok(Self { questions })
    }

    /// Parses and validates a bank from the JSON source format
    ///
    /// The expected shape is `{"questions": [{"question", "options",
    /// "correct_answer"}, ..]}`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`] if the input is not valid JSON of that
    /// shape, or the validation errors of [`QuestionBank::new`].
    pub fn from_json(source: &str) -> Result<Self, Error> {
        let source: QuestionSource =
            serde_json::from_str(source).map_err(|e| Error::Malformed(e.to_string()))?;

        Self::new(source.questions)
    }

    /// Loads and validates a bank from a JSON file
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unreadable`] if the file is missing or unreadable,
    /// or the parsing/validation errors of [`QuestionBank::from_json`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let source =
            std::fs::read_to_string(path).map_err(|e| Error::Unreadable(e.to_string()))?;

        Self::from_json(&source)
    }

    /// Looks up a question by its 0-based index
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if `index` is outside `[0, count)`.
    pub fn get(&self, index: usize) -> Result<&Question, Error> {
        self.questions.get(index).ok_or(Error::NotFound {
            index,
            count: self.questions.len(),
        })
    }

    /// Returns the number of questions in the bank
    pub fn count(&self) -> usize {
        self.questions.len()
    }

    /// Checks whether the bank holds no questions
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
