//! Configuration constants for the quiz round system
//!
//! This module contains the configuration limits and defaults used
//! throughout the round system to ensure data integrity and provide
//! consistent boundaries for the different components.

/// Question bank configuration constants
pub mod question {
    /// Maximum number of questions allowed in a single bank
    pub const MAX_QUESTION_COUNT: usize = 100;
    /// Maximum length of a question prompt in characters
    pub const MAX_PROMPT_LENGTH: usize = 200;
    /// Minimum number of answer options for a question
    pub const MIN_OPTION_COUNT: usize = 2;
    /// Maximum number of answer options for a question
    pub const MAX_OPTION_COUNT: usize = 8;
    /// Maximum length of a single answer option in characters
    pub const MAX_OPTION_LENGTH: usize = 200;
}

/// Round timing configuration constants
pub mod round {
    /// Default time in seconds participants have to answer each question
    pub const DEFAULT_QUESTION_DURATION: u64 = 12;
    /// Minimum configurable per-question duration in seconds
    pub const MIN_QUESTION_DURATION: u64 = 1;
    /// Maximum configurable per-question duration in seconds
    pub const MAX_QUESTION_DURATION: u64 = 240;
}

/// Participant registry configuration constants
pub mod participant {
    /// Maximum number of participants allowed in a single round
    pub const MAX_PARTICIPANT_COUNT: usize = 1000;
    /// Name assigned to participants who register with a blank name
    pub const PLACEHOLDER_NAME: &str = "Anonymous";
}

/// Leaderboard configuration constants
pub mod leaderboard {
    /// Default number of entries returned by the leaderboard view
    pub const DEFAULT_TOP_COUNT: usize = 3;
}
