//! Quiz Generation Module
//!
//! Structured quiz generation on top of retrieved context: batch
//! question/answer sets, single multiple-choice questions, and the
//! interactive session state machine that drives them.

pub mod generator;
pub mod interactive;
pub mod session;
pub mod types;

pub use generator::{QuizGenerator, MAX_QUESTIONS, MIN_QUESTIONS};
pub use interactive::QuestionGenerator;
pub use session::{AnswerFeedback, QuizSession, ScoreSummary, SessionConfig, SessionError};
pub use types::{
    Difficulty, GenerationError, MultipleChoiceQuestion, QuestionRecord, Quiz, SchemaViolation,
};
