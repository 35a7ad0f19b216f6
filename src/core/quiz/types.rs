//! Quiz Data Types
//!
//! Wire shapes for generated quizzes plus the schema validators applied
//! immediately after parsing a model response. A response that fails
//! validation is a contract breach with the generation service and is
//! surfaced as a typed error, never silently repaired.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::core::index::IndexError;
use crate::core::llm::LlmError;

/// Options per multiple-choice question.
pub const OPTION_COUNT: usize = 4;

// ============================================================================
// Error Types
// ============================================================================

/// Structured response failed to match the required shape.
#[derive(Error, Debug)]
pub enum SchemaViolation {
    #[error("expected {expected} options, got {got}")]
    OptionCount { expected: usize, got: usize },

    #[error("expected {expected} explanations, got {got}")]
    ExplanationCount { expected: usize, got: usize },

    #[error("correct answer {0:?} is not one of the options")]
    CorrectAnswerMissing(String),

    #[error("expected {expected} questions, got {got}")]
    QuestionCount { expected: usize, got: usize },

    #[error("unknown difficulty label {0:?}")]
    UnknownDifficulty(String),

    #[error("malformed model payload: {0}")]
    Malformed(String),
}

/// Failure modes of a generation call.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// The model declined due to content policy. Recoverable: report and
    /// retry without touching session state.
    #[error("model refused to generate: {0}")]
    Refused(String),

    /// Contract breach with the generation service. Fatal.
    #[error("response schema violation: {0}")]
    Schema(#[from] SchemaViolation),

    #[error("unsupported question count: {0}")]
    InvalidCount(usize),

    #[error(transparent)]
    Llm(LlmError),

    #[error(transparent)]
    Index(#[from] IndexError),
}

impl From<LlmError> for GenerationError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Refused(text) => GenerationError::Refused(text),
            other => GenerationError::Llm(other),
        }
    }
}

impl GenerationError {
    /// True for the recoverable content-policy refusal.
    pub fn is_refusal(&self) -> bool {
        matches!(self, GenerationError::Refused(_))
    }
}

// ============================================================================
// Difficulty
// ============================================================================

/// Question difficulty level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = SchemaViolation;

    /// Case-normalized parse: "easy", "Easy", and "EASY" are equivalent.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(SchemaViolation::UnknownDifficulty(other.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for Difficulty {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Batch Types
// ============================================================================

/// A single question/answer pair from batch generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub difficulty: Difficulty,
    pub question: String,
    pub answer: String,
}

/// An ordered set of question/answer records. The 40/40/20
/// Easy/Medium/Hard distribution is a prompt target, not enforced here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    pub questions: Vec<QuestionRecord>,
}

// ============================================================================
// Interactive Types
// ============================================================================

/// A four-option multiple-choice question with per-option explanations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultipleChoiceQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    /// Positionally aligned with `options`.
    pub explanations: Vec<String>,
}

impl MultipleChoiceQuestion {
    /// Check the structural invariants: exactly four options, one
    /// explanation per option, and a correct answer present among the
    /// options.
    pub fn validate(&self) -> Result<(), SchemaViolation> {
        if self.options.len() != OPTION_COUNT {
            return Err(SchemaViolation::OptionCount {
                expected: OPTION_COUNT,
                got: self.options.len(),
            });
        }
        if self.explanations.len() != OPTION_COUNT {
            return Err(SchemaViolation::ExplanationCount {
                expected: OPTION_COUNT,
                got: self.explanations.len(),
            });
        }
        if !self.options.contains(&self.correct_answer) {
            return Err(SchemaViolation::CorrectAnswerMissing(
                self.correct_answer.clone(),
            ));
        }
        Ok(())
    }

    /// Position of the correct answer among the options.
    pub fn correct_index(&self) -> Option<usize> {
        self.options.iter().position(|o| o == &self.correct_answer)
    }
}
