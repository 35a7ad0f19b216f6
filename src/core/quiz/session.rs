//! Interactive Quiz Session
//!
//! The state machine driving interactive rounds: generate a question from
//! freshly retrieved context, capture an answer, score it, and report
//! feedback. All state lives in the session object and is mutated only in
//! the caller's request/response turns.

use std::fmt;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use thiserror::Error;

use crate::core::index::VectorIndex;
use crate::core::llm::LlmProvider;
use crate::core::quiz::interactive::QuestionGenerator;
use crate::core::quiz::types::{Difficulty, GenerationError, MultipleChoiceQuestion};

/// Generic retrieval prompts, one picked at random per round so successive
/// questions draw on different parts of the document.
pub const RETRIEVAL_QUERIES: [&str; 5] = ["what", "how", "why", "describe", "explain"];

// ============================================================================
// Error Types
// ============================================================================

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("no question is awaiting an answer")]
    NoActiveQuestion,
}

// ============================================================================
// Session Configuration
// ============================================================================

/// Parameters for an interactive session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub difficulty: Difficulty,
    /// Chunks retrieved as context per round.
    pub top_k: usize,
    /// Seed for the retrieval-query choice; None draws from entropy.
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Medium,
            top_k: 2,
            seed: None,
        }
    }
}

// ============================================================================
// Feedback
// ============================================================================

/// Outcome of one answered round.
#[derive(Debug, Clone)]
pub struct AnswerFeedback {
    pub is_correct: bool,
    /// Text of the option the user picked, if the selection was valid.
    pub selected: Option<String>,
    pub correct_answer: String,
    /// `(option, explanation)` pairs in option order.
    pub options: Vec<(String, String)>,
}

impl AnswerFeedback {
    /// Human-readable verdict, correct answer, and per-option
    /// explanations.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if self.is_correct {
            out.push_str("Correct!\n");
        } else {
            out.push_str(&format!(
                "Incorrect. The correct answer is: {}\n",
                self.correct_answer
            ));
        }
        out.push('\n');
        for (option, explanation) in &self.options {
            out.push_str(&format!("- {option}: {explanation}\n"));
        }
        out
    }
}

/// Final score of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreSummary {
    pub score: u32,
    pub questions_asked: u32,
}

impl fmt::Display for ScoreSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.score, self.questions_asked)
    }
}

// ============================================================================
// Quiz Session
// ============================================================================

/// Interactive quiz session over a built index and a chat capability.
///
/// Callers drive the session in strict request/response turns; no
/// concurrent generation or submission against the same session is
/// supported.
pub struct QuizSession {
    index: Arc<VectorIndex>,
    generator: QuestionGenerator,
    difficulty: Difficulty,
    top_k: usize,
    rng: StdRng,
    score: u32,
    questions_asked: u32,
    current_question: Option<MultipleChoiceQuestion>,
}

impl QuizSession {
    pub fn new(index: Arc<VectorIndex>, llm: Arc<dyn LlmProvider>, config: SessionConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            index,
            generator: QuestionGenerator::new(llm),
            difficulty: config.difficulty,
            top_k: config.top_k.max(1),
            rng,
            score: 0,
            questions_asked: 0,
            current_question: None,
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn questions_asked(&self) -> u32 {
        self.questions_asked
    }

    pub fn current_question(&self) -> Option<&MultipleChoiceQuestion> {
        self.current_question.as_ref()
    }

    /// Generate the next question: retrieve fresh context under a randomly
    /// chosen generic query, then ask the model for one question at the
    /// session difficulty.
    ///
    /// On any error, including a refusal, no session state is mutated,
    /// so the caller can report the failure and retry.
    pub async fn next_question(&mut self) -> Result<&MultipleChoiceQuestion, GenerationError> {
        let query = RETRIEVAL_QUERIES
            .choose(&mut self.rng)
            .copied()
            .unwrap_or("what");

        tracing::debug!("retrieving context for query {query:?}");
        let context = self.index.retrieve_context(query, self.top_k).await?;
        let question = self.generator.generate(&context, self.difficulty).await?;

        Ok(self.current_question.insert(question))
    }

    /// Score a submitted answer against the current question.
    ///
    /// An out-of-range or absent selection counts as an incorrect answer
    /// by policy, not an error. `questions_asked` always advances;
    /// `score` advances only on a correct answer. The question stays
    /// current until the next [`Self::next_question`] call.
    pub fn submit_answer(
        &mut self,
        selection: Option<usize>,
    ) -> Result<AnswerFeedback, SessionError> {
        let question = self
            .current_question
            .as_ref()
            .ok_or(SessionError::NoActiveQuestion)?;

        let selected = selection.and_then(|i| question.options.get(i)).cloned();
        let is_correct = selected.as_deref() == Some(question.correct_answer.as_str());

        self.questions_asked += 1;
        if is_correct {
            self.score += 1;
        }

        Ok(AnswerFeedback {
            is_correct,
            selected,
            correct_answer: question.correct_answer.clone(),
            options: question
                .options
                .iter()
                .cloned()
                .zip(question.explanations.iter().cloned())
                .collect(),
        })
    }

    /// Final `score/questions_asked` summary; reports `0/0` cleanly when
    /// nothing was ever answered.
    pub fn summary(&self) -> ScoreSummary {
        ScoreSummary {
            score: self.score,
            questions_asked: self.questions_asked,
        }
    }
}
