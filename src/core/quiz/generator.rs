//! Batch Quiz Generator
//!
//! Produces a fixed-size set of question/answer records from a retrieved
//! context block in a single structured model call.

use std::sync::Arc;

use crate::core::llm::{ChatMessage, ChatRequest, LlmProvider};
use crate::core::quiz::types::{GenerationError, Quiz, SchemaViolation};

/// Smallest batch the generator will produce.
pub const MIN_QUESTIONS: usize = 5;
/// Largest batch the generator will produce.
pub const MAX_QUESTIONS: usize = 20;

/// System prompt for batch quiz generation.
///
/// The 40/40/20 Easy/Medium/Hard split is a target for the model, not
/// verified client-side.
const BATCH_SYSTEM_PROMPT: &str = "You are a quiz writer. You create quiz questions and answers \
strictly from the provided study material. Respond with a single JSON object and nothing else.";

/// User prompt template for batch quiz generation.
///
/// Expected substitutions:
/// - count: number of questions to produce
/// - context: the retrieved context block
fn batch_prompt(count: usize, context: &str) -> String {
    format!(
        r#"Use the following context to create a quiz.
Create exactly {count} questions and answers; make 40% of the questions easy, 40% medium, and 20% hard.
Respond with a JSON object of this exact shape:
{{"questions": [{{"difficulty": "Easy" | "Medium" | "Hard", "question": "...", "answer": "..."}}]}}

Context:
{context}"#
    )
}

/// Batch quiz generator over a chat-completion capability.
pub struct QuizGenerator {
    llm: Arc<dyn LlmProvider>,
}

impl QuizGenerator {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    /// Generate exactly `count` question/answer records from `context`.
    ///
    /// A content-policy refusal returns the recoverable
    /// [`GenerationError::Refused`]; a response that does not match the
    /// declared shape is a fatal [`GenerationError::Schema`].
    pub async fn generate(&self, context: &str, count: usize) -> Result<Quiz, GenerationError> {
        if !(MIN_QUESTIONS..=MAX_QUESTIONS).contains(&count) {
            return Err(GenerationError::InvalidCount(count));
        }

        let request = ChatRequest::new(vec![
            ChatMessage::system(BATCH_SYSTEM_PROMPT),
            ChatMessage::user(batch_prompt(count, context)),
        ])
        .with_json_mode();

        tracing::info!("requesting batch quiz: {count} questions via {}", self.llm.model());
        let response = self.llm.chat(request).await?;

        let quiz: Quiz = serde_json::from_str(&response.content)
            .map_err(|e| SchemaViolation::Malformed(e.to_string()))?;

        if quiz.questions.len() != count {
            return Err(SchemaViolation::QuestionCount {
                expected: count,
                got: quiz.questions.len(),
            }
            .into());
        }

        Ok(quiz)
    }
}
