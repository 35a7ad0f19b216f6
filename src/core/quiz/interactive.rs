//! Single-Question Generator
//!
//! Produces one multiple-choice question from a context block, with
//! difficulty-specific guidance and per-option explanations.

use std::sync::Arc;

use crate::core::llm::{ChatMessage, ChatRequest, LlmProvider};
use crate::core::quiz::types::{
    Difficulty, GenerationError, MultipleChoiceQuestion, SchemaViolation, OPTION_COUNT,
};

/// System prompt for interactive question generation.
const QUESTION_SYSTEM_PROMPT: &str = "You are a quiz writer. You create multiple-choice questions \
strictly from the provided study material. Respond with a single JSON object and nothing else.";

/// What each difficulty level should exercise.
fn difficulty_guidance(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Easy => "Ask about facts and definitions stated directly in the material.",
        Difficulty::Medium => {
            "Ask about relationships between concepts to test understanding of the material."
        }
        Difficulty::Hard => {
            "Require analysis or synthesis across multiple concepts from the material."
        }
    }
}

/// User prompt template for a single multiple-choice question.
///
/// Expected substitutions:
/// - difficulty: requested level, with its guidance line
/// - context: the retrieved context block
fn question_prompt(difficulty: Difficulty, context: &str) -> String {
    format!(
        r#"Create one {difficulty} multiple-choice question from the following context.
{guidance}
Provide exactly {OPTION_COUNT} answer options with exactly one correct answer, and place the correct answer at a random position among the options.
For every option, write one explanation of why it is correct or incorrect.
Respond with a JSON object of this exact shape:
{{"question": "...", "options": ["...", "...", "...", "..."], "correct_answer": "...", "explanations": ["...", "...", "...", "..."]}}
The correct_answer value must exactly match one of the options, and explanations must be in the same order as the options.

Context:
{context}"#,
        guidance = difficulty_guidance(difficulty),
    )
}

/// Single multiple-choice question generator over a chat-completion
/// capability.
pub struct QuestionGenerator {
    llm: Arc<dyn LlmProvider>,
}

impl QuestionGenerator {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    /// Generate one validated multiple-choice question from `context` at
    /// the requested difficulty.
    ///
    /// A content-policy refusal returns the recoverable
    /// [`GenerationError::Refused`] so callers can skip the round; a
    /// malformed response shape is a fatal [`GenerationError::Schema`].
    pub async fn generate(
        &self,
        context: &str,
        difficulty: Difficulty,
    ) -> Result<MultipleChoiceQuestion, GenerationError> {
        let request = ChatRequest::new(vec![
            ChatMessage::system(QUESTION_SYSTEM_PROMPT),
            ChatMessage::user(question_prompt(difficulty, context)),
        ])
        .with_json_mode();

        tracing::info!("requesting {difficulty} question via {}", self.llm.model());
        let response = self.llm.chat(request).await?;

        let question: MultipleChoiceQuestion = serde_json::from_str(&response.content)
            .map_err(|e| SchemaViolation::Malformed(e.to_string()))?;
        question.validate()?;

        Ok(question)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::llm::{ChatResponse, LlmError, Result as LlmResult};
    use async_trait::async_trait;

    struct ScriptedLlm(std::result::Result<String, fn() -> LlmError>);

    #[async_trait]
    impl LlmProvider for ScriptedLlm {
        fn id(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "scripted-model"
        }

        async fn chat(&self, _request: ChatRequest) -> LlmResult<ChatResponse> {
            match &self.0 {
                Ok(content) => Ok(ChatResponse {
                    content: content.clone(),
                    model: "scripted-model".to_string(),
                    finish_reason: Some("stop".to_string()),
                    latency_ms: 1,
                }),
                Err(make) => Err(make()),
            }
        }
    }

    fn mcq_json(options: &[&str], correct: &str) -> String {
        let opts: Vec<String> = options.iter().map(|o| format!("\"{o}\"")).collect();
        let expl: Vec<String> = options
            .iter()
            .map(|o| format!("\"why {o}\""))
            .collect();
        format!(
            r#"{{"question": "Which one?", "options": [{}], "correct_answer": "{correct}", "explanations": [{}]}}"#,
            opts.join(","),
            expl.join(","),
        )
    }

    fn generator(outcome: std::result::Result<String, fn() -> LlmError>) -> QuestionGenerator {
        QuestionGenerator::new(Arc::new(ScriptedLlm(outcome)))
    }

    #[tokio::test]
    async fn test_generates_valid_question() {
        let question = generator(Ok(mcq_json(&["A", "B", "C", "D"], "C")))
            .generate("ctx", Difficulty::Medium)
            .await
            .unwrap();

        assert_eq!(question.options.len(), 4);
        assert_eq!(question.explanations.len(), 4);
        assert_eq!(question.correct_answer, "C");
        assert_eq!(question.correct_index(), Some(2));
    }

    #[tokio::test]
    async fn test_wrong_option_count_is_schema_violation() {
        let err = generator(Ok(mcq_json(&["A", "B", "C"], "C")))
            .generate("ctx", Difficulty::Easy)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GenerationError::Schema(SchemaViolation::OptionCount { expected: 4, got: 3 })
        ));
    }

    #[tokio::test]
    async fn test_correct_answer_missing_is_schema_violation() {
        let err = generator(Ok(mcq_json(&["A", "B", "C", "D"], "E")))
            .generate("ctx", Difficulty::Hard)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GenerationError::Schema(SchemaViolation::CorrectAnswerMissing(_))
        ));
    }

    #[tokio::test]
    async fn test_refusal_is_recoverable() {
        let err = generator(Err(|| LlmError::Refused("policy".to_string())))
            .generate("ctx", Difficulty::Easy)
            .await
            .unwrap_err();
        assert!(err.is_refusal());
    }

    #[test]
    fn test_prompt_carries_difficulty_guidance() {
        let prompt = question_prompt(Difficulty::Hard, "the context");
        assert!(prompt.contains("analysis or synthesis"));
        assert!(prompt.contains("the context"));

        let prompt = question_prompt(Difficulty::Easy, "c");
        assert!(prompt.contains("facts and definitions"));
    }
}
