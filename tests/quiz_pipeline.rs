//! End-to-end pipeline tests: extraction through chunking, indexing,
//! and both generation modes, driven by in-process fakes at the
//! embedding/chat capability seams.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use quizforge::core::embedding::{EmbeddingProvider, Result as EmbeddingResult};
use quizforge::core::index::VectorIndex;
use quizforge::core::llm::{
    ChatRequest, ChatResponse, LlmError, LlmProvider, Result as LlmResult,
};
use quizforge::core::quiz::{
    Difficulty, QuizGenerator, QuizSession, SessionConfig,
};
use quizforge::ingestion::{
    extract_text, ChunkConfig, DocumentSource, ExtractError, TextChunker,
};

// ============================================================================
// Fakes
// ============================================================================

/// In-memory document with fixed page texts.
struct FakeDocument(Vec<String>);

impl DocumentSource for FakeDocument {
    fn page_count(&self) -> usize {
        self.0.len()
    }

    fn page_text(&self, index: usize) -> Result<String, ExtractError> {
        self.0
            .get(index)
            .cloned()
            .ok_or(ExtractError::PageOutOfRange {
                index,
                pages: self.0.len(),
            })
    }
}

/// Deterministic embedder bucketing texts by letter frequencies.
struct BucketEmbedder;

#[async_trait]
impl EmbeddingProvider for BucketEmbedder {
    async fn embed(&self, text: &str) -> EmbeddingResult<Vec<f32>> {
        let mut v = vec![0.0f32; 8];
        for c in text.chars().filter(|c| c.is_ascii_alphabetic()) {
            let bucket = (c.to_ascii_lowercase() as usize - 'a' as usize) % 8;
            v[bucket] += 1.0;
        }
        Ok(v)
    }

    async fn embed_batch(&self, texts: &[&str]) -> EmbeddingResult<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for t in texts {
            out.push(self.embed(t).await?);
        }
        Ok(out)
    }

    fn dimensions(&self) -> usize {
        8
    }

    fn name(&self) -> &str {
        "bucket"
    }
}

/// Chat provider replaying a fixed script of responses or refusals.
struct ScriptedLlm {
    script: Vec<Result<String, String>>,
    calls: AtomicUsize,
}

impl ScriptedLlm {
    fn new(script: Vec<Result<String, String>>) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl LlmProvider for ScriptedLlm {
    fn id(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }

    async fn chat(&self, _request: ChatRequest) -> LlmResult<ChatResponse> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script.get(call).cloned() {
            Some(Ok(content)) => Ok(ChatResponse {
                content,
                model: "scripted-model".to_string(),
                finish_reason: Some("stop".to_string()),
                latency_ms: 1,
            }),
            Some(Err(refusal)) => Err(LlmError::Refused(refusal)),
            None => Err(LlmError::InvalidResponse("script exhausted".to_string())),
        }
    }
}

fn batch_quiz_json() -> String {
    r#"{"questions": [
        {"difficulty": "Easy",   "question": "What is a cell?",            "answer": "The basic unit of life."},
        {"difficulty": "easy",   "question": "What is DNA?",               "answer": "Genetic material."},
        {"difficulty": "Medium", "question": "How does mitosis proceed?",  "answer": "Through phased division."},
        {"difficulty": "medium", "question": "Why do cells specialize?",   "answer": "Differential gene expression."},
        {"difficulty": "Hard",   "question": "Synthesize the energy flow.","answer": "Glycolysis feeds respiration."}
    ]}"#
    .to_string()
}

fn mcq_json() -> String {
    r#"{
        "question": "Which option is third?",
        "options": ["A", "B", "C", "D"],
        "correct_answer": "C",
        "explanations": ["not this one", "nor this", "this is it", "wrong letter"]
    }"#
    .to_string()
}

fn sample_page(len: usize) -> String {
    "the cell divides and grows "
        .chars()
        .cycle()
        .take(len)
        .collect()
}

// ============================================================================
// Pipeline Tests
// ============================================================================

/// A single 1200-character page through the default 1000/200 chunker
/// yields two chunks covering the full text.
#[test]
fn single_page_splits_into_two_overlapping_chunks() {
    let document = FakeDocument(vec![sample_page(1200)]);
    let text = extract_text(&document, None).unwrap();
    assert_eq!(text.len(), 1200);

    let chunker = TextChunker::with_config(ChunkConfig::new(1000, 200).unwrap());
    let chunks = chunker.split(&text);

    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].start, 0);
    // Together the two chunks cover every character
    assert!(chunks[1].start <= chunks[0].end());
    assert_eq!(chunks[1].end(), 1200);
}

/// Batch generation with five requested questions returns five records,
/// each with a recognized difficulty.
#[tokio::test]
async fn batch_generation_returns_requested_count() {
    let chunker = TextChunker::new();
    let chunks = chunker.split(&sample_page(3000));
    let index = VectorIndex::build(chunks, Arc::new(BucketEmbedder))
        .await
        .unwrap();

    let context = index.retrieve_context("cells", 3).await.unwrap();
    assert!(!context.is_empty());

    let generator = QuizGenerator::new(Arc::new(ScriptedLlm::new(vec![Ok(batch_quiz_json())])));
    let quiz = generator.generate(&context, 5).await.unwrap();

    assert_eq!(quiz.questions.len(), 5);
    for record in &quiz.questions {
        assert!(Difficulty::ALL.contains(&record.difficulty));
    }
}

/// An interactive round scores a correct answer, then an incorrect one
/// whose feedback names the correct option.
#[tokio::test]
async fn interactive_round_scores_and_explains() {
    let chunks = TextChunker::new().split(&sample_page(2500));
    let index = Arc::new(
        VectorIndex::build(chunks, Arc::new(BucketEmbedder))
            .await
            .unwrap(),
    );
    let llm = Arc::new(ScriptedLlm::new(vec![Ok(mcq_json()), Ok(mcq_json())]));

    let mut session = QuizSession::new(
        index,
        llm,
        SessionConfig {
            difficulty: Difficulty::Medium,
            top_k: 2,
            seed: Some(1),
        },
    );

    // Round one: select "C" (index 2), correct
    session.next_question().await.unwrap();
    let feedback = session.submit_answer(Some(2)).unwrap();
    assert!(feedback.is_correct);
    assert_eq!(session.score(), 1);

    // Round two: select "A" (index 0), incorrect; feedback names "C"
    session.next_question().await.unwrap();
    let feedback = session.submit_answer(Some(0)).unwrap();
    assert!(!feedback.is_correct);
    assert_eq!(feedback.correct_answer, "C");
    assert!(feedback.render().contains("C"));

    assert_eq!(session.summary().to_string(), "1/2");
}

/// A refusal leaves the session idle: no question stored, no score or
/// round-count mutation.
#[tokio::test]
async fn refusal_preserves_session_state() {
    let chunks = TextChunker::new().split(&sample_page(2500));
    let index = Arc::new(
        VectorIndex::build(chunks, Arc::new(BucketEmbedder))
            .await
            .unwrap(),
    );
    let llm = Arc::new(ScriptedLlm::new(vec![Err("content policy".to_string())]));

    let mut session = QuizSession::new(
        index,
        llm,
        SessionConfig {
            difficulty: Difficulty::Hard,
            top_k: 2,
            seed: Some(1),
        },
    );

    let err = session.next_question().await.unwrap_err();
    assert!(err.is_refusal());
    assert!(session.current_question().is_none());
    assert_eq!(session.score(), 0);
    assert_eq!(session.questions_asked(), 0);
    assert_eq!(session.summary().to_string(), "0/0");
}
