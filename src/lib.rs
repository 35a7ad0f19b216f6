//! Quizforge - retrieval-augmented quiz generation from PDF documents.
//!
//! Core library providing PDF text extraction, overlapping chunking,
//! in-memory vector search, and LLM-backed quiz generation in batch
//! and interactive multiple-choice form.

pub mod config;
pub mod core;
pub mod ingestion;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
