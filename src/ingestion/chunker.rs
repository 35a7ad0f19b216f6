//! Overlapping Text Chunker
//!
//! Splits extracted document text into overlapping segments suitable for
//! embedding and retrieval. The window prefers paragraph, sentence, and
//! word boundaries before falling back to a hard character cut.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Error, Debug)]
pub enum ChunkError {
    #[error("overlap ({overlap}) must be smaller than chunk size ({chunk_size})")]
    OverlapTooLarge { chunk_size: usize, overlap: usize },

    #[error("chunk size must be greater than zero")]
    ZeroChunkSize,
}

// ============================================================================
// Configuration
// ============================================================================

/// Chunking parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ChunkConfig {
    /// Target chunk length in characters.
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks.
    pub overlap: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            overlap: 200,
        }
    }
}

impl ChunkConfig {
    /// Create a validated configuration. `overlap` must be smaller than
    /// `chunk_size` or the window could never advance.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self, ChunkError> {
        if chunk_size == 0 {
            return Err(ChunkError::ZeroChunkSize);
        }
        if overlap >= chunk_size {
            return Err(ChunkError::OverlapTooLarge {
                chunk_size,
                overlap,
            });
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }
}

// ============================================================================
// Chunk
// ============================================================================

/// A bounded segment of document text, the unit of embedding and retrieval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    /// Sequential position within the source document.
    pub index: usize,
    /// Byte offset of this chunk within the source text.
    pub start: usize,
    pub text: String,
}

impl Chunk {
    /// Byte offset one past the end of this chunk within the source text.
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }
}

// ============================================================================
// Chunker
// ============================================================================

/// Boundary-aware sliding-window chunker.
pub struct TextChunker {
    config: ChunkConfig,
}

impl Default for TextChunker {
    fn default() -> Self {
        Self::new()
    }
}

impl TextChunker {
    pub fn new() -> Self {
        Self {
            config: ChunkConfig::default(),
        }
    }

    pub fn with_config(config: ChunkConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }

    /// Split `text` into overlapping chunks covering every character of the
    /// source. The window advances by `chunk_size - overlap` per step; the
    /// final chunk may be shorter, and text shorter than `chunk_size` yields
    /// exactly one chunk. Empty or whitespace-only input yields none.
    pub fn split(&self, text: &str) -> Vec<Chunk> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let ChunkConfig {
            chunk_size,
            overlap,
        } = self.config;
        let len = text.len();
        let mut chunks = Vec::new();
        let mut start = 0usize;

        loop {
            let mut end = floor_char_boundary(text, (start + chunk_size).min(len));
            if end <= start {
                // chunk_size smaller than a single multi-byte character
                end = ceil_char_boundary(text, start + 1);
            }
            if end < len {
                end = snap_to_boundary(text, start, end, overlap);
            }

            chunks.push(Chunk {
                id: Uuid::new_v4().to_string(),
                index: chunks.len(),
                start,
                text: text[start..end].to_string(),
            });

            if end == len {
                break;
            }

            let mut next = ceil_char_boundary(text, end.saturating_sub(overlap));
            if next <= start {
                // guarantee forward progress for degenerate configurations
                next = end;
            }
            start = next;
        }

        chunks
    }
}

/// Pick a break position in `[start, hard_end)`, preferring paragraph, then
/// sentence, then word boundaries. A snapped break must leave the window
/// larger than `overlap` so the cursor still advances; otherwise the hard
/// cut stands.
fn snap_to_boundary(text: &str, start: usize, hard_end: usize, overlap: usize) -> usize {
    let window = &text[start..hard_end];
    let min_break = start + overlap + 1;

    if let Some(pos) = window.rfind("\n\n") {
        let candidate = start + pos + 2;
        if candidate >= min_break {
            return candidate;
        }
    }

    let sentence_break = [". ", ".\n", "! ", "!\n", "? ", "?\n"]
        .iter()
        .filter_map(|pat| window.rfind(pat))
        .max();
    if let Some(pos) = sentence_break {
        let candidate = start + pos + 2;
        if candidate >= min_break {
            return candidate;
        }
    }

    if let Some((pos, c)) = window
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
    {
        let candidate = start + pos + c.len_utf8();
        if candidate >= min_break {
            return candidate;
        }
    }

    hard_end
}

fn floor_char_boundary(text: &str, mut i: usize) -> usize {
    while i > 0 && !text.is_char_boundary(i) {
        i -= 1;
    }
    i
}

fn ceil_char_boundary(text: &str, mut i: usize) -> usize {
    while i < text.len() && !text.is_char_boundary(i) {
        i += 1;
    }
    i.min(text.len())
}
