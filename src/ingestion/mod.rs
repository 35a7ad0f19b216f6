pub mod chunker;
pub mod extractor;

pub use chunker::{Chunk, ChunkConfig, ChunkError, TextChunker};
pub use extractor::{extract_text, DocumentSource, ExtractError, PdfDocument, ProgressSink};
