//! Document Text Extraction
//!
//! Page-ordered text extraction behind the `DocumentSource` capability,
//! with an optional progress observer notified once per page.

use std::path::Path;

use thiserror::Error;

use crate::core::logging::extraction_progress;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("failed to load document: {0}")]
    Load(#[source] lopdf::Error),

    #[error("failed to extract text from page {page}: {source}")]
    Page {
        page: u32,
        #[source]
        source: lopdf::Error,
    },

    #[error("page index {index} out of range ({pages} pages)")]
    PageOutOfRange { index: usize, pages: usize },

    #[error("document contains no pages")]
    NoPages,
}

pub type Result<T> = std::result::Result<T, ExtractError>;

// ============================================================================
// Capability Traits
// ============================================================================

/// A document presented as ordered pages of extractable text. The core does
/// not know how the underlying bytes were obtained.
pub trait DocumentSource {
    fn page_count(&self) -> usize;

    /// Extracted text of the page at `index` (0-based, in page order).
    fn page_text(&self, index: usize) -> Result<String>;
}

/// Observer for extraction progress. Notified once per processed page with
/// fractional completion in `[0, 1]`.
pub trait ProgressSink {
    fn on_progress(&self, fraction: f32);
}

impl<F: Fn(f32)> ProgressSink for F {
    fn on_progress(&self, fraction: f32) {
        self(fraction)
    }
}

// ============================================================================
// PDF Backend
// ============================================================================

/// PDF document backed by lopdf.
pub struct PdfDocument {
    doc: lopdf::Document,
    pages: Vec<u32>,
}

impl PdfDocument {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let doc = lopdf::Document::load(path).map_err(ExtractError::Load)?;
        Ok(Self::from_document(doc))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let doc = lopdf::Document::load_mem(bytes).map_err(ExtractError::Load)?;
        Ok(Self::from_document(doc))
    }

    fn from_document(doc: lopdf::Document) -> Self {
        let pages = doc.get_pages().keys().copied().collect();
        Self { doc, pages }
    }
}

impl DocumentSource for PdfDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, index: usize) -> Result<String> {
        let page = *self
            .pages
            .get(index)
            .ok_or(ExtractError::PageOutOfRange {
                index,
                pages: self.pages.len(),
            })?;
        self.doc
            .extract_text(&[page])
            .map_err(|source| ExtractError::Page { page, source })
    }
}

// ============================================================================
// Extraction
// ============================================================================

/// Concatenate the text of every page in page order.
///
/// With a `progress` sink, the sink is notified after each page; without
/// one, a passive terminal progress bar is shown instead.
pub fn extract_text(
    source: &dyn DocumentSource,
    progress: Option<&dyn ProgressSink>,
) -> Result<String> {
    let total = source.page_count();
    if total == 0 {
        return Err(ExtractError::NoPages);
    }

    let mut text = String::new();
    match progress {
        Some(sink) => {
            for i in 0..total {
                text.push_str(&source.page_text(i)?);
                sink.on_progress((i + 1) as f32 / total as f32);
            }
        }
        None => {
            let bar = extraction_progress(total as u64);
            for i in 0..total {
                text.push_str(&source.page_text(i)?);
                bar.inc(1);
            }
            bar.finish_and_clear();
        }
    }

    tracing::debug!("extracted {} characters from {} pages", text.len(), total);
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct PagedText(Vec<&'static str>);

    impl DocumentSource for PagedText {
        fn page_count(&self) -> usize {
            self.0.len()
        }

        fn page_text(&self, index: usize) -> Result<String> {
            self.0
                .get(index)
                .map(|s| s.to_string())
                .ok_or(ExtractError::PageOutOfRange {
                    index,
                    pages: self.0.len(),
                })
        }
    }

    #[test]
    fn test_concatenates_pages_in_order() {
        let source = PagedText(vec!["first ", "second ", "third"]);
        let text = extract_text(&source, None).unwrap();
        assert_eq!(text, "first second third");
    }

    #[test]
    fn test_progress_reported_once_per_page() {
        let source = PagedText(vec!["a", "b", "c", "d"]);
        let fractions = RefCell::new(Vec::new());
        let sink = |f: f32| fractions.borrow_mut().push(f);

        extract_text(&source, Some(&sink as &dyn ProgressSink)).unwrap();

        let fractions = fractions.into_inner();
        assert_eq!(fractions, vec![0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn test_empty_document_is_an_error() {
        let source = PagedText(vec![]);
        assert!(matches!(
            extract_text(&source, None),
            Err(ExtractError::NoPages)
        ));
    }

    #[test]
    fn test_corrupt_pdf_fails_to_load() {
        let result = PdfDocument::from_bytes(b"definitely not a pdf");
        assert!(matches!(result, Err(ExtractError::Load(_))));
    }

    #[test]
    fn test_corrupt_pdf_file_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"not a pdf").unwrap();

        assert!(matches!(
            PdfDocument::open(&path),
            Err(ExtractError::Load(_))
        ));
    }
}
