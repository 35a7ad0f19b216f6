//! Terminal Logging Module
//!
//! Tracing initialization for the CLI plus the indicatif progress bars
//! used as passive indicators during document ingestion.

use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

/// Initialize the logging system.
///
/// Respects `RUST_LOG`; defaults to `info` when unset.
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

/// Progress bar styles used by the ingestion pipeline.
pub struct ProgressStyles;

impl ProgressStyles {
    /// Standard progress bar with percentage and ETA
    pub fn default_bar() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) | ETA: {eta}")
            .unwrap()
            .progress_chars("=>-")
    }
}

/// Progress bar shown while extracting pages from a document.
pub fn extraction_progress(total_pages: u64) -> ProgressBar {
    let pb = ProgressBar::new(total_pages);
    pb.set_style(ProgressStyles::default_bar());
    pb
}
