//! Output types: per-page results, job statistics, document metadata.
//!
//! The shape mirrors what an HTTP caller wants to serialise: an ordered
//! array of per-page entries plus a stats block. All types derive `serde`
//! so a handler can `json!` the whole output without adapter code.
//!
//! ## Ordering invariant
//!
//! `ExtractionOutput::pages` always has exactly one entry per processed
//! page, in page order, regardless of the order in which workers finished.
//! A blank page and a failed page both carry empty text; they are told
//! apart by [`PageResult::error`].

use crate::error::PageError;
use serde::{Deserialize, Serialize};

/// The result of recognising a single page.
///
/// Produced exactly once per rasterised page. `error: None` with empty
/// `text` means the page was genuinely blank (or contained no recognisable
/// glyphs); `error: Some(_)` means the page failed and the empty text is a
/// placeholder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult {
    /// 1-indexed page number in the source document.
    pub page_num: usize,
    /// Recognised plain text; empty when the page is blank or failed.
    pub text: String,
    /// Wall-clock time the worker spent on this page (preprocess + recognise).
    pub duration_ms: u64,
    /// Set when the page failed; the job as a whole still succeeds.
    pub error: Option<PageError>,
}

impl PageResult {
    /// Whether this page failed (as opposed to succeeding with empty text).
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    /// Build the placeholder result for a page that failed.
    pub(crate) fn failed(page_num: usize, duration_ms: u64, error: PageError) -> Self {
        Self {
            page_num,
            text: String::new(),
            duration_ms,
            error: Some(error),
        }
    }
}

/// Aggregate statistics for one extraction job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Pages in the source document.
    pub total_pages: usize,
    /// Pages that produced text (possibly empty) without error.
    pub recognized_pages: usize,
    /// Pages that failed preprocessing or recognition.
    ///
    /// Exposed for observability: the job succeeds even when this is
    /// non-zero, so callers who care must check it.
    pub failed_pages: usize,
    /// Wall-clock duration of the whole job.
    pub total_duration_ms: u64,
    /// Time spent rasterising pages.
    pub render_duration_ms: u64,
    /// Time spent in preprocessing + recognition across the worker pool.
    pub ocr_duration_ms: u64,
}

/// Document-level metadata extracted from the PDF without recognition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub modification_date: Option<String>,
    /// Total pages in the document (before page selection).
    pub page_count: usize,
    pub pdf_version: String,
}

/// The complete result of one extraction job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutput {
    /// One entry per processed page, in page order.
    pub pages: Vec<PageResult>,
    /// Metadata of the source document.
    pub metadata: DocumentMetadata,
    /// Aggregate statistics.
    pub stats: ExtractionStats,
}

impl ExtractionOutput {
    /// The ordered per-page texts, failed pages included as empty strings.
    pub fn texts(&self) -> Vec<&str> {
        self.pages.iter().map(|p| p.text.as_str()).collect()
    }

    /// Consume the output into the ordered per-page texts.
    pub fn into_texts(self) -> Vec<String> {
        self.pages.into_iter().map(|p| p.text).collect()
    }

    /// Join all page texts with the given separator, in page order.
    pub fn plain_text(&self, separator: &str) -> String {
        self.texts().join(separator)
    }
}
