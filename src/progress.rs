//! Progress-callback trait for per-page extraction events.
//!
//! Inject an [`Arc<dyn ExtractionProgressCallback>`] via
//! [`crate::config::ExtractionConfigBuilder::progress`] to receive events
//! as the pipeline processes each page. Callbacks are the least-invasive
//! integration point: a caller can forward events to a progress bar, a
//! channel, or a job record without the library knowing anything about the
//! host application.
//!
//! The trait is `Send + Sync` because page events fire from concurrent
//! workers: `on_page_start` / `on_page_complete` / `on_page_error` may be
//! called from different threads at the same time, and not in page order.
//! Implementations must guard shared mutable state accordingly
//! (`AtomicUsize`, `Mutex`).

use std::sync::Arc;

/// Called by the extraction pipeline as it processes each page.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait ExtractionProgressCallback: Send + Sync {
    /// Called once after rasterisation, before any page worker starts.
    fn on_job_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called just before a page worker begins preprocessing.
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called when a page is successfully recognised.
    ///
    /// `text_len` is the byte length of the recognised text; zero for a
    /// blank page.
    fn on_page_complete(&self, page_num: usize, total_pages: usize, text_len: usize) {
        let _ = (page_num, total_pages, text_len);
    }

    /// Called when a page fails and degrades to an empty entry.
    fn on_page_error(&self, page_num: usize, total_pages: usize, error: &str) {
        let _ = (page_num, total_pages, error);
    }

    /// Called once after every page has produced a result.
    fn on_job_complete(&self, total_pages: usize, recognized_count: usize) {
        let _ = (total_pages, recognized_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ExtractionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExtractionConfig`].
pub type ProgressCallback = Arc<dyn ExtractionProgressCallback>;
