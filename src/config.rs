//! Configuration types for PDF text extraction.
//!
//! All extraction behaviour is controlled through [`ExtractionConfig`], built
//! via its [`ExtractionConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to share configs across jobs, log them, and diff two runs to
//! understand why their outputs differ.
//!
//! The two knobs that matter for machine sizing are `concurrency` (pages
//! processed simultaneously) and `engine_thread_limit` (threads the engine
//! may spawn inside one recognition call). Their product is the worst-case
//! CPU demand of a job; keep it at or below the core count of the host.

use crate::error::PdfOcrError;
use crate::pipeline::ocr::RecognitionEngine;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Configuration for a PDF text-extraction job.
///
/// Built via [`ExtractionConfig::builder()`] or using
/// [`ExtractionConfig::default()`].
///
/// # Example
/// ```rust
/// use pdfocr::{EngineMode, ExtractionConfig};
///
/// let config = ExtractionConfig::builder()
///     .concurrency(4)
///     .engine_mode(EngineMode::Neural)
///     .language("eng")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Rendering DPI used when rasterising each PDF page. Range: 72–400. Default: 200.
    ///
    /// OCR engines want more pixel density than a human reader: glyph
    /// strokes must survive binarisation. 200 DPI keeps 10 pt body text
    /// comfortably above the engine's minimum x-height; drop to 150 for
    /// large-print documents if memory is tight.
    pub dpi: u32,

    /// Maximum rendered image dimension (width or height) in pixels. Default: 3000.
    ///
    /// A safety cap independent of DPI: a 200-DPI render of an A0 poster
    /// would otherwise allocate hundreds of megapixels. The longest edge is
    /// capped and the other scaled proportionally.
    pub max_rendered_pixels: u32,

    /// Number of pages processed simultaneously. Default: 8.
    ///
    /// Page recognition is CPU-bound, so this bounds both peak CPU
    /// contention and peak memory (one page image plus one binarised image
    /// per in-flight worker). `concurrency × engine_thread_limit` should
    /// not exceed the host's core count.
    pub concurrency: usize,

    /// Recognition strategy selector passed to the engine. Default: [`EngineMode::Combined`].
    pub engine_mode: EngineMode,

    /// Cap on threads the engine may spawn inside one recognition call. Default: 8.
    ///
    /// The engine parallelises internally per invocation; without a cap,
    /// `concurrency` workers each spawning a full thread team oversubscribe
    /// the machine and throughput collapses.
    pub engine_thread_limit: u32,

    /// Recognition language(s), e.g. `"eng"` or `"eng+deu"`. Default: `"eng"`.
    pub language: String,

    /// Pre-constructed recognition engine. Takes precedence over the
    /// built-in tesseract engine; the seam used by tests to inject mocks.
    pub engine: Option<Arc<dyn RecognitionEngine>>,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Page selection. Default: all pages.
    pub pages: PageSelection,

    /// Per-page timeout in seconds. Default: None (no timeout).
    ///
    /// On expiry the page is marked failed exactly like a recognition
    /// error; the job continues. The stuck worker thread itself cannot be
    /// interrupted — only its result is abandoned.
    pub page_timeout_secs: Option<u64>,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Progress callback invoked per page event. Default: None.
    pub progress: Option<ProgressCallback>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            dpi: 200,
            max_rendered_pixels: 3000,
            concurrency: 8,
            engine_mode: EngineMode::default(),
            engine_thread_limit: 8,
            language: "eng".to_string(),
            engine: None,
            password: None,
            pages: PageSelection::default(),
            page_timeout_secs: None,
            download_timeout_secs: 120,
            progress: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("dpi", &self.dpi)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("concurrency", &self.concurrency)
            .field("engine_mode", &self.engine_mode)
            .field("engine_thread_limit", &self.engine_thread_limit)
            .field("language", &self.language)
            .field("engine", &self.engine.as_ref().map(|_| "<dyn RecognitionEngine>"))
            .field("pages", &self.pages)
            .field("page_timeout_secs", &self.page_timeout_secs)
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 400);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn engine_mode(mut self, mode: EngineMode) -> Self {
        self.config.engine_mode = mode;
        self
    }

    pub fn engine_thread_limit(mut self, n: u32) -> Self {
        self.config.engine_thread_limit = n.max(1);
        self
    }

    pub fn language(mut self, lang: impl Into<String>) -> Self {
        self.config.language = lang.into();
        self
    }

    pub fn engine(mut self, engine: Arc<dyn RecognitionEngine>) -> Self {
        self.config.engine = Some(engine);
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn pages(mut self, selection: PageSelection) -> Self {
        self.config.pages = selection;
        self
    }

    pub fn page_timeout_secs(mut self, secs: u64) -> Self {
        self.config.page_timeout_secs = Some(secs);
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn progress(mut self, callback: ProgressCallback) -> Self {
        self.config.progress = Some(callback);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, PdfOcrError> {
        let c = &self.config;
        if c.dpi < 72 || c.dpi > 400 {
            return Err(PdfOcrError::InvalidConfig(format!(
                "DPI must be 72–400, got {}",
                c.dpi
            )));
        }
        if c.concurrency == 0 {
            return Err(PdfOcrError::InvalidConfig("Concurrency must be ≥ 1".into()));
        }
        if c.language.is_empty() {
            return Err(PdfOcrError::InvalidConfig(
                "Language must not be empty".into(),
            ));
        }
        if c.page_timeout_secs == Some(0) {
            return Err(PdfOcrError::InvalidConfig(
                "Page timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Recognition strategy run by the engine.
///
/// Maps onto the engine's OEM selector. [`EngineMode::Combined`] lets the
/// engine combine its legacy character classifier with the neural LSTM
/// recogniser, which is the accuracy/speed balance that suits scanned
/// office documents; the single-strategy modes exist for corpora where one
/// recogniser is known to win (e.g. `Neural` for clean digital renders).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EngineMode {
    /// Legacy character-classifier only.
    Legacy,
    /// Neural (LSTM) recogniser only.
    Neural,
    /// Legacy + neural combined, as available in the installed engine. (default)
    #[default]
    Combined,
}

/// Specifies which pages of the PDF to process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub enum PageSelection {
    /// Process all pages (default).
    #[default]
    All,
    /// Process a single page (1-indexed).
    Single(usize),
    /// Process a contiguous range of pages (1-indexed, inclusive).
    Range(usize, usize),
    /// Process specific pages (1-indexed, deduplicated).
    Set(Vec<usize>),
}

impl PageSelection {
    /// Expand the selection into a sorted, deduplicated list of 0-indexed page numbers.
    pub fn to_indices(&self, total_pages: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = match self {
            PageSelection::All => (0..total_pages).collect(),
            PageSelection::Single(p) => {
                if *p >= 1 && *p <= total_pages {
                    vec![p - 1]
                } else {
                    vec![]
                }
            }
            PageSelection::Range(start, end) => {
                let s = (*start).max(1) - 1;
                let e = (*end).min(total_pages);
                (s..e).collect()
            }
            PageSelection::Set(pages) => pages
                .iter()
                .filter(|&&p| p >= 1 && p <= total_pages)
                .map(|p| p - 1)
                .collect(),
        };
        indices.sort_unstable();
        indices.dedup();
        indices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = ExtractionConfig::default();
        assert_eq!(c.concurrency, 8);
        assert_eq!(c.engine_thread_limit, 8);
        assert_eq!(c.engine_mode, EngineMode::Combined);
        assert_eq!(c.language, "eng");
        assert!(c.page_timeout_secs.is_none());
    }

    #[test]
    fn builder_clamps_out_of_range_values() {
        let c = ExtractionConfig::builder()
            .dpi(10_000)
            .concurrency(0)
            .engine_thread_limit(0)
            .build()
            .unwrap();
        assert_eq!(c.dpi, 400);
        assert_eq!(c.concurrency, 1);
        assert_eq!(c.engine_thread_limit, 1);
    }

    #[test]
    fn builder_rejects_empty_language() {
        let err = ExtractionConfig::builder().language("").build();
        assert!(matches!(err, Err(PdfOcrError::InvalidConfig(_))));
    }

    #[test]
    fn builder_rejects_zero_timeout() {
        let err = ExtractionConfig::builder().page_timeout_secs(0).build();
        assert!(matches!(err, Err(PdfOcrError::InvalidConfig(_))));
    }

    #[test]
    fn page_selection_to_indices() {
        assert_eq!(PageSelection::All.to_indices(5), vec![0, 1, 2, 3, 4]);
        assert_eq!(PageSelection::Single(3).to_indices(5), vec![2]);
        assert_eq!(PageSelection::Single(6).to_indices(5), Vec::<usize>::new());
        assert_eq!(PageSelection::Range(2, 4).to_indices(5), vec![1, 2, 3]);
        assert_eq!(PageSelection::Set(vec![1, 3, 5]).to_indices(5), vec![0, 2, 4]);
        assert_eq!(
            PageSelection::Set(vec![3, 1, 3]).to_indices(5),
            vec![0, 2] // deduplicated and sorted
        );
    }
}
