//! # pdfocr
//!
//! Extract per-page plain text from PDF documents by rasterising each page
//! and running optical character recognition on it.
//!
//! ## Why this crate?
//!
//! Text-layer extractors (pdftotext, pdf-extract) return nothing useful for
//! scanned documents — the "text" is a picture. This crate rasterises each
//! page via pdfium, binarises it (grayscale + per-page Otsu threshold), and
//! hands it to a recognition engine, processing pages on a bounded worker
//! pool so a 200-page scan saturates the CPUs without oversubscribing them.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input       resolve local file or download from URL
//!  ├─ 2. Render      rasterise pages via pdfium (CPU-bound, spawn_blocking)
//!  ├─ 3. Preprocess  grayscale + Otsu binarisation, per page
//!  ├─ 4. Recognise   OCR engine call, N pages in parallel on a bounded pool
//!  ├─ 5. Clean       deterministic text cleanup (line endings, form feeds…)
//!  └─ 6. Output      page-ordered texts + per-page status + job stats
//! ```
//!
//! Pages are fully independent: one unreadable page degrades to an empty
//! entry (`PageResult::error` is set) while the rest of the document
//! extracts normally. Results are reassembled in page order no matter what
//! order the workers finish in.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdfocr::{extract, ExtractionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractionConfig::default();
//!     let output = extract("scanned-report.pdf", &config).await?;
//!     for page in &output.pages {
//!         println!("--- page {} ---\n{}", page.page_num, page.text);
//!     }
//!     eprintln!("{} of {} pages failed",
//!         output.stats.failed_pages,
//!         output.pages.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfocr` binary (clap + anyhow + tracing-subscriber + indicatif) |
//! | `ocr`   | on      | Built-in tesseract recognition engine; disable to inject your own [`RecognitionEngine`] |
//!
//! Disable both when embedding only the pipeline:
//! ```toml
//! pdfocr = { version = "0.3", default-features = false }
//! ```
//!
//! ## Sizing the worker pool
//!
//! `concurrency` bounds pages processed simultaneously;
//! `engine_thread_limit` caps the engine's internal parallelism per call.
//! Keep `concurrency × engine_thread_limit` at or below the host's core
//! count — both knobs live on [`ExtractionConfig`].

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{EngineMode, ExtractionConfig, ExtractionConfigBuilder, PageSelection};
pub use error::{PageError, PdfOcrError};
pub use extract::{extract, extract_from_bytes, extract_sync, extract_to_file, inspect};
pub use output::{DocumentMetadata, ExtractionOutput, ExtractionStats, PageResult};
pub use pipeline::ocr::{EngineError, RecognitionEngine};
pub use progress::{ExtractionProgressCallback, NoopProgressCallback, ProgressCallback};

#[cfg(feature = "ocr")]
pub use pipeline::ocr::TesseractEngine;
