//! Pipeline stages for PDF text extraction.
//!
//! Each submodule implements exactly one transformation step. Keeping
//! stages separate makes each independently testable and lets us swap
//! implementations (e.g. a different recognition engine) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ preprocess ──▶ ocr ──▶ postprocess
//! (URL/path) (pdfium)  (gray+Otsu)  (engine)  (cleanup)
//! ```
//!
//! 1. [`input`]      — canonicalise the user-supplied path or URL to a local file
//! 2. [`render`]     — rasterise pages into [`render::PageImage`]s; runs in
//!    `spawn_blocking` because pdfium is not async-safe
//! 3. [`preprocess`] — grayscale + Otsu binarisation of one page image
//! 4. [`ocr`]        — the recognition-engine seam and its tesseract impl
//! 5. [`postprocess`]— deterministic cleanup of raw engine text
//!
//! [`worker`] composes stages 3–4 for a single page behind the isolation
//! boundary: any failure inside it becomes a failed page result, never a
//! job failure.

pub mod input;
pub mod ocr;
pub mod postprocess;
pub mod preprocess;
pub mod render;
pub(crate) mod worker;
