//! The recognition-engine seam and its tesseract-backed implementation.
//!
//! The pipeline talks to OCR through the [`RecognitionEngine`] trait rather
//! than to tesseract directly. That keeps the engine swappable (tests
//! inject deterministic mocks; callers can plug in a remote OCR service)
//! and confines the `ocr` cargo feature to this one module.
//!
//! ## Concurrency contract
//!
//! `recognise` is synchronous and CPU-bound; it is only ever called from
//! worker threads (`spawn_blocking`), never from the async executor.
//! Implementations must be safe for concurrent independent invocations —
//! [`TesseractEngine`] achieves this by constructing a fresh engine handle
//! per call, sharing only immutable configuration.

#[cfg(feature = "ocr")]
use crate::config::EngineMode;
use crate::config::ExtractionConfig;
use crate::error::PdfOcrError;
use image::GrayImage;
use std::io::Cursor;
use std::sync::Arc;
use thiserror::Error;

/// Failure inside a recognition engine invocation.
///
/// Deliberately untyped beyond the message: the pipeline treats every
/// engine failure identically (the page degrades to an empty entry), so a
/// richer taxonomy here would never be consumed.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct EngineError(pub String);

/// A synchronous OCR engine invoked once per preprocessed page image.
pub trait RecognitionEngine: Send + Sync {
    /// Short identifier for logs (e.g. `"tesseract"`).
    fn name(&self) -> &'static str;

    /// Recognise the text on one binarised page image.
    ///
    /// Blocks the calling worker thread for the duration of recognition.
    /// A genuinely blank page is `Ok` with an empty string, not an error.
    fn recognise(&self, image: &GrayImage) -> Result<String, EngineError>;
}

/// Resolve the engine for a job: an injected engine wins, otherwise the
/// built-in tesseract engine (when compiled in).
pub fn resolve_engine(
    config: &ExtractionConfig,
) -> Result<Arc<dyn RecognitionEngine>, PdfOcrError> {
    if let Some(ref engine) = config.engine {
        return Ok(Arc::clone(engine));
    }
    builtin_engine(config)
}

#[cfg(feature = "ocr")]
fn builtin_engine(config: &ExtractionConfig) -> Result<Arc<dyn RecognitionEngine>, PdfOcrError> {
    Ok(Arc::new(TesseractEngine::new(
        &config.language,
        config.engine_mode,
        config.engine_thread_limit,
    )))
}

#[cfg(not(feature = "ocr"))]
fn builtin_engine(_config: &ExtractionConfig) -> Result<Arc<dyn RecognitionEngine>, PdfOcrError> {
    Err(PdfOcrError::EngineNotConfigured {
        hint: "Enable the `ocr` cargo feature for the built-in tesseract engine, \
               or inject one with ExtractionConfig::builder().engine(...)."
            .to_string(),
    })
}

/// PNG-encode a binarised page for engines that ingest encoded images.
///
/// Lossless by construction; the bi-level raster compresses to a few
/// kilobytes, so the extra copy is cheaper than teaching every engine
/// binding about raw pixel layouts.
pub fn encode_png(image: &GrayImage) -> Result<Vec<u8>, EngineError> {
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| EngineError(format!("PNG encoding failed: {}", e)))?;
    Ok(buf)
}

/// The built-in engine: local tesseract via the `tesseract` crate.
#[cfg(feature = "ocr")]
pub struct TesseractEngine {
    language: String,
    mode: EngineMode,
}

#[cfg(feature = "ocr")]
impl TesseractEngine {
    /// Construct an engine with explicit language, strategy, and internal
    /// thread cap.
    ///
    /// The thread cap must be applied here, at construction: tesseract's
    /// OpenMP runtime reads `OMP_THREAD_LIMIT` once, at engine
    /// initialisation, and exposes no per-call API for it.
    pub fn new(language: &str, mode: EngineMode, thread_limit: u32) -> Self {
        std::env::set_var("OMP_THREAD_LIMIT", thread_limit.to_string());
        Self {
            language: language.to_string(),
            mode,
        }
    }

    fn oem(&self) -> tesseract::OcrEngineMode {
        match self.mode {
            EngineMode::Legacy => tesseract::OcrEngineMode::TesseractOnly,
            EngineMode::Neural => tesseract::OcrEngineMode::LstmOnly,
            // "Default" lets the installed engine pick its legacy+LSTM
            // combination, matching the combined strategy we document.
            EngineMode::Combined => tesseract::OcrEngineMode::Default,
        }
    }
}

#[cfg(feature = "ocr")]
impl RecognitionEngine for TesseractEngine {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn recognise(&self, image: &GrayImage) -> Result<String, EngineError> {
        let png = encode_png(image)?;

        // A fresh handle per invocation: tesseract handles are not
        // re-entrant, and construction is cheap next to recognition.
        let text = tesseract::Tesseract::new_with_oem(None, Some(&self.language), self.oem())
            .map_err(|e| EngineError(format!("engine init: {}", e)))?
            .set_image_from_mem(&png)
            .map_err(|e| EngineError(format!("engine set_image: {}", e)))?
            .recognize()
            .map_err(|e| EngineError(format!("engine recognise: {}", e)))?
            .get_text()
            .map_err(|e| EngineError(format!("engine get_text: {}", e)))?;

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn encode_png_produces_valid_png() {
        let img = GrayImage::from_pixel(8, 8, Luma([255u8]));
        let png = encode_png(&img).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn injected_engine_takes_precedence() {
        struct Canned;
        impl RecognitionEngine for Canned {
            fn name(&self) -> &'static str {
                "canned"
            }
            fn recognise(&self, _image: &GrayImage) -> Result<String, EngineError> {
                Ok("canned text".into())
            }
        }

        let config = ExtractionConfig::builder()
            .engine(Arc::new(Canned))
            .build()
            .unwrap();
        let engine = resolve_engine(&config).unwrap();
        assert_eq!(engine.name(), "canned");
    }
}
