//! The page worker: preprocess + recognise one page behind an isolation
//! boundary.
//!
//! This is the failure firewall of the pipeline. Whatever goes wrong with
//! one page (an unusable raster, an engine fault, even a panic in a
//! dependency) the worker converts into a failed [`PageResult`]
//! with empty text. One corrupt page degrades gracefully; it never aborts
//! the job or disturbs other in-flight pages.
//!
//! The worker has no side effects beyond its return value (a `warn!` trace
//! on failure aside): no files, no shared state. It takes its [`PageImage`]
//! by value — exclusive ownership means no locking anywhere in page
//! processing.

use crate::error::PageError;
use crate::output::PageResult;
use crate::pipeline::ocr::RecognitionEngine;
use crate::pipeline::preprocess;
use crate::pipeline::render::PageImage;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;
use tracing::warn;

/// Process a single page: binarise, then recognise.
///
/// Runs synchronously on a worker thread. Always returns a `PageResult`;
/// errors are recorded in it, never propagated.
pub(crate) fn process_page(engine: &dyn RecognitionEngine, page: PageImage) -> PageResult {
    let start = Instant::now();
    let page_num = page.index + 1;

    let outcome = catch_unwind(AssertUnwindSafe(|| recognise_page(engine, &page, page_num)));

    let duration_ms = start.elapsed().as_millis() as u64;

    match outcome {
        Ok(Ok(text)) => PageResult {
            page_num,
            text,
            duration_ms,
            error: None,
        },
        Ok(Err(e)) => {
            warn!("Page {}: {}", page_num, e);
            PageResult::failed(page_num, duration_ms, e)
        }
        // A panic below this frame is an engine/library bug; isolate it
        // exactly like an ordinary recognition failure.
        Err(panic) => {
            let detail = panic_message(panic.as_ref());
            warn!("Page {}: worker panicked: {}", page_num, detail);
            PageResult::failed(
                page_num,
                duration_ms,
                PageError::RecognitionFailed {
                    page: page_num,
                    detail: format!("worker panicked: {}", detail),
                },
            )
        }
    }
}

/// The fallible part of page processing: preprocess → recognise.
fn recognise_page(
    engine: &dyn RecognitionEngine,
    page: &PageImage,
    page_num: usize,
) -> Result<String, PageError> {
    let binary = preprocess::preprocess(&page.image).map_err(|e| PageError::InvalidImage {
        page: page_num,
        detail: e.to_string(),
    })?;

    engine
        .recognise(&binary)
        .map_err(|e| PageError::RecognitionFailed {
            page: page_num,
            detail: e.to_string(),
        })
}

/// Best-effort extraction of a panic payload message.
fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::ocr::EngineError;
    use image::{DynamicImage, GrayImage, Luma};

    struct FixedText(&'static str);
    impl RecognitionEngine for FixedText {
        fn name(&self) -> &'static str {
            "fixed"
        }
        fn recognise(&self, _image: &GrayImage) -> Result<String, EngineError> {
            Ok(self.0.to_string())
        }
    }

    struct Faulty;
    impl RecognitionEngine for Faulty {
        fn name(&self) -> &'static str {
            "faulty"
        }
        fn recognise(&self, _image: &GrayImage) -> Result<String, EngineError> {
            Err(EngineError("engine unavailable".into()))
        }
    }

    struct Panicking;
    impl RecognitionEngine for Panicking {
        fn name(&self) -> &'static str {
            "panicking"
        }
        fn recognise(&self, _image: &GrayImage) -> Result<String, EngineError> {
            panic!("unexpected fault in engine");
        }
    }

    fn page(index: usize) -> PageImage {
        PageImage {
            index,
            image: DynamicImage::ImageLuma8(GrayImage::from_pixel(32, 32, Luma([200u8]))),
        }
    }

    fn empty_page(index: usize) -> PageImage {
        PageImage {
            index,
            image: DynamicImage::ImageLuma8(GrayImage::new(0, 0)),
        }
    }

    #[test]
    fn successful_page_carries_text_and_one_based_number() {
        let result = process_page(&FixedText("hello"), page(4));
        assert_eq!(result.page_num, 5);
        assert_eq!(result.text, "hello");
        assert!(result.error.is_none());
    }

    #[test]
    fn invalid_image_becomes_failed_result() {
        let result = process_page(&FixedText("unreachable"), empty_page(0));
        assert!(matches!(
            result.error,
            Some(PageError::InvalidImage { page: 1, .. })
        ));
        assert_eq!(result.text, "");
    }

    #[test]
    fn engine_failure_becomes_failed_result() {
        let result = process_page(&Faulty, page(2));
        assert!(matches!(
            result.error,
            Some(PageError::RecognitionFailed { page: 3, .. })
        ));
        assert_eq!(result.text, "");
    }

    #[test]
    fn panic_is_isolated_like_an_engine_failure() {
        let result = process_page(&Panicking, page(0));
        match result.error {
            Some(PageError::RecognitionFailed { page, detail }) => {
                assert_eq!(page, 1);
                assert!(detail.contains("panicked"), "got: {detail}");
            }
            other => panic!("expected RecognitionFailed, got {:?}", other),
        }
    }
}
