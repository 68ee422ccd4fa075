//! Extraction entry points and the page-processing orchestrator.
//!
//! ## Orchestration model
//!
//! The orchestrator fans one worker task out per page, bounded to
//! `concurrency` simultaneously-executing tasks, and fans results back in
//! through fixed-size indexed slots:
//!
//! - **Dispatch** — pages are submitted in page order; each runs the page
//!   worker on a `spawn_blocking` thread (the work is CPU-bound, so this is
//!   true parallelism, not cooperative scheduling).
//! - **Collect** — completions arrive in any order; each result is written
//!   into the slot matching its submission position. Dispatch never waits
//!   on an earlier page's completion.
//! - **Complete** — once every task has reported, the slots are read
//!   0..N-1. Ordering is engineered at exactly this boundary, which is why
//!   a worker finishing pages 5-before-2 can never reorder the output.
//!
//! Page failures never reach the orchestrator: the worker converts them to
//! failed results, so the only error paths here are job-fatal ones
//! (acquisition, rasterisation, configuration).

use crate::config::ExtractionConfig;
use crate::error::{PageError, PdfOcrError};
use crate::output::{ExtractionOutput, ExtractionStats, DocumentMetadata, PageResult};
use crate::pipeline::ocr::{self, RecognitionEngine};
use crate::pipeline::render::PageImage;
use crate::pipeline::{input, postprocess, render, worker};
use futures::stream::{self, StreamExt};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Extract per-page plain text from a PDF file or URL.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `input_str` — Local file path or HTTP/HTTPS URL to a PDF
/// * `config` — Extraction configuration
///
/// # Returns
/// `Ok(ExtractionOutput)` whenever the page sequence could be produced —
/// even if every single page failed recognition (check
/// `output.stats.failed_pages`). The output always contains one entry per
/// processed page, in page order.
///
/// # Errors
/// Returns `Err(PdfOcrError)` only for job-fatal errors: the PDF could not
/// be acquired (missing file, failed download, not a PDF) or could not be
/// rasterised (corrupt document, wrong password).
pub async fn extract(
    input_str: impl AsRef<str>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, PdfOcrError> {
    let total_start = Instant::now();
    let input_str = input_str.as_ref();
    info!("Starting extraction: {}", input_str);

    // ── Step 1: Acquire the PDF ──────────────────────────────────────────
    let source = input::acquire(input_str, config.download_timeout_secs).await?;
    let pdf_path = source.path().to_path_buf();

    // ── Step 2: Resolve the recognition engine ───────────────────────────
    let engine = ocr::resolve_engine(config)?;
    debug!("Using recognition engine: {}", engine.name());

    // ── Step 3: Extract metadata ─────────────────────────────────────────
    let metadata = render::extract_metadata(&pdf_path, config.password.as_deref()).await?;
    let total_pages = metadata.page_count;
    info!("PDF has {} pages", total_pages);

    // ── Step 4: Compute page indices ─────────────────────────────────────
    let page_indices = config.pages.to_indices(total_pages);
    if page_indices.is_empty() {
        return Err(PdfOcrError::PageOutOfRange {
            page: 0,
            total: total_pages,
        });
    }
    debug!("Selected {} pages for extraction", page_indices.len());

    // ── Step 5: Rasterise pages ──────────────────────────────────────────
    let render_start = Instant::now();
    let pages = render::rasterise_pages(&pdf_path, config, &page_indices).await?;
    let render_duration_ms = render_start.elapsed().as_millis() as u64;
    info!("Rasterised {} pages in {}ms", pages.len(), render_duration_ms);

    if let Some(ref cb) = config.progress {
        cb.on_job_start(pages.len());
    }

    // ── Step 6: Fan out to the worker pool, fan in ordered results ───────
    let ocr_start = Instant::now();
    let mut results = process_pages(engine, pages, config).await;
    let ocr_duration_ms = ocr_start.elapsed().as_millis() as u64;

    // ── Step 7: Clean up recognised text ─────────────────────────────────
    for result in &mut results {
        if result.error.is_none() {
            result.text = postprocess::clean_text(&result.text);
        }
    }

    // ── Step 8: Compute stats ────────────────────────────────────────────
    let recognized = results.iter().filter(|p| p.error.is_none()).count();
    let failed = results.len() - recognized;

    if let Some(ref cb) = config.progress {
        cb.on_job_complete(results.len(), recognized);
    }

    let stats = ExtractionStats {
        total_pages,
        recognized_pages: recognized,
        failed_pages: failed,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
        render_duration_ms,
        ocr_duration_ms,
    };

    info!(
        "Extraction complete: {}/{} pages recognised, {}ms total",
        recognized,
        results.len(),
        stats.total_duration_ms
    );

    Ok(ExtractionOutput {
        pages: results,
        metadata,
        stats,
    })
}

/// Extract a PDF and write the page texts to a plain-text file.
///
/// Pages are joined with single newlines, matching the per-page array
/// shape flattened to a text document. Uses atomic write (temp file +
/// rename) to prevent partial files.
pub async fn extract_to_file(
    input_str: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionStats, PdfOcrError> {
    let output = extract(input_str, config).await?;
    let path = output_path.as_ref();

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| PdfOcrError::OutputWriteFailed {
                path: path.to_path_buf(),
                source: e,
            })?;
    }

    let mut body = output.plain_text("\n");
    body.push('\n');

    let tmp_path = path.with_extension("txt.tmp");
    tokio::fs::write(&tmp_path, &body)
        .await
        .map_err(|e| PdfOcrError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| PdfOcrError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    Ok(output.stats)
}

/// Synchronous wrapper around [`extract`].
///
/// Creates a temporary tokio runtime internally.
pub fn extract_sync(
    input_str: impl AsRef<str>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, PdfOcrError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| PdfOcrError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(extract(input_str, config))
}

/// Extract text from PDF bytes in memory.
///
/// The bytes are written to a managed [`tempfile`] which is cleaned up
/// automatically on return or panic. This is the natural entry point for
/// an HTTP handler holding an uploaded or downloaded body.
pub async fn extract_from_bytes(
    bytes: &[u8],
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, PdfOcrError> {
    let mut tmp = tempfile::NamedTempFile::new()
        .map_err(|e| PdfOcrError::Internal(format!("tempfile: {e}")))?;
    tmp.write_all(bytes)
        .map_err(|e| PdfOcrError::Internal(format!("tempfile write: {e}")))?;
    let path = tmp.path().to_string_lossy().to_string();
    // `tmp` is dropped (and the file deleted) when `extract` returns
    extract(&path, config).await
}

/// Extract PDF metadata without rasterising or recognising anything.
///
/// Does not require a recognition engine.
pub async fn inspect(input_str: impl AsRef<str>) -> Result<DocumentMetadata, PdfOcrError> {
    let source = input::acquire(input_str.as_ref(), 120).await?;
    let pdf_path = source.path().to_path_buf();
    render::extract_metadata(&pdf_path, None).await
}

// ── The orchestrator ─────────────────────────────────────────────────────

/// Run every page through the bounded worker pool and return results in
/// page order.
///
/// Always returns exactly one `PageResult` per input page: worker failures
/// are already folded into results by the worker itself, and a task that
/// could not report (aborted join, expired timeout) is synthesised into a
/// failed result so the length invariant holds unconditionally.
pub(crate) async fn process_pages(
    engine: Arc<dyn RecognitionEngine>,
    pages: Vec<PageImage>,
    config: &ExtractionConfig,
) -> Vec<PageResult> {
    let total = pages.len();
    let timeout_secs = config.page_timeout_secs;
    let progress = config.progress.clone();

    // Page numbers per slot, for synthesising a result if a task vanishes.
    let page_nums: Vec<usize> = pages.iter().map(|p| p.index + 1).collect();

    let mut slots: Vec<Option<PageResult>> = Vec::with_capacity(total);
    slots.resize_with(total, || None);

    let mut completions = stream::iter(pages.into_iter().enumerate().map(|(slot, page)| {
        let engine = Arc::clone(&engine);
        let progress = progress.clone();
        async move {
            let page_num = page.index + 1;
            if let Some(ref cb) = progress {
                cb.on_page_start(page_num, total);
            }

            let handle =
                tokio::task::spawn_blocking(move || worker::process_page(engine.as_ref(), page));

            let result = match timeout_secs {
                Some(secs) => {
                    match tokio::time::timeout(Duration::from_secs(secs), handle).await {
                        Ok(join) => unwrap_join(join, page_num),
                        // The blocking call itself cannot be interrupted;
                        // its eventual result is abandoned.
                        Err(_) => PageResult::failed(
                            page_num,
                            secs * 1000,
                            PageError::Timeout {
                                page: page_num,
                                secs,
                            },
                        ),
                    }
                }
                None => unwrap_join(handle.await, page_num),
            };

            if let Some(ref cb) = progress {
                match &result.error {
                    None => cb.on_page_complete(page_num, total, result.text.len()),
                    Some(e) => cb.on_page_error(page_num, total, &e.to_string()),
                }
            }

            (slot, result)
        }
    }))
    .buffer_unordered(config.concurrency.max(1));

    while let Some((slot, result)) = completions.next().await {
        slots[slot] = Some(result);
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(slot, entry)| {
            entry.unwrap_or_else(|| {
                let page_num = page_nums[slot];
                PageResult::failed(
                    page_num,
                    0,
                    PageError::RecognitionFailed {
                        page: page_num,
                        detail: "worker produced no result".to_string(),
                    },
                )
            })
        })
        .collect()
}

/// Fold a `spawn_blocking` join outcome into a `PageResult`.
///
/// The worker catches its own panics, so a join error only occurs when the
/// runtime aborted the task; treat it as a page-local failure.
fn unwrap_join(
    join: Result<PageResult, tokio::task::JoinError>,
    page_num: usize,
) -> PageResult {
    match join {
        Ok(result) => result,
        Err(e) => PageResult::failed(
            page_num,
            0,
            PageError::RecognitionFailed {
                page: page_num,
                detail: format!("worker task aborted: {}", e),
            },
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::ocr::EngineError;
    use image::{DynamicImage, GrayImage, Luma};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Pages carry their identity in the image width (`WIDTH_BASE + index`)
    /// so the mock engine can prove which page it was handed even though
    /// workers complete in arbitrary order.
    const WIDTH_BASE: u32 = 100;

    fn page(index: usize) -> PageImage {
        PageImage {
            index,
            image: DynamicImage::ImageLuma8(GrayImage::from_pixel(
                WIDTH_BASE + index as u32,
                32,
                Luma([200u8]),
            )),
        }
    }

    fn corrupt_page(index: usize) -> PageImage {
        PageImage {
            index,
            image: DynamicImage::ImageLuma8(GrayImage::new(0, 0)),
        }
    }

    fn pages(n: usize) -> Vec<PageImage> {
        (0..n).map(page).collect()
    }

    /// Mock engine: returns `page-<index>`, optionally sleeping on selected
    /// pages, while tracking invocation and concurrency high-water marks.
    #[derive(Default)]
    struct MockEngine {
        slow_index: Option<usize>,
        delay_ms: u64,
        blank_index: Option<usize>,
        calls: AtomicUsize,
        active: AtomicUsize,
        max_active: AtomicUsize,
    }

    impl RecognitionEngine for MockEngine {
        fn name(&self) -> &'static str {
            "mock"
        }

        fn recognise(&self, image: &GrayImage) -> Result<String, EngineError> {
            let index = (image.width() - WIDTH_BASE) as usize;
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_active.fetch_max(now, Ordering::SeqCst);

            if self.slow_index == Some(index) || self.slow_index.is_none() && self.delay_ms > 0 {
                std::thread::sleep(Duration::from_millis(self.delay_ms));
            }

            self.active.fetch_sub(1, Ordering::SeqCst);

            if self.blank_index == Some(index) {
                Ok(String::new())
            } else {
                Ok(format!("page-{index}"))
            }
        }
    }

    fn config(concurrency: usize) -> ExtractionConfig {
        ExtractionConfig::builder()
            .concurrency(concurrency)
            .build()
            .unwrap()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn order_invariant_survives_a_slow_page() {
        let engine = Arc::new(MockEngine {
            slow_index: Some(2),
            delay_ms: 200,
            ..Default::default()
        });
        let cfg = config(4);

        let results = process_pages(engine, pages(8), &cfg).await;

        assert_eq!(results.len(), 8);
        for (i, r) in results.iter().enumerate() {
            assert_eq!(r.page_num, i + 1, "slot {i} holds the wrong page");
            assert_eq!(r.text, format!("page-{i}"));
            assert!(r.error.is_none());
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn one_corrupt_page_never_disturbs_the_others() {
        let engine = Arc::new(MockEngine::default());
        let cfg = config(4);

        let mut input = pages(5);
        input[2] = corrupt_page(2);

        let results = process_pages(engine.clone(), input, &cfg).await;

        assert_eq!(results.len(), 5);
        assert!(matches!(
            results[2].error,
            Some(PageError::InvalidImage { page: 3, .. })
        ));
        assert_eq!(results[2].text, "");
        for i in [0usize, 1, 3, 4] {
            assert!(results[i].error.is_none());
            assert_eq!(results[i].text, format!("page-{i}"));
        }
        // The corrupt page never reached the engine.
        assert_eq!(engine.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn concurrency_never_exceeds_the_configured_bound() {
        let engine = Arc::new(MockEngine {
            delay_ms: 30,
            ..Default::default()
        });
        let cfg = config(3);

        let results = process_pages(engine.clone(), pages(16), &cfg).await;

        assert_eq!(results.len(), 16);
        assert_eq!(engine.calls.load(Ordering::SeqCst), 16);
        let max = engine.max_active.load(Ordering::SeqCst);
        assert!(max <= 3, "observed {max} simultaneous recognitions");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn blank_page_succeeds_with_empty_text() {
        let engine = Arc::new(MockEngine {
            blank_index: Some(1),
            ..Default::default()
        });
        let cfg = config(4);

        let results = process_pages(engine, pages(3), &cfg).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[1].text, "");
        assert!(
            results[1].error.is_none(),
            "a blank page is a success, not a failure"
        );
        let failed = results.iter().filter(|r| r.is_failed()).count();
        assert_eq!(failed, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn expired_page_timeout_degrades_like_a_recognition_failure() {
        let engine = Arc::new(MockEngine {
            slow_index: Some(0),
            delay_ms: 2_500,
            ..Default::default()
        });
        let cfg = ExtractionConfig::builder()
            .concurrency(2)
            .page_timeout_secs(1)
            .build()
            .unwrap();

        let results = process_pages(engine, pages(2), &cfg).await;

        assert_eq!(results.len(), 2);
        assert!(matches!(
            results[0].error,
            Some(PageError::Timeout { page: 1, secs: 1 })
        ));
        assert_eq!(results[0].text, "");
        assert!(results[1].error.is_none(), "the other page is unaffected");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn sparse_page_selection_keeps_document_page_numbers() {
        let engine = Arc::new(MockEngine::default());
        let cfg = config(2);

        // Pages 3, 5, 9 of some larger document.
        let input = vec![page(2), page(4), page(8)];
        let results = process_pages(engine, input, &cfg).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].page_num, 3);
        assert_eq!(results[1].page_num, 5);
        assert_eq!(results[2].page_num, 9);
        assert_eq!(results[2].text, "page-8");
    }

    #[tokio::test]
    async fn missing_file_short_circuits_before_any_worker_runs() {
        let engine = Arc::new(MockEngine::default());
        let cfg = ExtractionConfig::builder()
            .engine(engine.clone())
            .build()
            .unwrap();

        let err = extract("/no/such/document.pdf", &cfg).await.unwrap_err();
        assert!(matches!(err, PdfOcrError::FileNotFound { .. }));
        assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn non_pdf_input_short_circuits_before_any_worker_runs() {
        use std::io::Write as _;
        let engine = Arc::new(MockEngine::default());
        let cfg = ExtractionConfig::builder()
            .engine(engine.clone())
            .build()
            .unwrap();

        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"GIF89a not a pdf at all").unwrap();

        let err = extract(f.path().to_str().unwrap(), &cfg).await.unwrap_err();
        assert!(matches!(err, PdfOcrError::NotAPdf { .. }));
        assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unrasterisable_pdf_is_fatal_and_never_reaches_workers() {
        use std::io::Write as _;
        let engine = Arc::new(MockEngine::default());
        let cfg = ExtractionConfig::builder()
            .engine(engine.clone())
            .build()
            .unwrap();

        // Valid magic bytes, garbage body: passes acquisition, fails in the
        // rasteriser (or at pdfium binding), fatal either way.
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"%PDF-1.4\nnot an actual page tree").unwrap();

        let result = extract(f.path().to_str().unwrap(), &cfg).await;
        assert!(result.is_err(), "corrupt PDF must be a job-level error");
        assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
    }
}
