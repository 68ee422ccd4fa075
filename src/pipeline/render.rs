//! Rasterisation: render PDF pages to page images via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async
//! contexts. `tokio::task::spawn_blocking` moves the work onto the blocking
//! thread pool so Tokio workers never stall during CPU-heavy rendering.
//!
//! ## Failure model
//!
//! Any failure in this stage is fatal to the job: without the ordered page
//! sequence there is nothing for the worker pool to recognise, and the
//! output length invariant (`pages.len() == rasterised page count`) could
//! not hold. Per-page tolerance starts *after* rasterisation.

use crate::config::ExtractionConfig;
use crate::error::PdfOcrError;
use crate::output::DocumentMetadata;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// One rasterised page: the raster plus its 0-based position in the
/// document. Moved by value into exactly one page worker; never shared.
pub struct PageImage {
    /// 0-based page index, equal to the page's position in the PDF.
    pub index: usize,
    /// The rendered raster.
    pub image: DynamicImage,
}

/// Rasterise the selected pages of a PDF into page images.
///
/// Runs inside `spawn_blocking` since pdfium operations are CPU-bound.
/// The returned vector is ordered by page index.
pub async fn rasterise_pages(
    pdf_path: &Path,
    config: &ExtractionConfig,
    page_indices: &[usize],
) -> Result<Vec<PageImage>, PdfOcrError> {
    let path = pdf_path.to_path_buf();
    let max_pixels = config.max_rendered_pixels;
    let password = config.password.clone();
    let indices = page_indices.to_vec();

    tokio::task::spawn_blocking(move || {
        rasterise_blocking(&path, max_pixels, password.as_deref(), &indices)
    })
    .await
    .map_err(|e| PdfOcrError::Internal(format!("Rasterise task panicked: {}", e)))?
}

/// Bind to the pdfium library.
///
/// Binding is cheap; doing it per call keeps this module free of global
/// state, so concurrent jobs never contend on a shared binding.
fn bind_pdfium() -> Result<Pdfium, PdfOcrError> {
    let bindings = Pdfium::bind_to_system_library()
        .map_err(|e| PdfOcrError::PdfiumBindingFailed(format!("{:?}", e)))?;
    Ok(Pdfium::new(bindings))
}

/// Map a pdfium document-open failure onto the acquisition/rasterisation taxonomy.
fn map_open_error(e: PdfiumError, path: &Path, password: Option<&str>) -> PdfOcrError {
    let err_str = format!("{:?}", e);
    if err_str.contains("Password") || err_str.contains("password") {
        if password.is_some() {
            PdfOcrError::WrongPassword {
                path: path.to_path_buf(),
            }
        } else {
            PdfOcrError::PasswordRequired {
                path: path.to_path_buf(),
            }
        }
    } else {
        PdfOcrError::CorruptPdf {
            path: path.to_path_buf(),
            detail: err_str,
        }
    }
}

/// Blocking implementation of page rasterisation.
fn rasterise_blocking(
    pdf_path: &Path,
    max_pixels: u32,
    password: Option<&str>,
    page_indices: &[usize],
) -> Result<Vec<PageImage>, PdfOcrError> {
    let pdfium = bind_pdfium()?;

    let document = pdfium
        .load_pdf_from_file(pdf_path, password)
        .map_err(|e| map_open_error(e, pdf_path, password))?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("PDF loaded: {} pages", total_pages);

    let render_config = PdfRenderConfig::new()
        .set_target_width(max_pixels as i32)
        .set_maximum_height(max_pixels as i32);

    let mut results = Vec::with_capacity(page_indices.len());

    for &idx in page_indices {
        if idx >= total_pages {
            return Err(PdfOcrError::PageOutOfRange {
                page: idx + 1,
                total: total_pages,
            });
        }

        let page = pages
            .get(idx as u16)
            .map_err(|e| PdfOcrError::RasterisationFailed {
                page: idx + 1,
                detail: format!("{:?}", e),
            })?;

        let bitmap =
            page.render_with_config(&render_config)
                .map_err(|e| PdfOcrError::RasterisationFailed {
                    page: idx + 1,
                    detail: format!("{:?}", e),
                })?;

        let image = bitmap.as_image();
        debug!(
            "Rasterised page {} → {}x{} px",
            idx + 1,
            image.width(),
            image.height()
        );

        results.push(PageImage { index: idx, image });
    }

    Ok(results)
}

/// Extract document metadata from a PDF without rendering pages.
pub async fn extract_metadata(
    pdf_path: &Path,
    password: Option<&str>,
) -> Result<DocumentMetadata, PdfOcrError> {
    let path = pdf_path.to_path_buf();
    let pwd = password.map(|s| s.to_string());

    tokio::task::spawn_blocking(move || extract_metadata_blocking(&path, pwd.as_deref()))
        .await
        .map_err(|e| PdfOcrError::Internal(format!("Metadata task panicked: {}", e)))?
}

/// Blocking implementation of metadata extraction.
fn extract_metadata_blocking(
    pdf_path: &Path,
    password: Option<&str>,
) -> Result<DocumentMetadata, PdfOcrError> {
    let pdfium = bind_pdfium()?;

    let document = pdfium
        .load_pdf_from_file(pdf_path, password)
        .map_err(|e| map_open_error(e, pdf_path, password))?;

    let metadata = document.metadata();
    let pages = document.pages();

    let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
        metadata.get(tag).and_then(|t| {
            let v = t.value().to_string();
            if v.is_empty() {
                None
            } else {
                Some(v)
            }
        })
    };

    Ok(DocumentMetadata {
        title: get_meta(PdfDocumentMetadataTagType::Title),
        author: get_meta(PdfDocumentMetadataTagType::Author),
        subject: get_meta(PdfDocumentMetadataTagType::Subject),
        creator: get_meta(PdfDocumentMetadataTagType::Creator),
        producer: get_meta(PdfDocumentMetadataTagType::Producer),
        creation_date: get_meta(PdfDocumentMetadataTagType::CreationDate),
        modification_date: get_meta(PdfDocumentMetadataTagType::ModificationDate),
        page_count: pages.len() as usize,
        pdf_version: format!("{:?}", document.version()),
    })
}
