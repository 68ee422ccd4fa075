//! Image preprocessing: grayscale conversion + Otsu binarisation.
//!
//! Recognition engines perform markedly better on clean bi-level input
//! than on raw anti-aliased renders. This stage reduces each page image to
//! a black-and-white raster in two deterministic steps:
//!
//! 1. **Grayscale** — `DynamicImage::to_luma8`, the fixed luminance mapping
//!    of the `image` crate.
//! 2. **Binarisation** — a global threshold selected per image by Otsu's
//!    method (`imageproc::contrast::otsu_level`): the threshold maximises
//!    between-class variance in the page's own intensity histogram, so
//!    documents with different exposure/contrast binarise consistently
//!    instead of depending on a fixed constant.
//!
//! The whole stage is a pure function over an exclusively-owned image:
//! no shared state, safe to run from any number of workers at once, and
//! bit-identical across repeated runs on the same input.

use image::{DynamicImage, GenericImageView, GrayImage};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};
use thiserror::Error;

/// Failure to derive a recognition-ready image from a page raster.
#[derive(Debug, Error)]
pub enum PreprocessError {
    /// The raster has no pixels; there is nothing to threshold.
    #[error("image has zero dimensions ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
}

/// Convert a page raster into a recognition-ready binary image.
///
/// Pixels strictly brighter than the Otsu level map to white, the rest to
/// black — the page background ends up white, glyphs black, which is the
/// polarity recognition engines expect.
pub fn preprocess(image: &DynamicImage) -> Result<GrayImage, PreprocessError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(PreprocessError::EmptyImage { width, height });
    }

    let gray = image.to_luma8();
    let level = otsu_level(&gray);
    Ok(threshold(&gray, level, ThresholdType::Binary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgba, RgbaImage};

    /// Two-tone page: dark "glyph" band on a light background.
    fn bimodal_page() -> DynamicImage {
        let img = GrayImage::from_fn(64, 64, |x, _| {
            if (20..28).contains(&x) {
                Luma([30u8])
            } else {
                Luma([220u8])
            }
        });
        DynamicImage::ImageLuma8(img)
    }

    #[test]
    fn zero_size_image_is_rejected() {
        let empty = DynamicImage::ImageLuma8(GrayImage::new(0, 0));
        let err = preprocess(&empty).unwrap_err();
        assert!(matches!(err, PreprocessError::EmptyImage { .. }));
    }

    #[test]
    fn output_is_strictly_bilevel() {
        let out = preprocess(&bimodal_page()).unwrap();
        assert!(out.pixels().all(|p| p[0] == 0 || p[0] == 255));
    }

    #[test]
    fn dark_glyphs_map_to_black_background_to_white() {
        let out = preprocess(&bimodal_page()).unwrap();
        assert_eq!(out.get_pixel(24, 10)[0], 0, "glyph band must be black");
        assert_eq!(out.get_pixel(5, 10)[0], 255, "background must be white");
    }

    #[test]
    fn preprocessing_is_deterministic() {
        let page = bimodal_page();
        let a = preprocess(&page).unwrap();
        let b = preprocess(&page).unwrap();
        assert_eq!(a.as_raw(), b.as_raw(), "double run must be bit-identical");
    }

    #[test]
    fn colour_input_is_flattened_before_thresholding() {
        let img = RgbaImage::from_pixel(16, 16, Rgba([255, 255, 255, 255]));
        let out = preprocess(&DynamicImage::ImageRgba8(img)).unwrap();
        assert_eq!(out.dimensions(), (16, 16));
        assert!(out.pixels().all(|p| p[0] == 0 || p[0] == 255));
    }
}
