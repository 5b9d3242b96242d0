//! Utility functions for image ingestion.
//!
//! Images enter the pipeline either as encoded files or as raw interleaved
//! BGR buffers handed over by a caller. Both paths produce an owned
//! `RgbImage`; a buffer is always copied, so the caller keeps ownership of
//! its memory.

use crate::core::OCRError;
use image::{DynamicImage, RgbImage};
use rayon::prelude::*;
use std::path::Path;

/// Converts a DynamicImage to an RgbImage.
pub fn dynamic_to_rgb(img: DynamicImage) -> RgbImage {
    img.to_rgb8()
}

/// Loads an image from a file path and converts it to RgbImage.
///
/// Any format supported by the `image` crate is accepted.
///
/// # Errors
///
/// Returns `OCRError::ImageLoad` if the file cannot be opened or decoded.
pub fn load_image(path: impl AsRef<Path>) -> Result<RgbImage, OCRError> {
    let img = image::open(path.as_ref()).map_err(OCRError::ImageLoad)?;
    Ok(dynamic_to_rgb(img))
}

/// Loads several images in parallel, failing on the first unreadable one.
pub fn load_images<P: AsRef<Path> + Sync>(paths: &[P]) -> Result<Vec<RgbImage>, OCRError> {
    paths.par_iter().map(load_image).collect()
}

/// Copies an interleaved BGR pixel buffer into an owned RGB image.
///
/// `data` holds `height` rows of `width * channels` bytes without padding;
/// trailing bytes beyond that are ignored.
///
/// # Errors
///
/// * `OCRError::InvalidInput` if `channels` is not 3 or a dimension is zero.
/// * `OCRError::BufferTooSmall` if `data` is shorter than the image.
pub fn image_from_buffer(
    data: &[u8],
    width: u32,
    height: u32,
    channels: u32,
) -> Result<RgbImage, OCRError> {
    if channels != 3 {
        return Err(OCRError::invalid_input("only 3-channel images are supported"));
    }
    if width == 0 || height == 0 {
        return Err(OCRError::invalid_input(format!(
            "image dimensions must be non-zero, got {width}x{height}"
        )));
    }

    let expected = width as usize * height as usize * 3;
    if data.len() < expected {
        return Err(OCRError::BufferTooSmall {
            expected,
            actual: data.len(),
        });
    }

    let mut rgb = Vec::with_capacity(expected);
    for bgr in data[..expected].chunks_exact(3) {
        rgb.extend_from_slice(&[bgr[2], bgr[1], bgr[0]]);
    }

    RgbImage::from_raw(width, height, rgb).ok_or_else(|| {
        OCRError::image_processing_error(format!(
            "failed to build a {width}x{height} image from the buffer"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_buffer_is_converted_from_bgr() {
        let data = [10u8, 20, 30, 40, 50, 60];
        let img = image_from_buffer(&data, 2, 1, 3).unwrap();
        assert_eq!(img.get_pixel(0, 0), &Rgb([30, 20, 10]));
        assert_eq!(img.get_pixel(1, 0), &Rgb([60, 50, 40]));
    }

    #[test]
    fn test_buffer_rejects_other_channel_counts() {
        let data = [0u8; 16];
        for channels in [1, 4] {
            match image_from_buffer(&data, 2, 2, channels) {
                Err(OCRError::InvalidInput { message }) => {
                    assert_eq!(message, "only 3-channel images are supported")
                }
                other => panic!("unexpected result: {other:?}"),
            }
        }
    }

    #[test]
    fn test_buffer_too_small() {
        let data = [0u8; 5];
        assert!(matches!(
            image_from_buffer(&data, 2, 1, 3),
            Err(OCRError::BufferTooSmall {
                expected: 6,
                actual: 5
            })
        ));
    }

    #[test]
    fn test_buffer_zero_dimensions() {
        assert!(matches!(
            image_from_buffer(&[], 0, 4, 3),
            Err(OCRError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_load_image_roundtrip_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pixel.png");
        RgbImage::from_pixel(3, 2, Rgb([1, 2, 3])).save(&path).unwrap();

        let loaded = load_image(&path).unwrap();
        assert_eq!(loaded.dimensions(), (3, 2));
        assert_eq!(load_images(&[&path, &path]).unwrap().len(), 2);

        assert!(matches!(
            load_image(dir.path().join("missing.png")),
            Err(OCRError::ImageLoad(_))
        ));
    }
}
