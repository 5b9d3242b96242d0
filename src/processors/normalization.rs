//! Image normalization utilities for OCR processing.
//!
//! This module turns RGB images into CHW `f32` tensors, either with the
//! ImageNet statistics used by the detector or with the `[-1, 1]` scaling
//! used by the recognizer and the orientation classifier.

use crate::core::constants::{IMAGENET_MEAN, IMAGENET_STD};
use crate::core::{OCRError, Tensor4D};
use crate::processors::types::ColorOrder;
use image::RgbImage;
use ndarray::Array4;
use rayon::prelude::*;

/// Normalizes images for OCR processing.
///
/// Every channel value `v` becomes `v * alpha[c] + beta[c]`, where
/// `alpha = scale / std` and `beta = -mean / std`.
#[derive(Debug, Clone)]
pub struct NormalizeImage {
    /// Scaling factors for each channel (alpha = scale / std)
    pub alpha: [f32; 3],
    /// Offset values for each channel (beta = -mean / std)
    pub beta: [f32; 3],
    /// Order of the channel planes in the output tensor
    pub color_order: ColorOrder,
}

impl NormalizeImage {
    /// Creates a new NormalizeImage instance with the specified parameters.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `scale` or any standard deviation is not
    /// strictly positive.
    pub fn new(
        scale: f32,
        mean: [f32; 3],
        std: [f32; 3],
        color_order: ColorOrder,
    ) -> Result<Self, OCRError> {
        if scale <= 0.0 {
            return Err(OCRError::ConfigError {
                message: "Scale must be greater than 0".to_string(),
            });
        }

        for (i, &s) in std.iter().enumerate() {
            if s <= 0.0 {
                return Err(OCRError::ConfigError {
                    message: format!(
                        "Standard deviation at index {i} must be greater than 0, got {s}"
                    ),
                });
            }
        }

        Ok(Self {
            alpha: std.map(|s| scale / s),
            beta: [0, 1, 2].map(|c| -mean[c] / std[c]),
            color_order,
        })
    }

    /// ImageNet mean/std normalization of RGB planes, as the detector expects.
    pub fn imagenet() -> Self {
        Self {
            alpha: IMAGENET_STD.map(|s| 1.0 / 255.0 / s),
            beta: [0, 1, 2].map(|c| -IMAGENET_MEAN[c] / IMAGENET_STD[c]),
            color_order: ColorOrder::RGB,
        }
    }

    /// `(v / 255 - 0.5) / 0.5` scaling of BGR planes, as the recognizer and the
    /// orientation classifier expect.
    pub fn for_ocr_recognition() -> Self {
        Self {
            alpha: [2.0 / 255.0; 3],
            beta: [-1.0; 3],
            color_order: ColorOrder::BGR,
        }
    }

    fn source_channel(&self, plane: usize) -> usize {
        match self.color_order {
            ColorOrder::RGB => plane,
            ColorOrder::BGR => 2 - plane,
        }
    }

    /// Writes one image into a CHW slot of `height * width` planes.
    ///
    /// Pixels beyond the image extent keep whatever the slot already holds.
    fn write_chw(&self, img: &RgbImage, slot: &mut [f32], height: usize, width: usize) {
        let plane_len = height * width;
        let rows = (img.height() as usize).min(height);
        let cols = (img.width() as usize).min(width);

        for plane in 0..3 {
            let src_c = self.source_channel(plane);
            let (alpha, beta) = (self.alpha[src_c], self.beta[src_c]);
            let dst = &mut slot[plane * plane_len..(plane + 1) * plane_len];
            for y in 0..rows {
                for x in 0..cols {
                    let value = img.get_pixel(x as u32, y as u32)[src_c] as f32;
                    dst[y * width + x] = value * alpha + beta;
                }
            }
        }
    }

    /// Normalizes a single image into a `[1, 3, H, W]` tensor.
    pub fn normalize_to(&self, img: &RgbImage) -> Result<Tensor4D, OCRError> {
        let (width, height) = (img.width() as usize, img.height() as usize);
        if width == 0 || height == 0 {
            return Err(OCRError::InvalidInput {
                message: "cannot normalize an empty image".to_string(),
            });
        }
        let mut data = vec![0.0f32; 3 * height * width];
        self.write_chw(img, &mut data, height, width);
        Ok(Array4::from_shape_vec((1, 3, height, width), data)?)
    }

    /// Normalizes a batch of images into a `[N, 3, height, width]` tensor.
    ///
    /// Images narrower or shorter than the batch extent are zero padded on the
    /// right and bottom. Images are processed in parallel.
    pub fn normalize_batch_to(
        &self,
        imgs: &[RgbImage],
        height: usize,
        width: usize,
    ) -> Result<Tensor4D, OCRError> {
        let img_size = 3 * height * width;
        let mut data = vec![0.0f32; imgs.len() * img_size];

        if img_size > 0 {
            data.par_chunks_mut(img_size)
                .zip(imgs.par_iter())
                .for_each(|(slot, img)| self.write_chw(img, slot, height, width));
        }

        Ok(Array4::from_shape_vec((imgs.len(), 3, height, width), data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_new_rejects_bad_parameters() {
        assert!(NormalizeImage::new(0.0, [0.0; 3], [1.0; 3], ColorOrder::RGB).is_err());
        assert!(NormalizeImage::new(1.0, [0.0; 3], [1.0, 0.0, 1.0], ColorOrder::RGB).is_err());
        assert!(NormalizeImage::new(1.0 / 255.0, [0.5; 3], [0.5; 3], ColorOrder::BGR).is_ok());
    }

    #[test]
    fn test_recognition_scaling_is_minus_one_to_one() {
        let norm = NormalizeImage::for_ocr_recognition();
        let img = RgbImage::from_fn(2, 1, |x, _| if x == 0 { Rgb([0, 0, 0]) } else { Rgb([255, 255, 255]) });
        let tensor = norm.normalize_to(&img).unwrap();
        assert!((tensor[[0, 0, 0, 0]] + 1.0).abs() < 1e-6);
        assert!((tensor[[0, 2, 0, 1]] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_bgr_planes_are_swapped() {
        let img = RgbImage::from_pixel(1, 1, Rgb([255, 0, 0]));
        let bgr = NormalizeImage::for_ocr_recognition().normalize_to(&img).unwrap();
        assert!((bgr[[0, 0, 0, 0]] + 1.0).abs() < 1e-6);
        assert!((bgr[[0, 2, 0, 0]] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_imagenet_values() {
        let img = RgbImage::from_pixel(1, 1, Rgb([255, 255, 255]));
        let tensor = NormalizeImage::imagenet().normalize_to(&img).unwrap();
        let expected = (1.0 - 0.485) / 0.229;
        assert!((tensor[[0, 0, 0, 0]] - expected).abs() < 1e-4);
    }

    #[test]
    fn test_batch_is_zero_padded() {
        let norm = NormalizeImage::for_ocr_recognition();
        let imgs = vec![
            RgbImage::from_pixel(2, 2, Rgb([255, 255, 255])),
            RgbImage::from_pixel(4, 2, Rgb([255, 255, 255])),
        ];
        let tensor = norm.normalize_batch_to(&imgs, 2, 4).unwrap();
        assert_eq!(tensor.shape(), &[2, 3, 2, 4]);
        assert!((tensor[[0, 1, 1, 1]] - 1.0).abs() < 1e-6);
        assert_eq!(tensor[[0, 1, 1, 2]], 0.0);
        assert_eq!(tensor[[0, 1, 1, 3]], 0.0);
        assert!((tensor[[1, 1, 1, 3]] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_image_is_rejected() {
        let norm = NormalizeImage::imagenet();
        assert!(norm.normalize_to(&RgbImage::new(0, 0)).is_err());
    }
}
