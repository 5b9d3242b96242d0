//! OCR-specific image resizing functionality.
//!
//! Text line crops are resized to the fixed height of the recognition or
//! classification model while keeping their aspect ratio. The width is capped
//! by the batch width; the normalizer pads what is left with zeros.

use crate::core::OCRError;
use crate::core::batch::crop_ratio;
use crate::core::constants::DEFAULT_REC_IMAGE_SHAPE;
use image::RgbImage;
use image::imageops::{self, FilterType};

/// OCR-specific image resizer.
#[derive(Debug, Clone)]
pub struct OCRResize {
    /// Model input shape `[channels, height, width]`.
    pub image_shape: [usize; 3],
}

impl Default for OCRResize {
    fn default() -> Self {
        Self::new(None)
    }
}

impl OCRResize {
    /// Creates a new OCRResize instance.
    ///
    /// # Arguments
    ///
    /// * `image_shape` - Optional shape `[channels, height, width]`.
    ///   If None, uses DEFAULT_REC_IMAGE_SHAPE.
    pub fn new(image_shape: Option<[usize; 3]>) -> Self {
        Self {
            image_shape: image_shape.unwrap_or(DEFAULT_REC_IMAGE_SHAPE),
        }
    }

    /// The fixed input height.
    pub fn height(&self) -> usize {
        self.image_shape[1]
    }

    /// The configured input width.
    pub fn width(&self) -> usize {
        self.image_shape[2]
    }

    /// Width of a recognition batch whose widest crop has ratio `max_ratio`.
    ///
    /// The model's own width/height ratio is a lower bound, so narrow batches
    /// are still padded to the configured width.
    pub fn batch_width(&self, max_ratio: f32) -> usize {
        let [_, img_h, img_w] = self.image_shape;
        let max_wh_ratio = (img_w as f32 / img_h as f32).max(max_ratio);
        ((img_h as f32 * max_wh_ratio).floor() as usize).max(1)
    }

    /// Width a crop is resized to before padding to `target_w`.
    pub fn resized_width(&self, img: &RgbImage, target_w: usize) -> usize {
        let scaled = (self.height() as f32 * crop_ratio(img)).ceil() as usize;
        scaled.min(target_w).max(1)
    }

    /// Resizes one crop to the model height and at most `target_w` pixels wide.
    ///
    /// # Errors
    ///
    /// Returns an error if the crop is empty.
    pub fn resize_img(&self, img: &RgbImage, target_w: usize) -> Result<RgbImage, OCRError> {
        if img.width() == 0 || img.height() == 0 {
            return Err(OCRError::invalid_input("cannot resize an empty crop"));
        }
        let resized_w = self.resized_width(img, target_w) as u32;
        let resized_h = self.height() as u32;

        // Use Triangle (bilinear) to match cv2.resize INTER_LINEAR
        Ok(imageops::resize(img, resized_w, resized_h, FilterType::Triangle))
    }

    /// Applies resizing to a batch of crops sharing one target width.
    pub fn apply(&self, imgs: &[RgbImage], target_w: usize) -> Result<Vec<RgbImage>, OCRError> {
        imgs.iter().map(|img| self.resize_img(img, target_w)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_width_has_model_ratio_floor() {
        let resizer = OCRResize::default();
        assert_eq!(resizer.batch_width(1.0), 320);
        assert_eq!(resizer.batch_width(10.0), 480);
    }

    #[test]
    fn test_resized_width_is_capped() {
        let resizer = OCRResize::default();
        let wide = RgbImage::new(200, 10);
        assert_eq!(resizer.resized_width(&wide, 320), 320);
        let square = RgbImage::new(10, 10);
        assert_eq!(resizer.resized_width(&square, 320), 48);
    }

    #[test]
    fn test_classifier_shape_never_upscales_past_width() {
        let resizer = OCRResize::new(Some([3, 48, 192]));
        let img = RgbImage::new(100, 10);
        let resized = resizer.resize_img(&img, resizer.width()).unwrap();
        assert_eq!(resized.dimensions(), (192, 48));
        let narrow = resizer.resize_img(&RgbImage::new(5, 10), resizer.width()).unwrap();
        assert_eq!(narrow.dimensions(), (24, 48));
    }

    #[test]
    fn test_empty_crop_is_rejected() {
        let resizer = OCRResize::default();
        assert!(resizer.resize_img(&RgbImage::new(0, 4), 320).is_err());
    }
}
