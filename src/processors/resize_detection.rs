//! Image resizing for the text detection model.
//!
//! The detector accepts any input whose sides are multiples of 32. The
//! `DetResizeForTest` struct scales an image according to a side-length limit,
//! snaps both sides to the nearest multiple of 32 and records the ratios needed
//! to map detections back onto the source image.
//!
//! # Limit Types
//! - Max: Shrink if the longest side exceeds the limit
//! - Min: Enlarge if the shortest side is below the limit

use crate::core::constants::{DEFAULT_LIMIT_SIDE_LEN, DET_SIDE_MULTIPLE};
use crate::processors::types::{ImageScaleInfo, LimitType};
use image::RgbImage;
use image::imageops::{self, FilterType};
use tracing::trace;

/// Resizes images for the detection model.
#[derive(Debug, Clone)]
pub struct DetResizeForTest {
    /// The length to limit the side of the image to
    pub limit_side_len: u32,
    /// Which side the limit applies to
    pub limit_type: LimitType,
}

impl Default for DetResizeForTest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl DetResizeForTest {
    /// Creates a new `DetResizeForTest`, defaulting to a 960 pixel `max` limit.
    pub fn new(limit_side_len: Option<u32>, limit_type: Option<LimitType>) -> Self {
        Self {
            limit_side_len: limit_side_len.unwrap_or(DEFAULT_LIMIT_SIDE_LEN),
            limit_type: limit_type.unwrap_or_default(),
        }
    }

    /// Computes the target `(height, width)` for an image of the given size.
    ///
    /// The scaled sides are truncated to whole pixels, then rounded to the
    /// nearest multiple of 32 with a floor of 32.
    pub fn target_size(&self, src_h: u32, src_w: u32) -> (u32, u32) {
        let (h, w) = (src_h as f32, src_w as f32);
        let limit = self.limit_side_len as f32;

        let ratio = match self.limit_type {
            LimitType::Max if h.max(w) > limit => limit / h.max(w),
            LimitType::Min if h.min(w) < limit => limit / h.min(w),
            _ => 1.0,
        };

        let snap = |side: f32| -> u32 {
            let scaled = (side * ratio).trunc();
            let multiple = DET_SIDE_MULTIPLE as f32;
            ((scaled / multiple).round() * multiple).max(multiple) as u32
        };

        (snap(h), snap(w))
    }

    /// Resizes a single image.
    ///
    /// Returns the resized image together with its scale information. An empty
    /// image is returned unchanged with unit ratios.
    pub fn resize(&self, img: &RgbImage) -> (RgbImage, ImageScaleInfo) {
        let (src_w, src_h) = img.dimensions();
        if src_w == 0 || src_h == 0 {
            return (img.clone(), ImageScaleInfo::new(src_h, src_w, 1.0, 1.0));
        }

        let (resize_h, resize_w) = self.target_size(src_h, src_w);
        trace!("detection resize {}x{} -> {}x{}", src_w, src_h, resize_w, resize_h);

        let resized = if resize_h == src_h && resize_w == src_w {
            img.clone()
        } else {
            // Triangle matches bilinear interpolation.
            imageops::resize(img, resize_w, resize_h, FilterType::Triangle)
        };

        let scale = ImageScaleInfo::new(
            src_h,
            src_w,
            resize_h as f32 / src_h as f32,
            resize_w as f32 / src_w as f32,
        );
        (resized, scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_limit_shrinks_long_side() {
        let resizer = DetResizeForTest::new(Some(960), Some(LimitType::Max));
        // 1920x1080 -> ratio 0.5 -> 540x960 -> 544x960
        assert_eq!(resizer.target_size(1080, 1920), (544, 960));
    }

    #[test]
    fn test_max_limit_keeps_small_images() {
        let resizer = DetResizeForTest::default();
        assert_eq!(resizer.target_size(100, 200), (96, 192));
        assert_eq!(resizer.target_size(10, 10), (32, 32));
    }

    #[test]
    fn test_min_limit_enlarges_short_side() {
        let resizer = DetResizeForTest::new(Some(64), Some(LimitType::Min));
        // ratio 2.0 -> 64x200 -> 64x192
        assert_eq!(resizer.target_size(32, 100), (64, 192));
        assert_eq!(resizer.target_size(128, 128), (128, 128));
    }

    #[test]
    fn test_resize_records_ratios() {
        let resizer = DetResizeForTest::default();
        let img = RgbImage::new(100, 50);
        let (resized, scale) = resizer.resize(&img);
        assert_eq!(resized.dimensions(), (96, 64));
        assert_eq!((scale.src_h, scale.src_w), (50, 100));
        assert!((scale.ratio_w - 0.96).abs() < 1e-6);
        assert!((scale.ratio_h - 1.28).abs() < 1e-6);
    }
}
