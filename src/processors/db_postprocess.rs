//! Post-processing for DB (Differentiable Binarization) text detection models.
//!
//! The [`DBPostProcess`] struct converts a text probability map into
//! quadrilaterals by thresholding, contour extraction, scoring and polygon
//! expansion. Supporting functionality (bitmap extraction, scoring, mask
//! morphology) is split across helper modules.

#[path = "db_bitmap.rs"]
mod db_bitmap;
#[path = "db_mask.rs"]
mod db_mask;
#[path = "db_score.rs"]
mod db_score;

use crate::core::Tensor4D;
use crate::core::constants::{
    DEFAULT_DB_BOX_THRESH, DEFAULT_DB_THRESH, DEFAULT_DB_UNCLIP_RATIO, DEFAULT_MAX_CANDIDATES,
    DEFAULT_MIN_BOX_SIDE,
};
use crate::processors::geometry::Quadrilateral;
use crate::processors::types::ImageScaleInfo;
use image::{GrayImage, Luma};
use ndarray::{ArrayView2, Axis};
use tracing::debug;

/// Post-processor for DB (Differentiable Binarization) text detection models.
#[derive(Debug, Clone)]
pub struct DBPostProcess {
    /// Threshold for binarizing the prediction map (default: 0.3).
    pub thresh: f32,
    /// Minimum mean probability inside a candidate rectangle (default: 0.6).
    pub box_thresh: f32,
    /// Maximum number of contours considered per map (default: 1000).
    pub max_candidates: usize,
    /// Ratio for unclipping (expanding) candidate rectangles (default: 1.5).
    pub unclip_ratio: f32,
    /// Minimum side length for candidate rectangles.
    pub min_size: f32,
    /// Whether to dilate the binary mask with a 2x2 kernel before contour detection.
    pub use_dilation: bool,
}

impl Default for DBPostProcess {
    fn default() -> Self {
        Self::new(None, None, None, None, None)
    }
}

impl DBPostProcess {
    /// Creates a new `DBPostProcess` instance with optional overrides.
    pub fn new(
        thresh: Option<f32>,
        box_thresh: Option<f32>,
        max_candidates: Option<usize>,
        unclip_ratio: Option<f32>,
        use_dilation: Option<bool>,
    ) -> Self {
        Self {
            thresh: thresh.unwrap_or(DEFAULT_DB_THRESH),
            box_thresh: box_thresh.unwrap_or(DEFAULT_DB_BOX_THRESH),
            max_candidates: max_candidates.unwrap_or(DEFAULT_MAX_CANDIDATES),
            unclip_ratio: unclip_ratio.unwrap_or(DEFAULT_DB_UNCLIP_RATIO),
            min_size: DEFAULT_MIN_BOX_SIDE,
            use_dilation: use_dilation.unwrap_or(false),
        }
    }

    /// Applies post-processing to a batch of prediction maps.
    ///
    /// `preds` has shape `[N, 1, H, W]`; `img_shapes[i]` describes the source image
    /// of batch item `i`. Maps without a matching shape entry are ignored.
    pub fn apply(&self, preds: &Tensor4D, img_shapes: &[ImageScaleInfo]) -> Vec<Vec<Quadrilateral>> {
        img_shapes
            .iter()
            .enumerate()
            .take(preds.shape()[0])
            .map(|(batch_idx, shape)| {
                let pred_slice = preds.index_axis(Axis(0), batch_idx);
                let pred_channel = pred_slice.index_axis(Axis(0), 0);
                self.process(pred_channel, shape.src_h, shape.src_w)
            })
            .collect()
    }

    /// Extracts quadrilaterals from one probability map.
    ///
    /// Corners are mapped from map resolution to a `src_w x src_h` image and
    /// clamped to `[0, src_w] x [0, src_h]`. The output follows contour discovery
    /// order (row-major scan of the map); use
    /// [`reading_order`](crate::processors::sorting::reading_order) for presentation.
    pub fn process(&self, pred: ArrayView2<f32>, src_h: u32, src_w: u32) -> Vec<Quadrilateral> {
        let (height, width) = pred.dim();
        if height == 0 || width == 0 {
            return Vec::new();
        }

        let mut bitmap = GrayImage::new(width as u32, height as u32);
        for ((y, x), &value) in pred.indexed_iter() {
            if value > self.thresh {
                bitmap.put_pixel(x as u32, y as u32, Luma([255]));
            }
        }

        let bitmap = if self.use_dilation {
            self.dilate_mask(&bitmap)
        } else {
            bitmap
        };

        let boxes = self.boxes_from_bitmap(&pred, &bitmap, src_w, src_h);
        debug!(candidates = boxes.len(), "extracted text regions");
        boxes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn map_with_blobs(height: usize, width: usize, blobs: &[(usize, usize, usize, usize, f32)]) -> Array2<f32> {
        let mut map = Array2::<f32>::zeros((height, width));
        for &(y0, y1, x0, x1, value) in blobs {
            for y in y0..y1 {
                for x in x0..x1 {
                    map[[y, x]] = value;
                }
            }
        }
        map
    }

    #[test]
    fn test_empty_map_yields_nothing() {
        let post = DBPostProcess::default();
        let map = Array2::<f32>::zeros((32, 32));
        assert!(post.process(map.view(), 32, 32).is_empty());
        let empty = Array2::<f32>::zeros((0, 0));
        assert!(post.process(empty.view(), 10, 10).is_empty());
    }

    #[test]
    fn test_single_blob_yields_one_quad_of_expected_area() {
        let post = DBPostProcess::default();
        // Rows 10..20 and columns 20..70 of a 40x100 map; source image is twice as large.
        let map = map_with_blobs(40, 100, &[(10, 20, 20, 70, 1.0)]);
        let quads = post.process(map.view(), 80, 200);
        assert_eq!(quads.len(), 1);

        // Contour runs through pixel centres, so the tight rectangle is 49 x 9.
        let (w, h) = (49.0f32, 9.0f32);
        let distance = w * h * post.unclip_ratio / (2.0 * (w + h));
        let min_area = w * h * 4.0;
        let max_area = (w + 2.0 * distance + 2.0) * (h + 2.0 * distance + 2.0) * 4.0;
        let area = quads[0].area();
        assert!(area >= min_area && area <= max_area, "area {area} not in [{min_area}, {max_area}]");

        for p in quads[0].points {
            assert!(p.x >= 0.0 && p.x <= 200.0);
            assert!(p.y >= 0.0 && p.y <= 80.0);
        }
    }

    #[test]
    fn test_low_score_region_is_rejected() {
        let post = DBPostProcess::default();
        let map = map_with_blobs(40, 100, &[(10, 20, 20, 70, 0.5)]);
        assert!(post.process(map.view(), 40, 100).is_empty());
    }

    #[test]
    fn test_thin_region_is_rejected() {
        let post = DBPostProcess::default();
        let map = map_with_blobs(40, 100, &[(10, 12, 20, 70, 1.0)]);
        assert!(post.process(map.view(), 40, 100).is_empty());
    }

    #[test]
    fn test_hole_does_not_produce_extra_region() {
        let post = DBPostProcess::default();
        let mut map = map_with_blobs(60, 100, &[(10, 40, 10, 80, 1.0)]);
        for y in 20..30 {
            for x in 30..60 {
                map[[y, x]] = 0.0;
            }
        }
        // The mean score stays above the box threshold despite the hole.
        assert_eq!(post.process(map.view(), 60, 100).len(), 1);
    }

    #[test]
    fn test_max_candidates_caps_output() {
        let post = DBPostProcess::new(None, None, Some(2), None, None);
        let map = map_with_blobs(
            60,
            100,
            &[(5, 15, 5, 40, 1.0), (25, 35, 5, 40, 1.0), (45, 55, 5, 40, 1.0)],
        );
        assert_eq!(post.process(map.view(), 60, 100).len(), 2);
        assert_eq!(DBPostProcess::default().process(map.view(), 60, 100).len(), 3);
    }

    #[test]
    fn test_dilation_merges_adjacent_blobs() {
        let map = map_with_blobs(40, 100, &[(10, 20, 10, 40, 1.0), (10, 20, 41, 70, 1.0)]);
        let plain = DBPostProcess::default();
        assert_eq!(plain.process(map.view(), 40, 100).len(), 2);

        let dilated = DBPostProcess::new(None, Some(0.5), None, None, Some(true));
        assert_eq!(dilated.process(map.view(), 40, 100).len(), 1);
    }

    #[test]
    fn test_apply_batches_by_shape() {
        let post = DBPostProcess::default();
        let mut preds = Tensor4D::zeros((2, 1, 40, 100));
        for y in 10..20 {
            for x in 20..70 {
                preds[[1, 0, y, x]] = 1.0;
            }
        }
        let shapes = vec![
            ImageScaleInfo::new(40, 100, 1.0, 1.0),
            ImageScaleInfo::new(40, 100, 1.0, 1.0),
        ];
        let result = post.apply(&preds, &shapes);
        assert_eq!(result.len(), 2);
        assert!(result[0].is_empty());
        assert_eq!(result[1].len(), 1);
    }
}
