use super::DBPostProcess;
use crate::processors::geometry::Point;
use image::{GrayImage, Luma};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point as ImageProcPoint;
use ndarray::ArrayView2;

impl DBPostProcess {
    /// Mean probability inside a quadrilateral.
    ///
    /// The quadrilateral is rasterized (boundary included) into a mask over its
    /// bounding region, with corners truncated to whole pixels relative to the
    /// region origin. Returns 0 when the region collapses to a line or a point.
    pub fn box_score_fast(&self, pred: &ArrayView2<f32>, corners: &[Point; 4]) -> f32 {
        let (height, width) = pred.dim();
        if height == 0 || width == 0 {
            return 0.0;
        }

        let (min_x, max_x) = corners
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), p| (lo.min(p.x), hi.max(p.x)));
        let (min_y, max_y) = corners
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), p| (lo.min(p.y), hi.max(p.y)));

        let xmin = (min_x.floor() as i64).max(0);
        let xmax = (max_x.ceil() as i64).min(width as i64 - 1);
        let ymin = (min_y.floor() as i64).max(0);
        let ymax = (max_y.ceil() as i64).min(height as i64 - 1);

        if xmax <= xmin || ymax <= ymin {
            return 0.0;
        }

        let mask_w = (xmax - xmin + 1) as u32;
        let mask_h = (ymax - ymin + 1) as u32;
        let mut mask = GrayImage::new(mask_w, mask_h);

        let mut poly: Vec<ImageProcPoint<i32>> = corners
            .iter()
            .map(|p| ImageProcPoint::new((p.x - xmin as f32) as i32, (p.y - ymin as f32) as i32))
            .collect();
        poly.dedup();
        if poly.len() > 1 && poly.first() == poly.last() {
            poly.pop();
        }

        match poly.as_slice() {
            [] => return 0.0,
            [single] => {
                if single.x >= 0
                    && single.y >= 0
                    && (single.x as u32) < mask_w
                    && (single.y as u32) < mask_h
                {
                    mask.put_pixel(single.x as u32, single.y as u32, Luma([1]));
                }
            }
            _ => draw_polygon_mut(&mut mask, &poly, Luma([1])),
        }

        let mut sum = 0.0f64;
        let mut count = 0usize;
        for (x, y, m) in mask.enumerate_pixels() {
            if m.0[0] > 0 {
                sum += pred[[ymin as usize + y as usize, xmin as usize + x as usize]] as f64;
                count += 1;
            }
        }

        if count > 0 {
            (sum / count as f64) as f32
        } else {
            0.0
        }
    }
}
