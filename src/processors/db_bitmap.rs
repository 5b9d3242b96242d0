use crate::processors::geometry::{BoundingBox, Point, Quadrilateral};
use clipper2::{EndType, JoinType, Path as ClipperPath};
use image::GrayImage;
use imageproc::contours::{BorderType, find_contours};
use ndarray::ArrayView2;

use super::DBPostProcess;

impl DBPostProcess {
    pub(super) fn boxes_from_bitmap(
        &self,
        pred: &ArrayView2<f32>,
        bitmap: &GrayImage,
        dest_width: u32,
        dest_height: u32,
    ) -> Vec<Quadrilateral> {
        let (width, height) = bitmap.dimensions();
        let width_scale = dest_width as f32 / width as f32;
        let height_scale = dest_height as f32 / height as f32;

        let contours = find_contours::<u32>(bitmap);
        let mut boxes = Vec::new();

        for contour in contours
            .iter()
            .filter(|c| c.border_type == BorderType::Outer)
            .take(self.max_candidates)
        {
            if contour.points.len() < 4 {
                continue;
            }

            let min_rect = BoundingBox::from_contour(contour).get_min_area_rect();
            let (corners, sside) = min_rect.mini_box();
            if sside < self.min_size {
                continue;
            }

            let score = self.box_score_fast(pred, &corners);
            if score < self.box_thresh {
                continue;
            }

            let Some(expanded) = unclip(&corners, self.unclip_ratio) else {
                continue;
            };

            let truncated: Vec<Point> = expanded
                .iter()
                .map(|p| Point::new(p.x.trunc(), p.y.trunc()))
                .collect();
            let (final_corners, final_sside) =
                BoundingBox::new(truncated).get_min_area_rect().mini_box();
            if final_sside < self.min_size + 2.0 {
                continue;
            }

            boxes.push(Quadrilateral::new(final_corners.map(|point| {
                Point::new(
                    (point.x * width_scale).max(0.0).min(dest_width as f32),
                    (point.y * height_scale).max(0.0).min(dest_height as f32),
                )
            })));
        }

        boxes
    }
}

/// Grows a polygon outward by `area * unclip_ratio / perimeter` with round joins.
///
/// Returns `None` for a degenerate polygon or when the offset does not give
/// exactly one polygon.
pub(super) fn unclip(points: &[Point], unclip_ratio: f32) -> Option<Vec<Point>> {
    if points.len() < 3 {
        return None;
    }
    let path: ClipperPath = points
        .iter()
        .map(|p| (p.x as f64, p.y as f64))
        .collect::<Vec<_>>()
        .into();

    let area = path.signed_area().abs();
    let perimeter: f64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.distance(b) as f64)
        .sum();
    if area <= f64::EPSILON || perimeter <= f64::EPSILON {
        return None;
    }

    let delta = area * unclip_ratio as f64 / perimeter;
    let offset = path.inflate(delta, JoinType::Round, EndType::Polygon, 2.0);
    if offset.len() != 1 {
        return None;
    }

    let ring = offset.into_iter().next()?;
    let mut expanded: Vec<Point> = ring
        .iter()
        .map(|pt| Point::new(pt.x() as f32, pt.y() as f32))
        .collect();
    if expanded.len() > 1 && expanded.first() == expanded.last() {
        expanded.pop();
    }
    (expanded.len() >= 3).then_some(expanded)
}
