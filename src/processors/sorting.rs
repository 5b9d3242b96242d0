//! Reading-order sorting of detected text regions.

use crate::core::constants::READING_ORDER_Y_TOLERANCE;
use crate::processors::geometry::Quadrilateral;

/// Sorts quadrilaterals top to bottom, then left to right within a line.
///
/// Boxes are first sorted by the `(y, x)` of their first corner, which gives a
/// deterministic order regardless of how the detector enumerated the regions.
/// A single adjacent-swap sweep then moves a box left past its predecessors while
/// both first corners lie within [`READING_ORDER_Y_TOLERANCE`] pixels vertically
/// and the box starts further left. Only locally misordered neighbours are fixed;
/// this is not a full re-sort by line.
pub fn reading_order(boxes: &[Quadrilateral]) -> Vec<Quadrilateral> {
    let mut sorted = boxes.to_vec();
    sorted.sort_by(|a, b| {
        let (a0, b0) = (a.points[0], b.points[0]);
        a0.y.total_cmp(&b0.y).then(a0.x.total_cmp(&b0.x))
    });

    for i in 0..sorted.len() {
        for j in (1..=i).rev() {
            let curr = sorted[j].points[0];
            let prev = sorted[j - 1].points[0];
            if (curr.y - prev.y).abs() < READING_ORDER_Y_TOLERANCE && curr.x < prev.x {
                sorted.swap(j, j - 1);
            } else {
                break;
            }
        }
    }

    sorted
}
