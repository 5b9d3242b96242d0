//! Geometric utilities for OCR processing.
//!
//! This module provides the geometric primitives used by text detection and
//! cropping: points, quadrilaterals, polygons built from contours, convex hulls
//! and minimum area rectangles.

use imageproc::contours::Contour;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// A 2D point with floating-point coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X-coordinate of the point.
    pub x: f32,
    /// Y-coordinate of the point.
    pub y: f32,
}

impl Point {
    /// Creates a new point with the given coordinates.
    ///
    /// # Arguments
    ///
    /// * `x` - The x-coordinate of the point.
    /// * `y` - The y-coordinate of the point.
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[inline]
    pub fn distance(&self, other: &Point) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Four ordered corners of a text region in source image pixels.
///
/// After [`order_clockwise`] the corners are top-left, top-right, bottom-right,
/// bottom-left. The shape may be rotated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quadrilateral {
    /// The corner points.
    pub points: [Point; 4],
}

impl Quadrilateral {
    /// Creates a quadrilateral from its corners, keeping the given order.
    pub fn new(points: [Point; 4]) -> Self {
        Self { points }
    }

    /// Creates an axis-aligned quadrilateral from two opposite corners.
    pub fn from_coords(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self::new([
            Point::new(x1, y1),
            Point::new(x2, y1),
            Point::new(x2, y2),
            Point::new(x1, y2),
        ])
    }

    /// Length of the top edge, `|p0 - p1|`.
    pub fn top_edge(&self) -> f32 {
        self.points[0].distance(&self.points[1])
    }

    /// Length of the left edge, `|p0 - p3|`.
    pub fn left_edge(&self) -> f32 {
        self.points[0].distance(&self.points[3])
    }

    /// Area computed with the shoelace formula.
    pub fn area(&self) -> f32 {
        BoundingBox::new(self.points.to_vec()).area()
    }
}

/// Orders four points as top-left, top-right, bottom-right, bottom-left.
///
/// The point with the smallest `x + y` becomes the first corner and the one with
/// the largest `x + y` the third. Of the remaining two, the one with the smaller
/// `y - x` becomes the second corner. Ties fall back to the other key, so the
/// result depends only on the set of points and applying the function to its own
/// output returns the same order.
pub fn order_clockwise(points: [Point; 4]) -> Quadrilateral {
    let key = |p: &Point| (p.x + p.y, p.y - p.x);
    let cmp_sum = |a: &Point, b: &Point| {
        let (sa, da) = key(a);
        let (sb, db) = key(b);
        sa.total_cmp(&sb).then(da.total_cmp(&db))
    };
    let cmp_diff = |a: &Point, b: &Point| {
        let (sa, da) = key(a);
        let (sb, db) = key(b);
        da.total_cmp(&db).then(sa.total_cmp(&sb))
    };

    let min_idx = (1..4).fold(0, |best, i| {
        if cmp_sum(&points[i], &points[best]).is_lt() {
            i
        } else {
            best
        }
    });
    let max_idx = (0..4)
        .filter(|&i| i != min_idx)
        .reduce(|best, i| {
            if cmp_sum(&points[i], &points[best]).is_gt() {
                i
            } else {
                best
            }
        })
        .unwrap_or((min_idx + 2) % 4);

    let remaining: Vec<usize> = (0..4).filter(|&i| i != min_idx && i != max_idx).collect();
    let (second, fourth) = if cmp_diff(&points[remaining[0]], &points[remaining[1]]).is_le() {
        (remaining[0], remaining[1])
    } else {
        (remaining[1], remaining[0])
    };

    Quadrilateral::new([
        points[min_idx],
        points[second],
        points[max_idx],
        points[fourth],
    ])
}

/// Clamps every corner to `[0, width - 1] x [0, height - 1]`.
pub fn clip_to_bounds(quad: &Quadrilateral, height: u32, width: u32) -> Quadrilateral {
    let max_x = width.saturating_sub(1) as f32;
    let max_y = height.saturating_sub(1) as f32;
    Quadrilateral::new(
        quad.points
            .map(|p| Point::new(p.x.min(max_x).max(0.0), p.y.min(max_y).max(0.0))),
    )
}

/// A polygon represented by a collection of points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundingBox {
    /// The points that define the polygon.
    pub points: Vec<Point>,
}

impl BoundingBox {
    /// Creates a new bounding box from a vector of points.
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Creates a bounding box from a contour.
    ///
    /// # Arguments
    ///
    /// * `contour` - A reference to a contour from imageproc.
    ///
    /// # Returns
    ///
    /// A new `BoundingBox` instance with points converted from the contour.
    pub fn from_contour(contour: &Contour<u32>) -> Self {
        let points = contour
            .points
            .iter()
            .map(|p| Point::new(p.x as f32, p.y as f32))
            .collect();
        Self { points }
    }

    /// Calculates the area of the bounding box using the shoelace formula.
    ///
    /// # Returns
    ///
    /// The area of the bounding box. Returns 0.0 if the bounding box has fewer than 3 points.
    pub fn area(&self) -> f32 {
        if self.points.len() < 3 {
            return 0.0;
        }

        let mut area = 0.0;
        let n = self.points.len();
        for i in 0..n {
            let j = (i + 1) % n;
            area += self.points[i].x * self.points[j].y;
            area -= self.points[j].x * self.points[i].y;
        }
        area.abs() / 2.0
    }

    /// Calculates the perimeter of the closed polygon.
    pub fn perimeter(&self) -> f32 {
        let n = self.points.len();
        (0..n)
            .map(|i| self.points[i].distance(&self.points[(i + 1) % n]))
            .sum()
    }

    /// Computes the convex hull with Andrew's monotone chain, counter-clockwise
    /// in image coordinates.
    fn convex_hull(&self) -> Vec<Point> {
        let mut points = self.points.clone();
        points.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
        points.dedup();
        if points.len() < 3 {
            return points;
        }

        let mut lower: Vec<Point> = Vec::with_capacity(points.len());
        for p in &points {
            while lower.len() >= 2
                && Self::cross_product(&lower[lower.len() - 2], &lower[lower.len() - 1], p) <= 0.0
            {
                lower.pop();
            }
            lower.push(*p);
        }

        let mut upper: Vec<Point> = Vec::with_capacity(points.len());
        for p in points.iter().rev() {
            while upper.len() >= 2
                && Self::cross_product(&upper[upper.len() - 2], &upper[upper.len() - 1], p) <= 0.0
            {
                upper.pop();
            }
            upper.push(*p);
        }

        lower.pop();
        upper.pop();
        lower.extend(upper);
        lower
    }

    /// Computes the cross product of three points.
    ///
    /// A positive value indicates a counter-clockwise turn, a negative value a
    /// clockwise turn, and zero collinearity.
    fn cross_product(p1: &Point, p2: &Point, p3: &Point) -> f32 {
        (p2.x - p1.x) * (p3.y - p1.y) - (p2.y - p1.y) * (p3.x - p1.x)
    }

    /// Computes the minimum area rectangle that encloses the polygon.
    ///
    /// This method uses the rotating calipers algorithm on the convex hull of the
    /// polygon. Collinear input falls back to the axis-aligned extent, which has a
    /// zero side.
    pub fn get_min_area_rect(&self) -> MinAreaRect {
        let hull = self.convex_hull();

        if hull.len() < 3 {
            let (min_x, max_x) = self
                .points
                .iter()
                .map(|p| p.x)
                .minmax()
                .into_option()
                .unwrap_or((0.0, 0.0));
            let (min_y, max_y) = self
                .points
                .iter()
                .map(|p| p.y)
                .minmax()
                .into_option()
                .unwrap_or((0.0, 0.0));

            return MinAreaRect {
                center: Point::new((min_x + max_x) / 2.0, (min_y + max_y) / 2.0),
                width: max_x - min_x,
                height: max_y - min_y,
                angle: 0.0,
            };
        }

        let mut min_area = f32::MAX;
        let mut min_rect = MinAreaRect {
            center: Point::new(0.0, 0.0),
            width: 0.0,
            height: 0.0,
            angle: 0.0,
        };

        let n = hull.len();
        for i in 0..n {
            let j = (i + 1) % n;

            let edge_x = hull[j].x - hull[i].x;
            let edge_y = hull[j].y - hull[i].y;
            let edge_length = (edge_x * edge_x + edge_y * edge_y).sqrt();
            if edge_length < f32::EPSILON {
                continue;
            }

            let nx = edge_x / edge_length;
            let ny = edge_y / edge_length;
            let px = -ny;
            let py = nx;

            let mut min_n = f32::MAX;
            let mut max_n = f32::MIN;
            let mut min_p = f32::MAX;
            let mut max_p = f32::MIN;

            for point in &hull {
                let proj_n = nx * (point.x - hull[i].x) + ny * (point.y - hull[i].y);
                min_n = min_n.min(proj_n);
                max_n = max_n.max(proj_n);

                let proj_p = px * (point.x - hull[i].x) + py * (point.y - hull[i].y);
                min_p = min_p.min(proj_p);
                max_p = max_p.max(proj_p);
            }

            let width = max_n - min_n;
            let height = max_p - min_p;
            let area = width * height;

            if area < min_area {
                min_area = area;

                let center_n = (min_n + max_n) / 2.0;
                let center_p = (min_p + max_p) / 2.0;

                min_rect = MinAreaRect {
                    center: Point::new(
                        hull[i].x + center_n * nx + center_p * px,
                        hull[i].y + center_n * ny + center_p * py,
                    ),
                    width,
                    height,
                    angle: f32::atan2(ny, nx).to_degrees(),
                };
            }
        }

        min_rect
    }
}

/// A rectangle with minimum area that encloses a shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinAreaRect {
    /// The center point of the rectangle.
    pub center: Point,
    /// The extent along the rectangle's direction.
    pub width: f32,
    /// The extent perpendicular to the rectangle's direction.
    pub height: f32,
    /// The direction of the width side in degrees.
    pub angle: f32,
}

impl MinAreaRect {
    /// Returns the length of the shorter side.
    pub fn min_side(&self) -> f32 {
        self.width.min(self.height)
    }

    /// Gets the four corner points of the rectangle in no particular order.
    pub fn get_box_points(&self) -> [Point; 4] {
        let (sin_a, cos_a) = self.angle.to_radians().sin_cos();
        let w_2 = self.width / 2.0;
        let h_2 = self.height / 2.0;

        [(-w_2, -h_2), (w_2, -h_2), (w_2, h_2), (-w_2, h_2)].map(|(dx, dy)| {
            Point::new(
                self.center.x + dx * cos_a - dy * sin_a,
                self.center.y + dx * sin_a + dy * cos_a,
            )
        })
    }

    /// Returns the corners ordered for detection output together with the shorter side.
    ///
    /// Corners are sorted by x. Of the two leftmost, the upper one comes first and
    /// the lower one last; of the two rightmost, the upper one is second and the
    /// lower one third.
    pub fn mini_box(&self) -> ([Point; 4], f32) {
        let mut pts = self.get_box_points();
        pts.sort_by(|a, b| a.x.total_cmp(&b.x));

        let (first, fourth) = if pts[1].y > pts[0].y { (0, 1) } else { (1, 0) };
        let (second, third) = if pts[3].y > pts[2].y { (2, 3) } else { (3, 2) };

        (
            [pts[first], pts[second], pts[third], pts[fourth]],
            self.min_side(),
        )
    }
}
