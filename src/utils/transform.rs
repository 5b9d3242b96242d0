//! Image transformation utilities for OCR processing.
//!
//! This module rectifies a quadrilateral text region into an upright crop with a
//! perspective warp, bicubic sampling and edge replication outside the source.

use crate::core::constants::VERTICAL_CROP_RATIO;
use crate::processors::geometry::{Point, Quadrilateral};
use image::{Rgb, RgbImage, imageops};
use nalgebra::{Matrix3, Vector3};
use rayon::prelude::*;
use tracing::{debug, trace};

/// Cubic convolution coefficient, the same kernel OpenCV uses for `INTER_CUBIC`.
const CUBIC_A: f64 = -0.75;

/// An upright crop cut out of the source image.
#[derive(Debug, Clone)]
pub struct TextCrop {
    /// Index of the region the crop was cut from.
    pub index: usize,
    /// The crop pixels, owned by the crop.
    pub image: RgbImage,
}

/// Rectifies a quadrilateral region of `src_image` into an upright crop.
///
/// The crop width is the longer of the top and bottom edges and its height the
/// longer of the left and right edges, truncated to whole pixels and at least one
/// pixel each. The corners are mapped onto `[0, w) x [0, h)` with a perspective
/// transform. Crops at least [`VERTICAL_CROP_RATIO`] times taller than wide are
/// rotated 90 degrees counter-clockwise.
///
/// A degenerate box (collinear or coincident corners) has no perspective
/// transform; it yields a crop filled with the pixel under the first corner.
/// An empty source image yields an empty crop.
pub fn rectify(src_image: &RgbImage, quad: &Quadrilateral) -> RgbImage {
    if src_image.width() == 0 || src_image.height() == 0 {
        return RgbImage::new(0, 0);
    }

    let p = &quad.points;
    let crop_width = (p[0].distance(&p[1]).max(p[2].distance(&p[3])) as u32).max(1);
    let crop_height = (p[0].distance(&p[3]).max(p[1].distance(&p[2])) as u32).max(1);

    let pts_std = [
        Point::new(0.0, 0.0),
        Point::new(crop_width as f32, 0.0),
        Point::new(crop_width as f32, crop_height as f32),
        Point::new(0.0, crop_height as f32),
    ];

    let transform = if quad.area() > f32::EPSILON {
        get_perspective_transform(p, &pts_std).and_then(|m| m.try_inverse())
    } else {
        None
    };

    let dst_img = match transform {
        Some(inverse) => warp_perspective(src_image, &inverse, crop_width, crop_height),
        None => {
            trace!("degenerate region {:?}, filling crop", quad);
            let x = clamp_coord(p[0].x.floor() as i64, src_image.width());
            let y = clamp_coord(p[0].y.floor() as i64, src_image.height());
            RgbImage::from_pixel(crop_width, crop_height, *src_image.get_pixel(x, y))
        }
    };

    if dst_img.height() as f32 / dst_img.width() as f32 >= VERTICAL_CROP_RATIO {
        debug!(
            "Rotating crop due to aspect ratio: {}x{}",
            dst_img.width(),
            dst_img.height()
        );
        imageops::rotate270(&dst_img)
    } else {
        dst_img
    }
}

/// Calculates the perspective transformation matrix that maps source points to destination points.
///
/// Solves the 8x8 linear system for the eight free parameters of the homography.
/// Returns `None` when the system is singular.
fn get_perspective_transform(src_points: &[Point; 4], dst_points: &[Point; 4]) -> Option<Matrix3<f64>> {
    let mut a = nalgebra::DMatrix::<f64>::zeros(8, 8);
    let mut b = nalgebra::DVector::<f64>::zeros(8);

    for i in 0..4 {
        let (sx, sy) = (src_points[i].x as f64, src_points[i].y as f64);
        let (dx, dy) = (dst_points[i].x as f64, dst_points[i].y as f64);

        a.set_row(
            i * 2,
            &nalgebra::RowDVector::from_row_slice(&[sx, sy, 1.0, 0.0, 0.0, 0.0, -sx * dx, -sy * dx]),
        );
        b[i * 2] = dx;

        a.set_row(
            i * 2 + 1,
            &nalgebra::RowDVector::from_row_slice(&[0.0, 0.0, 0.0, sx, sy, 1.0, -sx * dy, -sy * dy]),
        );
        b[i * 2 + 1] = dy;
    }

    let solution = a.lu().solve(&b)?;
    if solution.iter().any(|v| !v.is_finite()) {
        return None;
    }

    Some(Matrix3::new(
        solution[0],
        solution[1],
        solution[2],
        solution[3],
        solution[4],
        solution[5],
        solution[6],
        solution[7],
        1.0,
    ))
}

/// Warps `src_image` into a `dst_width x dst_height` image.
///
/// `inverse` maps destination pixels back into the source. Rows are processed in
/// parallel with rayon.
fn warp_perspective(
    src_image: &RgbImage,
    inverse: &Matrix3<f64>,
    dst_width: u32,
    dst_height: u32,
) -> RgbImage {
    let mut dst_image = RgbImage::new(dst_width, dst_height);
    let buffer: &mut [u8] = dst_image.as_mut();

    buffer
        .par_chunks_mut((dst_width * 3) as usize)
        .enumerate()
        .for_each(|(dst_y, row_buffer)| {
            for dst_x in 0..dst_width {
                let src_point = inverse * Vector3::new(dst_x as f64, dst_y as f64, 1.0);

                let pixel = if src_point.z.abs() > f64::EPSILON {
                    bicubic_interpolate(
                        src_image,
                        src_point.x / src_point.z,
                        src_point.y / src_point.z,
                    )
                } else {
                    Rgb([0, 0, 0])
                };

                let index = (dst_x * 3) as usize;
                row_buffer[index..index + 3].copy_from_slice(&pixel.0);
            }
        });

    dst_image
}

fn clamp_coord(v: i64, len: u32) -> u32 {
    v.clamp(0, len as i64 - 1) as u32
}

fn cubic_weights(t: f64) -> [f64; 4] {
    let a = CUBIC_A;
    let w0 = ((a * (t + 1.0) - 5.0 * a) * (t + 1.0) + 8.0 * a) * (t + 1.0) - 4.0 * a;
    let w1 = ((a + 2.0) * t - (a + 3.0)) * t * t + 1.0;
    let w2 = ((a + 2.0) * (1.0 - t) - (a + 3.0)) * (1.0 - t) * (1.0 - t) + 1.0;
    [w0, w1, w2, 1.0 - w0 - w1 - w2]
}

/// Samples the 4x4 neighbourhood around `(x, y)` with cubic convolution.
///
/// Neighbours outside the image take the value of the nearest edge pixel.
fn bicubic_interpolate(image: &RgbImage, x: f64, y: f64) -> Rgb<u8> {
    if !x.is_finite() || !y.is_finite() {
        return Rgb([0, 0, 0]);
    }
    let (width, height) = image.dimensions();
    let x0 = x.floor();
    let y0 = y.floor();
    let wx = cubic_weights(x - x0);
    let wy = cubic_weights(y - y0);
    let (x0, y0) = (x0 as i64, y0 as i64);

    let mut acc = [0.0f64; 3];
    for (j, weight_y) in wy.iter().enumerate() {
        let sy = clamp_coord(y0 - 1 + j as i64, height);
        for (i, weight_x) in wx.iter().enumerate() {
            let sx = clamp_coord(x0 - 1 + i as i64, width);
            let px = image.get_pixel(sx, sy);
            let w = weight_x * weight_y;
            for (c, value) in acc.iter_mut().enumerate() {
                *value += w * px.0[c] as f64;
            }
        }
    }

    Rgb(acc.map(|v| v.round().clamp(0.0, 255.0) as u8))
}
