//! Types used in image processing operations
//!
//! This module defines the resize limit options and the scale bookkeeping that
//! lets detection results be mapped back onto the source image.

use serde::{Deserialize, Serialize};

/// Specifies how to limit the size of an image during detection resizing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LimitType {
    /// Enlarge the image when its shorter side is below the limit
    Min,
    /// Shrink the image when its longer side exceeds the limit
    #[default]
    Max,
}

/// Specifies the channel order of a normalized tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorOrder {
    /// Red, green, blue planes
    RGB,
    /// Blue, green, red planes
    BGR,
}

/// Original dimensions of an image and the ratios it was resized by.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageScaleInfo {
    /// Source image height in pixels
    pub src_h: u32,
    /// Source image width in pixels
    pub src_w: u32,
    /// Resized height divided by source height
    pub ratio_h: f32,
    /// Resized width divided by source width
    pub ratio_w: f32,
}

impl ImageScaleInfo {
    pub fn new(src_h: u32, src_w: u32, ratio_h: f32, ratio_w: f32) -> Self {
        Self {
            src_h,
            src_w,
            ratio_h,
            ratio_w,
        }
    }
}
