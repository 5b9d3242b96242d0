use image::{GrayImage, Luma};

use super::DBPostProcess;

impl DBPostProcess {
    /// Dilates a binary mask with a 2x2 rectangular kernel anchored at its
    /// bottom-right cell, so each pixel takes the maximum of itself and its
    /// left, upper and upper-left neighbours.
    pub(super) fn dilate_mask(&self, mask: &GrayImage) -> GrayImage {
        let (width, height) = mask.dimensions();
        GrayImage::from_fn(width, height, |x, y| {
            let mut value = mask.get_pixel(x, y).0[0];
            if x > 0 {
                value = value.max(mask.get_pixel(x - 1, y).0[0]);
            }
            if y > 0 {
                value = value.max(mask.get_pixel(x, y - 1).0[0]);
            }
            if x > 0 && y > 0 {
                value = value.max(mask.get_pixel(x - 1, y - 1).0[0]);
            }
            Luma([value])
        })
    }
}
