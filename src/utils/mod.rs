//! Utility functions for the OCR pipeline.
//!
//! Image ingestion, dictionary loading and the perspective rectification that
//! cuts text regions out of a source image.

pub mod dict;
pub mod image;
pub mod transform;

pub use dict::read_character_dict;
pub use image::{dynamic_to_rgb, image_from_buffer, load_image, load_images};
pub use transform::{TextCrop, rectify};
