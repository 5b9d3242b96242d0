//! Image processing utilities for OCR systems.
//!
//! This module holds the CPU-side pre- and post-processing that surrounds the
//! three models: resizing and normalization on the way in, region extraction,
//! sequence decoding and orientation decoding on the way out, plus the
//! geometry shared by all of them.
//!
//! # Modules
//!
//! * `cls_postprocess` - Orientation label decoding
//! * `db_postprocess` - DB detection post-processing
//! * `decode` - Greedy CTC decoding of recognition outputs
//! * `geometry` - Geometric primitives and algorithms for OCR processing
//! * `normalization` - Image normalization into model tensors
//! * `resize_detection` - Resizing for detection models
//! * `resize_recognition` - Resizing for recognition and classification models
//! * `sorting` - Reading order of detected regions
//! * `types` - Type definitions used across the processors module

pub mod cls_postprocess;
pub mod db_postprocess;
pub mod decode;
pub mod geometry;
pub mod normalization;
pub mod resize_detection;
pub mod resize_recognition;
pub mod sorting;
pub mod types;

pub use cls_postprocess::ClsPostProcess;
pub use db_postprocess::DBPostProcess;
pub use decode::{BLANK_LABEL, CTCLabelDecode};
pub use geometry::*;
pub use normalization::NormalizeImage;
pub use resize_detection::DetResizeForTest;
pub use resize_recognition::OCRResize;
pub use sorting::reading_order;
pub use types::*;
