//! # ONNX OCR
//!
//! A Rust OCR library that extracts text lines from images using PaddleOCR-style
//! ONNX models.
//!
//! ## Features
//!
//! - DB text detection with polygon expansion and box scoring
//! - Optional 0/180 degree text line orientation correction
//! - CRNN recognition with greedy CTC decoding
//! - Aspect-ratio batching so crops in a batch share a padded width
//! - ONNX Runtime inference on CPU, or CUDA with the `cuda` feature
//!
//! ## Modules
//!
//! * [`core`] - Error handling, configuration, batching and inference engines
//! * [`pipeline`] - The [`OAROCR`](pipeline::OAROCR) pipeline and its results
//! * [`predictor`] - The detection, classification and recognition stages
//! * [`processors`] - Geometry, resizing, normalization and decoding
//! * [`utils`] - Image loading, dictionaries and crop rectification
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use onnx_ocr::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let ocr = OAROCRBuilder::new(
//!     "models/det.onnx",
//!     "models/rec.onnx",
//!     "models/ppocr_keys_v1.txt",
//! )
//! .with_angle_cls("models/cls.onnx")
//! .build()?;
//!
//! let image = load_image("document.jpg")?;
//! for line in ocr.process(&image)? {
//!     println!("{} ({:.2})", line.text, line.score);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### JSON Configuration
//!
//! ```rust,no_run
//! use onnx_ocr::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config: OCRConfig = serde_json::from_str(r#"
//! {
//!   "det_model_path": "models/det.onnx",
//!   "rec_model_path": "models/rec.onnx",
//!   "rec_char_dict_path": "models/ppocr_keys_v1.txt",
//!   "det_db_box_thresh": 0.5,
//!   "drop_score": 0.6
//! }
//! "#)?;
//!
//! let ocr = OAROCR::new(config)?;
//! # Ok(())
//! # }
//! ```

// Core modules
pub mod core;
pub mod pipeline;
pub mod predictor;
pub mod processors;
pub mod utils;

/// Prelude module for convenient imports.
///
/// ```rust
/// use onnx_ocr::prelude::*;
/// ```
///
/// Brings in the pipeline, its configuration and results, the error types and
/// image loading. Stage-level pieces live in [`predictor`](crate::predictor)
/// and [`processors`](crate::processors).
pub mod prelude {
    // Pipeline
    pub use crate::pipeline::{
        OAROCR, OAROCRBuilder, OCRConfig, OCRLine, OrientationResult, RecognitionResult,
    };
    pub use crate::processors::{LimitType, Point, Quadrilateral};

    // Error Handling
    pub use crate::core::{OCRError, OcrResult, init_tracing};

    // Image Utility
    pub use crate::utils::{image_from_buffer, load_image, load_images};
}
