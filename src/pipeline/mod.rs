//! The OCR pipeline module.
//!
//! This module ties the detection, orientation classification and recognition
//! predictors into one pipeline that turns an image into lines of text.

mod config;
pub mod oarocr;
mod result;

pub use config::OCRConfig;
pub use oarocr::{OAROCR, OAROCRBuilder, PipelineState};
pub use result::{OCRLine, OrientationResult, RecognitionResult};
