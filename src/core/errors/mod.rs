//! Error types for the OCR pipeline.
//!
//! Every fallible operation in the crate returns [`OcrResult`]. Errors carry enough
//! context (stage, model name, batch index, tensor shapes) to be reported directly
//! to the caller.
//!
//! # Usage
//!
//! ```rust
//! use onnx_ocr::core::errors::OCRError;
//!
//! let error = OCRError::tensor_operation(
//!     "Failed to reshape tensor for batch processing",
//!     std::io::Error::new(std::io::ErrorKind::InvalidData, "Invalid tensor shape"),
//! );
//! assert!(error.to_string().contains("tensor operation"));
//!
//! let config_error = OCRError::config_error("Missing required model path");
//! assert!(config_error.to_string().starts_with("configuration"));
//! ```

pub mod constructors;
pub mod types;

pub use constructors::ModelInferenceErrorBuilder;
pub use types::{OCRError, OpaqueError, ProcessingStage};

/// Convenient result alias for OCR operations.
pub type OcrResult<T> = Result<T, OCRError>;
