//! Configuration management for the OCR pipeline.
//!
//! This module provides the validation trait shared by the pipeline configuration
//! and the ONNX Runtime session options.

pub mod errors;
pub mod onnx;

pub use errors::{ConfigError, ConfigValidator};
pub use onnx::{OrtExecutionProvider, OrtGraphOptimizationLevel, OrtSessionConfig};
