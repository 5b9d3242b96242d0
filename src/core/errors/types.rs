//! Error types for the OCR pipeline.
//!
//! This module defines the errors that can occur while loading images, preparing
//! tensors, running the ONNX Runtime sessions and decoding their outputs.

use thiserror::Error;

/// Enum representing different stages of processing in the OCR pipeline.
///
/// This enum is used to identify which stage of the OCR pipeline an error occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    /// Error occurred during tensor operations.
    TensorOperation,
    /// Error occurred while manipulating pixels (cropping, warping, rotating).
    ImageProcessing,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStage::TensorOperation => write!(f, "tensor operation"),
            ProcessingStage::ImageProcessing => write!(f, "image processing"),
        }
    }
}

/// A plain message used as the source of errors that have no underlying cause.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct OpaqueError(pub String);

/// Enum representing various errors that can occur in the OCR pipeline.
#[derive(Error, Debug)]
pub enum OCRError {
    /// Error occurred while loading an image.
    #[error("image load")]
    ImageLoad(#[source] image::ImageError),

    /// Error occurred during processing.
    #[error("{kind} failed: {context}")]
    Processing {
        /// The stage of processing where the error occurred.
        kind: ProcessingStage,
        /// Additional context about the error.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error occurred during inference.
    #[error("inference failed in model '{model_name}': {context}")]
    Inference {
        /// Name of the model that failed.
        model_name: String,
        /// Additional context about the failure.
        context: String,
        /// The underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error occurred while running a specific batch through a model.
    #[error(
        "model '{model_name}' failed during '{operation}' on batch {batch_index} with input shape {input_shape:?}: {context}"
    )]
    ModelInference {
        /// Name of the model that failed.
        model_name: String,
        /// The operation being performed.
        operation: String,
        /// Index of the failing batch.
        batch_index: usize,
        /// Shape of the input tensor.
        input_shape: Vec<usize>,
        /// Additional context about the failure.
        context: String,
        /// The underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error indicating invalid input.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    ConfigError {
        /// A message describing the configuration error.
        message: String,
    },

    /// Error indicating a buffer is too small.
    #[error("buffer too small: expected at least {expected} bytes, got {actual} bytes")]
    BufferTooSmall {
        /// The expected minimum buffer size.
        expected: usize,
        /// The actual buffer size.
        actual: usize,
    },

    /// Error from the ONNX Runtime session.
    #[error(transparent)]
    Session(#[from] ort::Error),

    /// Error from a tensor operation with shape details.
    #[error(
        "tensor operation '{operation}' failed: expected shape {expected_shape:?}, got {actual_shape:?}: {context}"
    )]
    TensorOperation {
        /// The tensor operation that failed.
        operation: String,
        /// Expected tensor shape.
        expected_shape: Vec<usize>,
        /// Actual tensor shape.
        actual_shape: Vec<usize>,
        /// Additional context.
        context: String,
        /// The underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error from ndarray shape handling.
    #[error("tensor operation")]
    Tensor(#[from] ndarray::ShapeError),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),

    /// Error raised while loading a model file.
    #[error("failed to load model '{model_path}': {reason}{}", suggestion_suffix(.suggestion))]
    ModelLoad {
        /// Path to the model.
        model_path: String,
        /// Why loading failed.
        reason: String,
        /// Optional hint for fixing the problem.
        suggestion: Option<String>,
        /// The underlying error, when there is one.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    suggestion
        .as_ref()
        .map(|s| format!("; suggested fix: {s}"))
        .unwrap_or_default()
}

impl From<image::ImageError> for OCRError {
    fn from(error: image::ImageError) -> Self {
        Self::ImageLoad(error)
    }
}

impl From<crate::core::config::ConfigError> for OCRError {
    fn from(error: crate::core::config::ConfigError) -> Self {
        Self::ConfigError {
            message: error.to_string(),
        }
    }
}
