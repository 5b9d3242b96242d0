//! Error constructor utilities for the OCR pipeline.
//!
//! Helper functions for creating [`OCRError`] values with context and error chaining,
//! so call sites stay short.

use super::types::{OCRError, OpaqueError, ProcessingStage};

/// Builder for composing detailed `ModelInference` errors without duplicating boilerplate.
#[derive(Clone, Debug)]
pub struct ModelInferenceErrorBuilder {
    model_name: String,
    operation: String,
    batch_index: usize,
    input_shape: Vec<usize>,
    context: String,
}

impl ModelInferenceErrorBuilder {
    /// Creates a new builder with the required model metadata.
    pub fn new(model_name: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            operation: operation.into(),
            batch_index: 0,
            input_shape: Vec::new(),
            context: String::new(),
        }
    }

    /// Sets the batch index associated with the failure.
    pub fn batch_index(mut self, batch_index: usize) -> Self {
        self.batch_index = batch_index;
        self
    }

    /// Stores the input tensor shape for contextual debugging.
    pub fn input_shape(mut self, shape: &[usize]) -> Self {
        self.input_shape = shape.to_vec();
        self
    }

    /// Adds free-form context to the error message.
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    /// Consumes the builder and produces the final `OCRError`.
    pub fn build(self, error: impl std::error::Error + Send + Sync + 'static) -> OCRError {
        OCRError::ModelInference {
            model_name: self.model_name,
            operation: self.operation,
            batch_index: self.batch_index,
            input_shape: self.input_shape,
            context: self.context,
            source: Box::new(error),
        }
    }
}

impl OCRError {
    #[inline]
    fn processing_with_context(
        kind: ProcessingStage,
        context: impl Into<String>,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            kind,
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates an OCRError for tensor operations without shape details.
    ///
    /// # Arguments
    ///
    /// * `context` - Additional context about the error.
    /// * `error` - The underlying error that caused this error.
    pub fn tensor_operation(
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::processing_with_context(ProcessingStage::TensorOperation, context, error)
    }

    /// Creates an OCRError for image processing operations with a simple message.
    ///
    /// # Arguments
    ///
    /// * `message` - The error message describing what went wrong.
    pub fn image_processing_error(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::processing_with_context(
            ProcessingStage::ImageProcessing,
            message.clone(),
            OpaqueError(message),
        )
    }

    /// Creates an OCRError for invalid input.
    ///
    /// # Arguments
    ///
    /// * `message` - A message describing the invalid input.
    ///
    /// # Returns
    ///
    /// An OCRError instance.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates an OCRError for configuration errors.
    ///
    /// # Arguments
    ///
    /// * `message` - A message describing the configuration error.
    ///
    /// # Returns
    ///
    /// An OCRError instance.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Creates an OCRError for an inference failure with model context.
    ///
    /// # Arguments
    ///
    /// * `model_name` - Name of the model that failed.
    /// * `context` - What was being done when it failed.
    /// * `error` - The underlying error that caused this error.
    pub fn inference_error(
        model_name: &str,
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Inference {
            model_name: model_name.to_string(),
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates an OCRError for a failing batch of a specific model.
    ///
    /// # Arguments
    ///
    /// * `model_name` - Name of the model that failed.
    /// * `operation` - The operation being performed.
    /// * `batch_index` - Index of the batch within the call.
    /// * `input_shape` - Shape of the tensor fed to the model.
    /// * `context` - Additional context about the failure.
    /// * `error` - The underlying error that caused this error.
    pub fn model_inference_error(
        model_name: &str,
        operation: &str,
        batch_index: usize,
        input_shape: &[usize],
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ModelInferenceErrorBuilder::new(model_name, operation)
            .batch_index(batch_index)
            .input_shape(input_shape)
            .context(context)
            .build(error)
    }

    /// Creates an OCRError for tensor shape mismatches.
    ///
    /// # Arguments
    ///
    /// * `operation` - The tensor operation that failed.
    /// * `expected_shape` - The shape that was expected.
    /// * `actual_shape` - The shape that was received.
    /// * `context` - Additional context about the error.
    /// * `error` - The underlying error that caused this error.
    pub fn tensor_operation_error(
        operation: &str,
        expected_shape: &[usize],
        actual_shape: &[usize],
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::TensorOperation {
            operation: operation.to_string(),
            expected_shape: expected_shape.to_vec(),
            actual_shape: actual_shape.to_vec(),
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates an OCRError for model loading failures.
    ///
    /// # Arguments
    ///
    /// * `model_path` - Path of the model that could not be loaded.
    /// * `reason` - Why loading failed.
    /// * `suggestion` - Optional hint shown to the user.
    /// * `error` - Optional underlying error.
    pub fn model_load_error<E>(
        model_path: &std::path::Path,
        reason: impl Into<String>,
        suggestion: Option<&str>,
        error: Option<E>,
    ) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ModelLoad {
            model_path: model_path.display().to_string(),
            reason: reason.into(),
            suggestion: suggestion.map(str::to_string),
            source: error.map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
        }
    }
}
