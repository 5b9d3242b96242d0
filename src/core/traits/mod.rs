//! Traits at the boundary between the pipeline and the inference backend.
//!
//! The pipeline never talks to ONNX Runtime directly: each stage owns a boxed
//! [`InferenceEngine`] that turns a preprocessed batch tensor into raw model output.
//! This keeps pre/post-processing testable with in-memory engines.

use crate::core::OCRError;
use crate::core::batch::{Tensor2D, Tensor3D, Tensor4D};
use std::fmt::Debug;

/// Trait for model inference.
///
/// Implementors take an already normalized NCHW batch and return the raw model output.
pub trait InferenceEngine: Send + Sync + Debug {
    /// Input type for inference (typically a tensor)
    type Input: Send + Sync + Debug;

    /// Output type from inference (typically a tensor)
    type Output: Send + Sync + Debug;

    /// Perform inference on preprocessed input.
    ///
    /// # Arguments
    ///
    /// * `input` - Preprocessed input ready for inference
    ///
    /// # Returns
    ///
    /// Raw inference output or an error
    fn infer(&self, input: &Self::Input) -> Result<Self::Output, OCRError>;

    /// Get information about the inference engine.
    fn engine_info(&self) -> String;
}

/// Engine producing the text probability map, `[N, 1, H, W]`.
pub type DetectionEngine = dyn InferenceEngine<Input = Tensor4D, Output = Tensor4D>;

/// Engine producing per-crop class scores, `[N, num_classes]`.
pub type ClassificationEngine = dyn InferenceEngine<Input = Tensor4D, Output = Tensor2D>;

/// Engine producing per-step character probabilities, `[N, T, num_chars]`.
pub type RecognitionEngine = dyn InferenceEngine<Input = Tensor4D, Output = Tensor3D>;
