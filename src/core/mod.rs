//! The core module of the OCR pipeline.
//!
//! This module contains the fundamental components shared by every stage:
//! - Tensor aliases and the aspect-ratio batch scheduler
//! - Configuration validation and ONNX Runtime session options
//! - Constants and defaults
//! - Error handling
//! - The inference engine trait and its ONNX Runtime implementation

pub mod batch;
pub mod config;
pub mod constants;
pub mod errors;
pub mod inference;
pub mod traits;

pub use batch::{AspectRatioScheduler, ScheduledBatch, Tensor2D, Tensor3D, Tensor4D, crop_ratio};
pub use config::{
    ConfigError, ConfigValidator, OrtExecutionProvider, OrtGraphOptimizationLevel,
    OrtSessionConfig,
};
pub use constants::*;
pub use errors::{OCRError, OcrResult, ProcessingStage};
pub use inference::{OrtInfer, OrtInfer2D, OrtInfer3D, OrtInfer4D, load_session};
pub use traits::{ClassificationEngine, DetectionEngine, InferenceEngine, RecognitionEngine};

/// Initializes the tracing subscriber for logging.
///
/// This function sets up the tracing subscriber with environment filter and formatting layer.
/// It's typically called at the start of an application to enable logging.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();
}
