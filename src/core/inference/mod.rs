//! Structures and helpers for ONNX Runtime inference.
//!
//! This module holds the ONNX Runtime engine along with thin wrappers that adapt
//! it to the [`InferenceEngine`](crate::core::traits::InferenceEngine) trait used by
//! the predictors.

pub mod ort_infer;
pub mod session;
pub mod wrappers;

pub use ort_infer::OrtInfer;
pub use session::load_session;
pub use wrappers::{OrtInfer2D, OrtInfer3D, OrtInfer4D};
