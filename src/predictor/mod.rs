//! Predictor implementations for the OCR stages.
//!
//! This module contains the three predictors used in the OCR pipeline:
//! - Text detection (finding text regions in images)
//! - Text line orientation classification (turning upside-down lines)
//! - Text recognition (recognizing characters in text regions)
//!
//! Each predictor owns its pre- and post-processing and a boxed inference
//! engine, so it can run on an ONNX model or on any other engine.

/// Text recognition predictor using CRNN (Convolutional Recurrent Neural Network)
pub mod crnn_recognizer;

/// Text detection predictor using DB (Differentiable Binarization) algorithm
pub mod db_detector;

/// Text line classifier for 0/180 degree orientation
pub mod text_line_classifier;

pub use crnn_recognizer::{TextRecPredictor, TextRecPredictorConfig};
pub use db_detector::{TextDetPredictor, TextDetPredictorConfig};
pub use text_line_classifier::{TextLineClasPredictor, TextLineClasPredictorConfig};
