//! DB (Differentiable Binarization) Text Detector
//!
//! This module implements the text detection stage. The DB model outputs a
//! per-pixel text probability map; the predictor resizes and normalizes the
//! image, runs the model and turns the map into ordered quadrilaterals in
//! source image coordinates.
//!
//! The main components are:
//! - `TextDetPredictor`: The predictor that performs text detection
//! - `TextDetPredictorConfig`: Configuration for the predictor

use crate::core::config::{ConfigError, ConfigValidator, OrtSessionConfig};
use crate::core::constants::{
    DEFAULT_DB_BOX_THRESH, DEFAULT_DB_THRESH, DEFAULT_DB_UNCLIP_RATIO, DEFAULT_LIMIT_SIDE_LEN,
    DEFAULT_MAX_CANDIDATES, DEFAULT_MIN_BOX_SIDE,
};
use crate::core::{DetectionEngine, OCRError, OrtInfer, OrtInfer4D};
use crate::processors::{
    DBPostProcess, DetResizeForTest, LimitType, NormalizeImage, Quadrilateral, clip_to_bounds,
    order_clockwise,
};
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Configuration for the text detection predictor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextDetPredictorConfig {
    /// Limit for the side length of the image
    pub limit_side_len: u32,
    /// Type of limit to apply (Max or Min)
    pub limit_type: LimitType,
    /// Threshold for binarization
    pub thresh: f32,
    /// Threshold for filtering text boxes
    pub box_thresh: f32,
    /// Ratio for unclipping text boxes
    pub unclip_ratio: f32,
    /// Whether to dilate the binary map before contour extraction
    pub use_dilation: bool,
    /// Maximum number of contours considered
    pub max_candidates: usize,
}

impl Default for TextDetPredictorConfig {
    fn default() -> Self {
        Self {
            limit_side_len: DEFAULT_LIMIT_SIDE_LEN,
            limit_type: LimitType::Max,
            thresh: DEFAULT_DB_THRESH,
            box_thresh: DEFAULT_DB_BOX_THRESH,
            unclip_ratio: DEFAULT_DB_UNCLIP_RATIO,
            use_dilation: false,
            max_candidates: DEFAULT_MAX_CANDIDATES,
        }
    }
}

impl ConfigValidator for TextDetPredictorConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.limit_side_len == 0 {
            return Err(ConfigError::InvalidConfig {
                message: "det_limit_side_len must be greater than 0".to_string(),
            });
        }
        self.validate_confidence_threshold(self.thresh)?;
        self.validate_confidence_threshold(self.box_thresh)?;
        self.validate_positive("det_db_unclip_ratio", self.unclip_ratio)?;
        Ok(())
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

/// Text detection predictor built on a DB model.
#[derive(Debug)]
pub struct TextDetPredictor {
    config: TextDetPredictorConfig,
    resize: DetResizeForTest,
    normalize: NormalizeImage,
    postprocess: DBPostProcess,
    engine: Box<DetectionEngine>,
}

impl TextDetPredictor {
    /// Creates a predictor around an inference engine.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` does not validate.
    pub fn new(config: TextDetPredictorConfig, engine: Box<DetectionEngine>) -> Result<Self, OCRError> {
        config.validate()?;

        let resize = DetResizeForTest::new(Some(config.limit_side_len), Some(config.limit_type));
        let postprocess = DBPostProcess::new(
            Some(config.thresh),
            Some(config.box_thresh),
            Some(config.max_candidates),
            Some(config.unclip_ratio),
            Some(config.use_dilation),
        );

        Ok(Self {
            config,
            resize,
            normalize: NormalizeImage::imagenet(),
            postprocess,
            engine,
        })
    }

    /// Creates a predictor backed by an ONNX model file.
    pub fn from_model_path(
        config: TextDetPredictorConfig,
        model_path: impl AsRef<Path>,
        ort_config: Option<&OrtSessionConfig>,
    ) -> Result<Self, OCRError> {
        let engine = OrtInfer4D::new(OrtInfer::from_config(ort_config, model_path)?);
        Self::new(config, Box::new(engine))
    }

    pub fn config(&self) -> &TextDetPredictorConfig {
        &self.config
    }

    /// Detects text regions in an image.
    ///
    /// Returns quadrilaterals in source coordinates with corners ordered
    /// top-left, top-right, bottom-right, bottom-left, clamped to the image and
    /// with both the top and left edges longer than three pixels. An empty image
    /// yields no regions.
    ///
    /// # Errors
    ///
    /// Returns an error if inference fails or the model output is not a
    /// `[N, C, H, W]` map with at least one map.
    pub fn predict(&self, image: &RgbImage) -> Result<Vec<Quadrilateral>, OCRError> {
        let (src_w, src_h) = image.dimensions();
        if src_w == 0 || src_h == 0 {
            return Ok(Vec::new());
        }

        let (resized, scale) = self.resize.resize(image);
        let input = self.normalize.normalize_to(&resized)?;
        let output = self
            .engine
            .infer(&input)
            .map_err(|e| OCRError::inference_error("text_detection", "detection forward pass failed", e))?;

        let shape = output.shape();
        if shape[0] == 0 || shape[1] == 0 {
            return Err(OCRError::tensor_operation_error(
                "detection_output",
                &[1, 1, 0, 0],
                shape,
                "detection model returned no probability map",
                crate::core::errors::OpaqueError("empty output".to_string()),
            ));
        }

        let raw = self
            .postprocess
            .apply(&output, std::slice::from_ref(&scale))
            .into_iter()
            .next()
            .unwrap_or_default();
        let candidates = raw.len();

        let boxes: Vec<Quadrilateral> = raw
            .into_iter()
            .map(|quad| clip_to_bounds(&order_clockwise(quad.points), src_h, src_w))
            .filter(|quad| {
                quad.top_edge() > DEFAULT_MIN_BOX_SIDE && quad.left_edge() > DEFAULT_MIN_BOX_SIDE
            })
            .collect();

        debug!(
            candidates,
            kept = boxes.len(),
            "text detection on {}x{} image",
            src_w,
            src_h
        );
        Ok(boxes)
    }
}
