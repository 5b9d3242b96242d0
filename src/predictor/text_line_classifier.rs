//! Text Line Classifier
//!
//! This module classifies the orientation of text line crops (0° or 180°) and
//! turns upside-down crops back before recognition. Crops are grouped by
//! aspect ratio and classified in fixed-width batches.

use crate::core::config::{ConfigError, ConfigValidator, OrtSessionConfig};
use crate::core::constants::{
    DEFAULT_BATCH_SIZE, DEFAULT_CLS_IMAGE_SHAPE, DEFAULT_CLS_LABELS, DEFAULT_CLS_THRESH,
};
use crate::core::{AspectRatioScheduler, ClassificationEngine, OCRError, OrtInfer, OrtInfer2D};
use crate::processors::{ClsPostProcess, NormalizeImage, OCRResize};
use image::RgbImage;
use image::imageops;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, trace};

/// Configuration for the text line classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextLineClasPredictorConfig {
    /// Model input shape `[channels, height, width]`
    pub image_shape: [usize; 3],
    /// Number of crops per inference batch
    pub batch_size: usize,
    /// Minimum score for a "180" prediction to rotate the crop
    pub thresh: f32,
    /// Label of each output class
    pub label_list: Vec<String>,
}

impl Default for TextLineClasPredictorConfig {
    fn default() -> Self {
        Self {
            image_shape: DEFAULT_CLS_IMAGE_SHAPE,
            batch_size: DEFAULT_BATCH_SIZE,
            thresh: DEFAULT_CLS_THRESH,
            label_list: DEFAULT_CLS_LABELS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ConfigValidator for TextLineClasPredictorConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_batch_size(self.batch_size)?;
        let [_, h, w] = self.image_shape;
        self.validate_image_dimensions(w as u32, h as u32)?;
        self.validate_confidence_threshold(self.thresh)?;
        Ok(())
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

/// Text line orientation classifier.
#[derive(Debug)]
pub struct TextLineClasPredictor {
    config: TextLineClasPredictorConfig,
    resize: OCRResize,
    normalize: NormalizeImage,
    postprocess: ClsPostProcess,
    scheduler: AspectRatioScheduler,
    engine: Box<ClassificationEngine>,
}

impl TextLineClasPredictor {
    /// Creates a classifier around an inference engine.
    pub fn new(
        config: TextLineClasPredictorConfig,
        engine: Box<ClassificationEngine>,
    ) -> Result<Self, OCRError> {
        config.validate()?;

        Ok(Self {
            resize: OCRResize::new(Some(config.image_shape)),
            normalize: NormalizeImage::for_ocr_recognition(),
            postprocess: ClsPostProcess::new(config.label_list.clone()),
            scheduler: AspectRatioScheduler::new(config.batch_size),
            config,
            engine,
        })
    }

    /// Creates a classifier backed by an ONNX model file.
    pub fn from_model_path(
        config: TextLineClasPredictorConfig,
        model_path: impl AsRef<Path>,
        ort_config: Option<&OrtSessionConfig>,
    ) -> Result<Self, OCRError> {
        let engine = OrtInfer2D::new(OrtInfer::from_config(ort_config, model_path)?);
        Self::new(config, Box::new(engine))
    }

    pub fn config(&self) -> &TextLineClasPredictorConfig {
        &self.config
    }

    /// Predicts an orientation label and score for every crop, in input order.
    pub fn predict(&self, crops: &[RgbImage]) -> Result<Vec<(String, f32)>, OCRError> {
        let target_w = self.resize.width();
        let height = self.resize.height();

        self.scheduler.run(crops, |batch| {
            let members: Vec<RgbImage> = batch.indices.iter().map(|&i| crops[i].clone()).collect();
            let resized = self.resize.apply(&members, target_w)?;
            let input = self.normalize.normalize_batch_to(&resized, height, target_w)?;
            trace!(batch = batch.batch_index, shape = ?input.shape(), "classifying batch");

            let output = self.engine.infer(&input).map_err(|e| {
                OCRError::model_inference_error(
                    "text_line_orientation",
                    "classify",
                    batch.batch_index,
                    input.shape(),
                    "orientation forward pass failed",
                    e,
                )
            })?;
            Ok(self.postprocess.apply(&output))
        })
    }

    /// Classifies crops and rotates by 180 degrees, in place, every crop whose
    /// label contains `"180"` with a score above the threshold.
    ///
    /// Returns the per-crop predictions in input order.
    pub fn apply(&self, crops: &mut [RgbImage]) -> Result<Vec<(String, f32)>, OCRError> {
        let results = self.predict(crops)?;

        let mut rotated = 0usize;
        for (crop, (label, score)) in crops.iter_mut().zip(&results) {
            if label.contains("180") && *score > self.config.thresh {
                *crop = imageops::rotate180(crop);
                rotated += 1;
            }
        }

        debug!(crops = crops.len(), rotated, "text line orientation");
        Ok(results)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::{InferenceEngine, Tensor2D, Tensor4D};
    use image::Rgb;
    use ndarray::Array2;

    /// Reports "180" for crops whose first normalized value is above zero,
    /// which for BGR input means a bright blue channel in the top-left pixel.
    #[derive(Debug)]
    pub(crate) struct FakeClassifier {
        pub score: f32,
    }

    impl InferenceEngine for FakeClassifier {
        type Input = Tensor4D;
        type Output = Tensor2D;

        fn infer(&self, input: &Tensor4D) -> Result<Tensor2D, OCRError> {
            let n = input.shape()[0];
            let mut out = Array2::<f32>::zeros((n, 2));
            for i in 0..n {
                if input[[i, 0, 0, 0]] > 0.0 {
                    out[[i, 0]] = 1.0 - self.score;
                    out[[i, 1]] = self.score;
                } else {
                    out[[i, 0]] = self.score;
                    out[[i, 1]] = 1.0 - self.score;
                }
            }
            Ok(out)
        }

        fn engine_info(&self) -> String {
            "fake classifier".to_string()
        }
    }

    fn marked(width: u32, flipped: bool) -> RgbImage {
        let mut img = RgbImage::from_pixel(width, 10, Rgb([0, 0, 0]));
        if flipped {
            for y in 0..3 {
                for x in 0..3 {
                    img.put_pixel(x, y, Rgb([0, 0, 255]));
                }
            }
        }
        img
    }

    fn classifier(score: f32, batch_size: usize) -> TextLineClasPredictor {
        let config = TextLineClasPredictorConfig {
            batch_size,
            ..Default::default()
        };
        TextLineClasPredictor::new(config, Box::new(FakeClassifier { score })).unwrap()
    }

    #[test]
    fn test_predictions_follow_input_order() {
        let cls = classifier(0.95, 2);
        let crops = vec![marked(40, true), marked(10, false), marked(80, false), marked(20, true)];
        let labels: Vec<String> = cls.predict(&crops).unwrap().into_iter().map(|r| r.0).collect();
        assert_eq!(labels, vec!["180", "0", "0", "180"]);
    }

    #[test]
    fn test_confident_180_is_rotated() {
        let cls = classifier(0.95, 6);
        let mut crops = vec![marked(40, true), marked(40, false)];
        let original = crops.clone();
        cls.apply(&mut crops).unwrap();

        assert_eq!(crops[0], imageops::rotate180(&original[0]));
        assert_eq!(crops[1], original[1]);
    }

    #[test]
    fn test_low_confidence_is_not_rotated() {
        let cls = classifier(0.8, 6);
        let mut crops = vec![marked(40, true)];
        let original = crops.clone();
        let results = cls.apply(&mut crops).unwrap();
        assert_eq!(results[0].0, "180");
        assert_eq!(crops[0], original[0]);
    }

    #[test]
    fn test_score_equal_to_threshold_is_not_rotated() {
        let cls = classifier(DEFAULT_CLS_THRESH, 6);
        let mut crops = vec![marked(40, true)];
        let original = crops.clone();
        let results = cls.apply(&mut crops).unwrap();
        assert_eq!(results[0], ("180".to_string(), DEFAULT_CLS_THRESH));
        assert_eq!(crops[0], original[0]);
    }

    #[test]
    fn test_no_crops() {
        let cls = classifier(0.95, 6);
        assert!(cls.apply(&mut []).unwrap().is_empty());
    }
}
