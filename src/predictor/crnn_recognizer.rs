//! CRNN (Convolutional Recurrent Neural Network) Text Recognizer
//!
//! This module implements the text recognition stage. Crops are grouped by
//! aspect ratio so each batch is padded to the width of its widest member,
//! then the per-step class probabilities are decoded with greedy CTC.

use crate::core::config::{ConfigError, ConfigValidator, OrtSessionConfig};
use crate::core::constants::{DEFAULT_BATCH_SIZE, DEFAULT_REC_IMAGE_SHAPE};
use crate::core::{AspectRatioScheduler, OCRError, OrtInfer, OrtInfer3D, RecognitionEngine};
use crate::processors::{CTCLabelDecode, NormalizeImage, OCRResize};
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, trace};

/// Configuration for the text recognition predictor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextRecPredictorConfig {
    /// Model input shape `[channels, height, width]`
    pub image_shape: [usize; 3],
    /// Number of crops per inference batch
    pub batch_size: usize,
}

impl Default for TextRecPredictorConfig {
    fn default() -> Self {
        Self {
            image_shape: DEFAULT_REC_IMAGE_SHAPE,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl ConfigValidator for TextRecPredictorConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_batch_size(self.batch_size)?;
        let [_, h, w] = self.image_shape;
        self.validate_image_dimensions(w as u32, h as u32)
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

/// Text recognition predictor.
#[derive(Debug)]
pub struct TextRecPredictor {
    config: TextRecPredictorConfig,
    resize: OCRResize,
    normalize: NormalizeImage,
    decoder: CTCLabelDecode,
    scheduler: AspectRatioScheduler,
    engine: Box<RecognitionEngine>,
}

impl TextRecPredictor {
    /// Creates a recognizer around an inference engine and a decoder.
    pub fn new(
        config: TextRecPredictorConfig,
        decoder: CTCLabelDecode,
        engine: Box<RecognitionEngine>,
    ) -> Result<Self, OCRError> {
        config.validate()?;

        Ok(Self {
            resize: OCRResize::new(Some(config.image_shape)),
            normalize: NormalizeImage::for_ocr_recognition(),
            scheduler: AspectRatioScheduler::new(config.batch_size),
            config,
            decoder,
            engine,
        })
    }

    /// Creates a recognizer backed by an ONNX model file and a dictionary file.
    pub fn from_model_path(
        config: TextRecPredictorConfig,
        model_path: impl AsRef<Path>,
        dict_path: impl AsRef<Path>,
        use_space_char: bool,
        ort_config: Option<&OrtSessionConfig>,
    ) -> Result<Self, OCRError> {
        let decoder = CTCLabelDecode::from_dict_file(dict_path, use_space_char)?;
        let engine = OrtInfer3D::new(OrtInfer::from_config(ort_config, model_path)?);
        Self::new(config, decoder, Box::new(engine))
    }

    pub fn config(&self) -> &TextRecPredictorConfig {
        &self.config
    }

    pub fn decoder(&self) -> &CTCLabelDecode {
        &self.decoder
    }

    /// Transcribes every crop, returning `(text, score)` pairs in input order.
    pub fn predict(&self, crops: &[RgbImage]) -> Result<Vec<(String, f32)>, OCRError> {
        let height = self.resize.height();

        let results = self.scheduler.run(crops, |batch| {
            let target_w = self.resize.batch_width(batch.max_ratio);
            let members: Vec<RgbImage> = batch.indices.iter().map(|&i| crops[i].clone()).collect();
            let resized = self.resize.apply(&members, target_w)?;
            let input = self.normalize.normalize_batch_to(&resized, height, target_w)?;
            trace!(batch = batch.batch_index, shape = ?input.shape(), "recognizing batch");

            let output = self.engine.infer(&input).map_err(|e| {
                OCRError::model_inference_error(
                    "text_recognition",
                    "recognize",
                    batch.batch_index,
                    input.shape(),
                    "recognition forward pass failed",
                    e,
                )
            })?;
            Ok(self.decoder.apply(&output))
        })?;

        debug!(crops = crops.len(), "text recognition");
        Ok(results)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::{InferenceEngine, Tensor3D, Tensor4D};
    use image::Rgb;
    use ndarray::Array3;
    use std::sync::{Arc, Mutex};

    /// Emits class `k` with probability `score` at the first time step and
    /// blanks afterwards, where `k` is the top-left green value divided by 50.
    /// Records the width of every batch it sees.
    #[derive(Debug)]
    pub(crate) struct FakeRecognizer {
        pub classes: usize,
        pub score: f32,
        pub widths: Arc<Mutex<Vec<usize>>>,
    }

    impl FakeRecognizer {
        pub(crate) fn new(classes: usize, score: f32) -> Self {
            Self {
                classes,
                score,
                widths: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    /// Inverse of the `[-1, 1]` scaling.
    pub(crate) fn pixel_value(normalized: f32) -> u8 {
        ((normalized + 1.0) * 127.5).round() as u8
    }

    impl InferenceEngine for FakeRecognizer {
        type Input = Tensor4D;
        type Output = Tensor3D;

        fn infer(&self, input: &Tensor4D) -> Result<Tensor3D, OCRError> {
            let (n, w) = (input.shape()[0], input.shape()[3]);
            if let Ok(mut widths) = self.widths.lock() {
                widths.push(w);
            }
            let steps = 4;
            let mut out = Array3::<f32>::zeros((n, steps, self.classes));
            for i in 0..n {
                let class = (pixel_value(input[[i, 1, 0, 0]]) / 50) as usize % self.classes;
                out[[i, 0, class]] = self.score;
                for t in 1..steps {
                    out[[i, t, 0]] = 1.0;
                }
                if class == 0 {
                    out[[i, 0, 0]] = 1.0;
                }
            }
            Ok(out)
        }

        fn engine_info(&self) -> String {
            "fake recognizer".to_string()
        }
    }

    pub(crate) fn alphabet_decoder() -> CTCLabelDecode {
        CTCLabelDecode::new(vec!["a".into(), "b".into(), "c".into(), "d".into()], false)
    }

    /// A crop whose recognized class is `class`.
    pub(crate) fn crop_for_class(class: u8, width: u32, height: u32) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb([0, class * 50 + 10, 0]))
    }

    fn recognizer(batch_size: usize) -> TextRecPredictor {
        let config = TextRecPredictorConfig {
            batch_size,
            ..Default::default()
        };
        TextRecPredictor::new(config, alphabet_decoder(), Box::new(FakeRecognizer::new(5, 0.9))).unwrap()
    }

    #[test]
    fn test_results_follow_input_order() {
        for batch_size in [1, 2, 6] {
            let rec = recognizer(batch_size);
            let crops = vec![
                crop_for_class(3, 90, 10),
                crop_for_class(1, 20, 10),
                crop_for_class(4, 300, 10),
                crop_for_class(2, 40, 10),
            ];
            let texts: Vec<String> = rec.predict(&crops).unwrap().into_iter().map(|r| r.0).collect();
            assert_eq!(texts, vec!["c", "a", "d", "b"]);
        }
    }

    #[test]
    fn test_blank_crop_scores_zero() {
        let rec = recognizer(6);
        let results = rec.predict(&[crop_for_class(0, 40, 10)]).unwrap();
        assert_eq!(results, vec![(String::new(), 0.0)]);
    }

    #[test]
    fn test_batch_width_grows_with_widest_crop() {
        let engine = FakeRecognizer::new(5, 0.9);
        let widths = Arc::clone(&engine.widths);
        let config = TextRecPredictorConfig {
            batch_size: 2,
            ..Default::default()
        };
        let rec = TextRecPredictor::new(config, alphabet_decoder(), Box::new(engine)).unwrap();
        let crops = vec![
            crop_for_class(1, 20, 10),
            crop_for_class(1, 100, 10),
            crop_for_class(1, 30, 10),
        ];
        rec.predict(&crops).unwrap();
        // Batches: [20, 30] padded to the model width, then [100] at ratio 10.
        assert_eq!(*widths.lock().unwrap(), vec![320, 480]);
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let config = TextRecPredictorConfig {
            batch_size: 0,
            ..Default::default()
        };
        let result = TextRecPredictor::new(config, alphabet_decoder(), Box::new(FakeRecognizer::new(5, 0.9)));
        assert!(result.is_err());
    }
}
