//! The OAROCR pipeline.
//!
//! [`OAROCR`] sequences the three stages for one image:
//! detection, optional orientation classification, then recognition. Each call
//! runs to completion before returning; the only state kept between calls is
//! the configuration and the loaded models.

mod builder;

pub use builder::OAROCRBuilder;

use crate::core::OCRError;
use crate::core::config::ConfigValidator;
use crate::pipeline::config::OCRConfig;
use crate::pipeline::result::{OCRLine, OrientationResult, RecognitionResult};
use crate::predictor::{TextDetPredictor, TextLineClasPredictor, TextRecPredictor};
use crate::processors::{CTCLabelDecode, Quadrilateral, reading_order};
use crate::utils::{TextCrop, image_from_buffer, load_image, rectify};
use image::RgbImage;
use std::fmt;
use std::path::Path;
use tracing::{debug, info, info_span};

/// Stage a call is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Detecting,
    Classifying,
    Recognizing,
    Done,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Idle => "idle",
            PipelineState::Detecting => "detecting",
            PipelineState::Classifying => "classifying",
            PipelineState::Recognizing => "recognizing",
            PipelineState::Done => "done",
        };
        f.write_str(name)
    }
}

fn enter(state: &mut PipelineState, next: PipelineState) {
    debug!("pipeline {} -> {}", state, next);
    *state = next;
}

fn ensure_stage_matches<T: PartialEq + fmt::Debug>(
    stage: &str,
    actual: &T,
    expected: &T,
) -> Result<(), OCRError> {
    if actual == expected {
        Ok(())
    } else {
        Err(OCRError::config_error(format!(
            "{stage} predictor settings {actual:?} differ from the pipeline configuration {expected:?}"
        )))
    }
}

/// Text detection, orientation correction and recognition over whole images.
///
/// All methods take `&self`. The ONNX Runtime sessions sit behind mutexes, so
/// concurrent calls on one instance are serialized rather than overlapped.
///
/// # Example
///
/// ```no_run
/// use onnx_ocr::prelude::*;
///
/// # fn main() -> Result<(), OCRError> {
/// let ocr = OAROCRBuilder::new("det.onnx", "rec.onnx", "ppocr_keys_v1.txt")
///     .with_angle_cls("cls.onnx")
///     .drop_score(0.6)
///     .build()?;
///
/// for line in ocr.process_file("receipt.jpg")? {
///     println!("{line}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct OAROCR {
    config: OCRConfig,
    detector: TextDetPredictor,
    classifier: Option<TextLineClasPredictor>,
    recognizer: TextRecPredictor,
}

impl OAROCR {
    /// Loads every model named by `config`.
    ///
    /// The classifier is only loaded when `use_angle_cls` is set.
    ///
    /// # Errors
    ///
    /// Fails if the configuration does not validate, a model cannot be loaded or
    /// the dictionary cannot be read.
    pub fn new(config: OCRConfig) -> Result<Self, OCRError> {
        config.validate()?;
        let session = config.session_config();

        let detector = TextDetPredictor::from_model_path(
            config.detection(),
            &config.det_model_path,
            Some(&session),
        )?;
        let recognizer = TextRecPredictor::from_model_path(
            config.recognition(),
            &config.rec_model_path,
            &config.rec_char_dict_path,
            config.use_space_char,
            Some(&session),
        )?;
        let classifier = if config.use_angle_cls {
            Some(TextLineClasPredictor::from_model_path(
                config.classification(),
                &config.cls_model_path,
                Some(&session),
            )?)
        } else {
            None
        };

        info!(
            use_angle_cls = config.use_angle_cls,
            alphabet = recognizer.decoder().character_count(),
            "OCR pipeline ready"
        );
        Self::from_predictors(config, detector, recognizer, classifier)
    }

    /// Assembles a pipeline from already built predictors.
    ///
    /// `config` stays the single source of settings: each predictor must have
    /// been built with the stage settings derived from it. A classifier passed
    /// here is only used when `config.use_angle_cls` is set.
    ///
    /// # Errors
    ///
    /// Fails if `config` does not validate or a predictor's settings differ from
    /// the ones `config` describes.
    pub fn from_predictors(
        config: OCRConfig,
        detector: TextDetPredictor,
        recognizer: TextRecPredictor,
        classifier: Option<TextLineClasPredictor>,
    ) -> Result<Self, OCRError> {
        config.validate()?;
        ensure_stage_matches("detection", detector.config(), &config.detection())?;
        ensure_stage_matches("recognition", recognizer.config(), &config.recognition())?;
        if let Some(classifier) = &classifier {
            ensure_stage_matches(
                "classification",
                classifier.config(),
                &config.classification(),
            )?;
        }
        Ok(Self {
            config,
            detector,
            classifier,
            recognizer,
        })
    }

    pub fn config(&self) -> &OCRConfig {
        &self.config
    }

    /// The recognizer's CTC decoder.
    pub fn decoder(&self) -> &CTCLabelDecode {
        self.recognizer.decoder()
    }

    /// Runs the full pipeline with orientation classification enabled.
    pub fn process(&self, image: &RgbImage) -> Result<Vec<OCRLine>, OCRError> {
        self.process_with_options(image, true)
    }

    /// Loads an image file and runs the full pipeline on it.
    pub fn process_file(&self, path: impl AsRef<Path>) -> Result<Vec<OCRLine>, OCRError> {
        let image = load_image(path)?;
        self.process(&image)
    }

    /// Runs the full pipeline on an interleaved 3-channel BGR buffer.
    pub fn process_buffer(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        channels: u32,
    ) -> Result<Vec<OCRLine>, OCRError> {
        let image = image_from_buffer(data, width, height, channels)?;
        self.process(&image)
    }

    /// Runs the full pipeline.
    ///
    /// Classification runs only when `use_cls` is true and the pipeline was
    /// built with `use_angle_cls`. Lines are returned in reading order; lines
    /// scoring below `drop_score` are left out. An empty image, or one without
    /// text, gives an empty list.
    pub fn process_with_options(
        &self,
        image: &RgbImage,
        use_cls: bool,
    ) -> Result<Vec<OCRLine>, OCRError> {
        let _span = info_span!("ocr", width = image.width(), height = image.height()).entered();
        let mut state = PipelineState::Idle;

        if image.width() == 0 || image.height() == 0 {
            return Ok(Vec::new());
        }

        enter(&mut state, PipelineState::Detecting);
        let boxes = self.detector.predict(image)?;
        if boxes.is_empty() {
            enter(&mut state, PipelineState::Done);
            return Ok(Vec::new());
        }
        let boxes = reading_order(&boxes);

        let crops: Vec<TextCrop> = boxes
            .iter()
            .enumerate()
            .map(|(index, quad)| TextCrop {
                index,
                image: rectify(image, quad),
            })
            .filter(|crop| crop.image.width() > 0 && crop.image.height() > 0)
            .collect();
        if crops.len() < boxes.len() {
            debug!(dropped = boxes.len() - crops.len(), "dropped empty crops");
        }
        if crops.is_empty() {
            enter(&mut state, PipelineState::Done);
            return Ok(Vec::new());
        }

        let (indices, mut images): (Vec<usize>, Vec<RgbImage>) =
            crops.into_iter().map(|crop| (crop.index, crop.image)).unzip();

        if use_cls
            && self.config.use_angle_cls
            && let Some(classifier) = &self.classifier
        {
            enter(&mut state, PipelineState::Classifying);
            classifier.apply(&mut images)?;
        }

        enter(&mut state, PipelineState::Recognizing);
        let results = self.recognizer.predict(&images)?;

        let lines: Vec<OCRLine> = indices
            .iter()
            .zip(results)
            .filter(|(_, (_, score))| *score >= self.config.drop_score)
            .map(|(&index, (text, score))| OCRLine {
                bbox: boxes[index],
                text,
                score,
            })
            .collect();

        enter(&mut state, PipelineState::Done);
        info!(
            regions = boxes.len(),
            lines = lines.len(),
            dropped = indices.len() - lines.len(),
            "OCR finished"
        );
        Ok(lines)
    }

    /// Detects text regions without recognizing them.
    ///
    /// Regions are returned in detection order, not reading order.
    pub fn detect_only(&self, image: &RgbImage) -> Result<Vec<Quadrilateral>, OCRError> {
        self.detector.predict(image)
    }

    /// Recognizes already cropped text lines, in input order.
    pub fn recognize_only(&self, crops: &[RgbImage]) -> Result<Vec<RecognitionResult>, OCRError> {
        Ok(self
            .recognizer
            .predict(crops)?
            .into_iter()
            .map(RecognitionResult::from)
            .collect())
    }

    /// Classifies the orientation of cropped text lines.
    ///
    /// Returns the crops, with confidently upside-down ones rotated by 180
    /// degrees, together with one result per crop. Without a classifier the
    /// crops come back unchanged with no results.
    pub fn classify_only(
        &self,
        mut crops: Vec<RgbImage>,
    ) -> Result<(Vec<RgbImage>, Vec<OrientationResult>), OCRError> {
        let Some(classifier) = &self.classifier else {
            return Ok((crops, Vec::new()));
        };
        let results = classifier.apply(&mut crops)?;
        Ok((
            crops,
            results.into_iter().map(OrientationResult::from).collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::crnn_recognizer::tests::{FakeRecognizer, alphabet_decoder};
    use crate::predictor::db_detector::tests::FakeDetector;
    use crate::predictor::text_line_classifier::tests::FakeClassifier;
    use crate::predictor::{TextDetPredictorConfig, TextLineClasPredictorConfig, TextRecPredictorConfig};
    use image::{Rgb, imageops};

    /// Detector regions as fractions of a 320x320 image.
    const TOP_LINE: (f32, f32, f32, f32) = (0.1, 0.1, 0.7, 0.2);
    const BOTTOM_LINE: (f32, f32, f32, f32) = (0.1, 0.6, 0.8, 0.7);

    fn pipeline(
        regions: Vec<(f32, f32, f32, f32)>,
        rec_score: f32,
        config: OCRConfig,
    ) -> OAROCR {
        let detector = TextDetPredictor::new(
            TextDetPredictorConfig::default(),
            Box::new(FakeDetector { regions }),
        )
        .unwrap();
        let recognizer = TextRecPredictor::new(
            TextRecPredictorConfig::default(),
            alphabet_decoder(),
            Box::new(FakeRecognizer::new(5, rec_score)),
        )
        .unwrap();
        let classifier = TextLineClasPredictor::new(
            TextLineClasPredictorConfig::default(),
            Box::new(FakeClassifier { score: 0.99 }),
        )
        .unwrap();
        OAROCR::from_predictors(config, detector, recognizer, Some(classifier)).unwrap()
    }

    /// A 320x320 image whose top line reads "b" and bottom line reads "c".
    fn two_line_image() -> RgbImage {
        RgbImage::from_fn(320, 320, |_, y| {
            if y < 160 {
                Rgb([0, 110, 0])
            } else {
                Rgb([0, 160, 0])
            }
        })
    }

    #[test]
    fn test_two_lines_in_reading_order() {
        let ocr = pipeline(vec![BOTTOM_LINE, TOP_LINE], 0.9, OCRConfig::default());
        let lines = ocr.process(&two_line_image()).unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "b");
        assert_eq!(lines[1].text, "c");
        assert!(lines[0].bbox.points[0].y < lines[1].bbox.points[0].y);
        assert!((lines[0].score - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_image_without_text() {
        let ocr = pipeline(Vec::new(), 0.9, OCRConfig::default());
        assert!(ocr.process(&two_line_image()).unwrap().is_empty());
        assert!(ocr.process(&RgbImage::new(0, 0)).unwrap().is_empty());
    }

    #[test]
    fn test_low_scores_are_dropped() {
        let ocr = pipeline(vec![TOP_LINE, BOTTOM_LINE], 0.4, OCRConfig::default());
        assert_eq!(ocr.detect_only(&two_line_image()).unwrap().len(), 2);
        assert!(ocr.process(&two_line_image()).unwrap().is_empty());

        let lenient = OCRConfig {
            drop_score: 0.3,
            ..Default::default()
        };
        let ocr = pipeline(vec![TOP_LINE, BOTTOM_LINE], 0.4, lenient);
        assert_eq!(ocr.process(&two_line_image()).unwrap().len(), 2);
    }

    #[test]
    fn test_score_equal_to_drop_score_is_kept() {
        let ocr = pipeline(vec![TOP_LINE, BOTTOM_LINE], 0.5, OCRConfig::default());
        assert_eq!(ocr.config().drop_score, 0.5);
        assert_eq!(ocr.process(&two_line_image()).unwrap().len(), 2);
    }

    #[test]
    fn test_predictors_must_follow_config() {
        let config = OCRConfig {
            use_angle_cls: true,
            cls_thresh: 0.5,
            ..Default::default()
        };
        let detector = TextDetPredictor::new(
            TextDetPredictorConfig::default(),
            Box::new(FakeDetector { regions: Vec::new() }),
        )
        .unwrap();
        let recognizer = TextRecPredictor::new(
            TextRecPredictorConfig::default(),
            alphabet_decoder(),
            Box::new(FakeRecognizer::new(5, 0.9)),
        )
        .unwrap();
        let classifier = TextLineClasPredictor::new(
            TextLineClasPredictorConfig::default(),
            Box::new(FakeClassifier { score: 0.8 }),
        )
        .unwrap();
        assert!(matches!(
            OAROCR::from_predictors(config.clone(), detector, recognizer, Some(classifier)),
            Err(OCRError::ConfigError { .. })
        ));

        let detector = TextDetPredictor::new(
            config.detection(),
            Box::new(FakeDetector { regions: Vec::new() }),
        )
        .unwrap();
        let recognizer = TextRecPredictor::new(
            TextRecPredictorConfig {
                batch_size: 1,
                ..config.recognition()
            },
            alphabet_decoder(),
            Box::new(FakeRecognizer::new(5, 0.9)),
        )
        .unwrap();
        assert!(OAROCR::from_predictors(config.clone(), detector, recognizer, None).is_err());

        // Built from the same config, the classifier rotates at the configured 0.5.
        let detector = TextDetPredictor::new(
            config.detection(),
            Box::new(FakeDetector { regions: Vec::new() }),
        )
        .unwrap();
        let recognizer = TextRecPredictor::new(
            config.recognition(),
            alphabet_decoder(),
            Box::new(FakeRecognizer::new(5, 0.9)),
        )
        .unwrap();
        let classifier = TextLineClasPredictor::new(
            config.classification(),
            Box::new(FakeClassifier { score: 0.8 }),
        )
        .unwrap();
        let ocr = OAROCR::from_predictors(config, detector, recognizer, Some(classifier)).unwrap();
        let flipped = RgbImage::from_fn(60, 20, |x, y| {
            if x < 5 && y < 5 { Rgb([0, 0, 255]) } else { Rgb([0, 0, 0]) }
        });
        let (crops, results) = ocr.classify_only(vec![flipped.clone()]).unwrap();
        assert_ne!(crops[0], flipped);
        assert_eq!(results[0].label, "180");
        assert_eq!(crops[0], imageops::rotate180(&flipped));
    }

    #[test]
    fn test_recognize_only_keeps_order() {
        let ocr = pipeline(Vec::new(), 0.9, OCRConfig::default());
        let crops = vec![
            RgbImage::from_pixel(200, 20, Rgb([0, 210, 0])),
            RgbImage::from_pixel(30, 20, Rgb([0, 60, 0])),
        ];
        let results = ocr.recognize_only(&crops).unwrap();
        assert_eq!(results[0].text, "d");
        assert_eq!(results[1].text, "a");
        assert!(ocr.recognize_only(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_classify_only_rotates_flagged_crops() {
        let ocr = pipeline(Vec::new(), 0.9, OCRConfig::default());
        let mut flipped = RgbImage::from_pixel(60, 20, Rgb([0, 0, 0]));
        for y in 0..5 {
            for x in 0..5 {
                flipped.put_pixel(x, y, Rgb([0, 0, 255]));
            }
        }
        let upright = RgbImage::from_pixel(60, 20, Rgb([0, 0, 0]));

        let (crops, results) = ocr
            .classify_only(vec![flipped.clone(), upright.clone()])
            .unwrap();
        assert_eq!(results[0].label, "180");
        assert_eq!(results[1].label, "0");
        assert_eq!(crops[0], imageops::rotate180(&flipped));
        assert_eq!(crops[1], upright);
    }

    #[test]
    fn test_classify_only_without_classifier() {
        let detector = TextDetPredictor::new(
            TextDetPredictorConfig::default(),
            Box::new(FakeDetector { regions: Vec::new() }),
        )
        .unwrap();
        let recognizer = TextRecPredictor::new(
            TextRecPredictorConfig::default(),
            alphabet_decoder(),
            Box::new(FakeRecognizer::new(5, 0.9)),
        )
        .unwrap();
        let ocr = OAROCR::from_predictors(OCRConfig::default(), detector, recognizer, None).unwrap();

        let crops = vec![RgbImage::from_pixel(10, 10, Rgb([1, 2, 3]))];
        let (out, results) = ocr.classify_only(crops.clone()).unwrap();
        assert_eq!(out, crops);
        assert!(results.is_empty());
    }

    #[test]
    fn test_classification_switch() {
        // The bottom line starts blue, which the classifier reports as upside
        // down. Rotated, its crop starts with the right-hand half instead.
        let image = RgbImage::from_fn(320, 320, |x, y| match (x < 160, y < 160) {
            (_, true) => Rgb([0, 110, 0]),
            (true, false) => Rgb([0, 160, 255]),
            (false, false) => Rgb([0, 60, 0]),
        });

        let config = OCRConfig {
            use_angle_cls: true,
            ..Default::default()
        };
        let ocr = pipeline(vec![TOP_LINE, BOTTOM_LINE], 0.9, config);

        let texts = |lines: Vec<OCRLine>| lines.into_iter().map(|l| l.text).collect::<Vec<_>>();
        assert_eq!(texts(ocr.process_with_options(&image, false).unwrap()), vec!["b", "c"]);
        assert_eq!(texts(ocr.process(&image).unwrap()), vec!["b", "a"]);

        let disabled = pipeline(vec![TOP_LINE, BOTTOM_LINE], 0.9, OCRConfig::default());
        assert_eq!(texts(disabled.process(&image).unwrap()), vec!["b", "c"]);
    }

    #[test]
    fn test_process_buffer_checks_channels() {
        let ocr = pipeline(Vec::new(), 0.9, OCRConfig::default());
        let data = vec![0u8; 8 * 8 * 4];
        assert!(matches!(
            ocr.process_buffer(&data, 8, 8, 4),
            Err(OCRError::InvalidInput { .. })
        ));
        assert!(ocr.process_buffer(&data, 8, 8, 3).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let detector = TextDetPredictor::new(
            TextDetPredictorConfig::default(),
            Box::new(FakeDetector { regions: Vec::new() }),
        )
        .unwrap();
        let recognizer = TextRecPredictor::new(
            TextRecPredictorConfig::default(),
            alphabet_decoder(),
            Box::new(FakeRecognizer::new(5, 0.9)),
        )
        .unwrap();
        let config = OCRConfig {
            drop_score: -1.0,
            ..Default::default()
        };
        assert!(OAROCR::from_predictors(config, detector, recognizer, None).is_err());
    }

    #[test]
    fn test_missing_models_fail_construction() {
        let config = OCRConfig {
            det_model_path: "/nonexistent/det.onnx".into(),
            ..Default::default()
        };
        assert!(matches!(OAROCR::new(config), Err(OCRError::ModelLoad { .. })));
    }
}
