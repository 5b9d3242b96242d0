//! Configuration for the OCR pipeline.
//!
//! [`OCRConfig`] holds every option the pipeline recognizes. It is plain data:
//! it can be built in code, deserialized from JSON, validated, and split into
//! the per-stage predictor configurations.

use crate::core::config::{
    ConfigError, ConfigValidator, OrtExecutionProvider, OrtSessionConfig,
};
use crate::core::constants::{
    DEFAULT_BATCH_SIZE, DEFAULT_CLS_IMAGE_SHAPE, DEFAULT_CLS_LABELS, DEFAULT_CLS_THRESH,
    DEFAULT_DB_BOX_THRESH, DEFAULT_DB_THRESH, DEFAULT_DB_UNCLIP_RATIO, DEFAULT_DROP_SCORE,
    DEFAULT_LIMIT_SIDE_LEN, DEFAULT_MAX_CANDIDATES, DEFAULT_REC_IMAGE_SHAPE,
};
use crate::core::OCRError;
use crate::predictor::{TextDetPredictorConfig, TextLineClasPredictorConfig, TextRecPredictorConfig};
use crate::processors::LimitType;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Configuration of the OCR pipeline.
///
/// Missing fields take their defaults when deserializing; unknown fields are
/// rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OCRConfig {
    /// Run the models on a CUDA device (requires the `cuda` feature).
    pub use_gpu: bool,
    /// CUDA device index.
    pub gpu_id: i32,

    pub det_model_path: PathBuf,
    pub det_limit_side_len: u32,
    pub det_limit_type: LimitType,
    pub det_db_thresh: f32,
    pub det_db_box_thresh: f32,
    pub det_db_unclip_ratio: f32,
    pub use_dilation: bool,

    pub rec_model_path: PathBuf,
    pub rec_char_dict_path: PathBuf,
    /// `[channels, height, width]` of the recognition input.
    pub rec_image_shape: [usize; 3],
    pub rec_batch_num: usize,
    /// Append a space to the recognition alphabet.
    pub use_space_char: bool,

    /// Classify and correct 180 degree text lines before recognition.
    pub use_angle_cls: bool,
    pub cls_model_path: PathBuf,
    /// `[channels, height, width]` of the classifier input.
    pub cls_image_shape: [usize; 3],
    pub cls_batch_num: usize,
    pub cls_thresh: f32,
    /// Label of each classifier output.
    pub label_list: Vec<String>,

    /// Lines scoring below this are dropped from the result.
    pub drop_score: f32,

    /// ONNX Runtime session options shared by every model.
    pub ort_session: Option<OrtSessionConfig>,
}

impl Default for OCRConfig {
    fn default() -> Self {
        Self {
            use_gpu: false,
            gpu_id: 0,
            det_model_path: PathBuf::from("models/det.onnx"),
            det_limit_side_len: DEFAULT_LIMIT_SIDE_LEN,
            det_limit_type: LimitType::Max,
            det_db_thresh: DEFAULT_DB_THRESH,
            det_db_box_thresh: DEFAULT_DB_BOX_THRESH,
            det_db_unclip_ratio: DEFAULT_DB_UNCLIP_RATIO,
            use_dilation: false,
            rec_model_path: PathBuf::from("models/rec.onnx"),
            rec_char_dict_path: PathBuf::from("models/ppocr_keys_v1.txt"),
            rec_image_shape: DEFAULT_REC_IMAGE_SHAPE,
            rec_batch_num: DEFAULT_BATCH_SIZE,
            use_space_char: true,
            use_angle_cls: false,
            cls_model_path: PathBuf::from("models/cls.onnx"),
            cls_image_shape: DEFAULT_CLS_IMAGE_SHAPE,
            cls_batch_num: DEFAULT_BATCH_SIZE,
            cls_thresh: DEFAULT_CLS_THRESH,
            label_list: DEFAULT_CLS_LABELS.iter().map(|s| s.to_string()).collect(),
            drop_score: DEFAULT_DROP_SCORE,
            ort_session: None,
        }
    }
}

impl OCRConfig {
    /// Loads a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `OCRError::Io` if the file cannot be read and
    /// `OCRError::ConfigError` if it is not a valid configuration.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, OCRError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        serde_json::from_str(&content).map_err(|e| {
            OCRError::config_error(format!(
                "failed to parse configuration {}: {e}",
                path.as_ref().display()
            ))
        })
    }

    /// Detection stage settings.
    pub fn detection(&self) -> TextDetPredictorConfig {
        TextDetPredictorConfig {
            limit_side_len: self.det_limit_side_len,
            limit_type: self.det_limit_type,
            thresh: self.det_db_thresh,
            box_thresh: self.det_db_box_thresh,
            unclip_ratio: self.det_db_unclip_ratio,
            use_dilation: self.use_dilation,
            max_candidates: DEFAULT_MAX_CANDIDATES,
        }
    }

    /// Orientation classification stage settings.
    pub fn classification(&self) -> TextLineClasPredictorConfig {
        TextLineClasPredictorConfig {
            image_shape: self.cls_image_shape,
            batch_size: self.cls_batch_num,
            thresh: self.cls_thresh,
            label_list: self.label_list.clone(),
        }
    }

    /// Recognition stage settings.
    pub fn recognition(&self) -> TextRecPredictorConfig {
        TextRecPredictorConfig {
            image_shape: self.rec_image_shape,
            batch_size: self.rec_batch_num,
        }
    }

    /// ONNX Runtime options with the device selection applied.
    ///
    /// With `use_gpu` the CUDA provider is placed first and the CPU provider
    /// kept as fallback. Without the `cuda` feature a warning is logged and the
    /// CPU provider is used.
    pub fn session_config(&self) -> OrtSessionConfig {
        let mut session = self.ort_session.clone().unwrap_or_default();
        if !self.use_gpu {
            return session;
        }

        if cfg!(feature = "cuda") {
            session = session.with_execution_providers(vec![
                OrtExecutionProvider::CUDA {
                    device_id: Some(self.gpu_id),
                },
                OrtExecutionProvider::CPU,
            ]);
        } else {
            warn!(
                gpu_id = self.gpu_id,
                "use_gpu requested but the cuda feature is not enabled; running on CPU"
            );
        }
        session
    }
}

impl ConfigValidator for OCRConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.detection().validate()?;
        self.recognition().validate()?;
        if self.use_angle_cls {
            self.classification().validate()?;
        }
        self.validate_confidence_threshold(self.drop_score)?;
        if self.gpu_id < 0 {
            return Err(ConfigError::InvalidConfig {
                message: format!("gpu_id must not be negative, got {}", self.gpu_id),
            });
        }
        Ok(())
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}
