//! Builder pattern implementation for the OAROCR pipeline.

use super::OAROCR;
use crate::core::OCRError;
use crate::core::config::OrtSessionConfig;
use crate::pipeline::config::OCRConfig;
use crate::processors::LimitType;
use std::path::PathBuf;
use tracing::warn;

/// Builder for creating OAROCR instances.
///
/// Starts from [`OCRConfig::default`] with the three required paths set.
/// Nothing is loaded until [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct OAROCRBuilder {
    config: OCRConfig,
}

fn clamp_unit(name: &str, value: f32) -> f32 {
    if (0.0..=1.0).contains(&value) {
        value
    } else {
        warn!("{name} out of range [{value}], clamping to [0.0, 1.0]");
        value.clamp(0.0, 1.0)
    }
}

impl OAROCRBuilder {
    /// Creates a new OAROCRBuilder with the required parameters.
    ///
    /// # Arguments
    ///
    /// * `det_model_path` - Path to the text detection model file
    /// * `rec_model_path` - Path to the text recognition model file
    /// * `rec_char_dict_path` - Path to the character dictionary file
    pub fn new(
        det_model_path: impl Into<PathBuf>,
        rec_model_path: impl Into<PathBuf>,
        rec_char_dict_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            config: OCRConfig {
                det_model_path: det_model_path.into(),
                rec_model_path: rec_model_path.into(),
                rec_char_dict_path: rec_char_dict_path.into(),
                ..Default::default()
            },
        }
    }

    /// Creates a builder from an existing configuration.
    pub fn from_config(config: OCRConfig) -> Self {
        Self { config }
    }

    /// Enables text line orientation classification with the given model.
    pub fn with_angle_cls(mut self, cls_model_path: impl Into<PathBuf>) -> Self {
        self.config.cls_model_path = cls_model_path.into();
        self.config.use_angle_cls = true;
        self
    }

    /// Turns text line orientation classification on or off.
    pub fn use_angle_cls(mut self, use_it: bool) -> Self {
        self.config.use_angle_cls = use_it;
        self
    }

    /// Sets the limit applied to the image side before detection.
    ///
    /// # Arguments
    ///
    /// * `limit` - Side length in pixels
    /// * `limit_type` - Whether `limit` caps the longest side or floors the shortest
    pub fn det_limit(mut self, limit: u32, limit_type: LimitType) -> Self {
        self.config.det_limit_side_len = limit;
        self.config.det_limit_type = limit_type;
        self
    }

    /// Sets the probability threshold used to binarize the detection map.
    pub fn det_db_thresh(mut self, threshold: f32) -> Self {
        self.config.det_db_thresh = clamp_unit("det_db_thresh", threshold);
        self
    }

    /// Sets the minimum mean probability for a detected region to be kept.
    pub fn det_db_box_thresh(mut self, threshold: f32) -> Self {
        self.config.det_db_box_thresh = clamp_unit("det_db_box_thresh", threshold);
        self
    }

    /// Sets how far detected regions are expanded.
    ///
    /// Larger ratios give looser boxes around each line.
    pub fn det_db_unclip_ratio(mut self, ratio: f32) -> Self {
        self.config.det_db_unclip_ratio = ratio;
        self
    }

    pub fn use_dilation(mut self, use_it: bool) -> Self {
        self.config.use_dilation = use_it;
        self
    }

    /// Sets the recognition input shape `[channels, height, width]`.
    pub fn rec_image_shape(mut self, shape: [usize; 3]) -> Self {
        self.config.rec_image_shape = shape;
        self
    }

    pub fn rec_batch_num(mut self, batch_size: usize) -> Self {
        self.config.rec_batch_num = batch_size;
        self
    }

    /// Appends a space to the recognition alphabet when set.
    pub fn use_space_char(mut self, use_it: bool) -> Self {
        self.config.use_space_char = use_it;
        self
    }

    /// Sets the classifier input shape `[channels, height, width]`.
    pub fn cls_image_shape(mut self, shape: [usize; 3]) -> Self {
        self.config.cls_image_shape = shape;
        self
    }

    pub fn cls_batch_num(mut self, batch_size: usize) -> Self {
        self.config.cls_batch_num = batch_size;
        self
    }

    /// Sets the minimum score for a "180" prediction to rotate a crop.
    pub fn cls_thresh(mut self, threshold: f32) -> Self {
        self.config.cls_thresh = clamp_unit("cls_thresh", threshold);
        self
    }

    /// Sets the label of each classifier output.
    pub fn label_list(mut self, labels: Vec<String>) -> Self {
        self.config.label_list = labels;
        self
    }

    /// Sets the minimum recognition score for a line to be returned.
    pub fn drop_score(mut self, score: f32) -> Self {
        self.config.drop_score = clamp_unit("drop_score", score);
        self
    }

    /// Runs inference on the given CUDA device.
    ///
    /// Without the `cuda` feature this falls back to the CPU with a warning.
    pub fn use_gpu(mut self, gpu_id: i32) -> Self {
        self.config.use_gpu = true;
        self.config.gpu_id = gpu_id;
        self
    }

    /// Sets the ONNX Runtime options shared by every model.
    pub fn ort_session(mut self, config: OrtSessionConfig) -> Self {
        self.config.ort_session = Some(config);
        self
    }

    pub fn config(&self) -> &OCRConfig {
        &self.config
    }

    /// Loads the models and builds the pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or a model or the
    /// dictionary cannot be loaded.
    pub fn build(self) -> Result<OAROCR, OCRError> {
        OAROCR::new(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_fields() {
        let builder = OAROCRBuilder::new("d.onnx", "r.onnx", "keys.txt")
            .with_angle_cls("c.onnx")
            .det_limit(736, LimitType::Min)
            .det_db_box_thresh(0.7)
            .rec_batch_num(12)
            .use_space_char(false)
            .drop_score(0.3);

        let config = builder.config();
        assert_eq!(config.det_model_path, PathBuf::from("d.onnx"));
        assert_eq!(config.cls_model_path, PathBuf::from("c.onnx"));
        assert!(config.use_angle_cls);
        assert_eq!((config.det_limit_side_len, config.det_limit_type), (736, LimitType::Min));
        assert_eq!(config.det_db_box_thresh, 0.7);
        assert_eq!(config.rec_batch_num, 12);
        assert!(!config.use_space_char);
        assert_eq!(config.drop_score, 0.3);
    }

    #[test]
    fn test_thresholds_are_clamped() {
        let builder = OAROCRBuilder::new("d.onnx", "r.onnx", "keys.txt")
            .det_db_thresh(1.5)
            .drop_score(-0.2);
        assert_eq!(builder.config().det_db_thresh, 1.0);
        assert_eq!(builder.config().drop_score, 0.0);
    }

    #[test]
    fn test_build_reports_missing_model() {
        let result = OAROCRBuilder::new("/nonexistent/d.onnx", "r.onnx", "keys.txt").build();
        assert!(matches!(result, Err(OCRError::ModelLoad { .. })));
    }
}
