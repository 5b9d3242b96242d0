//! ONNX Runtime inference engine holding one session per model.

use crate::core::{
    batch::{Tensor2D, Tensor3D, Tensor4D},
    config::OrtSessionConfig,
    errors::OCRError,
};
use ort::session::Session;
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;

#[path = "ort_infer_config.rs"]
mod ort_infer_config;
#[path = "ort_infer_execution.rs"]
mod ort_infer_execution;

/// A loaded model with its input and output tensor names.
///
/// The names are discovered once at load time and stay fixed afterwards. The
/// session sits behind a mutex, so concurrent calls on one engine are serialized.
pub struct OrtInfer {
    pub(super) session: Mutex<Session>,
    pub(super) input_name: String,
    pub(super) output_name: String,
    pub(super) model_path: std::path::PathBuf,
    pub(super) model_name: String,
}

impl std::fmt::Debug for OrtInfer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrtInfer")
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .field("model_path", &self.model_path)
            .field("model_name", &self.model_name)
            .finish()
    }
}

impl OrtInfer {
    /// Creates an engine with default ONNX Runtime settings.
    pub fn new(model_path: impl AsRef<Path>) -> Result<Self, OCRError> {
        Self::from_config(None, model_path)
    }

    /// Creates an engine, applying the given session configuration when present.
    pub fn from_config(
        config: Option<&OrtSessionConfig>,
        model_path: impl AsRef<Path>,
    ) -> Result<Self, OCRError> {
        let path = model_path.as_ref();
        let session = super::load_session(path, config)?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .ok_or_else(|| {
                OCRError::model_load_error::<std::io::Error>(
                    path,
                    "model declares no inputs",
                    None,
                    None,
                )
            })?;
        let output_name = session
            .outputs
            .first()
            .map(|output| output.name.clone())
            .ok_or_else(|| {
                OCRError::model_load_error::<std::io::Error>(
                    path,
                    "model declares no outputs",
                    None,
                    None,
                )
            })?;

        let model_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown_model")
            .to_string();

        debug!(
            model = %model_name,
            input = %input_name,
            output = %output_name,
            "loaded ONNX model"
        );

        Ok(OrtInfer {
            session: Mutex::new(session),
            input_name,
            output_name,
            model_path: path.to_path_buf(),
            model_name,
        })
    }

    /// Returns the model path associated with this inference engine.
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Returns the model name associated with this inference engine.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Returns the discovered input tensor name.
    pub fn input_name(&self) -> &str {
        &self.input_name
    }

    /// Returns the discovered output tensor name.
    pub fn output_name(&self) -> &str {
        &self.output_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model_is_load_error() {
        let result = OrtInfer::new("does_not_exist.onnx");
        assert!(matches!(result, Err(OCRError::ModelLoad { .. })));
    }

    #[test]
    fn test_missing_model_with_config_is_load_error() {
        let cfg = OrtSessionConfig::new().with_intra_threads(2);
        let result = OrtInfer::from_config(Some(&cfg), "does_not_exist.onnx");
        assert!(matches!(result, Err(OCRError::ModelLoad { .. })));
    }
}
