//! Helpers for working directly with ONNX Runtime sessions.

use crate::core::config::OrtSessionConfig;
use crate::core::errors::OCRError;
use ort::logging::LogLevel;
use ort::session::Session;
use std::path::Path;

/// Loads a model into a new session.
///
/// With a session config the options are applied through
/// [`OrtInfer::apply_ort_config`](super::OrtInfer); otherwise the runtime log level is
/// lowered to `Error` and everything else keeps the ONNX Runtime defaults.
pub fn load_session(
    model_path: impl AsRef<Path>,
    config: Option<&OrtSessionConfig>,
) -> Result<Session, OCRError> {
    let path = model_path.as_ref();
    if !path.is_file() {
        return Err(OCRError::model_load_error::<std::io::Error>(
            path,
            "model file not found",
            Some("verify the model path"),
            None,
        ));
    }

    let builder = Session::builder()?;
    let builder = match config {
        Some(cfg) => super::OrtInfer::apply_ort_config(builder.with_log_level(LogLevel::Error)?, cfg)?,
        None => builder.with_log_level(LogLevel::Error)?,
    };

    builder.commit_from_file(path).map_err(|e| {
        OCRError::model_load_error(
            path,
            "failed to create ONNX session",
            Some("check device/EP configuration and model file"),
            Some(e),
        )
    })
}
