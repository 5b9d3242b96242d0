//! Character dictionary loading.

use crate::core::OCRError;
use std::path::Path;

/// Reads a recognition dictionary, one entry per line.
///
/// Trailing carriage returns are stripped and empty lines are skipped, so the
/// entries keep the order of the non-empty lines.
///
/// # Errors
///
/// Returns `OCRError::ModelLoad` if the file cannot be read or is not UTF-8.
pub fn read_character_dict(path: impl AsRef<Path>) -> Result<Vec<String>, OCRError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        OCRError::model_load_error(
            path,
            "failed to read character dictionary",
            Some("check rec_char_dict_path"),
            Some(e),
        )
    })?;

    Ok(content
        .split('\n')
        .map(|line| line.trim_end_matches(['\r', '\n']))
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
