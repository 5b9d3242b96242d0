//! Result types for the OAROCR pipeline.

use crate::processors::Quadrilateral;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One recognized line of text: where it is, what it says and how sure the
/// recognizer is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OCRLine {
    /// Region in source image coordinates, corners clockwise from top-left.
    pub bbox: Quadrilateral,
    /// The recognized text.
    pub text: String,
    /// Mean per-character confidence in `[0, 1]`.
    pub score: f32,
}

/// Text and confidence for one crop.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecognitionResult {
    pub text: String,
    pub score: f32,
}

/// Orientation label (`"0"` or `"180"` by default) and confidence for one crop.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrientationResult {
    pub label: String,
    pub score: f32,
}

impl From<(String, f32)> for RecognitionResult {
    fn from((text, score): (String, f32)) -> Self {
        Self { text, score }
    }
}

impl From<(String, f32)> for OrientationResult {
    fn from((label, score): (String, f32)) -> Self {
        Self { label, score }
    }
}

impl fmt::Display for OCRLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, p) in self.bbox.points.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "({:.0}, {:.0})", p.x, p.y)?;
        }
        write!(f, "] {:?} ({:.3})", self.text, self.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let line = OCRLine {
            bbox: Quadrilateral::from_coords(1.0, 2.0, 30.0, 12.0),
            text: "hello".to_string(),
            score: 0.98765,
        };
        assert_eq!(
            line.to_string(),
            "[(1, 2), (30, 2), (30, 12), (1, 12)] \"hello\" (0.988)"
        );
    }

    #[test]
    fn test_serializes_to_json() {
        let result = RecognitionResult::from(("ab".to_string(), 0.5));
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(json, r#"{"text":"ab","score":0.5}"#);
    }
}
