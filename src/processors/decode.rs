//! Text decoding utilities for OCR (Optical Character Recognition) systems.
//!
//! This module implements greedy CTC (Connectionist Temporal Classification)
//! decoding: the most probable class is taken at every time step, repeats are
//! collapsed and the blank class is dropped.

use crate::core::{OCRError, Tensor3D};
use crate::utils::dict::read_character_dict;
use ndarray::{ArrayView2, Axis};
use std::path::Path;

/// Label of the blank class, always at index 0.
pub const BLANK_LABEL: &str = "blank";

/// Greedy CTC decoder.
///
/// The alphabet is `[blank, dictionary entries..., optional space]`. Dictionary
/// entries are whole strings, so a single class may emit several characters.
#[derive(Debug, Clone)]
pub struct CTCLabelDecode {
    character: Vec<String>,
}

impl CTCLabelDecode {
    /// Builds a decoder from dictionary entries.
    ///
    /// # Arguments
    /// * `dict` - The dictionary entries, in model class order (blank excluded).
    /// * `use_space_char` - Whether to append a space as the last class.
    pub fn new(dict: Vec<String>, use_space_char: bool) -> Self {
        let mut character = Vec::with_capacity(dict.len() + 2);
        character.push(BLANK_LABEL.to_string());
        character.extend(dict);
        if use_space_char {
            character.push(" ".to_string());
        }
        Self { character }
    }

    /// Builds a decoder from a dictionary file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read.
    pub fn from_dict_file(path: impl AsRef<Path>, use_space_char: bool) -> Result<Self, OCRError> {
        Ok(Self::new(read_character_dict(path)?, use_space_char))
    }

    /// Number of classes including the blank.
    pub fn character_count(&self) -> usize {
        self.character.len()
    }

    /// Decodes a `[batch, time, classes]` tensor into one `(text, score)` per sequence.
    pub fn apply(&self, preds: &Tensor3D) -> Vec<(String, f32)> {
        preds
            .axis_iter(Axis(0))
            .map(|sequence| self.decode_sequence(sequence))
            .collect()
    }

    /// Decodes one `[time, classes]` sequence.
    ///
    /// The score is the mean probability of the emitted steps, or 0 when nothing
    /// was emitted. A class index beyond the alphabet emits nothing.
    pub fn decode_sequence(&self, sequence: ArrayView2<f32>) -> (String, f32) {
        let mut text = String::new();
        let mut confidences: Vec<f32> = Vec::new();
        let mut prev_idx: Option<usize> = None;

        for step in sequence.axis_iter(Axis(0)) {
            let Some((max_idx, max_val)) = argmax(step.iter().copied()) else {
                continue;
            };

            if max_idx != 0
                && prev_idx != Some(max_idx)
                && let Some(symbol) = self.character.get(max_idx)
            {
                text.push_str(symbol);
                confidences.push(max_val);
            }
            prev_idx = Some(max_idx);
        }

        let score = if confidences.is_empty() {
            0.0
        } else {
            confidences.iter().sum::<f32>() / confidences.len() as f32
        };
        (text, score)
    }
}

/// Index and value of the first maximum; strictly greater values replace it.
pub(crate) fn argmax(values: impl Iterator<Item = f32>) -> Option<(usize, f32)> {
    values.enumerate().fold(None, |best, (idx, value)| match best {
        Some((_, best_val)) if value > best_val => Some((idx, value)),
        Some(best) => Some(best),
        None => Some((idx, value)),
    })
}
