//! Decoding of text line orientation scores.

use crate::core::Tensor2D;
use crate::processors::decode::argmax;
use ndarray::Axis;

/// Maps classifier scores to orientation labels.
#[derive(Debug, Clone)]
pub struct ClsPostProcess {
    label_list: Vec<String>,
}

impl ClsPostProcess {
    pub fn new(label_list: Vec<String>) -> Self {
        Self { label_list }
    }

    pub fn label_list(&self) -> &[String] {
        &self.label_list
    }

    /// Decodes a `[batch, classes]` tensor into one `(label, score)` per row.
    ///
    /// The label is the entry of the label list at the arg-max index, or the
    /// index itself in decimal when the list is too short.
    pub fn apply(&self, preds: &Tensor2D) -> Vec<(String, f32)> {
        preds
            .axis_iter(Axis(0))
            .map(|row| match argmax(row.iter().copied()) {
                Some((idx, score)) => {
                    let label = self
                        .label_list
                        .get(idx)
                        .cloned()
                        .unwrap_or_else(|| idx.to_string());
                    (label, score)
                }
                None => (String::new(), 0.0),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn post() -> ClsPostProcess {
        ClsPostProcess::new(vec!["0".to_string(), "180".to_string()])
    }

    #[test]
    fn test_labels_from_argmax() {
        let preds = array![[0.2, 0.8], [0.95, 0.05]];
        let out = post().apply(&preds);
        assert_eq!(out[0], ("180".to_string(), 0.8));
        assert_eq!(out[1], ("0".to_string(), 0.95));
    }

    #[test]
    fn test_tie_keeps_first_label() {
        let out = post().apply(&array![[0.5, 0.5]]);
        assert_eq!(out[0].0, "0");
    }

    #[test]
    fn test_index_beyond_labels_is_decimal() {
        let out = post().apply(&array![[0.1, 0.2, 0.7]]);
        assert_eq!(out[0], ("2".to_string(), 0.7));
    }
}
