//! Tensor aliases and the aspect-ratio batch scheduler.
//!
//! Text crops come in arbitrary sizes while the classification and recognition
//! models take one fixed-height tensor per batch. The scheduler sorts crops by
//! their width/height ratio so each batch holds similarly shaped crops, hands every
//! batch to a caller-provided runner and scatters the results back so that the
//! output order always matches the input order.

use crate::core::errors::{OCRError, OcrResult};
use image::RgbImage;
use tracing::debug;

/// A 2-dimensional tensor represented as a 2D array of f32 values.
pub type Tensor2D = ndarray::Array2<f32>;

/// A 3-dimensional tensor represented as a 3D array of f32 values.
pub type Tensor3D = ndarray::Array3<f32>;

/// A 4-dimensional tensor represented as a 4D array of f32 values.
pub type Tensor4D = ndarray::Array4<f32>;

/// Width/height ratio of a crop, or 0 when the crop has no rows.
pub fn crop_ratio(image: &RgbImage) -> f32 {
    if image.height() == 0 {
        0.0
    } else {
        image.width() as f32 / image.height() as f32
    }
}

/// One batch of the schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledBatch {
    /// Position of the batch in the schedule.
    pub batch_index: usize,
    /// Original (pre-sort) positions of the members, in ascending ratio order.
    pub indices: Vec<usize>,
    /// Largest width/height ratio among the members.
    pub max_ratio: f32,
}

/// Groups items by ascending aspect ratio into batches of at most `batch_size`.
#[derive(Debug, Clone, Copy)]
pub struct AspectRatioScheduler {
    batch_size: usize,
}

impl AspectRatioScheduler {
    /// Creates a scheduler. A batch size of zero is treated as one.
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }

    /// Returns the batch size.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Computes the batch schedule for the given ratios.
    ///
    /// The permutation is a stable ascending sort, so crops with equal ratios keep
    /// their relative input order.
    pub fn plan(&self, ratios: &[f32]) -> Vec<ScheduledBatch> {
        let mut order: Vec<usize> = (0..ratios.len()).collect();
        order.sort_by(|&a, &b| ratios[a].total_cmp(&ratios[b]));

        order
            .chunks(self.batch_size)
            .enumerate()
            .map(|(batch_index, chunk)| ScheduledBatch {
                batch_index,
                indices: chunk.to_vec(),
                max_ratio: chunk.iter().map(|&i| ratios[i]).fold(0.0, f32::max),
            })
            .collect()
    }

    /// Runs `runner` once per scheduled batch and returns results in input order.
    ///
    /// The runner receives the batch description and must return exactly one result
    /// per member, in the member order of `ScheduledBatch::indices`.
    pub fn run<T, F>(&self, images: &[RgbImage], mut runner: F) -> OcrResult<Vec<T>>
    where
        T: Default,
        F: FnMut(&ScheduledBatch) -> OcrResult<Vec<T>>,
    {
        let ratios: Vec<f32> = images.iter().map(crop_ratio).collect();
        let mut results: Vec<T> = std::iter::repeat_with(T::default)
            .take(images.len())
            .collect();

        for batch in self.plan(&ratios) {
            debug!(
                batch_index = batch.batch_index,
                size = batch.indices.len(),
                max_ratio = batch.max_ratio,
                "running batch"
            );
            let batch_results = runner(&batch)?;
            if batch_results.len() != batch.indices.len() {
                return Err(OCRError::tensor_operation_error(
                    "batch_scatter",
                    &[batch.indices.len()],
                    &[batch_results.len()],
                    &format!("batch {} returned a wrong number of results", batch.batch_index),
                    crate::core::errors::OpaqueError("result count mismatch".to_string()),
                ));
            }
            for (&position, result) in batch.indices.iter().zip(batch_results) {
                results[position] = result;
            }
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crops(widths: &[u32]) -> Vec<RgbImage> {
        widths.iter().map(|&w| RgbImage::new(w, 10)).collect()
    }

    fn run_identity(images: &[RgbImage], batch_size: usize) -> Vec<u32> {
        AspectRatioScheduler::new(batch_size)
            .run(images, |batch| {
                assert!(batch.indices.len() <= batch_size.max(1));
                Ok(batch.indices.iter().map(|&i| images[i].width()).collect())
            })
            .unwrap()
    }

    #[test]
    fn test_empty_input() {
        let mut calls = 0;
        let out: Vec<u32> = AspectRatioScheduler::new(6)
            .run(&[], |_| {
                calls += 1;
                Ok(vec![])
            })
            .unwrap();
        assert!(out.is_empty());
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_single_input() {
        let images = crops(&[37]);
        assert_eq!(run_identity(&images, 6), vec![37]);
    }

    #[test]
    fn test_scatter_back_preserves_input_order() {
        let widths = [50, 10, 90, 30, 70, 20, 80, 40, 60, 100, 5, 55, 45];
        let images = crops(&widths);
        assert_eq!(run_identity(&images, 6), widths.to_vec());
        assert_eq!(run_identity(&images, 1), widths.to_vec());
        assert_eq!(run_identity(&images, 4), widths.to_vec());
    }

    #[test]
    fn test_plan_sorts_ascending_and_chunks() {
        let plan = AspectRatioScheduler::new(2).plan(&[3.0, 1.0, 2.0, 1.0, 0.5]);
        let indices: Vec<Vec<usize>> = plan.iter().map(|b| b.indices.clone()).collect();
        assert_eq!(indices, vec![vec![4, 1], vec![3, 2], vec![0]]);
        assert_eq!(plan[0].max_ratio, 1.0);
        assert_eq!(plan[1].max_ratio, 2.0);
        assert_eq!(plan[2].batch_index, 2);
    }

    #[test]
    fn test_zero_height_crop_ratio() {
        assert_eq!(crop_ratio(&RgbImage::new(10, 0)), 0.0);
        assert_eq!(crop_ratio(&RgbImage::new(20, 10)), 2.0);
    }

    #[test]
    fn test_runner_result_count_mismatch_is_error() {
        let images = crops(&[10, 20]);
        let result: OcrResult<Vec<u32>> =
            AspectRatioScheduler::new(2).run(&images, |_| Ok(vec![1]));
        assert!(result.is_err());
    }
}
