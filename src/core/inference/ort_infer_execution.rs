use super::*;
use crate::core::errors::OpaqueError;
use ndarray::{ArrayView2, ArrayView3, ArrayView4};
use ort::value::TensorRef;

impl OrtInfer {
    fn run_inference_with_processor<T>(
        &self,
        x: &Tensor4D,
        processor: impl FnOnce(&[i64], &[f32]) -> Result<T, OCRError>,
    ) -> Result<T, OCRError> {
        let input_shape = x.shape().to_vec();

        let input_tensor = TensorRef::from_array_view(x.view()).map_err(|e| {
            OCRError::model_inference_error(
                &self.model_name,
                "tensor_conversion",
                0,
                &input_shape,
                &format!("Failed to convert input tensor with shape {:?}", input_shape),
                e,
            )
        })?;

        let inputs = ort::inputs![self.input_name.as_str() => input_tensor];

        let mut session_guard = self.session.lock().map_err(|_| {
            OCRError::inference_error(
                &self.model_name,
                "Failed to acquire session lock",
                OpaqueError("session lock poisoned".to_string()),
            )
        })?;

        let outputs = session_guard.run(inputs).map_err(|e| {
            OCRError::model_inference_error(
                &self.model_name,
                "forward_pass",
                0,
                &input_shape,
                &format!(
                    "ONNX Runtime inference failed with input '{}' -> output '{}'",
                    self.input_name, self.output_name
                ),
                e,
            )
        })?;

        let (output_shape, output_data) = outputs[self.output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| {
                OCRError::model_inference_error(
                    &self.model_name,
                    "output_extraction",
                    0,
                    &input_shape,
                    &format!("Failed to extract output tensor '{}' as f32", self.output_name),
                    e,
                )
            })?;

        processor(output_shape, output_data)
    }

    fn check_rank(&self, output_shape: &[i64], rank: usize) -> Result<Vec<usize>, OCRError> {
        if output_shape.len() != rank || output_shape.iter().any(|&d| d < 0) {
            return Err(OCRError::tensor_operation_error(
                "output_validation",
                &[rank],
                &[output_shape.len()],
                &format!(
                    "Model '{}': expected {}D output tensor, got shape {:?}",
                    self.model_name, rank, output_shape
                ),
                OpaqueError("Invalid output tensor dimensions".to_string()),
            ));
        }
        Ok(output_shape.iter().map(|&d| d as usize).collect())
    }

    fn check_len(&self, dims: &[usize], actual: usize) -> Result<(), OCRError> {
        let expected: usize = dims.iter().product();
        if expected != actual {
            return Err(OCRError::tensor_operation_error(
                "output_data_validation",
                &[expected],
                &[actual],
                &format!(
                    "Model '{}': output data size does not match shape {:?}",
                    self.model_name, dims
                ),
                OpaqueError("Output tensor data size mismatch".to_string()),
            ));
        }
        Ok(())
    }

    /// Runs the model and returns a `[N, C, H, W]` output, e.g. a probability map.
    pub fn infer_4d(&self, x: &Tensor4D) -> Result<Tensor4D, OCRError> {
        self.run_inference_with_processor(x, |output_shape, output_data| {
            let dims = self.check_rank(output_shape, 4)?;
            self.check_len(&dims, output_data.len())?;
            let array_view =
                ArrayView4::from_shape((dims[0], dims[1], dims[2], dims[3]), output_data)
                    .map_err(OCRError::Tensor)?;
            Ok(array_view.to_owned())
        })
    }

    /// Runs the model and returns a `[N, num_classes]` output.
    pub fn infer_2d(&self, x: &Tensor4D) -> Result<Tensor2D, OCRError> {
        self.run_inference_with_processor(x, |output_shape, output_data| {
            let dims = self.check_rank(output_shape, 2)?;
            self.check_len(&dims, output_data.len())?;
            let array_view = ArrayView2::from_shape((dims[0], dims[1]), output_data)
                .map_err(OCRError::Tensor)?;
            Ok(array_view.to_owned())
        })
    }

    /// Runs the model and returns a `[N, T, num_classes]` output.
    pub fn infer_3d(&self, x: &Tensor4D) -> Result<Tensor3D, OCRError> {
        self.run_inference_with_processor(x, |output_shape, output_data| {
            let dims = self.check_rank(output_shape, 3)?;
            self.check_len(&dims, output_data.len())?;
            let array_view = ArrayView3::from_shape((dims[0], dims[1], dims[2]), output_data)
                .map_err(OCRError::Tensor)?;
            Ok(array_view.to_owned())
        })
    }
}
