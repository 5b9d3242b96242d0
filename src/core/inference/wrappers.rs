//! Small helpers that wrap OrtInfer into concrete dimensional InferenceEngine implementations.

use super::OrtInfer;
use crate::core::{InferenceEngine, OCRError, Tensor2D, Tensor3D, Tensor4D};

macro_rules! ort_engine_wrapper {
    ($name:ident, $output:ty, $method:ident, $info:literal) => {
        #[derive(Debug)]
        pub struct $name(OrtInfer);

        impl $name {
            /// Wraps an OrtInfer instance.
            pub fn new(inner: OrtInfer) -> Self {
                Self(inner)
            }

            /// Returns a reference to the inner OrtInfer instance.
            pub fn inner(&self) -> &OrtInfer {
                &self.0
            }
        }

        impl From<OrtInfer> for $name {
            fn from(inner: OrtInfer) -> Self {
                Self::new(inner)
            }
        }

        impl InferenceEngine for $name {
            type Input = Tensor4D;
            type Output = $output;

            fn infer(&self, input: &Self::Input) -> Result<Self::Output, OCRError> {
                self.0.$method(input)
            }

            fn engine_info(&self) -> String {
                format!("{} ({})", $info, self.0.model_name())
            }
        }
    };
}

ort_engine_wrapper!(OrtInfer2D, Tensor2D, infer_2d, "ONNXRuntime-2D");
ort_engine_wrapper!(OrtInfer3D, Tensor3D, infer_3d, "ONNXRuntime-3D");
ort_engine_wrapper!(OrtInfer4D, Tensor4D, infer_4d, "ONNXRuntime-4D");
