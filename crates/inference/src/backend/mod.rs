use ndarray::{Array, ArrayD, IxDyn};
use std::str::FromStr;

#[cfg(feature = "ort-backend")]
pub mod ort;

/// Runs the detection model. Implementations own the model session; the host
/// builds one once and hands it to the pipeline.
pub trait InferenceBackend {
    fn load_model(path: &str) -> anyhow::Result<Self>
    where
        Self: Sized;

    /// Run inference on a `[1, 3, H, W]` input tensor
    fn infer(&mut self, images: &Array<f32, IxDyn>) -> anyhow::Result<InferenceOutput>;
}

pub struct InferenceOutput {
    pub predictions: ArrayD<f32>, // [1, 4 + num_classes, num_predictions] cxcywh + class scores
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionProvider {
    #[default]
    Cpu,
    Cuda,
}

impl FromStr for ExecutionProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cpu" => Ok(Self::Cpu),
            "cuda" | "gpu" => Ok(Self::Cuda),
            other => Err(anyhow::anyhow!(
                "{} is not a supported execution provider. Use either `cpu` or `cuda`.",
                other
            )),
        }
    }
}
